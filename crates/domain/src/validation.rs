//! 任务名称校验
//!
//! 任务名称只允许拉丁与西里尔字母、阿拉伯数字、点、逗号、
//! 连字符和空格，去除首尾空白后不能为空，长度不超过100个字符。

use tracker_core::{TrackerError, TrackerResult};

pub const MAX_TASK_NAME_LEN: usize = 100;

fn is_allowed_char(c: char) -> bool {
    matches!(c,
        'a'..='z' | 'A'..='Z' | 'а'..='я' | 'А'..='Я' | '0'..='9' | '.' | ',' | '-' | ' ')
}

/// 校验任务名称，在持久化之前调用
pub fn validate_task_name(name: &str) -> TrackerResult<()> {
    if name.trim().is_empty() {
        return Err(TrackerError::InvalidTaskName(
            "任务名称不能为空".to_string(),
        ));
    }

    if name.chars().count() > MAX_TASK_NAME_LEN {
        return Err(TrackerError::InvalidTaskName(format!(
            "任务名称长度不能超过{MAX_TASK_NAME_LEN}个字符"
        )));
    }

    if !name.chars().all(is_allowed_char) {
        return Err(TrackerError::InvalidTaskName(
            "任务名称只能包含拉丁或西里尔字母、数字、点、逗号、连字符和空格".to_string(),
        ));
    }

    Ok(())
}
