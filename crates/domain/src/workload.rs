//! 工作量索引与候选人选择
//!
//! 本模块是系统的核心领域逻辑：对一个时间点的数据快照计算
//! 每个员工的进行中任务数，并据此为目标任务挑选最合适的候选员工。
//! 所有函数都是纯函数，每次调用重新计算，不做任何缓存。

use std::collections::{HashMap, HashSet};

use tracker_core::{TrackerError, TrackerResult};

use crate::entities::{Employee, Task};

/// 计算工作量索引：员工 id -> 进行中任务数。
///
/// 没有任何进行中任务的员工也会出现在映射里，计数为 0，
/// 这样当存在空闲员工时最小负载可以取到 0。
pub fn workload_index(employees: &[Employee], tasks: &[Task]) -> HashMap<i64, usize> {
    let mut index: HashMap<i64, usize> = employees.iter().map(|e| (e.id, 0)).collect();
    for task in tasks {
        if !task.is_open() {
            continue;
        }
        if let Some(employee_id) = task.employee_id {
            if let Some(count) = index.get_mut(&employee_id) {
                *count += 1;
            }
        }
    }
    index
}

/// 索引中的最小负载；员工池为空时没有定义最小值
pub fn min_load(index: &HashMap<i64, usize>) -> Option<usize> {
    index.values().copied().min()
}

/// 为目标任务选择候选员工，返回按序排列的员工姓名。
///
/// 1. 基础候选集：进行中任务数等于最小负载的员工。
///    并列时按员工 id 升序排列——这是对参考实现中
///    "容器迭代顺序"的显式化，保证跨存储后端的稳定顺序。
/// 2. 追加：目标任务的每个直接子任务的执行人，若尚未入选则
///    按子任务枚举顺序追加。去重按员工 id 而不是姓名，
///    避免同名员工被错误合并；姓名只在最终投影时使用。
///
/// 员工池为空时返回 `NoCandidates`，由调用方决定渲染为空列表。
pub fn select_candidates(
    employees: &[Employee],
    tasks: &[Task],
    subtasks: &[Task],
) -> TrackerResult<Vec<String>> {
    let index = workload_index(employees, tasks);
    let min_count = min_load(&index).ok_or(TrackerError::NoCandidates)?;

    let mut ordered: Vec<&Employee> = employees.iter().collect();
    ordered.sort_by_key(|e| e.id);

    let mut selected_ids: HashSet<i64> = HashSet::new();
    let mut names: Vec<String> = Vec::new();

    for employee in &ordered {
        if index.get(&employee.id) == Some(&min_count) && selected_ids.insert(employee.id) {
            names.push(employee.full_name.clone());
        }
    }

    for subtask in subtasks {
        let Some(employee_id) = subtask.employee_id else {
            continue;
        };
        if selected_ids.contains(&employee_id) {
            continue;
        }
        // 快照中找不到的执行人直接跳过，不视为错误
        if let Some(employee) = employees.iter().find(|e| e.id == employee_id) {
            selected_ids.insert(employee.id);
            names.push(employee.full_name.clone());
        }
    }

    Ok(names)
}
