//! # 信号量相关系统调用
//!
//! ## Overview
//! 所有调用都作用于全局 `SEM_TABLE`，并以全局 `TASK_MANAGER` 作为调度器。
//!
//! ## Behavior
//! - `create` 成功返回句柄，任何失败都返回 `SEM_ID_INVALID`
//! - `take` / `give` 成功返回 `0`，失败返回负错误码
//! - `delete` 成功返回 `0`；仍有等待者时返回 `-EBUSY`
//! - 阻塞类调用会触发任务切换

use crate::sync::{SemId, SemState, SEM_TABLE};
use crate::task::TASK_MANAGER;
use log::{debug, warn};
use num_enum::TryFromPrimitive;

/// 创建失败时返回的哨兵句柄
pub const SEM_ID_INVALID: isize = -1;

/// 创建一个信号量
///
/// ## Parameters
/// - `count`：资源上限
/// - `state`：`0` 表示初始为空，`1` 表示初始为满
pub fn sys_semaphore_create(count: usize, state: usize) -> isize {
    let state = match SemState::try_from_primitive(state) {
        Ok(state) => state,
        Err(_) => {
            warn!("sys_semaphore_create: unknown start state {}", state);
            return SEM_ID_INVALID;
        }
    };
    match SEM_TABLE.create(count, state) {
        Ok(id) => id.0 as isize,
        Err(err) => {
            debug!("sys_semaphore_create: {}", err);
            SEM_ID_INVALID
        }
    }
}

/// 获取信号量，资源不足时阻塞当前任务
pub fn sys_semaphore_take(sem_id: usize) -> isize {
    match SEM_TABLE.take(SemId(sem_id), &*TASK_MANAGER) {
        Ok(_) => 0,
        Err(err) => {
            debug!("sys_semaphore_take: {}", err);
            err.errno()
        }
    }
}

/// 释放信号量
pub fn sys_semaphore_give(sem_id: usize) -> isize {
    match SEM_TABLE.give(SemId(sem_id), &*TASK_MANAGER) {
        Ok(_) => 0,
        Err(err) => {
            debug!("sys_semaphore_give: {}", err);
            err.errno()
        }
    }
}

/// 删除信号量
pub fn sys_semaphore_delete(sem_id: usize) -> isize {
    match SEM_TABLE.delete(SemId(sem_id)) {
        Ok(()) => 0,
        Err(err) => {
            debug!("sys_semaphore_delete: {}", err);
            err.errno()
        }
    }
}
