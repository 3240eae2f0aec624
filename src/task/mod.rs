//! # 调度器接口
//!
//! ## Overview
//! 信号量核心不直接操纵任务，而是通过 [`Scheduler`] 向调度器投递
//! [`SchedRequest`] 消息：
//! - `Block(tid)`：调用任务已进入等待队列，请求挂起
//! - `Unblock(tid)`：等待队列弹出了该任务，请求放回就绪队列
//!
//! 每个任务在调度器内部是一个显式状态机：
//!
//! ```text
//!            schedule            Block
//!   Ready ───────────► Running ────────► Blocked
//!     ▲                   │                 │
//!     └──── schedule ─────┘                 │
//!     └──────────────── Unblock ────────────┘
//! ```

mod manager;

pub use manager::{TaskManager, TASK_MANAGER};

use core::fmt;

/// 任务（线程）句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tid(pub usize);

impl fmt::Display for Tid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tid {}", self.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Ready,
    Running,
    Blocked,
}

/// 同步原语发往调度器的请求
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedRequest {
    /// 挂起当前正在运行的任务
    Block(Tid),
    /// 唤醒一个在等待队列中登记过的任务
    Unblock(Tid),
}

/// 同步原语所依赖的调度器能力
pub trait Scheduler {
    /// 当前正在运行的任务；中断上下文或空闲时为 `None`
    fn current_task(&self) -> Option<Tid>;

    /// 投递一条调度请求
    ///
    /// `Block` 必须在离开临界区之后投递，`Unblock` 则可以在临界区内投递
    fn submit(&self, request: SchedRequest);
}
