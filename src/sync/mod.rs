//! # 内核同步原语模块（sync）
//!
//! ## Overview
//! - `up`：单处理器环境下的内部可变性与中断屏蔽封装，即临界区守卫
//! - `queue`：信号量使用的有界 FIFO 等待队列
//! - `semaphore`：固定容量的计数型信号量表
//!
//! ## Assumptions
//! - 系统运行在单处理器环境
//! - 所有同步原语都依赖 `UPIntrFreeCell` 提供的关中断互斥语义
//!
//! ## Invariants
//! - 在阻塞当前任务前，内部状态必然已经更新
//! - 被加入等待队列的任务要么已阻塞，要么即将投递阻塞请求

pub mod queue;
pub mod semaphore;
mod up;

pub use queue::{QueueError, WaitQueue};
pub use semaphore::{Acquire, Release, SemError, SemId, SemState, SemaphoreTable, SEM_TABLE};
pub use up::{UPIntrFreeCell, UPIntrRefMut, UPSafeCellRaw};
