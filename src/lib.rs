//! # ksema
//!
//! ## Overview
//! 单处理器协作式内核中的 **固定容量计数信号量** 设施。
//!
//! - `sync::semaphore`：信号量表及 create / take / give / delete 协议
//! - `sync::up`：关中断临界区（`UPIntrFreeCell`）
//! - `sync::queue`：有界 FIFO 等待队列
//! - `task`：调度器接口与任务状态机
//! - `syscall`：面向任务的整数 ABI
//!
//! ## Assumptions
//! - 单核运行，并发仅来自中断与调度点
//! - 裸机目标（`target_os = "none"`）下以 `no_std` 编译，
//!   其余目标使用宿主模拟的 HAL，便于测试

#![cfg_attr(target_os = "none", no_std)]

extern crate alloc;

#[macro_use]
pub mod console;
pub mod config;
pub mod hal;
pub mod sync;
pub mod syscall;
pub mod task;
