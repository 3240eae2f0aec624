//! # 硬件抽象层（HAL）
//!
//! ## Overview
//! 为同步原语提供两类平台能力：
//! - 可嵌套的中断屏蔽（`intr_enter` / `intr_exit`）
//! - 控制台字节输出（供日志器使用）
//!
//! 具体实现由 `arch` 子模块按编译目标选择：
//! - `riscv`：裸机 RISC-V，操作 `sstatus.SIE`，控制台走 SBI
//! - `hosted`：宿主环境，每个线程模拟一颗 CPU 的中断开关

pub mod arch;
mod intr;

pub use arch::{console_flush, console_putchar};
pub use intr::{intr_enabled, intr_enter, intr_exit, IntrMaskingInfo};
