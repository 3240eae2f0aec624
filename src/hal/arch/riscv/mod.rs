//! # RISC-V 裸机后端
//!
//! ## Overview
//! - 中断开关直接操作 S 态 `sstatus.SIE` 位
//! - 屏蔽嵌套信息保存在全局 `UPSafeCellRaw` 中（单核，无需额外加锁）
//! - 控制台输出通过 SBI 调用完成

mod sbi;

use crate::hal::IntrMaskingInfo;
use crate::sync::UPSafeCellRaw;
use riscv::register::sstatus;

pub use sbi::{console_flush, console_putchar};

static INTR_MASKING_INFO: UPSafeCellRaw<IntrMaskingInfo> =
    unsafe { UPSafeCellRaw::new(IntrMaskingInfo::new()) };

pub fn intr_get() -> bool {
    sstatus::read().sie()
}

pub fn intr_on() {
    unsafe { sstatus::set_sie() };
}

pub fn intr_off() {
    unsafe { sstatus::clear_sie() };
}

pub fn with_intr_masking_info<R>(f: impl FnOnce(&mut IntrMaskingInfo) -> R) -> R {
    f(INTR_MASKING_INFO.get_mut())
}
