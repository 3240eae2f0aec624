//! SBI 调用模块
//! # Overview
//! 本模块只保留信号量设施需要的控制台输出能力。
//!
//! # Safety
//! - `sbi_call` 使用裸 `asm!` 调用 ecall，需要确保传入参数正确。

use core::arch::asm;

const SBI_CONSOLE_PUTCHAR: usize = 1;

/// `ecall` wrapper to switch trap into S level.
#[inline(always)]
fn sbi_call(which: usize, arg0: usize, arg1: usize, arg2: usize) -> usize {
    let mut ret;
    unsafe {
        asm!(
        "ecall",
        inlateout("x10") arg0 => ret,
        in("x11") arg1,
        in("x12") arg2,
        in("x17") which,
        );
    }
    ret
}

/// 控制台输出一个字符
pub fn console_putchar(c: usize) {
    sbi_call(SBI_CONSOLE_PUTCHAR, c, 0, 0);
}

/// SBI 不提供显式刷新接口
pub fn console_flush() {}
