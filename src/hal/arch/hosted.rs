//! # 宿主环境后端
//!
//! ## Overview
//! 在普通操作系统进程中模拟 **一颗** CPU：
//! - 进程内只有一把全局 `CPU` 锁。最外层 `intr_enter` 取得它，
//!   直到配对的最外层 `intr_exit` 才释放，因此所有宿主线程的临界区
//!   都被串行化到这一颗 CPU 上
//! - 每个宿主线程视为一个内核执行上下文，中断使能位与屏蔽嵌套信息
//!   属于上下文（切换时保存/恢复），因此按线程保存
//! - 控制台输出写入标准错误
//!
//! 新线程启动时中断处于开启状态，与内核进入调度循环后的状态一致。
//!
//! ## Invariants
//! - 某线程的 `nested_level > 0` 当且仅当它持有 `CPU` 锁

use crate::hal::IntrMaskingInfo;
use core::cell::{Cell, RefCell};
use spin::{Mutex, MutexGuard};
use std::io::Write;

static CPU: Mutex<()> = Mutex::new(());

thread_local! {
    static SIE: Cell<bool> = const { Cell::new(true) };
    static INTR_MASKING_INFO: RefCell<IntrMaskingInfo> = const { RefCell::new(IntrMaskingInfo::new()) };
    static CPU_GUARD: RefCell<Option<MutexGuard<'static, ()>>> = const { RefCell::new(None) };
}

pub fn intr_get() -> bool {
    SIE.with(|sie| sie.get())
}

pub fn intr_on() {
    SIE.with(|sie| sie.set(true));
}

pub fn intr_off() {
    SIE.with(|sie| sie.set(false));
}

pub fn with_intr_masking_info<R>(f: impl FnOnce(&mut IntrMaskingInfo) -> R) -> R {
    INTR_MASKING_INFO.with(|info| {
        let mut info = info.borrow_mut();
        let before = info.nested_level();
        let ret = f(&mut info);
        match (before, info.nested_level()) {
            (0, 1) => CPU_GUARD.with(|guard| *guard.borrow_mut() = Some(CPU.lock())),
            (1, 0) => CPU_GUARD.with(|guard| *guard.borrow_mut() = None),
            _ => {}
        }
        ret
    })
}

pub fn console_putchar(c: usize) {
    let _ = std::io::stderr().write_all(&[c as u8]);
}

pub fn console_flush() {
    let _ = std::io::stderr().flush();
}
