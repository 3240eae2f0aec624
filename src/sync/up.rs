//! # 单处理器安全内部可变性封装模块
//!
//! ## Overview
//! 本模块提供 **单处理器（Uniprocessor, UP）环境** 下的内部可变性封装，
//! 也是信号量设施唯一的临界区原语：
//! - `UPSafeCellRaw`：基于 `UnsafeCell` 的最底层封装，完全由使用者保证安全
//! - `UPIntrFreeCell`：在访问期间自动关闭中断，防止中断打断导致的数据竞争
//! - `UPIntrRefMut`：配合 `UPIntrFreeCell` 使用的 RAII 可变借用守卫
//!
//! ## Assumptions
//! - 系统运行在单核处理器环境中，仅可能被中断打断
//! - 中断屏蔽可以提供足够的互斥保证；宿主环境下由 `hal` 的全局 CPU 锁
//!   把各线程的临界区串行化，效果等同
//!
//! ## Safety
//! - `unsafe impl Sync` 的正确性完全依赖“单处理器 + 中断屏蔽”这一前提
//! - `UPSafeCellRaw` 不做任何借用或并发检查，误用将直接导致未定义行为
//!
//! ## Invariants
//! - 若某个 `UPIntrFreeCell` 处于可变借用状态，则中断必然被屏蔽
//! - `UPIntrRefMut` 被 drop 时先释放借用，再恢复中断；
//!   任何提前返回的路径都会经过 drop，因此进入与离开总是成对出现

use crate::hal::{intr_enter, intr_exit};
use core::cell::{RefCell, RefMut, UnsafeCell};
use core::mem::ManuallyDrop;
use core::ops::{Deref, DerefMut};

/// 基于 `UnsafeCell` 的最底层 UP 内部可变性封装
///
/// ## Safety
/// - 使用者必须保证不会出现并发或中断竞争
pub struct UPSafeCellRaw<T> {
    inner: UnsafeCell<T>,
}

unsafe impl<T> Sync for UPSafeCellRaw<T> {}

impl<T> UPSafeCellRaw<T> {
    /// ## Safety
    /// - 调用者必须保证后续访问满足 UP 假设
    pub const unsafe fn new(value: T) -> Self {
        Self {
            inner: UnsafeCell::new(value),
        }
    }

    #[allow(clippy::mut_from_ref)]
    pub fn get_mut(&self) -> &mut T {
        unsafe { &mut (*self.inner.get()) }
    }
}

/// 在访问期间自动关闭中断的 UP 内部可变性封装
///
/// ## Overview
/// 使用 `RefCell` 提供动态借用检查，
/// 并在进入临界区时屏蔽中断，防止中断导致的数据竞争
pub struct UPIntrFreeCell<T> {
    inner: RefCell<T>,
}

unsafe impl<T> Sync for UPIntrFreeCell<T> {}

unsafe impl<T> Send for UPIntrFreeCell<T> {}

/// `UPIntrFreeCell` 的可变借用守卫
///
/// 生命周期内中断始终被屏蔽
pub struct UPIntrRefMut<'a, T>(ManuallyDrop<RefMut<'a, T>>);

impl<T> UPIntrFreeCell<T> {
    /// ## Safety
    /// - 使用者需保证仅在 UP 环境下使用
    pub unsafe fn new(value: T) -> Self {
        Self {
            inner: RefCell::new(value),
        }
    }

    /// 获取内部数据的独占访问权
    ///
    /// ## Behavior
    /// - 屏蔽中断
    /// - 获取 RefCell 的可变借用，借用冲突将 panic
    pub fn exclusive_access(&self) -> UPIntrRefMut<'_, T> {
        intr_enter();
        match self.inner.try_borrow_mut() {
            Ok(inner) => UPIntrRefMut(ManuallyDrop::new(inner)),
            Err(_) => {
                // 守卫尚未构造，需手动配对退出
                intr_exit();
                panic!("UPIntrFreeCell is already borrowed");
            }
        }
    }

    /// 在独占访问会话中执行闭包
    pub fn exclusive_session<F, V>(&self, f: F) -> V
    where
        F: FnOnce(&mut T) -> V,
    {
        let mut inner = self.exclusive_access();
        f(inner.deref_mut())
    }
}

impl<'a, T> Drop for UPIntrRefMut<'a, T> {
    fn drop(&mut self) {
        // 借用必须先于中断恢复释放
        unsafe { ManuallyDrop::drop(&mut self.0) };
        intr_exit();
    }
}

impl<'a, T> Deref for UPIntrRefMut<'a, T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        &**self.0
    }
}

impl<'a, T> DerefMut for UPIntrRefMut<'a, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut **self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::intr_enabled;

    #[test]
    fn access_masks_interrupts_until_guard_drops() {
        let cell = unsafe { UPIntrFreeCell::new(0usize) };
        {
            let mut v = cell.exclusive_access();
            assert!(!intr_enabled());
            *v += 1;
        }
        assert!(intr_enabled());
        assert_eq!(cell.exclusive_session(|v| *v), 1);
    }

    #[test]
    fn early_return_still_leaves_critical_section() {
        fn bump_if_even(cell: &UPIntrFreeCell<usize>) -> Result<(), ()> {
            let mut v = cell.exclusive_access();
            if *v % 2 == 1 {
                return Err(());
            }
            *v += 1;
            Ok(())
        }

        let cell = unsafe { UPIntrFreeCell::new(0usize) };
        assert_eq!(bump_if_even(&cell), Ok(()));
        assert_eq!(bump_if_even(&cell), Err(()));
        assert!(intr_enabled());
    }

    #[test]
    fn distinct_cells_nest() {
        let outer = unsafe { UPIntrFreeCell::new(1usize) };
        let inner = unsafe { UPIntrFreeCell::new(2usize) };
        let sum = outer.exclusive_session(|a| *a + inner.exclusive_session(|b| *b));
        assert_eq!(sum, 3);
        assert!(intr_enabled());
    }

    #[test]
    fn critical_sections_on_different_host_threads_do_not_overlap() {
        let cell = unsafe { UPIntrFreeCell::new(0usize) };
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..1000 {
                        let mut v = cell.exclusive_access();
                        let seen = *v;
                        std::thread::yield_now();
                        *v = seen + 1;
                    }
                    assert!(intr_enabled());
                });
            }
        });
        assert_eq!(cell.exclusive_session(|v| *v), 4000);
    }

    #[test]
    #[should_panic]
    fn reentrant_access_to_same_cell_panics() {
        let cell = unsafe { UPIntrFreeCell::new(0usize) };
        let _a = cell.exclusive_access();
        let _b = cell.exclusive_access();
    }
}
