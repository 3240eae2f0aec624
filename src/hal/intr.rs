//! # 可嵌套中断屏蔽
//!
//! ## Overview
//! 记录当前 CPU 的中断屏蔽嵌套深度，以及最外层进入前的中断使能状态。
//! 只有最外层的 `exit` 才会恢复中断，因此临界区可以安全嵌套
//! （例如信号量表的临界区内再访问任务管理器）。
//!
//! ## Invariants
//! - `nested_level > 0` 期间中断必然关闭
//! - `exit` 次数永远不超过 `enter` 次数

use super::arch;

/// 单个 CPU 的中断屏蔽状态
pub struct IntrMaskingInfo {
    nested_level: usize,
    sie_before_masking: bool,
}

impl IntrMaskingInfo {
    pub const fn new() -> Self {
        Self {
            nested_level: 0,
            sie_before_masking: false,
        }
    }

    /// 进入一层屏蔽区
    ///
    /// 最外层进入时保存原有的中断使能状态
    pub fn enter(&mut self) {
        let sie = arch::intr_get();
        arch::intr_off();
        if self.nested_level == 0 {
            self.sie_before_masking = sie;
        }
        self.nested_level += 1;
    }

    /// 离开一层屏蔽区
    ///
    /// ## Panics
    /// - 未配对的 `exit` 表示内核状态已不一致
    pub fn exit(&mut self) {
        assert!(
            self.nested_level > 0,
            "intr_exit without matching intr_enter"
        );
        self.nested_level -= 1;
        if self.nested_level == 0 && self.sie_before_masking {
            arch::intr_on();
        }
    }

    pub fn nested_level(&self) -> usize {
        self.nested_level
    }
}

impl Default for IntrMaskingInfo {
    fn default() -> Self {
        Self::new()
    }
}

pub fn intr_enter() {
    arch::with_intr_masking_info(|info| info.enter());
}

pub fn intr_exit() {
    arch::with_intr_masking_info(|info| info.exit());
}

/// 当前 CPU 是否允许中断
pub fn intr_enabled() -> bool {
    arch::intr_get()
}
