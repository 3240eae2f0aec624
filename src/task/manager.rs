//! # 任务管理器
//!
//! ## Overview
//! 一个最小的协作式调度器，实现 [`Scheduler`] 接口，供信号量核心使用：
//! - 维护任务表（`Tid → 状态`）与 FIFO 就绪队列
//! - 记录当前正在运行的任务
//! - 按状态机处理 `Block` / `Unblock` 请求
//!
//! 所有状态均由 `UPIntrFreeCell` 保护。
//!
//! ## Assumptions
//! - 单处理器，任意时刻最多一个 `Running` 任务
//! - 并发仅来源于中断或显式调度点
//!
//! ## Invariants
//! - 就绪队列中的任务，其状态一定为 `Ready`
//! - `current` 为 `Some(t)` 时，`t` 的状态为 `Running`
//!
//! ## Behavior
//! - `take` 在离开临界区之后才投递 `Block`，期间中断可能已经通过
//!   `give` 投递了同一任务的 `Unblock`。此时唤醒被记为挂起标志，
//!   随后到达的 `Block` 直接消费该标志，任务继续运行，不会丢失唤醒。

use crate::sync::UPIntrFreeCell;
use crate::task::{SchedRequest, Scheduler, TaskStatus, Tid};
use alloc::collections::{BTreeMap, VecDeque};
use alloc::vec::Vec;
use lazy_static::lazy_static;

lazy_static! {
    /// 全局任务管理器
    pub static ref TASK_MANAGER: TaskManager = TaskManager::new();
}

struct TaskControl {
    status: TaskStatus,
    wakeup_pending: bool,
}

struct TaskManagerInner {
    tasks: BTreeMap<Tid, TaskControl>,
    ready_queue: VecDeque<Tid>,
    current: Option<Tid>,
    next_tid: usize,
}

pub struct TaskManager {
    inner: UPIntrFreeCell<TaskManagerInner>,
}

impl TaskManager {
    pub fn new() -> Self {
        Self {
            inner: unsafe {
                UPIntrFreeCell::new(TaskManagerInner {
                    tasks: BTreeMap::new(),
                    ready_queue: VecDeque::new(),
                    current: None,
                    next_tid: 0,
                })
            },
        }
    }

    /// 创建一个新任务并放入就绪队列尾部
    pub fn spawn(&self) -> Tid {
        let mut inner = self.inner.exclusive_access();
        let tid = Tid(inner.next_tid);
        inner.next_tid += 1;
        inner.tasks.insert(
            tid,
            TaskControl {
                status: TaskStatus::Ready,
                wakeup_pending: false,
            },
        );
        inner.ready_queue.push_back(tid);
        tid
    }

    /// 调度点：切换到就绪队列中的下一个任务
    ///
    /// ## Behavior
    /// - 当前任务仍在运行：让出 CPU，回到就绪队列尾部
    /// - 当前任务已阻塞：直接放弃
    /// - 取出就绪队列队首并置为 `Running`
    ///
    /// ## Returns
    /// - 新的当前任务；就绪队列为空时返回 `None`（CPU 空闲）
    pub fn schedule(&self) -> Option<Tid> {
        let mut inner = self.inner.exclusive_access();
        if let Some(prev) = inner.current.take() {
            let prev_ctl = inner.control_mut(prev);
            if prev_ctl.status == TaskStatus::Running {
                prev_ctl.status = TaskStatus::Ready;
                inner.ready_queue.push_back(prev);
            }
        }
        let next = inner.ready_queue.pop_front()?;
        inner.control_mut(next).status = TaskStatus::Running;
        inner.current = Some(next);
        log::trace!("switch to {}", next);
        Some(next)
    }

    pub fn current(&self) -> Option<Tid> {
        self.inner.exclusive_access().current
    }

    pub fn status(&self, tid: Tid) -> Option<TaskStatus> {
        self.inner
            .exclusive_session(|inner| inner.tasks.get(&tid).map(|ctl| ctl.status))
    }

    pub fn ready_len(&self) -> usize {
        self.inner.exclusive_access().ready_queue.len()
    }

    /// 就绪队列快照（按调度顺序）
    pub fn ready_tasks(&self) -> Vec<Tid> {
        self.inner
            .exclusive_session(|inner| inner.ready_queue.iter().copied().collect())
    }
}

impl Default for TaskManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskManagerInner {
    /// ## Panics
    /// - 未知的 tid 表示调用方传入了伪造的句柄，内核状态已不一致
    fn control_mut(&mut self, tid: Tid) -> &mut TaskControl {
        match self.tasks.get_mut(&tid) {
            Some(ctl) => ctl,
            None => {
                log::error!("unknown {}", tid);
                panic!("cannot find {} in task table!", tid);
            }
        }
    }

    fn block(&mut self, tid: Tid) {
        if self.current != Some(tid) {
            log::error!("block request for {} which is not running", tid);
            panic!("{} is not the running task", tid);
        }
        let ctl = self.control_mut(tid);
        if ctl.wakeup_pending {
            ctl.wakeup_pending = false;
            log::debug!("{} consumed an early wakeup", tid);
            return;
        }
        ctl.status = TaskStatus::Blocked;
        self.current = None;
        log::debug!("{} blocked", tid);
    }

    fn unblock(&mut self, tid: Tid) {
        let ctl = self.control_mut(tid);
        let status = ctl.status;
        match status {
            TaskStatus::Blocked => {
                ctl.status = TaskStatus::Ready;
                self.ready_queue.push_back(tid);
                log::debug!("{} woken", tid);
            }
            TaskStatus::Running if !ctl.wakeup_pending => {
                ctl.wakeup_pending = true;
                log::debug!("{} woken before it blocked", tid);
            }
            status => {
                log::error!("unblock request for {} in state {:?}", tid, status);
                panic!("{} is not waiting", tid);
            }
        }
    }
}

impl Scheduler for TaskManager {
    fn current_task(&self) -> Option<Tid> {
        self.current()
    }

    fn submit(&self, request: SchedRequest) {
        let mut inner = self.inner.exclusive_access();
        match request {
            SchedRequest::Block(tid) => inner.block(tid),
            SchedRequest::Unblock(tid) => inner.unblock(tid),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_robin_over_ready_tasks() {
        let tm = TaskManager::new();
        let a = tm.spawn();
        let b = tm.spawn();
        assert_eq!(tm.current(), None);
        assert_eq!(tm.schedule(), Some(a));
        assert_eq!(tm.status(a), Some(TaskStatus::Running));
        assert_eq!(tm.schedule(), Some(b));
        assert_eq!(tm.status(a), Some(TaskStatus::Ready));
        assert_eq!(tm.schedule(), Some(a));
        assert_eq!(tm.ready_tasks(), [b]);
    }

    #[test]
    fn blocked_task_leaves_cpu_until_unblocked() {
        let tm = TaskManager::new();
        let a = tm.spawn();
        tm.schedule();
        tm.submit(SchedRequest::Block(a));
        assert_eq!(tm.status(a), Some(TaskStatus::Blocked));
        assert_eq!(tm.current_task(), None);
        assert_eq!(tm.schedule(), None);

        tm.submit(SchedRequest::Unblock(a));
        assert_eq!(tm.status(a), Some(TaskStatus::Ready));
        assert_eq!(tm.ready_len(), 1);
        assert_eq!(tm.schedule(), Some(a));
    }

    #[test]
    fn wakeup_before_block_is_not_lost() {
        let tm = TaskManager::new();
        let a = tm.spawn();
        tm.schedule();
        tm.submit(SchedRequest::Unblock(a));
        tm.submit(SchedRequest::Block(a));
        assert_eq!(tm.status(a), Some(TaskStatus::Running));
        assert_eq!(tm.current(), Some(a));

        // 标志已被消费，下一次阻塞会真正挂起
        tm.submit(SchedRequest::Block(a));
        assert_eq!(tm.status(a), Some(TaskStatus::Blocked));
    }

    #[test]
    #[should_panic(expected = "is not the running task")]
    fn blocking_a_task_that_is_not_running_panics() {
        let tm = TaskManager::new();
        let a = tm.spawn();
        tm.submit(SchedRequest::Block(a));
    }

    #[test]
    #[should_panic(expected = "is not waiting")]
    fn unblocking_a_ready_task_panics() {
        let tm = TaskManager::new();
        let a = tm.spawn();
        tm.submit(SchedRequest::Unblock(a));
    }
}
