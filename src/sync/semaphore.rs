//! # 信号量（Semaphore）同步原语模块
//!
//! ## Overview
//! 本模块实现了一张 **固定容量的计数型信号量表**。
//! 每个槽位持有一个信号量：可用计数、上限以及独占的等待队列；
//! 对外只暴露槽位下标 [`SemId`] 作为句柄。
//!
//! ## Assumptions
//! - 系统运行在单处理器环境下
//! - 任务并发仅来源于中断或显式调度点
//! - `UPIntrFreeCell` 能通过关中断保证临界区互斥
//!
//! ## Invariants
//! - 句柄按 0, 1, 2, ... 单调分配；高水位达到 `N` 后创建永久失败，
//!   删除不会归还槽位
//! - `count <= max_count`
//! - 在任何临界区之外观察：`count > 0` 与等待队列非空互斥
//! - `count` 与等待队列只在临界区内读写
//!
//! ## Behavior
//! - `take`：
//!   - 有可用资源则立即减一返回
//!   - 否则在临界区内入队，离开临界区后请求调度器挂起调用者
//! - `give`：
//!   - 有等待者则把资源直接交给队首任务，计数不变
//!   - 否则计数加一，达到上限后饱和而不回绕
//! - `delete`：
//!   - 有等待者时拒绝（`Busy`），否则将槽位退役

use crate::config::MAX_SEMS;
use crate::sync::queue::{QueueError, WaitQueue};
use crate::sync::UPIntrFreeCell;
use crate::task::{SchedRequest, Scheduler, Tid};
use core::fmt;
use lazy_static::lazy_static;
use log::{debug, warn};
use num_enum::TryFromPrimitive;

lazy_static! {
    /// 全局信号量表
    pub static ref SEM_TABLE: SemaphoreTable = SemaphoreTable::new();
}

/// 信号量句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SemId(pub usize);

impl SemId {
    /// 无效句柄哨兵
    pub const INVALID: SemId = SemId(usize::MAX);

    pub fn is_invalid(self) -> bool {
        self == Self::INVALID
    }
}

impl fmt::Display for SemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_invalid() {
            f.write_str("sem <invalid>")
        } else {
            write!(f, "sem {}", self.0)
        }
    }
}

/// 信号量的初始状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(usize)]
pub enum SemState {
    /// 初始无可用资源
    Empty = 0,
    /// 初始资源全部可用
    Full = 1,
}

/// `take` 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquire {
    /// 资源可用，未阻塞
    Immediate,
    /// 调用者已入队并交给调度器挂起，资源将由 `give` 直接移交
    Blocked,
}

/// `give` 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// 资源移交给了被唤醒的队首任务
    Woke(Tid),
    /// 无等待者，计数加一
    Stored,
    /// 无等待者且计数已达上限，本次释放被丢弃
    Saturated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemError {
    /// 信号量表高水位已达上限
    TableFull,
    /// 上限为 0
    InvalidCapacity,
    /// 无法识别的初始状态编码
    InvalidState,
    /// 等待队列初始化失败，对应槽位已被消耗
    QueueInit(QueueError),
    /// 句柄越界、从未创建或已删除
    InvalidHandle(SemId),
    /// 仍有任务阻塞在该信号量上
    Busy,
    /// 等待队列已满
    QueueFull,
    /// 需要阻塞，但当前没有正在运行的任务
    NoCurrentTask,
}

impl SemError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TableFull => "semaphore table is full",
            Self::InvalidCapacity => "semaphore capacity must be non-zero",
            Self::InvalidState => "unknown semaphore start state",
            Self::QueueInit(_) => "cannot initialize wait queue",
            Self::InvalidHandle(_) => "no such semaphore",
            Self::Busy => "semaphore still has waiters",
            Self::QueueFull => "semaphore wait queue is full",
            Self::NoCurrentTask => "no running task to block",
        }
    }

    /// 系统调用返回的负错误码
    pub fn errno(&self) -> isize {
        match self {
            Self::NoCurrentTask => -3,                         // ESRCH
            Self::InvalidHandle(_) => -9,                      // EBADF
            Self::QueueFull => -11,                            // EAGAIN
            Self::QueueInit(_) => -12,                         // ENOMEM
            Self::Busy => -16,                                 // EBUSY
            Self::InvalidCapacity | Self::InvalidState => -22, // EINVAL
            Self::TableFull => -24,                            // EMFILE
        }
    }
}

impl fmt::Display for SemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueueInit(err) => write!(f, "{}: {}", self.as_str(), err),
            Self::InvalidHandle(id) => write!(f, "{}: {}", self.as_str(), id),
            _ => f.write_str(self.as_str()),
        }
    }
}

struct SemaphoreInner {
    id: SemId,
    count: usize,
    max_count: usize,
    wait_queue: WaitQueue,
}

enum Slot {
    /// 尚未分配
    Vacant,
    Live(SemaphoreInner),
    /// 已删除，或创建时等待队列初始化失败；永不复用
    Retired,
}

struct SemaphoreTableInner<const N: usize> {
    next_id: usize,
    slots: [Slot; N],
}

impl<const N: usize> SemaphoreTableInner<N> {
    fn live(&self, id: SemId) -> Result<&SemaphoreInner, SemError> {
        match self.slots.get(id.0) {
            Some(Slot::Live(sem)) => Ok(sem),
            _ => Err(SemError::InvalidHandle(id)),
        }
    }

    fn live_mut(&mut self, id: SemId) -> Result<&mut SemaphoreInner, SemError> {
        match self.slots.get_mut(id.0) {
            Some(Slot::Live(sem)) => {
                debug_assert_eq!(sem.id, id);
                Ok(sem)
            }
            _ => Err(SemError::InvalidHandle(id)),
        }
    }
}

/// 固定容量的信号量表
///
/// `N` 为槽位数，同时也是默认的等待队列容量
pub struct SemaphoreTable<const N: usize = MAX_SEMS> {
    queue_capacity: usize,
    inner: UPIntrFreeCell<SemaphoreTableInner<N>>,
}

impl<const N: usize> SemaphoreTable<N> {
    pub fn new() -> Self {
        Self::with_queue_capacity(N)
    }

    /// 指定每个信号量等待队列的容量
    pub fn with_queue_capacity(queue_capacity: usize) -> Self {
        Self {
            queue_capacity,
            inner: unsafe {
                UPIntrFreeCell::new(SemaphoreTableInner {
                    next_id: 0,
                    slots: core::array::from_fn(|_| Slot::Vacant),
                })
            },
        }
    }

    /// 创建一个信号量
    ///
    /// ## Parameters
    /// - `max_count`：资源上限，`give` 不会让计数超过它
    /// - `state`：`Empty` 时初始计数为 0，`Full` 时为 `max_count`
    ///
    /// ## Behavior
    /// - 高水位在每次容量内的尝试中恰好前进一次
    /// - 等待队列初始化失败时槽位被标记为退役，句柄不会对外可用
    pub fn create(&self, max_count: usize, state: SemState) -> Result<SemId, SemError> {
        if max_count == 0 {
            return Err(SemError::InvalidCapacity);
        }
        let mut inner = self.inner.exclusive_access();
        if inner.next_id >= N {
            warn!("semaphore table exhausted ({} slots)", N);
            return Err(SemError::TableFull);
        }
        let id = SemId(inner.next_id);
        inner.next_id += 1;

        let wait_queue = match WaitQueue::with_capacity(self.queue_capacity) {
            Ok(queue) => queue,
            Err(err) => {
                inner.slots[id.0] = Slot::Retired;
                warn!("{}: {}, slot retired", id, err);
                return Err(SemError::QueueInit(err));
            }
        };
        let count = match state {
            SemState::Empty => 0,
            SemState::Full => max_count,
        };
        inner.slots[id.0] = Slot::Live(SemaphoreInner {
            id,
            count,
            max_count,
            wait_queue,
        });
        debug!("{} created, count {}/{}", id, count, max_count);
        Ok(id)
    }

    /// 获取一个资源，必要时阻塞
    ///
    /// ## Behavior
    /// - 入队发生在离开临界区之前；挂起请求在离开之后投递，
    ///   因此中断中的 `give` 看到的总是一致的队列
    /// - 返回 `Acquire::Blocked` 时，调用者已被移交给调度器，
    ///   被唤醒即意味着已持有资源
    pub fn take<S: Scheduler + ?Sized>(
        &self,
        id: SemId,
        sched: &S,
    ) -> Result<Acquire, SemError> {
        let mut inner = self.inner.exclusive_access();
        let sem = inner.live_mut(id)?;
        if sem.count > 0 {
            sem.count -= 1;
            return Ok(Acquire::Immediate);
        }
        let tid = sched.current_task().ok_or(SemError::NoCurrentTask)?;
        sem.wait_queue.enqueue(tid).map_err(|_| SemError::QueueFull)?;
        drop(inner);

        debug!("{} waits on {}", tid, id);
        sched.submit(SchedRequest::Block(tid));
        Ok(Acquire::Blocked)
    }

    /// 不阻塞地尝试获取一个资源
    pub fn try_take(&self, id: SemId) -> Result<bool, SemError> {
        let mut inner = self.inner.exclusive_access();
        let sem = inner.live_mut(id)?;
        if sem.count > 0 {
            sem.count -= 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// 释放一个资源，不会阻塞
    ///
    /// ## Behavior
    /// - 出队与唤醒请求都在临界区内完成，
    ///   与之竞争的 `delete` 不可能在其后插入
    pub fn give<S: Scheduler + ?Sized>(
        &self,
        id: SemId,
        sched: &S,
    ) -> Result<Release, SemError> {
        let mut inner = self.inner.exclusive_access();
        let sem = inner.live_mut(id)?;
        if let Some(waiter) = sem.wait_queue.dequeue() {
            sched.submit(SchedRequest::Unblock(waiter));
            debug!("{} handed to {}", id, waiter);
            return Ok(Release::Woke(waiter));
        }
        if sem.count < sem.max_count {
            sem.count += 1;
            Ok(Release::Stored)
        } else {
            warn!("{} already at its maximum {}", id, sem.max_count);
            Ok(Release::Saturated)
        }
    }

    /// 删除一个信号量
    ///
    /// ## Behavior
    /// - 忙检查与退役在同一个临界区内完成
    /// - 槽位不会被复用
    pub fn delete(&self, id: SemId) -> Result<(), SemError> {
        let mut inner = self.inner.exclusive_access();
        let waiters = inner.live(id)?.wait_queue.len();
        if waiters > 0 {
            warn!("refuse to delete {}: {} waiter(s)", id, waiters);
            return Err(SemError::Busy);
        }
        inner.slots[id.0] = Slot::Retired;
        debug!("{} deleted", id);
        Ok(())
    }

    pub fn count(&self, id: SemId) -> Result<usize, SemError> {
        Ok(self.inner.exclusive_access().live(id)?.count)
    }

    pub fn max_count(&self, id: SemId) -> Result<usize, SemError> {
        Ok(self.inner.exclusive_access().live(id)?.max_count)
    }

    /// 阻塞在该信号量上的任务数
    pub fn waiters(&self, id: SemId) -> Result<usize, SemError> {
        Ok(self.inner.exclusive_access().live(id)?.wait_queue.len())
    }

    pub fn is_live(&self, id: SemId) -> bool {
        self.inner.exclusive_access().live(id).is_ok()
    }

    /// 已经消耗的槽位数
    pub fn high_water(&self) -> usize {
        self.inner.exclusive_access().next_id
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for SemaphoreTable<N> {
    fn default() -> Self {
        Self::new()
    }
}
