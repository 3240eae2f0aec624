//! # 有界等待队列
//!
//! 每个信号量独占一个 `WaitQueue`，按到达顺序记录阻塞在其上的任务。
//! 队列容量在创建时一次性预留，之后的入队不再分配内存。

use crate::task::Tid;
use alloc::collections::VecDeque;
use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// 容量为 0 的队列没有意义
    ZeroCapacity,
    /// 无法预留所需的存储空间
    AllocFailed,
    /// 队列已满
    Full,
}

impl QueueError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ZeroCapacity => "wait queue capacity must be non-zero",
            Self::AllocFailed => "cannot reserve wait queue storage",
            Self::Full => "wait queue is full",
        }
    }
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 有界 FIFO 任务队列
#[derive(Debug)]
pub struct WaitQueue {
    capacity: usize,
    items: VecDeque<Tid>,
}

impl WaitQueue {
    /// 创建一个可容纳 `capacity` 个任务的空队列
    pub fn with_capacity(capacity: usize) -> Result<Self, QueueError> {
        if capacity == 0 {
            return Err(QueueError::ZeroCapacity);
        }
        let mut items = VecDeque::new();
        items
            .try_reserve_exact(capacity)
            .map_err(|_| QueueError::AllocFailed)?;
        Ok(Self { capacity, items })
    }

    /// 将任务追加到队尾
    pub fn enqueue(&mut self, tid: Tid) -> Result<(), QueueError> {
        if self.items.len() >= self.capacity {
            return Err(QueueError::Full);
        }
        self.items.push_back(tid);
        Ok(())
    }

    /// 取出队首任务
    pub fn dequeue(&mut self) -> Option<Tid> {
        self.items.pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_capacity_is_rejected() {
        assert_eq!(
            WaitQueue::with_capacity(0).unwrap_err(),
            QueueError::ZeroCapacity
        );
    }

    #[test]
    fn unreservable_capacity_is_rejected() {
        assert_eq!(
            WaitQueue::with_capacity(usize::MAX).unwrap_err(),
            QueueError::AllocFailed
        );
    }

    #[test]
    fn fifo_order_and_bound() {
        let mut q = WaitQueue::with_capacity(2).unwrap();
        q.enqueue(Tid(7)).unwrap();
        q.enqueue(Tid(3)).unwrap();
        assert_eq!(q.enqueue(Tid(9)), Err(QueueError::Full));
        assert_eq!(q.len(), 2);
        assert_eq!(q.dequeue(), Some(Tid(7)));
        q.enqueue(Tid(9)).unwrap();
        assert_eq!(q.dequeue(), Some(Tid(3)));
        assert_eq!(q.dequeue(), Some(Tid(9)));
        assert_eq!(q.dequeue(), None);
        assert!(q.is_empty());
        assert_eq!(q.capacity(), 2);
    }
}
