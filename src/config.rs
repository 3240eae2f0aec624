/// 信号量表的槽位数量，同时也是每个等待队列的默认容量
pub const MAX_SEMS: usize = 10;
