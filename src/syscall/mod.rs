//! # 系统调用层
//!
//! 把信号量表以整数 ABI 的形式暴露给任务：句柄为非负整数，
//! 失败时返回负值。

mod sync;

pub use sync::{
    sys_semaphore_create, sys_semaphore_delete, sys_semaphore_give, sys_semaphore_take,
    SEM_ID_INVALID,
};
