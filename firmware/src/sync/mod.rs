//! 同步原语 (Synchronization Primitives)
//!
//! 网络层只需要两种锁：
//! - [`IrqMutex`]：屏蔽本地中断 + 自旋锁，保护会被中断上下文触及的状态
//!   （套接字表、接收缓冲池、任务消息队列）
//! - `spin::Mutex`：普通任务间互斥（共享发送缓冲区）

pub mod irq_mutex;

pub use irq_mutex::{IrqMutex, IrqMutexGuard};
