//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 任务与平台接口
//!
//! 网络层运行在一个抢占式 RTOS 之上，它需要的平台服务很少：
//! - 当前任务标识（套接字的属主）
//! - 每个任务一个有界消息队列：非阻塞投递 `msg_try_send`，阻塞接收 `msg_receive`，
//!   非阻塞接收 `msg_try_receive`
//! - 创建网络层工作线程
//!
//! 这些服务通过 [`Platform`] trait 注入；[`host::HostPlatform`] 是基于 std 线程的实现。

pub mod msg;

#[cfg(any(test, feature = "std"))]
pub mod host;

use core::sync::atomic::{AtomicU32, Ordering};

pub use msg::{Mailbox, Msg, MsgTable, MsgType};

/// 任务标识上限
pub const TASK_ID_MAX_LIMIT: u32 = 1 << 22;

/// 任务标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u32);

impl TaskId {
    /// 未定义的任务（对应 KERNEL_PID_UNDEF）
    pub const UNDEF: TaskId = TaskId(0);

    pub const fn new(raw: u32) -> Self {
        TaskId(raw)
    }

    pub const fn as_u32(self) -> u32 {
        self.0
    }

    pub const fn is_undef(self) -> bool {
        self.0 == 0
    }
}

static NEXT_TASK_ID: AtomicU32 = AtomicU32::new(1);

/// 分配一个新的任务标识
pub fn alloc_task_id() -> Option<TaskId> {
    let id = NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed);
    if id >= TASK_ID_MAX_LIMIT {
        None
    } else {
        Some(TaskId(id))
    }
}

/// 平台服务
///
/// 所有方法都可能在任意任务中调用；`msg_try_send` 还会在持有
/// 套接字表锁（中断已屏蔽）时被调用，因此它必须是非阻塞、常数时间的。
pub trait Platform: Sync {
    /// 当前正在运行的任务
    fn current_task(&self) -> TaskId;

    /// 非阻塞地向 `target` 的消息队列投递一条消息
    ///
    /// 队列已满或目标不存在时返回 false
    fn msg_try_send(&self, target: TaskId, msg: Msg) -> bool;

    /// 阻塞等待当前任务的下一条消息（无超时）
    fn msg_receive(&self) -> Msg;

    /// 非阻塞地取出当前任务的下一条消息，队列为空时返回 None
    fn msg_try_receive(&self) -> Option<Msg>;

    /// 创建一个新任务运行 `entry`
    fn thread_create(&self, name: &'static str, entry: fn()) -> Option<TaskId>;
}
