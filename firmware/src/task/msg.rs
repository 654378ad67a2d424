//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 任务间消息
//!
//! 每个任务拥有一个固定容量的消息队列 ([`Mailbox`])。投递方从不阻塞：
//! 队列满时投递失败，由调用方决定如何处理（网络层的做法是直接丢弃）。

use core::sync::atomic::{AtomicU32, Ordering};

use super::TaskId;
use crate::collection::FixedRing;
use crate::config::{MAX_TASKS, TASK_MSG_QUEUE_SIZE};
use crate::sync::IrqMutex;

/// 消息类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MsgType(pub u16);

impl MsgType {
    /// 收发器 -> 网络层工作线程：射频帧已到达，value 为驱动接收缓冲区索引
    pub const RADIO_PKT_RCV: MsgType = MsgType(0x0100);
    /// 分发器 -> 套接字属主：套接字有新数据，value 为套接字标识
    pub const NETL_RCV: MsgType = MsgType(0x0101);
}

/// 消息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Msg {
    pub kind: MsgType,
    pub value: u32,
}

impl Msg {
    pub const fn new(kind: MsgType, value: u32) -> Self {
        Self { kind, value }
    }
}

/// 任务消息队列
pub struct Mailbox {
    ring: IrqMutex<FixedRing<Msg, TASK_MSG_QUEUE_SIZE>>,
}

impl Mailbox {
    pub const fn new() -> Self {
        Self {
            ring: IrqMutex::new(FixedRing::new()),
        }
    }

    /// 非阻塞投递，队列满返回 false
    pub fn try_push(&self, msg: Msg) -> bool {
        self.ring.lock().push(msg).is_ok()
    }

    pub fn pop(&self) -> Option<Msg> {
        self.ring.lock().pop()
    }

    pub fn len(&self) -> usize {
        self.ring.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 丢弃所有未处理的消息
    pub fn clear(&self) {
        self.ring.lock().clear();
    }
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}

struct MsgEntry {
    /// 属主任务，0 表示空闲
    owner: AtomicU32,
    mailbox: Mailbox,
}

impl MsgEntry {
    const fn new() -> Self {
        Self {
            owner: AtomicU32::new(0),
            mailbox: Mailbox::new(),
        }
    }
}

/// 任务消息队列表
///
/// 固定 `MAX_TASKS` 项；任务第一次收发消息时占用一项（对应 msg_init_queue）
pub struct MsgTable {
    entries: [MsgEntry; MAX_TASKS],
}

impl MsgTable {
    pub const fn new() -> Self {
        #[allow(clippy::declare_interior_mutable_const)]
        const EMPTY: MsgEntry = MsgEntry::new();
        Self {
            entries: [EMPTY; MAX_TASKS],
        }
    }

    /// 查找任务的消息队列
    pub fn lookup(&self, task: TaskId) -> Option<&Mailbox> {
        if task.is_undef() {
            return None;
        }
        self.entries
            .iter()
            .find(|e| e.owner.load(Ordering::Acquire) == task.as_u32())
            .map(|e| &e.mailbox)
    }

    /// 查找或登记任务的消息队列；表满时返回 None
    pub fn register(&self, task: TaskId) -> Option<&Mailbox> {
        if let Some(mailbox) = self.lookup(task) {
            return Some(mailbox);
        }
        if task.is_undef() {
            return None;
        }
        for entry in self.entries.iter() {
            match entry.owner.compare_exchange(
                0,
                task.as_u32(),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Some(&entry.mailbox),
                // 并发登记了同一个任务
                Err(owner) if owner == task.as_u32() => return Some(&entry.mailbox),
                Err(_) => continue,
            }
        }
        None
    }

    /// 注销任务，丢弃其未处理的消息
    pub fn unregister(&self, task: TaskId) {
        for entry in self.entries.iter() {
            if entry.owner.load(Ordering::Acquire) == task.as_u32() {
                entry.mailbox.clear();
                entry.owner.store(0, Ordering::Release);
            }
        }
    }
}

impl Default for MsgTable {
    fn default() -> Self {
        Self::new()
    }
}
