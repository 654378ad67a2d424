//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 主机平台：用 std 线程模拟 RTOS 任务
//!
//! - 每个 std 线程第一次调用 `current_task()` 时分配一个任务标识
//! - 消息队列保存在平台自己的 [`MsgTable`] 中
//! - `msg_receive` 用 yield 循环等待，和内核里 down() 反复 schedule() 的写法一致

use core::cell::Cell;
use core::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use log::warn;

use super::{alloc_task_id, Msg, MsgTable, Platform, TaskId};

thread_local! {
    static CURRENT: Cell<Option<TaskId>> = const { Cell::new(None) };
}

/// 当前线程的任务标识（首次调用时分配）
fn current_id() -> TaskId {
    CURRENT.with(|current| match current.get() {
        Some(id) => id,
        None => {
            let id = alloc_task_id().unwrap_or(TaskId::UNDEF);
            current.set(Some(id));
            id
        }
    })
}

/// 基于 std 线程的平台实现
pub struct HostPlatform {
    msgs: MsgTable,
    threads_created: AtomicUsize,
}

impl HostPlatform {
    pub const fn new() -> Self {
        Self {
            msgs: MsgTable::new(),
            threads_created: AtomicUsize::new(0),
        }
    }

    /// 通过本平台创建的线程数
    pub fn threads_created(&self) -> usize {
        self.threads_created.load(Ordering::Acquire)
    }

    /// 任务消息队列中未处理的消息数
    pub fn pending_msgs(&self, task: TaskId) -> usize {
        self.msgs.lookup(task).map(|m| m.len()).unwrap_or(0)
    }
}

impl Default for HostPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for HostPlatform {
    fn current_task(&self) -> TaskId {
        current_id()
    }

    fn msg_try_send(&self, target: TaskId, msg: Msg) -> bool {
        match self.msgs.register(target) {
            Some(mailbox) => mailbox.try_push(msg),
            None => false,
        }
    }

    fn msg_receive(&self) -> Msg {
        let me = current_id();
        loop {
            if let Some(msg) = self.msgs.register(me).and_then(|m| m.pop()) {
                return msg;
            }
            thread::yield_now();
        }
    }

    fn msg_try_receive(&self) -> Option<Msg> {
        self.msgs.register(current_id())?.pop()
    }

    fn thread_create(&self, name: &'static str, entry: fn()) -> Option<TaskId> {
        let id = alloc_task_id()?;
        // 先登记消息队列，线程启动前投递的消息不会丢失
        self.msgs.register(id)?;

        let spawned = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                CURRENT.with(|current| current.set(Some(id)));
                entry();
            });

        match spawned {
            Ok(_) => {
                self.threads_created.fetch_add(1, Ordering::AcqRel);
                Some(id)
            }
            Err(err) => {
                warn!("host: failed to spawn {}: {}", name, err);
                self.msgs.unregister(id);
                None
            }
        }
    }
}
