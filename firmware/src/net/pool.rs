//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 接收缓冲池
//!
//! 固定 `RCV_BUF_SIZE` 个槽位，每个槽位保存一帧的副本和一个引用计数
//! (`users`)。一帧可能同时排在多个套接字的队列里，`users` 就是持有它的
//! 队列数；`users == 0` 的槽位空闲。
//!
//! 所有操作都必须在持有池锁（`IrqMutex<PacketPool>`）时调用。
//! 与套接字表同时加锁时，顺序固定为：先套接字表，后缓冲池。

use crate::config::{RADIO_MAX_DATA_LENGTH, RCV_BUF_SIZE};
use crate::drivers::radio::RxEntry;
use crate::errno::NetError;

/// 槽位句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(usize);

impl SlotId {
    pub const fn index(self) -> usize {
        self.0
    }
}

/// 一帧接收数据的副本
#[derive(Debug, Clone, Copy)]
pub struct RadioPkt {
    users: u8,
    rssi: u8,
    length: usize,
    data: [u8; RADIO_MAX_DATA_LENGTH],
}

impl RadioPkt {
    const fn empty() -> Self {
        Self {
            users: 0,
            rssi: 0,
            length: 0,
            data: [0u8; RADIO_MAX_DATA_LENGTH],
        }
    }

    pub fn users(&self) -> u8 {
        self.users
    }

    pub fn rssi(&self) -> u8 {
        self.rssi
    }

    /// 数据区长度（不含射频帧头）
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// 有效数据
    pub fn data(&self) -> &[u8] {
        &self.data[..self.length]
    }
}

/// 接收缓冲池
pub struct PacketPool {
    slots: [RadioPkt; RCV_BUF_SIZE],
    /// 轮转游标：分配总是从上次停下的位置开始找
    cursor: usize,
}

impl PacketPool {
    pub const fn new() -> Self {
        Self {
            slots: [RadioPkt::empty(); RCV_BUF_SIZE],
            cursor: 0,
        }
    }

    /// 找一个空闲槽位
    ///
    /// 先检查游标所在的槽位，再依次向后，最多检查 `RCV_BUF_SIZE` 个。
    /// 返回的槽位 `users` 仍为 0，直到有套接字接收它。
    pub fn acquire_slot(&mut self) -> Result<SlotId, NetError> {
        for _ in 0..RCV_BUF_SIZE {
            if self.slots[self.cursor].users == 0 {
                return Ok(SlotId(self.cursor));
            }
            self.cursor = (self.cursor + 1) % RCV_BUF_SIZE;
        }
        Err(NetError::PoolExhausted)
    }

    /// 把驱动接收缓冲区中的一帧复制到槽位
    pub fn fill(&mut self, slot: SlotId, entry: &RxEntry) {
        let pkt = &mut self.slots[slot.0];
        pkt.rssi = entry.rssi;
        pkt.length = entry.packet.payload_len();
        pkt.data = entry.packet.data;
    }

    pub fn get(&self, slot: SlotId) -> &RadioPkt {
        &self.slots[slot.0]
    }

    /// 增加一个持有者
    pub fn retain(&mut self, slot: SlotId) {
        let pkt = &mut self.slots[slot.0];
        pkt.users = pkt.users.saturating_add(1);
    }

    /// 减少一个持有者；计数为 0 后槽位可被重用
    pub fn release(&mut self, slot: SlotId) {
        let pkt = &mut self.slots[slot.0];
        pkt.users = pkt.users.saturating_sub(1);
    }

    pub fn users(&self, slot: SlotId) -> u8 {
        self.slots[slot.0].users
    }

    /// 空闲槽位数
    pub fn free_slots(&self) -> usize {
        self.slots.iter().filter(|p| p.users == 0).count()
    }
}

impl Default for PacketPool {
    fn default() -> Self {
        Self::new()
    }
}
