//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 射频收发器接口
//!
//! 网络层与收发器驱动之间的边界：
//! - `init(owner)`：登记接收通知的目标任务
//! - `send(frame)`：发送一帧，返回已发送的数据长度或负数错误码
//! - 收到帧时驱动向属主投递 `RADIO_PKT_RCV` 消息，value 为接收缓冲区索引，
//!   网络层再通过 `rx_entry(index)` 把这一帧复制出来

pub mod loopback;

use crate::config::{RADIO_BROADCAST_ADDRESS, RADIO_HEADER_LENGTH, RADIO_MAX_DATA_LENGTH};
use crate::task::TaskId;

pub use loopback::LoopbackRadio;

/// 射频帧
///
/// `length` 包含 3 字节帧头（length、address、flags）
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RadioPacket {
    pub length: u8,
    pub address: u8,
    pub flags: u8,
    pub data: [u8; RADIO_MAX_DATA_LENGTH],
}

impl RadioPacket {
    pub const fn empty() -> Self {
        Self {
            length: 0,
            address: 0,
            flags: 0,
            data: [0u8; RADIO_MAX_DATA_LENGTH],
        }
    }

    /// 构造一个广播帧；数据超过帧容量时返回 None
    pub fn broadcast(payload: &[u8]) -> Option<Self> {
        if payload.len() > RADIO_MAX_DATA_LENGTH {
            return None;
        }
        let mut packet = Self::empty();
        packet.length = (payload.len() + RADIO_HEADER_LENGTH) as u8;
        packet.address = RADIO_BROADCAST_ADDRESS;
        packet.flags = 0;
        packet.data[..payload.len()].copy_from_slice(payload);
        Some(packet)
    }

    /// 数据区长度（不含帧头）
    pub fn payload_len(&self) -> usize {
        (self.length as usize)
            .saturating_sub(RADIO_HEADER_LENGTH)
            .min(RADIO_MAX_DATA_LENGTH)
    }

    pub fn payload(&self) -> &[u8] {
        &self.data[..self.payload_len()]
    }
}

/// 驱动接收缓冲区中的一项
#[derive(Debug, Clone, Copy)]
pub struct RxEntry {
    /// 接收信号强度
    pub rssi: u8,
    pub packet: RadioPacket,
}

impl RxEntry {
    pub const fn empty() -> Self {
        Self {
            rssi: 0,
            packet: RadioPacket::empty(),
        }
    }
}

/// 收发器统计信息
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RadioStats {
    /// 接收帧数
    pub rx_packets: u64,
    /// 发送帧数
    pub tx_packets: u64,
    /// 接收字节数
    pub rx_bytes: u64,
    /// 发送字节数
    pub tx_bytes: u64,
    /// 发送错误数
    pub tx_errors: u64,
    /// 通知属主失败而丢弃的帧
    pub rx_dropped: u64,
}

/// 射频收发器
///
/// `rx_entry` 会在屏蔽中断的临界区内调用，必须是常数时间的复制
pub trait Transceiver: Sync {
    /// 登记接收通知的目标任务
    fn init(&self, owner: TaskId);

    /// 发送一帧
    ///
    /// # 返回
    /// 成功返回已发送的数据长度（不含帧头），失败返回 0 或负数
    fn send(&self, packet: &RadioPacket) -> i32;

    /// 读取接收缓冲区中索引为 `index` 的帧
    fn rx_entry(&self, index: u8) -> Option<RxEntry>;
}
