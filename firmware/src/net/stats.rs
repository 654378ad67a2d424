//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 网络层统计计数器
//!
//! 内部失败（缓冲池耗尽、通知通道饱和、发送失败）不会返回给任何调用者，
//! 只在这里计数。

use core::sync::atomic::{AtomicU64, Ordering};

use crate::errno::NetError;

/// 网络层计数器
#[derive(Debug, Default)]
pub struct NetStats {
    /// 缓冲池耗尽而丢弃的帧
    pub radio_buffer_full: AtomicU64,
    /// 收发器报告发送失败
    pub radio_send_fail: AtomicU64,
    /// 没有套接字接收的帧
    pub unhandled_packet: AtomicU64,
    /// 通知通道或套接字队列已满而没有投递的次数
    pub out_of_buffer: AtomicU64,
    /// 超过接收缓冲区长度而被丢弃的帧
    pub oversize_discard: AtomicU64,
    /// 头部损坏的数据报
    pub malformed: AtomicU64,
    /// 收到的帧
    pub rx_frames: AtomicU64,
    /// 成功发送的帧
    pub tx_frames: AtomicU64,
}

impl NetStats {
    pub const fn new() -> Self {
        Self {
            radio_buffer_full: AtomicU64::new(0),
            radio_send_fail: AtomicU64::new(0),
            unhandled_packet: AtomicU64::new(0),
            out_of_buffer: AtomicU64::new(0),
            oversize_discard: AtomicU64::new(0),
            malformed: AtomicU64::new(0),
            rx_frames: AtomicU64::new(0),
            tx_frames: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn inc(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// 记录一个内部失败
    pub fn record(&self, err: NetError) {
        match err {
            NetError::PoolExhausted => Self::inc(&self.radio_buffer_full),
            NetError::TransmitFailure => Self::inc(&self.radio_send_fail),
            NetError::SilentDrop => Self::inc(&self.out_of_buffer),
            _ => {}
        }
    }

    pub fn snapshot(&self) -> NetStatsSnapshot {
        NetStatsSnapshot {
            radio_buffer_full: self.radio_buffer_full.load(Ordering::Relaxed),
            radio_send_fail: self.radio_send_fail.load(Ordering::Relaxed),
            unhandled_packet: self.unhandled_packet.load(Ordering::Relaxed),
            out_of_buffer: self.out_of_buffer.load(Ordering::Relaxed),
            oversize_discard: self.oversize_discard.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
            rx_frames: self.rx_frames.load(Ordering::Relaxed),
            tx_frames: self.tx_frames.load(Ordering::Relaxed),
        }
    }
}

/// 计数器快照
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NetStatsSnapshot {
    pub radio_buffer_full: u64,
    pub radio_send_fail: u64,
    pub unhandled_packet: u64,
    pub out_of_buffer: u64,
    pub oversize_discard: u64,
    pub malformed: u64,
    pub rx_frames: u64,
    pub tx_frames: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_maps_to_counter() {
        let stats = NetStats::new();
        stats.record(NetError::PoolExhausted);
        stats.record(NetError::TransmitFailure);
        stats.record(NetError::SilentDrop);
        stats.record(NetError::SilentDrop);
        // 同步错误不计数
        stats.record(NetError::PortInUse);

        let snap = stats.snapshot();
        assert_eq!(snap.radio_buffer_full, 1);
        assert_eq!(snap.radio_send_fail, 1);
        assert_eq!(snap.out_of_buffer, 2);
        assert_eq!(
            NetStatsSnapshot {
                radio_buffer_full: 0,
                radio_send_fail: 0,
                out_of_buffer: 0,
                ..snap
            },
            NetStatsSnapshot::default()
        );
    }
}
