//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 回环射频设备
//!
//! 没有真实射频硬件时使用（主机测试、板级调试）：
//! - 发送的帧立即写入自己的接收环形缓冲区，就像空中有另一台设备收到了它
//! - `inject()` 模拟外部发送者
//! - 已登记属主时，向属主投递 `RADIO_PKT_RCV`；未登记时索引进入待处理队列，
//!   由 `poll()` 取出

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use log::debug;
use spin::Mutex;

use super::{RadioPacket, RadioStats, RxEntry, Transceiver};
use crate::collection::FixedRing;
use crate::config::{RADIO_MAX_DATA_LENGTH, RADIO_RX_BUF_SIZE};
use crate::sync::IrqMutex;
use crate::task::{Msg, MsgType, Platform, TaskId};

/// 回环帧默认的信号强度
pub const LOOPBACK_RSSI: u8 = 0x7f;

struct RxRing {
    entries: [RxEntry; RADIO_RX_BUF_SIZE],
    next: usize,
    /// 未登记属主时积压的接收索引
    pending: FixedRing<u8, RADIO_RX_BUF_SIZE>,
}

/// 回环射频设备
pub struct LoopbackRadio<'a> {
    platform: &'a dyn Platform,
    owner: Mutex<Option<TaskId>>,
    rx: IrqMutex<RxRing>,
    stats: Mutex<RadioStats>,
    tx_fail: AtomicBool,
    rssi: AtomicU8,
}

impl<'a> LoopbackRadio<'a> {
    pub fn new(platform: &'a dyn Platform) -> Self {
        Self {
            platform,
            owner: Mutex::new(None),
            rx: IrqMutex::new(RxRing {
                entries: [RxEntry::empty(); RADIO_RX_BUF_SIZE],
                next: 0,
                pending: FixedRing::new(),
            }),
            stats: Mutex::new(RadioStats::default()),
            tx_fail: AtomicBool::new(false),
            rssi: AtomicU8::new(LOOPBACK_RSSI),
        }
    }

    /// 模拟外部发送者发来一帧
    ///
    /// # 返回
    /// 帧所在的接收缓冲区索引；数据超过帧容量时返回 None
    pub fn inject(&self, rssi: u8, payload: &[u8]) -> Option<u8> {
        let packet = RadioPacket::broadcast(payload)?;
        Some(self.receive(rssi, packet))
    }

    /// 取出一个未通知过属主的接收索引
    pub fn poll(&self) -> Option<u8> {
        self.rx.lock().pending.pop()
    }

    /// 让后续的发送全部失败（模拟射频忙 / 硬件故障）
    pub fn set_tx_fail(&self, fail: bool) {
        self.tx_fail.store(fail, Ordering::Release);
    }

    /// 回环帧使用的信号强度
    pub fn set_rssi(&self, rssi: u8) {
        self.rssi.store(rssi, Ordering::Release);
    }

    pub fn owner(&self) -> Option<TaskId> {
        *self.owner.lock()
    }

    pub fn stats(&self) -> RadioStats {
        *self.stats.lock()
    }

    /// 重置统计信息
    pub fn reset_stats(&self) {
        *self.stats.lock() = RadioStats::default();
    }

    /// 写入接收环形缓冲区并通知属主（相当于接收中断）
    fn receive(&self, rssi: u8, packet: RadioPacket) -> u8 {
        let index = {
            let mut rx = self.rx.lock();
            let index = rx.next;
            rx.entries[index] = RxEntry { rssi, packet };
            rx.next = (index + 1) % RADIO_RX_BUF_SIZE;
            index as u8
        };

        {
            let mut stats = self.stats.lock();
            stats.rx_packets += 1;
            stats.rx_bytes += packet.payload_len() as u64;
        }

        match self.owner() {
            Some(owner) => {
                let msg = Msg::new(MsgType::RADIO_PKT_RCV, index as u32);
                if !self.platform.msg_try_send(owner, msg) {
                    debug!("loopback: owner queue full, rx {} dropped", index);
                    self.stats.lock().rx_dropped += 1;
                }
            }
            None => {
                let mut rx = self.rx.lock();
                if rx.pending.is_full() {
                    // 最旧的索引已经被新帧覆盖
                    rx.pending.pop();
                    self.stats.lock().rx_dropped += 1;
                }
                let _ = rx.pending.push(index);
            }
        }
        index
    }
}

impl Transceiver for LoopbackRadio<'_> {
    fn init(&self, owner: TaskId) {
        *self.owner.lock() = Some(owner);
    }

    fn send(&self, packet: &RadioPacket) -> i32 {
        if self.tx_fail.load(Ordering::Acquire) {
            self.stats.lock().tx_errors += 1;
            return -1;
        }

        let len = packet.payload_len();
        {
            let mut stats = self.stats.lock();
            stats.tx_packets += 1;
            stats.tx_bytes += len as u64;
        }

        self.receive(self.rssi.load(Ordering::Acquire), *packet);
        len as i32
    }

    fn rx_entry(&self, index: u8) -> Option<RxEntry> {
        let index = index as usize;
        if index >= RADIO_RX_BUF_SIZE {
            return None;
        }
        Some(self.rx.lock().entries[index])
    }
}

const _: () = assert!(RADIO_RX_BUF_SIZE <= u8::MAX as usize && RADIO_MAX_DATA_LENGTH <= 252);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::host::HostPlatform;

    #[test]
    fn test_send_loops_back() {
        let platform = HostPlatform::new();
        let radio = LoopbackRadio::new(&platform);

        let packet = RadioPacket::broadcast(b"hello").unwrap();
        assert_eq!(radio.send(&packet), 5);

        let index = radio.poll().unwrap();
        let entry = radio.rx_entry(index).unwrap();
        assert_eq!(entry.packet.payload(), b"hello");
        assert_eq!(entry.rssi, LOOPBACK_RSSI);

        let stats = radio.stats();
        assert_eq!(stats.tx_packets, 1);
        assert_eq!(stats.rx_packets, 1);
        assert_eq!(stats.tx_bytes, 5);
    }

    #[test]
    fn test_loopback_rssi() {
        let platform = HostPlatform::new();
        let radio = LoopbackRadio::new(&platform);
        radio.set_rssi(0x10);

        radio.send(&RadioPacket::broadcast(b"near").unwrap());
        let entry = radio.rx_entry(radio.poll().unwrap()).unwrap();
        assert_eq!(entry.rssi, 0x10);
    }

    #[test]
    fn test_tx_fail() {
        let platform = HostPlatform::new();
        let radio = LoopbackRadio::new(&platform);
        radio.set_tx_fail(true);

        let packet = RadioPacket::broadcast(b"x").unwrap();
        assert!(radio.send(&packet) <= 0);
        assert!(radio.poll().is_none());
        assert_eq!(radio.stats().tx_errors, 1);
    }

    #[test]
    fn test_notifies_owner() {
        let platform = HostPlatform::new();
        let radio = LoopbackRadio::new(&platform);
        let me = platform.current_task();
        radio.init(me);

        let index = radio.inject(42, b"abc").unwrap();
        assert!(radio.poll().is_none());
        assert_eq!(
            platform.msg_try_receive(),
            Some(Msg::new(MsgType::RADIO_PKT_RCV, index as u32))
        );
        assert_eq!(radio.rx_entry(index).unwrap().rssi, 42);
    }

    #[test]
    fn test_rx_entry_out_of_range() {
        let platform = HostPlatform::new();
        let radio = LoopbackRadio::new(&platform);
        assert!(radio.rx_entry(RADIO_RX_BUF_SIZE as u8).is_none());
    }

    #[test]
    fn test_reset_stats() {
        let platform = HostPlatform::new();
        let radio = LoopbackRadio::new(&platform);
        radio.inject(1, b"a").unwrap();
        radio.reset_stats();
        assert_eq!(radio.stats(), RadioStats::default());
    }
}
