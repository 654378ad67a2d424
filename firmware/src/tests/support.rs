//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 测试台

use crate::config::MAX_DATA_SIZE;
use crate::drivers::radio::LoopbackRadio;
use crate::net::datagram::build_datagram;
use crate::net::{NetLayer, Port};
use crate::task::host::HostPlatform;

/// 外部发送者的信号强度
pub const EXTERNAL_RSSI: u8 = 0x21;

/// 独立的网络层实例
///
/// 收发器不登记属主：收到的帧积压在回环设备里，由 `pump()` 手动处理，
/// 相当于测试线程充当工作线程。
pub struct Rig {
    pub platform: &'static HostPlatform,
    pub radio: &'static LoopbackRadio<'static>,
    pub net: NetLayer<'static>,
}

/// 创建测试台
///
/// 返回 'static 引用，可以直接交给其他线程
pub fn rig() -> &'static Rig {
    let platform: &'static HostPlatform = Box::leak(Box::new(HostPlatform::new()));
    let radio: &'static LoopbackRadio<'static> =
        Box::leak(Box::new(LoopbackRadio::new(platform)));
    Box::leak(Box::new(Rig {
        platform,
        radio,
        net: NetLayer::new(radio, platform),
    }))
}

impl Rig {
    /// 处理回环设备中积压的所有帧，返回投递总数
    pub fn pump(&self) -> usize {
        let mut delivered = 0;
        while let Some(index) = self.radio.poll() {
            if let Ok(result) = self.net.handle_radio_event(index) {
                delivered += result.delivered;
            }
        }
        delivered
    }

    /// 模拟外部设备发送一个数据报
    pub fn external_send(&self, dst: Port, src: Port, payload: &[u8]) {
        let mut frame = [0u8; MAX_DATA_SIZE];
        let len = build_datagram(&mut frame, dst, src, payload).unwrap();
        self.radio.inject(EXTERNAL_RSSI, &frame[..len]).unwrap();
    }

    /// 模拟外部设备发送任意帧
    pub fn external_raw(&self, frame: &[u8]) {
        self.radio.inject(EXTERNAL_RSSI, frame).unwrap();
    }
}
