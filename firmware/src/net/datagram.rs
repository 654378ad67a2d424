//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 数据报协议
//!
//! 精简版 UDP：没有 IP 层，也没有校验和（射频层有自己的 CRC）。
//!
//! # 线路格式（网络字节序）
//! ```text
//! | dst_port: 16 | src_port: 16 | length: 16 | payload: length 字节 |
//! ```

use crate::errno::NetError;

/// 数据报头部长度
pub const DGRAM_HLEN: usize = 6;

/// 端口号
pub type Port = u16;

/// 数据报头部（主机字节序）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DatagramHdr {
    /// 目标端口
    pub dest: Port,
    /// 源端口
    pub source: Port,
    /// 数据长度（不含头部）
    pub len: u16,
}

impl DatagramHdr {
    pub const fn new(dest: Port, source: Port, len: u16) -> Self {
        Self { dest, source, len }
    }

    /// 从字节切片解析头部；不足 `DGRAM_HLEN` 字节时返回 None
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < DGRAM_HLEN {
            return None;
        }
        Some(Self {
            dest: u16::from_be_bytes([data[0], data[1]]),
            source: u16::from_be_bytes([data[2], data[3]]),
            len: u16::from_be_bytes([data[4], data[5]]),
        })
    }

    pub fn to_bytes(&self) -> [u8; DGRAM_HLEN] {
        let mut out = [0u8; DGRAM_HLEN];
        out[0..2].copy_from_slice(&self.dest.to_be_bytes());
        out[2..4].copy_from_slice(&self.source.to_be_bytes());
        out[4..6].copy_from_slice(&self.len.to_be_bytes());
        out
    }
}

/// 读取帧的目标端口（不校验长度字段）
pub fn peek_dest(frame: &[u8]) -> Option<Port> {
    DatagramHdr::from_bytes(frame).map(|hdr| hdr.dest)
}

/// 构造数据报
///
/// # 参数
/// - `buf`: 输出缓冲区（共享发送缓冲区）
/// - `dest` / `source`: 目标端口和源端口
/// - `data`: 数据
///
/// # 返回
/// 成功返回整帧长度（头部 + 数据）
pub fn build_datagram(
    buf: &mut [u8],
    dest: Port,
    source: Port,
    data: &[u8],
) -> Result<usize, NetError> {
    let total = DGRAM_HLEN + data.len();
    if total > buf.len() || data.len() > u16::MAX as usize {
        return Err(NetError::PayloadTooLarge);
    }

    let hdr = DatagramHdr::new(dest, source, data.len() as u16);
    buf[..DGRAM_HLEN].copy_from_slice(&hdr.to_bytes());
    buf[DGRAM_HLEN..total].copy_from_slice(data);
    Ok(total)
}

/// 解析数据报
///
/// 长度字段超出帧实际长度时视为损坏，返回 None。
/// 帧尾多出的字节被忽略。
pub fn parse_datagram(frame: &[u8]) -> Option<(DatagramHdr, &[u8])> {
    let hdr = DatagramHdr::from_bytes(frame)?;
    let end = DGRAM_HLEN + hdr.len as usize;
    if end > frame.len() {
        return None;
    }
    Some((hdr, &frame[DGRAM_HLEN..end]))
}
