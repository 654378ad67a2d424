//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 标准错误代码定义
//!
//! 和 include/uapi/asm-generic/errno.h 保持一致，只保留网络层用到的部分

use core::fmt;

/// 标准错误代码
///
/// 使用方法：
/// ```rust
/// use portail::errno::Errno;
///
/// // 系统调用风格，返回负数
/// assert_eq!(Errno::AddressInUse.as_neg_i32(), -98);
/// ```
#[repr(i32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Errno {
    /// I/O error (EIO, 5)
    IOError = constants::EIO,

    /// Bad file number (EBADF, 9)
    BadFileNumber = constants::EBADF,

    /// Try again (EAGAIN, 11)
    TryAgain = constants::EAGAIN,

    /// File table overflow (ENFILE, 23)
    FileTableOverflow = constants::ENFILE,

    /// Message too long (EMSGSIZE, 90)
    MessageTooLong = constants::EMSGSIZE,

    /// Address already in use (EADDRINUSE, 98)
    AddressInUse = constants::EADDRINUSE,

    /// No buffer space available (ENOBUFS, 105)
    NoBufferSpace = constants::ENOBUFS,
}

impl Errno {
    /// 获取错误代码的正数值（用于比较）
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// 获取错误代码的负数值（用于 C 风格调用者）
    #[inline]
    pub const fn as_neg_i32(self) -> i32 {
        -(self as i32)
    }
}

/// 常用的错误代码常量
pub mod constants {
    pub const EIO: i32 = 5;
    pub const EBADF: i32 = 9;
    pub const EAGAIN: i32 = 11;
    pub const ENFILE: i32 = 23;
    pub const EMSGSIZE: i32 = 90;
    pub const EADDRINUSE: i32 = 98;
    pub const ENOBUFS: i32 = 105;
}

/// 网络层错误
///
/// 前四种由套接字 API 同步返回；其余三种只发生在接收/发送内部，
/// 记入 [`crate::net::stats::NetStats`] 后即被吞掉，不会返回给调用者。
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NetError {
    /// 套接字不存在或已关闭
    SocketNotFound,
    /// 端口已被其他套接字绑定
    PortInUse,
    /// 套接字表已满
    TableFull,
    /// 数据超过单帧最大长度
    PayloadTooLarge,
    /// 接收缓冲池所有槽位都在使用
    PoolExhausted,
    /// 收发器报告发送失败
    TransmitFailure,
    /// 分发时通知通道已满，帧被静默丢弃
    SilentDrop,
}

impl NetError {
    /// 对应的标准错误代码
    pub const fn errno(self) -> Errno {
        match self {
            NetError::SocketNotFound => Errno::BadFileNumber,
            NetError::PortInUse => Errno::AddressInUse,
            NetError::TableFull => Errno::FileTableOverflow,
            NetError::PayloadTooLarge => Errno::MessageTooLong,
            NetError::PoolExhausted => Errno::NoBufferSpace,
            NetError::TransmitFailure => Errno::IOError,
            NetError::SilentDrop => Errno::TryAgain,
        }
    }

    #[inline]
    pub const fn as_neg_i32(self) -> i32 {
        self.errno().as_neg_i32()
    }
}

impl fmt::Display for NetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            NetError::SocketNotFound => "socket not found",
            NetError::PortInUse => "port already bound",
            NetError::TableFull => "socket table full",
            NetError::PayloadTooLarge => "payload too large",
            NetError::PoolExhausted => "receive pool exhausted",
            NetError::TransmitFailure => "radio transmit failed",
            NetError::SilentDrop => "frame dropped on dispatch",
        };
        f.write_str(msg)
    }
}
