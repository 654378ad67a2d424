//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! Portail 门控单元固件：射频网络层
//!
//! 在单一广播射频收发器之上提供数据报套接字语义：
//! - 固定大小、引用计数的接收缓冲池 (`net::pool`)
//! - 固定大小的套接字表 (`net::socket`)
//! - 中断通知 + 工作线程的接收流水线与分发器 (`net::rx`)
//! - 套接字 API 与发送路径 (`net::api`)
//!
//! 执行器 / 持久化 / 遥测 / 应用主循环都只是套接字 API 的使用者，不在本 crate 内。

#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate log;

pub mod arch;
pub mod collection;
pub mod config;
pub mod drivers;
pub mod errno;
pub mod net;
pub mod sync;
pub mod task;

#[cfg(test)]
mod tests;

pub use errno::{Errno, NetError};
pub use net::{
    net_layer, netl_init, FromInfo, NetLayer, NetStatsSnapshot, Port, SocketId, SocketType,
};
pub use task::{Msg, MsgType, Platform, TaskId};
