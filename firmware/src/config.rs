//! Portail 固件配置（自动生成）
//!
//! 此文件由 build.rs 根据 Firmware.toml 自动生成，请勿手动修改

// ============================================================
// 基本信息
// ============================================================

/// 固件名称
pub const FIRMWARE_NAME: &str = "portail";

/// 固件版本
pub const FIRMWARE_VERSION: &str = "0.1.0";

/// 日志级别上限（netl_init 时设置）
pub const LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;

// ============================================================
// 网络层配置
// ============================================================

/// 套接字表大小
pub const MAX_SOCKETS: usize = 3;

/// 接收缓冲池槽位数
pub const RCV_BUF_SIZE: usize = 3;

/// 单帧最大传输数据长度
pub const MAX_DATA_SIZE: usize = 58;

// ============================================================
// 任务配置
// ============================================================

/// 每个任务的消息队列长度
pub const TASK_MSG_QUEUE_SIZE: usize = 8;

/// 主机平台任务表大小
pub const MAX_TASKS: usize = 16;

// ============================================================
// 射频配置
// ============================================================

/// 射频帧数据区长度
pub const RADIO_MAX_DATA_LENGTH: usize = 58;

/// 射频帧头长度
pub const RADIO_HEADER_LENGTH: usize = 3;

/// 广播地址
pub const RADIO_BROADCAST_ADDRESS: u8 = 0;

/// 驱动接收环形缓冲区大小
pub const RADIO_RX_BUF_SIZE: usize = 10;
