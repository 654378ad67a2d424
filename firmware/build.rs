//! Portail 固件构建脚本
//!
//! 这个脚本在编译前运行，负责：
//! 1. 解析 Firmware.toml 配置文件
//! 2. 生成配置代码 (src/config.rs)
//! 3. 校验配置项（长度上限、日志级别）

use std::env;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FirmwareConfig {
    general: General,
    network: Network,
    task: Task,
    radio: Radio,
    debug: DebugSection,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct General {
    name: String,
    version: String,
}

impl Default for General {
    fn default() -> Self {
        Self {
            name: "portail".to_string(),
            version: "0.1.0".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Network {
    max_sockets: usize,
    rcv_buf_size: usize,
    max_data_size: usize,
}

impl Default for Network {
    fn default() -> Self {
        Self {
            max_sockets: 3,
            rcv_buf_size: 3,
            max_data_size: 58,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Task {
    msg_queue_size: usize,
    max_tasks: usize,
}

impl Default for Task {
    fn default() -> Self {
        Self {
            msg_queue_size: 8,
            max_tasks: 16,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Radio {
    max_data_length: usize,
    header_length: usize,
    broadcast_address: u8,
    rx_buf_size: usize,
}

impl Default for Radio {
    fn default() -> Self {
        Self {
            max_data_length: 58,
            header_length: 3,
            broadcast_address: 0,
            rx_buf_size: 10,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DebugSection {
    log_level: String,
}

impl Default for DebugSection {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

fn main() {
    println!("cargo:rerun-if-changed=../Firmware.toml");
    println!("cargo:rerun-if-changed=build.rs");

    // Firmware.toml 缺失时使用默认配置
    let config: FirmwareConfig = match fs::read_to_string("../Firmware.toml") {
        Ok(content) => toml::from_str(&content).expect("Firmware.toml 解析失败"),
        Err(_) => {
            println!("cargo:warning=Firmware.toml not found, using defaults");
            FirmwareConfig::default()
        }
    };

    if config.network.max_data_size > config.radio.max_data_length {
        panic!(
            "network.max_data_size ({}) 超过 radio.max_data_length ({})",
            config.network.max_data_size, config.radio.max_data_length
        );
    }
    if config.network.rcv_buf_size == 0 || config.network.rcv_buf_size > 255 {
        panic!("network.rcv_buf_size 必须在 1..=255 之间");
    }

    generate_config_code(&config);
}

/// 日志级别字符串对应的 `log::LevelFilter` 变体名
fn level_filter(level: &str) -> &'static str {
    match level.to_ascii_lowercase().as_str() {
        "off" => "Off",
        "error" => "Error",
        "warn" => "Warn",
        "info" => "Info",
        "debug" => "Debug",
        "trace" => "Trace",
        other => panic!("debug.log_level 无效: {}", other),
    }
}

fn generate_config_code(config: &FirmwareConfig) {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());

    let config_source = format!(
        r#"//! Portail 固件配置（自动生成）
//!
//! 此文件由 build.rs 根据 Firmware.toml 自动生成，请勿手动修改

// ============================================================
// 基本信息
// ============================================================

/// 固件名称
pub const FIRMWARE_NAME: &str = "{name}";

/// 固件版本
pub const FIRMWARE_VERSION: &str = "{version}";

/// 日志级别上限（netl_init 时设置）
pub const LOG_LEVEL: log::LevelFilter = log::LevelFilter::{log_level};

// ============================================================
// 网络层配置
// ============================================================

/// 套接字表大小
pub const MAX_SOCKETS: usize = {max_sockets};

/// 接收缓冲池槽位数
pub const RCV_BUF_SIZE: usize = {rcv_buf_size};

/// 单帧最大传输数据长度
pub const MAX_DATA_SIZE: usize = {max_data_size};

// ============================================================
// 任务配置
// ============================================================

/// 每个任务的消息队列长度
pub const TASK_MSG_QUEUE_SIZE: usize = {msg_queue_size};

/// 主机平台任务表大小
pub const MAX_TASKS: usize = {max_tasks};

// ============================================================
// 射频配置
// ============================================================

/// 射频帧数据区长度
pub const RADIO_MAX_DATA_LENGTH: usize = {max_data_length};

/// 射频帧头长度
pub const RADIO_HEADER_LENGTH: usize = {header_length};

/// 广播地址
pub const RADIO_BROADCAST_ADDRESS: u8 = {broadcast_address};

/// 驱动接收环形缓冲区大小
pub const RADIO_RX_BUF_SIZE: usize = {rx_buf_size};
"#,
        name = config.general.name,
        version = config.general.version,
        log_level = level_filter(&config.debug.log_level),
        max_sockets = config.network.max_sockets,
        rcv_buf_size = config.network.rcv_buf_size,
        max_data_size = config.network.max_data_size,
        msg_queue_size = config.task.msg_queue_size,
        max_tasks = config.task.max_tasks,
        max_data_length = config.radio.max_data_length,
        header_length = config.radio.header_length,
        broadcast_address = config.radio.broadcast_address,
        rx_buf_size = config.radio.rx_buf_size,
    );

    let config_file = manifest_dir.join("src").join("config.rs");

    // 只有内容变化时才写入，避免每次编译都更新文件时间戳
    let existing_content = fs::read_to_string(&config_file).unwrap_or_default();
    if existing_content != config_source {
        fs::write(&config_file, &config_source).expect("写入配置文件失败");
    }
}
