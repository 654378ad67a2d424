//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 射频网络层
//!
//! ```text
//!  射频中断 ──RADIO_PKT_RCV(index)──> 工作线程 (rx.rs)
//!                                      │ 复制到缓冲池 (pool.rs)
//!                                      │ 分发 (rx.rs)
//!                                      ▼
//!              套接字队列 (socket.rs) ──NETL_RCV(id)──> 属主任务
//!                                                        │ recv / send / send_to (api.rs)
//! ```
//!
//! 锁的顺序：套接字表 -> 缓冲池。发送缓冲区独立加锁，不与二者嵌套。

mod api;
pub mod datagram;
pub mod pool;
mod rx;
pub mod socket;
pub mod stats;

use log::{info, warn};
use spin::{Mutex, Once};

use crate::config::{FIRMWARE_NAME, FIRMWARE_VERSION, LOG_LEVEL, MAX_DATA_SIZE};
use crate::drivers::radio::Transceiver;
use crate::errno::NetError;
use crate::sync::IrqMutex;
use crate::task::{Platform, TaskId};

pub use datagram::{Port, DGRAM_HLEN};
pub use pool::{PacketPool, SlotId};
pub use rx::Dispatched;
pub use socket::{SocketId, SocketTable, SocketType};
pub use stats::{NetStats, NetStatsSnapshot};

/// 随机源端口从这里开始递减
const RAND_PORT_MAX: Port = u16::MAX;
/// 低于这个值后回到 `RAND_PORT_MAX`
const RAND_PORT_MIN: Port = u16::MAX / 2;

/// 接收到的数据的来源信息
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FromInfo {
    /// 发送方的源端口
    pub src_port: Port,
    /// 信号强度
    pub rssi: u8,
}

/// 共享发送缓冲区
struct SendStage {
    buf: [u8; MAX_DATA_SIZE],
    next_rand_port: Port,
}

impl SendStage {
    const fn new() -> Self {
        Self {
            buf: [0u8; MAX_DATA_SIZE],
            next_rand_port: RAND_PORT_MAX,
        }
    }

    /// 为未绑定的发送者生成源端口
    fn rand_port(&mut self) -> Port {
        let port = self.next_rand_port;
        self.next_rand_port = if port <= RAND_PORT_MIN {
            RAND_PORT_MAX
        } else {
            port - 1
        };
        port
    }
}

/// 网络层实例
pub struct NetLayer<'a> {
    radio: &'a dyn Transceiver,
    platform: &'a dyn Platform,
    sockets: IrqMutex<SocketTable>,
    pool: IrqMutex<PacketPool>,
    stage: Mutex<SendStage>,
    stats: NetStats,
}

impl<'a> NetLayer<'a> {
    pub fn new(radio: &'a dyn Transceiver, platform: &'a dyn Platform) -> Self {
        Self {
            radio,
            platform,
            sockets: IrqMutex::new(SocketTable::new()),
            pool: IrqMutex::new(PacketPool::new()),
            stage: Mutex::new(SendStage::new()),
            stats: NetStats::new(),
        }
    }

    /// 统计计数器快照
    pub fn stats(&self) -> NetStatsSnapshot {
        self.stats.snapshot()
    }

    /// 缓冲池中的空闲槽位数
    pub fn free_slots(&self) -> usize {
        self.pool.lock().free_slots()
    }

    /// 缓冲池槽位的引用计数
    pub fn slot_users(&self, slot: SlotId) -> u8 {
        self.pool.lock().users(slot)
    }

    /// 套接字队列中等待消费的帧数
    pub fn pending(&self, s: SocketId) -> Result<usize, NetError> {
        Ok(self.sockets.lock().get(s)?.queue().len())
    }
}

static NET_LAYER: Once<NetLayer<'static>> = Once::new();
static WORKER: Mutex<Option<TaskId>> = Mutex::new(None);

/// 初始化网络层
///
/// 可以重复调用：实例只在第一次调用时创建，工作线程只在尚未运行时创建；
/// 每次调用都会把工作线程重新登记为收发器的属主。
/// 第一次调用时把日志级别上限设为 `config::LOG_LEVEL`。
pub fn netl_init(
    radio: &'static dyn Transceiver,
    platform: &'static dyn Platform,
) -> &'static NetLayer<'static> {
    let layer = NET_LAYER.call_once(|| {
        log::set_max_level(LOG_LEVEL);
        info!("{} {}: net layer initialised", FIRMWARE_NAME, FIRMWARE_VERSION);
        NetLayer::new(radio, platform)
    });

    let mut worker = WORKER.lock();
    if worker.is_none() {
        match layer.platform.thread_create("net_layer", rx_thread) {
            Some(pid) => {
                info!("net: worker started, pid {}", pid.as_u32());
                *worker = Some(pid);
            }
            None => warn!("net: failed to create worker thread"),
        }
    }

    if let Some(pid) = *worker {
        layer.radio.init(pid);
    }
    layer
}

/// 已初始化的网络层
pub fn net_layer() -> Option<&'static NetLayer<'static>> {
    NET_LAYER.get()
}

/// 工作线程入口
fn rx_thread() {
    if let Some(layer) = net_layer() {
        layer.rx_loop();
    }
}
