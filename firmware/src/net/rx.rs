//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 接收流水线与分发器
//!
//! 工作线程等待收发器的 `RADIO_PKT_RCV` 通知，把帧复制进缓冲池，
//! 再按目标端口分发给套接字。分发只传递槽位句柄，不复制数据。

#[cfg(feature = "debug_log")]
use log::trace;
use log::debug;

use super::datagram::peek_dest;
use super::pool::SlotId;
use super::stats::NetStats;
use super::NetLayer;
use crate::errno::NetError;
use crate::task::{Msg, MsgType};

/// 一次分发的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatched {
    /// 帧所在的槽位
    pub slot: SlotId,
    /// 接收到该帧的套接字数
    pub delivered: usize,
}

impl NetLayer<'_> {
    /// 工作线程主循环
    pub fn rx_loop(&self) -> ! {
        loop {
            let msg = self.platform.msg_receive();
            if msg.kind != MsgType::RADIO_PKT_RCV {
                continue;
            }
            match u8::try_from(msg.value) {
                Ok(index) => {
                    let _ = self.handle_radio_event(index);
                }
                Err(_) => self.stats.record(NetError::SilentDrop),
            }
        }
    }

    /// 处理一次接收通知
    ///
    /// 失败（缓冲池耗尽、索引无效）已记入统计，返回值只供调用者观察
    pub fn handle_radio_event(&self, rx_index: u8) -> Result<Dispatched, NetError> {
        NetStats::inc(&self.stats.rx_frames);

        let slot = {
            let mut pool = self.pool.lock();
            let slot = pool.acquire_slot().map_err(|err| {
                debug!("net: pool exhausted, rx {} dropped", rx_index);
                self.fail(err)
            })?;
            let entry = self.radio.rx_entry(rx_index).ok_or_else(|| {
                debug!("net: bad rx index {}", rx_index);
                self.fail(NetError::SilentDrop)
            })?;
            pool.fill(slot, &entry);
            slot
        };

        let delivered = self.dispatch(slot);
        Ok(Dispatched { slot, delivered })
    }

    /// 把槽位中的帧投递给所有匹配的套接字，返回投递数
    fn dispatch(&self, slot: SlotId) -> usize {
        let mut sockets = self.sockets.lock();
        let dest = peek_dest(self.pool.lock().get(slot).data());

        #[cfg(feature = "debug_log")]
        trace!("net: dispatch slot {} dest {:?}", slot.index(), dest);

        let mut delivered = 0;
        for sock in sockets.iter_mut().filter(|s| s.accepts(dest)) {
            let (Some(id), Some(owner)) = (sock.id(), sock.owner()) else {
                continue;
            };

            if sock.queue().is_full() {
                debug!("net: socket {} queue full", id.as_u32());
                self.stats.record(NetError::SilentDrop);
                continue;
            }

            // 通知先于入队：只有属主能收到通知时才持有这一帧
            if !self
                .platform
                .msg_try_send(owner, Msg::new(MsgType::NETL_RCV, id.as_u32()))
            {
                debug!("net: owner {} mailbox full", owner.as_u32());
                self.stats.record(NetError::SilentDrop);
                continue;
            }

            self.pool.lock().retain(slot);
            if sock.queue_mut().push(slot).is_ok() {
                delivered += 1;
            }
        }

        if delivered == 0 {
            NetStats::inc(&self.stats.unhandled_packet);
            debug!("net: unhandled packet, dest {:?}", dest);
        }
        delivered
    }

    fn fail(&self, err: NetError) -> NetError {
        self.stats.record(err);
        err
    }
}
