//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 套接字 API 与发送路径

use log::{debug, warn};

use super::datagram::{build_datagram, parse_datagram, DatagramHdr, Port, DGRAM_HLEN};
use super::pool::SlotId;
use super::socket::{SocketId, SocketType};
use super::stats::NetStats;
use super::{FromInfo, NetLayer};
use crate::collection::FixedRing;
use crate::config::{MAX_DATA_SIZE, TASK_MSG_QUEUE_SIZE};
use crate::drivers::radio::RadioPacket;
use crate::errno::NetError;
use crate::task::{Msg, MsgType};

/// 弹出队头时一并取得的套接字状态
struct Head {
    kind: SocketType,
    blocking: bool,
    /// 调用者是属主，通知投递在调用者自己的消息队列里
    owned: bool,
    slot: Option<SlotId>,
}

impl NetLayer<'_> {
    /// 创建套接字，调用者成为属主
    pub fn socket(&self, kind: SocketType) -> Result<SocketId, NetError> {
        let me = self.platform.current_task();
        let owner = (!me.is_undef()).then_some(me);
        self.sockets.lock().create(kind, owner)
    }

    /// 绑定端口，调用者成为属主
    ///
    /// 端口 0 只登记属主：原始套接字以此接收所有流量
    pub fn bind(&self, s: SocketId, port: Port) -> Result<(), NetError> {
        let me = self.platform.current_task();
        self.sockets.lock().bind(s, port, me)
    }

    pub fn unbind(&self, s: SocketId) -> Result<(), NetError> {
        self.sockets.lock().unbind(s)
    }

    /// 关闭套接字
    ///
    /// 属主关闭时，一并丢弃消息队列中该套接字的通知
    pub fn close(&self, s: SocketId) -> Result<(), NetError> {
        let me = self.platform.current_task();
        let owned = {
            let mut sockets = self.sockets.lock();
            let owned = sockets.get(s)?.owner() == Some(me);
            sockets.close(s)?;
            owned
        };
        if owned {
            self.reclaim_notifications(s, usize::MAX);
        }
        Ok(())
    }

    /// 切换到非阻塞模式
    pub fn set_nonblock(&self, s: SocketId) -> Result<(), NetError> {
        self.sockets.lock().set_nonblock(s)
    }

    /// 接收一帧
    ///
    /// 原始套接字得到整帧；数据报套接字得到去掉头部的数据。
    /// 数据比 `dest` 长时丢弃并返回 0，帧仍然被消费。
    /// 队列为空时，非阻塞套接字立即返回 0，阻塞套接字一直等待。
    ///
    /// 每取出一帧就消费一条对应的通知，属主的消息队列不会被已处理的帧占满。
    pub fn recv(&self, s: SocketId, dest: &mut [u8]) -> Result<(usize, FromInfo), NetError> {
        let head = self.pop(s)?;
        let slot = match head.slot {
            Some(slot) => {
                if head.owned {
                    self.reclaim_notifications(s, 1);
                }
                slot
            }
            None if !head.blocking => {
                // 队列已空，剩下的通知都已过期
                if head.owned {
                    self.reclaim_notifications(s, usize::MAX);
                }
                return Ok((0, FromInfo::default()));
            }
            None => self.wait_for(s)?,
        };
        Ok(self.deliver(head.kind, slot, dest))
    }

    /// 发送原始帧
    pub fn send(&self, s: SocketId, data: &[u8]) -> Result<usize, NetError> {
        self.sockets.lock().get(s)?;
        if data.len() > MAX_DATA_SIZE {
            debug!("net: send of {} bytes rejected", data.len());
            return Err(NetError::PayloadTooLarge);
        }
        self.xmit(data)
    }

    /// 发送数据报
    ///
    /// 源端口为套接字绑定的端口；未绑定时使用随机端口
    pub fn send_to(&self, s: SocketId, data: &[u8], dst: Port) -> Result<usize, NetError> {
        let bound = self.sockets.lock().get(s)?.bound_port();
        if data.len() > MAX_DATA_SIZE - DGRAM_HLEN {
            debug!("net: send_to of {} bytes rejected", data.len());
            return Err(NetError::PayloadTooLarge);
        }

        let mut stage = self.stage.lock();
        let src = match bound {
            Some(port) => port,
            None => stage.rand_port(),
        };
        let len = build_datagram(&mut stage.buf, dst, src, data)?;
        self.xmit(&stage.buf[..len])
    }

    fn pop(&self, s: SocketId) -> Result<Head, NetError> {
        let me = self.platform.current_task();
        let mut sockets = self.sockets.lock();
        let sock = sockets.get_mut(s)?;
        Ok(Head {
            kind: sock.kind(),
            blocking: sock.is_blocking(),
            owned: sock.owner() == Some(me),
            slot: sock.queue_mut().pop(),
        })
    }

    /// 从当前任务的消息队列中取走至多 `limit` 条属于 `s` 的通知
    ///
    /// 其他消息按原顺序放回队尾。返回取走的条数。
    fn reclaim_notifications(&self, s: SocketId, limit: usize) -> usize {
        let me = self.platform.current_task();
        let target = Msg::new(MsgType::NETL_RCV, s.as_u32());
        let mut others: FixedRing<Msg, TASK_MSG_QUEUE_SIZE> = FixedRing::new();
        let mut taken = 0;

        while !others.is_full() {
            let Some(msg) = self.platform.msg_try_receive() else {
                break;
            };
            if msg == target && taken < limit {
                taken += 1;
                continue;
            }
            let _ = others.push(msg);
        }

        for msg in others.iter() {
            if !self.platform.msg_try_send(me, msg) {
                debug!("net: task {} mailbox refilled, message lost", me.as_u32());
            }
        }
        taken
    }

    /// 等待本套接字的通知并取出一帧
    ///
    /// 其他套接字的通知被丢弃；快速路径已经取走数据而留下的旧通知不结束等待
    fn wait_for(&self, s: SocketId) -> Result<SlotId, NetError> {
        loop {
            let msg = self.platform.msg_receive();
            if msg.kind != MsgType::NETL_RCV || msg.value != s.as_u32() {
                continue;
            }
            if let Some(slot) = self.pop(s)?.slot {
                return Ok(slot);
            }
        }
    }

    /// 把槽位中的数据复制给调用者并释放引用
    fn deliver(&self, kind: SocketType, slot: SlotId, dest: &mut [u8]) -> (usize, FromInfo) {
        let mut pool = self.pool.lock();
        let result = {
            let pkt = pool.get(slot);
            let frame = pkt.data();
            match kind {
                SocketType::Raw => {
                    let info = FromInfo {
                        src_port: DatagramHdr::from_bytes(frame).map_or(0, |hdr| hdr.source),
                        rssi: pkt.rssi(),
                    };
                    self.copy_out(frame, dest, info)
                }
                SocketType::Datagram => match parse_datagram(frame) {
                    Some((hdr, payload)) => {
                        let info = FromInfo {
                            src_port: hdr.source,
                            rssi: pkt.rssi(),
                        };
                        self.copy_out(payload, dest, info)
                    }
                    None => {
                        debug!("net: malformed datagram in slot {}", slot.index());
                        NetStats::inc(&self.stats.malformed);
                        (0, FromInfo::default())
                    }
                },
            }
        };
        pool.release(slot);
        result
    }

    fn copy_out(&self, data: &[u8], dest: &mut [u8], info: FromInfo) -> (usize, FromInfo) {
        if data.len() > dest.len() {
            debug!("net: {} bytes discarded, buffer {}", data.len(), dest.len());
            NetStats::inc(&self.stats.oversize_discard);
            return (0, FromInfo::default());
        }
        dest[..data.len()].copy_from_slice(data);
        (data.len(), info)
    }

    /// 交给收发器发送；失败只计数，返回 0
    fn xmit(&self, frame: &[u8]) -> Result<usize, NetError> {
        let packet = RadioPacket::broadcast(frame).ok_or(NetError::PayloadTooLarge)?;
        let sent = self.radio.send(&packet);
        if sent <= 0 {
            warn!("net: radio send failed ({})", sent);
            self.stats.record(NetError::TransmitFailure);
            return Ok(0);
        }
        NetStats::inc(&self.stats.tx_frames);
        Ok(sent as usize)
    }
}
