//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 套接字表
//!
//! 固定 `MAX_SOCKETS` 个槽位。槽位在关闭后可被重用，但套接字标识单调递增、
//! 永不复用。每个套接字有自己的接收队列，保存缓冲池的槽位句柄。

use bitflags::bitflags;

use super::datagram::Port;
use super::pool::SlotId;
use crate::collection::FixedRing;
use crate::config::{MAX_SOCKETS, RCV_BUF_SIZE};
use crate::errno::NetError;
use crate::task::TaskId;

/// 套接字类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketType {
    /// 收发整帧，不解析数据报头部
    Raw,
    /// 带端口的数据报
    Datagram,
}

/// 套接字标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SocketId(u32);

impl SocketId {
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

bitflags! {
    /// 套接字标志
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SockFlags: u8 {
        /// 非阻塞模式
        const NONBLOCK = 0x01;
    }
}

/// 套接字
pub struct Socket {
    /// None 表示槽位空闲
    id: Option<SocketId>,
    kind: SocketType,
    port: Option<Port>,
    owner: Option<TaskId>,
    flags: SockFlags,
    queue: FixedRing<SlotId, RCV_BUF_SIZE>,
}

impl Socket {
    const fn empty() -> Self {
        Self {
            id: None,
            kind: SocketType::Raw,
            port: None,
            owner: None,
            flags: SockFlags::empty(),
            queue: FixedRing::new(),
        }
    }

    pub fn id(&self) -> Option<SocketId> {
        self.id
    }

    pub fn kind(&self) -> SocketType {
        self.kind
    }

    pub fn owner(&self) -> Option<TaskId> {
        self.owner
    }

    pub fn is_live(&self) -> bool {
        self.id.is_some()
    }

    /// 已记录端口和属主
    pub fn is_bound(&self) -> bool {
        self.port.is_some() && self.owner.is_some()
    }

    pub fn bound_port(&self) -> Option<Port> {
        if self.is_bound() {
            self.port
        } else {
            None
        }
    }

    pub fn is_blocking(&self) -> bool {
        !self.flags.contains(SockFlags::NONBLOCK)
    }

    /// 判断一个目标端口为 `dest` 的帧是否投递给本套接字
    ///
    /// 有端口的套接字只收发往该端口的帧；没有端口的原始套接字收所有帧。
    /// `dest` 为 None 表示帧太短，不含数据报头部。
    pub fn accepts(&self, dest: Option<Port>) -> bool {
        if !self.is_live() || self.owner.is_none() {
            return false;
        }
        match self.port {
            Some(port) => dest == Some(port),
            None => self.kind == SocketType::Raw,
        }
    }

    /// 接收队列
    pub fn queue(&self) -> &FixedRing<SlotId, RCV_BUF_SIZE> {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut FixedRing<SlotId, RCV_BUF_SIZE> {
        &mut self.queue
    }
}

/// 套接字表
pub struct SocketTable {
    sockets: [Socket; MAX_SOCKETS],
    /// 下一个分配的标识
    next_id: u32,
}

impl SocketTable {
    pub const fn new() -> Self {
        const EMPTY: Socket = Socket::empty();
        Self {
            sockets: [EMPTY; MAX_SOCKETS],
            next_id: 1,
        }
    }

    /// 创建一个套接字
    ///
    /// 默认阻塞、未绑定、队列为空；`owner` 记录为属主
    pub fn create(
        &mut self,
        kind: SocketType,
        owner: Option<TaskId>,
    ) -> Result<SocketId, NetError> {
        let slot = self
            .sockets
            .iter_mut()
            .find(|s| !s.is_live())
            .ok_or(NetError::TableFull)?;

        let raw = self.next_id;
        self.next_id = raw.checked_add(1).ok_or(NetError::TableFull)?;

        let id = SocketId(raw);
        *slot = Socket {
            id: Some(id),
            kind,
            owner,
            ..Socket::empty()
        };
        Ok(id)
    }

    pub fn get(&self, id: SocketId) -> Result<&Socket, NetError> {
        self.sockets
            .iter()
            .find(|s| s.id == Some(id))
            .ok_or(NetError::SocketNotFound)
    }

    pub fn get_mut(&mut self, id: SocketId) -> Result<&mut Socket, NetError> {
        self.sockets
            .iter_mut()
            .find(|s| s.id == Some(id))
            .ok_or(NetError::SocketNotFound)
    }

    /// 查找绑定了 `port` 的套接字
    pub fn by_port(&self, port: Port) -> Option<&Socket> {
        self.sockets
            .iter()
            .find(|s| s.is_live() && s.is_bound() && s.port == Some(port))
    }

    /// 绑定端口
    ///
    /// 端口 0 表示不绑定端口，只登记属主（原始套接字以此接收所有帧）
    pub fn bind(&mut self, id: SocketId, port: Port, owner: TaskId) -> Result<(), NetError> {
        self.get(id)?;

        if port != 0 {
            if let Some(other) = self.by_port(port) {
                if other.id != Some(id) {
                    return Err(NetError::PortInUse);
                }
            }
        }

        let sock = self.get_mut(id)?;
        sock.port = if port == 0 { None } else { Some(port) };
        sock.owner = Some(owner);
        Ok(())
    }

    /// 解除绑定；未绑定时什么都不做
    pub fn unbind(&mut self, id: SocketId) -> Result<(), NetError> {
        let sock = self.get_mut(id)?;
        if sock.is_bound() {
            sock.port = None;
            sock.owner = None;
        }
        Ok(())
    }

    /// 关闭套接字，槽位可被重用
    ///
    /// 队列中尚未消费的帧不会释放引用，对应的缓冲池槽位会一直被占用
    pub fn close(&mut self, id: SocketId) -> Result<(), NetError> {
        self.unbind(id)?;
        let sock = self.get_mut(id)?;
        *sock = Socket::empty();
        Ok(())
    }

    pub fn set_nonblock(&mut self, id: SocketId) -> Result<(), NetError> {
        self.get_mut(id)?.flags.insert(SockFlags::NONBLOCK);
        Ok(())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Socket> {
        self.sockets.iter_mut()
    }

    /// 活动的套接字数
    pub fn live(&self) -> usize {
        self.sockets.iter().filter(|s| s.is_live()).count()
    }
}

impl Default for SocketTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: TaskId = TaskId::new(5);

    #[test]
    fn test_create_until_full() {
        let mut table = SocketTable::new();
        for _ in 0..MAX_SOCKETS {
            table.create(SocketType::Datagram, Some(OWNER)).unwrap();
        }
        assert_eq!(
            table.create(SocketType::Datagram, Some(OWNER)),
            Err(NetError::TableFull)
        );
        assert_eq!(table.live(), MAX_SOCKETS);
    }

    #[test]
    fn test_ids_never_reused() {
        let mut table = SocketTable::new();
        let mut last = None;
        for _ in 0..(MAX_SOCKETS * 3) {
            let id = table.create(SocketType::Raw, Some(OWNER)).unwrap();
            if let Some(prev) = last {
                assert!(id > prev);
            }
            table.close(id).unwrap();
            last = Some(id);
        }
        assert_eq!(table.live(), 0);
    }

    #[test]
    fn test_id_exhaustion() {
        let mut table = SocketTable::new();
        table.next_id = u32::MAX;
        assert_eq!(
            table.create(SocketType::Raw, Some(OWNER)),
            Err(NetError::TableFull)
        );
    }

    #[test]
    fn test_bind_conflict() {
        let mut table = SocketTable::new();
        let d = table.create(SocketType::Datagram, Some(OWNER)).unwrap();
        let e = table.create(SocketType::Datagram, Some(OWNER)).unwrap();

        table.bind(d, 300, OWNER).unwrap();
        assert_eq!(table.bind(e, 300, OWNER), Err(NetError::PortInUse));
        // 同一个套接字重复绑定
        assert_eq!(table.bind(d, 300, OWNER), Ok(()));
        assert_eq!(table.by_port(300).and_then(|s| s.id()), Some(d));
    }

    #[test]
    fn test_unbind_frees_port() {
        let mut table = SocketTable::new();
        let d = table.create(SocketType::Datagram, Some(OWNER)).unwrap();
        let e = table.create(SocketType::Datagram, Some(OWNER)).unwrap();
        table.bind(d, 300, OWNER).unwrap();
        table.unbind(d).unwrap();
        assert!(table.get(d).unwrap().owner().is_none());
        assert_eq!(table.bind(e, 300, OWNER), Ok(()));
        // 未绑定时解除绑定
        assert_eq!(table.unbind(d), Ok(()));
    }

    #[test]
    fn test_wildcard_bind() {
        let mut table = SocketTable::new();
        let s = table.create(SocketType::Raw, None).unwrap();
        assert!(!table.get(s).unwrap().accepts(Some(7)));

        table.bind(s, 0, OWNER).unwrap();
        let sock = table.get(s).unwrap();
        assert!(!sock.is_bound());
        assert!(sock.accepts(Some(7)));
        assert!(sock.accepts(None));
    }

    #[test]
    fn test_accepts() {
        let mut table = SocketTable::new();
        let dgram = table.create(SocketType::Datagram, Some(OWNER)).unwrap();
        assert!(!table.get(dgram).unwrap().accepts(Some(100)));

        table.bind(dgram, 100, OWNER).unwrap();
        let sock = table.get(dgram).unwrap();
        assert!(sock.accepts(Some(100)));
        assert!(!sock.accepts(Some(200)));
        assert!(!sock.accepts(None));
    }

    #[test]
    fn test_unknown_socket() {
        let mut table = SocketTable::new();
        let s = table.create(SocketType::Raw, Some(OWNER)).unwrap();
        table.close(s).unwrap();
        assert_eq!(table.close(s), Err(NetError::SocketNotFound));
        assert_eq!(table.bind(s, 1, OWNER), Err(NetError::SocketNotFound));
        assert_eq!(table.set_nonblock(s), Err(NetError::SocketNotFound));
    }

    #[test]
    fn test_nonblock() {
        let mut table = SocketTable::new();
        let s = table.create(SocketType::Datagram, Some(OWNER)).unwrap();
        assert!(table.get(s).unwrap().is_blocking());
        table.set_nonblock(s).unwrap();
        table.set_nonblock(s).unwrap();
        assert!(!table.get(s).unwrap().is_blocking());
    }
}
