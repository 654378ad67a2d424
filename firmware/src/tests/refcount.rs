//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 缓冲池引用计数测试

use std::thread;

use super::support::rig;
use crate::config::{RCV_BUF_SIZE, TASK_MSG_QUEUE_SIZE};
use crate::errno::NetError;
use crate::net::{FromInfo, SocketType};
use crate::task::{Msg, MsgType, Platform};

#[test]
fn test_fanout_counts_each_holder() {
    let rig = rig();
    let net = &rig.net;

    let wildcard = net.socket(SocketType::Raw).unwrap();
    let raw_bound = net.socket(SocketType::Raw).unwrap();
    let dgram = net.socket(SocketType::Datagram).unwrap();
    net.bind(raw_bound, 100).unwrap();
    net.bind(dgram, 100).unwrap_err();
    net.bind(dgram, 101).unwrap();

    // 端口 101 的数据报套接字不在其中
    rig.external_send(100, 3, b"fanout");
    let index = rig.radio.poll().unwrap();
    let result = net.handle_radio_event(index).unwrap();
    assert_eq!(result.delivered, 2);
    assert_eq!(net.slot_users(result.slot), 2, "one reference per holder");
    assert_eq!(net.pending(dgram), Ok(0));

    let mut buf = [0u8; 32];
    let (n, _) = net.recv(raw_bound, &mut buf).unwrap();
    assert_eq!(&buf[6..n], b"fanout");
    assert_eq!(net.slot_users(result.slot), 1);

    // 缓冲区太小：丢弃，但仍然消费
    let mut tiny = [0u8; 4];
    assert_eq!(net.recv(wildcard, &mut tiny), Ok((0, FromInfo::default())));
    assert_eq!(net.slot_users(result.slot), 0);
    assert_eq!(net.free_slots(), RCV_BUF_SIZE);
    assert_eq!(net.stats().oversize_discard, 1);
}

#[test]
fn test_fanout_to_datagram_and_raw() {
    let rig = rig();
    let net = &rig.net;

    let a = net.socket(SocketType::Raw).unwrap();
    let b = net.socket(SocketType::Raw).unwrap();
    let c = net.socket(SocketType::Datagram).unwrap();
    net.bind(c, 42).unwrap();

    rig.external_send(42, 1, b"all");
    let index = rig.radio.poll().unwrap();
    let result = net.handle_radio_event(index).unwrap();
    assert_eq!(result.delivered, 3);
    assert_eq!(net.slot_users(result.slot), 3);

    let mut buf = [0u8; 16];
    for (i, s) in [c, a, b].into_iter().enumerate() {
        net.recv(s, &mut buf).unwrap();
        assert_eq!(net.slot_users(result.slot) as usize, 2 - i);
    }
}

#[test]
fn test_pool_exhaustion_keeps_queued_data() {
    let rig = rig();
    let net = &rig.net;

    let s = net.socket(SocketType::Datagram).unwrap();
    net.bind(s, 100).unwrap();

    let payloads: [&[u8]; RCV_BUF_SIZE] = [b"a", b"b", b"c"];
    for payload in payloads {
        rig.external_send(100, 1, payload);
    }
    assert_eq!(rig.pump(), RCV_BUF_SIZE);
    assert_eq!(net.free_slots(), 0);

    rig.external_send(100, 1, b"overflow");
    let index = rig.radio.poll().unwrap();
    assert_eq!(net.handle_radio_event(index), Err(NetError::PoolExhausted));
    assert_eq!(net.stats().radio_buffer_full, 1);

    let mut buf = [0u8; 16];
    for payload in payloads {
        let (n, _) = net.recv(s, &mut buf).unwrap();
        assert_eq!(&buf[..n], payload, "queued data unchanged");
    }
    assert_eq!(net.free_slots(), RCV_BUF_SIZE);
}

#[test]
fn test_oversize_datagram_discarded() {
    let rig = rig();
    let net = &rig.net;

    let s = net.socket(SocketType::Datagram).unwrap();
    net.bind(s, 5).unwrap();
    net.set_nonblock(s).unwrap();

    rig.external_send(5, 1, &[7u8; 20]);
    assert_eq!(rig.pump(), 1);

    let mut small = [0u8; 8];
    assert_eq!(net.recv(s, &mut small), Ok((0, FromInfo::default())));
    assert_eq!(net.stats().oversize_discard, 1);
    assert_eq!(net.free_slots(), RCV_BUF_SIZE);
    assert_eq!(net.recv(s, &mut small), Ok((0, FromInfo::default())), "nothing left");
}

#[test]
fn test_close_with_pending_strands_slot() {
    let rig = rig();
    let net = &rig.net;

    let s = net.socket(SocketType::Datagram).unwrap();
    net.bind(s, 100).unwrap();
    rig.external_send(100, 1, b"never read");
    assert_eq!(rig.pump(), 1);

    net.close(s).unwrap();
    assert_eq!(net.free_slots(), RCV_BUF_SIZE - 1);
}

#[test]
fn test_saturated_owner_skips_only_its_socket() {
    let rig = rig();
    let net = &rig.net;

    // 另一个任务拥有端口 100 的套接字
    let (busy, busy_owner) = thread::spawn(move || {
        let s = rig.net.socket(SocketType::Datagram).unwrap();
        rig.net.bind(s, 100).unwrap();
        (s, rig.platform.current_task())
    })
    .join()
    .unwrap();
    for i in 0..TASK_MSG_QUEUE_SIZE as u32 {
        assert!(rig.platform.msg_try_send(busy_owner, Msg::new(MsgType::NETL_RCV, i)));
    }

    let wildcard = net.socket(SocketType::Raw).unwrap();
    rig.external_send(100, 1, b"x");
    let index = rig.radio.poll().unwrap();
    let result = net.handle_radio_event(index).unwrap();

    assert_eq!(result.delivered, 1);
    assert_eq!(net.slot_users(result.slot), 1);
    assert_eq!(net.pending(busy), Ok(0));
    assert_eq!(net.pending(wildcard), Ok(1));
    assert_eq!(net.stats().out_of_buffer, 1);
}
