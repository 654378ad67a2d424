//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 全局初始化与工作线程测试
//!
//! 全局实例在进程内只有一个，所有相关检查都放在同一个测试里

use crate::drivers::radio::LoopbackRadio;
use crate::net::{net_layer, netl_init, SocketType};
use crate::task::host::HostPlatform;

static PLATFORM: HostPlatform = HostPlatform::new();

#[test]
fn test_init_once_and_worker_dispatch() {
    let radio: &'static LoopbackRadio<'static> =
        Box::leak(Box::new(LoopbackRadio::new(&PLATFORM)));

    let first = netl_init(radio, &PLATFORM);
    let owner = radio.owner();
    assert!(owner.is_some(), "radio registered to the worker");

    let second = netl_init(radio, &PLATFORM);
    assert!(core::ptr::eq(first, second), "same instance");
    assert_eq!(PLATFORM.threads_created(), 1, "worker created once");
    assert_eq!(radio.owner(), owner);
    assert!(net_layer().is_some_and(|layer| core::ptr::eq(layer, first)));
    assert_eq!(log::max_level(), crate::config::LOG_LEVEL);

    // 回环帧经由工作线程分发
    let net = first;
    let rx = net.socket(SocketType::Datagram).unwrap();
    net.bind(rx, 100).unwrap();
    let tx = net.socket(SocketType::Datagram).unwrap();
    net.bind(tx, 9).unwrap();

    assert_eq!(net.send_to(tx, b"through worker", 100), Ok(6 + 14));

    let mut buf = [0u8; 32];
    let (n, from) = net.recv(rx, &mut buf).unwrap();
    assert_eq!(&buf[..n], b"through worker");
    assert_eq!(from.src_port, 9);
    assert_eq!(net.stats().rx_frames, 1);
}
