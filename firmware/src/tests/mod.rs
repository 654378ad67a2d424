//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 网络层场景测试
//!
//! 每个文件测试一个子系统；测试台 (support.rs) 使用主机平台和回环射频设备。
//!
//! 运行测试：
//! ```bash
//! cargo test --package portail
//! ```

mod support;

mod lifecycle;
mod refcount;
