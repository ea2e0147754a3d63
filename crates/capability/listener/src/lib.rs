//! # 连接生命周期与多协议分发核心
//!
//! 设备接入监听服务的核心：每种协议一个独立的 accept 循环，
//! 每个被接受的连接一个隔离的处理单元，统一的关停信号贯穿所有层。
//!
//! ## 架构设计
//!
//! ```text
//! ListenerService
//!       │ （每协议并发展开）
//!       ▼
//! ProtocolHandler ── accept 循环，派发后不等待
//!       │ （每连接并发展开）
//!       ▼
//! ClientHandler ── 创建记录 → 委托流处理 → 保证恰好一次关闭记录
//!       │
//!       ├── StreamHandler（协议字节流解析，外部能力）
//!       └── ConnectionStore（连接记录簿记，外部能力）
//! ```
//!
//! ## 故障隔离
//!
//! - 流处理故障止于 ClientHandler，记录照常关闭
//! - 单个连接的故障不影响同协议的 accept 循环
//! - 单个协议的绑定/循环故障不影响其余协议
//!
//! ## 关停语义
//!
//! 单一关停信号传播到所有挂起点：accept 等待、流读取等待、顶层等待。
//! 信号触发后 accept 循环立即停止并释放监听套接字，
//! 在途连接在有界宽限期内完成清理（传输关闭 + 记录关闭）。

pub mod client;
pub mod error;
pub mod protocol;
pub mod service;
pub mod shutdown;
pub mod stream;
pub mod types;

pub use client::ClientHandler;
pub use error::ListenerError;
pub use protocol::ProtocolHandler;
pub use service::ListenerService;
pub use shutdown::{ShutdownController, ShutdownSignal};
pub use stream::StreamHandler;
pub use types::{Client, Protocol};
