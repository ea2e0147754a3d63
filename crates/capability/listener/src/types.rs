//! 核心运行时类型
//!
//! Protocol 在启动时构造且之后不可变；Client 由且仅由
//! 一个 ClientHandler 处理单元持有，处理结束即销毁。

use crate::stream::StreamHandler;
use domain::{ConnectionRef, ProtocolSpec};
use std::sync::Arc;
use tokio::net::TcpStream;

/// 运行时协议条目：静态配置 + 流处理能力。
#[derive(Clone)]
pub struct Protocol {
    pub spec: ProtocolSpec,
    pub handler: Arc<dyn StreamHandler>,
}

impl Protocol {
    pub fn new(spec: ProtocolSpec, handler: Arc<dyn StreamHandler>) -> Self {
        Self { spec, handler }
    }
}

impl std::fmt::Debug for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Protocol").field("spec", &self.spec).finish()
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.spec, f)
    }
}

/// 一个被接受连接在其处理期内的内存句柄。
#[derive(Debug)]
pub struct Client {
    /// 底层传输，由处理单元独占
    pub stream: TcpStream,
    /// 接受该连接的协议
    pub protocol: Protocol,
    /// 连接记录引用（记录创建后填入）
    pub connection: Option<ConnectionRef>,
}

impl Client {
    pub fn new(stream: TcpStream, protocol: Protocol) -> Self {
        Self {
            stream,
            protocol,
            connection: None,
        }
    }
}
