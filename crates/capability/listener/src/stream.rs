//! 流处理能力契约
//!
//! StreamHandler 是协议字节流解析的外部能力：
//! 核心只要求"消费一个已连接的流，直到对端结束或关停触发"。

use crate::error::ListenerError;
use crate::shutdown::ShutdownSignal;
use async_trait::async_trait;
use tokio::io::BufReader;
use tokio::net::TcpStream;

/// 协议流处理接口，每种协议一个实现。
///
/// 约定：
/// - 对端有序关闭流 → 返回 `Ok(())`
/// - 观察到关停信号 → 返回 `Ok(())`，不得无限阻塞
/// - 协议违规或 IO 失败 → 返回 `Err`
#[async_trait]
pub trait StreamHandler: Send + Sync {
    async fn consume(
        &self,
        shutdown: &ShutdownSignal,
        stream: &mut BufReader<&mut TcpStream>,
    ) -> Result<(), ListenerError>;
}
