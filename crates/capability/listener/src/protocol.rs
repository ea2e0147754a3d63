//! 单协议 accept 循环
//!
//! ProtocolHandler 独占一个协议的监听套接字：绑定与循环分离，
//! 便于以端口 0 绑定后读取实际地址。循环内对每个被接受的套接字
//! 构造 Client 并派发独立处理单元，从不等待其完成。
//!
//! 错误分类：
//! - 瞬时 accept 错误（单个握手失败）→ 记日志，循环继续
//! - 致命监听错误（套接字失效）→ 记日志，仅终止本协议的循环

use crate::client::ClientHandler;
use crate::error::ListenerError;
use crate::shutdown::ShutdownSignal;
use crate::types::{Client, Protocol};
use geotrack_telemetry::record_accept_error;
use std::io::ErrorKind;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

pub struct ProtocolHandler {
    client_handler: Arc<ClientHandler>,
}

impl ProtocolHandler {
    pub fn new(client_handler: Arc<ClientHandler>) -> Self {
        Self { client_handler }
    }

    /// 绑定协议的监听套接字。
    ///
    /// 端口 0 表示由系统分配，实际端口通过 `local_addr()` 获知。
    pub async fn bind(protocol: &Protocol) -> Result<TcpListener, ListenerError> {
        let addr = format!("0.0.0.0:{}", protocol.spec.port);
        let listener = TcpListener::bind(&addr).await?;
        info!(
            protocol = %protocol.spec.name,
            "listening on {}",
            listener.local_addr()?
        );
        Ok(listener)
    }

    /// 运行 accept 循环，直到关停触发或监听套接字致命失效。
    ///
    /// 每个处理单元持有 `completion` 的克隆；全部克隆被释放
    /// 即表示所有在途连接已完成清理。循环退出即释放监听套接字。
    pub async fn accept_loop(
        &self,
        shutdown: ShutdownSignal,
        protocol: Protocol,
        listener: TcpListener,
        completion: mpsc::Sender<()>,
    ) {
        loop {
            let accepted = tokio::select! {
                accepted = listener.accept() => accepted,
                () = shutdown.cancelled() => {
                    info!(protocol = %protocol, "shutdown requested, stop accepting");
                    break;
                }
            };

            match accepted {
                Ok((stream, peer_addr)) => {
                    debug!(protocol = %protocol, "accepted {}", peer_addr);
                    let client = Client::new(stream, protocol.clone());
                    let handler = Arc::clone(&self.client_handler);
                    let shutdown = shutdown.clone();
                    let completion = completion.clone();
                    // 派发后不等待：单个连接的处理时间不得阻塞 accept
                    tokio::spawn(async move {
                        handler.handle_client(&shutdown, client).await;
                        drop(completion);
                    });
                }
                Err(err) => {
                    record_accept_error();
                    if is_transient_accept_error(&err) {
                        warn!(protocol = %protocol, "accept failed: {}", err);
                        continue;
                    }
                    error!(protocol = %protocol, "listener failed: {}", err);
                    break;
                }
            }
        }
    }
}

/// 瞬时 accept 错误：来自单个入站连接的失败，不代表监听套接字失效。
fn is_transient_accept_error(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionAborted
            | ErrorKind::ConnectionReset
            | ErrorKind::Interrupted
            | ErrorKind::WouldBlock
            | ErrorKind::TimedOut
    )
}
