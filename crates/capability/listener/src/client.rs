//! 单连接生命周期处理
//!
//! ClientHandler 是一个被接受连接的生命周期所有者，执行顺序固定：
//!
//! 1. best-effort 解析远端地址（解析失败不中止处理）
//! 2. 读取任何字节之前创建连接记录
//! 3. 在受限作用域内包装缓冲流
//! 4. 委托协议 StreamHandler 消费字节流
//! 5. 正常返回时显式关闭写半部，向对端宣告有序完成
//! 6. 无论如何结束：关闭传输并恰好一次关闭连接记录
//!
//! 不变量：只要第 2 步执行成功，第 6 步的关闭记录调用恰好执行一次，
//! 故障与关停路径也不例外。流处理故障在此被捕获并记录，不再向外传播。

use crate::error::ListenerError;
use crate::shutdown::ShutdownSignal;
use crate::types::Client;
use geotrack_storage::ConnectionStore;
use geotrack_telemetry::{
    record_connection_closed, record_connection_opened, record_stream_fault,
};
use std::sync::Arc;
use tokio::io::{AsyncWriteExt, BufReader};
use tracing::{debug, error, warn};

pub struct ClientHandler {
    store: Arc<dyn ConnectionStore>,
}

impl ClientHandler {
    pub fn new(store: Arc<dyn ConnectionStore>) -> Self {
        Self { store }
    }

    /// 处理一个被接受的连接，直到其生命周期结束。
    ///
    /// 从不返回错误：所有故障在此终结并记入日志。
    pub async fn handle_client(&self, shutdown: &ShutdownSignal, mut client: Client) {
        let endpoint = client
            .stream
            .peer_addr()
            .ok()
            .map(|addr| addr.to_string());

        // 消费任何字节之前先落记录
        let conn = match self
            .store
            .create_connection(endpoint.as_deref(), client.protocol.spec.port)
            .await
        {
            Ok(conn) => conn,
            Err(err) => {
                // 记录未创建成功，无需关闭；丢弃传输即可
                warn!(
                    protocol = %client.protocol,
                    endpoint = endpoint.as_deref().unwrap_or("<unknown>"),
                    "failed to create connection record: {}",
                    err
                );
                return;
            }
        };
        client.connection = Some(conn.clone());
        record_connection_opened();

        if let Err(err) = Self::consume_stream(shutdown, &mut client).await {
            record_stream_fault();
            error!(
                protocol = %client.protocol,
                endpoint = endpoint.as_deref().unwrap_or("<unknown>"),
                "stream handler failed: {}",
                err
            );
        }

        // 保证的收尾阶段：关闭传输，恰好一次关闭记录
        debug!(
            protocol = %client.protocol,
            "disconnected {}",
            endpoint.as_deref().unwrap_or("<unknown>")
        );
        drop(client.stream);

        if let Err(err) = self.store.close_connection(&conn).await {
            error!(
                protocol = %client.protocol,
                connection_id = %conn.connection_id,
                "failed to close connection record: {}",
                err
            );
        }
        record_connection_closed();
    }

    /// 第 3-5 步：包装缓冲流、委托流处理、正常结束时有序关闭写半部。
    ///
    /// 对关停信号做二次把关：即使 StreamHandler 实现未及时观察信号，
    /// 本层也会在信号触发时立即收卷。
    async fn consume_stream(
        shutdown: &ShutdownSignal,
        client: &mut Client,
    ) -> Result<(), ListenerError> {
        let handler = Arc::clone(&client.protocol.handler);
        {
            let mut reader = BufReader::new(&mut client.stream);
            tokio::select! {
                result = handler.consume(shutdown, &mut reader) => result?,
                () = shutdown.cancelled() => return Ok(()),
            }
        }
        // 正常结束：显式关闭写半部（best-effort，对端可能已先行断开）
        let _ = client.stream.shutdown().await;
        Ok(())
    }
}
