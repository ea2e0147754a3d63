//! 行分隔文本协议
//!
//! 设备以换行分隔的 ASCII 行上报遥测，行内格式为
//! `device_id,payload...`。本层只做帧切分与长度约束，
//! 字段语义由后续管线解析。

use async_trait::async_trait;
use geotrack_listener::{ListenerError, ShutdownSignal, StreamHandler};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::net::TcpStream;
use tracing::debug;

pub struct LineDelimitedHandler {
    max_line_bytes: usize,
}

impl LineDelimitedHandler {
    pub fn new(max_line_bytes: usize) -> Self {
        Self { max_line_bytes }
    }
}

#[async_trait]
impl StreamHandler for LineDelimitedHandler {
    async fn consume(
        &self,
        shutdown: &ShutdownSignal,
        stream: &mut BufReader<&mut TcpStream>,
    ) -> Result<(), ListenerError> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let read = {
                // 限读防止恶意对端撑爆单行缓冲
                let mut limited = (&mut *stream).take((self.max_line_bytes + 1) as u64);
                tokio::select! {
                    read = limited.read_until(b'\n', &mut buf) => read?,
                    () = shutdown.cancelled() => return Ok(()),
                }
            };

            if read == 0 {
                // 对端有序关闭
                return Ok(());
            }
            if buf.len() > self.max_line_bytes {
                return Err(ListenerError::Protocol(format!(
                    "line exceeds {} bytes",
                    self.max_line_bytes
                )));
            }

            let line = String::from_utf8_lossy(&buf);
            let data = line.trim();
            if data.is_empty() {
                continue;
            }
            let device_id = data.split(',').next().unwrap_or(data);
            debug!(device_id = %device_id, bytes = read, "received line");
        }
    }
}
