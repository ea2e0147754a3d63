//! 长度前缀二进制协议
//!
//! 帧格式：大端 u16 长度前缀 + 载荷。帧与帧之间的 EOF 是有序结束；
//! 帧中途的 EOF、零长帧、超限帧都是协议违规。

use async_trait::async_trait;
use geotrack_listener::{ListenerError, ShutdownSignal, StreamHandler};
use tokio::io::{AsyncReadExt, BufReader};
use tokio::net::TcpStream;
use tracing::debug;

pub struct LengthPrefixedHandler {
    max_frame_bytes: usize,
}

impl LengthPrefixedHandler {
    pub fn new(max_frame_bytes: usize) -> Self {
        Self { max_frame_bytes }
    }
}

#[async_trait]
impl StreamHandler for LengthPrefixedHandler {
    async fn consume(
        &self,
        shutdown: &ShutdownSignal,
        stream: &mut BufReader<&mut TcpStream>,
    ) -> Result<(), ListenerError> {
        loop {
            // 帧边界上的第一个字节单独读取，用于区分有序 EOF 与帧中途断流
            let mut first = [0u8; 1];
            let read = tokio::select! {
                read = stream.read(&mut first) => read?,
                () = shutdown.cancelled() => return Ok(()),
            };
            if read == 0 {
                // 对端有序关闭
                return Ok(());
            }

            let mut second = [0u8; 1];
            tokio::select! {
                result = stream.read_exact(&mut second) => {
                    result.map_err(eof_mid_frame)?;
                }
                () = shutdown.cancelled() => return Ok(()),
            }

            let frame_len = u16::from_be_bytes([first[0], second[0]]) as usize;
            if frame_len == 0 {
                return Err(ListenerError::Protocol("zero-length frame".to_string()));
            }
            if frame_len > self.max_frame_bytes {
                return Err(ListenerError::Protocol(format!(
                    "frame of {} bytes exceeds limit {}",
                    frame_len, self.max_frame_bytes
                )));
            }

            let mut payload = vec![0u8; frame_len];
            tokio::select! {
                result = stream.read_exact(&mut payload) => {
                    result.map_err(eof_mid_frame)?;
                }
                () = shutdown.cancelled() => return Ok(()),
            }

            debug!(bytes = frame_len, "received frame");
        }
    }
}

/// 帧中途断流归类为协议违规，其余 IO 错误原样上抛。
fn eof_mid_frame(err: std::io::Error) -> ListenerError {
    if err.kind() == std::io::ErrorKind::UnexpectedEof {
        ListenerError::Protocol("eof mid-frame".to_string())
    } else {
        ListenerError::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geotrack_listener::ShutdownController;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    async fn socket_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let connect = tokio::spawn(async move { TcpStream::connect(addr).await.expect("connect") });
        let (accepted, _) = listener.accept().await.expect("accept");
        (accepted, connect.await.expect("join"))
    }

    #[tokio::test]
    async fn frames_until_orderly_eof() {
        let (mut server, mut client) = socket_pair().await;
        let (_controller, signal) = ShutdownController::new();
        let handler = LengthPrefixedHandler::new(65535);

        // 两个完整帧，然后有序关闭
        client
            .write_all(&[0, 3, 1, 2, 3, 0, 1, 9])
            .await
            .expect("write");
        drop(client);

        let mut reader = BufReader::new(&mut server);
        handler
            .consume(&signal, &mut reader)
            .await
            .expect("orderly eof");
    }

    #[tokio::test]
    async fn eof_mid_frame_is_protocol_violation() {
        let (mut server, mut client) = socket_pair().await;
        let (_controller, signal) = ShutdownController::new();
        let handler = LengthPrefixedHandler::new(65535);

        // 声明 5 字节载荷但只发 2 字节
        client.write_all(&[0, 5, 1, 2]).await.expect("write");
        drop(client);

        let mut reader = BufReader::new(&mut server);
        let result = handler.consume(&signal, &mut reader).await;
        assert!(matches!(result, Err(ListenerError::Protocol(_))));
    }

    #[tokio::test]
    async fn zero_length_frame_is_protocol_violation() {
        let (mut server, mut client) = socket_pair().await;
        let (_controller, signal) = ShutdownController::new();
        let handler = LengthPrefixedHandler::new(65535);

        client.write_all(&[0, 0]).await.expect("write");

        let mut reader = BufReader::new(&mut server);
        let result = handler.consume(&signal, &mut reader).await;
        assert!(matches!(result, Err(ListenerError::Protocol(_))));
    }

    #[tokio::test]
    async fn oversized_frame_is_protocol_violation() {
        let (mut server, mut client) = socket_pair().await;
        let (_controller, signal) = ShutdownController::new();
        let handler = LengthPrefixedHandler::new(16);

        client.write_all(&[0xff, 0xff]).await.expect("write");

        let mut reader = BufReader::new(&mut server);
        let result = handler.consume(&signal, &mut reader).await;
        assert!(matches!(result, Err(ListenerError::Protocol(_))));
    }
}
