//! 顶层编排
//!
//! ListenerService 将配置的协议集合展开为并发、互不影响的
//! accept 循环，然后挂起直到关停信号触发。协议集合为空时
//! 同样挂起，从不提前返回。
//!
//! 关停顺序：
//! 1. 信号触发，所有 accept 循环停止并释放监听套接字
//! 2. 在有界宽限期内等待在途连接处理单元完成各自的清理阶段
//! 3. 宽限期耗尽仍未完成的单元被放弃（仅记日志，进程层面不强杀）

use crate::client::ClientHandler;
use crate::protocol::ProtocolHandler;
use crate::shutdown::ShutdownSignal;
use crate::types::Protocol;
use geotrack_storage::ConnectionStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

pub struct ListenerService {
    store: Arc<dyn ConnectionStore>,
    /// 关停后等待在途连接完成清理的宽限时间
    shutdown_grace: Duration,
}

impl ListenerService {
    pub fn new(store: Arc<dyn ConnectionStore>, shutdown_grace: Duration) -> Self {
        Self {
            store,
            shutdown_grace,
        }
    }

    /// 绑定全部协议的监听套接字。
    ///
    /// 按端口升序处理（日志可读性）。绑定失败只影响该协议：
    /// 记日志后跳过，其余协议照常启动。端口 0 绑定后将协议条目
    /// 中的端口改写为系统分配的实际端口，保证记录归属正确。
    pub async fn bind_protocols(protocols: Vec<Protocol>) -> Vec<(Protocol, TcpListener)> {
        let mut protocols = protocols;
        protocols.sort_by_key(|protocol| protocol.spec.port);

        let mut bound = Vec::with_capacity(protocols.len());
        for mut protocol in protocols {
            match ProtocolHandler::bind(&protocol).await {
                Ok(listener) => {
                    if let Ok(addr) = listener.local_addr() {
                        protocol.spec.port = addr.port();
                    }
                    bound.push((protocol, listener));
                }
                Err(err) => {
                    error!(protocol = %protocol, "bind failed: {}", err);
                }
            }
        }
        bound
    }

    /// 启动全部协议并挂起，直到关停信号触发且清理完成。
    pub async fn run(&self, shutdown: ShutdownSignal, protocols: Vec<Protocol>) {
        let bound = Self::bind_protocols(protocols).await;
        self.run_bound(shutdown, bound).await;
    }

    /// 以已绑定的监听套接字运行（测试可先绑定端口 0 获知地址）。
    pub async fn run_bound(
        &self,
        shutdown: ShutdownSignal,
        bound: Vec<(Protocol, TcpListener)>,
    ) {
        let client_handler = Arc::new(ClientHandler::new(Arc::clone(&self.store)));
        let protocol_handler = Arc::new(ProtocolHandler::new(client_handler));

        // 所有处理单元共享的完成跟踪通道：
        // 发送端克隆全部释放后 recv 返回 None，即全部清理完成
        let (completion, mut completed) = mpsc::channel::<()>(1);

        let mut loops = Vec::with_capacity(bound.len());
        for (protocol, listener) in bound {
            let handler = Arc::clone(&protocol_handler);
            let shutdown = shutdown.clone();
            let completion = completion.clone();
            loops.push(tokio::spawn(async move {
                handler
                    .accept_loop(shutdown, protocol, listener, completion)
                    .await;
            }));
        }

        // 顶层挂起：协议集合为空时也等待信号，从不提前返回
        shutdown.cancelled().await;

        for handle in loops {
            let _ = handle.await;
        }

        drop(completion);
        match tokio::time::timeout(self.shutdown_grace, completed.recv()).await {
            Ok(_) => info!("all client units drained"),
            Err(_) => warn!(
                "shutdown grace of {:?} elapsed with client units still running",
                self.shutdown_grace
            ),
        }
    }
}
