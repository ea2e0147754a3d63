//! 连接记录模型
//!
//! DeviceConnectionRecord 表示一次逻辑连接实例的持久化记录：
//! 对每个被接受的连接恰好创建一次（读取任何字节之前），
//! 结束时恰好关闭一次。记录只增不删。

use serde::{Deserialize, Serialize};

/// 连接记录引用：存储层返回的不透明句柄。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionRef {
    pub connection_id: String,
}

impl ConnectionRef {
    pub fn new(connection_id: impl Into<String>) -> Self {
        Self {
            connection_id: connection_id.into(),
        }
    }
}

/// 设备连接记录。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConnectionRecord {
    /// 连接 ID
    pub connection_id: String,
    /// 远端地址（best-effort，可能无法解析）
    pub remote_endpoint: Option<String>,
    /// 接受该连接的监听端口
    pub listen_port: u16,
    /// 打开时间戳（毫秒）
    pub opened_at_ms: i64,
    /// 关闭时间戳（毫秒），未关闭时为 None
    pub closed_at_ms: Option<i64>,
    /// 设备标识（由协议流处理器在后续解析，可能始终为空）
    pub device_id: Option<String>,
}

impl DeviceConnectionRecord {
    /// 记录是否仍处于打开状态。
    pub fn is_open(&self) -> bool {
        self.closed_at_ms.is_none()
    }
}
