//! 核心领域模型：设备接入监听服务各模块共享的纯数据类型。

pub mod connection;

pub use connection::{ConnectionRef, DeviceConnectionRecord};

/// 协议静态配置：一种设备协议族绑定一个 TCP 监听端口。
///
/// 启动时构造，之后不可变。端口唯一性由配置层保证，核心不做校验。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolSpec {
    /// 协议名（如 "text-line"、"bin-frame"），用于日志与记录归属
    pub name: String,
    /// 监听端口
    pub port: u16,
}

impl ProtocolSpec {
    pub fn new(name: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            port,
        }
    }
}

impl std::fmt::Display for ProtocolSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.name, self.port)
    }
}

/// 获取当前时间戳（毫秒）。
pub fn now_epoch_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
