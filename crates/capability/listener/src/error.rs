//! 监听核心错误类型定义

/// 监听与流处理错误。
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// IO 错误
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// 协议违规（帧格式、长度越界等）
    #[error("protocol violation: {0}")]
    Protocol(String),

    /// 存储错误
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<geotrack_storage::StorageError> for ListenerError {
    fn from(err: geotrack_storage::StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}
