//! 存储接口 Trait 定义
//!
//! 设计原则：
//! - 所有接口返回 StorageError
//! - 使用 async_trait 支持动态分发
//! - create/close 必须可被多个处理单元并发调用

use crate::error::StorageError;
use async_trait::async_trait;
use domain::ConnectionRef;

/// 连接记录存储接口。
///
/// 每个被接受的连接在读取任何字节前创建一条记录，
/// 处理结束时关闭该记录。记录只增不删。
#[async_trait]
pub trait ConnectionStore: Send + Sync {
    /// 创建连接记录，返回后续关闭时使用的引用。
    async fn create_connection(
        &self,
        remote_endpoint: Option<&str>,
        listen_port: u16,
    ) -> Result<ConnectionRef, StorageError>;

    /// 关闭连接记录。
    ///
    /// 不幂等：记录不存在或已关闭时返回错误。
    async fn close_connection(&self, conn: &ConnectionRef) -> Result<(), StorageError>;
}
