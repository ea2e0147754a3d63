//! # 连接记录存储模块
//!
//! 提供设备连接记录的统一存储抽象，支持多种存储后端实现。
//!
//! ## 架构设计
//!
//! 1. **接口抽象层** (`traits.rs`)：定义 `ConnectionStore` 异步接口
//! 2. **错误处理层** (`error.rs`)：统一的存储错误类型
//! 3. **连接管理层** (`connection.rs`)：数据库连接池管理
//! 4. **实现层**：
//!    - `in_memory/`：内存存储实现（用于测试和演示）
//!    - `postgres/`：PostgreSQL 存储实现（生产环境使用）
//!
//! ## 并发约定
//!
//! 所有实现必须容忍多个连接处理单元并发调用 create/close，
//! 每个调用方只写自己创建的记录。关闭不保证幂等：
//! 对同一记录重复关闭返回错误，调用方需保证至多关闭一次。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use geotrack_storage::{ConnectionStore, InMemoryConnectionStore};
//!
//! let store = InMemoryConnectionStore::new();
//! let conn = store.create_connection(Some("10.0.0.1:40000"), 5027).await?;
//! store.close_connection(&conn).await?;
//! ```

pub mod connection;
pub mod error;
pub mod in_memory;
pub mod postgres;
pub mod traits;

pub use connection::connect_pool;
pub use error::StorageError;
pub use in_memory::InMemoryConnectionStore;
pub use postgres::PgConnectionStore;
pub use traits::ConnectionStore;
