//! 内存存储实现
//!
//! 使用 `RwLock<HashMap>` 提供线程安全的内存存储，
//! 适用于单元测试、集成测试和无数据库的演示运行。

mod connection;

pub use connection::InMemoryConnectionStore;
