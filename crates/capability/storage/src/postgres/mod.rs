//! PostgreSQL 存储实现
//!
//! 使用 sqlx 提供类型安全的数据库访问，
//! 所有 SQL 查询使用参数化，防止 SQL 注入。

mod connection;

pub use connection::PgConnectionStore;
