//! Postgres 连接记录存储实现
//!
//! 表结构（device_connections）：
//! connection_id text primary key, remote_endpoint text,
//! listen_port int, opened_at_ms bigint, closed_at_ms bigint, device_id text
//!
//! 设计要点：
//! - 关闭操作带 `closed_at_ms is null` 条件，同一记录重复关闭会命中 0 行并报错

use crate::error::StorageError;
use crate::traits::ConnectionStore;
use domain::{ConnectionRef, now_epoch_ms};
use sqlx::PgPool;

pub struct PgConnectionStore {
    pub pool: PgPool,
}

impl PgConnectionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = crate::connection::connect_pool(database_url).await?;
        Ok(Self { pool })
    }
}

#[async_trait::async_trait]
impl ConnectionStore for PgConnectionStore {
    async fn create_connection(
        &self,
        remote_endpoint: Option<&str>,
        listen_port: u16,
    ) -> Result<ConnectionRef, StorageError> {
        let connection_id = uuid::Uuid::new_v4().to_string();
        sqlx::query(
            "insert into device_connections \
             (connection_id, remote_endpoint, listen_port, opened_at_ms) \
             values ($1, $2, $3, $4)",
        )
        .bind(&connection_id)
        .bind(remote_endpoint)
        .bind(listen_port as i32)
        .bind(now_epoch_ms())
        .execute(&self.pool)
        .await?;
        Ok(ConnectionRef::new(connection_id))
    }

    async fn close_connection(&self, conn: &ConnectionRef) -> Result<(), StorageError> {
        let result = sqlx::query(
            "update device_connections set closed_at_ms = $1 \
             where connection_id = $2 and closed_at_ms is null",
        )
        .bind(now_epoch_ms())
        .bind(&conn.connection_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::new("connection not found or already closed"));
        }
        Ok(())
    }
}
