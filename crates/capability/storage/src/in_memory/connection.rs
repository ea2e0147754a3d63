//! 连接记录内存实现（用于测试与无数据库运行）。

use crate::error::StorageError;
use crate::traits::ConnectionStore;
use domain::{ConnectionRef, DeviceConnectionRecord, now_epoch_ms};
use std::collections::HashMap;
use std::sync::RwLock;

pub struct InMemoryConnectionStore {
    records: RwLock<HashMap<String, DeviceConnectionRecord>>,
}

impl InMemoryConnectionStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// 查找单条记录（测试辅助）。
    pub fn find(&self, connection_id: &str) -> Option<DeviceConnectionRecord> {
        self.records
            .read()
            .ok()
            .and_then(|map| map.get(connection_id).cloned())
    }

    /// 列出全部记录（测试辅助）。
    pub fn list_connections(&self) -> Vec<DeviceConnectionRecord> {
        self.records
            .read()
            .map(|map| map.values().cloned().collect())
            .unwrap_or_default()
    }

    /// 仍处于打开状态的记录数（测试辅助）。
    pub fn open_count(&self) -> usize {
        self.records
            .read()
            .map(|map| map.values().filter(|record| record.is_open()).count())
            .unwrap_or_default()
    }
}

impl Default for InMemoryConnectionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ConnectionStore for InMemoryConnectionStore {
    async fn create_connection(
        &self,
        remote_endpoint: Option<&str>,
        listen_port: u16,
    ) -> Result<ConnectionRef, StorageError> {
        let connection_id = uuid::Uuid::new_v4().to_string();
        let record = DeviceConnectionRecord {
            connection_id: connection_id.clone(),
            remote_endpoint: remote_endpoint.map(|endpoint| endpoint.to_string()),
            listen_port,
            opened_at_ms: now_epoch_ms(),
            closed_at_ms: None,
            device_id: None,
        };
        let mut map = self
            .records
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        map.insert(connection_id.clone(), record);
        Ok(ConnectionRef::new(connection_id))
    }

    async fn close_connection(&self, conn: &ConnectionRef) -> Result<(), StorageError> {
        let mut map = self
            .records
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let record = map
            .get_mut(&conn.connection_id)
            .ok_or_else(|| StorageError::new("connection not found"))?;
        if record.closed_at_ms.is_some() {
            return Err(StorageError::new("connection already closed"));
        }
        record.closed_at_ms = Some(now_epoch_ms());
        Ok(())
    }
}
