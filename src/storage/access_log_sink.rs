use async_trait::async_trait;
use sea_orm::{ActiveValue::Set, DatabaseConnection, EntityTrait};
use tracing::trace;

use crate::analytics::{AccessLogEntry, AccessLogSink};
use crate::errors::Result;

use migration::entities::access_log;

/// 把访问记录逐条写入 `access_logs` 表
pub struct SeaOrmAccessLogSink {
    db: DatabaseConnection,
}

impl SeaOrmAccessLogSink {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// 连接数据库并执行迁移
    pub async fn connect(database_url: &str) -> Result<Self> {
        let db = super::connect(database_url).await?;
        super::run_migrations(&db).await?;
        Ok(Self::new(db))
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl AccessLogSink for SeaOrmAccessLogSink {
    async fn log_access(&self, entry: AccessLogEntry) -> anyhow::Result<()> {
        let model = access_log::ActiveModel {
            short_id: Set(entry.short_id.clone()),
            timestamp: Set(entry.timestamp),
            user_ip: Set(entry.client_ip),
            ..Default::default()
        };

        access_log::Entity::insert(model)
            .exec(&self.db)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to insert access log: {}", e))?;

        trace!("Access log inserted for {}", entry.short_id);
        Ok(())
    }
}
