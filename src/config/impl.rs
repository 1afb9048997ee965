use std::env;

use config::{Config, Environment, File};

use super::StaticConfig;
use crate::errors::Result;

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：旧版环境变量 > ENV(QL__) > config.toml > 默认值
    /// ENV 前缀：QL，分隔符：__，例如 QL__SERVER__PORT=9999
    ///
    /// 兼容的旧版环境变量：SERVER_PORT、REDIS_ADDRESS、ANALYTICS_DATABASE_URL
    pub fn load(path: &str) -> Result<Self> {
        let builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("QL")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.port", env::var("SERVER_PORT").ok())?
            .set_override_option(
                "redis.url",
                env::var("REDIS_ADDRESS")
                    .ok()
                    .map(|addr| normalize_redis_url(&addr)),
            )?
            .set_override_option(
                "analytics.database_url",
                env::var("ANALYTICS_DATABASE_URL").ok(),
            )?;

        let config = builder.build()?.try_deserialize::<StaticConfig>()?;

        if std::path::Path::new(path).exists() {
            eprintln!("[INFO] Configuration loaded from: {}", path);
        }

        Ok(config)
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }
}

/// 补全 Redis 地址：`host:port` → `redis://host:port/`
pub fn normalize_redis_url(address: &str) -> String {
    let address = address.trim();
    if address.contains("://") {
        address.to_string()
    } else {
        format!("redis://{}/", address)
    }
}
