//! quicklink - A small URL shortener service
//!
//! 提供短链接生成与解析、按客户端 IP 的固定窗口限流，以及异步访问日志。
//!
//! # Architecture
//! - `store`: KV 存储适配（Redis / 内存）
//! - `rate_limit`: 固定窗口限流
//! - `services`: ID 生成与短链接核心逻辑
//! - `analytics`: 访问日志管道与 Sink
//! - `storage`: 访问日志数据库（Sea-ORM）
//! - `api`: HTTP 路由与中间件
//! - `config`: 配置加载
//! - `runtime`: 启动、运行与关闭流程
//! - `system`: 日志初始化

pub mod analytics;
pub mod api;
pub mod config;
pub mod errors;
pub mod rate_limit;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod store;
pub mod system;
pub mod utils;
