//! 业务逻辑层
//!
//! HTTP 处理器只做请求解析和响应映射，规则都在这里。

mod id_generator;
mod link_service;

pub use id_generator::*;
pub use link_service::*;
