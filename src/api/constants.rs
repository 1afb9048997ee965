//! HTTP 响应中的固定错误文案
//!
//! 客户端依赖这些字符串，修改前需要确认兼容性。

pub const ERR_READ_URL: &str = "Failed to read url";
pub const ERR_GENERATE_ID: &str = "Failed to generate short ID";
pub const ERR_SAVE_URL: &str = "Failed to save URL";
pub const ERR_NOT_FOUND: &str = "Short URL not found";
pub const ERR_RATE_LIMITED: &str = "Rate limit exceeded. Please wait a minute before trying again.";
pub const ERR_RATE_LIMIT_CHECK: &str = "Failed to check rate limit";
