pub mod args;
mod r#impl;
mod structs;

pub use args::CliArgs;
pub use r#impl::normalize_redis_url;
pub use structs::*;
