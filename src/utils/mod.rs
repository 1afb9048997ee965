pub mod ip;

pub use ip::{ClientIpPolicy, UNKNOWN_CLIENT};
