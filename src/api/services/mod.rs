pub mod lookup;
pub mod shorten;

pub use lookup::{LookupService, lookup_routes};
pub use shorten::{ShortenService, shorten_routes};
