//! HTTP request domain types

mod config;
mod header;
mod method;

pub use config::{RequestConfig, is_absolute_url};
pub use header::{Header, Headers};
pub use method::HttpMethod;
