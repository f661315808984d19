//! HTTP response domain types

mod spec;
mod typed;

pub use spec::ResponseSpec;
pub use typed::ApiResponse;
