// csp-net/src/lib.rs
pub mod http;
pub mod validation;

pub use http::download_tool;
pub use validation::validate_url;
