//! Transport layer for the USAspending client.

pub mod http;

pub use http::HttpTransport;
