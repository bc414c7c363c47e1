//! HTTP endpoint server.

pub mod http;
