//! Tracing bootstrap.
//!
//! Production emits JSON lines for log aggregation; any other environment
//! gets the human-readable ANSI format. `RUST_LOG` overrides the default
//! `info` filter.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::get_environment;

pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let base = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stdout);

    let registry = tracing_subscriber::registry().with(filter);
    match get_environment().as_str() {
        "production" | "prod" => registry.with(base.json()).init(),
        _ => registry.with(base.with_ansi(true)).init(),
    }
}
