//! Process-wide tracing setup.

pub mod tracing;

pub use crate::tracing::LogFormat;

/// Initialize tracing for the process.
///
/// `pretty` selects human-readable output (development); otherwise logs are JSON.
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init(pretty: bool) {
    let format = if pretty { LogFormat::Pretty } else { LogFormat::Json };
    tracing::init(format);
}
