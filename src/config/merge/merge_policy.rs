//! Merge rules: defaults, override order, conflict handling.

use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
///
/// Storage paths have no static default; they resolve against the XDG data
/// home at runtime.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("logging.level", "info")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "file")?
        .set_default(
            "deletion.transport_timeout_ms",
            crate::config::DEFAULT_TRANSPORT_TIMEOUT_MS,
        )?
        .set_default("deletion.interactive", true)
}
