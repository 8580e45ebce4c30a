//! Environment variable source: CLUSTERDECK__ prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

pub const ENV_PREFIX: &str = "CLUSTERDECK";

/// Add environment variable overlay to builder.
///
/// `CLUSTERDECK__DELETION__INTERACTIVE=false` maps to `deletion.interactive`.
/// The double underscore after the prefix keeps these apart from the
/// single-underscore `CLUSTERDECK_LOG*` logging overrides.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(builder.add_source(source()))
}

pub fn source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}
