//! Subscriber setup shared by the binaries.

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// `RUST_LOG`-style directives layered over a default level.
pub fn env_filter(directives: Option<&str>, default: Level) -> EnvFilter {
    EnvFilter::builder()
        .parse_lossy(directives.unwrap_or_default())
        .add_directive(default.into())
}

pub fn init(default: Level) {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);

    tracing_subscriber::registry()
        .with(env_filter(directives.as_deref(), default))
        .with(stdout_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn test_default_level_without_directives() {
        let filter = env_filter(None, Level::WARN);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn test_target_directive_raises_verbosity() {
        let filter = env_filter(Some("indexcast=debug"), Level::WARN);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }
}
