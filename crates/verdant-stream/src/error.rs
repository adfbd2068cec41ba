//! Errors raised while setting up streaming.

use verdant_terrain::BiomeTableError;

/// Construction-time failures of the streaming controller.
///
/// Once constructed, updates have no error path.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// A setting would produce degenerate chunks or an empty window.
    #[error("invalid streaming setting {field}: {reason}")]
    InvalidSetting {
        /// Dotted config path of the offending field.
        field: &'static str,
        /// Human-readable explanation.
        reason: String,
    },

    /// The configured biome table could not be built.
    #[error("failed to build biome table: {0}")]
    Biomes(#[from] BiomeTableError),

    /// Generation worker threads could not be started.
    #[error("failed to start generation workers: {0}")]
    Workers(#[from] std::io::Error),
}
