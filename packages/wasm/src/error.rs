//! Error types for the culling core.
//!
//! Every error here is a deterministic misuse or configuration mistake.
//! Nothing is retried; errors surface synchronously to the caller.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type CullResult<T> = Result<T, CullError>;

/// Malformed configuration detected while initializing a culling group.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Entity capacity below zero.
    #[error("entity capacity must be >= 0, got {0}")]
    NegativeCapacity(i64),

    /// Entity capacity too large to preallocate.
    #[error("entity capacity {0} is too large")]
    CapacityTooLarge(u64),

    /// No distance thresholds were supplied.
    #[error("at least one distance threshold is required")]
    NoThresholds,

    /// A threshold is zero, negative or NaN.
    #[error("threshold {index} must be a positive number, got {value}")]
    InvalidThreshold { index: usize, value: f32 },

    /// Thresholds are not strictly increasing.
    #[error("thresholds must be strictly increasing: t[{index}] = {current} follows {previous}")]
    NotIncreasing {
        index: usize,
        previous: f32,
        current: f32,
    },

    /// The active band of a scene is outside `[0, N]`.
    #[error("active band {band} exceeds the outermost band {max}")]
    ActiveBandOutOfRange { band: usize, max: usize },
}

/// Errors returned by culling group and selector operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CullError {
    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The group was used after `destroy()`.
    #[error("culling group has been destroyed")]
    Disposed,

    /// Closest-object selection over zero candidates.
    #[error("cannot select the closest entity from an empty candidate set")]
    EmptySet,

    /// A band query asked for a band past the outermost one.
    #[error("band {band} out of range (bands 0..={max})")]
    BandOutOfRange { band: usize, max: usize },

    /// A candidate index has no matching position.
    #[error("candidate index {index} has no position")]
    CandidateOutOfRange { index: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_converts() {
        let err: CullError = ConfigError::NegativeCapacity(-3).into();
        assert_eq!(err, CullError::Config(ConfigError::NegativeCapacity(-3)));
        assert_eq!(
            err.to_string(),
            "invalid configuration: entity capacity must be >= 0, got -3"
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            CullError::BandOutOfRange { band: 7, max: 5 }.to_string(),
            "band 7 out of range (bands 0..=5)"
        );
        assert_eq!(
            CullError::Disposed.to_string(),
            "culling group has been destroyed"
        );
    }
}
