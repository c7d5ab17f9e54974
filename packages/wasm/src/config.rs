//! Static configuration for a culling group.
//!
//! The configuration surface is set once at initialization: entity capacity,
//! the ordered distance-band thresholds, and how entities beyond the
//! outermost threshold are treated.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Thresholds used when a configuration does not name any.
pub const DEFAULT_THRESHOLDS: [f32; 4] = [1.0, 5.0, 25.0, 125.0];

/// How entities farther than the outermost threshold are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BeyondOutermost {
    /// Band `N` counts as not visible.
    #[default]
    Culled,
    /// Band `N` is still visible, just the farthest band.
    Visible,
}

/// A validated, strictly increasing sequence of positive distance thresholds.
///
/// `N` thresholds partition space into `N + 1` bands. Band `k` covers
/// distances in `[t[k-1], t[k])`, with 0 as the lower bound of band 0 and
/// +infinity as the upper bound of band `N`. A distance exactly on a threshold
/// belongs to the band above it.
#[derive(Debug, Clone, PartialEq)]
pub struct BandThresholds {
    values: Vec<f32>,
}

impl BandThresholds {
    /// Validate and wrap a threshold list.
    pub fn new(values: &[f32]) -> Result<Self, ConfigError> {
        if values.is_empty() {
            return Err(ConfigError::NoThresholds);
        }

        for (index, &value) in values.iter().enumerate() {
            // NaN fails this comparison too
            if !(value > 0.0) {
                return Err(ConfigError::InvalidThreshold { index, value });
            }
            if index > 0 && value <= values[index - 1] {
                return Err(ConfigError::NotIncreasing {
                    index,
                    previous: values[index - 1],
                    current: value,
                });
            }
        }

        Ok(Self {
            values: values.to_vec(),
        })
    }

    /// The raw threshold values.
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// Index of the outermost band (`N`, the band beyond every threshold).
    #[inline]
    pub fn outermost_band(&self) -> usize {
        self.values.len()
    }

    /// The outermost threshold.
    #[inline]
    pub fn outer_limit(&self) -> f32 {
        // Non-empty by construction
        self.values[self.values.len() - 1]
    }

    /// Classify a distance into its band.
    #[inline]
    pub fn classify(&self, distance: f32) -> usize {
        self.values.partition_point(|&threshold| threshold <= distance)
    }
}

impl Default for BandThresholds {
    fn default() -> Self {
        Self {
            values: DEFAULT_THRESHOLDS.to_vec(),
        }
    }
}

/// Serializable configuration for [`crate::culling::CullingGroup`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CullingConfig {
    /// Expected upper bound on entity count. Signed so that a negative value
    /// coming from JS or JSON is rejected instead of wrapping.
    pub capacity: i64,
    /// Distance-band thresholds, strictly increasing.
    pub thresholds: Vec<f32>,
    /// Initial reference point.
    pub reference_point: [f32; 3],
    /// Treatment of the band beyond the outermost threshold.
    pub beyond_outermost: BeyondOutermost,
}

impl Default for CullingConfig {
    fn default() -> Self {
        Self {
            capacity: 0,
            thresholds: DEFAULT_THRESHOLDS.to_vec(),
            reference_point: [0.0; 3],
            beyond_outermost: BeyondOutermost::Culled,
        }
    }
}

impl CullingConfig {
    /// Check the configuration, returning the capacity and thresholds.
    pub fn validate(&self) -> Result<(usize, BandThresholds), ConfigError> {
        let capacity = validate_capacity(self.capacity)?;
        let thresholds = BandThresholds::new(&self.thresholds)?;
        Ok((capacity, thresholds))
    }
}

/// Reject negative capacities and ones that do not fit the address space.
pub fn validate_capacity(capacity: i64) -> Result<usize, ConfigError> {
    if capacity < 0 {
        return Err(ConfigError::NegativeCapacity(capacity));
    }
    usize::try_from(capacity).map_err(|_| ConfigError::CapacityTooLarge(capacity as u64))
}
