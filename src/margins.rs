use serde::{Deserialize, Serialize};

/// Technical press margins, in millimetres, applied during layout
/// calculation. Passed explicitly so per-press or per-category overrides
/// need no code change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginConfig {
    /// Cutting-tolerance allowance around the trim edges.
    #[serde(default = "MarginConfig::default_bleed")]
    pub bleed: f64,
    /// Spacing between adjacent items on the sheet.
    #[serde(default = "MarginConfig::default_gap")]
    pub gap: f64,
    /// Press-grip exclusion zone, applied along the width only.
    #[serde(default = "MarginConfig::default_gripper")]
    pub gripper: f64,
    /// Extra allowance applied near capacity boundaries.
    #[serde(default = "MarginConfig::default_safety")]
    pub safety: f64,
}

impl MarginConfig {
    pub const DEFAULT_BLEED: f64 = 2.0;
    pub const DEFAULT_GAP: f64 = 2.0;
    pub const DEFAULT_GRIPPER: f64 = 5.0;
    pub const DEFAULT_SAFETY: f64 = 1.0;

    fn default_bleed() -> f64 {
        Self::DEFAULT_BLEED
    }

    fn default_gap() -> f64 {
        Self::DEFAULT_GAP
    }

    fn default_gripper() -> f64 {
        Self::DEFAULT_GRIPPER
    }

    fn default_safety() -> f64 {
        Self::DEFAULT_SAFETY
    }
}

impl Default for MarginConfig {
    fn default() -> Self {
        Self {
            bleed: Self::DEFAULT_BLEED,
            gap: Self::DEFAULT_GAP,
            gripper: Self::DEFAULT_GRIPPER,
            safety: Self::DEFAULT_SAFETY,
        }
    }
}
