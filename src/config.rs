use alloc::vec::Vec;

use embassy_time::Duration;
use log::error;
use serde::{Deserialize, Serialize};

use crate::error::{GuiError, GuiResult};
use crate::touch::{Calibration, Orientation};

/// Runtime settings of a [`Screen`](crate::Screen)
///
/// Stored as a postcard blob, e.g. in a flash partition, and decoded at boot.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuiConfig {
    pub calibration: Calibration,
    pub orientation: Orientation,
    /// Touch sampling period in milliseconds
    pub sample_period_ms: u32,
    /// Initial backlight level, 0-100
    pub backlight: u8,
    /// How long an error message stays on screen, in milliseconds
    pub error_hold_ms: u32,
}

impl Default for GuiConfig {
    fn default() -> Self {
        Self {
            calibration: Calibration::default(),
            orientation: Orientation::Landscape,
            sample_period_ms: 50,
            backlight: 100,
            error_hold_ms: 3000,
        }
    }
}

impl GuiConfig {
    pub fn from_bytes(bytes: &[u8]) -> GuiResult<Self> {
        postcard::from_bytes(bytes).map_err(|e| {
            error!("Failed to decode GUI config: {:?}", e);
            GuiError::Config
        })
    }

    pub fn to_vec(&self) -> GuiResult<Vec<u8>> {
        postcard::to_allocvec(self).map_err(|e| {
            error!("Failed to encode GUI config: {:?}", e);
            GuiError::Config
        })
    }

    pub fn sample_period(&self) -> Duration {
        Duration::from_millis(u64::from(self.sample_period_ms.max(1)))
    }

    pub fn error_hold(&self) -> Duration {
        Duration::from_millis(u64::from(self.error_hold_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_round_trip() {
        let config = GuiConfig {
            orientation: Orientation::PortraitFlip,
            backlight: 40,
            ..GuiConfig::default()
        };
        let blob = config.to_vec().unwrap();
        assert_eq!(GuiConfig::from_bytes(&blob).unwrap(), config);
    }

    #[test]
    fn test_truncated_blob_is_rejected() {
        let blob = GuiConfig::default().to_vec().unwrap();
        let err = GuiConfig::from_bytes(&blob[..2]).unwrap_err();
        assert!(matches!(err, GuiError::Config));
        assert_eq!(err.kind(), crate::error::ErrorKind::Configuration);
    }

    #[test]
    fn test_durations() {
        let config = GuiConfig::default();
        assert_eq!(config.sample_period(), Duration::from_millis(50));
        assert_eq!(config.error_hold(), Duration::from_secs(3));
    }
}
