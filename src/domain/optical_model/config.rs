use serde::{Deserialize, Serialize};

use crate::domain::optical_model::quality::config::QualityConfig;

pub const DEFAULT_K: usize = 3;
pub const DEFAULT_LOWEST_FREQUENCY_THZ: f64 = 191.35;

/// Lowest frequency accepted for the frequency id origin.
pub const MIN_LOWEST_FREQUENCY_THZ: f64 = 186.20;

/// Settings of the optimizer. Every field is optional in the JSON document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptimizerConfig {
    /// Number of shortest paths computed per device pair.
    pub k: usize,

    /// Center frequency of frequency id 1.
    #[serde(rename = "lowestFrequencyTHzForCalcId")]
    pub lowest_frequency_thz_for_calc_id: f64,

    /// CSV file receiving wavelength-path events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_journal: Option<String>,

    pub quality: QualityConfig,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            lowest_frequency_thz_for_calc_id: DEFAULT_LOWEST_FREQUENCY_THZ,
            event_journal: None,
            quality: QualityConfig::default(),
        }
    }
}

impl OptimizerConfig {
    /// Replaces invalid values with their defaults, logging each replacement.
    pub fn validated(mut self) -> Self {
        if self.k == 0 {
            log::error!("Parameter 'k' must be positive. Using {}.", DEFAULT_K);
            self.k = DEFAULT_K;
        }

        let lowest = self.lowest_frequency_thz_for_calc_id;
        if !lowest.is_finite() || lowest < MIN_LOWEST_FREQUENCY_THZ {
            log::error!(
                "Parameter 'lowestFrequencyTHzForCalcId' must be at least {}, got {}. Using {}.",
                MIN_LOWEST_FREQUENCY_THZ,
                lowest,
                DEFAULT_LOWEST_FREQUENCY_THZ
            );
            self.lowest_frequency_thz_for_calc_id = DEFAULT_LOWEST_FREQUENCY_THZ;
        }

        self.quality = self.quality.validated();
        self
    }
}
