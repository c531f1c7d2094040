use crate::domain::optical_model::signal::och_signal::{ChannelSpacing, GridType, OchSignal};
use crate::error::{Error, Result};

const CENTER_FREQUENCY_MHZ: i64 = 193_100_000;
const CHANNEL_SPACING_MHZ: i64 = 50_000;

/// Maps 50 GHz DWDM channels to operator-facing frequency ids.
///
/// Id `1` is the channel at the configured lowest frequency; ids grow with frequency.
#[derive(Debug, Clone, Copy)]
pub struct FrequencyConverter {
    id_delta: i32,
}

impl FrequencyConverter {
    pub fn new(lowest_frequency_thz: f64) -> Self {
        let lowest_mhz = (lowest_frequency_thz * 1_000_000.0).round() as i64;
        // Integer division truncates toward zero.
        let start_multiplier = (lowest_mhz - CENTER_FREQUENCY_MHZ) / CHANNEL_SPACING_MHZ;
        Self { id_delta: -(start_multiplier as i32) + 1 }
    }

    pub fn id_delta(&self) -> i32 {
        self.id_delta
    }

    pub fn channel_id(&self, signal: &OchSignal) -> Result<i32> {
        if signal.grid_type != GridType::Dwdm || signal.channel_spacing != ChannelSpacing::Chl50Ghz {
            return Err(Error::InvalidArgument(format!("Frequency ids are only defined for 50GHz DWDM channels: {}", signal)));
        }
        Ok(signal.spacing_multiplier + self.id_delta)
    }
}
