use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

/// Anchor frequency of the ITU-T G.694.1 grid in THz.
pub const CENTER_FREQUENCY_THZ: f64 = 193.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GridType {
    Dwdm,
    Cwdm,
    Flex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ChannelSpacing {
    #[serde(rename = "CHL_100GHZ")]
    Chl100Ghz,
    #[serde(rename = "CHL_50GHZ")]
    Chl50Ghz,
    #[serde(rename = "CHL_25GHZ")]
    Chl25Ghz,
    #[serde(rename = "CHL_12P5GHZ")]
    Chl12p5Ghz,
    #[serde(rename = "CHL_6P25GHZ")]
    Chl6p25Ghz,
}

impl ChannelSpacing {
    pub fn ghz(&self) -> f64 {
        match self {
            ChannelSpacing::Chl100Ghz => 100.0,
            ChannelSpacing::Chl50Ghz => 50.0,
            ChannelSpacing::Chl25Ghz => 25.0,
            ChannelSpacing::Chl12p5Ghz => 12.5,
            ChannelSpacing::Chl6p25Ghz => 6.25,
        }
    }

    /// Spacing expressed in 6.25 GHz steps.
    fn fine_steps(&self) -> i32 {
        match self {
            ChannelSpacing::Chl100Ghz => 16,
            ChannelSpacing::Chl50Ghz => 8,
            ChannelSpacing::Chl25Ghz => 4,
            ChannelSpacing::Chl12p5Ghz => 2,
            ChannelSpacing::Chl6p25Ghz => 1,
        }
    }
}

/// One optical channel on a grid. The center frequency is
/// `193.1 THz + spacing_multiplier * channel_spacing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OchSignal {
    pub grid_type: GridType,
    pub channel_spacing: ChannelSpacing,
    pub spacing_multiplier: i32,
    pub slot_granularity: i32,
}

impl OchSignal {
    pub fn new_dwdm_slot(channel_spacing: ChannelSpacing, spacing_multiplier: i32) -> Self {
        Self { grid_type: GridType::Dwdm, channel_spacing, spacing_multiplier, slot_granularity: 4 }
    }

    /// A 12.5 GHz wide flex-grid slot. `spacing_multiplier` counts 6.25 GHz steps.
    pub fn new_flex_grid_slot(spacing_multiplier: i32) -> Self {
        Self { grid_type: GridType::Flex, channel_spacing: ChannelSpacing::Chl6p25Ghz, spacing_multiplier, slot_granularity: 1 }
    }

    pub fn center_frequency_thz(&self) -> f64 {
        CENTER_FREQUENCY_THZ + self.spacing_multiplier as f64 * self.channel_spacing.ghz() / 1000.0
    }

    /// Expands a fixed-grid channel into the flex-grid slots that make up its
    /// spectrum. A 50 GHz channel `m` covers slots `8m-3, 8m-1, 8m+1, 8m+3`.
    pub fn to_flex_grid(&self) -> Vec<OchSignal> {
        if self.grid_type == GridType::Flex {
            return vec![*self];
        }
        let steps = self.channel_spacing.fine_steps();
        let slots = (steps / 2).max(1);
        let start = 1 - slots + self.spacing_multiplier * steps;
        (0..slots).map(|i| OchSignal::new_flex_grid_slot(start + 2 * i)).collect()
    }

    /// Collapses flex-grid slots into fixed-grid channels of `spacing`.
    ///
    /// Only aligned groups where every slot of the channel is present produce
    /// a channel. Stray slots are dropped.
    pub fn from_resource_grid(slots: &[OchSignal], spacing: ChannelSpacing) -> Vec<OchSignal> {
        let available: BTreeSet<i32> =
            slots.iter().filter(|s| s.grid_type == GridType::Flex).map(|s| s.spacing_multiplier).collect();

        let steps = spacing.fine_steps();
        let width = (steps / 2).max(1);

        available
            .iter()
            .filter(|&&start| (start - 1 + width).rem_euclid(steps) == 0)
            .filter(|&&start| (1..width).all(|i| available.contains(&(start + 2 * i))))
            .map(|&start| OchSignal::new_dwdm_slot(spacing, (start - 1 + width) / steps))
            .collect()
    }
}

/// Orders by grid, spacing, then ascending frequency.
impl Ord for OchSignal {
    fn cmp(&self, other: &Self) -> Ordering {
        self.grid_type
            .cmp(&other.grid_type)
            .then(self.channel_spacing.cmp(&other.channel_spacing))
            .then(self.spacing_multiplier.cmp(&other.spacing_multiplier))
            .then(self.slot_granularity.cmp(&other.slot_granularity))
    }
}

impl PartialOrd for OchSignal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for OchSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}/{:.2}GHz/{}/{}", self.grid_type, self.channel_spacing.ghz(), self.spacing_multiplier, self.slot_granularity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_flex_grid_50ghz() {
        let slots = OchSignal::new_dwdm_slot(ChannelSpacing::Chl50Ghz, -35).to_flex_grid();
        let multipliers: Vec<i32> = slots.iter().map(|s| s.spacing_multiplier).collect();
        assert_eq!(multipliers, vec![-283, -281, -279, -277]);
    }

    #[test]
    fn test_from_resource_grid_keeps_aligned_groups() {
        let mut slots = OchSignal::new_dwdm_slot(ChannelSpacing::Chl50Ghz, 2).to_flex_grid();
        slots.extend(OchSignal::new_dwdm_slot(ChannelSpacing::Chl50Ghz, -1).to_flex_grid());
        // Partial channel 5: its last slot is missing.
        slots.extend(OchSignal::new_dwdm_slot(ChannelSpacing::Chl50Ghz, 5).to_flex_grid().into_iter().take(3));

        let channels = OchSignal::from_resource_grid(&slots, ChannelSpacing::Chl50Ghz);
        let multipliers: Vec<i32> = channels.iter().map(|s| s.spacing_multiplier).collect();
        assert_eq!(multipliers, vec![-1, 2]);
    }

    #[test]
    fn test_from_resource_grid_ignores_misaligned_run() {
        // Four contiguous slots that straddle two channels.
        let slots: Vec<OchSignal> = [9, 11, 13, 15].into_iter().map(OchSignal::new_flex_grid_slot).collect();
        assert!(OchSignal::from_resource_grid(&slots, ChannelSpacing::Chl50Ghz).is_empty());
    }

    #[test]
    fn test_center_frequency() {
        let signal = OchSignal::new_dwdm_slot(ChannelSpacing::Chl50Ghz, -35);
        assert!((signal.center_frequency_thz() - 191.35).abs() < 1e-9);
    }
}
