use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::optical_model::quality::parameter_table::ParameterTable;
use crate::domain::optical_model::signal::och_param::{ModulationFormat, OchParam, Rate};

pub const METHOD_GNPY: &str = "gnpy";
pub const METHOD_INTERNAL: &str = "internal";

/// How OSNR values of candidate paths are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityMethod {
    /// Delegate to the external calculation command.
    Gnpy,
    /// Use the built-in signal quality model.
    Internal,
}

/// Physical constants, per-type coefficient tables and Q-value conversion data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QualityConfig {
    pub method: String,

    /// Gb/s per rate.
    pub rate_map: BTreeMap<Rate, f64>,
    pub bit_symbol_map: BTreeMap<ModulationFormat, f64>,
    pub power_spectral_map: BTreeMap<ModulationFormat, f64>,

    /// Noise figure per amplifier type [dB].
    pub noise_figures: ParameterTable,

    /// Effective area per fiber type [um^2].
    #[serde(rename = "Aeff")]
    pub aeff: ParameterTable,

    /// Nonlinear refractive index per fiber type [m^2/W].
    #[serde(rename = "N2")]
    pub n2: ParameterTable,

    /// Chromatic dispersion per fiber type [ps/nm/km].
    #[serde(rename = "CD")]
    pub cd: ParameterTable,

    /// Launch power per fiber type [dBm].
    #[serde(rename = "Pout")]
    pub pout: ParameterTable,

    /// [dBm]
    pub pre_amp_pout: f64,

    pub planck_constant: f64,

    #[serde(rename = "SoL")]
    pub speed_of_light: f64,

    /// ASE noise bandwidth [GHz].
    pub delta_f: f64,

    /// Representative signal frequency [THz].
    pub user_frequency: f64,

    /// `RATE/MOD` pairs evaluated for every path.
    pub rate_mod_format_pattern: Vec<String>,

    /// vendor -> `RATE/MOD` -> polynomial coefficients, highest degree first.
    pub osnr_q_constants_map: BTreeMap<String, BTreeMap<String, Vec<f64>>>,

    /// vendor -> `RATE/MOD` -> lowest acceptable Q [dB].
    pub q_threshold_map: BTreeMap<String, BTreeMap<String, f64>>,

    pub working_directory: String,
    pub command: String,
    pub timeout_secs: u64,

    /// How often a finished command is polled for while waiting [ms].
    pub poll_interval_ms: u64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        use ModulationFormat::*;

        Self {
            method: METHOD_GNPY.to_string(),
            rate_map: default_rate_map(),
            bit_symbol_map: BTreeMap::from([
                (Bpsk, 1.0),
                (DcDpBpsk, 2.0),
                (Qpsk, 2.0),
                (DpQpsk, 4.0),
                (Qam16, 4.0),
                (DpQam16, 8.0),
                (DcDpQam16, 8.0),
                (Qam8, 3.0),
                (DpQam8, 6.0),
                (DcDpQam8, 6.0),
            ]),
            power_spectral_map: BTreeMap::from([
                (Bpsk, 1.0),
                (DcDpBpsk, 0.5),
                (Qpsk, 1.0),
                (DpQpsk, 0.5),
                (Qam16, 1.0),
                (DpQam16, 0.5),
                (DcDpQam16, 0.5),
                (Qam8, 1.0),
                (DpQam8, 0.5),
                (DcDpQam8, 0.5),
            ]),
            noise_figures: ParameterTable::new(&[("LowGainAmp", 8.8), ("HighGainAmp", 6.6)]),
            aeff: ParameterTable::new(&[("smf", 72.0), ("dsf", 45.0)]),
            n2: ParameterTable::new(&[("smf", 2.6e-20), ("dsf", 2.6e-20)]),
            cd: ParameterTable::new(&[("smf", 16.0), ("dsf", 0.0001)]),
            pout: ParameterTable::new(&[("smf", 1.0), ("dsf", -5.0)]),
            pre_amp_pout: 4.0,
            planck_constant: 6.62607004e-34,
            speed_of_light: 299_792_458.0,
            delta_f: 12.5,
            user_frequency: 193.1,
            rate_mod_format_pattern: vec!["R100G/dp-qpsk".to_string(), "R200G/dp-qam16".to_string()],
            osnr_q_constants_map: BTreeMap::new(),
            q_threshold_map: BTreeMap::new(),
            working_directory: "/tmp".to_string(),
            command: "python3 gnpy.py".to_string(),
            timeout_secs: 300,
            poll_interval_ms: 10,
        }
    }
}

fn default_rate_map() -> BTreeMap<Rate, f64> {
    BTreeMap::from([(Rate::R200G, 200.0), (Rate::R150G, 150.0), (Rate::R100G, 100.0), (Rate::R10_7G, 10.7), (Rate::R11_1G, 11.1)])
}

impl QualityConfig {
    /// Replaces invalid values with defaults and fills in missing rate and
    /// modulation entries. Every replacement is logged.
    pub fn validated(mut self) -> Self {
        if self.method != METHOD_GNPY && self.method != METHOD_INTERNAL {
            log::error!("Parameter 'method' must be '{}' or '{}', got '{}'. Using '{}'.", METHOD_INTERNAL, METHOD_GNPY, self.method, METHOD_GNPY);
            self.method = METHOD_GNPY.to_string();
        }

        let defaults = QualityConfig::default();
        for (rate, value) in defaults.rate_map {
            self.rate_map.entry(rate).or_insert(value);
        }
        for (format, value) in defaults.bit_symbol_map {
            self.bit_symbol_map.entry(format).or_insert(value);
        }
        for (format, value) in defaults.power_spectral_map {
            self.power_spectral_map.entry(format).or_insert(value);
        }

        if self.timeout_secs == 0 {
            log::error!("Parameter 'timeoutSecs' must be positive. Using {}.", defaults.timeout_secs);
            self.timeout_secs = defaults.timeout_secs;
        }
        if self.poll_interval_ms == 0 {
            log::error!("Parameter 'pollIntervalMs' must be positive. Using {}.", defaults.poll_interval_ms);
            self.poll_interval_ms = defaults.poll_interval_ms;
        }
        self
    }

    pub fn method(&self) -> QualityMethod {
        if self.method == METHOD_INTERNAL { QualityMethod::Internal } else { QualityMethod::Gnpy }
    }

    pub fn rate_value(&self, rate: Rate) -> f64 {
        self.rate_map.get(&rate).copied().unwrap_or(100.0)
    }

    pub fn bit_symbol(&self, format: ModulationFormat) -> f64 {
        self.bit_symbol_map.get(&format).copied().unwrap_or(1.0)
    }

    pub fn power_spectral(&self, format: ModulationFormat) -> f64 {
        self.power_spectral_map.get(&format).copied().unwrap_or(1.0)
    }

    /// The configured `RATE/MOD` pairs. Entries that do not parse are skipped.
    pub fn och_params(&self) -> Vec<OchParam> {
        let mut params: Vec<OchParam> = Vec::new();
        for pattern in &self.rate_mod_format_pattern {
            match pattern.parse::<OchParam>() {
                Ok(param) if !params.contains(&param) => params.push(param),
                Ok(_) => {}
                Err(e) => log::warn!("Ignoring rateModFormatPattern entry '{}': {}", pattern, e),
            }
        }
        params
    }

    pub fn osnr_q_constants(&self, vendor: &str, param: &OchParam) -> Option<&[f64]> {
        self.osnr_q_constants_map
            .get(vendor)?
            .get(&param.to_string())
            .filter(|constants| !constants.is_empty())
            .map(Vec::as_slice)
    }

    pub fn q_threshold(&self, vendor: &str, param: &OchParam) -> Option<f64> {
        self.q_threshold_map.get(vendor)?.get(&param.to_string()).copied().filter(|t| t.is_finite())
    }

    pub fn delta_f_hz(&self) -> f64 {
        self.delta_f * 1.0e9
    }

    pub fn user_frequency_hz(&self) -> f64 {
        self.user_frequency * 1.0e12
    }
}
