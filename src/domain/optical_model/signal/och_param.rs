use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Line rate of an optical channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rate {
    #[serde(rename = "R200G")]
    R200G,
    #[serde(rename = "R150G")]
    R150G,
    #[serde(rename = "R100G")]
    R100G,
    #[serde(rename = "R10.7G")]
    R10_7G,
    #[serde(rename = "R11.1G")]
    R11_1G,
}

impl Rate {
    pub const ALL: [Rate; 5] = [Rate::R200G, Rate::R150G, Rate::R100G, Rate::R10_7G, Rate::R11_1G];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rate::R200G => "R200G",
            Rate::R150G => "R150G",
            Rate::R100G => "R100G",
            Rate::R10_7G => "R10.7G",
            Rate::R11_1G => "R11.1G",
        }
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rate::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| Error::InvalidArgument(format!("Unknown rate '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModulationFormat {
    Bpsk,
    DcDpBpsk,
    Qpsk,
    DpQpsk,
    Qam16,
    DpQam16,
    DcDpQam16,
    Qam8,
    DpQam8,
    DcDpQam8,
}

impl ModulationFormat {
    pub const ALL: [ModulationFormat; 10] = [
        ModulationFormat::Bpsk,
        ModulationFormat::DcDpBpsk,
        ModulationFormat::Qpsk,
        ModulationFormat::DpQpsk,
        ModulationFormat::Qam16,
        ModulationFormat::DpQam16,
        ModulationFormat::DcDpQam16,
        ModulationFormat::Qam8,
        ModulationFormat::DpQam8,
        ModulationFormat::DcDpQam8,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModulationFormat::Bpsk => "bpsk",
            ModulationFormat::DcDpBpsk => "dc-dp-bpsk",
            ModulationFormat::Qpsk => "qpsk",
            ModulationFormat::DpQpsk => "dp-qpsk",
            ModulationFormat::Qam16 => "qam16",
            ModulationFormat::DpQam16 => "dp-qam16",
            ModulationFormat::DcDpQam16 => "dc-dp-qam16",
            ModulationFormat::Qam8 => "qam8",
            ModulationFormat::DpQam8 => "dp-qam8",
            ModulationFormat::DcDpQam8 => "dc-dp-qam8",
        }
    }
}

impl fmt::Display for ModulationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModulationFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModulationFormat::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| Error::InvalidArgument(format!("Unknown modulation format '{}'", s)))
    }
}

/// A (rate, modulation format) pair, written as `RATE/MOD` (e.g. `R100G/dp-qpsk`).
///
/// Serialized as that string so it can key JSON objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OchParam {
    pub rate: Rate,
    pub modulation_format: ModulationFormat,
}

impl OchParam {
    pub fn new(rate: Rate, modulation_format: ModulationFormat) -> Self {
        Self { rate, modulation_format }
    }
}

impl fmt::Display for OchParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.rate, self.modulation_format)
    }
}

impl FromStr for OchParam {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (rate, modulation) = s
            .split_once('/')
            .ok_or_else(|| Error::InvalidArgument(format!("Expected RATE/MODULATION but got '{}'", s)))?;
        Ok(OchParam::new(rate.trim().parse()?, modulation.trim().parse()?))
    }
}

impl TryFrom<String> for OchParam {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OchParam> for String {
    fn from(param: OchParam) -> Self {
        param.to_string()
    }
}
