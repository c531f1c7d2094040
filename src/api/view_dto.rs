use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::optical_model::assigner::candidate::{Candidate, WavelengthPathEntry};
use crate::domain::optical_model::network::link::Link;
use crate::domain::optical_model::planner::wdm_path::WdmPath;
use crate::domain::optical_model::reservation::wavelength_path::WavelengthPath;

/// Machine readable output of the operator commands.

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct LinkViewDto {
    pub src: String,
    pub dst: String,
}

impl LinkViewDto {
    pub fn from_link(link: &Link) -> Self {
        Self { src: link.src.to_string(), dst: link.dst.to_string() }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyViewDto {
    pub id: i32,

    /// THz
    pub center_frequency: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CandidatePathViewDto {
    pub ingress: String,
    pub egress: String,
    pub q_value: f64,
    pub q_margin: f64,
    pub rate: String,
    pub modulation_format: String,
    pub links: Vec<LinkViewDto>,
    pub available_frequencies: Vec<FrequencyViewDto>,
}

impl CandidatePathViewDto {
    fn from_entry(entry: &WavelengthPathEntry) -> Self {
        Self {
            ingress: entry.src_och().to_string(),
            egress: entry.dst_och().to_string(),
            q_value: entry.q_value.q,
            q_margin: entry.q_value.margin(),
            rate: entry.och_param.rate.to_string(),
            modulation_format: entry.och_param.modulation_format.to_string(),
            links: entry.links().iter().map(LinkViewDto::from_link).collect(),
            available_frequencies: entry
                .signals
                .iter()
                .map(|(id, signal)| FrequencyViewDto { id: *id, center_frequency: signal.center_frequency_thz() })
                .collect(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CandidateViewDto {
    /// 1-based, as accepted by `wavelength-path-reserve`.
    pub index: usize,
    pub paths: Vec<CandidatePathViewDto>,
}

impl CandidateViewDto {
    pub fn from_candidate(index: usize, candidate: &Candidate) -> Self {
        Self { index, paths: candidate.entries.iter().map(CandidatePathViewDto::from_entry).collect() }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WavelengthPathViewDto {
    pub id: u64,
    pub submit_id: u64,
    pub name: String,
    pub ingress: String,
    pub egress: String,
    pub frequency_id: i32,
    pub center_frequency: f64,
    pub rate: String,
    pub modulation_format: String,
    pub q_value: f64,
    pub q_margin: f64,
    pub submitted: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<LinkViewDto>>,
}

impl WavelengthPathViewDto {
    pub fn from_path(path: &WavelengthPath, detail: bool) -> Self {
        Self {
            id: path.id,
            submit_id: path.group_id,
            name: path.name.clone(),
            ingress: path.src_och().to_string(),
            egress: path.dst_och().to_string(),
            frequency_id: path.frequency_id,
            center_frequency: path.center_frequency_thz(),
            rate: path.och_param.rate.to_string(),
            modulation_format: path.och_param.modulation_format.to_string(),
            q_value: path.q_value.q,
            q_margin: path.q_value.margin(),
            submitted: path.submitted,
            links: detail.then(|| path.links().iter().map(LinkViewDto::from_link).collect()),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct WdmPathViewDto {
    pub index: usize,
    pub ingress: String,
    pub egress: String,
    pub weight: f64,

    /// OSNR [dB] by `RATE/MOD`.
    pub osnr: BTreeMap<String, f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<LinkViewDto>>,
}

impl WdmPathViewDto {
    pub fn from_wdm_path(index: usize, path: &WdmPath, detail: bool) -> Self {
        Self {
            index,
            ingress: path.src.to_string(),
            egress: path.dst.to_string(),
            weight: path.path.weight,
            osnr: path.osnr.iter().map(|(param, osnr)| (param.to_string(), *osnr)).collect(),
            links: detail.then(|| path.path.links().iter().map(LinkViewDto::from_link).collect()),
        }
    }
}
