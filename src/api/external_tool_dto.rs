use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::optical_model::quality::parameter_table::ParameterTable;

/// `services.json`: every candidate path as a planned WDM service.
#[derive(Serialize, Debug, Clone)]
pub struct ServiceListDto {
    pub services: Vec<ServiceDto>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ServiceDto {
    pub service_name: String,
    pub connection_type: String,
    pub lifecycle_state: String,
    pub service_layer: String,
    pub topology: ServiceTopologyDto,
}

#[derive(Serialize, Debug, Clone)]
pub struct ServiceTopologyDto {
    #[serde(rename = "aToZ")]
    pub a_to_z: Vec<HopDto>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct HopDto {
    pub id: String,
    pub hop_type: String,
    pub physical_link_name: String,
    pub resource_type: String,
}

/// `parameters.json`: the coefficients the external tool needs, under their
/// configuration key names.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ParametersDto<'a> {
    pub noise_figures: &'a ParameterTable,

    #[serde(rename = "Aeff")]
    pub aeff: &'a ParameterTable,

    #[serde(rename = "N2")]
    pub n2: &'a ParameterTable,

    #[serde(rename = "CD")]
    pub cd: &'a ParameterTable,

    #[serde(rename = "Pout")]
    pub pout: &'a ParameterTable,

    pub pre_amp_pout: f64,
    pub planck_constant: f64,

    #[serde(rename = "SoL")]
    pub speed_of_light: f64,

    pub delta_f: f64,
    pub user_frequency: f64,
    pub rate_mod_format_pattern: Vec<String>,
    pub osnr_q_constants_map: &'a BTreeMap<String, BTreeMap<String, Vec<f64>>>,
    pub q_threshold_map: &'a BTreeMap<String, BTreeMap<String, f64>>,
}
