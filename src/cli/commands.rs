use clap::{ArgGroup, Parser, Subcommand};
use serde_json::json;

use crate::api::view_dto::{CandidateViewDto, WavelengthPathViewDto, WdmPathViewDto};
use crate::cli::render;
use crate::domain::optical_model::network::connect_point::ConnectPoint;
use crate::domain::optical_model::network::link::LinkState;
use crate::domain::optical_model::optimizer::{OpticalPathOptimizer, WavelengthPathFilter};
use crate::domain::optical_model::planner::wdm_path_store::WdmPathEvent;
use crate::domain::optical_model::reservation::wavelength_path::WavelengthPath;
use crate::domain::optical_model::utils::id::DeviceId;
use crate::error::{Error, Result};

/// One line of operator input.
#[derive(Parser, Debug)]
#[command(name = "optical-path-optimizer", no_binary_name = true)]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Calculate WDM paths between OMS add/drop ports
    WdmPathCalc {
        /// OMS add/drop port the paths start at
        #[arg(long)]
        ingress: Option<ConnectPoint>,
        /// OMS add/drop port the paths end at
        #[arg(long)]
        egress: Option<ConnectPoint>,
        #[arg(long)]
        json: bool,
    },

    /// List calculated WDM paths
    WdmPaths {
        /// 1-based position in the listing
        #[arg(long)]
        index: Option<usize>,
        #[arg(long)]
        ingress: Option<ConnectPoint>,
        #[arg(long)]
        egress: Option<ConnectPoint>,
        #[arg(long)]
        detail: bool,
        #[arg(long)]
        json: bool,
    },

    /// Calculate wavelength path candidates between Och ports
    WavelengthPathCalc {
        #[arg(long)]
        ingress1: Option<ConnectPoint>,
        #[arg(long)]
        egress1: Option<ConnectPoint>,
        /// Och ports of the disjoint tributary path
        #[arg(long)]
        ingress2: Option<ConnectPoint>,
        #[arg(long)]
        egress2: Option<ConnectPoint>,
        /// Calculate even if the topology changed since the last wdm-path-calc
        #[arg(long)]
        force: bool,
        #[arg(long)]
        json: bool,
    },

    /// Reserve a candidate of the last wavelength-path-calc
    WavelengthPathReserve {
        /// 1-based candidate index
        index: usize,
        /// One frequency id per path of the candidate
        #[arg(required = true, num_args = 1..)]
        frequency_ids: Vec<i32>,
        #[arg(long = "name", num_args = 1..)]
        names: Vec<String>,
        #[arg(long)]
        json: bool,
    },

    /// Submit reserved wavelength paths
    WavelengthPathSubmit {
        submit_id: u64,
        #[arg(long)]
        json: bool,
    },

    /// Remove reserved or submitted wavelength paths
    WavelengthPathRemove {
        submit_id: u64,
        #[arg(long)]
        json: bool,
    },

    /// List wavelength paths
    #[command(group(ArgGroup::new("status").args(["reserved", "submitted"])))]
    WavelengthPaths {
        #[arg(long)]
        id: Option<u64>,
        #[arg(long)]
        submit_id: Option<u64>,
        #[arg(long)]
        ingress: Option<ConnectPoint>,
        #[arg(long)]
        egress: Option<ConnectPoint>,
        #[arg(long)]
        reserved: bool,
        #[arg(long)]
        submitted: bool,
        #[arg(long)]
        detail: bool,
        #[arg(long)]
        json: bool,
    },

    /// Change the state of a link
    #[command(group(ArgGroup::new("state").args(["active", "inactive"]).required(true)))]
    LinkState {
        src: ConnectPoint,
        dst: ConnectPoint,
        #[arg(long)]
        active: bool,
        #[arg(long)]
        inactive: bool,
        #[arg(long)]
        json: bool,
    },

    /// Remove a link from the topology
    LinkRemove {
        src: ConnectPoint,
        dst: ConnectPoint,
        #[arg(long)]
        json: bool,
    },

    /// Remove a device and its links from the topology
    DeviceRemove {
        device_id: String,
        #[arg(long)]
        json: bool,
    },

    /// Leave the shell
    Exit,
}

/// What the shell does after a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Output(String),
    Exit,
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn path_views(paths: &[WavelengthPath], detail: bool) -> Vec<WavelengthPathViewDto> {
    paths.iter().map(|p| WavelengthPathViewDto::from_path(p, detail)).collect()
}

fn pair(ingress: Option<ConnectPoint>, egress: Option<ConnectPoint>, n: usize) -> Result<(ConnectPoint, ConnectPoint)> {
    let ingress = ingress.ok_or_else(|| Error::InvalidArgument(format!("Missing --ingress{} option", n)))?;
    let egress = egress.ok_or_else(|| Error::InvalidArgument(format!("Missing --egress{} option", n)))?;
    Ok((ingress, egress))
}

fn topology_status(json: bool, message: String, optimizer: &OpticalPathOptimizer) -> Result<String> {
    let stale = optimizer.is_recomputation_needed();
    if json {
        return to_json(&json!({ "message": message, "recomputationNeeded": stale }));
    }
    if stale {
        Ok(format!("{}\nWDM paths must be recalculated with wdm-path-calc.", message))
    } else {
        Ok(message)
    }
}

/// Runs `command` against the optimizer and renders its result.
pub fn execute(optimizer: &OpticalPathOptimizer, command: Command) -> Result<Outcome> {
    let output = match command {
        Command::WdmPathCalc { ingress, egress, json } => {
            let event = optimizer.calculate_wdm_paths(ingress.as_ref(), egress.as_ref())?;
            let (added, removed) = match &event {
                WdmPathEvent::PathsReplaced { added, removed } => (added.len(), removed.len()),
                WdmPathEvent::PathsCleared { removed } => (0, removed.len()),
            };
            if json {
                to_json(&json!({ "added": added, "removed": removed }))?
            } else {
                format!("Calculate WDM path succeeded. added={} removed={}", added, removed)
            }
        }

        Command::WdmPaths { index, ingress, egress, detail, json } => {
            let paths = optimizer.wdm_paths(ingress.as_ref(), egress.as_ref());
            let mut listed: Vec<(usize, _)> = paths.into_iter().enumerate().map(|(i, p)| (i + 1, p)).collect();
            if let Some(index) = index {
                listed.retain(|(i, _)| *i == index);
                if listed.is_empty() {
                    return Err(Error::InvalidArgument(format!("Not found WDM path. index={}", index)));
                }
            }
            if json {
                let views: Vec<WdmPathViewDto> = listed.iter().map(|(i, p)| WdmPathViewDto::from_wdm_path(*i, p, detail)).collect();
                to_json(&views)?
            } else {
                render::wdm_paths(&listed, detail)
            }
        }

        Command::WavelengthPathCalc { ingress1, egress1, ingress2, egress2, force, json } => {
            let mut endpoints = vec![pair(ingress1, egress1, 1)?];
            if ingress2.is_some() || egress2.is_some() {
                endpoints.push(pair(ingress2, egress2, 2)?);
            }
            let candidates = optimizer.calculate_wavelength_paths(&endpoints, force)?;
            if json {
                let views: Vec<CandidateViewDto> =
                    candidates.iter().enumerate().map(|(i, c)| CandidateViewDto::from_candidate(i + 1, c)).collect();
                to_json(&views)?
            } else {
                format!("Calculate wavelength path succeeded.\n{}", render::candidates(&candidates))
            }
        }

        Command::WavelengthPathReserve { index, frequency_ids, names, json } => {
            let reserved = optimizer.reserve(index, &frequency_ids, &names)?;
            let group_id = reserved.first().map(|p| p.group_id).unwrap_or_default();
            if json {
                to_json(&json!({ "submitId": group_id, "paths": path_views(&reserved, true) }))?
            } else {
                format!("Reserve wavelength path succeeded. SubmitID={}\n{}", group_id, render::wavelength_paths(&reserved, false))
            }
        }

        Command::WavelengthPathSubmit { submit_id, json } => {
            let submitted = optimizer.submit(submit_id)?;
            if json {
                to_json(&json!({ "submitId": submit_id, "paths": path_views(&submitted, false) }))?
            } else {
                format!("Submit wavelength path succeeded. SubmitID={}", submit_id)
            }
        }

        Command::WavelengthPathRemove { submit_id, json } => {
            let removed = optimizer.remove(submit_id)?;
            if json {
                to_json(&json!({ "submitId": submit_id, "paths": path_views(&removed, false) }))?
            } else {
                format!("Remove wavelength path succeeded. SubmitID={}", submit_id)
            }
        }

        Command::WavelengthPaths { id, submit_id, ingress, egress, reserved, submitted, detail, json } => {
            for cp in [&ingress, &egress].into_iter().flatten() {
                optimizer.check_och_port(cp)?;
            }
            let filter = WavelengthPathFilter { id, group_id: submit_id, ingress, egress, reserved_only: reserved, submitted_only: submitted };
            let paths = optimizer.wavelength_paths(&filter)?;
            if json { to_json(&path_views(&paths, detail))? } else { render::wavelength_paths(&paths, detail) }
        }

        Command::LinkState { src, dst, active, json, .. } => {
            let state = if active { LinkState::Active } else { LinkState::Inactive };
            optimizer.update_link_state(&src, &dst, state)?;
            topology_status(json, format!("Link {} -> {} is now {:?}.", src, dst, state), optimizer)?
        }

        Command::LinkRemove { src, dst, json } => {
            optimizer.remove_link(&src, &dst)?;
            topology_status(json, format!("Link {} -> {} removed.", src, dst), optimizer)?
        }

        Command::DeviceRemove { device_id, json } => {
            optimizer.remove_device(&DeviceId::new(device_id.as_str()))?;
            topology_status(json, format!("Device {} removed.", device_id), optimizer)?
        }

        Command::Exit => return Ok(Outcome::Exit),
    };
    Ok(Outcome::Output(output))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> std::result::Result<Command, clap::Error> {
        CommandLine::try_parse_from(line.split_whitespace()).map(|c| c.command)
    }

    #[test]
    fn test_parse_reserve_with_names() {
        let command = parse("wavelength-path-reserve 2 5 7 --name main backup").unwrap();
        assert_eq!(
            command,
            Command::WavelengthPathReserve {
                index: 2,
                frequency_ids: vec![5, 7],
                names: vec!["main".to_string(), "backup".to_string()],
                json: false
            }
        );
    }

    #[test]
    fn test_parse_connect_points() {
        let command = parse("wavelength-path-calc --ingress1 TP-1/1 --egress1 TP-2/1 --force").unwrap();
        let Command::WavelengthPathCalc { ingress1, egress2, force, .. } = command else {
            panic!("Unexpected command {:?}", command);
        };
        assert_eq!(ingress1, Some(ConnectPoint::new("TP-1", 1)));
        assert_eq!(egress2, None);
        assert!(force);

        assert!(parse("wdm-path-calc --ingress ROADM-A").is_err(), "A port number is required.");
    }

    #[test]
    fn test_parse_rejects_conflicting_flags() {
        assert!(parse("wavelength-paths --reserved --submitted").is_err());
        assert!(parse("link-state A/1 B/1").is_err());
        assert!(parse("wavelength-path-reserve 1").is_err());
        assert_eq!(parse("exit").unwrap(), Command::Exit);
    }

    #[test]
    fn test_missing_pair_option() {
        let error = pair(Some(ConnectPoint::new("TP-1", 1)), None, 2).unwrap_err();
        assert_eq!(error.to_string(), "Invalid argument: Missing --egress2 option");
    }
}
