use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crate::api::external_tool_dto::{HopDto, ParametersDto, ServiceDto, ServiceListDto, ServiceTopologyDto};
use crate::domain::optical_model::network::inventory::NetworkInventory;
use crate::domain::optical_model::network::link_detail::LinkDetailProvider;
use crate::domain::optical_model::network::path::Path;
use crate::domain::optical_model::quality::config::QualityConfig;
use crate::domain::optical_model::quality::osnr_provider::{OsnrMap, OsnrProvider};
use crate::domain::optical_model::signal::och_param::OchParam;
use crate::error::{Error, Result};
use crate::loader::parser::write_json_file;

pub const NETWORK_FILE: &str = "network.json";
pub const SERVICES_FILE: &str = "services.json";
pub const PARAMETERS_FILE: &str = "parameters.json";

enum Stream {
    Stdout,
    Stderr,
}

/// Delegates OSNR computation to an external command.
///
/// The network, the candidate paths (as services `path-1`, `path-2`, ...) and
/// the quality parameters are written to the working directory. The command
/// receives the three file names as arguments and must print
/// `{"services": {"path-N": {"RATE/MOD": osnr, ...}}}` on stdout.
pub struct ExternalOsnrInvoker {
    config: QualityConfig,
    inventory: Arc<dyn NetworkInventory>,
    link_details: Arc<dyn LinkDetailProvider>,
}

impl ExternalOsnrInvoker {
    pub fn new(config: QualityConfig, inventory: Arc<dyn NetworkInventory>, link_details: Arc<dyn LinkDetailProvider>) -> Self {
        Self { config, inventory, link_details }
    }

    fn working_directory(&self) -> PathBuf {
        PathBuf::from(&self.config.working_directory)
    }

    fn write_inputs(&self, paths: &[Path], params: &[OchParam]) -> Result<()> {
        let dir = self.working_directory();
        fs::create_dir_all(&dir)?;

        let mut network = self.inventory.export();
        if network.devices.is_empty() {
            return Err(Error::CalculationFailed("Not found network model.".to_string()));
        }
        network.link_details = self.link_details.export();
        write_json_file(dir.join(NETWORK_FILE), &network)?;

        write_json_file(dir.join(SERVICES_FILE), &service_list(paths))?;

        let parameters = ParametersDto {
            noise_figures: &self.config.noise_figures,
            aeff: &self.config.aeff,
            n2: &self.config.n2,
            cd: &self.config.cd,
            pout: &self.config.pout,
            pre_amp_pout: self.config.pre_amp_pout,
            planck_constant: self.config.planck_constant,
            speed_of_light: self.config.speed_of_light,
            delta_f: self.config.delta_f,
            user_frequency: self.config.user_frequency,
            rate_mod_format_pattern: params.iter().map(OchParam::to_string).collect(),
            osnr_q_constants_map: &self.config.osnr_q_constants_map,
            q_threshold_map: &self.config.q_threshold_map,
        };
        write_json_file(dir.join(PARAMETERS_FILE), &parameters)?;
        Ok(())
    }

    /// Runs the command and returns its stdout. Both pipes are drained on
    /// their own threads while this thread waits for the process.
    fn run_command(&self) -> Result<String> {
        let mut parts = self.config.command.split_whitespace();
        let program = parts.next().ok_or_else(|| Error::CalculationFailed("OSNR calculation command is empty.".to_string()))?;
        let command_line = format!("{} {} {} {}", self.config.command, NETWORK_FILE, SERVICES_FILE, PARAMETERS_FILE);

        log::info!("Run command: {}", command_line);
        let mut child = Command::new(program)
            .args(parts)
            .args([NETWORK_FILE, SERVICES_FILE, PARAMETERS_FILE])
            .current_dir(self.working_directory())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::CalculationFailed(format!("Failed to execute command: {} ({})", command_line, e)))?;

        let (tx, rx) = mpsc::channel::<(Stream, String)>();
        if let Some(stdout) = child.stdout.take() {
            spawn_reader(stdout, Stream::Stdout, tx.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_reader(stderr, Stream::Stderr, tx.clone());
        }
        drop(tx);

        let deadline = Instant::now() + Duration::from_secs(self.config.timeout_secs);
        let (mut output, mut error) = (String::new(), String::new());
        for _ in 0..2 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match rx.recv_timeout(remaining) {
                Ok((Stream::Stdout, text)) => output = text,
                Ok((Stream::Stderr, text)) => error = text,
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
                Err(mpsc::RecvTimeoutError::Timeout) => return Err(self.abort(&mut child, &command_line)),
            }
        }

        let status = self.wait_until(&mut child, deadline, &command_line)?;
        let (output, error) = (output.trim(), error.trim());

        if status.success() {
            log::info!("Command finished");
            if !output.is_empty() {
                log::debug!("{}", output);
            }
            if !error.is_empty() {
                log::warn!("Standard Error: -----------------\n{}\n---------------------------------", error);
            }
            Ok(output.to_string())
        } else {
            log::warn!("Command returned error. ret={}", status);
            if !output.is_empty() {
                log::warn!("Standard Output: -----------------\n{}\n---------------------------------", output);
            }
            if !error.is_empty() {
                log::warn!("Standard Error: -----------------\n{}\n---------------------------------", error);
            }
            Err(Error::CalculationFailed(format!("Failed to execute OSNR calculation command. ret={}", status)))
        }
    }

    fn wait_until(&self, child: &mut Child, deadline: Instant, command_line: &str) -> Result<ExitStatus> {
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if Instant::now() >= deadline {
                return Err(self.abort(child, command_line));
            }
            thread::sleep(Duration::from_millis(self.config.poll_interval_ms));
        }
    }

    fn abort(&self, child: &mut Child, command_line: &str) -> Error {
        log::warn!("Command did not finish within {}s, killing it: {}", self.config.timeout_secs, command_line);
        if let Err(e) = child.kill() {
            log::warn!("Failed to kill command: {}", e);
        }
        let _ = child.wait();
        Error::CalculationFailed(format!("OSNR calculation command timed out after {}s.", self.config.timeout_secs))
    }
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R, stream: Stream, tx: mpsc::Sender<(Stream, String)>) {
    thread::spawn(move || {
        let mut buffer = String::new();
        if let Err(e) = pipe.read_to_string(&mut buffer) {
            log::warn!("Failed to read command output: {}", e);
        }
        let _ = tx.send((stream, buffer));
    });
}

pub fn service_name(index: usize) -> String {
    format!("path-{}", index + 1)
}

fn service_list(paths: &[Path]) -> ServiceListDto {
    let services = paths
        .iter()
        .enumerate()
        .map(|(i, path)| ServiceDto {
            service_name: service_name(i),
            connection_type: "roadm-line".to_string(),
            lifecycle_state: "planned".to_string(),
            service_layer: "wdm".to_string(),
            topology: ServiceTopologyDto {
                a_to_z: path
                    .links()
                    .iter()
                    .map(|l| HopDto {
                        id: format!("{}-{}", l.src, l.dst),
                        hop_type: "node-external".to_string(),
                        physical_link_name: format!("{}-{}", l.src, l.dst),
                        resource_type: "physical-link".to_string(),
                    })
                    .collect(),
            },
        })
        .collect();
    ServiceListDto { services }
}

/// Maps the command output back onto the paths. Unknown service names,
/// unknown keys and keys outside `params` are ignored.
pub fn parse_response(output: &str, path_count: usize, params: &[OchParam]) -> Result<Vec<OsnrMap>> {
    let root: serde_json::Value =
        serde_json::from_str(output).map_err(|e| Error::CalculationFailed(format!("Invalid JSON data: {}", e)))?;
    let services = root
        .get("services")
        .and_then(serde_json::Value::as_object)
        .ok_or_else(|| Error::CalculationFailed("Invalid OSNR data structure".to_string()))?;

    let index: BTreeMap<String, usize> = (0..path_count).map(|i| (service_name(i), i)).collect();
    let mut maps = vec![OsnrMap::new(); path_count];

    for (name, service) in services {
        let Some(&i) = index.get(name) else {
            log::debug!("Ignoring unknown service '{}' in OSNR output", name);
            continue;
        };
        let Some(values) = service.as_object() else {
            log::warn!("Service '{}' in OSNR output is not an object", name);
            continue;
        };
        for (key, value) in values {
            let Ok(param) = key.parse::<OchParam>() else {
                continue;
            };
            if !params.contains(&param) {
                continue;
            }
            match value.as_f64() {
                Some(osnr) => {
                    maps[i].insert(param, osnr);
                }
                None => log::warn!("OSNR of {} for {} is not a number", name, key),
            }
        }
    }
    Ok(maps)
}

impl OsnrProvider for ExternalOsnrInvoker {
    fn evaluate(&self, paths: &[Path], params: &[OchParam]) -> Result<Vec<OsnrMap>> {
        self.write_inputs(paths, params)?;
        let output = self.run_command()?;
        let maps = parse_response(&output, paths.len(), params)?;

        for (path, map) in paths.iter().zip(&maps) {
            log::debug!("{} => {:?}", path, map);
        }
        Ok(maps)
    }
}
