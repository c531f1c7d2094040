use std::sync::Arc;

use crate::domain::optical_model::assigner::candidate::Candidate;
use crate::domain::optical_model::network::link::Link;
use crate::domain::optical_model::planner::wdm_path::WdmPath;
use crate::domain::optical_model::reservation::wavelength_path::WavelengthPath;

fn push_links(lines: &mut Vec<String>, links: &[Link], indent: &str) {
    lines.push(format!("{}Links", indent));
    for (i, link) in links.iter().enumerate() {
        lines.push(format!("{}  Link[{}] {} -> {}", indent, i + 1, link.src, link.dst));
    }
}

/// Console listing of wavelength-path candidates, numbered from 1.
pub fn candidates(candidates: &[Candidate]) -> String {
    if candidates.is_empty() {
        return "No results.".to_string();
    }

    let mut lines = Vec::new();
    for (index, candidate) in candidates.iter().enumerate() {
        lines.push(format!("Index={} {}", index + 1, candidate.kind()));
        for (i, entry) in candidate.entries.iter().enumerate() {
            lines.push(format!("  Path[{}]", i + 1));
            lines.push(format!("    Ingress={}", entry.src_och()));
            lines.push(format!("    Egress={}", entry.dst_och()));
            lines.push(format!("    Qvalue={:.3} Qmargin={:.3}", entry.q_value.q, entry.q_value.margin()));
            lines.push(format!("    Rate={} ModulationFormat={}", entry.och_param.rate, entry.och_param.modulation_format));
            push_links(&mut lines, &entry.links(), "    ");
            lines.push("    Available Frequencies".to_string());
            for (id, signal) in &entry.signals {
                lines.push(format!("      [{}] {:.2}THz", id, signal.center_frequency_thz()));
            }
        }
    }
    lines.join("\n")
}

pub fn wavelength_paths(paths: &[WavelengthPath], detail: bool) -> String {
    if paths.is_empty() {
        return "No results.".to_string();
    }

    let mut lines = Vec::new();
    for path in paths {
        lines.push(format!("ID={} SubmitID={}", path.id, path.group_id));
        lines.push(format!("    Name={}", path.name));
        lines.push(format!("    Ingress={}", path.src_och()));
        lines.push(format!("    Egress={}", path.dst_och()));
        lines.push(format!("    Frequency=[{}]{:.2}THz", path.frequency_id, path.center_frequency_thz()));
        lines.push(format!("    Rate={}", path.och_param.rate));
        lines.push(format!("    ModulationFormat={}", path.och_param.modulation_format));
        lines.push(format!("    Qvalue={:.3}", path.q_value.q));
        lines.push(format!("    Qmargin={:.3}", path.q_value.margin()));
        lines.push(format!("    Submitted={}", path.submitted));
        if detail {
            push_links(&mut lines, &path.links(), "    ");
        }
    }
    lines.join("\n")
}

/// WDM paths with the listing index they were numbered with.
pub fn wdm_paths(paths: &[(usize, Arc<WdmPath>)], detail: bool) -> String {
    if paths.is_empty() {
        return "No results.".to_string();
    }

    let mut lines = Vec::new();
    for (index, path) in paths {
        lines.push(format!("Index={} {} -> {} Weight={:.3}km", index, path.src, path.dst, path.path.weight));
        for (param, osnr) in &path.osnr {
            lines.push(format!("    OSNR {}={:.3}dB", param, osnr));
        }
        if detail {
            push_links(&mut lines, path.path.links(), "    ");
        }
    }
    lines.join("\n")
}
