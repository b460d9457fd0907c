use anyhow::Result;
use sandprobe_harvest::{HarvestReport, NamedDir, PathResolver, ProbeOutcome};
use serde::Serialize;
use std::fmt::Write as _;

use crate::secrets::EnvSecret;

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

pub fn to_json<T: Serialize>(ok: bool, data: T) -> Result<String> {
    Ok(serde_json::to_string_pretty(&JsonOut { ok, data })?)
}

fn marker(outcome: &ProbeOutcome) -> &'static str {
    match outcome {
        ProbeOutcome::Accessible(_) => "[+]",
        ProbeOutcome::Blocked { .. } => "[x]",
        ProbeOutcome::Missing { .. } => "[ ]",
        ProbeOutcome::Unknown { .. } => "[?]",
    }
}

/// Every outcome inline next to its target, grouped as in the catalog.
pub fn report_text(report: &HarvestReport) -> String {
    let mut out = String::new();
    let mut current_group: Option<&str> = None;

    for entry in report.entries() {
        let group = entry.target.group.as_str();
        if current_group != Some(group) {
            let _ = writeln!(out, "== {group} ==");
            current_group = Some(group);
        }
        let indent = if entry.parent.is_some() { "    " } else { "  " };
        let _ = writeln!(
            out,
            "{indent}{} {}: {} ({})",
            marker(&entry.outcome),
            entry.target.name,
            entry.outcome,
            entry.target.path.display()
        );
    }

    let summary = report.summary();
    let _ = writeln!(
        out,
        "{} probes: {} accessible, {} blocked, {} not found, {} failed",
        report.len(),
        summary.accessible,
        summary.blocked,
        summary.missing,
        summary.unknown
    );
    out
}

#[derive(Serialize)]
pub struct PathRow {
    pub name: &'static str,
    pub path: String,
}

pub fn path_rows(resolver: &PathResolver) -> Vec<PathRow> {
    NamedDir::ALL
        .iter()
        .map(|dir| PathRow {
            name: dir.as_str(),
            path: resolver.dirs().get(*dir).display().to_string(),
        })
        .collect()
}

pub fn paths_text(rows: &[PathRow]) -> String {
    let mut out = String::new();
    for row in rows {
        let _ = writeln!(out, "{:<10} {}", row.name, row.path);
    }
    out
}

pub fn secrets_text(secrets: &[EnvSecret]) -> String {
    let mut out = String::new();
    for secret in secrets {
        let _ = match secret.chars {
            Some(n) => writeln!(out, "[+] {} present ({n} chars)", secret.name),
            None => writeln!(out, "[ ] {} not set", secret.name),
        };
    }
    out
}
