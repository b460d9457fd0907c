//! Sequential run over a catalog.
//!
//! Targets live in an arena; a queue of arena indices drives the loop. A
//! successful enumeration pushes its children onto the arena and queues their
//! indices right after the parent, so the report stays in catalog order with
//! each parent's children directly beneath it.

use serde::Serialize;
use std::collections::VecDeque;

use crate::fs::{EntryName, Filesystem};
use crate::probe::Prober;
use crate::types::{ProbeKind, ProbeOutcome, ProbeTarget};

pub const DEFAULT_MAX_LISTING: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HarvestEntry {
    pub target: ProbeTarget,
    pub outcome: ProbeOutcome,
    /// Report index of the enumeration this entry was fanned out from.
    pub parent: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HarvestReport {
    entries: Vec<HarvestEntry>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HarvestSummary {
    pub accessible: usize,
    pub blocked: usize,
    pub missing: usize,
    pub unknown: usize,
}

impl HarvestReport {
    fn push(&mut self, entry: HarvestEntry) -> usize {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    pub fn entries(&self) -> &[HarvestEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One entry per catalog target, in catalog order.
    pub fn top_level(&self) -> impl Iterator<Item = &HarvestEntry> {
        self.entries.iter().filter(|e| e.parent.is_none())
    }

    pub fn children_of(&self, index: usize) -> impl Iterator<Item = &HarvestEntry> {
        self.entries
            .iter()
            .filter(move |e| e.parent == Some(index))
    }

    pub fn summary(&self) -> HarvestSummary {
        let mut summary = HarvestSummary::default();
        for entry in &self.entries {
            match entry.outcome {
                ProbeOutcome::Accessible(_) => summary.accessible += 1,
                ProbeOutcome::Blocked { .. } => summary.blocked += 1,
                ProbeOutcome::Missing { .. } => summary.missing += 1,
                ProbeOutcome::Unknown { .. } => summary.unknown += 1,
            }
        }
        summary
    }
}

pub struct Harvester<F: Filesystem> {
    prober: Prober<F>,
    max_listing: usize,
}

impl<F: Filesystem> Harvester<F> {
    pub fn new(fs: F) -> Self {
        Self {
            prober: Prober::new(fs),
            max_listing: DEFAULT_MAX_LISTING,
        }
    }

    pub fn with_max_listing(mut self, max_listing: usize) -> Self {
        self.max_listing = max_listing;
        self
    }

    /// Probes every target and returns the report. Total over its input: no
    /// probe failure ends the run early.
    pub async fn run(&self, catalog: Vec<ProbeTarget>) -> HarvestReport {
        tracing::info!("Starting harvest over {} targets", catalog.len());

        let mut arena: Vec<(ProbeTarget, Option<usize>)> =
            catalog.into_iter().map(|t| (t, None)).collect();
        let mut pending: VecDeque<usize> = (0..arena.len()).collect();
        let mut report = HarvestReport::default();

        while let Some(index) = pending.pop_front() {
            let (target, parent) = arena[index].clone();
            let outcome = self.prober.probe(&target).await;

            let children = match (&target.probe, outcome.listed_entries()) {
                (ProbeKind::Enumerate { child }, Some(entries)) => {
                    self.fan_out(&target, child, entries)
                }
                _ => Vec::new(),
            };

            let report_index = report.push(HarvestEntry {
                target,
                outcome,
                parent,
            });

            let first_child = arena.len();
            arena.extend(children.into_iter().map(|c| (c, Some(report_index))));
            for child_index in (first_child..arena.len()).rev() {
                pending.push_front(child_index);
            }
        }

        let summary = report.summary();
        tracing::info!(
            "Harvest finished: {} entries ({} accessible, {} blocked, {} missing, {} unknown)",
            report.len(),
            summary.accessible,
            summary.blocked,
            summary.missing,
            summary.unknown
        );
        report
    }

    fn fan_out(
        &self,
        parent: &ProbeTarget,
        child: &str,
        entries: &[EntryName],
    ) -> Vec<ProbeTarget> {
        if entries.len() > self.max_listing {
            tracing::warn!(
                "{} lists {} entries, probing only the first {}",
                parent.label(),
                entries.len(),
                self.max_listing
            );
        }
        entries
            .iter()
            .take(self.max_listing)
            .map(|entry| ProbeTarget {
                name: format!("{} [{}]", parent.name, entry),
                group: parent.group.clone(),
                path: parent.path.join(entry).join(child),
                probe: ProbeKind::Content,
            })
            .collect()
    }
}
