//! Cutoff-time alignment of overlapping observation windows.
//!
//! Admissions recorded on the same day frequently describe one stay split
//! across several rows, and discharges written within the same hour usually
//! close the same stay. The aligner gives such rows one shared cutoff time so
//! that no row sees information recorded after a sibling was already closed.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use tracing::debug;

use crate::datetime::{hour_floor, instant_at};
use crate::error::{CoreError, Result};
use crate::table::RecordTable;

/// Which end of the window the cutoff is anchored to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AlignmentMode {
    #[default]
    Admission,
    Discharge,
}

/// One observation window.
///
/// Rows without a key cannot be referenced after alignment and are always
/// reported as gaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalRow {
    pub key: Option<String>,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl IntervalRow {
    pub fn new(
        key: impl Into<String>,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Self {
        Self {
            key: Some(key.into()),
            start,
            end,
        }
    }

    /// A row with no identifier.
    pub fn unkeyed(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Self {
        Self {
            key: None,
            start,
            end,
        }
    }

    fn admission(&self) -> Option<NaiveDateTime> {
        self.key.as_ref().and(self.start)
    }

    fn discharge(&self) -> Option<NaiveDateTime> {
        self.key.as_ref().and(self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedRow {
    pub key: Option<String>,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    /// `None` when the row had no usable reference instant.
    pub cutoff_time: Option<NaiveDateTime>,
    /// Rows sharing a cluster share a cutoff; distinct clusters never do.
    pub cluster: Option<usize>,
}

/// Aligned rows in input order, plus the number left without a cutoff.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Alignment {
    pub rows: Vec<AlignedRow>,
    pub gaps: usize,
}

impl Alignment {
    pub fn cutoff_times(&self) -> Vec<Option<NaiveDateTime>> {
        self.rows.iter().map(|row| row.cutoff_time).collect()
    }

    pub fn resolved(&self) -> impl Iterator<Item = &AlignedRow> {
        self.rows.iter().filter(|row| row.cutoff_time.is_some())
    }

    /// Number of distinct clusters among resolved rows.
    pub fn cluster_count(&self) -> usize {
        self.resolved()
            .filter_map(|row| row.cluster)
            .collect::<BTreeSet<_>>()
            .len()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CutoffTimeAligner {
    mode: AlignmentMode,
}

impl CutoffTimeAligner {
    pub fn new(mode: AlignmentMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> AlignmentMode {
        self.mode
    }

    pub fn align(&self, rows: &[IntervalRow]) -> Alignment {
        let assigned = match self.mode {
            AlignmentMode::Admission => align_admission(rows),
            AlignmentMode::Discharge => align_discharge(rows),
        };
        let gaps = assigned.iter().filter(|slot| slot.is_none()).count();
        debug!(mode = ?self.mode, rows = rows.len(), gaps, "aligned cutoff times");
        Alignment {
            rows: rows
                .iter()
                .zip(assigned)
                .map(|(row, slot)| AlignedRow {
                    key: row.key.clone(),
                    start: row.start,
                    end: row.end,
                    cutoff_time: slot.map(|slot| slot.cutoff),
                    cluster: slot.map(|slot| slot.cluster),
                })
                .collect(),
            gaps,
        }
    }

    /// Reads the window columns of `table` and aligns its rows.
    ///
    /// Rows are keyed by the table identifier; rows without one are gaps.
    /// An absent `start_column` reads as all-missing; `end_column` must exist.
    pub fn align_table(
        &self,
        table: &RecordTable,
        start_column: Option<&str>,
        end_column: &str,
    ) -> Result<Alignment> {
        if !table.has_column(end_column) {
            return Err(CoreError::MissingCutoff {
                table: table.name.clone(),
                column: end_column.to_string(),
            });
        }
        let rows: Vec<IntervalRow> = (0..table.height())
            .map(|idx| {
                let start = start_column.and_then(|column| instant_at(&table.data, column, idx));
                let end = instant_at(&table.data, end_column, idx);
                match table.identifier(idx) {
                    Some(key) => IntervalRow::new(key, start, end),
                    None => IntervalRow::unkeyed(start, end),
                }
            })
            .collect();
        Ok(self.align(&rows))
    }
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    cluster: usize,
    cutoff: NaiveDateTime,
}

/// Open cluster of the admission sweep.
struct Cluster {
    members: Vec<usize>,
    /// Latest admission seen; the cutoff of every member.
    latest: NaiveDateTime,
    /// Earliest end among members, `None` while every window is open-ended.
    closes: Option<NaiveDateTime>,
}

impl Cluster {
    fn open(idx: usize, start: NaiveDateTime, end: Option<NaiveDateTime>) -> Self {
        Self {
            members: vec![idx],
            latest: start,
            closes: end,
        }
    }

    /// A start joins when it equals the current cutoff or falls before the
    /// first member closes.
    fn admits(&self, start: NaiveDateTime) -> bool {
        start == self.latest || self.closes.is_none_or(|closes| start < closes)
    }

    fn join(&mut self, idx: usize, start: NaiveDateTime, end: Option<NaiveDateTime>) {
        self.members.push(idx);
        self.latest = self.latest.max(start);
        self.closes = match (self.closes, end) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
    }
}

fn align_admission(rows: &[IntervalRow]) -> Vec<Option<Slot>> {
    let mut order: Vec<(NaiveDateTime, usize)> = rows
        .iter()
        .enumerate()
        .filter_map(|(idx, row)| row.admission().map(|start| (start, idx)))
        .collect();
    order.sort_unstable();

    let mut clusters: Vec<Cluster> = Vec::new();
    for (start, idx) in order {
        let end = rows[idx].end;
        match clusters.last_mut() {
            Some(current) if current.admits(start) => current.join(idx, start, end),
            _ => clusters.push(Cluster::open(idx, start, end)),
        }
    }

    let mut slots = vec![None; rows.len()];
    for (cluster, group) in clusters.iter().enumerate() {
        for &idx in &group.members {
            slots[idx] = Some(Slot {
                cluster,
                cutoff: group.latest,
            });
        }
    }
    slots
}

fn align_discharge(rows: &[IntervalRow]) -> Vec<Option<Slot>> {
    let mut by_hour: BTreeMap<NaiveDateTime, Vec<usize>> = BTreeMap::new();
    for (idx, row) in rows.iter().enumerate() {
        if let Some(end) = row.discharge() {
            by_hour.entry(hour_floor(end)).or_default().push(idx);
        }
    }

    let mut slots = vec![None; rows.len()];
    for (cluster, members) in by_hour.values().enumerate() {
        let Some(cutoff) = members.iter().filter_map(|idx| rows[*idx].end).min() else {
            continue;
        };
        for &idx in members {
            slots[idx] = Some(Slot { cluster, cutoff });
        }
    }
    slots
}
