//! Load, build and run stages shared by the subcommands.

use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use tracing::{info, info_span};

use ehr_core::problems::{
    DiagnosisPrediction, LengthOfStay, Mortality, ProlongedLengthOfStay, Readmission,
};
use ehr_core::{
    CutoffTable, EntityGraph, EntityGraphBuilder, ProblemDefinition, generate_cutoff_times,
};
use ehr_ingest::load_record_frames;
use ehr_model::RecordTypeRegistry;

use crate::config::ProblemSettings;

/// Built-in prediction problems selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProblemKind {
    /// Length of stay in whole days (regression).
    Los,
    /// Stay longer than the configured threshold.
    ProlongedLos,
    /// Readmission within the configured window after discharge.
    Readmission,
    /// In-hospital death by diagnosis code.
    Mortality,
    /// Presence of one diagnosis code.
    Diagnosis,
}

/// Instantiates the problem `kind` with the given settings.
///
/// `code` overrides the configured diagnosis code.
pub fn build_problem(
    kind: ProblemKind,
    settings: &ProblemSettings,
    code: Option<&str>,
) -> Result<Box<dyn ProblemDefinition>> {
    Ok(match kind {
        ProblemKind::Los => Box::new(LengthOfStay::new()),
        ProblemKind::ProlongedLos => {
            Box::new(ProlongedLengthOfStay::new(settings.prolonged_threshold_days))
        }
        ProblemKind::Readmission => Box::new(Readmission::new(settings.readmission_window_days)),
        ProblemKind::Mortality => Box::new(Mortality::new(settings.mortality_codes.iter().cloned())),
        ProblemKind::Diagnosis => {
            let Some(code) = code.or(settings.diagnosis_code.as_deref()) else {
                bail!("the diagnosis problem needs --code or problem.diagnosis_code");
            };
            Box::new(DiagnosisPrediction::new(code))
        }
    })
}

/// Loads every recognised CSV file in `dir` and builds the entity graph.
pub fn load_graph(dir: &Path, registry: &RecordTypeRegistry) -> Result<EntityGraph> {
    let span = info_span!("load", folder = %dir.display());
    let _guard = span.enter();
    let frames = load_record_frames(dir, registry)
        .with_context(|| format!("load record files from {}", dir.display()))?;
    if frames.is_empty() {
        bail!("no record files found in {}", dir.display());
    }
    let graph = EntityGraphBuilder::from_registry(
        registry,
        frames.into_iter().map(|frame| (frame.record_type, frame.data)),
    )
    .and_then(EntityGraphBuilder::build)
    .context("build entity graph")?;
    info!(
        tables = graph.table_count(),
        edges = graph.edge_count(),
        "graph ready"
    );
    Ok(graph)
}

/// Runs `problem` against `graph`, generating its label when needed.
pub fn run_problem(
    problem: &dyn ProblemDefinition,
    graph: &mut EntityGraph,
) -> Result<CutoffTable> {
    let span = info_span!("cutoff", problem = problem.name());
    let _guard = span.enter();
    generate_cutoff_times(problem, graph)
        .with_context(|| format!("generate cutoff times for {}", problem.name()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnosis_needs_a_code() {
        let settings = ProblemSettings::default();
        let err = build_problem(ProblemKind::Diagnosis, &settings, None)
            .err()
            .expect("missing code");
        assert!(err.to_string().contains("--code"));

        let problem = build_problem(ProblemKind::Diagnosis, &settings, Some("I10")).unwrap();
        assert_eq!(problem.config().target_label_column, "diagnosis");
    }

    #[test]
    fn settings_reach_the_problem() {
        let settings = ProblemSettings {
            readmission_window_days: 3,
            ..ProblemSettings::default()
        };
        let problem = build_problem(ProblemKind::Readmission, &settings, None).unwrap();
        assert_eq!(problem.name(), "readmission");
        assert_eq!(problem.config().cutoff_time_label, "end");
    }
}
