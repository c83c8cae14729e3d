use std::fs::File;
use std::io::{self, BufWriter};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;

use ehr_cli::config::RunConfig;
use ehr_cli::pipeline::{build_problem, load_graph, run_problem};
use ehr_model::RecordTypeRegistry;

use crate::cli::{CutoffArgs, GraphArgs};
use crate::summary::{print_cutoff_summary, print_graph, print_types};

pub fn run_types() -> Result<()> {
    let registry = RecordTypeRegistry::fhir();
    print_types(&registry.record_types());
    Ok(())
}

pub fn run_graph(args: &GraphArgs) -> Result<()> {
    let registry = RecordTypeRegistry::fhir();
    let graph = load_graph(&args.dir, &registry)?;
    let summary = graph.summary();
    if args.json {
        let json = serde_json::to_string_pretty(&summary).context("serialize graph summary")?;
        println!("{json}");
    } else {
        print_graph(&summary);
    }
    Ok(())
}

pub fn run_cutoff(args: &CutoffArgs) -> Result<()> {
    let started = Instant::now();
    let config = RunConfig::load_or_default(args.config.as_deref())?;
    let problem = build_problem(args.problem, &config.problem, args.code.as_deref())?;
    let registry = RecordTypeRegistry::fhir();
    let mut graph = load_graph(&args.dir, &registry)?;
    let cutoffs = run_problem(problem.as_ref(), &mut graph)?;

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("create {}", path.display()))?;
            cutoffs
                .write_csv(BufWriter::new(file))
                .with_context(|| format!("write {}", path.display()))?;
            info!(path = %path.display(), "cutoff table written");
        }
        None => cutoffs
            .write_csv(io::stdout().lock())
            .context("write cutoff table")?,
    }

    info!(
        problem = problem.name(),
        records = cutoffs.len(),
        gaps = cutoffs.gaps,
        duration_ms = started.elapsed().as_millis(),
        "cutoff run complete"
    );
    print_cutoff_summary(problem.name(), &cutoffs);
    Ok(())
}
