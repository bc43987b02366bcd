// Collection-level driver: load challenges (and optional solutions), run the
// batch, summarize, and write the submission file.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::info;

use super::arc::{solve_collection, BatchOutcome, PuzzleReport};
use crate::core::SolverConfig;
use crate::perception::grid::{attach_solutions, load_challenges, load_solutions};
use crate::synthesis::dsl::Grid;

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub total: usize,
    pub answered: usize,
    pub rejected: usize,
    /// Puzzles whose expected output was known.
    pub evaluated: usize,
    pub correct: usize,
    pub accuracy: f64,
    pub elapsed_ms: u64,
    pub by_category: Vec<(String, usize)>,
    pub by_source: Vec<(String, usize)>,
    pub per_task: Vec<PuzzleReport>,
}

pub fn summarize(outcome: &BatchOutcome, rejected: usize, elapsed_ms: u64) -> EvaluationReport {
    let reports = &outcome.reports;
    let evaluated = reports.iter().filter(|r| r.correct.is_some()).count();
    let correct = reports.iter().filter(|r| r.correct == Some(true)).count();

    let mut category_counts: FxHashMap<&'static str, usize> = Default::default();
    let mut source_counts: FxHashMap<&'static str, usize> = Default::default();
    for r in reports {
        *category_counts.entry(r.classification.category.name()).or_default() += 1;
        *source_counts.entry(r.source.name()).or_default() += 1;
    }

    EvaluationReport {
        total: reports.len(),
        answered: outcome.submission.len(),
        rejected,
        evaluated,
        correct,
        accuracy: if evaluated == 0 { 0.0 } else { correct as f64 / evaluated as f64 },
        elapsed_ms,
        by_category: sorted_counts(category_counts),
        by_source: sorted_counts(source_counts),
        per_task: reports.clone(),
    }
}

/// Descending by count, then by name so output is stable.
fn sorted_counts(counts: FxHashMap<&'static str, usize>) -> Vec<(String, usize)> {
    let mut v: Vec<(String, usize)> = counts.into_iter().map(|(k, n)| (k.to_string(), n)).collect();
    v.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    v
}

/// Load, solve and summarize a challenge file.
pub fn run_collection(
    challenges: &Path,
    solutions: Option<&Path>,
    config: &SolverConfig,
) -> anyhow::Result<(BatchOutcome, EvaluationReport)> {
    let mut collection = load_challenges(challenges)?;
    if let Some(path) = solutions {
        let sols = load_solutions(path)?;
        let attached = attach_solutions(&mut collection.puzzles, &sols);
        info!(attached, "loaded expected outputs");
    }
    info!(
        puzzles = collection.puzzles.len(),
        rejected = collection.rejected.len(),
        "loaded challenges"
    );

    let start = Instant::now();
    let outcome = solve_collection(&collection.puzzles, config);
    let report = summarize(&outcome, collection.rejected.len(), start.elapsed().as_millis() as u64);
    info!(
        total = report.total,
        answered = report.answered,
        correct = report.correct,
        elapsed_ms = report.elapsed_ms,
        "batch complete"
    );
    Ok((outcome, report))
}

pub fn write_submission(path: &Path, submission: &BTreeMap<String, Grid>) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    let json = serde_json::to_string(submission)?;
    std::fs::write(path, json).with_context(|| format!("cannot write {}", path.display()))?;
    info!(path = %path.display(), entries = submission.len(), "submission written");
    Ok(())
}

impl EvaluationReport {
    pub fn print_summary(&self) {
        println!("=== Batch Results ===");
        println!("Puzzles: {} | Answered: {} | Rejected: {}", self.total, self.answered, self.rejected);
        if self.evaluated > 0 {
            println!("Correct: {}/{} ({:.1}%)", self.correct, self.evaluated, self.accuracy * 100.0);
        }
        println!("Time: {}ms", self.elapsed_ms);
        println!("\nBy category:");
        for (name, count) in &self.by_category {
            println!("  {}: {} ({:.1}%)", name, count, *count as f64 / self.total.max(1) as f64 * 100.0);
        }
        println!("\nBy source:");
        for (name, count) in &self.by_source {
            println!("  {}: {}", name, count);
        }
    }

    pub fn print_detail(&self) {
        self.print_summary();
        println!("\nPer-puzzle detail:");
        for t in &self.per_task {
            let status = match t.correct {
                Some(true) => "OK",
                Some(false) => "--",
                None => "??",
            };
            println!("  [{}] {} | {} | source={} time={}us",
                status, t.puzzle_id, t.classification, t.source.name(), t.elapsed_us);
        }
    }
}
