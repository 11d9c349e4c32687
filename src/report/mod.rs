//! Verdicts and aggregation
//!
//! Judges each case's output against its baseline and folds the per-case
//! outcomes into the final run report. Rendering of per-case summaries
//! (plots, HTML) happens outside the core behind [`SummaryRenderer`].

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{info, warn};

use crate::config::{PlotMode, RunPlan};
use crate::loader::{output_pair, OutputData, OutputError, OutputLoader};
use crate::norms::{calculate_norms, ChannelNorms, NormKind};
use crate::workspace::WorkspaceLayout;

/// Verdict for one case.
///
/// Skipped is disjoint from Fail: it flags harness or data incompleteness,
/// not a simulation regression.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseOutcome {
    Pass,
    Fail,
    Skipped(String),
}

impl CaseOutcome {
    pub fn symbol(&self) -> &'static str {
        match self {
            CaseOutcome::Pass => "✓",
            CaseOutcome::Fail => "✗",
            CaseOutcome::Skipped(_) => "○",
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, CaseOutcome::Pass)
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, CaseOutcome::Fail)
    }
}

impl fmt::Display for CaseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseOutcome::Pass => write!(f, "PASS"),
            CaseOutcome::Fail => write!(f, "FAIL"),
            CaseOutcome::Skipped(reason) => write!(f, "SKIP ({reason})"),
        }
    }
}

/// One judged case
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CaseReport {
    pub case: String,
    pub outcome: CaseOutcome,
    pub norms: Vec<ChannelNorms>,
}

impl CaseReport {
    fn skipped(case: &str, reason: String) -> Self {
        Self {
            case: case.to_string(),
            outcome: CaseOutcome::Skipped(reason),
            norms: Vec::new(),
        }
    }
}

/// Narrow interface to the per-case report renderer.
///
/// Plot and HTML generation live outside the core; the aggregator only
/// forwards the channel data and verdict of the cases selected by the
/// plot mode.
pub trait SummaryRenderer {
    fn render(
        &self,
        case: &str,
        baseline: &OutputData,
        test: &OutputData,
        norms: &[ChannelNorms],
        outcome: &CaseOutcome,
        out_dir: &Path,
    ) -> anyhow::Result<()>;
}

/// Renderer that produces nothing; used when plotting is disabled.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopRenderer;

impl SummaryRenderer for NoopRenderer {
    fn render(
        &self,
        _case: &str,
        _baseline: &OutputData,
        _test: &OutputData,
        _norms: &[ChannelNorms],
        _outcome: &CaseOutcome,
        _out_dir: &Path,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Judges cases and builds the run report.
pub struct ResultAggregator<'a> {
    plan: &'a RunPlan,
    loader: &'a dyn OutputLoader,
    renderer: &'a dyn SummaryRenderer,
    kinds: Vec<NormKind>,
}

impl<'a> ResultAggregator<'a> {
    pub fn new(
        plan: &'a RunPlan,
        loader: &'a dyn OutputLoader,
        renderer: &'a dyn SummaryRenderer,
    ) -> Self {
        Self {
            plan,
            loader,
            renderer,
            kinds: NormKind::all().to_vec(),
        }
    }

    /// Restrict the verdict to a subset of the norms.
    pub fn with_norms(mut self, kinds: Vec<NormKind>) -> Self {
        self.kinds = kinds;
        self
    }

    /// Judge every case; comparison problems skip the case, never the batch.
    pub fn evaluate_cases(&self, layouts: &[WorkspaceLayout]) -> Vec<CaseReport> {
        layouts
            .iter()
            .map(|layout| self.evaluate_case(layout))
            .collect()
    }

    fn evaluate_case(&self, layout: &WorkspaceLayout) -> CaseReport {
        let Some((local, baseline_path)) = output_pair(layout) else {
            return CaseReport::skipped(
                &layout.case,
                format!("unsupported category: {}", layout.category),
            );
        };

        let baseline = match self.loader.load(&baseline_path) {
            Ok(data) => data,
            Err(err) => return CaseReport::skipped(&layout.case, skip_reason(err)),
        };
        let test = match self.loader.load(&local) {
            Ok(data) => data,
            Err(err) => return CaseReport::skipped(&layout.case, skip_reason(err)),
        };

        let norms = match calculate_norms(&baseline, &test) {
            Ok(norms) => norms,
            Err(err) => return CaseReport::skipped(&layout.case, err.to_string()),
        };

        let pass = norms
            .iter()
            .all(|channel| channel.within(&self.kinds, self.plan.tolerance));
        let outcome = if pass {
            CaseOutcome::Pass
        } else {
            CaseOutcome::Fail
        };

        if self.should_render(&outcome) {
            let out_dir = self
                .plan
                .plot_path
                .clone()
                .unwrap_or_else(|| layout.build_dir.clone());
            if let Err(err) = self
                .renderer
                .render(&layout.case, &baseline, &test, &norms, &outcome, &out_dir)
            {
                warn!("failed to render summary for {}: {err}", layout.case);
            }
        }

        CaseReport {
            case: layout.case.clone(),
            outcome,
            norms,
        }
    }

    fn should_render(&self, outcome: &CaseOutcome) -> bool {
        match self.plan.plot {
            PlotMode::Off => false,
            PlotMode::All => true,
            PlotMode::Failures => outcome.is_fail(),
        }
    }
}

fn skip_reason(err: OutputError) -> String {
    match err {
        OutputError::Missing(path) => format!("missing output: {}", path.display()),
        other => other.to_string(),
    }
}

/// Aggregate run report
#[derive(Clone, Debug, Serialize)]
pub struct Report {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub failing_cases: Vec<String>,
    pub cases: Vec<CaseReport>,
}

impl Report {
    /// Fold per-case reports into the aggregate tally, keeping failing
    /// case names in input order.
    pub fn new(cases: Vec<CaseReport>, started_at: DateTime<Utc>) -> Self {
        let total = cases.len();
        let passed = cases.iter().filter(|c| c.outcome.is_pass()).count();
        let failed = cases.iter().filter(|c| c.outcome.is_fail()).count();
        let skipped = total - passed - failed;
        let failing_cases = cases
            .iter()
            .filter(|c| c.outcome.is_fail())
            .map(|c| c.case.clone())
            .collect();

        info!("{passed}/{total} cases passed ({failed} failed, {skipped} skipped)");

        Self {
            started_at,
            finished_at: Utc::now(),
            total,
            passed,
            failed,
            skipped,
            failing_cases,
            cases,
        }
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        for case in &self.cases {
            writeln!(f, "  {} {:42} {}", case.outcome.symbol(), case.case, case.outcome)?;
        }
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(f, "    {}/{} cases passed", self.passed, self.total)?;
        if self.skipped > 0 {
            writeln!(f, "    {} skipped", self.skipped)?;
        }
        if !self.failing_cases.is_empty() {
            writeln!(f, "\n    Failed cases:")?;
            for case in &self.failing_cases {
                writeln!(f, "      {case}")?;
            }
        }
        Ok(())
    }
}
