//! Bounded parallel case dispatch
//!
//! Runs every case in the plan under a worker pool sized by the resolved
//! job count. The pool always waits for every case; a failing simulation is
//! recorded, never escalated, so the whole batch gets a verdict.

#![allow(dead_code)]

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info};

use super::command::CaseCommand;
use crate::config::{ConfigError, RunPlan};
use crate::workspace::WorkspaceLayout;

/// Exit status of one dispatched case.
///
/// `exit_code` is `None` when the process could not be spawned or died
/// without an exit code; both count as a failed execution.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub case: String,
    pub index: usize,
    pub exit_code: Option<i32>,
}

impl ExecutionResult {
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Resolve a requested job count against the machine and the plan.
///
/// `-1` (and `0`, treated the same) resolves to 80% of the available
/// parallelism, rounded up; a positive request is capped by the available
/// parallelism. Either way the result never exceeds the number of cases.
pub fn resolve_jobs(requested: i64, available: usize, n_cases: usize) -> Result<usize, ConfigError> {
    if requested < -1 {
        return Err(ConfigError::InvalidJobs(requested));
    }

    let resolved = if requested <= 0 {
        (4 * available).div_ceil(5)
    } else {
        (requested as usize).min(available)
    };

    Ok(resolved.min(n_cases))
}

/// Dispatches cases to a bounded worker pool.
pub struct ExecutionDispatcher {
    jobs: usize,
    verbose: bool,
}

impl ExecutionDispatcher {
    /// Size the pool for the given plan.
    pub fn new(plan: &RunPlan) -> Result<Self, ConfigError> {
        let available = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let jobs = resolve_jobs(plan.jobs, available, plan.cases.len())?;

        Ok(Self {
            jobs,
            verbose: plan.verbose,
        })
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// Run every case to completion.
    ///
    /// Workers share nothing but their own build directory; results are
    /// correlated to cases by index, not completion order. Returns exactly
    /// one result per layout, in plan order.
    pub async fn run(&self, plan: &RunPlan, layouts: &[WorkspaceLayout]) -> Vec<ExecutionResult> {
        info!(
            "dispatching {} cases across {} workers",
            layouts.len(),
            self.jobs
        );

        let semaphore = Arc::new(Semaphore::new(self.jobs));
        let total = layouts.len();
        let mut handles = Vec::with_capacity(total);

        for (index, layout) in layouts.iter().enumerate() {
            let semaphore = semaphore.clone();
            let command = CaseCommand::for_case(plan, layout);
            let case = layout.case.clone();
            let verbose = self.verbose;

            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire().await.unwrap();

                debug!("running case {}/{total}: {case}", index + 1);
                let exit_code = match &command {
                    Some(cmd) => cmd.run(verbose).await,
                    None => None,
                };

                ExecutionResult {
                    case,
                    index,
                    exit_code,
                }
            }));
        }

        let mut results: Vec<ExecutionResult> = join_all(handles)
            .await
            .into_iter()
            .enumerate()
            .map(|(index, joined)| {
                joined.unwrap_or_else(|_| ExecutionResult {
                    case: layouts[index].case.clone(),
                    index,
                    exit_code: None,
                })
            })
            .collect();

        results.sort_by_key(|r| r.index);
        results
    }
}

/// Console tally printed between execution and comparison.
pub fn tally(results: &[ExecutionResult]) -> String {
    let total = results.len();
    let succeeded = results.iter().filter(|r| r.succeeded()).count();

    let mut out = format!("\n    {succeeded}/{total} cases completed");
    if succeeded != total {
        out.push_str("\n\n    Failed cases:");
        for result in results.iter().filter(|r| !r.succeeded()) {
            let _ = write!(out, "\n  {:>6}: {}", result.index + 1, result.case);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Category;
    use std::path::PathBuf;

    #[test]
    fn default_request_takes_80_percent_capped_by_cases() {
        assert_eq!(resolve_jobs(-1, 10, 3).unwrap(), 3);
        assert_eq!(resolve_jobs(-1, 10, 20).unwrap(), 8);
    }

    #[test]
    fn zero_behaves_like_minus_one() {
        assert_eq!(resolve_jobs(0, 10, 20).unwrap(), 8);
        assert_eq!(resolve_jobs(0, 10, 3).unwrap(), 3);
    }

    #[test]
    fn positive_request_is_capped_by_parallelism() {
        assert_eq!(resolve_jobs(5, 4, 20).unwrap(), 4);
        assert_eq!(resolve_jobs(2, 4, 20).unwrap(), 2);
    }

    #[test]
    fn below_minus_one_is_a_configuration_error() {
        assert!(matches!(
            resolve_jobs(-2, 10, 3),
            Err(ConfigError::InvalidJobs(-2))
        ));
    }

    fn doomed_layouts(cases: &[&str]) -> Vec<WorkspaceLayout> {
        cases
            .iter()
            .enumerate()
            .map(|(i, case)| WorkspaceLayout {
                case: case.to_string(),
                category: if i % 2 == 0 {
                    Category::Regression
                } else {
                    Category::Beamdyn
                },
                input_dir: PathBuf::from("/fixtures").join(case),
                baseline_dir: PathBuf::from("/fixtures").join(case).join("macos-gnu"),
                build_dir: PathBuf::from("/nonexistent/build").join(case),
            })
            .collect()
    }

    #[tokio::test]
    async fn every_case_gets_a_result_even_when_all_fail() {
        let plan = RunPlan::new(
            vec!["AOC_WSt".into(), "bd_curved_beam".into(), "AOC_YFix_WSt".into()],
            "/repo",
        )
        .with_executables(&[
            PathBuf::from("/nonexistent/openfast"),
            PathBuf::from("/nonexistent/beamdyn_driver"),
        ])
        .with_jobs(2);

        let layouts = doomed_layouts(&["AOC_WSt", "bd_curved_beam", "AOC_YFix_WSt"]);
        let dispatcher = ExecutionDispatcher::new(&plan).unwrap();
        let results = dispatcher.run(&plan, &layouts).await;

        assert_eq!(results.len(), layouts.len());
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.index, i);
            assert_eq!(result.case, layouts[i].case);
            assert_eq!(result.exit_code, None);
        }
    }

    #[test]
    fn tally_lists_failing_cases() {
        let results = vec![
            ExecutionResult {
                case: "AOC_WSt".into(),
                index: 0,
                exit_code: Some(0),
            },
            ExecutionResult {
                case: "bd_curved_beam".into(),
                index: 1,
                exit_code: Some(2),
            },
        ];

        let tally = tally(&results);
        assert!(tally.contains("1/2 cases completed"));
        assert!(tally.contains("Failed cases:"));
        assert!(tally.contains("bd_curved_beam"));
        assert!(!tally.contains("AOC_WSt\n"));
    }

    #[test]
    fn tally_of_a_clean_run_has_no_failure_section() {
        let results = vec![ExecutionResult {
            case: "AOC_WSt".into(),
            index: 0,
            exit_code: Some(0),
        }];

        let tally = tally(&results);
        assert!(tally.contains("1/1 cases completed"));
        assert!(!tally.contains("Failed cases"));
    }
}
