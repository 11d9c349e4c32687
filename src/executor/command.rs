//! Per-case external process invocation
//!
//! Builds the command line for one case and runs it to completion in the
//! case's build directory.

use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::warn;

use crate::catalog::Category;
use crate::config::RunPlan;
use crate::workspace::WorkspaceLayout;

/// Fully resolved invocation for one case
#[derive(Clone, Debug)]
pub struct CaseCommand {
    pub case: String,
    pub program: PathBuf,
    pub input_file: PathBuf,
    pub working_dir: PathBuf,
}

impl CaseCommand {
    /// Select the executable and input file for the case's category.
    ///
    /// Returns `None` when the plan carries no executable for the category;
    /// plan validation rules that out before dispatch.
    pub fn for_case(plan: &RunPlan, layout: &WorkspaceLayout) -> Option<Self> {
        let program = plan.executable_for(layout.category)?.to_path_buf();
        let input_file = match layout.category {
            Category::Beamdyn => layout.build_dir.join("bd_driver.inp"),
            Category::Regression | Category::Linear => {
                layout.build_dir.join(format!("{}.fst", layout.case))
            }
        };

        Some(Self {
            case: layout.case.clone(),
            program,
            input_file,
            working_dir: layout.build_dir.clone(),
        })
    }

    /// Launch the process and wait for it to exit.
    ///
    /// Returns the exit code, or `None` when the process could not be
    /// spawned or was terminated without one. Either way the case is
    /// recorded as failed rather than escalated.
    pub async fn run(&self, verbose: bool) -> Option<i32> {
        let mut command = Command::new(&self.program);
        command.arg(&self.input_file).current_dir(&self.working_dir);

        if !verbose {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }

        match command.status().await {
            Ok(status) => status.code(),
            Err(e) => {
                warn!("failed to launch {} for {}: {e}", self.program.display(), self.case);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn layout(case: &str, category: Category) -> WorkspaceLayout {
        WorkspaceLayout {
            case: case.to_string(),
            category,
            input_dir: PathBuf::from("/fixtures").join(case),
            baseline_dir: PathBuf::from("/fixtures").join(case).join("macos-gnu"),
            build_dir: PathBuf::from("/build/local_results").join(case),
        }
    }

    fn plan_with_executables() -> RunPlan {
        RunPlan::new(vec!["all".into()], "/repo").with_executables(&[
            PathBuf::from("/opt/bin/openfast"),
            PathBuf::from("/opt/bin/beamdyn_driver"),
        ])
    }

    #[test]
    fn regression_cases_use_the_general_executable() {
        let plan = plan_with_executables();
        let cmd = CaseCommand::for_case(&plan, &layout("AOC_WSt", Category::Regression)).unwrap();

        assert_eq!(cmd.program, Path::new("/opt/bin/openfast"));
        assert!(cmd.input_file.ends_with("AOC_WSt/AOC_WSt.fst"));
        assert!(cmd.working_dir.ends_with("local_results/AOC_WSt"));
    }

    #[test]
    fn beamdyn_cases_use_the_driver() {
        let plan = plan_with_executables();
        let cmd = CaseCommand::for_case(&plan, &layout("bd_curved_beam", Category::Beamdyn)).unwrap();

        assert_eq!(cmd.program, Path::new("/opt/bin/beamdyn_driver"));
        assert!(cmd.input_file.ends_with("bd_curved_beam/bd_driver.inp"));
    }

    #[test]
    fn missing_executable_yields_no_command() {
        let plan = RunPlan::new(vec!["all".into()], "/repo");
        assert!(CaseCommand::for_case(&plan, &layout("AOC_WSt", Category::Regression)).is_none());
    }

    #[tokio::test]
    async fn unspawnable_program_reports_no_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = CaseCommand {
            case: "AOC_WSt".to_string(),
            program: PathBuf::from("/nonexistent/openfast"),
            input_file: dir.path().join("AOC_WSt.fst"),
            working_dir: dir.path().to_path_buf(),
        };

        assert_eq!(cmd.run(false).await, None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn exit_codes_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let base = CaseCommand {
            case: "AOC_WSt".to_string(),
            program: PathBuf::from("/bin/true"),
            input_file: dir.path().join("AOC_WSt.fst"),
            working_dir: dir.path().to_path_buf(),
        };

        assert_eq!(base.run(false).await, Some(0));

        let failing = CaseCommand {
            program: PathBuf::from("/bin/false"),
            ..base
        };
        assert_eq!(failing.run(false).await, Some(1));
    }
}
