//! Workspace planning and materialization
//!
//! Derives the per-case {input, baseline, build} directory triad and
//! populates the build tree with working copies of the case fixtures.
//! Planning is pure path computation; materialization is the only phase
//! that writes to shared directories and must fully complete before any
//! case is dispatched.

mod fsops;

pub use fsops::{copy_file_if_absent, copy_tree_if_absent, ensure_dir, MaterializationError};

use std::path::PathBuf;
use tracing::{debug, info};

use crate::catalog::{CaseCatalog, CatalogError, Category};
use crate::config::{RunPlan, ALLOWED_OUTPUT_TYPES};

/// Shared fixture directories required by linear cases
const LINEAR_FIXTURES: &[&str] = &["Ideal_Beam", "WP_Baseline"];

/// Shared fixture directories required by regression cases
const REGRESSION_FIXTURES: &[&str] = &["AOC", "AWT27", "SWRT", "UAE_VI", "WP_Baseline"];

/// Driver input files copied into every beamdyn build directory
const BEAMDYN_INPUTS: &[&str] = &["bd_driver.inp", "bd_primary.inp", "beam_props.inp"];

/// Controller libraries shared by the 5MW cases, as (source subpath, file name)
const SERVO_DLLS: &[(&str, &str)] = &[
    ("DISCON/build/DISCON.dll", "DISCON.dll"),
    ("DISCON_ITI/build/DISCON_ITIBarge.dll", "DISCON_ITIBarge.dll"),
    ("DISCON_OC3/build/DISCON_OC3Hywind.dll", "DISCON_OC3Hywind.dll"),
];

/// Directory triad for one case.
///
/// The input and baseline directories are read-only fixtures; the build
/// directory is writable and never shared between two cases.
#[derive(Clone, Debug)]
pub struct WorkspaceLayout {
    pub case: String,
    pub category: Category,
    pub input_dir: PathBuf,
    pub baseline_dir: PathBuf,
    pub build_dir: PathBuf,
}

/// Plans and materializes the per-case working directories.
pub struct WorkspacePlanner<'a> {
    plan: &'a RunPlan,
    catalog: &'a CaseCatalog,
}

impl<'a> WorkspacePlanner<'a> {
    pub fn new(plan: &'a RunPlan, catalog: &'a CaseCatalog) -> Self {
        Self { plan, catalog }
    }

    /// Compute the directory triad for every case in the plan.
    ///
    /// Purely derives paths; never touches disk. Build directories are
    /// disjoint by construction since each is keyed by the case name.
    pub fn layouts(&self) -> Result<Vec<WorkspaceLayout>, CatalogError> {
        let local_results = self.plan.build_dir().join("local_results");

        self.plan
            .cases
            .iter()
            .map(|case| {
                let category = self.catalog.category_of(case)?;
                let input_dir = match category {
                    Category::Beamdyn => self.plan.beamdyn_module_dir().join(case),
                    Category::Regression | Category::Linear => self.plan.module_dir().join(case),
                };
                Ok(WorkspaceLayout {
                    case: case.clone(),
                    category,
                    baseline_dir: input_dir.join(&self.plan.output_type),
                    build_dir: local_results.join(case),
                    input_dir,
                })
            })
            .collect()
    }

    /// Populate the build tree for the given layouts.
    ///
    /// Runs single-threaded and must fully complete before dispatch: the
    /// shared fixture directories written here are read by cases that later
    /// execute concurrently. Every step copies only what is absent, so
    /// re-running a plan neither fails nor duplicates content. A missing
    /// source fixture aborts the whole run.
    pub fn materialize(&self, layouts: &[WorkspaceLayout]) -> Result<(), MaterializationError> {
        let local_results = self.plan.build_dir().join("local_results");
        ensure_dir(&local_results)?;

        self.materialize_shared_fixtures(layouts, &local_results)?;

        for layout in layouts {
            copy_tree_if_absent(&layout.input_dir, &layout.build_dir, ALLOWED_OUTPUT_TYPES)?;

            if layout.category == Category::Beamdyn {
                for input in BEAMDYN_INPUTS {
                    copy_file_if_absent(&layout.input_dir.join(input), &layout.build_dir)?;
                }
            }
        }

        if layouts.iter().any(|l| l.case.contains("5MW")) {
            self.materialize_5mw_baseline(&local_results)?;
        }

        info!("materialized {} case directories", layouts.len());
        Ok(())
    }

    /// Category-level shared fixture directories, copied once and reused
    /// across cases.
    fn materialize_shared_fixtures(
        &self,
        layouts: &[WorkspaceLayout],
        local_results: &std::path::Path,
    ) -> Result<(), MaterializationError> {
        let mut fixtures: Vec<&str> = Vec::new();
        if layouts.iter().any(|l| l.category == Category::Linear) {
            fixtures.extend(LINEAR_FIXTURES);
        }
        if layouts.iter().any(|l| l.category == Category::Regression) {
            for fixture in REGRESSION_FIXTURES.iter().copied() {
                if !fixtures.contains(&fixture) {
                    fixtures.push(fixture);
                }
            }
        }

        for fixture in fixtures {
            let source = self.plan.module_dir().join(fixture);
            let target = local_results.join(fixture);
            if copy_tree_if_absent(&source, &target, &[])? {
                debug!("populated shared fixture {fixture}");
            }
        }
        Ok(())
    }

    /// The 5MW baseline folder and its controller libraries, shared by every
    /// `5MW` case. Written exactly once; the DLLs are copied from their
    /// build locations only when absent.
    fn materialize_5mw_baseline(
        &self,
        local_results: &std::path::Path,
    ) -> Result<(), MaterializationError> {
        let source = self.plan.module_dir().join("5MW_Baseline");
        let target = local_results.join("5MW_Baseline");

        copy_tree_if_absent(&source, &target, &["ServoData"])?;

        let servo_target = target.join("ServoData");
        ensure_dir(&servo_target)?;
        for (subpath, name) in SERVO_DLLS {
            let dll_source = source.join("ServoData").join(subpath);
            if copy_file_if_absent(&dll_source, &servo_target.join(name))? {
                debug!("installed {name}");
            }
        }
        Ok(())
    }
}
