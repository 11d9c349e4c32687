//! Case registry
//!
//! Static mapping of regression test case names to their categories.

#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Case categories, each with its own driver executable and output naming
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Regression,
    Linear,
    Beamdyn,
}

impl Category {
    pub fn name(&self) -> &'static str {
        match self {
            Category::Regression => "regression",
            Category::Linear => "linear",
            Category::Beamdyn => "beamdyn",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "regression" => Some(Category::Regression),
            "linear" => Some(Category::Linear),
            "beamdyn" => Some(Category::Beamdyn),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Catalog lookup errors
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("unknown case: {0}")]
    UnknownCase(String),
}

// Registration order is the canonical case order for "all".
const CASES: &[(&str, Category)] = &[
    ("5MW_ITIBarge_DLL_WTurb_WavesIrr", Category::Regression),
    ("5MW_Land_BD_DLL_WTurb", Category::Regression),
    ("5MW_Land_BD_Linear", Category::Linear),
    ("5MW_Land_DLL_WTurb", Category::Regression),
    ("5MW_OC3Mnpl_DLL_WTurb_WavesIrr", Category::Regression),
    ("5MW_OC3Spar_DLL_WTurb_WavesIrr", Category::Regression),
    ("5MW_OC3Trpd_DLL_WSt_WavesReg", Category::Regression),
    ("5MW_OC4Jckt_DLL_WTurb_WavesIrr_MGrowth", Category::Regression),
    ("5MW_OC4Semi_WSt_WavesWN", Category::Regression),
    ("5MW_TLP_DLL_WTurb_WavesIrr_WavesMulti", Category::Regression),
    ("AOC_WSt", Category::Regression),
    ("AOC_YFix_WSt", Category::Regression),
    ("AOC_YFree_WTurb", Category::Regression),
    ("AWT_WSt_StartUpShutDown", Category::Regression),
    ("AWT_WSt_StartUp_HighSpShutDown", Category::Regression),
    ("AWT_YFix_WSt", Category::Regression),
    ("AWT_YFree_WSt", Category::Regression),
    ("AWT_YFree_WTurb", Category::Regression),
    ("Ideal_Beam_Fixed_Free_Linear", Category::Linear),
    ("Ideal_Beam_Free_Free_Linear", Category::Linear),
    ("SWRT_YFree_VS_EDC01", Category::Regression),
    ("SWRT_YFree_VS_EDG01", Category::Regression),
    ("SWRT_YFree_VS_WTurb", Category::Regression),
    ("UAE_Dnwind_YRamp_WSt", Category::Regression),
    ("UAE_Upwind_Rigid_WRamp_PwrCurve", Category::Regression),
    ("WP_Stationary_Linear", Category::Linear),
    ("WP_VSP_ECD", Category::Regression),
    ("WP_VSP_WTurb", Category::Regression),
    ("WP_VSP_WTurb_PitchFail", Category::Regression),
    ("bd_5MW_dynamic", Category::Beamdyn),
    ("bd_5MW_dynamic_gravity_Az00", Category::Beamdyn),
    ("bd_5MW_dynamic_gravity_Az90", Category::Beamdyn),
    ("bd_curved_beam", Category::Beamdyn),
    ("bd_isotropic_rollup", Category::Beamdyn),
    ("bd_static_cantilever_beam", Category::Beamdyn),
    ("bd_static_twisted_with_k1", Category::Beamdyn),
];

/// Immutable case name -> category registry.
///
/// Constructed once at startup and passed explicitly into the components
/// that need it; there is no mutation API.
#[derive(Clone, Debug)]
pub struct CaseCatalog {
    entries: Vec<(&'static str, Category)>,
}

impl CaseCatalog {
    pub fn new() -> Self {
        Self {
            entries: CASES.to_vec(),
        }
    }

    /// Look up the category of a registered case.
    pub fn category_of(&self, name: &str) -> Result<Category, CatalogError> {
        self.entries
            .iter()
            .find(|(case, _)| *case == name)
            .map(|(_, category)| *category)
            .ok_or_else(|| CatalogError::UnknownCase(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(case, _)| *case == name)
    }

    /// Expand a case selector into concrete case names.
    ///
    /// The single literal `all` expands to every registered case in
    /// registration order; anything else is validated name by name and
    /// returned in the given order.
    pub fn expand(&self, selector: &[String]) -> Result<Vec<String>, CatalogError> {
        if selector.len() == 1 && selector[0] == "all" {
            return Ok(self
                .entries
                .iter()
                .map(|(case, _)| case.to_string())
                .collect());
        }

        let mut cases = Vec::with_capacity(selector.len());
        for name in selector {
            if !self.contains(name) {
                return Err(CatalogError::UnknownCase(name.clone()));
            }
            cases.push(name.clone());
        }
        Ok(cases)
    }

    /// Resolve names to (name, category) pairs, preserving order.
    pub fn resolve(&self, names: &[String]) -> Result<Vec<(String, Category)>, CatalogError> {
        names
            .iter()
            .map(|name| Ok((name.clone(), self.category_of(name)?)))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Category)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CaseCatalog {
    fn default() -> Self {
        Self::new()
    }
}
