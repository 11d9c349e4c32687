//! Divergence metrics
//!
//! Computes the per-channel norms used to judge a freshly produced output
//! against its stored baseline. Every norm is computed strictly from the
//! (baseline, test) pair of the case at hand.

#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::loader::OutputData;

/// Comparison errors
#[derive(Error, Debug)]
pub enum ComparisonError {
    #[error("channel count mismatch: baseline has {baseline}, test has {test}")]
    ChannelMismatch { baseline: usize, test: usize },

    #[error("sample count mismatch in {channel}: baseline has {baseline}, test has {test}")]
    LengthMismatch {
        channel: String,
        baseline: usize,
        test: usize,
    },

    #[error("relative L2 norm undefined for {0}: baseline is identically zero")]
    ZeroBaseline(String),
}

/// The norms a channel can be judged by
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormKind {
    MaxNorm,
    MaxNormOverRange,
    L2Norm,
    RelativeL2Norm,
}

impl NormKind {
    pub fn all() -> [NormKind; 4] {
        [
            NormKind::MaxNorm,
            NormKind::MaxNormOverRange,
            NormKind::L2Norm,
            NormKind::RelativeL2Norm,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            NormKind::MaxNorm => "max_norm",
            NormKind::MaxNormOverRange => "max_norm_over_range",
            NormKind::L2Norm => "l2_norm",
            NormKind::RelativeL2Norm => "relative_l2_norm",
        }
    }
}

/// All four norms for one channel
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChannelNorms {
    pub channel: String,
    pub max_norm: f64,
    pub max_norm_over_range: f64,
    pub l2_norm: f64,
    pub relative_l2_norm: f64,
}

impl ChannelNorms {
    pub fn value(&self, kind: NormKind) -> f64 {
        match kind {
            NormKind::MaxNorm => self.max_norm,
            NormKind::MaxNormOverRange => self.max_norm_over_range,
            NormKind::L2Norm => self.l2_norm,
            NormKind::RelativeL2Norm => self.relative_l2_norm,
        }
    }

    /// True when every requested norm is within the tolerance.
    pub fn within(&self, kinds: &[NormKind], tolerance: f64) -> bool {
        kinds.iter().all(|kind| self.value(*kind) <= tolerance)
    }

    /// The largest of the requested norms.
    pub fn worst(&self, kinds: &[NormKind]) -> f64 {
        kinds
            .iter()
            .map(|kind| self.value(*kind))
            .fold(0.0, f64::max)
    }
}

/// Compute the norms channel by channel for one (baseline, test) pair.
///
/// The two outputs must agree in channel count and, per channel, in sample
/// count. Channels with a constant baseline get a range-relative norm of
/// zero rather than a division by zero; an identically zero baseline only
/// admits a relative L2 norm when the test series is identically zero too.
pub fn calculate_norms(
    baseline: &OutputData,
    test: &OutputData,
) -> Result<Vec<ChannelNorms>, ComparisonError> {
    if baseline.n_channels() != test.n_channels() {
        return Err(ComparisonError::ChannelMismatch {
            baseline: baseline.n_channels(),
            test: test.n_channels(),
        });
    }

    baseline
        .channels()
        .iter()
        .enumerate()
        .map(|(i, channel)| channel_norms(channel, baseline.series(i), test.series(i)))
        .collect()
}

fn channel_norms(channel: &str, b: &[f64], t: &[f64]) -> Result<ChannelNorms, ComparisonError> {
    if b.len() != t.len() {
        return Err(ComparisonError::LengthMismatch {
            channel: channel.to_string(),
            baseline: b.len(),
            test: t.len(),
        });
    }

    let max_norm = b
        .iter()
        .zip(t)
        .map(|(b_i, t_i)| (t_i - b_i).abs())
        .fold(0.0, f64::max);

    let b_max = b.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let b_min = b.iter().copied().fold(f64::INFINITY, f64::min);
    let range = b_max - b_min;
    let max_norm_over_range = if range == 0.0 { 0.0 } else { max_norm / range };

    let l2_norm = b
        .iter()
        .zip(t)
        .map(|(b_i, t_i)| (t_i - b_i).powi(2))
        .sum::<f64>()
        .sqrt();

    let baseline_magnitude = b.iter().map(|b_i| b_i.powi(2)).sum::<f64>().sqrt();
    let relative_l2_norm = if baseline_magnitude == 0.0 {
        let test_magnitude = t.iter().map(|t_i| t_i.powi(2)).sum::<f64>();
        if test_magnitude == 0.0 {
            0.0
        } else {
            return Err(ComparisonError::ZeroBaseline(channel.to_string()));
        }
    } else {
        l2_norm / baseline_magnitude
    };

    Ok(ChannelNorms {
        channel: channel.to_string(),
        max_norm,
        max_norm_over_range,
        l2_norm,
        relative_l2_norm,
    })
}
