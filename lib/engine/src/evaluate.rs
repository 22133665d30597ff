//! Precision/recall evaluation against ground truth
//!
//! Metrics whose denominator is zero are [`Metric::Undefined`] rather than
//! NaN or a division fault, so callers can tell "no data" apart from "zero".

use ahash::AHashSet;
use semprop_core::Matching;
use serde::Serialize;
use std::fmt;

/// Matchings known to be correct. Read-only once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroundTruth {
    matchings: AHashSet<Matching>,
}

impl GroundTruth {
    pub fn new<I: IntoIterator<Item = Matching>>(matchings: I) -> Self {
        Self {
            matchings: matchings.into_iter().collect(),
        }
    }

    #[inline]
    pub fn contains(&self, matching: &Matching) -> bool {
        self.matchings.contains(matching)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.matchings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.matchings.is_empty()
    }
}

impl FromIterator<Matching> for GroundTruth {
    fn from_iter<I: IntoIterator<Item = Matching>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// A ratio that may be undefined
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(into = "Option<f64>")]
pub enum Metric {
    Defined(f64),
    /// The denominator was zero
    Undefined,
}

impl Metric {
    pub fn ratio(numerator: usize, denominator: usize) -> Self {
        if denominator == 0 {
            Metric::Undefined
        } else {
            Metric::Defined(numerator as f64 / denominator as f64)
        }
    }

    #[inline]
    pub fn value(self) -> Option<f64> {
        match self {
            Metric::Defined(v) => Some(v),
            Metric::Undefined => None,
        }
    }

    #[inline]
    pub fn is_defined(self) -> bool {
        matches!(self, Metric::Defined(_))
    }
}

impl From<Metric> for Option<f64> {
    fn from(metric: Metric) -> Self {
        metric.value()
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Defined(v) => write!(f, "{:.4}", v),
            Metric::Undefined => f.write_str("undefined"),
        }
    }
}

/// Precision and recall of a predicted matching set
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PrecisionRecall {
    pub precision: Metric,
    pub recall: Metric,
}

impl PrecisionRecall {
    /// Harmonic mean of precision and recall.
    ///
    /// Undefined when either metric is, or when both are zero.
    pub fn f1(&self) -> Metric {
        match (self.precision, self.recall) {
            (Metric::Defined(p), Metric::Defined(r)) if p + r > 0.0 => {
                Metric::Defined(2.0 * p * r / (p + r))
            }
            _ => Metric::Undefined,
        }
    }
}

/// Counts and metrics of one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub true_positives: usize,
    pub predicted: usize,
    pub ground_truth: usize,
    pub precision: Metric,
    pub recall: Metric,
    pub f1: Metric,
}

impl EvaluationReport {
    pub fn metrics(&self) -> PrecisionRecall {
        PrecisionRecall {
            precision: self.precision,
            recall: self.recall,
        }
    }

    /// True when any metric could not be computed
    pub fn is_degenerate(&self) -> bool {
        !(self.precision.is_defined() && self.recall.is_defined())
    }
}

/// Evaluate `predicted` against `ground_truth`.
///
/// Predicted matchings are deduplicated before counting.
pub fn evaluate(ground_truth: &GroundTruth, predicted: &[Matching]) -> EvaluationReport {
    let predicted: AHashSet<&Matching> = predicted.iter().collect();
    let true_positives = predicted.iter().filter(|m| ground_truth.contains(m)).count();

    let precision = Metric::ratio(true_positives, predicted.len());
    let recall = Metric::ratio(true_positives, ground_truth.len());
    let f1 = PrecisionRecall { precision, recall }.f1();

    EvaluationReport {
        true_positives,
        predicted: predicted.len(),
        ground_truth: ground_truth.len(),
        precision,
        recall,
        f1,
    }
}

/// Precision and recall of `predicted` against `ground_truth`
pub fn compute_pr(ground_truth: &GroundTruth, predicted: &[Matching]) -> PrecisionRecall {
    evaluate(ground_truth, predicted).metrics()
}
