//! Pipeline configuration
//!
//! All tunable thresholds of a run live here. Every field has a default so a
//! partial JSON document is a valid configuration.

use crate::error::{Error, Result};
use crate::matching::MatchingType;
use serde::{Deserialize, Serialize};

/// Complete configuration of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub thresholds: Thresholds,
    pub summarization: SummarizationConfig,
    /// Where negative-signal and coherence cancellation happen
    pub cancellation_point: CancellationPoint,
    /// Matcher types whose streams enter combination
    pub combine_types: Vec<MatchingType>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            summarization: SummarizationConfig::default(),
            cancellation_point: CancellationPoint::default(),
            combine_types: vec![
                MatchingType::L1ClassNameAttrValue,
                MatchingType::L4ClassNameRelationNameSyn,
                MatchingType::L5ClassNameAttrNameSyn,
                MatchingType::L42ClassNameRelationNameSem,
                MatchingType::L52ClassNameAttrNameSem,
                MatchingType::L7ClassNameAttrNameFuzzy,
            ],
        }
    }
}

impl PipelineConfig {
    /// Validate the configuration
    /// - Checks that every threshold and ratio lies in [0, 1]
    /// - Deduplicates `combine_types`, which must not be empty
    pub fn validate(&mut self) -> Result<()> {
        let t = &self.thresholds;
        let bounded = [
            ("sim_threshold_rel", t.sim_threshold_rel),
            ("sim_threshold_attr", t.sim_threshold_attr),
            ("sem_threshold_rel", t.sem_threshold_rel),
            ("sem_threshold_attr", t.sem_threshold_attr),
            ("coh_group_threshold", t.coh_group_threshold),
            ("sensitivity_cancellation_signal", t.sensitivity_cancellation_signal),
            ("content_sim_threshold", t.content_sim_threshold),
            ("summary_ratio", self.summarization.summary_ratio),
        ];
        for (name, value) in bounded {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidConfig(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        if self.combine_types.is_empty() {
            return Err(Error::InvalidConfig(
                "combine_types must name at least one matcher".to_string(),
            ));
        }
        self.combine_types.sort();
        self.combine_types.dedup();

        Ok(())
    }

    pub fn combines(&self, matching_type: MatchingType) -> bool {
        self.combine_types.contains(&matching_type)
    }
}

/// Similarity cutoffs handed to the candidate generators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub sim_threshold_rel: f64,
    pub sim_threshold_attr: f64,
    pub sem_threshold_rel: f64,
    pub sem_threshold_attr: f64,
    pub coh_group_threshold: f64,
    /// Minimum number of attributes backing a coherence group
    pub coh_group_size_cutoff: usize,
    pub sensitivity_cancellation_signal: f64,
    pub content_sim_threshold: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            sim_threshold_rel: 0.2,
            sim_threshold_attr: 0.2,
            sem_threshold_rel: 0.7,
            sem_threshold_attr: 0.6,
            coh_group_threshold: 0.5,
            coh_group_size_cutoff: 2,
            sensitivity_cancellation_signal: 0.3,
            content_sim_threshold: 0.6,
        }
    }
}

/// Ancestor summarization settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizationConfig {
    /// Share of a table's candidates a cluster must exceed
    pub summary_ratio: f64,
    /// Cluster size a summary must exceed
    pub min_count: usize,
    /// Summarize the L42/L52 streams before combination
    pub summarize_semantic_streams: bool,
    /// Summarize the flattened combination
    pub summarize_combined: bool,
}

impl Default for SummarizationConfig {
    fn default() -> Self {
        Self {
            summary_ratio: 0.8,
            min_count: 1,
            summarize_semantic_streams: true,
            summarize_combined: true,
        }
    }
}

/// Stage order of cancellation relative to combination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancellationPoint {
    /// Cancel and filter each stream, then combine
    #[default]
    BeforeCombination,
    /// Combine first, then strip cancelled provenance from the combination
    AfterCombination,
}
