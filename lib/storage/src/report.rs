// Run reports: what a pipeline run did and how well it scored
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use semprop_core::{MatchingType, PipelineConfig};
use semprop_engine::{Diagnostics, EvaluationReport, Evaluated, Run};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

use crate::format::write_atomic;

/// Serializable record of one evaluated run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub config: PipelineConfig,
    pub diagnostics: Diagnostics,
    /// Combined matchings supported by each matcher
    pub provenance: BTreeMap<MatchingType, usize>,
    /// Combined matchings found by two or more matchers
    pub multi_matcher: usize,
    pub evaluation: EvaluationReport,
}

impl RunReport {
    pub fn from_run(run: &Run<Evaluated>) -> Self {
        let combined = &run.stage().combined;
        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            config: run.config().clone(),
            diagnostics: run.diagnostics().clone(),
            provenance: combined.counts_by_type(),
            multi_matcher: combined.supported_by_at_least(2).len(),
            evaluation: *run.evaluation(),
        }
    }

    /// One-line human summary
    pub fn summary(&self) -> String {
        let e = &self.evaluation;
        format!(
            "run {}: {} matchings, {} correct of {} expected; precision {} recall {} f1 {}",
            self.run_id, e.predicted, e.true_positives, e.ground_truth, e.precision, e.recall, e.f1
        )
    }

    /// Write the report as pretty JSON, replacing any previous file atomically
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating report directory {}", parent.display()))?;
        }
        let json = serde_json::to_vec_pretty(self)?;
        write_atomic(path, &json)
            .with_context(|| format!("writing report {}", path.display()))?;
        info!(path = %path.display(), run_id = %self.run_id, "wrote run report");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use semprop_core::{CandidateSet, CandidateStreams, Matching, OntologyClass, SchemaElement};
    use semprop_engine::{GroundTruth, Passthrough, Pipeline};
    use std::sync::Arc;

    fn evaluated_run() -> Run<Evaluated> {
        let class = OntologyClass::new("efo", "Assay");
        let assay = Matching::new(SchemaElement::table("chembl", "assays"), class.clone());
        let docs = Matching::new(SchemaElement::table("chembl", "docs"), class);
        let streams = CandidateStreams::new()
            .with_candidates(CandidateSet::new(
                MatchingType::L4ClassNameRelationNameSyn,
                vec![assay.clone(), docs],
            ))
            .with_candidates(CandidateSet::new(
                MatchingType::L7ClassNameAttrNameFuzzy,
                vec![assay.clone()],
            ));

        Pipeline::new(PipelineConfig::default(), Arc::new(Passthrough))
            .unwrap()
            .run_and_evaluate(streams, &GroundTruth::new([assay]))
    }

    #[test]
    fn test_report_counts_provenance() {
        let report = RunReport::from_run(&evaluated_run());

        assert_eq!(report.multi_matcher, 1);
        assert_eq!(report.provenance[&MatchingType::L4ClassNameRelationNameSyn], 2);
        assert_eq!(report.evaluation.true_positives, 1);
        assert!(report.summary().contains("precision 0.5000"));
    }

    #[test]
    fn test_report_written_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("run.json");
        let report = RunReport::from_run(&evaluated_run());

        report.write_json(&path).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(value["run_id"], report.run_id.to_string());
        assert_eq!(value["evaluation"]["recall"], 1.0);
        assert_eq!(value["config"]["cancellation_point"], "before_combination");
    }
}
