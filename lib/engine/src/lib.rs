//! # SemProp Engine
//!
//! Turns noisy, possibly conflicting candidate streams from independent
//! matchers into one de-duplicated, provenance-tracked, quality-filtered set
//! of schema-to-ontology matchings.
//!
//! ## Stages
//!
//! - **Cancellation**: syntactic candidates contradicted by a semantic
//!   matcher's negative signals are removed ([`cancel`])
//! - **Coherence filtering**: semantic candidates survive only when a
//!   table-level coherence group corroborates them ([`coherence`])
//! - **Combination**: streams are merged, each matching tagged with the
//!   matchers that produced it ([`combine`])
//! - **Summarization**: sibling matchings roll up to a shared ancestor class
//!   ([`summarize`])
//! - **Evaluation**: precision/recall against ground truth ([`evaluate`])
//!
//! ## Example
//!
//! ```rust
//! use semprop_core::{CandidateSet, CandidateStreams, Matching, MatchingType, OntologyClass, PipelineConfig, SchemaElement};
//! use semprop_engine::{GroundTruth, Passthrough, Pipeline};
//! use std::sync::Arc;
//!
//! let assay = Matching::new(SchemaElement::table("chembl", "assays"), OntologyClass::new("efo", "Assay"));
//! let streams = CandidateStreams::new().with_candidates(CandidateSet::new(
//!     MatchingType::L4ClassNameRelationNameSyn,
//!     vec![assay.clone()],
//! ));
//!
//! let pipeline = Pipeline::new(PipelineConfig::default(), Arc::new(Passthrough)).unwrap();
//! let run = pipeline.run_and_evaluate(streams, &GroundTruth::new([assay]));
//! assert_eq!(run.evaluation().recall.value(), Some(1.0));
//! ```
//!
//! ## Data Flow
//!
//! ```text
//! ┌────────────┐   ┌────────────┐   ┌────────────┐   ┌────────────┐   ┌────────────┐
//! │ candidates │──>│  cancel    │──>│  filter    │──>│  combine   │──>│ summarize  │
//! │ (matchers) │   │ (negatives)│   │ (coherence)│   │(provenance)│   │ (ancestor) │
//! └────────────┘   └────────────┘   └────────────┘   └────────────┘   └────────────┘
//!                                                                            │
//!                                                                     ┌────────────┐
//!                                                                     │  evaluate  │
//!                                                                     └────────────┘
//! ```

pub mod cancel;
pub mod coherence;
pub mod combine;
pub mod context;
pub mod evaluate;
pub mod pipeline;
pub mod summarize;

// Re-export main types for convenience
pub use cancel::{cancel, cancel_combined, Cancellation};
pub use coherence::{filter_attribute_level, filter_combined, filter_relation_level, FilterOutcome};
pub use combine::{combine, combine_sets, CombinedMatchings};
pub use context::{
    generate_streams, ApiContext, CoherenceOutput, KnowledgeRepr, MatcherSuite, MatchingApi,
    SchemaGraph, SemanticOutput,
};
pub use evaluate::{compute_pr, evaluate, EvaluationReport, GroundTruth, Metric, PrecisionRecall};
pub use pipeline::{
    Cancelled, CandidatesReady, Combined, Diagnostics, Evaluated, Filtered, Init, Pipeline,
    PipelineState, Run, Stage, Summarized,
};
pub use summarize::{AncestorSummarizer, ClassHierarchy, Passthrough, StaticHierarchy, Summarizer};
