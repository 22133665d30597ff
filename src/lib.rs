//! # SemProp
//!
//! Schema-to-ontology matching: turns the output of several independent
//! matchers into one de-duplicated, provenance-tracked set of matchings.
//!
//! Independent matchers (syntactic and semantic name matchers, a semantic
//! coherence matcher, content matchers) each emit candidate matchings between
//! relational schema elements and ontology classes. SemProp cancels syntactic
//! candidates contradicted by semantic negative signals, keeps semantic
//! candidates only when a coherence group backs them, merges the streams with
//! per-matching provenance, summarizes sibling matchings to a common ancestor
//! and evaluates the result against ground truth.
//!
//! ## Quick Start
//!
//! ### As a CLI
//!
//! ```bash
//! cargo install semprop
//! semprop --raw-dir ./results/raw --ground-truth ./gold/chembl.txt --report ./run.json
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use semprop::prelude::*;
//! use std::sync::Arc;
//!
//! let store = RawResultStore::new("./results/raw").unwrap();
//! let streams = store.load_streams().unwrap();
//! let ground_truth = load_ground_truth("./gold/chembl.txt").unwrap();
//!
//! let pipeline = Pipeline::new(PipelineConfig::default(), Arc::new(Passthrough)).unwrap();
//! let run = pipeline.run_and_evaluate(streams, &ground_truth);
//! println!("{}", RunReport::from_run(&run).summary());
//! ```
//!
//! ## Crate Structure
//!
//! - `semprop-core` - Data model (Matching, MatchingType, candidate streams, config)
//! - `semprop-engine` - Cancellation, coherence filtering, combination, summarization, evaluation
//! - `semprop-storage` - Raw result persistence, ground truth, hierarchies, run reports

// Re-export core types
pub use semprop_core::{
    CancellationPoint, CandidateSet, CandidateStreams, CoherenceGroups, Error, Matching,
    MatchingType, NegativeSet, OntologyClass, PipelineConfig, Result, SchemaElement,
    SummarizationConfig, Thresholds,
};

// Re-export engine
pub use semprop_engine::{
    AncestorSummarizer, ApiContext, CombinedMatchings, Diagnostics, EvaluationReport,
    GroundTruth, MatcherSuite, Metric, Passthrough, Pipeline, PipelineState, Run,
    StaticHierarchy, Summarizer,
};

// Re-export storage
pub use semprop_storage::{
    load_config, load_ground_truth, load_hierarchy, RawResultStore, RunReport,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        load_config, load_ground_truth, load_hierarchy, AncestorSummarizer, CandidateStreams,
        Error, GroundTruth, Matching, MatchingType, OntologyClass, Passthrough, Pipeline,
        PipelineConfig, RawResultStore, Result, RunReport, SchemaElement, StaticHierarchy,
        Summarizer,
    };
}
