//! # SemProp Core
//!
//! Data model shared by the SemProp matching engine.
//!
//! - [`Matching`] - correspondence between a [`SchemaElement`] and an [`OntologyClass`]
//! - [`MatchingType`] - the matcher that produced a matching
//! - [`CandidateSet`], [`NegativeSet`], [`CoherenceGroups`] - raw matcher output
//! - [`CandidateStreams`] - all matcher outputs of one run, joined
//! - [`PipelineConfig`] - tunable thresholds and stage order
//!
//! ## Example
//!
//! ```rust
//! use semprop_core::{CandidateSet, CandidateStreams, Matching, MatchingType, OntologyClass, SchemaElement};
//!
//! let matching = Matching::new(
//!     SchemaElement::new("chembl", "assays", "description"),
//!     OntologyClass::new("efo", "Assay"),
//! );
//! let streams = CandidateStreams::new().with_candidates(CandidateSet::new(
//!     MatchingType::L5ClassNameAttrNameSyn,
//!     vec![matching],
//! ));
//! assert_eq!(streams.total_candidates(), 1);
//! ```

pub mod candidate;
pub mod config;
pub mod error;
pub mod matching;

pub use candidate::{CandidateSet, CandidateStreams, CoherenceGroups, NegativeSet};
pub use config::{CancellationPoint, PipelineConfig, SummarizationConfig, Thresholds};
pub use error::{Error, Result};
pub use matching::{Matching, MatchingType, OntologyClass, SchemaElement, TABLE_WILDCARD};
