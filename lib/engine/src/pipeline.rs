//! Pipeline orchestration
//!
//! A run moves through a fixed sequence of stages:
//!
//! ```text
//! Init ─> CandidatesReady ─> Cancelled ─> Filtered ─> Combined ─> Summarized ─> Evaluated
//! ```
//!
//! Each stage is a [`Run`] typestate. A transition consumes the previous
//! record and returns a new one, so a stage can only be reached in order and
//! nothing downstream can alias a collection an earlier stage still owns.
//! Every transition is a pure function of its input record and the
//! [`PipelineConfig`]; cloning a record and replaying the remaining stages
//! gives identical results.
//!
//! With [`CancellationPoint::AfterCombination`] the cancel and filter stages
//! leave the streams untouched and their rules are applied to the combined
//! provenance map instead.

use crate::cancel::{cancel, cancel_combined};
use crate::coherence::{filter_attribute_level, filter_combined, filter_relation_level};
use crate::combine::{combine_sets, CombinedMatchings};
use crate::context::{generate_streams, ApiContext, MatcherSuite};
use crate::evaluate::{evaluate, EvaluationReport, GroundTruth};
use crate::summarize::Summarizer;
use semprop_core::{
    CancellationPoint, CandidateSet, CandidateStreams, Matching, MatchingType, PipelineConfig,
    Result,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Positive stream cancelled by the negative set of a semantic matcher
const NEGATIVE_PAIRS: [(MatchingType, MatchingType); 2] = [
    (
        MatchingType::L4ClassNameRelationNameSyn,
        MatchingType::L42ClassNameRelationNameSem,
    ),
    (
        MatchingType::L5ClassNameAttrNameSyn,
        MatchingType::L52ClassNameAttrNameSem,
    ),
];

const SEMANTIC_STREAMS: [MatchingType; 2] = [
    MatchingType::L42ClassNameRelationNameSem,
    MatchingType::L52ClassNameAttrNameSem,
];

/// Stage a run has reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Init,
    CandidatesReady,
    Cancelled,
    Filtered,
    Combined,
    Summarized,
    Evaluated,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Init => "init",
            PipelineState::CandidatesReady => "candidates_ready",
            PipelineState::Cancelled => "cancelled",
            PipelineState::Filtered => "filtered",
            PipelineState::Combined => "combined",
            PipelineState::Summarized => "summarized",
            PipelineState::Evaluated => "evaluated",
        };
        f.write_str(name)
    }
}

/// Marker for stage records
pub trait Stage {
    const STATE: PipelineState;
}

/// Counters collected along a run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    /// Candidate count per matcher as generated
    pub candidates: BTreeMap<MatchingType, usize>,
    /// Matchings cancelled by negative signals, per cancelled stream
    pub negative_cancelled: BTreeMap<MatchingType, usize>,
    /// Matchings discarded for lack of coherence, per filtered stream
    pub coherence_discarded: BTreeMap<MatchingType, usize>,
    /// Stream size after pre-combination summarization
    pub semantic_summarized: BTreeMap<MatchingType, usize>,
    /// Unique matchings after combination
    pub combined: usize,
    /// Matchings after final summarization
    pub summarized: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Init;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatesReady {
    pub streams: CandidateStreams,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cancelled {
    pub streams: CandidateStreams,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filtered {
    pub streams: CandidateStreams,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combined {
    pub combined: CombinedMatchings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summarized {
    pub combined: CombinedMatchings,
    pub matchings: Vec<Matching>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluated {
    pub combined: CombinedMatchings,
    pub matchings: Vec<Matching>,
    pub evaluation: EvaluationReport,
}

impl Stage for Init {
    const STATE: PipelineState = PipelineState::Init;
}
impl Stage for CandidatesReady {
    const STATE: PipelineState = PipelineState::CandidatesReady;
}
impl Stage for Cancelled {
    const STATE: PipelineState = PipelineState::Cancelled;
}
impl Stage for Filtered {
    const STATE: PipelineState = PipelineState::Filtered;
}
impl Stage for Combined {
    const STATE: PipelineState = PipelineState::Combined;
}
impl Stage for Summarized {
    const STATE: PipelineState = PipelineState::Summarized;
}
impl Stage for Evaluated {
    const STATE: PipelineState = PipelineState::Evaluated;
}

/// A validated configuration plus the summarization stage to run with
#[derive(Clone)]
pub struct Pipeline {
    config: Arc<PipelineConfig>,
    summarizer: Arc<dyn Summarizer>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Validate `config` and build a pipeline
    pub fn new(mut config: PipelineConfig, summarizer: Arc<dyn Summarizer>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            summarizer,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// A fresh run in the `Init` state
    pub fn start(&self) -> Run<Init> {
        Run {
            pipeline: self.clone(),
            diagnostics: Diagnostics::default(),
            stage: Init,
        }
    }

    /// Run every stage up to summarization on already generated streams
    pub fn run(&self, streams: CandidateStreams) -> Run<Summarized> {
        self.start()
            .with_streams(streams)
            .cancel()
            .filter()
            .combine()
            .summarize()
    }

    /// Run every stage, including evaluation
    pub fn run_and_evaluate(
        &self,
        streams: CandidateStreams,
        ground_truth: &GroundTruth,
    ) -> Run<Evaluated> {
        self.run(streams).evaluate(ground_truth)
    }
}

/// One pipeline run at stage `S`
#[derive(Debug, Clone)]
pub struct Run<S> {
    pipeline: Pipeline,
    diagnostics: Diagnostics,
    stage: S,
}

impl<S: Stage> Run<S> {
    pub fn state(&self) -> PipelineState {
        S::STATE
    }

    pub fn stage(&self) -> &S {
        &self.stage
    }

    pub fn into_stage(self) -> S {
        self.stage
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.pipeline.config
    }
}

fn advance<S: Stage, T: Stage>(pipeline: Pipeline, diagnostics: Diagnostics, stage: T) -> Run<T> {
    let (from, to) = (S::STATE, T::STATE);
    debug!(%from, %to, "stage transition");
    Run {
        pipeline,
        diagnostics,
        stage,
    }
}

impl Run<Init> {
    /// Generate candidate streams with the external matchers.
    ///
    /// Fails with `NotInitialized` when the API context lacks a schema graph
    /// or an ontology; the run can be retried once the context is complete.
    pub fn generate(
        self,
        ctx: &ApiContext,
        suite: &dyn MatcherSuite,
    ) -> Result<Run<CandidatesReady>> {
        let api = ctx.api()?;
        let streams = generate_streams(&api, suite, &self.pipeline.config.thresholds)?;
        Ok(self.with_streams(streams))
    }

    /// Start from streams produced elsewhere, e.g. reloaded from disk
    pub fn with_streams(self, streams: CandidateStreams) -> Run<CandidatesReady> {
        let Run {
            pipeline,
            mut diagnostics,
            ..
        } = self;
        diagnostics.candidates = streams.counts();

        info!(
            total = streams.total_candidates(),
            coherence_groups = streams.coherence_groups().len(),
            "candidates ready"
        );
        advance::<Init, _>(pipeline, diagnostics, CandidatesReady { streams })
    }
}

impl Run<CandidatesReady> {
    /// Cancel syntactic candidates contradicted by semantic negative signals
    pub fn cancel(self) -> Run<Cancelled> {
        let Run {
            pipeline,
            mut diagnostics,
            stage: CandidatesReady { mut streams },
        } = self;

        match pipeline.config.cancellation_point {
            CancellationPoint::BeforeCombination => {
                for (target, source) in NEGATIVE_PAIRS {
                    let negatives = streams
                        .negatives(source)
                        .map(|n| n.matchings())
                        .unwrap_or_default();
                    let outcome = cancel(streams.stream(target).matchings(), negatives);
                    let replaced = streams.stream(target).replaced(outcome.surviving);

                    info!(
                        stream = %target,
                        negatives_from = %source,
                        cancelled = outcome.cancelled,
                        "removed negative pairs"
                    );
                    diagnostics.negative_cancelled.insert(target, outcome.cancelled);
                    streams = streams.with_candidates(replaced);
                }
            }
            CancellationPoint::AfterCombination => {
                debug!("negative cancellation deferred until after combination");
            }
        }

        advance::<CandidatesReady, _>(pipeline, diagnostics, Cancelled { streams })
    }
}

impl Run<Cancelled> {
    /// Keep only semantic candidates corroborated by a coherence group
    pub fn filter(self) -> Run<Filtered> {
        let Run {
            pipeline,
            mut diagnostics,
            stage: Cancelled { mut streams },
        } = self;

        match pipeline.config.cancellation_point {
            CancellationPoint::BeforeCombination => {
                let groups = streams.coherence_groups();
                let relations = streams.stream(MatchingType::L42ClassNameRelationNameSem);
                let attributes = streams.stream(MatchingType::L52ClassNameAttrNameSem);

                let rel_outcome = filter_relation_level(relations.matchings(), groups);
                let attr_outcome = filter_attribute_level(attributes.matchings(), groups);
                let relations = relations.replaced(rel_outcome.retained);
                let attributes = attributes.replaced(attr_outcome.retained);

                info!(
                    relation_discarded = rel_outcome.discarded,
                    attribute_discarded = attr_outcome.discarded,
                    attribute_groups_discarded = attr_outcome.discarded_groups,
                    "coherence group cancellation"
                );
                diagnostics
                    .coherence_discarded
                    .insert(relations.matching_type(), rel_outcome.discarded);
                diagnostics
                    .coherence_discarded
                    .insert(attributes.matching_type(), attr_outcome.discarded);
                streams = streams.with_candidates(relations).with_candidates(attributes);
            }
            CancellationPoint::AfterCombination => {
                debug!("coherence filtering deferred until after combination");
            }
        }

        advance::<Cancelled, _>(pipeline, diagnostics, Filtered { streams })
    }
}

impl Run<Filtered> {
    /// Summarize the semantic streams, then merge the configured streams
    pub fn combine(self) -> Run<Combined> {
        let Run {
            pipeline,
            mut diagnostics,
            stage: Filtered { mut streams },
        } = self;
        let config = &pipeline.config;
        let summarization = &config.summarization;

        if summarization.summarize_semantic_streams {
            for t in SEMANTIC_STREAMS {
                let before = streams.stream(t).clone().into_matchings();
                let before_len = before.len();
                let after = pipeline.summarizer.summarize(
                    before,
                    summarization.min_count,
                    summarization.summary_ratio,
                );
                debug!(stream = %t, before = before_len, after = after.len(), "summarized stream");
                diagnostics.semantic_summarized.insert(t, after.len());
                streams = streams.with_candidates(CandidateSet::new(t, after));
            }
        }

        let mut combined = combine_sets(config.combine_types.iter().map(|t| streams.stream(*t)));

        if config.cancellation_point == CancellationPoint::AfterCombination {
            for (target, source) in NEGATIVE_PAIRS {
                let negatives = streams
                    .negatives(source)
                    .map(|n| n.matchings())
                    .unwrap_or_default();
                let (next, stripped) = cancel_combined(&combined, negatives, target);
                info!(
                    stream = %target,
                    negatives_from = %source,
                    cancelled = stripped,
                    "removed negative pairs from combination"
                );
                diagnostics.negative_cancelled.insert(target, stripped);
                combined = next;
            }
            for t in SEMANTIC_STREAMS {
                let (next, stripped) = filter_combined(&combined, t, streams.coherence_groups());
                info!(
                    stream = %t,
                    discarded = stripped,
                    "coherence group cancellation on combination"
                );
                diagnostics.coherence_discarded.insert(t, stripped);
                combined = next;
            }
        }

        diagnostics.combined = combined.len();
        info!(
            unique = combined.len(),
            streams = config.combine_types.len(),
            "combined matchings"
        );
        advance::<Filtered, _>(pipeline, diagnostics, Combined { combined })
    }
}

impl Run<Combined> {
    /// Flatten the combination and apply the final summarization
    pub fn summarize(self) -> Run<Summarized> {
        let Run {
            pipeline,
            mut diagnostics,
            stage: Combined { combined },
        } = self;
        let summarization = &pipeline.config.summarization;
        let flat = combined.flatten();

        let matchings = if summarization.summarize_combined {
            pipeline.summarizer.summarize(
                flat,
                summarization.min_count,
                summarization.summary_ratio,
            )
        } else {
            flat
        };

        diagnostics.summarized = matchings.len();
        info!(matchings = matchings.len(), "final matchings ready");
        advance::<Combined, _>(
            pipeline,
            diagnostics,
            Summarized {
                combined,
                matchings,
            },
        )
    }
}

impl Run<Summarized> {
    pub fn matchings(&self) -> &[Matching] {
        &self.stage.matchings
    }

    /// Score the final matchings against ground truth
    pub fn evaluate(self, ground_truth: &GroundTruth) -> Run<Evaluated> {
        let Run {
            pipeline,
            diagnostics,
            stage: Summarized {
                combined,
                matchings,
            },
        } = self;
        let evaluation = evaluate(ground_truth, &matchings);

        if evaluation.is_degenerate() {
            warn!(
                predicted = evaluation.predicted,
                ground_truth = evaluation.ground_truth,
                "precision/recall undefined for this run"
            );
        }
        info!(
            precision = %evaluation.precision,
            recall = %evaluation.recall,
            f1 = %evaluation.f1,
            "evaluation complete"
        );

        advance::<Summarized, _>(
            pipeline,
            diagnostics,
            Evaluated {
                combined,
                matchings,
                evaluation,
            },
        )
    }
}

impl Run<Evaluated> {
    pub fn evaluation(&self) -> &EvaluationReport {
        &self.stage.evaluation
    }

    pub fn matchings(&self) -> &[Matching] {
        &self.stage.matchings
    }
}
