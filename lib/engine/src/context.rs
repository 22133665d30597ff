//! Matching API context and candidate generation
//!
//! Candidate generation needs a profiled schema graph and at least one
//! registered ontology. The generators themselves are external; they are
//! plugged in through [`MatcherSuite`] and run concurrently, and
//! [`generate_streams`] joins on all of them before any cancellation starts.

use rayon::join;
use semprop_core::{
    CandidateSet, CandidateStreams, CoherenceGroups, Error, Matching, MatchingType, NegativeSet,
    Result, Thresholds,
};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// A profiled relational schema (databases, tables, attributes)
pub trait SchemaGraph: Send + Sync {
    fn name(&self) -> &str;
}

/// Knowledge representation handler of one ontology
pub trait KnowledgeRepr: Send + Sync {
    fn ontology_name(&self) -> &str;
}

/// Registry the matchers run against
#[derive(Default, Clone)]
pub struct ApiContext {
    schema_graph: Option<Arc<dyn SchemaGraph>>,
    kr_handlers: BTreeMap<String, Arc<dyn KnowledgeRepr>>,
}

impl fmt::Debug for ApiContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiContext")
            .field("schema_graph", &self.schema_graph.as_ref().map(|g| g.name()))
            .field("kr_handlers", &self.kr_handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ApiContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the schema graph. Replaces any previous one.
    pub fn init_api(&mut self, schema_graph: Arc<dyn SchemaGraph>) {
        info!(schema = schema_graph.name(), "initialized matching API");
        self.schema_graph = Some(schema_graph);
    }

    /// Register an ontology handler; the API must be initialized first
    pub fn add_ontology(&mut self, handler: Arc<dyn KnowledgeRepr>) -> Result<()> {
        if self.schema_graph.is_none() {
            let msg = "API not initialized; call init_api() before adding an ontology";
            warn!("{}", msg);
            return Err(Error::NotInitialized(msg.to_string()));
        }
        info!(ontology = handler.ontology_name(), "added ontology");
        self.kr_handlers
            .insert(handler.ontology_name().to_string(), handler);
        Ok(())
    }

    /// Borrow a fully configured API, or report what is missing
    pub fn api(&self) -> Result<MatchingApi<'_>> {
        let Some(schema_graph) = self.schema_graph.as_deref() else {
            let msg = "API not initialized; call init_api() and add_ontology() first";
            warn!("{}", msg);
            return Err(Error::NotInitialized(msg.to_string()));
        };
        if self.kr_handlers.is_empty() {
            let msg = "no ontology registered; call add_ontology() first";
            warn!("{}", msg);
            return Err(Error::NotInitialized(msg.to_string()));
        }
        Ok(MatchingApi {
            schema_graph,
            kr_handlers: &self.kr_handlers,
        })
    }
}

/// A configured matching API: schema graph plus registered ontologies
#[derive(Clone, Copy)]
pub struct MatchingApi<'a> {
    pub schema_graph: &'a dyn SchemaGraph,
    pub kr_handlers: &'a BTreeMap<String, Arc<dyn KnowledgeRepr>>,
}

/// Output of a semantic matcher
#[derive(Debug, Clone, Default)]
pub struct SemanticOutput {
    pub positives: Vec<Matching>,
    pub negatives: Vec<Matching>,
}

/// Output of the coherence matcher
#[derive(Debug, Clone, Default)]
pub struct CoherenceOutput {
    pub matchings: Vec<Matching>,
    pub groups: CoherenceGroups,
}

/// The external candidate generators, one method per matcher
pub trait MatcherSuite: Sync {
    /// L4
    fn relation_name_syntactic(
        &self,
        api: &MatchingApi<'_>,
        threshold: f64,
    ) -> Result<Vec<Matching>>;

    /// L5
    fn attribute_name_syntactic(
        &self,
        api: &MatchingApi<'_>,
        threshold: f64,
    ) -> Result<Vec<Matching>>;

    /// L42, with its negative signals
    fn relation_name_semantic(
        &self,
        api: &MatchingApi<'_>,
        threshold: f64,
        sensitivity: f64,
    ) -> Result<SemanticOutput>;

    /// L52, with its negative signals
    fn attribute_name_semantic(
        &self,
        api: &MatchingApi<'_>,
        threshold: f64,
        sensitivity: f64,
    ) -> Result<SemanticOutput>;

    /// L6 and the coherence groups backing it
    fn semantic_coherence(
        &self,
        api: &MatchingApi<'_>,
        threshold: f64,
        group_size_cutoff: usize,
    ) -> Result<CoherenceOutput>;

    /// L1
    fn content_values(&self, api: &MatchingApi<'_>, threshold: f64) -> Result<Vec<Matching>>;

    /// L7
    fn hierarchy_content_fuzzy(&self, api: &MatchingApi<'_>) -> Result<Vec<Matching>>;
}

/// Run every generator and join on all of them.
///
/// Generators run concurrently; the first error (in matcher order) is
/// returned once all have finished.
pub fn generate_streams(
    api: &MatchingApi<'_>,
    suite: &dyn MatcherSuite,
    thresholds: &Thresholds,
) -> Result<CandidateStreams> {
    let t = thresholds;
    let sensitivity = t.sensitivity_cancellation_signal;

    let ((l4, l5), ((l42, l52), (l6, (l1, l7)))) = join(
        || {
            join(
                || suite.relation_name_syntactic(api, t.sim_threshold_rel),
                || suite.attribute_name_syntactic(api, t.sim_threshold_attr),
            )
        },
        || {
            join(
                || {
                    join(
                        || suite.relation_name_semantic(api, t.sem_threshold_rel, sensitivity),
                        || suite.attribute_name_semantic(api, t.sem_threshold_attr, sensitivity),
                    )
                },
                || {
                    join(
                        || {
                            suite.semantic_coherence(
                                api,
                                t.coh_group_threshold,
                                t.coh_group_size_cutoff,
                            )
                        },
                        || {
                            join(
                                || suite.content_values(api, t.content_sim_threshold),
                                || suite.hierarchy_content_fuzzy(api),
                            )
                        },
                    )
                },
            )
        },
    );

    let (l4, l5, l42, l52, l6, l1, l7) = (l4?, l5?, l42?, l52?, l6?, l1?, l7?);

    let streams = CandidateStreams::new()
        .with_candidates(CandidateSet::new(MatchingType::L1ClassNameAttrValue, l1))
        .with_candidates(CandidateSet::new(MatchingType::L4ClassNameRelationNameSyn, l4))
        .with_candidates(CandidateSet::new(MatchingType::L5ClassNameAttrNameSyn, l5))
        .with_candidates(CandidateSet::new(
            MatchingType::L42ClassNameRelationNameSem,
            l42.positives,
        ))
        .with_candidates(CandidateSet::new(
            MatchingType::L52ClassNameAttrNameSem,
            l52.positives,
        ))
        .with_candidates(CandidateSet::new(
            MatchingType::L6ClassNameRelationSemCoherence,
            l6.matchings,
        ))
        .with_candidates(CandidateSet::new(MatchingType::L7ClassNameAttrNameFuzzy, l7))
        .with_negatives(NegativeSet::new(
            MatchingType::L42ClassNameRelationNameSem,
            l42.negatives,
        )?)
        .with_negatives(NegativeSet::new(
            MatchingType::L52ClassNameAttrNameSem,
            l52.negatives,
        )?)
        .with_coherence_groups(l6.groups);

    info!(
        total = streams.total_candidates(),
        coherence_groups = streams.coherence_groups().len(),
        "candidate streams ready"
    );
    Ok(streams)
}

#[cfg(test)]
mod tests {
    use super::*;
    use semprop_core::{OntologyClass, SchemaElement};

    struct Graph;
    impl SchemaGraph for Graph {
        fn name(&self) -> &str {
            "chembl22"
        }
    }

    struct Efo;
    impl KnowledgeRepr for Efo {
        fn ontology_name(&self) -> &str {
            "efo"
        }
    }

    fn m(table: &str, attr: &str, class: &str) -> Matching {
        Matching::new(
            SchemaElement::new("chembl", table, attr),
            OntologyClass::new("efo", class),
        )
    }

    struct FixedSuite {
        fail_fuzzy: bool,
    }

    impl MatcherSuite for FixedSuite {
        fn relation_name_syntactic(&self, _: &MatchingApi<'_>, _: f64) -> Result<Vec<Matching>> {
            Ok(vec![m("assays", "_", "Assay")])
        }
        fn attribute_name_syntactic(&self, _: &MatchingApi<'_>, _: f64) -> Result<Vec<Matching>> {
            Ok(vec![m("assays", "description", "Assay")])
        }
        fn relation_name_semantic(
            &self,
            _: &MatchingApi<'_>,
            _: f64,
            _: f64,
        ) -> Result<SemanticOutput> {
            Ok(SemanticOutput {
                positives: vec![m("assays", "_", "Assay")],
                negatives: vec![m("docs", "_", "Assay")],
            })
        }
        fn attribute_name_semantic(
            &self,
            _: &MatchingApi<'_>,
            _: f64,
            _: f64,
        ) -> Result<SemanticOutput> {
            Ok(SemanticOutput::default())
        }
        fn semantic_coherence(
            &self,
            _: &MatchingApi<'_>,
            _: f64,
            _: usize,
        ) -> Result<CoherenceOutput> {
            let matchings = vec![m("assays", "_", "Assay")];
            let groups = CoherenceGroups::from_matchings(&matchings);
            Ok(CoherenceOutput { matchings, groups })
        }
        fn content_values(&self, _: &MatchingApi<'_>, _: f64) -> Result<Vec<Matching>> {
            Ok(vec![])
        }
        fn hierarchy_content_fuzzy(&self, _: &MatchingApi<'_>) -> Result<Vec<Matching>> {
            if !self.fail_fuzzy {
                return Ok(vec![m("assays", "assay_type", "Assay")]);
            }
            Err(Error::Generator {
                matcher: "l7".to_string(),
                reason: "content store unavailable".to_string(),
            })
        }
    }

    #[test]
    fn test_api_requires_schema_graph() {
        let ctx = ApiContext::new();
        assert!(matches!(ctx.api(), Err(Error::NotInitialized(_))));
    }

    #[test]
    fn test_ontology_before_init_is_rejected() {
        let mut ctx = ApiContext::new();
        assert!(matches!(
            ctx.add_ontology(Arc::new(Efo)),
            Err(Error::NotInitialized(_))
        ));

        ctx.init_api(Arc::new(Graph));
        assert!(matches!(ctx.api(), Err(Error::NotInitialized(_))));

        ctx.add_ontology(Arc::new(Efo)).unwrap();
        let api = ctx.api().unwrap();
        assert_eq!(api.schema_graph.name(), "chembl22");
        assert!(api.kr_handlers.contains_key("efo"));
    }

    #[test]
    fn test_generator_failure_is_propagated() {
        let mut ctx = ApiContext::new();
        ctx.init_api(Arc::new(Graph));
        ctx.add_ontology(Arc::new(Efo)).unwrap();

        let suite = FixedSuite { fail_fuzzy: true };
        let result = generate_streams(&ctx.api().unwrap(), &suite, &Thresholds::default());
        assert!(matches!(result, Err(Error::Generator { .. })));
    }

    #[test]
    fn test_generate_joins_all_streams() {
        let mut ctx = ApiContext::new();
        ctx.init_api(Arc::new(Graph));
        ctx.add_ontology(Arc::new(Efo)).unwrap();

        let suite = FixedSuite { fail_fuzzy: false };
        let streams =
            generate_streams(&ctx.api().unwrap(), &suite, &Thresholds::default()).unwrap();

        assert_eq!(streams.total_candidates(), 5);
        assert_eq!(streams.stream(MatchingType::L7ClassNameAttrNameFuzzy).len(), 1);
        assert_eq!(
            streams
                .negatives(MatchingType::L42ClassNameRelationNameSem)
                .map(NegativeSet::len),
            Some(1)
        );
        assert!(streams.coherence_groups().contains(&m("assays", "_", "Assay")));
    }
}
