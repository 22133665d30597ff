//! Ancestor summarization
//!
//! Many fine-grained matchings from one table into sibling classes are better
//! expressed as one table-level matching to their common ancestor. The engine
//! only depends on the [`Summarizer`] contract; how the ontology is walked is
//! up to the implementation.
//!
//! ```text
//!   db.t.a1 ==>> Child1 ┐
//!   db.t.a2 ==>> Child2 ├──> db.t._ ==>> Parent     (3/3 > ratio, 3 > min_count)
//!   db.t.a3 ==>> Child3 ┘
//! ```

use ahash::AHashMap;
use semprop_core::{Matching, OntologyClass, SchemaElement};
use std::collections::{BTreeMap, BTreeSet};

/// Pluggable summarization stage
pub trait Summarizer: Send + Sync {
    /// Replace well-supported clusters with coarser matchings.
    ///
    /// A cluster is summarized only when its size exceeds `min_count` and its
    /// share of the table's candidates exceeds `ratio`; everything else is
    /// returned unchanged. Must be deterministic for a given input order.
    fn summarize(&self, matchings: Vec<Matching>, min_count: usize, ratio: f64) -> Vec<Matching>;
}

/// Identity summarizer
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Summarizer for Passthrough {
    fn summarize(&self, matchings: Vec<Matching>, _min_count: usize, _ratio: f64) -> Vec<Matching> {
        matchings
    }
}

/// Parent lookup in an ontology class hierarchy
pub trait ClassHierarchy: Send + Sync {
    fn parent(&self, class: &OntologyClass) -> Option<OntologyClass>;
}

/// In-memory child -> parent map
#[derive(Debug, Clone, Default)]
pub struct StaticHierarchy {
    parents: AHashMap<OntologyClass, OntologyClass>,
}

impl StaticHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `parent` as the direct ancestor of `child`.
    /// A later insert for the same child replaces the earlier one.
    pub fn insert(&mut self, child: OntologyClass, parent: OntologyClass) {
        self.parents.insert(child, parent);
    }

    #[must_use]
    pub fn with_parent(mut self, child: OntologyClass, parent: OntologyClass) -> Self {
        self.insert(child, parent);
        self
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}

impl ClassHierarchy for StaticHierarchy {
    fn parent(&self, class: &OntologyClass) -> Option<OntologyClass> {
        self.parents.get(class).cloned()
    }
}

/// Rolls sibling matchings of one table up to their shared parent class.
///
/// The output never repeats a matching.
#[derive(Debug, Clone)]
pub struct AncestorSummarizer<H> {
    hierarchy: H,
}

impl<H: ClassHierarchy> AncestorSummarizer<H> {
    pub fn new(hierarchy: H) -> Self {
        Self { hierarchy }
    }

    pub fn hierarchy(&self) -> &H {
        &self.hierarchy
    }
}

impl<H: ClassHierarchy> Summarizer for AncestorSummarizer<H> {
    fn summarize(&self, matchings: Vec<Matching>, min_count: usize, ratio: f64) -> Vec<Matching> {
        let mut table_totals: AHashMap<SchemaElement, usize> = AHashMap::new();
        let mut clusters: BTreeMap<(SchemaElement, OntologyClass), Vec<usize>> = BTreeMap::new();

        for (i, matching) in matchings.iter().enumerate() {
            let table = matching.element.table_key();
            *table_totals.entry(table.clone()).or_insert(0) += 1;
            if let Some(parent) = self.hierarchy.parent(&matching.class) {
                clusters.entry((table, parent)).or_default().push(i);
            }
        }

        // first member index -> summary matching
        let mut summaries: BTreeMap<usize, Matching> = BTreeMap::new();
        let mut replaced: BTreeSet<usize> = BTreeSet::new();

        for ((table, parent), members) in clusters {
            let total = table_totals.get(&table).copied().unwrap_or(0);
            if total == 0 || members.len() <= min_count {
                continue;
            }
            if (members.len() as f64) / (total as f64) <= ratio {
                continue;
            }
            summaries.insert(members[0], Matching::new(table, parent));
            replaced.extend(members);
        }

        // first occurrence wins, with or without roll-ups
        let mut emitted: BTreeSet<Matching> = BTreeSet::new();
        let mut out = Vec::with_capacity(matchings.len());
        for (i, matching) in matchings.into_iter().enumerate() {
            if let Some(summary) = summaries.remove(&i) {
                if emitted.insert(summary.clone()) {
                    out.push(summary);
                }
            } else if !replaced.contains(&i) && emitted.insert(matching.clone()) {
                out.push(matching);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(name: &str) -> OntologyClass {
        OntologyClass::new("efo", name)
    }

    fn m(table: &str, attr: &str, c: &str) -> Matching {
        Matching::new(SchemaElement::new("db", table, attr), class(c))
    }

    fn hierarchy() -> StaticHierarchy {
        StaticHierarchy::new()
            .with_parent(class("Child1"), class("Parent"))
            .with_parent(class("Child2"), class("Parent"))
            .with_parent(class("Child3"), class("Parent"))
            .with_parent(class("Other"), class("Elsewhere"))
    }

    #[test]
    fn test_passthrough_is_identity() {
        let input = vec![m("t", "a", "Child1"), m("t", "b", "Child2")];
        assert_eq!(Passthrough.summarize(input.clone(), 0, 0.0), input);
    }

    #[test]
    fn test_dominant_cluster_rolls_up() {
        let summarizer = AncestorSummarizer::new(hierarchy());
        let input = vec![
            m("t", "a1", "Child1"),
            m("t", "a2", "Child2"),
            m("t", "a3", "Child3"),
            m("u", "b1", "Child1"),
        ];

        let out = summarizer.summarize(input, 1, 0.8);
        assert_eq!(
            out,
            vec![
                Matching::new(SchemaElement::table("db", "t"), class("Parent")),
                m("u", "b1", "Child1"),
            ]
        );
    }

    #[test]
    fn test_cluster_below_ratio_is_kept() {
        let summarizer = AncestorSummarizer::new(hierarchy());
        let input = vec![
            m("t", "a1", "Child1"),
            m("t", "a2", "Child2"),
            m("t", "a3", "Other"),
        ];

        // 2 of 3 is below the 0.8 ratio
        let out = summarizer.summarize(input.clone(), 1, 0.8);
        assert_eq!(out, input);
    }

    #[test]
    fn test_cluster_not_exceeding_min_count_is_kept() {
        let summarizer = AncestorSummarizer::new(hierarchy());
        let input = vec![m("t", "a1", "Child1"), m("t", "a2", "Child2")];

        assert_eq!(summarizer.summarize(input.clone(), 2, 0.5), input);
        assert_eq!(summarizer.summarize(input, 1, 0.5).len(), 1);
    }

    #[test]
    fn test_duplicates_dropped_whether_or_not_anything_rolls_up() {
        let summarizer = AncestorSummarizer::new(hierarchy());
        let unrelated = vec![m("t", "a1", "Lone"), m("u", "b1", "Solo"), m("t", "a1", "Lone")];
        assert_eq!(
            summarizer.summarize(unrelated, 1, 0.5),
            vec![m("t", "a1", "Lone"), m("u", "b1", "Solo")]
        );

        let rolling = vec![
            m("t", "a1", "Child1"),
            m("t", "a2", "Child2"),
            m("u", "b1", "Solo"),
            m("u", "b1", "Solo"),
        ];
        assert_eq!(
            summarizer.summarize(rolling, 1, 0.5),
            vec![
                Matching::new(SchemaElement::table("db", "t"), class("Parent")),
                m("u", "b1", "Solo"),
            ]
        );
    }

    #[test]
    fn test_summarize_is_deterministic() {
        let summarizer = AncestorSummarizer::new(hierarchy());
        let input = vec![
            m("t", "a1", "Child1"),
            m("t", "a2", "Child2"),
            m("v", "c1", "Other"),
        ];

        let first = summarizer.summarize(input.clone(), 1, 0.5);
        let second = summarizer.summarize(input, 1, 0.5);
        assert_eq!(first, second);
    }
}
