//! Candidate streams
//!
//! Every matcher emits a [`CandidateSet`]; the semantic matchers additionally
//! emit a [`NegativeSet`], and the coherence matcher yields [`CoherenceGroups`].
//! [`CandidateStreams`] is the joined result of all of them, and is the input
//! of every pipeline run.

use crate::error::{Error, Result};
use crate::matching::{Matching, MatchingType};
use ahash::AHashSet;
use std::collections::BTreeMap;

/// Matchings produced by one matcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSet {
    matching_type: MatchingType,
    matchings: Vec<Matching>,
}

impl CandidateSet {
    pub fn new(matching_type: MatchingType, matchings: Vec<Matching>) -> Self {
        Self {
            matching_type,
            matchings,
        }
    }

    pub fn empty(matching_type: MatchingType) -> Self {
        Self::new(matching_type, Vec::new())
    }

    #[inline]
    pub fn matching_type(&self) -> MatchingType {
        self.matching_type
    }

    #[inline]
    pub fn matchings(&self) -> &[Matching] {
        &self.matchings
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.matchings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.matchings.is_empty()
    }

    pub fn into_matchings(self) -> Vec<Matching> {
        self.matchings
    }

    /// Same type, new contents
    #[must_use]
    pub fn replaced(&self, matchings: Vec<Matching>) -> Self {
        Self::new(self.matching_type, matchings)
    }
}

/// Matchings a semantic matcher actively disbelieves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegativeSet {
    source: MatchingType,
    matchings: Vec<Matching>,
}

impl NegativeSet {
    pub fn new(source: MatchingType, matchings: Vec<Matching>) -> Result<Self> {
        if !source.emits_negatives() {
            return Err(Error::InvalidConfig(format!(
                "matcher {} does not emit negative signals",
                source
            )));
        }
        Ok(Self { source, matchings })
    }

    pub(crate) fn empty_unchecked(source: MatchingType) -> Self {
        Self {
            source,
            matchings: Vec::new(),
        }
    }

    #[inline]
    pub fn source(&self) -> MatchingType {
        self.source
    }

    #[inline]
    pub fn matchings(&self) -> &[Matching] {
        &self.matchings
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

/// Table-level coherence judgments, keyed `((db, table, _), class)`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoherenceGroups {
    keys: AHashSet<Matching>,
}

impl CoherenceGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the key set from coherence matcher output.
    ///
    /// Attribute-level entries are projected to their table key.
    pub fn from_matchings<'a, I>(matchings: I) -> Self
    where
        I: IntoIterator<Item = &'a Matching>,
    {
        Self {
            keys: matchings.into_iter().map(Matching::group_key).collect(),
        }
    }

    #[inline]
    pub fn contains(&self, key: &Matching) -> bool {
        self.keys.contains(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys in structural order
    pub fn sorted_keys(&self) -> Vec<&Matching> {
        let mut keys: Vec<_> = self.keys.iter().collect();
        keys.sort();
        keys
    }
}

/// All candidate streams of one run, joined
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateStreams {
    positives: BTreeMap<MatchingType, CandidateSet>,
    relation_negatives: NegativeSet,
    attribute_negatives: NegativeSet,
    coherence_groups: CoherenceGroups,
}

impl Default for CandidateStreams {
    fn default() -> Self {
        Self {
            positives: MatchingType::ALL
                .into_iter()
                .map(|t| (t, CandidateSet::empty(t)))
                .collect(),
            relation_negatives: NegativeSet::empty_unchecked(
                MatchingType::L42ClassNameRelationNameSem,
            ),
            attribute_negatives: NegativeSet::empty_unchecked(
                MatchingType::L52ClassNameAttrNameSem,
            ),
            coherence_groups: CoherenceGroups::default(),
        }
    }
}

impl CandidateStreams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stream of `set`'s matching type
    #[must_use]
    pub fn with_candidates(mut self, set: CandidateSet) -> Self {
        self.positives.insert(set.matching_type(), set);
        self
    }

    /// Replace the negative set of `negatives`' source matcher
    #[must_use]
    pub fn with_negatives(mut self, negatives: NegativeSet) -> Self {
        match negatives.source() {
            MatchingType::L42ClassNameRelationNameSem => self.relation_negatives = negatives,
            _ => self.attribute_negatives = negatives,
        }
        self
    }

    #[must_use]
    pub fn with_coherence_groups(mut self, groups: CoherenceGroups) -> Self {
        self.coherence_groups = groups;
        self
    }

    pub fn stream(&self, matching_type: MatchingType) -> &CandidateSet {
        // every type is populated on construction
        &self.positives[&matching_type]
    }

    /// Negative set emitted alongside a semantic stream
    pub fn negatives(&self, source: MatchingType) -> Option<&NegativeSet> {
        match source {
            MatchingType::L42ClassNameRelationNameSem => Some(&self.relation_negatives),
            MatchingType::L52ClassNameAttrNameSem => Some(&self.attribute_negatives),
            _ => None,
        }
    }

    pub fn coherence_groups(&self) -> &CoherenceGroups {
        &self.coherence_groups
    }

    pub fn streams(&self) -> impl Iterator<Item = &CandidateSet> {
        self.positives.values()
    }

    /// Size of every positive stream
    pub fn counts(&self) -> BTreeMap<MatchingType, usize> {
        self.positives.iter().map(|(t, s)| (*t, s.len())).collect()
    }

    pub fn total_candidates(&self) -> usize {
        self.positives.values().map(CandidateSet::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::{OntologyClass, SchemaElement};

    fn m(t: &str, a: &str, c: &str) -> Matching {
        Matching::new(SchemaElement::new("db", t, a), OntologyClass::new("efo", c))
    }

    #[test]
    fn test_default_streams_are_empty() {
        let streams = CandidateStreams::new();
        assert_eq!(streams.total_candidates(), 0);
        assert_eq!(streams.counts().len(), MatchingType::ALL.len());
        assert!(streams.coherence_groups().is_empty());
    }

    #[test]
    fn test_with_candidates_routes_by_type() {
        let set = CandidateSet::new(
            MatchingType::L4ClassNameRelationNameSyn,
            vec![m("t", "_", "C")],
        );
        let streams = CandidateStreams::new().with_candidates(set);

        assert_eq!(streams.stream(MatchingType::L4ClassNameRelationNameSyn).len(), 1);
        assert!(streams.stream(MatchingType::L5ClassNameAttrNameSyn).is_empty());
    }

    #[test]
    fn test_negatives_only_for_semantic_matchers() {
        assert!(NegativeSet::new(MatchingType::L4ClassNameRelationNameSyn, vec![]).is_err());

        let neg =
            NegativeSet::new(MatchingType::L52ClassNameAttrNameSem, vec![m("t", "a", "C")])
                .unwrap();
        let streams = CandidateStreams::new().with_negatives(neg);
        assert_eq!(
            streams.negatives(MatchingType::L52ClassNameAttrNameSem).map(NegativeSet::len),
            Some(1)
        );
        assert!(streams.negatives(MatchingType::L1ClassNameAttrValue).is_none());
    }

    #[test]
    fn test_coherence_groups_project_to_table_keys() {
        let l6 = vec![m("t", "_", "C"), m("u", "x", "D")];
        let groups = CoherenceGroups::from_matchings(&l6);

        assert!(groups.contains(&m("t", "_", "C")));
        assert!(groups.contains(&m("u", "_", "D")));
        assert!(!groups.contains(&m("u", "x", "D")));
        assert_eq!(groups.sorted_keys().len(), 2);
    }
}
