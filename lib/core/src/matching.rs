//! Matching data model
//!
//! A [`Matching`] is a candidate correspondence between one schema element
//! (database, table, attribute) and one ontology class. Identity is purely
//! structural: two matchings with the same pair are the same matching no
//! matter which matcher produced them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Attribute sentinel meaning "the table as a whole".
pub const TABLE_WILDCARD: &str = "_";

/// A schema element: `(database, table, attribute)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaElement {
    pub database: String,
    pub table: String,
    pub attribute: String,
}

impl SchemaElement {
    #[inline]
    #[must_use]
    pub fn new(
        database: impl Into<String>,
        table: impl Into<String>,
        attribute: impl Into<String>,
    ) -> Self {
        Self {
            database: database.into(),
            table: table.into(),
            attribute: attribute.into(),
        }
    }

    /// Element denoting a whole table (attribute is the wildcard).
    #[inline]
    #[must_use]
    pub fn table(database: impl Into<String>, table: impl Into<String>) -> Self {
        Self::new(database, table, TABLE_WILDCARD)
    }

    #[inline]
    pub fn is_table_level(&self) -> bool {
        self.attribute == TABLE_WILDCARD
    }

    /// Project onto the table-level element of the same table.
    #[must_use]
    pub fn table_key(&self) -> Self {
        Self::table(self.database.clone(), self.table.clone())
    }
}

impl fmt::Display for SchemaElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.database, self.table, self.attribute)
    }
}

/// A class of a registered ontology: `(ontology_name, class_name)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OntologyClass {
    pub ontology: String,
    pub class_name: String,
}

impl OntologyClass {
    #[inline]
    #[must_use]
    pub fn new(ontology: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            ontology: ontology.into(),
            class_name: class_name.into(),
        }
    }
}

impl fmt::Display for OntologyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ontology, self.class_name)
    }
}

/// Correspondence between a schema element and an ontology class
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Matching {
    pub element: SchemaElement,
    pub class: OntologyClass,
}

impl Matching {
    #[inline]
    #[must_use]
    pub fn new(element: SchemaElement, class: OntologyClass) -> Self {
        Self { element, class }
    }

    /// Coherence group key of this matching: `((db, table, _), class)`.
    ///
    /// For a relation-level matching this is the matching itself.
    #[must_use]
    pub fn group_key(&self) -> Matching {
        Matching {
            element: self.element.table_key(),
            class: self.class.clone(),
        }
    }
}

impl fmt::Display for Matching {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ==>> {}", self.element, self.class)
    }
}

/// The technique that produced a matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MatchingType {
    /// Content-value similarity
    #[serde(rename = "l1")]
    L1ClassNameAttrValue,
    /// Relation-name syntactic similarity
    #[serde(rename = "l4")]
    L4ClassNameRelationNameSyn,
    /// Relation-name semantic similarity
    #[serde(rename = "l42")]
    L42ClassNameRelationNameSem,
    /// Attribute-name syntactic similarity
    #[serde(rename = "l5")]
    L5ClassNameAttrNameSyn,
    /// Attribute-name semantic similarity
    #[serde(rename = "l52")]
    L52ClassNameAttrNameSem,
    /// Table-class semantic coherence
    #[serde(rename = "l6")]
    L6ClassNameRelationSemCoherence,
    /// Fuzzy hierarchy/content similarity
    #[serde(rename = "l7")]
    L7ClassNameAttrNameFuzzy,
}

impl MatchingType {
    pub const ALL: [MatchingType; 7] = [
        MatchingType::L1ClassNameAttrValue,
        MatchingType::L4ClassNameRelationNameSyn,
        MatchingType::L42ClassNameRelationNameSem,
        MatchingType::L5ClassNameAttrNameSyn,
        MatchingType::L52ClassNameAttrNameSem,
        MatchingType::L6ClassNameRelationSemCoherence,
        MatchingType::L7ClassNameAttrNameFuzzy,
    ];

    /// Stable short name, used for persisted result names and reports
    pub fn short_name(self) -> &'static str {
        match self {
            MatchingType::L1ClassNameAttrValue => "l1",
            MatchingType::L4ClassNameRelationNameSyn => "l4",
            MatchingType::L42ClassNameRelationNameSem => "l42",
            MatchingType::L5ClassNameAttrNameSyn => "l5",
            MatchingType::L52ClassNameAttrNameSem => "l52",
            MatchingType::L6ClassNameRelationSemCoherence => "l6",
            MatchingType::L7ClassNameAttrNameFuzzy => "l7",
        }
    }

    pub fn from_short_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.short_name() == name)
    }

    pub fn description(self) -> &'static str {
        match self {
            MatchingType::L1ClassNameAttrValue => "content-value similarity",
            MatchingType::L4ClassNameRelationNameSyn => "relation-name syntactic similarity",
            MatchingType::L42ClassNameRelationNameSem => "relation-name semantic similarity",
            MatchingType::L5ClassNameAttrNameSyn => "attribute-name syntactic similarity",
            MatchingType::L52ClassNameAttrNameSem => "attribute-name semantic similarity",
            MatchingType::L6ClassNameRelationSemCoherence => "table-class semantic coherence",
            MatchingType::L7ClassNameAttrNameFuzzy => "fuzzy hierarchy/content similarity",
        }
    }

    /// Whether the matcher also emits a negative set
    pub fn emits_negatives(self) -> bool {
        matches!(
            self,
            MatchingType::L42ClassNameRelationNameSem | MatchingType::L52ClassNameAttrNameSem
        )
    }
}

impl fmt::Display for MatchingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}
