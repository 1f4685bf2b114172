//! Relationship query resolver
//!
//! Maps a free-text question such as "Who is my daughter?" or "Tell me about
//! Bob" to at most one entry of the patient's roster. Matching is offline,
//! synchronous and total: any utterance against any roster yields either
//! [`QueryResult::Matched`] or [`QueryResult::NoMatch`].
//!
//! Resolution order:
//! 1. The first keyword category (table order) hit by the utterance selects
//!    the first roster entry whose relationship equals that category.
//! 2. Failing that, the first roster entry whose name appears in the utterance.

mod keywords;


pub use keywords::{KeywordCategory, KeywordTable};

use crate::config::ResolverConfig;
use crate::models::{FamilyMember, MemberSummary, RosterEntry};

/// What the resolver needs to know about a roster entry
pub trait RosterView {
    fn name(&self) -> &str;
    fn relationship(&self) -> &str;
}

impl RosterView for RosterEntry {
    fn name(&self) -> &str {
        &self.name
    }

    fn relationship(&self) -> &str {
        &self.relationship
    }
}

impl RosterView for FamilyMember {
    fn name(&self) -> &str {
        &self.name
    }

    fn relationship(&self) -> &str {
        &self.relationship
    }
}

impl RosterView for MemberSummary {
    fn name(&self) -> &str {
        &self.name
    }

    fn relationship(&self) -> &str {
        self.relationship.as_deref().unwrap_or_default()
    }
}

impl<T: RosterView + ?Sized> RosterView for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn relationship(&self) -> &str {
        (**self).relationship()
    }
}

/// Outcome of resolving one utterance
#[derive(Debug, PartialEq, Eq)]
pub enum QueryResult<'r, E> {
    /// The roster entry the utterance refers to
    Matched(&'r E),
    NoMatch,
}

impl<E> Clone for QueryResult<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for QueryResult<'_, E> {}

impl<'r, E> QueryResult<'r, E> {
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched(_))
    }

    /// The matched entry, if any
    pub fn entry(self) -> Option<&'r E> {
        match self {
            Self::Matched(entry) => Some(entry),
            Self::NoMatch => None,
        }
    }
}

impl<'r, E> From<Option<&'r E>> for QueryResult<'r, E> {
    fn from(entry: Option<&'r E>) -> Self {
        entry.map_or(Self::NoMatch, Self::Matched)
    }
}

/// Resolves utterances against a roster using a [`KeywordTable`]
#[derive(Debug, Clone, Default)]
pub struct RelationshipResolver {
    table: KeywordTable,
}

impl RelationshipResolver {
    /// Resolver with the built-in keyword table
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(table: KeywordTable) -> Self {
        Self { table }
    }

    /// Built-in table extended with `resolver.extra_keywords`
    pub fn from_config(config: &ResolverConfig) -> Self {
        let mut table = KeywordTable::default();
        for rule in &config.extra_keywords {
            table.extend(&rule.category, &rule.keywords);
        }
        Self { table }
    }

    pub fn table(&self) -> &KeywordTable {
        &self.table
    }

    /// Resolve `utterance` against `roster`
    pub fn resolve<'r, E: RosterView>(&self, utterance: &str, roster: &'r [E]) -> QueryResult<'r, E> {
        let normalized = utterance.trim().to_lowercase();
        if normalized.is_empty() || roster.is_empty() {
            return QueryResult::NoMatch;
        }

        if let Some(category) = self.table.first_hit(&normalized) {
            if let Some(entry) = roster
                .iter()
                .find(|e| e.relationship().trim().to_lowercase() == category.name)
            {
                tracing::debug!(category = %category.name, name = entry.name(), "Matched by relationship");
                return QueryResult::Matched(entry);
            }
            tracing::debug!(category = %category.name, "No roster entry for relationship, trying names");
        }

        let by_name = roster.iter().find(|e| {
            let name = e.name().trim().to_lowercase();
            !name.is_empty() && normalized.contains(&name)
        });

        match by_name {
            Some(entry) => {
                tracing::debug!(name = entry.name(), "Matched by name");
                QueryResult::Matched(entry)
            }
            None => {
                tracing::debug!(utterance = %normalized, "No roster match");
                QueryResult::NoMatch
            }
        }
    }
}

/// Resolve with the built-in keyword table
pub fn resolve<'r, E: RosterView>(utterance: &str, roster: &'r [E]) -> QueryResult<'r, E> {
    RelationshipResolver::new().resolve(utterance, roster)
}
