//! Typed equality predicates over ledger documents.
//!
//! Matching is exact and conjunctive: a document matches when its kind equals
//! the predicate kind and every clause's field holds the clause value as a
//! JSON string. No ranges, no ordering.

use crate::domain::ledger::EntityKind;
use serde_json::Value;

/// Queryable document fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    /// `planId`
    PlanId,
    /// `beneficiaryId`
    BeneficiaryId,
    /// `sourceOrg`
    SourceOrg,
    /// `targetOrg`
    TargetOrg,
    /// `stage`
    Stage,
}

impl Field {
    /// Document field name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::PlanId => "planId",
            Self::BeneficiaryId => "beneficiaryId",
            Self::SourceOrg => "sourceOrg",
            Self::TargetOrg => "targetOrg",
            Self::Stage => "stage",
        }
    }
}

/// Conjunction of field equalities restricted to one entity kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Predicate {
    kind: EntityKind,
    clauses: Vec<(Field, String)>,
}

impl Predicate {
    /// Matches every document of `kind`.
    #[must_use]
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            clauses: Vec::new(),
        }
    }

    /// Adds an equality clause. A later clause on the same field replaces it.
    #[must_use]
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.clauses.iter_mut().find(|(f, _)| *f == field) {
            Some(clause) => clause.1 = value,
            None => self.clauses.push((field, value)),
        }
        self
    }

    /// Entity kind this predicate is restricted to.
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Equality clauses in insertion order.
    #[must_use]
    pub fn clauses(&self) -> &[(Field, String)] {
        &self.clauses
    }

    /// Evaluates the predicate against a stored document.
    #[must_use]
    pub fn matches(&self, kind: EntityKind, document: &Value) -> bool {
        kind == self.kind
            && self.clauses.iter().all(|(field, expected)| {
                document.get(field.name()).and_then(Value::as_str) == Some(expected.as_str())
            })
    }
}
