//! Storage-agnostic visibility predicates
//!
//! A [`Predicate`] describes which rows of one scoped table are visible. It is
//! plain data: persistence adapters render it into SQL and in-memory stores
//! evaluate it with [`Predicate::matches`] against a [`ScopeFacts`] view of a
//! record.

use serde::{Deserialize, Serialize};

use super::kind::SharingRelation;
use crate::value_objects::DepartmentId;

/// Which column of the filtered row is looked up in a sharing relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareKey {
    /// The row's own id
    OwnId,
    /// The row's `category_id`
    CategoryId,
}

/// A visibility condition over one scoped table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    /// Every row is visible
    Unrestricted,
    /// No row is visible
    Nothing,
    /// `department_id = department`
    OwnedBy { department: DepartmentId },
    /// A row exists in `relation` for (`key`, `department`)
    SharedWith {
        relation: SharingRelation,
        key: ShareKey,
        department: DepartmentId,
    },
    /// The row's room resolves through its level to a building satisfying
    /// `building`. Unresolvable references never match.
    HousedIn { building: Box<Predicate> },
    /// At least one part holds
    Any { parts: Vec<Predicate> },
    /// Every part holds
    All { parts: Vec<Predicate> },
}

impl Predicate {
    pub const fn owned_by(department: DepartmentId) -> Self {
        Self::OwnedBy { department }
    }

    pub const fn shared_with(
        relation: SharingRelation,
        key: ShareKey,
        department: DepartmentId,
    ) -> Self {
        Self::SharedWith {
            relation,
            key,
            department,
        }
    }

    pub fn housed_in(building: Self) -> Self {
        match building {
            Self::Nothing => Self::Nothing,
            building => Self::HousedIn {
                building: Box::new(building),
            },
        }
    }

    /// Disjunction, simplified
    ///
    /// `Unrestricted` absorbs the rest, `Nothing` parts are dropped, nested
    /// disjunctions are flattened. An empty disjunction is `Nothing`.
    pub fn any(parts: impl IntoIterator<Item = Self>) -> Self {
        let mut flat = Vec::new();
        for part in parts {
            match part {
                Self::Unrestricted => return Self::Unrestricted,
                Self::Nothing => {},
                Self::Any { parts } => flat.extend(parts),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => Self::Nothing,
            1 => flat.pop().unwrap_or(Self::Nothing),
            _ => Self::Any { parts: flat },
        }
    }

    /// Conjunction, simplified
    ///
    /// `Nothing` absorbs the rest, `Unrestricted` parts are dropped, nested
    /// conjunctions are flattened. An empty conjunction is `Unrestricted`.
    pub fn all(parts: impl IntoIterator<Item = Self>) -> Self {
        let mut flat = Vec::new();
        for part in parts {
            match part {
                Self::Nothing => return Self::Nothing,
                Self::Unrestricted => {},
                Self::All { parts } => flat.extend(parts),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => Self::Unrestricted,
            1 => flat.pop().unwrap_or(Self::Unrestricted),
            _ => Self::All { parts: flat },
        }
    }

    pub const fn is_unrestricted(&self) -> bool {
        matches!(self, Self::Unrestricted)
    }

    pub const fn is_nothing(&self) -> bool {
        matches!(self, Self::Nothing)
    }

    /// Evaluate against one record
    pub fn matches<F: ScopeFacts + ?Sized>(&self, facts: &F) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::Nothing => false,
            Self::OwnedBy { department } => facts.owner() == Some(*department),
            Self::SharedWith {
                relation,
                key,
                department,
            } => facts.is_shared(*relation, *key, *department),
            Self::HousedIn { building } => facts
                .housing_building()
                .is_some_and(|b| building.matches(b)),
            Self::Any { parts } => parts.iter().any(|p| p.matches(facts)),
            Self::All { parts } => parts.iter().all(|p| p.matches(facts)),
        }
    }
}

/// What a predicate needs to know about one record
pub trait ScopeFacts {
    /// The record's owning department
    fn owner(&self) -> Option<DepartmentId>;

    /// Whether `relation` holds a row for the record's `key` column and
    /// `department`
    fn is_shared(&self, relation: SharingRelation, key: ShareKey, department: DepartmentId)
    -> bool;

    /// The building reached through room and level, if every link resolves
    fn housing_building(&self) -> Option<&dyn ScopeFacts>;
}
