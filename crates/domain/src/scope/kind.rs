//! Scoped record kinds and sharing relations

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Every kind of record whose visibility is governed by department scoping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopedEntityKind {
    Location,
    Building,
    Level,
    Room,
    Category,
    SubCategory,
    Asset,
    News,
}

impl ScopedEntityKind {
    /// All kinds, in hierarchy order
    pub const ALL: [Self; 8] = [
        Self::Location,
        Self::Building,
        Self::Level,
        Self::Room,
        Self::Category,
        Self::SubCategory,
        Self::Asset,
        Self::News,
    ];

    /// Singular snake_case name, used for audit resource types
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Building => "building",
            Self::Level => "level",
            Self::Room => "room",
            Self::Category => "category",
            Self::SubCategory => "sub_category",
            Self::Asset => "asset",
            Self::News => "news",
        }
    }

    /// Plural collection name, used in URLs
    pub const fn collection(self) -> &'static str {
        match self {
            Self::Location => "locations",
            Self::Building => "buildings",
            Self::Level => "levels",
            Self::Room => "rooms",
            Self::Category => "categories",
            Self::SubCategory => "sub-categories",
            Self::Asset => "assets",
            Self::News => "news",
        }
    }

    /// Look a kind up by its collection name
    pub fn from_collection(s: &str) -> Result<Self, DomainError> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.collection() == s)
            .ok_or_else(|| DomainError::UnknownKind(s.to_string()))
    }

    /// The sharing relation that widens this kind's visibility, if any
    pub const fn sharing_relation(self) -> Option<SharingRelation> {
        match self {
            Self::Building => Some(SharingRelation::Building),
            Self::Category => Some(SharingRelation::Category),
            Self::Asset => Some(SharingRelation::Asset),
            _ => None,
        }
    }
}

impl fmt::Display for ScopedEntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScopedEntityKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s || kind.collection() == s)
            .ok_or_else(|| DomainError::UnknownKind(s.to_string()))
    }
}

/// Many-to-many grants of visibility to departments other than the owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SharingRelation {
    /// `category_department`
    Category,
    /// `building_department`
    Building,
    /// `asset_department`
    Asset,
}

impl SharingRelation {
    /// The record kind on the entity side of the relation
    pub const fn kind(self) -> ScopedEntityKind {
        match self {
            Self::Category => ScopedEntityKind::Category,
            Self::Building => ScopedEntityKind::Building,
            Self::Asset => ScopedEntityKind::Asset,
        }
    }

    /// Relation name
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Category => "category_department",
            Self::Building => "building_department",
            Self::Asset => "asset_department",
        }
    }
}

impl fmt::Display for SharingRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
