//! Inventory records - The scoped entities of the location and category
//! hierarchies, plus news items
//!
//! Every record carries an optional owning department. Creation inputs go
//! through [`NewInventoryItem::prepare`], which validates them and fills an
//! unset owner from the active [`DepartmentContext`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use validator::Validate;

use crate::{
    errors::DomainError,
    scope::{DepartmentContext, DepartmentOwned, ScopedEntityKind},
    value_objects::{AssetCode, DepartmentId, RecordId, validate_code_segment},
};

/// A campus or site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: RecordId,
    pub name: String,
    pub department_id: Option<DepartmentId>,
    pub created_at: DateTime<Utc>,
}

/// A building, optionally placed on a location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub id: RecordId,
    pub location_id: Option<RecordId>,
    pub name: String,
    /// Signage code (`WB-01`)
    pub code: String,
    pub department_id: Option<DepartmentId>,
    pub created_at: DateTime<Utc>,
}

/// A floor of a building
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub id: RecordId,
    pub building_id: RecordId,
    pub name: String,
    pub department_id: Option<DepartmentId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RecordId,
    pub level_id: RecordId,
    pub name: String,
    pub department_id: Option<DepartmentId>,
    pub created_at: DateTime<Utc>,
}

/// An asset category; its code is the second segment of asset codes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: RecordId,
    pub name: String,
    pub code: String,
    pub department_id: Option<DepartmentId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubCategory {
    pub id: RecordId,
    pub category_id: RecordId,
    pub name: String,
    pub department_id: Option<DepartmentId>,
    pub created_at: DateTime<Utc>,
}

/// A physical item tracked in the inventory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: RecordId,
    pub code: AssetCode,
    pub name: String,
    pub category_id: Option<RecordId>,
    pub sub_category_id: Option<RecordId>,
    /// Where the asset is kept. Assets without a room are never visible
    /// outside the bypass view.
    pub room_id: Option<RecordId>,
    pub department_id: Option<DepartmentId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct News {
    pub id: RecordId,
    pub title: String,
    pub body: String,
    pub department_id: Option<DepartmentId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewLocation {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub name: String,
    #[serde(default)]
    pub department_id: Option<DepartmentId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewBuilding {
    #[serde(default)]
    pub location_id: Option<RecordId>,
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 20, message = "must be 1-20 characters"))]
    pub code: String,
    #[serde(default)]
    pub department_id: Option<DepartmentId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewLevel {
    pub building_id: RecordId,
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub name: String,
    #[serde(default)]
    pub department_id: Option<DepartmentId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewRoom {
    pub level_id: RecordId,
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub name: String,
    #[serde(default)]
    pub department_id: Option<DepartmentId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewCategory {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub department_id: Option<DepartmentId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewSubCategory {
    pub category_id: RecordId,
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub name: String,
    #[serde(default)]
    pub department_id: Option<DepartmentId>,
}

/// Input for registering an asset; the code is generated on insert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewAsset {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub name: String,
    #[serde(default)]
    pub category_id: Option<RecordId>,
    #[serde(default)]
    pub sub_category_id: Option<RecordId>,
    #[serde(default)]
    pub room_id: Option<RecordId>,
    #[serde(default)]
    pub department_id: Option<DepartmentId>,
    /// Code of `category_id`, taken from a scoped read before insert
    #[serde(skip)]
    pub category_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewNews {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub title: String,
    #[validate(length(max = 10000, message = "must be at most 10000 characters"))]
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub department_id: Option<DepartmentId>,
}

/// Creation input for any scoped record kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NewInventoryItem {
    Location(NewLocation),
    Building(NewBuilding),
    Level(NewLevel),
    Room(NewRoom),
    Category(NewCategory),
    SubCategory(NewSubCategory),
    Asset(NewAsset),
    News(NewNews),
}

/// A stored scoped record of any kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InventoryItem {
    Location(Location),
    Building(Building),
    Level(Level),
    Room(Room),
    Category(Category),
    SubCategory(SubCategory),
    Asset(Asset),
    News(News),
}

impl NewInventoryItem {
    /// Parse a creation body for `kind`
    pub fn from_json(
        kind: ScopedEntityKind,
        body: serde_json::Value,
    ) -> Result<Self, DomainError> {
        fn parse<T: DeserializeOwned>(body: serde_json::Value) -> Result<T, DomainError> {
            serde_json::from_value(body).map_err(|e| DomainError::ValidationError(e.to_string()))
        }

        Ok(match kind {
            ScopedEntityKind::Location => Self::Location(parse(body)?),
            ScopedEntityKind::Building => Self::Building(parse(body)?),
            ScopedEntityKind::Level => Self::Level(parse(body)?),
            ScopedEntityKind::Room => Self::Room(parse(body)?),
            ScopedEntityKind::Category => Self::Category(parse(body)?),
            ScopedEntityKind::SubCategory => Self::SubCategory(parse(body)?),
            ScopedEntityKind::Asset => Self::Asset(parse(body)?),
            ScopedEntityKind::News => Self::News(parse(body)?),
        })
    }

    pub const fn kind(&self) -> ScopedEntityKind {
        match self {
            Self::Location(_) => ScopedEntityKind::Location,
            Self::Building(_) => ScopedEntityKind::Building,
            Self::Level(_) => ScopedEntityKind::Level,
            Self::Room(_) => ScopedEntityKind::Room,
            Self::Category(_) => ScopedEntityKind::Category,
            Self::SubCategory(_) => ScopedEntityKind::SubCategory,
            Self::Asset(_) => ScopedEntityKind::Asset,
            Self::News(_) => ScopedEntityKind::News,
        }
    }

    /// Parent records this input points at, each of which must be visible
    /// to the creating department
    pub fn references(&self) -> Vec<(ScopedEntityKind, RecordId)> {
        let mut references = Vec::new();
        match self {
            Self::Building(input) => {
                references.extend(input.location_id.map(|id| (ScopedEntityKind::Location, id)));
            },
            Self::Level(input) => references.push((ScopedEntityKind::Building, input.building_id)),
            Self::Room(input) => references.push((ScopedEntityKind::Level, input.level_id)),
            Self::SubCategory(input) => {
                references.push((ScopedEntityKind::Category, input.category_id));
            },
            Self::Asset(input) => {
                references.extend(input.category_id.map(|id| (ScopedEntityKind::Category, id)));
                references.extend(
                    input
                        .sub_category_id
                        .map(|id| (ScopedEntityKind::SubCategory, id)),
                );
                references.extend(input.room_id.map(|id| (ScopedEntityKind::Room, id)));
            },
            Self::Location(_) | Self::Category(_) | Self::News(_) => {},
        }
        references
    }

    /// Validate the input, normalise codes and apply default ownership
    pub fn prepare(mut self, context: &DepartmentContext) -> Result<Self, DomainError> {
        match &mut self {
            Self::Location(input) => input.validate()?,
            Self::Building(input) => {
                input.validate()?;
                input.code = input.code.trim().to_string();
            },
            Self::Level(input) => input.validate()?,
            Self::Room(input) => input.validate()?,
            Self::Category(input) => {
                input.validate()?;
                input.code = input.code.trim().to_ascii_uppercase();
                validate_code_segment(&input.code)?;
            },
            Self::SubCategory(input) => input.validate()?,
            Self::Asset(input) => input.validate()?,
            Self::News(input) => input.validate()?,
        }
        self.assign_default_department(context);
        Ok(self)
    }
}

impl InventoryItem {
    pub const fn kind(&self) -> ScopedEntityKind {
        match self {
            Self::Location(_) => ScopedEntityKind::Location,
            Self::Building(_) => ScopedEntityKind::Building,
            Self::Level(_) => ScopedEntityKind::Level,
            Self::Room(_) => ScopedEntityKind::Room,
            Self::Category(_) => ScopedEntityKind::Category,
            Self::SubCategory(_) => ScopedEntityKind::SubCategory,
            Self::Asset(_) => ScopedEntityKind::Asset,
            Self::News(_) => ScopedEntityKind::News,
        }
    }

    pub const fn id(&self) -> RecordId {
        match self {
            Self::Location(r) => r.id,
            Self::Building(r) => r.id,
            Self::Level(r) => r.id,
            Self::Room(r) => r.id,
            Self::Category(r) => r.id,
            Self::SubCategory(r) => r.id,
            Self::Asset(r) => r.id,
            Self::News(r) => r.id,
        }
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        match self {
            Self::Location(r) => r.created_at,
            Self::Building(r) => r.created_at,
            Self::Level(r) => r.created_at,
            Self::Room(r) => r.created_at,
            Self::Category(r) => r.created_at,
            Self::SubCategory(r) => r.created_at,
            Self::Asset(r) => r.created_at,
            Self::News(r) => r.created_at,
        }
    }

    /// Human-readable label (name, or title for news)
    pub fn label(&self) -> &str {
        match self {
            Self::Location(r) => &r.name,
            Self::Building(r) => &r.name,
            Self::Level(r) => &r.name,
            Self::Room(r) => &r.name,
            Self::Category(r) => &r.name,
            Self::SubCategory(r) => &r.name,
            Self::Asset(r) => &r.name,
            Self::News(r) => &r.title,
        }
    }
}

macro_rules! impl_department_owned {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl DepartmentOwned for $ty {
                fn department_id(&self) -> Option<DepartmentId> {
                    self.department_id
                }

                fn set_department_id(&mut self, department_id: Option<DepartmentId>) {
                    self.department_id = department_id;
                }
            }
        )+
    };
}

impl_department_owned!(
    Location,
    Building,
    Level,
    Room,
    Category,
    SubCategory,
    Asset,
    News,
    NewLocation,
    NewBuilding,
    NewLevel,
    NewRoom,
    NewCategory,
    NewSubCategory,
    NewAsset,
    NewNews,
);

macro_rules! delegate_department_owned {
    ($ty:ident) => {
        impl DepartmentOwned for $ty {
            fn department_id(&self) -> Option<DepartmentId> {
                match self {
                    Self::Location(r) => r.department_id(),
                    Self::Building(r) => r.department_id(),
                    Self::Level(r) => r.department_id(),
                    Self::Room(r) => r.department_id(),
                    Self::Category(r) => r.department_id(),
                    Self::SubCategory(r) => r.department_id(),
                    Self::Asset(r) => r.department_id(),
                    Self::News(r) => r.department_id(),
                }
            }

            fn set_department_id(&mut self, department_id: Option<DepartmentId>) {
                match self {
                    Self::Location(r) => r.set_department_id(department_id),
                    Self::Building(r) => r.set_department_id(department_id),
                    Self::Level(r) => r.set_department_id(department_id),
                    Self::Room(r) => r.set_department_id(department_id),
                    Self::Category(r) => r.set_department_id(department_id),
                    Self::SubCategory(r) => r.set_department_id(department_id),
                    Self::Asset(r) => r.set_department_id(department_id),
                    Self::News(r) => r.set_department_id(department_id),
                }
            }
        }
    };
}

delegate_department_owned!(NewInventoryItem);
delegate_department_owned!(InventoryItem);
