//! Department identifier value object
//!
//! Departments are the tenancy unit of the inventory: every scoped record is
//! owned by exactly one of them.
//!
//! # Examples
//!
//! ```
//! use domain::DepartmentId;
//!
//! let id = DepartmentId::new();
//! let parsed = DepartmentId::parse(&id.to_string()).unwrap();
//! assert_eq!(id, parsed);
//! ```

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unique department identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DepartmentId(Uuid);

impl DepartmentId {
    /// Create a new random department ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a department ID from an existing UUID
    ///
    /// # Examples
    ///
    /// ```
    /// use domain::DepartmentId;
    /// use uuid::Uuid;
    ///
    /// let uuid = Uuid::new_v4();
    /// assert_eq!(DepartmentId::from_uuid(uuid).as_uuid(), uuid);
    /// ```
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse a department ID from a string
    ///
    /// # Examples
    ///
    /// ```
    /// use domain::DepartmentId;
    ///
    /// assert!(DepartmentId::parse("550e8400-e29b-41d4-a716-446655440000").is_ok());
    /// assert!(DepartmentId::parse("labs").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// Get the underlying UUID
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for DepartmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DepartmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DepartmentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Uuid> for DepartmentId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<DepartmentId> for Uuid {
    fn from(id: DepartmentId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_unique() {
        assert_ne!(DepartmentId::new(), DepartmentId::new());
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(DepartmentId::parse("").is_err());
        assert!(DepartmentId::parse("not-a-uuid").is_err());
    }

    #[test]
    fn from_str_matches_parse() {
        let raw = "550e8400-e29b-41d4-a716-446655440000";
        let a: DepartmentId = raw.parse().unwrap();
        assert_eq!(a, DepartmentId::parse(raw).unwrap());
        assert_eq!(a.to_string(), raw);
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = DepartmentId::parse("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"550e8400-e29b-41d4-a716-446655440000\"");
    }

    #[test]
    fn uuid_round_trip() {
        let uuid = Uuid::new_v4();
        let id = DepartmentId::from(uuid);
        let back: Uuid = id.into();
        assert_eq!(uuid, back);
    }
}
