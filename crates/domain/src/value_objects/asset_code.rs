//! Asset code value object
//!
//! Asset codes are human-readable inventory tags of the form
//! `{DEPT}-{CAT}-{YYYY}-{NNNN}`:
//!
//! - owning department code (`ORPH` when the asset has no owner),
//! - category code (`GEN` when the asset is uncategorised),
//! - the year the asset was registered,
//! - a 1-based sequence number, unique per prefix.
//!
//! # Examples
//!
//! ```
//! use domain::AssetCode;
//!
//! let code = AssetCode::new(Some("LABS"), Some("COMP"), 2026, 42).unwrap();
//! assert_eq!(code.to_string(), "LABS-COMP-2026-0042");
//! assert_eq!(AssetCode::parse("LABS-COMP-2026-0042").unwrap(), code);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Department segment used for assets without an owning department
pub const ORPHAN_SEGMENT: &str = "ORPH";

/// Category segment used for assets without a category
pub const GENERAL_SEGMENT: &str = "GEN";

/// Check that a department or category code is 2-10 uppercase ASCII
/// letters or digits
pub fn validate_code_segment(segment: &str) -> Result<(), DomainError> {
    let len_ok = (2..=10).contains(&segment.len());
    let chars_ok = segment
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());

    if len_ok && chars_ok {
        Ok(())
    } else {
        Err(DomainError::InvalidCode(segment.to_string()))
    }
}

/// A generated inventory tag for an asset
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetCode {
    department: String,
    category: String,
    year: i32,
    sequence: u32,
}

impl AssetCode {
    /// Build a code from its parts
    ///
    /// Missing department or category segments fall back to
    /// [`ORPHAN_SEGMENT`] and [`GENERAL_SEGMENT`].
    pub fn new(
        department: Option<&str>,
        category: Option<&str>,
        year: i32,
        sequence: u32,
    ) -> Result<Self, DomainError> {
        let department = department.unwrap_or(ORPHAN_SEGMENT);
        let category = category.unwrap_or(GENERAL_SEGMENT);
        validate_code_segment(department)?;
        validate_code_segment(category)?;

        if !(1000..=9999).contains(&year) {
            return Err(DomainError::InvalidAssetCode(format!("year {year} out of range")));
        }
        if sequence == 0 {
            return Err(DomainError::InvalidAssetCode(
                "sequence numbers start at 1".to_string(),
            ));
        }

        Ok(Self {
            department: department.to_string(),
            category: category.to_string(),
            year,
            sequence,
        })
    }

    /// The shared prefix of all codes with the given parts, including the
    /// trailing separator (`LABS-COMP-2026-`)
    pub fn prefix(department: Option<&str>, category: Option<&str>, year: i32) -> String {
        format!(
            "{}-{}-{year:04}-",
            department.unwrap_or(ORPHAN_SEGMENT),
            category.unwrap_or(GENERAL_SEGMENT)
        )
    }

    /// Parse a code from its display form
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let invalid = || DomainError::InvalidAssetCode(s.to_string());

        let mut parts = s.split('-');
        let (Some(department), Some(category), Some(year), Some(sequence), None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return Err(invalid());
        };

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let sequence: u32 = sequence.parse().map_err(|_| invalid())?;

        Self::new(Some(department), Some(category), year, sequence)
    }

    /// Department segment
    pub fn department_segment(&self) -> &str {
        &self.department
    }

    /// Category segment
    pub fn category_segment(&self) -> &str {
        &self.category
    }

    /// Registration year
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Sequence number within the prefix
    pub const fn sequence(&self) -> u32 {
        self.sequence
    }
}

impl fmt::Display for AssetCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{:04}-{:04}",
            self.department, self.category, self.year, self.sequence
        )
    }
}

impl TryFrom<String> for AssetCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AssetCode> for String {
    fn from(code: AssetCode) -> Self {
        code.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_zero_padding() {
        let code = AssetCode::new(Some("LABS"), Some("COMP"), 2026, 7).unwrap();
        assert_eq!(code.to_string(), "LABS-COMP-2026-0007");
    }

    #[test]
    fn sequence_wider_than_four_digits_is_kept() {
        let code = AssetCode::new(Some("LABS"), Some("COMP"), 2026, 12345).unwrap();
        assert_eq!(code.to_string(), "LABS-COMP-2026-12345");
    }

    #[test]
    fn missing_segments_use_placeholders() {
        let code = AssetCode::new(None, None, 2025, 1).unwrap();
        assert_eq!(code.to_string(), "ORPH-GEN-2025-0001");
    }

    #[test]
    fn prefix_matches_display_form() {
        let code = AssetCode::new(Some("ADM"), None, 2026, 3).unwrap();
        let prefix = AssetCode::prefix(Some("ADM"), None, 2026);
        assert!(code.to_string().starts_with(&prefix));
        assert_eq!(prefix, "ADM-GEN-2026-");
    }

    #[test]
    fn rejects_zero_sequence() {
        assert!(AssetCode::new(Some("LABS"), None, 2026, 0).is_err());
    }

    #[test]
    fn rejects_lowercase_segments() {
        assert!(AssetCode::new(Some("labs"), None, 2026, 1).is_err());
    }

    #[test]
    fn parse_rejects_wrong_shape() {
        assert!(AssetCode::parse("LABS-COMP-2026").is_err());
        assert!(AssetCode::parse("LABS-COMP-2026-0001-9").is_err());
        assert!(AssetCode::parse("LABS-COMP-year-0001").is_err());
        assert!(AssetCode::parse("").is_err());
    }

    #[test]
    fn serde_uses_display_form() {
        let code = AssetCode::new(Some("LABS"), Some("COMP"), 2026, 42).unwrap();
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"LABS-COMP-2026-0042\"");
        let back: AssetCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, code);
    }

    #[test]
    fn segment_validation() {
        assert!(validate_code_segment("WB01").is_ok());
        assert!(validate_code_segment("A").is_err());
        assert!(validate_code_segment("ABCDEFGHIJK").is_err());
        assert!(validate_code_segment("A-B").is_err());
    }
}
