//! Visibility rules per record kind

use super::{
    context::{DepartmentContext, MissingContextPolicy},
    kind::{ScopedEntityKind, SharingRelation},
    predicate::{Predicate, ShareKey},
};
use crate::value_objects::DepartmentId;

/// How a record kind becomes visible to a department
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityRule {
    /// Only the owning department sees the record
    Owned,
    /// The owner and every department listed in the relation
    OwnedOrShared(SharingRelation),
    /// Assets: owned, shared directly or through their category, and always
    /// housed in a building visible to the department
    AssetComposite,
}

impl VisibilityRule {
    pub const fn for_kind(kind: ScopedEntityKind) -> Self {
        match kind {
            ScopedEntityKind::Location
            | ScopedEntityKind::Level
            | ScopedEntityKind::Room
            | ScopedEntityKind::SubCategory
            | ScopedEntityKind::News => Self::Owned,
            ScopedEntityKind::Building => Self::OwnedOrShared(SharingRelation::Building),
            ScopedEntityKind::Category => Self::OwnedOrShared(SharingRelation::Category),
            ScopedEntityKind::Asset => Self::AssetComposite,
        }
    }

    /// The predicate for `department` acting without bypass
    pub fn resolve(self, department: DepartmentId) -> Predicate {
        match self {
            Self::Owned => Predicate::owned_by(department),
            Self::OwnedOrShared(relation) => Predicate::any([
                Predicate::owned_by(department),
                Predicate::shared_with(relation, ShareKey::OwnId, department),
            ]),
            Self::AssetComposite => {
                let reachable = Predicate::any([
                    Predicate::owned_by(department),
                    Predicate::shared_with(SharingRelation::Asset, ShareKey::OwnId, department),
                    Predicate::shared_with(
                        SharingRelation::Category,
                        ShareKey::CategoryId,
                        department,
                    ),
                ]);
                let housed = Predicate::housed_in(
                    Self::OwnedOrShared(SharingRelation::Building).resolve(department),
                );
                Predicate::all([reachable, housed])
            },
        }
    }
}

/// Build the visibility predicate for `kind` under `context`
///
/// Every scoped list, get and count goes through this function.
pub fn resolve_filter(kind: ScopedEntityKind, context: &DepartmentContext) -> Predicate {
    if context.is_bypass_active() {
        return Predicate::Unrestricted;
    }
    match context.active_department() {
        Some(department) => VisibilityRule::for_kind(kind).resolve(department),
        None => match context.missing_policy() {
            MissingContextPolicy::Deny => Predicate::Nothing,
            MissingContextPolicy::Allow => Predicate::Unrestricted,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bypass_is_unrestricted_for_every_kind() {
        let admin = DepartmentId::new();
        let context = DepartmentContext::for_department(admin, Some(admin));
        for kind in ScopedEntityKind::ALL {
            assert!(resolve_filter(kind, &context).is_unrestricted());
        }
    }

    #[test]
    fn missing_context_follows_policy() {
        let deny = DepartmentContext::none();
        let allow = DepartmentContext::none().with_missing_policy(MissingContextPolicy::Allow);
        for kind in ScopedEntityKind::ALL {
            assert!(resolve_filter(kind, &deny).is_nothing());
            assert!(resolve_filter(kind, &allow).is_unrestricted());
        }
    }

    #[test]
    fn simple_kinds_filter_by_owner() {
        let dept = DepartmentId::new();
        let context = DepartmentContext::for_department(dept, None);
        for kind in [
            ScopedEntityKind::Location,
            ScopedEntityKind::Level,
            ScopedEntityKind::Room,
            ScopedEntityKind::SubCategory,
            ScopedEntityKind::News,
        ] {
            assert_eq!(resolve_filter(kind, &context), Predicate::owned_by(dept));
        }
    }

    #[test]
    fn buildings_include_shares() {
        let dept = DepartmentId::new();
        let context = DepartmentContext::for_department(dept, None);
        assert_eq!(
            resolve_filter(ScopedEntityKind::Building, &context),
            Predicate::any([
                Predicate::owned_by(dept),
                Predicate::shared_with(SharingRelation::Building, ShareKey::OwnId, dept),
            ])
        );
    }

    #[test]
    fn assets_are_gated_by_containment() {
        let dept = DepartmentId::new();
        let context = DepartmentContext::for_department(dept, None);
        let Predicate::All { parts } = resolve_filter(ScopedEntityKind::Asset, &context) else {
            panic!("asset predicate must be a conjunction");
        };
        assert_eq!(parts.len(), 2);
        assert!(matches!(parts[0], Predicate::Any { ref parts } if parts.len() == 3));
        assert!(matches!(parts[1], Predicate::HousedIn { .. }));
    }

    #[test]
    fn admin_selection_is_scoped_when_admin_is_unconfigured() {
        let dept = DepartmentId::new();
        let context = DepartmentContext::for_department(dept, None);
        assert!(!resolve_filter(ScopedEntityKind::News, &context).is_unrestricted());
    }
}
