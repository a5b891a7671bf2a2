//! Rendering of visibility predicates into SQLite `WHERE` fragments
//!
//! Stores never write department conditions by hand: they render the
//! [`Predicate`] returned by [`domain::resolve_filter`] and splice the
//! fragment into their query. Values are never inlined; every department id
//! becomes a `?` placeholder and is pushed to [`SqlFilter::binds`] in the
//! order the placeholders appear.

use domain::{Predicate, ShareKey, SharingRelation};

/// A rendered `WHERE` fragment and its positional bind values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlFilter {
    pub sql: String,
    pub binds: Vec<String>,
}

impl SqlFilter {
    /// Render `predicate` against the table aliased as `alias`
    pub fn render(predicate: &Predicate, alias: &str) -> Self {
        let mut renderer = Renderer::default();
        let sql = renderer.render(predicate, alias);
        Self {
            sql,
            binds: renderer.binds,
        }
    }
}

/// Table and entity column of a sharing relation
const fn relation_columns(relation: SharingRelation) -> (&'static str, &'static str) {
    match relation {
        SharingRelation::Category => ("category_department", "category_id"),
        SharingRelation::Building => ("building_department", "building_id"),
        SharingRelation::Asset => ("asset_department", "asset_id"),
    }
}

const fn key_column(key: ShareKey) -> &'static str {
    match key {
        ShareKey::OwnId => "id",
        ShareKey::CategoryId => "category_id",
    }
}

#[derive(Default)]
struct Renderer {
    binds: Vec<String>,
    /// Suffix for subquery aliases so nested subqueries never shadow
    next_alias: usize,
}

impl Renderer {
    fn fresh(&mut self) -> usize {
        self.next_alias += 1;
        self.next_alias
    }

    fn render(&mut self, predicate: &Predicate, alias: &str) -> String {
        match predicate {
            Predicate::Unrestricted => "1 = 1".to_string(),
            Predicate::Nothing => "1 = 0".to_string(),
            Predicate::OwnedBy { department } => {
                self.binds.push(department.to_string());
                format!("{alias}.department_id = ?")
            },
            Predicate::SharedWith {
                relation,
                key,
                department,
            } => {
                let (table, column) = relation_columns(*relation);
                let s = format!("s{}", self.fresh());
                self.binds.push(department.to_string());
                format!(
                    "EXISTS (SELECT 1 FROM {table} {s} WHERE {s}.{column} = {alias}.{key} \
                     AND {s}.department_id = ?)",
                    key = key_column(*key),
                )
            },
            Predicate::HousedIn { building } => {
                let n = self.fresh();
                let (r, l, b) = (format!("r{n}"), format!("l{n}"), format!("b{n}"));
                let inner = self.render(building, &b);
                format!(
                    "EXISTS (SELECT 1 FROM rooms {r} \
                     JOIN levels {l} ON {l}.id = {r}.level_id \
                     JOIN buildings {b} ON {b}.id = {l}.building_id \
                     WHERE {r}.id = {alias}.room_id AND ({inner}))"
                )
            },
            Predicate::Any { parts } => self.join(parts, alias, " OR "),
            Predicate::All { parts } => self.join(parts, alias, " AND "),
        }
    }

    fn join(&mut self, parts: &[Predicate], alias: &str, separator: &str) -> String {
        let rendered: Vec<String> = parts
            .iter()
            .map(|part| format!("({})", self.render(part, alias)))
            .collect();
        format!("({})", rendered.join(separator))
    }
}

#[cfg(test)]
mod tests {
    use domain::{
        DepartmentContext, DepartmentId, MissingContextPolicy, ScopedEntityKind, resolve_filter,
    };

    use super::*;

    #[test]
    fn constants_render_as_tautology_and_contradiction() {
        assert_eq!(
            SqlFilter::render(&Predicate::Unrestricted, "t").sql,
            "1 = 1"
        );
        assert_eq!(SqlFilter::render(&Predicate::Nothing, "t").sql, "1 = 0");
        assert!(SqlFilter::render(&Predicate::Nothing, "t").binds.is_empty());
    }

    #[test]
    fn ownership_binds_department() {
        let dept = DepartmentId::new();
        let filter = SqlFilter::render(&Predicate::owned_by(dept), "t");
        assert_eq!(filter.sql, "t.department_id = ?");
        assert_eq!(filter.binds, vec![dept.to_string()]);
    }

    #[test]
    fn shared_category_uses_category_column() {
        let dept = DepartmentId::new();
        let filter = SqlFilter::render(
            &Predicate::shared_with(SharingRelation::Category, ShareKey::CategoryId, dept),
            "t",
        );
        assert!(filter.sql.contains("FROM category_department s1"));
        assert!(filter.sql.contains("s1.category_id = t.category_id"));
        assert_eq!(filter.binds, vec![dept.to_string()]);
    }

    #[test]
    fn building_rule_checks_owner_or_share() {
        let dept = DepartmentId::new();
        let context = DepartmentContext::for_department(dept, None);
        let filter = SqlFilter::render(
            &resolve_filter(ScopedEntityKind::Building, &context),
            "t",
        );
        assert!(filter.sql.contains("t.department_id = ?"));
        assert!(filter.sql.contains(" OR "));
        assert!(filter.sql.contains("building_department"));
        assert_eq!(filter.binds.len(), 2);
    }

    #[test]
    fn asset_rule_joins_through_room_level_building() {
        let dept = DepartmentId::new();
        let context = DepartmentContext::for_department(dept, None);
        let filter = SqlFilter::render(&resolve_filter(ScopedEntityKind::Asset, &context), "t");

        assert!(filter.sql.contains("JOIN levels"));
        assert!(filter.sql.contains("JOIN buildings"));
        assert!(filter.sql.contains(".id = t.room_id"));
        assert!(filter.sql.contains("asset_department"));
        assert!(filter.sql.contains("category_department"));
        assert!(filter.binds.iter().all(|b| *b == dept.to_string()));
        assert_eq!(
            filter.binds.len(),
            filter.sql.matches('?').count(),
            "every placeholder has a bind"
        );
    }

    #[test]
    fn subquery_aliases_are_unique() {
        let dept = DepartmentId::new();
        let context = DepartmentContext::for_department(dept, None);
        let filter = SqlFilter::render(&resolve_filter(ScopedEntityKind::Asset, &context), "t");

        assert!(filter.sql.contains("FROM asset_department s1 "));
        assert!(filter.sql.contains("FROM category_department s2 "));
        assert!(filter.sql.contains("FROM rooms r3 "));
        assert!(filter.sql.contains("FROM building_department s4 "));
        assert!(filter.sql.contains("s4.building_id = b3.id"));
    }

    #[test]
    fn missing_context_renders_per_policy() {
        let deny = DepartmentContext::none();
        let allow = DepartmentContext::none().with_missing_policy(MissingContextPolicy::Allow);

        assert_eq!(
            SqlFilter::render(&resolve_filter(ScopedEntityKind::Room, &deny), "t").sql,
            "1 = 0"
        );
        assert_eq!(
            SqlFilter::render(&resolve_filter(ScopedEntityKind::Room, &allow), "t").sql,
            "1 = 1"
        );
    }
}
