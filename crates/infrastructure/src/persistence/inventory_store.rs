//! SQLite inventory store
//!
//! Implements the `InventoryStore` port over the eight scoped tables. Reads
//! render the predicate from [`domain::resolve_filter`] with [`SqlFilter`];
//! this module adds no department conditions of its own.

use application::{
    error::ApplicationError,
    ports::{InventoryStore, Page, Pagination},
};
use async_trait::async_trait;
use chrono::{Datelike, Utc};
use domain::{
    Asset, AssetCode, Building, Category, DepartmentContext, DepartmentId, InventoryItem, Level,
    Location, NewAsset, NewInventoryItem, News, RecordId, Room, ScopedEntityKind, SubCategory,
    resolve_filter,
};
use sqlx::{SqlitePool, sqlite::SqliteRow};
use tracing::{debug, instrument};

use super::{
    error::{corrupt, map_sqlx_error},
    rows::{format_timestamp, parse_column, parse_optional, parse_timestamp},
    scope_sql::SqlFilter,
};

/// Table alias used by every scoped read
const ALIAS: &str = "t";

const fn table(kind: ScopedEntityKind) -> &'static str {
    match kind {
        ScopedEntityKind::Location => "locations",
        ScopedEntityKind::Building => "buildings",
        ScopedEntityKind::Level => "levels",
        ScopedEntityKind::Room => "rooms",
        ScopedEntityKind::Category => "categories",
        ScopedEntityKind::SubCategory => "sub_categories",
        ScopedEntityKind::Asset => "assets",
        ScopedEntityKind::News => "news",
    }
}

/// A table row that converts into an [`InventoryItem`]
trait RowItem: for<'r> sqlx::FromRow<'r, SqliteRow> + Send + Unpin {
    const COLUMNS: &'static str;

    fn into_item(self) -> Result<InventoryItem, ApplicationError>;
}

#[derive(sqlx::FromRow)]
struct LocationRow {
    id: String,
    name: String,
    department_id: Option<String>,
    created_at: String,
}

impl RowItem for LocationRow {
    const COLUMNS: &'static str = "t.id, t.name, t.department_id, t.created_at";

    fn into_item(self) -> Result<InventoryItem, ApplicationError> {
        Ok(InventoryItem::Location(Location {
            id: parse_column("id", &self.id)?,
            name: self.name,
            department_id: parse_optional("department_id", self.department_id.as_deref())?,
            created_at: parse_timestamp("created_at", &self.created_at)?,
        }))
    }
}

#[derive(sqlx::FromRow)]
struct BuildingRow {
    id: String,
    location_id: Option<String>,
    name: String,
    code: String,
    department_id: Option<String>,
    created_at: String,
}

impl RowItem for BuildingRow {
    const COLUMNS: &'static str =
        "t.id, t.location_id, t.name, t.code, t.department_id, t.created_at";

    fn into_item(self) -> Result<InventoryItem, ApplicationError> {
        Ok(InventoryItem::Building(Building {
            id: parse_column("id", &self.id)?,
            location_id: parse_optional("location_id", self.location_id.as_deref())?,
            name: self.name,
            code: self.code,
            department_id: parse_optional("department_id", self.department_id.as_deref())?,
            created_at: parse_timestamp("created_at", &self.created_at)?,
        }))
    }
}

#[derive(sqlx::FromRow)]
struct LevelRow {
    id: String,
    building_id: String,
    name: String,
    department_id: Option<String>,
    created_at: String,
}

impl RowItem for LevelRow {
    const COLUMNS: &'static str = "t.id, t.building_id, t.name, t.department_id, t.created_at";

    fn into_item(self) -> Result<InventoryItem, ApplicationError> {
        Ok(InventoryItem::Level(Level {
            id: parse_column("id", &self.id)?,
            building_id: parse_column("building_id", &self.building_id)?,
            name: self.name,
            department_id: parse_optional("department_id", self.department_id.as_deref())?,
            created_at: parse_timestamp("created_at", &self.created_at)?,
        }))
    }
}

#[derive(sqlx::FromRow)]
struct RoomRow {
    id: String,
    level_id: String,
    name: String,
    department_id: Option<String>,
    created_at: String,
}

impl RowItem for RoomRow {
    const COLUMNS: &'static str = "t.id, t.level_id, t.name, t.department_id, t.created_at";

    fn into_item(self) -> Result<InventoryItem, ApplicationError> {
        Ok(InventoryItem::Room(Room {
            id: parse_column("id", &self.id)?,
            level_id: parse_column("level_id", &self.level_id)?,
            name: self.name,
            department_id: parse_optional("department_id", self.department_id.as_deref())?,
            created_at: parse_timestamp("created_at", &self.created_at)?,
        }))
    }
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: String,
    name: String,
    code: String,
    department_id: Option<String>,
    created_at: String,
}

impl RowItem for CategoryRow {
    const COLUMNS: &'static str = "t.id, t.name, t.code, t.department_id, t.created_at";

    fn into_item(self) -> Result<InventoryItem, ApplicationError> {
        Ok(InventoryItem::Category(Category {
            id: parse_column("id", &self.id)?,
            name: self.name,
            code: self.code,
            department_id: parse_optional("department_id", self.department_id.as_deref())?,
            created_at: parse_timestamp("created_at", &self.created_at)?,
        }))
    }
}

#[derive(sqlx::FromRow)]
struct SubCategoryRow {
    id: String,
    category_id: String,
    name: String,
    department_id: Option<String>,
    created_at: String,
}

impl RowItem for SubCategoryRow {
    const COLUMNS: &'static str = "t.id, t.category_id, t.name, t.department_id, t.created_at";

    fn into_item(self) -> Result<InventoryItem, ApplicationError> {
        Ok(InventoryItem::SubCategory(SubCategory {
            id: parse_column("id", &self.id)?,
            category_id: parse_column("category_id", &self.category_id)?,
            name: self.name,
            department_id: parse_optional("department_id", self.department_id.as_deref())?,
            created_at: parse_timestamp("created_at", &self.created_at)?,
        }))
    }
}

#[derive(sqlx::FromRow)]
struct AssetRow {
    id: String,
    code: String,
    name: String,
    category_id: Option<String>,
    sub_category_id: Option<String>,
    room_id: Option<String>,
    department_id: Option<String>,
    created_at: String,
}

impl RowItem for AssetRow {
    const COLUMNS: &'static str = "t.id, t.code, t.name, t.category_id, t.sub_category_id, \
                                   t.room_id, t.department_id, t.created_at";

    fn into_item(self) -> Result<InventoryItem, ApplicationError> {
        Ok(InventoryItem::Asset(Asset {
            id: parse_column("id", &self.id)?,
            code: AssetCode::parse(&self.code).map_err(|_| corrupt("code", &self.code))?,
            name: self.name,
            category_id: parse_optional("category_id", self.category_id.as_deref())?,
            sub_category_id: parse_optional("sub_category_id", self.sub_category_id.as_deref())?,
            room_id: parse_optional("room_id", self.room_id.as_deref())?,
            department_id: parse_optional("department_id", self.department_id.as_deref())?,
            created_at: parse_timestamp("created_at", &self.created_at)?,
        }))
    }
}

#[derive(sqlx::FromRow)]
struct NewsRow {
    id: String,
    title: String,
    body: String,
    department_id: Option<String>,
    created_at: String,
}

impl RowItem for NewsRow {
    const COLUMNS: &'static str = "t.id, t.title, t.body, t.department_id, t.created_at";

    fn into_item(self) -> Result<InventoryItem, ApplicationError> {
        Ok(InventoryItem::News(News {
            id: parse_column("id", &self.id)?,
            title: self.title,
            body: self.body,
            department_id: parse_optional("department_id", self.department_id.as_deref())?,
            created_at: parse_timestamp("created_at", &self.created_at)?,
        }))
    }
}

/// Optional row id and pagination that complete a scoped `SELECT`
#[derive(Clone, Copy)]
enum Selection {
    One(RecordId),
    Page(Pagination),
}

/// SQLite-based inventory store
#[derive(Debug, Clone)]
pub struct SqliteInventoryStore {
    pool: SqlitePool,
}

impl SqliteInventoryStore {
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn select<R: RowItem>(
        &self,
        kind: ScopedEntityKind,
        filter: &SqlFilter,
        selection: Selection,
    ) -> Result<Vec<InventoryItem>, ApplicationError> {
        let mut sql = format!(
            "SELECT {columns} FROM {table} {ALIAS} WHERE ",
            columns = R::COLUMNS,
            table = table(kind)
        );
        if matches!(selection, Selection::One(_)) {
            sql.push_str("t.id = ? AND ");
        }
        sql.push('(');
        sql.push_str(&filter.sql);
        sql.push(')');
        if matches!(selection, Selection::Page(_)) {
            sql.push_str(" ORDER BY t.created_at, t.id LIMIT ? OFFSET ?");
        }

        let mut query = sqlx::query_as::<_, R>(&sql);
        if let Selection::One(id) = selection {
            query = query.bind(id.to_string());
        }
        for bind in &filter.binds {
            query = query.bind(bind);
        }
        if let Selection::Page(page) = selection {
            query = query.bind(i64::from(page.limit)).bind(i64::from(page.offset));
        }

        let rows = query.fetch_all(&self.pool).await.map_err(map_sqlx_error)?;
        rows.into_iter().map(RowItem::into_item).collect()
    }

    async fn select_kind(
        &self,
        kind: ScopedEntityKind,
        context: &DepartmentContext,
        selection: Selection,
    ) -> Result<Vec<InventoryItem>, ApplicationError> {
        let filter = SqlFilter::render(&resolve_filter(kind, context), ALIAS);
        match kind {
            ScopedEntityKind::Location => {
                self.select::<LocationRow>(kind, &filter, selection).await
            },
            ScopedEntityKind::Building => {
                self.select::<BuildingRow>(kind, &filter, selection).await
            },
            ScopedEntityKind::Level => self.select::<LevelRow>(kind, &filter, selection).await,
            ScopedEntityKind::Room => self.select::<RoomRow>(kind, &filter, selection).await,
            ScopedEntityKind::Category => {
                self.select::<CategoryRow>(kind, &filter, selection).await
            },
            ScopedEntityKind::SubCategory => {
                self.select::<SubCategoryRow>(kind, &filter, selection).await
            },
            ScopedEntityKind::Asset => self.select::<AssetRow>(kind, &filter, selection).await,
            ScopedEntityKind::News => self.select::<NewsRow>(kind, &filter, selection).await,
        }
    }

    async fn department_code(&self, id: DepartmentId) -> Result<String, ApplicationError> {
        let code: Option<String> = sqlx::query_scalar("SELECT code FROM departments WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        code.ok_or_else(|| {
            ApplicationError::InvalidOperation(format!("department {id} does not exist"))
        })
    }

    /// Insert an asset, numbering it after the highest code with its prefix
    ///
    /// The sequence is computed by the `INSERT` statement itself, so two
    /// concurrent registrations never receive the same code.
    async fn insert_asset(&self, input: &NewAsset) -> Result<Asset, ApplicationError> {
        let department_code = match input.department_id {
            Some(id) => Some(self.department_code(id).await?),
            None => None,
        };
        let category_code = match (input.category_id, &input.category_code) {
            (Some(_), Some(code)) => Some(code.as_str()),
            (Some(id), None) => {
                return Err(ApplicationError::InvalidOperation(format!(
                    "category {id} was not resolved before insert"
                )));
            },
            (None, _) => None,
        };

        let id = RecordId::new();
        let created_at = Utc::now();
        let prefix = AssetCode::prefix(
            department_code.as_deref(),
            category_code,
            created_at.year(),
        );
        let prefix_len = i64::try_from(prefix.len())
            .map_err(|e| ApplicationError::Internal(e.to_string()))?;

        let code: String = sqlx::query_scalar(
            "INSERT INTO assets (id, code, name, category_id, sub_category_id, room_id, \
             department_id, created_at)
             SELECT ?, ? || printf('%04d', COALESCE(MAX(CAST(substr(code, ?) AS INTEGER)), 0) + 1),
                    ?, ?, ?, ?, ?, ?
             FROM assets WHERE substr(code, 1, ?) = ?
             RETURNING code",
        )
        .bind(id.to_string())
        .bind(&prefix)
        .bind(prefix_len + 1)
        .bind(&input.name)
        .bind(input.category_id.map(|v| v.to_string()))
        .bind(input.sub_category_id.map(|v| v.to_string()))
        .bind(input.room_id.map(|v| v.to_string()))
        .bind(input.department_id.map(|v| v.to_string()))
        .bind(format_timestamp(created_at))
        .bind(prefix_len)
        .bind(&prefix)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        debug!(code = %code, "Registered asset");

        Ok(Asset {
            id,
            code: AssetCode::parse(&code).map_err(|_| corrupt("code", &code))?,
            name: input.name.clone(),
            category_id: input.category_id,
            sub_category_id: input.sub_category_id,
            room_id: input.room_id,
            department_id: input.department_id,
            created_at,
        })
    }
}

fn optional_text<T: ToString>(value: Option<T>) -> Option<String> {
    value.map(|v| v.to_string())
}

#[async_trait]
impl InventoryStore for SqliteInventoryStore {
    #[instrument(skip(self, item), fields(kind = %item.kind()))]
    async fn insert(&self, item: &NewInventoryItem) -> Result<InventoryItem, ApplicationError> {
        let id = RecordId::new();
        let created_at = Utc::now();
        let stamp = format_timestamp(created_at);

        let (query, stored) = match item {
            NewInventoryItem::Location(input) => (
                sqlx::query(
                    "INSERT INTO locations (id, name, department_id, created_at)
                     VALUES (?, ?, ?, ?)",
                )
                .bind(id.to_string())
                .bind(&input.name)
                .bind(optional_text(input.department_id))
                .bind(&stamp),
                InventoryItem::Location(Location {
                    id,
                    name: input.name.clone(),
                    department_id: input.department_id,
                    created_at,
                }),
            ),
            NewInventoryItem::Building(input) => (
                sqlx::query(
                    "INSERT INTO buildings (id, location_id, name, code, department_id, created_at)
                     VALUES (?, ?, ?, ?, ?, ?)",
                )
                .bind(id.to_string())
                .bind(optional_text(input.location_id))
                .bind(&input.name)
                .bind(&input.code)
                .bind(optional_text(input.department_id))
                .bind(&stamp),
                InventoryItem::Building(Building {
                    id,
                    location_id: input.location_id,
                    name: input.name.clone(),
                    code: input.code.clone(),
                    department_id: input.department_id,
                    created_at,
                }),
            ),
            NewInventoryItem::Level(input) => (
                sqlx::query(
                    "INSERT INTO levels (id, building_id, name, department_id, created_at)
                     VALUES (?, ?, ?, ?, ?)",
                )
                .bind(id.to_string())
                .bind(input.building_id.to_string())
                .bind(&input.name)
                .bind(optional_text(input.department_id))
                .bind(&stamp),
                InventoryItem::Level(Level {
                    id,
                    building_id: input.building_id,
                    name: input.name.clone(),
                    department_id: input.department_id,
                    created_at,
                }),
            ),
            NewInventoryItem::Room(input) => (
                sqlx::query(
                    "INSERT INTO rooms (id, level_id, name, department_id, created_at)
                     VALUES (?, ?, ?, ?, ?)",
                )
                .bind(id.to_string())
                .bind(input.level_id.to_string())
                .bind(&input.name)
                .bind(optional_text(input.department_id))
                .bind(&stamp),
                InventoryItem::Room(Room {
                    id,
                    level_id: input.level_id,
                    name: input.name.clone(),
                    department_id: input.department_id,
                    created_at,
                }),
            ),
            NewInventoryItem::Category(input) => (
                sqlx::query(
                    "INSERT INTO categories (id, name, code, department_id, created_at)
                     VALUES (?, ?, ?, ?, ?)",
                )
                .bind(id.to_string())
                .bind(&input.name)
                .bind(&input.code)
                .bind(optional_text(input.department_id))
                .bind(&stamp),
                InventoryItem::Category(Category {
                    id,
                    name: input.name.clone(),
                    code: input.code.clone(),
                    department_id: input.department_id,
                    created_at,
                }),
            ),
            NewInventoryItem::SubCategory(input) => (
                sqlx::query(
                    "INSERT INTO sub_categories (id, category_id, name, department_id, created_at)
                     VALUES (?, ?, ?, ?, ?)",
                )
                .bind(id.to_string())
                .bind(input.category_id.to_string())
                .bind(&input.name)
                .bind(optional_text(input.department_id))
                .bind(&stamp),
                InventoryItem::SubCategory(SubCategory {
                    id,
                    category_id: input.category_id,
                    name: input.name.clone(),
                    department_id: input.department_id,
                    created_at,
                }),
            ),
            NewInventoryItem::News(input) => (
                sqlx::query(
                    "INSERT INTO news (id, title, body, department_id, created_at)
                     VALUES (?, ?, ?, ?, ?)",
                )
                .bind(id.to_string())
                .bind(&input.title)
                .bind(&input.body)
                .bind(optional_text(input.department_id))
                .bind(&stamp),
                InventoryItem::News(News {
                    id,
                    title: input.title.clone(),
                    body: input.body.clone(),
                    department_id: input.department_id,
                    created_at,
                }),
            ),
            NewInventoryItem::Asset(input) => {
                return self.insert_asset(input).await.map(InventoryItem::Asset);
            },
        };

        query.execute(&self.pool).await.map_err(map_sqlx_error)?;

        debug!(id = %id, "Inserted record");
        Ok(stored)
    }

    #[instrument(skip(self, context), fields(kind = %kind))]
    async fn list(
        &self,
        kind: ScopedEntityKind,
        context: &DepartmentContext,
        pagination: Pagination,
    ) -> Result<Page<InventoryItem>, ApplicationError> {
        let items = self
            .select_kind(kind, context, Selection::Page(pagination))
            .await?;
        let total = self.count(kind, context).await?;

        Ok(Page {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    #[instrument(skip(self, context), fields(kind = %kind, id = %id))]
    async fn get(
        &self,
        kind: ScopedEntityKind,
        id: RecordId,
        context: &DepartmentContext,
    ) -> Result<Option<InventoryItem>, ApplicationError> {
        let mut items = self.select_kind(kind, context, Selection::One(id)).await?;
        Ok(items.pop())
    }

    #[instrument(skip(self, context), fields(kind = %kind))]
    async fn count(
        &self,
        kind: ScopedEntityKind,
        context: &DepartmentContext,
    ) -> Result<u64, ApplicationError> {
        let filter = SqlFilter::render(&resolve_filter(kind, context), ALIAS);
        let sql = format!(
            "SELECT COUNT(*) FROM {table} {ALIAS} WHERE ({filter})",
            table = table(kind),
            filter = filter.sql
        );

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for bind in &filter.binds {
            query = query.bind(bind);
        }
        let count = query.fetch_one(&self.pool).await.map_err(map_sqlx_error)?;

        u64::try_from(count).map_err(|e| ApplicationError::Internal(e.to_string()))
    }

    #[instrument(skip(self), fields(kind = %kind, id = %id))]
    async fn set_department(
        &self,
        kind: ScopedEntityKind,
        id: RecordId,
        department_id: Option<DepartmentId>,
    ) -> Result<bool, ApplicationError> {
        let sql = format!("UPDATE {} SET department_id = ? WHERE id = ?", table(kind));
        let result = sqlx::query(&sql)
            .bind(optional_text(department_id))
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}
