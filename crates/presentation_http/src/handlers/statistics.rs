//! Dashboard statistics handler

use std::collections::BTreeMap;

use application::InventoryStatistics;
use axum::{Extension, Json, extract::State};
use domain::DepartmentContext;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{ApiError, ErrorResponse},
    state::AppState,
};

/// Visible record counts per collection
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "department_id": "0192b3f4-5c6d-7e8f-9a0b-1c2d3e4f5a6b",
    "bypass": false,
    "counts": {"assets": 12, "buildings": 2, "categories": 3}
}))]
pub struct StatisticsResponse {
    pub department_id: Option<Uuid>,
    pub bypass: bool,
    pub counts: BTreeMap<String, u64>,
}

impl From<InventoryStatistics> for StatisticsResponse {
    fn from(stats: InventoryStatistics) -> Self {
        Self {
            department_id: stats.department_id.map(|d| d.as_uuid()),
            bypass: stats.bypass,
            counts: stats
                .counts
                .into_iter()
                .map(|c| (c.kind.collection().to_string(), c.count))
                .collect(),
        }
    }
}

/// Counts of every collection within the caller's scope
#[utoipa::path(
    get,
    path = "/v1/statistics",
    tag = "inventory",
    responses(
        (status = 200, description = "Scoped counts", body = StatisticsResponse),
        (status = 428, description = "No department selected", body = ErrorResponse)
    ),
    security(("user_id" = []), ("session_id" = []))
)]
#[instrument(skip(state, scope))]
pub async fn statistics(
    State(state): State<AppState>,
    Extension(scope): Extension<DepartmentContext>,
) -> Result<Json<StatisticsResponse>, ApiError> {
    let stats = state.inventory_service.statistics(&scope).await?;
    Ok(Json(stats.into()))
}

#[cfg(test)]
mod tests {
    use application::KindCount;
    use domain::ScopedEntityKind;

    use super::*;

    #[test]
    fn counts_are_keyed_by_collection() {
        let response = StatisticsResponse::from(InventoryStatistics {
            department_id: None,
            bypass: true,
            counts: vec![
                KindCount {
                    kind: ScopedEntityKind::SubCategory,
                    count: 4,
                },
                KindCount {
                    kind: ScopedEntityKind::Asset,
                    count: 9,
                },
            ],
        });
        assert_eq!(response.counts["sub-categories"], 4);
        assert_eq!(response.counts["assets"], 9);
        assert!(response.bypass);
    }
}
