use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/tables/:table_id", get(get_table))
}

#[derive(Debug, Default, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum TableFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Deserialize)]
struct TableQuery {
    #[serde(default)]
    format: TableFormat,
}

async fn get_table(
    State(state): State<AppState>,
    Path(table_id): Path<String>,
    Query(query): Query<TableQuery>,
) -> Result<Response, AppError> {
    let table = state
        .get(&table_id)
        .ok_or_else(|| AppError::NotFound(table_id.clone()))?;

    let response = match query.format {
        TableFormat::Json => Json(table.as_ref().clone()).into_response(),
        TableFormat::Csv => {
            let body = table
                .to_csv()
                .map_err(|e| AppError::Internal(format!("CSV export failed: {}", e)))?;
            ([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], body).into_response()
        }
    };

    Ok(response)
}
