use std::sync::Arc;

use axum::extract::Multipart;
use axum::{extract::State, routing::post, Json, Router};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::pipeline::{aggregate, summary};
use crate::state::AppState;
use crate::types::record::{EnrichedRecord, TableSummary};
use crate::types::track::FileFormat;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/enrich", post(enrich))
}

#[derive(Serialize)]
struct EnrichResponse {
    table_id: String,
    filename: String,
    file_type: String,
    summary: TableSummary,
    records: Vec<EnrichedRecord>,
}

async fn enrich(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<EnrichResponse>, AppError> {
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut filename: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::BadRequest(format!("Failed to read multipart field: {}", e))
    })? {
        if field.name() == Some("file") {
            filename = field.file_name().map(|s| s.to_string());
            file_bytes = Some(field.bytes().await.map_err(|e| {
                AppError::BadRequest(format!("Failed to read file bytes: {}", e))
            })?.to_vec());
        }
    }

    let bytes = file_bytes.ok_or_else(|| AppError::BadRequest("No file provided".to_string()))?;
    let filename = filename.ok_or_else(|| AppError::BadRequest("No filename provided".to_string()))?;

    let format = FileFormat::from_filename(&filename)
        .ok_or_else(|| AppError::BadRequest("Unsupported file format".to_string()))?;

    tracing::info!("Enriching {} file: {}", format.as_str(), filename);

    let table = aggregate::enrich_bytes(state.weather(), &filename, &bytes, format).await?;
    let summary = summary::summarize(&table);

    let table_id = Uuid::new_v4().to_string();
    let table = Arc::new(table);
    state.insert(table_id.clone(), table.clone());

    tracing::info!(
        "Enriched {} as table {} ({} rows, {} with weather, {:.2} km)",
        filename,
        table_id,
        summary.rows,
        summary.rows_with_weather,
        summary.distance_m / 1000.0
    );

    Ok(Json(EnrichResponse {
        table_id,
        filename,
        file_type: format.as_str().to_string(),
        summary,
        records: table.records.clone(),
    }))
}
