use std::path::{Component, Path};

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::pipeline::{aggregate, summary};
use crate::state::AppState;
use crate::types::record::{EnrichedTable, TableSummary};

pub fn router() -> Router<AppState> {
    Router::new().route("/api/enrich/directory", post(enrich_directory))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DirectoryRequest {
    directory: String,
}

#[derive(Serialize)]
struct FileTable {
    filename: String,
    summary: TableSummary,
    table: EnrichedTable,
}

#[derive(Serialize)]
struct DirectoryResponse {
    directory: String,
    tables: Vec<FileTable>,
}

async fn enrich_directory(
    State(state): State<AppState>,
    Json(payload): Json<DirectoryRequest>,
) -> Result<Json<DirectoryResponse>, AppError> {
    let relative = Path::new(payload.directory.trim());
    let escapes_root = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes_root {
        return Err(AppError::BadRequest(
            "directory must be a relative path inside the track root".to_string(),
        ));
    }

    let dir = state.config().track_root.join(relative);
    let is_dir = tokio::fs::metadata(&dir)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false);
    if !is_dir {
        return Err(AppError::NotFound(payload.directory));
    }

    let tables = aggregate::enrich_dir(state.weather(), &dir, state.config().batch_policy).await?;
    tracing::info!("Enriched {} files from {}", tables.len(), dir.display());

    let tables = tables
        .into_iter()
        .map(|table| FileTable {
            filename: table
                .records
                .first()
                .map(|r| r.filename.clone())
                .unwrap_or_default(),
            summary: summary::summarize(&table),
            table,
        })
        .collect();

    Ok(Json(DirectoryResponse {
        directory: payload.directory,
        tables,
    }))
}
