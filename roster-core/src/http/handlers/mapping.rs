//! `GET/POST /api/employee_column`

use super::RequestContext;
use crate::http::response::{json, HttpResponse};
use crate::http::AppState;
use crate::mapping::{ColumnEdit, ReconcileOutcome};
use crate::{Error, Result};
use http::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
struct MappingUpdate {
    #[serde(default)]
    uuid: Option<String>,
    #[serde(default)]
    required_columns: Vec<ColumnEdit>,
    #[serde(default)]
    non_required_columns: Vec<ColumnEdit>,
}

pub async fn list(state: &AppState) -> Result<HttpResponse> {
    let mappings: Vec<Value> =
        state.mappings.list().await?.iter().map(|m| m.to_listing()).collect();
    Ok(json(StatusCode::OK, &json!({"success": true, "data": mappings})))
}

pub async fn update(state: &AppState, ctx: RequestContext) -> Result<HttpResponse> {
    let request: MappingUpdate = ctx.json()?;
    let uuid = request
        .uuid
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::invalid("UUID is required"))?;

    let outcome = state
        .mappings
        .reconcile(uuid, &request.required_columns, &request.non_required_columns)
        .await?;
    match outcome {
        ReconcileOutcome::Applied(mapping) => {
            let listing = mapping.to_listing();
            Ok(json(
                StatusCode::OK,
                &json!({
                    "success": true,
                    "message": "Profile mapping updated successfully",
                    "data": {
                        "uuid": mapping.uuid,
                        "version": mapping.version,
                        "required_columns": listing["required_columns"],
                        "non_required_columns": listing["non_required_columns"],
                    }
                }),
            ))
        }
        ReconcileOutcome::NoChanges(_) => Ok(json(
            StatusCode::BAD_REQUEST,
            &json!({"success": false, "message": "No changes made to profile mapping"}),
        )),
    }
}
