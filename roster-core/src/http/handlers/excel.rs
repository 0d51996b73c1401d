//! `POST /api/excel/upload`

use super::RequestContext;
use crate::http::multipart::parse_upload;
use crate::http::response::{json, HttpResponse};
use crate::http::AppState;
use crate::{Error, Result};
use http::StatusCode;
use serde_json::json;

pub async fn upload(state: &AppState, ctx: RequestContext) -> Result<HttpResponse> {
    let form = parse_upload(ctx.content_type.as_deref(), ctx.body.clone()).await?;
    let file = form.file.ok_or_else(|| Error::invalid("No file part in the request"))?;

    let mapping_uuid = form
        .fields
        .get("mapping_uuid")
        .map(String::as_str)
        .or_else(|| ctx.query_param("mapping_uuid"))
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let report = state.pipeline.ingest_file(&file.filename, &file.bytes, mapping_uuid).await?;

    Ok(json(
        StatusCode::OK,
        &json!({
            "success": true,
            "message": "File uploaded successfully",
            "file_info": report.file_info,
            "summary": report.summary,
            "mapping": report.mapping,
        }),
    ))
}
