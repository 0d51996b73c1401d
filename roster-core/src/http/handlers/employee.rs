//! `/api/employee` record management routes.

use super::RequestContext;
use crate::employee::{ListQuery, UpdateOutcome};
use crate::http::response::{json, HttpResponse};
use crate::http::AppState;
use crate::{Error, Result};
use http::StatusCode;
use serde_json::json;

pub async fn list(state: &AppState, ctx: RequestContext) -> Result<HttpResponse> {
    let defaults = ListQuery::default();
    let query = ListQuery {
        page: positive_param(&ctx, "page", defaults.page)?,
        limit: positive_param(&ctx, "limit", defaults.limit)?,
        department: ctx.query_param("department").map(str::to_string),
        role: ctx.query_param("role").map(str::to_string),
        is_part_time: ctx.query_param("is_part_time").map(str::to_string),
    };
    let page = state.employees.list(&query).await?;
    Ok(json(
        StatusCode::OK,
        &json!({"success": true, "data": page.data, "pagination": page.pagination}),
    ))
}

pub async fn get(state: &AppState, id: &str) -> Result<HttpResponse> {
    let doc = state.employees.get(id).await?;
    Ok(json(StatusCode::OK, &json!({"success": true, "data": doc})))
}

pub async fn create(state: &AppState, ctx: RequestContext) -> Result<HttpResponse> {
    let doc = state.employees.create(ctx.json_object()?).await?;
    Ok(json(
        StatusCode::CREATED,
        &json!({"success": true, "message": "Employee created successfully", "data": doc}),
    ))
}

pub async fn update(state: &AppState, id: &str, ctx: RequestContext) -> Result<HttpResponse> {
    match state.employees.update(id, ctx.json_object()?).await? {
        UpdateOutcome::Updated(doc) => Ok(json(
            StatusCode::OK,
            &json!({"success": true, "message": "Employee updated successfully", "data": doc}),
        )),
        UpdateOutcome::NoChanges => Ok(json(
            StatusCode::OK,
            &json!({"success": false, "message": "No changes made to employee"}),
        )),
    }
}

pub async fn delete(state: &AppState, id: &str) -> Result<HttpResponse> {
    let doc = state.employees.delete(id).await?;
    Ok(json(
        StatusCode::OK,
        &json!({"success": true, "message": "Employee deleted successfully", "data": doc}),
    ))
}

pub async fn search(state: &AppState, ctx: RequestContext) -> Result<HttpResponse> {
    let results = state.employees.search(ctx.query_param("q").unwrap_or_default()).await?;
    Ok(json(StatusCode::OK, &json!({"success": true, "count": results.len(), "data": results})))
}

fn positive_param(ctx: &RequestContext, key: &str, default: usize) -> Result<usize> {
    match ctx.query_param(key).map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(default),
        Some(raw) => match raw.parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(Error::invalid(format!("{} must be a positive integer", key))),
        },
    }
}
