//! Direct record management: CRUD, paginated listing and search.

use super::validation::{validate_employee, ColumnRule};
use super::{
    DEPARTMENT, EMAIL_ADDRESS, EMPLOYEE_COLLECTION, IS_PART_TIME, MANDATORY_FIELDS, NAME,
    PHONE_NUMBER, ROLE,
};
use crate::store::{Document, DocumentStore, Filter, FindOptions, ID_FIELD};
use crate::{Error, Result};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

pub const SEARCH_LIMIT: usize = 20;
const SEARCH_FIELDS: [&str; 4] = [NAME, EMAIL_ADDRESS, ROLE, DEPARTMENT];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: usize,
    pub limit: usize,
    pub department: Option<String>,
    pub role: Option<String>,
    pub is_part_time: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self { page: 1, limit: 10, department: None, role: None, is_part_time: None }
    }
}

impl ListQuery {
    fn filter(&self) -> Filter {
        let mut clauses = Vec::new();
        if let Some(department) = self.department.as_deref().filter(|s| !s.is_empty()) {
            clauses.push(Filter::contains(DEPARTMENT, department));
        }
        if let Some(role) = self.role.as_deref().filter(|s| !s.is_empty()) {
            clauses.push(Filter::contains(ROLE, role));
        }
        if let Some(flag) = self.is_part_time.as_deref().filter(|s| !s.is_empty()) {
            clauses.push(Filter::eq(IS_PART_TIME, flag));
        }
        match clauses.len() {
            0 => Filter::All,
            _ => Filter::And(clauses),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: u64,
    pub pages: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeePage {
    pub data: Vec<Document>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Updated(Document),
    NoChanges,
}

pub struct EmployeeService<S> {
    store: S,
    rules: Vec<ColumnRule>,
}

impl<S: DocumentStore> EmployeeService<S> {
    pub fn new(store: S, rules: Vec<ColumnRule>) -> Self {
        Self { store, rules }
    }

    pub async fn list(&self, query: &ListQuery) -> Result<EmployeePage> {
        if query.page == 0 || query.limit == 0 {
            return Err(Error::invalid("page and limit must be positive integers"));
        }
        let skip = (query.page - 1)
            .checked_mul(query.limit)
            .ok_or_else(|| Error::invalid("page and limit must be positive integers"))?;
        let filter = query.filter();
        let total = self.store.count(EMPLOYEE_COLLECTION, &filter).await?;
        let options = FindOptions { skip, limit: Some(query.limit) };
        let data = self.store.find(EMPLOYEE_COLLECTION, &filter, options).await?;
        let limit = query.limit as u64;

        Ok(EmployeePage {
            data,
            pagination: Pagination {
                page: query.page,
                limit: query.limit,
                total,
                pages: total.div_ceil(limit),
            },
        })
    }

    pub async fn get(&self, id: &str) -> Result<Document> {
        check_id(id)?;
        self.store
            .find_one(EMPLOYEE_COLLECTION, &Filter::by_id(id))
            .await?
            .ok_or_else(|| Error::NotFound("Employee not found".to_string()))
    }

    pub async fn create(&self, body: Document) -> Result<Document> {
        if body.is_empty() {
            return Err(Error::invalid("No data provided"));
        }
        let mut doc = canonicalize(body, true);
        doc.remove(ID_FIELD);
        validate_employee(&doc, &self.rules)?;

        let email = doc.get(EMAIL_ADDRESS).cloned().unwrap_or(Value::Null);
        let same_email = Filter::Eq(EMAIL_ADDRESS.into(), email);
        if self.store.find_one(EMPLOYEE_COLLECTION, &same_email).await?.is_some() {
            return Err(Error::Conflict("Employee with this email already exists".to_string()));
        }

        let now = Value::String(Utc::now().to_rfc3339());
        doc.insert("created_at".to_string(), now.clone());
        doc.insert("updated_at".to_string(), now);

        let id = self.store.insert_one(EMPLOYEE_COLLECTION, doc.clone()).await?;
        doc.insert(ID_FIELD.to_string(), Value::String(id.clone()));
        log::info!("Created employee {}", id);
        Ok(doc)
    }

    /// Partial update: only fields present in `body` are written.
    pub async fn update(&self, id: &str, body: Document) -> Result<UpdateOutcome> {
        if body.is_empty() {
            return Err(Error::invalid("No data provided"));
        }
        let existing = self.get(id).await?;

        let mut changes = canonicalize(body, false);
        changes.remove(ID_FIELD);
        changes.remove("created_at");
        changes.remove("updated_at");

        let mut merged = existing.clone();
        merged.extend(changes.clone());
        validate_employee(&merged, &self.rules)?;

        if let Some(email) = changes.get(EMAIL_ADDRESS) {
            let clash = Filter::And(vec![
                Filter::Eq(EMAIL_ADDRESS.into(), email.clone()),
                Filter::ne(ID_FIELD, id),
            ]);
            if self.store.find_one(EMPLOYEE_COLLECTION, &clash).await?.is_some() {
                return Err(Error::Conflict("Employee with this email already exists".to_string()));
            }
        }

        if changes.iter().all(|(k, v)| existing.get(k) == Some(v)) {
            return Ok(UpdateOutcome::NoChanges);
        }

        changes.insert("updated_at".to_string(), Value::String(Utc::now().to_rfc3339()));
        let result = self.store.update_one(EMPLOYEE_COLLECTION, &Filter::by_id(id), changes).await?;
        if result.matched == 0 {
            return Err(Error::NotFound("Employee not found".to_string()));
        }
        Ok(UpdateOutcome::Updated(self.get(id).await?))
    }

    pub async fn delete(&self, id: &str) -> Result<Document> {
        check_id(id)?;
        self.store
            .delete_one(EMPLOYEE_COLLECTION, &Filter::by_id(id))
            .await?
            .ok_or_else(|| Error::NotFound("Employee not found".to_string()))
    }

    /// Case-insensitive substring search over name, email, role and department.
    pub async fn search(&self, query: &str) -> Result<Vec<Document>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::invalid("Search query is required"));
        }
        let filter =
            Filter::Or(SEARCH_FIELDS.iter().map(|f| Filter::contains(*f, query)).collect());
        self.store.find(EMPLOYEE_COLLECTION, &filter, FindOptions::limit(SEARCH_LIMIT)).await
    }
}

fn check_id(id: &str) -> Result<()> {
    uuid::Uuid::parse_str(id).map(|_| ()).map_err(|_| Error::invalid("Invalid employee ID format"))
}

/// Canonical form of the mandatory fields; the part-time and probation flags
/// are kept as given. With `fill_missing`, absent
/// mandatory fields are added as `""` (phone as null).
pub fn canonicalize(mut body: Document, fill_missing: bool) -> Document {
    for field in MANDATORY_FIELDS {
        let value = match body.get(field) {
            Some(value) => canonical_value(field, value),
            None if fill_missing && field == PHONE_NUMBER => Value::Null,
            None if fill_missing => Value::String(String::new()),
            None => continue,
        };
        body.insert(field.to_string(), value);
    }
    body
}

fn canonical_value(field: &str, value: &Value) -> Value {
    let text = match value {
        Value::String(s) => Some(s.as_str()),
        _ => None,
    };
    match (field, text) {
        (EMAIL_ADDRESS, Some(s)) => Value::String(s.trim().to_lowercase()),
        (NAME, Some(s)) => Value::String(s.trim().to_uppercase()),
        (ROLE | DEPARTMENT, Some(s)) => Value::String(s.trim().to_string()),
        (PHONE_NUMBER, _) => canonical_phone(value),
        _ => value.clone(),
    }
}

/// Digits-only phone numbers become integers; anything else is dropped to null.
fn canonical_phone(value: &Value) -> Value {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => value.clone(),
        Value::String(s) => {
            let s = s.trim();
            if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
                s.parse::<i64>().map(Value::from).unwrap_or(Value::Null)
            } else {
                Value::Null
            }
        }
        _ => Value::Null,
    }
}
