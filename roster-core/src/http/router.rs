//! Route table.

use http::Method;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Health,
    Upload,
    ListMappings,
    UpdateMapping,
    ListEmployees,
    CreateEmployee,
    SearchEmployees,
    GetEmployee(String),
    UpdateEmployee(String),
    DeleteEmployee(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteError {
    NotFound,
    MethodNotAllowed,
}

pub fn resolve(method: &Method, path: &str) -> Result<Route, RouteError> {
    let path = path.trim_end_matches('/');
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let route = match (method, segments.as_slice()) {
        (&Method::GET, ["health"]) => Route::Health,
        (&Method::POST, ["api", "excel", "upload"]) => Route::Upload,
        (&Method::GET, ["api", "employee_column"]) => Route::ListMappings,
        (&Method::POST, ["api", "employee_column"]) => Route::UpdateMapping,
        (&Method::GET, ["api", "employee"]) => Route::ListEmployees,
        (&Method::POST, ["api", "employee"]) => Route::CreateEmployee,
        (&Method::GET, ["api", "employee", "search"]) => Route::SearchEmployees,
        (&Method::GET, ["api", "employee", id]) => Route::GetEmployee(id.to_string()),
        (&Method::PUT, ["api", "employee", id]) => Route::UpdateEmployee(id.to_string()),
        (&Method::DELETE, ["api", "employee", id]) => Route::DeleteEmployee(id.to_string()),
        (_, ["health"])
        | (_, ["api", "excel", "upload"])
        | (_, ["api", "employee_column"])
        | (_, ["api", "employee"])
        | (_, ["api", "employee", _]) => return Err(RouteError::MethodNotAllowed),
        _ => return Err(RouteError::NotFound),
    };
    Ok(route)
}
