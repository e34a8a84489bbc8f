use actix_web::{HttpRequest, web};

pub mod payslip;
pub mod periods;

/// First value of `name` in the query string. Repeated keys and undecodable
/// strings never fail the request; callers fall back to their defaults.
pub(crate) fn query_param(req: &HttpRequest, name: &str) -> Option<String> {
    web::Query::<Vec<(String, String)>>::from_query(req.query_string())
        .ok()?
        .into_inner()
        .into_iter()
        .find_map(|(key, value)| (key == name).then_some(value))
}
