use actix_web::{HttpRequest, HttpResponse, Responder, web};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

use crate::api::query_param;
use crate::error::{ApiError, query_config};
use crate::model::payslip::{NewPayslip, Payslip, PayslipEntry};
use crate::repository::PayslipRepository;

pub const DEFAULT_LIST_LIMIT: u32 = 50;

const SHORT_FIELD_MAX: usize = 64;
const LONG_FIELD_MAX: usize = 255;

/// Largest accepted create body.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Raw create payload. Every field is optional here so that a missing one is
/// reported as a validation error instead of a parse failure.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePayslip {
    #[schema(example = "1234567890")]
    pub citizen_id: Option<String>,
    #[schema(example = "Juan Pérez")]
    pub name: Option<String>,
    #[schema(example = "primera-2026-01")]
    pub period: Option<String>,
    #[schema(example = "Primera Quincena Enero 2026")]
    pub period_label: Option<String>,
    #[schema(example = "28/01/2026")]
    pub upload_date: Option<String>,
    #[schema(example = "desprendible_juan_q1_2026.pdf")]
    pub file_name: Option<String>,
    #[schema(example = 48213)]
    pub file_size: Option<i64>,
    #[schema(example = "Procesado")]
    pub status: Option<String>,
}

impl CreatePayslip {
    pub fn validate(self) -> Result<NewPayslip, ApiError> {
        let mut missing = Vec::new();

        let mut text = |value: Option<String>, field: &'static str| match value {
            Some(v) if !v.is_empty() => v,
            _ => {
                missing.push(field);
                String::new()
            }
        };

        let entry = PayslipEntry {
            citizen_id: text(self.citizen_id, "citizenId"),
            name: text(self.name, "name"),
            period: text(self.period, "period"),
            period_label: text(self.period_label, "periodLabel"),
            upload_date: text(self.upload_date, "uploadDate"),
            file_name: text(self.file_name, "fileName"),
            status: text(self.status, "status"),
        };
        let file_size = match self.file_size {
            Some(size) if size != 0 => size,
            _ => {
                missing.push("fileSize");
                0
            }
        };

        if !missing.is_empty() {
            // keep the payload order
            missing.sort_by_key(|f| FIELD_ORDER.iter().position(|o| o == f));
            return Err(ApiError::MissingFields(missing));
        }

        if file_size < 0 {
            return Err(ApiError::InvalidField {
                field: "fileSize",
                reason: "must be positive",
            });
        }

        for (field, value, max) in [
            ("citizenId", &entry.citizen_id, SHORT_FIELD_MAX),
            ("period", &entry.period, SHORT_FIELD_MAX),
            ("name", &entry.name, LONG_FIELD_MAX),
            ("periodLabel", &entry.period_label, LONG_FIELD_MAX),
            ("uploadDate", &entry.upload_date, LONG_FIELD_MAX),
            ("fileName", &entry.file_name, LONG_FIELD_MAX),
            ("status", &entry.status, LONG_FIELD_MAX),
        ] {
            if value.chars().count() > max {
                return Err(ApiError::InvalidField {
                    field,
                    reason: "too long",
                });
            }
        }

        Ok(NewPayslip { entry, file_size })
    }
}

const FIELD_ORDER: [&str; 8] = [
    "citizenId",
    "name",
    "period",
    "periodLabel",
    "uploadDate",
    "fileName",
    "fileSize",
    "status",
];

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Maximum rows to return. Absent or not a non-negative integer means 50.
    #[param(example = "50")]
    pub limit: Option<String>,
}

impl ListQuery {
    fn from_request(req: &HttpRequest) -> Self {
        Self {
            limit: query_param(req, "limit"),
        }
    }

    pub fn effective_limit(&self) -> u32 {
        self.limit
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .unwrap_or(DEFAULT_LIST_LIMIT)
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct LookupQuery {
    /// Period key, e.g. `primera-2026-01`.
    pub period: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct PayslipListResponse {
    pub data: Vec<Payslip>,
}

#[derive(Serialize, ToSchema)]
pub struct InsertResponse {
    #[schema(example = true)]
    pub inserted: bool,
}

/// Mount the endpoint on the enclosing scope (its path is the API path).
pub fn endpoint(cfg: &mut web::ServiceConfig) {
    cfg.app_data(query_config()).service(
        web::resource("")
            .route(web::get().to(list_payslips))
            .route(web::post().to(create_payslip))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/{citizen_id}")
            .route(web::get().to(lookup_payslips))
            .default_service(web::to(method_not_allowed)),
    );
}

#[utoipa::path(
    get,
    path = "/api/desprendibles",
    params(ListQuery),
    responses(
        (status = 200, description = "Newest payslips first", body = PayslipListResponse),
        (status = 500, description = "Storage failure", body = Object, example = json!({
            "error": "Failed to access the database"
        }))
    ),
    tag = "Payslips"
)]
pub async fn list_payslips(
    repo: web::Data<dyn PayslipRepository>,
    req: HttpRequest,
) -> Result<impl Responder, ApiError> {
    repo.ensure_schema().await?;

    let limit = ListQuery::from_request(&req).effective_limit();
    let data = repo.list_recent(limit).await?;
    debug!(limit, returned = data.len(), "Listed payslips");

    Ok(HttpResponse::Ok().json(PayslipListResponse { data }))
}

#[utoipa::path(
    post,
    path = "/api/desprendibles",
    request_body = CreatePayslip,
    responses(
        (status = 201, description = "Row created, or absorbed as a duplicate", body = InsertResponse),
        (status = 400, description = "Malformed JSON or missing field", body = Object, example = json!({
            "error": "Missing required fields: fileSize"
        })),
        (status = 413, description = "Body larger than 64 KiB", body = Object, example = json!({
            "error": "Request body too large"
        })),
        (status = 500, description = "Storage failure", body = Object, example = json!({
            "error": "Failed to access the database"
        }))
    ),
    tag = "Payslips"
)]
pub async fn create_payslip(
    repo: web::Data<dyn PayslipRepository>,
    mut payload: web::Payload,
) -> Result<impl Responder, ApiError> {
    repo.ensure_schema().await?;

    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|_| ApiError::InvalidJson)?;
        if body.len() + chunk.len() > MAX_BODY_BYTES {
            return Err(ApiError::PayloadTooLarge);
        }
        body.extend_from_slice(&chunk);
    }

    let payload: Value = serde_json::from_slice(&body).map_err(|_| ApiError::InvalidJson)?;
    if payload.is_null() {
        return Err(ApiError::InvalidJson);
    }
    // A JSON array or scalar carries none of the fields.
    let request: CreatePayslip = if payload.is_object() {
        serde_json::from_value(payload).map_err(|e| {
            debug!(error = %e, "Rejected payslip payload");
            ApiError::InvalidField {
                field: "body",
                reason: "fields have the wrong type",
            }
        })?
    } else {
        CreatePayslip::default()
    };
    let new = request.validate()?;

    let inserted = repo.insert_if_absent(&new).await?;
    debug!(
        citizen_id = %new.entry.citizen_id,
        period = %new.entry.period,
        inserted,
        "Create payslip"
    );

    Ok(HttpResponse::Created().json(InsertResponse { inserted }))
}

#[utoipa::path(
    get,
    path = "/api/desprendibles/{citizen_id}",
    params(
        ("citizen_id", description = "Employee citizen ID (cédula)"),
        LookupQuery
    ),
    responses(
        (status = 200, description = "The employee's payslips, or the one for `period`", body = Object),
        (status = 404, description = "Nothing stored for this employee or period", body = Object, example = json!({
            "error": "Period not found",
            "availablePeriods": ["Primera Quincena Enero 2026"]
        }))
    ),
    tag = "Payslips"
)]
pub async fn lookup_payslips(
    repo: web::Data<dyn PayslipRepository>,
    path: web::Path<String>,
    query: web::Query<LookupQuery>,
) -> Result<impl Responder, ApiError> {
    repo.ensure_schema().await?;

    let citizen_id = path.into_inner();
    let slips = repo.find_by_citizen(&citizen_id).await?;
    if slips.is_empty() {
        return Err(ApiError::NoPayslips);
    }

    let Some(period) = query.into_inner().period else {
        return Ok(HttpResponse::Ok().json(PayslipListResponse { data: slips }));
    };

    match slips.iter().find(|s| s.period == period) {
        Some(slip) => Ok(HttpResponse::Ok().json(json!({ "data": slip }))),
        None => Err(ApiError::PeriodNotFound {
            available: slips.into_iter().map(|s| s.period_label).collect(),
        }),
    }
}

pub async fn method_not_allowed() -> Result<HttpResponse, ApiError> {
    Err(ApiError::MethodNotAllowed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MemoryPayslipRepository, RepositoryError};
    use actix_web::{App, http::StatusCode, test as atest};
    use async_trait::async_trait;
    use std::sync::Arc;

    const PATH: &str = "/api/desprendibles";

    macro_rules! init_app {
        ($repo:expr) => {{
            let repo: Arc<dyn PayslipRepository> = $repo;
            atest::init_service(
                App::new()
                    .app_data(web::Data::from(repo))
                    .service(web::scope(PATH).configure(endpoint)),
            )
            .await
        }};
    }

    fn body(citizen_id: &str, period: &str) -> Value {
        json!({
            "citizenId": citizen_id,
            "name": "Juan Pérez",
            "period": period,
            "periodLabel": "Primera Quincena Enero 2026",
            "uploadDate": "28/01/2026",
            "fileName": "nomina.xlsx",
            "fileSize": 2048,
            "status": "Procesado"
        })
    }

    struct DownRepository;

    #[async_trait]
    impl PayslipRepository for DownRepository {
        async fn ensure_schema(&self) -> Result<(), RepositoryError> {
            Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn list_recent(&self, _: u32) -> Result<Vec<Payslip>, RepositoryError> {
            Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn insert_if_absent(&self, _: &NewPayslip) -> Result<bool, RepositoryError> {
            Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn find_by_citizen(&self, _: &str) -> Result<Vec<Payslip>, RepositoryError> {
            Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
        }
    }

    #[actix_web::test]
    async fn duplicate_post_reports_not_inserted() {
        let repo = Arc::new(MemoryPayslipRepository::new());
        let app = init_app!(repo.clone());

        let req = atest::TestRequest::post()
            .uri(PATH)
            .set_json(body("1234567890", "primera-2026-01"))
            .to_request();
        let resp = atest::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let first: Value = atest::read_body_json(resp).await;
        assert_eq!(first, json!({ "inserted": true }));

        let req = atest::TestRequest::post()
            .uri(PATH)
            .set_json(body("1234567890", "primera-2026-01"))
            .to_request();
        let resp = atest::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let second: Value = atest::read_body_json(resp).await;
        assert_eq!(second, json!({ "inserted": false }));

        assert_eq!(repo.len(), 1);
    }

    #[actix_web::test]
    async fn list_respects_limit_and_order() {
        let repo = Arc::new(MemoryPayslipRepository::new());
        let app = init_app!(repo.clone());

        for citizen_id in ["1", "2", "3"] {
            let req = atest::TestRequest::post()
                .uri(PATH)
                .set_json(body(citizen_id, "primera-2026-01"))
                .to_request();
            assert_eq!(atest::call_service(&app, req).await.status(), StatusCode::CREATED);
        }

        let req = atest::TestRequest::get()
            .uri(&format!("{PATH}?limit=2"))
            .to_request();
        let resp: Value = atest::call_and_read_body_json(&app, req).await;
        let ids: Vec<&str> = resp["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["citizenId"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["3", "2"]);
        assert!(resp["data"][0].get("id").is_none());
        assert!(resp["data"][0].get("createdAt").is_some());
    }

    #[actix_web::test]
    async fn list_defaults_to_fifty() {
        let repo = Arc::new(MemoryPayslipRepository::new());
        for i in 0..55 {
            let new = serde_json::from_value::<CreatePayslip>(body(&i.to_string(), "segunda-2026-01"))
                .unwrap()
                .validate()
                .unwrap();
            repo.insert_if_absent(&new).await.unwrap();
        }
        let app = init_app!(repo);

        for uri in [PATH.to_string(), format!("{PATH}?limit=abc"), format!("{PATH}?limit=-1")] {
            let req = atest::TestRequest::get().uri(&uri).to_request();
            let resp: Value = atest::call_and_read_body_json(&app, req).await;
            let data = resp["data"].as_array().unwrap();
            assert_eq!(data.len(), 50, "{uri}");
            assert_eq!(data[0]["citizenId"], "54");
        }
    }

    #[actix_web::test]
    async fn zero_limit_lists_nothing() {
        let repo = Arc::new(MemoryPayslipRepository::new());
        let app = init_app!(repo);

        let req = atest::TestRequest::post()
            .uri(PATH)
            .set_json(body("1", "primera-2026-01"))
            .to_request();
        assert_eq!(atest::call_service(&app, req).await.status(), StatusCode::CREATED);

        let req = atest::TestRequest::get()
            .uri(&format!("{PATH}?limit=0"))
            .to_request();
        let resp: Value = atest::call_and_read_body_json(&app, req).await;
        assert_eq!(resp, json!({ "data": [] }));
    }

    #[actix_web::test]
    async fn repeated_query_keys_never_fail_the_list() {
        let repo = Arc::new(MemoryPayslipRepository::new());
        let app = init_app!(repo);

        for citizen_id in ["1", "2"] {
            let req = atest::TestRequest::post()
                .uri(PATH)
                .set_json(body(citizen_id, "primera-2026-01"))
                .to_request();
            atest::call_service(&app, req).await;
        }

        for (uri, rows) in [
            (format!("{PATH}?limit=1&limit=2"), 1),
            (format!("{PATH}?limit=%ZZ"), 2),
            (format!("{PATH}?other=x&limit=1"), 1),
        ] {
            let req = atest::TestRequest::get().uri(&uri).to_request();
            let resp = atest::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK, "{uri}");
            let resp: Value = atest::read_body_json(resp).await;
            assert_eq!(resp["data"].as_array().unwrap().len(), rows, "{uri}");
        }
    }

    #[actix_web::test]
    async fn bad_lookup_query_is_a_json_400() {
        let app = init_app!(Arc::new(MemoryPayslipRepository::new()));

        let req = atest::TestRequest::get()
            .uri(&format!("{PATH}/1234567890?period=a&period=b"))
            .to_request();
        let resp = atest::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            resp.headers().get("content-type").unwrap(),
            "application/json"
        );
        let err: Value = atest::read_body_json(resp).await;
        assert_eq!(err, json!({ "error": "Invalid query string" }));
    }

    #[actix_web::test]
    async fn oversized_body_is_rejected_as_json() {
        let repo = Arc::new(MemoryPayslipRepository::new());
        let app = init_app!(repo.clone());

        let mut payload = body("1", "primera-2026-01");
        payload["padding"] = json!("x".repeat(MAX_BODY_BYTES));
        let req = atest::TestRequest::post().uri(PATH).set_json(payload).to_request();
        let resp = atest::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            resp.headers().get("content-type").unwrap(),
            "application/json"
        );
        let err: Value = atest::read_body_json(resp).await;
        assert_eq!(err, json!({ "error": "Request body too large" }));
        assert!(repo.is_empty());
    }

    #[actix_web::test]
    async fn missing_field_is_rejected_without_insert() {
        let repo = Arc::new(MemoryPayslipRepository::new());
        let app = init_app!(repo.clone());

        for field in FIELD_ORDER {
            let mut payload = body("1", "primera-2026-01");
            payload.as_object_mut().unwrap().remove(field);

            let req = atest::TestRequest::post().uri(PATH).set_json(payload).to_request();
            let resp = atest::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{field}");
            let err: Value = atest::read_body_json(resp).await;
            assert_eq!(err["error"], format!("Missing required fields: {field}"));
        }

        let mut payload = body("1", "primera-2026-01");
        payload["name"] = json!("");
        payload["fileSize"] = json!(0);
        let req = atest::TestRequest::post().uri(PATH).set_json(payload).to_request();
        let err: Value = atest::call_and_read_body_json(&app, req).await;
        assert_eq!(err["error"], "Missing required fields: name, fileSize");

        assert!(repo.is_empty());
    }

    #[actix_web::test]
    async fn malformed_bodies_are_bad_requests() {
        let repo = Arc::new(MemoryPayslipRepository::new());
        let app = init_app!(repo.clone());

        for (payload, expected) in [
            ("{not json", "Invalid JSON"),
            ("", "Invalid JSON"),
            ("null", "Invalid JSON"),
            ("[1, 2]", "Missing required fields: citizenId, name, period, periodLabel, uploadDate, fileName, fileSize, status"),
        ] {
            let req = atest::TestRequest::post()
                .uri(PATH)
                .insert_header(("content-type", "application/json"))
                .set_payload(payload)
                .to_request();
            let resp = atest::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{payload}");
            let err: Value = atest::read_body_json(resp).await;
            assert_eq!(err["error"], expected);
        }

        let mut wrong_type = body("1", "primera-2026-01");
        wrong_type["fileSize"] = json!("big");
        let req = atest::TestRequest::post().uri(PATH).set_json(wrong_type).to_request();
        assert_eq!(atest::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let mut negative = body("1", "primera-2026-01");
        negative["fileSize"] = json!(-5);
        let req = atest::TestRequest::post().uri(PATH).set_json(negative).to_request();
        assert_eq!(atest::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let mut long = body("1", "primera-2026-01");
        long["citizenId"] = json!("9".repeat(65));
        let req = atest::TestRequest::post().uri(PATH).set_json(long).to_request();
        assert_eq!(atest::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        assert!(repo.is_empty());
    }

    #[actix_web::test]
    async fn other_verbs_are_not_allowed() {
        let app = init_app!(Arc::new(MemoryPayslipRepository::new()));

        for req in [
            atest::TestRequest::put().uri(PATH).to_request(),
            atest::TestRequest::delete().uri(PATH).to_request(),
            atest::TestRequest::patch().uri(PATH).to_request(),
            atest::TestRequest::delete().uri(&format!("{PATH}/1234567890")).to_request(),
        ] {
            let resp = atest::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
            let err: Value = atest::read_body_json(resp).await;
            assert_eq!(err, json!({ "error": "Method not allowed" }));
        }
    }

    #[actix_web::test]
    async fn storage_failure_is_generic_500() {
        let app = init_app!(Arc::new(DownRepository));

        let requests = [
            atest::TestRequest::get().uri(PATH).to_request(),
            atest::TestRequest::post()
                .uri(PATH)
                .set_json(body("1", "primera-2026-01"))
                .to_request(),
        ];
        for req in requests {
            let resp = atest::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
            let err: Value = atest::read_body_json(resp).await;
            assert_eq!(err, json!({ "error": "Failed to access the database" }));
        }
    }

    #[actix_web::test]
    async fn employee_lookup() {
        let repo = Arc::new(MemoryPayslipRepository::new());
        let app = init_app!(repo);

        for period in ["primera-2026-01", "segunda-2026-01"] {
            let mut payload = body("1234567890", period);
            if period.starts_with("segunda") {
                payload["periodLabel"] = json!("Segunda Quincena Enero 2026");
            }
            let req = atest::TestRequest::post().uri(PATH).set_json(payload).to_request();
            atest::call_service(&app, req).await;
        }

        let req = atest::TestRequest::get()
            .uri(&format!("{PATH}/1234567890"))
            .to_request();
        let all: Value = atest::call_and_read_body_json(&app, req).await;
        assert_eq!(all["data"].as_array().unwrap().len(), 2);
        assert_eq!(all["data"][0]["period"], "segunda-2026-01");

        let req = atest::TestRequest::get()
            .uri(&format!("{PATH}/1234567890?period=primera-2026-01"))
            .to_request();
        let one: Value = atest::call_and_read_body_json(&app, req).await;
        assert_eq!(one["data"]["period"], "primera-2026-01");

        let req = atest::TestRequest::get()
            .uri(&format!("{PATH}/1234567890?period=primera-2026-02"))
            .to_request();
        let resp = atest::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let err: Value = atest::read_body_json(resp).await;
        assert_eq!(
            err["availablePeriods"],
            json!(["Segunda Quincena Enero 2026", "Primera Quincena Enero 2026"])
        );

        let req = atest::TestRequest::get().uri(&format!("{PATH}/000")).to_request();
        let resp = atest::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn limit_parsing() {
        let limit = |raw: Option<&str>| {
            ListQuery {
                limit: raw.map(str::to_string),
            }
            .effective_limit()
        };
        assert_eq!(limit(None), 50);
        assert_eq!(limit(Some("2")), 2);
        assert_eq!(limit(Some("500")), 500);
        assert_eq!(limit(Some("0")), 0);
        assert_eq!(limit(Some("-3")), 50);
        assert_eq!(limit(Some("2.5")), 50);
        assert_eq!(limit(Some("")), 50);
    }
}
