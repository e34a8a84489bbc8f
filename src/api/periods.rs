use actix_web::{HttpRequest, HttpResponse, Responder};
use chrono::Local;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::api::query_param;
use crate::model::period::{DEFAULT_CATALOG_MONTHS, PayPeriod, PeriodOption};

pub const PERIODS_PATH: &str = "/api/periodos";

/// Hard ceiling on how far back the catalog reaches (ten years).
const MAX_CATALOG_MONTHS: u32 = 120;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PeriodsQuery {
    /// Months to cover, newest first. Defaults to 6 when absent or unreadable.
    #[param(example = 6)]
    pub months: Option<u32>,
}

impl PeriodsQuery {
    fn from_request(req: &HttpRequest) -> Self {
        Self {
            months: query_param(req, "months").and_then(|raw| raw.trim().parse().ok()),
        }
    }

    pub fn effective_months(&self) -> u32 {
        self.months
            .unwrap_or(DEFAULT_CATALOG_MONTHS)
            .clamp(1, MAX_CATALOG_MONTHS)
    }
}

#[derive(Serialize, ToSchema)]
pub struct PeriodListResponse {
    pub data: Vec<PeriodOption>,
}

/// Pay periods an employee can ask for, as offered by the lookup form.
#[utoipa::path(
    get,
    path = "/api/periodos",
    params(PeriodsQuery),
    responses(
        (status = 200, description = "First and second half of each recent month", body = PeriodListResponse)
    ),
    tag = "Periods"
)]
pub async fn list_periods(req: HttpRequest) -> impl Responder {
    let months = PeriodsQuery::from_request(&req).effective_months();

    let data = PayPeriod::recent(Local::now().date_naive(), months)
        .into_iter()
        .map(PeriodOption::from)
        .collect();

    HttpResponse::Ok().json(PeriodListResponse { data })
}
