use crate::api::payslip::{CreatePayslip, InsertResponse, PayslipListResponse};
use crate::api::periods::PeriodListResponse;
use crate::model::payslip::Payslip;
use crate::model::period::PeriodOption;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Desprendibles API",
        version = "1.0.0",
        description = r#"
## Payslip (desprendible de nómina) distribution

Employees look up their pay slip by citizen ID (cédula) and pay period
(quincena); administrators upload slip records for an employee and period.

### Key Features
- **Upload**: one record per citizen ID and period. A repeated upload is
  accepted but stores nothing and answers `{ "inserted": false }`.
- **Listing**: newest uploads first, 50 rows unless `limit` says otherwise.
- **Lookup**: an employee's slips, optionally narrowed to one period.
- **Periods**: the recent quincenas offered by the lookup form.

### Response Format
- Success bodies wrap results in `data`.
- Every error is `{ "error": "<message>" }`.
"#,
    ),
    paths(
        crate::api::payslip::list_payslips,
        crate::api::payslip::create_payslip,
        crate::api::payslip::lookup_payslips,
        crate::api::periods::list_periods
    ),
    components(
        schemas(
            CreatePayslip,
            InsertResponse,
            Payslip,
            PayslipListResponse,
            PeriodOption,
            PeriodListResponse
        )
    ),
    tags(
        (name = "Payslips", description = "Payslip upload and lookup APIs"),
        (name = "Periods", description = "Pay period catalog"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        assert!(paths.iter().any(|p| *p == "/api/desprendibles"));
        assert!(paths.iter().any(|p| *p == "/api/desprendibles/{citizen_id}"));
        assert!(paths.iter().any(|p| *p == "/api/periodos"));
    }
}
