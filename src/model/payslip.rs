use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::employee::EmployeeDirectory;
use crate::model::period::{Half, PayPeriod, PeriodError};

/// Status stamped on slips created by an administrator upload.
pub const PROCESSED_STATUS: &str = "Procesado";

/// The seven core fields shared by both stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayslipEntry {
    #[schema(example = "1234567890")]
    pub citizen_id: String,
    #[schema(example = "Juan Pérez")]
    pub name: String,
    #[schema(example = "primera-2026-01")]
    pub period: String,
    #[schema(example = "Primera Quincena Enero 2026")]
    pub period_label: String,
    #[schema(example = "28/01/2026")]
    pub upload_date: String,
    #[schema(example = "desprendible_juan_q1_2026.pdf")]
    pub file_name: String,
    #[schema(example = "Procesado")]
    pub status: String,
}

/// Validated insert for the server store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPayslip {
    pub entry: PayslipEntry,
    pub file_size: i64,
}

/// A stored server-side slip. Everything except the surrogate key.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payslip {
    #[schema(example = "1234567890")]
    pub citizen_id: String,
    #[schema(example = "Juan Pérez")]
    pub name: String,
    #[schema(example = "primera-2026-01")]
    pub period: String,
    #[schema(example = "Primera Quincena Enero 2026")]
    pub period_label: String,
    #[schema(example = "28/01/2026")]
    pub upload_date: String,
    #[schema(example = "desprendible_juan_q1_2026.pdf")]
    pub file_name: String,
    #[schema(example = 48213)]
    pub file_size: i64,
    #[schema(example = "Procesado")]
    pub status: String,
    #[schema(example = "2026-01-28T14:03:11Z", value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

impl Payslip {
    pub fn from_new(new: &NewPayslip, created_at: DateTime<Utc>) -> Self {
        let entry = &new.entry;
        Self {
            citizen_id: entry.citizen_id.clone(),
            name: entry.name.clone(),
            period: entry.period.clone(),
            period_label: entry.period_label.clone(),
            upload_date: entry.upload_date.clone(),
            file_name: entry.file_name.clone(),
            file_size: new.file_size,
            status: entry.status.clone(),
            created_at,
        }
    }
}

/// What an administrator supplies when uploading one employee's slip.
#[derive(Debug, Clone)]
pub struct Upload {
    pub citizen_id: String,
    pub half: Half,
    pub year: i32,
    pub month: u32,
    pub file_name: String,
    pub file_size: i64,
}

impl Upload {
    /// Fill in name, period key/label, upload date and status.
    pub fn into_payslip(
        self,
        directory: &EmployeeDirectory,
        today: NaiveDate,
    ) -> Result<NewPayslip, PeriodError> {
        let period = PayPeriod::new(self.half, self.year, self.month)?;
        let name = directory.display_name(&self.citizen_id).to_string();

        Ok(NewPayslip {
            entry: PayslipEntry {
                citizen_id: self.citizen_id,
                name,
                period: period.key(),
                period_label: period.label(),
                upload_date: today.format("%d/%m/%Y").to_string(),
                file_name: self.file_name,
                status: PROCESSED_STATUS.to_string(),
            },
            file_size: self.file_size,
        })
    }
}
