use async_trait::async_trait;
use sqlx::MySqlPool;
use tracing::{debug, info};

use super::{PayslipRepository, RepositoryError};
use crate::db::CREATE_PAYSLIPS_TABLE;
use crate::model::payslip::{NewPayslip, Payslip};

const SELECT_COLUMNS: &str = r#"
    SELECT citizen_id, name, period, period_label, upload_date,
           file_name, file_size, status, created_at
    FROM payslips
"#;

#[derive(Clone)]
pub struct MySqlPayslipRepository {
    pool: MySqlPool,
}

impl MySqlPayslipRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PayslipRepository for MySqlPayslipRepository {
    async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        sqlx::query(CREATE_PAYSLIPS_TABLE)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<Payslip>, RepositoryError> {
        let sql = format!("{SELECT_COLUMNS} ORDER BY created_at DESC, id DESC LIMIT ?");
        debug!(limit, "Listing payslips");

        let rows = sqlx::query_as::<_, Payslip>(&sql)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn insert_if_absent(&self, payslip: &NewPayslip) -> Result<bool, RepositoryError> {
        let entry = &payslip.entry;

        let result = sqlx::query(
            r#"
            INSERT INTO payslips
            (citizen_id, name, period, period_label, upload_date, file_name, file_size, status)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.citizen_id)
        .bind(&entry.name)
        .bind(&entry.period)
        .bind(&entry.period_label)
        .bind(&entry.upload_date)
        .bind(&entry.file_name)
        .bind(payslip.file_size)
        .bind(&entry.status)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => {
                info!(citizen_id = %entry.citizen_id, period = %entry.period, "Payslip stored");
                Ok(done.rows_affected() > 0)
            }
            Err(e) => {
                // Duplicate (citizen_id, period): the unique key settles races.
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.code().as_deref() == Some("23000") {
                        debug!(citizen_id = %entry.citizen_id, period = %entry.period, "Payslip already exists");
                        return Ok(false);
                    }
                }
                Err(e.into())
            }
        }
    }

    async fn find_by_citizen(&self, citizen_id: &str) -> Result<Vec<Payslip>, RepositoryError> {
        let sql = format!("{SELECT_COLUMNS} WHERE citizen_id = ? ORDER BY created_at DESC, id DESC");

        let rows = sqlx::query_as::<_, Payslip>(&sql)
            .bind(citizen_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
