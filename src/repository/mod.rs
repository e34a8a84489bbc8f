//! Server-side payslip storage.
//!
//! Handlers only see [`PayslipRepository`]; the MySQL and in-memory
//! implementations share the same contract: `(citizen_id, period)` is unique,
//! a duplicate insert is absorbed and reported as `false`, and listings are
//! newest first.

use async_trait::async_trait;

use crate::model::payslip::{NewPayslip, Payslip};

pub mod memory;
pub mod mysql;

pub use memory::MemoryPayslipRepository;
pub use mysql::MySqlPayslipRepository;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait PayslipRepository: Send + Sync {
    /// Idempotent table creation. Runs before every request.
    async fn ensure_schema(&self) -> Result<(), RepositoryError>;

    /// At most `limit` slips ordered by creation time, newest first.
    async fn list_recent(&self, limit: u32) -> Result<Vec<Payslip>, RepositoryError>;

    /// Returns `true` if a row was created, `false` if `(citizen_id, period)`
    /// already existed.
    async fn insert_if_absent(&self, payslip: &NewPayslip) -> Result<bool, RepositoryError>;

    /// All slips of one employee, newest first.
    async fn find_by_citizen(&self, citizen_id: &str) -> Result<Vec<Payslip>, RepositoryError>;
}
