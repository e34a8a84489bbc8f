use async_trait::async_trait;
use chrono::Utc;
use std::sync::RwLock;

use super::{PayslipRepository, RepositoryError};
use crate::model::payslip::{NewPayslip, Payslip};

/// Process-local store for offline runs and tests. Rows are kept in insertion
/// order; the write lock makes check-then-insert atomic.
#[derive(Default)]
pub struct MemoryPayslipRepository {
    rows: RwLock<Vec<Payslip>>,
}

impl MemoryPayslipRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.read().expect("payslip store poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PayslipRepository for MemoryPayslipRepository {
    async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<Payslip>, RepositoryError> {
        let rows = self.rows.read().expect("payslip store poisoned");
        Ok(rows.iter().rev().take(limit as usize).cloned().collect())
    }

    async fn insert_if_absent(&self, payslip: &NewPayslip) -> Result<bool, RepositoryError> {
        let mut rows = self.rows.write().expect("payslip store poisoned");

        let entry = &payslip.entry;
        let exists = rows
            .iter()
            .any(|r| r.citizen_id == entry.citizen_id && r.period == entry.period);
        if exists {
            return Ok(false);
        }

        rows.push(Payslip::from_new(payslip, Utc::now()));
        Ok(true)
    }

    async fn find_by_citizen(&self, citizen_id: &str) -> Result<Vec<Payslip>, RepositoryError> {
        let rows = self.rows.read().expect("payslip store poisoned");
        Ok(rows
            .iter()
            .rev()
            .filter(|r| r.citizen_id == citizen_id)
            .cloned()
            .collect())
    }
}
