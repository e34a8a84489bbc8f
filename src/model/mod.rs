pub mod employee;
pub mod payslip;
pub mod period;
