pub mod billing;
pub mod bookstore;
pub mod dashboard;
pub mod payroll;
pub mod proration;
pub mod students;
