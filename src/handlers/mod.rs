pub mod attendance;
pub mod auth;
pub mod contributions;
pub mod employees;
pub mod holidays;
pub mod overtime;
pub mod payroll;
pub mod rates;
pub mod shared;
