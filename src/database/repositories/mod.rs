pub mod attendance;
pub mod deduction;
pub mod employee;
pub mod holiday;
pub mod leave;
pub mod overtime;
pub mod payroll;
pub mod statutory;
pub mod user;

pub use attendance::AttendanceRepository;
pub use deduction::DeductionRepository;
pub use employee::EmployeeRepository;
pub use holiday::HolidayRepository;
pub use leave::LeaveRepository;
pub use overtime::OvertimeRepository;
pub use payroll::PayrollRepository;
pub use statutory::StatutoryRepository;
pub use user::UserRepository;
