pub mod accrual;
pub mod policy;
pub mod requests;
pub mod sessions;

pub use accrual::{compute_working_days, working_days_in_year, WorkingDays};
pub use policy::{check_balance, BalanceCheck, BalanceWarning, VacationPolicy, VacationUsage};
pub use requests::{open_request, VacationError};
pub use sessions::{chain_start, rolling_session_quota, session_quota, SessionQuotaInfo};
