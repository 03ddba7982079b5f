pub mod dates;
pub mod models;

pub use dates::{local_date_stamp, monday_of, weeks_overlapping_month, DateError};
