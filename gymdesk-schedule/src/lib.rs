pub mod applier;
pub mod booking;
pub mod conflicts;
pub mod error;
pub mod preview;
pub mod projection;

pub use applier::{ApplicationReport, ApplyOptions, BatchApplier, WeekError, WeekOutcome};
pub use conflicts::{check_conflicts, resolve_week, Booking, ConflictCheck, ConflictingWith};
pub use error::ScheduleError;
pub use preview::{preview_week, PreviewSummary, WeekPreview};
pub use projection::{project, CandidateReservation};

#[cfg(test)]
mod test_support;
