use chrono::NaiveDate;
use gymdesk_core::repository::ReservationRepository;
use gymdesk_core::WeeklyTemplate;
use gymdesk_shared::dates::monday_of;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::conflicts::resolve_week;
use crate::error::ScheduleError;
use crate::preview::load_week_reservations;
use crate::projection::{project, validate_template};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ApplyOptions {
    /// Create the free slots and drop the conflicting ones instead of
    /// abandoning the whole week.
    pub skip_conflicts: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeekOutcome {
    pub week: NaiveDate,
    pub created: usize,
    pub skipped: usize,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeekError {
    pub week: NaiveDate,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ApplicationReport {
    pub weeks_succeeded: usize,
    pub reservations_created: usize,
    pub conflicts_skipped: usize,
    pub errors: Vec<WeekError>,
    pub weeks: Vec<WeekOutcome>,
}

impl ApplicationReport {
    /// At least one week went through.
    pub fn is_success(&self) -> bool {
        self.weeks_succeeded > 0
    }

    fn record(&mut self, outcome: WeekOutcome) {
        self.reservations_created += outcome.created;
        self.conflicts_skipped += outcome.skipped;
        match &outcome.error {
            Some(message) => self.errors.push(WeekError {
                week: outcome.week,
                message: message.clone(),
            }),
            None => self.weeks_succeeded += 1,
        }
        self.weeks.push(outcome);
    }
}

/// Applies a template to a list of weeks, one week at a time.
///
/// Weeks are processed strictly in order so that each week's conflict check
/// sees the reservations created for the previous ones. A failing week never
/// rolls back or blocks the others.
pub struct BatchApplier<'a> {
    reservations: &'a dyn ReservationRepository,
}

impl<'a> BatchApplier<'a> {
    pub fn new(reservations: &'a dyn ReservationRepository) -> Self {
        Self { reservations }
    }

    pub async fn apply_to_weeks(
        &self,
        template: &WeeklyTemplate,
        weeks: &[NaiveDate],
        options: ApplyOptions,
    ) -> Result<ApplicationReport, ScheduleError> {
        if template.is_archived() {
            return Err(ScheduleError::TemplateArchived(template.id));
        }
        if template.slots.is_empty() {
            return Err(ScheduleError::EmptyTemplate(template.id));
        }
        if weeks.is_empty() {
            return Err(ScheduleError::NoWeeks);
        }
        validate_template(template)?;

        let mut targets: Vec<NaiveDate> = Vec::with_capacity(weeks.len());
        for week in weeks {
            let monday = monday_of(*week);
            if !targets.contains(&monday) {
                targets.push(monday);
            }
        }

        let mut report = ApplicationReport::default();
        for monday in targets {
            let outcome = self.apply_week(template, monday, options).await;
            report.record(outcome);
        }

        info!(
            "Template {} applied: {} week(s) ok, {} created, {} skipped, {} failed",
            template.id,
            report.weeks_succeeded,
            report.reservations_created,
            report.conflicts_skipped,
            report.errors.len()
        );

        Ok(report)
    }

    async fn apply_week(&self, template: &WeeklyTemplate, monday: NaiveDate, options: ApplyOptions) -> WeekOutcome {
        let failed = |message: String| WeekOutcome {
            week: monday,
            created: 0,
            skipped: 0,
            error: Some(message),
        };

        let candidates = match project(template, monday) {
            Ok(candidates) => candidates,
            Err(e) => return failed(e.to_string()),
        };

        let existing = match load_week_reservations(self.reservations, &template.trainer_ids(), monday).await {
            Ok(existing) => existing,
            Err(e) => {
                error!("Week {}: failed to load reservations: {}", monday, e);
                return failed(e.to_string());
            }
        };

        let checks = resolve_week(&candidates, &existing);
        let conflicts = checks.iter().filter(|c| c.conflict).count();

        if conflicts > 0 && !options.skip_conflicts {
            warn!("Week {}: {} conflicting slot(s), nothing created", monday, conflicts);
            return failed(format!("{conflicts} conflicting slot(s); week not applied"));
        }

        let mut created = 0;
        let mut skipped = conflicts;
        for check in checks.into_iter().filter(|c| !c.conflict) {
            let reservation = check.candidate.into_reservation(template.id);
            if let Err(e) = self.reservations.create_reservation(&reservation).await {
                let e = ScheduleError::from_write(e, &reservation);
                if options.skip_conflicts && matches!(e, ScheduleError::Conflict { .. }) {
                    warn!("Week {}: {} {} taken meanwhile, skipped", monday, reservation.date, reservation.start_time);
                    skipped += 1;
                    continue;
                }
                error!("Week {}: {}", monday, e);
                return WeekOutcome {
                    week: monday,
                    created,
                    skipped,
                    error: Some(e.to_string()),
                };
            }
            created += 1;
        }

        WeekOutcome {
            week: monday,
            created,
            skipped,
            error: None,
        }
    }
}
