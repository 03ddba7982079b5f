use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use gymdesk_shared::dates::{hhmm, monday_of};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::reservation::SessionType;
use crate::{CoreError, CoreResult};

/// Template lifecycle: Draft → Active → Applied, any of them → Archived.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TemplateState {
    Draft,
    Active,
    Applied,
    Archived,
}

impl TemplateState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateState::Draft => "draft",
            TemplateState::Active => "active",
            TemplateState::Applied => "applied",
            TemplateState::Archived => "archived",
        }
    }
}

impl fmt::Display for TemplateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateState {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(TemplateState::Draft),
            "active" => Ok(TemplateState::Active),
            "applied" => Ok(TemplateState::Applied),
            "archived" => Ok(TemplateState::Archived),
            other => Err(CoreError::ValidationError(format!("unknown template state '{other}'"))),
        }
    }
}

/// One recurring booking pattern inside a weekly template.
///
/// Nothing is validated on construction: weekday range and time order are
/// checked when the template is projected onto a real week.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SlotDefinition {
    pub trainer_id: Uuid,
    /// 1 = Monday .. 5 = Friday
    pub weekday: u8,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    /// `None` leaves the slot open for booking.
    #[serde(default)]
    pub client_id: Option<Uuid>,
    pub session_type: SessionType,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeeklyTemplate {
    pub id: Uuid,
    pub name: String,
    pub reference_week_start: NaiveDate,
    pub slots: Vec<SlotDefinition>,
    pub state: TemplateState,
    pub is_month_base: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WeeklyTemplate {
    pub fn new(name: String, reference_week: NaiveDate, slots: Vec<SlotDefinition>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            reference_week_start: monday_of(reference_week),
            slots,
            state: TemplateState::Draft,
            is_month_base: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Always stores the Monday of the given week.
    pub fn set_reference_week(&mut self, date: NaiveDate) {
        self.reference_week_start = monday_of(date);
        self.updated_at = Utc::now();
    }

    pub fn replace_slots(&mut self, slots: Vec<SlotDefinition>) -> CoreResult<()> {
        self.ensure_not_archived()?;
        self.slots = slots;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// (year, month) of the reference week, used for the month-base flag.
    pub fn reference_month(&self) -> (i32, u32) {
        (self.reference_week_start.year(), self.reference_week_start.month())
    }

    /// Distinct trainers in slot order.
    pub fn trainer_ids(&self) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = Vec::new();
        for slot in &self.slots {
            if !ids.contains(&slot.trainer_id) {
                ids.push(slot.trainer_id);
            }
        }
        ids
    }

    pub fn is_archived(&self) -> bool {
        self.state == TemplateState::Archived
    }

    pub fn ensure_not_archived(&self) -> CoreResult<()> {
        if self.is_archived() {
            return Err(CoreError::ValidationError(format!("template {} is archived", self.id)));
        }
        Ok(())
    }

    /// Transition: Draft → Active
    pub fn activate(&mut self) -> CoreResult<()> {
        if self.state != TemplateState::Draft {
            return Err(self.invalid(TemplateState::Active));
        }
        self.update_state(TemplateState::Active);
        Ok(())
    }

    /// Recorded after a batch application created at least one week.
    pub fn mark_applied(&mut self) -> CoreResult<()> {
        if self.is_archived() {
            return Err(self.invalid(TemplateState::Applied));
        }
        self.update_state(TemplateState::Applied);
        Ok(())
    }

    pub fn archive(&mut self) -> CoreResult<()> {
        if self.is_archived() {
            return Err(self.invalid(TemplateState::Archived));
        }
        self.is_month_base = false;
        self.update_state(TemplateState::Archived);
        Ok(())
    }

    pub fn set_month_base(&mut self, is_base: bool) -> CoreResult<()> {
        if is_base {
            self.ensure_not_archived()?;
        }
        self.is_month_base = is_base;
        self.updated_at = Utc::now();
        Ok(())
    }

    fn update_state(&mut self, state: TemplateState) {
        self.state = state;
        self.updated_at = Utc::now();
    }

    fn invalid(&self, to: TemplateState) -> CoreError {
        CoreError::InvalidTransition {
            from: self.state.to_string(),
            to: to.to_string(),
        }
    }
}
