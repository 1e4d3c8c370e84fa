use chrono::{NaiveTime, Timelike};
use itertools::Itertools;
use thiserror::Error;

use crate::model::{Schedule, ShiftType, MAX_SCHEDULES};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("At least one shift is required")]
    NoShift,
    #[error("At most two shifts are allowed")]
    TooManyShifts,
    #[error("The {0} shift is configured more than once")]
    DuplicateShift(ShiftType),
    #[error("The {0} shift has an invalid time; use HH:MM")]
    InvalidTime(ShiftType),
    #[error("The {0} shift must start before it ends")]
    EntryNotBeforeExit(ShiftType),
    #[error("The {shift} shift must fall between {start} and {end}")]
    OutsideWindow {
        shift: ShiftType,
        start: &'static str,
        end: &'static str,
    },
}

impl ScheduleError {
    /// Shift the violation is about, when there is one
    pub fn shift(&self) -> Option<ShiftType> {
        match self {
            ScheduleError::NoShift | ScheduleError::TooManyShifts => None,
            ScheduleError::DuplicateShift(shift)
            | ScheduleError::InvalidTime(shift)
            | ScheduleError::EntryNotBeforeExit(shift)
            | ScheduleError::OutsideWindow { shift, .. } => Some(*shift),
        }
    }
}

/// Minutes since midnight for "HH:MM" (seconds tolerated, as the backend echoes them)
pub fn minutes_since_midnight(value: &str) -> Option<u32> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
        .map(|t| t.hour() * 60 + t.minute())
}

pub struct ScheduleWindowValidator;

impl ScheduleWindowValidator {
    /// Check the shift list of one institution. Incomplete entries are
    /// skipped; the step-level required check reports those.
    pub fn validate(schedules: &[Schedule]) -> Result<(), ScheduleError> {
        let complete: Vec<(ShiftType, &Schedule)> = schedules
            .iter()
            .filter(|s| s.is_complete())
            .filter_map(|s| s.shift_type.map(|shift| (shift, s)))
            .collect();

        if complete.is_empty() {
            return Err(ScheduleError::NoShift);
        }
        if complete.len() > MAX_SCHEDULES {
            return Err(ScheduleError::TooManyShifts);
        }
        if let Some(shift) = complete.iter().map(|(shift, _)| *shift).duplicates().next() {
            return Err(ScheduleError::DuplicateShift(shift));
        }

        for (shift, schedule) in complete {
            Self::validate_window(shift, schedule)?;
        }

        Ok(())
    }

    fn validate_window(shift: ShiftType, schedule: &Schedule) -> Result<(), ScheduleError> {
        let entry = minutes_since_midnight(&schedule.entry_time)
            .ok_or(ScheduleError::InvalidTime(shift))?;
        let exit = minutes_since_midnight(&schedule.exit_time)
            .ok_or(ScheduleError::InvalidTime(shift))?;

        if entry >= exit {
            return Err(ScheduleError::EntryNotBeforeExit(shift));
        }

        let (start, end) = shift.window();
        if entry < start || exit > end || entry >= end {
            let (start, end) = shift.window_label();
            return Err(ScheduleError::OutsideWindow { shift, start, end });
        }

        Ok(())
    }
}
