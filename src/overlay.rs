use crate::models::Student;
use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackedField {
    Attended,
    HwDone,
    PaidSession,
}

/// The timestamp and center written when attendance is marked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceStamp {
    pub last_attendance: String,
    pub center: String,
}

impl AttendanceStamp {
    /// Formats `DD/MM/YYYY in <center> at hh:mm AM|PM`.
    pub fn at(now: NaiveDateTime, center: &str) -> Self {
        let last_attendance = format!(
            "{} in {center} at {}",
            now.format("%d/%m/%Y"),
            now.format("%I:%M %p")
        );
        Self {
            last_attendance,
            center: center.to_string(),
        }
    }
}

/// Local values shown ahead of server confirmation. `None` defers to the
/// server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Overlay {
    pub attended: Option<bool>,
    pub hw_done: Option<bool>,
    pub paid_session: Option<bool>,
    pub stamp: Option<AttendanceStamp>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayedRecord {
    pub attended: bool,
    pub hw_done: bool,
    pub paid_session: bool,
    pub last_attendance: Option<String>,
    pub last_attendance_center: Option<String>,
    pub quiz_degree: Option<String>,
    /// Fields whose override still disagrees with the server.
    pub pending: Vec<TrackedField>,
}

impl Overlay {
    pub fn get(&self, field: TrackedField) -> Option<bool> {
        match field {
            TrackedField::Attended => self.attended,
            TrackedField::HwDone => self.hw_done,
            TrackedField::PaidSession => self.paid_session,
        }
    }

    pub fn set_override(&mut self, field: TrackedField, value: bool) {
        match field {
            TrackedField::Attended => {
                self.attended = Some(value);
                if !value {
                    self.stamp = None;
                }
            }
            TrackedField::HwDone => self.hw_done = Some(value),
            TrackedField::PaidSession => self.paid_session = Some(value),
        }
    }

    pub fn set_stamp(&mut self, stamp: AttendanceStamp) {
        self.stamp = Some(stamp);
    }

    pub fn merged_value(&self, field: TrackedField, server: bool) -> bool {
        self.get(field).unwrap_or(server)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Forces homework and payment down to `false`. Returns whether anything
    /// changed.
    pub fn cascade_attendance_false(&mut self) -> bool {
        let before = (self.hw_done, self.paid_session);
        self.hw_done = Some(false);
        self.paid_session = Some(false);
        before != (self.hw_done, self.paid_session)
    }

    pub fn display(&self, projected: &Student) -> DisplayedRecord {
        let server_attended = projected.attended_the_session.unwrap_or(false);
        let server_hw = projected.hw_done.unwrap_or(false);
        let server_paid = projected.paid_session.unwrap_or(false);

        let attended = self.merged_value(TrackedField::Attended, server_attended);
        let hw_done = attended && self.merged_value(TrackedField::HwDone, server_hw);
        let paid_session = attended && self.merged_value(TrackedField::PaidSession, server_paid);

        let (last_attendance, last_attendance_center) = match (&self.stamp, attended) {
            (_, false) => (None, None),
            (Some(stamp), true) => (
                Some(stamp.last_attendance.clone()),
                Some(stamp.center.clone()),
            ),
            (None, true) => (
                projected.last_attendance.clone(),
                projected.last_attendance_center.clone(),
            ),
        };

        let pending = [
            (TrackedField::Attended, server_attended),
            (TrackedField::HwDone, server_hw),
            (TrackedField::PaidSession, server_paid),
        ]
        .into_iter()
        .filter(|(field, server)| self.get(*field).is_some_and(|value| value != *server))
        .map(|(field, _)| field)
        .collect();

        DisplayedRecord {
            attended,
            hw_done,
            paid_session,
            last_attendance,
            last_attendance_center,
            quiz_degree: projected
                .quiz_degree
                .clone()
                .filter(|degree| !degree.trim().is_empty()),
            pending,
        }
    }
}
