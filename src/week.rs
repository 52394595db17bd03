use crate::models::{Student, WeeklyRecord};

const WEEK_PREFIX: &str = "week ";

/// Parses a `"week N"` label into its 1-based number.
pub fn week_number(label: &str) -> Option<u32> {
    let digits = label.trim().strip_prefix(WEEK_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u32>().ok().filter(|number| *number >= 1)
}

/// Maps a 1-based week number onto an index into a `weeks` sequence of `len`.
pub fn week_index(number: u32, len: usize) -> Option<usize> {
    let index = usize::try_from(number).ok()?.checked_sub(1)?;
    (index < len).then_some(index)
}

pub fn week_record<'a>(student: &'a Student, label: Option<&str>) -> Option<&'a WeeklyRecord> {
    let number = week_number(label?)?;
    let index = week_index(number, student.weeks.len())?;
    student.weeks.get(index)
}

/// Copies `student` with its top-level attendance fields taken from the
/// selected week. Unknown or out-of-range weeks leave the student as fetched.
pub fn project(student: &Student, label: Option<&str>) -> Student {
    let mut projected = student.clone();
    if let Some(record) = week_record(student, label) {
        projected.attended_the_session = Some(record.attended);
        projected.last_attendance = record.last_attendance.clone();
        projected.last_attendance_center = record.last_attendance_center.clone();
        projected.hw_done = Some(record.hw_done);
        projected.paid_session = Some(record.paid_session);
        projected.quiz_degree = record.quiz_degree.clone();
    }
    projected
}
