//! The operator's scan session.
//!
//! Everything the page shows is derived from this one object: the selected
//! student and week, the last fetched baseline, the optimistic overlay and the
//! quiz input. Mutations are synchronous; network work happens elsewhere and
//! reports back through [`ScanSession::apply_fetch`].

use crate::gating::{self, Action, Gate, Permissions, Prerequisites, QuizEntry};
use crate::identifier::extract_student_id;
use crate::models::{
    AttendanceUpdate, EditRequest, HomeworkUpdate, PaymentUpdate, PendingEdit, QuizUpdate, Student,
};
use crate::overlay::{AttendanceStamp, DisplayedRecord, Overlay, TrackedField};
use crate::remote::ServiceError;
use crate::scanner::{ScanFilter, classify_decode_error};
use crate::storage::Preferences;
use crate::week::{project, week_number};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    Idle,
    Fetching,
    Settled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    InvalidScan,
    ScanDecode,
    Fetch,
    Blocked,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    raised_at: Instant,
}

#[derive(Debug, Clone, Serialize)]
pub struct NoticeView {
    pub kind: NoticeKind,
    pub message: String,
}

/// Issued when a fetch starts; the response is only applied if the ticket is
/// still current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub seq: u64,
    pub epoch: u64,
    pub student_id: String,
    pub token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    Failed,
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Repeated,
    Selected(String),
    Invalid,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentSummary {
    pub id: String,
    pub name: String,
    pub grade: Option<String>,
    pub main_center: Option<String>,
    pub school: Option<String>,
}

/// Snapshot handed to the page and the JSON API.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub student_input: String,
    pub selected_id: Option<String>,
    pub center: Option<String>,
    pub week: Option<String>,
    pub phase: SyncPhase,
    pub student: Option<StudentSummary>,
    pub displayed: Option<DisplayedRecord>,
    pub permissions: Permissions,
    pub quiz: QuizEntry,
    pub overlay: Overlay,
    pub notice: Option<NoticeView>,
}

/// What an allowed edit needs from the session.
struct Permitted {
    displayed: DisplayedRecord,
    week: u32,
    center: String,
}

#[derive(Debug)]
pub struct ScanSession {
    student_input: String,
    selected_id: Option<String>,
    center: Option<String>,
    week: Option<String>,
    credential: Option<String>,
    baseline: Option<Student>,
    overlay: Overlay,
    quiz: QuizEntry,
    scan_filter: ScanFilter,
    notice: Option<Notice>,
    notice_ttl: Duration,
    phase: SyncPhase,
    epoch: u64,
    next_seq: u64,
    applied_seq: u64,
}

impl ScanSession {
    pub fn new(preferences: &Preferences, notice_ttl: Duration) -> Self {
        Self {
            student_input: String::new(),
            selected_id: None,
            center: non_empty(preferences.last_attendance_center.clone()),
            week: non_empty(preferences.last_selected_week.clone()),
            credential: None,
            baseline: None,
            overlay: Overlay::default(),
            quiz: QuizEntry::default(),
            scan_filter: ScanFilter::default(),
            notice: None,
            notice_ttl,
            phase: SyncPhase::Idle,
            epoch: 0,
            next_seq: 0,
            applied_seq: 0,
        }
    }

    pub fn set_credential(&mut self, token: &str) {
        if self.credential.as_deref() != Some(token) {
            self.credential = Some(token.to_string());
        }
    }

    pub fn preferences(&self) -> Preferences {
        Preferences {
            last_attendance_center: self.center.clone(),
            last_selected_week: self.week.clone(),
        }
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn quiz(&self) -> &QuizEntry {
        &self.quiz
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    pub fn baseline(&self) -> Option<&Student> {
        self.baseline.as_ref()
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    /// Tracks the identifier text box. A changed value clears any notice and
    /// lets the same code be scanned again.
    pub fn type_identifier(&mut self, text: &str) {
        if self.student_input != text {
            self.student_input = text.to_string();
            self.notice = None;
            self.scan_filter.forget();
        }
    }

    /// Submits the typed identifier. Returns whether a fetch should start.
    pub fn submit_search(&mut self) -> bool {
        let id = self.student_input.trim().to_string();
        if id.is_empty() {
            return false;
        }
        self.select_student(&id);
        true
    }

    pub fn handle_scan(&mut self, text: &str, now: Instant) -> ScanOutcome {
        if !self.scan_filter.admit(text) {
            return ScanOutcome::Repeated;
        }
        self.notice = None;
        match extract_student_id(text) {
            Some(id) => {
                self.student_input = id.clone();
                self.select_student(&id);
                ScanOutcome::Selected(id)
            }
            None => {
                self.raise(
                    NoticeKind::InvalidScan,
                    "Invalid QR code: not a valid student ID",
                    now,
                );
                ScanOutcome::Invalid
            }
        }
    }

    pub fn handle_scan_error(&mut self, payload: &serde_json::Value, now: Instant) {
        if let Some(failure) = classify_decode_error(payload) {
            self.raise(NoticeKind::ScanDecode, failure.message(), now);
        }
    }

    fn select_student(&mut self, id: &str) {
        if self.selected_id.as_deref() == Some(id) {
            return;
        }
        self.selected_id = Some(id.to_string());
        self.baseline = None;
        self.phase = SyncPhase::Fetching;
        self.change_selection();
    }

    /// Returns whether the week actually changed.
    pub fn select_week(&mut self, week: Option<String>) -> bool {
        let week = non_empty(week);
        if self.week == week {
            return false;
        }
        self.week = week;
        self.change_selection();
        true
    }

    /// Returns whether the center actually changed. The overlay is scoped to
    /// student and week, so it survives a center change.
    pub fn select_center(&mut self, center: Option<String>) -> bool {
        let center = non_empty(center);
        if self.center == center {
            return false;
        }
        self.center = center;
        true
    }

    fn change_selection(&mut self) {
        self.epoch += 1;
        self.overlay.reset();
        self.quiz.clear();
        debug!(epoch = self.epoch, "selection changed");
    }

    pub fn set_quiz_input(&mut self, score: Option<String>, out_of: Option<String>) {
        if let Some(score) = score {
            self.quiz.score = score;
        }
        if let Some(out_of) = out_of {
            self.quiz.out_of = out_of;
        }
        self.reconcile();
    }

    pub fn begin_fetch(&mut self) -> Option<FetchTicket> {
        let student_id = self.selected_id.clone()?;
        let token = self.credential.clone()?;
        self.next_seq += 1;
        self.phase = SyncPhase::Fetching;
        debug!(seq = self.next_seq, %student_id, "fetch issued");
        Some(FetchTicket {
            seq: self.next_seq,
            epoch: self.epoch,
            student_id,
            token,
        })
    }

    /// Applies a fetch response unless the selection moved on or a newer
    /// response already landed. The overlay is left alone either way.
    pub fn apply_fetch(
        &mut self,
        ticket: &FetchTicket,
        result: Result<Student, ServiceError>,
        now: Instant,
    ) -> FetchOutcome {
        if ticket.epoch != self.epoch
            || ticket.seq <= self.applied_seq
            || self.selected_id.as_deref() != Some(ticket.student_id.as_str())
        {
            debug!(seq = ticket.seq, applied = self.applied_seq, "discarding stale fetch");
            return FetchOutcome::Stale;
        }
        self.applied_seq = ticket.seq;
        self.phase = SyncPhase::Settled;

        match result {
            Ok(student) => {
                self.baseline = Some(student);
                self.reconcile();
                debug!(seq = ticket.seq, "fetch applied");
                FetchOutcome::Applied
            }
            Err(err) => {
                self.raise(NoticeKind::Fetch, err.notice(), now);
                FetchOutcome::Failed
            }
        }
    }

    pub fn displayed(&self) -> Option<DisplayedRecord> {
        let baseline = self.baseline.as_ref()?;
        let projected = project(baseline, self.week.as_deref());
        Some(self.overlay.display(&projected))
    }

    pub fn prerequisites(&self) -> Prerequisites {
        Prerequisites {
            week_selected: self.selected_week_number().is_some(),
            center_selected: self.center.is_some(),
        }
    }

    pub fn permissions(&self) -> Permissions {
        gating::permissions(self.displayed().as_ref(), self.prerequisites(), &self.quiz)
    }

    pub fn toggle_attendance(
        &mut self,
        now: NaiveDateTime,
        clock: Instant,
    ) -> Result<PendingEdit, Gate> {
        let Permitted {
            displayed,
            week,
            center,
        } = self.gate(Action::Attendance, clock)?;
        let attended = !displayed.attended;
        self.overlay.set_override(TrackedField::Attended, attended);

        let update = if attended {
            let stamp = AttendanceStamp::at(now, &center);
            let update = AttendanceUpdate {
                attended: true,
                last_attendance: Some(stamp.last_attendance.clone()),
                last_attendance_center: Some(center),
                attendance_week: week,
            };
            self.overlay.set_stamp(stamp);
            update
        } else {
            AttendanceUpdate {
                attended: false,
                last_attendance: None,
                last_attendance_center: None,
                attendance_week: week,
            }
        };
        self.reconcile();
        self.pending_edit(EditRequest::Attendance(update))
    }

    pub fn toggle_homework(&mut self, clock: Instant) -> Result<PendingEdit, Gate> {
        let Permitted { displayed, week, .. } = self.gate(Action::Homework, clock)?;
        let hw_done = !displayed.hw_done;
        self.overlay.set_override(TrackedField::HwDone, hw_done);
        self.pending_edit(EditRequest::Homework(HomeworkUpdate { hw_done, week }))
    }

    pub fn toggle_payment(&mut self, clock: Instant) -> Result<PendingEdit, Gate> {
        let Permitted { displayed, week, .. } = self.gate(Action::Payment, clock)?;
        let paid_session = !displayed.paid_session;
        self.overlay.set_override(TrackedField::PaidSession, paid_session);
        self.pending_edit(EditRequest::Payment(PaymentUpdate { paid_session, week }))
    }

    /// Sends the typed quiz score and clears the inputs.
    pub fn submit_quiz(&mut self, clock: Instant) -> Result<PendingEdit, Gate> {
        let Permitted { week, .. } = self.gate(Action::Quiz, clock)?;
        let quiz_degree = self.quiz.degree().ok_or(Gate::NeedsQuizInput)?;
        self.quiz.clear();
        self.pending_edit(EditRequest::Quiz(QuizUpdate { quiz_degree, week }))
    }

    /// Checks `action` against the current state. When allowed, returns the
    /// displayed record with the selected week number and center.
    fn gate(&mut self, action: Action, clock: Instant) -> Result<Permitted, Gate> {
        let displayed = self.displayed();
        let selection = self.selected_week_number().zip(self.center.clone());
        let gate = gating::evaluate(action, displayed.as_ref(), self.prerequisites(), &self.quiz);
        match (gate, displayed, selection) {
            (Gate::Allowed, Some(displayed), Some((week, center))) => Ok(Permitted {
                displayed,
                week,
                center,
            }),
            (gate, _, _) => {
                if let Some(message) = gate.message(action) {
                    self.raise(NoticeKind::Blocked, message, clock);
                }
                Err(gate)
            }
        }
    }

    fn pending_edit(&self, request: EditRequest) -> Result<PendingEdit, Gate> {
        let (Some(student), Some(token)) = (self.baseline.as_ref(), self.credential.clone()) else {
            return Err(Gate::NoStudent);
        };
        Ok(PendingEdit {
            student_id: student.id.clone(),
            token,
            request,
        })
    }

    /// Re-applies the attendance cascade against the current merged state.
    fn reconcile(&mut self) {
        let Some(displayed) = self.displayed() else {
            return;
        };
        if !displayed.attended {
            self.overlay.cascade_attendance_false();
            self.quiz.clear();
        }
    }

    fn selected_week_number(&self) -> Option<u32> {
        self.week.as_deref().and_then(week_number)
    }

    fn raise(&mut self, kind: NoticeKind, message: &str, now: Instant) {
        self.notice = Some(Notice {
            kind,
            message: message.to_string(),
            raised_at: now,
        });
    }

    pub fn active_notice(&self, now: Instant) -> Option<&Notice> {
        self.notice
            .as_ref()
            .filter(|notice| now.saturating_duration_since(notice.raised_at) < self.notice_ttl)
    }

    pub fn view(&self, now: Instant) -> SessionView {
        let displayed = self.displayed();
        SessionView {
            student_input: self.student_input.clone(),
            selected_id: self.selected_id.clone(),
            center: self.center.clone(),
            week: self.week.clone(),
            phase: self.phase,
            student: self.baseline.as_ref().map(|student| StudentSummary {
                id: student.id.clone(),
                name: student.name.clone(),
                grade: student.grade.clone(),
                main_center: student.main_center.clone(),
                school: student.school.clone(),
            }),
            permissions: gating::permissions(displayed.as_ref(), self.prerequisites(), &self.quiz),
            displayed,
            quiz: self.quiz.clone(),
            overlay: self.overlay.clone(),
            notice: self.active_notice(now).map(|notice| NoticeView {
                kind: notice.kind,
                message: notice.message.clone(),
            }),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WeeklyRecord;
    use chrono::NaiveDate;

    const TTL: Duration = Duration::from_secs(5);

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(12, 7, 0)
            .unwrap()
    }

    fn student(id: &str, weeks: Vec<WeeklyRecord>) -> Student {
        Student {
            id: id.to_string(),
            name: format!("Student {id}"),
            weeks,
            ..Student::default()
        }
    }

    fn absent_week() -> WeeklyRecord {
        WeeklyRecord::default()
    }

    fn attended_week() -> WeeklyRecord {
        WeeklyRecord {
            attended: true,
            last_attendance: Some("01/10/2026 in Maadi at 10:00 AM".to_string()),
            last_attendance_center: Some("Maadi".to_string()),
            hw_done: true,
            paid_session: true,
            quiz_degree: Some("9 / 10".to_string()),
        }
    }

    /// Session with student `id` loaded, week 3 and Maadi selected.
    fn loaded(id: &str, weeks: Vec<WeeklyRecord>) -> (ScanSession, Instant) {
        let now = Instant::now();
        let preferences = Preferences {
            last_attendance_center: Some("Maadi".to_string()),
            last_selected_week: Some("week 3".to_string()),
        };
        let mut session = ScanSession::new(&preferences, TTL);
        session.set_credential("token");
        session.type_identifier(id);
        assert!(session.submit_search());
        let ticket = session.begin_fetch().expect("ticket");
        assert_eq!(
            session.apply_fetch(&ticket, Ok(student(id, weeks)), now),
            FetchOutcome::Applied
        );
        (session, now)
    }

    fn three_weeks(third: WeeklyRecord) -> Vec<WeeklyRecord> {
        vec![attended_week(), attended_week(), third]
    }

    fn stamp_matches(stamp: &str, center: &str) -> bool {
        let Some((date, rest)) = stamp.split_once(&format!(" in {center} at ")) else {
            return false;
        };
        let date_ok = date.len() == 10
            && date
                .char_indices()
                .all(|(index, ch)| if index == 2 || index == 5 { ch == '/' } else { ch.is_ascii_digit() });
        let Some((clock, meridiem)) = rest.split_once(' ') else {
            return false;
        };
        let clock_ok = clock.len() == 5
            && clock
                .char_indices()
                .all(|(index, ch)| if index == 2 { ch == ':' } else { ch.is_ascii_digit() });
        date_ok && clock_ok && (meridiem == "AM" || meridiem == "PM")
    }

    #[test]
    fn marking_attendance_unlocks_homework_immediately() {
        let (mut session, now) = loaded("7", three_weeks(absent_week()));
        assert_eq!(session.permissions().homework, Gate::MustAttendFirst);

        let edit = session.toggle_attendance(noon(), now).expect("attendance edit");
        assert_eq!(session.overlay().attended, Some(true));

        let displayed = session.displayed().unwrap();
        assert!(displayed.attended);
        let stamp = displayed.last_attendance.expect("stamp");
        assert!(stamp_matches(&stamp, "Maadi"), "{stamp}");
        assert_eq!(stamp, "19/10/2026 in Maadi at 12:07 PM");
        assert_eq!(session.permissions().homework, Gate::Allowed);

        assert_eq!(edit.student_id, "7");
        assert_eq!(
            edit.request,
            EditRequest::Attendance(AttendanceUpdate {
                attended: true,
                last_attendance: Some(stamp),
                last_attendance_center: Some("Maadi".to_string()),
                attendance_week: 3,
            })
        );
    }

    #[test]
    fn unmarking_attendance_clears_stamp_and_cascades() {
        let (mut session, now) = loaded("7", three_weeks(attended_week()));
        session.set_quiz_input(Some("4".to_string()), Some("5".to_string()));

        let edit = session.toggle_attendance(noon(), now).expect("edit");
        assert_eq!(
            edit.request,
            EditRequest::Attendance(AttendanceUpdate {
                attended: false,
                last_attendance: None,
                last_attendance_center: None,
                attendance_week: 3,
            })
        );

        let displayed = session.displayed().unwrap();
        assert!(!displayed.attended);
        assert!(!displayed.hw_done);
        assert!(!displayed.paid_session);
        assert_eq!(session.overlay().hw_done, Some(false));
        assert_eq!(session.overlay().paid_session, Some(false));
        assert!(session.quiz().is_empty());
    }

    #[test]
    fn quiz_submission_builds_degree_payload() {
        let (mut session, now) = loaded("7", three_weeks(attended_week()));
        session.set_quiz_input(Some("8".to_string()), Some("10".to_string()));

        let edit = session.submit_quiz(now).expect("quiz edit");
        assert_eq!(
            edit.request,
            EditRequest::Quiz(QuizUpdate {
                quiz_degree: "8 / 10".to_string(),
                week: 3,
            })
        );
        assert!(session.quiz().is_empty());
    }

    #[test]
    fn quiz_input_is_dropped_while_not_attended() {
        let (mut session, now) = loaded("7", three_weeks(absent_week()));
        session.set_quiz_input(Some("8".to_string()), Some("10".to_string()));
        assert!(session.quiz().is_empty());
        assert_eq!(session.submit_quiz(now), Err(Gate::MustAttendFirst));
    }

    #[test]
    fn blocked_homework_raises_notice() {
        let (mut session, now) = loaded("7", three_weeks(absent_week()));
        assert_eq!(session.toggle_homework(now), Err(Gate::MustAttendFirst));
        let notice = session.active_notice(now).expect("notice");
        assert_eq!(notice.kind, NoticeKind::Blocked);
        assert!(notice.message.contains("homework"));
        assert!(session.active_notice(now + TTL).is_none());
    }

    #[test]
    fn missing_center_blocks_attendance() {
        let (mut session, now) = loaded("7", three_weeks(absent_week()));
        assert!(session.select_center(None));
        assert_eq!(
            session.toggle_attendance(noon(), now),
            Err(Gate::SelectWeekAndCenter)
        );
        assert_eq!(session.overlay().attended, None);
    }

    #[test]
    fn unparsable_week_blocks_edits_with_one_notice() {
        let (mut session, now) = loaded("7", three_weeks(attended_week()));
        assert!(session.select_week(Some("week x".to_string())));
        assert_eq!(session.toggle_payment(now), Err(Gate::SelectWeekAndCenter));
        assert_eq!(session.overlay().paid_session, None);

        let notice = session.active_notice(now).expect("notice");
        assert_eq!(notice.kind, NoticeKind::Blocked);
        assert_eq!(
            Some(notice.message.as_str()),
            Gate::SelectWeekAndCenter.message(Action::Payment)
        );
    }

    #[test]
    fn toggles_invert_merged_values() {
        let (mut session, now) = loaded("7", three_weeks(attended_week()));
        let edit = session.toggle_homework(now).unwrap();
        assert_eq!(
            edit.request,
            EditRequest::Homework(HomeworkUpdate {
                hw_done: false,
                week: 3
            })
        );
        let edit = session.toggle_homework(now).unwrap();
        assert_eq!(
            edit.request,
            EditRequest::Homework(HomeworkUpdate {
                hw_done: true,
                week: 3
            })
        );
        let edit = session.toggle_payment(now).unwrap();
        assert_eq!(
            edit.request,
            EditRequest::Payment(PaymentUpdate {
                paid_session: false,
                week: 3
            })
        );
        assert!(!session.displayed().unwrap().paid_session);
    }

    #[test]
    fn week_change_resets_overlay_and_quiz() {
        let (mut session, now) = loaded("7", three_weeks(attended_week()));
        session.toggle_homework(now).unwrap();
        session.set_quiz_input(Some("3".to_string()), None);

        assert!(session.select_week(Some("week 2".to_string())));
        assert!(session.overlay().is_empty());
        assert!(session.quiz().is_empty());
        assert!(!session.select_week(Some("week 2".to_string())));
    }

    #[test]
    fn student_change_resets_overlay_and_baseline() {
        let (mut session, now) = loaded("7", three_weeks(attended_week()));
        session.toggle_payment(now).unwrap();

        session.type_identifier("8");
        assert!(session.submit_search());
        assert!(session.overlay().is_empty());
        assert!(session.baseline().is_none());
        assert_eq!(session.phase(), SyncPhase::Fetching);
    }

    #[test]
    fn fetch_from_previous_selection_is_discarded() {
        let (mut session, now) = loaded("7", three_weeks(attended_week()));
        let old = session.begin_fetch().unwrap();

        session.type_identifier("8");
        session.submit_search();
        let outcome = session.apply_fetch(&old, Ok(student("7", three_weeks(absent_week()))), now);

        assert_eq!(outcome, FetchOutcome::Stale);
        assert!(session.baseline().is_none());
        assert!(session.overlay().is_empty());
    }

    #[test]
    fn older_response_cannot_overwrite_newer() {
        let (mut session, now) = loaded("7", three_weeks(absent_week()));
        let first = session.begin_fetch().unwrap();
        let second = session.begin_fetch().unwrap();

        let newer = student("7", three_weeks(attended_week()));
        assert_eq!(session.apply_fetch(&second, Ok(newer.clone()), now), FetchOutcome::Applied);
        assert_eq!(
            session.apply_fetch(&first, Ok(student("7", three_weeks(absent_week()))), now),
            FetchOutcome::Stale
        );
        assert_eq!(session.baseline(), Some(&newer));
    }

    #[test]
    fn refetch_keeps_overlay_precedence() {
        let (mut session, now) = loaded("7", three_weeks(absent_week()));
        session.toggle_attendance(noon(), now).unwrap();

        let ticket = session.begin_fetch().unwrap();
        session.apply_fetch(&ticket, Ok(student("7", three_weeks(absent_week()))), now);

        assert!(session.displayed().unwrap().attended);
        assert_eq!(session.overlay().attended, Some(true));
    }

    #[test]
    fn failed_fetch_keeps_displayed_record() {
        let (mut session, now) = loaded("7", three_weeks(attended_week()));
        let before = session.displayed();
        let ticket = session.begin_fetch().unwrap();

        let outcome = session.apply_fetch(&ticket, Err(ServiceError::Unauthorized), now);
        assert_eq!(outcome, FetchOutcome::Failed);
        assert_eq!(session.displayed(), before);
        assert_eq!(
            session.active_notice(now).map(|notice| notice.message.as_str()),
            Some("Student not found or unauthorized.")
        );
    }

    #[test]
    fn server_absence_cascades_without_overrides() {
        let (session, _) = loaded("7", three_weeks(WeeklyRecord {
            attended: false,
            hw_done: true,
            paid_session: true,
            ..WeeklyRecord::default()
        }));
        let displayed = session.displayed().unwrap();
        assert!(!displayed.hw_done);
        assert!(!displayed.paid_session);
    }

    #[test]
    fn scans_select_or_warn() {
        let now = Instant::now();
        let mut session = ScanSession::new(&Preferences::default(), TTL);

        assert_eq!(
            session.handle_scan("https://x.test/?id=42", now),
            ScanOutcome::Selected("42".to_string())
        );
        assert_eq!(session.selected_id(), Some("42"));
        assert_eq!(session.handle_scan("https://x.test/?id=42", now), ScanOutcome::Repeated);

        assert_eq!(session.handle_scan("007", now), ScanOutcome::Selected("007".to_string()));
        assert_eq!(session.handle_scan("abc", now), ScanOutcome::Invalid);
        let notice = session.active_notice(now).expect("notice");
        assert_eq!(notice.kind, NoticeKind::InvalidScan);
        assert_eq!(notice.message, "Invalid QR code: not a valid student ID");
        assert_eq!(session.selected_id(), Some("007"));
    }

    #[test]
    fn decode_errors_raise_classified_notice() {
        let now = Instant::now();
        let mut session = ScanSession::new(&Preferences::default(), TTL);
        session.handle_scan_error(&serde_json::json!({ "code": 3 }), now);
        assert_eq!(
            session.active_notice(now).map(|notice| notice.message.as_str()),
            Some("QR scan error. Please try again.")
        );
        session.type_identifier("5");
        assert!(session.active_notice(now).is_none());
    }

    #[test]
    fn no_fetch_without_credential_or_selection() {
        let mut session = ScanSession::new(&Preferences::default(), TTL);
        assert!(session.begin_fetch().is_none());
        session.type_identifier("3");
        session.submit_search();
        assert!(session.begin_fetch().is_none());
        session.set_credential("token");
        assert!(session.begin_fetch().is_some());
    }

    #[test]
    fn preferences_seed_and_reflect_selection() {
        let preferences = Preferences {
            last_attendance_center: Some("Maadi".to_string()),
            last_selected_week: Some(String::new()),
        };
        let mut session = ScanSession::new(&preferences, TTL);
        assert_eq!(session.preferences().last_selected_week, None);
        session.select_week(Some("week 2".to_string()));
        session.select_center(Some("   ".to_string()));
        assert_eq!(
            session.preferences(),
            Preferences {
                last_attendance_center: None,
                last_selected_week: Some("week 2".to_string()),
            }
        );
    }
}
