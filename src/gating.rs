use crate::overlay::DisplayedRecord;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Attendance,
    Homework,
    Payment,
    Quiz,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Gate {
    Allowed,
    NoStudent,
    SelectWeekAndCenter,
    MustAttendFirst,
    NeedsQuizInput,
}

impl Gate {
    pub fn is_allowed(self) -> bool {
        self == Gate::Allowed
    }

    pub fn message(self, action: Action) -> Option<&'static str> {
        match (self, action) {
            (Gate::Allowed, _) => None,
            (Gate::NoStudent, _) => Some("Load a student before recording attendance."),
            (Gate::SelectWeekAndCenter, _) => {
                Some("Please select both a week and attendance center to enable tracking.")
            }
            (Gate::MustAttendFirst, Action::Homework) => {
                Some("Student must be marked as attended before homework can be updated.")
            }
            (Gate::MustAttendFirst, Action::Payment) => {
                Some("Student must be marked as attended before payment can be updated.")
            }
            (Gate::MustAttendFirst, _) => {
                Some("Student must be marked as attended before quiz degree can be entered.")
            }
            (Gate::NeedsQuizInput, _) => Some("Enter both the quiz degree and its maximum."),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Prerequisites {
    pub week_selected: bool,
    pub center_selected: bool,
}

impl Prerequisites {
    fn satisfied(self) -> bool {
        self.week_selected && self.center_selected
    }
}

/// The quiz score being typed, kept verbatim until submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuizEntry {
    pub score: String,
    pub out_of: String,
}

impl QuizEntry {
    pub fn is_complete(&self) -> bool {
        is_number(&self.score) && is_number(&self.out_of)
    }

    /// Bounds are not checked: `12 / 10` and `-1 / 10` are stored as given.
    pub fn degree(&self) -> Option<String> {
        self.is_complete()
            .then(|| format!("{} / {}", self.score.trim(), self.out_of.trim()))
    }

    pub fn clear(&mut self) {
        self.score.clear();
        self.out_of.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.score.is_empty() && self.out_of.is_empty()
    }
}

fn is_number(text: &str) -> bool {
    let text = text.trim();
    !text.is_empty() && text.parse::<f64>().is_ok_and(f64::is_finite)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Permissions {
    pub attendance: Gate,
    pub homework: Gate,
    pub payment: Gate,
    pub quiz: Gate,
}

pub fn evaluate(
    action: Action,
    displayed: Option<&DisplayedRecord>,
    prerequisites: Prerequisites,
    quiz: &QuizEntry,
) -> Gate {
    let Some(displayed) = displayed else {
        return Gate::NoStudent;
    };
    if !prerequisites.satisfied() {
        return Gate::SelectWeekAndCenter;
    }
    if action == Action::Attendance {
        return Gate::Allowed;
    }
    if !displayed.attended {
        return Gate::MustAttendFirst;
    }
    if action == Action::Quiz && !quiz.is_complete() {
        return Gate::NeedsQuizInput;
    }
    Gate::Allowed
}

pub fn permissions(
    displayed: Option<&DisplayedRecord>,
    prerequisites: Prerequisites,
    quiz: &QuizEntry,
) -> Permissions {
    Permissions {
        attendance: evaluate(Action::Attendance, displayed, prerequisites, quiz),
        homework: evaluate(Action::Homework, displayed, prerequisites, quiz),
        payment: evaluate(Action::Payment, displayed, prerequisites, quiz),
        quiz: evaluate(Action::Quiz, displayed, prerequisites, quiz),
    }
}
