use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct WeeklyRecord {
    #[serde(default, deserialize_with = "bool_or_null")]
    pub attended: bool,
    #[serde(default, rename = "lastAttendance")]
    pub last_attendance: Option<String>,
    #[serde(default, rename = "lastAttendanceCenter")]
    pub last_attendance_center: Option<String>,
    #[serde(default, rename = "hwDone", deserialize_with = "bool_or_null")]
    pub hw_done: bool,
    #[serde(default, rename = "paidSession", deserialize_with = "bool_or_null")]
    pub paid_session: bool,
    #[serde(default, rename = "quizDegree")]
    pub quiz_degree: Option<String>,
}

/// A student as returned by the remote service.
///
/// The top-level attendance fields are convenience copies. They only describe
/// the selected week after [`crate::week::project`] has run.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Student {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub grade: Option<String>,
    #[serde(default)]
    pub main_center: Option<String>,
    #[serde(default)]
    pub school: Option<String>,
    #[serde(default)]
    pub weeks: Vec<WeeklyRecord>,
    #[serde(default)]
    pub attended_the_session: Option<bool>,
    #[serde(default, rename = "lastAttendance")]
    pub last_attendance: Option<String>,
    #[serde(default, rename = "lastAttendanceCenter")]
    pub last_attendance_center: Option<String>,
    #[serde(default, rename = "hwDone")]
    pub hw_done: Option<bool>,
    #[serde(default, rename = "paidSession")]
    pub paid_session: Option<bool>,
    #[serde(default, rename = "quizDegree")]
    pub quiz_degree: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttendanceUpdate {
    pub attended: bool,
    #[serde(rename = "lastAttendance")]
    pub last_attendance: Option<String>,
    #[serde(rename = "lastAttendanceCenter")]
    pub last_attendance_center: Option<String>,
    #[serde(rename = "attendanceWeek")]
    pub attendance_week: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HomeworkUpdate {
    #[serde(rename = "hwDone")]
    pub hw_done: bool,
    pub week: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentUpdate {
    #[serde(rename = "paidSession")]
    pub paid_session: bool,
    pub week: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuizUpdate {
    #[serde(rename = "quizDegree")]
    pub quiz_degree: String,
    pub week: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditRequest {
    Attendance(AttendanceUpdate),
    Homework(HomeworkUpdate),
    Payment(PaymentUpdate),
    Quiz(QuizUpdate),
}

impl EditRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            EditRequest::Attendance(_) => "attendance",
            EditRequest::Homework(_) => "homework",
            EditRequest::Payment(_) => "payment",
            EditRequest::Quiz(_) => "quiz_degree",
        }
    }
}

/// An edit that has already been applied to the overlay and still has to
/// reach the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEdit {
    pub student_id: String,
    pub token: String,
    pub request: EditRequest,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct ActionRequest {
    pub action: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub score: Option<String>,
    #[serde(default)]
    pub out_of: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ScanErrorRequest {
    #[serde(default)]
    pub error: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Text(String),
    Number(serde_json::Number),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::Text(text) => text,
            StringOrNumber::Number(number) => number.to_string(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer).map(String::from)
}

fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<StringOrNumber>::deserialize(deserializer)?.map(String::from))
}

fn bool_or_null<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}
