use crate::models::{
    AttendanceUpdate, EditRequest, HomeworkUpdate, PaymentUpdate, PendingEdit, QuizUpdate, Student,
};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("student not found: {0}")]
    NotFound(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(String),
}

impl ServiceError {
    pub fn notice(&self) -> &'static str {
        match self {
            ServiceError::NotFound(_) | ServiceError::Unauthorized => {
                "Student not found or unauthorized."
            }
            ServiceError::Status(_) | ServiceError::Transport(_) => {
                "Could not reach the student service."
            }
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        ServiceError::Transport(err.to_string())
    }
}

/// The remote student store. Every call carries the operator's credential.
#[async_trait]
pub trait StudentService: Send + Sync {
    async fn fetch_student(&self, token: &str, id: &str) -> Result<Student, ServiceError>;
    async fn set_attendance(
        &self,
        token: &str,
        id: &str,
        update: &AttendanceUpdate,
    ) -> Result<(), ServiceError>;
    async fn set_homework(
        &self,
        token: &str,
        id: &str,
        update: &HomeworkUpdate,
    ) -> Result<(), ServiceError>;
    async fn set_payment(
        &self,
        token: &str,
        id: &str,
        update: &PaymentUpdate,
    ) -> Result<(), ServiceError>;
    async fn set_quiz_degree(
        &self,
        token: &str,
        id: &str,
        update: &QuizUpdate,
    ) -> Result<(), ServiceError>;

    async fn submit(&self, edit: &PendingEdit) -> Result<(), ServiceError> {
        let (token, id) = (edit.token.as_str(), edit.student_id.as_str());
        match &edit.request {
            EditRequest::Attendance(update) => self.set_attendance(token, id, update).await,
            EditRequest::Homework(update) => self.set_homework(token, id, update).await,
            EditRequest::Payment(update) => self.set_payment(token, id, update).await,
            EditRequest::Quiz(update) => self.set_quiz_degree(token, id, update).await,
        }
    }
}

pub struct HttpStudentService {
    client: Client,
    base_url: Url,
}

impl HttpStudentService {
    /// Every request, read or write, gives up after `timeout`.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, ServiceError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    fn student_url(&self, id: &str, tail: Option<&str>) -> Result<Url, ServiceError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ServiceError::Transport("base url cannot hold a path".to_string()))?;
            segments.pop_if_empty().push("api").push("students").push(id);
            if let Some(tail) = tail {
                segments.push(tail);
            }
        }
        Ok(url)
    }

    async fn put<T: Serialize + Sync>(
        &self,
        token: &str,
        id: &str,
        tail: &str,
        body: &T,
    ) -> Result<(), ServiceError> {
        let url = self.student_url(id, Some(tail))?;
        let response = self
            .client
            .put(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        check_status(response, id)?;
        Ok(())
    }
}

fn check_status(response: Response, id: &str) -> Result<Response, ServiceError> {
    match response.status() {
        StatusCode::NOT_FOUND => Err(ServiceError::NotFound(id.to_string())),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ServiceError::Unauthorized),
        status if status.is_success() => Ok(response),
        status => Err(ServiceError::Status(status.as_u16())),
    }
}

#[async_trait]
impl StudentService for HttpStudentService {
    async fn fetch_student(&self, token: &str, id: &str) -> Result<Student, ServiceError> {
        let url = self.student_url(id, None)?;
        let response = self.client.get(url).bearer_auth(token).send().await?;
        let student = check_status(response, id)?.json::<Student>().await?;
        Ok(student)
    }

    async fn set_attendance(
        &self,
        token: &str,
        id: &str,
        update: &AttendanceUpdate,
    ) -> Result<(), ServiceError> {
        self.put(token, id, "attendance", update).await
    }

    async fn set_homework(
        &self,
        token: &str,
        id: &str,
        update: &HomeworkUpdate,
    ) -> Result<(), ServiceError> {
        self.put(token, id, "homework", update).await
    }

    async fn set_payment(
        &self,
        token: &str,
        id: &str,
        update: &PaymentUpdate,
    ) -> Result<(), ServiceError> {
        self.put(token, id, "payment", update).await
    }

    async fn set_quiz_degree(
        &self,
        token: &str,
        id: &str,
        update: &QuizUpdate,
    ) -> Result<(), ServiceError> {
        self.put(token, id, "quiz_degree", update).await
    }
}
