//! Reqwest-backed client for the `/api` surface.
//!
//! The client owns a cookie store, so one [`ApiClient::login`] authenticates
//! every later call made through the same client or its clones.

use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{
    Account, AccountFilter, Course, CourseFilter, EnrollmentFilter, EnrollmentView, Principal,
    Resource, Saved, Student, StudentFilter, Teacher, TeacherFilter,
};
use crate::inbound::http::error::ErrorBody;

/// Failures surfaced by [`ApiClient`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request URL could not be built.
    #[error("invalid request url: {0}")]
    Url(#[from] url::ParseError),
    /// Connection, TLS or body transfer failure.
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    /// The server answered with an error status.
    #[error("{status}: {message}")]
    Api {
        status: u16,
        message: String,
        body: Option<ErrorBody>,
    },
    /// A success body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ClientError {
    /// HTTP status for server-side failures.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    fn decode(err: impl std::fmt::Display) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Record kinds reachable through the client.
pub trait Remote: Resource + DeserializeOwned {
    /// Path segment under `/api`.
    const COLLECTION: &'static str;

    /// Query string pairs equivalent to `filter`.
    fn query(filter: &Self::Filter) -> Vec<(&'static str, String)>;
}

fn push(pairs: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<String>) {
    if let Some(value) = value {
        pairs.push((key, value));
    }
}

impl Remote for Student {
    const COLLECTION: &'static str = "students";

    fn query(filter: &StudentFilter) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push(&mut pairs, "studentEmail", filter.email.clone());
        push(&mut pairs, "teacherId", filter.teacher_id.map(|id| id.to_string()));
        push(&mut pairs, "teacherEmail", filter.teacher_email.clone());
        pairs
    }
}

impl Remote for Teacher {
    const COLLECTION: &'static str = "teachers";

    fn query(filter: &TeacherFilter) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push(&mut pairs, "email", filter.email.clone());
        pairs
    }
}

impl Remote for Course {
    const COLLECTION: &'static str = "courses";

    fn query(filter: &CourseFilter) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push(&mut pairs, "teacherId", filter.teacher_id.map(|id| id.to_string()));
        push(&mut pairs, "teacherEmail", filter.teacher_email.clone());
        pairs
    }
}

impl Remote for EnrollmentView {
    const COLLECTION: &'static str = "Enrollments";

    fn query(filter: &EnrollmentFilter) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push(&mut pairs, "studentId", filter.student_id.map(|id| id.to_string()));
        push(&mut pairs, "teacherId", filter.teacher_id.map(|id| id.to_string()));
        push(&mut pairs, "studentEmail", filter.student_email.clone());
        push(&mut pairs, "teacherEmail", filter.teacher_email.clone());
        pairs
    }
}

impl Remote for Account {
    const COLLECTION: &'static str = "users";

    fn query(filter: &AccountFilter) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push(&mut pairs, "role", filter.role.map(|role| role.as_str().to_owned()));
        pairs
    }
}

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct MessageBody {
    message: String,
}

/// HTTP client bound to one server.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base: Url,
}

impl ApiClient {
    /// Client for the server at `base`, e.g. `http://127.0.0.1:8080/`.
    ///
    /// # Errors
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base: Url) -> Result<Self, ClientError> {
        let http = Client::builder().cookie_store(true).build()?;
        Ok(Self { http, base })
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base.join(path)?)
    }

    fn record_url<R: Remote>(&self, id: R::Id) -> Result<Url, ClientError> {
        self.url(&format!("api/{}/{id}", R::COLLECTION))
    }

    /// Sign in; the session cookie is kept for later calls.
    ///
    /// # Errors
    /// `401` for bad credentials, transport failures.
    pub async fn login(&self, email: &str, password: &str) -> Result<Principal, ClientError> {
        let response = self
            .http
            .post(self.url("api/login")?)
            .json(&LoginBody { email, password })
            .send()
            .await?;
        decode(response).await
    }

    /// Drop the session.
    ///
    /// # Errors
    /// Transport failures.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let response = self.http.post(self.url("api/logout")?).send().await?;
        decode::<MessageBody>(response).await.map(|_| ())
    }

    /// Principal of the current session.
    ///
    /// # Errors
    /// `401` when signed out.
    pub async fn me(&self) -> Result<Principal, ClientError> {
        let response = self.http.get(self.url("api/me")?).send().await?;
        decode(response).await
    }

    /// `GET /api/<collection>` with `filter` as query parameters.
    ///
    /// # Errors
    /// Access errors, transport failures.
    pub async fn list<R: Remote>(&self, filter: &R::Filter) -> Result<Vec<R>, ClientError> {
        let response = self
            .http
            .get(self.url(&format!("api/{}", R::COLLECTION))?)
            .query(&R::query(filter))
            .send()
            .await?;
        decode(response).await
    }

    /// `GET /api/<collection>/{id}`.
    ///
    /// # Errors
    /// `404` for unknown ids, access errors, transport failures.
    pub async fn get<R: Remote>(&self, id: R::Id) -> Result<R, ClientError> {
        let response = self.http.get(self.record_url::<R>(id)?).send().await?;
        decode(response).await
    }

    /// `POST /api/<collection>/create`.
    ///
    /// # Errors
    /// `400` with field errors, access errors, transport failures.
    pub async fn create<R: Remote>(&self, body: &Value) -> Result<Saved<R>, ClientError> {
        let response = self
            .http
            .post(self.url(&format!("api/{}/create", R::COLLECTION))?)
            .json(body)
            .send()
            .await?;
        decode_saved(response).await
    }

    /// `PUT /api/<collection>/{id}`; `body` replaces every column.
    ///
    /// # Errors
    /// `404`, `400`, access errors, transport failures.
    pub async fn update<R: Remote>(&self, id: R::Id, body: &Value) -> Result<Saved<R>, ClientError> {
        let response = self
            .http
            .put(self.record_url::<R>(id)?)
            .json(body)
            .send()
            .await?;
        decode_saved(response).await
    }

    /// `DELETE /api/<collection>/{id}`; returns the server's message.
    ///
    /// # Errors
    /// `404`, access errors, transport failures.
    pub async fn delete<R: Remote>(&self, id: R::Id) -> Result<String, ClientError> {
        let response = self.http.delete(self.record_url::<R>(id)?).send().await?;
        decode::<MessageBody>(response).await.map(|body| body.message)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let bytes = response.bytes().await?;
    if !status.is_success() {
        return Err(api_error(status, &bytes));
    }
    serde_json::from_slice(&bytes).map_err(ClientError::decode)
}

async fn decode_saved<R: Remote>(response: Response) -> Result<Saved<R>, ClientError> {
    let mut body: Value = decode(response).await?;
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| ClientError::Decode("missing message".to_owned()))?;
    let record = body
        .get_mut(R::KEY)
        .map(Value::take)
        .ok_or_else(|| ClientError::Decode(format!("missing {}", R::KEY)))?;
    let record = serde_json::from_value(record).map_err(ClientError::decode)?;
    Ok(Saved { message, record })
}

fn api_error(status: StatusCode, bytes: &[u8]) -> ClientError {
    let body = serde_json::from_slice::<ErrorBody>(bytes).ok();
    let message = body
        .as_ref()
        .and_then(|b| b.error.clone().or_else(|| b.message.clone()))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_owned());
    ClientError::Api {
        status: status.as_u16(),
        message,
        body,
    }
}
