// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response, multipart};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use url::Url;
use vendorhub_app::{
    DocumentUpload, Evaluation, Event, FetchRequest, MenuRecord, Page, PasswordChangeForm,
    Payment, Permission, Record, ResourceKind, RoleRecord, Session, SessionUser, Submission, User, Vendor,
};

/// Failures talking to the service. Returned inside `anyhow::Error`, so
/// callers that care about the kind can `downcast_ref::<ApiError>()`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("cannot reach {base_url} -- check [api].base_url ({message})")]
    Connection { base_url: String, message: String },
    #[error("server error ({status}): {message}")]
    Status { status: u16, message: String },
    #[error("{0}")]
    Rejected(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401, .. })
    }
}

/// Standard response wrapper used by every endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Envelope<T> {
    pub status: bool,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub total_data: Option<u64>,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

impl<T> Envelope<T> {
    fn check(self) -> Result<Self> {
        if self.status {
            return Ok(self);
        }
        let message = self
            .message
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| "request was rejected".to_owned());
        Err(ApiError::Rejected(message).into())
    }

    fn into_data(self, what: &str) -> Result<T> {
        self.check()?
            .data
            .ok_or_else(|| anyhow!("{what} response has no data"))
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    timeout: Duration,
    token: Option<String>,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            bail!("api.base_url must not be empty");
        }
        let base_url = Url::parse(&format!("{trimmed}/"))
            .with_context(|| format!("api.base_url {trimmed:?} is not a valid URL"))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            bail!(
                "api.base_url must use http or https, got {:?}",
                base_url.scheme()
            );
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            token: None,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn login(&self, email: &str, password: &str) -> Result<Session> {
        let url = self.endpoint(&["auth", "login"])?;
        tracing::debug!(%url, email, "signing in");
        let response = self.send(
            self.http
                .post(url)
                .json(&LoginRequest { email, password }),
        )?;
        let payload: LoginPayload = decode::<LoginPayload>(response, "login")?.into_data("login")?;
        if payload.token.trim().is_empty() {
            bail!("login response has an empty token");
        }
        tracing::info!(
            user = payload.user.id.get(),
            role = payload.user.role.as_str(),
            permissions = payload.permissions.len(),
            "signed in"
        );
        Ok(Session::new(payload.token, payload.user, payload.permissions))
    }

    /// Validates the form locally, then asks the service to replace the
    /// signed-in user's password.
    pub fn change_password(&self, form: &PasswordChangeForm) -> Result<()> {
        form.validate()?;
        let url = self.endpoint(&["auth", "password"])?;
        tracing::debug!(%url, "changing password");
        let response = self.send(self.http.post(url).json(&PasswordChangeRequest {
            current_password: &form.current,
            new_password: &form.new_password,
        }))?;
        expect_ok(response, "password change")
    }

    pub fn fetch_menus(&self) -> Result<Vec<MenuRecord>> {
        let url = self.endpoint(&["menus"])?;
        tracing::debug!(%url, "fetching menus");
        let response = self.send(self.http.get(url))?;
        let envelope = decode::<Vec<MenuRecord>>(response, "menu")?.check()?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// Fetches one page of a resource list.
    pub fn list<T: DeserializeOwned>(
        &self,
        resource: ResourceKind,
        request: &FetchRequest,
    ) -> Result<Page<T>> {
        let mut url = self.endpoint(&[resource.as_str()])?;
        url.query_pairs_mut()
            .append_pair("page", &request.page.to_string())
            .append_pair("limit", &request.page_size.to_string())
            .append_pair("search", &request.search);
        tracing::debug!(%url, seq = request.seq, "fetching list page");

        let response = self.send(self.http.get(url))?;
        let envelope = decode::<Vec<T>>(response, resource.as_str())?.check()?;
        Ok(Page {
            items: envelope.data.unwrap_or_default(),
            total_items: envelope.total_data,
            total_pages: envelope.total_pages,
        })
    }

    pub fn list_records(
        &self,
        resource: ResourceKind,
        request: &FetchRequest,
    ) -> Result<Page<Record>> {
        Ok(match resource {
            ResourceKind::Events => self.list::<Event>(resource, request)?.map(Record::Event),
            ResourceKind::Vendors => self.list::<Vendor>(resource, request)?.map(Record::Vendor),
            ResourceKind::Submissions => self
                .list::<Submission>(resource, request)?
                .map(Record::Submission),
            ResourceKind::Evaluations => self
                .list::<Evaluation>(resource, request)?
                .map(Record::Evaluation),
            ResourceKind::Payments => self.list::<Payment>(resource, request)?.map(Record::Payment),
            ResourceKind::Users => self.list::<User>(resource, request)?.map(Record::User),
            ResourceKind::Roles => self.list::<RoleRecord>(resource, request)?.map(Record::Role),
            ResourceKind::Menus => self.list::<MenuRecord>(resource, request)?.map(Record::Menu),
        })
    }

    pub fn delete(&self, resource: ResourceKind, id: i64) -> Result<()> {
        let id = id.to_string();
        let url = self.endpoint(&[resource.as_str(), id.as_str()])?;
        tracing::debug!(%url, "deleting record");
        let response = self.send(self.http.delete(url))?;
        expect_ok(response, "delete")
    }

    /// Sends one document as a single multipart request with `file` and
    /// `title` parts.
    pub fn upload_document(
        &self,
        resource: ResourceKind,
        id: i64,
        upload: &DocumentUpload,
    ) -> Result<()> {
        let id = id.to_string();
        let url = self.endpoint(&[resource.as_str(), id.as_str(), "documents"])?;
        let form = multipart::Form::new()
            .text("title", upload.title.trim().to_owned())
            .file("file", &upload.path)
            .with_context(|| format!("read {}", upload.path.display()))?;
        tracing::debug!(%url, file = %upload.file_name(), "uploading document");
        let response = self.send(self.http.post(url).multipart(form))?;
        expect_ok(response, "upload")
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow!("api.base_url {} cannot carry a path", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn send(&self, request: RequestBuilder) -> Result<Response> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request
            .send()
            .map_err(|error| connection_error(self.base_url.as_str(), error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let error = clean_error_response(status, &body);
            tracing::warn!(status = status.as_u16(), %error, "request failed");
            return Err(error.into());
        }
        Ok(response)
    }
}

fn decode<T: DeserializeOwned>(response: Response, what: &str) -> Result<Envelope<T>> {
    response
        .json::<Envelope<T>>()
        .with_context(|| format!("decode {what} response"))
}

/// Accepts an empty body or an envelope with `status: true`.
fn expect_ok(response: Response, what: &str) -> Result<()> {
    let body = response
        .text()
        .with_context(|| format!("read {what} response"))?;
    if body.trim().is_empty() {
        return Ok(());
    }
    let envelope: Envelope<serde_json::Value> =
        serde_json::from_str(&body).with_context(|| format!("decode {what} response"))?;
    envelope.check().map(|_| ())
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    ApiError::Connection {
        base_url: base_url.trim_end_matches('/').to_owned(),
        message: error.to_string(),
    }
    .into()
}

fn clean_error_response(status: StatusCode, body: &str) -> ApiError {
    let status = status.as_u16();
    if let Ok(parsed) = serde_json::from_str::<Envelope<serde_json::Value>>(body)
        && let Some(message) = parsed.message
        && !message.trim().is_empty()
    {
        return ApiError::Status { status, message };
    }

    let body = body.trim();
    if !body.is_empty() && body.len() < 100 && !body.contains('{') {
        return ApiError::Status {
            status,
            message: body.to_owned(),
        };
    }

    let message = StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("unexpected response")
        .to_ascii_lowercase();
    ApiError::Status { status, message }
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct PasswordChangeRequest<'a> {
    current_password: &'a str,
    new_password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginPayload {
    token: String,
    user: SessionUser,
    #[serde(default)]
    permissions: Vec<Permission>,
}
