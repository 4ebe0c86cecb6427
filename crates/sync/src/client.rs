use std::sync::Arc;

use api_types::ErrorBody;
use reqwest::{Method, StatusCode, Url};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;

use crate::{
    error::{Error, Result},
    session::Session,
};

/// Outcome classification of a failed API call.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server rejected the credential. The session has been invalidated;
    /// nothing should be retried.
    #[error("session expired")]
    SessionExpired,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("forbidden")]
    Forbidden,
    #[error("not found")]
    NotFound,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("server error: {0}")]
    Server(String),
    #[error("server unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// Fatal for the session: the caller must stop and hand over to login.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }
}

/// Issues authenticated calls against the dashboard API.
///
/// Every call is attempted exactly once and carries the session credential as
/// a bearer header. A 401 invalidates the session.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
    session: Arc<Session>,
}

impl Client {
    pub fn new(base_url: &str, session: Arc<Session>) -> Result<Self> {
        Self::with_http(base_url, reqwest::Client::new(), session)
    }

    pub fn with_http(base_url: &str, http: reqwest::Client, session: Arc<Session>) -> Result<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            http,
            session,
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Sends one request and returns the raw success body.
    pub async fn call<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> std::result::Result<String, ClientError>
    where
        B: Serialize + ?Sized,
    {
        let Some(credential) = self.session.credential() else {
            return Err(ClientError::SessionExpired);
        };
        let endpoint = endpoint(&self.base_url, path)?;

        tracing::debug!("{method} {path}");
        let mut req = self
            .http
            .request(method.clone(), endpoint)
            .bearer_auth(credential.as_str());
        if let Some(body) = body {
            req = req.json(body);
        }

        let res = req.send().await?;
        let status = res.status();
        if status.is_success() {
            return Ok(res.text().await?);
        }

        if status == StatusCode::UNAUTHORIZED {
            self.session.invalidate();
            return Err(ClientError::SessionExpired);
        }

        let err = classify(status, error_message(res).await);
        tracing::debug!("{method} {path} failed: {err}");
        Err(err)
    }

    /// Reads and decodes a JSON resource. A blank body decodes as `null`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> std::result::Result<T, ClientError> {
        let text = self.call::<()>(Method::GET, path, None).await?;
        Ok(serde_json::from_value(decode_json(&text)?)?)
    }

    /// Writes only need a 2xx status; a body that is not JSON is kept as text.
    pub async fn post<B>(&self, path: &str, body: &B) -> std::result::Result<Value, ClientError>
    where
        B: Serialize + ?Sized,
    {
        let text = self.call(Method::POST, path, Some(body)).await?;
        Ok(write_ack(text))
    }

    pub async fn delete(&self, path: &str) -> std::result::Result<Value, ClientError> {
        let text = self.call::<()>(Method::DELETE, path, None).await?;
        Ok(write_ack(text))
    }
}

fn decode_json(text: &str) -> std::result::Result<Value, serde_json::Error> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text)
}

fn write_ack(text: String) -> Value {
    decode_json(&text).unwrap_or(Value::String(text))
}

pub(crate) fn parse_base_url(base_url: &str) -> Result<Url> {
    Url::parse(base_url).map_err(|err| Error::InvalidBaseUrl(err.to_string()))
}

pub(crate) fn endpoint(base_url: &Url, path: &str) -> std::result::Result<Url, ClientError> {
    base_url
        .join(path)
        .map_err(|err| ClientError::Server(format!("invalid endpoint {path}: {err}")))
}

pub(crate) async fn error_message(res: reqwest::Response) -> String {
    res.json::<ErrorBody>()
        .await
        .map(|err| err.error)
        .unwrap_or_else(|_| "unknown error".to_string())
}

fn classify(status: StatusCode, message: String) -> ClientError {
    match status.as_u16() {
        403 => ClientError::Forbidden,
        404 => ClientError::NotFound,
        409 => ClientError::Conflict(message),
        400 | 422 => ClientError::Validation(message),
        _ => ClientError::Server(message),
    }
}
