//! Credential acquisition at session start.

use api_types::auth::{Login, TokenResponse};
use reqwest::StatusCode;

use crate::{
    client::{ClientError, endpoint, error_message, parse_base_url},
    session::Credential,
};

/// Exchanges email and password for a bearer credential.
///
/// Unlike [`Client::call`](crate::client::Client::call), a 401 here only
/// means wrong credentials; there is no session to invalidate yet.
pub async fn login(
    http: &reqwest::Client,
    base_url: &str,
    email: &str,
    password: &str,
) -> Result<Credential, ClientError> {
    let base_url = parse_base_url(base_url).map_err(|err| ClientError::Server(err.to_string()))?;
    let endpoint = endpoint(&base_url, "/api/auth/login")?;

    let payload = Login {
        email: email.to_string(),
        password: password.to_string(),
    };
    let res = http.post(endpoint).json(&payload).send().await?;

    let status = res.status();
    if status.is_success() {
        let body = res.json::<TokenResponse>().await?;
        return Ok(Credential::new(body.token));
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(ClientError::InvalidCredentials);
    }
    Err(ClientError::Server(error_message(res).await))
}
