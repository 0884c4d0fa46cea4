//! Supabase Auth (GoTrue) REST client.
//!
//! Covers the handful of endpoints the member client uses: password
//! sign-in, sign-up, PKCE code exchange, token refresh and logout.

use crate::error::{AuthError, AuthResult};
use crate::pkce::{PkcePair, CHALLENGE_METHOD};
use crate::SocialProvider;
use member_types::Identity;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tracing::{debug, warn};

fn summarize_response_body(body: &str) -> String {
    let mut hasher = DefaultHasher::new();
    body.hash(&mut hasher);
    format!("len={},digest={:016x}", body.len(), hasher.finish())
}

/// Token grant returned by `/auth/v1/token`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub user: SupabaseUser,
}

/// User record as returned by the auth service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SupabaseUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// The subset of `user_metadata` the member area displays.
///
/// Social providers fill `name`/`picture`; e-mail sign-up fills `full_name`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

impl SupabaseUser {
    pub fn into_identity(self) -> Identity {
        let metadata = self.user_metadata;
        Identity {
            id: self.id,
            display_name: non_empty(metadata.full_name).or_else(|| non_empty(metadata.name)),
            email: non_empty(self.email),
            avatar_url: non_empty(metadata.avatar_url).or_else(|| non_empty(metadata.picture)),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Sign-up either returns a session right away or waits for e-mail
/// confirmation, in which case the body is just the user.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    Pending(SupabaseUser),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Turn a non-2xx auth response into an error carrying the service's text.
fn decode_error(status: u16, body: &str) -> AuthError {
    let message = serde_json::from_str::<ErrorBody>(body).ok().and_then(|b| {
        b.error_description
            .or(b.msg)
            .or(b.message)
            .or(b.error)
            .filter(|m| !m.trim().is_empty())
    });

    match message {
        Some(message) => AuthError::Rejected { status, message },
        None => AuthError::Rejected {
            status,
            message: format!(
                "Auth request failed: HTTP {} ({})",
                status,
                summarize_response_body(body)
            ),
        },
    }
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct SignUpRequest<'a> {
    email: &'a str,
    password: &'a str,
    data: SignUpData<'a>,
}

#[derive(Serialize)]
struct SignUpData<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    full_name: Option<&'a str>,
}

#[derive(Serialize)]
struct PkceGrant<'a> {
    auth_code: &'a str,
    code_verifier: &'a str,
}

#[derive(Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
}

/// Supabase Auth REST client.
#[derive(Clone)]
pub struct GoTrueClient {
    http_client: reqwest::Client,
    api_url: String,
    publishable_key: String,
}

impl GoTrueClient {
    /// # Arguments
    /// * `api_url` - The Supabase project URL (e.g., `https://xyz.supabase.co`)
    /// * `publishable_key` - The project's publishable (anon) key
    pub fn new(api_url: impl Into<String>, publishable_key: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            publishable_key: publishable_key.into(),
        }
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.api_url, path)
    }

    async fn post_json<B: Serialize>(
        &self,
        url: &str,
        body: &B,
        bearer: Option<&str>,
    ) -> AuthResult<reqwest::Response> {
        let mut request = self
            .http_client
            .post(url)
            .header("apikey", &self.publishable_key)
            .header("Content-Type", "application/json")
            .json(body);
        if let Some(token) = bearer {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().await?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        warn!(
            status,
            body_summary = %summarize_response_body(&body),
            "Auth request rejected"
        );
        Err(decode_error(status, &body))
    }

    /// `POST /auth/v1/token?grant_type=password`
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> AuthResult<TokenResponse> {
        let url = self.auth_url("token?grant_type=password");
        debug!(url = %url, "Attempting email/password sign-in");

        let response = self
            .post_json(&url, &PasswordGrant { email, password }, None)
            .await?;
        Ok(response.json().await?)
    }

    /// `POST /auth/v1/signup`
    ///
    /// Fails with [`AuthError::ConfirmationRequired`] when the project
    /// requires e-mail confirmation before the first sign-in.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> AuthResult<TokenResponse> {
        let url = self.auth_url("signup");
        debug!(url = %url, "Creating account");

        let body = SignUpRequest {
            email,
            password,
            data: SignUpData { full_name },
        };
        let response = self.post_json(&url, &body, None).await?;
        match response.json::<SignUpResponse>().await? {
            SignUpResponse::Session(tokens) => Ok(tokens),
            SignUpResponse::Pending(user) => Err(AuthError::ConfirmationRequired(
                user.email.unwrap_or_else(|| email.to_string()),
            )),
        }
    }

    /// Browser URL that starts a social sign-in.
    pub fn authorize_url(
        &self,
        provider: SocialProvider,
        redirect_to: &str,
        pkce: &PkcePair,
    ) -> AuthResult<String> {
        let mut url = url::Url::parse(&self.auth_url("authorize"))
            .map_err(|e| AuthError::Config(format!("invalid Supabase URL: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("provider", provider.as_str())
            .append_pair("redirect_to", redirect_to)
            .append_pair("code_challenge", &pkce.challenge)
            .append_pair("code_challenge_method", CHALLENGE_METHOD);
        Ok(url.into())
    }

    /// `POST /auth/v1/token?grant_type=pkce`
    pub async fn exchange_code(&self, code: &str, verifier: &str) -> AuthResult<TokenResponse> {
        let url = self.auth_url("token?grant_type=pkce");
        debug!(url = %url, "Exchanging authorization code");

        let body = PkceGrant {
            auth_code: code,
            code_verifier: verifier,
        };
        let response = self.post_json(&url, &body, None).await?;
        Ok(response.json().await?)
    }

    /// `POST /auth/v1/token?grant_type=refresh_token`
    pub async fn refresh(&self, refresh_token: &str) -> AuthResult<TokenResponse> {
        let url = self.auth_url("token?grant_type=refresh_token");
        debug!(url = %url, "Refreshing token");

        let response = self
            .post_json(&url, &RefreshGrant { refresh_token }, None)
            .await?;
        Ok(response.json().await?)
    }

    /// `POST /auth/v1/logout`
    pub async fn logout(&self, access_token: &str) -> AuthResult<()> {
        let url = self.auth_url("logout");
        self.post_json(&url, &serde_json::json!({}), Some(access_token))
            .await?;
        Ok(())
    }
}
