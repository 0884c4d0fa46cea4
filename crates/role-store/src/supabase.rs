//! Role store backed by the Supabase `users` table through PostgREST.

use crate::{RoleStore, RoleStoreError, RoleStoreResult};
use async_trait::async_trait;
use identity_provider::IdentityProvider;
use member_types::RoleTag;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

fn summarize_response_body(body: &str) -> String {
    let mut hasher = DefaultHasher::new();
    body.hash(&mut hasher);
    format!("len={},digest={:016x}", body.len(), hasher.finish())
}

#[derive(Debug, Deserialize)]
struct RoleRow {
    #[serde(default)]
    role: Option<String>,
}

#[derive(Debug, Serialize)]
struct UpsertRoleRequest<'a> {
    id: &'a str,
    role: &'a str,
}

/// PostgREST client for the `users` table.
///
/// Requests carry the signed-in user's access token so row-level security
/// applies; without one the publishable key is sent as the bearer.
#[derive(Clone)]
pub struct SupabaseRoleStore {
    http_client: reqwest::Client,
    api_url: String,
    publishable_key: String,
    provider: Arc<dyn IdentityProvider>,
}

impl SupabaseRoleStore {
    pub fn new(
        api_url: impl Into<String>,
        publishable_key: impl Into<String>,
        provider: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            publishable_key: publishable_key.into(),
            provider,
        }
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.api_url, table)
    }

    async fn bearer(&self) -> String {
        self.provider
            .access_token()
            .await
            .unwrap_or_else(|| self.publishable_key.clone())
    }

    async fn rejected(response: reqwest::Response, what: &str) -> RoleStoreError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let body_summary = summarize_response_body(&body);
        tracing::error!(status = %status, body_summary = %body_summary, "{}", what);

        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
            .unwrap_or(body_summary);
        RoleStoreError::Rejected {
            status: status.as_u16(),
            message,
        }
    }
}

/// First row's role. No row or a null role is `None`.
fn role_from_rows(rows: Vec<RoleRow>) -> RoleStoreResult<Option<RoleTag>> {
    match rows.into_iter().next().and_then(|row| row.role) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| RoleStoreError::InvalidRole(raw)),
    }
}

#[async_trait]
impl RoleStore for SupabaseRoleStore {
    async fn get_role(&self, user_id: &str) -> RoleStoreResult<Option<RoleTag>> {
        let id_filter = format!("eq.{}", user_id);

        tracing::debug!(user_id, "Fetching role from Supabase");

        let response = self
            .http_client
            .get(self.rest_url("users"))
            .query(&[
                ("id", id_filter.as_str()),
                ("select", "role"),
                ("limit", "1"),
            ])
            .header("apikey", &self.publishable_key)
            .header("Authorization", format!("Bearer {}", self.bearer().await))
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejected(response, "Failed to fetch role").await);
        }

        let rows: Vec<RoleRow> = response.json().await?;
        role_from_rows(rows)
    }

    async fn set_role(&self, user_id: &str, role: RoleTag) -> RoleStoreResult<()> {
        let body = UpsertRoleRequest {
            id: user_id,
            role: role.as_str(),
        };

        let response = self
            .http_client
            .post(self.rest_url("users"))
            .header("apikey", &self.publishable_key)
            .header("Authorization", format!("Bearer {}", self.bearer().await))
            .header("Content-Type", "application/json")
            .header("Prefer", "resolution=merge-duplicates")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejected(response, "Failed to save role").await);
        }

        tracing::info!(user_id, role = %role, "Role saved");
        Ok(())
    }
}
