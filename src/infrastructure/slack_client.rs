//! Slack Web API client.
//!
//! `SlackApi` is the seam the application layer talks to; `SlackClient`
//! implements it over `reqwest`. Each call maps to one HTTP request, so
//! pagination and pacing stay with the caller.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::domain::{
    AppError, AuthIdentity, Conversation, CursorPage, ExportConfig, Message, NumberedPage, Result,
    SlackFile, User,
};

/// Conversation types requested from `conversations.list`.
const CONVERSATION_TYPES: &str = "public_channel,private_channel,im,mpim";

/// Parameters for one `files.list` request.
#[derive(Debug, Clone)]
pub struct FileQuery {
    /// Comma-separated Slack file types.
    pub types: String,
    /// Items per page.
    pub count: u32,
    /// Include files hidden by plan limits.
    pub show_hidden_by_limit: bool,
}

/// Operations the exporter needs from Slack.
#[async_trait]
pub trait SlackApi: Send + Sync {
    /// Checks the token and returns who owns it.
    async fn auth_test(&self) -> Result<AuthIdentity>;

    /// Lists workspace members in one call.
    async fn users_list(&self) -> Result<Vec<User>>;

    /// Lists every conversation type in one call.
    async fn conversations_list(&self, limit: u32) -> Result<Vec<Conversation>>;

    /// Fetches one page of a conversation's history, from the beginning of time.
    async fn conversations_history(
        &self,
        channel: &str,
        cursor: Option<String>,
        limit: u32,
    ) -> Result<CursorPage<Message>>;

    /// Fetches one page of the file listing. Pages are 1-based.
    async fn files_list(&self, query: &FileQuery, page: u32) -> Result<NumberedPage<SlackFile>>;

    /// Downloads a private file URL with the token's credentials.
    async fn download(&self, url: &str) -> Result<Vec<u8>>;
}

/// Envelope shared by every Web API response.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    body: Option<T>,
}

#[derive(Debug, Deserialize)]
struct UsersBody {
    #[serde(default)]
    members: Vec<User>,
}

#[derive(Debug, Deserialize)]
struct ConversationsBody {
    #[serde(default)]
    channels: Vec<Conversation>,
}

#[derive(Debug, Deserialize)]
struct HistoryBody {
    #[serde(default)]
    messages: Vec<Message>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Deserialize)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FilesBody {
    #[serde(default)]
    files: Vec<SlackFile>,
    #[serde(default)]
    paging: Option<Paging>,
}

#[derive(Debug, Deserialize)]
struct Paging {
    #[serde(default = "one")]
    pages: u32,
}

const fn one() -> u32 {
    1
}

/// `reqwest`-backed Slack client.
#[derive(Clone)]
pub struct SlackClient {
    client: Client,
    base_url: String,
    token: String,
}

impl SlackClient {
    /// Creates a client for the given token.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(token: impl Into<String>, config: &ExportConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(AppError::http)?;

        Ok(Self {
            client,
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    /// Calls a Web API method and unwraps the `ok`/`error` envelope.
    async fn call<T: DeserializeOwned>(&self, method: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}/{method}", self.base_url);
        tracing::trace!(method, ?query, "Calling Slack API");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await
            .map_err(AppError::http)?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::api(method, "ratelimited"));
        }

        let envelope: Envelope<T> = response.json().await.map_err(AppError::http)?;
        if !envelope.ok {
            return Err(AppError::api(
                method,
                envelope.error.unwrap_or_else(|| "unknown_error".to_string()),
            ));
        }

        envelope
            .body
            .ok_or_else(|| AppError::api(method, "malformed_response"))
    }
}

#[async_trait]
impl SlackApi for SlackClient {
    async fn auth_test(&self) -> Result<AuthIdentity> {
        self.call("auth.test", &[]).await.map_err(|e| match e {
            AppError::Api { code, .. } => AppError::Auth { code },
            other => other,
        })
    }

    async fn users_list(&self) -> Result<Vec<User>> {
        let body: UsersBody = self.call("users.list", &[]).await?;
        Ok(body.members)
    }

    async fn conversations_list(&self, limit: u32) -> Result<Vec<Conversation>> {
        let body: ConversationsBody = self
            .call(
                "conversations.list",
                &[
                    ("types", CONVERSATION_TYPES.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        Ok(body.channels)
    }

    async fn conversations_history(
        &self,
        channel: &str,
        cursor: Option<String>,
        limit: u32,
    ) -> Result<CursorPage<Message>> {
        let mut query = vec![
            ("channel", channel.to_string()),
            ("limit", limit.to_string()),
            ("oldest", "0".to_string()),
        ];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor));
        }

        let body: HistoryBody = self.call("conversations.history", &query).await?;
        Ok(CursorPage {
            items: body.messages,
            has_more: body.has_more,
            next_cursor: body
                .response_metadata
                .and_then(|m| m.next_cursor)
                .filter(|c| !c.is_empty()),
        })
    }

    async fn files_list(&self, query: &FileQuery, page: u32) -> Result<NumberedPage<SlackFile>> {
        let mut params = vec![
            ("count", query.count.to_string()),
            ("page", page.to_string()),
            ("types", query.types.clone()),
        ];
        if query.show_hidden_by_limit {
            params.push(("show_files_hidden_by_limit", "true".to_string()));
        }

        let body: FilesBody = self.call("files.list", &params).await?;
        Ok(NumberedPage {
            items: body.files,
            total_pages: body.paging.map_or(1, |p| p.pages),
        })
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(AppError::http)?
            .error_for_status()
            .map_err(AppError::http)?;

        let bytes = response.bytes().await.map_err(AppError::http)?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_error() {
        let envelope: Envelope<UsersBody> =
            serde_json::from_str(r#"{"ok":false,"error":"invalid_auth"}"#).unwrap();
        assert!(!envelope.ok);
        assert_eq!(envelope.error.as_deref(), Some("invalid_auth"));
    }

    #[test]
    fn test_history_body_cursor() {
        let envelope: Envelope<HistoryBody> = serde_json::from_str(
            r#"{"ok":true,"messages":[{"ts":"1.0"}],"has_more":true,"response_metadata":{"next_cursor":"abc"}}"#,
        )
        .unwrap();
        let body = envelope.body.unwrap();
        assert!(body.has_more);
        assert_eq!(body.messages.len(), 1);
        assert_eq!(
            body.response_metadata.and_then(|m| m.next_cursor).as_deref(),
            Some("abc")
        );
    }

    #[test]
    fn test_files_body_defaults_to_one_page() {
        let envelope: Envelope<FilesBody> =
            serde_json::from_str(r#"{"ok":true,"files":[]}"#).unwrap();
        assert!(envelope.body.unwrap().paging.is_none());
    }

    #[test]
    fn test_client_trims_base_url() {
        let mut config = ExportConfig::default();
        config.api.base_url = "http://localhost:9000/api/".into();
        let client = SlackClient::new("xoxp-test", &config).unwrap();
        assert_eq!(client.base_url, "http://localhost:9000/api");
    }
}
