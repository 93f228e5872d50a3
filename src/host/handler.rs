//! Command routing for the host bridge.

use std::sync::Arc;

use lookbook_search::{LinkPipeline, UserPrefs};
use serde_json::json;

use crate::error::{LookbookError, Result};
use crate::host::contract::{CONTRACT_VERSION, CommandEnvelope, CommandName, ResponseEnvelope};
use crate::prefs::PrefsStore;

/// Cards returned when `links.search` omits `total_k`.
pub const DEFAULT_TOTAL_K: usize = 6;

/// Upper bound on `total_k` accepted from the frontend.
pub const MAX_TOTAL_K: usize = 20;

/// Routes host commands to the link pipeline and the preference store.
#[derive(Debug, Clone)]
pub struct HostHandler {
    pipeline: Arc<LinkPipeline>,
    prefs: PrefsStore,
}

impl HostHandler {
    pub fn new(pipeline: Arc<LinkPipeline>, prefs: PrefsStore) -> Self {
        Self { pipeline, prefs }
    }

    /// Handle one envelope. Failures become error envelopes carrying the
    /// request id.
    pub async fn handle(&self, envelope: &CommandEnvelope) -> ResponseEnvelope {
        if let Err(e) = envelope.validate() {
            return ResponseEnvelope::error(envelope.request_id.clone(), e.to_string());
        }
        match self.route(envelope).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(
                    command = envelope.command.as_str(),
                    error = %e,
                    "host command failed"
                );
                ResponseEnvelope::error(envelope.request_id.clone(), e.to_string())
            }
        }
    }

    async fn route(&self, envelope: &CommandEnvelope) -> Result<ResponseEnvelope> {
        let id = envelope.request_id.clone();
        match envelope.command {
            CommandName::HostPing => Ok(ResponseEnvelope::ok(id, json!({"pong": true}))),
            CommandName::HostVersion => Ok(ResponseEnvelope::ok(
                id,
                json!({
                    "contract_version": CONTRACT_VERSION,
                    "version": env!("CARGO_PKG_VERSION"),
                }),
            )),
            CommandName::LinksSearch => self.handle_links_search(envelope).await,
            CommandName::PrefsGet => self.handle_prefs_get(envelope),
            CommandName::PrefsSet => self.handle_prefs_set(envelope),
            CommandName::RuntimeStop => Ok(ResponseEnvelope::ok(id, json!({"stopping": true}))),
        }
    }

    async fn handle_links_search(&self, envelope: &CommandEnvelope) -> Result<ResponseEnvelope> {
        let request = parse_search_request(&envelope.payload)?;
        let prefs = match request.username {
            Some(username) => self.prefs.load(username),
            None => UserPrefs::default(),
        };

        let cards = self
            .pipeline
            .search_links(request.query, request.vibe, &prefs, request.total_k)
            .await;

        Ok(ResponseEnvelope::ok(
            envelope.request_id.clone(),
            json!({ "cards": cards }),
        ))
    }

    fn handle_prefs_get(&self, envelope: &CommandEnvelope) -> Result<ResponseEnvelope> {
        let username = parse_username(&envelope.payload, "prefs.get")?;
        let prefs = self.prefs.load(username);
        let payload =
            serde_json::to_value(prefs).map_err(|e| LookbookError::Prefs(e.to_string()))?;
        Ok(ResponseEnvelope::ok(envelope.request_id.clone(), payload))
    }

    fn handle_prefs_set(&self, envelope: &CommandEnvelope) -> Result<ResponseEnvelope> {
        let username = parse_username(&envelope.payload, "prefs.set")?;
        let Some(raw) = envelope.payload.get("prefs") else {
            return Err(LookbookError::Protocol(
                "prefs.set requires payload.prefs".to_owned(),
            ));
        };
        let prefs: UserPrefs = serde_json::from_value(raw.clone())
            .map_err(|e| LookbookError::Protocol(format!("invalid prefs: {e}")))?;

        self.prefs.save(username, &prefs)?;
        Ok(ResponseEnvelope::ok(
            envelope.request_id.clone(),
            json!({"saved": true}),
        ))
    }
}

#[derive(Debug, PartialEq)]
struct SearchRequest<'a> {
    query: &'a str,
    vibe: &'a str,
    username: Option<&'a str>,
    total_k: usize,
}

fn parse_search_request(payload: &serde_json::Value) -> Result<SearchRequest<'_>> {
    let query = payload
        .get("query")
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .unwrap_or_default();
    if query.is_empty() {
        return Err(LookbookError::Protocol(
            "links.search requires a non-empty payload.query".to_owned(),
        ));
    }

    let vibe = payload
        .get("vibe")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default();
    let username = payload
        .get("username")
        .and_then(serde_json::Value::as_str)
        .filter(|u| !u.is_empty());

    let total_k = match payload.get("total_k") {
        None | Some(serde_json::Value::Null) => DEFAULT_TOTAL_K,
        Some(value) => {
            let Some(k) = value.as_u64() else {
                return Err(LookbookError::Protocol(
                    "links.search payload.total_k must be a non-negative integer".to_owned(),
                ));
            };
            usize::try_from(k).unwrap_or(MAX_TOTAL_K).min(MAX_TOTAL_K)
        }
    };

    Ok(SearchRequest {
        query,
        vibe,
        username,
        total_k,
    })
}

fn parse_username<'a>(payload: &'a serde_json::Value, command: &str) -> Result<&'a str> {
    payload
        .get("username")
        .and_then(serde_json::Value::as_str)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| LookbookError::Protocol(format!("{command} requires payload.username")))
}
