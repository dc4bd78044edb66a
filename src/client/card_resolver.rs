//! Agent card discovery and the per-endpoint capabilities cache.
//!
//! Agents publish a self-describing card at a well-known path under their
//! base URL. Only `capabilities.streaming` drives behavior here; the rest of
//! the card is passed through untouched.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::{A2AError, A2AResult};
use crate::types::AgentCard;

/// Well-known card path served by A2A agents.
pub const AGENT_CARD_PATH: &str = "/.well-known/agent.json";

/// Card path introduced in A2A v0.3, tried when the first one is missing.
pub const FALLBACK_AGENT_CARD_PATH: &str = "/.well-known/agent-card.json";

/// Resolves [`AgentCard`]s from agent base URLs.
///
/// # Example
///
/// ```no_run
/// use a2a_provider::client::CardResolver;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let resolver = CardResolver::new();
/// let card = resolver.resolve("http://localhost:41241").await?;
/// println!("{} streams: {}", card.name, card.supports_streaming());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CardResolver {
    client: reqwest::Client,
    card_path: Option<String>,
}

impl CardResolver {
    /// Create a resolver with a default HTTP client.
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    /// Create a resolver with an existing `reqwest::Client`.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            card_path: None,
        }
    }

    /// Fetch the card from `path` only, with no fallback.
    pub fn with_card_path(mut self, path: impl Into<String>) -> Self {
        self.card_path = Some(path.into());
        self
    }

    /// Fetch and parse the agent card of `base_url`.
    ///
    /// Tries [`AGENT_CARD_PATH`] first and [`FALLBACK_AGENT_CARD_PATH`] when
    /// that answers 404. A custom card path is fetched as-is.
    ///
    /// # Errors
    ///
    /// [`A2AError::Transport`] on connection failures, [`A2AError::Http`] on
    /// non-2xx responses, [`A2AError::InvalidJson`] when the card does not parse.
    pub async fn resolve(&self, base_url: &str) -> A2AResult<AgentCard> {
        let base = base_url.trim_end_matches('/');

        if let Some(path) = self.card_path.as_deref() {
            return self.fetch_card(base, path).await;
        }

        match self.fetch_card(base, AGENT_CARD_PATH).await {
            Err(A2AError::Http { status: 404, .. }) => {
                tracing::debug!(
                    "no agent card at {base}{AGENT_CARD_PATH}, trying {FALLBACK_AGENT_CARD_PATH}"
                );
                self.fetch_card(base, FALLBACK_AGENT_CARD_PATH).await
            }
            other => other,
        }
    }

    async fn fetch_card(&self, base: &str, path: &str) -> A2AResult<AgentCard> {
        let url = if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        };

        tracing::debug!("resolving agent card from {url}");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(A2AError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| A2AError::Transport(format!("failed to read agent card response: {e}")))?;

        let card: AgentCard = serde_json::from_slice(&bytes)
            .map_err(|e| A2AError::InvalidJson(format!("failed to parse agent card: {e}")))?;

        tracing::debug!(
            name = %card.name,
            streaming = card.supports_streaming(),
            "resolved agent card"
        );

        Ok(card)
    }
}

impl Default for CardResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Agent cards keyed by endpoint.
///
/// Entries live until they are invalidated. Two exchanges racing on a cold
/// endpoint may both fetch the card; the last write wins.
#[derive(Debug, Default)]
pub struct CapabilitiesCache {
    cards: RwLock<HashMap<String, Arc<AgentCard>>>,
}

impl CapabilitiesCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn key(endpoint: &str) -> &str {
        endpoint.trim_end_matches('/')
    }

    /// The cached card for `endpoint`, if any.
    pub async fn get(&self, endpoint: &str) -> Option<Arc<AgentCard>> {
        self.cards.read().await.get(Self::key(endpoint)).cloned()
    }

    /// The cached card for `endpoint`, resolving and storing it on a miss.
    ///
    /// Failed lookups are not cached.
    pub async fn get_or_resolve(
        &self,
        endpoint: &str,
        resolver: &CardResolver,
    ) -> A2AResult<Arc<AgentCard>> {
        if let Some(card) = self.get(endpoint).await {
            return Ok(card);
        }

        let card = Arc::new(resolver.resolve(endpoint).await?);
        self.cards
            .write()
            .await
            .insert(Self::key(endpoint).to_string(), Arc::clone(&card));
        Ok(card)
    }

    /// Drop the entry of one endpoint. Returns whether one was cached.
    pub async fn invalidate(&self, endpoint: &str) -> bool {
        self.cards.write().await.remove(Self::key(endpoint)).is_some()
    }

    /// Drop every entry.
    pub async fn clear(&self) {
        self.cards.write().await.clear();
    }

    /// Number of cached endpoints.
    pub async fn len(&self) -> usize {
        self.cards.read().await.len()
    }

    /// Whether nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.cards.read().await.is_empty()
    }
}
