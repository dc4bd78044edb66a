//! Provider factory: builds chat models that talk to A2A agents.
//!
//! The model id of every model is the agent base URL.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::client::{AgentClient, CapabilitiesCache, CardResolver, TransportConfig};
use crate::error::A2AResult;
use crate::model::A2aChatLanguageModel;

/// Name reported by every model of this provider.
pub const PROVIDER_NAME: &str = "a2a";

/// Produces outbound message ids.
pub type IdGenerator = Arc<dyn Fn() -> String + Send + Sync>;

/// Random UUID v4 message ids.
pub fn default_id_generator() -> IdGenerator {
    Arc::new(|| uuid::Uuid::new_v4().to_string())
}

/// Settings shared by all models of one provider.
#[derive(Clone)]
pub struct ProviderSettings {
    /// Headers attached to every request (discovery, send, stream).
    pub headers: HashMap<String, String>,
    /// Request timeout. `None` imposes none.
    pub timeout: Option<Duration>,
    /// Agent card path overriding well-known discovery.
    pub card_path: Option<String>,
    /// Outbound message id generator.
    pub id_generator: IdGenerator,
    /// Use this HTTP client as-is; `headers` and `timeout` are then ignored.
    pub http_client: Option<reqwest::Client>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            headers: HashMap::new(),
            timeout: None,
            card_path: None,
            id_generator: default_id_generator(),
            http_client: None,
        }
    }
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("timeout", &self.timeout)
            .field("card_path", &self.card_path)
            .field("http_client", &self.http_client.is_some())
            .finish_non_exhaustive()
    }
}

impl ProviderSettings {
    /// Add a header sent with every request, e.g. a forwarded cookie.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Add an `Authorization: Bearer` header.
    pub fn with_bearer_token(self, token: impl Into<String>) -> Self {
        self.with_header("Authorization", format!("Bearer {}", token.into()))
    }

    /// Set a request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Fetch agent cards from `path` instead of the well-known locations.
    pub fn with_card_path(mut self, path: impl Into<String>) -> Self {
        self.card_path = Some(path.into());
        self
    }

    /// Replace the message id generator.
    pub fn with_id_generator<F>(mut self, generator: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.id_generator = Arc::new(generator);
        self
    }

    /// Use a preconfigured HTTP client.
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

/// Creates [`A2aChatLanguageModel`]s.
///
/// Models created by one provider share its HTTP client and its
/// [`CapabilitiesCache`].
///
/// # Example
///
/// ```no_run
/// use a2a_provider::prelude::*;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = A2aProvider::new(ProviderSettings::default())?;
/// let model = provider.language_model("http://localhost:41241/");
/// let result = model
///     .generate(CallOptions::new(vec![ConversationTurn::user("Hello")]))
///     .await?;
/// println!("{:?}", result.content);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct A2aProvider {
    settings: ProviderSettings,
    http_client: reqwest::Client,
    cache: Arc<CapabilitiesCache>,
}

impl A2aProvider {
    /// Create a provider.
    ///
    /// Fails only when the HTTP client cannot be built.
    pub fn new(settings: ProviderSettings) -> A2AResult<Self> {
        let http_client = match &settings.http_client {
            Some(client) => client.clone(),
            None => TransportConfig {
                timeout: settings.timeout,
                headers: settings.headers.clone(),
            }
            .build_client()?,
        };
        Ok(Self {
            settings,
            http_client,
            cache: Arc::new(CapabilitiesCache::new()),
        })
    }

    /// The provider name, `"a2a"`.
    pub fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    /// The capabilities cache shared by this provider's models.
    pub fn cache(&self) -> &Arc<CapabilitiesCache> {
        &self.cache
    }

    /// A chat model for the agent at `model_id` (its base URL).
    ///
    /// Trailing slashes are stripped from the id.
    pub fn language_model(&self, model_id: &str) -> A2aChatLanguageModel {
        let model_id = model_id.trim_end_matches('/');

        let mut resolver = CardResolver::with_client(self.http_client.clone());
        if let Some(path) = &self.settings.card_path {
            resolver = resolver.with_card_path(path.clone());
        }
        let client = AgentClient::with_http_client(
            model_id,
            self.http_client.clone(),
            Arc::clone(&self.cache),
        )
        .with_resolver(resolver);

        A2aChatLanguageModel::new(
            PROVIDER_NAME,
            model_id,
            client,
            Arc::clone(&self.settings.id_generator),
        )
    }

    /// Alias of [`language_model`](Self::language_model).
    pub fn chat(&self, model_id: &str) -> A2aChatLanguageModel {
        self.language_model(model_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_id_loses_trailing_slashes() {
        let provider = A2aProvider::new(ProviderSettings::default()).unwrap();
        let model = provider.language_model("http://example.org/agent//");
        assert_eq!(model.model_id(), "http://example.org/agent");
        assert_eq!(model.provider(), "a2a");
        assert_eq!(provider.chat("http://example.org/").model_id(), "http://example.org");
    }

    #[test]
    fn models_share_the_provider_cache() {
        let provider = A2aProvider::new(ProviderSettings::default()).unwrap();
        let a = provider.language_model("http://a.example");
        let b = provider.language_model("http://b.example");
        assert!(Arc::ptr_eq(a.client().cache(), b.client().cache()));
        assert!(Arc::ptr_eq(a.client().cache(), provider.cache()));
    }

    #[test]
    fn custom_id_generator_is_used() {
        let settings = ProviderSettings::default().with_id_generator(|| "fixed".to_string());
        assert_eq!((settings.id_generator)(), "fixed");
        let settings = settings
            .with_header("cookie", "secret=1")
            .with_bearer_token("t0ken");
        assert_eq!(settings.headers["Authorization"], "Bearer t0ken");
        let debug = format!("{settings:?}");
        assert!(debug.contains("cookie"));
        assert!(!debug.contains("secret=1"));
    }
}
