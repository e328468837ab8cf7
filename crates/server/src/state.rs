//! Shared handler state.

use std::sync::Arc;

use relaydesk_application::ports::{Clock, GenerationProvider, ProviderError};
use relaydesk_infrastructure::{OpenAiProvider, ProviderConfig, SystemClock};

use crate::settings::ServerSettings;

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The generation provider; `None` runs the relays in stub mode.
    pub provider: Option<Arc<dyn GenerationProvider>>,
    /// Clock stamping diagnostic replies
    pub clock: Arc<dyn Clock>,
    /// Deployment label echoed by `/api/test`
    pub node_env: String,
}

impl AppState {
    /// Builds the state from settings and the credential read at startup.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider client cannot be created.
    pub fn from_settings(
        settings: &ServerSettings,
        api_key: Option<String>,
    ) -> Result<Self, ProviderError> {
        let provider = match api_key {
            Some(api_key) => {
                let provider = OpenAiProvider::new(ProviderConfig {
                    base_url: settings.provider_base_url.clone(),
                    api_key,
                    chat_model: settings.chat_model.clone(),
                    image_model: settings.image_model.clone(),
                    timeout: settings.provider_timeout(),
                })?;
                Some(Arc::new(provider) as Arc<dyn GenerationProvider>)
            }
            None => None,
        };

        Ok(Self {
            provider,
            clock: Arc::new(SystemClock),
            node_env: settings.node_env.clone(),
        })
    }

    /// Returns true if the relays answer with placeholders.
    #[must_use]
    pub const fn is_stub(&self) -> bool {
        self.provider.is_none()
    }
}
