//! Generator construction from settings

use std::sync::Arc;

use sales_assist_config::LlmConfig;
use sales_assist_core::ReplyGenerator;

use crate::adapter::GeneratorAdapter;
use crate::backend::{BackendConfig, OpenAIBackend};
use crate::LlmError;

/// Build the premium reply generator, `None` when the provider is disabled
pub fn create_generator(config: &LlmConfig) -> Result<Option<Arc<dyn ReplyGenerator>>, LlmError> {
    if !config.enabled {
        tracing::info!("Generative provider disabled, premium replies use variants");
        return Ok(None);
    }

    let backend = OpenAIBackend::new(BackendConfig::from(config))?;
    tracing::info!(
        endpoint = %config.endpoint,
        model = %config.model,
        "Generative provider configured"
    );

    Ok(Some(Arc::new(GeneratorAdapter::new(backend))))
}
