//! Sales assistant orchestration
//!
//! Wires the reply path: classify, produce raw text (generated or from the
//! variant store), sanitize for the stage, apply a promotion, explain, then
//! record the reply as shown. Only input errors fail a request; every
//! collaborator failure degrades to the scripted path.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use sales_assist_config::AssistantConfig;
use sales_assist_core::{
    Intent, RatingRequest, ReplyGenerator, ReplyRequest, ReplyResponse, ReplySource, Result,
};
use sales_assist_persistence::{StatsAggregator, StatsRow};
use sales_assist_text_processing::{IntentClassifier, StageSanitizer};

use crate::explain::{build_next_step, build_why, WhyContext};
use crate::promotions::{PromotionContext, PromotionSelector};
use crate::prompt::build_reply_prompt;
use crate::variants::VariantStore;

/// The sales assistant
pub struct SalesAssistant {
    classifier: IntentClassifier,
    sanitizer: StageSanitizer,
    variants: Arc<VariantStore>,
    promotions: Arc<PromotionSelector>,
    stats: Arc<StatsAggregator>,
    generator: Option<Arc<dyn ReplyGenerator>>,
    premium_enabled: bool,
    default_name: String,
}

impl SalesAssistant {
    pub fn new(
        config: &AssistantConfig,
        variants: Arc<VariantStore>,
        promotions: Arc<PromotionSelector>,
        stats: Arc<StatsAggregator>,
    ) -> Self {
        Self {
            classifier: IntentClassifier::new(),
            sanitizer: StageSanitizer::default(),
            variants,
            promotions,
            stats,
            generator: None,
            premium_enabled: config.premium_enabled,
            default_name: config.default_customer_name.clone(),
        }
    }

    /// Attach the generative provider used for premium replies
    pub fn with_generator(mut self, generator: Option<Arc<dyn ReplyGenerator>>) -> Self {
        self.generator = generator;
        self
    }

    pub fn variants(&self) -> &Arc<VariantStore> {
        &self.variants
    }

    pub fn promotions(&self) -> &Arc<PromotionSelector> {
        &self.promotions
    }

    pub fn stats(&self) -> &Arc<StatsAggregator> {
        &self.stats
    }

    pub fn generator(&self) -> Option<&Arc<dyn ReplyGenerator>> {
        self.generator.as_ref()
    }

    /// Generate a reply
    pub async fn generate_reply(&self, request: &ReplyRequest) -> Result<ReplyResponse> {
        self.generate_reply_at(request, Utc::now()).await
    }

    /// Generate a reply, evaluating promotions at `now`
    pub async fn generate_reply_at(
        &self,
        request: &ReplyRequest,
        now: DateTime<Utc>,
    ) -> Result<ReplyResponse> {
        request.validate()?;

        let classification = self.classifier.classify_detailed(&request.customer_message);
        let intent = classification.intent;
        let stage = request.stage;

        let (raw, source) = match self.premium_reply(request, intent).await {
            Some(text) => (text, ReplySource::Generated),
            None => (
                self.variants.select(intent, stage, request.name()),
                ReplySource::Variants,
            ),
        };

        let sanitized = self.sanitizer.sanitize(&raw, stage);
        let ctx = PromotionContext::new(request.channel(), stage, intent);
        let (reply_text, promotion) = self.promotions.apply_cta(&sanitized, &ctx, now);

        let why_text = build_why(
            &WhyContext::new(intent)
                .with_name(request.name())
                .with_stage(stage)
                .with_context_note(request.context_note.as_deref()),
        );
        let next_step_text = build_next_step(stage);

        if let Err(e) = self.stats.record_shown(intent, stage, &reply_text).await {
            tracing::warn!(intent = %intent, stage = %stage, error = %e, "Failed to record shown reply");
            metrics::counter!("sales_assist_persistence_errors_total", "op" => "record_shown")
                .increment(1);
        }

        tracing::info!(
            intent = %intent,
            stage = %stage,
            source = source.as_str(),
            promotion = promotion.as_ref().map(|p| p.id.as_str()).unwrap_or("none"),
            "Reply generated"
        );

        Ok(ReplyResponse {
            reply_text,
            why_text,
            next_step_text,
            intent_tag: intent,
            stage,
            confidence_score: classification.confidence,
            source,
            promotion,
        })
    }

    /// Try the generative provider; `None` means use the variant store
    async fn premium_reply(&self, request: &ReplyRequest, intent: Intent) -> Option<String> {
        if !request.premium {
            return None;
        }

        let generator = match (&self.generator, self.premium_enabled) {
            (Some(generator), true) => generator,
            _ => {
                tracing::debug!("Premium reply requested without an available generator");
                Self::count_fallback("unavailable");
                return None;
            }
        };

        let prompt = build_reply_prompt(request, intent, request.stage, &self.default_name);
        match generator.generate(&prompt).await {
            Ok(text) if !text.trim().is_empty() => Some(text),
            Ok(_) => {
                tracing::warn!(generator = generator.name(), "Generator returned an empty reply");
                Self::count_fallback("empty");
                None
            }
            Err(e) => {
                tracing::warn!(generator = generator.name(), error = %e, "Generation failed, using variants");
                Self::count_fallback("error");
                None
            }
        }
    }

    fn count_fallback(reason: &'static str) {
        metrics::counter!("sales_assist_llm_fallbacks_total", "reason" => reason).increment(1);
    }

    /// Record a customer rating
    ///
    /// Invalid input is rejected; a persistence failure is logged and the
    /// rating still counts in memory.
    pub async fn record_rating(&self, request: &RatingRequest) -> Result<()> {
        request.validate()?;

        if let Err(e) = self
            .stats
            .record_rating(request.intent_tag, request.stage, &request.reply_text, request.rating)
            .await
        {
            tracing::warn!(
                intent = %request.intent_tag,
                stage = %request.stage,
                error = %e,
                "Failed to persist rating"
            );
            metrics::counter!("sales_assist_persistence_errors_total", "op" => "record_rating")
                .increment(1);
        }

        tracing::info!(
            intent = %request.intent_tag,
            stage = %request.stage,
            rating = request.rating.as_str(),
            "Rating recorded"
        );
        Ok(())
    }

    /// Aggregated stats rows
    pub async fn stats_rows(&self) -> Vec<StatsRow> {
        self.stats.compute_rows().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sales_assist_core::{Error, Rating, ReplyPrompt, SalesStage};
    use sales_assist_persistence::InMemoryStore;
    use sales_assist_text_processing::StageSanitizer;
    use serde_json::json;

    struct ScriptedGenerator(std::result::Result<&'static str, Error>);

    #[async_trait]
    impl ReplyGenerator for ScriptedGenerator {
        async fn generate(&self, _prompt: &ReplyPrompt) -> Result<String> {
            self.0.clone().map(str::to_string)
        }

        async fn is_available(&self) -> bool {
            self.0.is_ok()
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    async fn assistant() -> SalesAssistant {
        let config = AssistantConfig::default();
        let variants = Arc::new(VariantStore::new(&config));
        variants.load(json!({
            "time": {
                "discovery": [
                    {"text": "Hola {name}, Hola {name}, el curso cuesta $99 y te paso el link de pago.", "weight": 1}
                ]
            }
        }));
        let stats = Arc::new(StatsAggregator::load(Arc::new(InMemoryStore::new()), "stats", 160).await);
        let promotions = Arc::new(PromotionSelector::new(Vec::new(), config.promo_max_chars));
        SalesAssistant::new(&config, variants, promotions, stats)
    }

    #[tokio::test]
    async fn test_time_pressure_discovery_scenario() {
        let assistant = assistant().await;
        let request = ReplyRequest::new("no tengo tiempo para esto", SalesStage::Discovery);

        let response = assistant.generate_reply(&request).await.unwrap();

        assert_eq!(response.intent_tag, Intent::Time);
        assert_eq!(response.source, ReplySource::Variants);
        assert!(response.why_text.contains("sesiones cortas diarias"));
        assert!(!StageSanitizer::default().contains_forbidden(&response.reply_text));
        assert_eq!(response.reply_text.matches("Hola amigo").count(), 1);
        assert!(!response.next_step_text.is_empty());
    }

    #[tokio::test]
    async fn test_empty_message_rejected_without_side_effects() {
        let assistant = assistant().await;
        let err = assistant
            .generate_reply(&ReplyRequest::new("   ", SalesStage::Discovery))
            .await
            .unwrap_err();

        assert!(err.is_input_error());
        assert!(assistant.stats_rows().await.is_empty());
    }

    #[tokio::test]
    async fn test_reply_recorded_as_shown() {
        let assistant = assistant().await;
        let response = assistant
            .generate_reply(&ReplyRequest::new("estoy ocupado", SalesStage::Discovery).with_name("Ana"))
            .await
            .unwrap();

        let rows = assistant.stats_rows().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].shown, 1);
        assert_eq!(rows[0].text, response.reply_text);
    }

    #[tokio::test]
    async fn test_premium_uses_generator() {
        let assistant = assistant().await.with_generator(Some(Arc::new(ScriptedGenerator(Ok(
            "Hola Ana, ¿te cuento la ruta rápida?",
        )))));
        let request = ReplyRequest::new("no tengo tiempo", SalesStage::Discovery)
            .with_name("Ana")
            .premium();

        let response = assistant.generate_reply(&request).await.unwrap();
        assert_eq!(response.source, ReplySource::Generated);
        assert_eq!(response.reply_text, "Hola Ana, ¿te cuento la ruta rápida?");
    }

    #[tokio::test]
    async fn test_premium_failure_falls_back_to_variants() {
        let assistant = assistant().await.with_generator(Some(Arc::new(ScriptedGenerator(Err(
            Error::Generation("provider down".into()),
        )))));
        let request = ReplyRequest::new("no tengo tiempo", SalesStage::Discovery).premium();

        let response = assistant.generate_reply(&request).await.unwrap();
        assert_eq!(response.source, ReplySource::Variants);
    }

    #[tokio::test]
    async fn test_premium_empty_reply_falls_back() {
        let assistant = assistant()
            .await
            .with_generator(Some(Arc::new(ScriptedGenerator(Ok("   ")))));
        let request = ReplyRequest::new("no tengo tiempo", SalesStage::Discovery).premium();

        let response = assistant.generate_reply(&request).await.unwrap();
        assert_eq!(response.source, ReplySource::Variants);
    }

    #[tokio::test]
    async fn test_generated_reply_is_sanitized() {
        let assistant = assistant().await.with_generator(Some(Arc::new(ScriptedGenerator(Ok(
            "Claro, el precio es $150. ¿Agendamos una llamada?",
        )))));
        let request = ReplyRequest::new("¿cuánto cuesta?", SalesStage::Integration).premium();

        let response = assistant.generate_reply(&request).await.unwrap();
        assert_eq!(response.source, ReplySource::Generated);
        assert!(!StageSanitizer::default().contains_forbidden(&response.reply_text));
    }

    #[tokio::test]
    async fn test_rating_flow() {
        let assistant = assistant().await;
        let rating = RatingRequest {
            intent_tag: Intent::Price,
            stage: SalesStage::Close,
            reply_text: "Texto sin mostrar".to_string(),
            rating: Rating::Bad,
        };

        assistant.record_rating(&rating).await.unwrap();

        let rows = assistant.stats_rows().await;
        assert_eq!(rows[0].shown, 1);
        assert_eq!(rows[0].bad, 1);
        assert_eq!(rows[0].winrate, 0.0);
    }
}
