//! Promotion Selector
//!
//! Picks the first active promotion for a `(channel, stage, intent)`
//! context and appends its short call-to-action to a reply. Declaration
//! order is priority.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;

use sales_assist_config::Promotion;
use sales_assist_core::{AppliedPromotion, Intent, SalesStage};

/// Request context a promotion is matched against
#[derive(Debug, Clone, Copy)]
pub struct PromotionContext<'a> {
    pub channel: &'a str,
    pub stage: SalesStage,
    pub intent: Intent,
}

impl<'a> PromotionContext<'a> {
    pub fn new(channel: &'a str, stage: SalesStage, intent: Intent) -> Self {
        Self {
            channel,
            stage,
            intent,
        }
    }
}

/// Empty tag set means unrestricted
fn tag_matches(tags: &[String], value: &str) -> bool {
    tags.is_empty() || tags.iter().any(|tag| tag.trim().eq_ignore_ascii_case(value))
}

/// Whether a promotion applies to the context at `now`
pub fn is_active(promotion: &Promotion, ctx: &PromotionContext<'_>, now: DateTime<Utc>) -> bool {
    promotion.starts_at <= now
        && now <= promotion.ends_at
        && tag_matches(&promotion.channels, ctx.channel)
        && tag_matches(&promotion.stages, ctx.stage.as_str())
        && tag_matches(&promotion.intents, ctx.intent.as_str())
}

/// Append a call-to-action, or `None` if it would exceed `max_chars`
///
/// An empty reply never receives a CTA.
pub fn append_cta(reply: &str, cta: &str, max_chars: usize) -> Option<String> {
    let reply_trimmed = reply.trim_end();
    let cta = cta.trim();
    if reply_trimmed.is_empty() || cta.is_empty() {
        return None;
    }

    let combined = if reply_trimmed.ends_with(['.', '!', '?', '…']) {
        format!("{} {}", reply_trimmed, cta)
    } else {
        format!("{}. {}", reply_trimmed, cta)
    };

    if combined.chars().count() > max_chars {
        tracing::debug!(
            length = combined.chars().count(),
            max_chars,
            "Promotion CTA dropped, reply too long"
        );
        return None;
    }
    Some(combined)
}

/// Promotion Selector over a replaceable catalog
pub struct PromotionSelector {
    promotions: RwLock<Arc<Vec<Promotion>>>,
    max_chars: usize,
}

impl PromotionSelector {
    pub fn new(promotions: Vec<Promotion>, max_chars: usize) -> Self {
        Self {
            promotions: RwLock::new(Arc::new(promotions)),
            max_chars,
        }
    }

    /// Replace the catalog (settings reload)
    pub fn replace(&self, promotions: Vec<Promotion>) {
        let count = promotions.len();
        *self.promotions.write() = Arc::new(promotions);
        tracing::info!(promotions = count, "Promotion catalog replaced");
    }

    pub fn len(&self) -> usize {
        self.promotions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First promotion active for the context at `now`
    pub fn select_active(&self, ctx: &PromotionContext<'_>, now: DateTime<Utc>) -> Option<Promotion> {
        self.promotions
            .read()
            .iter()
            .find(|promotion| is_active(promotion, ctx, now))
            .cloned()
    }

    /// Append the active promotion's CTA to the reply
    ///
    /// Returns the reply (extended or unchanged) and the promotion when its
    /// CTA was appended.
    pub fn apply_cta(
        &self,
        reply: &str,
        ctx: &PromotionContext<'_>,
        now: DateTime<Utc>,
    ) -> (String, Option<AppliedPromotion>) {
        let Some(promotion) = self.select_active(ctx, now) else {
            return (reply.to_string(), None);
        };

        match append_cta(reply, &promotion.short_cta, self.max_chars) {
            Some(text) => {
                tracing::debug!(promotion = %promotion.id, "Promotion CTA appended");
                (
                    text,
                    Some(AppliedPromotion {
                        id: promotion.id,
                        badge: promotion.badge,
                        label: promotion.label,
                    }),
                )
            }
            None => (reply.to_string(), None),
        }
    }
}
