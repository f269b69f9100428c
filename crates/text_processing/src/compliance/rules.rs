//! Early-stage content rules
//!
//! Before the pre-close stage a reply must not quote prices, point to a
//! payment link or push a call or meeting. The patterns below are applied
//! in order; longer phrases come first so "te envío los precios" is removed
//! as a whole before the bare pricing word is considered.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Category of forbidden early-stage content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForbiddenCategory {
    /// Offers to send the price list
    SendPricing,
    /// Payment or enrollment links, raw URLs
    PaymentLink,
    /// Concrete amounts such as "$200", "USD 99" or "150 dólares"
    PriceAmount,
    /// Bare pricing vocabulary
    PricingWord,
    /// Calls, demos, meetings, calendars
    Scheduling,
}

/// Built-in forbidden pattern table, in application order
pub const FORBIDDEN_PATTERNS: &[(ForbiddenCategory, &str)] = &[
    (
        ForbiddenCategory::SendPricing,
        r"(?i)\b(?:te\s+|le\s+)?(?:env[ií]o|mando|paso|comparto|enviar[eé]|mandar[eé]|pasar[eé]|compartir[eé])\s+(?:(?:los|las|el|la)\s+)?(?:lista\s+de\s+precios|precios?|costos?|tarifas?)\b",
    ),
    (
        ForbiddenCategory::SendPricing,
        r"(?i)\b(?:i(?:'ll|\s+will)\s+)?send\s+(?:you\s+)?(?:the\s+|our\s+)?(?:price\s+list|pricing|prices?)\b",
    ),
    (
        ForbiddenCategory::PaymentLink,
        r"(?i)\b(?:link|enlace)\s+(?:de|para)\s+(?:pago|pagar|inscripci[oó]n|compra)\b",
    ),
    (ForbiddenCategory::PaymentLink, r"(?i)\bpayment\s+link\b"),
    (ForbiddenCategory::PaymentLink, r"(?i)\bhttps?://\S+"),
    (ForbiddenCategory::PaymentLink, r"(?i)\bwww\.\S+"),
    (ForbiddenCategory::PriceAmount, r"(?i)(?:US)?\$\s?\d[\d.,]*"),
    (
        ForbiddenCategory::PriceAmount,
        r"(?i)(?:\b(?:usd|eur|s/\.?)|€)\s?\d[\d.,]*",
    ),
    (
        ForbiddenCategory::PriceAmount,
        r"(?i)\b\d[\d.,]*\s?(?:(?:usd|eur|euros?|d[oó]lares|pesos|soles)\b|€)",
    ),
    (
        ForbiddenCategory::PricingWord,
        r"(?i)\b(?:precios?|costos?|costes?|cuesta|cuestan|tarifas?|mensualidad(?:es)?|cuotas?|inversi[oó]n|descuentos?|prices?|pricing|costs?)\b",
    ),
    (
        ForbiddenCategory::Scheduling,
        r"(?i)\b(?:agend\w*|videollamad\w*|llamad\w*|llam(?:ar|o|e|emos)\w*|citas?|reuni[oó]n(?:es)?|demos?|calendly|zoom|book\s+a\s+(?:call|demo)|schedul\w*|calls?|meetings?)\b",
    ),
];

/// Call-to-action appended when an early reply lacks one
pub const SAFE_CTA: &str = "¿Prefieres que te comparta la ruta rápida o el plan completo?";

/// Words that mark a reply as already carrying a safe call-to-action
pub const SAFE_CTA_MARKERS: &str = r"(?i)\b(?:ruta|plan|route)\b";

/// A compiled forbidden pattern
#[derive(Debug, Clone)]
pub struct ForbiddenRule {
    pub category: ForbiddenCategory,
    pub pattern: Regex,
}

/// Compiled early-stage rules
#[derive(Debug, Clone)]
pub struct StageRules {
    pub(crate) forbidden: Vec<ForbiddenRule>,
    pub(crate) cta_markers: Regex,
    pub(crate) safe_cta: String,
}

impl StageRules {
    /// Compile a custom rule set; invalid patterns are skipped with a warning
    pub fn new<'a>(
        patterns: impl IntoIterator<Item = (ForbiddenCategory, &'a str)>,
        cta_markers: &str,
        safe_cta: impl Into<String>,
    ) -> Result<Self, regex::Error> {
        let forbidden = patterns
            .into_iter()
            .filter_map(|(category, pattern)| match Regex::new(pattern) {
                Ok(pattern) => Some(ForbiddenRule { category, pattern }),
                Err(e) => {
                    tracing::warn!(?category, error = %e, "Skipping invalid forbidden pattern");
                    None
                }
            })
            .collect();

        Ok(Self {
            forbidden,
            cta_markers: Regex::new(cta_markers)?,
            safe_cta: safe_cta.into(),
        })
    }

    /// Built-in rules
    pub fn builtin() -> Self {
        let forbidden = FORBIDDEN_PATTERNS
            .iter()
            .filter_map(|(category, pattern)| {
                Regex::new(pattern)
                    .ok()
                    .map(|pattern| ForbiddenRule {
                        category: *category,
                        pattern,
                    })
            })
            .collect();

        Self {
            forbidden,
            cta_markers: Regex::new(SAFE_CTA_MARKERS).expect("static regex"),
            safe_cta: SAFE_CTA.to_string(),
        }
    }

    pub fn forbidden(&self) -> &[ForbiddenRule] {
        &self.forbidden
    }

    pub fn safe_cta(&self) -> &str {
        &self.safe_cta
    }
}

impl Default for StageRules {
    fn default() -> Self {
        Self::builtin()
    }
}
