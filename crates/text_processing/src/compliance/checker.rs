//! Stage sanitizer

use once_cell::sync::Lazy;
use regex::Regex;
use sales_assist_core::SalesStage;

use super::rules::{ForbiddenCategory, StageRules};
use crate::tidy::tidy;

static DEFAULT_SANITIZER: Lazy<StageSanitizer> = Lazy::new(StageSanitizer::default);

/// Marks the place of a removed span until connectors around it are settled
const REMOVED: char = '\u{1F}';

const CONNECTORS: &str =
    "y|o|e|el|la|los|las|de|del|con|por|para|a|al|que|un|una|en|te|tu|and|or|the|for|to";

/// Connectors left hanging at a clause end once the span after them was removed
static DANGLING_CONNECTORS: Lazy<Regex> = Lazy::new(|| {
    let connector = format!(r"\s+(?:{CONNECTORS})");
    let site = format!(r"(?:{connector})*[\s{REMOVED}]*{REMOVED}");
    Regex::new(&format!(r"(?i){site}(?:{site})*\s*(?P<end>[.,;:!?]|$)"))
        .expect("static regex")
});

/// Enforces early-stage content rules on reply text
#[derive(Debug, Clone, Default)]
pub struct StageSanitizer {
    rules: StageRules,
}

impl StageSanitizer {
    pub fn new(rules: StageRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &StageRules {
        &self.rules
    }

    /// Sanitize a reply for the given stage
    ///
    /// Every stage gets tidied. Early stages additionally lose forbidden
    /// content and end with a safe call-to-action. Pre-close and later
    /// stages keep pricing and scheduling content untouched.
    pub fn sanitize(&self, text: &str, stage: SalesStage) -> String {
        let tidied = tidy(text);
        if !stage.is_early() {
            return tidied;
        }

        let mut text = tidied;
        let mut removed = 0usize;
        loop {
            let (stripped, hits) = self.strip(&text);
            if hits == 0 {
                break;
            }
            removed += hits;
            text = tidy(&close_removal_sites(&stripped));
        }

        if removed > 0 {
            tracing::debug!(removed, stage = %stage, "Stripped forbidden early-stage content");
        }

        tidy(&self.ensure_safe_cta(&text))
    }

    /// Whether any forbidden pattern matches
    pub fn contains_forbidden(&self, text: &str) -> bool {
        self.rules.forbidden.iter().any(|rule| rule.pattern.is_match(text))
    }

    /// Categories of forbidden content present in the text
    pub fn violations(&self, text: &str) -> Vec<ForbiddenCategory> {
        let mut categories: Vec<ForbiddenCategory> = self
            .rules
            .forbidden
            .iter()
            .filter(|rule| rule.pattern.is_match(text))
            .map(|rule| rule.category)
            .collect();
        categories.dedup();
        categories
    }

    /// Remove every forbidden span, repeating until no pattern matches
    ///
    /// Removed spans are replaced with a space so neighbouring words never
    /// fuse into a new token.
    pub fn strip_forbidden(&self, text: &str) -> String {
        self.strip(text).0.replace(REMOVED, " ")
    }

    fn strip(&self, text: &str) -> (String, usize) {
        let mark = REMOVED.to_string();
        let mut current = text.to_string();
        let mut removed = 0usize;

        loop {
            let mut changed = false;
            for rule in &self.rules.forbidden {
                let hits = rule.pattern.find_iter(&current).count();
                if hits > 0 {
                    current = rule.pattern.replace_all(&current, mark.as_str()).into_owned();
                    removed += hits;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        (current, removed)
    }

    fn ensure_safe_cta(&self, text: &str) -> String {
        if self.rules.cta_markers.is_match(text) {
            return text.to_string();
        }

        let cta = &self.rules.safe_cta;
        if text.is_empty() {
            cta.clone()
        } else if text.ends_with(['.', '!', '?', '…']) {
            format!("{} {}", text, cta)
        } else {
            format!("{}. {}", text, cta)
        }
    }
}

/// Drop connectors orphaned by a removal, then blank the removal marks
fn close_removal_sites(text: &str) -> String {
    DANGLING_CONNECTORS
        .replace_all(text, "${end}")
        .replace(REMOVED, " ")
}

/// Sanitize with the built-in rules
pub fn sanitize(text: &str, stage: SalesStage) -> String {
    DEFAULT_SANITIZER.sanitize(text, stage)
}
