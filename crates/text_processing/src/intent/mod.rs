//! Intent Classification
//!
//! Maps a free-text customer message to one of the fixed sales intents.
//! Rules are evaluated in a fixed priority order and the first rule with a
//! matching cue wins, so "cuánto tiempo cuesta" resolves to `time`.
//!
//! Matching runs on accent-folded, lower-cased text. A plain cue matches a
//! whole word or phrase, optionally pluralized, so `caro` covers "caros" but
//! not "Carolina". A cue ending in `*` is a stem and matches any word that
//! starts with it, so `certific*` covers "certificado", "certificación" and
//! "certificate".
//!
//! # Example
//!
//! ```
//! use sales_assist_core::Intent;
//! use sales_assist_text_processing::intent::IntentClassifier;
//!
//! let classifier = IntentClassifier::new();
//! let result = classifier.classify_detailed("¿Dan certificado al terminar?");
//!
//! assert_eq!(result.intent, Intent::Certification);
//! assert_eq!(result.matched.as_deref(), Some("certific"));
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sales_assist_core::Intent;

use crate::signature::fold_accents;

/// Confidence reported when a rule matched
pub const MATCHED_CONFIDENCE: f32 = 0.9;
/// Confidence reported for the default intent
pub const DEFAULT_CONFIDENCE: f32 = 0.35;

/// Declarative cue table in priority order
const INTENT_RULES: &[(Intent, &[&str])] = &[
    (
        Intent::Time,
        &[
            "no tengo tiempo",
            "tiempo",
            "ocupad*",
            "horario",
            "mas tarde",
            "despues",
            "luego",
            "no me da",
            "no alcanzo",
            "no time",
            "busy",
            "later",
        ],
    ),
    (
        Intent::Price,
        &[
            "cuanto cuesta",
            "cuanto sale",
            "cuanto vale",
            "precio",
            "cuesta",
            "costo",
            "coste",
            "caro",
            "barato",
            "pagar",
            "pago",
            "cuota",
            "mensualidad",
            "descuento",
            "dinero",
            "plata",
            "price",
            "cost",
            "expensive",
            "pay",
        ],
    ),
    (
        Intent::Certification,
        &[
            "certific*",
            "diploma",
            "titulo",
            "acredit*",
            "aval*",
            "oficial",
            "accredit*",
            "degree",
        ],
    ),
    (
        Intent::Employment,
        &[
            "salida laboral",
            "trabajo",
            "empleo",
            "chamba",
            "contrat*",
            "sueldo",
            "salario",
            "job",
            "employ*",
            "hire",
            "hiring",
            "career",
        ],
    ),
    (
        Intent::Competitor,
        &[
            "otra academia",
            "otro curso",
            "otra escuela",
            "otra plataforma",
            "competencia",
            "udemy",
            "coursera",
            "platzi",
            "domestika",
            "youtube",
            "another course",
            "other academy",
        ],
    ),
    (
        Intent::Pitch,
        &[
            "de que trata",
            "que es",
            "que incluye",
            "como funciona",
            "cuentame",
            "info",
            "informacion",
            "detalle",
            "temario",
            "programa",
            "tell me more",
            "what is",
            "how does it work",
        ],
    ),
];

/// Compile a cue: stems match as word prefixes, everything else as whole words
fn cue_regex(cue: &str) -> Result<Regex, regex::Error> {
    match cue.strip_suffix('*') {
        Some(stem) => Regex::new(&format!(r"\b{}", regex::escape(stem))),
        None => Regex::new(&format!(r"\b{}(?:e?s)?\b", regex::escape(cue))),
    }
}

/// One compiled rule: the intent plus one stem regex per cue
struct CompiledIntentRule {
    intent: Intent,
    cues: Vec<(&'static str, Regex)>,
}

static DEFAULT_RULES: Lazy<Vec<CompiledIntentRule>> = Lazy::new(|| {
    INTENT_RULES
        .iter()
        .map(|(intent, cues)| CompiledIntentRule {
            intent: *intent,
            cues: cues
                .iter()
                .filter_map(|cue| {
                    cue_regex(cue)
                        .map_err(|e| tracing::warn!(cue, error = %e, "Skipping invalid intent cue"))
                        .ok()
                        .map(|re| (cue.trim_end_matches('*'), re))
                })
                .collect(),
        })
        .collect()
});

static DEFAULT_CLASSIFIER: Lazy<IntentClassifier> = Lazy::new(IntentClassifier::new);

/// Classification result with the cue that decided it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub intent: Intent,
    pub confidence: f32,
    /// Cue that matched, `None` when the default intent was chosen
    pub matched: Option<String>,
}

impl Classification {
    fn fallback() -> Self {
        Self {
            intent: Intent::General,
            confidence: DEFAULT_CONFIDENCE,
            matched: None,
        }
    }
}

/// Rule-based intent classifier
pub struct IntentClassifier {
    rules: &'static [CompiledIntentRule],
}

impl IntentClassifier {
    /// Create a classifier over the built-in rule table
    pub fn new() -> Self {
        Self {
            rules: DEFAULT_RULES.as_slice(),
        }
    }

    /// Classify a message, returning only the intent
    pub fn classify(&self, text: &str) -> Intent {
        self.classify_detailed(text).intent
    }

    /// Classify a message, reporting the cue and a confidence score
    pub fn classify_detailed(&self, text: &str) -> Classification {
        let folded = fold_accents(text);
        if folded.trim().is_empty() {
            return Classification::fallback();
        }

        for rule in self.rules {
            if let Some((cue, _)) = rule.cues.iter().find(|(_, re)| re.is_match(&folded)) {
                tracing::trace!(intent = %rule.intent, cue, "Intent rule matched");
                return Classification {
                    intent: rule.intent,
                    confidence: MATCHED_CONFIDENCE,
                    matched: Some((*cue).to_string()),
                };
            }
        }

        Classification::fallback()
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Classify with the shared default classifier
pub fn classify(text: &str) -> Intent {
    DEFAULT_CLASSIFIER.classify(text)
}

/// Detailed classification with the shared default classifier
pub fn classify_detailed(text: &str) -> Classification {
    DEFAULT_CLASSIFIER.classify_detailed(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_intent() {
        let cases = [
            ("no tengo tiempo para esto", Intent::Time),
            ("Estoy muy ocupada esta semana", Intent::Time),
            ("¿Cuánto cuesta el curso?", Intent::Price),
            ("Me parece caro", Intent::Price),
            ("¿Entregan certificado?", Intent::Certification),
            ("¿Me sirve para conseguir trabajo?", Intent::Employment),
            ("En Platzi hay uno parecido", Intent::Competitor),
            ("¿De qué trata el programa?", Intent::Pitch),
            ("hola", Intent::General),
        ];

        for (text, expected) in cases {
            assert_eq!(classify(text), expected, "message: {text}");
        }
    }

    #[test]
    fn test_priority_order() {
        // time beats price
        assert_eq!(classify("no tengo tiempo y además es caro"), Intent::Time);
        // price beats competitor
        assert_eq!(classify("en udemy el precio es menor"), Intent::Price);
        // certification beats pitch
        assert_eq!(classify("info sobre el diploma"), Intent::Certification);
    }

    #[test]
    fn test_accent_and_case_insensitive() {
        assert_eq!(classify("CUÁNTO CUESTA"), Intent::Price);
        assert_eq!(classify("cuanto cuesta"), Intent::Price);
        assert_eq!(classify("TÍTULO oficial?"), Intent::Certification);
    }

    #[test]
    fn test_cues_anchor_at_word_start() {
        // "porque es" must not trigger the "que es" pitch cue
        assert_eq!(classify("porque estoy aquí"), Intent::General);
        assert_eq!(classify("impago"), Intent::General);
    }

    #[test]
    fn test_word_cues_do_not_swallow_longer_words() {
        assert_eq!(classify("Lo vi en otra plataforma más completa"), Intent::Competitor);
        assert_eq!(classify("Hola, soy Carolina"), Intent::General);
        assert_eq!(classify("No tengo la costumbre de estudiar"), Intent::General);
        assert_eq!(classify("Creo que estoy listo"), Intent::General);
    }

    #[test]
    fn test_word_cues_accept_plurals() {
        assert_eq!(classify("Los precios me parecen caros"), Intent::Price);
        assert_eq!(classify("¿Hay descuentos?"), Intent::Price);
        assert_eq!(classify("¿Cuántas mensualidades son?"), Intent::Price);
        assert_eq!(classify("Quiero más detalles"), Intent::Pitch);
    }

    #[test]
    fn test_stems_match_word_prefixes() {
        assert_eq!(classify("¿Está acreditado?"), Intent::Certification);
        assert_eq!(classify("¿Las empresas contratan egresados?"), Intent::Employment);
        assert_eq!(classify_detailed("Estoy ocupadísima").matched.as_deref(), Some("ocupad"));
    }

    #[test]
    fn test_empty_message_is_general() {
        let result = classify_detailed("   ");
        assert_eq!(result.intent, Intent::General);
        assert_eq!(result.confidence, DEFAULT_CONFIDENCE);
        assert!(result.matched.is_none());
    }

    #[test]
    fn test_detailed_reports_cue() {
        let result = classify_detailed("Estoy ocupado");
        assert_eq!(result.intent, Intent::Time);
        assert_eq!(result.confidence, MATCHED_CONFIDENCE);
        assert_eq!(result.matched.as_deref(), Some("ocupad"));
    }

    #[test]
    fn test_classify_is_total() {
        for text in ["", "🙂", "12345", "¿?¡!", "ünïcödé"] {
            let _ = classify(text);
        }
    }
}
