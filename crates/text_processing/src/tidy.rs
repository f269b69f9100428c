//! Reply tidying
//!
//! Cleans artifacts left behind by template substitution and content
//! stripping: runs of whitespace, stray spaces before punctuation, repeated
//! periods or commas, and back-to-back duplicate greetings such as
//! "Hola Ana, Hola Ana,". Every step only removes text, and the pass is
//! repeated until nothing changes, so `tidy(tidy(x)) == tidy(x)`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::signature::fold_accents;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

static SPACE_BEFORE_PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r" +([,.;:!?])").expect("static regex"));

static REPEATED_PERIODS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.{2,}").expect("static regex"));

static REPEATED_COMMAS: Lazy<Regex> = Lazy::new(|| Regex::new(r",{2,}").expect("static regex"));

/// Comma, semicolon or colon immediately followed by a period collapses to the period
static PUNCT_BEFORE_PERIOD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[,;:]+ ?\.").expect("static regex"));

/// Period followed by a dangling comma
static PERIOD_THEN_COMMA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\. ?[,;:]+").expect("static regex"));

/// Question or exclamation marks left empty after stripping
static EMPTY_INVERTED: Lazy<Regex> = Lazy::new(|| Regex::new(r"¿ ?\?|¡ ?!").expect("static regex"));

static LEADING_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\s,.;:]+").expect("static regex"));

static TRAILING_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s,;:]+$").expect("static regex"));

/// Greeting word plus up to two name words, closed by a comma or exclamation
static GREETING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:hola|hello|hi|hey|buenas|buenos d[ií]as)\b(?: [\p{L}'-]+){0,2} ?[,!]",
    )
    .expect("static regex")
});

/// Tidy a reply text; idempotent
pub fn tidy(text: &str) -> String {
    let mut current = tidy_pass(text);
    loop {
        let next = tidy_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn tidy_pass(text: &str) -> String {
    let text = WHITESPACE.replace_all(text, " ");
    let text = SPACE_BEFORE_PUNCT.replace_all(&text, "$1");
    let text = REPEATED_PERIODS.replace_all(&text, ".");
    let text = REPEATED_COMMAS.replace_all(&text, ",");
    let text = PUNCT_BEFORE_PERIOD.replace_all(&text, ".");
    let text = PERIOD_THEN_COMMA.replace_all(&text, ".");
    let text = EMPTY_INVERTED.replace_all(&text, "");
    let text = collapse_duplicate_greetings(&text);
    let text = LEADING_PUNCT.replace_all(&text, "");
    let text = TRAILING_PUNCT.replace_all(&text, "");
    text.trim().to_string()
}

/// Drop a greeting that repeats the one right before it
fn collapse_duplicate_greetings(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut copied_to = 0;
    let mut previous: Option<(usize, String)> = None;

    for m in GREETING.find_iter(text) {
        let key = greeting_key(m.as_str());
        if let Some((prev_end, prev_key)) = &previous {
            let adjacent = text[*prev_end..m.start()].trim().is_empty();
            if adjacent && *prev_key == key {
                out.push_str(&text[copied_to..*prev_end]);
                copied_to = m.end();
                previous = Some((m.end(), key));
                continue;
            }
        }
        previous = Some((m.end(), key));
    }

    out.push_str(&text[copied_to..]);
    out
}

fn greeting_key(greeting: &str) -> String {
    fold_accents(greeting.trim_end_matches([',', '!']).trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(tidy("  Hola   Ana,\n\t¿cómo   estás? "), "Hola Ana, ¿cómo estás?");
    }

    #[test]
    fn test_space_before_punctuation() {
        assert_eq!(tidy("Perfecto , te cuento ."), "Perfecto, te cuento.");
    }

    #[test]
    fn test_repeated_punctuation() {
        assert_eq!(tidy("Genial.. Te cuento,, todo."), "Genial. Te cuento, todo.");
        assert_eq!(tidy("Listo, . Seguimos"), "Listo. Seguimos");
    }

    #[test]
    fn test_duplicate_greeting_collapsed() {
        assert_eq!(
            tidy("Hola Ana, Hola Ana, ¿te cuento la ruta?"),
            "Hola Ana, ¿te cuento la ruta?"
        );
        assert_eq!(tidy("Hola Ana, hola Ana, hola Ana, listo."), "Hola Ana, listo.");
        assert_eq!(tidy("Hello Ana, Hello Ana, ready?"), "Hello Ana, ready?");
    }

    #[test]
    fn test_distinct_greetings_kept() {
        assert_eq!(tidy("Hola Ana, Hola Luis, ¿listos?"), "Hola Ana, Hola Luis, ¿listos?");
    }

    #[test]
    fn test_dangling_edges_removed() {
        assert_eq!(tidy(", . Te cuento la ruta ,"), "Te cuento la ruta");
        assert_eq!(tidy("Perfecto. ¿ ?"), "Perfecto.");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "Hola Ana, Hola Ana,  te cuento . . la ruta,, ok",
            " , ¿ ? hola, hola, bien .",
            "Perfecto:. ya",
            "",
            "...",
        ];
        for sample in samples {
            let once = tidy(sample);
            assert_eq!(tidy(&once), once, "sample: {sample:?}");
        }
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(tidy(""), "");
        assert_eq!(tidy("   "), "");
    }
}
