//! Text signatures
//!
//! A signature is the identity key under which reply statistics are
//! accumulated. Two texts that differ only in case, accents, punctuation
//! or whitespace share a signature.

use unicode_segmentation::UnicodeSegmentation;

/// Lowercase and strip Spanish diacritics
pub fn fold_accents(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}

/// Compute the signature of a reply text, capped at `max_chars` graphemes
pub fn text_signature(text: &str, max_chars: usize) -> String {
    let folded = fold_accents(text);
    let words: Vec<String> = folded
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect();
    let joined = words.join(" ");

    joined.graphemes(true).take(max_chars).collect::<String>().trim_end().to_string()
}
