//! Text normalization for categorical answers and commands.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use super::state::Sex;

/// Answers accepted as "male" (compared after normalization).
const MALE_SYNONYMS: &[&str] = &[
    "niño", "nino", "masculino", "hombre", "varon", "chico", "m", "boy", "male",
];

/// Answers accepted as "female" (compared after normalization).
const FEMALE_SYNONYMS: &[&str] = &[
    "niña", "nina", "femenino", "mujer", "chica", "f", "girl", "female",
];

/// Inputs that restart the conversation from any stage.
const RESTART_COMMANDS: &[&str] = &[
    "reiniciar",
    "nuevo",
    "calcular otro",
    "empezar de nuevo",
    "restart",
    "reset",
    "new",
    "start over",
];

/// Lower-case, trim and strip diacritics so "Niña" and "nina" compare equal.
pub fn normalize(text: &str) -> String {
    text.trim()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

fn matches_any(normalized: &str, candidates: &[&str]) -> bool {
    candidates.iter().any(|c| normalize(c) == normalized)
}

/// Whether the input is one of the restart commands.
pub fn is_restart_command(text: &str) -> bool {
    matches_any(&normalize(text), RESTART_COMMANDS)
}

impl Sex {
    /// Canonicalize a free-text answer ("niña", "FEMENINO", "boy", ...).
    pub fn from_answer(text: &str) -> Option<Sex> {
        let normalized = normalize(text);
        if matches_any(&normalized, MALE_SYNONYMS) {
            Some(Sex::Male)
        } else if matches_any(&normalized, FEMALE_SYNONYMS) {
            Some(Sex::Female)
        } else {
            None
        }
    }
}
