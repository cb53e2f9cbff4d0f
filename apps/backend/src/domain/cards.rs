//! Fixed card catalogs and catalog validation.
//!
//! The value deck is exactly 36 unique card names; the theme catalog holds
//! the 10 candidate purpose cards. Catalog violations are configuration
//! errors and abort startup.

use std::collections::HashSet;

use crate::errors::domain::{DomainError, InfraErrorKind};

/// Number of value cards in a full deck.
pub const DECK_SIZE: usize = 36;

/// Number of theme cards in the catalog.
pub const THEME_COUNT: usize = 10;

/// The 36-card value vocabulary.
pub const VALUE_CARDS: [&str; DECK_SIZE] = [
    "Growth",
    "Honesty",
    "Freedom",
    "Courage",
    "Kindness",
    "Curiosity",
    "Stability",
    "Adventure",
    "Family",
    "Friendship",
    "Health",
    "Creativity",
    "Justice",
    "Gratitude",
    "Humor",
    "Learning",
    "Independence",
    "Belonging",
    "Achievement",
    "Balance",
    "Faith",
    "Generosity",
    "Patience",
    "Passion",
    "Responsibility",
    "Simplicity",
    "Tradition",
    "Wisdom",
    "Wealth",
    "Recognition",
    "Harmony",
    "Challenge",
    "Service",
    "Beauty",
    "Trust",
    "Play",
];

/// The 10 theme cards a room votes over.
pub const THEME_CARDS: [&str; THEME_COUNT] = [
    "A life I would be proud of",
    "What matters when things get hard",
    "The person I want to become",
    "What I bring to the people around me",
    "A year from now",
    "What I refuse to compromise on",
    "Where I find my energy",
    "What home means to me",
    "The legacy I want to leave",
    "What I am still learning",
];

/// Validate both catalogs at startup. A wrong cardinality or a duplicate
/// name is fatal; there is no recovery path for a miscounted deck.
pub fn validate_catalogs() -> Result<(), DomainError> {
    if VALUE_CARDS.len() != DECK_SIZE {
        return Err(DomainError::infra(
            InfraErrorKind::DataCorruption,
            format!(
                "value catalog has {} cards, expected {DECK_SIZE}",
                VALUE_CARDS.len()
            ),
        ));
    }
    let unique: HashSet<&str> = VALUE_CARDS.iter().copied().collect();
    if unique.len() != DECK_SIZE {
        return Err(DomainError::infra(
            InfraErrorKind::DataCorruption,
            "value catalog contains duplicate names",
        ));
    }

    if THEME_CARDS.len() != THEME_COUNT {
        return Err(DomainError::infra(
            InfraErrorKind::DataCorruption,
            format!(
                "theme catalog has {} cards, expected {THEME_COUNT}",
                THEME_CARDS.len()
            ),
        ));
    }
    let unique_themes: HashSet<&str> = THEME_CARDS.iter().copied().collect();
    if unique_themes.len() != THEME_COUNT {
        return Err(DomainError::infra(
            InfraErrorKind::DataCorruption,
            "theme catalog contains duplicate names",
        ));
    }

    Ok(())
}

/// First-occurrence-wins deduplication by card name.
///
/// The realtime channel may deliver a transient state where a card appears
/// twice mid-write; this keeps the display stable. Persisted state is
/// protected by the mutation protocol, not by this helper.
pub fn dedupe_by_first_occurrence(names: &[String]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(names.len());
    let mut out = Vec::with_capacity(names.len());
    for name in names {
        if seen.insert(name.as_str()) {
            out.push(name.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogs_are_valid() {
        validate_catalogs().expect("shipped catalogs must validate");
    }

    #[test]
    fn value_catalog_has_36_unique_names() {
        let unique: HashSet<&str> = VALUE_CARDS.iter().copied().collect();
        assert_eq!(unique.len(), 36);
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let names = vec![
            "Trust".to_string(),
            "Play".to_string(),
            "Trust".to_string(),
            "Wisdom".to_string(),
        ];
        assert_eq!(
            dedupe_by_first_occurrence(&names),
            vec!["Trust".to_string(), "Play".to_string(), "Wisdom".to_string()]
        );
    }

    #[test]
    fn dedupe_is_identity_on_unique_input() {
        let names: Vec<String> = VALUE_CARDS.iter().map(|s| s.to_string()).collect();
        assert_eq!(dedupe_by_first_occurrence(&names), names);
    }
}
