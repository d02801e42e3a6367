use rand::seq::SliceRandom;
use rand::Rng;

use crate::quiz::catalog::{CountryCatalog, MIN_COUNTRIES};
use crate::quiz::{Country, Question};

const DISTRACTORS: usize = MIN_COUNTRIES - 1;

/// Picks a target and three distinct distractors, then shuffles them together.
///
/// Sampling is rejection-based: candidates equal to the target or to an
/// already accepted distractor are drawn again. The catalog guarantees at
/// least four distinct codes, so this always finishes.
pub fn generate_question<R: Rng + ?Sized>(catalog: &CountryCatalog, rng: &mut R) -> Question {
    let target = catalog.get_random_country(rng).clone();

    let mut distractors: Vec<Country> = Vec::with_capacity(DISTRACTORS);
    while distractors.len() < DISTRACTORS {
        let candidate = catalog.get_random_country(rng);
        if candidate.code != target.code && !distractors.iter().any(|d| d.code == candidate.code) {
            distractors.push(candidate.clone());
        }
    }

    // Fisher-Yates, so the target's position is uniform
    let options = {
        let mut options = Vec::with_capacity(MIN_COUNTRIES);
        options.push(target.clone());
        options.extend(distractors);
        options.shuffle(rng);
        options
    };

    Question { target, options }
}

/// Turns a two-letter country code into its regional-indicator flag emoji.
/// Codes that are not two ASCII letters (e.g. "gb-sct") have no emoji.
pub fn flag_emoji(code: &str) -> Option<String> {
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    code.to_ascii_uppercase()
        .chars()
        .map(|c| char::from_u32(0x1F1E6 + (c as u32 - 'A' as u32)))
        .collect()
}

pub fn flag_image_url(template: &str, code: &str) -> String {
    template.replace("{code}", &code.to_ascii_lowercase())
}
