//! Prompt construction and response cleanup for strategy generation.

use crate::models::Verbosity;
use rand::seq::SliceRandom;
use rand::Rng;

pub const STRATEGY: &str = include_str!("../data/prompts/strategy.txt");

/// Opening words the model leans on too often; results starting with these are rejected.
pub const BANNED_STARTERS: &[&str] = &[
    "Embrace", "Accept", "Consider", "Try", "Think", "Use", "Look",
];

/// Openings suggested to the model for variety.
pub const ENCOURAGED_STARTERS: &[&str] = &[
    "What if",
    "Where is",
    "How might",
    "Why not",
    "When does",
    "Who would",
    "Remove",
    "Add",
    "Subtract",
    "Multiply",
    "Reverse",
    "Ignore",
    "Amplify",
    "Whisper",
    "Shout",
    "Freeze",
    "Accelerate",
    "Simplify",
    "Complicate",
];

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}

pub fn length_description(verbosity: Verbosity) -> &'static str {
    match verbosity {
        Verbosity::Concise => "very brief (3-8 words maximum)",
        Verbosity::Medium => "moderate length (5-12 words)",
        Verbosity::Verbose => "more detailed (8-20 words)",
    }
}

pub fn mood_description(moods: &[String]) -> String {
    if moods.is_empty() {
        "Use a neutral, thoughtful tone. ".to_string()
    } else {
        format!("The tone should reflect these moods: {}. ", moods.join(", "))
    }
}

/// Build one generation prompt, drawing a starter and a banned word from `rng`.
pub fn strategy_prompt<R: Rng + ?Sized>(
    verbosity: Verbosity,
    moods: &[String],
    rng: &mut R,
) -> String {
    // Both pools are non-empty constants.
    let starter = ENCOURAGED_STARTERS.choose(rng).copied().unwrap_or("What if");
    let banned = BANNED_STARTERS.choose(rng).copied().unwrap_or("Embrace");

    render(
        STRATEGY,
        &[
            ("length", length_description(verbosity)),
            ("mood", &mood_description(moods)),
            ("starter", starter),
            ("banned", banned),
        ],
    )
}

const QUOTES: [char; 2] = ['"', '\''];

/// Strip wrapping quotes and trailing periods from raw model output.
///
/// Repeats until stable so `"Reverse the tape".` loses both the period and
/// the closing quote.
pub fn clean_strategy(raw: &str) -> String {
    let mut text = raw.trim();
    loop {
        let next = text.strip_prefix(QUOTES).unwrap_or(text);
        let next = next.strip_suffix(QUOTES).unwrap_or(next);
        let next = next.trim_end_matches('.').trim();
        if next == text {
            break;
        }
        text = next;
    }
    text.to_string()
}

/// Case-insensitive prefix check against [`BANNED_STARTERS`].
pub fn starts_with_banned(text: &str) -> bool {
    let lower = text.to_lowercase();
    BANNED_STARTERS
        .iter()
        .any(|word| lower.starts_with(&word.to_lowercase()))
}

/// Clean raw output and reject it when it is empty or opens with a banned word.
pub fn validate_strategy(raw: &str) -> crate::Result<String> {
    let cleaned = clean_strategy(raw);

    if cleaned.is_empty() {
        return Err(crate::Error::ValidationRejected(
            "Empty strategy generated".to_string(),
        ));
    }

    if starts_with_banned(&cleaned) {
        return Err(crate::Error::ValidationRejected(format!(
            "Generated strategy starts with banned word: {}",
            cleaned
        )));
    }

    Ok(cleaned)
}
