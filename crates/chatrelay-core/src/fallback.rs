//! Canned replies used when no provider could answer.
//!
//! Category selection is deterministic (first matching keyword category
//! wins); the reply inside a category is picked uniformly at random.

use rand::seq::SliceRandom;
use rand::Rng;

/// Keyword category a user message falls into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FallbackCategory {
    Greeting,
    Programming,
    Default,
}

const GREETING_KEYWORDS: &[&str] = &["hello", "hi", "hey"];
const PROGRAMMING_KEYWORDS: &[&str] = &["programming", "program", "code", "coding"];

pub const GREETING_REPLIES: &[&str] = &[
    "Hello! I'm currently operating in fallback mode. Your API connection seems to have issues, but I'm still here to help!",
    "Hi there! I can see your message, but there might be an issue with the AI service. I'll do my best to assist you.",
];

pub const PROGRAMMING_REPLIES: &[&str] = &[
    "I'd love to help with programming questions! Currently, I'm running on basic mode. For detailed programming help, please check your API configuration.",
    "Programming is awesome! While I work on restoring full AI capabilities, you might want to check Stack Overflow or official documentation for detailed help.",
];

pub const DEFAULT_REPLIES: &[&str] = &[
    "Thanks for your message! I'm experiencing some technical difficulties with the AI service. Please check your API key and try again.",
    "I received your message but couldn't connect to the AI service. Make sure your API key is correct and you have an active internet connection.",
    "Interesting question! Currently, I'm limited in my responses due to API connectivity issues. Please verify your API configuration in the settings.",
];

impl FallbackCategory {
    /// Ordered categories; the first whose keywords match wins.
    const ORDER: [(FallbackCategory, &'static [&'static str]); 2] = [
        (FallbackCategory::Greeting, GREETING_KEYWORDS),
        (FallbackCategory::Programming, PROGRAMMING_KEYWORDS),
    ];

    /// Canned replies for this category.
    pub fn replies(&self) -> &'static [&'static str] {
        match self {
            FallbackCategory::Greeting => GREETING_REPLIES,
            FallbackCategory::Programming => PROGRAMMING_REPLIES,
            FallbackCategory::Default => DEFAULT_REPLIES,
        }
    }
}

/// Classify a message by whole-word keyword match.
pub fn category(user_message: &str) -> FallbackCategory {
    let lower = user_message.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    FallbackCategory::ORDER
        .iter()
        .find(|(_, keywords)| words.iter().any(|w| keywords.contains(w)))
        .map(|(cat, _)| *cat)
        .unwrap_or(FallbackCategory::Default)
}

/// Pick a canned reply for `user_message` using the thread-local RNG.
pub fn respond(user_message: &str) -> String {
    respond_with(&mut rand::thread_rng(), user_message)
}

/// Pick a canned reply for `user_message` using the given RNG.
pub fn respond_with<R: Rng + ?Sized>(rng: &mut R, user_message: &str) -> String {
    let replies = category(user_message).replies();
    replies
        .choose(rng)
        .copied()
        .unwrap_or(DEFAULT_REPLIES[0])
        .to_string()
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
