//! Keyword → emoji lookup for activity descriptions.

const ACTIVITY_EMOJI: &[(&[&str], &str)] = &[
    (&["read", "book", "study"], "📖"),
    (&["coffee", "latte", "espresso"], "☕"),
    (&["music", "sing", "guitar", "humming", "song"], "🎵"),
    (&["cook", "bake", "food", "eating", "lunch", "dinner"], "🍳"),
    (&["paint", "draw", "sketch"], "🎨"),
    (&["code", "program", "debug", "hack"], "💻"),
    (&["running", "jog", "exercise", "gym", "stretch"], "🏃"),
    (&["garden", "plant", "flower", "water"], "🌱"),
    (&["fish"], "🎣"),
    (&["sleep", "nap", "resting"], "😴"),
    (&["write", "writing", "journal", "notes"], "📝"),
    (&["dance"], "💃"),
    (&["meditat", "think", "ponder", "yoga"], "🧘"),
    (&["trade", "chart", "market", "price"], "📈"),
    (&["watch", "observ", "look"], "👀"),
    (&["shop", "buy"], "🛍️"),
];

pub const DEFAULT_ACTIVITY_EMOJI: &str = "✨";

/// Pick an emoji for `description` by the first keyword table row that
/// matches (case-insensitive substring). Falls back to [`DEFAULT_ACTIVITY_EMOJI`].
pub fn select_emoji(description: &str) -> &'static str {
    let lower = description.to_lowercase();
    ACTIVITY_EMOJI
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, emoji)| *emoji)
        .unwrap_or(DEFAULT_ACTIVITY_EMOJI)
}
