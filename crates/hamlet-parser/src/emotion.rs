//! Emotion detection for spoken and activity text.
//!
//! A fixed-priority cascade; the first indicator that fires wins:
//!
//! 1. sad emoji → angry emoji → surprised emoji → happy emoji
//! 2. sad words → angry words → surprised lead-words → happy words
//! 3. neutral
//!
//! Emoji always outrank words, so "😢 awesome" is sad.

use std::sync::LazyLock;

use regex::Regex;

use hamlet_contracts::decision::Emotion;

const SAD_EMOJI: &[char] = &['😢', '😭', '😞', '😔', '💔', '☹', '🙁', '😿'];
const ANGRY_EMOJI: &[char] = &['😠', '😡', '🤬', '💢', '👿'];
const SURPRISED_EMOJI: &[char] = &['😮', '😲', '😯', '😱', '🤯', '😳'];
const HAPPY_EMOJI: &[char] = &[
    '😊', '😄', '😃', '😁', '😀', '🙂', '😂', '🤣', '🥳', '😍', '❤', '💖', '🎉', '✨', '👍', '😎',
];

static SAD_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(sad|sorry|miss(?:ing)?|lonely|unfortunately|cry(?:ing)?|tears|upset|heartbroken|disappoint\w*|depress\w*)\b",
    )
    .expect("sad word pattern is valid")
});

static ANGRY_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(angry|furious|hate|annoy\w*|mad|frustrat\w*|rage|outrage\w*|ugh)\b")
        .expect("angry word pattern is valid")
});

// Surprise only counts when the text opens with it.
static SURPRISED_LEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)^[\s"'(]*(wow|whoa|woah|omg|oh|what|really|no way|huh)\b"#)
        .expect("surprised lead pattern is valid")
});

static HAPPY_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(happy|great|awesome|love|glad|excited|fun|wonderful|amazing|haha|yay|nice|fantastic|lol)\b",
    )
    .expect("happy word pattern is valid")
});

pub fn detect_emotion(text: &str) -> Emotion {
    let has_any = |set: &[char]| text.chars().any(|c| set.contains(&c));

    if has_any(SAD_EMOJI) {
        Emotion::Sad
    } else if has_any(ANGRY_EMOJI) {
        Emotion::Angry
    } else if has_any(SURPRISED_EMOJI) {
        Emotion::Surprised
    } else if has_any(HAPPY_EMOJI) {
        Emotion::Happy
    } else if SAD_WORDS.is_match(text) {
        Emotion::Sad
    } else if ANGRY_WORDS.is_match(text) {
        Emotion::Angry
    } else if SURPRISED_LEAD.is_match(text) {
        Emotion::Surprised
    } else if HAPPY_WORDS.is_match(text) {
        Emotion::Happy
    } else {
        Emotion::Neutral
    }
}
