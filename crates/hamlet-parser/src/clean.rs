//! Markup stripping applied before any interpretation.
//!
//! Models wrap answers in code fences, bullets, numbering, bold, and curly
//! quotes. All of that is removed here, and only the first non-empty logical
//! line survives: a later line never contributes to the decision.

use std::sync::LazyLock;

use regex::Regex;

static LIST_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[-*+•>]\s+|\d{1,3}[.)]\s+)").expect("list marker pattern is valid")
});

/// Return the first meaningful line of `raw` with markup removed.
///
/// Fence lines (```` ``` ```` with or without a language tag) are dropped
/// entirely; the lines between them are kept.
pub fn first_logical_line(raw: &str) -> Option<String> {
    raw.lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .map(clean_line)
        .find(|line| !line.is_empty())
}

/// Text between double quotes (or after one that is never closed) is kept
/// as written; markup is only stripped around it.
fn clean_line(line: &str) -> String {
    let line = line.replace(['\u{201C}', '\u{201D}'], "\"");
    let mut unmarked = String::with_capacity(line.len());
    for (index, segment) in line.split('"').enumerate() {
        if index > 0 {
            unmarked.push('"');
        }
        if index % 2 == 1 {
            unmarked.push_str(segment);
        } else {
            unmarked.push_str(&strip_markup(segment));
        }
    }
    LIST_MARKER.replace(&unmarked, "").trim().to_string()
}

fn strip_markup(text: &str) -> String {
    text.replace("**", "")
        .replace("__", "")
        .replace('`', "")
        .replace(['\u{2018}', '\u{2019}'], "'")
}

#[cfg(test)]
mod tests {
    use super::first_logical_line;

    #[test]
    fn strips_fences_and_takes_first_line() {
        let raw = "```text\nSPEAK \"hello\"\nAPPROACH bob\n```";
        assert_eq!(first_logical_line(raw).as_deref(), Some("SPEAK \"hello\""));
    }

    #[test]
    fn strips_bullets_numbers_and_bold() {
        assert_eq!(
            first_logical_line("  - **SPEAK** \"hi\"").as_deref(),
            Some("SPEAK \"hi\"")
        );
        assert_eq!(first_logical_line("2) WANDER park").as_deref(), Some("WANDER park"));
        assert_eq!(first_logical_line("* `IDLE`").as_deref(), Some("IDLE"));
    }

    #[test]
    fn skips_blank_leading_lines() {
        assert_eq!(first_logical_line("\n\n   \nIDLE\n").as_deref(), Some("IDLE"));
        assert_eq!(first_logical_line("   \n```\n```"), None);
    }

    #[test]
    fn normalizes_curly_quotes() {
        assert_eq!(
            first_logical_line("SAY \u{201C}nice day\u{201D}").as_deref(),
            Some("SAY \"nice day\"")
        );
    }

    #[test]
    fn keeps_quoted_text_as_written() {
        assert_eq!(
            first_logical_line("**SPEAK** \"snake__case is `fun`\"").as_deref(),
            Some("SPEAK \"snake__case is `fun`\"")
        );
        assert_eq!(
            first_logical_line("SAY \u{201C}it\u{2019}s mine\u{201D} **now**").as_deref(),
            Some("SAY \"it\u{2019}s mine\" now")
        );
        // An unclosed quote runs to the end of the line.
        assert_eq!(
            first_logical_line("SPEAK \"**bold** move").as_deref(),
            Some("SPEAK \"**bold** move")
        );
    }
}
