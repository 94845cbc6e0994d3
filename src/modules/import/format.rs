//! Recipe text formatting for the step-marker convention
//!
//! Downstream rendering expects instructions as sequential `SCHRITT n`
//! blocks. Imported text that already carries markers is kept verbatim;
//! everything else is rewritten into the convention.
use std::sync::OnceLock;

use regex::Regex;

fn step_marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)SCHRITT\s+\d+").expect("static regex"))
}

fn iso_duration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"PT(?:(\d+)H)?(?:(\d+)M)?").expect("static regex"))
}

pub fn has_step_markers(text: &str) -> bool {
    step_marker_regex().is_match(text)
}

/// Meal-import variant: one step per non-empty line. Text that already
/// contains markers passes through unchanged.
pub fn format_steps_from_text(instructions: &str) -> String {
    if instructions.trim().is_empty() {
        return String::new();
    }
    if has_step_markers(instructions) {
        return instructions.to_string();
    }

    let mut formatted = String::new();
    let mut step = 0;
    for line in instructions.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        step += 1;
        formatted.push_str(&format!("SCHRITT {}\n\n{}\n\n", step, line));
    }
    formatted
}

/// Site-import variant: scraped pages deliver a step list. A single long
/// block is regrouped into steps of two-to-three sentences.
pub fn format_steps_from_list(instructions: &[String]) -> String {
    let mut steps: Vec<String> = Vec::new();

    if instructions.len() == 1 && instructions[0].len() > 200 {
        let sentences = split_sentences(&instructions[0]);

        let mut current: Vec<&str> = Vec::new();
        for sentence in &sentences {
            current.push(sentence);
            if current.len() >= 2 && current.join(" ").len() > 100 {
                steps.push(format!(
                    "SCHRITT {}\n\n{}",
                    steps.len() + 1,
                    current.join(" ").trim()
                ));
                current.clear();
            }
        }
        if !current.is_empty() {
            steps.push(format!(
                "SCHRITT {}\n\n{}",
                steps.len() + 1,
                current.join(" ").trim()
            ));
        }
    } else {
        for (i, step) in instructions.iter().enumerate() {
            steps.push(format!("SCHRITT {}\n\n{}", i + 1, step.trim()));
        }
    }

    steps.join("\n\n")
}

/// Split on sentence terminators followed by whitespace and an uppercase
/// letter (umlauts included). The regex crate has no lookaround, so this is
/// a manual scan.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let chars: Vec<(usize, char)> = text.char_indices().collect();

    let mut i = 0;
    while i < chars.len() {
        let (_, c) = chars[i];
        if matches!(c, '.' | '!' | '?') {
            // Scan past whitespace; a following uppercase starts a new sentence.
            let mut j = i + 1;
            let mut saw_whitespace = false;
            while j < chars.len() && chars[j].1.is_whitespace() {
                saw_whitespace = true;
                j += 1;
            }
            if saw_whitespace && j < chars.len() {
                let next = chars[j].1;
                if next.is_uppercase() || matches!(next, 'Ä' | 'Ö' | 'Ü') {
                    let end = chars[i].0 + c.len_utf8();
                    sentences.push(text[start..end].trim().to_string());
                    start = chars[j].0;
                    i = j;
                    continue;
                }
            }
        }
        i += 1;
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}

/// Parse an ISO-8601 duration like `PT30M` or `PT1H30M` into fractional
/// hours (the recipe store keeps durations in hours).
pub fn parse_iso_duration_hours(value: &str) -> Option<f64> {
    let captures = iso_duration_regex().captures(value)?;
    let hours: u32 = captures
        .get(1)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0);
    let minutes: u32 = captures
        .get(2)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0);
    if hours == 0 && minutes == 0 {
        return None;
    }
    Some((hours * 60 + minutes) as f64 / 60.0)
}

/// Bulleted ingredient block under the fixed German header.
pub fn ingredients_section(ingredients: &[String]) -> String {
    if ingredients.is_empty() {
        return String::new();
    }
    let mut section = String::from("Zutaten:\n");
    for ingredient in ingredients {
        section.push_str(&format!("- {}\n", ingredient));
    }
    section
}

pub const FOOTER_SEPARATOR: &str = "─────────────────────────";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_lines_get_step_markers() {
        let formatted = format_steps_from_text("Wasser kochen.\nNudeln hinzufügen.");
        assert_eq!(
            formatted,
            "SCHRITT 1\n\nWasser kochen.\n\nSCHRITT 2\n\nNudeln hinzufügen.\n\n"
        );
    }

    #[test]
    fn test_marked_text_passes_through() {
        let text = "SCHRITT 1\n\nAlles mischen.\n\nSCHRITT 2\n\nBacken.";
        assert_eq!(format_steps_from_text(text), text);
        // Lowercase markers count too
        assert!(has_step_markers("schritt 3 kommt noch"));
    }

    #[test]
    fn test_empty_instructions_stay_empty() {
        assert_eq!(format_steps_from_text(""), "");
        assert_eq!(format_steps_from_text("  \n "), "");
    }

    #[test]
    fn test_step_list_is_enumerated() {
        let steps = vec!["Schneiden.".to_string(), "Braten.".to_string()];
        assert_eq!(
            format_steps_from_list(&steps),
            "SCHRITT 1\n\nSchneiden.\n\nSCHRITT 2\n\nBraten."
        );
    }

    #[test]
    fn test_single_long_block_is_split_into_steps() {
        let block = "Die Zwiebeln fein hacken und in Olivenöl glasig dünsten bis sie weich sind. \
                     Den Knoblauch dazugeben und kurz mitbraten damit er nicht verbrennt. \
                     Die Tomaten hinzufügen und alles zwanzig Minuten köcheln lassen. \
                     Zum Schluss mit Salz und Pfeffer abschmecken und mit Basilikum servieren."
            .to_string();
        let formatted = format_steps_from_list(&[block]);

        assert!(formatted.starts_with("SCHRITT 1\n\n"));
        assert!(formatted.contains("SCHRITT 2"));
        // Every sentence survives the regrouping
        assert!(formatted.contains("Basilikum servieren."));
    }

    #[test]
    fn test_split_sentences_respects_umlauts() {
        let sentences = split_sentences("Erst rühren. Öl dazugeben! Dann backen.");
        assert_eq!(
            sentences,
            vec!["Erst rühren.", "Öl dazugeben!", "Dann backen."]
        );
    }

    #[test]
    fn test_split_sentences_ignores_lowercase_continuation() {
        let sentences = split_sentences("Gemüse waschen. dann in Stücke schneiden.");
        assert_eq!(sentences.len(), 1);
    }

    #[test]
    fn test_iso_duration_parsing() {
        assert_eq!(parse_iso_duration_hours("PT30M"), Some(0.5));
        assert_eq!(parse_iso_duration_hours("PT1H30M"), Some(1.5));
        assert_eq!(parse_iso_duration_hours("PT2H"), Some(2.0));
        assert_eq!(parse_iso_duration_hours("nonsense"), None);
    }

    #[test]
    fn test_ingredients_section() {
        let section = ingredients_section(&["200 g Mehl".to_string(), "1 Ei".to_string()]);
        assert_eq!(section, "Zutaten:\n- 200 g Mehl\n- 1 Ei\n");
        assert_eq!(ingredients_section(&[]), "");
    }
}
