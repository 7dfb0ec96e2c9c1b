//! Prompt composition for the assistant.
//!
//! Builds the user prompt from the query, the requested language, and
//! the retrieved information records. Composition is pure; retrieval and
//! completion live in the pipeline.

use assist_store::types::InformationRecord;

/// Persona and guardrails sent as the system message on every completion.
pub const SYSTEM_PROMPT: &str = "You are RefugeeAssist AI, a specialized assistant for refugees in Uganda. Your mission is to provide accurate, helpful information about:

1. Refugee registration processes and documentation
2. Legal rights and asylum procedures
3. Healthcare services and access
4. Educational opportunities for children and adults
5. Employment and livelihood opportunities
6. Housing and settlement information
7. Community integration and cultural adaptation
8. Emergency contacts and crisis support
9. Available NGO and government services

Guidelines:
- Be empathetic, respectful, and culturally sensitive
- Provide specific, actionable information when possible
- Include relevant contact information and locations
- Acknowledge when you need more context
- Always prioritize safety and official procedures
- Suggest multiple options when available
- Be aware of language barriers and simplify when needed

Current context: Uganda refugee assistance system";

/// Maximum characters of record content quoted into the prompt.
const CONTENT_EXCERPT_CHARS: usize = 200;

/// Compose the user prompt for a query.
///
/// Retrieved records are numbered and quoted with their localized title
/// and a 200-character content excerpt, falling back to English where a
/// translation is missing. With no records, the context block is
/// omitted entirely.
pub fn compose_prompt(query: &str, language: &str, records: &[InformationRecord]) -> String {
    let mut prompt = format!("User query: \"{}\"\nLanguage: {}\n\n", query, language);

    if !records.is_empty() {
        prompt.push_str("Relevant information from database:\n");
        for (index, record) in records.iter().enumerate() {
            let title = record.title.resolve(language);
            let content = record.content.resolve(language);
            prompt.push_str(&format!(
                "{}. {}\n{}...\n\n",
                index + 1,
                title,
                excerpt(content, CONTENT_EXCERPT_CHARS)
            ));
        }
    }

    let target = if language == "en" {
        "English"
    } else {
        "the requested language"
    };
    prompt.push_str(&format!(
        "Please provide a helpful response in {}, incorporating the relevant information above if applicable.",
        target
    ));

    prompt
}

/// First `max_chars` characters of `text`, on a char boundary.
fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assist_store::types::{
        Audience, Category, Location, LocalizedText, Priority,
    };
    use chrono::Utc;

    fn record(title: LocalizedText, content: LocalizedText) -> InformationRecord {
        InformationRecord {
            id: "r1".to_string(),
            title,
            content,
            category: Category::Registration,
            target_audience: vec![Audience::All],
            priority: Priority::Medium,
            location: Location::default(),
            tags: vec![],
            is_verified: true,
            verified_by: None,
            created_by: "author".to_string(),
            updated_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            views: 0,
            likes: vec![],
            is_active: true,
        }
    }

    #[test]
    fn test_prompt_without_records_omits_context_block() {
        let prompt = compose_prompt("How do I register?", "en", &[]);

        assert!(prompt.starts_with("User query: \"How do I register?\"\nLanguage: en\n\n"));
        assert!(!prompt.contains("Relevant information from database:"));
        assert!(prompt.ends_with(
            "Please provide a helpful response in English, incorporating the relevant information above if applicable."
        ));
    }

    #[test]
    fn test_prompt_numbers_records_and_appends_ellipsis() {
        let records = vec![
            record(
                LocalizedText::english("Registration Steps"),
                LocalizedText::english("Short content"),
            ),
            record(
                LocalizedText::english("Health Services"),
                LocalizedText::english("Clinic hours"),
            ),
        ];

        let prompt = compose_prompt("help", "en", &records);
        assert!(prompt.contains("Relevant information from database:\n"));
        assert!(prompt.contains("1. Registration Steps\nShort content...\n\n"));
        assert!(prompt.contains("2. Health Services\nClinic hours...\n\n"));
    }

    #[test]
    fn test_prompt_truncates_long_content_to_200_chars() {
        let long = "x".repeat(450);
        let records = vec![record(
            LocalizedText::english("Title"),
            LocalizedText::english(long),
        )];

        let prompt = compose_prompt("q", "en", &records);
        let expected = format!("1. Title\n{}...\n\n", "x".repeat(200));
        assert!(prompt.contains(&expected));
    }

    #[test]
    fn test_prompt_localizes_with_english_fallback() {
        let records = vec![record(
            LocalizedText::english("Registration Steps").with("sw", "Hatua za Usajili"),
            LocalizedText::english("English only content"),
        )];

        let prompt = compose_prompt("msaada", "sw", &records);
        assert!(prompt.contains("Language: sw\n"));
        assert!(prompt.contains("1. Hatua za Usajili\nEnglish only content...\n\n"));
        assert!(prompt.ends_with(
            "Please provide a helpful response in the requested language, incorporating the relevant information above if applicable."
        ));
    }

    #[test]
    fn test_compose_is_deterministic() {
        let records = vec![record(
            LocalizedText::english("Registration Steps").with("sw", "Hatua za Usajili"),
            LocalizedText::english("Visit the nearest registration point."),
        )];

        let first = compose_prompt("How do I register?", "sw", &records);
        let second = compose_prompt("How do I register?", "sw", &records);
        assert_eq!(first, second);

        let bare_first = compose_prompt("help", "en", &[]);
        let bare_second = compose_prompt("help", "en", &[]);
        assert_eq!(bare_first, bare_second);
    }

    #[test]
    fn test_excerpt_respects_char_boundaries() {
        let text = "é".repeat(250);
        let cut = excerpt(&text, 200);
        assert_eq!(cut.chars().count(), 200);
    }

    #[test]
    fn test_system_prompt_persona() {
        assert!(SYSTEM_PROMPT.starts_with("You are RefugeeAssist AI"));
        assert!(SYSTEM_PROMPT.ends_with("Current context: Uganda refugee assistance system"));
    }
}
