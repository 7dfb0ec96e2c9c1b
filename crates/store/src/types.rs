//! Domain type definitions for the information and interaction stores.

use assist_core::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Language codes the platform localizes content for.
///
/// English is mandatory on every record; the rest are optional
/// translations (Swahili, Luganda, Acholi, Ateso, Lugbara,
/// Kinyarwanda, Arabic).
pub const SUPPORTED_LANGUAGES: &[&str] = &["en", "sw", "lg", "ac", "teo", "lgg", "rw", "ar"];

/// Localized text with a required English entry and optional translations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub en: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ac: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lgg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ar: Option<String>,
}

impl LocalizedText {
    /// Create localized text with only the English entry.
    pub fn english(text: impl Into<String>) -> Self {
        Self {
            en: text.into(),
            ..Self::default()
        }
    }

    /// Add a translation for a language code. Unknown codes are ignored.
    pub fn with(mut self, lang: &str, text: impl Into<String>) -> Self {
        let text = text.into();
        match lang {
            "en" => self.en = text,
            "sw" => self.sw = Some(text),
            "lg" => self.lg = Some(text),
            "ac" => self.ac = Some(text),
            "teo" => self.teo = Some(text),
            "lgg" => self.lgg = Some(text),
            "rw" => self.rw = Some(text),
            "ar" => self.ar = Some(text),
            _ => {}
        }
        self
    }

    /// Exact lookup for a language code.
    pub fn get(&self, lang: &str) -> Option<&str> {
        match lang {
            "en" => Some(self.en.as_str()),
            "sw" => self.sw.as_deref(),
            "lg" => self.lg.as_deref(),
            "ac" => self.ac.as_deref(),
            "teo" => self.teo.as_deref(),
            "lgg" => self.lgg.as_deref(),
            "rw" => self.rw.as_deref(),
            "ar" => self.ar.as_deref(),
            _ => None,
        }
    }

    /// Lookup with fallback to the English entry.
    pub fn resolve(&self, lang: &str) -> &str {
        self.get(lang).unwrap_or(self.en.as_str())
    }
}

/// Information record category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Registration,
    LegalRights,
    Healthcare,
    Education,
    Employment,
    Housing,
    Emergency,
    Community,
    Services,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Registration => "registration",
            Self::LegalRights => "legal_rights",
            Self::Healthcare => "healthcare",
            Self::Education => "education",
            Self::Employment => "employment",
            Self::Housing => "housing",
            Self::Emergency => "emergency",
            Self::Community => "community",
            Self::Services => "services",
        }
    }

    pub fn parse(s: &str) -> AppResult<Self> {
        match s {
            "registration" => Ok(Self::Registration),
            "legal_rights" => Ok(Self::LegalRights),
            "healthcare" => Ok(Self::Healthcare),
            "education" => Ok(Self::Education),
            "employment" => Ok(Self::Employment),
            "housing" => Ok(Self::Housing),
            "emergency" => Ok(Self::Emergency),
            "community" => Ok(Self::Community),
            "services" => Ok(Self::Services),
            _ => Err(AppError::Other(format!("Unknown category: {}", s))),
        }
    }
}

/// Audience tags an information record targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    AsylumSeeker,
    Refugee,
    Returnee,
    LocalCommunity,
    All,
}

/// Record priority, ordered from least to most pressing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }

    pub fn parse(s: &str) -> AppResult<Self> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(AppError::Other(format!("Unknown priority: {}", s))),
        }
    }
}

/// Geographic scope of an information record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default)]
    pub districts: Vec<String>,
    #[serde(default)]
    pub settlements: Vec<String>,
    #[serde(default)]
    pub is_national: bool,
}

/// A multilingual informational record.
///
/// Records are never hard-deleted; retirement flips `is_active` to false.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InformationRecord {
    pub id: String,
    pub title: LocalizedText,
    pub content: LocalizedText,
    pub category: Category,
    pub target_audience: Vec<Audience>,
    pub priority: Priority,
    pub location: Location,
    pub tags: Vec<String>,
    pub is_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_by: Option<String>,
    pub created_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub views: u64,
    pub likes: Vec<String>,
    pub is_active: bool,
}

/// Fields required to create a new information record.
#[derive(Debug, Clone)]
pub struct NewInformationRecord {
    pub title: LocalizedText,
    pub content: LocalizedText,
    pub category: Category,
    pub target_audience: Vec<Audience>,
    pub priority: Priority,
    pub location: Location,
    pub tags: Vec<String>,
    pub created_by: String,
}

/// Partial update applied by the record's author or an administrator.
#[derive(Debug, Clone, Default)]
pub struct UpdateInformation {
    pub title: Option<LocalizedText>,
    pub content: Option<LocalizedText>,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub tags: Option<Vec<String>>,
    pub is_verified: Option<bool>,
    pub updated_by: Option<String>,
}

/// Lightweight citation attached to an AI answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
}

impl SourceRef {
    /// Citation for a record retrieved from the information store.
    pub fn database(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: None,
            kind: "database".to_string(),
        }
    }
}

/// User feedback attached to a prior interaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Feedback {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub helpful: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// One logged AI exchange.
///
/// `query` and `response` are non-empty once created. The record is
/// mutated only to attach feedback, and deleted only by the owning
/// user's bulk clear.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiInteraction {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub query: String,
    pub response: String,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub sources: Vec<SourceRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<Feedback>,
    #[serde(rename = "processingTime")]
    pub processing_time_ms: u64,
    pub timestamp: DateTime<Utc>,
}

/// Fields required to log a new interaction.
#[derive(Debug, Clone)]
pub struct NewInteraction {
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub query: String,
    pub response: String,
    pub language: String,
    pub context: Option<String>,
    pub confidence: Option<f64>,
    pub sources: Vec<SourceRef>,
    pub processing_time_ms: u64,
}

/// One page of a user's interaction history, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionPage {
    pub interactions: Vec<AiInteraction>,
    pub current: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

/// Aggregate statistics over all logged interactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionAnalytics {
    pub total_interactions: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_processing_time_ms: Option<f64>,
    pub language_counts: HashMap<String, u64>,
}

/// Registered refugee status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefugeeStatus {
    AsylumSeeker,
    Refugee,
    Returnee,
    Other,
}

impl RefugeeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AsylumSeeker => "asylum_seeker",
            Self::Refugee => "refugee",
            Self::Returnee => "returnee",
            Self::Other => "other",
        }
    }

    pub fn parse(s: &str) -> AppResult<Self> {
        match s {
            "asylum_seeker" => Ok(Self::AsylumSeeker),
            "refugee" => Ok(Self::Refugee),
            "returnee" => Ok(Self::Returnee),
            "other" => Ok(Self::Other),
            _ => Err(AppError::Other(format!("Unknown refugee status: {}", s))),
        }
    }
}

/// A registered platform user.
///
/// Authentication (password hashing, sessions) is handled by the web
/// layer; the store only persists the hash it is given.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub preferred_language: String,
    pub refugee_status: RefugeeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_of_origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settlement: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to register a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub preferred_language: String,
    pub refugee_status: RefugeeStatus,
    pub country_of_origin: Option<String>,
    pub district: Option<String>,
    pub settlement: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_localized_resolve_falls_back_to_english() {
        let text = LocalizedText::english("Hello").with("sw", "Habari");

        assert_eq!(text.resolve("sw"), "Habari");
        assert_eq!(text.resolve("lg"), "Hello");
        assert_eq!(text.resolve("fr"), "Hello");
        assert_eq!(text.get("lg"), None);
    }

    #[test]
    fn test_localized_with_unknown_code_is_ignored() {
        let text = LocalizedText::english("Hello").with("xx", "ignored");
        assert_eq!(text, LocalizedText::english("Hello"));
    }

    #[test]
    fn test_category_roundtrip() {
        for cat in [
            Category::Registration,
            Category::LegalRights,
            Category::Healthcare,
            Category::Education,
            Category::Employment,
            Category::Housing,
            Category::Emergency,
            Category::Community,
            Category::Services,
        ] {
            assert_eq!(Category::parse(cat.as_str()).unwrap(), cat);
        }
        assert!(Category::parse("unknown").is_err());
    }

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::Low < Priority::Medium);
        assert!(Priority::Medium < Priority::High);
        assert!(Priority::High < Priority::Urgent);
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn test_source_ref_serializes_kind_as_type() {
        let source = SourceRef::database("Registration Steps");
        let json = serde_json::to_value(&source).unwrap();
        assert_eq!(json["type"], "database");
        assert_eq!(json["title"], "Registration Steps");
        assert!(json.get("url").is_none());
    }

    #[test]
    fn test_interaction_wire_names() {
        let interaction = AiInteraction {
            id: "i1".to_string(),
            user_id: Some("u1".to_string()),
            session_id: None,
            query: "q".to_string(),
            response: "r".to_string(),
            language: "en".to_string(),
            context: None,
            confidence: None,
            sources: vec![],
            feedback: None,
            processing_time_ms: 42,
            timestamp: Utc::now(),
        };

        let json = serde_json::to_value(&interaction).unwrap();
        assert_eq!(json["processingTime"], 42);
        assert_eq!(json["userId"], "u1");
        assert!(json.get("sessionId").is_none());
    }
}
