//! End-to-end pipeline tests over an in-memory store and a scripted
//! LLM client.

use assist_llm::MockClient;
use assist_pipeline::{Assistant, InteractionLogger, SYSTEM_PROMPT};
use assist_store::types::{
    Audience, Category, Location, LocalizedText, NewInformationRecord, Priority,
};
use assist_store::{
    Database, InformationStore, InteractionStore, SqliteInformationStore, SqliteInteractionStore,
};
use std::sync::Arc;

struct Harness {
    info: Arc<SqliteInformationStore>,
    interactions: Arc<SqliteInteractionStore>,
    llm: Arc<MockClient>,
}

impl Harness {
    fn new(llm: MockClient) -> Self {
        let db = Database::open_in_memory().unwrap();
        Self {
            info: Arc::new(SqliteInformationStore::new(db.clone())),
            interactions: Arc::new(SqliteInteractionStore::new(db)),
            llm: Arc::new(llm),
        }
    }

    fn assistant(&self) -> Assistant {
        let logger = InteractionLogger::spawn(self.interactions.clone());
        Assistant::new(self.info.clone(), self.llm.clone(), logger, "gpt-3.5-turbo")
    }

    async fn seed_registration(&self) {
        self.info
            .create(NewInformationRecord {
                title: LocalizedText::english("Registration Steps")
                    .with("sw", "Hatua za Usajili"),
                content: LocalizedText::english(
                    "Visit the nearest registration point with your identity documents to \
                     register. Registration is free for all new arrivals and takes one day.",
                ),
                category: Category::Registration,
                target_audience: vec![Audience::AsylumSeeker],
                priority: Priority::High,
                location: Location::default(),
                tags: vec!["registration".to_string()],
                created_by: "author-1".to_string(),
            })
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_query_with_matching_records_cites_sources() {
    let harness = Harness::new(MockClient::replying("Go to the registration point."));
    harness.seed_registration().await;
    let assistant = harness.assistant();

    let outcome = assistant
        .process_query("How do I register as a refugee?", "en", None)
        .await;

    assert!(!outcome.error);
    assert_eq!(outcome.response, "Go to the registration point.");
    assert_eq!(outcome.sources.len(), 1);
    assert_eq!(outcome.sources[0].title, "Registration Steps");
    assert_eq!(outcome.sources[0].kind, "database");
    assert!(outcome.confidence.is_some());
    assert!(outcome.processing_time_ms.is_some());
    assert_eq!(outcome.language.as_deref(), Some("en"));

    // The completion request carried the persona and retrieved context
    let requests = harness.llm.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].system.as_deref(), Some(SYSTEM_PROMPT));
    assert_eq!(requests[0].temperature, Some(0.7));
    assert_eq!(requests[0].max_tokens, Some(500));
    assert!(requests[0].prompt.contains("Relevant information from database:"));
    assert!(requests[0].prompt.contains("1. Registration Steps"));

    assistant.close().await;
}

#[tokio::test]
async fn test_query_without_matches_answers_without_context() {
    let harness = Harness::new(MockClient::replying("General guidance."));
    let assistant = harness.assistant();

    let outcome = assistant.process_query("unrelated topic", "en", None).await;

    assert!(!outcome.error);
    assert!(outcome.sources.is_empty());
    assert!(outcome.confidence.is_none());

    let requests = harness.llm.requests();
    assert!(!requests[0].prompt.contains("Relevant information from database:"));

    assistant.close().await;
}

#[tokio::test]
async fn test_completion_failure_yields_localized_fallback() {
    let harness = Harness::new(MockClient::failing("upstream 500"));
    harness.seed_registration().await;
    let assistant = harness.assistant();

    let outcome = assistant
        .process_query("How do I register?", "sw", Some("u1"))
        .await;

    assert!(outcome.error);
    assert!(outcome.response.starts_with("Nisamehe"));
    assert!(outcome.sources.is_empty());
    assert!(outcome.processing_time_ms.is_none());

    // Failed queries are not logged
    assistant.close().await;
    let page = harness.interactions.list_for_user("u1", 1, 10).await.unwrap();
    assert!(page.interactions.is_empty());
}

#[tokio::test]
async fn test_fallback_for_unsupported_language_is_english() {
    let harness = Harness::new(MockClient::failing("down"));
    let assistant = harness.assistant();

    let outcome = assistant.process_query("help", "ar", None).await;
    assert!(outcome.error);
    assert!(outcome.response.starts_with("I apologize"));

    assistant.close().await;
}

#[tokio::test]
async fn test_authenticated_query_is_logged_once() {
    let harness = Harness::new(MockClient::replying("Answer."));
    harness.seed_registration().await;
    let assistant = harness.assistant();

    let outcome = assistant
        .process_query("registration documents", "sw", Some("u1"))
        .await;
    assert!(!outcome.error);

    assistant.close().await;

    let page = harness.interactions.list_for_user("u1", 1, 10).await.unwrap();
    assert_eq!(page.interactions.len(), 1);

    let logged = &page.interactions[0];
    assert_eq!(logged.query, "registration documents");
    assert_eq!(logged.response, "Answer.");
    assert_eq!(logged.language, "sw");
    assert_eq!(logged.sources.len(), 1);
    // Citation uses the requested language where a translation exists
    assert_eq!(logged.sources[0].title, "Hatua za Usajili");
}

#[tokio::test]
async fn test_anonymous_query_is_not_logged() {
    let harness = Harness::new(MockClient::replying("Answer."));
    harness.seed_registration().await;
    let assistant = harness.assistant();

    assistant.process_query("registration", "en", None).await;
    assistant.close().await;

    let stats = harness.interactions.analytics().await.unwrap();
    assert_eq!(stats.total_interactions, 0);
}

#[tokio::test]
async fn test_at_most_three_records_are_cited() {
    let harness = Harness::new(MockClient::replying("Answer."));
    for i in 0..5 {
        harness
            .info
            .create(NewInformationRecord {
                title: LocalizedText::english(format!("Registration guide {}", i)),
                content: LocalizedText::english("How to register at the settlement office."),
                category: Category::Registration,
                target_audience: vec![Audience::All],
                priority: Priority::Medium,
                location: Location::default(),
                tags: vec!["registration".to_string()],
                created_by: "author-1".to_string(),
            })
            .await
            .unwrap();
    }
    let assistant = harness.assistant();

    let outcome = assistant.process_query("registration", "en", None).await;
    assert_eq!(outcome.sources.len(), 3);

    assistant.close().await;
}
