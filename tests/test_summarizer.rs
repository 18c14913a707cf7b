use bibdigest::bibtex::RawRecord;
use bibdigest::config::{Provider, ServiceConfig};
use bibdigest::error::SummaryError;
use bibdigest::summarizer::{ChatSummarizer, Summarizer, SummaryLanguage, SummaryStatus};
use mockito::{Matcher, Server};
use serde_json::json;
use std::time::Duration;

fn paper() -> RawRecord {
    RawRecord::builder("smith2024", "inproceedings")
        .field("title", "Tangible Widgets for Remote Collaboration")
        .field("author", "Smith, Alice and Jones, Bob")
        .field("abstract", "We present tangible widgets that synchronise across sites.")
        .field("doi", "10.1145/3654777.3676001")
        .build()
}

fn chat_body(content: &serde_json::Value) -> String {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": content.to_string(),
                "refusal": null
            },
            "finish_reason": "stop"
        }]
    })
    .to_string()
}

fn english_summary() -> serde_json::Value {
    json!({
        "background": "Remote teams **lack** shared physical objects",
        "purpose": "Enable shared tangible interaction",
        "proposal": "Synchronised **tangible widgets**",
        "evaluation": "A study with 12 pairs",
        "result": "Widgets improved coordination"
    })
}

fn openai_config(server: &Server) -> ServiceConfig {
    ServiceConfig::openai("test-key", "gpt-test")
        .with_endpoint(server.url())
        .with_timeout(Duration::from_secs(5))
}

#[test]
fn test_openai_summary_success() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(json!({
                "model": "gpt-test",
                "response_format": {
                    "type": "json_schema",
                    "json_schema": { "name": "PaperSummary", "strict": true }
                }
            })),
            Matcher::Regex("Tangible Widgets for Remote Collaboration".into()),
            Matcher::Regex("synchronise across sites".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(chat_body(&english_summary()))
        .create();

    let summarizer = ChatSummarizer::new(openai_config(&server), SummaryLanguage::English).unwrap();
    assert_eq!(summarizer.config().model, "gpt-test");
    assert_eq!(summarizer.config().provider, Provider::OpenAi);
    let summary = summarizer.request_summary(&paper()).unwrap();

    assert_eq!(summary.background, "Remote teams **lack** shared physical objects");
    assert_eq!(summary.proposal, "Synchronised **tangible widgets**");
    assert_eq!(summary.result, "Widgets improved coordination");
    assert!(summary.translation.is_none());
    mock.assert();
}

#[test]
fn test_azure_translated_summary_success() {
    let mut server = Server::new();
    let url = server.url();
    let mut content = english_summary();
    content["title_ja"] = json!("**遠隔協調**のためのタンジブルウィジェット");
    content["abstract_ja"] = json!("拠点間で同期するウィジェットを提案する。");

    let mock = server
        .mock("POST", "/openai/deployments/gpt-4o/chat/completions")
        .match_query(Matcher::UrlEncoded("api-version".into(), "2024-08-01-preview".into()))
        .match_header("api-key", "azure-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(chat_body(&content))
        .create();

    let config = ServiceConfig::from_lookup(Provider::Azure, None, |name| match name {
        "AZURE_OPENAI_ENDPOINT" => Some(url.clone()),
        "AZURE_OPENAI_API_KEY" => Some("azure-key".to_string()),
        _ => None,
    })
    .unwrap();
    let summarizer = ChatSummarizer::new(config, SummaryLanguage::Japanese).unwrap();
    let enriched = summarizer.summarize(&paper());

    assert_eq!(enriched.status, SummaryStatus::Summarized);
    let translation = enriched.summary.translation.as_ref().unwrap();
    assert_eq!(translation.title_ja, "**遠隔協調**のためのタンジブルウィジェット");
    assert_eq!(translation.abstract_ja, "拠点間で同期するウィジェットを提案する。");
    assert_eq!(enriched.summary.evaluation, "A study with 12 pairs");
    mock.assert();
}

#[test]
fn test_service_error_falls_back_to_empty_summary() {
    let mut server = Server::new();
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(500)
        .with_body("upstream exploded")
        .expect(2)
        .create();

    let summarizer = ChatSummarizer::new(openai_config(&server), SummaryLanguage::English).unwrap();

    let err = summarizer.request_summary(&paper()).unwrap_err();
    assert!(matches!(err, SummaryError::Service { status: 500, .. }));

    let enriched = summarizer.summarize(&paper());
    assert_eq!(enriched.status, SummaryStatus::Fallback);
    assert!(enriched.summary.is_empty());
    assert_eq!(enriched.record, paper());
}

#[test]
fn test_missing_field_is_a_schema_error_and_never_partial() {
    let mut server = Server::new();
    let mut content = english_summary();
    content.as_object_mut().unwrap().remove("result");
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(chat_body(&content))
        .expect(2)
        .create();

    let summarizer = ChatSummarizer::new(openai_config(&server), SummaryLanguage::English).unwrap();

    let err = summarizer.request_summary(&paper()).unwrap_err();
    assert!(matches!(err, SummaryError::SchemaConformance(_)));

    let enriched = summarizer.summarize(&paper());
    assert_eq!(enriched.status, SummaryStatus::Fallback);
    assert_eq!(enriched.summary.background, "");
    assert_eq!(enriched.summary.result, "");
}

#[test]
fn test_japanese_requires_translation_fields() {
    let mut server = Server::new();
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(chat_body(&english_summary()))
        .create();

    let summarizer = ChatSummarizer::new(openai_config(&server), SummaryLanguage::Japanese).unwrap();
    let err = summarizer.request_summary(&paper()).unwrap_err();
    assert!(matches!(err, SummaryError::SchemaConformance(_)));
}

#[test]
fn test_non_json_content_is_a_schema_error() {
    let mut server = Server::new();
    let body = json!({
        "choices": [{ "message": { "role": "assistant", "content": "Sure! Here is a summary." } }]
    });
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create();

    let summarizer = ChatSummarizer::new(openai_config(&server), SummaryLanguage::English).unwrap();
    let err = summarizer.request_summary(&paper()).unwrap_err();
    assert!(matches!(err, SummaryError::SchemaConformance(_)));
}

#[test]
fn test_refusal_is_reported() {
    let mut server = Server::new();
    let body = json!({
        "choices": [{ "message": { "role": "assistant", "content": null, "refusal": "I can't help with that." } }]
    });
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create();

    let summarizer = ChatSummarizer::new(openai_config(&server), SummaryLanguage::English).unwrap();
    let err = summarizer.request_summary(&paper()).unwrap_err();
    assert!(matches!(err, SummaryError::Refusal(ref msg) if msg == "I can't help with that."));
}

#[test]
fn test_empty_choices_is_an_error() {
    let mut server = Server::new();
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices": []}"#)
        .create();

    let summarizer = ChatSummarizer::new(openai_config(&server), SummaryLanguage::English).unwrap();
    let err = summarizer.request_summary(&paper()).unwrap_err();
    assert!(matches!(err, SummaryError::EmptyResponse));
}

#[test]
fn test_unreachable_service_is_a_transport_error() {
    let config = ServiceConfig::openai("test-key", "gpt-test")
        .with_endpoint("http://127.0.0.1:1")
        .with_timeout(Duration::from_secs(2));
    let summarizer = ChatSummarizer::new(config, SummaryLanguage::English).unwrap();

    let err = summarizer.request_summary(&paper()).unwrap_err();
    assert!(matches!(err, SummaryError::Transport(_)));
    assert_eq!(summarizer.summarize(&paper()).status, SummaryStatus::Fallback);
}

#[test]
fn test_response_format_declares_every_field() {
    let format = SummaryLanguage::Japanese.response_format();
    let schema = &format["json_schema"]["schema"];
    let required: Vec<&str> = schema["required"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(required, SummaryLanguage::Japanese.summary_fields());
    assert_eq!(schema["additionalProperties"], json!(false));
    assert_eq!(schema["properties"]["title_ja"]["type"], "string");
}

#[test]
fn test_user_prompt_embeds_title_and_abstract() {
    let prompt = SummaryLanguage::English.user_prompt("My Title", "My abstract.");
    assert!(prompt.contains("Title:\nMy Title"));
    assert!(prompt.contains("Abstract:\nMy abstract."));
    assert!(prompt.contains("\"evaluation\""));
    assert!(!prompt.contains("title_ja"));
}
