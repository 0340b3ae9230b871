use oblique_strategies::{
    ai::{GeminiTextClient, MockTextClient, StrategyModel},
    app::App,
    client::StrategyClient,
    generator::{GeneratorSettings, StrategyGenerator},
    models::{FallbackPolicy, GenerationRequest, Verbosity},
    prompts::starts_with_banned,
    state::AppState,
    strategies::CuratedStrategies,
    Error,
};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn spawn_app(model: StrategyModel, policy: FallbackPolicy) -> String {
    let generator = StrategyGenerator::new(
        model,
        Arc::new(CuratedStrategies::builtin().unwrap()),
        GeneratorSettings {
            policy,
            request_timeout: Duration::from_secs(8),
            max_count: 5,
        },
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = App::with_state(AppState::new(generator), addr);
    tokio::spawn(app.serve_on(listener));

    format!("http://{}", addr)
}

fn gemini_text(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    }))
}

#[tokio::test]
async fn test_full_workflow_with_gemini_stub() {
    let gemini = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(gemini_text("\"Multiply the silence.\""))
        .expect(3)
        .mount(&gemini)
        .await;

    let model = StrategyModel::configured(
        GeminiTextClient::new("test-key".to_string(), "gemini-1.5-flash".to_string())
            .with_base_url(gemini.uri()),
    );
    let base_url = spawn_app(model, FallbackPolicy::Reject).await;

    let strategies = StrategyClient::new(base_url)
        .request_strategies(&GenerationRequest::new(
            3,
            Verbosity::Concise,
            vec!["playful".to_string()],
        ))
        .await
        .unwrap();

    assert_eq!(strategies.len(), 3);
    for strategy in &strategies {
        assert_eq!(strategy.text, "Multiply the silence");
        assert_eq!(strategy.source, "gemini");
    }
}

#[tokio::test]
async fn test_banned_starters_are_dropped_end_to_end() {
    let mock = MockTextClient::new()
        .with_response("Embrace the glitch.")
        .with_response("Embrace the glitch.")
        .with_response("Reverse the order of your last three actions");
    let base_url = spawn_app(StrategyModel::configured(mock), FallbackPolicy::Reject).await;

    let strategies = StrategyClient::new(base_url)
        .request_strategies(&GenerationRequest::new(
            3,
            Verbosity::Concise,
            vec!["playful".to_string()],
        ))
        .await
        .unwrap();

    let texts: Vec<&str> = strategies.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(texts, vec!["Reverse the order of your last three actions"]);
}

#[tokio::test]
async fn test_substitute_policy_end_to_end() {
    let mock = MockTextClient::new()
        .with_response("Embrace the glitch.")
        .with_response("Embrace the glitch.")
        .with_response("Reverse the order of your last three actions");
    let base_url = spawn_app(StrategyModel::configured(mock), FallbackPolicy::Substitute).await;

    let strategies = StrategyClient::new(base_url)
        .request_strategies(&GenerationRequest::new(3, Verbosity::Concise, vec![]))
        .await
        .unwrap();

    assert_eq!(strategies.len(), 3);
    assert!(strategies.iter().all(|s| s.source == "gemini"));
    assert!(strategies.iter().all(|s| !starts_with_banned(&s.text)));
    assert!(strategies
        .iter()
        .any(|s| s.text == "Reverse the order of your last three actions"));
}

#[tokio::test]
async fn test_missing_credential_yields_hinted_error() {
    let base_url = spawn_app(StrategyModel::Unconfigured, FallbackPolicy::Reject).await;

    let err = StrategyClient::new(base_url)
        .request_strategies(&GenerationRequest::default())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Communication(_)));
    assert!(err.configuration_hint().is_some());
}

#[tokio::test]
async fn test_missing_credential_substitute_serves_authentic() {
    let base_url = spawn_app(StrategyModel::Unconfigured, FallbackPolicy::Substitute).await;

    let strategies = StrategyClient::new(base_url)
        .request_strategies(&GenerationRequest::new(5, Verbosity::Verbose, vec![]))
        .await
        .unwrap();

    assert_eq!(strategies.len(), 5);
    assert!(strategies
        .iter()
        .all(|s| s.source_label() == Some("Authentic Brian Eno Strategy")));
}

#[tokio::test]
async fn test_non_positive_count_is_bad_request() {
    let mock = MockTextClient::new();
    let base_url =
        spawn_app(StrategyModel::configured(mock.clone()), FallbackPolicy::Substitute).await;

    let err = StrategyClient::new(base_url)
        .request_strategies(&GenerationRequest::new(-1, Verbosity::Concise, vec![]))
        .await
        .unwrap_err();

    match err {
        Error::Communication(msg) => assert_eq!(msg, "Invalid count specified"),
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(mock.get_call_count(), 0);
}
