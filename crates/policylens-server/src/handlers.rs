//! Request handlers.
//!
//! `/brief` never surfaces a generation failure as a transport error: both
//! failure classes map to a well-formed low-confidence payload with 200.
//! Only malformed input (bad JSON, unknown labels, out-of-bounds document
//! length) is rejected, with 422, before the pipeline runs.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

use policylens_core::{BriefRequest, BriefResult};
use policylens_runtime::GenerateError;

use crate::server::AppState;

#[derive(Serialize)]
pub struct HealthResponse<'a> {
    status: &'a str,
}

/// Fixed liveness constant.
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

/// Generate a policy brief.
pub async fn create_brief(
    State(state): State<AppState>,
    Json(request): Json<BriefRequest>,
) -> Response {
    if let Err(reason) = request.validate() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": reason.to_string() })),
        )
            .into_response();
    }

    let brief = match state.generator.generate(&request).await {
        Ok(brief) => brief,
        Err(GenerateError::ParseOrValidation(e)) => {
            tracing::warn!(error = %e, "returning degraded brief: unparsable completion");
            BriefResult::parse_failure()
        }
        Err(GenerateError::Communication(e)) => {
            tracing::warn!(error = %e, "returning degraded brief: provider unavailable");
            BriefResult::service_unavailable()
        }
    };

    (StatusCode::OK, Json(brief)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::build_app;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use policylens_runtime::{
        BriefGenerator, ChatMessage, CompletionConfig, CompletionResponse, InMemoryCache,
        LlmProvider, ProviderChain, ProviderError, RuntimeConfig,
    };
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    const VALID_BRIEF: &str = r#"{
        "summary": "Street vendors must register with the city.",
        "key_obligations": ["Register by 2025-03-01", "Display the permit"],
        "effective_date": "2025-03-01",
        "confidence": "high"
    }"#;

    struct ScriptedProvider {
        reply: Option<&'static str>,
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn complete(
            &self,
            _messages: &[ChatMessage],
            config: &CompletionConfig,
        ) -> Result<CompletionResponse, ProviderError> {
            match self.reply {
                Some(text) => Ok(CompletionResponse {
                    content: text.to_string(),
                    model: config.model.clone(),
                }),
                None => Err(ProviderError::HttpError("connection refused".to_string())),
            }
        }

        fn health_check(&self) -> bool {
            true
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn app_with_reply(reply: Option<&'static str>) -> axum::Router {
        let config = RuntimeConfig::default();
        let chain =
            ProviderChain::new().push(Arc::new(ScriptedProvider { reply }), "test-model");
        let cache = Arc::new(InMemoryCache::new(config.cache_ttl));
        let generator = Arc::new(BriefGenerator::new(chain, cache, config));
        build_app(AppState { generator })
    }

    fn brief_request_body(document: &str) -> Body {
        Body::from(
            serde_json::to_vec(&json!({
                "document": document,
                "audience": "citizen",
                "language": "en",
            }))
            .unwrap(),
        )
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn long_document() -> String {
        "All street vendors operating within city limits must register. ".repeat(3)
    }

    #[tokio::test]
    async fn test_health_returns_fixed_status() {
        let app = app_with_reply(Some(VALID_BRIEF));
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_brief_happy_path() {
        let app = app_with_reply(Some(VALID_BRIEF));
        let response = app
            .oneshot(
                Request::post("/brief")
                    .header("content-type", "application/json")
                    .body(brief_request_body(&long_document()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["summary"], "Street vendors must register with the city.");
        assert_eq!(body["confidence"], "high");
        assert_eq!(body["key_obligations"].as_array().unwrap().len(), 2);
        assert_eq!(body["effective_date"], "2025-03-01");
    }

    #[tokio::test]
    async fn test_short_document_is_rejected() {
        let app = app_with_reply(Some(VALID_BRIEF));
        let response = app
            .oneshot(
                Request::post("/brief")
                    .header("content-type", "application/json")
                    .body(brief_request_body("too short"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_unknown_audience_is_rejected() {
        let app = app_with_reply(Some(VALID_BRIEF));
        let body = Body::from(
            serde_json::to_vec(&json!({
                "document": long_document(),
                "audience": "lobbyist",
                "language": "en",
            }))
            .unwrap(),
        );
        let response = app
            .oneshot(
                Request::post("/brief")
                    .header("content-type", "application/json")
                    .body(body)
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_unparsable_completion_degrades_with_exact_payload() {
        let app = app_with_reply(Some("I'm sorry, that document is too complex."));
        let response = app
            .oneshot(
                Request::post("/brief")
                    .header("content-type", "application/json")
                    .body(brief_request_body(&long_document()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({
                "summary": "Could not generate structured summary.",
                "key_obligations": ["Document may be too vague or complex."],
                "effective_date": "unknown",
                "confidence": "low"
            })
        );
    }

    #[tokio::test]
    async fn test_provider_failure_degrades_with_exact_payload() {
        let app = app_with_reply(None);
        let response = app
            .oneshot(
                Request::post("/brief")
                    .header("content-type", "application/json")
                    .body(brief_request_body(&long_document()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({
                "summary": "LLM service unavailable.",
                "key_obligations": ["Try again later."],
                "effective_date": "unknown",
                "confidence": "low"
            })
        );
    }
}
