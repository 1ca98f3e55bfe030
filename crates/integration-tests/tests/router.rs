//! Router tests for the SER dashboard.
//!
//! The full application router is driven in-process. The database and the
//! external services point at a closed port, so these tests also cover how
//! each surface degrades when its collaborators are down.

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use ser_core::audio::{PcmAudio, encode_wav};
use ser_integration_tests::{analyze_request, get_as, multipart_body, test_app, test_config};

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
}

fn tone_wav() -> Vec<u8> {
    let samples = (0..1600)
        .map(|i| (f32::from(u16::try_from(i).unwrap()) * 0.05).sin() * 0.5)
        .collect();
    encode_wav(&PcmAudio::new(samples, 16_000, 1).unwrap()).unwrap()
}

// ============================================================================
// Health & Static
// ============================================================================

#[tokio::test]
async fn test_health_is_ok() {
    let app = test_app(test_config());
    let response = app.oneshot(get_as("/health", None, false)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn test_readiness_reports_unreachable_database() {
    let app = test_app(test_config());
    let response = app
        .oneshot(get_as("/health/ready", None, false))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_static_assets_are_served() {
    let app = test_app(test_config());
    let response = app
        .oneshot(get_as("/static/js/record.js", None, false))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("/api/analyze"));
}

#[tokio::test]
async fn test_responses_carry_security_and_request_id_headers() {
    let app = test_app(test_config());
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-123")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let headers = response.headers();

    assert_eq!(headers.get("x-request-id").unwrap(), "req-123");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert!(headers.contains_key("content-security-policy"));
    assert!(
        headers
            .get("permissions-policy")
            .unwrap()
            .to_str()
            .unwrap()
            .contains("microphone=(self)")
    );
}

// ============================================================================
// Pages
// ============================================================================

#[tokio::test]
async fn test_home_renders_for_anonymous_visitor() {
    let app = test_app(test_config());
    let response = app.oneshot(get_as("/", None, false)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("/sign-in"));
    assert!(!body.contains("record-start"));
}

#[tokio::test]
async fn test_home_shows_recorder_when_signed_in() {
    let app = test_app(test_config());
    let response = app.oneshot(get_as("/", Some("user_a"), false)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("record-start"));
    assert!(body.contains("/static/js/record.js"));
}

#[tokio::test]
async fn test_dashboard_redirects_anonymous_visitor_to_sign_in() {
    let app = test_app(test_config());
    let response = app.oneshot(get_as("/dashboard", None, false)).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/sign-in");
}

#[tokio::test]
async fn test_user_cannot_view_another_users_log() {
    let app = test_app(test_config());
    let response = app
        .oneshot(get_as("/dashboard/user_b", Some("user_a"), false))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");
}

#[tokio::test]
async fn test_user_dashboard_degrades_when_database_is_down() {
    let app = test_app(test_config());
    let response = app
        .oneshot(get_as("/dashboard", Some("user_a"), false))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Your Emotion Log"));
    assert!(body.contains("Showing the last results we have."));
}

#[tokio::test]
async fn test_admin_dashboard_degrades_when_services_are_down() {
    let app = test_app(test_config());
    let response = app
        .oneshot(get_as("/dashboard", Some("admin_1"), true))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Showing the last results we have."));
    assert!(body.contains("Emotion Distribution"));
    assert!(body.contains("No data yet"));
}

#[tokio::test]
async fn test_malformed_table_params_fall_back_to_defaults() {
    let app = test_app(test_config());
    let response = app
        .oneshot(get_as(
            "/dashboard?page=abc&sort=bogus&dir=sideways",
            Some("user_a"),
            false,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

// ============================================================================
// JSON API
// ============================================================================

#[tokio::test]
async fn test_api_requires_identity() {
    let app = test_app(test_config());
    let response = app
        .oneshot(get_as("/api/analyses", None, false))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_api_rejects_other_users_analyses() {
    let app = test_app(test_config());
    let response = app
        .oneshot(get_as("/api/analyses?user_id=user_b", Some("user_a"), false))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_stats_api_is_admin_only() {
    for path in ["/api/stats/emotions", "/api/stats/daily-users"] {
        let app = test_app(test_config());
        let response = app
            .oneshot(get_as(path, Some("user_a"), false))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{path}");
    }
}

#[tokio::test]
async fn test_stats_api_returns_empty_series_when_database_is_down() {
    let app = test_app(test_config());
    let response = app
        .oneshot(get_as("/api/stats/emotions", Some("admin_1"), true))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json, serde_json::json!([]));
}

// ============================================================================
// Analyze
// ============================================================================

#[tokio::test]
async fn test_analyze_requires_identity() {
    let app = test_app(test_config());
    let body = multipart_body(&[("audio", Some("a.wav"), &tone_wav())]);
    let response = app.oneshot(analyze_request(None, body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_analyze_rejects_form_without_audio() {
    let app = test_app(test_config());
    let body = multipart_body(&[("note", None, b"hello")]);
    let response = app
        .oneshot(analyze_request(Some("user_a"), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("No audio provided"));
}

#[tokio::test]
async fn test_analyze_rejects_non_wav_upload() {
    let app = test_app(test_config());
    let body = multipart_body(&[("audio", Some("a.mp3"), b"ID3 not a wav file at all, sorry")]);
    let response = app
        .oneshot(analyze_request(Some("user_a"), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analyze_rejects_oversized_upload() {
    let mut config = test_config();
    config.max_upload_bytes = 1024;
    let app = test_app(config);
    let body = multipart_body(&[("audio", Some("a.wav"), &tone_wav())]);
    let response = app
        .oneshot(analyze_request(Some("user_a"), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_analyze_rejects_pcm_without_sample_rate() {
    let app = test_app(test_config());
    let pcm: Vec<u8> = [0.0_f32, 0.25, -0.25, 0.5]
        .iter()
        .flat_map(|s| s.to_le_bytes())
        .collect();
    let body = multipart_body(&[("pcm", Some("audio.pcm"), &pcm), ("channels", None, b"1")]);
    let response = app
        .oneshot(analyze_request(Some("user_a"), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("sample_rate"));
}

#[tokio::test]
async fn test_analyze_reports_unavailable_inference_service() {
    let app = test_app(test_config());
    let body = multipart_body(&[("audio", Some("a.wav"), &tone_wav())]);
    let response = app
        .oneshot(analyze_request(Some("user_a"), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(
        body_text(response).await,
        "Emotion analysis service unavailable"
    );
}
