pub mod health;
pub mod sessions;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::editor::handlers as editor;
use crate::salary::handlers as salary;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Sessions and inputs
        .route("/api/v1/sessions", post(sessions::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(sessions::handle_get_session).delete(sessions::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/resume/pdf",
            post(sessions::handle_upload_resume_pdf),
        )
        .route(
            "/api/v1/sessions/:id/resume/text",
            put(sessions::handle_put_resume_text),
        )
        .route(
            "/api/v1/sessions/:id/job-description",
            put(sessions::handle_put_job_description),
        )
        // Stages
        .route(
            "/api/v1/sessions/:id/analysis",
            post(analysis::handle_run_analysis),
        )
        .route(
            "/api/v1/sessions/:id/analysis/raw",
            get(analysis::handle_get_raw_analysis),
        )
        .route("/api/v1/sessions/:id/editor", post(editor::handle_run_editor))
        .route("/api/v1/sessions/:id/salary", post(salary::handle_salary_estimate))
        .route(
            "/api/v1/sessions/:id/salary/role",
            post(salary::handle_role_salary_estimate),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::analysis::fixtures::valid_analysis;
    use crate::config::Config;
    use crate::llm_client::testing::{reply, single_shot_client, ScriptedTransport};
    use crate::session::{SessionStore, Slot};

    fn test_state(transport: Arc<ScriptedTransport>) -> AppState {
        AppState {
            client: single_shot_client(transport),
            sessions: SessionStore::new(),
            config: Config {
                port: 0,
                rust_log: "debug".to_string(),
                secrets_file: PathBuf::from("secrets.toml"),
                llm_timeout: Duration::from_secs(60),
                session_ttl: Duration::from_secs(3600),
            },
        }
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn session_with_resume(state: &AppState) -> Uuid {
        let id = state.sessions.create().await.id;
        state
            .sessions
            .set_resume_text(id, "Jane Doe, Rust engineer".to_string())
            .await;
        id
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(test_state(ScriptedTransport::new(vec![])));
        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let app = build_router(test_state(ScriptedTransport::new(vec![])));

        let (status, created) = send(&app, "POST", "/api/v1/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["session_id"].as_str().unwrap().to_string();
        let uri = format!("/api/v1/sessions/{id}");

        let (status, _) = send(
            &app,
            "PUT",
            &format!("{uri}/resume/text"),
            Some(json!({"text": "  Jane   Doe \n\n Rust  "})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, jd) = send(
            &app,
            "PUT",
            &format!("{uri}/job-description"),
            Some(json!({"text": "N/A"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(jd["job_description_usable"], false);

        let (status, snapshot) = send(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(snapshot["has_resume"], true);
        assert_eq!(snapshot["resume_chars"], "Jane Doe\nRust".len());

        let (status, _) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, body) = send(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_analysis_stores_raw_report() {
        let transport = ScriptedTransport::new(vec![reply(valid_analysis())]);
        let state = test_state(transport);
        let id = session_with_resume(&state).await;
        let app = build_router(state.clone());

        let (status, run) = send(
            &app,
            "POST",
            &format!("/api/v1/sessions/{id}/analysis"),
            Some(json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(run["mode"], "targeted");
        assert!(run["markdown"].as_str().unwrap().starts_with("# Resume analysis"));

        let (status, raw) = send(&app, "GET", &format!("/api/v1/sessions/{id}/analysis/raw"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(raw.get("completeness_check").is_some());
    }

    #[tokio::test]
    async fn test_analysis_without_resume_is_input_error() {
        let transport = ScriptedTransport::new(vec![reply(valid_analysis())]);
        let state = test_state(transport.clone());
        let id = state.sessions.create().await.id;
        let app = build_router(state);

        let (status, body) = send(&app, "POST", &format!("/api/v1/sessions/{id}/analysis"), None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INPUT_ERROR");
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_raw_analysis_before_run_is_not_found() {
        let state = test_state(ScriptedTransport::new(vec![]));
        let id = state.sessions.create().await.id;
        let app = build_router(state);

        let (status, _) = send(&app, "GET", &format!("/api/v1/sessions/{id}/analysis/raw"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_failed_cascade_leaves_slot_untouched() {
        let transport = ScriptedTransport::new(vec![
            reply(json!({"error": true, "reason": "job description missing"})),
            reply(json!({"error": true})),
            reply(json!({"error": true})),
        ]);
        let state = test_state(transport);
        let id = session_with_resume(&state).await;
        state
            .sessions
            .write_slot(id, Slot::AnalysisJson, json!({"previous": true}))
            .await;
        let app = build_router(state.clone());

        let (status, body) = send(&app, "POST", &format!("/api/v1/sessions/{id}/analysis"), None).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "MODEL_DECLINED");
        assert_eq!(body["error"]["message"], "job description missing");
        let session = state.sessions.get(id).await.unwrap();
        assert_eq!(session.slot(Slot::AnalysisJson), Some(&json!({"previous": true})));
    }

    #[tokio::test]
    async fn test_editor_stores_markdown() {
        let transport = ScriptedTransport::new(vec![Ok("# Jane Doe".to_string())]);
        let state = test_state(transport);
        let id = session_with_resume(&state).await;
        let app = build_router(state.clone());

        let (status, run) = send(
            &app,
            "POST",
            &format!("/api/v1/sessions/{id}/editor"),
            Some(json!({"version": "full"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(run["version"], "full");
        let session = state.sessions.get(id).await.unwrap();
        assert_eq!(session.slot(Slot::EditorOutput), Some(&json!("# Jane Doe")));
    }

    #[tokio::test]
    async fn test_role_salary_route() {
        let transport = ScriptedTransport::new(vec![reply(json!({
            "estimate_rub_month": {"min": 150000, "max": 220000, "median": 180000},
            "confidence": "medium",
            "assumptions": ["Full-time"],
            "notes": "Regional market"
        }))]);
        let state = test_state(transport);
        let id = state.sessions.create().await.id;
        let app = build_router(state.clone());

        let (status, run) = send(
            &app,
            "POST",
            &format!("/api/v1/sessions/{id}/salary/role"),
            Some(json!({"role_title": "Product Analyst", "city": "Novosibirsk"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(run["attempts"], 1);
        let session = state.sessions.get(id).await.unwrap();
        assert!(session.slot(Slot::RoleSalaryJson).is_some());
        assert!(session.slot(Slot::SalaryJson).is_none());
    }

    #[tokio::test]
    async fn test_transport_failure_maps_to_bad_gateway() {
        let state = test_state(ScriptedTransport::new(vec![]));
        let id = session_with_resume(&state).await;
        let app = build_router(state);

        let (status, body) = send(&app, "POST", &format!("/api/v1/sessions/{id}/salary"), None).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "TRANSPORT_ERROR");
    }
}
