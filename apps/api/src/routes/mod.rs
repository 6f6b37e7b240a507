pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analytics;
use crate::documents::{self, MAX_FILES_PER_IMPORT};
use crate::jobs;
use crate::keywords;
use crate::matching;
use crate::state::AppState;

/// Multipart framing on top of the raw file bytes.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state
        .config
        .max_upload_bytes
        .saturating_mul(MAX_FILES_PER_IMPORT)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route("/health", get(health::health_handler))
        // Matching
        .route("/match/search", post(matching::handlers::handle_search))
        .route("/match/keywords", post(keywords::handlers::handle_keywords))
        .route("/match/skills", post(matching::handlers::handle_skill_search))
        .route(
            "/match/jobs/:id/candidates",
            get(matching::handlers::handle_candidates_for_job),
        )
        .route(
            "/match/candidates/:id/jobs",
            get(matching::handlers::handle_jobs_for_candidate),
        )
        // Intake
        .route(
            "/documents",
            post(documents::handlers::handle_upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/jobs", post(jobs::handlers::handle_create_job))
        // Dashboard
        .route("/dashboard/stats", get(analytics::handlers::handle_stats))
        .route(
            "/dashboard/top-skills",
            get(analytics::handlers::handle_top_skills),
        )
        .route(
            "/dashboard/submission-trend",
            get(analytics::handlers::handle_submission_trend),
        )
        .route("/dashboard/job-stats", get(analytics::handlers::handle_job_stats))
        .route(
            "/dashboard/education-distribution",
            get(analytics::handlers::handle_education_distribution),
        )
        .route("/dashboard/analytics", get(analytics::handlers::handle_analytics))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::embedding::testing::{DownEmbedder, HashingEmbedder};
    use crate::embedding::VectorProvider;
    use crate::extraction::docx::build_docx;
    use crate::extraction::MIME_DOCX;

    const BOUNDARY: &str = "talentrank-test-boundary";

    fn app(provider: Arc<dyn VectorProvider>) -> Router {
        build_router(AppState::for_tests(provider, false))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    /// (filename, content type, bytes)
    fn multipart(files: &[(&str, &str, Vec<u8>)]) -> Request<Body> {
        let mut body = Vec::new();
        for (filename, content_type, bytes) in files {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; \
                     filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::post("/documents")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn docx(paragraphs: &[&str]) -> Vec<u8> {
        build_docx(paragraphs)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(Arc::new(HashingEmbedder)), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "talentrank");
        assert_eq!(body["embedding"]["provider"], "hashing");
    }

    #[tokio::test]
    async fn test_keywords_endpoint() {
        let app = app(Arc::new(HashingEmbedder));
        let (status, body) = send(
            &app,
            post_json(
                "/match/keywords",
                json!({
                    "resumeText": "Experience: Python developer. jane@example.com 555-123-4567",
                    "jobText": "Python developer with Docker"
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["analysis"]["matchedSkills"], json!(["python"]));
        assert_eq!(body["analysis"]["missingSkills"], json!(["docker"]));
        assert_eq!(body["ats"]["formattingScore"], 100);
        assert!(body["ats"]["grade"].is_string());
        assert!(body["suggestions"].as_array().unwrap().len() >= 2);
        assert_eq!(body["placements"][0]["priority"], "high");
    }

    #[tokio::test]
    async fn test_keywords_requires_text() {
        let app = app(Arc::new(HashingEmbedder));
        let (status, body) = send(
            &app,
            post_json("/match/keywords", json!({"resumeText": " ", "jobText": "x"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_upload_reports_each_file() {
        let app = app(Arc::new(HashingEmbedder));
        let (status, body) = send(
            &app,
            multipart(&[
                ("jane.docx", MIME_DOCX, docx(&["Jane Doe", "Python, React"])),
                ("notes.txt", "text/plain", b"hello".to_vec()),
            ]),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["imported"], 1);
        assert_eq!(body["failed"], 1);
        assert_eq!(body["files"][0]["status"], "imported");
        assert_eq!(body["files"][0]["embedding"], "semantic");
        assert_eq!(body["files"][0]["summary"]["name"], "Jane Doe");
        assert_eq!(body["files"][1]["status"], "failed");
        assert_eq!(body["files"][1]["error"]["code"], "UNSUPPORTED_FORMAT");
    }

    #[tokio::test]
    async fn test_upload_without_files_is_rejected() {
        let app = app(Arc::new(HashingEmbedder));
        let (status, _) = send(&app, multipart(&[])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_rank_search_and_reverse_ranking() {
        let app = app(Arc::new(HashingEmbedder));

        let (_, upload) = send(
            &app,
            multipart(&[
                ("weak.docx", MIME_DOCX, docx(&["Wes Weak", "Java and Scrum"])),
                (
                    "strong.docx",
                    MIME_DOCX,
                    docx(&["Sara Strong", "Python, Docker and Kubernetes"]),
                ),
            ]),
        )
        .await;
        let weak_id = upload["files"][0]["candidateId"].as_str().unwrap().to_string();
        let strong_id = upload["files"][1]["candidateId"].as_str().unwrap().to_string();

        let (status, job) = send(
            &app,
            post_json(
                "/jobs",
                json!({
                    "title": "Platform Engineer",
                    "company": "Acme",
                    "description": "Run containers in production",
                    "requiredSkills": ["Python", "Docker"]
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(job["embedding"], "semantic");
        let job_id = job["id"].as_str().unwrap().to_string();

        let (status, ranked) = send(&app, get(&format!("/match/jobs/{job_id}/candidates?topN=5"))).await;
        assert_eq!(status, StatusCode::OK);
        let results = ranked["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["subjectId"], strong_id);
        assert_eq!(results[0]["skillMatchPercentage"], 100);
        assert_eq!(results[1]["subjectId"], weak_id);
        assert_eq!(results[1]["missingSkills"], json!(["Python", "Docker"]));
        assert!(results[0]["explanation"].is_string());

        let (status, jobs) = send(&app, get(&format!("/match/candidates/{strong_id}/jobs"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(jobs["results"][0]["targetId"], job_id);

        let (status, search) = send(
            &app,
            post_json(
                "/match/search",
                json!({"queryText": "Python Docker engineer", "topN": 1}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(search["results"].as_array().unwrap().len(), 1);
        assert_eq!(search["results"][0]["id"], strong_id);
        assert_eq!(search["stats"]["totalResults"], 1);

        let (status, skills) = send(
            &app,
            post_json("/match/skills", json!({"requiredSkills": ["scrum"]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(skills["total"], 1);
        assert_eq!(skills["results"][0]["id"], weak_id);
    }

    #[tokio::test]
    async fn test_search_fails_when_embedding_unavailable() {
        let app = app(Arc::new(DownEmbedder));
        let (status, body) = send(
            &app,
            post_json("/match/search", json!({"queryText": "rust", "topN": 5})),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "EMBEDDING_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_unknown_job_is_404() {
        let app = app(Arc::new(HashingEmbedder));
        let (status, body) = send(
            &app,
            get(&format!("/match/jobs/{}/candidates", uuid::Uuid::new_v4())),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_skill_search_rejects_unknown_level() {
        let app = app(Arc::new(HashingEmbedder));
        let (status, _) = send(
            &app,
            post_json(
                "/match/skills",
                json!({"requiredSkills": ["rust"], "experienceLevel": "wizard"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_search_reports_candidates_that_cannot_be_embedded() {
        let app = app(Arc::new(HashingEmbedder));
        let (_, upload) = send(
            &app,
            multipart(&[
                ("ok.docx", MIME_DOCX, docx(&["Olga Ok", "Python developer"])),
                (
                    "flaky.docx",
                    MIME_DOCX,
                    docx(&["Fred Flaky", "Python FAIL_EMBEDDING"]),
                ),
            ]),
        )
        .await;
        assert_eq!(upload["files"][1]["embedding"], "missing");
        let ok_id = upload["files"][0]["candidateId"].as_str().unwrap().to_string();
        let flaky_id = upload["files"][1]["candidateId"].as_str().unwrap().to_string();

        let (status, search) = send(
            &app,
            post_json("/match/search", json!({"queryText": "Python"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(search["results"].as_array().unwrap().len(), 1);
        assert_eq!(search["results"][0]["id"], ok_id);
        assert_eq!(search["skipped"][0]["id"], flaky_id);
        assert_eq!(search["skipped"][0]["reason"], "embeddingUnavailable");
    }

    #[tokio::test]
    async fn test_search_backfills_candidates_imported_while_provider_was_down() {
        let state = AppState::for_tests(Arc::new(DownEmbedder), false);
        let (_, upload) = send(
            &build_router(state.clone()),
            multipart(&[("late.docx", MIME_DOCX, docx(&["Lee Late", "Rust and Python"]))]),
        )
        .await;
        assert_eq!(upload["files"][0]["embedding"], "missing");
        let late_id = upload["files"][0]["candidateId"].as_str().unwrap().to_string();

        let recovered = AppState {
            embeddings: AppState::for_tests(Arc::new(HashingEmbedder), false).embeddings,
            ..state
        };
        let (status, search) = send(
            &build_router(recovered),
            post_json("/match/search", json!({"queryText": "Rust"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(search["results"][0]["id"], late_id);
        assert_eq!(search["skipped"], json!([]));
    }

    #[tokio::test]
    async fn test_jobs_for_candidate_reports_jobs_that_cannot_be_embedded() {
        let app = app(Arc::new(HashingEmbedder));
        let (_, upload) = send(
            &app,
            multipart(&[("dev.docx", MIME_DOCX, docx(&["Dana Dev", "Python and Docker"]))]),
        )
        .await;
        let candidate_id = upload["files"][0]["candidateId"].as_str().unwrap().to_string();

        let (_, good) = send(
            &app,
            post_json(
                "/jobs",
                json!({"title": "Backend", "requiredSkills": ["Python"]}),
            ),
        )
        .await;
        let (status, flaky) = send(
            &app,
            post_json(
                "/jobs",
                json!({
                    "title": "Platform",
                    "description": "FAIL_EMBEDDING",
                    "requiredSkills": ["Docker"]
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(flaky["embedding"], "missing");
        assert_eq!(flaky["status"], "active");

        let (status, jobs) = send(&app, get(&format!("/match/candidates/{candidate_id}/jobs"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(jobs["results"].as_array().unwrap().len(), 1);
        assert_eq!(jobs["results"][0]["targetId"], good["id"]);
        assert_eq!(jobs["skipped"][0]["id"], flaky["id"]);
        assert_eq!(jobs["skipped"][0]["reason"], "embeddingUnavailable");
        assert_eq!(jobs["stats"]["total"], 1);
    }

    #[tokio::test]
    async fn test_rejected_text_is_skipped_with_its_own_reason() {
        let app = app(Arc::new(HashingEmbedder));
        send(
            &app,
            multipart(&[(
                "long.docx",
                MIME_DOCX,
                docx(&["Lara Long", "Python REJECT_EMBEDDING"]),
            )]),
        )
        .await;

        let (status, search) = send(
            &app,
            post_json("/match/search", json!({"queryText": "Python"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(search["skipped"][0]["reason"], "embeddingRejected");

        let (status, body) = send(
            &app,
            post_json("/match/search", json!({"queryText": "REJECT_EMBEDDING"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "EMBEDDING_REJECTED");
    }

    #[tokio::test]
    async fn test_dashboard_endpoints() {
        let app = app(Arc::new(HashingEmbedder));
        send(
            &app,
            multipart(&[
                (
                    "a.docx",
                    MIME_DOCX,
                    docx(&["Amy Adams", "Python, Docker", "Master of Science"]),
                ),
                ("b.docx", MIME_DOCX, docx(&["Ben Brown", "Python"])),
            ]),
        )
        .await;
        send(
            &app,
            post_json(
                "/jobs",
                json!({"title": "Backend", "company": "Acme", "requiredSkills": ["Python"]}),
            ),
        )
        .await;

        let (status, stats) = send(&app, get("/dashboard/stats")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["totalResumes"], 2);
        assert_eq!(stats["activeJobs"], 1);

        let (_, skills) = send(&app, get("/dashboard/top-skills?limit=1")).await;
        assert_eq!(skills["topSkills"], json!([{"skill": "python", "count": 2, "percentage": 100}]));

        let (_, trend) = send(&app, get("/dashboard/submission-trend?days=7")).await;
        assert_eq!(trend["days"], 7);
        assert_eq!(trend["trend"].as_array().unwrap().len(), 7);
        assert_eq!(trend["trend"][6]["count"], 2);

        let (_, jobs) = send(&app, get("/dashboard/job-stats")).await;
        assert_eq!(jobs["topCompanies"][0]["company"], "Acme");

        let (_, education) = send(&app, get("/dashboard/education-distribution")).await;
        assert_eq!(education["distribution"][1]["level"], "Master");
        assert_eq!(education["distribution"][1]["count"], 1);

        let (status, analytics) = send(&app, get("/dashboard/analytics")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(analytics["overview"]["totalJobs"], 1);
        assert!(analytics["generatedAt"].is_string());

        let (status, _) = send(&app, get("/dashboard/top-skills?limit=0")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
