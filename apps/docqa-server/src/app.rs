//! Router and the single `execute` endpoint.
//!
//! The endpoint accepts a multipart form with repeated `questions` fields,
//! an optional `override` flag, and an optional `file` upload. A newly
//! saved upload forces re-indexing even without the flag.

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::post;
use axum::{Json, Router};
use docqa_core::types::QuestionRecord;
use docqa_pipeline::file_store::FileStore;
use docqa_pipeline::orchestrator::BatchOrchestrator;
use std::sync::Arc;
use std::time::Instant;

use crate::error::ApiError;

const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<BatchOrchestrator>,
    pub files: Arc<FileStore>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/agent-document/execute", post(execute))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(middleware::from_fn(process_time))
        .with_state(state)
}

/// Stamps every response with the wall-clock handling time in milliseconds.
async fn process_time(request: Request<axum::body::Body>, next: Next) -> Response {
    let started = Instant::now();
    let mut response = next.run(request).await;
    let millis = started.elapsed().as_millis().to_string();
    if let Ok(header) = axum::http::HeaderValue::from_str(&millis) {
        response.headers_mut().insert("x-process-time", header);
    }
    response
}

struct ExecuteForm {
    questions: Vec<String>,
    override_index: bool,
    upload: Option<(String, Vec<u8>)>,
}

async fn read_form(mut multipart: Multipart) -> Result<ExecuteForm, ApiError> {
    let mut form = ExecuteForm { questions: Vec::new(), override_index: false, upload: None };
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("malformed multipart body: {e}")))?
    {
        match field.name() {
            Some("questions") => {
                let question = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("unreadable question: {e}")))?;
                if !question.trim().is_empty() {
                    form.questions.push(question);
                }
            }
            Some("override") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("unreadable override: {e}")))?;
                form.override_index = matches!(raw.trim(), "true" | "True" | "1");
            }
            Some("file") => {
                let file_name = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| ApiError::bad_request("file part is missing a filename"))?;
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("unreadable file: {e}")))?;
                form.upload = Some((file_name, bytes.to_vec()));
            }
            _ => {}
        }
    }
    Ok(form)
}

async fn execute(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Vec<QuestionRecord>>, ApiError> {
    let form = read_form(multipart).await?;
    if form.questions.is_empty() {
        return Err(ApiError::bad_request("at least one question is required"));
    }

    let mut newly_written = false;
    if let Some((file_name, bytes)) = &form.upload {
        newly_written = state
            .files
            .save(file_name, bytes, form.override_index)
            .await?;
    }

    tracing::info!(
        questions = form.questions.len(),
        override_index = form.override_index,
        uploaded = form.upload.is_some(),
        "executing question batch"
    );
    let records = state
        .orchestrator
        .answer_batch(
            &form.questions,
            state.files.root(),
            form.override_index || newly_written,
        )
        .await?;
    Ok(Json(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use docqa_core::error::{Result, GENERIC_ERROR};
    use docqa_core::traits::{AnswerGenerator, ContextRetriever, CorpusIndexer};
    use docqa_core::types::{RetrievedMatch, SearchMode};
    use std::collections::BTreeMap;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct StubIndexer;

    #[async_trait]
    impl CorpusIndexer for StubIndexer {
        async fn ensure_index(&self, _: &Path, _: &str, _: bool) -> Result<()> {
            Ok(())
        }
    }

    struct StubRetriever {
        hits: bool,
    }

    #[async_trait]
    impl ContextRetriever for StubRetriever {
        async fn search(
            &self,
            query: &str,
            _collection: &str,
            _k: usize,
            _mode: SearchMode,
        ) -> Result<Vec<RetrievedMatch>> {
            if !self.hits {
                return Ok(vec![]);
            }
            Ok(vec![RetrievedMatch {
                id: format!("{query}:0"),
                content: "relevant chunk".to_string(),
                score: 0.9,
                metadata: BTreeMap::new(),
            }])
        }
    }

    struct EchoGenerator;

    #[async_trait]
    impl AnswerGenerator for EchoGenerator {
        async fn generate(&self, question: &str, _context: &str) -> Result<Option<String>> {
            Ok(Some(format!("answer to {question}")))
        }
    }

    fn state(tmp: &TempDir, hits: bool) -> AppState {
        let orchestrator = Arc::new(BatchOrchestrator::new(
            Arc::new(StubIndexer),
            Arc::new(StubRetriever { hits }),
            Arc::new(EchoGenerator),
            "zania_documents".to_string(),
            2,
            SearchMode::Hybrid,
            Duration::from_secs(5),
        ));
        let files = Arc::new(FileStore::new(tmp.path().join("downloads")));
        AppState { orchestrator, files }
    }

    const BOUNDARY: &str = "docqa-test-boundary";

    fn text_part(name: &str, value: &str) -> String {
        format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
    }

    fn file_part(file_name: &str, bytes: &str) -> String {
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/pdf\r\n\r\n{bytes}\r\n"
        )
    }

    fn multipart_request(parts: &[String]) -> Request<Body> {
        let body = format!("{}--{BOUNDARY}--\r\n", parts.concat());
        Request::builder()
            .method("POST")
            .uri("/agent-document/execute")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("request")
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn execute_answers_in_question_order() {
        let tmp = TempDir::new().expect("tempdir");
        let request = multipart_request(&[
            text_part("questions", "What is the refund policy?"),
            text_part("questions", "Who signs the contract?"),
        ]);
        let response = router(state(&tmp, true)).oneshot(request).await.expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-process-time"));
        let json = body_json(response).await;
        let records = json.as_array().expect("array");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["question"], "What is the refund policy?");
        assert_eq!(records[0]["answer"], "answer to What is the refund policy?");
        assert_eq!(records[1]["question"], "Who signs the contract?");
    }

    #[tokio::test]
    async fn missing_questions_is_a_bad_request_envelope() {
        let tmp = TempDir::new().expect("tempdir");
        let request = multipart_request(&[text_part("override", "true")]);
        let response = router(state(&tmp, true)).oneshot(request).await.expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["code"], 400);
        assert_eq!(json["message"], "", "internal message must not reach clients");
        assert_eq!(json["displayMessage"], GENERIC_ERROR);
    }

    #[tokio::test]
    async fn all_questions_dropping_out_returns_the_envelope() {
        let tmp = TempDir::new().expect("tempdir");
        let request = multipart_request(&[text_part("questions", "Anything at all?")]);
        let response = router(state(&tmp, false)).oneshot(request).await.expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["code"], 400);
        assert_eq!(json["message"], "", "internal message must not reach clients");
        assert_eq!(json["displayMessage"], GENERIC_ERROR);
    }

    #[tokio::test]
    async fn uploaded_file_lands_in_the_download_folder() {
        let tmp = TempDir::new().expect("tempdir");
        let request = multipart_request(&[
            text_part("questions", "What does the handbook say?"),
            file_part("handbook.pdf", "%PDF-1.4 fake"),
        ]);
        let response = router(state(&tmp, true)).oneshot(request).await.expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let saved = tmp.path().join("downloads/handbook.pdf");
        assert!(saved.exists());
        let content = std::fs::read_to_string(saved).expect("read upload");
        assert_eq!(content, "%PDF-1.4 fake");
    }
}
