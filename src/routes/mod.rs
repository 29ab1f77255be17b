//! Route modules for the conversion server

pub mod convert;
pub mod download;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Assemble the HTTP surface. Middleware (CORS, tracing) is added by the caller.
pub fn router(state: AppState) -> Router {
    let max_upload_bytes = state.config().server.max_upload_bytes;

    Router::new()
        .nest("/convert", convert::router(max_upload_bytes))
        .nest("/download", download::router())
        .nest("/health", health::router())
        .with_state(state)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::formats::docx::fixtures;
    use crate::storage::UploadId;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use axum_test::TestServer;
    use tempfile::TempDir;
    use tower::ServiceExt;

    const BOUNDARY: &str = "X-DOCX2PDF-TEST-BOUNDARY";

    async fn test_state(temp_dir: &TempDir, max_upload_bytes: usize) -> AppState {
        let mut config = Config::default();
        config.server.max_upload_bytes = max_upload_bytes;
        config.storage.upload_dir = temp_dir.path().join("uploads");
        config.storage.output_dir = temp_dir.path().join("output");

        let state = AppState::new(config);
        state.store().initialize().await.unwrap();
        state
    }

    /// One part per `(field name, file name, bytes)`
    fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, file_name, data) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match file_name {
                Some(file_name) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: application/vnd.openxmlformats-officedocument.wordprocessingml.document\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    async fn post_convert(state: &AppState, body: Vec<u8>) -> Response {
        let request = Request::builder()
            .method("POST")
            .uri("/convert")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        router(state.clone()).oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let temp_dir = TempDir::new().unwrap();
        let server = TestServer::new(router(test_state(&temp_dir, 1024).await)).unwrap();

        let response = server.get("/health").await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_convert_then_download() {
        let temp_dir = TempDir::new().unwrap();
        let state = test_state(&temp_dir, 1024 * 1024).await;
        let docx = fixtures::docx_with_paragraphs(&["Hello", "World"]);

        let response = post_convert(
            &state,
            multipart_body(&[
                ("note", None, &b"ignored"[..]),
                ("file", Some("letter.docx"), docx.as_slice()),
            ]),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["message"], "File converted successfully");
        assert_eq!(body["metadata"]["originalName"], "letter.docx");
        assert_eq!(body["metadata"]["size"], docx.len() as u64);
        assert_eq!(
            body["metadata"]["type"],
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );
        assert!(body["metadata"]["uploadDate"].is_string());

        let output_filename = body["outputFilename"].as_str().unwrap().to_string();
        assert!(output_filename.ends_with(".pdf"));

        let server = TestServer::new(router(state)).unwrap();
        let response = server.get(&format!("/download/{output_filename}")).await;
        response.assert_status_ok();
        assert_eq!(response.header(header::CONTENT_TYPE), "application/pdf");
        assert_eq!(
            response.header(header::CONTENT_DISPOSITION),
            format!("attachment; filename=\"{output_filename}\"").as_str()
        );

        let pdf = response.as_bytes();
        assert!(pdf.starts_with(b"%PDF-"));
        assert_eq!(
            response.header(header::CONTENT_LENGTH),
            pdf.len().to_string().as_str()
        );
    }

    #[tokio::test]
    async fn test_convert_without_file() {
        let temp_dir = TempDir::new().unwrap();
        let state = test_state(&temp_dir, 1024).await;

        let response = post_convert(&state, multipart_body(&[("other", None, &b"x"[..])])).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await,
            serde_json::json!({ "error": "No file uploaded" })
        );
    }

    #[tokio::test]
    async fn test_convert_non_multipart_is_no_file() {
        let temp_dir = TempDir::new().unwrap();
        let server = TestServer::new(router(test_state(&temp_dir, 1024).await)).unwrap();

        let response = server.post("/convert").text("plain body").await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<serde_json::Value>(),
            serde_json::json!({ "error": "No file uploaded" })
        );
    }

    #[tokio::test]
    async fn test_convert_corrupt_document() {
        let temp_dir = TempDir::new().unwrap();
        let state = test_state(&temp_dir, 1024).await;

        let response = post_convert(
            &state,
            multipart_body(&[("file", Some("bad.docx"), &b"not a zip at all"[..])]),
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await,
            serde_json::json!({ "error": "File conversion failed" })
        );
        assert_eq!(std::fs::read_dir(state.store().output_dir()).unwrap().count(), 0);
        assert_eq!(std::fs::read_dir(state.store().upload_dir()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_convert_rejects_oversized_body() {
        let temp_dir = TempDir::new().unwrap();
        let state = test_state(&temp_dir, 1024).await;
        let data = vec![b'a'; 8 * 1024];

        let response = post_convert(
            &state,
            multipart_body(&[("file", Some("big.docx"), data.as_slice())]),
        )
        .await;

        assert!(response.status().is_client_error());
        assert!(json_body(response).await["error"].is_string());
        assert_eq!(std::fs::read_dir(state.store().upload_dir()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_download_unknown_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let server = TestServer::new(router(test_state(&temp_dir, 1024).await)).unwrap();

        let missing = UploadId::generate().output_id();
        for path in [
            "/download/does-not-exist.pdf".to_string(),
            format!("/download/{missing}"),
            "/download/..%2F..%2Fetc%2Fpasswd".to_string(),
        ] {
            let response = server.get(&path).await;
            response.assert_status_not_found();
            assert_eq!(
                response.json::<serde_json::Value>(),
                serde_json::json!({ "error": "File not found" })
            );
        }
    }
}
