//! Conversion endpoint
//!
//! `POST /convert` takes a multipart form with a `file` field, runs the
//! conversion synchronously and answers with metadata and the output name.

use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;

use crate::conversion::IncomingFile;
use crate::document::ConversionMetadata;
use crate::error::Result;
use crate::state::AppState;

/// Multipart field carrying the document
const FILE_FIELD: &str = "file";

/// Name recorded when the client sends none
const UNNAMED_UPLOAD: &str = "upload";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertResponse {
    pub message: &'static str,
    pub metadata: ConversionMetadata,
    pub output_filename: String,
}

/// Create the convert router
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", post(convert))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

async fn convert(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<ConvertResponse>> {
    let file = match multipart {
        Ok(multipart) => read_file_field(multipart).await?,
        Err(rejection) => {
            tracing::debug!("Request is not multipart: {}", rejection);
            None
        }
    };

    let outcome = state.converter().convert(file).await?;

    Ok(Json(ConvertResponse {
        message: "File converted successfully",
        metadata: outcome.metadata,
        output_filename: outcome.output.id.to_string(),
    }))
}

/// First `file` field of the form. Other fields are drained and ignored.
async fn read_file_field(mut multipart: Multipart) -> Result<Option<IncomingFile>> {
    let mut file = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        if name != FILE_FIELD || file.is_some() {
            tracing::debug!("Ignoring multipart field '{}'", name);
            continue;
        }

        let file_name = field.file_name().map(|s| s.to_string());
        let content_type = field.content_type().map(|s| s.to_string());
        let data = field.bytes().await?;

        tracing::debug!(
            "Received file field: filename={:?}, content_type={:?}, size={}",
            file_name,
            content_type,
            data.len()
        );

        // Browsers send an unnamed empty part when no file was chosen
        if file_name.as_deref().unwrap_or("").is_empty() && data.is_empty() {
            continue;
        }

        file = Some(IncomingFile {
            file_name: file_name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| UNNAMED_UPLOAD.to_string()),
            content_type,
            data,
        });
    }

    Ok(file)
}
