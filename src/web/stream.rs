//! Streaming download bodies that own their workspace

use std::pin::Pin;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use futures::Stream;
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::core::{DownloadArtifact, Workspace};
use crate::web::error::{ApiError, ApiResult};

/// File stream that keeps the workspace alive until the body is dropped
pub struct WorkspaceStream {
    inner: ReaderStream<File>,
    workspace: Workspace,
}

impl WorkspaceStream {
    pub fn new(file: File, workspace: Workspace) -> Self {
        Self {
            inner: ReaderStream::new(file),
            workspace,
        }
    }
}

impl Stream for WorkspaceStream {
    type Item = <ReaderStream<File> as Stream>::Item;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

impl Drop for WorkspaceStream {
    fn drop(&mut self) {
        debug!("Releasing workspace {}", self.workspace.path().display());
    }
}

/// Build an attachment response that streams the artifact
pub async fn artifact_response(artifact: DownloadArtifact) -> ApiResult<Response> {
    let filename = artifact.filename.clone();
    let mime_type = artifact.mime_type;
    let (path, workspace) = artifact.into_parts();

    let file = File::open(&path)
        .await
        .map_err(|err| ApiError::internal(err.to_string()))?;
    let size = file
        .metadata()
        .await
        .map_err(|err| ApiError::internal(err.to_string()))?
        .len();

    let disposition = HeaderValue::from_str(&content_disposition(&filename))
        .map_err(|_| ApiError::internal("Could not build Content-Disposition header"))?;

    let mut response = Body::from_stream(WorkspaceStream::new(file, workspace)).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(mime_type));
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(size));
    headers.insert(header::CONTENT_DISPOSITION, disposition);

    Ok(response)
}

/// `attachment; filename="..."`, with an RFC 5987 `filename*` for non-ASCII names
pub fn content_disposition(filename: &str) -> String {
    if filename.is_ascii() {
        return format!("attachment; filename=\"{}\"", filename);
    }

    let fallback: String = filename.chars().filter(char::is_ascii).collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    )
}
