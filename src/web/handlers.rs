//! Route handlers for search and download

use axum::{
    extract::{rejection::FormRejection, State},
    response::Response,
    Form, Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::core::{format_results, OutputFormat, SearchResult};
use crate::web::error::{ApiError, ApiResult};
use crate::web::stream::artifact_response;
use crate::web::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DownloadForm {
    #[serde(default)]
    pub url: Option<String>,
    /// `mp3` or `mp4`, mp3 when absent
    #[serde(default)]
    pub format: Option<String>,
}

/// `POST /search`
#[instrument(skip_all)]
pub async fn search(
    State(state): State<AppState>,
    form: Result<Form<SearchForm>, FormRejection>,
) -> ApiResult<Json<SearchResponse>> {
    let query = form
        .ok()
        .and_then(|Form(form)| form.query)
        .filter(|query| !query.is_empty())
        .ok_or_else(|| ApiError::bad_request("No search query provided"))?;

    let records = state.resolver.search(&query).await;
    let results = format_results(&records);
    info!("Search for {:?} returned {} results", query, results.len());

    Ok(Json(SearchResponse { results }))
}

/// `POST /download`
#[instrument(skip_all)]
pub async fn download(
    State(state): State<AppState>,
    form: Result<Form<DownloadForm>, FormRejection>,
) -> ApiResult<Response> {
    let Form(form) = form.unwrap_or_default();
    let url = form
        .url
        .filter(|url| !url.is_empty())
        .ok_or_else(|| ApiError::bad_request("No URL provided"))?;
    let format = OutputFormat::from_param(form.format.as_deref());

    let artifact = state.pipeline.download(&url, format).await?;
    artifact_response(artifact).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::FakeExtractor;
    use crate::core::{DownloadPipeline, PipelineOptions, SourceResolver};
    use axum::{
        body::{to_bytes, Body},
        extract::FromRequest,
        http::{header, Request, StatusCode},
        response::IntoResponse,
    };
    use serde_json::Value;
    use std::path::Path;
    use std::sync::Arc;

    fn state(fake: FakeExtractor, root: &Path) -> AppState {
        let fake = Arc::new(fake);
        AppState::new(
            SourceResolver::new(fake.clone()),
            DownloadPipeline::new(fake, PipelineOptions::default().with_workspace_root(root)),
        )
    }

    fn search_form(query: &str) -> Result<Form<SearchForm>, FormRejection> {
        Ok(Form(SearchForm {
            query: Some(query.to_string()),
        }))
    }

    fn download_form(url: Option<&str>, format: Option<&str>) -> Result<Form<DownloadForm>, FormRejection> {
        Ok(Form(DownloadForm {
            url: url.map(str::to_string),
            format: format.map(str::to_string),
        }))
    }

    async fn error_body(response: Response) -> (StatusCode, Value) {
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_search_formats_results() {
        let root = tempfile::tempdir().unwrap();
        let state = state(FakeExtractor::new("Some Title"), root.path());

        let Json(response) = search(State(state), search_form("lofi beats")).await.unwrap();

        assert_eq!(response.results.len(), 5);
        for (i, result) in response.results.iter().enumerate() {
            let (minutes, seconds) = result.duration.split_once(':').unwrap();
            assert!(minutes.parse::<u64>().is_ok());
            assert_eq!(seconds.len(), 2);
            assert!(result.description.chars().count() <= 203);
            assert_eq!(result.title, format!("Result {}", i));
        }
        assert_eq!(response.results[2].duration, "2:02");
    }

    #[tokio::test]
    async fn test_search_without_query_is_bad_request() {
        let root = tempfile::tempdir().unwrap();
        let state = state(FakeExtractor::new("Some Title"), root.path());

        let err = search(State(state.clone()), search_form("")).await.unwrap_err();
        let (status, body) = error_body(err.into_response()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({"error": "No search query provided"}));

        let missing = Ok(Form(SearchForm::default()));
        assert!(search(State(state), missing).await.is_err());
    }

    #[tokio::test]
    async fn test_search_failure_is_empty_results() {
        let root = tempfile::tempdir().unwrap();
        let state = state(FakeExtractor::new("Some Title").failing(), root.path());

        let Json(response) = search(State(state), search_form("lofi beats")).await.unwrap();
        assert!(response.results.is_empty());
    }

    #[tokio::test]
    async fn test_download_streams_mp3_and_cleans_up() {
        let root = tempfile::tempdir().unwrap();
        let state = state(FakeExtractor::new("Some Title"), root.path());

        let response = download(
            State(state),
            download_form(Some("https://www.youtube.com/watch?v=abc123"), Some("mp3")),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers().clone();
        assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "audio/mpeg");
        assert_eq!(
            headers.get(header::CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=\"Some Title.mp3\""
        );
        assert_eq!(headers.get(header::CONTENT_LENGTH).unwrap(), "11");
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 1);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"media bytes");
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_download_defaults_to_mp3() {
        let root = tempfile::tempdir().unwrap();
        let state = state(FakeExtractor::new("Some Title"), root.path());

        let response = download(State(state), download_form(Some("https://youtu.be/abc123"), None))
            .await
            .unwrap();
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "audio/mpeg"
        );
    }

    #[tokio::test]
    async fn test_download_mp4() {
        let root = tempfile::tempdir().unwrap();
        let state = state(FakeExtractor::new("My Video! (HD)"), root.path());

        let response = download(
            State(state),
            download_form(Some("https://youtu.be/abc123"), Some("mp4")),
        )
        .await
        .unwrap();
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "video/mp4"
        );
        assert_eq!(
            response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=\"My Video HD.mp4\""
        );
    }

    #[tokio::test]
    async fn test_download_without_url_is_bad_request() {
        let root = tempfile::tempdir().unwrap();
        let state = state(FakeExtractor::new("Some Title"), root.path());

        for form in [download_form(None, Some("mp3")), download_form(Some(""), None)] {
            let err = download(State(state.clone()), form).await.unwrap_err();
            let (status, body) = error_body(err.into_response()).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, serde_json::json!({"error": "No URL provided"}));
        }
    }

    #[tokio::test]
    async fn test_download_missing_artifact_is_server_error() {
        let root = tempfile::tempdir().unwrap();
        let state = state(
            FakeExtractor::new("Some Title").producing("Some Title.webm"),
            root.path(),
        );

        let err = download(
            State(state),
            download_form(Some("https://youtu.be/abc123"), Some("mp4")),
        )
        .await
        .unwrap_err();
        let (status, body) = error_body(err.into_response()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("mp4"));
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_download_extraction_failure_message() {
        let root = tempfile::tempdir().unwrap();
        let state = state(FakeExtractor::new("Some Title").failing(), root.path());

        let err = download(
            State(state),
            download_form(Some("https://youtu.be/abc123"), Some("mp3")),
        )
        .await
        .unwrap_err();
        let (status, body) = error_body(err.into_response()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body["error"],
            "Extraction failed: [youtube] abc123: Video unavailable"
        );
    }

    #[tokio::test]
    async fn test_download_form_parsing() {
        let request = Request::builder()
            .method("POST")
            .uri("/download")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(
                "url=https%3A%2F%2Fyoutu.be%2Fabc123&format=mp4",
            ))
            .unwrap();

        let Form(form) = Form::<DownloadForm>::from_request(request, &()).await.unwrap();
        assert_eq!(form.url.as_deref(), Some("https://youtu.be/abc123"));
        assert_eq!(form.format.as_deref(), Some("mp4"));

        let request = Request::builder()
            .method("POST")
            .uri("/search")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(""))
            .unwrap();
        let Form(form) = Form::<SearchForm>::from_request(request, &()).await.unwrap();
        assert_eq!(form.query, None);
    }
}
