//! HTTP surface for the upload endpoints.

pub mod auth;
pub mod error;
pub mod handlers;

use crate::application::upload::UploadService;
use crate::ports::catalog::VideoCatalog;
use crate::ports::identity::IdentityProvider;
use crate::ports::media::MediaInspector;
use crate::ports::storage::ObjectStore;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub struct AppState<S, C, M, I> {
    pub uploads: Arc<UploadService<S, C, M>>,
    pub identity: Arc<I>,
}

impl<S, C, M, I> AppState<S, C, M, I> {
    pub fn new(uploads: UploadService<S, C, M>, identity: I) -> Self {
        Self {
            uploads: Arc::new(uploads),
            identity: Arc::new(identity),
        }
    }
}

impl<S, C, M, I> Clone for AppState<S, C, M, I> {
    fn clone(&self) -> Self {
        Self {
            uploads: Arc::clone(&self.uploads),
            identity: Arc::clone(&self.identity),
        }
    }
}

pub fn router<S, C, M, I>(state: AppState<S, C, M, I>) -> Router
where
    S: ObjectStore + 'static,
    C: VideoCatalog + 'static,
    M: MediaInspector + 'static,
    I: IdentityProvider + 'static,
{
    Router::new()
        .route(
            "/api/thumbnail_upload/:video_id",
            post(handlers::upload_thumbnail::<S, C, M, I>),
        )
        .route(
            "/api/video_upload/:video_id",
            post(handlers::upload_video::<S, C, M, I>),
        )
        // size ceilings are enforced per kind while staging
        .layer(DefaultBodyLimit::disable())
        .route("/healthz", get(handlers::healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::jwt::tests::{token_for, SECRET};
    use crate::adapters::auth::JwtIdentity;
    use crate::application::upload::{UploadLimits, UploadSettings};
    use crate::domain::delivery::DeliveryMode;
    use crate::domain::video::VideoRecord;
    use crate::ports::catalog::MockVideoCatalog;
    use crate::ports::media::MockMediaInspector;
    use crate::ports::storage::MockObjectStore;
    use axum::body::{to_bytes, Body};
    use axum::http::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE};
    use axum::http::{Request, StatusCode};
    use chrono::Utc;
    use serde_json::Value;
    use tempfile::{tempdir, TempDir};
    use tower::ServiceExt;
    use uuid::Uuid;

    const BOUNDARY: &str = "tubely-test-boundary";

    type TestState = AppState<MockObjectStore, MockVideoCatalog, MockMediaInspector, JwtIdentity>;

    fn record(owner: Uuid) -> VideoRecord {
        let now = Utc::now();
        VideoRecord {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            thumbnail_url: None,
            video_url: None,
            title: "boots".to_string(),
            description: "a clip about boots".to_string(),
            user_id: owner,
        }
    }

    fn state(
        storage: MockObjectStore,
        catalog: MockVideoCatalog,
        scratch: &TempDir,
    ) -> TestState {
        let settings = UploadSettings {
            delivery: DeliveryMode::Local {
                host: "localhost".to_string(),
                port: "8091".to_string(),
            },
            scratch_dir: scratch.path().to_path_buf(),
            limits: UploadLimits {
                thumbnail_max_bytes: 1024,
                video_max_bytes: 4096,
            },
            media_timeout: None,
        };
        AppState::new(
            UploadService::new(storage, catalog, MockMediaInspector::new(), settings),
            JwtIdentity::new(SECRET),
        )
    }

    fn catalog_with(video: &VideoRecord) -> MockVideoCatalog {
        let mut catalog = MockVideoCatalog::new();
        let found = video.clone();
        catalog
            .expect_get_video()
            .returning(move |_| Ok(Some(found.clone())));
        catalog
    }

    fn part_head(field: &str, content_type: &str) -> Vec<u8> {
        format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"upload\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        )
        .into_bytes()
    }

    fn multipart_body(field: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
        let mut body = part_head(field, content_type);
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(uri: &str, token: Option<&str>, body: Vec<u8>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"));
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body)).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn scratch_is_empty(dir: &TempDir) -> bool {
        std::fs::read_dir(dir.path()).unwrap().next().is_none()
    }

    #[tokio::test]
    async fn test_healthz() {
        let dir = tempdir().unwrap();
        let app = router(state(MockObjectStore::new(), MockVideoCatalog::new(), &dir));

        let response = app
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_thumbnail_upload_returns_updated_record() {
        let owner = Uuid::new_v4();
        let video = record(owner);
        let dir = tempdir().unwrap();

        let mut storage = MockObjectStore::new();
        storage
            .expect_put()
            .withf(|key, _, content_type| key.ends_with(".png") && content_type == "image/png")
            .times(1)
            .returning(|_, _, _| Ok(()));
        let mut catalog = catalog_with(&video);
        catalog.expect_update_video().times(1).returning(|_| Ok(()));

        let token = token_for(&owner.to_string(), SECRET, 3600);
        let app = router(state(storage, catalog, &dir));
        let response = app
            .oneshot(upload_request(
                &format!("/api/thumbnail_upload/{}", video.id),
                Some(&token),
                multipart_body("thumbnail", "image/png", b"\x89PNG fake"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let url = body["thumbnail_url"].as_str().unwrap();
        assert!(url.starts_with("http://localhost:8091/assets/"));
        assert!(url.ends_with(".png"));
        assert_eq!(body["id"], video.id.to_string());
        assert!(scratch_is_empty(&dir));
    }

    #[tokio::test]
    async fn test_invalid_video_id() {
        let dir = tempdir().unwrap();
        let token = token_for(&Uuid::new_v4().to_string(), SECRET, 3600);
        let app = router(state(MockObjectStore::new(), MockVideoCatalog::new(), &dir));

        let response = app
            .oneshot(upload_request(
                "/api/thumbnail_upload/not-a-uuid",
                Some(&token),
                multipart_body("thumbnail", "image/png", b"data"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "Invalid video ID");
    }

    #[tokio::test]
    async fn test_missing_token() {
        let dir = tempdir().unwrap();
        let app = router(state(MockObjectStore::new(), MockVideoCatalog::new(), &dir));

        let response = app
            .oneshot(upload_request(
                &format!("/api/video_upload/{}", Uuid::new_v4()),
                None,
                multipart_body("video", "video/mp4", b"data"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_non_owner_rejected() {
        let video = record(Uuid::new_v4());
        let dir = tempdir().unwrap();

        let mut storage = MockObjectStore::new();
        storage.expect_put().times(0);
        let token = token_for(&Uuid::new_v4().to_string(), SECRET, 3600);
        let app = router(state(storage, catalog_with(&video), &dir));

        let response = app
            .oneshot(upload_request(
                &format!("/api/thumbnail_upload/{}", video.id),
                Some(&token),
                multipart_body("thumbnail", "image/png", b"data"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(scratch_is_empty(&dir));
    }

    #[tokio::test]
    async fn test_unknown_video() {
        let dir = tempdir().unwrap();
        let mut catalog = MockVideoCatalog::new();
        catalog.expect_get_video().returning(|_| Ok(None));
        let token = token_for(&Uuid::new_v4().to_string(), SECRET, 3600);
        let app = router(state(MockObjectStore::new(), catalog, &dir));

        let response = app
            .oneshot(upload_request(
                &format!("/api/thumbnail_upload/{}", Uuid::new_v4()),
                Some(&token),
                multipart_body("thumbnail", "image/png", b"data"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_declared_size_over_limit_rejected_before_staging() {
        let owner = Uuid::new_v4();
        let dir = tempdir().unwrap();

        let mut catalog = MockVideoCatalog::new();
        catalog.expect_get_video().times(0);
        let mut storage = MockObjectStore::new();
        storage.expect_put().times(0);

        let token = token_for(&owner.to_string(), SECRET, 3600);
        let mut request = upload_request(
            &format!("/api/thumbnail_upload/{}", Uuid::new_v4()),
            Some(&token),
            multipart_body("thumbnail", "image/png", b"data"),
        );
        request
            .headers_mut()
            .insert(CONTENT_LENGTH, "1048576".parse().unwrap());

        let response = router(state(storage, catalog, &dir))
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(scratch_is_empty(&dir));
    }

    #[tokio::test]
    async fn test_unsupported_content_type() {
        let owner = Uuid::new_v4();
        let video = record(owner);
        let dir = tempdir().unwrap();

        let mut storage = MockObjectStore::new();
        storage.expect_put().times(0);
        let token = token_for(&owner.to_string(), SECRET, 3600);
        let app = router(state(storage, catalog_with(&video), &dir));

        let response = app
            .oneshot(upload_request(
                &format!("/api/thumbnail_upload/{}", video.id),
                Some(&token),
                multipart_body("thumbnail", "image/gif", b"GIF89a"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(scratch_is_empty(&dir));
    }

    #[tokio::test]
    async fn test_missing_form_field() {
        let owner = Uuid::new_v4();
        let video = record(owner);
        let dir = tempdir().unwrap();
        let token = token_for(&owner.to_string(), SECRET, 3600);
        let app = router(state(MockObjectStore::new(), catalog_with(&video), &dir));

        let response = app
            .oneshot(upload_request(
                &format!("/api/video_upload/{}", video.id),
                Some(&token),
                multipart_body("thumbnail", "video/mp4", b"data"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_truncated_multipart_is_bad_request() {
        let owner = Uuid::new_v4();
        let video = record(owner);
        let dir = tempdir().unwrap();

        let mut storage = MockObjectStore::new();
        storage.expect_put().times(0);
        let mut catalog = catalog_with(&video);
        catalog.expect_update_video().times(0);

        let mut body = part_head("thumbnail", "image/png");
        body.extend_from_slice(b"partial png bytes with no closing boundary");

        let token = token_for(&owner.to_string(), SECRET, 3600);
        let response = router(state(storage, catalog, &dir))
            .oneshot(upload_request(
                &format!("/api/thumbnail_upload/{}", video.id),
                Some(&token),
                body,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "Unable to parse form data");
        assert!(scratch_is_empty(&dir));
    }

    #[tokio::test]
    async fn test_storage_failure_is_opaque() {
        let owner = Uuid::new_v4();
        let video = record(owner);
        let dir = tempdir().unwrap();

        let mut storage = MockObjectStore::new();
        storage
            .expect_put()
            .returning(|_, _, _| Err("bucket /srv/secret unreachable".into()));
        let mut catalog = catalog_with(&video);
        catalog.expect_update_video().times(0);

        let token = token_for(&owner.to_string(), SECRET, 3600);
        let app = router(state(storage, catalog, &dir));
        let response = app
            .oneshot(upload_request(
                &format!("/api/thumbnail_upload/{}", video.id),
                Some(&token),
                multipart_body("thumbnail", "image/jpeg", b"jpeg"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await["error"],
            error::PIPELINE_FAILURE_MESSAGE
        );
        assert!(scratch_is_empty(&dir));
    }
}
