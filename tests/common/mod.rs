#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::{header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use time::{Duration, OffsetDateTime};
use tower::ServiceExt;
use uuid::Uuid;

use trix::app::build_app;
use trix::auth::jwt::Claims;
use trix::config::{AppConfig, JwtConfig, MinioConfig, StoreBackend};
use trix::state::AppState;
use trix::storage::StorageClient;
use trix::trix::{MemoryTrixStore, Trix, TrixId, TrixStore};

pub const BOUNDARY: &str = "trix-test-boundary";

/// Photo storage kept in a map.
#[derive(Default)]
pub struct FakeStorage {
    pub objects: Mutex<HashMap<String, Bytes>>,
}

#[async_trait]
impl StorageClient for FakeStorage {
    async fn put_object(&self, key: &str, body: Bytes, _ct: &str) -> anyhow::Result<()> {
        self.objects.lock().unwrap().insert(key.to_string(), body);
        Ok(())
    }
    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }
    async fn presign_get(&self, key: &str, _seconds: u64) -> anyhow::Result<String> {
        Ok(format!("https://fake.local/{}", key))
    }
}

/// Delegates to the in-memory store but fails every update, like a
/// database dropping out mid-request.
pub struct UpdateFailsStore(pub Arc<MemoryTrixStore>);

#[async_trait]
impl TrixStore for UpdateFailsStore {
    async fn list_all(&self) -> anyhow::Result<Vec<Trix>> {
        self.0.list_all().await
    }
    async fn get(&self, id: TrixId, owner: Uuid) -> anyhow::Result<Option<Trix>> {
        self.0.get(id, owner).await
    }
    async fn create(&self, owner: Uuid, text: &str, photo: Option<&str>) -> anyhow::Result<Trix> {
        self.0.create(owner, text, photo).await
    }
    async fn update(
        &self,
        _id: TrixId,
        _owner: Uuid,
        _text: &str,
        _photo: Option<&str>,
    ) -> anyhow::Result<Option<Trix>> {
        anyhow::bail!("db down")
    }
    async fn delete(&self, id: TrixId, owner: Uuid) -> anyhow::Result<bool> {
        self.0.delete(id, owner).await
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        store: StoreBackend::Memory,
        jwt: JwtConfig {
            secret: "test-secret".into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
        },
        minio: MinioConfig {
            endpoint: "fake".into(),
            bucket: "fake".into(),
            access_key: "fake".into(),
            secret_key: "fake".into(),
            region: "us-east-1".into(),
        },
        host: "127.0.0.1".into(),
        port: 0,
        max_upload_bytes: 1024 * 1024,
        photo_url_ttl_secs: 60,
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryTrixStore>,
    pub storage: Arc<FakeStorage>,
    jwt: JwtConfig,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_store(|memory| memory as Arc<dyn TrixStore>)
    }

    /// `wrap` decides what the router talks to; `store` stays the
    /// underlying memory store so tests can inspect it directly.
    pub fn with_store(wrap: impl FnOnce(Arc<MemoryTrixStore>) -> Arc<dyn TrixStore>) -> Self {
        let config = test_config();
        let jwt = config.jwt.clone();
        let store = Arc::new(MemoryTrixStore::new());
        let storage = Arc::new(FakeStorage::default());
        let state = AppState::from_parts(
            wrap(store.clone()),
            Arc::new(config),
            storage.clone() as Arc<dyn StorageClient>,
        );
        Self {
            router: build_app(state),
            store,
            storage,
            jwt,
        }
    }

    /// Access token as the identity service would issue it.
    pub fn token(&self, user: Uuid) -> String {
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: user,
            iat: now.unix_timestamp() as usize,
            exp: (now + Duration::minutes(5)).unix_timestamp() as usize,
            iss: self.jwt.issuer.clone(),
            aud: self.jwt.audience.clone(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt.secret.as_bytes()),
        )
        .expect("sign token")
    }

    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(req).await.unwrap()
    }

    pub async fn get(&self, user: Uuid, uri: &str) -> Response<Body> {
        let req = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token(user)))
            .body(Body::empty())
            .unwrap();
        self.send(req).await
    }

    pub async fn post_form(&self, user: Uuid, uri: &str, form: Multipart) -> Response<Body> {
        let req = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token(user)))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(form.finish()))
            .unwrap();
        self.send(req).await
    }

    pub async fn post_empty(&self, user: Uuid, uri: &str) -> Response<Body> {
        let req = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token(user)))
            .body(Body::empty())
            .unwrap();
        self.send(req).await
    }
}

/// multipart/form-data body builder.
#[derive(Default)]
pub struct Multipart {
    body: Vec<u8>,
}

impl Multipart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, name, file_name, content_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        self.body
    }
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\nnot-really-pixels";
