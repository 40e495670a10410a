//! Shared harness: a portal on an ephemeral port backed by a temporary
//! embedded store.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use personal_portal::config::PortalConfig;
use personal_portal::serve::{build_router, AppState};
use personal_portal::Storage;

pub const PASSWORD: &str = "open-sesame";

pub struct TestPortal {
    pub url: String,
    pub storage: Storage,
    pub client: reqwest::Client,
    pub recordings_dir: PathBuf,
    pub static_dir: PathBuf,
    pub dir: tempfile::TempDir,
}

/// Config pointing every directory into `root` with no external tools
pub fn test_config(root: &std::path::Path) -> PortalConfig {
    let mut config = PortalConfig::default();
    config.data_dir = root.join("data");
    config.recordings_dir = root.join("recordings");
    config.static_dir = root.join("static");
    config.checkout.rate_url = "http://127.0.0.1:1/rate".to_string();
    config.checkout.rate_timeout_secs = 1;
    config.media.transcoder = None;
    config.media.transcriber = None;
    config
}

pub async fn start_portal() -> TestPortal {
    start_portal_with(|_, _| {}).await
}

/// Start a portal after letting the caller adjust its config
pub async fn start_portal_with<F>(configure: F) -> TestPortal
where
    F: FnOnce(&mut PortalConfig, &std::path::Path),
{
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    configure(&mut config, dir.path());

    let storage = Storage::embedded(config.data_dir.clone());
    let recordings_dir = config.recordings_dir.clone();
    let static_dir = config.static_dir.clone();
    let state = Arc::new(AppState::new(config, storage.clone(), "test-secret"));
    let app = build_router(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestPortal {
        url: format!("http://{}", addr),
        storage,
        client,
        recordings_dir,
        static_dir,
        dir,
    }
}

impl TestPortal {
    pub fn at(&self, path: &str) -> String {
        format!("{}{}", self.url, path)
    }

    /// Log in and return the `Cookie` header value carrying the session
    pub async fn login(&self) -> String {
        let response = self
            .client
            .post(self.at("/login"))
            .form(&[("password", PASSWORD)])
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::SEE_OTHER);

        let set_cookie = response
            .headers()
            .get(reqwest::header::SET_COOKIE)
            .expect("login should set a session cookie")
            .to_str()
            .unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }
}

pub fn location(response: &reqwest::Response) -> &str {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .map(|v| v.to_str().unwrap())
        .unwrap_or("")
}
