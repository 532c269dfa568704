use explorer_service::config::{AssistantConfig, ExplorerConfig};
use explorer_service::startup::Application;
use secrecy::Secret;
use service_core::config::Config as CoreConfig;

pub const TEST_API_KEY: &str = "test-api-key";

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Spawn the application on a random port.
    pub async fn spawn(config: ExplorerConfig) -> Self {
        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let address = format!("http://127.0.0.1:{}", app.port());

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        Self {
            address,
            client: reqwest::Client::new(),
        }
    }

    pub async fn post_json(&self, path: &str, body: serde_json::Value) -> reqwest::Response {
        self.post_raw(path, body.to_string()).await
    }

    pub async fn post_raw(&self, path: &str, body: impl Into<reqwest::Body>) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .expect("Failed to send request")
    }

    pub async fn options(&self, path: &str) -> reqwest::Response {
        self.client
            .request(reqwest::Method::OPTIONS, format!("{}{}", self.address, path))
            .body("{\"ignored\": true}")
            .send()
            .await
            .expect("Failed to send request")
    }
}

/// Configuration bound to loopback on a random port, without a model credential.
pub fn test_config() -> ExplorerConfig {
    ExplorerConfig {
        common: CoreConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        ..ExplorerConfig::default()
    }
}

/// Configuration whose model API points at `base_url`.
pub fn assistant_config(base_url: &str, api_key: Option<&str>) -> ExplorerConfig {
    ExplorerConfig {
        assistant: AssistantConfig {
            api_key: api_key.map(|key| Secret::new(key.to_string())),
            base_url: base_url.to_string(),
            ..AssistantConfig::default()
        },
        ..test_config()
    }
}

/// A loopback address nothing is listening on.
pub fn refused_address() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind probe port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}
