use anyhow::Result;
use idvault::{App, AppState};
use ledger::Ledger;
use reqwest::{Client, RequestBuilder, Response, multipart};
use serde_json::{Value, json};
use tokio::net::TcpListener;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin-password";

/// Bind to port 0 and return the listener + the OS-assigned port.
async fn random_listener() -> (TcpListener, u16) {
    let listener = TcpListener::bind(("127.0.0.1", 0))
        .await
        .expect("TcpListener bind to port 0");
    let port = listener.local_addr().expect("local_addr").port();
    (listener, port)
}

/// Spawns the app with an in-memory ledger and a bootstrap admin, and returns
/// the port number.
pub async fn spawn_app() -> u16 {
    let state = AppState::in_memory(Ledger::new());
    state
        .auth
        .create_admin(ADMIN_USERNAME, ADMIN_PASSWORD)
        .await
        .expect("bootstrap admin");

    let (listener, port) = random_listener().await;
    let app = App::new(state);
    tokio::spawn(async move { app.run(listener).await });
    port
}

pub fn registration(username: &str) -> Value {
    json!({
        "username": username,
        "password": "password123",
        "fullName": "Alice Example",
        "dateOfBirth": "1990-01-01",
        "nationality": "Syrian",
        "languages": ["ar", "en"],
    })
}

/// A cookie-carrying client bound to one spawned app.
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(port: u16) -> Self {
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .expect("reqwest client");

        Self {
            client,
            base_url: format!("http://127.0.0.1:{port}"),
        }
    }

    pub fn get(&self, endpoint: &str) -> RequestBuilder {
        self.client.get(format!("{}{endpoint}", self.base_url))
    }

    pub fn post(&self, endpoint: &str) -> RequestBuilder {
        self.client.post(format!("{}{endpoint}", self.base_url))
    }

    pub async fn register(&self, username: &str) -> Result<Response> {
        Ok(self
            .post("/api/register")
            .json(&registration(username))
            .send()
            .await?)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Response> {
        Ok(self
            .post("/api/login")
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?)
    }

    pub async fn upload(&self, document_type: Option<&str>, bytes: &[u8]) -> Result<Response> {
        let mut form = multipart::Form::new().part(
            "document",
            multipart::Part::bytes(bytes.to_vec()).file_name("passport.png"),
        );
        if let Some(document_type) = document_type {
            form = form.text("documentType", document_type.to_string());
        }

        Ok(self.post("/api/documents").multipart(form).send().await?)
    }
}
