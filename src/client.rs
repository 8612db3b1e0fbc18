use reqwest::{RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{status}: {message}")]
    Api { status: StatusCode, message: String },
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Http(e) => e.status(),
            ClientError::Api { status, .. } => Some(*status),
        }
    }
}

/// Typed wrapper over the HTTP API. Every request carries `Authorization: Bearer` once a
/// session token is held; `verify_login_otp` stores the token it receives.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// `base_url` is the API root, e.g. `http://localhost:5000/api`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value, ClientError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);

        if !status.is_success() {
            let message = body["message"]
                .as_str()
                .or_else(|| status.canonical_reason())
                .unwrap_or("request failed")
                .to_string();
            return Err(ClientError::Api { status, message });
        }
        Ok(body)
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, ClientError> {
        self.send(self.http.post(self.url(path)).json(body)).await
    }

    // -------------------------------------------------------------------------
    // admin auth
    // -------------------------------------------------------------------------

    pub async fn signup(&self, email: &str, password: &str) -> Result<Value, ClientError> {
        self.post("admin/signup", &json!({ "email": email, "password": password }))
            .await
    }

    pub async fn verify_otp(&self, email: &str, code: &str) -> Result<Value, ClientError> {
        self.post("admin/verify-otp", &json!({ "email": email, "code": code }))
            .await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Value, ClientError> {
        self.post("admin/login", &json!({ "email": email, "password": password }))
            .await
    }

    pub async fn verify_login_otp(&mut self, email: &str, code: &str) -> Result<Value, ClientError> {
        let body = self
            .post("admin/verify-login-otp", &json!({ "email": email, "code": code }))
            .await?;
        if let Some(token) = body["token"].as_str() {
            self.token = Some(token.to_string());
        }
        Ok(body)
    }

    pub async fn forgot_password(&self, email: &str) -> Result<Value, ClientError> {
        self.post("admin/forgot-password", &json!({ "email": email })).await
    }

    pub async fn verify_forgot_password_otp(&self, email: &str, code: &str) -> Result<Value, ClientError> {
        self.post(
            "admin/verify-forgot-password-otp",
            &json!({ "email": email, "code": code }),
        )
        .await
    }

    pub async fn reset_password(&self, email: &str, code: &str, new_password: &str) -> Result<Value, ClientError> {
        self.post(
            "admin/reset-password",
            &json!({ "email": email, "code": code, "newPassword": new_password }),
        )
        .await
    }

    pub async fn me(&self) -> Result<Value, ClientError> {
        self.send(self.http.get(self.url("admin/me"))).await
    }

    // -------------------------------------------------------------------------
    // data
    // -------------------------------------------------------------------------

    pub async fn create_data(&self, payload: &Value) -> Result<Value, ClientError> {
        self.post("data", payload).await
    }

    pub async fn list_data(&self) -> Result<Value, ClientError> {
        self.send(self.http.get(self.url("data"))).await
    }

    pub async fn update_data(&self, id: &str, payload: &Value) -> Result<Value, ClientError> {
        self.send(self.http.put(self.url(&format!("data/{id}"))).json(payload))
            .await
    }

    pub async fn delete_data(&self, id: &str) -> Result<Value, ClientError> {
        self.send(self.http.delete(self.url(&format!("data/{id}")))).await
    }

    pub async fn health(&self) -> Result<Value, ClientError> {
        self.send(self.http.get(self.url("health"))).await
    }
}
