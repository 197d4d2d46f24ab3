use crate::credentials::{CredentialStore, StoredSession};
use fiasko_common::models::auth::{AuthResponse, LoginRequest, RegisterRequest, User};
use fiasko_common::models::exhibit::{CreatePostRequest, Exhibit};
use reqwest::{Method, StatusCode};
use thiserror::Error;
use uuid::Uuid;

/// Failures surfaced to the presentation layer. Auth and ownership
/// outcomes stay distinct so the UI can react to each (re-authenticate,
/// hide the toggle, show a message); server faults are opaque.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("email or username already in use")]
    DuplicateIdentity,
    #[error("not signed in, or the session has expired")]
    Unauthenticated,
    #[error("not the owner of this exhibit")]
    Forbidden,
    #[error("exhibit not found")]
    NotFound,
    #[error("rejected: {0}")]
    BadRequest(String),
    #[error("server error")]
    Server,
    #[error("failed to persist session: {0}")]
    Storage(#[from] std::io::Error),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Map a failure status to the error the caller should see. 401 means bad
/// credentials on the auth endpoints and a missing or expired session
/// everywhere else.
fn classify_status(status: StatusCode, auth_endpoint: bool, message: String) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED if auth_endpoint => ApiError::InvalidCredentials,
        StatusCode::UNAUTHORIZED => ApiError::Unauthenticated,
        StatusCode::FORBIDDEN => ApiError::Forbidden,
        StatusCode::NOT_FOUND => ApiError::NotFound,
        StatusCode::CONFLICT => ApiError::DuplicateIdentity,
        StatusCode::BAD_REQUEST => ApiError::BadRequest(message),
        _ => {
            tracing::error!("Server returned {}: {}", status, message);
            ApiError::Server
        }
    }
}

async fn error_from_response(response: reqwest::Response, auth_endpoint: bool) -> ApiError {
    let status = response.status();
    let message = response
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| status.to_string());
    classify_status(status, auth_endpoint, message)
}

/// HTTP gateway to the fiasko server. Every outbound call goes through
/// here, so the bearer header is attached in exactly one place.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    credentials: CredentialStore,
}

impl ApiClient {
    /// `base_url` including the API prefix, e.g. `http://localhost:3000/api`
    pub fn new(base_url: &str, credentials: CredentialStore) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    /// The signed-in identity, if any
    pub fn current_user(&self) -> Option<&User> {
        self.credentials.current().map(|s| &s.user)
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let mut req = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(session) = self.credentials.current() {
            req = req.header("Authorization", format!("Bearer {}", session.token));
        }
        req
    }

    fn store_session(&mut self, auth: AuthResponse) -> Result<User, ApiError> {
        let user = auth.user.clone();
        self.credentials.set(StoredSession {
            user: auth.user,
            token: auth.token,
        })?;
        Ok(user)
    }

    /// Register a new contributor. On success the minted session is
    /// persisted and used for subsequent calls.
    pub async fn register(
        &mut self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<User, ApiError> {
        let body = RegisterRequest {
            email: email.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        };
        let response = self
            .request(Method::POST, "/auth/register")
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(error_from_response(response, true).await);
        }
        let auth: AuthResponse = response.json().await?;
        self.store_session(auth)
    }

    /// Exchange email + password for a fresh session
    pub async fn login(&mut self, email: &str, password: &str) -> Result<User, ApiError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self
            .request(Method::POST, "/auth/login")
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(error_from_response(response, true).await);
        }
        let auth: AuthResponse = response.json().await?;
        self.store_session(auth)
    }

    /// Sign out locally. Tokens are stateless, so there is nothing to
    /// revoke server-side; the session simply stops being attached.
    pub fn logout(&mut self) -> Result<(), ApiError> {
        self.credentials.clear()?;
        Ok(())
    }

    /// The public museum feed; works signed out
    pub async fn fetch_public(&self) -> Result<Vec<Exhibit>, ApiError> {
        let response = self.request(Method::GET, "/posts").send().await?;
        if !response.status().is_success() {
            return Err(error_from_response(response, false).await);
        }
        Ok(response.json().await?)
    }

    /// The attic: the signed-in user's own exhibits, public or not
    pub async fn fetch_mine(&self) -> Result<Vec<Exhibit>, ApiError> {
        let response = self.request(Method::GET, "/posts/mine").send().await?;
        if !response.status().is_success() {
            return Err(error_from_response(response, false).await);
        }
        Ok(response.json().await?)
    }

    /// Submit a new exhibit; the echoed exhibit is ground truth for it
    pub async fn create_post(&self, req: &CreatePostRequest) -> Result<Exhibit, ApiError> {
        let response = self
            .request(Method::POST, "/posts")
            .json(req)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(error_from_response(response, false).await);
        }
        Ok(response.json().await?)
    }

    /// Flip one owned exhibit between public and private
    pub async fn toggle_visibility(&self, post_id: Uuid) -> Result<Exhibit, ApiError> {
        let response = self
            .request(Method::PATCH, &format!("/posts/{}/privacy", post_id))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(error_from_response(response, false).await);
        }
        Ok(response.json().await?)
    }
}
