use std::sync::Arc;

use crate::{
    models::{LoginRequest, LoginResponse, UserProfile},
    request::{RequestError, RequestPipeline},
};

/// Sign-in endpoint, relative to the base address.
pub const LOGIN_ENDPOINT: &str = "/users/login";
/// Current-user endpoint, relative to the base address.
pub const CURRENT_USER_ENDPOINT: &str = "/users/current";

/// AccountApi
///
/// The two account calls the session lifecycle depends on. Everything else the
/// console does with users, roles or articles goes through `RequestPipeline::send`
/// directly.
#[derive(Clone)]
pub struct AccountApi {
    pipeline: Arc<RequestPipeline>,
}

impl AccountApi {
    pub fn new(pipeline: Arc<RequestPipeline>) -> Self {
        Self { pipeline }
    }

    /// Exchanges credentials for a bearer token. The token is returned, not stored.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, RequestError> {
        let payload = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = self.pipeline.post_json(LOGIN_ENDPOINT, &payload).await?;
        Ok(response.token)
    }

    /// The signed-in user and their roles.
    pub async fn current_user(&self) -> Result<UserProfile, RequestError> {
        self.pipeline.get_json(CURRENT_USER_ENDPOINT).await
    }
}
