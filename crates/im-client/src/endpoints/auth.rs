use im_api_types::{
    Ack, AuthStatus, ChangePasswordRequest, LoginRequest, LoginResponse, ProfileUpdate,
    RegisterRequest, RegisterResponse,
};

use crate::client::{ApiClient, RequestOptions};
use crate::error::ApiError;
use crate::transport::{FilePart, Method, MultipartForm, Transport};

impl<T: Transport> ApiClient<T> {
    /// POST /auth/login, aborted after `auth_timeout`.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let options = RequestOptions::post()
            .json(credentials)?
            .timeout(self.config().auth_timeout);
        self.request("/auth/login", options).await
    }

    /// POST /auth/register, aborted after `auth_timeout`.
    pub async fn register(&self, form: &RegisterRequest) -> Result<RegisterResponse, ApiError> {
        let options = RequestOptions::post()
            .json(form)?
            .timeout(self.config().auth_timeout);
        self.request("/auth/register", options).await
    }

    pub async fn logout(&self) -> Result<Ack, ApiError> {
        self.request("/auth/logout", RequestOptions::post()).await
    }

    pub async fn check_auth(&self) -> Result<AuthStatus, ApiError> {
        self.request("/auth/check_auth", RequestOptions::get()).await
    }

    pub async fn change_password(&self, form: &ChangePasswordRequest) -> Result<Ack, ApiError> {
        let options = RequestOptions::post().json(form)?;
        self.request("/auth/change_password", options).await
    }

    /// POST /auth/update_profile as multipart, with an optional avatar.
    pub async fn update_profile(
        &self,
        update: &ProfileUpdate,
        avatar: Option<FilePart>,
    ) -> Result<Ack, ApiError> {
        let mut form = MultipartForm::new();
        for (key, value) in update.fields() {
            form = form.text(key, value);
        }
        if let Some(avatar) = avatar {
            form = form.file("avatar", avatar);
        }
        self.upload_request("/auth/update_profile", Method::Post, form)
            .await
    }
}
