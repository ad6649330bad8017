//! Login, registration, logout, account forms and the page guard.

use im_api_types::{ChangePasswordRequest, LoginRequest, ProfileUpdate, RegisterRequest, User};
use im_client::{
    ApiClient, FilePart, KeyValueStore, LONG_REDIRECT_DELAY, SHORT_REDIRECT_DELAY, Transport,
};
use tracing::{info, warn};
use url::form_urlencoded;

use crate::outcome::{FormOutcome, Navigation, Notice, Redirect};
use crate::session::SessionContext;
use crate::validate::{validate_login, validate_password_change, validate_registration};

pub const LOGIN_PAGE: &str = "login.html";
pub const ACCOUNT_PAGE: &str = "user.html";
pub const PUBLIC_PAGES: [&str; 5] = [
    "login.html",
    "register.html",
    "index.html",
    "detail.html",
    "search.html",
];

/// Last path segment, with the site root counting as `index.html`.
pub fn page_name(pathname: &str) -> &str {
    match pathname.rsplit('/').next() {
        Some("") | None => "index.html",
        Some(page) => page,
    }
}

pub fn is_public_page(pathname: &str) -> bool {
    PUBLIC_PAGES.contains(&page_name(pathname))
}

#[derive(Debug, Clone, PartialEq)]
pub enum GuardOutcome {
    Public,
    SignedIn(User),
    LoginRequired(Redirect),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavbarState {
    SignedIn { username: String },
    SignedOut,
    /// The status check failed; leave the navbar as rendered.
    Unchanged,
}

pub struct AuthController<'a, T, S> {
    client: &'a ApiClient<T>,
    session: &'a SessionContext<S>,
}

impl<'a, T: Transport, S: KeyValueStore> AuthController<'a, T, S> {
    pub fn new(client: &'a ApiClient<T>, session: &'a SessionContext<S>) -> Self {
        Self { client, session }
    }

    pub async fn login(&self, form: &LoginRequest) -> FormOutcome {
        if let Err(invalid) = validate_login(form) {
            return FormOutcome::invalid(invalid.field, invalid.message);
        }

        let credentials = LoginRequest {
            username: form.username.trim().to_string(),
            ..form.clone()
        };
        match self.client.login(&credentials).await {
            Ok(response) => {
                info!(user = %response.user.username, "signed in");
                self.session.sign_in(response.user);
                let target = self
                    .session
                    .take_return_url()
                    .unwrap_or_else(|| ACCOUNT_PAGE.to_string());
                FormOutcome::success(
                    Notice::success("登录成功！正在跳转到个人中心..."),
                    Redirect::to(target, SHORT_REDIRECT_DELAY),
                )
            }
            Err(err) => {
                warn!("login failed: {err:?}");
                FormOutcome::failure(Notice::from_error(&err, "登录失败"))
            }
        }
    }

    pub async fn register(&self, form: &RegisterRequest) -> FormOutcome {
        if let Err(invalid) = validate_registration(form) {
            return FormOutcome::invalid(invalid.field, invalid.message);
        }

        match self.client.register(form).await {
            Ok(response) => {
                if let Some(user) = response.user {
                    self.session.sign_in(user);
                }
                let message: String =
                    form_urlencoded::byte_serialize("注册成功，请登录".as_bytes()).collect();
                FormOutcome::success(
                    Notice::success("注册成功！正在跳转到登录页面..."),
                    Redirect::to(format!("{LOGIN_PAGE}?message={message}"), LONG_REDIRECT_DELAY),
                )
            }
            Err(err) => {
                warn!("registration failed: {err:?}");
                FormOutcome::failure(Notice::from_error(&err, "注册失败"))
            }
        }
    }

    /// End the server session, then forget the cached user everywhere.
    pub async fn logout(&self) -> FormOutcome {
        match self.client.logout().await {
            Ok(_) => {
                self.session.sign_out();
                FormOutcome::success(
                    Notice::success("已退出登录"),
                    Redirect::to(LOGIN_PAGE, SHORT_REDIRECT_DELAY),
                )
            }
            Err(err) => {
                warn!("logout failed: {err:?}");
                FormOutcome::failure(Notice::error("退出失败，请重试"))
            }
        }
    }

    pub async fn change_password(&self, form: &ChangePasswordRequest) -> FormOutcome {
        if let Err(invalid) = validate_password_change(form) {
            return FormOutcome::invalid(invalid.field, invalid.message);
        }

        match self.client.change_password(form).await {
            Ok(_) => FormOutcome::Success {
                notice: Some(Notice::success("密码修改成功，请重新登录")),
                redirect: Some(Redirect {
                    to: Navigation::Logout,
                    after: LONG_REDIRECT_DELAY,
                }),
            },
            Err(err) => FormOutcome::failure(Notice::from_error(&err, "修改失败")),
        }
    }

    pub async fn update_profile(&self, update: &ProfileUpdate, avatar: Option<FilePart>) -> FormOutcome {
        match self.client.update_profile(update, avatar).await {
            Ok(_) => {
                self.session.apply_profile(update);
                FormOutcome::success(
                    Notice::success("资料更新成功"),
                    Redirect::reload(LONG_REDIRECT_DELAY),
                )
            }
            Err(err) => FormOutcome::failure(Notice::from_error(&err, "更新失败")),
        }
    }

    /// Protect a page. `href` is remembered so login can return to it.
    pub async fn guard(&self, pathname: &str, href: &str) -> GuardOutcome {
        if is_public_page(pathname) {
            return GuardOutcome::Public;
        }

        match self.current_user().await {
            Some(user) => GuardOutcome::SignedIn(user),
            None => {
                self.session.remember_return_url(href);
                GuardOutcome::LoginRequired(Redirect::now(LOGIN_PAGE))
            }
        }
    }

    pub async fn sync_navbar(&self) -> NavbarState {
        match self.client.check_auth().await {
            Ok(status) if !status.authenticated => {
                self.session.sign_out();
                NavbarState::SignedOut
            }
            Ok(status) => match status.user {
                Some(user) => NavbarState::SignedIn {
                    username: user.username,
                },
                None => NavbarState::SignedOut,
            },
            Err(err) => {
                warn!("auth status check failed: {err}");
                NavbarState::Unchanged
            }
        }
    }

    /// The server's view of the session. Errors count as signed out.
    async fn current_user(&self) -> Option<User> {
        let status = self
            .client
            .check_auth()
            .await
            .inspect_err(|err| warn!("auth status check failed: {err}"))
            .ok()?;
        if !status.authenticated {
            self.session.sign_out();
            return None;
        }
        let user = status.user?;
        self.session.sign_in(user.clone());
        Some(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Stores, user};
    use im_client::mock::{MockTransport, mock_client};
    use im_client::{Method, REDIRECT_KEY, TransportError, USER_KEY};
    use std::time::Duration;

    fn login_form() -> LoginRequest {
        LoginRequest {
            username: " zhang ".into(),
            password: "secret1".into(),
            remember: false,
        }
    }

    fn login_reply(transport: &MockTransport) {
        let body = serde_json::json!({"success": true, "user": user("zhang")}).to_string();
        transport.reply(Method::Post, "/auth/login", 200, &body);
    }

    #[test]
    fn public_pages() {
        assert!(is_public_page("/"));
        assert!(is_public_page("/shop/detail.html"));
        assert!(!is_public_page("/cart.html"));
        assert!(!is_public_page("/user.html"));
    }

    #[tokio::test]
    async fn guard_then_login_returns_to_the_protected_page() -> anyhow::Result<()> {
        let transport = MockTransport::new();
        transport.reply(Method::Get, "/auth/check_auth", 200, r#"{"authenticated":false}"#);
        login_reply(&transport);
        let client = mock_client(&transport);
        let stores = Stores::new();
        let session = stores.context();
        let auth = AuthController::new(&client, &session);

        let guarded = auth.guard("/cart.html", "http://h/cart.html").await;
        assert_eq!(guarded, GuardOutcome::LoginRequired(Redirect::now(LOGIN_PAGE)));
        assert_eq!(stores.session.get(REDIRECT_KEY).as_deref(), Some("http://h/cart.html"));

        let outcome = auth.login(&login_form()).await;
        assert_eq!(
            outcome.redirect(),
            Some(&Redirect::to("http://h/cart.html", Duration::from_secs(1)))
        );
        assert!(stores.session.get(REDIRECT_KEY).is_none());
        assert!(stores.session.get(USER_KEY).is_some());

        let sent = transport.last_request_to(Method::Post, "/auth/login").expect("login sent");
        assert_eq!(sent.timeout, Some(im_client::AUTH_TIMEOUT));
        let body: serde_json::Value = serde_json::from_str(sent.json_body().unwrap_or_default())?;
        assert_eq!(body["username"], "zhang");
        Ok(())
    }

    #[tokio::test]
    async fn signed_out_server_session_drops_the_cached_user() -> anyhow::Result<()> {
        let transport = MockTransport::new();
        transport.reply(Method::Get, "/auth/check_auth", 200, r#"{"authenticated":false}"#);
        let client = mock_client(&transport);
        let stores = Stores::new();
        stores.context().sign_in(user("stale"));
        stores.durable.set(USER_KEY, "{}");
        let session = stores.context();
        assert!(session.is_signed_in());
        let auth = AuthController::new(&client, &session);

        let guarded = auth.guard("/user.html", "http://h/user.html").await;
        assert!(matches!(guarded, GuardOutcome::LoginRequired(_)));
        assert!(!session.is_signed_in());
        assert!(stores.session.get(USER_KEY).is_none());
        assert!(stores.durable.get(USER_KEY).is_none());

        session.sign_in(user("stale"));
        assert_eq!(auth.sync_navbar().await, NavbarState::SignedOut);
        assert!(stores.session.get(USER_KEY).is_none());
        Ok(())
    }

    #[tokio::test]
    async fn login_without_stored_target_goes_to_account_page() -> anyhow::Result<()> {
        let transport = MockTransport::new();
        login_reply(&transport);
        let client = mock_client(&transport);
        let stores = Stores::new();
        let session = stores.context();

        let outcome = AuthController::new(&client, &session).login(&login_form()).await;
        assert!(outcome.is_success());
        assert_eq!(
            outcome.redirect(),
            Some(&Redirect::to(ACCOUNT_PAGE, SHORT_REDIRECT_DELAY))
        );
        assert_eq!(session.user().map(|u| u.username), Some("zhang".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn login_proceeds_without_a_token_and_reports_timeouts() -> anyhow::Result<()> {
        let transport = MockTransport::new();
        transport.clear_route(Method::Get, im_client::CSRF_ENDPOINT);
        transport.fail(
            Method::Get,
            im_client::CSRF_ENDPOINT,
            TransportError::Network("refused".into()),
        );
        transport.fail(Method::Post, "/auth/login", TransportError::Timeout);
        let client = mock_client(&transport);
        let stores = Stores::new();
        let session = stores.context();

        let outcome = AuthController::new(&client, &session).login(&login_form()).await;
        assert_eq!(
            outcome.notice().map(|n| n.message.as_str()),
            Some("请求超时，请检查网络连接")
        );
        assert_eq!(transport.requests_to(Method::Post, "/auth/login").len(), 1);
        assert!(!session.is_signed_in());
        Ok(())
    }

    #[tokio::test]
    async fn blank_credentials_are_refused_locally() -> anyhow::Result<()> {
        let transport = MockTransport::new();
        let client = mock_client(&transport);
        let stores = Stores::new();
        let session = stores.context();
        let form = LoginRequest {
            username: "  ".into(),
            password: String::new(),
            remember: false,
        };

        let outcome = AuthController::new(&client, &session).login(&form).await;
        assert_eq!(outcome, FormOutcome::invalid("username", "请输入用户名和密码"));
        assert!(transport.requests().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn register_redirects_to_login_with_encoded_message() -> anyhow::Result<()> {
        let transport = MockTransport::new();
        transport.reply(Method::Post, "/auth/register", 201, r#"{"success":true,"message":"注册成功"}"#);
        let client = mock_client(&transport);
        let stores = Stores::new();
        let session = stores.context();
        let form = RegisterRequest {
            username: "li_hua".into(),
            email: "lihua@campus.edu.cn".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
            ..RegisterRequest::default()
        };

        let outcome = AuthController::new(&client, &session).register(&form).await;
        assert_eq!(
            outcome.redirect(),
            Some(&Redirect::to(
                "login.html?message=%E6%B3%A8%E5%86%8C%E6%88%90%E5%8A%9F%EF%BC%8C%E8%AF%B7%E7%99%BB%E5%BD%95",
                LONG_REDIRECT_DELAY,
            ))
        );
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_username_message_is_shown() -> anyhow::Result<()> {
        let transport = MockTransport::new();
        transport.reply(
            Method::Post,
            "/auth/register",
            400,
            r#"{"success":false,"message":"用户名已存在"}"#,
        );
        let client = mock_client(&transport);
        let stores = Stores::new();
        let session = stores.context();
        let form = RegisterRequest {
            username: "li_hua".into(),
            email: "lihua@campus.edu.cn".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
            ..RegisterRequest::default()
        };

        let outcome = AuthController::new(&client, &session).register(&form).await;
        assert!(!outcome.is_success());
        assert_eq!(outcome.notice().map(|n| n.message.as_str()), Some("用户名已存在"));
        Ok(())
    }

    #[tokio::test]
    async fn logout_clears_session_and_durable_copies() -> anyhow::Result<()> {
        let transport = MockTransport::new();
        transport.reply(Method::Post, "/auth/logout", 200, r#"{"success":true}"#);
        let client = mock_client(&transport);
        let stores = Stores::new();
        stores.durable.set(USER_KEY, "{}");
        let session = stores.context();
        session.sign_in(user("zhang"));

        let outcome = AuthController::new(&client, &session).logout().await;
        assert_eq!(outcome.redirect(), Some(&Redirect::to(LOGIN_PAGE, SHORT_REDIRECT_DELAY)));
        assert!(stores.session.get(USER_KEY).is_none());
        assert!(stores.durable.get(USER_KEY).is_none());
        Ok(())
    }

    #[tokio::test]
    async fn password_change_chains_into_logout() -> anyhow::Result<()> {
        let transport = MockTransport::new();
        transport.reply(Method::Post, "/auth/change_password", 200, r#"{"success":true}"#);
        let client = mock_client(&transport);
        let stores = Stores::new();
        let session = stores.context();
        let form = ChangePasswordRequest {
            old_password: "secret1".into(),
            new_password: "secret2".into(),
            confirm_password: "secret2".into(),
        };

        let outcome = AuthController::new(&client, &session).change_password(&form).await;
        assert_eq!(
            outcome.redirect().map(|r| &r.to),
            Some(&Navigation::Logout)
        );
        Ok(())
    }

    #[tokio::test]
    async fn navbar_follows_server_status() -> anyhow::Result<()> {
        let transport = MockTransport::new();
        let body = serde_json::json!({"authenticated": true, "user": user("zhang")}).to_string();
        transport.reply(Method::Get, "/auth/check_auth", 200, &body);
        let client = mock_client(&transport);
        let stores = Stores::new();
        let session = stores.context();
        let auth = AuthController::new(&client, &session);

        assert_eq!(
            auth.sync_navbar().await,
            NavbarState::SignedIn {
                username: "zhang".into()
            }
        );

        transport.clear_route(Method::Get, "/auth/check_auth");
        transport.fail(Method::Get, "/auth/check_auth", TransportError::Network("down".into()));
        assert_eq!(auth.sync_navbar().await, NavbarState::Unchanged);
        Ok(())
    }
}
