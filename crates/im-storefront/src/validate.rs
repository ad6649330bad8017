//! Form rules checked before anything is sent.

use im_api_types::{ChangePasswordRequest, LoginRequest, RegisterRequest};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));
static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^1[3-9]\d{9}$").expect("valid phone pattern"));
static USERNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]{4,20}$").expect("valid username pattern"));

/// The first rule a form broke. `field` is the input's element id.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: &'static str,
}

impl ValidationError {
    fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

/// Mainland mobile number: `1[3-9]` then nine digits.
pub fn is_valid_phone(phone: &str) -> bool {
    PHONE.is_match(phone)
}

pub fn is_valid_username(username: &str) -> bool {
    USERNAME.is_match(username)
}

pub fn is_valid_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
}

pub fn validate_login(form: &LoginRequest) -> Result<(), ValidationError> {
    if form.username.trim().is_empty() || form.password.is_empty() {
        return Err(ValidationError::new("username", "请输入用户名和密码"));
    }
    Ok(())
}

pub fn validate_registration(form: &RegisterRequest) -> Result<(), ValidationError> {
    if !is_valid_username(form.username.trim()) {
        return Err(ValidationError::new(
            "username",
            "用户名须为4-20位字母、数字或下划线",
        ));
    }
    if !is_valid_email(form.email.trim()) {
        return Err(ValidationError::new("email", "请输入有效的邮箱地址"));
    }
    if !is_valid_password(&form.password) {
        return Err(ValidationError::new("password", "密码长度至少为6位"));
    }
    if form.password != form.confirm_password {
        return Err(ValidationError::new("confirm_password", "两次输入的密码不一致"));
    }
    let phone = form.phone.trim();
    if !phone.is_empty() && !is_valid_phone(phone) {
        return Err(ValidationError::new("phone", "请输入有效的手机号码"));
    }
    Ok(())
}

pub fn validate_password_change(form: &ChangePasswordRequest) -> Result<(), ValidationError> {
    if form.old_password.is_empty() || form.new_password.is_empty() || form.confirm_password.is_empty()
    {
        return Err(ValidationError::new("old_password", "请填写所有密码字段"));
    }
    if form.new_password != form.confirm_password {
        return Err(ValidationError::new("confirm_password", "两次输入的新密码不一致"));
    }
    if !is_valid_password(&form.new_password) {
        return Err(ValidationError::new("new_password", "新密码长度至少为6位"));
    }
    Ok(())
}
