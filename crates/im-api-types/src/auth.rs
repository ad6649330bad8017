use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    User,
    Seller,
    Admin,
}

/// The signed-in user as reported by `check_auth` / `login`.
///
/// This is the record cached client-side under the `user` key. It is
/// advisory only; the session cookie decides who is signed in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub real_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub credit_score: Option<i32>,
    #[serde(default)]
    pub is_seller: bool,
    #[serde(default)]
    pub is_admin: bool,
}

impl User {
    pub fn display_name(&self) -> &str {
        match self.real_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.username,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsrfTokenResponse {
    pub csrf_token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthStatus {
    #[serde(default)]
    pub authenticated: bool,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub remember: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: User,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub real_name: String,
    #[serde(default)]
    pub student_id: String,
    #[serde(default)]
    pub school: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Scalar fields of the profile form. Empty fields are left untouched by the
/// server, so only non-empty values are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub real_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub student_id: Option<String>,
}

impl ProfileUpdate {
    /// Non-empty `(field, value)` pairs in form order.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        [
            ("real_name", &self.real_name),
            ("phone", &self.phone),
            ("student_id", &self.student_id),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (key, v.to_owned()))
        })
        .collect()
    }

    /// Copy the changed fields onto a cached user record.
    pub fn apply_to(&self, user: &mut User) {
        for (key, value) in self.fields() {
            match key {
                "real_name" => user.real_name = Some(value),
                "phone" => user.phone = Some(value),
                "student_id" => user.student_id = Some(value),
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_auth_payload_decodes_with_sparse_user() {
        let status: AuthStatus = serde_json::from_str(
            r#"{"authenticated":true,"user":{"id":7,"username":"lin","role":"seller","is_seller":true}}"#,
        )
        .expect("auth status decodes");
        let user = status.user.expect("user present");
        assert_eq!(user.id, UserId(7));
        assert_eq!(user.role, Role::Seller);
        assert_eq!(user.display_name(), "lin");
        assert!(user.email.is_none());
    }

    #[test]
    fn profile_update_skips_blank_fields() {
        let update = ProfileUpdate {
            real_name: Some("  林一  ".into()),
            phone: Some("   ".into()),
            student_id: None,
        };
        assert_eq!(update.fields(), vec![("real_name", "林一".to_owned())]);
    }
}
