use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subscription {
	Free,
	Pro,
	Enterprise,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
	pub id: String,
	pub email: String,
	pub username: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub avatar: Option<String>,
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub subscription: Option<Subscription>,
}

/// Partial profile sent to `PUT /api/user/profile`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub username: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub avatar: Option<String>,
}

/// Body returned by login, register and refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
	pub user: User,
	pub token: String,
	pub refresh_token: String,
}

/// Access token, refresh token and profile. The three parts are always replaced or cleared
/// together.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
	pub access_token: String,
	pub refresh_token: String,
	pub user: User,
}
impl From<AuthResponse> for Session {
	fn from(res: AuthResponse) -> Self {
		Self { access_token: res.token, refresh_token: res.refresh_token, user: res.user }
	}
}
impl From<Session> for AuthResponse {
	fn from(session: Session) -> Self {
		Self { user: session.user, token: session.access_token, refresh_token: session.refresh_token }
	}
}
