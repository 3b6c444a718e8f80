use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, RequestClient, RequestOptions, Result};
use scout_domain::{AuthResponse, ProfileUpdate, Session, Subscription, User};
use scout_storage::{Change, KvStore, keys};

#[derive(Debug, Clone)]
pub struct RegisterRequest {
	pub email: String,
	pub username: String,
	pub password: String,
	pub confirm_password: String,
}

/// Owns the signed-in session and performs authenticated backend calls.
///
/// The access token, refresh token and user profile are persisted together and restored on
/// construction. An unauthorized response triggers at most one refresh followed by at most one
/// retry of the original request.
pub struct SessionManager {
	store: Arc<dyn KvStore>,
	client: RequestClient,
	is_production: bool,
	session: Mutex<Option<Session>>,
	refresh_lock: tokio::sync::Mutex<()>,
}
impl SessionManager {
	pub fn new(store: Arc<dyn KvStore>, client: RequestClient, is_production: bool) -> Self {
		let session = restore(store.as_ref());

		Self {
			store,
			client,
			is_production,
			session: Mutex::new(session),
			refresh_lock: tokio::sync::Mutex::new(()),
		}
	}

	pub fn client(&self) -> &RequestClient {
		&self.client
	}

	pub fn current_user(&self) -> Option<User> {
		self.lock_session().as_ref().map(|session| session.user.clone())
	}

	pub fn access_token(&self) -> Option<String> {
		self.lock_session().as_ref().map(|session| session.access_token.clone())
	}

	pub fn is_authenticated(&self) -> bool {
		self.lock_session().is_some()
	}

	pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
		let body = serde_json::json!({ "email": email, "password": password });
		let res = self
			.client
			.request::<AuthResponse>("/api/auth/login", &RequestOptions::post(body))
			.await;

		match res {
			Ok(auth) => self.replace(auth.into()),
			Err(err) if !self.is_production => {
				tracing::warn!(error = %err, "Login failed. Using a development session.");

				let username = email.split('@').next().unwrap_or(email);

				self.replace(dev_session(email, username))
			},
			Err(err) => Err(err),
		}
	}

	pub async fn register(&self, req: &RegisterRequest) -> Result<Session> {
		if req.password != req.confirm_password {
			return Err(Error::InvalidInput {
				message: "Password confirmation does not match.".to_string(),
			});
		}

		let body = serde_json::json!({
			"email": req.email,
			"username": req.username,
			"password": req.password,
		});
		let res = self
			.client
			.request::<AuthResponse>("/api/auth/register", &RequestOptions::post(body))
			.await;

		match res {
			Ok(auth) => self.replace(auth.into()),
			Err(err) if !self.is_production => {
				tracing::warn!(error = %err, "Registration failed. Using a development session.");

				self.replace(dev_session(&req.email, &req.username))
			},
			Err(err) => Err(err),
		}
	}

	/// Notifies the backend and clears local state. Only storage failures are returned.
	pub async fn logout(&self) -> Result<()> {
		if let Err(err) = self
			.authenticated_request::<Value>("/api/auth/logout", &RequestOptions::post(Value::Null))
			.await
		{
			tracing::warn!(error = %err, "Logout request failed.");
		}

		self.clear()
	}

	/// Exchanges the stored refresh token for a new session.
	pub async fn refresh(&self) -> Result<Session> {
		let Some(refresh_token) =
			self.lock_session().as_ref().map(|session| session.refresh_token.clone())
		else {
			return Err(Error::AuthExpired);
		};
		let body = serde_json::json!({ "refreshToken": refresh_token });
		let auth: AuthResponse =
			self.client.request("/api/auth/refresh", &RequestOptions::post(body)).await?;

		self.replace(auth.into())
	}

	/// Sends a request with the current bearer token. A 401 leads to one refresh and one retry;
	/// a 401 on the retry is returned as is.
	pub async fn authenticated_request<T>(
		&self,
		endpoint: &str,
		options: &RequestOptions,
	) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let token = self.access_token();

		match self.client.request(endpoint, &with_bearer(options, token.as_deref())).await {
			Err(err) if err.is_unauthorized() => {
				tracing::info!(endpoint, "Access token rejected. Refreshing session.");
			},
			other => return other,
		}

		self.refresh_after_unauthorized(token.as_deref()).await?;

		let token = self.access_token();

		self.client.request(endpoint, &with_bearer(options, token.as_deref())).await
	}

	pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
		let body = serde_json::to_value(update)?;
		let user: User =
			self.authenticated_request("/api/user/profile", &RequestOptions::put(body)).await?;

		self.store.set(keys::USER_DATA, &serde_json::to_string(&user)?)?;

		if let Some(session) = self.lock_session().as_mut() {
			session.user = user.clone();
		}

		Ok(user)
	}

	pub async fn change_password(&self, current_password: &str, new_password: &str) -> Result<()> {
		let body = serde_json::json!({
			"currentPassword": current_password,
			"newPassword": new_password,
		});

		self.authenticated_request::<Value>("/api/user/password", &RequestOptions::put(body))
			.await?;

		Ok(())
	}

	async fn refresh_after_unauthorized(&self, rejected_token: Option<&str>) -> Result<()> {
		let _guard = self.refresh_lock.lock().await;
		let current = self.access_token();

		// Another caller rotated the token while this one waited for the lock.
		if current.is_some() && current.as_deref() != rejected_token {
			return Ok(());
		}

		match self.refresh().await {
			Ok(_) => Ok(()),
			Err(err) => {
				tracing::warn!(error = %err, "Session refresh failed. Clearing session.");

				self.clear()?;

				Err(Error::AuthExpired)
			},
		}
	}

	fn replace(&self, session: Session) -> Result<Session> {
		self.store.apply(&[
			Change::set(keys::AUTH_TOKEN, session.access_token.as_str()),
			Change::set(keys::REFRESH_TOKEN, session.refresh_token.as_str()),
			Change::set(keys::USER_DATA, serde_json::to_string(&session.user)?),
		])?;

		*self.lock_session() = Some(session.clone());

		Ok(session)
	}

	fn clear(&self) -> Result<()> {
		*self.lock_session() = None;

		self.store.apply(&[
			Change::remove(keys::AUTH_TOKEN),
			Change::remove(keys::REFRESH_TOKEN),
			Change::remove(keys::USER_DATA),
		])?;

		Ok(())
	}

	fn lock_session(&self) -> std::sync::MutexGuard<'_, Option<Session>> {
		self.session.lock().unwrap_or_else(|err| err.into_inner())
	}
}

fn restore(store: &dyn KvStore) -> Option<Session> {
	let read = || -> scout_storage::Result<Option<Session>> {
		let (Some(access_token), Some(refresh_token)) =
			(store.get(keys::AUTH_TOKEN)?, store.get(keys::REFRESH_TOKEN)?)
		else {
			return Ok(None);
		};
		let Some(user) = scout_storage::read_json::<User>(store, keys::USER_DATA)? else {
			return Ok(None);
		};

		Ok(Some(Session { access_token, refresh_token, user }))
	};

	match read() {
		Ok(session) => session,
		Err(err) => {
			tracing::warn!(error = %err, "Stored session is unreadable. Starting signed out.");

			None
		},
	}
}

fn with_bearer(options: &RequestOptions, token: Option<&str>) -> RequestOptions {
	match token {
		Some(token) => options.clone().with_header("Authorization", format!("Bearer {token}")),
		None => options.clone(),
	}
}

fn dev_session(email: &str, username: &str) -> Session {
	let id = Uuid::new_v4().simple();

	Session {
		access_token: format!("dev_token_{id}"),
		refresh_token: format!("dev_refresh_{id}"),
		user: User {
			id: id.to_string(),
			email: email.to_string(),
			username: username.to_string(),
			avatar: None,
			created_at: OffsetDateTime::now_utc(),
			subscription: Some(Subscription::Free),
		},
	}
}
