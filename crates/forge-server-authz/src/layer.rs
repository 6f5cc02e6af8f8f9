// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Route-level repository authorization for axum.
//!
//! Attach [`require_repo_access`] with `from_fn_with_state` as a
//! `route_layer` on routes whose path carries a repository id:
//!
//! ```ignore
//! let state = RepoAuthzLayerState::new(authorizer, RepoRequirement::Level(RepoRole::Write));
//! Router::new()
//!     .route("/repos/{id}/push", post(push))
//!     .route_layer(from_fn_with_state(state, require_repo_access));
//! ```
//!
//! Authorized requests reach the handler with a
//! [`forge_authz_core::RepoAccess`] extension.
//! Rejected requests get `{"error": kind, "message": message}` with the
//! status of the [`AuthzError`]; the handler is never called.

use axum::{
	extract::{ConnectInfo, FromRequestParts, RawPathParams, Request, State},
	http::{header::InvalidHeaderName, HeaderName},
	middleware::Next,
	response::{IntoResponse, Response},
	Json,
};
use forge_authz_core::{Actor, AuthzError, RepoPermission, RepoRole};
use forge_server_config::AuthzConfig;
use serde::Serialize;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use crate::pipeline::RepoAuthorizer;
use crate::request::{parse_forwarded_for, AuthzRequest};

/// What a route demands of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoRequirement {
	Level(RepoRole),
	Capability(RepoPermission),
}

impl fmt::Display for RepoRequirement {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			RepoRequirement::Level(role) => write!(f, "level:{role}"),
			RepoRequirement::Capability(capability) => write!(f, "capability:{capability}"),
		}
	}
}

/// How the layer reads identifiers out of an HTTP request.
#[derive(Debug, Clone)]
pub struct RequestSettings {
	pub repo_id_param: String,
	/// Only honour the forwarded header behind a trusted proxy.
	pub trust_forwarded_for: bool,
	pub forwarded_header: HeaderName,
	/// Number of proxies in front of the server that append to
	/// `forwarded_header`.
	pub trusted_proxy_hops: usize,
}

impl Default for RequestSettings {
	fn default() -> Self {
		Self {
			repo_id_param: "id".to_string(),
			trust_forwarded_for: false,
			forwarded_header: HeaderName::from_static("x-forwarded-for"),
			trusted_proxy_hops: 1,
		}
	}
}

impl RequestSettings {
	pub fn from_config(config: &AuthzConfig) -> Result<Self, InvalidHeaderName> {
		Ok(Self {
			repo_id_param: config.repo_id_param.clone(),
			trust_forwarded_for: config.trust_forwarded_for,
			forwarded_header: HeaderName::from_bytes(config.forwarded_header.as_bytes())?,
			trusted_proxy_hops: config.trusted_proxy_hops,
		})
	}

	/// Origin of the request.
	///
	/// With a trusted forwarded header present, the address the outermost
	/// trusted proxy saw, or `None` if that hop is unusable. Otherwise the
	/// peer address.
	pub fn client_ip(&self, parts: &http::request::Parts) -> Option<IpAddr> {
		if self.trust_forwarded_for {
			let mut values = parts.headers.get_all(&self.forwarded_header).iter().peekable();
			if values.peek().is_some() {
				let joined = values
					.map(|v| v.to_str().ok())
					.collect::<Option<Vec<_>>>()?
					.join(",");
				return parse_forwarded_for(&joined, self.trusted_proxy_hops);
			}
		}

		parts
			.extensions
			.get::<ConnectInfo<SocketAddr>>()
			.map(|ConnectInfo(addr)| addr.ip())
	}
}

#[derive(Clone)]
pub struct RepoAuthzLayerState {
	pub authorizer: Arc<RepoAuthorizer>,
	pub requirement: RepoRequirement,
	pub settings: RequestSettings,
}

impl RepoAuthzLayerState {
	pub fn new(authorizer: Arc<RepoAuthorizer>, requirement: RepoRequirement) -> Self {
		Self {
			authorizer,
			requirement,
			settings: RequestSettings::default(),
		}
	}

	pub fn with_settings(mut self, settings: RequestSettings) -> Self {
		self.settings = settings;
		self
	}
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
	pub error: String,
	pub message: String,
}

/// HTTP rendering of an [`AuthzError`].
#[derive(Debug)]
pub struct AuthzRejection(pub AuthzError);

impl From<AuthzError> for AuthzRejection {
	fn from(err: AuthzError) -> Self {
		Self(err)
	}
}

impl IntoResponse for AuthzRejection {
	fn into_response(self) -> Response {
		let body = ErrorResponse {
			error: self.0.kind().to_string(),
			message: self.0.message(),
		};
		(self.0.status(), Json(body)).into_response()
	}
}

/// Middleware enforcing a [`RepoRequirement`] on the matched route.
pub async fn require_repo_access(
	State(state): State<RepoAuthzLayerState>,
	request: Request,
	next: Next,
) -> Response {
	let (mut parts, body) = request.into_parts();

	let repo_id = RawPathParams::from_request_parts(&mut parts, &())
		.await
		.ok()
		.and_then(|params| {
			params
				.iter()
				.find(|(name, _)| *name == state.settings.repo_id_param)
				.map(|(_, value)| value.to_string())
		});

	let mut authz_request = AuthzRequest::new();
	authz_request.repo_id = repo_id;
	authz_request.client_ip = state.settings.client_ip(&parts);
	authz_request.session_actor = parts.extensions.get::<Actor>().cloned();

	let outcome = match state.requirement {
		RepoRequirement::Level(role) => state.authorizer.authorize(&authz_request, role).await,
		RepoRequirement::Capability(capability) => {
			state
				.authorizer
				.authorize_capability(&authz_request, capability)
				.await
		}
	};

	match outcome {
		Ok(access) => {
			tracing::debug!(
				repo_id = %access.repository.id,
				requirement = %state.requirement,
				"repository route authorized"
			);
			parts.extensions.insert(access);
			next.run(Request::from_parts(parts, body)).await
		}
		Err(err) => {
			tracing::info!(
				requirement = %state.requirement,
				kind = err.kind(),
				status = err.status().as_u16(),
				"repository route rejected"
			);
			AuthzRejection(err).into_response()
		}
	}
}
