// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Repository authorization configuration section.

use serde::{Deserialize, Serialize};

pub const DEFAULT_REPO_ID_PARAM: &str = "id";
pub const DEFAULT_FORWARDED_HEADER: &str = "x-forwarded-for";
pub const DEFAULT_TRUSTED_PROXY_HOPS: usize = 1;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthzConfigLayer {
	pub repo_id_param: Option<String>,
	pub trust_forwarded_for: Option<bool>,
	pub forwarded_header: Option<String>,
	pub trusted_proxy_hops: Option<usize>,
}

impl AuthzConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.repo_id_param.is_some() {
			self.repo_id_param = other.repo_id_param;
		}
		if other.trust_forwarded_for.is_some() {
			self.trust_forwarded_for = other.trust_forwarded_for;
		}
		if other.forwarded_header.is_some() {
			self.forwarded_header = other.forwarded_header;
		}
		if other.trusted_proxy_hops.is_some() {
			self.trusted_proxy_hops = other.trusted_proxy_hops;
		}
	}

	pub fn finalize(self) -> AuthzConfig {
		AuthzConfig {
			repo_id_param: self
				.repo_id_param
				.unwrap_or_else(|| DEFAULT_REPO_ID_PARAM.to_string()),
			trust_forwarded_for: self.trust_forwarded_for.unwrap_or(false),
			forwarded_header: self
				.forwarded_header
				.unwrap_or_else(|| DEFAULT_FORWARDED_HEADER.to_string()),
			trusted_proxy_hops: self
				.trusted_proxy_hops
				.unwrap_or(DEFAULT_TRUSTED_PROXY_HOPS),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthzConfig {
	/// Name of the route path parameter holding the repository id.
	pub repo_id_param: String,
	/// Read the client IP from `forwarded_header` instead of the peer address.
	pub trust_forwarded_for: bool,
	pub forwarded_header: String,
	/// Proxies in front of the server that append to `forwarded_header`.
	/// The client address is taken this many entries from the right.
	pub trusted_proxy_hops: usize,
}

impl Default for AuthzConfig {
	fn default() -> Self {
		AuthzConfigLayer::default().finalize()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults() {
		let config = AuthzConfig::default();
		assert_eq!(config.repo_id_param, "id");
		assert!(!config.trust_forwarded_for);
		assert_eq!(config.forwarded_header, "x-forwarded-for");
		assert_eq!(config.trusted_proxy_hops, 1);
	}

	#[test]
	fn merge_keeps_unset_fields() {
		let mut base = AuthzConfigLayer {
			repo_id_param: Some("repo".to_string()),
			trust_forwarded_for: Some(true),
			forwarded_header: None,
			trusted_proxy_hops: Some(2),
		};
		base.merge(AuthzConfigLayer {
			trust_forwarded_for: Some(false),
			..Default::default()
		});

		let config = base.finalize();
		assert_eq!(config.repo_id_param, "repo");
		assert!(!config.trust_forwarded_for);
		assert_eq!(config.forwarded_header, DEFAULT_FORWARDED_HEADER);
		assert_eq!(config.trusted_proxy_hops, 2);
	}
}
