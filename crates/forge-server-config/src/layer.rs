// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial configuration produced by a single source.

use serde::{Deserialize, Serialize};

use crate::sections::{AuthzConfigLayer, LoggingConfigLayer};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerConfigLayer {
	pub authz: Option<AuthzConfigLayer>,
	pub logging: Option<LoggingConfigLayer>,
}

impl ServerConfigLayer {
	/// Overlays `other` on top of `self`; fields set in `other` win.
	pub fn merge(&mut self, other: Self) {
		if let Some(authz) = other.authz {
			self.authz.get_or_insert_with(Default::default).merge(authz);
		}
		if let Some(logging) = other.logging {
			self.logging.get_or_insert_with(Default::default).merge(logging);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn merge_is_field_wise() {
		let mut base: ServerConfigLayer = toml::from_str(
			r#"
			[authz]
			repo_id_param = "repo"
			trust_forwarded_for = true

			[logging]
			level = "debug"
			"#,
		)
		.unwrap();

		base.merge(ServerConfigLayer {
			authz: Some(AuthzConfigLayer {
				trust_forwarded_for: Some(false),
				..Default::default()
			}),
			logging: None,
		});

		let authz = base.authz.unwrap();
		assert_eq!(authz.repo_id_param.as_deref(), Some("repo"));
		assert_eq!(authz.trust_forwarded_for, Some(false));
		assert_eq!(base.logging.unwrap().level.as_deref(), Some("debug"));
	}

	#[test]
	fn unknown_sections_are_rejected() {
		let parsed: Result<ServerConfigLayer, _> = toml::from_str("[database]\nurl = \"x\"\n");
		assert!(parsed.is_err());
	}
}
