// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for the Forge server.
//!
//! Layered from built-in defaults, a TOML file and `FORGE_SERVER_*`
//! environment variables, in increasing precedence:
//!
//! ```toml
//! [authz]
//! repo_id_param = "id"
//! trust_forwarded_for = false
//! forwarded_header = "x-forwarded-for"
//! trusted_proxy_hops = 1
//!
//! [logging]
//! level = "info"
//! format = "pretty"
//! ```

pub mod error;
pub mod layer;
pub mod logging;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use logging::init_tracing;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use http::HeaderName;
use tracing::debug;

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerConfig {
	pub authz: AuthzConfig,
	pub logging: LoggingConfig,
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`FORGE_SERVER_*`)
/// 2. Config file (`/etc/forge/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
pub fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let authz = layer.authz.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();

	validate_config(&authz, &logging)?;

	Ok(ServerConfig { authz, logging })
}

fn validate_config(authz: &AuthzConfig, logging: &LoggingConfig) -> Result<(), ConfigError> {
	if authz.repo_id_param.trim().is_empty() {
		return Err(ConfigError::validation("authz.repo_id_param must not be empty"));
	}

	if authz.forwarded_header.trim().is_empty() {
		return Err(ConfigError::validation(
			"authz.forwarded_header must not be empty",
		));
	}

	if HeaderName::from_bytes(authz.forwarded_header.as_bytes()).is_err() {
		return Err(ConfigError::invalid_value(
			"authz.forwarded_header",
			format!("'{}' is not a valid HTTP header name", authz.forwarded_header),
		));
	}

	if authz.trusted_proxy_hops == 0 {
		return Err(ConfigError::invalid_value(
			"authz.trusted_proxy_hops",
			"must be at least 1",
		));
	}

	if logging.level.trim().is_empty() {
		return Err(ConfigError::validation("logging.level must not be empty"));
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	struct FixedSource(Precedence, ServerConfigLayer);

	impl ConfigSource for FixedSource {
		fn name(&self) -> &'static str {
			"fixed"
		}

		fn precedence(&self) -> Precedence {
			self.0
		}

		fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
			Ok(self.1.clone())
		}
	}

	fn authz_layer(param: &str) -> ServerConfigLayer {
		ServerConfigLayer {
			authz: Some(AuthzConfigLayer {
				repo_id_param: Some(param.to_string()),
				..Default::default()
			}),
			logging: None,
		}
	}

	#[test]
	fn defaults_finalize_cleanly() {
		let config = finalize(ServerConfigLayer::default()).unwrap();
		assert_eq!(config, ServerConfig::default());
	}

	#[test]
	fn higher_precedence_wins_regardless_of_order() {
		let config = load_from_sources(vec![
			Box::new(FixedSource(Precedence::Environment, authz_layer("from_env"))),
			Box::new(FixedSource(Precedence::ConfigFile, authz_layer("from_file"))),
			Box::new(DefaultsSource),
		])
		.unwrap();
		assert_eq!(config.authz.repo_id_param, "from_env");
	}

	#[test]
	fn file_settings_are_loaded() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			"[authz]\nrepo_id_param = \"repo\"\n\n[logging]\nformat = \"json\"\n"
		)
		.unwrap();

		let config = load_from_sources(vec![
			Box::new(DefaultsSource),
			Box::new(TomlSource::new(file.path())),
		])
		.unwrap();
		assert_eq!(config.authz.repo_id_param, "repo");
		assert_eq!(config.logging.format, LogFormat::Json);
		assert_eq!(config.logging.level, "info");
	}

	#[test]
	fn blank_repo_id_param_is_invalid() {
		let err = finalize(authz_layer("  ")).unwrap_err();
		assert!(matches!(err, ConfigError::Validation(_)));
	}

	#[test]
	fn invalid_header_name_is_rejected() {
		let layer = ServerConfigLayer {
			authz: Some(AuthzConfigLayer {
				forwarded_header: Some("x forwarded".to_string()),
				..Default::default()
			}),
			logging: None,
		};
		let err = finalize(layer).unwrap_err();
		assert!(matches!(err, ConfigError::InvalidValue { .. }));
	}

	#[test]
	fn zero_proxy_hops_is_rejected() {
		let layer = ServerConfigLayer {
			authz: Some(AuthzConfigLayer {
				trusted_proxy_hops: Some(0),
				..Default::default()
			}),
			logging: None,
		};
		let err = finalize(layer).unwrap_err();
		assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "authz.trusted_proxy_hops"));
	}

	#[test]
	fn proxy_hops_load_from_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[authz]\ntrusted_proxy_hops = 3\n").unwrap();

		let config = load_from_sources(vec![
			Box::new(DefaultsSource),
			Box::new(TomlSource::new(file.path())),
		])
		.unwrap();
		assert_eq!(config.authz.trusted_proxy_hops, 3);
	}

	mod property_tests {
		use super::*;
		use proptest::prelude::*;

		proptest! {
			#[test]
			fn token_header_names_validate(name in "[a-z][a-z0-9-]{0,30}") {
				let layer = ServerConfigLayer {
					authz: Some(AuthzConfigLayer {
						forwarded_header: Some(name.clone()),
						..Default::default()
					}),
					logging: None,
				};
				let config = finalize(layer).unwrap();
				prop_assert_eq!(config.authz.forwarded_header, name);
			}
		}
	}
}
