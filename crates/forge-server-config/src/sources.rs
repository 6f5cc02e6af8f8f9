// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: built-in defaults, TOML files and environment
//! variables.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::sections::{AuthzConfigLayer, LogFormat, LoggingConfigLayer};

pub const SYSTEM_CONFIG_PATH: &str = "/etc/forge/server.toml";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(ServerConfigLayer::default())
	}
}

/// TOML file source. A missing file contributes nothing.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new(SYSTEM_CONFIG_PATH)
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ServerConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ServerConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: FORGE_SERVER_<SECTION>_<FIELD>
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading environment variables");
		load_from(&|name: &str| std::env::var(name).ok())
	}
}

type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

fn load_from(lookup: Lookup<'_>) -> Result<ServerConfigLayer, ConfigError> {
	Ok(ServerConfigLayer {
		authz: Some(load_authz(lookup)?),
		logging: Some(load_logging(lookup)?),
	})
}

fn env_var(lookup: Lookup<'_>, name: &str) -> Option<String> {
	lookup(name).filter(|s| !s.is_empty())
}

fn env_bool(lookup: Lookup<'_>, name: &str) -> Result<Option<bool>, ConfigError> {
	match env_var(lookup, name) {
		Some(v) => match v.to_lowercase().as_str() {
			"1" | "true" | "yes" => Ok(Some(true)),
			"0" | "false" | "no" => Ok(Some(false)),
			_ => Err(ConfigError::invalid_value(
				name,
				format!("invalid boolean value '{v}'"),
			)),
		},
		None => Ok(None),
	}
}

fn env_usize(lookup: Lookup<'_>, name: &str) -> Result<Option<usize>, ConfigError> {
	env_var(lookup, name)
		.map(|v| {
			v.parse::<usize>().map_err(|_| {
				ConfigError::invalid_value(name, format!("invalid unsigned integer '{v}'"))
			})
		})
		.transpose()
}

fn load_authz(lookup: Lookup<'_>) -> Result<AuthzConfigLayer, ConfigError> {
	Ok(AuthzConfigLayer {
		repo_id_param: env_var(lookup, "FORGE_SERVER_AUTHZ_REPO_ID_PARAM"),
		trust_forwarded_for: env_bool(lookup, "FORGE_SERVER_AUTHZ_TRUST_FORWARDED_FOR")?,
		forwarded_header: env_var(lookup, "FORGE_SERVER_AUTHZ_FORWARDED_HEADER"),
		trusted_proxy_hops: env_usize(lookup, "FORGE_SERVER_AUTHZ_TRUSTED_PROXY_HOPS")?,
	})
}

fn load_logging(lookup: Lookup<'_>) -> Result<LoggingConfigLayer, ConfigError> {
	let format = env_var(lookup, "FORGE_SERVER_LOG_FORMAT")
		.map(|v| {
			v.parse::<LogFormat>()
				.map_err(|message| ConfigError::invalid_value("FORGE_SERVER_LOG_FORMAT", message))
		})
		.transpose()?;

	Ok(LoggingConfigLayer {
		level: env_var(lookup, "FORGE_SERVER_LOG_LEVEL"),
		format,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;
	use std::io::Write;

	fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let map: HashMap<String, String> = vars
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		move |name| map.get(name).cloned()
	}

	#[test]
	fn precedence_orders_env_last() {
		assert!(Precedence::Defaults < Precedence::ConfigFile);
		assert!(Precedence::ConfigFile < Precedence::Environment);
	}

	#[test]
	fn env_vars_populate_layer() {
		let lookup = lookup_from(&[
			("FORGE_SERVER_AUTHZ_REPO_ID_PARAM", "repo"),
			("FORGE_SERVER_AUTHZ_TRUST_FORWARDED_FOR", "true"),
			("FORGE_SERVER_AUTHZ_TRUSTED_PROXY_HOPS", "2"),
			("FORGE_SERVER_LOG_FORMAT", "json"),
			("FORGE_SERVER_LOG_LEVEL", ""),
		]);
		let layer = load_from(&lookup).unwrap();

		let authz = layer.authz.unwrap();
		assert_eq!(authz.repo_id_param.as_deref(), Some("repo"));
		assert_eq!(authz.trust_forwarded_for, Some(true));
		assert_eq!(authz.forwarded_header, None);
		assert_eq!(authz.trusted_proxy_hops, Some(2));

		let logging = layer.logging.unwrap();
		assert_eq!(logging.format, Some(LogFormat::Json));
		assert_eq!(logging.level, None);
	}

	#[test]
	fn bad_env_bool_is_rejected() {
		let lookup = lookup_from(&[("FORGE_SERVER_AUTHZ_TRUST_FORWARDED_FOR", "maybe")]);
		let err = load_from(&lookup).unwrap_err();
		assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "FORGE_SERVER_AUTHZ_TRUST_FORWARDED_FOR"));
	}

	#[test]
	fn bad_env_proxy_hops_is_rejected() {
		let lookup = lookup_from(&[("FORGE_SERVER_AUTHZ_TRUSTED_PROXY_HOPS", "-1")]);
		let err = load_from(&lookup).unwrap_err();
		assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "FORGE_SERVER_AUTHZ_TRUSTED_PROXY_HOPS"));
	}

	#[test]
	fn bad_env_log_format_is_rejected() {
		let lookup = lookup_from(&[("FORGE_SERVER_LOG_FORMAT", "xml")]);
		assert!(load_from(&lookup).is_err());
	}

	#[test]
	fn missing_toml_file_is_empty_layer() {
		let dir = tempfile::tempdir().unwrap();
		let source = TomlSource::new(dir.path().join("absent.toml"));
		assert_eq!(source.load().unwrap(), ServerConfigLayer::default());
	}

	#[test]
	fn toml_file_is_parsed() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[authz]\nforwarded_header = \"x-real-ip\"\n").unwrap();

		let layer = TomlSource::new(file.path()).load().unwrap();
		assert_eq!(
			layer.authz.unwrap().forwarded_header.as_deref(),
			Some("x-real-ip")
		);
	}

	#[test]
	fn malformed_toml_reports_path() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[authz\n").unwrap();

		let err = TomlSource::new(file.path()).load().unwrap_err();
		assert!(matches!(err, ConfigError::TomlParse { .. }));
		assert!(err.to_string().contains(&file.path().display().to_string()));
	}
}
