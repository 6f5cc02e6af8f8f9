// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

mod authz;
mod logging;

pub use authz::{AuthzConfig, AuthzConfigLayer, DEFAULT_FORWARDED_HEADER, DEFAULT_REPO_ID_PARAM};
pub use logging::{LogFormat, LoggingConfig, LoggingConfigLayer};
