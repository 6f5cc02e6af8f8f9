// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Repository authorization for the Forge server.
//!
//! [`RepoAuthorizer`] runs the staged pipeline over injected collaborators,
//! [`layer::require_repo_access`] applies it to axum routes, and
//! [`memory`] provides in-memory collaborators for tests and the CLI.

pub mod collaborators;
pub mod layer;
pub mod memory;
pub mod pipeline;
pub mod request;

pub use collaborators::{
	Authenticator, CollaboratorError, CollaboratorResult, PermissionResolver, PolicyGateway,
	RepoStore,
};
pub use layer::{
	require_repo_access, AuthzRejection, ErrorResponse, RepoAuthzLayerState, RepoRequirement,
	RequestSettings,
};
pub use memory::{
	ExtensionAuthenticator, InMemoryPermissionResolver, InMemoryRepoStore, StaticPolicyGateway,
	TenantPolicy,
};
pub use pipeline::{compare_level, public_read_bypass, RepoAuthorizer, Stage, STAGES};
pub use request::{parse_forwarded_for, AuthzRequest};
