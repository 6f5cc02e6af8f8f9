// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core authorization types for Forge repositories.
//!
//! This crate is pure data and lookup tables; it performs no I/O:
//!
//! - [`SystemRole`] / [`Permission`] and the platform matrix
//! - [`RepoRole`] / [`RepoPermission`] and the repository matrix
//! - [`Actor`], [`Repository`] and tenant policy types consumed by the
//!   authorizer in `forge-server-authz`
//! - [`AuthzError`], the terminal failure taxonomy, and [`RepoAccess`], the
//!   context produced on success

pub mod access;
pub mod error;
pub mod matrix;
pub mod permission;
pub mod policy;
pub mod role;
pub mod types;

pub use access::RepoAccess;
pub use error::AuthzError;
pub use matrix::{
	has_permission, has_permission_named, has_repo_permission, has_repo_permission_named,
	is_admin, is_admin_named, repo_permissions, system_permissions,
};
pub use permission::{Permission, RepoPermission, UnknownCapability};
pub use policy::{PolicyContext, PolicyDecision, PolicyType};
pub use role::{satisfies_level, RepoRole, RoleParseError, SystemRole, REPO_ROLE_HIERARCHY};
pub use types::{Actor, RepoId, Repository, TenantId, UserId, Visibility};
