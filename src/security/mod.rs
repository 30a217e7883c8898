//! # Security Module
//!
//! Authentication and authorization for matched routes.
//!
//! Identity and permission storage live outside the routing core and are
//! consumed through two traits:
//!
//! - [`CurrentUserProvider`] resolves the user behind a request.
//! - [`PermissionChecker`] answers "may this user perform `action` on `model`".
//!
//! [`AccessGuard`] combines them with the route's `allowedRoles`:
//!
//! 1. A route with no roles, or with the `*` role, is public.
//! 2. Otherwise a current user is required ([`RouterError::Unauthenticated`]).
//! 3. The user must hold one of the route's roles ([`RouterError::Forbidden`]).
//! 4. For model routes (a `modelName` parameter is bound) the user also needs
//!    the model permission for the action derived from the verb:
//!
//! | verb | action |
//! |---|---|
//! | GET without `id` | `list` |
//! | GET with `id` | `read` |
//! | POST | `create` |
//! | PUT / PATCH | `update` |
//! | DELETE | `delete` |
//!
//! A route's `rbacAction` overrides the derived action.

use crate::error::RouterError;
use crate::request::Request;
use crate::route::RouteRecord;
use http::Method;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl User {
    pub fn new(id: impl Into<String>, roles: &[&str]) -> Self {
        let id = id.into();
        Self {
            username: id.clone(),
            id,
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    #[must_use]
    pub fn has_any_role(&self, roles: &[String]) -> bool {
        roles.iter().any(|r| self.has_role(r))
    }
}

/// Resolves the user making a request.
pub trait CurrentUserProvider: Send + Sync {
    fn current_user(&self, request: &Request) -> Option<User>;
}

/// Model-level permission lookup.
pub trait PermissionChecker: Send + Sync {
    fn has_permission(&self, user: &User, action: &str, model: &str) -> bool;
}

/// Nobody is logged in.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousUserProvider;

impl CurrentUserProvider for AnonymousUserProvider {
    fn current_user(&self, _request: &Request) -> Option<User> {
        None
    }
}

/// Every request is made by the same user.
#[derive(Debug, Clone)]
pub struct StaticUserProvider {
    user: User,
}

impl StaticUserProvider {
    pub fn new(user: User) -> Self {
        Self { user }
    }
}

impl CurrentUserProvider for StaticUserProvider {
    fn current_user(&self, _request: &Request) -> Option<User> {
        Some(self.user.clone())
    }
}

/// Grants every permission.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllPermissions;

impl PermissionChecker for AllowAllPermissions {
    fn has_permission(&self, _user: &User, _action: &str, _model: &str) -> bool {
        true
    }
}

/// Role → granted `Model:action` pairs. `*` matches any model or action.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RolePermissionTable {
    grants: BTreeMap<String, BTreeSet<String>>,
}

impl RolePermissionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant `role` the right to `action` on `model`.
    #[must_use]
    pub fn grant(mut self, role: &str, model: &str, action: &str) -> Self {
        self.grants
            .entry(role.to_string())
            .or_default()
            .insert(format!("{model}:{action}"));
        self
    }
}

impl PermissionChecker for RolePermissionTable {
    fn has_permission(&self, user: &User, action: &str, model: &str) -> bool {
        let wanted = [
            format!("{model}:{action}"),
            format!("*:{action}"),
            format!("{model}:*"),
            "*:*".to_string(),
        ];
        user.roles.iter().any(|role| {
            self.grants
                .get(role)
                .is_some_and(|granted| wanted.iter().any(|w| granted.contains(w)))
        })
    }
}

/// Permission action implied by a verb on a model route.
#[must_use]
pub fn crud_action(method: &Method, has_id: bool) -> &'static str {
    match *method {
        Method::GET if has_id => "read",
        Method::GET => "list",
        Method::POST => "create",
        Method::PUT | Method::PATCH => "update",
        Method::DELETE => "delete",
        _ => "read",
    }
}

/// Enforces route roles and model permissions.
#[derive(Clone)]
pub struct AccessGuard {
    users: Arc<dyn CurrentUserProvider>,
    permissions: Arc<dyn PermissionChecker>,
}

impl Default for AccessGuard {
    fn default() -> Self {
        Self::new(Arc::new(AnonymousUserProvider), Arc::new(AllowAllPermissions))
    }
}

impl AccessGuard {
    pub fn new(users: Arc<dyn CurrentUserProvider>, permissions: Arc<dyn PermissionChecker>) -> Self {
        Self { users, permissions }
    }

    /// The authorized user, or `None` for public routes.
    pub fn authorize(&self, route: &RouteRecord, request: &Request) -> Result<Option<User>, RouterError> {
        if route.is_public() {
            return Ok(None);
        }

        let method = request.method.as_str().to_string();
        let Some(user) = self.users.current_user(request) else {
            warn!(method = %method, path = %request.path, "Unauthenticated request to protected route");
            return Err(RouterError::Unauthenticated {
                method,
                path: request.path.clone(),
            });
        };

        if !user.has_any_role(&route.allowed_roles) {
            warn!(user_id = %user.id, route = %route.label(), "User lacks required role");
            return Err(RouterError::Forbidden {
                method,
                path: request.path.clone(),
                user_id: user.id.clone(),
                required: format!("role:{}", route.allowed_roles.join("|")),
            });
        }

        if let Some(model) = request.model_name() {
            let action = route
                .rbac_action
                .as_deref()
                .unwrap_or_else(|| crud_action(&request.method, request.has("id")));
            if !self.permissions.has_permission(&user, action, model) {
                warn!(user_id = %user.id, model, action, "User lacks model permission");
                return Err(RouterError::Forbidden {
                    method,
                    path: request.path.clone(),
                    user_id: user.id.clone(),
                    required: format!("{model}:{action}"),
                });
            }
        }

        debug!(user_id = %user.id, route = %route.label(), "Request authorized");
        Ok(Some(user))
    }
}
