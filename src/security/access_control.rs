//! Page access gate.
//!
//! Decides, before any page is served, whether a navigation proceeds or is
//! redirected. The decision is a pure function of the request path, the
//! [`Session`] read from cookies and the static permission table.
//!
//! ```text
//! not governed (api, assets, unauthorized page) → Allow
//! login page:   Authenticated → landing,  otherwise Allow
//! Anonymous / Unrecognized                      → login
//! Authenticated(role):
//!     path in table, role listed                → Allow
//!     path in table, role missing               → unauthorized
//!     path not in table                         → unmapped policy
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{GateConfig, UnmappedPolicy};
use crate::routing::matcher::{
    normalize, page_path, AnyMatcher, ExactPathMatcher, Matcher, PathPrefixMatcher,
    StaticAssetMatcher,
};
use crate::security::session::Session;

/// Dashboard roles issued by the upstream login endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Printer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Printer => "printer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role string that is not one of the known variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role `{0}`")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "admin" => Ok(Role::Admin),
            "printer" => Ok(Role::Printer),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Outcome of evaluating one navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    /// Send the browser to the login page.
    Login,
    /// Already signed in; send to the landing page.
    Landing,
    Unauthorized,
}

impl GateDecision {
    /// Label used in logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            GateDecision::Allow => "allow",
            GateDecision::Login => "login",
            GateDecision::Landing => "landing",
            GateDecision::Unauthorized => "unauthorized",
        }
    }
}

/// Page path to the roles permitted to view it.
#[derive(Debug, Clone, Default)]
pub struct PermissionTable {
    entries: HashMap<String, HashSet<Role>>,
}

impl PermissionTable {
    pub fn new<I, R>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, R)>,
        R: IntoIterator<Item = Role>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(path, roles)| (normalize(&path).to_string(), roles.into_iter().collect()))
                .collect(),
        }
    }

    /// Roles for the longest key equal to `path` or a whole-segment prefix of it.
    pub fn lookup(&self, path: &str) -> Option<&HashSet<Role>> {
        let mut candidate = page_path(path);
        loop {
            if let Some(roles) = self.entries.get(candidate) {
                return Some(roles);
            }
            match candidate.rfind('/') {
                Some(0) | None => return None,
                Some(idx) => candidate = &candidate[..idx],
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The navigation gate, built once from configuration.
#[derive(Debug)]
pub struct AccessGate {
    table: PermissionTable,
    policy: UnmappedPolicy,
    login_path: String,
    landing_path: String,
    unauthorized_path: String,
    bypass: AnyMatcher,
}

impl AccessGate {
    pub fn from_config(config: &GateConfig) -> Self {
        let mut bypass = AnyMatcher::default();
        bypass.push(PathPrefixMatcher::new("/api/"));
        bypass.push(ExactPathMatcher::new("/api"));
        bypass.push(PathPrefixMatcher::new("/_next/"));
        bypass.push(ExactPathMatcher::new("/favicon.ico"));
        bypass.push(StaticAssetMatcher);
        bypass.push(ExactPathMatcher::new(config.unauthorized_path.clone()));
        for prefix in &config.excluded_prefixes {
            bypass.push(PathPrefixMatcher::new(prefix.clone()));
        }

        Self {
            table: PermissionTable::new(
                config
                    .permissions
                    .iter()
                    .map(|(path, roles)| (path.clone(), roles.iter().copied())),
            ),
            policy: config.unmapped_policy,
            login_path: config.login_path.clone(),
            landing_path: config.landing_path.clone(),
            unauthorized_path: config.unauthorized_path.clone(),
            bypass,
        }
    }

    /// Whether the gate has any say over `path`.
    pub fn governs(&self, path: &str) -> bool {
        !self.bypass.matches(path)
    }

    /// Decide what happens to a navigation to `path`.
    pub fn evaluate(&self, path: &str, session: &Session) -> GateDecision {
        if !self.governs(path) {
            return GateDecision::Allow;
        }

        let path = page_path(path);
        if path == self.login_path {
            return match session {
                Session::Authenticated(_) => GateDecision::Landing,
                Session::Anonymous | Session::Unrecognized => GateDecision::Allow,
            };
        }

        let role = match session {
            Session::Authenticated(role) => *role,
            Session::Anonymous | Session::Unrecognized => return GateDecision::Login,
        };

        match self.table.lookup(path) {
            Some(roles) if roles.contains(&role) => GateDecision::Allow,
            Some(_) => GateDecision::Unauthorized,
            None => match (self.policy, role) {
                (UnmappedPolicy::Allow, _) | (UnmappedPolicy::AdminOnly, Role::Admin) => {
                    GateDecision::Allow
                }
                (UnmappedPolicy::AdminOnly, _) => GateDecision::Unauthorized,
            },
        }
    }

    /// Path a redirecting decision points at.
    pub fn redirect_target(&self, decision: &GateDecision) -> Option<&str> {
        match decision {
            GateDecision::Allow => None,
            GateDecision::Login => Some(self.login_path.as_str()),
            GateDecision::Landing => Some(self.landing_path.as_str()),
            GateDecision::Unauthorized => Some(self.unauthorized_path.as_str()),
        }
    }

    pub fn table(&self) -> &PermissionTable {
        &self.table
    }
}
