#![warn(missing_docs)]
//! # devdesk-routing
//!
//! ## Purpose
//! Provides the static route table, the pre-navigation access guard, and the
//! page-title step for the `devdesk` console.
//!
//! ## Responsibilities
//! - Describe routes as `{path, requires_auth, title}` metadata.
//! - Decide allow/redirect for each navigation attempt from two facts:
//!   route metadata and credential presence.
//! - Apply the decision exactly once per attempt (no recursive re-entry).
//! - Resolve the human-readable page title after navigation settles.
//!
//! ## Data flow
//! Callers hand a target path and the credential-presence fact to
//! [`Router::navigate`] -> [`evaluate_guard`] yields a [`GuardDecision`] ->
//! the router records the resolved path and returns the title.
//!
//! ## Ownership and lifetimes
//! The table is built once and read-only afterwards; the router owns the
//! current path behind a mutex so gateway-triggered redirects and regular
//! navigation share one view.
//!
//! ## Error model
//! Table construction validates paths up front and returns
//! [`RoutingError`]; navigation itself cannot fail, it only redirects.
//!
//! ## Security and privacy notes
//! The guard consults credential *presence* only; it never sees credential
//! or claim values.
//!
//! ## Example
//! ```rust
//! use devdesk_routing::{GuardDecision, RouteDescriptor, evaluate_guard};
//!
//! let route = RouteDescriptor::new("/settings", "Settings");
//! assert_eq!(evaluate_guard(&route, false), GuardDecision::RedirectToLogin);
//! ```

use std::sync::Mutex;

use thiserror::Error;

/// Path of the login surface.
pub const LOGIN_PATH: &str = "/login";

/// Path of the home surface.
pub const HOME_PATH: &str = "/";

/// Application-level default page title.
pub const DEFAULT_TITLE: &str = "DevDesk";

/// Static metadata for one route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDescriptor {
    /// Absolute route path.
    pub path: String,
    /// Stable route name.
    pub name: String,
    /// Page title; absent routes fall back to [`DEFAULT_TITLE`].
    pub title: Option<String>,
    /// Whether navigation requires a credential. Defaults to `true`.
    pub requires_auth: bool,
}

impl RouteDescriptor {
    /// Creates a route that requires authentication.
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            title: None,
            requires_auth: true,
        }
    }

    /// Sets the page title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Marks the route reachable without a credential.
    pub fn public(mut self) -> Self {
        self.requires_auth = false;
        self
    }
}

/// Validated, read-only collection of route descriptors.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RouteDescriptor>,
}

impl RouteTable {
    /// Builds a table from descriptors.
    ///
    /// # Errors
    /// Returns [`RoutingError`] for relative or duplicate paths, or when the
    /// home or login surface is missing.
    pub fn new(routes: Vec<RouteDescriptor>) -> Result<Self, RoutingError> {
        for route in &routes {
            if !route.path.starts_with('/') {
                return Err(RoutingError::RelativePath(route.path.clone()));
            }
        }

        for (index, route) in routes.iter().enumerate() {
            if routes[..index].iter().any(|other| other.path == route.path) {
                return Err(RoutingError::DuplicatePath(route.path.clone()));
            }
        }

        let table = Self { routes };
        if table.resolve(HOME_PATH).is_none() {
            return Err(RoutingError::MissingSurface(HOME_PATH));
        }
        if table.resolve(LOGIN_PATH).is_none() {
            return Err(RoutingError::MissingSurface(LOGIN_PATH));
        }

        Ok(table)
    }

    /// Returns the platform console's route set.
    pub fn platform_default() -> Self {
        Self::new(vec![
            RouteDescriptor::new(LOGIN_PATH, "Login")
                .with_title("Login")
                .public(),
            RouteDescriptor::new("/register", "Register")
                .with_title("Register")
                .public(),
            RouteDescriptor::new("/forgot-password", "ForgotPassword")
                .with_title("Password Recovery")
                .public(),
            RouteDescriptor::new(HOME_PATH, "Home")
                .with_title("Workspace")
                .public(),
            RouteDescriptor::new("/project", "Project")
                .with_title("Projects")
                .public(),
            RouteDescriptor::new("/task", "Task")
                .with_title("Tasks")
                .public(),
            RouteDescriptor::new("/api-info", "ApiInfo")
                .with_title("API Center")
                .public(),
            RouteDescriptor::new("/ai-review", "AiReview")
                .with_title("AI Code Review")
                .public(),
            RouteDescriptor::new("/monitoring", "Monitoring")
                .with_title("System Monitoring")
                .public(),
            RouteDescriptor::new("/monitor", "Monitor")
                .with_title("System Monitoring")
                .public(),
            RouteDescriptor::new("/data-center", "DataCenter")
                .with_title("Data Center")
                .public(),
            RouteDescriptor::new("/deploy", "Deploy")
                .with_title("Deploy History")
                .public(),
            RouteDescriptor::new("/test", "Test")
                .with_title("API Testing")
                .public(),
        ])
        .expect("platform route table is statically valid")
    }

    /// Looks up a route by exact path.
    pub fn resolve(&self, path: &str) -> Option<&RouteDescriptor> {
        self.routes.iter().find(|route| route.path == path)
    }

    /// Returns the home route.
    pub fn home(&self) -> &RouteDescriptor {
        self.resolve(HOME_PATH)
            .expect("table construction guarantees a home route")
    }

    /// Returns the login route.
    pub fn login(&self) -> &RouteDescriptor {
        self.resolve(LOGIN_PATH)
            .expect("table construction guarantees a login route")
    }
}

/// Outcome of one guard evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Navigation proceeds to the requested target.
    Proceed,
    /// Target needs a credential that is absent.
    RedirectToLogin,
    /// Credentialed user heading to the login surface goes home instead.
    RedirectToHome,
}

/// Decides one navigation attempt.
///
/// # Semantics
/// - `requires_auth` and no credential: redirect to the login surface.
/// - public target that *is* the login surface while a credential is held:
///   redirect to the home surface.
/// - every other combination proceeds.
pub fn evaluate_guard(route: &RouteDescriptor, has_credential: bool) -> GuardDecision {
    if route.requires_auth && !has_credential {
        return GuardDecision::RedirectToLogin;
    }

    if !route.requires_auth && has_credential && route.path == LOGIN_PATH {
        return GuardDecision::RedirectToHome;
    }

    GuardDecision::Proceed
}

/// Resolves the page title for a settled navigation.
///
/// Routes without a title, and unmatched paths, use [`DEFAULT_TITLE`].
pub fn page_title(route: Option<&RouteDescriptor>) -> String {
    match route.and_then(|route| route.title.as_deref()) {
        Some(title) => format!("{title} - {DEFAULT_TITLE}"),
        None => DEFAULT_TITLE.to_string(),
    }
}

/// Result of one settled navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationOutcome {
    /// Guard decision applied to the attempt.
    pub decision: GuardDecision,
    /// Path the navigation settled on.
    pub path: String,
    /// Title resolved for the settled path.
    pub title: String,
}

/// Single-pass router over a validated table.
///
/// The guard runs exactly once per [`Router::navigate`] call; a redirect
/// settles directly on the redirect target without re-entering the guard,
/// which makes redirect loops impossible by construction.
#[derive(Debug)]
pub struct Router {
    table: RouteTable,
    current: Mutex<String>,
}

impl Router {
    /// Creates a router positioned on the home surface.
    pub fn new(table: RouteTable) -> Self {
        Self {
            table,
            current: Mutex::new(HOME_PATH.to_string()),
        }
    }

    /// Returns the path navigation last settled on.
    pub fn current_path(&self) -> String {
        self.current.lock().expect("router position lock").clone()
    }

    /// Returns the route table.
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Performs one navigation attempt.
    ///
    /// Unmatched paths fall back to the home surface before the guard runs,
    /// mirroring the console's catch-all route.
    pub fn navigate(&self, target: &str, has_credential: bool) -> NavigationOutcome {
        let route = self.table.resolve(target).unwrap_or_else(|| self.table.home());
        let decision = evaluate_guard(route, has_credential);
        let settled = match decision {
            GuardDecision::Proceed => route,
            GuardDecision::RedirectToLogin => self.table.login(),
            GuardDecision::RedirectToHome => self.table.home(),
        };

        *self.current.lock().expect("router position lock") = settled.path.clone();

        NavigationOutcome {
            decision,
            path: settled.path.clone(),
            title: page_title(Some(settled)),
        }
    }
}

/// Route table construction failures.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// Route paths must be absolute.
    #[error("route path must start with '/': {0}")]
    RelativePath(String),
    /// Route paths must be unique.
    #[error("duplicate route path: {0}")]
    DuplicatePath(String),
    /// The table must contain the named surface.
    #[error("route table is missing required surface {0}")]
    MissingSurface(&'static str),
}

#[cfg(test)]
mod tests {
    //! Unit tests for the guard decision table and router passes.

    use super::*;

    #[test]
    fn guard_redirects_protected_route_without_credential() {
        let route = RouteDescriptor::new("/admin", "Admin");
        assert_eq!(evaluate_guard(&route, false), GuardDecision::RedirectToLogin);
        assert_eq!(evaluate_guard(&route, true), GuardDecision::Proceed);
    }

    #[test]
    fn guard_sends_credentialed_user_away_from_login() {
        let login = RouteDescriptor::new(LOGIN_PATH, "Login").public();
        assert_eq!(evaluate_guard(&login, true), GuardDecision::RedirectToHome);
        assert_eq!(evaluate_guard(&login, false), GuardDecision::Proceed);
    }

    #[test]
    fn guard_lets_public_routes_through() {
        let home = RouteDescriptor::new(HOME_PATH, "Home").public();
        assert_eq!(evaluate_guard(&home, false), GuardDecision::Proceed);
        assert_eq!(evaluate_guard(&home, true), GuardDecision::Proceed);
    }

    #[test]
    fn title_falls_back_to_application_default() {
        let untitled = RouteDescriptor::new("/plain", "Plain");
        assert_eq!(page_title(Some(&untitled)), DEFAULT_TITLE);
        assert_eq!(page_title(None), DEFAULT_TITLE);

        let titled = RouteDescriptor::new("/task", "Task").with_title("Tasks");
        assert_eq!(page_title(Some(&titled)), "Tasks - DevDesk");
    }

    #[test]
    fn router_settles_redirects_in_a_single_pass() {
        let table = RouteTable::new(vec![
            RouteDescriptor::new(HOME_PATH, "Home").with_title("Workspace").public(),
            RouteDescriptor::new(LOGIN_PATH, "Login").with_title("Login").public(),
            RouteDescriptor::new("/settings", "Settings").with_title("Settings"),
        ])
        .expect("table should build");
        let router = Router::new(table);

        let outcome = router.navigate("/settings", false);
        assert_eq!(outcome.decision, GuardDecision::RedirectToLogin);
        assert_eq!(outcome.path, LOGIN_PATH);
        assert_eq!(router.current_path(), LOGIN_PATH);

        let outcome = router.navigate(LOGIN_PATH, true);
        assert_eq!(outcome.decision, GuardDecision::RedirectToHome);
        assert_eq!(outcome.path, HOME_PATH);
        assert_eq!(outcome.title, "Workspace - DevDesk");
    }

    #[test]
    fn unknown_paths_fall_back_to_home() {
        let router = Router::new(RouteTable::platform_default());
        let outcome = router.navigate("/no-such-surface", false);
        assert_eq!(outcome.path, HOME_PATH);
        assert_eq!(outcome.decision, GuardDecision::Proceed);
    }

    #[test]
    fn table_rejects_duplicates_and_relative_paths() {
        assert!(matches!(
            RouteTable::new(vec![
                RouteDescriptor::new(HOME_PATH, "Home").public(),
                RouteDescriptor::new(LOGIN_PATH, "Login").public(),
                RouteDescriptor::new(LOGIN_PATH, "LoginAgain").public(),
            ]),
            Err(RoutingError::DuplicatePath(_))
        ));
        assert!(matches!(
            RouteTable::new(vec![RouteDescriptor::new("relative", "Broken")]),
            Err(RoutingError::RelativePath(_))
        ));
        assert!(matches!(
            RouteTable::new(vec![RouteDescriptor::new(HOME_PATH, "Home").public()]),
            Err(RoutingError::MissingSurface(LOGIN_PATH))
        ));
    }
}
