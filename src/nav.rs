//! Navigation location model and the navigator seam.

use crate::config::RouteConfig;

/// The current screen location as ordered path segments.
///
/// Treated as opaque beyond the first two segments: the group marker and the
/// leaf screen name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationLocation {
    segments: Vec<String>,
}

impl NavigationLocation {
    pub fn new(segments: Vec<String>) -> Self {
        Self { segments }
    }

    /// Parse a `/`-separated path. Empty segments (leading, trailing, or
    /// doubled slashes) are dropped, so `/(tabs)/` and `/(tabs)` compare
    /// equal.
    pub fn from_path(path: &str) -> Self {
        Self {
            segments: path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        }
    }

    /// Route group marker, i.e. the first segment.
    pub fn group(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }

    /// Leaf screen name, i.e. the second segment.
    pub fn leaf(&self) -> Option<&str> {
        self.segments.get(1).map(String::as_str)
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Render back to a path string.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }

    /// Whether this location already is the given path, compared segment-wise
    /// so spelling differences (trailing slash) do not trigger redirects.
    pub fn is_at(&self, path: &str) -> bool {
        self.segments == NavigationLocation::from_path(path).segments
    }
}

impl std::fmt::Display for NavigationLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// The navigation seam the reconciler drives.
///
/// Implemented by the rendering layer; `replace` swaps the current screen
/// without growing history.
pub trait Navigator: Send + Sync {
    fn current_location(&self) -> NavigationLocation;
    fn replace(&self, path: &str);
}

/// Classification of a location against the configured route names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteClass {
    pub in_auth_group: bool,
    pub in_tabs_group: bool,
    pub on_house_setup: bool,
    pub on_login: bool,
    pub on_register: bool,
}

impl RouteClass {
    pub fn of(location: &NavigationLocation, routes: &RouteConfig) -> Self {
        let group = location.group();
        let leaf = location.leaf();
        Self {
            in_auth_group: group == Some(routes.auth_group.as_str()),
            in_tabs_group: group == Some(routes.tabs_group.as_str()),
            on_house_setup: leaf == Some(routes.house_setup_leaf.as_str()),
            on_login: leaf == Some(routes.login_leaf.as_str()),
            on_register: leaf == Some(routes.register_leaf.as_str()),
        }
    }
}
