//! Route configuration.

/// Names of the route groups and leaf screens the reconciler inspects.
///
/// All routing decisions are computed against these values; nothing else in
/// the crate hardcodes a path.
#[derive(Debug, Clone)]
pub struct RouteConfig {
    /// First path segment of the auth group, e.g. `(auth)`.
    pub auth_group: String,
    /// First path segment of the main app (tab bar) group, e.g. `(tabs)`.
    pub tabs_group: String,
    /// Leaf name of the login screen inside the auth group.
    pub login_leaf: String,
    /// Leaf name of the registration screen inside the auth group.
    pub register_leaf: String,
    /// Leaf name of the house-setup screen inside the auth group.
    pub house_setup_leaf: String,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            auth_group: "(auth)".to_string(),
            tabs_group: "(tabs)".to_string(),
            login_leaf: "login".to_string(),
            register_leaf: "register".to_string(),
            house_setup_leaf: "house-setup".to_string(),
        }
    }
}

impl RouteConfig {
    /// Path of the login screen.
    pub fn login_path(&self) -> String {
        format!("/{}/{}", self.auth_group, self.login_leaf)
    }

    /// Path of the house-setup screen.
    pub fn house_setup_path(&self) -> String {
        format!("/{}/{}", self.auth_group, self.house_setup_leaf)
    }

    /// Landing path of the main app.
    pub fn landing_path(&self) -> String {
        format!("/{}/", self.tabs_group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_paths() {
        let routes = RouteConfig::default();
        assert_eq!(routes.login_path(), "/(auth)/login");
        assert_eq!(routes.house_setup_path(), "/(auth)/house-setup");
        assert_eq!(routes.landing_path(), "/(tabs)/");
    }
}
