/// The shared admin login. Admin login is disabled
/// as long as no password is configured.
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password: Option<String>,
}

impl Default for AdminCredentials {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: None,
        }
    }
}

impl AdminCredentials {
    pub fn new(username: &str, password: Option<&str>) -> Self {
        Self {
            username: username.to_string(),
            password: password.map(str::to_string),
        }
    }

    pub fn matches(&self, identifier: &str, secret: &str) -> bool {
        match &self.password {
            Some(password) => identifier == self.username && secret == password,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_credentials() {
        let admin = AdminCredentials::new("admin", Some("hunter2"));
        assert!(admin.matches("admin", "hunter2"));
        assert!(!admin.matches("admin", "hunter3"));
        assert!(!admin.matches("root", "hunter2"));
    }

    #[test]
    fn test_admin_login_disabled_without_password() {
        let admin = AdminCredentials::default();
        assert!(!admin.matches("admin", ""));
    }
}
