use std::fmt;

/// Scheme prefix of a local, file-backed store.
pub const URL_SCHEME: &str = "plocal:";

/// Built-in account every store accepts.
pub const DEFAULT_USERNAME: &str = "admin";
pub const DEFAULT_PASSWORD: &str = "admin";

/// Everything the embedded store needs to open a database
///
/// Similar to a connection string: `plocal:<directory> <user> <password>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    /// Store directory, always ending with a path separator
    pub directory: String,

    /// Username for authentication
    pub username: String,

    /// Password for authentication
    pub password: String,
}

impl ConnectionDescriptor {
    /// Descriptor for `directory` with the default credentials
    pub fn new(directory: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            username: DEFAULT_USERNAME.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
        }
    }

    /// Set the username
    pub fn username(mut self, username: &str) -> Self {
        self.username = username.to_string();
        self
    }

    /// Set the password
    pub fn password(mut self, password: &str) -> Self {
        self.password = password.to_string();
        self
    }

    /// `plocal:<directory>`
    pub fn url(&self) -> String {
        format!("{}{}", URL_SCHEME, self.directory)
    }

    /// Full connection string including credentials
    pub fn connection_string(&self) -> String {
        format!("{} {} {}", self.url(), self.username, self.password)
    }

    /// Parse from a connection string
    ///
    /// Format: `plocal:<directory>` or `plocal:<directory> <user> <password>`.
    /// Credentials are taken from the right, so the directory may contain
    /// spaces when credentials are given.
    pub fn parse(s: &str) -> Result<Self, String> {
        let body = s
            .trim()
            .strip_prefix(URL_SCHEME)
            .ok_or_else(|| format!("Connection string must start with '{}'", URL_SCHEME))?;

        let (directory, credentials) = match body.rsplit_once(' ') {
            Some((rest, password)) => match rest.rsplit_once(' ') {
                Some((directory, username)) => (directory, Some((username, password))),
                None => return Err("Invalid credentials format".to_string()),
            },
            None => (body, None),
        };

        if directory.is_empty() {
            return Err("Connection string has no directory".to_string());
        }

        let descriptor = Self::new(directory);
        Ok(match credentials {
            Some((username, password)) => descriptor.username(username).password(password),
            None => descriptor,
        })
    }
}

impl fmt::Display for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}
