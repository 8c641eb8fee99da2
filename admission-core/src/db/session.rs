/// Supplies the signed-in identity. Sign-in itself happens elsewhere.
pub trait SessionProvider: Send + Sync {
    /// Key under which the application is written, if anyone is signed in.
    fn current_user_id(&self) -> Option<String>;

    /// Attribution stored alongside the record. Defaults to the user id.
    fn submitted_by(&self) -> Option<String> {
        self.current_user_id()
    }
}

/// A fixed identity, for tests and the terminal driver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticSession {
    user_id: Option<String>,
    display_name: Option<String>,
}

impl StaticSession {
    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            display_name: None,
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_display_name(
        mut self,
        name: impl Into<String>,
    ) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

impl SessionProvider for StaticSession {
    fn current_user_id(&self) -> Option<String> {
        self.user_id.clone()
    }

    fn submitted_by(&self) -> Option<String> {
        self.display_name.clone().or_else(|| self.current_user_id())
    }
}
