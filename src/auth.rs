/// Supplies the signed-in identity, if any.
pub trait AuthProvider {
    fn token(&self) -> Option<&str>;
    fn username(&self) -> Option<&str>;

    fn is_signed_in(&self) -> bool {
        self.token().is_some_and(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticAuth {
    token: Option<String>,
    username: Option<String>,
}

impl StaticAuth {
    pub fn new(token: Option<String>, username: Option<String>) -> Self {
        Self { token, username }
    }

    #[cfg(test)]
    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl AuthProvider for StaticAuth {
    fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }
}

/// Header greeting, shown only when both a token and a user are known.
pub fn greeting(auth: &dyn AuthProvider) -> Option<String> {
    match (auth.is_signed_in(), auth.username()) {
        (true, Some(user)) => Some(format!("Hi {}!", user)),
        _ => None,
    }
}
