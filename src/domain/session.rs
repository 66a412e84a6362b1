use crate::error::{LedgerError, Result};

/// The single identity a bank currently acts for.
///
/// Holds at most one account name. Switching accounts takes an explicit
/// logout followed by a login.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Session {
    active: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identity(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Starts a session. Callers check that `name` is a registered account.
    pub fn login(&mut self, name: &str) -> Result<()> {
        if let Some(active) = &self.active {
            return Err(LedgerError::AlreadyLoggedIn(active.clone()));
        }
        self.active = Some(name.to_string());
        Ok(())
    }

    pub fn logout(&mut self, name: &str) -> Result<()> {
        self.require(name)?;
        self.active = None;
        Ok(())
    }

    /// Fails unless `name` is the active identity.
    pub fn require(&self, name: &str) -> Result<()> {
        match &self.active {
            None => Err(LedgerError::NotLoggedIn),
            Some(active) if active != name => Err(LedgerError::WrongAccount {
                active: active.clone(),
                requested: name.to_string(),
            }),
            Some(_) => Ok(()),
        }
    }
}
