//! Community configuration consumed by the wallet-link codec

use crate::error::{Error, Result};
use std::collections::HashMap;

/// Configuration for a community's burner wallets.
///
/// The burner-wallet password is a single shared, application-level secret:
/// these wallets are generated custodially and their at-rest encryption
/// exists to survive transit inside a URL fragment. The password is injected
/// here explicitly so it can be swapped per test or per deployment.
#[derive(Debug, Clone)]
pub struct CommunityConfig {
    /// Shared password protecting burner-wallet keystores
    burner_password: String,

    /// Account-factory address used when no alias matches
    primary_account_factory: String,

    /// Alias -> account-factory address lookup table
    account_factories: HashMap<String, String>,
}

impl CommunityConfig {
    /// Creates a new CommunityConfig with the shared password and the
    /// community's primary account-factory address
    pub fn new(burner_password: impl Into<String>, primary_account_factory: impl Into<String>) -> Self {
        Self {
            burner_password: burner_password.into(),
            primary_account_factory: primary_account_factory.into(),
            account_factories: HashMap::new(),
        }
    }

    /// Registers an account-factory address under a community alias
    pub fn with_account_factory(
        mut self,
        alias: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        self.account_factories.insert(alias.into(), address.into());
        self
    }

    /// Returns the shared burner-wallet password.
    ///
    /// Fails loudly when the password is unset so a missing secret can never
    /// silently derive a wrong key.
    pub fn burner_password(&self) -> Result<&str> {
        if self.burner_password.is_empty() {
            return Err(Error::Config(
                "burner wallet password is not set".to_string(),
            ));
        }
        Ok(&self.burner_password)
    }

    /// Resolves the account-factory address for a community alias, falling
    /// back to the primary factory when the alias is unrecognized
    pub fn account_factory(&self, alias: &str) -> &str {
        self.account_factories
            .get(alias)
            .map(String::as_str)
            .unwrap_or(&self.primary_account_factory)
    }

    /// Returns the community's primary account-factory address
    pub fn primary_account_factory(&self) -> &str {
        &self.primary_account_factory
    }
}
