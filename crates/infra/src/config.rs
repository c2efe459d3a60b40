//! Configuration loading and representation.

use tabsettle_core::DEFAULT_GROUP_ID_SALT;

/// Environment variable overriding [`DirectoryConfig::group_id_salt`].
pub const GROUP_ID_SALT_ENV: &str = "TABSETTLE_GROUP_ID_SALT";

/// Group directory settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryConfig {
    /// Salt mixed into every derived group id. Changing it changes every id,
    /// so it must stay fixed for the lifetime of a directory.
    pub group_id_salt: String,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            group_id_salt: DEFAULT_GROUP_ID_SALT.to_string(),
        }
    }
}

impl DirectoryConfig {
    /// Read settings from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let group_id_salt = lookup(GROUP_ID_SALT_ENV)
            .filter(|salt| !salt.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GROUP_ID_SALT.to_string());

        Self { group_id_salt }
    }
}
