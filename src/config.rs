//! Configuration manager for unixdir.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const DEFAULT_PASSWD_PATH: &str = "/etc/passwd";
const DEFAULT_GROUP_PATH: &str = "/etc/group";

static ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9-]*$").unwrap());

fn validate_attribute(attribute: &str) -> std::result::Result<(), ValidationError> {
    if !ATTRIBUTE.is_match(attribute) {
        return Err(ValidationError::new("invalid_attribute"));
    }

    Ok(())
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Configuration {
    /// Related to the directory backend.
    #[validate(nested)]
    #[serde(default)]
    pub backend: Backend,
    #[serde(skip)]
    path: PathBuf,
}

/// Directory backend configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Backend {
    /// DN every entry lives under, e.g. `dc=example,dc=com`.
    #[validate(length(min = 1, message = "\"base_dn\" must not be empty."))]
    pub base_dn: String,
    /// Naming attribute of user entries.
    #[validate(custom(
        function = "validate_attribute",
        message = "\"name_format\" must be an attribute name."
    ))]
    pub name_format: String,
    /// Naming attribute of group entries.
    #[validate(custom(
        function = "validate_attribute",
        message = "\"group_format\" must be an attribute name."
    ))]
    pub group_format: String,
    /// Members of this group are granted search on every object.
    pub group_with_search_capability: Option<String>,
    /// Location of the user database.
    pub passwd: PathBuf,
    /// Location of the group database.
    pub group: PathBuf,
    /// PAM service; empty selects the host default policy.
    pub pam_service: String,
}

impl Default for Backend {
    fn default() -> Self {
        Self {
            base_dn: String::default(),
            name_format: "cn".into(),
            group_format: "ou".into(),
            group_with_search_capability: None,
            passwd: PathBuf::from(DEFAULT_PASSWD_PATH),
            group: PathBuf::from(DEFAULT_GROUP_PATH),
            pam_service: String::default(),
        }
    }
}

impl Configuration {
    pub fn path(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    /// Reads the `config.yaml` file from the specified path or the default
    /// location.
    pub fn read(self) -> Result<Self> {
        let file_path = if self.path.is_file() {
            &self.path
        } else {
            &Path::new(DEFAULT_CONFIG_PATH).to_path_buf()
        };

        match File::open(file_path) {
            Ok(file) => {
                let config: Configuration = serde_yaml::from_reader(file)?;
                config.validate()?;
                Ok(config)
            },
            Err(err) => {
                tracing::error!(error = %err, path = ?file_path, "configuration file not found");
                Ok(Self::default())
            },
        }
    }

    /// Parse a configuration from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self> {
        let config: Configuration = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }
}
