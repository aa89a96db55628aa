//! Owning store for the panel tree with write-through persistence.
//!
//! All mutation goes through validated methods on [`ConfigStore`]; there is
//! no direct field assignment from outside. Every successful mutation
//! rewrites the full tree as one atomic snapshot before returning, so the
//! document on disk never reflects a half-applied change.

use super::error::ConfigError;
use super::model::{Endpoint, Function, FunctionKind, Location};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

const CONFIG_DIR: &str = ".config/switchboard";
const PANEL_FILE: &str = "panel.json";

/// Typed submission form for a new function.
///
/// Collected by whatever input mechanism the front-end prefers, then handed
/// to [`ConfigStore::add_function`] in one piece. Validation happens on
/// submit, before any state is touched.
#[derive(Clone, Debug)]
pub struct FunctionDraft {
    pub name: String,
    pub topic_suffix: String,
    pub auth_token: String,
    pub kind: FunctionKind,
}

impl FunctionDraft {
    /// Checks required fields. The auth token is opaque and may be empty.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::MissingField("function name"));
        }
        if self.topic_suffix.trim().is_empty() {
            return Err(ConfigError::MissingField("topic suffix"));
        }
        match &self.kind {
            FunctionKind::Push { value } if value.is_empty() => {
                Err(ConfigError::MissingField("push value"))
            }
            FunctionKind::Toggle { on_value, .. } if on_value.is_empty() => {
                Err(ConfigError::MissingField("toggle on-value"))
            }
            FunctionKind::Toggle { off_value, .. } if off_value.is_empty() => {
                Err(ConfigError::MissingField("toggle off-value"))
            }
            _ => Ok(()),
        }
    }

    fn build(self) -> Function {
        Function {
            name: self.name,
            topic_suffix: self.topic_suffix,
            auth_token: self.auth_token,
            kind: self.kind,
        }
    }
}

/// Owns the in-memory tree and the document backing it.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    tree: Vec<Location>,
}

impl ConfigStore {
    /// Opens the store at `path`, reading the persisted document if present.
    ///
    /// A missing document is not an error: the panel simply has no
    /// configuration yet and the store opens empty. A document that exists
    /// but does not parse is reported as [`ConfigError::Corrupt`] and left
    /// on disk untouched.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let tree = match fs::read_to_string(&path) {
            Ok(content) => {
                let tree: Vec<Location> = serde_json::from_str(&content)?;
                debug!("Loaded panel document with {} locations", tree.len());
                tree
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No panel document at {}, starting empty", path.display());
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, tree })
    }

    /// Default document location under the user's config directory.
    pub fn default_path() -> PathBuf {
        let mut path = home_dir();
        path.push(CONFIG_DIR);
        path.push(PANEL_FILE);
        path
    }

    pub fn tree(&self) -> &[Location] {
        &self.tree
    }

    pub fn location(&self, index: usize) -> Option<&Location> {
        self.tree.get(index)
    }

    pub fn endpoint(&self, location: usize, endpoint: usize) -> Option<&Endpoint> {
        self.tree.get(location)?.endpoints.get(endpoint)
    }

    pub fn add_location(&mut self, name: &str) -> Result<(), ConfigError> {
        if name.trim().is_empty() {
            return Err(ConfigError::MissingField("location name"));
        }
        self.tree.push(Location {
            name: name.to_string(),
            endpoints: Vec::new(),
        });
        self.persist()?;
        info!("Added location: {}", name);
        Ok(())
    }

    pub fn add_endpoint(
        &mut self,
        location: usize,
        name: &str,
        identifier: &str,
    ) -> Result<(), ConfigError> {
        if name.trim().is_empty() {
            return Err(ConfigError::MissingField("endpoint name"));
        }
        if identifier.trim().is_empty() {
            return Err(ConfigError::MissingField("endpoint identifier"));
        }
        let parent = self.location_mut(location)?;
        parent.endpoints.push(Endpoint {
            name: name.to_string(),
            identifier: identifier.to_string(),
            functions: Vec::new(),
        });
        self.persist()?;
        info!("Added endpoint {} ({})", name, identifier);
        Ok(())
    }

    pub fn add_function(
        &mut self,
        location: usize,
        endpoint: usize,
        draft: FunctionDraft,
    ) -> Result<(), ConfigError> {
        draft.validate()?;
        let parent = self.endpoint_mut(location, endpoint)?;
        let function = draft.build();
        info!("Adding function {} to {}", function, parent.name);
        parent.functions.push(function);
        self.persist()?;
        Ok(())
    }

    /// Removes an endpoint together with all its functions.
    pub fn delete_endpoint(&mut self, location: usize, endpoint: usize) -> Result<(), ConfigError> {
        let parent = self.location_mut(location)?;
        if endpoint >= parent.endpoints.len() {
            return Err(ConfigError::IndexOutOfRange {
                entity: "endpoint",
                index: endpoint,
            });
        }
        let removed = parent.endpoints.remove(endpoint);
        self.persist()?;
        info!(
            "Deleted endpoint {} with {} functions",
            removed.name,
            removed.functions.len()
        );
        Ok(())
    }

    pub fn delete_function(
        &mut self,
        location: usize,
        endpoint: usize,
        function: usize,
    ) -> Result<(), ConfigError> {
        let parent = self.endpoint_mut(location, endpoint)?;
        if function >= parent.functions.len() {
            return Err(ConfigError::IndexOutOfRange {
                entity: "function",
                index: function,
            });
        }
        let removed = parent.functions.remove(function);
        self.persist()?;
        info!("Deleted function {}", removed.name);
        Ok(())
    }

    fn location_mut(&mut self, index: usize) -> Result<&mut Location, ConfigError> {
        self.tree
            .get_mut(index)
            .ok_or(ConfigError::IndexOutOfRange {
                entity: "location",
                index,
            })
    }

    fn endpoint_mut(
        &mut self,
        location: usize,
        endpoint: usize,
    ) -> Result<&mut Endpoint, ConfigError> {
        self.location_mut(location)?
            .endpoints
            .get_mut(endpoint)
            .ok_or(ConfigError::IndexOutOfRange {
                entity: "endpoint",
                index: endpoint,
            })
    }

    /// Writes the full tree as one snapshot: serialize, write to a sibling
    /// temp file, rename over the document. Rename within one directory is
    /// atomic, so readers see either the previous or the new tree.
    fn persist(&self) -> Result<(), ConfigError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let content = serde_json::to_string_pretty(&self.tree)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content)?;
        fs::rename(&tmp_path, &self.path)?;
        debug!("Persisted panel document to {}", self.path.display());
        Ok(())
    }
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| {
        warn!("Could not determine home directory, using current directory");
        PathBuf::from(".")
    })
}

/// Config directory shared with the broker settings file.
pub(crate) fn config_dir() -> PathBuf {
    let mut path = home_dir();
    path.push(CONFIG_DIR);
    path
}
