use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;
use crate::templates::DEFAULT_TEMPLATE;

/// A named layout + field configuration. `layout` and `fields` are kept
/// exactly as submitted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedConfig {
    pub id: u64,
    pub name: String,
    pub layout: Value,
    pub fields: Value,
    pub template_key: String,
}

/// JSON-file backed store of [`SavedConfig`] records.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<SavedConfig>, Error> {
        let data = match std::fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::Io(e)),
        };
        let records: Vec<SavedConfig> = serde_json::from_slice(&data)?;
        log::debug!("Config store: read {} record(s) from {}", records.len(), self.path.display());
        Ok(records)
    }

    /// All saved configurations, newest first.
    pub fn list(&self) -> Result<Vec<SavedConfig>, Error> {
        let mut records = self.load()?;
        records.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(records)
    }

    pub fn save(
        &self,
        name: &str,
        layout: Value,
        fields: Value,
        template_key: Option<&str>,
    ) -> Result<SavedConfig, Error> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Store("a configuration needs a name".into()));
        }
        if layout.is_null() || fields.is_null() {
            return Err(Error::Store("layout and fields are required".into()));
        }

        let mut records = self.load()?;
        let record = SavedConfig {
            id: records.iter().map(|r| r.id).max().unwrap_or(0) + 1,
            name: name.to_string(),
            layout,
            fields,
            template_key: template_key
                .filter(|k| !k.is_empty())
                .unwrap_or(DEFAULT_TEMPLATE)
                .to_string(),
        };
        records.push(record.clone());

        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&self.path, serde_json::to_vec_pretty(&records)?)?;
        log::debug!("Config store: saved {:?} as id {}", record.name, record.id);
        Ok(record)
    }
}
