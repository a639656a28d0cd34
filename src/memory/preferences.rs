use anyhow::{anyhow, Result};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::RwLock;

pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn all(&self) -> Result<BTreeMap<String, String>>;
}

#[derive(Default)]
pub struct InMemoryPreferences {
    values: RwLock<BTreeMap<String, String>>,
}

impl InMemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for InMemoryPreferences {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self
            .values
            .read()
            .map_err(|_| anyhow!("preferences lock poisoned"))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .write()
            .map_err(|_| anyhow!("preferences lock poisoned"))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn all(&self) -> Result<BTreeMap<String, String>> {
        let values = self
            .values
            .read()
            .map_err(|_| anyhow!("preferences lock poisoned"))?;
        Ok(values.clone())
    }
}

pub struct SledPreferences {
    tree: sled::Tree,
}

impl SledPreferences {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path)?;
        Self::from_db(&db)
    }

    pub fn from_db(db: &sled::Db) -> Result<Self> {
        Ok(Self {
            tree: db.open_tree("preferences")?,
        })
    }
}

impl PreferenceStore for SledPreferences {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .tree
            .get(key.as_bytes())?
            .map(|v| String::from_utf8_lossy(&v).to_string()))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.tree.insert(key.as_bytes(), value.as_bytes())?;
        Ok(())
    }

    fn all(&self) -> Result<BTreeMap<String, String>> {
        let mut out = BTreeMap::new();
        for item in self.tree.iter() {
            let (k, v) = item?;
            out.insert(
                String::from_utf8_lossy(&k).to_string(),
                String::from_utf8_lossy(&v).to_string(),
            );
        }
        Ok(out)
    }
}
