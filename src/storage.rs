use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{errors::StorageError, record::Record};

/// Where changed products end up.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn save(&self, records: &[Record]) -> Result<(), StorageError>;

    async fn load(&self) -> Result<Vec<Record>, StorageError>;
}

/// A pretty-printed JSON array of products on disk.
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ProductStore for JsonFileStore {
    /// Upserts by product id, keeping products saved on earlier runs.
    async fn save(&self, records: &[Record]) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;

        let mut products = self.load().await?;
        let mut positions: HashMap<String, usize> = products
            .iter()
            .enumerate()
            .map(|(i, product)| (product.id.clone(), i))
            .collect();
        for record in records {
            match positions.get(&record.id) {
                Some(&i) => products[i] = record.clone(),
                None => {
                    positions.insert(record.id.clone(), products.len());
                    products.push(record.clone());
                }
            }
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(&products)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn load(&self) -> Result<Vec<Record>, StorageError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }
}
