//! Single-document JSON files.
//!
//! Each slot holds one pretty-printed JSON document that is always replaced
//! as a whole. Writes go to a sibling temp file first and are renamed into
//! place so a reader never sees a half-written document.

use std::fs;
use std::io::{BufWriter, Write};
use std::marker::PhantomData;
use std::path::PathBuf;

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use super::StorageError;

/// A JSON document stored at a fixed path.
pub struct JsonFile<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T> JsonFile<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    fn ensure_dir(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    fn temp_path(&self) -> Result<PathBuf, StorageError> {
        let name = self
            .path
            .file_name()
            .ok_or_else(|| StorageError::InvalidPath(self.path.display().to_string()))?;
        let mut tmp = name.to_os_string();
        tmp.push(".tmp");
        Ok(self.path.with_file_name(tmp))
    }
}

impl<T: DeserializeOwned> JsonFile<T> {
    /// Read the document, `None` if the file does not exist.
    pub fn read(&self) -> Result<Option<T>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)?;
        let value = serde_json::from_str(&contents)?;
        debug!("Read {:?}", self.path);
        Ok(Some(value))
    }
}

impl<T: Serialize> JsonFile<T> {
    /// Replace the document.
    pub fn write(&self, value: &T) -> Result<(), StorageError> {
        self.ensure_dir()?;

        let tmp = self.temp_path()?;
        {
            let file = fs::File::create(&tmp)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.flush()?;
        }
        fs::rename(&tmp, &self.path)?;

        debug!("Wrote {:?}", self.path);
        Ok(())
    }
}
