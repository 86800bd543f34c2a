//! File format detection and (de)serialization by extension.

use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{LoadError, Result};

/// Serialization format of a model or configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Yaml,
}

impl FileFormat {
    /// Picks the format from the file extension (`.json`, `.yaml`, `.yml`).
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::UnsupportedFormat`] for any other extension.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_model_loader::FileFormat;
    ///
    /// assert_eq!(FileFormat::from_path("model.yml").unwrap(), FileFormat::Yaml);
    /// assert!(FileFormat::from_path("model.toml").is_err());
    /// ```
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            _ => Err(LoadError::UnsupportedFormat(path.display().to_string())),
        }
    }

    pub fn parse<T: DeserializeOwned>(self, text: &str) -> Result<T> {
        Ok(match self {
            Self::Json => serde_json::from_str(text)?,
            Self::Yaml => serde_yaml::from_str(text)?,
        })
    }
}

pub(crate) fn read<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format = FileFormat::from_path(path)?;
    let reader = BufReader::new(std::fs::File::open(path)?);
    Ok(match format {
        FileFormat::Json => serde_json::from_reader(reader)?,
        FileFormat::Yaml => serde_yaml::from_reader(reader)?,
    })
}

pub(crate) fn write<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let format = FileFormat::from_path(path)?;
    let mut writer = BufWriter::new(std::fs::File::create(path)?);
    match format {
        FileFormat::Json => serde_json::to_writer_pretty(&mut writer, value)?,
        FileFormat::Yaml => serde_yaml::to_writer(&mut writer, value)?,
    }
    writer.flush()?;
    Ok(())
}
