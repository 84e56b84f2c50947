//! Deserialization with JSON-path context in error messages.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;

use crate::registry::Registry;

pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| {
        let path = err.path().to_string();
        anyhow!("at JSON path {path}: {}", err.into_inner())
    })
}

/// Load a pseudo-type registry from a `.json` file.
pub fn load_registry(path: impl AsRef<Path>) -> Result<Registry> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("reading registry file {}", path.display()))?;
    from_str_with_path(&source).with_context(|| format!("in registry file {}", path.display()))
}
