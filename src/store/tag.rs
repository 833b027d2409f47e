//! Model tags: `name[:version]`

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, bail, Result};

/// Version alias that follows the most recent export
pub const LATEST: &str = "latest";

/// Address of an artifact in the store
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelTag {
    pub name: String,
    pub version: String,
}

impl ModelTag {
    pub fn new(name: &str, version: &str) -> Result<Self> {
        validate_component("model name", name)?;
        validate_component("model version", version)?;
        Ok(Self {
            name: name.to_string(),
            version: version.to_string(),
        })
    }

    /// Tag pointing at the newest version of `name`
    pub fn latest(name: &str) -> Result<Self> {
        Self::new(name, LATEST)
    }

    pub fn is_latest(&self) -> bool {
        self.version == LATEST
    }
}

impl FromStr for ModelTag {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once(':') {
            Some((name, version)) => Self::new(name, version),
            None => Self::latest(s),
        }
    }
}

impl fmt::Display for ModelTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.version)
    }
}

/// Names and versions become directory names, so keep them to a safe alphabet.
pub(crate) fn validate_component(what: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        bail!("{} must not be empty", what);
    }
    if value.starts_with('.') {
        return Err(anyhow!("{} must not start with '.': {:?}", what, value));
    }
    if let Some(c) = value
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')))
    {
        bail!("invalid character {:?} in {}: {:?}", c, what, value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults_to_latest() {
        let tag: ModelTag = "onnx_resnet50".parse().unwrap();
        assert_eq!(tag.name, "onnx_resnet50");
        assert!(tag.is_latest());
        assert_eq!(tag.to_string(), "onnx_resnet50:latest");
    }

    #[test]
    fn test_parse_explicit_version() {
        let tag: ModelTag = "onnx_resnet50:20240101120000-1a2b3c4d".parse().unwrap();
        assert_eq!(tag.version, "20240101120000-1a2b3c4d");
        assert!(!tag.is_latest());
    }

    #[test]
    fn test_parse_rejects_bad_components() {
        assert!("".parse::<ModelTag>().is_err());
        assert!("model:".parse::<ModelTag>().is_err());
        assert!(":v1".parse::<ModelTag>().is_err());
        assert!("../etc:latest".parse::<ModelTag>().is_err());
        assert!("a/b:latest".parse::<ModelTag>().is_err());
        assert!("name:v1:extra".parse::<ModelTag>().is_err());
        assert!(".hidden".parse::<ModelTag>().is_err());
    }
}
