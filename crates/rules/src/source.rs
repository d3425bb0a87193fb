//! Rule-artifact source: where rule definitions come from.

use std::fs;
use std::path::PathBuf;

use crate::contract::RuleError;

/// Enumerates rule identifiers in a directory-like namespace and returns
/// raw definition bytes. A source makes no ordering promise — execution
/// order is decided by [`RuleSet`](crate::set::RuleSet).
pub trait RuleSource: Send + Sync {
    fn list(&self) -> Result<Vec<String>, RuleError>;

    fn fetch(&self, id: &str) -> Result<Vec<u8>, RuleError>;
}

/// Reads `*.json` definition files from a directory. The identifier of a
/// rule definition is the file stem.
#[derive(Debug, Clone)]
pub struct DirRuleSource {
    dir: PathBuf,
}

impl DirRuleSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl RuleSource for DirRuleSource {
    fn list(&self) -> Result<Vec<String>, RuleError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&self.dir)
            .map_err(|e| RuleError::Definition(format!("cannot read rules dir: {}", e)))?;

        let mut ids = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|e| RuleError::Definition(format!("cannot read rules dir: {}", e)))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
        Ok(ids)
    }

    fn fetch(&self, id: &str) -> Result<Vec<u8>, RuleError> {
        let path = self.dir.join(format!("{}.json", id));
        fs::read(&path)
            .map_err(|e| RuleError::Definition(format!("cannot read '{}': {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_json_files_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.json"), b"{}").unwrap();
        fs::write(dir.path().join("b.json"), b"{}").unwrap();
        fs::write(dir.path().join("notes.txt"), b"skip me").unwrap();

        let source = DirRuleSource::new(dir.path());
        let mut ids = source.list().unwrap();
        ids.sort();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn missing_dir_is_an_empty_namespace() {
        let source = DirRuleSource::new("/nonexistent/rules");
        assert!(source.list().unwrap().is_empty());
    }

    #[test]
    fn fetch_returns_raw_bytes() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("r.json"), br#"{"name":"r"}"#).unwrap();

        let source = DirRuleSource::new(dir.path());
        assert_eq!(source.fetch("r").unwrap(), br#"{"name":"r"}"#.to_vec());
        assert!(source.fetch("absent").is_err());
    }
}
