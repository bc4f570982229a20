use serde::Deserialize;
use std::fs;
use std::path::Path;

/// One text-transform case: `input` must come out as `expected`.
#[derive(Debug, Deserialize, Clone)]
pub struct TransformTest {
    pub name: String,
    pub description: String,
    pub input: String,
    pub expected: String,
}

impl TransformTest {
    /// Load a test fixture from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let test: TransformTest = toml::from_str(&content)?;
        Ok(test)
    }

    /// Load all test fixtures from a directory, sorted by file name
    pub fn load_from_directory<P: AsRef<Path>>(
        dir: P,
    ) -> Result<Vec<Self>, Box<dyn std::error::Error>> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) == Some("toml") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut tests = Vec::new();
        for path in paths {
            tests.push(
                Self::load_from_file(&path)
                    .map_err(|e| format!("failed to load {}: {}", path.display(), e))?,
            );
        }
        Ok(tests)
    }
}
