use crate::core::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::Path;

/// Writes report files under a base directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<String> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        // fs::write 會覆蓋同名檔案
        fs::write(&full_path, data)?;
        Ok(full_path.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_directory_and_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("reports");
        let storage = LocalStorage::new(base.to_str().unwrap().to_string());

        storage.write_file("a.csv", b"first,longer\n").await.unwrap();
        let written = storage.write_file("a.csv", b"x\n").await.unwrap();

        assert_eq!(std::fs::read_to_string(&written).unwrap(), "x\n");
        assert!(written.ends_with("a.csv"));
    }
}
