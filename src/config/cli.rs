use crate::core::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::Path;

/// 以本機目錄為根的檔案存取（預覽輸出使用）
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    /// 完整輸出路徑，供日誌顯示
    pub fn full_path(&self, path: &str) -> String {
        Path::new(&self.base_path).join(path).display().to_string()
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}
