use crate::utils::error::{ReporterError, Result};
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const SYSTEM_CONFIG_PATH: &str = "/etc/atlas-reporter/config.toml";

/// `config.toml` contents. Every section and key is optional; command line
/// flags fill in or override what the file leaves out.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub atlas: AtlasSection,
    #[serde(default)]
    pub mongo: MongoSection,
    #[serde(default)]
    pub gcp: GcpSection,
    #[serde(default)]
    pub output: OutputSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AtlasSection {
    pub endpoint: Option<String>,
    pub public_key: Option<String>,
    pub private_key: Option<String>,
    pub project_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MongoSection {
    pub connection_string: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GcpSection {
    pub project_id: Option<String>,
    pub access_token: Option<String>,
    pub secret_endpoint: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputSection {
    pub path: Option<String>,
}

impl FileConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ReporterError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Loads the first existing file out of `preferred` and the system-wide
    /// path. No file at all yields an empty configuration.
    pub fn discover(preferred: &Path) -> Result<Self> {
        let candidates = [preferred.to_path_buf(), PathBuf::from(SYSTEM_CONFIG_PATH)];
        match candidates.iter().find(|path| path.is_file()) {
            Some(path) => {
                tracing::debug!("Loading configuration from {}", path.display());
                Self::from_file(path)
            }
            None => {
                tracing::debug!("No configuration file found, using command line values only");
                Ok(Self::default())
            }
        }
    }
}

/// 替換環境變數 (例如 ${ATLAS_PRIVATE_KEY})，未設定的變數原樣保留
fn substitute_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ReporterError::config(e.to_string()))?;

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    });

    Ok(result.to_string())
}
