//! 사용자 설정
//!
//! `$BOKSL_ARCHIVER_CONFIG`가 있으면 그 파일을, 없으면
//! `<config_dir>/boksl-archiver/config.toml`을 읽습니다.

use crate::core::navigation::ViewMode;
use crate::models::operation::CompressionLevel;
use crate::utils::error::{ArchiverError, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const CONFIG_ENV: &str = "BOKSL_ARCHIVER_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 시작 보기 모드
    pub view_mode: ViewMode,
    /// 삭제 전 확인
    pub confirm_delete: bool,
    pub compression: CompressionLevel,
    /// 해제 시 기존 파일 덮어쓰기
    pub overwrite_on_extract: bool,
    /// 해제/새 압축 파일 기본 폴더
    pub default_dir: Option<PathBuf>,
    /// 색상 테마 이름 (dark, light, high_contrast)
    pub theme: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            view_mode: ViewMode::Tree,
            confirm_delete: true,
            compression: CompressionLevel::Normal,
            overwrite_on_extract: false,
            default_dir: None,
            theme: "dark".to_string(),
        }
    }
}

impl Config {
    /// 설정 파일 경로
    pub fn config_path() -> Option<PathBuf> {
        if let Ok(custom) = env::var(CONFIG_ENV) {
            let trimmed = custom.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        dirs::config_dir().map(|dir| dir.join("boksl-archiver").join("config.toml"))
    }

    /// 기본 위치에서 설정 로드 (파일이 없으면 기본값)
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        Self::parse(&content)
            .map_err(|e| ArchiverError::Config(format!("{}: {}", path.display(), e)))
    }

    fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp = tempdir().unwrap();
        let config = Config::load_from(&temp.path().join("none.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.confirm_delete);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = Config::parse("view_mode = \"flat\"\ncompression = \"fast\"\n").unwrap();
        assert_eq!(config.view_mode, ViewMode::Flat);
        assert_eq!(config.compression, CompressionLevel::Fast);
        assert!(config.confirm_delete);
        assert!(!config.overwrite_on_extract);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "view_mode = \"sideways\"").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ArchiverError::Config(_))
        ));
    }

    #[test]
    fn test_full_file_loads_every_key() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            "view_mode = \"flat\"\nconfirm_delete = false\ncompression = \"maximum\"\n\
             overwrite_on_extract = true\ndefault_dir = \"/tmp/out\"\ntheme = \"light\"\n",
        )
        .unwrap();
        let expected = Config {
            view_mode: ViewMode::Flat,
            confirm_delete: false,
            compression: CompressionLevel::Maximum,
            overwrite_on_extract: true,
            default_dir: Some(PathBuf::from("/tmp/out")),
            theme: "light".to_string(),
        };
        assert_eq!(Config::load_from(&path).unwrap(), expected);
    }
}
