//! 문서 저장소 설정
//!
//! [`DocumentStoreConfig`]는 core의 [`StoreConfig`](bomvault_core::config::StoreConfig)를
//! 확장하여 저장소 고유 설정(SQLite 저널 모드, busy 대기 시간)을 추가합니다.
//!
//! # 사용 예시
//!
//! ```
//! use bomvault_store::DocumentStoreConfig;
//!
//! // 기본값으로 생성
//! let config = DocumentStoreConfig::default();
//! config.validate().unwrap();
//!
//! // 빌더로 생성
//! use bomvault_store::DocumentStoreConfigBuilder;
//!
//! let config = DocumentStoreConfigBuilder::new()
//!     .db_file(":memory:")
//!     .busy_timeout_ms(1000)
//!     .build()
//!     .unwrap();
//! ```

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use bomvault_core::config::{BomvaultConfig, MAX_SOURCE_SIZE_CAP};

use crate::error::StoreError;

/// 인메모리 데이터베이스를 나타내는 `db_file` 값
pub const IN_MEMORY_DB: &str = ":memory:";

/// SQLite 저널 모드
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum JournalMode {
    /// Write-Ahead Logging (기본값)
    #[default]
    Wal,
    /// 롤백 저널 삭제 방식
    Delete,
    /// 저널을 메모리에만 유지
    Memory,
}

impl JournalMode {
    /// `PRAGMA journal_mode`에 전달할 값을 반환합니다.
    pub fn as_pragma(&self) -> &'static str {
        match self {
            JournalMode::Wal => "WAL",
            JournalMode::Delete => "DELETE",
            JournalMode::Memory => "MEMORY",
        }
    }

    /// 문자열에서 저널 모드를 파싱합니다 (대소문자 무시).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "wal" => Some(JournalMode::Wal),
            "delete" => Some(JournalMode::Delete),
            "memory" => Some(JournalMode::Memory),
            _ => None,
        }
    }
}

impl std::fmt::Display for JournalMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JournalMode::Wal => write!(f, "wal"),
            JournalMode::Delete => write!(f, "delete"),
            JournalMode::Memory => write!(f, "memory"),
        }
    }
}

/// 문서 저장소 설정
///
/// core의 `StoreConfig`에서 파생되며, 모듈 고유 확장 필드를 포함합니다.
///
/// # 필드
///
/// - **db_file**: SQLite 파일 이름 또는 `":memory:"`
/// - **cache_dir**: 상대 `db_file`의 기준 디렉토리
/// - **max_source_size**: 수집 페이로드 최대 크기 (바이트)
/// - **max_nodes**: 문서당 최대 노드 수
/// - **journal_mode**: SQLite 저널 모드
/// - **busy_timeout_ms**: 잠금 대기 시간 (밀리초)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentStoreConfig {
    /// SQLite 파일 이름 또는 `":memory:"`
    pub db_file: String,
    /// 상대 `db_file`의 기준 디렉토리
    pub cache_dir: String,
    /// 수집 페이로드 최대 크기 (바이트)
    pub max_source_size: usize,
    /// 문서당 최대 노드 수
    pub max_nodes: usize,

    // --- 모듈 고유 확장 ---
    /// SQLite 저널 모드
    pub journal_mode: JournalMode,
    /// 잠금 대기 시간 (밀리초). 0이면 즉시 실패
    pub busy_timeout_ms: u64,
}

impl Default for DocumentStoreConfig {
    fn default() -> Self {
        Self {
            db_file: "bomvault.db".to_owned(),
            cache_dir: "/var/lib/bomvault".to_owned(),
            max_source_size: 50 * 1024 * 1024, // 50 MB
            max_nodes: 100_000,
            journal_mode: JournalMode::Wal,
            busy_timeout_ms: 5_000,
        }
    }
}

/// 설정 상한값 상수
const MAX_BUSY_TIMEOUT_MS: u64 = 600_000; // 10 minutes
const MAX_PATH_LEN: usize = 4096;

impl DocumentStoreConfig {
    /// core의 [`BomvaultConfig`]에서 저장소 설정을 생성합니다.
    ///
    /// core 설정에 없는 확장 필드는 기본값을 사용합니다.
    pub fn from_core(core: &BomvaultConfig) -> Self {
        Self {
            db_file: core.store.db_file.clone(),
            cache_dir: core.general.cache_dir.clone(),
            max_source_size: core.store.max_source_size,
            max_nodes: core.store.max_nodes,
            ..Self::default()
        }
    }

    /// 인메모리 데이터베이스 설정 여부를 반환합니다.
    pub fn is_in_memory(&self) -> bool {
        self.db_file == IN_MEMORY_DB
    }

    /// 최종 데이터베이스 파일 경로를 반환합니다.
    ///
    /// `db_file`이 절대 경로면 그대로, 상대 경로면 `cache_dir` 아래로
    /// 해석합니다. 인메모리 설정에서는 의미가 없습니다.
    pub fn db_path(&self) -> PathBuf {
        let file = Path::new(&self.db_file);
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            Path::new(&self.cache_dir).join(file)
        }
    }

    /// 설정 값의 유효성을 검증합니다.
    ///
    /// # 검증 규칙
    ///
    /// - `db_file`: 비어있으면 안 됨
    /// - `cache_dir`: 상대 `db_file` 사용 시 비어있으면 안 됨
    /// - `max_source_size`: 1-536870912 (512MB)
    /// - `max_nodes`: 1 이상
    /// - `busy_timeout_ms`: 0-600000
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.db_file.is_empty() {
            return Err(StoreError::Config {
                field: "db_file".to_owned(),
                reason: "db_file must not be empty".to_owned(),
            });
        }

        let relative = !self.is_in_memory() && !Path::new(&self.db_file).is_absolute();
        if relative && self.cache_dir.is_empty() {
            return Err(StoreError::Config {
                field: "cache_dir".to_owned(),
                reason: "cache_dir must not be empty when db_file is relative".to_owned(),
            });
        }

        if self.max_source_size == 0 || self.max_source_size > MAX_SOURCE_SIZE_CAP {
            return Err(StoreError::Config {
                field: "max_source_size".to_owned(),
                reason: format!("must be 1-{MAX_SOURCE_SIZE_CAP}"),
            });
        }

        if self.max_nodes == 0 {
            return Err(StoreError::Config {
                field: "max_nodes".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        if self.busy_timeout_ms > MAX_BUSY_TIMEOUT_MS {
            return Err(StoreError::Config {
                field: "busy_timeout_ms".to_owned(),
                reason: format!("must be 0-{MAX_BUSY_TIMEOUT_MS}"),
            });
        }

        // 경로 순회 방어: ".." 컴포넌트 및 경로 길이 검증
        for (field, value) in [("db_file", &self.db_file), ("cache_dir", &self.cache_dir)] {
            if Path::new(value)
                .components()
                .any(|c| c == Component::ParentDir)
            {
                return Err(StoreError::Config {
                    field: field.to_owned(),
                    reason: format!("'{value}' contains path traversal pattern '..'"),
                });
            }

            if value.len() > MAX_PATH_LEN {
                return Err(StoreError::Config {
                    field: field.to_owned(),
                    reason: format!("'{value}' exceeds maximum length {MAX_PATH_LEN}"),
                });
            }
        }

        Ok(())
    }
}

/// [`DocumentStoreConfig`] 빌더
///
/// 유연한 설정 구성 및 빌드 시 유효성 검증을 제공합니다.
#[derive(Default)]
pub struct DocumentStoreConfigBuilder {
    config: DocumentStoreConfig,
}

impl DocumentStoreConfigBuilder {
    /// 기본값을 가진 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 데이터베이스 파일 이름을 설정합니다.
    pub fn db_file(mut self, file: impl Into<String>) -> Self {
        self.config.db_file = file.into();
        self
    }

    /// 캐시 디렉토리를 설정합니다.
    pub fn cache_dir(mut self, dir: impl Into<String>) -> Self {
        self.config.cache_dir = dir.into();
        self
    }

    /// 수집 페이로드 최대 크기(바이트)를 설정합니다.
    pub fn max_source_size(mut self, size: usize) -> Self {
        self.config.max_source_size = size;
        self
    }

    /// 문서당 최대 노드 수를 설정합니다.
    pub fn max_nodes(mut self, max: usize) -> Self {
        self.config.max_nodes = max;
        self
    }

    /// SQLite 저널 모드를 설정합니다.
    pub fn journal_mode(mut self, mode: JournalMode) -> Self {
        self.config.journal_mode = mode;
        self
    }

    /// 잠금 대기 시간(밀리초)을 설정합니다.
    pub fn busy_timeout_ms(mut self, ms: u64) -> Self {
        self.config.busy_timeout_ms = ms;
        self
    }

    /// 설정을 검증하고 빌드합니다.
    ///
    /// # Errors
    ///
    /// 유효성 검증 실패 시 `StoreError::Config` 반환
    pub fn build(self) -> Result<DocumentStoreConfig, StoreError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = DocumentStoreConfig::default();
        config.validate().unwrap();
    }

    #[test]
    fn from_core_preserves_values() {
        let mut core = BomvaultConfig::default();
        core.general.cache_dir = "/opt/bomvault".to_owned();
        core.store.db_file = "cache.db".to_owned();
        core.store.max_source_size = 1024;
        core.store.max_nodes = 500;

        let config = DocumentStoreConfig::from_core(&core);
        assert_eq!(config.db_file, "cache.db");
        assert_eq!(config.cache_dir, "/opt/bomvault");
        assert_eq!(config.max_source_size, 1024);
        assert_eq!(config.max_nodes, 500);
        // extended fields use defaults
        assert_eq!(config.journal_mode, JournalMode::Wal);
        assert_eq!(config.busy_timeout_ms, 5_000);
    }

    #[test]
    fn journal_mode_pragma_values() {
        assert_eq!(JournalMode::Wal.as_pragma(), "WAL");
        assert_eq!(JournalMode::Delete.as_pragma(), "DELETE");
        assert_eq!(JournalMode::Memory.as_pragma(), "MEMORY");
    }

    #[test]
    fn journal_mode_from_str_loose() {
        assert_eq!(JournalMode::from_str_loose("WAL"), Some(JournalMode::Wal));
        assert_eq!(
            JournalMode::from_str_loose(" delete "),
            Some(JournalMode::Delete)
        );
        assert_eq!(
            JournalMode::from_str_loose("memory"),
            Some(JournalMode::Memory)
        );
        assert_eq!(JournalMode::from_str_loose("truncate"), None);
    }

    #[test]
    fn db_path_joins_relative_file_with_cache_dir() {
        let config = DocumentStoreConfig {
            db_file: "cache.db".to_owned(),
            cache_dir: "/var/lib/bomvault".to_owned(),
            ..Default::default()
        };
        assert_eq!(config.db_path(), PathBuf::from("/var/lib/bomvault/cache.db"));
    }

    #[test]
    fn db_path_keeps_absolute_file() {
        let config = DocumentStoreConfig {
            db_file: "/tmp/other.db".to_owned(),
            ..Default::default()
        };
        assert_eq!(config.db_path(), PathBuf::from("/tmp/other.db"));
    }

    #[test]
    fn in_memory_marker_is_detected() {
        let config = DocumentStoreConfig {
            db_file: IN_MEMORY_DB.to_owned(),
            ..Default::default()
        };
        assert!(config.is_in_memory());
        config.validate().unwrap();
    }

    #[test]
    fn validate_rejects_empty_db_file() {
        let config = DocumentStoreConfig {
            db_file: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_cache_dir_with_relative_db_file() {
        let config = DocumentStoreConfig {
            db_file: "cache.db".to_owned(),
            cache_dir: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_accepts_empty_cache_dir_with_absolute_db_file() {
        let config = DocumentStoreConfig {
            db_file: "/tmp/bomvault.db".to_owned(),
            cache_dir: String::new(),
            ..Default::default()
        };
        config.validate().unwrap();
    }

    #[test]
    fn validate_rejects_zero_max_source_size() {
        let config = DocumentStoreConfig {
            max_source_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_oversized_max_source_size() {
        let config = DocumentStoreConfig {
            max_source_size: MAX_SOURCE_SIZE_CAP + 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_max_nodes() {
        let config = DocumentStoreConfig {
            max_nodes: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_too_large_busy_timeout() {
        let config = DocumentStoreConfig {
            busy_timeout_ms: 700_000,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_path_traversal_in_db_file() {
        let config = DocumentStoreConfig {
            db_file: "../outside.db".to_owned(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn builder_creates_valid_config() {
        let config = DocumentStoreConfigBuilder::new()
            .db_file(":memory:")
            .max_nodes(10)
            .busy_timeout_ms(0)
            .build()
            .unwrap();
        assert!(config.is_in_memory());
        assert_eq!(config.max_nodes, 10);
        assert_eq!(config.busy_timeout_ms, 0);
    }

    #[test]
    fn builder_rejects_invalid_config() {
        let result = DocumentStoreConfigBuilder::new()
            .max_source_size(0) // invalid
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn builder_all_setters() {
        let config = DocumentStoreConfigBuilder::new()
            .db_file("sbom-cache.db")
            .cache_dir("/opt/bomvault")
            .max_source_size(1024 * 1024)
            .max_nodes(5_000)
            .journal_mode(JournalMode::Delete)
            .busy_timeout_ms(250)
            .build()
            .unwrap();

        assert_eq!(config.db_file, "sbom-cache.db");
        assert_eq!(config.cache_dir, "/opt/bomvault");
        assert_eq!(config.max_source_size, 1024 * 1024);
        assert_eq!(config.max_nodes, 5_000);
        assert_eq!(config.journal_mode, JournalMode::Delete);
        assert_eq!(config.busy_timeout_ms, 250);
    }

    #[test]
    fn config_serialize_roundtrip() {
        let config = DocumentStoreConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: DocumentStoreConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.db_file, deserialized.db_file);
        assert_eq!(config.journal_mode, deserialized.journal_mode);
    }
}
