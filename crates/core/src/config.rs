//! 설정 관리 — bomvault.toml 파싱 및 런타임 설정
//!
//! [`BomvaultConfig`]는 모든 크레이트의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. 환경변수 (`BOMVAULT_STORE_DB_FILE=/tmp/cache.db` 형식)
//! 2. 설정 파일 (`bomvault.toml`)
//! 3. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # fn example() -> Result<(), bomvault_core::error::BomvaultError> {
//! use bomvault_core::config::BomvaultConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = BomvaultConfig::load("bomvault.toml")?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = BomvaultConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{BomvaultError, ConfigError};

/// 원시 소스 페이로드 크기의 절대 상한 (바이트)
pub const MAX_SOURCE_SIZE_CAP: usize = 512 * 1024 * 1024; // 512MB

/// 병합 입력 문서 수의 절대 상한
pub const MAX_MERGE_INPUTS_CAP: usize = 4096;

/// Bomvault 통합 설정
///
/// `bomvault.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 크레이트는 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BomvaultConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 문서 저장소 설정
    #[serde(default)]
    pub store: StoreConfig,
    /// 병합 엔진 설정
    #[serde(default)]
    pub merge: MergeConfig,
}

impl BomvaultConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BomvaultError> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, BomvaultError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BomvaultError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                BomvaultError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, BomvaultError> {
        toml::from_str(toml_str).map_err(|e| {
            BomvaultError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `BOMVAULT_{SECTION}_{FIELD}`
    /// 예: `BOMVAULT_STORE_DB_FILE=/tmp/cache.db`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "BOMVAULT_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "BOMVAULT_GENERAL_LOG_FORMAT");
        override_string(&mut self.general.cache_dir, "BOMVAULT_GENERAL_CACHE_DIR");

        // Store
        override_string(&mut self.store.db_file, "BOMVAULT_STORE_DB_FILE");
        override_usize(
            &mut self.store.max_source_size,
            "BOMVAULT_STORE_MAX_SOURCE_SIZE",
        );
        override_usize(&mut self.store.max_nodes, "BOMVAULT_STORE_MAX_NODES");

        // Merge
        override_usize(&mut self.merge.max_inputs, "BOMVAULT_MERGE_MAX_INPUTS");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), BomvaultError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if self.general.cache_dir.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "general.cache_dir".to_owned(),
                reason: "cache_dir must not be empty".to_owned(),
            }
            .into());
        }

        if self.store.db_file.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "store.db_file".to_owned(),
                reason: "db_file must not be empty".to_owned(),
            }
            .into());
        }

        if self.store.max_source_size == 0 || self.store.max_source_size > MAX_SOURCE_SIZE_CAP {
            return Err(ConfigError::InvalidValue {
                field: "store.max_source_size".to_owned(),
                reason: format!("must be between 1 and {}", MAX_SOURCE_SIZE_CAP),
            }
            .into());
        }

        if self.store.max_nodes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "store.max_nodes".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        if self.merge.max_inputs == 0 || self.merge.max_inputs > MAX_MERGE_INPUTS_CAP {
            return Err(ConfigError::InvalidValue {
                field: "merge.max_inputs".to_owned(),
                reason: format!("must be between 1 and {}", MAX_MERGE_INPUTS_CAP),
            }
            .into());
        }

        Ok(())
    }
}

// Default는 derive 매크로로 자동 생성 (각 필드가 Default를 구현하므로)

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
    /// 로컬 캐시 디렉토리
    pub cache_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
            cache_dir: "/var/lib/bomvault".to_owned(),
        }
    }
}

/// 문서 저장소 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite 데이터베이스 파일명 — 상대 경로면 cache_dir 기준
    pub db_file: String,
    /// 수용하는 원시 소스 페이로드 최대 크기 (바이트)
    pub max_source_size: usize,
    /// 문서 하나의 노드 그래프 최대 노드 수
    pub max_nodes: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_file: "bomvault.db".to_owned(),
            max_source_size: 50 * 1024 * 1024, // 50MB
            max_nodes: 100_000,
        }
    }
}

/// 병합 엔진 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// 한 번의 병합이 수용하는 입력 문서 최대 수
    pub max_inputs: usize,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self { max_inputs: 64 }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}
