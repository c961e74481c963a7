//! 저장소 에러 타입
//!
//! [`StoreError`]는 문서 저장소 모듈 내에서 발생할 수 있는 모든 에러를 나타냅니다.
//! `From<StoreError> for BomvaultError` 구현을 통해 `?` 연산자로
//! 상위 에러 타입으로 자연스럽게 전파됩니다.
//!
//! # 에러 카테고리
//!
//! - **조회**: `NotFound`, `Unresolved`
//! - **별칭**: `AliasConflict`, `AliasAlreadySet`
//! - **계보**: `LineageCycle`, `LineageInconsistent`
//! - **어노테이션**: `InvalidAnnotation`
//! - **크기 제한**: `PayloadTooBig`, `GraphTooBig`
//! - **코덱 경계**: `DecodeFailed`, `EncodeFailed`
//! - **엔진/레코드**: `Backend`, `Corrupt`
//! - **설정 / 파일 I/O**: `Config`, `Io`

use bomvault_core::error::{BomvaultError, CodecError, ConfigError, StorageError};

/// 문서 저장소 도메인 에러
///
/// 저장소 내부의 모든 에러 시나리오를 포함합니다.
///
/// # 에러 변환
///
/// `From<StoreError> for BomvaultError` 구현으로
/// 워크스페이스 최상위 에러 타입으로 자동 변환됩니다.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// 문서 또는 subject 조회 실패
    #[error("not found: {subject}")]
    NotFound {
        /// 조회에 사용한 id 또는 별칭
        subject: String,
    },

    /// 일괄 해석 중 일부 토큰 해석 실패
    #[error("unresolved tokens: {}", .tokens.join(", "))]
    Unresolved {
        /// 해석되지 않은 토큰 목록 (입력 순서 유지)
        tokens: Vec<String>,
    },

    /// 별칭이 이미 다른 문서에 사용 중
    #[error("alias conflict: '{alias}' is held by document {owner}")]
    AliasConflict {
        /// 요청한 별칭
        alias: String,
        /// 별칭을 보유한 문서 id
        owner: String,
    },

    /// 문서에 이미 다른 별칭이 설정됨
    #[error("alias already set: document {document} has alias '{current}'")]
    AliasAlreadySet {
        /// 대상 문서 id
        document: String,
        /// 현재 설정된 별칭
        current: String,
    },

    /// 리비전 체인 순회 중 순환 감지
    #[error("lineage cycle detected at document {document}")]
    LineageCycle {
        /// 순환이 감지된 문서 id
        document: String,
    },

    /// 순방향 포인터와 latest 마커의 불일치 등 계보 신호 모순
    #[error("inconsistent lineage at document {document}: {reason}")]
    LineageInconsistent {
        /// 문제의 문서 id
        document: String,
        /// 불일치 내용
        reason: String,
    },

    /// 어노테이션 규율 위반 (단일값 API로 다중값 이름을 쓰는 등)
    #[error("invalid annotation '{name}': {reason}")]
    InvalidAnnotation {
        /// 어노테이션 이름
        name: String,
        /// 위반 내용
        reason: String,
    },

    /// 수집 페이로드 크기 초과
    #[error("payload too large: {size} bytes (max: {max})")]
    PayloadTooBig {
        /// 실제 페이로드 크기 (바이트)
        size: usize,
        /// 최대 허용 크기 (바이트)
        max: usize,
    },

    /// 문서당 노드 수 초과
    #[error("node graph too large: {nodes} nodes (max: {max})")]
    GraphTooBig {
        /// 실제 노드 수
        nodes: usize,
        /// 최대 허용 노드 수
        max: usize,
    },

    /// 코덱 디코딩 실패
    #[error("decode failed ({format}): {reason}")]
    DecodeFailed {
        /// 와이어 포맷
        format: String,
        /// 실패 사유
        reason: String,
    },

    /// 코덱 인코딩 실패
    #[error("encode failed ({format}): {reason}")]
    EncodeFailed {
        /// 와이어 포맷
        format: String,
        /// 실패 사유
        reason: String,
    },

    /// SQLite 백엔드 실패
    #[error("backend failure during {op}: {source}")]
    Backend {
        /// 실패한 연산 이름
        op: String,
        /// 원본 rusqlite 에러
        source: rusqlite::Error,
    },

    /// 저장된 레코드의 직렬화/역직렬화 실패
    #[error("corrupt record: {subject}: {reason}")]
    Corrupt {
        /// 문제의 레코드 subject
        subject: String,
        /// 실패 사유
        reason: String,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 파일 I/O 에러
    #[error("io error: {path}: {source}")]
    Io {
        /// 관련 파일 경로
        path: String,
        /// 원본 I/O 에러
        source: std::io::Error,
    },
}

impl StoreError {
    /// rusqlite 에러를 연산 이름과 함께 감쌉니다.
    pub(crate) fn backend(op: &str, source: rusqlite::Error) -> Self {
        StoreError::Backend {
            op: op.to_owned(),
            source,
        }
    }
}

impl From<StoreError> for BomvaultError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { subject } => {
                BomvaultError::Storage(StorageError::NotFound(subject))
            }
            StoreError::Unresolved { tokens } => BomvaultError::Storage(StorageError::NotFound(
                format!("unresolved tokens: {}", tokens.join(", ")),
            )),
            StoreError::AliasConflict { alias, owner } => BomvaultError::Storage(
                StorageError::AliasConflict(format!("'{alias}' is held by document {owner}")),
            ),
            StoreError::AliasAlreadySet { document, current } => {
                BomvaultError::Storage(StorageError::AliasAlreadySet(format!(
                    "document {document} has alias '{current}'"
                )))
            }
            StoreError::LineageCycle { document } => BomvaultError::Storage(
                StorageError::InconsistentLineage(format!("cycle detected at document {document}")),
            ),
            StoreError::LineageInconsistent { document, reason } => BomvaultError::Storage(
                StorageError::InconsistentLineage(format!("{document}: {reason}")),
            ),
            StoreError::InvalidAnnotation { name, reason } => BomvaultError::Storage(
                StorageError::InvalidAnnotation(format!("'{name}': {reason}")),
            ),
            StoreError::PayloadTooBig { size, max } => BomvaultError::Storage(
                StorageError::LimitExceeded(format!("payload {size} bytes (max: {max})")),
            ),
            StoreError::GraphTooBig { nodes, max } => BomvaultError::Storage(
                StorageError::LimitExceeded(format!("node graph {nodes} nodes (max: {max})")),
            ),
            StoreError::DecodeFailed { format, reason } => {
                BomvaultError::Codec(CodecError::DecodeFailed { format, reason })
            }
            StoreError::EncodeFailed { format, reason } => {
                BomvaultError::Codec(CodecError::EncodeFailed { format, reason })
            }
            StoreError::Backend { op, source } => {
                BomvaultError::Storage(StorageError::Backend(format!("{op}: {source}")))
            }
            StoreError::Corrupt { subject, reason } => BomvaultError::Storage(
                StorageError::Backend(format!("corrupt record: {subject}: {reason}")),
            ),
            StoreError::Config { field, reason } => {
                BomvaultError::Config(ConfigError::InvalidValue { field, reason })
            }
            StoreError::Io { path, source } => BomvaultError::Storage(StorageError::Backend(
                format!("io error: {path}: {source}"),
            )),
        }
    }
}
