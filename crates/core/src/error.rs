//! 에러 타입 — 도메인별 에러 정의

/// Bomvault 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum BomvaultError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 저장소 에러
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// 병합 엔진 에러
    #[error("merge error: {0}")]
    Merge(#[from] MergeError),

    /// 코덱 에러
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 저장소 에러
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// 문서 또는 subject를 찾을 수 없음
    #[error("not found: {0}")]
    NotFound(String),

    /// 별칭이 이미 다른 문서에 사용 중
    #[error("alias conflict: {0}")]
    AliasConflict(String),

    /// 문서에 이미 다른 별칭이 설정됨
    #[error("alias already set: {0}")]
    AliasAlreadySet(String),

    /// 리비전 계보 신호 불일치
    #[error("inconsistent lineage: {0}")]
    InconsistentLineage(String),

    /// 어노테이션 규율 위반
    #[error("invalid annotation: {0}")]
    InvalidAnnotation(String),

    /// 크기 제한 초과
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// 저장 엔진 실패
    #[error("backend failure: {0}")]
    Backend(String),
}

/// 병합 엔진 에러
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// 닫힌 엔티티 집합 밖의 종류를 재조정하려 함
    #[error("unsupported merge kind: {0}")]
    UnsupportedKind(String),

    /// 병합 중단 — 아무것도 영속화되지 않음
    #[error("merge aborted: {0}")]
    Aborted(String),
}

/// 코덱 에러
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// 디코딩 실패
    #[error("decode failed ({format}): {reason}")]
    DecodeFailed { format: String, reason: String },

    /// 인코딩 실패
    #[error("encode failed ({format}): {reason}")]
    EncodeFailed { format: String, reason: String },

    /// 지원하지 않는 포맷
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
}
