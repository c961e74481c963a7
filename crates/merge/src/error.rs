//! 병합 엔진 에러 타입
//!
//! [`MergeEngineError`]는 병합 준비와 실행 중 발생하는 모든 에러를
//! 표현합니다. `From<MergeEngineError> for BomvaultError` 변환이
//! 구현되어 있어 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수
//! 있습니다.

use bomvault_core::error::{BomvaultError, MergeError};
use bomvault_store::StoreError;

/// 병합 엔진 도메인 에러
///
/// 입력 검증 실패는 저장소를 건드리기 전에 반환되므로 아무것도
/// 영속화되지 않습니다.
#[derive(Debug, thiserror::Error)]
pub enum MergeEngineError {
    /// 입력 문서가 하나도 없음
    #[error("merge requires at least one input document")]
    EmptyInput,

    /// 입력 문서 수가 설정 한도를 초과
    #[error("too many merge inputs: {count} (max: {max})")]
    TooManyInputs {
        /// 요청된 입력 수
        count: usize,
        /// 허용되는 최대 입력 수
        max: usize,
    },

    /// 닫힌 엔티티 집합 밖의 종류를 재조정하려 함
    #[error("unsupported merge kind: {kind}")]
    UnsupportedKind {
        /// 요청된 엔티티 종류 이름
        kind: String,
    },

    /// 저장소 연산 실패 (해석, 영속화, 별칭 등록)
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<MergeEngineError> for BomvaultError {
    fn from(err: MergeEngineError) -> Self {
        match err {
            MergeEngineError::EmptyInput => {
                BomvaultError::Merge(MergeError::Aborted("no input documents".to_owned()))
            }
            MergeEngineError::TooManyInputs { count, max } => BomvaultError::Merge(
                MergeError::Aborted(format!("{count} inputs (max: {max})")),
            ),
            MergeEngineError::UnsupportedKind { kind } => {
                BomvaultError::Merge(MergeError::UnsupportedKind(kind))
            }
            MergeEngineError::Store(err) => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_display() {
        let err = MergeEngineError::EmptyInput;
        assert!(err.to_string().contains("at least one"));
    }

    #[test]
    fn too_many_inputs_display() {
        let err = MergeEngineError::TooManyInputs { count: 80, max: 64 };
        let msg = err.to_string();
        assert!(msg.contains("80"));
        assert!(msg.contains("64"));
    }

    #[test]
    fn unsupported_kind_display() {
        let err = MergeEngineError::UnsupportedKind {
            kind: "edge".to_owned(),
        };
        assert!(err.to_string().contains("edge"));
    }

    #[test]
    fn store_error_passes_through_display() {
        let err = MergeEngineError::Store(StoreError::NotFound {
            subject: "prod-sbom".to_owned(),
        });
        assert!(err.to_string().contains("prod-sbom"));
    }

    #[test]
    fn converts_to_bomvault_error_aborted() {
        let err = MergeEngineError::EmptyInput;
        let top: BomvaultError = err.into();
        assert!(matches!(top, BomvaultError::Merge(MergeError::Aborted(_))));
    }

    #[test]
    fn converts_to_bomvault_error_unsupported_kind() {
        let err = MergeEngineError::UnsupportedKind {
            kind: "edge".to_owned(),
        };
        let top: BomvaultError = err.into();
        assert!(matches!(
            top,
            BomvaultError::Merge(MergeError::UnsupportedKind(_))
        ));
    }

    #[test]
    fn converts_to_bomvault_error_store_taxonomy_preserved() {
        let err = MergeEngineError::Store(StoreError::NotFound {
            subject: "x".to_owned(),
        });
        let top: BomvaultError = err.into();
        assert!(matches!(top, BomvaultError::Storage(_)));
    }
}
