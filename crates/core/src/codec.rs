//! 코덱 경계 trait — 와이어 포맷 해석의 확장 포인트
//!
//! 이 워크스페이스는 SBOM 와이어 포맷(CycloneDX, SPDX)을 직접 파싱하거나
//! 직렬화하지 않습니다. 트랜스포트가 가져온 원시 바이트는
//! [`DocumentDecoder`] 구현을 통해 [`Document`]로 변환되고, 내보내기는
//! [`DocumentEncoder`] 구현을 통해 바이트로 되돌아갑니다.

use bytes::Bytes;

use crate::error::BomvaultError;
use crate::types::{Document, SourceFormat};

/// 트랜스포트가 전달하는 원시 페이로드
///
/// `data`는 페치된 바이트 그대로이며, `url`은 출처 URL입니다.
/// 저장소는 이 두 값을 소스 출처 어노테이션으로 기록합니다.
#[derive(Debug, Clone)]
pub struct SourcePayload {
    /// 원시 바이트
    pub data: Bytes,
    /// 출처 URL
    pub url: String,
}

impl SourcePayload {
    /// 새 페이로드를 생성합니다.
    pub fn new(data: impl Into<Bytes>, url: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            url: url.into(),
        }
    }

    /// 페이로드 크기(바이트)를 반환합니다.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// 페이로드가 비어 있으면 true를 반환합니다.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// 문서 디코더 trait
///
/// 새로운 와이어 포맷을 지원하려면 이 trait을 구현합니다.
pub trait DocumentDecoder: Send + Sync {
    /// 이 디코더가 해석하는 포맷
    fn format(&self) -> SourceFormat;

    /// 원시 바이트를 문서로 디코딩
    fn decode(&self, raw: &[u8]) -> Result<Document, BomvaultError>;
}

/// 문서 인코더 trait
///
/// 저장된 문서를 와이어 포맷 바이트로 되돌립니다.
pub trait DocumentEncoder: Send + Sync {
    /// 이 인코더가 생성하는 포맷
    fn format(&self) -> SourceFormat;

    /// 문서를 와이어 포맷 바이트로 인코딩
    fn encode(&self, document: &Document) -> Result<Vec<u8>, BomvaultError>;
}
