//! 어노테이션 모델 — 문서/노드에 붙는 `(subject, name, value)` 메타데이터
//!
//! 어노테이션은 문서 콘텐츠를 건드리지 않고 부가 정보를 기록하는 수단입니다.
//! 이름마다 두 가지 규율 중 하나가 적용됩니다:
//! - **단일값(unique)**: subject당 값이 최대 하나이며, 쓰기는 기존 값을 교체합니다.
//! - **다중값(multi)**: 순서가 유지되는 중복 없는 값 집합입니다.
//!
//! 상위 컴포넌트가 사용하는 예약 이름은 이 모듈의 상수로 정의되며,
//! 예약 이름을 잘못된 규율의 API로 쓰는 호출은 저장소가 거부합니다.

use std::fmt;

use serde::{Deserialize, Serialize};

// --- 예약 이름 상수 (단일값) ---

/// 전역 유일 별칭
pub const ANNOTATION_ALIAS: &str = "alias";
/// 리비전 체인의 이전 문서 (역방향 포인터)
pub const ANNOTATION_BASE_DOCUMENT: &str = "base-document";
/// 리비전 체인의 다음 문서 (순방향 포인터)
pub const ANNOTATION_REVISED_DOCUMENT: &str = "revised-document";
/// 체인 내 최신 리비전 마커
pub const ANNOTATION_LATEST_REVISION: &str = "latest-revision";
/// 페치된 원본 바이트 (lossy UTF-8)
pub const ANNOTATION_SOURCE_DATA: &str = "source-data";
/// 원본 바이트의 SHA-256 다이제스트 (hex)
pub const ANNOTATION_SOURCE_HASH: &str = "source-hash";
/// 원본 와이어 포맷
pub const ANNOTATION_SOURCE_FORMAT: &str = "source-format";
/// 원본을 가져온 URL
pub const ANNOTATION_SOURCE_URL: &str = "source-url";

// --- 예약 이름 상수 (다중값) ---

/// 태그
pub const ANNOTATION_TAG: &str = "tag";
/// 다른 문서로의 링크
pub const ANNOTATION_LINK_TO: &str = "link-to";

/// `latest-revision` 마커의 참 값
pub const LATEST_REVISION_TRUE: &str = "true";

/// 어노테이션 이름의 규율
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discipline {
    /// subject당 최대 하나의 값
    Unique,
    /// 순서 유지, 중복 제거된 값 집합
    Multi,
}

/// 예약 이름의 규율을 반환합니다.
///
/// 예약되지 않은 이름은 `None`을 반환하며, 호출자가 규율을 선택합니다.
pub fn reserved_discipline(name: &str) -> Option<Discipline> {
    match name {
        ANNOTATION_ALIAS
        | ANNOTATION_BASE_DOCUMENT
        | ANNOTATION_REVISED_DOCUMENT
        | ANNOTATION_LATEST_REVISION
        | ANNOTATION_SOURCE_DATA
        | ANNOTATION_SOURCE_HASH
        | ANNOTATION_SOURCE_FORMAT
        | ANNOTATION_SOURCE_URL => Some(Discipline::Unique),
        ANNOTATION_TAG | ANNOTATION_LINK_TO => Some(Discipline::Multi),
        _ => None,
    }
}

/// 어노테이션 레코드
///
/// `subject_id`는 문서 식별자 또는 그래프 노드 식별자입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// 대상 식별자 (문서 또는 노드)
    pub subject_id: String,
    /// 어노테이션 이름
    pub name: String,
    /// 어노테이션 값
    pub value: String,
}

impl Annotation {
    /// 새 어노테이션을 생성합니다.
    pub fn new(
        subject_id: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            name: name.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}={}", self.subject_id, self.name, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_unique_names() {
        let names = [
            ANNOTATION_ALIAS,
            ANNOTATION_BASE_DOCUMENT,
            ANNOTATION_REVISED_DOCUMENT,
            ANNOTATION_LATEST_REVISION,
            ANNOTATION_SOURCE_DATA,
            ANNOTATION_SOURCE_HASH,
            ANNOTATION_SOURCE_FORMAT,
            ANNOTATION_SOURCE_URL,
        ];
        for name in names {
            assert_eq!(
                reserved_discipline(name),
                Some(Discipline::Unique),
                "'{}' should be a reserved unique name",
                name
            );
        }
    }

    #[test]
    fn reserved_multi_names() {
        assert_eq!(
            reserved_discipline(ANNOTATION_TAG),
            Some(Discipline::Multi)
        );
        assert_eq!(
            reserved_discipline(ANNOTATION_LINK_TO),
            Some(Discipline::Multi)
        );
    }

    #[test]
    fn custom_names_have_no_reserved_discipline() {
        assert_eq!(reserved_discipline("my-custom-note"), None);
        assert_eq!(reserved_discipline(""), None);
        // 예약 이름은 정확히 일치할 때만 인정
        assert_eq!(reserved_discipline("Alias"), None);
        assert_eq!(reserved_discipline("tag "), None);
    }

    #[test]
    fn annotation_new_and_display() {
        let ann = Annotation::new("doc-1", ANNOTATION_TAG, "backend");
        assert_eq!(ann.subject_id, "doc-1");
        assert_eq!(ann.name, "tag");
        assert_eq!(ann.value, "backend");
        assert_eq!(ann.to_string(), "doc-1: tag=backend");
    }

    #[test]
    fn annotation_serialize_roundtrip() {
        let ann = Annotation::new("doc-1", ANNOTATION_ALIAS, "prod-sbom");
        let json = serde_json::to_string(&ann).unwrap();
        let deserialized: Annotation = serde_json::from_str(&json).unwrap();
        assert_eq!(ann, deserialized);
    }
}
