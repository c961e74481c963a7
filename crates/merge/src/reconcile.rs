//! 엔티티 재조정 — 닫힌 종류 집합과 순수 병합 함수
//!
//! 병합이 다루는 엔티티 종류는 [`EntityKind`]로 닫혀 있습니다. 집합
//! 밖의 이름은 이름 해석 경계에서 `UnsupportedKind`로 거부됩니다.
//!
//! 모든 재조정 함수는 입력을 변경하지 않고 새 값을 반환합니다. 스칼라
//! 필드는 먼저 본 비어 있지 않은 값이 이기고, 이미 채워진 필드는 결코
//! 덮어쓰지 않습니다.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::hash::Hash;

use bomvault_core::types::{DocumentMetadata, DocumentType, Node, Person, Tool};

use crate::error::MergeEngineError;

/// 병합 엔진이 재조정할 수 있는 엔티티 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// 문서 메타데이터 블록
    Metadata,
    /// 그래프 노드
    Node,
    /// 노드 그래프 전체
    NodeGraph,
    /// 작성자
    Person,
    /// 생산 도구
    Tool,
    /// 문서 유형 태그
    DocumentType,
}

impl EntityKind {
    /// 닫힌 집합의 모든 멤버
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Metadata,
        EntityKind::Node,
        EntityKind::NodeGraph,
        EntityKind::Person,
        EntityKind::Tool,
        EntityKind::DocumentType,
    ];

    /// 이름에서 엔티티 종류를 해석합니다.
    ///
    /// # Errors
    ///
    /// 닫힌 집합에 없는 이름이면 `MergeEngineError::UnsupportedKind` 반환
    pub fn from_name(name: &str) -> Result<Self, MergeEngineError> {
        match name.to_lowercase().replace('_', "-").as_str() {
            "metadata" => Ok(EntityKind::Metadata),
            "node" => Ok(EntityKind::Node),
            "node-graph" | "graph" => Ok(EntityKind::NodeGraph),
            "person" | "author" => Ok(EntityKind::Person),
            "tool" => Ok(EntityKind::Tool),
            "document-type" => Ok(EntityKind::DocumentType),
            other => Err(MergeEngineError::UnsupportedKind {
                kind: other.to_owned(),
            }),
        }
    }

    /// 메트릭 레이블로 쓰는 정규 이름을 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Metadata => "metadata",
            EntityKind::Node => "node",
            EntityKind::NodeGraph => "node-graph",
            EntityKind::Person => "person",
            EntityKind::Tool => "tool",
            EntityKind::DocumentType => "document-type",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 키 기반 컬렉션 재조정 규칙
///
/// 같은 키의 첫 등장이 자리를 차지하고, 이후 등장은 비어 있는 필드만
/// 채웁니다. [`fill_from`](Reconcile::fill_from)은 입력을 변경하지 않고
/// 재조정된 새 값을 반환합니다.
pub trait Reconcile {
    /// 동일 엔티티 판정에 쓰는 병합 키
    type Key: Eq + Hash;

    /// 이 엔티티의 병합 키를 반환합니다.
    fn merge_key(&self) -> Self::Key;

    /// 자신의 비어 있는 필드를 `other`의 값으로 채운 새 값을 반환합니다.
    fn fill_from(&self, other: &Self) -> Self;
}

impl Reconcile for Tool {
    type Key = (String, String);

    fn merge_key(&self) -> Self::Key {
        (self.name.clone(), self.version.clone())
    }

    fn fill_from(&self, other: &Self) -> Self {
        Tool {
            name: first_non_empty(&self.name, &other.name),
            version: first_non_empty(&self.version, &other.version),
            vendor: first_non_empty(&self.vendor, &other.vendor),
        }
    }
}

impl Reconcile for Person {
    type Key = String;

    fn merge_key(&self) -> Self::Key {
        self.email.clone()
    }

    fn fill_from(&self, other: &Self) -> Self {
        Person {
            name: first_non_empty(&self.name, &other.name),
            email: first_non_empty(&self.email, &other.email),
            url: first_non_empty(&self.url, &other.url),
            phone: first_non_empty(&self.phone, &other.phone),
            // bool에는 빈 값이 없으므로 먼저 본 값을 유지한다
            is_org: self.is_org,
        }
    }
}

impl Reconcile for DocumentType {
    type Key = String;

    fn merge_key(&self) -> Self::Key {
        self.name.clone()
    }

    fn fill_from(&self, other: &Self) -> Self {
        DocumentType {
            name: first_non_empty(&self.name, &other.name),
            description: first_non_empty(&self.description, &other.description),
        }
    }
}

impl Reconcile for Node {
    type Key = String;

    fn merge_key(&self) -> Self::Key {
        self.id.clone()
    }

    fn fill_from(&self, other: &Self) -> Self {
        Node {
            id: self.id.clone(),
            // 종류에는 빈 값이 없으므로 먼저 본 값을 유지한다
            kind: self.kind,
            name: first_non_empty(&self.name, &other.name),
            version: first_non_empty(&self.version, &other.version),
            purl: first_non_empty(&self.purl, &other.purl),
            licenses: union_strings(&self.licenses, &other.licenses),
            license_concluded: first_non_empty(&self.license_concluded, &other.license_concluded),
            copyright: first_non_empty(&self.copyright, &other.copyright),
            supplier: first_non_empty(&self.supplier, &other.supplier),
            download_url: first_non_empty(&self.download_url, &other.download_url),
            hashes: merge_hashes(&self.hashes, &other.hashes),
            comment: first_non_empty(&self.comment, &other.comment),
        }
    }
}

/// 키 기반 컬렉션을 순서를 보존하며 병합합니다.
///
/// `base`의 순서가 유지되고, `incoming`에서 새 키만 끝에 추가됩니다.
/// 같은 키를 만나면 자리를 차지한 엔트리의 빈 필드만 채워집니다.
pub fn merge_keyed<T: Reconcile + Clone>(base: &[T], incoming: &[T]) -> Vec<T> {
    let mut merged = base.to_vec();
    // 키 → 첫 등장 위치 인덱스. 선형 재탐색 없이 삽입 순서를 유지한다
    let mut index: HashMap<T::Key, usize> = HashMap::with_capacity(merged.len() + incoming.len());
    for (slot, entry) in merged.iter().enumerate() {
        index.entry(entry.merge_key()).or_insert(slot);
    }
    for entry in incoming {
        match index.entry(entry.merge_key()) {
            Entry::Occupied(slot) => {
                let existing = &mut merged[*slot.get()];
                *existing = existing.fill_from(entry);
            }
            Entry::Vacant(slot) => {
                slot.insert(merged.len());
                merged.push(entry.clone());
            }
        }
    }
    merged
}

/// 메타데이터를 입력 순서대로 접어 병합합니다.
///
/// `seed`는 id와 생성 시각이 이미 정해진 출발점입니다. 스칼라는 첫
/// 번째 비어 있지 않은 값을 취하고(채워진 seed 필드는 그대로 남음),
/// 컬렉션은 각자의 병합 키로 재조정됩니다. `seed.id`는 결코 바뀌지
/// 않습니다.
pub fn merge_metadata(seed: DocumentMetadata, inputs: &[&DocumentMetadata]) -> DocumentMetadata {
    let mut merged = seed;
    for input in inputs {
        merged.name = first_non_empty(&merged.name, &input.name);
        merged.version = first_non_empty(&merged.version, &input.version);
        merged.comment = first_non_empty(&merged.comment, &input.comment);
        if merged.date.is_none() {
            merged.date = input.date;
        }
        merged.tools = merge_keyed(&merged.tools, &input.tools);
        merged.authors = merge_keyed(&merged.authors, &input.authors);
        merged.document_types = merge_keyed(&merged.document_types, &input.document_types);
    }
    merged
}

/// 먼저 본 비어 있지 않은 값을 반환합니다.
pub(crate) fn first_non_empty(a: &str, b: &str) -> String {
    if a.is_empty() { b.to_owned() } else { a.to_owned() }
}

/// 문자열 목록을 순서를 보존하며 중복 없이 합칩니다.
pub(crate) fn union_strings(base: &[String], incoming: &[String]) -> Vec<String> {
    let mut merged = base.to_vec();
    for value in incoming {
        if !merged.contains(value) {
            merged.push(value.clone());
        }
    }
    merged
}

/// 해시 목록을 알고리즘 키로 합칩니다. 기존 다이제스트는 유지됩니다.
fn merge_hashes(base: &[(String, String)], incoming: &[(String, String)]) -> Vec<(String, String)> {
    let mut merged = base.to_vec();
    for (algorithm, digest) in incoming {
        if !merged.iter().any(|(a, _)| a == algorithm) {
            merged.push((algorithm.clone(), digest.clone()));
        }
    }
    merged
}
