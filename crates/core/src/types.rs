//! 도메인 타입 — SBOM 문서, 메타데이터, 노드 그래프
//!
//! 모든 크레이트가 공유하는 데이터 구조를 정의합니다.
//! 문서는 메타데이터 블록과 노드 그래프로 구성되며, 저장소에 영속화된 이후의
//! 변경은 어노테이션 연산과 병합(새 문서 생성)으로만 일어납니다.

use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// SBOM 문서
///
/// 메타데이터 블록과 컴포넌트 노드 그래프의 쌍입니다.
/// 정규 식별자는 `metadata.id`이며, 비어 있는 채로 저장소에 전달되면
/// 저장 시점에 콘텐츠 기반 식별자가 부여됩니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// 문서 메타데이터
    pub metadata: DocumentMetadata,
    /// 컴포넌트 노드 그래프
    pub graph: NodeGraph,
}

impl Document {
    /// 문서의 정규 식별자를 반환합니다.
    pub fn id(&self) -> &str {
        &self.metadata.id
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({} nodes)",
            if self.metadata.name.is_empty() {
                "(unnamed)"
            } else {
                &self.metadata.name
            },
            self.metadata.id,
            self.graph.nodes.len(),
        )
    }
}

/// 문서 메타데이터
///
/// 문서 이름, 버전, 생성 정보와 생산 도구/작성자/문서 유형 목록을 담습니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// 정규 식별자
    pub id: String,
    /// 문서 이름
    pub name: String,
    /// 문서 버전
    pub version: String,
    /// 자유 형식 설명
    pub comment: String,
    /// 생성 시각 (있을 경우)
    pub date: Option<SystemTime>,
    /// 문서를 생산한 도구 목록
    pub tools: Vec<Tool>,
    /// 작성자 목록
    pub authors: Vec<Person>,
    /// 문서 유형 목록
    pub document_types: Vec<DocumentType>,
}

/// SBOM 생산 도구
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    /// 도구 이름
    pub name: String,
    /// 도구 버전
    pub version: String,
    /// 공급 업체
    pub vendor: String,
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)?;
        if !self.vendor.is_empty() {
            write!(f, " ({})", self.vendor)?;
        }
        Ok(())
    }
}

/// 작성자 (개인 또는 조직)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Person {
    /// 이름
    pub name: String,
    /// 이메일 주소
    pub email: String,
    /// 웹 URL
    pub url: String,
    /// 전화번호
    pub phone: String,
    /// 조직 여부
    pub is_org: bool,
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.email.is_empty() {
            write!(f, " <{}>", self.email)?;
        }
        Ok(())
    }
}

/// 문서 유형 태그
///
/// 문서가 선언하는 용도(design, build, analyzed 등)를 나타냅니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentType {
    /// 유형 이름
    pub name: String,
    /// 유형 설명
    pub description: String,
}

/// 노드 그래프
///
/// 문서 내부의 컴포넌트(노드)와 방향성 관계(엣지), 루트 엘리먼트 목록입니다.
/// `root_elements`는 그래프의 진입점이 되는 노드 식별자를 담습니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeGraph {
    /// 컴포넌트 노드 목록
    pub nodes: Vec<Node>,
    /// 방향성 엣지 목록
    pub edges: Vec<Edge>,
    /// 루트 엘리먼트 식별자 목록
    pub root_elements: Vec<String>,
}

impl NodeGraph {
    /// 식별자로 노드를 찾습니다.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// 노드 수를 반환합니다.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// 노드와 엣지가 모두 없으면 true를 반환합니다.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

impl fmt::Display for NodeGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} nodes, {} edges, {} roots",
            self.nodes.len(),
            self.edges.len(),
            self.root_elements.len(),
        )
    }
}

/// 그래프 노드
///
/// 컴포넌트(패키지) 또는 파일 하나를 나타냅니다.
/// 식별자는 자신이 속한 그래프 안에서 유일합니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// 그래프 내 유일 식별자
    pub id: String,
    /// 노드 종류
    pub kind: NodeKind,
    /// 컴포넌트 이름
    pub name: String,
    /// 컴포넌트 버전
    pub version: String,
    /// Package URL (purl)
    pub purl: String,
    /// 선언된 라이선스 목록
    pub licenses: Vec<String>,
    /// 확정 라이선스
    pub license_concluded: String,
    /// 저작권 표기
    pub copyright: String,
    /// 공급자
    pub supplier: String,
    /// 다운로드 URL
    pub download_url: String,
    /// 해시 목록 — (알고리즘, 16진수 다이제스트) 쌍
    pub hashes: Vec<(String, String)>,
    /// 자유 형식 설명
    pub comment: String,
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} [{}]", self.name, self.version, self.kind)
    }
}

/// 노드 종류
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// 소프트웨어 패키지 또는 컴포넌트
    #[default]
    Package,
    /// 개별 파일
    File,
}

impl NodeKind {
    /// 문자열에서 노드 종류를 파싱합니다.
    ///
    /// 대소문자를 구분하지 않습니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "package" | "pkg" | "component" => Some(Self::Package),
            "file" => Some(Self::File),
            _ => None,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Package => write!(f, "package"),
            Self::File => write!(f, "file"),
        }
    }
}

/// 방향성 엣지
///
/// `from` 노드에서 `to` 노드들로 향하는 동일 유형 관계의 묶음입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// 관계 유형
    pub kind: EdgeKind,
    /// 출발 노드 식별자
    pub from: String,
    /// 도착 노드 식별자 목록
    pub to: Vec<String>,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -[{}]-> {} targets", self.from, self.kind, self.to.len())
    }
}

/// 엣지 관계 유형
///
/// 병합 엔진이 이해하는 닫힌 집합입니다. 외부 코덱이 매핑할 수 없는
/// 관계는 `Other`로 들어옵니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    /// 수정 관계
    Amends,
    /// 선조 관계
    Ancestor,
    /// 빌드 의존성
    BuildDependency,
    /// 포함 관계
    Contains,
    /// 런타임 의존성
    DependsOn,
    /// 문서가 기술하는 대상
    Describes,
    /// 개발 의존성
    DevDependency,
    /// 문서화 관계
    Documentation,
    /// 런타임 전용 의존성
    RuntimeDependency,
    /// 테스트 의존성
    TestDependency,
    /// 매핑되지 않은 기타 관계
    Other,
}

impl EdgeKind {
    /// 문자열에서 엣지 유형을 파싱합니다.
    ///
    /// 대소문자를 구분하지 않으며 하이픈/언더스코어 표기를 모두 허용합니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "amends" => Some(Self::Amends),
            "ancestor" => Some(Self::Ancestor),
            "build-dependency" | "build-depends-on" => Some(Self::BuildDependency),
            "contains" => Some(Self::Contains),
            "depends-on" | "dependency" => Some(Self::DependsOn),
            "describes" => Some(Self::Describes),
            "dev-dependency" | "dev-depends-on" => Some(Self::DevDependency),
            "documentation" => Some(Self::Documentation),
            "runtime-dependency" => Some(Self::RuntimeDependency),
            "test-dependency" => Some(Self::TestDependency),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Amends => "amends",
            Self::Ancestor => "ancestor",
            Self::BuildDependency => "build-dependency",
            Self::Contains => "contains",
            Self::DependsOn => "depends-on",
            Self::Describes => "describes",
            Self::DevDependency => "dev-dependency",
            Self::Documentation => "documentation",
            Self::RuntimeDependency => "runtime-dependency",
            Self::TestDependency => "test-dependency",
            Self::Other => "other",
        };
        write!(f, "{}", s)
    }
}

/// 소스 와이어 포맷
///
/// 외부 코덱이 해석하는 원본 바이트의 포맷입니다. `source-format`
/// 어노테이션 값으로 기록됩니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceFormat {
    /// CycloneDX JSON
    #[default]
    CycloneDxJson,
    /// SPDX JSON
    SpdxJson,
    /// SPDX tag-value
    SpdxTagValue,
}

impl SourceFormat {
    /// 문자열에서 포맷을 파싱합니다.
    ///
    /// 대소문자를 구분하지 않으며 `+`/`-` 구분자 표기를 모두 허용합니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('+', "-").as_str() {
            "cyclonedx" | "cdx" | "cyclonedx-json" | "cdx-json" => Some(Self::CycloneDxJson),
            "spdx" | "spdx-json" => Some(Self::SpdxJson),
            "spdx-tag-value" | "tag-value" | "spdx-tv" | "tv" => Some(Self::SpdxTagValue),
            _ => None,
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CycloneDxJson => write!(f, "cyclonedx-json"),
            Self::SpdxJson => write!(f, "spdx-json"),
            Self::SpdxTagValue => write!(f, "spdx-tag-value"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_node(id: &str, name: &str) -> Node {
        Node {
            id: id.to_owned(),
            kind: NodeKind::Package,
            name: name.to_owned(),
            version: "1.0.0".to_owned(),
            ..Node::default()
        }
    }

    #[test]
    fn document_id_comes_from_metadata() {
        let doc = Document {
            metadata: DocumentMetadata {
                id: "urn:uuid:1234".to_owned(),
                ..DocumentMetadata::default()
            },
            graph: NodeGraph::default(),
        };
        assert_eq!(doc.id(), "urn:uuid:1234");
    }

    #[test]
    fn document_display() {
        let doc = Document {
            metadata: DocumentMetadata {
                id: "doc-1".to_owned(),
                name: "my-app".to_owned(),
                ..DocumentMetadata::default()
            },
            graph: NodeGraph {
                nodes: vec![sample_node("n1", "serde")],
                ..NodeGraph::default()
            },
        };
        let display = doc.to_string();
        assert!(display.contains("my-app"));
        assert!(display.contains("doc-1"));
        assert!(display.contains("1 nodes"));
    }

    #[test]
    fn document_display_unnamed() {
        let doc = Document::default();
        assert!(doc.to_string().contains("(unnamed)"));
    }

    #[test]
    fn graph_node_lookup() {
        let graph = NodeGraph {
            nodes: vec![sample_node("n1", "serde"), sample_node("n2", "tokio")],
            ..NodeGraph::default()
        };
        assert_eq!(graph.node("n2").map(|n| n.name.as_str()), Some("tokio"));
        assert!(graph.node("n3").is_none());
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn graph_is_empty() {
        assert!(NodeGraph::default().is_empty());
        let graph = NodeGraph {
            nodes: vec![sample_node("n1", "serde")],
            ..NodeGraph::default()
        };
        assert!(!graph.is_empty());
    }

    #[test]
    fn node_kind_default_is_package() {
        assert_eq!(NodeKind::default(), NodeKind::Package);
    }

    #[test]
    fn node_kind_from_str_loose() {
        assert_eq!(NodeKind::from_str_loose("package"), Some(NodeKind::Package));
        assert_eq!(NodeKind::from_str_loose("PKG"), Some(NodeKind::Package));
        assert_eq!(NodeKind::from_str_loose("File"), Some(NodeKind::File));
        assert_eq!(NodeKind::from_str_loose("directory"), None);
    }

    #[test]
    fn edge_kind_display_roundtrip() {
        let kinds = [
            EdgeKind::Amends,
            EdgeKind::Ancestor,
            EdgeKind::BuildDependency,
            EdgeKind::Contains,
            EdgeKind::DependsOn,
            EdgeKind::Describes,
            EdgeKind::DevDependency,
            EdgeKind::Documentation,
            EdgeKind::RuntimeDependency,
            EdgeKind::TestDependency,
            EdgeKind::Other,
        ];
        for kind in kinds {
            let parsed = EdgeKind::from_str_loose(&kind.to_string());
            assert_eq!(parsed, Some(kind));
        }
    }

    #[test]
    fn edge_kind_accepts_underscore_form() {
        assert_eq!(
            EdgeKind::from_str_loose("DEPENDS_ON"),
            Some(EdgeKind::DependsOn)
        );
        assert_eq!(
            EdgeKind::from_str_loose("build_dependency"),
            Some(EdgeKind::BuildDependency)
        );
    }

    #[test]
    fn edge_kind_rejects_unknown() {
        assert_eq!(EdgeKind::from_str_loose("friend-of"), None);
    }

    #[test]
    fn edge_display() {
        let edge = Edge {
            kind: EdgeKind::Contains,
            from: "root".to_owned(),
            to: vec!["a".to_owned(), "b".to_owned()],
        };
        let display = edge.to_string();
        assert!(display.contains("root"));
        assert!(display.contains("contains"));
        assert!(display.contains("2 targets"));
    }

    #[test]
    fn source_format_display() {
        assert_eq!(SourceFormat::CycloneDxJson.to_string(), "cyclonedx-json");
        assert_eq!(SourceFormat::SpdxJson.to_string(), "spdx-json");
        assert_eq!(SourceFormat::SpdxTagValue.to_string(), "spdx-tag-value");
    }

    #[test]
    fn source_format_from_str_loose() {
        assert_eq!(
            SourceFormat::from_str_loose("cyclonedx+json"),
            Some(SourceFormat::CycloneDxJson)
        );
        assert_eq!(
            SourceFormat::from_str_loose("CDX"),
            Some(SourceFormat::CycloneDxJson)
        );
        assert_eq!(
            SourceFormat::from_str_loose("spdx"),
            Some(SourceFormat::SpdxJson)
        );
        assert_eq!(
            SourceFormat::from_str_loose("tag-value"),
            Some(SourceFormat::SpdxTagValue)
        );
        assert_eq!(SourceFormat::from_str_loose("xml"), None);
    }

    #[test]
    fn tool_display() {
        let tool = Tool {
            name: "bomgen".to_owned(),
            version: "2.1".to_owned(),
            vendor: "Acme".to_owned(),
        };
        assert_eq!(tool.to_string(), "bomgen 2.1 (Acme)");
        let bare = Tool {
            name: "bomgen".to_owned(),
            version: "2.1".to_owned(),
            vendor: String::new(),
        };
        assert_eq!(bare.to_string(), "bomgen 2.1");
    }

    #[test]
    fn person_display() {
        let person = Person {
            name: "Jane Doe".to_owned(),
            email: "jane@example.com".to_owned(),
            ..Person::default()
        };
        assert_eq!(person.to_string(), "Jane Doe <jane@example.com>");
    }

    #[test]
    fn document_serialize_roundtrip() {
        let doc = Document {
            metadata: DocumentMetadata {
                id: "doc-1".to_owned(),
                name: "my-app".to_owned(),
                version: "0.3.0".to_owned(),
                date: Some(SystemTime::now()),
                tools: vec![Tool {
                    name: "bomgen".to_owned(),
                    version: "2.1".to_owned(),
                    vendor: String::new(),
                }],
                ..DocumentMetadata::default()
            },
            graph: NodeGraph {
                nodes: vec![sample_node("n1", "serde")],
                edges: vec![Edge {
                    kind: EdgeKind::Describes,
                    from: "n1".to_owned(),
                    to: vec!["n2".to_owned()],
                }],
                root_elements: vec!["n1".to_owned()],
            },
        };
        let json = serde_json::to_string(&doc).unwrap();
        let deserialized: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(doc, deserialized);
    }
}
