#![doc = include_str!("../README.md")]

pub mod annotation;
pub mod codec;
pub mod config;
pub mod error;
pub mod metrics;
pub mod types;

// --- 주요 타입 re-export ---
// 각 모듈의 핵심 타입을 크레이트 루트에서 바로 사용할 수 있도록 합니다.

// 에러
pub use error::{BomvaultError, CodecError, ConfigError, MergeError, StorageError};

// 설정
pub use config::BomvaultConfig;

// 어노테이션
pub use annotation::{Annotation, Discipline};

// 코덱 경계
pub use codec::{DocumentDecoder, DocumentEncoder, SourcePayload};

// 도메인 타입
pub use types::{
    Document, DocumentMetadata, DocumentType, Edge, EdgeKind, Node, NodeGraph, NodeKind, Person,
    SourceFormat, Tool,
};
