//! N-way 의미 병합 오케스트레이션
//!
//! 엔진은 상태가 없고 설정만 가집니다. 병합 한 번은 토큰 해석 → 새
//! 문서 생성 → 메타데이터/그래프 재조정 → 루트 통합 → 영속화 순서로
//! 진행되며, 최종 쓰기는 태그와 함께 저장소 트랜잭션 하나로
//! 들어갑니다. 별칭은 커밋이 끝난 뒤에야 등록되므로 별칭 충돌은 이미
//! 저장된 병합 문서를 되돌리지 않습니다.

use std::time::{Instant, SystemTime};

use tracing::{info, warn};
use uuid::Uuid;

use bomvault_core::annotation::ANNOTATION_TAG;
use bomvault_core::config::MergeConfig;
use bomvault_core::metrics as m;
use bomvault_core::types::{Document, DocumentMetadata, NodeGraph};
use bomvault_store::DocumentStore;

use crate::error::MergeEngineError;
use crate::graph::{consolidate_roots, union_graphs};
use crate::reconcile::{EntityKind, merge_metadata};

/// 병합 출력 문서를 꾸미는 옵션
///
/// 모든 필드는 선택 사항입니다. 이름이 없으면 입력 순서의 첫 번째
/// 비어 있지 않은 이름이 쓰입니다.
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    /// 출력 문서 이름
    pub name: Option<String>,
    /// 커밋 후 등록할 전역 별칭
    pub alias: Option<String>,
    /// 출력 문서에 붙일 태그 목록
    pub tags: Vec<String>,
}

impl MergeOptions {
    /// 빈 옵션을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 출력 문서 이름을 지정합니다.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// 커밋 후 등록할 별칭을 지정합니다.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// 출력 문서에 붙일 태그를 지정합니다.
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// N-way 의미 병합 엔진
#[derive(Debug, Clone, Default)]
pub struct MergeEngine {
    config: MergeConfig,
}

impl MergeEngine {
    /// 설정으로 병합 엔진을 생성합니다.
    pub fn new(config: MergeConfig) -> Self {
        Self { config }
    }

    /// 현재 설정을 반환합니다.
    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// 토큰이 가리키는 문서들을 하나로 병합해 저장합니다.
    ///
    /// 토큰은 id 또는 별칭이며 입력 순서가 곧 우선순위입니다. 해석
    /// 실패는 모두 모아 보고하고 아무것도 저장하지 않습니다. 문서
    /// 하나짜리 병합도 유효하며 루트 정규화만 수행됩니다.
    ///
    /// # Errors
    ///
    /// - `EmptyInput`: 토큰 목록이 비어 있음
    /// - `TooManyInputs`: 입력 수가 `max_inputs` 초과
    /// - `Store`: 토큰 해석 실패 또는 영속화 실패
    pub fn merge(
        &self,
        store: &mut DocumentStore,
        tokens: &[String],
        options: MergeOptions,
    ) -> Result<Document, MergeEngineError> {
        let started = Instant::now();
        let result = self.merge_inner(store, tokens, options);

        match &result {
            Ok(document) => {
                metrics::counter!(m::MERGE_COMPLETED_TOTAL).increment(1);
                metrics::counter!(m::MERGE_INPUT_DOCUMENTS_TOTAL).increment(tokens.len() as u64);
                metrics::histogram!(m::MERGE_DURATION_SECONDS)
                    .record(started.elapsed().as_secs_f64());
                record_reconciled(document);
                info!(
                    document = %document.id(),
                    inputs = tokens.len(),
                    nodes = document.graph.node_count(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "merge completed"
                );
            }
            Err(e) => {
                metrics::counter!(m::MERGE_FAILED_TOTAL).increment(1);
                warn!(inputs = tokens.len(), error = %e, "merge failed");
            }
        }
        result
    }

    fn merge_inner(
        &self,
        store: &mut DocumentStore,
        tokens: &[String],
        options: MergeOptions,
    ) -> Result<Document, MergeEngineError> {
        if tokens.is_empty() {
            return Err(MergeEngineError::EmptyInput);
        }
        if tokens.len() > self.config.max_inputs {
            return Err(MergeEngineError::TooManyInputs {
                count: tokens.len(),
                max: self.config.max_inputs,
            });
        }
        let inputs = store.documents_by_id_or_alias(tokens)?;

        // 새 문서가 재조정의 출발점이 된다. 옵션 이름이 첫 번째
        // 비어 있지 않은 값 자리를 차지해 입력 이름을 이긴다.
        let seed = DocumentMetadata {
            id: Uuid::new_v4().to_string(),
            name: options.name.clone().unwrap_or_default(),
            date: Some(SystemTime::now()),
            ..Default::default()
        };
        let input_metadata: Vec<&DocumentMetadata> = inputs.iter().map(|d| &d.metadata).collect();
        let metadata = merge_metadata(seed, &input_metadata);

        let input_graphs: Vec<&NodeGraph> = inputs.iter().map(|d| &d.graph).collect();
        let unioned = union_graphs(&input_graphs);
        let graph = consolidate_roots(unioned, &Uuid::new_v4().to_string());

        let annotations: Vec<(String, String)> = options
            .tags
            .iter()
            .map(|tag| (ANNOTATION_TAG.to_owned(), tag.clone()))
            .collect();
        let merged = store.store_with_annotations(Document { metadata, graph }, &annotations)?;

        if let Some(alias) = &options.alias {
            store.set_alias(merged.id(), alias, false)?;
        }
        Ok(merged)
    }
}

/// 병합 출력에 담긴 엔티티 수를 종류별로 집계합니다.
fn record_reconciled(document: &Document) {
    for kind in EntityKind::ALL {
        let count = match kind {
            EntityKind::Metadata | EntityKind::NodeGraph => 1,
            EntityKind::Node => document.graph.node_count(),
            EntityKind::Person => document.metadata.authors.len(),
            EntityKind::Tool => document.metadata.tools.len(),
            EntityKind::DocumentType => document.metadata.document_types.len(),
        };
        if count > 0 {
            metrics::counter!(m::MERGE_ENTITIES_RECONCILED_TOTAL, m::LABEL_KIND => kind.as_str())
                .increment(count as u64);
        }
    }
}
