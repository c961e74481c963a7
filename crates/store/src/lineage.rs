//! 리비전 계보 — base/revised 포인터 체인과 latest 마커
//!
//! 리비전 관계는 문서 본문이 아니라 어노테이션으로 기록됩니다.
//! `base-document`는 이전 리비전을, `revised-document`는 다음 리비전을
//! 가리키며, 체인 꼬리에는 `latest-revision` 마커가 붙습니다. 순방향
//! 포인터가 정본이고 마커는 비정규화된 캐시이므로, 순회는 포인터를
//! 따르되 마커와 어긋나면 에러로 표면화합니다.

use tracing::info;

use bomvault_core::annotation::{
    ANNOTATION_ALIAS, ANNOTATION_BASE_DOCUMENT, ANNOTATION_LATEST_REVISION,
    ANNOTATION_REVISED_DOCUMENT, LATEST_REVISION_TRUE,
};
use bomvault_core::codec::{DocumentDecoder, SourcePayload};
use bomvault_core::metrics as m;
use bomvault_core::types::Document;

use crate::annotation;
use crate::error::StoreError;
use crate::store::{DocumentStore, fetch_document, insert_document};

impl DocumentStore {
    /// 기존 문서의 리비전으로 새 페이로드를 저장합니다.
    ///
    /// `base_token`으로 해석된 문서가 체인 꼬리인지 확인한 뒤 페이로드를
    /// 디코딩해 새 문서로 저장하고, 하나의 트랜잭션에서 계보 신호를
    /// 갱신합니다:
    ///
    /// - base에 별칭이 있으면 새 문서로 이동
    /// - 새 문서에 `base-document` ← base id
    /// - base에 `revised-document` ← 새 문서 id
    /// - `latest-revision` 마커를 base에서 새 문서로 이동
    ///
    /// 리비전은 소스 출처 어노테이션을 받지 않습니다. 원시 소스와의
    /// 연결이 필요하면 [`DocumentStore::ingest`]를 사용하십시오.
    ///
    /// # Errors
    ///
    /// - `base_token`이 해석되지 않으면 `StoreError::NotFound`
    /// - base에 이미 리비전이 있으면 `StoreError::LineageInconsistent`
    /// - 새 문서 id가 이미 저장된 문서와 충돌하면 `StoreError::LineageInconsistent`
    /// - 페이로드/그래프가 한도를 넘으면 `PayloadTooBig`/`GraphTooBig`
    /// - 디코딩 실패 시 `StoreError::DecodeFailed`
    pub fn add_revision(
        &mut self,
        payload: &SourcePayload,
        base_token: &str,
        decoder: &dyn DocumentDecoder,
    ) -> Result<Document, StoreError> {
        let base = self.document_by_id_or_alias(base_token)?;
        let base_id = base.id().to_owned();

        let revised = self.unique_annotation(&base_id, ANNOTATION_REVISED_DOCUMENT)?;
        if !revised.is_empty() {
            return Err(StoreError::LineageInconsistent {
                document: base_id,
                reason: format!("base already revised by {revised}, revise the chain tail instead"),
            });
        }

        let document = self.decode_payload(payload, decoder)?;
        let new_id = document.id().to_owned();
        if new_id == base_id {
            return Err(StoreError::LineageInconsistent {
                document: base_id,
                reason: "revision content resolves to the base document itself".to_owned(),
            });
        }
        // 콘텐츠 파생 id가 다른 저장 문서와 겹치면 upsert가 그 문서를
        // 덮어쓰고 계보 신호까지 다시 쓰게 되므로 쓰기 전에 거부한다
        if fetch_document(self.conn(), &new_id)?.is_some() {
            return Err(StoreError::LineageInconsistent {
                document: new_id,
                reason: "revision content collides with an already stored document".to_owned(),
            });
        }

        self.write_tx("add_revision", |tx| {
            insert_document(tx, &document)?;

            let alias =
                annotation::get_unique_value(tx, &base_id, ANNOTATION_ALIAS)?.unwrap_or_default();
            if !alias.is_empty() {
                annotation::delete_name(tx, &base_id, ANNOTATION_ALIAS)?;
                annotation::set_unique_value(tx, &new_id, ANNOTATION_ALIAS, &alias)?;
            }

            annotation::set_unique_value(tx, &new_id, ANNOTATION_BASE_DOCUMENT, &base_id)?;
            annotation::set_unique_value(tx, &base_id, ANNOTATION_REVISED_DOCUMENT, &new_id)?;
            annotation::set_unique_value(
                tx,
                &new_id,
                ANNOTATION_LATEST_REVISION,
                LATEST_REVISION_TRUE,
            )?;
            annotation::delete_name(tx, &base_id, ANNOTATION_LATEST_REVISION)?;
            Ok(())
        })?;

        metrics::counter!(m::STORE_DOCUMENTS_STORED_TOTAL).increment(1);
        metrics::counter!(m::LINEAGE_REVISIONS_ADDED_TOTAL).increment(1);
        self.refresh_document_gauge()?;
        info!(base = %base_id, revision = %new_id, "revision added");
        Ok(document)
    }

    /// 토큰이 속한 체인의 뿌리(첫 문서)를 반환합니다.
    ///
    /// `base-document` 포인터를 역방향으로 따라갑니다. 순회 횟수는
    /// 저장된 문서 수를 상한으로 하며, 상한을 넘으면 포인터가 순환하는
    /// 것이므로 `StoreError::LineageCycle`을 반환합니다.
    pub fn root_document(&self, token: &str) -> Result<Document, StoreError> {
        let mut current = self.document_by_id_or_alias(token)?;
        let bound = self.document_count()?;
        let mut steps = 0usize;

        loop {
            let base_id = self.unique_annotation(current.id(), ANNOTATION_BASE_DOCUMENT)?;
            if base_id.is_empty() {
                metrics::histogram!(m::LINEAGE_CHAIN_LENGTH).record((steps + 1) as f64);
                return Ok(current);
            }
            steps += 1;
            if steps >= bound {
                return Err(StoreError::LineageCycle {
                    document: current.id().to_owned(),
                });
            }
            current = self.retrieve(&base_id)?;
        }
    }

    /// 토큰이 속한 체인의 최신 리비전을 반환합니다.
    ///
    /// `revised-document` 포인터를 순방향으로 따라갑니다. 순회 중 마커와
    /// 포인터가 어긋나면 `StoreError::LineageInconsistent`로 실패합니다:
    ///
    /// - 리비전이 있는 문서에 `latest-revision` 마커가 붙어 있는 경우
    /// - 리비전을 가진 체인의 꼬리에 마커가 없는 경우
    ///
    /// 한 번도 리비전되지 않은 독립 문서는 자기 자신이 최신이며, 마커
    /// 없이도 일관된 것으로 봅니다.
    pub fn latest_document(&self, token: &str) -> Result<Document, StoreError> {
        let mut current = self.document_by_id_or_alias(token)?;
        let bound = self.document_count()?;
        let mut steps = 0usize;

        loop {
            let next_id = self.unique_annotation(current.id(), ANNOTATION_REVISED_DOCUMENT)?;
            if next_id.is_empty() {
                break;
            }
            if self.has_latest_marker(current.id())? {
                return Err(StoreError::LineageInconsistent {
                    document: current.id().to_owned(),
                    reason: "latest-revision marker on a document that has a revision".to_owned(),
                });
            }
            steps += 1;
            if steps >= bound {
                return Err(StoreError::LineageCycle {
                    document: current.id().to_owned(),
                });
            }
            current = self.retrieve(&next_id)?;
        }

        let in_chain = steps > 0
            || !self
                .unique_annotation(current.id(), ANNOTATION_BASE_DOCUMENT)?
                .is_empty();
        if in_chain && !self.has_latest_marker(current.id())? {
            return Err(StoreError::LineageInconsistent {
                document: current.id().to_owned(),
                reason: "chain tail is missing the latest-revision marker".to_owned(),
            });
        }

        metrics::histogram!(m::LINEAGE_CHAIN_LENGTH).record((steps + 1) as f64);
        Ok(current)
    }

    /// 토큰으로 해석된 문서가 `latest-revision` 마커를 갖는지 반환합니다.
    ///
    /// 마커만 읽는 빠른 조회이며 체인을 순회하지 않습니다. 마커와
    /// 포인터의 일관성 검증까지 필요하면
    /// [`DocumentStore::latest_document`]를 사용하십시오.
    pub fn is_latest(&self, token: &str) -> Result<bool, StoreError> {
        let document = self.document_by_id_or_alias(token)?;
        self.has_latest_marker(document.id())
    }

    fn has_latest_marker(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.unique_annotation(id, ANNOTATION_LATEST_REVISION)? == LATEST_REVISION_TRUE)
    }
}
