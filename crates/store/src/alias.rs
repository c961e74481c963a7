//! 별칭/태그 인덱스 — 전역 유일 별칭과 다중값 태그
//!
//! 별칭은 `alias` 단일값 어노테이션에 전 문서 유일성 제약을 더한
//! 것입니다. 태그는 `tag` 다중값 어노테이션 그대로이며 유일성이
//! 없습니다. 조회 토큰은 언제나 문서 id를 먼저, 별칭을 그 다음으로
//! 해석합니다.

use tracing::debug;

use bomvault_core::annotation::{ANNOTATION_ALIAS, ANNOTATION_TAG};
use bomvault_core::metrics as m;
use bomvault_core::types::Document;

use crate::annotation::{delete_name, first_subject_with, get_unique_value, set_unique_value};
use crate::error::StoreError;
use crate::store::{DocumentStore, fetch_document};

impl DocumentStore {
    /// 문서에 전역 유일 별칭을 설정합니다.
    ///
    /// # 규칙
    ///
    /// - 같은 별칭이 이미 이 문서에 있으면 no-op 성공
    /// - 다른 문서가 별칭을 보유 중이면 `AliasConflict`. `force`면 그
    ///   문서의 별칭을 지우고 가져옵니다
    /// - 이 문서에 다른 별칭이 있으면 `AliasAlreadySet`. `force`면
    ///   교체합니다
    ///
    /// 소유자 해제와 별칭 기록은 한 트랜잭션으로 수행됩니다.
    pub fn set_alias(&mut self, token: &str, alias: &str, force: bool) -> Result<(), StoreError> {
        if alias.is_empty() {
            return Err(StoreError::InvalidAnnotation {
                name: ANNOTATION_ALIAS.to_owned(),
                reason: "alias must not be empty".to_owned(),
            });
        }

        let document = self.document_by_id_or_alias(token)?;
        let id = document.id().to_owned();

        if let Some(owner) = first_subject_with(self.conn(), ANNOTATION_ALIAS, alias)? {
            if owner == id {
                return Ok(());
            }
            if !force {
                return Err(StoreError::AliasConflict {
                    alias: alias.to_owned(),
                    owner,
                });
            }
        }

        let current = get_unique_value(self.conn(), &id, ANNOTATION_ALIAS)?.unwrap_or_default();
        if !current.is_empty() && current != alias && !force {
            return Err(StoreError::AliasAlreadySet {
                document: id,
                current,
            });
        }

        self.write_tx("set_alias", |tx| {
            if let Some(owner) = first_subject_with(tx, ANNOTATION_ALIAS, alias)? {
                if owner != id {
                    delete_name(tx, &owner, ANNOTATION_ALIAS)?;
                }
            }
            set_unique_value(tx, &id, ANNOTATION_ALIAS, alias)
        })?;

        debug!(document = %id, alias = %alias, force, "alias set");
        Ok(())
    }

    /// 문서의 별칭을 반환합니다. 없으면 빈 문자열입니다.
    pub fn alias(&self, token: &str) -> Result<String, StoreError> {
        let document = self.document_by_id_or_alias(token)?;
        self.unique_annotation(document.id(), ANNOTATION_ALIAS)
    }

    /// 토큰을 문서 id 또는 별칭으로 해석합니다.
    ///
    /// 리터럴 id 일치를 먼저 시도하고, 없으면 별칭 값에서 정확히
    /// 일치하는 문서를 찾습니다.
    ///
    /// # Errors
    ///
    /// 둘 다 해석되지 않으면 `StoreError::NotFound` 반환
    pub fn document_by_id_or_alias(&self, token: &str) -> Result<Document, StoreError> {
        if let Some(document) = fetch_document(self.conn(), token)? {
            metrics::counter!(m::STORE_RESOLUTIONS_TOTAL, m::LABEL_RESULT => "id").increment(1);
            return Ok(document);
        }

        if let Some(owner) = first_subject_with(self.conn(), ANNOTATION_ALIAS, token)? {
            if let Some(document) = fetch_document(self.conn(), &owner)? {
                metrics::counter!(m::STORE_RESOLUTIONS_TOTAL, m::LABEL_RESULT => "alias")
                    .increment(1);
                return Ok(document);
            }
        }

        metrics::counter!(m::STORE_RESOLUTIONS_TOTAL, m::LABEL_RESULT => "miss").increment(1);
        Err(StoreError::NotFound {
            subject: token.to_owned(),
        })
    }

    /// 토큰 목록을 입력 순서대로 해석합니다.
    ///
    /// 빈 입력은 저장된 전체 문서를 반환합니다. 해석 실패는 모아서
    /// 하나의 `StoreError::Unresolved`로 보고합니다.
    pub fn documents_by_id_or_alias(&self, tokens: &[String]) -> Result<Vec<Document>, StoreError> {
        if tokens.is_empty() {
            return self.documents();
        }

        let mut documents = Vec::with_capacity(tokens.len());
        let mut unresolved = Vec::new();
        for token in tokens {
            match self.document_by_id_or_alias(token) {
                Ok(document) => documents.push(document),
                Err(StoreError::NotFound { .. }) => unresolved.push(token.clone()),
                Err(e) => return Err(e),
            }
        }

        if !unresolved.is_empty() {
            return Err(StoreError::Unresolved { tokens: unresolved });
        }
        Ok(documents)
    }

    /// 문서에 태그를 추가합니다.
    pub fn add_tags(&mut self, token: &str, tags: &[String]) -> Result<(), StoreError> {
        let document = self.document_by_id_or_alias(token)?;
        let id = document.id().to_owned();
        self.add_annotations(&id, ANNOTATION_TAG, tags)
    }

    /// 문서에서 태그를 제거합니다. 빈 `tags`는 모든 태그를 제거합니다.
    pub fn remove_tags(&mut self, token: &str, tags: &[String]) -> Result<(), StoreError> {
        let document = self.document_by_id_or_alias(token)?;
        let id = document.id().to_owned();
        self.remove_annotations(&id, ANNOTATION_TAG, tags)
    }

    /// 문서의 태그 목록을 기록 순서로 반환합니다.
    pub fn tags(&self, token: &str) -> Result<Vec<String>, StoreError> {
        let document = self.document_by_id_or_alias(token)?;
        self.annotation_values(document.id(), ANNOTATION_TAG)
    }

    /// 태그로 문서 목록을 필터링합니다.
    ///
    /// `tags`가 비어 있으면 입력을 그대로 반환합니다. 그 외에는 문서의
    /// 태그 집합과 주어진 집합의 교집합이 비어 있지 않은 문서만 원래
    /// 상대 순서로 반환합니다.
    pub fn filter_documents_by_tag(
        &self,
        documents: &[Document],
        tags: &[String],
    ) -> Result<Vec<Document>, StoreError> {
        if tags.is_empty() {
            return Ok(documents.to_vec());
        }

        let mut filtered = Vec::new();
        for document in documents {
            let doc_tags = self.annotation_values(document.id(), ANNOTATION_TAG)?;
            if doc_tags.iter().any(|t| tags.contains(t)) {
                filtered.push(document.clone());
            }
        }
        Ok(filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bomvault_core::types::DocumentMetadata;

    fn store_with_documents(ids: &[&str]) -> DocumentStore {
        let mut store = DocumentStore::open_in_memory().unwrap();
        for id in ids {
            let document = Document {
                metadata: DocumentMetadata {
                    id: (*id).to_owned(),
                    name: format!("{id}-name"),
                    ..Default::default()
                },
                ..Default::default()
            };
            store.store(document).unwrap();
        }
        store
    }

    #[test]
    fn resolves_by_id_and_by_alias() {
        let mut store = store_with_documents(&["u1", "u2"]);
        store.set_alias("u2", "spdx", false).unwrap();

        assert_eq!(store.document_by_id_or_alias("u1").unwrap().id(), "u1");
        assert_eq!(store.document_by_id_or_alias("spdx").unwrap().id(), "u2");
    }

    #[test]
    fn resolve_unknown_token_returns_not_found() {
        let store = store_with_documents(&["u1"]);
        let err = store.document_by_id_or_alias("ghost").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn alias_conflict_without_force() {
        let mut store = store_with_documents(&["d1", "d2"]);
        store.set_alias("d1", "prod", false).unwrap();

        let err = store.set_alias("d2", "prod", false).unwrap_err();
        assert!(matches!(err, StoreError::AliasConflict { .. }));
    }

    #[test]
    fn alias_force_steals_and_clears_previous_owner() {
        let mut store = store_with_documents(&["d1", "d2"]);
        store.set_alias("d1", "prod", false).unwrap();
        store.set_alias("d2", "prod", true).unwrap();

        assert_eq!(store.alias("d2").unwrap(), "prod");
        assert_eq!(store.unique_annotation("d1", ANNOTATION_ALIAS).unwrap(), "");
        assert_eq!(store.document_by_id_or_alias("prod").unwrap().id(), "d2");
    }

    #[test]
    fn alias_already_set_without_force() {
        let mut store = store_with_documents(&["d1"]);
        store.set_alias("d1", "first", false).unwrap();

        let err = store.set_alias("d1", "second", false).unwrap_err();
        assert!(matches!(err, StoreError::AliasAlreadySet { .. }));
        assert_eq!(store.alias("d1").unwrap(), "first");
    }

    #[test]
    fn alias_force_replaces_own_alias() {
        let mut store = store_with_documents(&["d1"]);
        store.set_alias("d1", "first", false).unwrap();
        store.set_alias("d1", "second", true).unwrap();

        assert_eq!(store.alias("d1").unwrap(), "second");
        // 이전 별칭으로는 더 이상 해석되지 않음
        assert!(store.document_by_id_or_alias("first").is_err());
    }

    #[test]
    fn alias_same_value_is_idempotent() {
        let mut store = store_with_documents(&["d1"]);
        store.set_alias("d1", "prod", false).unwrap();
        store.set_alias("d1", "prod", false).unwrap();
        assert_eq!(store.alias("d1").unwrap(), "prod");
    }

    #[test]
    fn alias_rejects_empty_value() {
        let mut store = store_with_documents(&["d1"]);
        let err = store.set_alias("d1", "", false).unwrap_err();
        assert!(matches!(err, StoreError::InvalidAnnotation { .. }));
    }

    #[test]
    fn alias_on_missing_document_returns_not_found() {
        let mut store = store_with_documents(&[]);
        let err = store.set_alias("ghost", "prod", false).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn batch_resolution_preserves_input_order() {
        let mut store = store_with_documents(&["u1", "u2", "u3"]);
        store.set_alias("u3", "last", false).unwrap();

        let documents = store
            .documents_by_id_or_alias(&["last".to_owned(), "u1".to_owned(), "u2".to_owned()])
            .unwrap();
        let ids: Vec<&str> = documents.iter().map(|d| d.id()).collect();
        assert_eq!(ids, vec!["u3", "u1", "u2"]);
    }

    #[test]
    fn batch_resolution_accumulates_unresolved_tokens() {
        let store = store_with_documents(&["u1"]);
        let err = store
            .documents_by_id_or_alias(&["ghost".to_owned(), "u1".to_owned(), "phantom".to_owned()])
            .unwrap_err();
        match err {
            StoreError::Unresolved { tokens } => {
                assert_eq!(tokens, vec!["ghost", "phantom"]);
            }
            other => panic!("expected Unresolved, got {other:?}"),
        }
    }

    #[test]
    fn batch_resolution_empty_input_returns_all_documents() {
        let store = store_with_documents(&["u1", "u2"]);
        let documents = store.documents_by_id_or_alias(&[]).unwrap();
        assert_eq!(documents.len(), 2);
    }

    #[test]
    fn tag_filter_without_tags_is_identity() {
        let store = store_with_documents(&["d1", "d2", "d3"]);
        let documents = store.documents().unwrap();
        let filtered = store.filter_documents_by_tag(&documents, &[]).unwrap();

        let ids: Vec<&str> = filtered.iter().map(|d| d.id()).collect();
        assert_eq!(ids, vec!["d1", "d2", "d3"]);
    }

    #[test]
    fn tag_filter_selects_intersecting_documents_in_order() {
        let mut store = store_with_documents(&["d1", "d2", "d3"]);
        store.add_tags("d1", &["a".to_owned()]).unwrap();
        store.add_tags("d2", &["a".to_owned(), "b".to_owned()]).unwrap();
        store.add_tags("d3", &["c".to_owned()]).unwrap();

        let documents = store.documents().unwrap();
        let filtered = store
            .filter_documents_by_tag(&documents, &["a".to_owned()])
            .unwrap();

        let ids: Vec<&str> = filtered.iter().map(|d| d.id()).collect();
        assert_eq!(ids, vec!["d1", "d2"]);
    }

    #[test]
    fn tags_round_trip_through_alias_token() {
        let mut store = store_with_documents(&["d1"]);
        store.set_alias("d1", "prod", false).unwrap();

        store
            .add_tags("prod", &["backend".to_owned(), "release".to_owned()])
            .unwrap();
        assert_eq!(store.tags("prod").unwrap(), vec!["backend", "release"]);

        store.remove_tags("prod", &["backend".to_owned()]).unwrap();
        assert_eq!(store.tags("d1").unwrap(), vec!["release"]);
    }
}
