//! 소스 수집 — 원시 바이트를 문서와 출처 어노테이션으로
//!
//! 수집은 페이로드를 디코더로 해석해 문서로 저장하면서, 원본과의 연결
//! 고리를 네 개의 단일값 어노테이션으로 남깁니다: `source-data`(원문),
//! `source-hash`(SHA-256), `source-format`(포맷), `source-url`(출처 URL).
//! 내보내기는 반대 방향으로 인코더를 통과합니다.

use sha2::{Digest, Sha256};
use tracing::info;

use bomvault_core::annotation::{
    ANNOTATION_SOURCE_DATA, ANNOTATION_SOURCE_FORMAT, ANNOTATION_SOURCE_HASH,
    ANNOTATION_SOURCE_URL,
};
use bomvault_core::codec::{DocumentDecoder, DocumentEncoder, SourcePayload};
use bomvault_core::error::{BomvaultError, CodecError};
use bomvault_core::metrics as m;
use bomvault_core::types::Document;

use crate::annotation;
use crate::error::StoreError;
use crate::store::{self, DocumentStore, insert_document};

impl DocumentStore {
    /// 원시 페이로드를 수집해 문서와 출처 어노테이션으로 저장합니다.
    ///
    /// 크기/노드 한도를 검사하고 디코딩한 뒤, 문서와 네 개의 출처
    /// 어노테이션을 하나의 트랜잭션으로 기록합니다. 원문은 UTF-8로
    /// 손실 변환되어 `source-data`에 저장되고, 해시는 원시 바이트
    /// 기준으로 계산됩니다.
    ///
    /// # Errors
    ///
    /// - 페이로드가 `max_source_size`를 넘으면 `StoreError::PayloadTooBig`
    /// - 디코딩 실패 시 `StoreError::DecodeFailed`
    /// - 그래프가 `max_nodes`를 넘으면 `StoreError::GraphTooBig`
    pub fn ingest(
        &mut self,
        payload: &SourcePayload,
        decoder: &dyn DocumentDecoder,
    ) -> Result<Document, StoreError> {
        let document = self.decode_payload(payload, decoder)?;
        let id = document.id().to_owned();
        let format = decoder.format();
        let source_data = String::from_utf8_lossy(&payload.data).into_owned();
        let source_hash = sha256_hex(&payload.data);

        self.write_tx("ingest", |tx| {
            insert_document(tx, &document)?;
            annotation::set_unique_value(tx, &id, ANNOTATION_SOURCE_DATA, &source_data)?;
            annotation::set_unique_value(tx, &id, ANNOTATION_SOURCE_HASH, &source_hash)?;
            annotation::set_unique_value(tx, &id, ANNOTATION_SOURCE_FORMAT, &format.to_string())?;
            annotation::set_unique_value(tx, &id, ANNOTATION_SOURCE_URL, &payload.url)?;
            Ok(())
        })?;

        metrics::counter!(m::STORE_DOCUMENTS_STORED_TOTAL).increment(1);
        metrics::counter!(m::STORE_INGEST_BYTES_TOTAL, m::LABEL_FORMAT => format.to_string())
            .increment(payload.len() as u64);
        self.refresh_document_gauge()?;
        info!(
            document = %id,
            format = %format,
            bytes = payload.len(),
            url = %payload.url,
            "source ingested"
        );
        Ok(document)
    }

    /// 저장된 문서를 인코더를 통해 와이어 포맷 바이트로 내보냅니다.
    ///
    /// # Errors
    ///
    /// - `token`이 해석되지 않으면 `StoreError::NotFound`
    /// - 인코딩 실패 시 `StoreError::EncodeFailed`
    pub fn export(
        &self,
        token: &str,
        encoder: &dyn DocumentEncoder,
    ) -> Result<Vec<u8>, StoreError> {
        let document = self.document_by_id_or_alias(token)?;
        encoder.encode(&document).map_err(|e| match e {
            BomvaultError::Codec(CodecError::EncodeFailed { format, reason }) => {
                StoreError::EncodeFailed { format, reason }
            }
            other => StoreError::EncodeFailed {
                format: encoder.format().to_string(),
                reason: other.to_string(),
            },
        })
    }

    /// 페이로드를 한도 검사와 함께 디코딩합니다. 아무것도 쓰지 않습니다.
    ///
    /// 크기 검사는 디코딩 전에, 노드 수 검사는 디코딩 후에 수행합니다.
    /// 디코딩된 문서에 id가 없으면 콘텐츠 기반 id를 파생합니다.
    pub(crate) fn decode_payload(
        &self,
        payload: &SourcePayload,
        decoder: &dyn DocumentDecoder,
    ) -> Result<Document, StoreError> {
        let max_size = self.config().max_source_size;
        if payload.len() > max_size {
            return Err(StoreError::PayloadTooBig {
                size: payload.len(),
                max: max_size,
            });
        }

        let mut document = decoder.decode(&payload.data).map_err(|e| match e {
            BomvaultError::Codec(CodecError::DecodeFailed { format, reason }) => {
                StoreError::DecodeFailed { format, reason }
            }
            other => StoreError::DecodeFailed {
                format: decoder.format().to_string(),
                reason: other.to_string(),
            },
        })?;

        let max_nodes = self.config().max_nodes;
        if document.graph.node_count() > max_nodes {
            return Err(StoreError::GraphTooBig {
                nodes: document.graph.node_count(),
                max: max_nodes,
            });
        }

        if document.metadata.id.is_empty() {
            document.metadata.id = store::derive_content_id(&document)?;
        }
        Ok(document)
    }
}

/// 바이트의 SHA-256 해시를 16진수 문자열로 계산합니다.
fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
