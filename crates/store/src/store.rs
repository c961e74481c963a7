//! 문서 저장소 본체 — SQLite 기반 문서/어노테이션 영속화
//!
//! [`DocumentStore`]는 문서 테이블과 어노테이션 테이블 두 개를 가진
//! 단일 SQLite 연결을 소유합니다. 문서의 메타데이터와 노드 그래프는
//! JSON 컬럼으로 직렬화되고, 어노테이션은 `(subject_id, name, value)`
//! 행으로 저장됩니다.
//!
//! 별칭/태그 연산은 [`crate::alias`], 리비전 계보는 [`crate::lineage`],
//! 소스 수집은 [`crate::ingest`]에 있으며 모두 이 타입의 메서드입니다.
//!
//! # 트랜잭션 경계
//!
//! 다단계 쓰기는 [`DocumentStore::write_tx`]로 감쌉니다. 클로저가 에러를
//! 반환하면 트랜잭션이 드롭되면서 롤백되어 부분 쓰기가 남지 않습니다.

use std::time::Duration;

use rusqlite::{Connection, OptionalExtension, Transaction, params};
use tracing::{debug, info};
use uuid::Uuid;

use bomvault_core::metrics as m;
use bomvault_core::types::Document;

use crate::annotation;
use crate::config::{DocumentStoreConfig, IN_MEMORY_DB};
use crate::error::StoreError;

/// 스키마 생성 SQL
///
/// `documents.id`는 콘텐츠 파생 UUID 문자열이고, `annotations`는
/// `(subject_id, name, value)` 삼중 유니크 제약으로 집합 의미를 가집니다.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS documents (
    id       TEXT PRIMARY KEY,
    metadata TEXT NOT NULL,
    graph    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS annotations (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    subject_id TEXT NOT NULL,
    name       TEXT NOT NULL,
    value      TEXT NOT NULL,
    UNIQUE (subject_id, name, value)
);

CREATE INDEX IF NOT EXISTS idx_annotations_subject ON annotations (subject_id, name);
CREATE INDEX IF NOT EXISTS idx_annotations_name_value ON annotations (name, value);
";

/// SBOM 문서 저장소
///
/// 하나의 로컬 SQLite 파일(또는 인메모리 데이터베이스)을 캐시로 사용하는
/// 동기식 저장소입니다. 단일 프로세스 사용을 전제하며 프로세스 간
/// 동시 쓰기는 지원하지 않습니다.
pub struct DocumentStore {
    conn: Connection,
    config: DocumentStoreConfig,
}

impl DocumentStore {
    /// 설정에 따라 저장소를 엽니다.
    ///
    /// 파일 기반 설정이면 `cache_dir`를 생성하고 SQLite 파일을 열거나
    /// 만들며, 스키마가 없으면 생성합니다.
    ///
    /// # Errors
    ///
    /// 설정 검증 실패 시 `StoreError::Config`, 디렉토리 생성 실패 시
    /// `StoreError::Io`, SQLite 실패 시 `StoreError::Backend` 반환
    pub fn open(config: DocumentStoreConfig) -> Result<Self, StoreError> {
        config.validate()?;

        let conn = if config.is_in_memory() {
            Connection::open_in_memory().map_err(|e| StoreError::backend("open", e))?
        } else {
            let path = config.db_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| StoreError::Io {
                    path: parent.display().to_string(),
                    source: e,
                })?;
            }
            Connection::open(&path).map_err(|e| StoreError::backend("open", e))?
        };

        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))
            .map_err(|e| StoreError::backend("busy_timeout", e))?;

        // journal_mode PRAGMA는 적용된 모드를 행으로 반환한다
        let _mode: String = conn
            .pragma_update_and_check(None, "journal_mode", config.journal_mode.as_pragma(), |row| {
                row.get(0)
            })
            .map_err(|e| StoreError::backend("journal_mode", e))?;

        conn.execute_batch(SCHEMA)
            .map_err(|e| StoreError::backend("schema", e))?;

        if config.is_in_memory() {
            debug!("document store opened in memory");
        } else {
            info!(
                db = %config.db_path().display(),
                journal_mode = %config.journal_mode,
                "document store opened"
            );
        }

        Ok(Self { conn, config })
    }

    /// 인메모리 저장소를 엽니다.
    ///
    /// 프로세스 종료와 함께 내용이 사라집니다. 테스트와 드라이런에
    /// 사용합니다.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let config = DocumentStoreConfig {
            db_file: IN_MEMORY_DB.to_owned(),
            ..Default::default()
        };
        Self::open(config)
    }

    /// 저장소 설정을 반환합니다.
    pub fn config(&self) -> &DocumentStoreConfig {
        &self.config
    }

    /// 읽기 연산용 연결 참조
    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    /// 다단계 쓰기를 단일 트랜잭션으로 실행합니다.
    ///
    /// 클로저가 에러를 반환하면 트랜잭션이 드롭되면서 롤백됩니다.
    pub(crate) fn write_tx<T>(
        &mut self,
        op: &str,
        f: impl FnOnce(&Transaction<'_>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| StoreError::backend(op, e))?;
        let out = f(&tx)?;
        tx.commit().map_err(|e| StoreError::backend(op, e))?;
        Ok(out)
    }

    /// 문서를 저장합니다.
    ///
    /// `metadata.id`가 비어 있으면 직렬화된 내용에서 콘텐츠 기반 id를
    /// 파생합니다. 같은 내용은 언제나 같은 id를 얻습니다. 같은 id의
    /// 문서가 이미 있으면 내용을 교체하며 기존 어노테이션은 유지됩니다.
    pub fn store(&mut self, document: Document) -> Result<Document, StoreError> {
        self.store_with_annotations(document, &[])
    }

    /// 문서와 어노테이션을 하나의 트랜잭션으로 저장합니다.
    ///
    /// `annotations`의 각 `(name, value)` 쌍은 저장된 문서에 붙습니다.
    /// 예약 단일값 이름은 기존 값을 교체하고, 그 외 이름은 집합 삽입
    /// 규칙을 따릅니다.
    pub fn store_with_annotations(
        &mut self,
        mut document: Document,
        annotations: &[(String, String)],
    ) -> Result<Document, StoreError> {
        if document.metadata.id.is_empty() {
            document.metadata.id = derive_content_id(&document)?;
        }
        let id = document.id().to_owned();

        self.write_tx("store", |tx| {
            insert_document(tx, &document)?;
            for (name, value) in annotations {
                annotation::apply_value(tx, &id, name, value)?;
            }
            Ok(())
        })?;

        metrics::counter!(m::STORE_DOCUMENTS_STORED_TOTAL).increment(1);
        if !annotations.is_empty() {
            metrics::counter!(m::STORE_ANNOTATIONS_WRITTEN_TOTAL)
                .increment(annotations.len() as u64);
        }
        self.refresh_document_gauge()?;
        debug!(document = %id, nodes = document.graph.node_count(), "document stored");
        Ok(document)
    }

    /// id로 문서를 조회합니다.
    ///
    /// # Errors
    ///
    /// 해당 id의 문서가 없으면 `StoreError::NotFound` 반환
    pub fn retrieve(&self, id: &str) -> Result<Document, StoreError> {
        fetch_document(&self.conn, id)?.ok_or_else(|| StoreError::NotFound {
            subject: id.to_owned(),
        })
    }

    /// 저장된 모든 문서를 삽입 순서로 반환합니다.
    pub fn documents(&self) -> Result<Vec<Document>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, metadata, graph FROM documents ORDER BY rowid")
            .map_err(|e| StoreError::backend("list", e))?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .map_err(|e| StoreError::backend("list", e))?;

        let mut documents = Vec::new();
        for row in rows {
            let (id, metadata, graph) = row.map_err(|e| StoreError::backend("list", e))?;
            documents.push(decode_document(&id, &metadata, &graph)?);
        }
        Ok(documents)
    }

    /// 저장된 문서 수를 반환합니다.
    pub fn document_count(&self) -> Result<usize, StoreError> {
        count_documents(&self.conn)
    }

    /// 문서와 문서에 속한 모든 어노테이션을 삭제합니다.
    ///
    /// 그래프 노드에 붙은 어노테이션도 함께 정리합니다. 다른 문서가
    /// `link-to`로 이 문서를 가리키는 링크는 건드리지 않습니다.
    ///
    /// # Errors
    ///
    /// `token`이 id로도 별칭으로도 해석되지 않으면 `StoreError::NotFound` 반환
    pub fn remove(&mut self, token: &str) -> Result<(), StoreError> {
        let document = self.document_by_id_or_alias(token)?;
        let id = document.id().to_owned();

        self.write_tx("remove", |tx| {
            annotation::delete_subject(tx, &id)?;
            for node in &document.graph.nodes {
                annotation::delete_subject(tx, &node.id)?;
            }
            tx.execute("DELETE FROM documents WHERE id = ?1", params![id])
                .map_err(|e| StoreError::backend("remove", e))?;
            Ok(())
        })?;

        metrics::counter!(m::STORE_DOCUMENTS_REMOVED_TOTAL).increment(1);
        self.refresh_document_gauge()?;
        debug!(document = %id, "document removed");
        Ok(())
    }

    pub(crate) fn refresh_document_gauge(&self) -> Result<(), StoreError> {
        let count = self.document_count()?;
        metrics::gauge!(m::STORE_DOCUMENTS).set(count as f64);
        Ok(())
    }
}

/// 문서를 upsert합니다. rowid와 기존 어노테이션은 유지됩니다.
pub(crate) fn insert_document(conn: &Connection, document: &Document) -> Result<(), StoreError> {
    let id = document.id();
    let metadata = encode_column(id, &document.metadata)?;
    let graph = encode_column(id, &document.graph)?;
    conn.execute(
        "INSERT INTO documents (id, metadata, graph) VALUES (?1, ?2, ?3)
         ON CONFLICT (id) DO UPDATE SET metadata = excluded.metadata, graph = excluded.graph",
        params![id, metadata, graph],
    )
    .map_err(|e| StoreError::backend("store", e))?;
    Ok(())
}

/// id로 문서 한 건을 읽습니다. 없으면 `None`을 반환합니다.
pub(crate) fn fetch_document(conn: &Connection, id: &str) -> Result<Option<Document>, StoreError> {
    let row: Option<(String, String)> = conn
        .query_row(
            "SELECT metadata, graph FROM documents WHERE id = ?1",
            params![id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()
        .map_err(|e| StoreError::backend("retrieve", e))?;

    match row {
        Some((metadata, graph)) => Ok(Some(decode_document(id, &metadata, &graph)?)),
        None => Ok(None),
    }
}

/// 전체 문서 수를 셉니다.
pub(crate) fn count_documents(conn: &Connection) -> Result<usize, StoreError> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))
        .map_err(|e| StoreError::backend("count", e))?;
    Ok(count as usize)
}

/// 직렬화된 내용에서 콘텐츠 기반 문서 id를 파생합니다.
///
/// 같은 메타데이터와 그래프는 항상 같은 id를 얻습니다 (UUID v5).
pub(crate) fn derive_content_id(document: &Document) -> Result<String, StoreError> {
    let metadata = encode_column("new document", &document.metadata)?;
    let graph = encode_column("new document", &document.graph)?;
    let mut seed = metadata.into_bytes();
    seed.extend_from_slice(graph.as_bytes());
    Ok(Uuid::new_v5(&Uuid::NAMESPACE_OID, &seed).to_string())
}

fn encode_column<T: serde::Serialize>(subject: &str, value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|e| StoreError::Corrupt {
        subject: subject.to_owned(),
        reason: e.to_string(),
    })
}

fn decode_document(id: &str, metadata: &str, graph: &str) -> Result<Document, StoreError> {
    let metadata = serde_json::from_str(metadata).map_err(|e| StoreError::Corrupt {
        subject: id.to_owned(),
        reason: format!("metadata column: {e}"),
    })?;
    let graph = serde_json::from_str(graph).map_err(|e| StoreError::Corrupt {
        subject: id.to_owned(),
        reason: format!("graph column: {e}"),
    })?;
    Ok(Document { metadata, graph })
}
