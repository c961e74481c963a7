//! 어노테이션 연산 — 단일값/다중값 규율의 저장소 구현
//!
//! 같은 이름이라도 규율이 다르면 다른 API를 써야 합니다. 예약 이름을
//! 잘못된 규율의 API로 호출하면 `StoreError::InvalidAnnotation`으로
//! 거부됩니다. 예약되지 않은 이름은 호출자가 규율을 선택합니다.

use rusqlite::{Connection, OptionalExtension, params};

use bomvault_core::annotation::{ANNOTATION_LINK_TO, Annotation, Discipline, reserved_discipline};
use bomvault_core::metrics as m;

use crate::error::StoreError;
use crate::store::DocumentStore;

impl DocumentStore {
    /// 다중값 어노테이션에 값을 추가합니다.
    ///
    /// 이미 있는 값은 무시됩니다 (집합 의미). 빈 `values`는 no-op입니다.
    ///
    /// # Errors
    ///
    /// `name`이 예약 단일값 이름이면 `StoreError::InvalidAnnotation` 반환
    pub fn add_annotations(
        &mut self,
        subject: &str,
        name: &str,
        values: &[String],
    ) -> Result<(), StoreError> {
        guard_multi(name)?;
        if values.is_empty() {
            return Ok(());
        }

        self.write_tx("add_annotations", |tx| {
            for value in values {
                insert_value(tx, subject, name, value)?;
            }
            Ok(())
        })?;

        metrics::counter!(m::STORE_ANNOTATIONS_WRITTEN_TOTAL).increment(values.len() as u64);
        Ok(())
    }

    /// 다중값 어노테이션에서 값을 제거합니다.
    ///
    /// `values`가 비어 있으면 `name`의 모든 값을 제거합니다. 없는 값의
    /// 제거는 no-op입니다.
    pub fn remove_annotations(
        &mut self,
        subject: &str,
        name: &str,
        values: &[String],
    ) -> Result<(), StoreError> {
        self.write_tx("remove_annotations", |tx| {
            if values.is_empty() {
                delete_name(tx, subject, name)?;
            } else {
                for value in values {
                    tx.execute(
                        "DELETE FROM annotations
                         WHERE subject_id = ?1 AND name = ?2 AND value = ?3",
                        params![subject, name, value],
                    )
                    .map_err(|e| StoreError::backend("remove_annotations", e))?;
                }
            }
            Ok(())
        })
    }

    /// subject의 모든 어노테이션을 제거합니다.
    pub fn clear_annotations(&mut self, subject: &str) -> Result<(), StoreError> {
        self.write_tx("clear_annotations", |tx| {
            delete_subject(tx, subject).map(|_| ())
        })
    }

    /// 단일값 어노테이션을 설정합니다. 기존 값은 교체됩니다.
    ///
    /// # Errors
    ///
    /// `name`이 예약 다중값 이름이면 `StoreError::InvalidAnnotation` 반환
    pub fn set_unique_annotation(
        &mut self,
        subject: &str,
        name: &str,
        value: &str,
    ) -> Result<(), StoreError> {
        guard_unique(name)?;
        self.write_tx("set_unique_annotation", |tx| {
            set_unique_value(tx, subject, name, value)
        })?;

        metrics::counter!(m::STORE_ANNOTATIONS_WRITTEN_TOTAL).increment(1);
        Ok(())
    }

    /// 단일값 어노테이션을 조회합니다.
    ///
    /// 설정되지 않았으면 빈 문자열을 반환하며, 에러가 아닙니다.
    pub fn unique_annotation(&self, subject: &str, name: &str) -> Result<String, StoreError> {
        Ok(get_unique_value(self.conn(), subject, name)?.unwrap_or_default())
    }

    /// subject의 어노테이션을 기록 순서로 반환합니다.
    ///
    /// `name`을 주면 해당 이름만 반환합니다.
    pub fn annotations(
        &self,
        subject: &str,
        name: Option<&str>,
    ) -> Result<Vec<Annotation>, StoreError> {
        let mut out = Vec::new();
        match name {
            Some(name) => {
                let mut stmt = self
                    .conn()
                    .prepare(
                        "SELECT subject_id, name, value FROM annotations
                         WHERE subject_id = ?1 AND name = ?2 ORDER BY id",
                    )
                    .map_err(|e| StoreError::backend("annotations", e))?;
                let rows = stmt
                    .query_map(params![subject, name], row_to_annotation)
                    .map_err(|e| StoreError::backend("annotations", e))?;
                for row in rows {
                    out.push(row.map_err(|e| StoreError::backend("annotations", e))?);
                }
            }
            None => {
                let mut stmt = self
                    .conn()
                    .prepare(
                        "SELECT subject_id, name, value FROM annotations
                         WHERE subject_id = ?1 ORDER BY id",
                    )
                    .map_err(|e| StoreError::backend("annotations", e))?;
                let rows = stmt
                    .query_map(params![subject], row_to_annotation)
                    .map_err(|e| StoreError::backend("annotations", e))?;
                for row in rows {
                    out.push(row.map_err(|e| StoreError::backend("annotations", e))?);
                }
            }
        }
        Ok(out)
    }

    /// 어노테이션 값 목록을 기록 순서로 반환합니다.
    pub fn annotation_values(&self, subject: &str, name: &str) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn()
            .prepare(
                "SELECT value FROM annotations
                 WHERE subject_id = ?1 AND name = ?2 ORDER BY id",
            )
            .map_err(|e| StoreError::backend("annotation_values", e))?;
        let rows = stmt
            .query_map(params![subject, name], |row| row.get::<_, String>(0))
            .map_err(|e| StoreError::backend("annotation_values", e))?;

        let mut values = Vec::new();
        for row in rows {
            values.push(row.map_err(|e| StoreError::backend("annotation_values", e))?);
        }
        Ok(values)
    }

    /// 다른 문서로의 링크를 추가합니다 (`link-to`).
    pub fn add_links(&mut self, subject: &str, targets: &[String]) -> Result<(), StoreError> {
        self.add_annotations(subject, ANNOTATION_LINK_TO, targets)
    }

    /// 링크를 제거합니다. 빈 `targets`는 모든 링크를 제거합니다.
    pub fn remove_links(&mut self, subject: &str, targets: &[String]) -> Result<(), StoreError> {
        self.remove_annotations(subject, ANNOTATION_LINK_TO, targets)
    }

    /// subject의 링크 대상 목록을 반환합니다.
    pub fn links(&self, subject: &str) -> Result<Vec<String>, StoreError> {
        self.annotation_values(subject, ANNOTATION_LINK_TO)
    }
}

fn guard_multi(name: &str) -> Result<(), StoreError> {
    if name.is_empty() {
        return Err(StoreError::InvalidAnnotation {
            name: name.to_owned(),
            reason: "name must not be empty".to_owned(),
        });
    }
    if reserved_discipline(name) == Some(Discipline::Unique) {
        return Err(StoreError::InvalidAnnotation {
            name: name.to_owned(),
            reason: "reserved unique name, use set_unique_annotation".to_owned(),
        });
    }
    Ok(())
}

fn guard_unique(name: &str) -> Result<(), StoreError> {
    if name.is_empty() {
        return Err(StoreError::InvalidAnnotation {
            name: name.to_owned(),
            reason: "name must not be empty".to_owned(),
        });
    }
    if reserved_discipline(name) == Some(Discipline::Multi) {
        return Err(StoreError::InvalidAnnotation {
            name: name.to_owned(),
            reason: "reserved multi-valued name, use add_annotations".to_owned(),
        });
    }
    Ok(())
}

fn row_to_annotation(row: &rusqlite::Row<'_>) -> rusqlite::Result<Annotation> {
    Ok(Annotation {
        subject_id: row.get(0)?,
        name: row.get(1)?,
        value: row.get(2)?,
    })
}

/// `(name, value)` 쌍을 이름의 예약 규율에 따라 기록합니다.
///
/// 예약 단일값 이름은 교체, 그 외는 집합 삽입입니다. 문서 저장 시
/// 함께 전달된 어노테이션 처리에 사용됩니다.
pub(crate) fn apply_value(
    conn: &Connection,
    subject: &str,
    name: &str,
    value: &str,
) -> Result<(), StoreError> {
    if name.is_empty() {
        return Err(StoreError::InvalidAnnotation {
            name: name.to_owned(),
            reason: "name must not be empty".to_owned(),
        });
    }
    match reserved_discipline(name) {
        Some(Discipline::Unique) => set_unique_value(conn, subject, name, value),
        _ => insert_value(conn, subject, name, value),
    }
}

/// 집합 의미 삽입. 이미 있는 `(subject, name, value)`는 무시됩니다.
pub(crate) fn insert_value(
    conn: &Connection,
    subject: &str,
    name: &str,
    value: &str,
) -> Result<(), StoreError> {
    conn.execute(
        "INSERT OR IGNORE INTO annotations (subject_id, name, value) VALUES (?1, ?2, ?3)",
        params![subject, name, value],
    )
    .map_err(|e| StoreError::backend("add_annotations", e))?;
    Ok(())
}

/// 단일값 교체. 기존 값을 지우고 새 값 하나를 기록합니다.
pub(crate) fn set_unique_value(
    conn: &Connection,
    subject: &str,
    name: &str,
    value: &str,
) -> Result<(), StoreError> {
    delete_name(conn, subject, name)?;
    conn.execute(
        "INSERT INTO annotations (subject_id, name, value) VALUES (?1, ?2, ?3)",
        params![subject, name, value],
    )
    .map_err(|e| StoreError::backend("set_unique_annotation", e))?;
    Ok(())
}

/// `(subject, name)`의 모든 값을 삭제합니다.
pub(crate) fn delete_name(conn: &Connection, subject: &str, name: &str) -> Result<usize, StoreError> {
    conn.execute(
        "DELETE FROM annotations WHERE subject_id = ?1 AND name = ?2",
        params![subject, name],
    )
    .map_err(|e| StoreError::backend("remove_annotations", e))
}

/// subject의 모든 어노테이션을 삭제합니다.
pub(crate) fn delete_subject(conn: &Connection, subject: &str) -> Result<usize, StoreError> {
    conn.execute(
        "DELETE FROM annotations WHERE subject_id = ?1",
        params![subject],
    )
    .map_err(|e| StoreError::backend("clear_annotations", e))
}

/// 단일값 어노테이션 조회. 손상된 데이터로 여러 행이 있으면 가장
/// 오래된 행을 반환합니다.
pub(crate) fn get_unique_value(
    conn: &Connection,
    subject: &str,
    name: &str,
) -> Result<Option<String>, StoreError> {
    conn.query_row(
        "SELECT value FROM annotations
         WHERE subject_id = ?1 AND name = ?2 ORDER BY id LIMIT 1",
        params![subject, name],
        |row| row.get(0),
    )
    .optional()
    .map_err(|e| StoreError::backend("unique_annotation", e))
}

/// `(name, value)`를 가진 첫 subject를 반환합니다. 별칭 소유자 탐색에
/// 사용됩니다.
pub(crate) fn first_subject_with(
    conn: &Connection,
    name: &str,
    value: &str,
) -> Result<Option<String>, StoreError> {
    conn.query_row(
        "SELECT subject_id FROM annotations
         WHERE name = ?1 AND value = ?2 ORDER BY id LIMIT 1",
        params![name, value],
        |row| row.get(0),
    )
    .optional()
    .map_err(|e| StoreError::backend("resolve", e))
}
