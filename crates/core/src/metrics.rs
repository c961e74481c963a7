//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 크레이트는 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`,
//! `metrics::histogram!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `bomvault_`
//! - 컴포넌트명: `store_`, `lineage_`, `merge_`
//! - 접미어: `_total` (counter), `_seconds` (histogram/latency), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(bomvault_core::metrics::STORE_DOCUMENTS_STORED_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 소스 포맷 레이블 키 (cyclonedx-json, spdx-json, spdx-tag-value)
pub const LABEL_FORMAT: &str = "format";

/// 결과 레이블 키 (id, alias, miss)
pub const LABEL_RESULT: &str = "result";

/// 엔티티 종류 레이블 키 (metadata, node, person, tool 등)
pub const LABEL_KIND: &str = "kind";

// ─── Document Store 메트릭 ─────────────────────────────────────────

/// Store: 저장된 문서 수 (counter)
pub const STORE_DOCUMENTS_STORED_TOTAL: &str = "bomvault_store_documents_stored_total";

/// Store: 삭제된 문서 수 (counter)
pub const STORE_DOCUMENTS_REMOVED_TOTAL: &str = "bomvault_store_documents_removed_total";

/// Store: 현재 보관 중인 문서 수 (gauge)
pub const STORE_DOCUMENTS: &str = "bomvault_store_documents";

/// Store: 기록된 어노테이션 수 (counter)
pub const STORE_ANNOTATIONS_WRITTEN_TOTAL: &str = "bomvault_store_annotations_written_total";

/// Store: id/별칭 해석 수 (counter, label: result)
pub const STORE_RESOLUTIONS_TOTAL: &str = "bomvault_store_resolutions_total";

/// Store: 수집된 원시 소스 바이트 수 (counter, label: format)
pub const STORE_INGEST_BYTES_TOTAL: &str = "bomvault_store_ingest_bytes_total";

// ─── Revision Lineage 메트릭 ───────────────────────────────────────

/// Lineage: 추가된 리비전 수 (counter)
pub const LINEAGE_REVISIONS_ADDED_TOTAL: &str = "bomvault_lineage_revisions_added_total";

/// Lineage: 체인 순회 시 관측된 체인 길이 (histogram)
pub const LINEAGE_CHAIN_LENGTH: &str = "bomvault_lineage_chain_length";

// ─── Merge Engine 메트릭 ───────────────────────────────────────────

/// Merge: 완료된 병합 수 (counter)
pub const MERGE_COMPLETED_TOTAL: &str = "bomvault_merge_completed_total";

/// Merge: 실패한 병합 수 (counter)
pub const MERGE_FAILED_TOTAL: &str = "bomvault_merge_failed_total";

/// Merge: 병합에 투입된 입력 문서 수 (counter)
pub const MERGE_INPUT_DOCUMENTS_TOTAL: &str = "bomvault_merge_input_documents_total";

/// Merge: 재조정된 엔티티 수 (counter, label: kind)
pub const MERGE_ENTITIES_RECONCILED_TOTAL: &str = "bomvault_merge_entities_reconciled_total";

/// Merge: 병합 소요 시간 (histogram, 초)
pub const MERGE_DURATION_SECONDS: &str = "bomvault_merge_duration_seconds";

// ─── 히스토그램 버킷 정의 ────────────────────────────────────────────

/// 병합 소요 시간 히스토그램 버킷 (초)
///
/// 1ms ~ 30s 범위, 로그 단위 분포
pub const MERGE_DURATION_BUCKETS: [f64; 9] =
    [0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0];

/// 리비전 체인 길이 히스토그램 버킷
pub const CHAIN_LENGTH_BUCKETS: [f64; 7] = [1.0, 2.0, 3.0, 5.0, 10.0, 25.0, 100.0];

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// `metrics::describe_counter!()`, `describe_gauge!()`, `describe_histogram!()`을
/// 호출하여 HELP 텍스트를 설정합니다.
///
/// 이 함수는 전역 레코더 설치 후 한 번만 호출해야 합니다.
/// 레코더 설치는 이 워크스페이스를 사용하는 바이너리의 몫입니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge, describe_histogram};

    // Document Store
    describe_counter!(
        STORE_DOCUMENTS_STORED_TOTAL,
        "Total number of documents written to the store"
    );
    describe_counter!(
        STORE_DOCUMENTS_REMOVED_TOTAL,
        "Total number of documents removed from the store"
    );
    describe_gauge!(STORE_DOCUMENTS, "Number of documents currently stored");
    describe_counter!(
        STORE_ANNOTATIONS_WRITTEN_TOTAL,
        "Total number of annotation values written"
    );
    describe_counter!(
        STORE_RESOLUTIONS_TOTAL,
        "Total number of id/alias resolutions (by result)"
    );
    describe_counter!(
        STORE_INGEST_BYTES_TOTAL,
        "Total raw source bytes ingested (by format)"
    );

    // Revision Lineage
    describe_counter!(
        LINEAGE_REVISIONS_ADDED_TOTAL,
        "Total number of revisions linked into lineage chains"
    );
    describe_histogram!(
        LINEAGE_CHAIN_LENGTH,
        "Observed lineage chain length during traversals"
    );

    // Merge Engine
    describe_counter!(MERGE_COMPLETED_TOTAL, "Total number of completed merges");
    describe_counter!(MERGE_FAILED_TOTAL, "Total number of failed merges");
    describe_counter!(
        MERGE_INPUT_DOCUMENTS_TOTAL,
        "Total number of input documents consumed by merges"
    );
    describe_counter!(
        MERGE_ENTITIES_RECONCILED_TOTAL,
        "Total number of entities reconciled during merges (by kind)"
    );
    describe_histogram!(
        MERGE_DURATION_SECONDS,
        "Time to complete a single merge in seconds"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_METRIC_NAMES: &[&str] = &[
        STORE_DOCUMENTS_STORED_TOTAL,
        STORE_DOCUMENTS_REMOVED_TOTAL,
        STORE_DOCUMENTS,
        STORE_ANNOTATIONS_WRITTEN_TOTAL,
        STORE_RESOLUTIONS_TOTAL,
        STORE_INGEST_BYTES_TOTAL,
        LINEAGE_REVISIONS_ADDED_TOTAL,
        LINEAGE_CHAIN_LENGTH,
        MERGE_COMPLETED_TOTAL,
        MERGE_FAILED_TOTAL,
        MERGE_INPUT_DOCUMENTS_TOTAL,
        MERGE_ENTITIES_RECONCILED_TOTAL,
        MERGE_DURATION_SECONDS,
    ];

    #[test]
    fn all_metrics_start_with_bomvault_prefix() {
        for name in ALL_METRIC_NAMES {
            assert!(
                name.starts_with("bomvault_"),
                "Metric '{}' does not start with 'bomvault_' prefix",
                name
            );
        }
    }

    #[test]
    fn all_metrics_have_13_entries() {
        // 6 Store + 2 Lineage + 5 Merge
        assert_eq!(
            ALL_METRIC_NAMES.len(),
            13,
            "Expected 13 metrics (6 Store + 2 Lineage + 5 Merge)"
        );
    }

    #[test]
    fn describe_all_does_not_panic() {
        // describe_all() should not panic even without a recorder installed
        describe_all();
    }

    #[test]
    fn label_keys_are_lowercase() {
        let labels = [LABEL_FORMAT, LABEL_RESULT, LABEL_KIND];
        for label in &labels {
            assert_eq!(
                label.to_lowercase(),
                *label,
                "Label key '{}' should be lowercase",
                label
            );
        }
    }

    #[test]
    fn merge_duration_buckets_are_sorted() {
        let buckets = MERGE_DURATION_BUCKETS;
        for i in 1..buckets.len() {
            assert!(
                buckets[i] > buckets[i - 1],
                "Bucket values must be in ascending order"
            );
        }
    }

    #[test]
    fn chain_length_buckets_are_sorted() {
        let buckets = CHAIN_LENGTH_BUCKETS;
        for i in 1..buckets.len() {
            assert!(
                buckets[i] > buckets[i - 1],
                "Bucket values must be in ascending order"
            );
        }
    }
}
