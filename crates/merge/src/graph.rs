//! 그래프 합집합과 루트 통합
//!
//! 두 변환 모두 순수 함수입니다. [`union_graphs`]는 여러 그래프를 노드
//! id 기준으로 합치고, [`consolidate_roots`]는 합쳐진 그래프의 루트들을
//! 합성 루트 하나로 대체합니다. 엣지는 항상 `(종류, 출발)` 쌍으로
//! 통합되어 같은 관계가 두 엔트리로 남지 않습니다.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use bomvault_core::types::{Edge, EdgeKind, Node, NodeGraph, NodeKind};

use crate::reconcile::{Reconcile, merge_keyed, union_strings};

/// 여러 노드 그래프를 하나로 합칩니다.
///
/// 노드는 id로 합쳐지며 중복 노드는 빈 필드만 채워집니다. 엣지는
/// `(종류, 출발)` 쌍으로 통합되고 대상 목록은 순서를 보존하며 중복이
/// 제거됩니다. 루트 엘리먼트 목록도 순서를 보존하며 합쳐집니다.
pub fn union_graphs(graphs: &[&NodeGraph]) -> NodeGraph {
    let mut merged = NodeGraph::default();
    for graph in graphs {
        merged.nodes = merge_keyed(&merged.nodes, &graph.nodes);
        merged.edges = merge_edges(&merged.edges, &graph.edges);
        merged.root_elements = union_strings(&merged.root_elements, &graph.root_elements);
    }
    merged
}

/// 그래프의 루트들을 합성 루트 하나로 통합합니다.
///
/// `new_root_id`의 패키지 노드가 루트 목록 순서대로 기존 루트
/// 노드들의 값으로 채워져 맨 앞에 들어갑니다. 기존 루트를 가리키던
/// 엣지 출발점과 대상은 모두 새 루트로 재지정되고, 재지정으로 생긴
/// 자기 순환은 버려집니다. 기존 루트 노드는 재지정이 끝난 뒤에야
/// 제거되며, 루트 엘리먼트 목록은 새 id 하나로 바뀝니다.
pub fn consolidate_roots(graph: NodeGraph, new_root_id: &str) -> NodeGraph {
    let old_roots = graph.root_elements.clone();
    let is_old_root = |id: &str| old_roots.iter().any(|r| r == id);

    let mut root = Node {
        id: new_root_id.to_owned(),
        kind: NodeKind::Package,
        ..Default::default()
    };
    for id in &old_roots {
        if let Some(node) = graph.node(id) {
            root = root.fill_from(node);
        }
    }

    let mut edges: Vec<Edge> = Vec::new();
    let mut index: HashMap<(EdgeKind, String), usize> = HashMap::new();
    for edge in &graph.edges {
        let from = if is_old_root(&edge.from) {
            new_root_id.to_owned()
        } else {
            edge.from.clone()
        };
        let mut to: Vec<String> = Vec::new();
        for target in &edge.to {
            let mapped = if is_old_root(target) {
                new_root_id.to_owned()
            } else {
                target.clone()
            };
            if mapped != from && !to.contains(&mapped) {
                to.push(mapped);
            }
        }
        if to.is_empty() {
            continue;
        }
        match index.entry((edge.kind, from.clone())) {
            Entry::Occupied(slot) => {
                let existing = &mut edges[*slot.get()];
                existing.to = union_strings(&existing.to, &to);
            }
            Entry::Vacant(slot) => {
                slot.insert(edges.len());
                edges.push(Edge {
                    kind: edge.kind,
                    from,
                    to,
                });
            }
        }
    }

    let mut nodes = Vec::with_capacity(graph.nodes.len() + 1);
    nodes.push(root);
    nodes.extend(graph.nodes.into_iter().filter(|n| !is_old_root(&n.id)));

    NodeGraph {
        nodes,
        edges,
        root_elements: vec![new_root_id.to_owned()],
    }
}

/// 엣지 목록을 `(종류, 출발)` 쌍으로 통합합니다.
fn merge_edges(base: &[Edge], incoming: &[Edge]) -> Vec<Edge> {
    let mut merged = base.to_vec();
    let mut index: HashMap<(EdgeKind, String), usize> =
        HashMap::with_capacity(merged.len() + incoming.len());
    for (slot, edge) in merged.iter().enumerate() {
        index.entry((edge.kind, edge.from.clone())).or_insert(slot);
    }
    for edge in incoming {
        match index.entry((edge.kind, edge.from.clone())) {
            Entry::Occupied(slot) => {
                let existing = &mut merged[*slot.get()];
                existing.to = union_strings(&existing.to, &edge.to);
            }
            Entry::Vacant(slot) => {
                slot.insert(merged.len());
                merged.push(edge.clone());
            }
        }
    }
    merged
}
