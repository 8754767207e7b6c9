use eframe::egui::Vec2;

use super::{Column, Edge, Node};
use crate::api::{GraphPayload, RawColumn, RawEdge, RawId, RawNode};

impl GraphPayload {
    pub fn into_graph(self) -> (Vec<Node>, Vec<Edge>) {
        normalize(&self.nodes, &self.edges)
    }
}

/// Reshapes decoded API records into canvas nodes and edges.
///
/// Edge endpoints are not checked against the node list; the layout engine
/// decides what to do with dangling references.
pub fn normalize(raw_nodes: &[RawNode], raw_edges: &[RawEdge]) -> (Vec<Node>, Vec<Edge>) {
    let nodes = raw_nodes.iter().map(normalize_node).collect();
    let edges = raw_edges.iter().map(normalize_edge).collect();
    (nodes, edges)
}

pub fn edge_id(source: &str, target: &str) -> String {
    format!("{source}-{target}")
}

fn normalize_node(raw: &RawNode) -> Node {
    let id = coerce_id(&raw.id);
    let raw_columns = raw.columns.as_deref().unwrap_or_default();

    let label = raw
        .name
        .as_deref()
        .filter(|name| !name.is_empty())
        .or_else(|| {
            raw_columns
                .first()
                .map(|column| column.name.as_str())
                .filter(|name| !name.is_empty())
        })
        .map(str::to_owned)
        .unwrap_or_else(|| id.clone());

    Node {
        label,
        columns: raw_columns.iter().map(normalize_column).collect(),
        position: Vec2::ZERO,
        id,
    }
}

fn normalize_column(raw: &RawColumn) -> Column {
    Column {
        name: raw.name.clone(),
        package: raw.dataset.package.name.clone(),
        dataset: raw.dataset.name.clone(),
        examples: raw.examples.iter().map(|example| example.display_value()).collect(),
    }
}

fn normalize_edge(raw: &RawEdge) -> Edge {
    let source = coerce_id(&raw.source);
    let target = coerce_id(&raw.target);
    Edge {
        id: edge_id(&source, &target),
        source,
        target,
        weight: raw.weight,
    }
}

fn coerce_id(raw: &RawId) -> String {
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    fn raw_node(value: serde_json::Value) -> RawNode {
        serde_json::from_value(value).unwrap()
    }

    fn raw_edge(source: RawId, target: RawId) -> RawEdge {
        RawEdge {
            source,
            target,
            weight: None,
        }
    }

    #[test]
    fn two_node_payload_normalizes() {
        let payload: GraphPayload = serde_json::from_value(json!({
            "nodes": [{ "id": 1, "name": "A" }, { "id": 2, "name": "B" }],
            "edges": [{ "source": 1, "target": 2 }]
        }))
        .unwrap();

        let (nodes, edges) = payload.into_graph();

        let ids = nodes.iter().map(|node| node.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(nodes[0].label, "A");
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].id, "1-2");
        assert_eq!(edges[0].source, "1");
        assert_eq!(edges[0].target, "2");
    }

    #[test]
    fn float_endpoints_share_ids_with_integer_nodes() {
        let payload: GraphPayload = serde_json::from_value(json!({
            "nodes": [{ "id": 1 }, { "id": 2 }],
            "edges": [{ "source": 1.0, "target": 2.0 }]
        }))
        .unwrap();

        let (_, edges) = payload.into_graph();

        assert_eq!(edges[0].id, "1-2");
        assert_eq!(edges[0].source, "1");
    }

    #[test]
    fn label_falls_back_to_first_column_then_id() {
        let column = json!({
            "name": "customer_email",
            "dataset": { "name": "customers", "package": { "name": "crm" } },
            "examples": [{ "value": "a@b.c" }, { "value": 3 }]
        });
        let raw = [
            raw_node(json!({ "id": 1, "name": "Customers", "columns": [column.clone()] })),
            raw_node(json!({ "id": 2, "name": "", "columns": [column] })),
            raw_node(json!({ "id": 3 })),
        ];

        let (nodes, _) = normalize(&raw, &[]);

        assert_eq!(nodes[0].label, "Customers");
        assert_eq!(nodes[1].label, "customer_email");
        assert_eq!(nodes[2].label, "3");
        assert_eq!(
            nodes[1].columns,
            vec![Column {
                name: "customer_email".to_owned(),
                package: "crm".to_owned(),
                dataset: Some("customers".to_owned()),
                examples: vec!["a@b.c".to_owned(), "3".to_owned()],
            }]
        );
        assert!(nodes[2].columns.is_empty());
    }

    #[test]
    fn positions_start_at_origin() {
        let (nodes, _) = normalize(&[raw_node(json!({ "id": "x" }))], &[]);
        assert_eq!(nodes[0].position, Vec2::ZERO);
    }

    #[test]
    fn dangling_edges_pass_through() {
        let (nodes, edges) = normalize(
            &[raw_node(json!({ "id": 1 }))],
            &[raw_edge(1_u64.into(), 99_u64.into())],
        );

        assert_eq!(nodes.len(), 1);
        assert_eq!(edges[0].id, "1-99");
    }

    fn arb_id() -> impl Strategy<Value = RawId> {
        prop_oneof![
            any::<u64>().prop_map(RawId::from),
            "[a-z0-9_]{1,12}".prop_map(|text| RawId::from(text.as_str())),
        ]
    }

    proptest! {
        #[test]
        fn edge_ids_are_source_dash_target(
            pairs in prop::collection::vec((arb_id(), arb_id()), 0..24)
        ) {
            let raw_edges = pairs
                .iter()
                .map(|(source, target)| raw_edge(source.clone(), target.clone()))
                .collect::<Vec<_>>();

            let (_, edges) = normalize(&[], &raw_edges);

            prop_assert_eq!(edges.len(), pairs.len());
            for (edge, (source, target)) in edges.iter().zip(&pairs) {
                prop_assert_eq!(&edge.id, &format!("{source}-{target}"));
                prop_assert_eq!(&edge.source, &source.to_string());
                prop_assert_eq!(&edge.target, &target.to_string());
            }
        }

        #[test]
        fn normalize_is_deterministic(
            ids in prop::collection::vec(arb_id(), 0..24),
            names in prop::collection::vec(prop::option::of("[A-Za-z ]{0,8}"), 24)
        ) {
            let raw_nodes = ids
                .iter()
                .zip(&names)
                .map(|(id, name)| RawNode {
                    id: id.clone(),
                    name: name.clone(),
                    columns: None,
                })
                .collect::<Vec<_>>();
            let raw_edges = ids
                .windows(2)
                .map(|pair| raw_edge(pair[0].clone(), pair[1].clone()))
                .collect::<Vec<_>>();

            let first = normalize(&raw_nodes, &raw_edges);
            let second = normalize(&raw_nodes, &raw_edges);

            prop_assert_eq!(&first, &second);
            for (node, id) in first.0.iter().zip(&ids) {
                prop_assert_eq!(&node.id, &id.to_string());
            }
        }
    }
}
