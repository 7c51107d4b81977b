use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use tracing::debug;

use crate::database::MenuRecord;
use crate::utils::error::ApiError;

/// Storage capability the tree builder depends on: anything that can return
/// all flat menu records in one pass.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MenuStore: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<MenuRecord>>;
}

/// A menu entry with its children attached, ready for serialization.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuNode {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
    #[serde(rename = "order")]
    pub display_order: i32,
    pub children: Vec<MenuNode>,
}

pub struct MenuService {
    store: Arc<dyn MenuStore>,
}

impl MenuService {
    pub fn new(store: Arc<dyn MenuStore>) -> Self {
        Self { store }
    }

    /// Fetch all menu records and assemble them into a sorted forest.
    pub async fn menu_tree(&self) -> Result<Vec<MenuNode>, ApiError> {
        let records = self
            .store
            .fetch_all()
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        debug!("Assembling tree from {} menu records", records.len());

        Ok(build_tree(records))
    }
}

/// Assemble a flat record list into a forest of root nodes.
///
/// Sibling groups (and the roots themselves) are sorted by
/// `(display_order, id)` ascending, so output ordering is deterministic.
///
/// Orphan policy: a record whose parent id does not exist, or which names
/// itself as parent, is promoted to root. Records caught in a multi-node
/// cycle are unreachable from any root and are dropped.
pub fn build_tree(records: Vec<MenuRecord>) -> Vec<MenuNode> {
    let known_ids: HashSet<i64> = records.iter().map(|r| r.id).collect();

    let mut roots: Vec<MenuRecord> = Vec::new();
    let mut children_of: HashMap<i64, Vec<MenuRecord>> = HashMap::new();

    for record in records {
        match record.parent_id {
            Some(parent_id) if parent_id != record.id && known_ids.contains(&parent_id) => {
                children_of.entry(parent_id).or_default().push(record);
            }
            _ => roots.push(record),
        }
    }

    sort_siblings(&mut roots);

    roots
        .into_iter()
        .map(|root| attach_children(root, &mut children_of))
        .collect()
}

/// Each id's child group is removed from the map exactly once, so recursion
/// terminates even if the input contains a cycle.
fn attach_children(record: MenuRecord, children_of: &mut HashMap<i64, Vec<MenuRecord>>) -> MenuNode {
    let mut children = children_of.remove(&record.id).unwrap_or_default();
    sort_siblings(&mut children);

    MenuNode {
        id: record.id,
        name: record.name,
        parent_id: record.parent_id,
        display_order: record.display_order,
        children: children
            .into_iter()
            .map(|child| attach_children(child, children_of))
            .collect(),
    }
}

fn sort_siblings(records: &mut [MenuRecord]) {
    records.sort_by_key(|r| (r.display_order, r.id));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, parent_id: Option<i64>, display_order: i32, name: &str) -> MenuRecord {
        MenuRecord {
            id,
            name: name.to_string(),
            parent_id,
            display_order,
        }
    }

    fn count_nodes(nodes: &[MenuNode]) -> usize {
        nodes.iter().map(|n| 1 + count_nodes(&n.children)).sum()
    }

    #[test]
    fn empty_input_builds_empty_forest() {
        assert!(build_tree(Vec::new()).is_empty());
    }

    #[test]
    fn nests_children_under_parent() {
        let tree = build_tree(vec![
            record(1, None, 0, "A"),
            record(2, Some(1), 0, "B"),
            record(3, Some(1), 1, "C"),
        ]);

        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].name, "A");
        let children: Vec<&str> = tree[0].children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(children, ["B", "C"]);
        assert!(tree[0].children.iter().all(|c| c.children.is_empty()));
    }

    #[test]
    fn preserves_node_count_for_wellformed_input() {
        let records = vec![
            record(1, None, 0, "a"),
            record(2, None, 1, "b"),
            record(3, Some(1), 0, "a1"),
            record(4, Some(1), 1, "a2"),
            record(5, Some(3), 0, "a1x"),
            record(6, Some(2), 0, "b1"),
        ];
        let total = records.len();

        let tree = build_tree(records);

        assert_eq!(count_nodes(&tree), total);
    }

    #[test]
    fn sorts_siblings_by_display_order_then_id() {
        let tree = build_tree(vec![
            record(1, None, 2, "late"),
            record(3, None, 1, "tie-high-id"),
            record(2, None, 1, "tie-low-id"),
        ]);

        let ids: Vec<i64> = tree.iter().map(|n| n.id).collect();
        assert_eq!(ids, [2, 3, 1]);
    }

    #[test]
    fn sorts_children_within_each_parent() {
        let tree = build_tree(vec![
            record(1, None, 0, "root"),
            record(4, Some(1), 5, "last"),
            record(2, Some(1), 0, "first"),
            record(3, Some(1), 0, "second"),
        ]);

        let ids: Vec<i64> = tree[0].children.iter().map(|c| c.id).collect();
        assert_eq!(ids, [2, 3, 4]);
    }

    #[test]
    fn orphan_is_promoted_to_root() {
        let tree = build_tree(vec![
            record(1, None, 0, "real root"),
            record(2, Some(99), 1, "orphan"),
        ]);

        let ids: Vec<i64> = tree.iter().map(|n| n.id).collect();
        assert_eq!(ids, [1, 2]);
        assert!(tree[1].children.is_empty());
    }

    #[test]
    fn self_cycle_terminates_and_is_isolated() {
        let tree = build_tree(vec![record(1, Some(1), 0, "loop")]);

        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].id, 1);
        assert!(tree[0].children.is_empty());
    }

    #[test]
    fn multi_node_cycle_is_dropped() {
        let tree = build_tree(vec![
            record(1, None, 0, "root"),
            record(2, Some(3), 0, "cycle"),
            record(3, Some(2), 0, "cycle"),
        ]);

        assert_eq!(count_nodes(&tree), 1);
        assert_eq!(tree[0].id, 1);
    }

    #[test]
    fn serializes_with_api_field_names() {
        let tree = build_tree(vec![
            record(1, None, 0, "A"),
            record(2, Some(1), 0, "B"),
            record(3, Some(1), 1, "C"),
        ]);

        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "id": 1,
                "name": "A",
                "parentId": null,
                "order": 0,
                "children": [
                    {"id": 2, "name": "B", "parentId": 1, "order": 0, "children": []},
                    {"id": 3, "name": "C", "parentId": 1, "order": 1, "children": []},
                ],
            }])
        );

        // repeated assembly of the same input is byte-identical
        let again = build_tree(vec![
            record(1, None, 0, "A"),
            record(2, Some(1), 0, "B"),
            record(3, Some(1), 1, "C"),
        ]);
        assert_eq!(
            serde_json::to_string(&tree).unwrap(),
            serde_json::to_string(&again).unwrap()
        );
    }

    #[tokio::test]
    async fn menu_tree_maps_store_failure_to_database_error() {
        let mut store = MockMenuStore::new();
        store
            .expect_fetch_all()
            .returning(|| Err(anyhow::anyhow!("connection refused")));

        let service = MenuService::new(Arc::new(store));

        let err = service.menu_tree().await.unwrap_err();
        assert!(matches!(err, ApiError::DatabaseError(_)));
    }

    #[tokio::test]
    async fn menu_tree_returns_sorted_forest() {
        let mut store = MockMenuStore::new();
        store.expect_fetch_all().returning(|| {
            Ok(vec![
                record(2, Some(1), 0, "child"),
                record(1, None, 0, "root"),
            ])
        });

        let service = MenuService::new(Arc::new(store));

        let tree = service.menu_tree().await.unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].children.len(), 1);
        assert_eq!(tree[0].children[0].id, 2);
    }
}
