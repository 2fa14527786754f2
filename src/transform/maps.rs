//! Correspondence table types
//!
//! Defines the old→new element table built during a pass.

use rustc_hash::FxHashMap;

use crate::model::PortElement;

/// Correspondence table: element of the source model → element of the
/// destination model
pub type ElementMap = FxHashMap<PortElement, PortElement>;

/// Chain two tables: `first` maps A→B, `second` maps B→C, result maps A→C
///
/// Entries of `first` whose target has no entry in `second` are dropped: the
/// second pass did not visit that part of the graph.
pub fn compose_maps(first: &ElementMap, second: &ElementMap) -> ElementMap {
    first
        .iter()
        .filter_map(|(old, mid)| second.get(mid).map(|new| (*old, *new)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NodeId, PortAddress};

    fn element(node: u64, index: usize) -> PortElement {
        PortElement::new(PortAddress::new(NodeId::from_raw(node), 0), index)
    }

    #[test]
    fn test_compose_maps() {
        let first: ElementMap = [(element(1, 0), element(2, 0)), (element(1, 1), element(2, 1))]
            .into_iter()
            .collect();
        let second: ElementMap = [(element(2, 0), element(3, 5))].into_iter().collect();

        let composed = compose_maps(&first, &second);
        assert_eq!(composed.len(), 1);
        assert_eq!(composed.get(&element(1, 0)), Some(&element(3, 5)));
        assert!(composed.get(&element(1, 1)).is_none());
    }
}
