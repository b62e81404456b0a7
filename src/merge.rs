//! Merging networks of the same level into one composite network

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use petgraph::graph::NodeIndex;

use crate::{network::{InteractionEdge, InteractionGraph, InteractionNetwork, NetworkMetadata,
                      Scope},
            NetworkError, NodeId};

/// Return the union of `networks`.
///
/// The nodes are the union of the nodes of all networks.  A node found
/// in several networks takes its type, colour and previous-level id
/// from the first network that has it, and its roles, reactions,
/// pathways and complexes from all of them.  The edges are the union of
/// all edges.  The result has the same nodes, edges and node sets
/// whatever the order of `networks`.
///
/// All networks must have the same level.
pub fn merge_graphs(networks: &[InteractionNetwork]) -> Result<InteractionNetwork> {
    let Some(first) = networks.first()
    else {
        return Err(anyhow!("no networks to merge"));
    };

    let level = first.level();

    if let Some(other) = networks.iter().find(|network| network.level() != level) {
        return Err(NetworkError::LevelMismatch { expected: level, found: other.level() }.into());
    }

    let mut graph = InteractionGraph::default();
    let mut node_indexes: HashMap<NodeId, NodeIndex> = HashMap::new();

    for network in networks {
        for node in network.nodes() {
            let existing_idx = node_indexes.get(&node.id).copied();

            match existing_idx {
                Some(idx) => graph[idx].union_sets(node),
                None => {
                    let idx = graph.add_node(node.clone());
                    node_indexes.insert(node.id.clone(), idx);
                }
            }
        }
    }

    for network in networks {
        for (a, b) in network.edges() {
            let (Some(&a_idx), Some(&b_idx)) = (node_indexes.get(&a), node_indexes.get(&b))
            else {
                return Err(NetworkError::UnregisteredNode(format!("{} or {}", a, b)).into());
            };

            if graph.find_edge(a_idx, b_idx).is_none() {
                graph.add_edge(a_idx, b_idx, InteractionEdge::default());
            }
        }
    }

    let small_molecules = networks.iter().any(|network| network.metadata().small_molecules);
    let metadata = NetworkMetadata::new(level, small_molecules, Scope::Full);

    Ok(InteractionNetwork::from_parts(graph, node_indexes, metadata))
}
