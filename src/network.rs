//! The interaction network value type: an undirected [petgraph]
//! graph of [NetworkNode]s plus the metadata of how it was built.

use std::{collections::{BTreeMap, BTreeSet, HashMap}, fmt::{self, Display}};

use petgraph::{graph::NodeIndex, Graph, Undirected};

use crate::{ComplexId, EntityType, Level, NodeId, PathwayId, ReactionId, Role};

/// A node in an interaction network.  `node_type`, `display_color`
/// and `prev_id` are set when the node is first seen; the sets only
/// grow.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NetworkNode {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub node_type: EntityType,
    pub display_color: String,
    /// The id of this entity at the next coarser level (the gene for a
    /// protein, the protein for a proteoform).  Small molecules use
    /// their own id.
    #[serde(skip_serializing_if="Option::is_none")]
    pub prev_id: Option<NodeId>,
    #[serde(skip_serializing_if="BTreeSet::is_empty", default)]
    pub roles: BTreeSet<Role>,
    #[serde(skip_serializing_if="BTreeSet::is_empty", default)]
    pub reactions: BTreeSet<ReactionId>,
    #[serde(skip_serializing_if="BTreeSet::is_empty", default)]
    pub pathways: BTreeSet<PathwayId>,
    #[serde(skip_serializing_if="BTreeSet::is_empty", default)]
    pub complexes: BTreeSet<ComplexId>,
}

impl NetworkNode {
    pub fn new(id: &str, node_type: EntityType, prev_id: Option<NodeId>) -> NetworkNode {
        NetworkNode {
            id: id.to_owned(),
            node_type,
            display_color: node_type.color().to_owned(),
            prev_id,
            roles: BTreeSet::new(),
            reactions: BTreeSet::new(),
            pathways: BTreeSet::new(),
            complexes: BTreeSet::new(),
        }
    }

    /// Add the set-valued attributes of `other` to this node
    pub fn union_sets(&mut self, other: &NetworkNode) {
        self.roles.extend(other.roles.iter().cloned());
        self.reactions.extend(other.reactions.iter().cloned());
        self.pathways.extend(other.pathways.iter().cloned());
        self.complexes.extend(other.complexes.iter().cloned());
    }
}

/// An edge between two interacting entities.  Edges carry no
/// attributes; they serialise as an empty map.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InteractionEdge {}

pub type InteractionGraph = Graph<NetworkNode, InteractionEdge, Undirected>;

/// What a network was built from
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Pathway(PathwayId),
    Reaction(ReactionId),
    Complex(ComplexId),
    /// Every reaction and complex, or a merge of several networks
    Full,
}

impl Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Pathway(id) | Scope::Reaction(id) | Scope::Complex(id) => write!(f, "{}", id),
            Scope::Full => write!(f, "full"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NetworkMetadata {
    pub level: Level,
    pub small_molecules: bool,
    pub scope: Scope,
    /// Number of nodes of each type
    pub counts: BTreeMap<EntityType, usize>,
}

impl NetworkMetadata {
    pub fn new(level: Level, small_molecules: bool, scope: Scope) -> NetworkMetadata {
        NetworkMetadata {
            level,
            small_molecules,
            scope,
            counts: BTreeMap::new(),
        }
    }
}

/// An undirected interaction network with no self-loops and at most
/// one edge between two nodes
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct InteractionNetwork {
    graph: InteractionGraph,
    node_indexes: HashMap<NodeId, NodeIndex>,
    metadata: NetworkMetadata,
}

impl InteractionNetwork {
    pub(crate) fn from_parts(graph: InteractionGraph, node_indexes: HashMap<NodeId, NodeIndex>,
                             mut metadata: NetworkMetadata)
        -> InteractionNetwork
    {
        metadata.counts = BTreeMap::new();
        for node in graph.node_weights() {
            *metadata.counts.entry(node.node_type).or_insert(0) += 1;
        }

        InteractionNetwork {
            graph,
            node_indexes,
            metadata,
        }
    }

    /// A network with no nodes, for a pathway that doesn't exist
    pub fn empty(metadata: NetworkMetadata) -> InteractionNetwork {
        InteractionNetwork::from_parts(InteractionGraph::default(), HashMap::new(), metadata)
    }

    pub fn metadata(&self) -> &NetworkMetadata {
        &self.metadata
    }

    pub fn level(&self) -> Level {
        self.metadata.level
    }

    pub fn graph(&self) -> &InteractionGraph {
        &self.graph
    }

    pub fn node(&self, id: &str) -> Option<&NetworkNode> {
        self.node_indexes.get(id)
            .and_then(|&idx| self.graph.node_weight(idx))
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// The number of nodes of the given type
    pub fn type_count(&self, node_type: EntityType) -> usize {
        self.metadata.counts.get(&node_type).copied().unwrap_or(0)
    }

    /// An iterator over the nodes, in insertion order
    pub fn nodes(&self) -> Box<dyn Iterator<Item = &NetworkNode> + '_> {
        Box::new(self.graph.node_weights())
    }

    pub fn has_edge(&self, a: &str, b: &str) -> bool {
        let (Some(&a_idx), Some(&b_idx)) = (self.node_indexes.get(a), self.node_indexes.get(b))
        else {
            return false;
        };

        self.graph.find_edge(a_idx, b_idx).is_some()
    }

    /// Every edge as a pair of node ids, the smaller id first, sorted
    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        let mut ret: Vec<_> = self.graph.edge_indices()
            .filter_map(|edge_idx| self.graph.edge_endpoints(edge_idx))
            .map(|(a_idx, b_idx)| {
                let a = self.graph[a_idx].id.clone();
                let b = self.graph[b_idx].id.clone();
                if a <= b { (a, b) } else { (b, a) }
            })
            .collect();

        ret.sort();
        ret
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_network_test() {
        let metadata = NetworkMetadata::new(Level::Genes, false, Scope::Pathway("R-HSA-0".into()));
        let network = InteractionNetwork::empty(metadata);

        assert!(network.is_empty());
        assert_eq!(network.edge_count(), 0);
        assert_eq!(network.level(), Level::Genes);
        assert_eq!(network.type_count(EntityType::GeneEntity), 0);
        assert!(!network.has_edge("A", "B"));
        assert_eq!(network.metadata().scope.to_string(), "R-HSA-0");
    }

    #[test]
    fn union_sets_test() {
        let mut a = NetworkNode::new("P1", EntityType::ProteinEntity, Some("G1".into()));
        a.reactions.insert("R1".into());
        let mut b = NetworkNode::new("P1", EntityType::ProteinEntity, Some("G1".into()));
        b.reactions.insert("R2".into());
        b.complexes.insert("C1".into());

        a.union_sets(&b);

        assert_eq!(a.reactions.len(), 2);
        assert!(a.complexes.contains("C1"));
        assert_eq!(a.display_color, "#E69F00");
    }
}
