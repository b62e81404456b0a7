//! The node registry owns the graph while it is being built.  Nodes
//! must be registered before facts or edges can refer to them.

use std::collections::{BTreeSet, HashMap};

use anyhow::Result;
use petgraph::graph::NodeIndex;

use crate::{graph::product_pairs,
            network::{InteractionEdge, InteractionGraph, InteractionNetwork, NetworkMetadata,
                      NetworkNode, Scope},
            records::EntityRow,
            EntityType, Level, NetworkError, NodeId};

/// A set-valued attribute of a node, with the value to add
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeFact<'a> {
    Role(&'a str),
    Reaction(&'a str),
    Pathway(&'a str),
    Complex(&'a str),
}

#[derive(Debug, Clone)]
pub struct NodeRegistry {
    level: Level,
    graph: InteractionGraph,
    node_indexes: HashMap<NodeId, NodeIndex>,
}

impl NodeRegistry {
    pub fn new(level: Level) -> NodeRegistry {
        NodeRegistry {
            level,
            graph: InteractionGraph::default(),
            node_indexes: HashMap::new(),
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// Create the node for `id` if it doesn't exist yet.  The type,
    /// colour and previous-level id come from the first sighting and
    /// are never changed by later rows with the same id.
    pub fn register_if_absent(&mut self, id: &str, type_string: &str, prev_id: Option<&str>)
        -> NodeIndex
    {
        if let Some(&idx) = self.node_indexes.get(id) {
            return idx;
        }

        let node_type = EntityType::resolve(type_string, self.level);

        let prev_id =
            if node_type.is_small_molecule() {
                Some(id.to_owned())
            } else {
                prev_id.map(str::to_owned)
            };

        let idx = self.graph.add_node(NetworkNode::new(id, node_type, prev_id));
        self.node_indexes.insert(id.to_owned(), idx);

        idx
    }

    /// Register the entity of a normalised row
    pub fn register_row(&mut self, row: &EntityRow) -> NodeIndex {
        self.register_if_absent(&row.id, &row.type_string, row.prev_id.as_deref())
    }

    fn index_of(&self, id: &str) -> Result<NodeIndex> {
        self.node_indexes.get(id).copied()
            .ok_or_else(|| NetworkError::UnregisteredNode(id.to_owned()).into())
    }

    /// Add a value to one of the sets of a registered node
    pub fn attach_fact(&mut self, id: &str, fact: NodeFact<'_>) -> Result<()> {
        let idx = self.index_of(id)?;
        let node = &mut self.graph[idx];

        let (set, value) = match fact {
            NodeFact::Role(value) => (&mut node.roles, value),
            NodeFact::Reaction(value) => (&mut node.reactions, value),
            NodeFact::Pathway(value) => (&mut node.pathways, value),
            NodeFact::Complex(value) => (&mut node.complexes, value),
        };

        // most facts are repeats, so only allocate for new values
        if !set.contains(value) {
            set.insert(value.to_owned());
        }

        Ok(())
    }

    /// Connect two registered nodes.  Connecting a node to itself or
    /// connecting an already connected pair does nothing.  Returns true
    /// if a new edge was added.
    pub fn connect(&mut self, a: &str, b: &str) -> Result<bool> {
        let a_idx = self.index_of(a)?;
        let b_idx = self.index_of(b)?;

        if a_idx == b_idx || self.graph.find_edge(a_idx, b_idx).is_some() {
            return Ok(false);
        }

        self.graph.add_edge(a_idx, b_idx, InteractionEdge::default());

        Ok(true)
    }

    /// Connect every member of `first` to every member of `second`
    pub fn connect_product(&mut self, first: &BTreeSet<NodeId>, second: &BTreeSet<NodeId>)
        -> Result<usize>
    {
        let mut added = 0;

        for (a, b) in product_pairs(first, second) {
            if self.connect(a, b)? {
                added += 1;
            }
        }

        Ok(added)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node_indexes.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&NetworkNode> {
        self.node_indexes.get(id).map(|&idx| &self.graph[idx])
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Finish building and return the network
    pub fn into_network(self, small_molecules: bool, scope: Scope) -> InteractionNetwork {
        let metadata = NetworkMetadata::new(self.level, small_molecules, scope);
        InteractionNetwork::from_parts(self.graph, self.node_indexes, metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EWAS: &str = "EntityWithAccessionedSequence";

    #[test]
    fn register_if_absent_test() {
        let mut registry = NodeRegistry::new(Level::Proteins);

        let first = registry.register_if_absent("P28482", EWAS, Some("MAPK1"));
        // a contradicting duplicate doesn't change the base attributes
        let second = registry.register_if_absent("P28482", "SimpleEntity", Some("OTHER"));
        assert_eq!(first, second);
        assert_eq!(registry.node_count(), 1);

        let node = registry.node("P28482").unwrap();
        assert_eq!(node.node_type, EntityType::ProteinEntity);
        assert_eq!(node.prev_id.as_deref(), Some("MAPK1"));
        assert_eq!(node.display_color, "#E69F00");
        assert!(node.roles.is_empty() && node.complexes.is_empty());

        registry.register_if_absent("ATP", "SimpleEntity", Some("ignored"));
        let atp = registry.node("ATP").unwrap();
        assert_eq!(atp.node_type, EntityType::SmallMolecule);
        assert_eq!(atp.prev_id.as_deref(), Some("ATP"));
        assert_eq!(atp.display_color, "#BDBDBD");
    }

    #[test]
    fn attach_fact_test() {
        let mut registry = NodeRegistry::new(Level::Genes);
        registry.register_if_absent("MAPK1", EWAS, None);

        registry.attach_fact("MAPK1", NodeFact::Role("input")).unwrap();
        registry.attach_fact("MAPK1", NodeFact::Role("input")).unwrap();
        registry.attach_fact("MAPK1", NodeFact::Complex("R-HSA-C1")).unwrap();

        let node = registry.node("MAPK1").unwrap();
        assert_eq!(node.roles.len(), 1);
        assert!(node.complexes.contains("R-HSA-C1"));

        let err = registry.attach_fact("MAPK3", NodeFact::Pathway("R-HSA-1")).unwrap_err();
        assert_eq!(err.downcast_ref::<NetworkError>(),
                   Some(&NetworkError::UnregisteredNode("MAPK3".into())));
        assert!(!registry.contains("MAPK3"));
    }

    #[test]
    fn connect_test() {
        let mut registry = NodeRegistry::new(Level::Genes);
        registry.register_if_absent("A", EWAS, None);
        registry.register_if_absent("B", EWAS, None);

        assert!(registry.connect("A", "B").unwrap());
        assert!(!registry.connect("B", "A").unwrap());
        assert!(!registry.connect("A", "A").unwrap());
        assert_eq!(registry.edge_count(), 1);

        assert!(registry.connect("A", "Z").is_err());
        assert_eq!(registry.node_count(), 2);
    }
}
