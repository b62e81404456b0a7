//! Edges from reaction participants and from complex components.
//!
//! Both passes expect every node to be registered already and rows
//! sorted so that the rows of one reaction (or one complex) are next
//! to each other.

use std::collections::BTreeSet;

use anyhow::Result;
use log::debug;

use crate::{graph::contiguous_runs,
            records::{Component, Participant},
            registry::{NodeFact, NodeRegistry},
            NodeId, RoleBucket, ROLE_BUCKETS};

#[derive(Debug, Default)]
struct ReactionBuckets {
    inputs: BTreeSet<NodeId>,
    outputs: BTreeSet<NodeId>,
    catalysts: BTreeSet<NodeId>,
    regulators: BTreeSet<NodeId>,
}

impl ReactionBuckets {
    fn add(&mut self, bucket: RoleBucket, id: &str) {
        let set = match bucket {
            RoleBucket::Input => &mut self.inputs,
            RoleBucket::Output => &mut self.outputs,
            RoleBucket::Catalyst => &mut self.catalysts,
            RoleBucket::Regulator => &mut self.regulators,
        };
        set.insert(id.to_owned());
    }

    // inputs, catalysts and regulators are each connected to the
    // outputs, and to nothing else
    fn connect(&self, registry: &mut NodeRegistry) -> Result<usize> {
        Ok(registry.connect_product(&self.inputs, &self.outputs)? +
           registry.connect_product(&self.catalysts, &self.outputs)? +
           registry.connect_product(&self.regulators, &self.outputs)?)
    }
}

/// Record the role, reaction and pathway of every participant on its
/// node and connect the participants of each reaction.  Rows with a
/// role that isn't in [ROLE_BUCKETS] are recorded but not connected.
pub fn connect_reaction_participants(registry: &mut NodeRegistry, participants: &[Participant])
    -> Result<()>
{
    let reaction_key = |row: &Participant| (row.pathway.clone(), row.reaction.clone());

    for reaction_rows in contiguous_runs(participants, reaction_key) {
        let mut buckets = ReactionBuckets::default();

        for row in reaction_rows {
            let id = &row.entity.id;

            registry.attach_fact(id, NodeFact::Role(&row.role))?;
            registry.attach_fact(id, NodeFact::Reaction(&row.reaction))?;
            if let Some(ref pathway) = row.pathway {
                registry.attach_fact(id, NodeFact::Pathway(pathway))?;
            }

            if let Some(&bucket) = ROLE_BUCKETS.get(row.role.as_str()) {
                buckets.add(bucket, id);
            }
        }

        let added = buckets.connect(registry)?;

        debug!("reaction {}: inputs {:?}, outputs {:?}, catalysts {:?}, regulators {:?}, {} new edges",
               reaction_rows[0].reaction, buckets.inputs, buckets.outputs,
               buckets.catalysts, buckets.regulators, added);
    }

    debug!("after reactions: {} nodes, {} edges", registry.node_count(), registry.edge_count());

    Ok(())
}

/// Record the complex of every component on its node and connect all
/// components of a complex to each other
pub fn connect_complex_components(registry: &mut NodeRegistry, components: &[Component])
    -> Result<()>
{
    for complex_rows in contiguous_runs(components, |row| row.complex.clone()) {
        let mut members = BTreeSet::new();

        for row in complex_rows {
            registry.attach_fact(&row.entity.id, NodeFact::Complex(&row.complex))?;
            members.insert(row.entity.id.clone());
        }

        let added = registry.connect_product(&members, &members)?;

        debug!("complex {}: {} components, {} new edges",
               complex_rows[0].complex, members.len(), added);
    }

    debug!("after complexes: {} nodes, {} edges", registry.node_count(), registry.edge_count());

    Ok(())
}
