//! Building networks for pathways, reactions and the full database.
//!
//! Each network is built from scratch from the rows of a
//! [RecordSource]: every entity is registered first, then the reaction
//! edges and the complex edges are added.

use std::path::PathBuf;

use anyhow::Result;
use log::{error, info};
use rayon::prelude::*;

use crate::{config::NetworkConfig,
            edges::{connect_complex_components, connect_reaction_participants},
            network::{InteractionNetwork, NetworkMetadata, Scope},
            normalize::{fix_components, fix_participants},
            persist,
            records::{ComponentRecord, ParticipantRecord, RecordSource},
            registry::NodeRegistry,
            EntityType, Level, PathwayId};

/// The six networks of a pathway.  Both arrays are indexed by
/// [Level::index]: genes, proteins, proteoforms.
#[derive(Debug, Clone)]
pub struct PathwayGraphs {
    pub pathway: PathwayId,
    pub with_small_molecules: [InteractionNetwork; 3],
    pub without_small_molecules: [InteractionNetwork; 3],
    /// Files that couldn't be written.  The networks themselves are
    /// complete.
    pub failed_writes: Vec<PathBuf>,
}

impl PathwayGraphs {
    fn empty(pathway: &str) -> PathwayGraphs {
        let empty = |level: Level, small_molecules: bool| {
            InteractionNetwork::empty(NetworkMetadata::new(level, small_molecules,
                                                           Scope::Pathway(pathway.to_owned())))
        };

        PathwayGraphs {
            pathway: pathway.to_owned(),
            with_small_molecules: Level::ALL.map(|level| empty(level, true)),
            without_small_molecules: Level::ALL.map(|level| empty(level, false)),
            failed_writes: vec![],
        }
    }

    pub fn get(&self, level: Level, small_molecules: bool) -> &InteractionNetwork {
        if small_molecules {
            &self.with_small_molecules[level.index()]
        } else {
            &self.without_small_molecules[level.index()]
        }
    }

    /// Return true if the pathway wasn't found and all networks are
    /// empty
    pub fn is_empty(&self) -> bool {
        self.with_small_molecules.iter()
            .chain(self.without_small_molecules.iter())
            .all(InteractionNetwork::is_empty)
    }
}

/// Build a network from rows that are already in the order required by
/// the edge derivation
pub fn build_network(level: Level, small_molecules: bool, scope: Scope,
                     participants: &[ParticipantRecord], components: &[ComponentRecord])
    -> Result<InteractionNetwork>
{
    let participants = fix_participants(participants, level);
    let components = fix_components(components, level);

    let mut registry = NodeRegistry::new(level);

    for participant in &participants {
        registry.register_row(&participant.entity);
    }
    for component in &components {
        registry.register_row(&component.entity);
    }

    connect_reaction_participants(&mut registry, &participants)?;
    connect_complex_components(&mut registry, &components)?;

    Ok(registry.into_network(small_molecules, scope))
}

pub struct NetworkBuilder<'a> {
    source: &'a dyn RecordSource,
    config: NetworkConfig,
}

impl<'a> NetworkBuilder<'a> {
    pub fn new(source: &'a dyn RecordSource, config: NetworkConfig) -> NetworkBuilder<'a> {
        NetworkBuilder {
            source,
            config,
        }
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    fn empty_pathway_graph(pathway: &str, level: Level, small_molecules: bool)
        -> InteractionNetwork
    {
        let metadata =
            NetworkMetadata::new(level, small_molecules, Scope::Pathway(pathway.to_owned()));
        InteractionNetwork::empty(metadata)
    }

    fn pathway_exists(&self, pathway: &str) -> Result<bool> {
        let exists = self.source.pathway_name(pathway)?.is_some();
        if !exists {
            info!("pathway {} not found, returning empty graphs", pathway);
        }
        Ok(exists)
    }

    fn build_pathway_graph(&self, pathway: &str, level: Level, small_molecules: bool)
        -> Result<InteractionNetwork>
    {
        let participants =
            self.source.reaction_participants_by_pathway(pathway, level, small_molecules)?;
        let components =
            self.source.complex_components_by_pathway(pathway, level, small_molecules)?;

        build_network(level, small_molecules, Scope::Pathway(pathway.to_owned()),
                      &participants, &components)
    }

    /// Build the network of a pathway without writing it.  A pathway
    /// that doesn't exist gives an empty network.
    pub fn build_graph(&self, pathway: &str, level: Level, small_molecules: bool)
        -> Result<InteractionNetwork>
    {
        if !self.pathway_exists(pathway)? {
            return Ok(Self::empty_pathway_graph(pathway, level, small_molecules));
        }

        self.build_pathway_graph(pathway, level, small_molecules)
    }

    fn save(&self, network: &InteractionNetwork) -> Result<()> {
        if !self.config.write_files {
            return Ok(());
        }

        persist::save_pathway_graph(network, &self.config.graphs_path)?;

        Ok(())
    }

    /// Build the network of a pathway and write its edge list and vertex
    /// table to [NetworkConfig::graphs_path].  Nothing is written for a
    /// pathway that doesn't exist.
    pub fn create_graph(&self, pathway: &str, level: Level, small_molecules: bool)
        -> Result<InteractionNetwork>
    {
        if !self.pathway_exists(pathway)? {
            return Ok(Self::empty_pathway_graph(pathway, level, small_molecules));
        }

        let network = self.build_pathway_graph(pathway, level, small_molecules)?;

        self.save(&network)?;

        info!("created graph {} - {} - {}", pathway, level, small_molecules);

        Ok(network)
    }

    /// Build the network of the participants of one reaction.  There
    /// are no complex edges in a reaction network.
    pub fn create_reaction_graph(&self, reaction: &str, level: Level, small_molecules: bool)
        -> Result<InteractionNetwork>
    {
        let participants =
            self.source.reaction_participants_by_reaction(reaction, level, small_molecules)?;

        let network = build_network(level, small_molecules, Scope::Reaction(reaction.to_owned()),
                                    &participants, &[])?;

        self.save(&network)?;

        Ok(network)
    }

    /// Build the network of the components of one complex: every pair
    /// of components is connected
    pub fn create_complex_graph(&self, complex: &str, level: Level, small_molecules: bool)
        -> Result<InteractionNetwork>
    {
        let components =
            self.source.complex_components_by_complex(complex, level, small_molecules)?;

        let network = build_network(level, small_molecules, Scope::Complex(complex.to_owned()),
                                    &[], &components)?;

        self.save(&network)?;

        Ok(network)
    }

    /// Build the networks of a pathway at all levels, with and without
    /// small molecules.  A file that can't be written is logged and
    /// listed in [PathwayGraphs::failed_writes]; the other networks are
    /// still built and written.
    pub fn create_pathway_graphs(&self, pathway: &str) -> Result<PathwayGraphs> {
        if !self.pathway_exists(pathway)? {
            return Ok(PathwayGraphs::empty(pathway));
        }

        let mut failed_writes = vec![];

        let mut create = |level: Level, small_molecules: bool| -> Result<InteractionNetwork> {
            let network = self.build_pathway_graph(pathway, level, small_molecules)?;

            if let Err(err) = self.save(&network) {
                error!("failed to write graph {} - {} - {}: {:#}",
                       pathway, level, small_molecules, err);
                let file_name = persist::edge_list_file_name(pathway, level, small_molecules);
                failed_writes.push(self.config.graphs_path.join(file_name));
            } else {
                info!("created graph {} - {} - {}", pathway, level, small_molecules);
            }

            Ok(network)
        };

        let with_small_molecules = [
            create(Level::Genes, true)?,
            create(Level::Proteins, true)?,
            create(Level::Proteoforms, true)?,
        ];
        let without_small_molecules = [
            create(Level::Genes, false)?,
            create(Level::Proteins, false)?,
            create(Level::Proteoforms, false)?,
        ];

        Ok(PathwayGraphs {
            pathway: pathway.to_owned(),
            with_small_molecules,
            without_small_molecules,
            failed_writes,
        })
    }

    /// Build the networks of every pathway in `pathways`.  The result
    /// has one entry per input pathway, in the same order, including
    /// empty networks for pathways that don't exist.
    pub fn create_graphs(&self, pathways: &[PathwayId]) -> Vec<Result<PathwayGraphs>> {
        let create = |pathway: &PathwayId| {
            info!("creating networks for pathway {}", pathway);
            self.create_pathway_graphs(pathway)
        };

        if self.config.parallel {
            pathways.par_iter().map(create).collect()
        } else {
            pathways.iter().map(create).collect()
        }
    }

    /// Build the network of every reaction and complex at one level
    pub fn create_full_graph(&self, level: Level, small_molecules: bool)
        -> Result<InteractionNetwork>
    {
        let participants = self.source.reaction_participants(level, small_molecules)?;
        let components = self.source.complex_components(level, small_molecules)?;

        let network = build_network(level, small_molecules, Scope::Full,
                                    &participants, &components)?;

        info!("full {} graph: {} nodes ({} {}, {} small molecules), {} edges",
              level, network.node_count(), network.type_count(EntityType::from(level)), level,
              network.type_count(EntityType::SmallMolecule), network.edge_count());

        Ok(network)
    }

    /// Read the full network of a level from
    /// [NetworkConfig::full_graphs_path], or build and save it if the
    /// files aren't there
    pub fn read_or_create_full_graph(&self, level: Level, small_molecules: bool)
        -> Result<InteractionNetwork>
    {
        let dir = &self.config.full_graphs_path;

        if persist::full_graph_exists(dir, level, small_molecules) {
            info!("reading full {} graph from {}", level, dir.display());
            return persist::read_full_graph(dir, level, small_molecules);
        }

        let network = self.create_full_graph(level, small_molecules)?;
        persist::save_full_graph(&network, dir)?;

        Ok(network)
    }
}

#[cfg(test)]
mod tests {
    use std::fs::File;

    use super::*;

    use crate::{records::parse_record_dump, MemoryRecordSource, NetworkError};

    fn test_records() -> MemoryRecordSource {
        let mut source = File::open("tests/data/records.json").unwrap();
        parse_record_dump(&mut source).unwrap()
    }

    fn no_files_config() -> NetworkConfig {
        NetworkConfig {
            write_files: false,
            parallel: false,
            ..NetworkConfig::default()
        }
    }

    fn pair(a: &str, b: &str) -> (String, String) {
        (a.to_owned(), b.to_owned())
    }

    #[test]
    fn create_gene_graph_test() {
        let records = test_records();
        let builder = NetworkBuilder::new(&records, no_files_config());

        let network = builder.create_graph("R-HSA-1000", Level::Genes, false).unwrap();

        assert_eq!(network.edges(),
                   vec![pair("GRB2", "SOS1"), pair("KRAS", "SOS1"), pair("MAP2K1", "MAPK1"),
                        pair("MAP2K1", "MAPK3"), pair("MAPK1", "MAPK3")]);

        let mapk1 = network.node("MAPK1").unwrap();
        assert_eq!(mapk1.node_type, EntityType::GeneEntity);
        assert!(mapk1.roles.contains("input") && mapk1.roles.contains("output"));
        assert!(mapk1.pathways.contains("R-HSA-1000"));
        assert!(mapk1.complexes.contains("R-HSA-2001"));
        assert_eq!(network.type_count(EntityType::GeneEntity), 6);
        assert_eq!(network.type_count(EntityType::SmallMolecule), 0);
    }

    #[test]
    fn create_graph_with_small_molecules_test() {
        let records = test_records();
        let builder = NetworkBuilder::new(&records, no_files_config());

        let network = builder.create_graph("R-HSA-1000", Level::Proteins, true).unwrap();

        let atp = network.node("ATP").unwrap();
        assert_eq!(atp.node_type, EntityType::SmallMolecule);
        assert_eq!(atp.prev_id.as_deref(), Some("ATP"));
        assert!(network.has_edge("ATP", "P28482"));
        assert!(network.has_edge("ATP", "ADP"));
        assert_eq!(network.node("P28482").unwrap().prev_id.as_deref(), Some("MAPK1"));
        assert_eq!(network.type_count(EntityType::SmallMolecule), 2);
        assert!(network.metadata().small_molecules);

        for (a, b) in network.edges() {
            assert_ne!(a, b);
        }
    }

    #[test]
    fn create_proteoform_graph_test() {
        let records = test_records();
        let builder = NetworkBuilder::new(&records, no_files_config());

        let network = builder.create_graph("R-HSA-1000", Level::Proteoforms, false).unwrap();

        assert!(network.node("P28482;").is_some());
        assert!(network.node("P28482;00046:null,00047:187").is_some());
        assert!(network.node("P28482").is_none());
        assert_eq!(network.node("P28482;").unwrap().prev_id.as_deref(), Some("P28482"));
        assert!(network.has_edge("Q02750;", "P28482;00046:null,00047:187"));
    }

    #[test]
    fn unknown_pathway_test() {
        let records = test_records();
        let builder = NetworkBuilder::new(&records, no_files_config());

        let graphs = builder.create_pathway_graphs("R-HSA-0").unwrap();

        assert!(graphs.is_empty());
        for level in Level::ALL {
            for small_molecules in [true, false] {
                let network = graphs.get(level, small_molecules);
                assert_eq!(network.level(), level);
                assert_eq!(network.metadata().small_molecules, small_molecules);
                assert_eq!(network.edge_count(), 0);
            }
        }
    }

    #[test]
    fn pathway_graphs_order_test() {
        let records = test_records();
        let builder = NetworkBuilder::new(&records, no_files_config());

        let graphs = builder.create_pathway_graphs("R-HSA-1000").unwrap();

        for (idx, level) in Level::ALL.iter().enumerate() {
            assert_eq!(graphs.with_small_molecules[idx].level(), *level);
            assert!(graphs.with_small_molecules[idx].metadata().small_molecules);
            assert_eq!(graphs.without_small_molecules[idx].level(), *level);
            assert!(!graphs.without_small_molecules[idx].metadata().small_molecules);
        }
        assert!(graphs.failed_writes.is_empty());
    }

    #[test]
    fn create_graphs_test() {
        let records = test_records();
        let pathways: Vec<PathwayId> =
            vec!["R-HSA-2000".into(), "R-HSA-0".into(), "R-HSA-1000".into()];

        for parallel in [false, true] {
            let config = NetworkConfig { parallel, ..no_files_config() };
            let builder = NetworkBuilder::new(&records, config);

            let results = builder.create_graphs(&pathways);

            assert_eq!(results.len(), 3);
            let graphs: Vec<_> = results.into_iter().map(|r| r.unwrap()).collect();
            assert_eq!(graphs[0].pathway, "R-HSA-2000");
            assert!(!graphs[0].is_empty());
            assert!(graphs[1].is_empty());
            assert_eq!(graphs[2].pathway, "R-HSA-1000");
        }
    }

    #[test]
    fn reaction_graph_test() {
        let records = test_records();
        let builder = NetworkBuilder::new(&records, no_files_config());

        let network = builder.create_reaction_graph("R-HSA-1002", Level::Genes, false).unwrap();

        assert_eq!(network.metadata().scope, Scope::Reaction("R-HSA-1002".into()));
        assert_eq!(network.edges(), vec![pair("MAP2K1", "MAPK1"), pair("MAP2K1", "MAPK3"),
                        pair("MAPK1", "MAPK3")]);
        assert!(network.node("MAPK1").unwrap().pathways.is_empty());
    }

    #[test]
    fn complex_graph_test() {
        let records = test_records();
        let builder = NetworkBuilder::new(&records, no_files_config());

        let network = builder.create_complex_graph("R-HSA-2003", Level::Genes, true).unwrap();

        assert_eq!(network.metadata().scope, Scope::Complex("R-HSA-2003".into()));
        assert_eq!(network.edges(), vec![pair("CCNB1", "CDK1"), pair("CCNB1", "CKS1B"),
                                         pair("CDK1", "CKS1B")]);
        assert!(network.node("CDK1").unwrap().complexes.contains("R-HSA-2003"));
        assert!(network.node("CDK1").unwrap().reactions.is_empty());

        let proteoforms =
            builder.create_complex_graph("R-HSA-2001", Level::Proteoforms, false).unwrap();
        assert!(proteoforms.has_edge("P28482;00046:null,00047:187", "P27361;00047:204"));
    }

    #[test]
    fn unregistered_node_is_fatal_test() {
        let participants = vec![ParticipantRecord {
            pathway: Some("R-HSA-1".into()),
            reaction: "R-HSA-2".into(),
            entity: "R-HSA-3".into(),
            name: "MAPK1".into(),
            type_string: "EntityWithAccessionedSequence".into(),
            id: "MAPK1".into(),
            prev_id: None,
            database: None,
            role: "input".into(),
        }];

        let network = build_network(Level::Genes, true, Scope::Full, &participants, &[]).unwrap();
        assert_eq!(network.node_count(), 1);

        let mut registry = NodeRegistry::new(Level::Genes);
        let fixed = fix_participants(&participants, Level::Genes);
        let err = connect_reaction_participants(&mut registry, &fixed).unwrap_err();
        assert!(err.downcast_ref::<NetworkError>().is_some());
    }

    #[test]
    fn write_files_test() {
        let dir = tempfile::tempdir().unwrap();
        let records = test_records();
        let config = NetworkConfig {
            graphs_path: dir.path().join("pathways"),
            full_graphs_path: dir.path().join("full"),
            write_files: true,
            parallel: false,
        };
        let builder = NetworkBuilder::new(&records, config);

        let graphs = builder.create_pathway_graphs("R-HSA-1000").unwrap();
        assert!(graphs.failed_writes.is_empty());

        let pathways_dir = dir.path().join("pathways");
        assert!(pathways_dir.join("R-HSA-1000_genes_edge_list").exists());
        assert!(pathways_dir.join("R-HSA-1000_proteoforms_no_small_molecules_edge_list").exists());

        let read_back = persist::read_pathway_graph(&pathways_dir, "R-HSA-1000", Level::Genes,
                                                    true)
            .unwrap();
        assert_eq!(read_back.edges(), graphs.get(Level::Genes, true).edges());

        let full = builder.read_or_create_full_graph(Level::Genes, true).unwrap();
        assert!(dir.path().join("full").join("genes_interactions.tsv").exists());
        let full_again = builder.read_or_create_full_graph(Level::Genes, true).unwrap();
        assert_eq!(full.edges(), full_again.edges());
        assert_eq!(full.node_count(), full_again.node_count());
    }

    #[test]
    fn write_empty_graph_test() {
        let dir = tempfile::tempdir().unwrap();
        let mut records = MemoryRecordSource::new();
        records.add_pathway("R-HSA-9", "Pathway with no reactions");

        let config = NetworkConfig {
            graphs_path: dir.path().to_owned(),
            write_files: true,
            parallel: false,
            ..NetworkConfig::default()
        };
        let builder = NetworkBuilder::new(&records, config);

        let graphs = builder.create_pathway_graphs("R-HSA-9").unwrap();
        assert!(graphs.is_empty());
        assert!(graphs.failed_writes.is_empty());
        assert!(dir.path().join("R-HSA-9_genes_edge_list").exists());
        assert!(dir.path().join("R-HSA-9_proteoforms_no_small_molecules_vertices.tsv").exists());

        let read_back = persist::read_pathway_graph(dir.path(), "R-HSA-9", Level::Genes, false)
            .unwrap();
        assert!(read_back.is_empty());

        // nothing is written for a pathway that doesn't exist
        builder.create_pathway_graphs("R-HSA-0").unwrap();
        builder.create_graph("R-HSA-0", Level::Genes, true).unwrap();
        assert!(!dir.path().join("R-HSA-0_genes_edge_list").exists());
    }

    #[test]
    fn failed_write_test() {
        let dir = tempfile::tempdir().unwrap();
        // a file where the output directory should be
        let blocked = dir.path().join("blocked");
        std::fs::write(&blocked, "").unwrap();

        let records = test_records();
        let config = NetworkConfig {
            graphs_path: blocked,
            write_files: true,
            parallel: false,
            ..NetworkConfig::default()
        };
        let builder = NetworkBuilder::new(&records, config);

        let graphs = builder.create_pathway_graphs("R-HSA-1000").unwrap();

        assert_eq!(graphs.failed_writes.len(), 6);
        assert!(!graphs.get(Level::Proteins, true).is_empty());

        assert!(builder.create_graph("R-HSA-1000", Level::Genes, true).is_err());
    }
}
