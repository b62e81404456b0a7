//! Reading and writing networks.
//!
//! A pathway network is stored as an edge list, one edge per line
//! (`<node_a> <node_b> <attribute map>`), with the node attributes in a
//! tab separated vertex table:
//!
//! ```text
//! R-HSA-1000_proteins_edge_list
//! R-HSA-1000_proteins_vertices.tsv
//! R-HSA-1000_proteins_no_small_molecules_edge_list
//! ...
//! ```
//!
//! The full networks are stored as `<level>_vertices.tsv`,
//! `<level>_small_molecules_vertices.tsv` and `<level>_interactions.tsv`.
//!
//! Only the node ids, types, colours and previous-level ids are
//! stored.  The metadata and the role/reaction/pathway/complex sets
//! must be supplied again by the caller when reading.

use std::{collections::{HashMap, HashSet}, fs::{self, File}, io::{BufRead, BufReader, BufWriter, Read, Write},
          path::{Path, PathBuf}};

use anyhow::{anyhow, Context, Result};

use crate::{network::{InteractionEdge, InteractionGraph, InteractionNetwork, NetworkMetadata,
                      NetworkNode, Scope},
            EntityType, Level, NetworkError, NodeId};

/// A row of a vertex table
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VertexRow {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub node_type: EntityType,
    #[serde(rename = "displayColor")]
    pub display_color: String,
    #[serde(rename = "prevId")]
    pub prev_id: Option<NodeId>,
}

impl From<&NetworkNode> for VertexRow {
    fn from(node: &NetworkNode) -> Self {
        VertexRow {
            id: node.id.clone(),
            node_type: node.node_type,
            display_color: node.display_color.clone(),
            prev_id: node.prev_id.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
struct InteractionRow {
    source: NodeId,
    target: NodeId,
}

/// The start of the file names for a pathway graph, like
/// "R-HSA-1000_proteins_no_small_molecules"
pub fn pathway_file_stem(pathway: &str, level: Level, small_molecules: bool) -> String {
    let mut stem = format!("{}_{}", pathway, level);
    if !small_molecules {
        stem += "_no_small_molecules";
    }
    stem
}

pub fn edge_list_file_name(pathway: &str, level: Level, small_molecules: bool) -> String {
    pathway_file_stem(pathway, level, small_molecules) + "_edge_list"
}

pub fn vertices_file_name(pathway: &str, level: Level, small_molecules: bool) -> String {
    pathway_file_stem(pathway, level, small_molecules) + "_vertices.tsv"
}

/// Write one line per edge: both node ids and the edge attributes as
/// a JSON map
pub fn write_edge_list(network: &InteractionNetwork, writer: &mut dyn Write) -> Result<()> {
    let graph = network.graph();

    for edge_idx in graph.edge_indices() {
        let Some((a_idx, b_idx)) = graph.edge_endpoints(edge_idx)
        else {
            continue;
        };
        let attributes = serde_json::to_string(&graph[edge_idx])?;
        writeln!(writer, "{} {} {}", graph[a_idx].id, graph[b_idx].id, attributes)?;
    }

    Ok(())
}

/// Read the node id pairs of an edge list
pub fn read_edge_list(source: &mut dyn Read) -> Result<Vec<(NodeId, NodeId)>> {
    let reader = BufReader::new(source);
    let mut ret = vec![];

    for (line_number, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let mut parts = line.splitn(3, ' ');

        let (Some(a), Some(b)) = (parts.next(), parts.next())
        else {
            return Err(anyhow!("edge list line {} has fewer than two nodes: {}",
                               line_number + 1, line));
        };

        if let Some(attributes) = parts.next() {
            let _: InteractionEdge = serde_json::from_str(attributes)
                .with_context(|| format!("bad edge attributes on line {}", line_number + 1))?;
        }

        ret.push((a.to_owned(), b.to_owned()));
    }

    Ok(ret)
}

fn tsv_writer(writer: &mut dyn Write) -> csv::Writer<&mut dyn Write> {
    csv::WriterBuilder::new().delimiter(b'\t').from_writer(writer)
}

fn tsv_reader(source: &mut dyn Read) -> csv::Reader<&mut dyn Read> {
    csv::ReaderBuilder::new().delimiter(b'\t').from_reader(source)
}

/// Write a vertex table with columns id, type, displayColor and prevId
pub fn write_vertices<'a>(nodes: impl Iterator<Item = &'a NetworkNode>, writer: &mut dyn Write)
    -> Result<()>
{
    let mut tsv = tsv_writer(writer);

    for node in nodes {
        tsv.serialize(VertexRow::from(node))?;
    }

    tsv.flush()?;

    Ok(())
}

pub fn read_vertices(source: &mut dyn Read) -> Result<Vec<VertexRow>> {
    let mut tsv = tsv_reader(source);
    let mut ret = vec![];

    for row in tsv.deserialize() {
        let row: VertexRow = row?;
        ret.push(row);
    }

    Ok(ret)
}

fn write_interactions(network: &InteractionNetwork, writer: &mut dyn Write) -> Result<()> {
    let mut tsv = tsv_writer(writer);

    for (source, target) in network.edges() {
        tsv.serialize(InteractionRow { source, target })?;
    }

    tsv.flush()?;

    Ok(())
}

fn read_interactions(source: &mut dyn Read) -> Result<Vec<(NodeId, NodeId)>> {
    let mut tsv = tsv_reader(source);
    let mut ret = vec![];

    for row in tsv.deserialize() {
        let row: InteractionRow = row?;
        ret.push((row.source, row.target));
    }

    Ok(ret)
}

/// Build a network from stored vertices and edges.  Every edge must
/// refer to a stored vertex.
pub fn network_from_tables(vertices: Vec<VertexRow>, edges: &[(NodeId, NodeId)],
                           metadata: NetworkMetadata)
    -> Result<InteractionNetwork>
{
    let mut graph = InteractionGraph::default();
    let mut node_indexes = HashMap::new();

    for row in vertices {
        if node_indexes.contains_key(&row.id) {
            continue;
        }
        let node = NetworkNode {
            display_color: row.display_color,
            ..NetworkNode::new(&row.id, row.node_type, row.prev_id)
        };
        let idx = graph.add_node(node);
        node_indexes.insert(row.id, idx);
    }

    for (a, b) in edges {
        let a_idx = *node_indexes.get(a)
            .ok_or_else(|| NetworkError::UnregisteredNode(a.clone()))?;
        let b_idx = *node_indexes.get(b)
            .ok_or_else(|| NetworkError::UnregisteredNode(b.clone()))?;

        if a_idx != b_idx && graph.find_edge(a_idx, b_idx).is_none() {
            graph.add_edge(a_idx, b_idx, InteractionEdge::default());
        }
    }

    Ok(InteractionNetwork::from_parts(graph, node_indexes, metadata))
}

fn create_file(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path)
        .with_context(|| format!("can't create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

fn open_file(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("can't open {}", path.display()))
}

fn scope_id(network: &InteractionNetwork) -> String {
    network.metadata().scope.to_string()
}

/// Write the edge list and vertex table of a pathway or reaction
/// network to `dir`, replacing any existing files.  Returns the path
/// of the edge list.
pub fn save_pathway_graph(network: &InteractionNetwork, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("can't create directory {}", dir.display()))?;

    let metadata = network.metadata();
    let scope = scope_id(network);

    let edge_list_path = dir.join(edge_list_file_name(&scope, metadata.level,
                                                      metadata.small_molecules));
    let mut writer = create_file(&edge_list_path)?;
    write_edge_list(network, &mut writer)?;
    writer.flush()?;

    let vertices_path = dir.join(vertices_file_name(&scope, metadata.level,
                                                    metadata.small_molecules));
    let mut writer = create_file(&vertices_path)?;
    write_vertices(network.nodes(), &mut writer)?;
    writer.flush()?;

    Ok(edge_list_path)
}

/// Read a network written by [save_pathway_graph]
pub fn read_pathway_graph(dir: &Path, pathway: &str, level: Level, small_molecules: bool)
    -> Result<InteractionNetwork>
{
    let edge_list_path = dir.join(edge_list_file_name(pathway, level, small_molecules));
    let edges = read_edge_list(&mut open_file(&edge_list_path)?)?;

    let vertices_path = dir.join(vertices_file_name(pathway, level, small_molecules));
    let vertices = read_vertices(&mut open_file(&vertices_path)?)?;

    let metadata = NetworkMetadata::new(level, small_molecules, Scope::Pathway(pathway.to_owned()));

    network_from_tables(vertices, &edges, metadata)
}

fn full_vertices_path(dir: &Path, level: Level) -> PathBuf {
    dir.join(format!("{}_vertices.tsv", level))
}

fn full_small_molecules_path(dir: &Path, level: Level) -> PathBuf {
    dir.join(format!("{}_small_molecules_vertices.tsv", level))
}

fn full_interactions_path(dir: &Path, level: Level) -> PathBuf {
    dir.join(format!("{}_interactions.tsv", level))
}

/// Return true if the files of a full network are in `dir`
pub fn full_graph_exists(dir: &Path, level: Level, small_molecules: bool) -> bool {
    full_vertices_path(dir, level).exists() &&
        full_interactions_path(dir, level).exists() &&
        (!small_molecules || full_small_molecules_path(dir, level).exists())
}

/// Write a full network as entity vertices, small molecule vertices
/// and interactions
pub fn save_full_graph(network: &InteractionNetwork, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("can't create directory {}", dir.display()))?;

    let level = network.level();

    let mut writer = create_file(&full_vertices_path(dir, level))?;
    write_vertices(network.nodes().filter(|node| !node.node_type.is_small_molecule()),
                   &mut writer)?;
    writer.flush()?;

    let small_molecules_path = full_small_molecules_path(dir, level);

    if network.metadata().small_molecules {
        let mut writer = create_file(&small_molecules_path)?;
        write_vertices(network.nodes().filter(|node| node.node_type.is_small_molecule()),
                       &mut writer)?;
        writer.flush()?;
    } else if small_molecules_path.exists() {
        // the interactions no longer include small molecule edges
        fs::remove_file(&small_molecules_path)
            .with_context(|| format!("can't remove {}", small_molecules_path.display()))?;
    }

    let mut writer = create_file(&full_interactions_path(dir, level))?;
    write_interactions(network, &mut writer)?;
    writer.flush()?;

    Ok(())
}

/// Read a network written by [save_full_graph].  Interactions with a
/// small molecule are skipped when `small_molecules` is false.
pub fn read_full_graph(dir: &Path, level: Level, small_molecules: bool)
    -> Result<InteractionNetwork>
{
    let mut vertices = read_vertices(&mut open_file(&full_vertices_path(dir, level))?)?;

    if small_molecules {
        let path = full_small_molecules_path(dir, level);
        vertices.extend(read_vertices(&mut open_file(&path)?)?);
    }

    let edges: Vec<_> = read_interactions(&mut open_file(&full_interactions_path(dir, level))?)?;

    let edges: Vec<_> =
        if small_molecules {
            edges
        } else {
            let entity_ids: HashSet<_> =
                vertices.iter().map(|row| row.id.as_str()).collect();
            edges.into_iter()
                .filter(|(a, b)| entity_ids.contains(a.as_str()) && entity_ids.contains(b.as_str()))
                .collect()
        };

    let metadata = NetworkMetadata::new(level, small_molecules, Scope::Full);

    network_from_tables(vertices, &edges, metadata)
}
