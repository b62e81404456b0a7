//! The rows read from the biological database and the [RecordSource]
//! trait used to fetch them.
//!
//! [ParticipantRecord] and [ComponentRecord] closely match the query
//! results: column names are kept and identifiers are not yet
//! normalised (see [crate::normalize]).
//!
//! [MemoryRecordSource] serves the same rows from a JSON dump.
//!
//! ## Example
//! ```
//! use std::fs::File;
//! use pathway_networks::{parse_record_dump, Level, RecordSource};
//!
//! let mut source = File::open("tests/data/records.json").unwrap();
//! let records = parse_record_dump(&mut source).unwrap();
//!
//! let name = records.pathway_name("R-HSA-1000").unwrap();
//! assert_eq!(name.as_deref(), Some("Toy signalling pathway"));
//!
//! for row in records.reaction_participants_by_pathway("R-HSA-1000", Level::Genes, false).unwrap() {
//!     println!("{} {} {}", row.reaction, row.role, row.id);
//! }
//! ```

use std::{collections::{BTreeMap, HashSet}, fmt::{self, Display}, hash::Hash, io::{BufReader, Read}};

use anyhow::Result;

use crate::{ComplexId, Level, NodeId, PathwayId, ReactionId, Role, SMALL_MOLECULE_TYPE};

/// An identifier as returned by a query: a plain string, or for
/// proteoforms a list of an isoform followed by PTM descriptors like
/// `["P28482", "00046:null", "00047:79"]`
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(untagged)]
pub enum RawId {
    Single(String),
    Parts(Vec<String>),
}

impl Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawId::Single(id) => write!(f, "{}", id),
            RawId::Parts(parts) => write!(f, "[{}]", parts.join(", ")),
        }
    }
}

impl From<&str> for RawId {
    fn from(id: &str) -> Self {
        RawId::Single(id.to_owned())
    }
}

/// A participant of a reaction.  `pathway` is None for rows fetched
/// for a single reaction.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "PascalCase")]
pub struct ParticipantRecord {
    #[serde(skip_serializing_if="Option::is_none", default)]
    pub pathway: Option<PathwayId>,
    pub reaction: ReactionId,
    pub entity: String,
    pub name: String,
    /// The database type, like "EntityWithAccessionedSequence" or "SimpleEntity"
    #[serde(rename = "Type")]
    pub type_string: String,
    pub id: RawId,
    #[serde(skip_serializing_if="Option::is_none", default)]
    pub prev_id: Option<String>,
    #[serde(skip_serializing_if="Option::is_none", default)]
    pub database: Option<String>,
    /// "input", "output", "catalystActivity", "regulatedBy", ...
    pub role: Role,
}

/// A component of a complex
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "PascalCase")]
pub struct ComponentRecord {
    pub complex: ComplexId,
    pub entity: String,
    pub name: String,
    #[serde(rename = "Type")]
    pub type_string: String,
    pub id: RawId,
    #[serde(skip_serializing_if="Option::is_none", default)]
    pub prev_id: Option<String>,
}

/// The entity part of a row after identifier normalisation: all that
/// is needed to register a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRow {
    pub id: NodeId,
    pub name: String,
    pub type_string: String,
    pub prev_id: Option<NodeId>,
}

impl EntityRow {
    pub fn is_small_molecule(&self) -> bool {
        self.type_string == SMALL_MOLECULE_TYPE
    }
}

/// A normalised [ParticipantRecord]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub entity: EntityRow,
    pub pathway: Option<PathwayId>,
    pub reaction: ReactionId,
    pub role: Role,
}

/// A normalised [ComponentRecord]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub entity: EntityRow,
    pub complex: ComplexId,
}

/// Where the rows come from.  Each call must reflect one consistent
/// read of the database and must return rows in the documented order,
/// as the edge derivation relies on contiguous groups.
pub trait RecordSource: Sync {
    /// The display name of a pathway, or None if the pathway doesn't
    /// exist
    fn pathway_name(&self, pathway: &str) -> Result<Option<String>>;

    /// Participants of the reactions of a pathway, sorted by
    /// (Pathway, Reaction, Role, Type)
    fn reaction_participants_by_pathway(&self, pathway: &str, level: Level,
                                        small_molecules: bool)
        -> Result<Vec<ParticipantRecord>>;

    /// Components of the complexes that take part in the reactions of
    /// a pathway, sorted by Complex
    fn complex_components_by_pathway(&self, pathway: &str, level: Level,
                                     small_molecules: bool)
        -> Result<Vec<ComponentRecord>>;

    /// Participants of one reaction (with no Pathway), sorted by
    /// (Reaction, Role)
    fn reaction_participants_by_reaction(&self, reaction: &str, level: Level,
                                         small_molecules: bool)
        -> Result<Vec<ParticipantRecord>>;

    /// Components of one complex, sorted by Complex
    fn complex_components_by_complex(&self, complex: &str, level: Level,
                                     small_molecules: bool)
        -> Result<Vec<ComponentRecord>>;

    /// Participants of every reaction, sorted by (Pathway, Reaction,
    /// Role, Type)
    fn reaction_participants(&self, level: Level, small_molecules: bool)
        -> Result<Vec<ParticipantRecord>>;

    /// Components of every complex, sorted by Complex
    fn complex_components(&self, level: Level, small_molecules: bool)
        -> Result<Vec<ComponentRecord>>;
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
struct SerdeRecordDump {
    #[serde(default)]
    pathways: BTreeMap<PathwayId, String>,
    #[serde(default)]
    participants: BTreeMap<Level, Vec<ParticipantRecord>>,
    #[serde(default)]
    components: BTreeMap<Level, BTreeMap<PathwayId, Vec<ComponentRecord>>>,
}

/// A [RecordSource] holding every row in memory, usually read from a
/// JSON dump with [parse_record_dump]
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordSource {
    _pathways: BTreeMap<PathwayId, String>,
    _participants: BTreeMap<Level, Vec<ParticipantRecord>>,
    _components: BTreeMap<Level, BTreeMap<PathwayId, Vec<ComponentRecord>>>,
}

fn keep_row(type_string: &str, small_molecules: bool) -> bool {
    small_molecules || type_string != SMALL_MOLECULE_TYPE
}

// remove repeated rows, keeping the first of each, like DISTINCT
fn distinct<T: Clone + Eq + Hash>(rows: &mut Vec<T>) {
    let mut seen = HashSet::new();
    rows.retain(|row| seen.insert(row.clone()));
}

fn sort_by_pathway_reaction(rows: &mut [ParticipantRecord]) {
    rows.sort_by(|a, b| {
        a.pathway.cmp(&b.pathway)
            .then(a.reaction.cmp(&b.reaction))
            .then(a.role.cmp(&b.role))
            .then(a.type_string.cmp(&b.type_string))
    });
}

impl MemoryRecordSource {
    pub fn new() -> MemoryRecordSource {
        MemoryRecordSource::default()
    }

    pub fn add_pathway(&mut self, pathway: &str, name: &str) {
        self._pathways.insert(pathway.to_owned(), name.to_owned());
    }

    pub fn add_participant(&mut self, level: Level, record: ParticipantRecord) {
        self._participants.entry(level).or_default().push(record);
    }

    pub fn add_component(&mut self, level: Level, pathway: &str, record: ComponentRecord) {
        self._components.entry(level).or_default()
            .entry(pathway.to_owned()).or_default()
            .push(record);
    }

    fn level_participants(&self, level: Level) -> &[ParticipantRecord] {
        self._participants.get(&level).map(|v| v.as_slice()).unwrap_or(&[])
    }

    fn level_components(&self, level: Level) -> impl Iterator<Item = &ComponentRecord> {
        self._components.get(&level)
            .into_iter()
            .flat_map(|by_pathway| by_pathway.values())
            .flatten()
    }
}

impl RecordSource for MemoryRecordSource {
    fn pathway_name(&self, pathway: &str) -> Result<Option<String>> {
        Ok(self._pathways.get(pathway).cloned())
    }

    fn reaction_participants_by_pathway(&self, pathway: &str, level: Level,
                                        small_molecules: bool)
        -> Result<Vec<ParticipantRecord>>
    {
        let mut rows: Vec<_> = self.level_participants(level).iter()
            .filter(|row| row.pathway.as_deref() == Some(pathway))
            .filter(|row| keep_row(&row.type_string, small_molecules))
            .cloned()
            .collect();

        distinct(&mut rows);
        sort_by_pathway_reaction(&mut rows);

        Ok(rows)
    }

    fn complex_components_by_pathway(&self, pathway: &str, level: Level,
                                     small_molecules: bool)
        -> Result<Vec<ComponentRecord>>
    {
        let mut rows: Vec<_> = self._components.get(&level)
            .and_then(|by_pathway| by_pathway.get(pathway))
            .map(|rows| rows.as_slice())
            .unwrap_or(&[])
            .iter()
            .filter(|row| keep_row(&row.type_string, small_molecules))
            .cloned()
            .collect();

        distinct(&mut rows);
        rows.sort_by(|a, b| a.complex.cmp(&b.complex));

        Ok(rows)
    }

    fn reaction_participants_by_reaction(&self, reaction: &str, level: Level,
                                         small_molecules: bool)
        -> Result<Vec<ParticipantRecord>>
    {
        let mut rows: Vec<_> = self.level_participants(level).iter()
            .filter(|row| row.reaction == reaction)
            .filter(|row| keep_row(&row.type_string, small_molecules))
            .map(|row| ParticipantRecord { pathway: None, ..row.clone() })
            .collect();

        distinct(&mut rows);
        rows.sort_by(|a, b| a.reaction.cmp(&b.reaction).then(a.role.cmp(&b.role)));

        Ok(rows)
    }

    fn complex_components_by_complex(&self, complex: &str, level: Level,
                                     small_molecules: bool)
        -> Result<Vec<ComponentRecord>>
    {
        let mut rows: Vec<_> = self.level_components(level)
            .filter(|row| row.complex == complex)
            .filter(|row| keep_row(&row.type_string, small_molecules))
            .cloned()
            .collect();

        // a complex can be listed under several pathways
        distinct(&mut rows);

        Ok(rows)
    }

    fn reaction_participants(&self, level: Level, small_molecules: bool)
        -> Result<Vec<ParticipantRecord>>
    {
        let mut rows: Vec<_> = self.level_participants(level).iter()
            .filter(|row| keep_row(&row.type_string, small_molecules))
            .cloned()
            .collect();

        distinct(&mut rows);
        sort_by_pathway_reaction(&mut rows);

        Ok(rows)
    }

    fn complex_components(&self, level: Level, small_molecules: bool)
        -> Result<Vec<ComponentRecord>>
    {
        let mut rows: Vec<_> = self.level_components(level)
            .filter(|row| keep_row(&row.type_string, small_molecules))
            .cloned()
            .collect();

        distinct(&mut rows);
        rows.sort_by(|a, b| a.complex.cmp(&b.complex));

        Ok(rows)
    }
}

/// Read a JSON dump of pathway names, reaction participants (per
/// level) and complex components (per level and pathway)
///
/// ## Example
///
/// ```
/// use std::fs::File;
/// use pathway_networks::{parse_record_dump, Level, RecordSource};
///
/// let mut source = File::open("tests/data/records.json").unwrap();
/// let records = parse_record_dump(&mut source).unwrap();
/// let components = records.complex_components(Level::Proteins, true).unwrap();
/// assert!(!components.is_empty());
/// ```
pub fn parse_record_dump(source: &mut dyn Read) -> Result<MemoryRecordSource> {
    let reader = BufReader::new(source);

    let dump: SerdeRecordDump = serde_json::from_reader(reader)?;

    Ok(MemoryRecordSource {
        _pathways: dump.pathways,
        _participants: dump.participants,
        _components: dump.components,
    })
}

#[cfg(test)]
mod tests {
    use std::fs::File;

    use super::*;

    fn test_records() -> MemoryRecordSource {
        let mut source = File::open("tests/data/records.json").unwrap();
        parse_record_dump(&mut source).unwrap()
    }

    #[test]
    fn parse_record_dump_test() {
        let records = test_records();

        assert_eq!(records.pathway_name("R-HSA-1000").unwrap().unwrap(),
                   "Toy signalling pathway");
        assert!(records.pathway_name("R-HSA-0").unwrap().is_none());

        let proteoform_rows =
            records.reaction_participants_by_pathway("R-HSA-1000", Level::Proteoforms, true)
            .unwrap();
        assert!(proteoform_rows.iter().any(|row| matches!(row.id, RawId::Parts(_))));
    }

    #[test]
    fn participants_sorted_and_filtered_test() {
        let records = test_records();

        let rows =
            records.reaction_participants_by_pathway("R-HSA-1000", Level::Proteins, false)
            .unwrap();

        assert!(!rows.is_empty());
        assert!(rows.iter().all(|row| row.type_string != SMALL_MOLECULE_TYPE));
        assert!(rows.windows(2).all(|pair| {
            (&pair[0].reaction, &pair[0].role) <= (&pair[1].reaction, &pair[1].role)
        }));

        let with_sm =
            records.reaction_participants_by_pathway("R-HSA-1000", Level::Proteins, true)
            .unwrap();
        assert!(with_sm.len() > rows.len());
    }

    #[test]
    fn participants_by_reaction_test() {
        let records = test_records();

        let rows = records.reaction_participants_by_reaction("R-HSA-1001", Level::Proteins, true)
            .unwrap();

        assert!(!rows.is_empty());
        assert!(rows.iter().all(|row| row.pathway.is_none() && row.reaction == "R-HSA-1001"));
    }

    #[test]
    fn distinct_components_test() {
        let mut records = MemoryRecordSource::new();
        let component = ComponentRecord {
            complex: "R-HSA-C1".into(),
            entity: "R-HSA-E1".into(),
            name: "P1 [cytosol]".into(),
            type_string: "EntityWithAccessionedSequence".into(),
            id: "P00001".into(),
            prev_id: Some("GENE1".into()),
        };
        records.add_component(Level::Proteins, "R-HSA-1", component.clone());
        records.add_component(Level::Proteins, "R-HSA-2", component);

        assert_eq!(records.complex_components(Level::Proteins, true).unwrap().len(), 1);
        assert!(records.complex_components(Level::Genes, true).unwrap().is_empty());

        let rows = records.complex_components_by_complex("R-HSA-C1", Level::Proteins, true)
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert!(records.complex_components_by_complex("R-HSA-C2", Level::Proteins, true)
                .unwrap().is_empty());
    }

    #[test]
    fn components_by_complex_test() {
        let records = test_records();

        let rows = records.complex_components_by_complex("R-HSA-2003", Level::Genes, true)
            .unwrap();
        let ids: Vec<_> = rows.iter().map(|row| row.id.to_string()).collect();
        assert_eq!(ids, vec!["CDK1", "CCNB1", "CKS1B"]);

        assert!(records.complex_components_by_complex("R-HSA-2003", Level::Proteins, true)
                .unwrap().is_empty());
    }
}
