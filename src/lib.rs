//! Build undirected interaction networks from
//! [Reactome](https://reactome.org) reaction and complex records.
//!
//! Networks are built at three granularities ([Level]): genes,
//! proteins and proteoforms, with or without small molecules.  Each
//! pathway gives six graphs; graphs of the same level can be merged
//! into a composite network with [merge::merge_graphs].
//!
//! ## Example
//! ```
//! use std::fs::File;
//! use pathway_networks::{parse_record_dump, Level, NetworkBuilder, NetworkConfig};
//!
//! let mut source = File::open("tests/data/records.json").unwrap();
//! let records = parse_record_dump(&mut source).unwrap();
//!
//! let config = NetworkConfig { write_files: false, ..NetworkConfig::default() };
//! let builder = NetworkBuilder::new(&records, config);
//! let network = builder.create_graph("R-HSA-1000", Level::Proteins, true).unwrap();
//!
//! for (a, b) in network.edges() {
//!     println!("{} -- {}", a, b);
//! }
//! ```

use std::{fmt::{self, Display}, str::FromStr};

#[macro_use] extern crate serde_derive;

pub mod builder;
pub mod config;
pub mod edges;
pub mod error;
pub mod graph;
pub mod merge;
pub mod network;
pub mod normalize;
pub mod persist;
pub mod records;
pub mod registry;

pub use builder::{NetworkBuilder, PathwayGraphs};
pub use config::NetworkConfig;
pub use error::NetworkError;
pub use merge::merge_graphs;
pub use network::{InteractionNetwork, NetworkMetadata, NetworkNode, Scope};
pub use records::{parse_record_dump, MemoryRecordSource, RecordSource};
pub use registry::NodeRegistry;

pub type NodeId = String;
pub type PathwayId = String;
pub type ReactionId = String;
pub type ComplexId = String;
pub type Role = String;

/// The `Type` value of a record for a small molecule
pub const SMALL_MOLECULE_TYPE: &str = "SimpleEntity";

/// Display colour of every small molecule node
pub const SMALL_MOLECULE_COLOR: &str = "#BDBDBD";

/// Node colour for each level, from the colour-blind safe palette
pub static LEVEL_COLORS: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "genes" => "#0072B2",
    "proteins" => "#E69F00",
    "proteoforms" => "#009E73",
};

/// The participant bucket of a reaction role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleBucket {
    Input,
    Output,
    Catalyst,
    Regulator,
}

/// Roles that place a participant in a reaction bucket.  Any other
/// role is still recorded on the node but gives no edges.
pub static ROLE_BUCKETS: phf::Map<&'static str, RoleBucket> = phf::phf_map! {
    "input" => RoleBucket::Input,
    "output" => RoleBucket::Output,
    "catalystActivity" => RoleBucket::Catalyst,
    "regulatedBy" => RoleBucket::Regulator,
};

/// Granularity of molecular identity in a network
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "String", into = "String")]
pub enum Level {
    Genes,
    Proteins,
    Proteoforms,
}

impl Level {
    /// All levels, in the order used for the per-pathway graph triples
    pub const ALL: [Level; 3] = [Level::Genes, Level::Proteins, Level::Proteoforms];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Genes => "genes",
            Level::Proteins => "proteins",
            Level::Proteoforms => "proteoforms",
        }
    }

    /// The node colour for entities of this level
    pub fn color(&self) -> &'static str {
        LEVEL_COLORS.get(self.as_str()).copied().unwrap_or(SMALL_MOLECULE_COLOR)
    }

    /// Position of this level in [Level::ALL]
    pub fn index(&self) -> usize {
        match self {
            Level::Genes => 0,
            Level::Proteins => 1,
            Level::Proteoforms => 2,
        }
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Level {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "genes" => Ok(Level::Genes),
            "proteins" => Ok(Level::Proteins),
            "proteoforms" => Ok(Level::Proteoforms),
            _ => Err(NetworkError::UnknownLevel(s.to_owned())),
        }
    }
}

impl TryFrom<String> for Level {
    type Error = NetworkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Level> for String {
    fn from(level: Level) -> Self {
        level.as_str().to_owned()
    }
}

/// The type of a node: a small molecule or an entity of one [Level]
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityType {
    #[serde(rename = "SimpleEntity")]
    SmallMolecule,
    #[serde(rename = "genes")]
    GeneEntity,
    #[serde(rename = "proteins")]
    ProteinEntity,
    #[serde(rename = "proteoforms")]
    ProteoformEntity,
}

impl EntityType {
    /// Resolve the type of a record: small molecules keep their own
    /// type, everything else takes the type of the level
    pub fn resolve(raw_type: &str, level: Level) -> EntityType {
        if raw_type == SMALL_MOLECULE_TYPE {
            EntityType::SmallMolecule
        } else {
            EntityType::from(level)
        }
    }

    pub fn is_small_molecule(&self) -> bool {
        *self == EntityType::SmallMolecule
    }

    pub fn color(&self) -> &'static str {
        match self {
            EntityType::SmallMolecule => SMALL_MOLECULE_COLOR,
            EntityType::GeneEntity => Level::Genes.color(),
            EntityType::ProteinEntity => Level::Proteins.color(),
            EntityType::ProteoformEntity => Level::Proteoforms.color(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::SmallMolecule => SMALL_MOLECULE_TYPE,
            EntityType::GeneEntity => "genes",
            EntityType::ProteinEntity => "proteins",
            EntityType::ProteoformEntity => "proteoforms",
        }
    }
}

impl From<Level> for EntityType {
    fn from(level: Level) -> Self {
        match level {
            Level::Genes => EntityType::GeneEntity,
            Level::Proteins => EntityType::ProteinEntity,
            Level::Proteoforms => EntityType::ProteoformEntity,
        }
    }
}

impl Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == SMALL_MOLECULE_TYPE {
            Ok(EntityType::SmallMolecule)
        } else {
            Ok(EntityType::from(s.parse::<Level>()?))
        }
    }
}
