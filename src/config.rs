//! Configuration for building networks, read from YAML.
//!
//! ## Example
//! ```
//! use pathway_networks::NetworkConfig;
//!
//! let yaml = "graphs_path: out/pathways\nparallel: false\n";
//! let config = NetworkConfig::from_reader(&mut yaml.as_bytes()).unwrap();
//! assert!(!config.parallel);
//! assert!(config.write_files);
//! ```

use std::{fs::File, io::{BufReader, Read}, path::{Path, PathBuf}};

use anyhow::{Context, Result};

fn default_graphs_path() -> PathBuf {
    PathBuf::from("reports/pathways")
}

fn default_full_graphs_path() -> PathBuf {
    PathBuf::from("resources/Reactome")
}

fn default_true() -> bool {
    true
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct NetworkConfig {
    /// Directory for the per-pathway edge lists and vertex tables
    #[serde(default = "default_graphs_path")]
    pub graphs_path: PathBuf,
    /// Directory for the full-corpus vertex and interaction files
    #[serde(default = "default_full_graphs_path")]
    pub full_graphs_path: PathBuf,
    /// Write the per-pathway files after building each graph
    #[serde(default = "default_true")]
    pub write_files: bool,
    /// Build the pathways of a batch in parallel
    #[serde(default = "default_true")]
    pub parallel: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            graphs_path: default_graphs_path(),
            full_graphs_path: default_full_graphs_path(),
            write_files: true,
            parallel: true,
        }
    }
}

impl NetworkConfig {
    pub fn from_reader(source: &mut dyn Read) -> Result<NetworkConfig> {
        let reader = BufReader::new(source);

        let config: NetworkConfig = serde_yaml::from_reader(reader)?;

        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<NetworkConfig> {
        let mut file = File::open(path)
            .with_context(|| format!("can't open config file: {}", path.display()))?;

        NetworkConfig::from_reader(&mut file)
            .with_context(|| format!("can't parse config file: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use std::fs::File;

    use super::*;

    #[test]
    fn parse_config_test() {
        let mut source = File::open("tests/data/config.yaml").unwrap();
        let config = NetworkConfig::from_reader(&mut source).unwrap();

        assert_eq!(config.graphs_path, PathBuf::from("reports/pathways"));
        assert_eq!(config.full_graphs_path, PathBuf::from("resources/Reactome/76"));
        assert!(config.write_files);
        assert!(!config.parallel);
    }

    #[test]
    fn default_config_test() {
        let config = NetworkConfig::from_reader(&mut "{}".as_bytes()).unwrap();
        assert_eq!(config, NetworkConfig::default());

        assert!(NetworkConfig::from_reader(&mut "levels: [transcripts]".as_bytes()).is_err());
        assert!(NetworkConfig::from_path(Path::new("tests/data/no_such_config.yaml")).is_err());
    }
}
