use thiserror::Error;

use crate::Level;

/// Fatal conditions raised while building or merging networks.  These
/// are returned inside an [anyhow::Error] so callers can use
/// `downcast_ref::<NetworkError>()` to tell them apart from I/O errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("unknown level: {0} (expected genes, proteins or proteoforms)")]
    UnknownLevel(String),

    /// A fact or an edge referred to a node that was never registered
    #[error("internal error: node {0} was not registered before use")]
    UnregisteredNode(String),

    #[error("can't merge a {found} graph into a {expected} graph")]
    LevelMismatch { expected: Level, found: Level },
}
