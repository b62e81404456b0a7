//! Canonical identifiers for nodes.
//!
//! Proteoforms arrive as an isoform accession followed by a list of
//! PTM descriptors and are turned into a single string of the form
//! `isoform;ptm1,ptm2,...`.  The `;` is always present so a proteoform
//! with no PTMs ("P36507;") can't be confused with the protein
//! ("P36507").
//!
//! Display names, and the ids of small molecules, lose their trailing
//! compartment annotation: "ATP [cytosol]" becomes "ATP".

use std::sync::LazyLock;

use log::warn;
use regex::Regex;

use crate::{records::{Component, ComponentRecord, EntityRow, Participant,
                      ParticipantRecord, RawId},
            Level, NodeId, SMALL_MOLECULE_TYPE};

static ANNOTATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*\[[\w\s]*\]\s*$").expect("invalid annotation pattern")
});

/// Remove a trailing bracketed annotation like " [cytosol]"
pub fn strip_annotation(name: &str) -> String {
    ANNOTATION_RE.replace(name, "").into_owned()
}

/// Make a proteoform string from an isoform and its PTMs.  The PTMs
/// are used in the order given.
///
/// ```
/// use pathway_networks::normalize::make_proteoform_string;
///
/// let parts = vec!["P28482".to_owned(), "00046:null".to_owned(), "00047:79".to_owned()];
/// assert_eq!(make_proteoform_string(&parts), "P28482;00046:null,00047:79");
/// ```
pub fn make_proteoform_string(parts: &[String]) -> NodeId {
    let Some((isoform, ptms)) = parts.split_first()
    else {
        warn!("empty proteoform identifier, the record source may have changed its format");
        return ";".to_owned();
    };

    format!("{};{}", isoform, ptms.join(","))
}

/// Return the canonical id of an entity at the given level
pub fn canonical_id(raw_id: &RawId, type_string: &str, level: Level) -> NodeId {
    if type_string == SMALL_MOLECULE_TYPE {
        return strip_annotation(&single_id(raw_id));
    }

    match (level, raw_id) {
        (Level::Proteoforms, RawId::Single(id)) => format!("{};", id),
        (Level::Proteoforms, RawId::Parts(parts)) => make_proteoform_string(parts),
        (_, _) => single_id(raw_id),
    }
}

// an id that should be a plain string
fn single_id(raw_id: &RawId) -> String {
    match raw_id {
        RawId::Single(id) => id.to_owned(),
        RawId::Parts(parts) => {
            warn!("expected a single identifier but got a list: {}", raw_id);
            parts.first().cloned().unwrap_or_default()
        }
    }
}

fn entity_row(raw_id: &RawId, name: &str, type_string: &str, prev_id: &Option<String>,
              level: Level)
    -> EntityRow
{
    EntityRow {
        id: canonical_id(raw_id, type_string, level),
        name: strip_annotation(name),
        type_string: type_string.to_owned(),
        prev_id: prev_id.clone(),
    }
}

/// Normalise the ids and names of reaction participant rows, keeping
/// their order
pub fn fix_participants(records: &[ParticipantRecord], level: Level) -> Vec<Participant> {
    records.iter()
        .map(|record| Participant {
            entity: entity_row(&record.id, &record.name, &record.type_string,
                               &record.prev_id, level),
            pathway: record.pathway.clone(),
            reaction: record.reaction.clone(),
            role: record.role.clone(),
        })
        .collect()
}

/// Normalise the ids and names of complex component rows, keeping
/// their order
pub fn fix_components(records: &[ComponentRecord], level: Level) -> Vec<Component> {
    records.iter()
        .map(|record| Component {
            entity: entity_row(&record.id, &record.name, &record.type_string,
                               &record.prev_id, level),
            complex: record.complex.clone(),
        })
        .collect()
}
