//! Record status carried inside mapped statements.

use oxrdf::{Quad, Subject};

/// Predicate a mapping uses to publish a record's status.
pub const STATUS_PREDICATE: &str = "urn:recordStatus";

/// Status value marking a record as withdrawn.
pub const OBSOLETE: &str = "obsolete";

/// Status of one record, as found in its statements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordStatus {
    /// Subject of the status statement: the entity to retract.
    pub entity: Option<String>,
    pub obsolete: bool,
}

impl RecordStatus {
    /// Split status statements off `quads`.
    ///
    /// Returns the remaining statements and the status they carried. A
    /// record is obsolete if any status value equals `obsolete`, ignoring
    /// case.
    #[must_use]
    pub fn extract(quads: Vec<Quad>) -> (Vec<Quad>, Self) {
        let mut status = Self::default();
        let mut kept = Vec::with_capacity(quads.len());
        for quad in quads {
            if quad.predicate.as_str() != STATUS_PREDICATE {
                kept.push(quad);
                continue;
            }
            let value = match &quad.object {
                oxrdf::Term::Literal(literal) => literal.value().to_string(),
                other => other.to_string(),
            };
            let obsolete = value.eq_ignore_ascii_case(OBSOLETE);
            if obsolete || status.entity.is_none() {
                status.entity = Some(entity_of(quad.subject));
            }
            status.obsolete |= obsolete;
        }
        (kept, status)
    }
}

fn entity_of(subject: Subject) -> String {
    match subject {
        Subject::NamedNode(node) => node.into_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::{GraphName, Literal, NamedNode};
    use pretty_assertions::assert_eq;

    fn quad(subject: &str, predicate: &str, value: &str) -> Quad {
        Quad::new(
            NamedNode::new(subject).unwrap(),
            NamedNode::new(predicate).unwrap(),
            Literal::new_simple_literal(value),
            GraphName::DefaultGraph,
        )
    }

    #[test]
    fn obsolete_status_is_extracted_and_removed() {
        let quads = vec![
            quad("https://example.com/p/1", "https://schema.org/name", "x"),
            quad("https://example.com/p/1", STATUS_PREDICATE, "OBSOLETE"),
        ];
        let (kept, status) = RecordStatus::extract(quads);
        assert_eq!(kept.len(), 1);
        assert!(status.obsolete);
        assert_eq!(status.entity.as_deref(), Some("https://example.com/p/1"));
    }

    #[test]
    fn other_status_is_not_obsolete() {
        let (kept, status) = RecordStatus::extract(vec![quad(
            "https://example.com/p/1",
            STATUS_PREDICATE,
            "active",
        )]);
        assert!(kept.is_empty());
        assert!(!status.obsolete);
    }

    #[test]
    fn no_status_statement() {
        let (kept, status) =
            RecordStatus::extract(vec![quad("https://example.com/p/1", "https://schema.org/name", "x")]);
        assert_eq!(kept.len(), 1);
        assert_eq!(status, RecordStatus::default());
    }
}
