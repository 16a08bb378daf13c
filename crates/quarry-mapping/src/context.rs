//! Named graph derivation for output files.

use oxrdf::NamedNode;
use quarry_core::MappingSpec;

/// Dataset qualifier that never appears in derived contexts.
pub const DEFAULT_DATASET: &str = "default";

/// Derives the TargetContext of a file from its mapping.
///
/// `context_for` is a pure function of its inputs: an explicit `datasetIri`
/// wins; otherwise `base + type + "/"`, or `base + dataset + "/" + type + "/"`
/// when a dataset other than `"default"` is supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextAssigner {
    base: String,
}

impl ContextAssigner {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Context IRI for records of `kind` mapped by `spec`.
    ///
    /// The result is not validated; an unusual base or type yields an IRI the
    /// serializer writes verbatim.
    pub fn context_for(&self, spec: &MappingSpec, kind: &str, dataset: Option<&str>) -> NamedNode {
        if let Some(iri) = spec.dataset_iri.as_deref().filter(|iri| !iri.is_empty()) {
            return NamedNode::new_unchecked(iri);
        }
        let iri = match dataset.filter(|dataset| !dataset.is_empty() && *dataset != DEFAULT_DATASET) {
            Some(dataset) => format!("{}{dataset}/{kind}/", self.base),
            None => format!("{}{kind}/", self.base),
        };
        NamedNode::new_unchecked(iri)
    }

    /// Context for `spec` using its id as type and its own dataset qualifier.
    pub fn context_for_spec(&self, spec: &MappingSpec) -> NamedNode {
        self.context_for(spec, &spec.id, spec.dataset.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn assigner() -> ContextAssigner {
        ContextAssigner::new("https://example.com/")
    }

    #[test]
    fn type_only() {
        let spec = MappingSpec::new("pubs");
        assert_eq!(
            assigner().context_for(&spec, "Person", None).as_str(),
            "https://example.com/Person/"
        );
    }

    #[test]
    fn dataset_qualifier() {
        let spec = MappingSpec::new("pubs");
        assert_eq!(
            assigner().context_for(&spec, "Person", Some("acme")).as_str(),
            "https://example.com/acme/Person/"
        );
    }

    #[test]
    fn default_dataset_is_ignored() {
        let spec = MappingSpec::new("pubs");
        assert_eq!(
            assigner().context_for(&spec, "Person", Some("default")),
            assigner().context_for(&spec, "Person", None)
        );
    }

    #[test]
    fn deterministic_across_calls() {
        let spec = MappingSpec::new("pubs");
        let first = assigner().context_for(&spec, "Person", Some("acme"));
        for _ in 0..5 {
            assert_eq!(assigner().context_for(&spec, "Person", Some("acme")), first);
        }
    }

    #[test]
    fn explicit_dataset_iri_wins() {
        let spec = MappingSpec::new("pubs").with_dataset_iri("https://data.example.org/graph/pubs");
        let acme = assigner().context_for(&spec, "Person", Some("acme"));
        let other = assigner().context_for(&spec, "Person", Some("other"));
        let none = assigner().context_for(&spec, "Person", None);
        assert_eq!(acme.as_str(), "https://data.example.org/graph/pubs");
        assert_eq!(acme, other);
        assert_eq!(acme, none);
    }

    #[test]
    fn spec_defaults() {
        let spec = MappingSpec::new("authors").with_dataset("acme");
        assert_eq!(
            assigner().context_for_spec(&spec).as_str(),
            "https://example.com/acme/authors/"
        );
    }
}
