//! Loaded and compiled mappings, and selection of a mapping per file.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use oxrdf::Quad;
use quarry_core::{MappingConfig, MappingSpec};
use regex::Regex;

use crate::engine::{MappingEngine, RecordMapper};
use crate::error::MappingError;
use crate::rules::{load_rules, substitute_stream_sources};

/// A mapping spec with its compiled mapper and the rules it came from.
#[derive(Debug, Clone)]
pub struct CompiledMapping {
    spec: MappingSpec,
    rules: Vec<Quad>,
    mapper: Arc<dyn RecordMapper>,
    include: Option<Regex>,
    exclude: Option<Regex>,
}

impl CompiledMapping {
    /// Bundle a compiled mapper with its spec.
    ///
    /// Include and exclude patterns must match the whole file name.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::Pattern`] if a pattern does not compile.
    pub fn new(
        spec: MappingSpec,
        rules: Vec<Quad>,
        mapper: Arc<dyn RecordMapper>,
    ) -> Result<Self, MappingError> {
        let include =
            full_match_pattern(&spec.id, "include", spec.source_file_include_pattern.as_deref())?;
        let exclude =
            full_match_pattern(&spec.id, "exclude", spec.source_file_exclude_pattern.as_deref())?;
        Ok(Self {
            spec,
            rules,
            mapper,
            include,
            exclude,
        })
    }

    pub const fn spec(&self) -> &MappingSpec {
        &self.spec
    }

    pub fn id(&self) -> &str {
        &self.spec.id
    }

    /// The record type written into derived contexts and resolution keys.
    pub fn kind(&self) -> &str {
        &self.spec.id
    }

    /// The merged rule model the mapper was compiled from.
    pub fn rules(&self) -> &[Quad] {
        &self.rules
    }

    pub fn mapper(&self) -> &dyn RecordMapper {
        self.mapper.as_ref()
    }

    /// Whether this mapping applies to `file_name`.
    pub fn matches(&self, file_name: &str) -> bool {
        self.include.as_ref().is_none_or(|re| re.is_match(file_name))
            && self.exclude.as_ref().is_none_or(|re| !re.is_match(file_name))
    }
}

fn full_match_pattern(
    id: &str,
    kind: &'static str,
    pattern: Option<&str>,
) -> Result<Option<Regex>, MappingError> {
    pattern
        .filter(|pattern| !pattern.is_empty())
        .map(|pattern| {
            Regex::new(&format!("^(?:{pattern})$")).map_err(|source| MappingError::Pattern {
                id: id.to_string(),
                kind,
                source,
            })
        })
        .transpose()
}

/// All usable mappings, keyed by lowercase id.
///
/// Populated once at startup and read-only afterwards. Iteration, and thus
/// selection, follows key order.
#[derive(Debug, Clone, Default)]
pub struct MappingRegistry {
    mappings: BTreeMap<String, CompiledMapping>,
}

impl MappingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the mapping configuration at `location`.
    ///
    /// Never fails: an unreadable or malformed document yields an empty
    /// registry, and a spec that does not compile is left out. Both are
    /// logged as warnings.
    pub fn load(location: &Path, engine: &dyn MappingEngine) -> Self {
        match Self::try_load(location, engine) {
            Ok(registry) => registry,
            Err(error) => {
                tracing::warn!(
                    %error,
                    location = %location.display(),
                    "could not load mapping configuration, no mappings available"
                );
                Self::new()
            }
        }
    }

    /// Like [`Self::load`], but reports document-level failures.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::Io`] if the document cannot be read, or
    /// [`MappingError::Config`] if it is malformed. Per-spec failures are
    /// still only logged.
    pub fn try_load(location: &Path, engine: &dyn MappingEngine) -> Result<Self, MappingError> {
        let text = std::fs::read_to_string(location).map_err(|source| MappingError::Io {
            path: location.display().to_string(),
            source,
        })?;
        let config = MappingConfig::from_json(&text)?;
        let config_dir = location.parent().unwrap_or_else(|| Path::new(""));

        let mut registry = Self::new();
        for spec in config.mappings {
            let id = spec.id.clone();
            match Self::compile_spec(config_dir, spec, engine) {
                Ok(mapping) => {
                    tracing::info!(mapping = %id, rules = mapping.rules().len(), "loaded mapping");
                    registry.insert(mapping);
                }
                Err(error) => {
                    tracing::warn!(%error, mapping = %id, "failed to compile mapping, skipping");
                }
            }
        }
        Ok(registry)
    }

    /// Load, merge and compile the rules of one spec.
    ///
    /// # Errors
    ///
    /// Returns the first error from rule loading, compilation, or pattern
    /// compilation.
    pub fn compile_spec(
        config_dir: &Path,
        spec: MappingSpec,
        engine: &dyn MappingEngine,
    ) -> Result<CompiledMapping, MappingError> {
        let rules = substitute_stream_sources(load_rules(config_dir, &spec.mapping_files)?);
        let mapper = engine.compile(&rules)?;
        CompiledMapping::new(spec, rules, mapper)
    }

    /// Register a mapping, replacing any with the same normalized id.
    pub fn insert(&mut self, mapping: CompiledMapping) -> Option<CompiledMapping> {
        let key = mapping.spec().normalized_id();
        let previous = self.mappings.insert(key, mapping);
        if let Some(previous) = &previous {
            tracing::warn!(mapping = %previous.id(), "duplicate mapping id, replacing earlier definition");
        }
        previous
    }

    /// Look up a mapping by id (case-insensitive).
    pub fn get(&self, id: &str) -> Option<&CompiledMapping> {
        self.mappings.get(&id.to_lowercase())
    }

    /// The first mapping, in key order, whose patterns accept `file_name`.
    pub fn select_for(&self, file_name: &str) -> Option<&CompiledMapping> {
        self.mappings.values().find(|mapping| mapping.matches(file_name))
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompiledMapping> {
        self.mappings.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quarry_rdf::LiteralContext;

    #[derive(Debug)]
    struct NoopMapper;

    impl RecordMapper for NoopMapper {
        fn map_record(
            &self,
            _input: &[u8],
            _literals: &LiteralContext<'_>,
        ) -> Result<Vec<Quad>, MappingError> {
            Ok(Vec::new())
        }
    }

    fn mapping(spec: MappingSpec) -> CompiledMapping {
        CompiledMapping::new(spec, Vec::new(), Arc::new(NoopMapper)).unwrap()
    }

    fn registry() -> MappingRegistry {
        let mut registry = MappingRegistry::new();
        registry.insert(mapping(MappingSpec::new("pubs").with_include_pattern(r"pubs/.*\.jsonl")));
        registry.insert(mapping(
            MappingSpec::new("authors").with_include_pattern(r"authors/.*\.jsonl"),
        ));
        registry
    }

    #[test]
    fn selects_by_include_pattern() {
        let registry = registry();
        assert_eq!(
            registry.select_for("pubs/0001/records_1.jsonl").map(CompiledMapping::id),
            Some("pubs")
        );
        assert_eq!(
            registry.select_for("authors/a.jsonl").map(CompiledMapping::id),
            Some("authors")
        );
        assert!(registry.select_for("other/x.jsonl").is_none());
    }

    #[test]
    fn patterns_must_match_whole_name() {
        let registry = registry();
        assert!(registry.select_for("archive/pubs/1.jsonl").is_none());
        assert!(registry.select_for("pubs/1.jsonl.gz").is_none());
    }

    #[test]
    fn exclude_pattern_rejects() {
        let m = mapping(
            MappingSpec::new("pubs")
                .with_include_pattern(r"pubs/.*")
                .with_exclude_pattern(r".*\.tmp"),
        );
        assert!(m.matches("pubs/a.jsonl"));
        assert!(!m.matches("pubs/a.tmp"));
    }

    #[test]
    fn unset_patterns_match_everything() {
        let m = mapping(MappingSpec::new("all"));
        assert!(m.matches("anything/at/all.json"));
    }

    #[test]
    fn first_match_in_key_order_wins() {
        let mut registry = MappingRegistry::new();
        registry.insert(mapping(MappingSpec::new("zeta")));
        registry.insert(mapping(MappingSpec::new("Alpha")));
        assert_eq!(registry.select_for("x").map(CompiledMapping::id), Some("Alpha"));
        assert!(registry.get("ALPHA").is_some());
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let result = CompiledMapping::new(
            MappingSpec::new("bad").with_include_pattern("pubs/(unclosed"),
            Vec::new(),
            Arc::new(NoopMapper),
        );
        assert!(matches!(result, Err(MappingError::Pattern { kind: "include", .. })));
    }
}
