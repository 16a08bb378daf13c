use quarry_config::QuarryConfig;
use quarry_mapping::{ContextAssigner, MappingRegistry};
use serde_json::{Value, json};

use crate::bootstrap;
use crate::cli::{GlobalFlags, SelectArgs};
use crate::output::output;

/// Handle `quarry mappings`.
pub fn handle_list(config: &QuarryConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let registry = bootstrap::load_registry(config);
    let specs: Vec<_> = registry.iter().map(|mapping| mapping.spec()).collect();
    output(&specs, flags)
}

/// Handle `quarry select <file>`.
pub fn handle_select(args: &SelectArgs, config: &QuarryConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let registry = bootstrap::load_registry(config);
    let contexts = ContextAssigner::new(config.output.context_base.clone());
    output(&selection(&registry, &contexts, &args.file_name), flags)
}

fn selection(registry: &MappingRegistry, contexts: &ContextAssigner, file_name: &str) -> Value {
    match registry.select_for(file_name) {
        Some(mapping) => {
            let spec = mapping.spec();
            json!({
                "file": file_name,
                "mapping": mapping.id(),
                "context": contexts.context_for_spec(spec).as_str(),
                "lineMode": spec.line_mode,
                "processingHints": spec.processing_hints,
            })
        }
        None => json!({ "file": file_name, "mapping": Value::Null }),
    }
}
