use quarry_config::QuarryConfig;

use crate::cli::{Commands, GlobalFlags};

pub mod mappings;
pub mod run;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    config: QuarryConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Run(args) => run::handle(&args, config, flags).await,
        Commands::Mappings => mappings::handle_list(&config, flags),
        Commands::Select(args) => mappings::handle_select(&args, &config, flags),
    }
}
