use serde::Serialize;

use crate::cli::GlobalFlags;

/// Render a serializable response as JSON.
pub fn render<T: Serialize>(value: &T, flags: &GlobalFlags) -> anyhow::Result<String> {
    if flags.compact {
        Ok(serde_json::to_string(value)?)
    } else {
        Ok(serde_json::to_string_pretty(value)?)
    }
}

/// Print a serializable response to stdout.
pub fn output<T: Serialize>(value: &T, flags: &GlobalFlags) -> anyhow::Result<()> {
    let rendered = render(value, flags)?;
    println!("{rendered}");
    Ok(())
}
