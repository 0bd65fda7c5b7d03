//! Signals command implementation.

use anyhow::Result;
use ronda::signals::SignalScope;
use ronda::signals::registry::available_signals;

use crate::OutputFormat;

/// Print the signal registry.
pub(crate) fn list_signals(detailed: bool, format: OutputFormat) -> Result<()> {
    let signals = available_signals();

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&signals)?);
        return Ok(());
    }

    println!("\nAvailable signals");
    println!("{}", "-".repeat(60));
    for info in &signals {
        let scope = match info.scope {
            SignalScope::PerTicker => "per ticker",
            SignalScope::Global => "global",
        };
        if detailed {
            println!(
                "  {:20} [{}] {} (lookback: {} days, {scope})",
                info.name,
                info.kind.key(),
                info.description,
                info.typical_lookback
            );
            println!("  {:20} {}", "", info.category.description());
        } else {
            println!("  {:20} [{}]", info.name, info.kind.key());
        }
    }
    println!();

    if !detailed {
        println!("Use --detailed for descriptions and lookbacks.\n");
    }
    Ok(())
}
