use anyhow::Result;
use fmtwatch_runtime::{ClangFormat, Config};
use owo_colors::OwoColorize;

pub fn handle(config: &Config) -> Result<()> {
    let gateway = ClangFormat::probe(&config.formatter)?;

    println!("{} {}", "✓".green(), config.formatter.program.bold());
    println!("  path:    {}", gateway.program().display());
    println!("  version: {}", gateway.version());
    if !config.formatter.args.is_empty() {
        println!("  args:    {}", config.formatter.args.join(" "));
    }
    println!("  extensions: {}", config.extensions.join(", "));

    Ok(())
}
