use anyhow::Result;
use fmtwatch_runtime::Config;
use fmtwatch_runtime::config::resolve_config_path;

pub fn init(explicit_path: Option<&str>, force: bool) -> Result<()> {
    let path = resolve_config_path(explicit_path)?;

    if path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    Config::default().save_to(&path)?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

pub fn show(explicit_path: Option<&str>) -> Result<()> {
    let config = Config::load(explicit_path)?;
    print!("{}", config.to_toml()?);
    Ok(())
}
