use k8sdns_domain::{CliOverrides, Config};
use tracing::info;

pub fn load_config(
    config_path: Option<&str>,
    cli_overrides: CliOverrides,
) -> anyhow::Result<Config> {
    let config = Config::load(config_path, cli_overrides)?;
    config.validate()?;

    info!(
        config_file = config_path.unwrap_or("default"),
        zones = ?config.plugin.zones,
        ttl = config.plugin.ttl,
        annotation_prefix = %config.plugin.annotation_prefix,
        "Configuration loaded"
    );

    Ok(config)
}
