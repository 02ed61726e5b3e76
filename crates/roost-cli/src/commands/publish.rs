//! `roost publish` command implementation.
//!
//! Gathers the module configuration and ignore rules, selects the files
//! to upload, checks the module against the registry, then posts the
//! manifest and the file pieces.

use tracing::{debug, info, warn};

use roost_config::{
    check_entry, default_config, default_ignore, match_files, parse_ignore, read_config,
    read_ignore, read_pieces, Config, Ignore,
};
use roost_core::error::{RoostError, RoostResult};
use roost_registry::{PublishRequest, RegistryClient};

use super::CommandContext;
use crate::keyfile;

pub struct PublishFlags {
    pub name: Option<String>,
    pub dry_run: bool,
    pub version: Option<String>,
    pub description: Option<String>,
    pub repository: Option<String>,
    pub entry: String,
    pub unstable: bool,
    pub unlisted: bool,
    pub no_latest: bool,
}

/// Execute the `roost publish` command
pub async fn execute(flags: PublishFlags, ctx: &CommandContext) -> RoostResult<()> {
    let api_key = keyfile::read_api_key().await?.ok_or(RoostError::MissingApiKey)?;

    let mut config = match default_config(&ctx.cwd) {
        Some(path) => {
            debug!("reading configuration from {}", path.display());
            read_config(&path).await?
        },
        None => Config::default(),
    };
    apply_flags(&mut config, &flags);

    let name = config.name.clone().ok_or_else(|| RoostError::ConfigValidation {
        field: "name".to_string(),
        reason: "a module name is required; set it in the configuration or pass it as an argument"
            .to_string(),
    })?;
    let version = config.version.clone().ok_or_else(|| RoostError::ConfigValidation {
        field: "version".to_string(),
        reason: "a version is required; set it in the configuration or pass --version".to_string(),
    })?;
    if config.description.is_none() {
        warn!("You haven't provided a description for your module, continuing without one...");
    }

    let ignore = gather_ignore(&config, ctx)?;
    let matched = match_files(&config, &ignore, &ctx.cwd)?;
    let entry = check_entry(&config, &matched)?;
    let pieces = read_pieces(&matched)?;

    let client = RegistryClient::new()?;
    let name_version = format!("{name}@{version}");
    if let Some(existing) = client.fetch_module(&name).await? {
        if existing.has_upload(&name_version) {
            return Err(RoostError::AlreadyPublished { name, version });
        }
    }

    let request = PublishRequest {
        name: name.clone(),
        description: config.description.clone(),
        repository: config.repository.clone(),
        version: version.clone(),
        unlisted: config.unlisted.unwrap_or(false),
        upload: true,
        entry,
        latest: !flags.no_latest,
        stable: config.stable.unwrap_or(!flags.unstable),
    };

    if flags.dry_run {
        info!("This was a dry run; nothing was uploaded.");
        info!("The manifest would have been: {request:#?}");
        info!("The matched files were:");
        for file in &matched {
            info!("  - {}", file.path);
        }
        return Ok(());
    }

    let publish_response = client.publish(&api_key, &request).await?;
    let pieces_response = client.upload_pieces(&publish_response.token, &pieces).await?;

    info!("Successfully published {name_version}!");
    info!("Files uploaded:");
    for (path, _) in &pieces_response.files {
        info!("  - {} -> {}/{}{}", path, client.endpoint(), name_version, path);
    }
    Ok(())
}

/// Command-line flags override the configuration file
fn apply_flags(config: &mut Config, flags: &PublishFlags) {
    if flags.name.is_some() {
        config.name = flags.name.clone();
    }
    if flags.version.is_some() {
        config.version = flags.version.clone();
    }
    if flags.description.is_some() {
        config.description = flags.description.clone();
    }
    if flags.repository.is_some() {
        config.repository = flags.repository.clone();
    }
    if config.entry.is_none() {
        config.entry = Some(flags.entry.clone());
    }
    if flags.unlisted {
        config.unlisted = Some(true);
    }
    if flags.unstable {
        config.stable = Some(false);
    }
}

/// Ignore rules come from `.roostignore` when present, else from the
/// configuration's inline `ignore` list.
fn gather_ignore(config: &Config, ctx: &CommandContext) -> RoostResult<Ignore> {
    if let Some(path) = default_ignore(&ctx.cwd) {
        return read_ignore(&path, &ctx.cwd);
    }
    if let Some(lines) = &config.ignore {
        return Ok(parse_ignore(&lines.join("\n"), "config ignore list"));
    }
    Ok(Ignore::default())
}
