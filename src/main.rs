mod activation;
mod catalog;
mod cli;
mod config;
mod download;
mod error;
mod installer;
mod link;
mod locator;
mod platform;
mod shim;
mod types;

#[cfg(test)]
mod tests;

use activation::{activate, load_active_names, update_active_versions};
use anyhow::{anyhow, Context, Result};
use catalog::Catalog;
use clap::Parser;
use cli::{Cli, Commands, ConfigAction};
use config::{
    apply_setting, get_setting, load_settings, normalize_key, reset_setting, save_settings,
    Layout, SETTING_KEYS,
};
use console::style;
use download::DownloadArea;
use installer::SystemRunner;
use link::{link_commands, unlink_commands};
use locator::{Installation, InstallationQuery, LocalInstallations};
use platform::get_system_info;
use types::{HostInfo, Settings, VersionDescriptor};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(&cli)?;

    let mut settings = load_settings()?;
    let quiet = cli.quiet;

    match cli.command {
        Commands::Version => {
            let host = get_system_info(settings.force_32bit);
            println!("pythonup v{} ({})", env!("CARGO_PKG_VERSION"), host);
            return Ok(());
        }

        Commands::Config { action } => {
            handle_config(&mut settings, action)?;
            return Ok(());
        }

        command => {
            let layout = Layout::from_settings(&settings)?;
            let host = get_system_info(settings.force_32bit);
            tracing::debug!("Host: {}", host);
            let catalog = Catalog::load(&layout.catalog_dir).with_context(|| {
                format!("Could not load version catalog from {}", layout.catalog_dir.display())
            })?;
            run_command(command, &layout, &host, &catalog, quiet).await?;
        }
    }

    Ok(())
}

async fn run_command(
    command: Commands,
    layout: &Layout,
    host: &HostInfo,
    catalog: &Catalog,
    quiet: bool,
) -> Result<()> {
    let installations = LocalInstallations::new(catalog, &layout.install_root);

    match command {
        Commands::Install { version } => {
            let version = select_version(catalog, host, &version);
            check_installed(&installations, version, false);

            // Removed on every exit path of this arm
            let area = DownloadArea::new()?;
            let installer_path = area.download_installer(version, quiet).await?;

            println!("Installing {}...", version);
            let install_dir =
                installer::install(version, &SystemRunner, &installer_path, &layout.install_root)
                    .with_context(|| format!("Failed to install {}", version))?;
            println!("{} is installed successfully to {}", version, install_dir.display());

            link_commands(layout, version)?;
        }

        Commands::Uninstall { version } => {
            let version = select_version(catalog, host, &version);
            check_installed(&installations, version, true);

            let area = DownloadArea::new()?;
            let installer_path = area.download_installer(version, quiet).await?;

            println!("Uninstalling {}...", version);
            installer::uninstall(version, &SystemRunner, &installer_path)
                .with_context(|| format!("Failed to uninstall {}", version))?;

            unlink_commands(layout, version);
            update_active_versions(layout, catalog, &[version.name.as_str()], quiet)?;
            println!("{} is uninstalled successfully.", version);
        }

        Commands::Use { versions, reset } => {
            if reset {
                activate(layout, &[], true, quiet)?;
                println!("Not using any versions.");
            } else if versions.is_empty() {
                let active = load_active_names(&layout.active_versions_file)?;
                if active.is_empty() {
                    println!("Not using any versions.");
                } else {
                    println!("Using: {}", active.join(", "));
                }
            } else {
                let mut selected: Vec<&VersionDescriptor> = Vec::new();
                for name in &versions {
                    let version = select_version(catalog, host, name);
                    check_installed(&installations, version, true);
                    if !selected.iter().any(|v| v.name == version.name) {
                        selected.push(version);
                    }
                }
                activate(layout, &selected, false, quiet)?;
            }
        }

        Commands::Link { version } => {
            let version = select_version(catalog, host, &version);
            check_installed(&installations, version, true);
            link_commands(layout, version)?;
        }

        Commands::Unlink { version } => {
            let version = select_version(catalog, host, &version);
            if unlink_commands(layout, version) == 0 && !quiet {
                println!("Nothing to unlink for {}", version);
            }
        }

        Commands::List { all } => {
            list_versions(layout, host, catalog, &installations, all)?;
        }

        Commands::Where { version } => {
            let version = select_version(catalog, host, &version);
            check_installed(&installations, version, true);
            let installation = Installation::locate(version, &layout.install_root);
            println!("{}", installation.interpreter.display());
        }

        Commands::Version | Commands::Config { .. } => unreachable!("handled before layout setup"),
    }

    Ok(())
}

fn setup_logging(cli: &Cli) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if cli.quiet {
        "error"
    } else if cli.verbose == 0 {
        "warn"
    } else if cli.verbose == 1 {
        "info"
    } else {
        "debug"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();

    Ok(())
}

/// Resolves `name` for this host, exiting with a message when it is unknown.
fn select_version<'a>(catalog: &'a Catalog, host: &HostInfo, name: &'a str) -> &'a VersionDescriptor {
    match catalog.resolve_for_host(name, host.can_execute_64bit) {
        Ok(resolved) => {
            if let Some(requested) = resolved.substituted_for {
                println!(
                    "Note: Selecting {} instead of {}",
                    resolved.descriptor.name, requested
                );
            }
            resolved.descriptor
        }
        Err(e) => {
            tracing::debug!("Resolution failed: {}", e);
            eprintln!("No such version: {}", name);
            std::process::exit(1);
        }
    }
}

fn check_installed(query: &dyn InstallationQuery, version: &VersionDescriptor, installed: bool) {
    if query.is_installed(&version.name) == installed {
        return;
    }
    if installed {
        eprintln!("{}", error::Error::NotInstalled(version.to_string()));
    } else {
        eprintln!("{}", error::Error::AlreadyInstalled(version.to_string()));
    }
    std::process::exit(1);
}

fn list_versions(
    layout: &Layout,
    host: &HostInfo,
    catalog: &Catalog,
    installations: &dyn InstallationQuery,
    all: bool,
) -> Result<()> {
    let active = load_active_names(&layout.active_versions_file)?;
    let installed = installations.installed_names();

    let mut shown = 0;
    for version in catalog.visible_versions(host.can_execute_64bit) {
        let is_installed = installed.contains(&version.name);
        if !all && !is_installed {
            continue;
        }
        let marker = if active.contains(&version.name) {
            style("*").green().bold().to_string()
        } else {
            " ".to_string()
        };
        let note = if all && is_installed {
            style(" (installed)").dim().to_string()
        } else {
            String::new()
        };
        println!("{} {}{}", marker, version.name, note);
        shown += 1;
    }

    if shown == 0 {
        if catalog.is_empty() {
            println!("  No versions in catalog {}", layout.catalog_dir.display());
        } else {
            println!("  No versions installed yet.");
        }
    }
    Ok(())
}

fn handle_config(settings: &mut Settings, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Get { key } => {
            if let Some(key) = key {
                match get_setting(settings, &key) {
                    Some(value) => println!("{}", value),
                    None => println!("Setting '{}' not found", normalize_key(&key)),
                }
            } else {
                println!("--- pythonup settings ---");
                for key in SETTING_KEYS {
                    let value = get_setting(settings, key).unwrap_or_default();
                    println!("  {}: {}", key, value);
                }
            }
        }
        ConfigAction::Set { args } => {
            let (key, value) = match args.as_slice() {
                [single] => single
                    .split_once('=')
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .ok_or_else(|| anyhow!("Invalid format. Use 'key=value' or 'key value'."))?,
                [key, rest @ ..] => (key.clone(), rest.join(" ")),
                [] => return Err(anyhow!("Missing key and value")),
            };
            apply_setting(settings, &key, &value)?;
            save_settings(settings)?;
            tracing::info!("Setting '{}' updated to '{}'", normalize_key(&key), value);
        }
        ConfigAction::Unset { key } => {
            reset_setting(settings, &key)?;
            save_settings(settings)?;
            tracing::info!("Setting '{}' unset", normalize_key(&key));
        }
        ConfigAction::Show { format } => match format.as_str() {
            "json" => println!("{}", serde_json::to_string_pretty(settings)?),
            "yaml" => print!("{}", serde_yaml::to_string(settings)?),
            "plain" => {
                for key in SETTING_KEYS {
                    println!("{}={}", key, get_setting(settings, key).unwrap_or_default());
                }
            }
            other => return Err(anyhow!("Unknown format '{}'. Use json, yaml or plain.", other)),
        },
    }
    Ok(())
}
