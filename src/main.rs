use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use mamecontrols::config::AppConfig;
use mamecontrols::controls::{
    Configured, ControlEngine, ControlRow, GameControls, Ready, NOT_MAPPED,
};
use mamecontrols::gamedata::resolve;
use mamecontrols::mapping::format_sequence;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Shows which controls a MAME game uses and what they are bound to.
#[derive(Parser, Debug)]
#[command(name = "mamecontrols", version)]
struct Cli {
    /// Config file to use instead of ~/.config/mamecontrols/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// MAME installation directory
    #[arg(long, global = true)]
    mame_dir: Option<PathBuf>,

    /// Show XInput names instead of raw joystick codes
    #[arg(long, global = true, overrides_with = "no_xinput")]
    xinput: bool,

    /// Show raw joystick codes even if the config asks for XInput names
    #[arg(long, global = true, overrides_with = "xinput")]
    no_xinput: bool,

    /// Debug logging
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Control listing of one ROM
    Show {
        rom: String,
        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
        /// Print bindings exactly as stored in the cfg files
        #[arg(long)]
        raw: bool,
    },
    /// Metadata, parent and clones of one ROM
    Info { rom: String },
    /// All known ROM ids
    List {
        /// Only ROMs whose controls resolve
        #[arg(long)]
        with_controls: bool,
    },
    /// Summary of the loaded game data
    Stats,
    /// Reprint a ROM's listing whenever the game data changes
    Watch { rom: String },
    /// Write the default config file
    InitConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup(cli.verbose)?;

    if let Command::InitConfig = cli.command {
        let path = AppConfig::ensure_default_config(cli.config.as_deref()).await?;
        println!("{}", path.display());
        return Ok(());
    }

    let translate = match (cli.xinput, cli.no_xinput) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    };
    let mut config = AppConfig::load(cli.config.as_deref()).await?;
    config.apply_overrides(cli.mame_dir, translate);
    debug!("Effective config: {:?}", config);

    let settings = config.engine_settings().await?;
    let engine = ControlEngine::<Configured>::create(settings)
        .load()
        .await
        .map_err(|e| eyre!("Failed to load game data: {}", e))?;

    match cli.command {
        Command::Show { rom, json, raw } => {
            let controls = engine.game_controls(&rom).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&controls)?);
            } else {
                print_controls(&controls, raw);
            }
        }
        Command::Info { rom } => print_info(&engine, &rom)?,
        Command::List { with_controls } => {
            let db = engine.snapshot();
            let policy = engine.settings().resolve_policy;
            for id in db.ids() {
                if !with_controls || resolve(&db, id, policy).is_ok() {
                    println!("{id}");
                }
            }
        }
        Command::Stats => {
            let db = engine.snapshot();
            let report = db.report();
            println!("Built:            {}", db.built_at().format("%Y-%m-%d %H:%M:%S"));
            println!("Schema version:   {}", report.schema_version);
            println!("Games:            {}", report.games);
            println!("Clones:           {}", report.clones);
            println!("Skipped entries:  {}", report.skipped_entries);
            println!("Skipped controls: {}", report.skipped_controls);
            println!("Duplicate ids:    {}", report.duplicate_ids);
            println!("Migrated fields:  {}", report.migrated_fields);
            println!("Global defaults:  {}", engine.defaults().len());
        }
        Command::Watch { rom } => watch(&engine, &rom).await?,
        Command::InitConfig => {}
    }

    Ok(())
}

fn setup(verbose: bool) -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    setup_logging_env(verbose);
    Ok(())
}

fn setup_logging_env(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // stdout is reserved for listings and JSON
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn mapping_text(row: &ControlRow, raw: bool) -> String {
    if raw || row.current_mapping == NOT_MAPPED {
        row.current_mapping.clone()
    } else {
        format_sequence(&row.current_mapping)
    }
}

fn print_controls(controls: &GameControls, raw: bool) {
    match controls {
        GameControls::NotFound { rom_id, reason } => {
            println!("No control data for {rom_id} ({reason})");
        }
        GameControls::Resolved(game) => {
            println!("{} [{}]", game.display_name, game.rom_id);
            if game.inherited {
                println!("Controls from {}", game.source_id);
            }
            for row in &game.rows {
                println!(
                    "  {:<24} {:<24} {}{}",
                    row.control_id,
                    row.default_label,
                    mapping_text(row, raw),
                    if row.is_customized { " *" } else { "" }
                );
            }
        }
    }
}

fn print_info(engine: &ControlEngine<Ready>, rom: &str) -> Result<()> {
    let db = engine.snapshot();
    let entry = db.get(rom).ok_or_else(|| eyre!("Unknown ROM: {}", rom))?;

    println!("{} [{}]", entry.display_name, entry.id);
    println!(
        "Players: {}{}",
        entry.player_count,
        if entry.alternating { " (alternating)" } else { "" }
    );
    println!("Buttons: {}  Sticks: {}", entry.button_count, entry.stick_count);
    if let Some(parent) = db.parent_of(rom) {
        println!("Clone of: {parent}");
    }
    let clones = db.clones_of(rom);
    if !clones.is_empty() {
        println!("Clones: {}", clones.join(", "));
    }
    match resolve(&db, rom, engine.settings().resolve_policy) {
        Ok(resolved) if resolved.is_inherited() => {
            println!("Controls: {} (from {})", resolved.controls.len(), resolved.source_id)
        }
        Ok(resolved) => println!("Controls: {}", resolved.controls.len()),
        Err(e) => println!("Controls: none ({e})"),
    }
    Ok(())
}

async fn watch(engine: &ControlEngine<Ready>, rom: &str) -> Result<()> {
    let token = CancellationToken::new();
    let reload_handle = engine.spawn_reload_task(token.clone());
    let mut updates = engine.store().subscribe();

    print_controls(&engine.game_controls(rom).await, false);
    info!("Watching {} for changes, Ctrl-C to stop", engine.settings().gamedata_path.display());

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    warn!("Database store closed");
                    break;
                }
                println!();
                print_controls(&engine.game_controls(rom).await, false);
            }
            signal = &mut ctrl_c => {
                if let Err(e) = signal {
                    warn!("Failed to listen for Ctrl-C: {}", e);
                }
                info!("Stopping watch");
                break;
            }
        }
    }

    token.cancel();
    reload_handle
        .await
        .map_err(|e| eyre!("Reload task failed: {}", e))?;
    Ok(())
}
