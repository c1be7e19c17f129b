/// Riff - terminal music player
use anyhow::Context;
use clap::Parser;
use crossbeam_channel::Receiver;
use riff_cli::{
    app::App,
    commands::{self, Command},
    config::{self, RiffConfig},
    notifier::Notifier,
    storage::Store,
};
use riff_playback::{EngineEvent, MediaEngine, PlaybackController, ProviderContinuations};
use riff_sources::{LrclibClient, SaavnClient};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "riff")]
#[command(about = "Terminal music player", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "RIFF_CONFIG")]
    config: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,

    /// Search for this right away
    #[arg(short, long)]
    search: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = RiffConfig::load(cli.config.as_deref())?;
    config.validate()?;

    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let data_dir = config::data_dir();
    init_logging(&data_dir)?;
    tracing::info!(data_dir = %data_dir.display(), "Starting riff");

    let saavn = Arc::new(
        SaavnClient::new(&config.sources.saavn_base_url).context("Invalid Saavn base URL")?,
    );
    let lyrics =
        LrclibClient::new(&config.sources.lrclib_base_url).context("Invalid LRCLIB base URL")?;

    let (engine, events) = start_engine(&config)?;
    let continuations = ProviderContinuations::new(tokio::runtime::Handle::current())
        .with_provider(saavn.clone());
    let controller =
        PlaybackController::new(engine, events, Box::new(continuations), config.player.clone())
            .context("Failed to start playback controller")?;

    install_callbacks(&controller, Notifier::new(&config.notifications));

    let mut app = App::new(controller, saavn, lyrics, &config, Store::in_dir(&data_dir));

    println!("riff {} - type 'help' for commands", env!("CARGO_PKG_VERSION"));
    if let Some(query) = cli.search {
        print_lines(&app.execute(Command::Search(query)).await.lines);
    }

    run_loop(&mut app).await?;

    tracing::info!("Exiting");
    Ok(())
}

async fn run_loop(app: &mut App) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        prompt()?;
        let Some(line) = lines.next_line().await? else {
            // EOF (Ctrl-D)
            app.execute(Command::Quit).await;
            return Ok(());
        };

        match commands::parse(&line) {
            Ok(Some(command)) => {
                let reply = app.execute(command).await;
                print_lines(&reply.lines);
                if reply.quit {
                    return Ok(());
                }
            }
            Ok(None) => {}
            Err(e) => println!("{e}"),
        }
    }
}

fn install_callbacks(controller: &PlaybackController, notifier: Notifier) {
    let hub = controller.notifications();

    hub.on_subtitle_change(|line| {
        if !line.is_empty() {
            println!("\r  ♪ {line}");
        }
    });

    hub.on_notice(move |message| {
        println!("\r! {message}");
        notifier.notify(message);
    });

    hub.on_end_of_track(|| tracing::debug!("Track finished"));
}

fn prompt() -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "riff> ")?;
    stdout.flush()
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

/// Log to `<data_dir>/riff.log` so output does not mix with the prompt
fn init_logging(data_dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create {}", data_dir.display()))?;
    let log_path = data_dir.join("riff.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open {}", log_path.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "riff=info,riff_cli=info,riff_playback=info,riff_mpv=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(log_file)),
        )
        .init();

    Ok(())
}

#[cfg(unix)]
fn start_engine(
    config: &RiffConfig,
) -> anyhow::Result<(Box<dyn MediaEngine>, Receiver<EngineEvent>)> {
    use riff_mpv::{MpvEngine, MpvOptions};

    let options = MpvOptions {
        program: config.engine.mpv_path.clone(),
        audio_output: config.engine.audio_output.clone(),
        extra_args: config.engine.extra_args.clone(),
        ..MpvOptions::default()
    };
    let (engine, events) = MpvEngine::spawn(&options)
        .with_context(|| format!("Failed to start {}", options.program))?;

    Ok((Box::new(engine), events))
}

#[cfg(not(unix))]
fn start_engine(
    _config: &RiffConfig,
) -> anyhow::Result<(Box<dyn MediaEngine>, Receiver<EngineEvent>)> {
    anyhow::bail!("The mpv engine needs a Unix IPC socket")
}
