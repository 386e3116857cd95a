// Analog Clock Widget - standalone host
//
// Defines the clock element, mounts one instance on a calloop event loop
// with a loopback messaging client, and optionally writes PNG/SVG
// snapshots of the rendered frame.

use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use calloop::signals::{Signal, Signals};
use calloop::EventLoop;
use clap::Parser;

use analog_clock_widget::{
    change_color_payload,
    widget::{create_element, define},
    CalloopTimers, ClockElement, ClockElementFactory, Color, Config, CustomElement,
    ElementContext, ExternalClient, LoopbackClient, CHANGE_COLOR_EVENT,
};

#[derive(Parser)]
#[command(name = "analog-clock-widget")]
#[command(about = "Embeddable analog clock with digital readout", long_about = None)]
struct Cli {
    /// Configuration file path (default: the user config directory)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Run for this many seconds, then disconnect and exit (default: until Ctrl-C)
    #[arg(short, long)]
    seconds: Option<u64>,

    /// Send a change-color message after mounting, as `r,g,b` or `#rrggbb`
    #[arg(long, value_parser = parse_color)]
    color: Option<Color>,

    /// Outer box width, e.g. `300px`
    #[arg(long)]
    width: Option<String>,

    /// Outer box height, e.g. `360px`
    #[arg(long)]
    height: Option<String>,

    /// Write a PNG of the last frame on exit
    #[arg(long, value_name = "FILE")]
    snapshot: Option<PathBuf>,

    /// Write the dial as SVG on exit
    #[arg(long, value_name = "FILE")]
    svg: Option<PathBuf>,

    /// Write the default configuration file and exit
    #[arg(long)]
    init_config: bool,
}

fn parse_color(value: &str) -> std::result::Result<Color, String> {
    if value.starts_with('#') {
        return Color::from_hex(value).ok_or_else(|| format!("invalid hex color '{}'", value));
    }
    let channels = value
        .split(',')
        .map(|part| part.trim().parse::<u8>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid color channel in '{}': {}", value, e))?;
    match channels.as_slice() {
        [r, g, b] => Ok(Color::rgb(*r, *g, *b)),
        _ => Err(format!("expected three channels r,g,b, got '{}'", value)),
    }
}

/// Event loop state
struct Host {
    running: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    if cli.init_config {
        let config = Config::default();
        config.save()?;
        tracing::info!(path = ?Config::config_path()?, "Default configuration written");
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if cli.width.is_some() {
        config.width = cli.width.clone();
    }
    if cli.height.is_some() {
        config.height = cli.height.clone();
    }
    tracing::info!(tag = %config.tag_name, "Starting Analog Clock Widget");

    let mut event_loop =
        EventLoop::<'static, Host>::try_new().context("Failed to create event loop")?;
    let timers = Rc::new(CalloopTimers::new(event_loop.handle()));

    define(&config.tag_name, ClockElementFactory::new(config.clone()))?;
    let context = ElementContext::for_config(timers, &config);
    let mut element = create_element(&config.tag_name, &context, &toml::Table::new())?;

    let loopback = Rc::new(LoopbackClient::new());
    let client: Rc<dyn ExternalClient> = loopback.clone();
    element.set_client(Some(client))?;
    element.connected()?;

    if let Some(color) = cli.color {
        let handled = loopback.emit(CHANGE_COLOR_EVENT, &change_color_payload(color));
        tracing::info!(color = %color, handlers = handled, "Sent change-color message");
    }

    let signals =
        Signals::new(&[Signal::SIGINT]).context("Failed to create signal handler for graceful shutdown")?;
    event_loop
        .handle()
        .insert_source(signals, |_signal, _metadata, host| {
            tracing::info!("Received SIGINT, shutting down");
            host.running = false;
        })
        .map_err(|e| anyhow::anyhow!("Failed to insert signal handler: {:?}", e))?;

    let deadline = cli
        .seconds
        .map(|secs| Instant::now() + Duration::from_secs(secs));
    let mut host = Host { running: true };

    tracing::info!("Event loop starting");
    while host.running {
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            break;
        }
        event_loop
            .dispatch(Duration::from_millis(100), &mut host)
            .context("Event loop dispatch failed")?;
    }

    write_outputs(&cli, &*element)?;

    element.disconnected();
    tracing::info!(
        handlers = loopback.total_handlers(),
        "Element disconnected, exiting"
    );
    Ok(())
}

fn write_outputs(cli: &Cli, element: &dyn CustomElement) -> Result<()> {
    if cli.snapshot.is_none() && cli.svg.is_none() {
        return Ok(());
    }
    let clock = element
        .downcast_ref::<ClockElement>()
        .context("Defined element is not a clock")?;
    let view = clock.view().context("Clock is not mounted")?;

    {
        let view = view.borrow();
        tracing::info!(
            time = %view.readout().time,
            date = %view.readout().date,
            "Final frame"
        );
        if let Some(path) = &cli.svg {
            std::fs::write(path, view.scene().to_svg())
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "SVG written");
        }
    }

    if let Some(path) = &cli.snapshot {
        let pixmap = clock.snapshot()?;
        pixmap
            .save_png(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!(
            path = %path.display(),
            width = pixmap.width(),
            height = pixmap.height(),
            "Snapshot written"
        );
    }
    Ok(())
}
