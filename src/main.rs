use std::error::Error;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use bus::Bus;
use clap::Parser;
use html::Document;
use log::LevelFilter;
use net::NetClient;
use runtime_net::start_net_runtime;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use viewer::{Shell, Viewer, ViewerConfig};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "report-viewer")]
#[command(about = "Browse a server-rendered file report from the terminal", long_about = None)]
struct Args {
    /// Server that renders the report (overrides the config file)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Read the initial page from disk instead of fetching the base URL
    #[arg(long, value_name = "FILE")]
    page: Option<PathBuf>,

    /// TOML settings file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// off, error, warn, info, debug or trace
    #[arg(long, value_name = "LEVEL", default_value = "info", value_parser = parse_level)]
    log_level: LevelFilter,
}

fn parse_level(s: &str) -> Result<LevelFilter, String> {
    s.parse().map_err(|_| format!("unknown log level `{s}`"))
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    TermLogger::init(
        args.log_level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )?;

    let mut config = match &args.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    config.validate()?;

    let client = NetClient::new(Duration::from_millis(config.request_timeout_ms));
    let document = match &args.page {
        Some(path) => Document::parse(&std::fs::read_to_string(path)?),
        None => {
            let url = config.base_url()?;
            let page = client.get_text(url.as_str())?;
            if !html::is_html(page.content_type.as_deref()) {
                log::warn!("{} is {:?}, not HTML", page.url, page.content_type);
            }
            log::info!("loaded {} ({}, {} ms)", page.url, page.status, page.duration_ms);
            Document::parse(&page.body)
        }
    };

    let Bus {
        cmd_tx,
        cmd_rx,
        evt_tx,
        evt_rx,
    } = Bus::new();
    start_net_runtime(client, cmd_rx, evt_tx);

    let mut viewer = Viewer::new(&config, document)?;
    viewer.set_bus_sender(cmd_tx);

    let mut shell = Shell::new(viewer, evt_rx, Duration::from_millis(config.pump_wait_ms));
    shell.run(io::stdin().lock(), io::stdout().lock())?;
    Ok(())
}
