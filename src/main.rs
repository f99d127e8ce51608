use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use std::path::PathBuf;
use tracing::debug;

use essstat::config::Config;
use essstat::data::load_page;
use essstat::fetcher::{SwitchClient, SwitchPage};
use essstat::{
    port_snapshot, render_ports, render_system, system_snapshot, Metric, OutputRequest,
};

/// TP-Link Easy Smart Switch port statistics.
#[derive(Parser, Debug)]
#[command(name = "essstat", version)]
struct Cli {
    /// IP address or hostname of switch.
    #[arg(value_name = "TPhost", required_unless_present = "page_file")]
    target: Option<String>,

    /// Username for switch access.
    #[arg(short, long, value_name = "TPuser", default_value = "admin")]
    username: String,

    /// Password for switch access.
    #[arg(short, long, value_name = "TPpswd", required_unless_present = "page_file")]
    password: Option<String>,

    /// Output in a single line.
    #[arg(short = '1', long = "1line")]
    one_line: bool,

    /// Output port statistics only.
    #[arg(short, long)]
    statsonly: bool,

    /// Output as JSON.
    #[arg(short, long)]
    json: bool,

    /// Output as Zabbix low-level discovery JSON.
    #[arg(short, long)]
    lld: bool,

    /// Report system info instead of port statistics.
    #[arg(short, long, conflicts_with_all = ["port", "metric"])]
    info: bool,

    /// Port to query a single metric on (1-based).
    #[arg(short = 'P', long, requires = "metric")]
    port: Option<usize>,

    /// Metric to query: state, link_status, TxGoodPkt, TxBadPkt, RxGoodPkt, RxBadPkt.
    #[arg(short, long, requires = "port")]
    metric: Option<Metric>,

    /// Decode a saved page instead of contacting the switch.
    #[arg(short = 'f', long, value_name = "PATH")]
    page_file: Option<PathBuf>,

    /// Activate debugging output.
    #[arg(short, long)]
    debug: bool,
}

impl Cli {
    fn page(&self) -> SwitchPage {
        if self.info {
            SwitchPage::SystemInfo
        } else {
            SwitchPage::PortStatistics
        }
    }

    fn output_request(&self) -> OutputRequest {
        OutputRequest {
            point: self.port.zip(self.metric),
            discovery: self.lld,
            json: self.json,
            single_line: self.one_line,
            stats: self.statsonly,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let page = cli.page();
    let mode = cli.output_request().resolve();
    debug!("Requested {:?} as {:?}", page, mode);

    let html = match &cli.page_file {
        Some(path) => {
            load_page(path).with_context(|| format!("reading {}", path.display()))?
        }
        None => fetch_page(&cli, page).await?,
    };

    let captured_at = Local::now().naive_local();
    let output = match page {
        SwitchPage::PortStatistics => {
            let snapshot = port_snapshot(&html, captured_at).context("decoding port statistics")?;
            render_ports(&snapshot, &mode)?
        }
        SwitchPage::SystemInfo => {
            let snapshot = system_snapshot(&html, captured_at).context("decoding system info")?;
            render_system(&snapshot, &mode)?
        }
    };

    println!("{}", output);
    Ok(())
}

async fn fetch_page(cli: &Cli, page: SwitchPage) -> Result<String> {
    let target = cli.target.as_deref().context("no switch address given")?;
    let password = cli.password.as_deref().context("no password given")?;

    let client = SwitchClient::new(target, Config::from_env())?;
    client
        .login(&cli.username, password)
        .await
        .context("login failed")?;

    let body = client.fetch(page).await;
    client.logout().await;
    body.with_context(|| format!("fetching {}{}", client.base_url(), page.path()))
}
