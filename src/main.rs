use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use monitor_transfer::report::EXIT_FATAL;
use monitor_transfer::{Orchestrator, RunConfig, RunReport};
use monitor_transfer_client::PlatformClient;

#[derive(Parser, Debug)]
#[command(name = "monitor-transfer")]
#[command(about = "Copy data-quality monitors from one data source to another")]
struct Args {
    /// Config file (TOML, YAML or JSON); environment variables prefixed
    /// with MONITOR_TRANSFER_ and the flags below take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API bearer token (prefer MONITOR_TRANSFER_TOKEN)
    #[arg(long)]
    token: Option<String>,

    /// Tenant name, e.g. "demo" for https://demo.siffletdata.com
    #[arg(short, long)]
    tenant: Option<String>,

    /// Domain the tenant is a subdomain of
    #[arg(long)]
    platform_domain: Option<String>,

    /// Full API base URL, overriding tenant and domain
    #[arg(long)]
    base_url: Option<String>,

    /// Data source the monitors are copied from
    #[arg(long)]
    origin_datasource: Option<String>,

    /// Data source the copies are retargeted at
    #[arg(long)]
    destination_datasource: Option<String>,

    /// Directory receiving the inventory and origin documents (cleared on start)
    #[arg(long)]
    origin_dir: Option<PathBuf>,

    /// Directory receiving the retargeted documents (cleared on start)
    #[arg(long)]
    destination_dir: Option<PathBuf>,

    /// Prefix added to the name of every copied monitor
    #[arg(short, long)]
    prefix: Option<String>,

    /// Inventory file name, without the .csv extension
    #[arg(long)]
    inventory_name: Option<String>,

    /// Only copy monitors carrying this tag id
    #[arg(long)]
    filter_tag: Option<String>,

    /// Tag id put on origin monitors once copied
    #[arg(long)]
    transferred_tag: Option<String>,

    /// When to tag origin monitors: "copy" (after the destination file is
    /// written) or "convert" (right after conversion)
    #[arg(long)]
    tag_after: Option<String>,

    /// Monitors requested per search page
    #[arg(long)]
    page_size: Option<u32>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl Args {
    fn overrides(&self) -> Vec<(&'static str, Option<String>)> {
        let path = |p: &Option<PathBuf>| p.as_ref().map(|p| p.display().to_string());
        vec![
            ("token", self.token.clone()),
            ("tenant", self.tenant.clone()),
            ("platform_domain", self.platform_domain.clone()),
            ("base_url", self.base_url.clone()),
            ("origin_datasource", self.origin_datasource.clone()),
            ("destination_datasource", self.destination_datasource.clone()),
            ("origin_dir", path(&self.origin_dir)),
            ("destination_dir", path(&self.destination_dir)),
            ("prefix", self.prefix.clone()),
            ("inventory_name", self.inventory_name.clone()),
            ("filter_tag", self.filter_tag.clone()),
            ("transferred_tag", self.transferred_tag.clone()),
            ("tag_after", self.tag_after.clone()),
            ("page_size", self.page_size.map(|n| n.to_string())),
            ("timeout_secs", self.timeout_secs.map(|n| n.to_string())),
        ]
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "monitor_transfer=info,monitor_transfer_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    match run(&args) {
        Ok(report) => {
            print!("{}", report);
            ExitCode::from(report.exit_code())
        }
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn run(args: &Args) -> Result<RunReport> {
    let config = RunConfig::load(args.config.as_deref(), &args.overrides())
        .context("Invalid configuration")?;

    tracing::info!(
        tenant = ?config.tenant,
        origin = %config.origin_datasource,
        destination = %config.destination_datasource,
        tag_after = ?config.tag_after,
        "Starting monitor transfer"
    );

    let mut builder = PlatformClient::builder()
        .token(&config.token)
        .timeout(config.timeout());
    if let Some(tenant) = &config.tenant {
        builder = builder.tenant(tenant);
    }
    if let Some(domain) = &config.platform_domain {
        builder = builder.platform_domain(domain);
    }
    if let Some(url) = &config.base_url {
        builder = builder.base_url(url);
    }
    let client = builder.build().context("Failed to build API client")?;

    // Single-threaded: every call is awaited in sequence
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let orchestrator = Orchestrator::new(client, config);
    let report = rt.block_on(orchestrator.run())?;
    Ok(report)
}
