// # linode-dyndns - one-shot dynamic DNS updater
//
// This binary is a THIN integration layer:
// - All resolution and reconciliation logic lives in dyndns-core
// - No retry loop, no daemon mode: schedule it with cron or a systemd timer
//
// It is responsible for:
// 1. Reading configuration from flags and environment variables
// 2. Initializing logging and the runtime
// 3. Wiring the HTTP echo client and the Linode provider into the engine
// 4. Mapping the result onto the process exit code
//
// ## Example
//
// ```bash
// export LINODE_API_TOKEN=your_token
// linode-dyndns --domain example.com --host home
// linode-dyndns --domain example.com --host @ --family v6 --dry-run
// ```

use anyhow::{Context, Result};
use clap::Parser;
use dyndns_core::config::{DEFAULT_ECHO_TIMEOUT_SECS, DEFAULT_PROVIDER_TIMEOUT_SECS};
use dyndns_core::{
    AddressFamily, Credential, DyndnsConfig, DyndnsEngine, EchoEndpoint, ErrorKind, Outcome,
    ReconcileTarget, ResolverConfig, ResponseFormat,
};
use dyndns_ip_http::{HttpEchoClient, default_endpoints};
use dyndns_provider_linode::LinodeProvider;
use std::net::IpAddr;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for each way a run can end
///
/// - 0: record is current (unchanged, updated, or would be updated)
/// - 1: configuration or startup error
/// - 2: no echo endpoint produced an address
/// - 3: domain or record lookup failed
/// - 4: the update call failed
/// - 5: runtime error (unexpected)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DyndnsExitCode {
    Success = 0,
    ConfigError = 1,
    ResolutionFailed = 2,
    LookupFailed = 3,
    UpdateFailed = 4,
    RuntimeError = 5,
}

impl From<ErrorKind> for DyndnsExitCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Config => DyndnsExitCode::ConfigError,
            ErrorKind::Resolution => DyndnsExitCode::ResolutionFailed,
            ErrorKind::Lookup => DyndnsExitCode::LookupFailed,
            ErrorKind::Update => DyndnsExitCode::UpdateFailed,
            ErrorKind::Runtime => DyndnsExitCode::RuntimeError,
        }
    }
}

impl From<DyndnsExitCode> for ExitCode {
    fn from(code: DyndnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Update one Linode DNS address record to this host's public IP
#[derive(Parser, Debug)]
#[command(name = "linode-dyndns", version)]
struct Cli {
    /// Domain (zone) name, or its numeric Linode domain ID
    #[arg(long, env = "LINODE_DYNDNS_DOMAIN")]
    domain: String,

    /// Host label within the domain ("@" for the apex), or a numeric record ID
    #[arg(long, env = "LINODE_DYNDNS_HOST")]
    host: String,

    /// Linode API token with Domains read/write access
    #[arg(long, env = "LINODE_API_TOKEN", hide_env_values = true)]
    token: String,

    /// IP-echo endpoint, tried in the given order (repeatable)
    #[arg(
        long = "echo-url",
        value_name = "URL",
        env = "LINODE_DYNDNS_ECHO_URLS",
        value_delimiter = ','
    )]
    echo_urls: Vec<String>,

    /// Response format of custom echo endpoints: plain, embedded, json:<field>
    #[arg(long, value_name = "FORMAT", default_value = "plain")]
    echo_format: ResponseFormat,

    /// Address family to publish: v4, v6, any
    #[arg(long, value_name = "FAMILY", default_value = "v4")]
    family: AddressFamily,

    /// Use this address instead of asking echo endpoints
    #[arg(long, value_name = "ADDR")]
    ip: Option<IpAddr>,

    /// Timeout for each echo request (in seconds)
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_ECHO_TIMEOUT_SECS)]
    timeout: u64,

    /// Timeout for each Linode API request (in seconds)
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_PROVIDER_TIMEOUT_SECS)]
    provider_timeout: u64,

    /// Look everything up but do not update the record
    #[arg(long)]
    dry_run: bool,

    /// Log level
    #[arg(
        long,
        env = "LINODE_DYNDNS_LOG_LEVEL",
        default_value = "info",
        value_parser = ["trace", "debug", "info", "warn", "error"],
        ignore_case = true
    )]
    log_level: String,
}

impl Cli {
    /// Build and validate the invocation configuration
    fn to_config(&self) -> Result<DyndnsConfig> {
        let endpoints = if self.echo_urls.is_empty() {
            default_endpoints()
        } else {
            self.echo_urls
                .iter()
                .map(|url| url.trim())
                .filter(|url| !url.is_empty())
                .map(|url| EchoEndpoint::new(url, self.echo_format.clone()))
                .collect()
        };

        let resolver = ResolverConfig::new(endpoints)
            .with_family(self.family)
            .with_timeout_secs(self.timeout);

        let target = ReconcileTarget::new(self.domain.trim(), self.host.trim())
            .with_dry_run(self.dry_run);

        let mut config =
            DyndnsConfig::new(Credential::new(self.token.trim()), target).with_resolver(resolver);
        config.provider_timeout_secs = self.provider_timeout;

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    fn log_level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // --help and --version are not failures
            return if e.use_stderr() {
                DyndnsExitCode::ConfigError.into()
            } else {
                DyndnsExitCode::Success.into()
            };
        }
    };

    let config = match cli.to_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return DyndnsExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level())
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DyndnsExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DyndnsExitCode::RuntimeError.into();
        }
    };

    let code = match rt.block_on(run(config, cli.ip)) {
        Ok(outcome) => {
            info!("{}", outcome);
            DyndnsExitCode::Success
        }
        Err(e) => {
            error!("{}", error_chain(&e));
            DyndnsExitCode::from(e.kind())
        }
    };

    code.into()
}

/// Wire the concrete clients into the engine and run it once
async fn run(config: DyndnsConfig, override_ip: Option<IpAddr>) -> dyndns_core::Result<Outcome> {
    let echo = HttpEchoClient::new(Duration::from_secs(config.resolver.timeout_secs))?;
    let provider = LinodeProvider::new(
        config.credential.clone(),
        Duration::from_secs(config.provider_timeout_secs),
    )?;

    let engine = DyndnsEngine::new(Box::new(echo), Box::new(provider), config)?;
    engine.run_once(override_ip).await
}

/// Render an error with its sources
fn error_chain(e: &dyndns_core::Error) -> String {
    let mut message = e.to_string();
    let mut source = std::error::Error::source(e);
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}
