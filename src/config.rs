//! Command line flags and the optional `mc-console.properties` file.
//!
//! Precedence is flags, then the file, then built-in defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use url::Url;

pub const DEFAULT_URL: &str = "http://127.0.0.1:1234";
pub const DEFAULT_CONFIG_FILE: &str = "mc-console.properties";
pub const DEFAULT_TICK_MS: u64 = 1000;
pub const DEFAULT_RECONNECT_TICKS: u32 = 3;

#[derive(Parser, Debug, Default, Clone)]
#[command(name = "mc-console")]
#[command(about = "Terminal console for a fleet of managed game server saves", long_about = None)]
pub struct Args {
    /// Instance manager base URL
    #[arg(long)]
    pub url: Option<String>,
    /// Properties file (defaults to ./mc-console.properties when present)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Length of one poll tick in milliseconds
    #[arg(long)]
    pub tick_ms: Option<u64>,
    /// Write logs to this file (logs are discarded otherwise)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
    /// tracing filter directive, e.g. `mc_console=debug`
    #[arg(long)]
    pub log_filter: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub base_url: Url,
    pub tick: Duration,
    pub reconnect_ticks: u32,
    pub log_file: Option<PathBuf>,
    pub log_filter: Option<String>,
}

impl Config {
    pub fn load(args: &Args) -> Result<Self> {
        let file = match &args.config {
            Some(path) => Some(read_properties(path)?),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Some(read_properties(path)?)
                } else {
                    None
                }
            }
        };
        let file = file.unwrap_or_default();

        let url = args
            .url
            .clone()
            .or_else(|| file.get("url").cloned())
            .unwrap_or_else(|| DEFAULT_URL.to_string());
        let tick_ms = match args.tick_ms {
            Some(ms) => ms,
            None => match file.get("tick_ms") {
                Some(raw) => raw
                    .parse()
                    .with_context(|| format!("parse tick_ms {raw:?}"))?,
                None => DEFAULT_TICK_MS,
            },
        };
        if tick_ms == 0 {
            bail!("tick_ms must be greater than zero");
        }
        let reconnect_ticks = match file.get("reconnect_ticks") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("parse reconnect_ticks {raw:?}"))?,
            None => DEFAULT_RECONNECT_TICKS,
        };
        let tick = Duration::from_millis(tick_ms);
        if tick.checked_mul(reconnect_ticks).is_none() {
            bail!("tick_ms {tick_ms} times reconnect_ticks {reconnect_ticks} overflows");
        }

        Ok(Self {
            base_url: parse_base_url(&url)?,
            tick,
            reconnect_ticks,
            log_file: args
                .log_file
                .clone()
                .or_else(|| file.get("log_file").map(PathBuf::from)),
            log_filter: args
                .log_filter
                .clone()
                .or_else(|| file.get("log_filter").cloned()),
        })
    }

    /// Wait before re-dialing a dropped console stream.
    pub fn reconnect_delay(&self) -> Duration {
        self.tick
            .checked_mul(self.reconnect_ticks)
            .unwrap_or(Duration::MAX)
    }
}

/// Validates an http(s) base URL and gives it a trailing slash so API
/// paths join under any prefix.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim()).with_context(|| format!("parse url {raw:?}"))?;
    match url.scheme() {
        "http" | "https" => {}
        other => bail!("unsupported url scheme {other:?} (expected http or https)"),
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

const KNOWN_KEYS: &[&str] = &["url", "tick_ms", "reconnect_ticks", "log_file", "log_filter"];

fn read_properties(path: &Path) -> Result<BTreeMap<String, String>> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_properties(&text).with_context(|| format!("parse {}", path.display()))
}

/// `key=value` lines; blank lines and `#` comments are skipped.
pub fn parse_properties(text: &str) -> Result<BTreeMap<String, String>> {
    let mut out = BTreeMap::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            bail!("line {}: expected key=value", i + 1);
        };
        let key = key.trim();
        if !KNOWN_KEYS.contains(&key) {
            bail!("line {}: unknown key {key:?}", i + 1);
        }
        out.insert(key.to_string(), value.trim().to_string());
    }
    Ok(out)
}
