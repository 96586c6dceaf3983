//! Command-line interface
//!
//! Without a subcommand the desktop window is opened. The subcommands reuse
//! the same builder, runner and settings store without a window.

pub mod command;
pub mod config;
pub mod run;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::core::{IdType, ReportSort, ScanOptions};
use crate::host::ProcessRunner;
use crate::settings::SettingsStore;

/// Process exit codes
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const UNEXPECTED_FAILURE: i32 = 1;
    /// maigret could not be located
    pub const BINARY_NOT_FOUND: i32 = 2;
    /// maigret ended without an exit code (stopped by a signal)
    pub const INTERRUPTED: i32 = 130;
}

#[derive(Debug, Parser)]
#[command(name = "maigret-night", version, about = "Desktop front-end for maigret")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_output: bool,

    /// Settings file to use instead of the default location
    #[arg(long, global = true, env = "MAIGRET_NIGHT_SETTINGS", value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// maigret executable to run instead of looking it up on PATH
    #[arg(long, global = true, env = "MAIGRET_BIN", value_name = "PATH")]
    pub maigret_bin: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Open the desktop window (default)
    Gui,
    /// Run maigret without a window and stream its output to stdout
    Run(ScanArgs),
    /// Print the maigret command that would be run
    Command(ScanArgs),
    /// Inspect or reset saved settings
    Config(config::ConfigArgs),
}

/// Shared inputs for every subcommand
#[derive(Debug, Clone)]
pub struct AppContext {
    pub store: SettingsStore,
    pub maigret_bin: Option<PathBuf>,
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        Ok(Self {
            store: SettingsStore::resolve(cli.settings.as_deref())?,
            maigret_bin: cli.maigret_bin.clone(),
        })
    }

    /// Runner honouring the `--maigret-bin` override
    pub fn runner(&self) -> ProcessRunner {
        match &self.maigret_bin {
            Some(bin) => ProcessRunner::new().with_program(bin),
            None => ProcessRunner::new(),
        }
    }
}

/// Per-run overrides on top of the saved settings
///
/// Switches can only turn an option on; use `--defaults` to start from a
/// clean slate instead of the saved settings.
#[derive(Debug, Clone, Default, Args)]
pub struct ScanArgs {
    /// Identifier to search for (defaults to the saved one)
    pub username: Option<String>,

    /// Ignore saved settings and start from defaults
    #[arg(long)]
    pub defaults: bool,

    /// Per-site timeout in seconds (1-300)
    #[arg(long)]
    pub timeout: Option<u32>,

    /// Retries for failed requests (0-10)
    #[arg(long)]
    pub retries: Option<u32>,

    /// Concurrent connections (1-50)
    #[arg(long)]
    pub max_connections: Option<u32>,

    /// Identifier type: username, email, phone, profile, location
    #[arg(long)]
    pub id_type: Option<IdType>,

    #[arg(long)]
    pub no_recursion: bool,

    #[arg(long)]
    pub no_extracting: bool,

    #[arg(long)]
    pub permute: bool,

    #[arg(long)]
    pub all_sites: bool,

    /// Only check the N most popular sites (1-100)
    #[arg(long, value_name = "N")]
    pub top_sites: Option<u32>,

    /// Comma-separated site tags
    #[arg(long)]
    pub tags: Option<String>,

    /// Limit the search to one site
    #[arg(long)]
    pub site: Option<String>,

    #[arg(long)]
    pub use_disabled_sites: bool,

    /// Page URL to parse for identifiers
    #[arg(long = "parse", value_name = "URL")]
    pub parse_url: Option<String>,

    /// URL of a new site to submit
    #[arg(long = "submit", value_name = "URL")]
    pub submit_url: Option<String>,

    #[arg(long)]
    pub self_check: bool,

    #[arg(long)]
    pub stats: bool,

    /// Report ordering: default, data
    #[arg(long, value_name = "ORDER")]
    pub reports_sorting: Option<ReportSort>,

    /// Proxy URL, e.g. socks5://127.0.0.1:1080
    #[arg(long)]
    pub proxy: Option<String>,

    #[arg(long)]
    pub tor_proxy: Option<String>,

    #[arg(long)]
    pub i2p_proxy: Option<String>,

    #[arg(long)]
    pub csv: bool,

    #[arg(long)]
    pub pdf: bool,

    #[arg(long)]
    pub txt: bool,

    #[arg(long)]
    pub html: bool,
}

impl ScanArgs {
    /// Saved settings (or defaults) with these overrides applied
    pub fn resolve(&self, store: &SettingsStore) -> anyhow::Result<ScanOptions> {
        let base = if self.defaults {
            ScanOptions::default()
        } else {
            store.load_or_default()?
        };
        Ok(self.apply(base))
    }

    pub fn apply(&self, mut opts: ScanOptions) -> ScanOptions {
        if let Some(username) = &self.username {
            opts.username = username.clone();
        }
        if let Some(v) = self.timeout {
            opts.timeout = v;
        }
        if let Some(v) = self.retries {
            opts.retries = v;
        }
        if let Some(v) = self.max_connections {
            opts.max_connections = v;
        }
        if let Some(v) = self.id_type {
            opts.id_type = v;
        }
        if let Some(v) = self.top_sites {
            opts.top_sites_enabled = true;
            opts.top_sites = v;
        }
        if let Some(v) = self.reports_sorting {
            opts.report_sorting_enabled = true;
            opts.report_sort = v;
        }

        let texts = [
            (&self.tags, &mut opts.tags),
            (&self.site, &mut opts.site),
            (&self.parse_url, &mut opts.parse_url),
            (&self.submit_url, &mut opts.submit_url),
            (&self.proxy, &mut opts.proxy),
            (&self.tor_proxy, &mut opts.tor_proxy),
            (&self.i2p_proxy, &mut opts.i2p_proxy),
        ];
        for (value, field) in texts {
            if let Some(value) = value {
                *field = value.clone();
            }
        }

        let switches = [
            (self.no_recursion, &mut opts.no_recursion),
            (self.no_extracting, &mut opts.no_extracting),
            (self.permute, &mut opts.permute),
            (self.all_sites, &mut opts.all_sites),
            (self.use_disabled_sites, &mut opts.use_disabled_sites),
            (self.self_check, &mut opts.self_check),
            (self.stats, &mut opts.stats),
            (self.csv, &mut opts.csv),
            (self.pdf, &mut opts.pdf),
            (self.txt, &mut opts.txt),
            (self.html, &mut opts.html),
        ];
        for (on, field) in switches {
            *field |= on;
        }

        opts.clamped()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("maigret-night").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_no_subcommand_means_gui() {
        let cli = parse(&[]);
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_run_args_parse() {
        let cli = parse(&[
            "run", "alice", "--timeout", "45", "--id-type", "email", "--top-sites", "20", "--csv",
            "--proxy", "socks5://127.0.0.1:1080", "-v",
        ]);
        let Some(Commands::Run(args)) = cli.command else {
            panic!("expected run subcommand");
        };
        assert!(cli.verbose);
        assert_eq!(args.username.as_deref(), Some("alice"));
        assert_eq!(args.timeout, Some(45));
        assert_eq!(args.id_type, Some(IdType::Email));
        assert_eq!(args.top_sites, Some(20));
        assert!(args.csv);
        assert_eq!(args.proxy.as_deref(), Some("socks5://127.0.0.1:1080"));
    }

    #[test]
    fn test_invalid_id_type_rejected() {
        let result = Cli::try_parse_from(["maigret-night", "run", "x", "--id-type", "nickname"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_overrides_saved_values() {
        let saved = ScanOptions {
            username: "saved".to_string(),
            retries: 3,
            pdf: true,
            ..ScanOptions::default()
        };
        let args = ScanArgs {
            username: Some("bob".to_string()),
            all_sites: true,
            csv: true,
            reports_sorting: Some(ReportSort::Data),
            ..ScanArgs::default()
        };

        let opts = args.apply(saved);
        assert_eq!(opts.username, "bob");
        assert_eq!(opts.retries, 3);
        assert!(opts.pdf);
        assert!(opts.all_sites);
        assert!(opts.csv);
        assert!(opts.report_sorting_enabled);
        assert_eq!(opts.report_sort, ReportSort::Data);
        assert!(!opts.top_sites_enabled);
    }

    #[test]
    fn test_apply_clamps_out_of_range() {
        let args = ScanArgs {
            timeout: Some(0),
            max_connections: Some(1000),
            ..ScanArgs::default()
        };
        let opts = args.apply(ScanOptions::default());
        assert_eq!(opts.timeout, 1);
        assert_eq!(opts.max_connections, 50);
    }

    #[test]
    fn test_resolve_with_defaults_ignores_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::at(dir.path().join("settings.json"));
        store.save(&ScanOptions::for_username("stored")).unwrap();

        let args = ScanArgs {
            defaults: true,
            ..ScanArgs::default()
        };
        assert_eq!(args.resolve(&store).unwrap().username, "");

        let args = ScanArgs::default();
        assert_eq!(args.resolve(&store).unwrap().username, "stored");
    }
}
