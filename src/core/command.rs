//! Command builder
//!
//! Maps [`ScanOptions`] to the argument list of a maigret invocation.
//! Flags are emitted in a fixed order; values are never validated.

use super::options::ScanOptions;

/// Executable name of the external tool
pub const MAIGRET_BIN: &str = "maigret";

/// Build the full token list: executable, identifier, then flags
pub fn build_command(opts: &ScanOptions) -> Vec<String> {
    let mut args = ArgList::new();

    args.bare(MAIGRET_BIN);
    args.bare(&opts.username);

    args.value("--timeout", opts.timeout);
    args.value("--retries", opts.retries);
    args.value("--max-connections", opts.max_connections);
    args.flag("--no-recursion", opts.no_recursion);
    args.flag("--no-extracting", opts.no_extracting);
    args.value("--id-type", opts.id_type);
    args.flag("--permute", opts.permute);

    args.text("--proxy", &opts.proxy);
    args.text("--tor-proxy", &opts.tor_proxy);
    args.text("--i2p-proxy", &opts.i2p_proxy);

    args.flag("--all-sites", opts.all_sites);
    if opts.top_sites_enabled {
        args.value("--top-sites", opts.top_sites);
    }
    args.text("--tags", &opts.tags);
    args.text("--site", &opts.site);
    args.flag("--use-disabled-sites", opts.use_disabled_sites);

    args.text("--parse", &opts.parse_url);
    args.text("--submit", &opts.submit_url);
    args.flag("--self-check", opts.self_check);
    args.flag("--stats", opts.stats);

    args.flag("--csv", opts.csv);
    args.flag("--pdf", opts.pdf);
    args.flag("--txt", opts.txt);
    args.flag("--html", opts.html);

    if opts.report_sorting_enabled {
        args.value("--reports-sorting", opts.report_sort);
    }

    args.into_inner()
}

/// Render tokens as a single shell-quoted line for display
///
/// Only used for showing the command; the runner never goes through a shell.
pub fn display_command(tokens: &[String]) -> String {
    shlex::try_join(tokens.iter().map(String::as_str)).unwrap_or_else(|_| tokens.join(" "))
}

struct ArgList(Vec<String>);

impl ArgList {
    fn new() -> Self {
        Self(Vec::with_capacity(16))
    }

    fn bare(&mut self, token: &str) {
        self.0.push(token.to_string());
    }

    fn flag(&mut self, name: &str, enabled: bool) {
        if enabled {
            self.bare(name);
        }
    }

    fn value(&mut self, name: &str, value: impl ToString) {
        self.bare(name);
        self.0.push(value.to_string());
    }

    /// Free text is emitted verbatim unless it is blank
    fn text(&mut self, name: &str, value: &str) {
        if !value.trim().is_empty() {
            self.value(name, value);
        }
    }

    fn into_inner(self) -> Vec<String> {
        self.0
    }
}
