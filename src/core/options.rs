//! Scan options
//!
//! The flat record of everything the user can configure for one maigret run.
//! Every field has a default so a partially written settings file still loads.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Allowed range for `--timeout` (seconds)
pub const TIMEOUT_RANGE: RangeInclusive<u32> = 1..=300;
/// Allowed range for `--retries`
pub const RETRIES_RANGE: RangeInclusive<u32> = 0..=10;
/// Allowed range for `--max-connections`
pub const MAX_CONNECTIONS_RANGE: RangeInclusive<u32> = 1..=50;
/// Allowed range for `--top-sites`
pub const TOP_SITES_RANGE: RangeInclusive<u32> = 1..=100;

pub const DEFAULT_TIMEOUT: u32 = 30;
pub const DEFAULT_RETRIES: u32 = 0;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_TOP_SITES: u32 = 10;

/// Kind of identifier passed to maigret
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdType {
    #[default]
    Username,
    Email,
    Phone,
    Profile,
    Location,
}

impl IdType {
    pub fn all() -> &'static [IdType] {
        &[
            IdType::Username,
            IdType::Email,
            IdType::Phone,
            IdType::Profile,
            IdType::Location,
        ]
    }

    /// Value passed to `--id-type`
    pub fn as_str(&self) -> &'static str {
        match self {
            IdType::Username => "username",
            IdType::Email => "email",
            IdType::Phone => "phone",
            IdType::Profile => "profile",
            IdType::Location => "location",
        }
    }
}

impl fmt::Display for IdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IdType::all()
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown id type '{}'", s))
    }
}

/// Report ordering passed to `--reports-sorting`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportSort {
    #[default]
    Default,
    Data,
}

impl ReportSort {
    pub fn all() -> &'static [ReportSort] {
        &[ReportSort::Default, ReportSort::Data]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportSort::Default => "default",
            ReportSort::Data => "data",
        }
    }
}

impl fmt::Display for ReportSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportSort::all()
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown report sorting '{}'", s))
    }
}

/// User-configurable options for one maigret invocation
///
/// Serialized as a flat JSON object. Missing keys fall back to
/// [`ScanOptions::default`], unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// Identifier searched for (positional argument)
    pub username: String,

    pub timeout: u32,
    pub retries: u32,
    pub max_connections: u32,

    pub no_recursion: bool,
    pub no_extracting: bool,
    pub id_type: IdType,
    pub permute: bool,
    pub all_sites: bool,

    /// Gate for `top_sites`
    pub top_sites_enabled: bool,
    pub top_sites: u32,

    /// Comma-separated site tags
    pub tags: String,
    pub site: String,
    pub use_disabled_sites: bool,
    pub parse_url: String,
    pub submit_url: String,
    pub self_check: bool,
    pub stats: bool,

    /// Gate for `report_sort`
    pub report_sorting_enabled: bool,
    pub report_sort: ReportSort,

    // Proxy endpoints
    pub proxy: String,
    pub tor_proxy: String,
    pub i2p_proxy: String,

    // Report formats
    pub csv: bool,
    pub pdf: bool,
    pub txt: bool,
    pub html: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            username: String::new(),
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            no_recursion: false,
            no_extracting: false,
            id_type: IdType::default(),
            permute: false,
            all_sites: false,
            top_sites_enabled: false,
            top_sites: DEFAULT_TOP_SITES,
            tags: String::new(),
            site: String::new(),
            use_disabled_sites: false,
            parse_url: String::new(),
            submit_url: String::new(),
            self_check: false,
            stats: false,
            report_sorting_enabled: false,
            report_sort: ReportSort::default(),
            proxy: String::new(),
            tor_proxy: String::new(),
            i2p_proxy: String::new(),
            csv: false,
            pdf: false,
            txt: false,
            html: false,
        }
    }
}

impl ScanOptions {
    /// Create options for a given identifier with everything else defaulted
    #[cfg(test)]
    pub fn for_username(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Self::default()
        }
    }

    /// Force every numeric field into its allowed range
    pub fn clamped(mut self) -> Self {
        self.timeout = clamp(self.timeout, &TIMEOUT_RANGE);
        self.retries = clamp(self.retries, &RETRIES_RANGE);
        self.max_connections = clamp(self.max_connections, &MAX_CONNECTIONS_RANGE);
        self.top_sites = clamp(self.top_sites, &TOP_SITES_RANGE);
        self
    }

    /// Whether the record holds an identifier worth running
    pub fn has_username(&self) -> bool {
        !self.username.trim().is_empty()
    }
}

fn clamp(value: u32, range: &RangeInclusive<u32>) -> u32 {
    value.clamp(*range.start(), *range.end())
}
