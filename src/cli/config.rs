//! Settings inspection

use clap::{Args, Subcommand};

use super::AppContext;
use crate::core::ScanOptions;

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Print the settings file location
    Path,
    /// Print the effective settings as JSON
    Show,
    /// Delete saved settings so defaults apply again
    Reset,
}

pub fn run(ctx: &AppContext, args: ConfigArgs) -> anyhow::Result<()> {
    match args.action {
        ConfigAction::Path => println!("{}", ctx.store.path().display()),
        ConfigAction::Show => println!("{}", render(&ctx.store.load_or_default()?)?),
        ConfigAction::Reset => {
            ctx.store.reset()?;
            println!("Settings reset: {}", ctx.store.path().display());
        }
    }
    Ok(())
}

fn render(opts: &ScanOptions) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(opts)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_is_flat_object() {
        let json = render(&ScanOptions::for_username("alice")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let map = value.as_object().unwrap();

        assert_eq!(map["username"], "alice");
        assert_eq!(map["timeout"], 30);
        assert_eq!(map["id_type"], "username");
        assert_eq!(map["csv"], false);
        assert!(map.values().all(|v| v.is_string() || v.is_number() || v.is_boolean()));
    }
}
