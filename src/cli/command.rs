//! Print the maigret command without running it

use super::{AppContext, ScanArgs};
use crate::core::{build_command, display_command};

pub fn run(ctx: &AppContext, args: ScanArgs) -> anyhow::Result<()> {
    let opts = args.resolve(&ctx.store)?;
    if !opts.has_username() {
        tracing::warn!("No username set; maigret will reject this command");
    }
    println!("{}", display_command(&build_command(&opts)));
    Ok(())
}
