use clap::Parser;
use oozebane::cli::{run, Cli};
use oozebane::init_logging;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    tracing::debug!(
        "oozebane {} (built {})",
        oozebane::VERSION,
        oozebane::BUILD_DATE
    );
    run(&cli)?;

    Ok(())
}
