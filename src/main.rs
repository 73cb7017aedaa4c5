use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context as _;
use clap::Parser as _;

fn main() -> ExitCode {
    if let Err(err) = try_main() {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn try_main() -> anyhow::Result<()> {
    originscout::logging::init().context("init logging")?;

    let cli = originscout::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    let config = originscout::crawler::SeedConfig::new(
        &cli.url,
        cli.threads,
        cli.depth,
        Duration::from_secs(cli.timeout),
        cli.proxy(),
        cli.mode,
    )
    .context("build seed config")?;

    let crawler = originscout::crawler::Crawler::new(config);
    let findings = crawler.run();

    originscout::sink::write_all(&cli.prefix, &findings).context("write output files")?;

    Ok(())
}
