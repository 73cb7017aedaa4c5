use clap::Parser;

use crate::engine::EngineMode;

#[derive(Debug, Parser)]
#[command(author, version, about = "Single-origin reconnaissance crawler")]
pub struct Cli {
    /// Seed URL. Its network authority becomes the crawl's origin boundary.
    pub url: String,

    /// Worker thread count.
    #[arg(short = 't', long = "threads", default_value_t = 10)]
    pub threads: usize,

    /// Maximum link depth. Depth 0 is the seed.
    #[arg(short = 'd', long = "depth", default_value_t = 4)]
    pub depth: u32,

    /// Per-request timeout, in seconds.
    #[arg(long, default_value_t = 12)]
    pub timeout: u64,

    /// Route both http and https through http://127.0.0.1:8080 and disable
    /// TLS verification (intercepting-proxy workflow).
    #[arg(long)]
    pub burp: bool,

    /// Output filename prefix.
    #[arg(short = 'o', long = "prefix", default_value = "crawl")]
    pub prefix: String,

    /// Fetch engine selection.
    #[arg(long, value_enum, default_value_t = EngineMode::Auto)]
    pub mode: EngineMode,
}

impl Cli {
    pub fn proxy(&self) -> Option<String> {
        self.burp.then(|| "http://127.0.0.1:8080".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn burp_flag_maps_to_local_proxy() {
        let cli = Cli::parse_from(["originscout", "http://x.test", "--burp"]);
        assert_eq!(cli.proxy(), Some("http://127.0.0.1:8080".to_string()));
    }

    #[test]
    fn no_burp_flag_means_no_proxy() {
        let cli = Cli::parse_from(["originscout", "http://x.test"]);
        assert_eq!(cli.proxy(), None);
    }
}
