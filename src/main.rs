use clap::Parser;
use exn::ResultExt;
use std::path::PathBuf;
use std::process::ExitCode;
use trawl::App;
use trawl::error::{ErrorKind, Result};
use trawl_config::Config;
use trawl_search::Query;
use tracing_subscriber::EnvFilter;

/// Search a site for pages containing every given word.
#[derive(Parser, Debug)]
#[command(name = "trawl", version, about)]
struct Args {
    /// Configuration file (TOML, YAML or JSON). Defaults to `config.toml` in
    /// the platform configuration directory, if present.
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Site manifest to search, overriding the configuration.
    #[arg(long, short)]
    site: Option<PathBuf>,

    /// Page to start searching from, as `id` or `kind:id`, overriding the
    /// configuration.
    #[arg(long, short)]
    root: Option<String>,

    /// Maximum number of results to print, overriding the configuration.
    #[arg(long, short = 'n')]
    limit: Option<usize>,

    /// Words that must all appear in a page for it to match.
    #[arg(required = true)]
    words: Vec<String>,
}

impl Args {
    fn config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref()).or_raise(|| ErrorKind::Config)?;
        if let Some(site) = &self.site {
            config.site = site.clone();
        }
        if let Some(root) = &self.root {
            config.root = root.clone();
        }
        if let Some(limit) = self.limit {
            config.limit = limit;
        }
        config.validate().or_raise(|| ErrorKind::Config)?;
        Ok(config)
    }

    /// Arguments are joined and parsed as one text, so a quoted
    /// `"apple pie"` is two words just like `apple pie`.
    fn query(&self) -> Query {
        Query::parse(&self.words.join(" "))
    }
}

/// `RUST_LOG` wins over the configured level; an unparseable level falls
/// back to `info`.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn run(args: &Args) -> Result<String> {
    let config = args.config()?;
    init_tracing(&config.log.level);
    let app = App::new(config)?;
    let results = app.search(&args.query())?;
    tracing::debug!(
        matched = results.len(),
        indexed = app.coordinator().indexer().len(),
        stats = ?app.coordinator().indexer().stats(),
        "Search finished"
    );
    Ok(trawl::format_results(&results, app.config().limit))
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        },
        Err(err) => {
            tracing::error!(error = ?err, "trawl failed");
            eprintln!("error: {}", *err);
            ExitCode::FAILURE
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    #[test]
    fn cli_is_well_formed() {
        Args::command().debug_assert();
    }

    #[rstest]
    #[case(&["trawl", "apple"], None, None, &["apple"])]
    #[case(&["trawl", "-n", "3", "apple", "pie"], Some(3), None, &["apple", "pie"])]
    #[case(&["trawl", "--root", "blog", "--limit", "1", "x"], Some(1), Some("blog"), &["x"])]
    fn parses(
        #[case] argv: &[&str],
        #[case] limit: Option<usize>,
        #[case] root: Option<&str>,
        #[case] words: &[&str],
    ) {
        let args = Args::try_parse_from(argv).unwrap();
        assert_eq!(args.limit, limit);
        assert_eq!(args.root.as_deref(), root);
        assert_eq!(args.words, words);
    }

    #[rstest]
    #[case(&["trawl", "apple", "pie"])]
    #[case(&["trawl", "Apple Pie"])]
    #[case(&["trawl", " apple", "", "PIE "])]
    fn query_from_arguments(#[case] argv: &[&str]) {
        let args = Args::try_parse_from(argv).unwrap();
        assert_eq!(args.query().words(), ["apple", "pie"]);
    }

    #[test]
    fn words_are_required() {
        assert!(Args::try_parse_from(["trawl"]).is_err());
    }

    #[test]
    fn overrides_apply_on_top_of_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("trawl.toml");
        std::fs::write(&file, "root = 'index'\nlimit = 4").unwrap();
        let file = file.to_string_lossy().into_owned();
        let args = Args::try_parse_from(["trawl", "--config", &file, "--limit", "2", "x"]).unwrap();
        let config = args.config().unwrap();
        assert_eq!(config.root, "index");
        assert_eq!(config.limit, 2);
        let args = Args::try_parse_from(["trawl", "--config", &file, "--limit", "0", "x"]).unwrap();
        assert_eq!(*args.config().unwrap_err(), ErrorKind::Config);
    }
}
