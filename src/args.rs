use clap::{Parser, ValueEnum};
use contact_crawler::config::CrawlerConfig;
use contact_crawler::export::OutputFormat;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "contact-crawler")]
#[command(about = "Crawls websites for emails, phone numbers and social profiles")]
#[command(version)]
pub struct Args {
    /// File with one seed URL per line (# starts a comment)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Where to write the records
    #[arg(short, long, default_value = "output.json")]
    pub output: PathBuf,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = FormatArg::Json)]
    pub format: FormatArg,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,

    /// Retry failed pages in a headless browser (needs a WebDriver server)
    #[arg(long)]
    pub use_dynamic: bool,

    /// Never use the headless browser
    #[arg(long)]
    pub use_static: bool,

    /// Override max_depth
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Override max_pages_per_site
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Number of sites crawled concurrently
    #[arg(long)]
    pub concurrency: Option<usize>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Json,
    Csv,
    Both,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Csv => OutputFormat::Csv,
            FormatArg::Both => OutputFormat::Both,
        }
    }
}

impl Args {
    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply(&self, config: &mut CrawlerConfig) {
        match (self.use_dynamic, self.use_static) {
            (true, true) => {
                ::log::warn!("Both --use-dynamic and --use-static given, using dynamic");
                config.use_dynamic_fallback = true;
            }
            (true, false) => config.use_dynamic_fallback = true,
            (false, true) => config.use_dynamic_fallback = false,
            (false, false) => {}
        }
        if let Some(max_depth) = self.max_depth {
            config.max_depth = max_depth;
        }
        if let Some(max_pages) = self.max_pages {
            config.max_pages_per_site = max_pages;
        }
        if let Some(concurrency) = self.concurrency {
            config.max_concurrency = concurrency;
        }
    }
}
