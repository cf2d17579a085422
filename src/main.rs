use clap::Parser;
use contact_crawler::config::CrawlerConfig;
use contact_crawler::export::write_output;
use contact_crawler::input::read_seed_file;
use contact_crawler::{ContactCrawler, Error};
use std::process::ExitCode;

mod args;
use args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Parse command-line arguments
    let args = Args::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if args.verbose {
        logger.filter_level(::log::LevelFilter::Debug);
    }
    logger.init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_fatal() => {
            ::log::error!("{}", e);
            ExitCode::FAILURE
        }
        Err(e) => {
            ::log::error!("Invalid setup: {}", e);
            ExitCode::from(2)
        }
    }
}

async fn run(args: Args) -> Result<(), Error> {
    let mut config = CrawlerConfig::load(args.config.as_deref())?;
    config.apply_env();
    args.apply(&mut config);

    let seeds = read_seed_file(&args.input)?;
    if seeds.is_empty() {
        ::log::warn!("No seed URLs in {}", args.input.display());
    }

    let crawler = ContactCrawler::new(config)?;

    let config = crawler.config();
    if config.use_dynamic_fallback {
        ::log::info!(
            "Dynamic fallback needs a WebDriver server (e.g., ChromeDriver) at {}; set {} to change it",
            config.webdriver_url,
            contact_crawler::config::WEBDRIVER_URL_ENV
        );
    }
    if config.regions_for_phones.is_empty() {
        ::log::info!("No phone regions configured, phone numbers are not validated");
    }

    // Stop queuing new pages on Ctrl+C; pages in flight still finish
    let token = crawler.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ::log::warn!("Interrupted, stopping after the current pages");
            token.cancel();
        }
    });

    let start_time = std::time::Instant::now();
    let reports = crawler.run(&seeds).await?;

    let pages: usize = reports.iter().map(|r| r.pages_fetched).sum();
    let records: Vec<_> = reports.into_iter().flat_map(|r| r.records).collect();
    let written = write_output(&records, &args.output, args.format.into())?;

    ::log::info!(
        "Crawling complete - {} page(s), {} record(s) in {:.2} seconds",
        pages,
        records.len(),
        start_time.elapsed().as_secs_f64()
    );
    for path in written {
        ::log::info!("Output: {}", path.display());
    }
    Ok(())
}
