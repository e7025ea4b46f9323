use anyhow::Context;
use clap::{Parser, Subcommand};

use gifty_scraper::{domains, extract_product, PageFetcher, PageHeaders, ProxySettings};

#[derive(Debug, Parser)]
#[command(name = "gifty-cli")]
#[command(about = "Gifting console command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch a merchant product page and print the normalized record.
    Ingest {
        /// Product page URL (Amazon, bol.com, Zalando, or Etsy).
        url: String,
    },
    /// Show the active scrape-proxy provider and the egress IP it yields.
    Proxy,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = gifty_core::load_app_config_from_env()?;
    let fetcher = PageFetcher::new(
        config.fetch_timeout_secs,
        &config.user_agent,
        &config.accept_language,
    )?;

    match cli.command {
        Commands::Ingest { url } => {
            let merchant = domains::detect_merchant(&url)
                .context("URL does not belong to a supported merchant (Amazon, bol.com, Zalando, Etsy)")?;
            tracing::info!(merchant = %merchant, "fetching product page");

            if merchant == gifty_core::Merchant::Amazon {
                if let Some(country) = domains::amazon_country(&url) {
                    tracing::debug!(marketplace = country, "amazon marketplace detected");
                }
            }

            let html = fetcher
                .fetch_page(&url)
                .await
                .with_context(|| format!("failed to fetch {url}"))?;
            let product = extract_product(&html, &url, merchant, &config.affiliate_tag);
            println!("{}", serde_json::to_string_pretty(&product)?);
        }
        Commands::Proxy => {
            let settings = ProxySettings::from_env();
            let provider = settings
                .select_provider()
                .map_or("direct", |provider| provider.name());

            let headers = PageHeaders {
                user_agent: None,
                accept_language: Some("en,en;q=0.8".to_string()),
            };
            let body = fetcher
                .fetch_page_with("https://httpbin.org/ip", &settings, &headers)
                .await
                .context("egress IP probe failed")?;
            let probe: serde_json::Value =
                serde_json::from_str(&body).unwrap_or(serde_json::Value::String(body));

            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "provider": provider,
                    "httpbin": probe,
                }))?
            );
        }
    }

    Ok(())
}
