//! Look up a document and a brief search against a Primo installation.
//!
//! ```sh
//! PRIMO_BASE_URL=http://bobcat.library.nyu.edu PRIMO_INSTITUTION=NYU \
//!     cargo run --example basic_usage
//! ```

use primo::models::SearchCriteria;
use primo::{setup_from_env, Searcher};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let searcher = Searcher::new(setup_from_env()?)?;

    let record = searcher
        .search(&SearchCriteria::new().doc_id("nyu_aleph000062856"))
        .await?;
    println!("Titles: {:?}", record.titles);
    println!("ISBN: {:?}", record.field("isbn"));
    for holding in &record.holdings {
        println!(
            "  {} / {} / {}",
            holding.library.as_deref().unwrap_or("-"),
            holding.collection().unwrap_or("-"),
            holding.call_number().unwrap_or("-"),
        );
    }

    let criteria = SearchCriteria::new()
        .title("Travels with my aunt")
        .author("Graham Greene")
        .genre("book");
    let brief = searcher.search(&criteria).await?;
    println!("Brief search: {:?} hits", brief.count);
    for resource in &brief.resources {
        println!("  {} {}", resource.display.as_deref().unwrap_or("Online"), resource.url);
    }

    Ok(())
}
