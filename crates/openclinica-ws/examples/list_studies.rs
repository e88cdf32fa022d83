//! List every study and site the configured account can see.
//!
//! Needs `OCWS_URL`, `OCWS_USERNAME` and `OCWS_PASSWORD`, or an `ocws.toml`.
//!
//! ```bash
//! cargo run --example list_studies
//! ```

use openclinica_ws::{OcwsConfig, Webservices};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = OcwsConfig::discover(None)?;
    println!("Listing studies at {}...", config.base_url);

    let ws = Webservices::new(config);
    let response = ws.list_all_studies().await?;
    if !response.status.is_success() {
        eprintln!("listAll failed: {:?}", response.status.errors);
        return Ok(());
    }

    for study in &response.studies {
        println!(
            "{} ({})",
            study.identifier.as_deref().unwrap_or("?"),
            study.oid.as_deref().unwrap_or("?")
        );
        for site in &study.sites {
            println!(
                "  site {} ({})",
                site.identifier.as_deref().unwrap_or("?"),
                site.oid.as_deref().unwrap_or("?")
            );
        }
    }

    Ok(())
}
