//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `site_report` library that handles:
//! - Command-line argument parsing
//! - Logger and crypto provider initialization
//! - User-facing output formatting (three-section text report or JSON)
//!
//! All analysis functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use site_report::initialization::{init_crypto_provider, init_logger_with};
use site_report::{AnalysisReport, Analyzer, Opt, OutputFormat, ProbeOutcome};

/// How many links each list shows before the remainder is summarized.
const LINKS_SHOWN: usize = 10;

#[tokio::main]
async fn main() -> Result<()> {
    let opt = Opt::parse();

    let log_level = opt.log_level.clone();
    let log_format = opt.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    // Initialize crypto provider for TLS operations
    init_crypto_provider();

    let analyzer =
        Analyzer::new(opt.analyzer_config()).context("Failed to initialize analyzer")?;

    match analyzer.run(&opt.url).await {
        Ok(report) => {
            match opt.output {
                OutputFormat::Text => print_report(&report),
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&report)
                        .context("Failed to serialize report")?
                ),
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("site_report error: {e}");
            process::exit(1);
        }
    }
}

/// Prints the three report sections: Overview, Links, WHOIS & TLS.
fn print_report(report: &AnalysisReport) {
    print_overview(report);
    print_links(report);
    print_whois_tls(report);
}

fn print_overview(report: &AnalysisReport) {
    println!("=== Overview ===");
    println!("Website: {}", report.target.as_str());
    println!("Analyzed on: {}", report.timestamp.to_rfc3339());
    println!();
    println!("Title: {}", report.page.title);
    println!("Description: {}", report.page.description);
    println!("Creator/Organization: {}", report.page.creator);
    match &report.geo {
        ProbeOutcome::Success(geo) => println!(
            "Server Location: {}, {} (ISP: {})",
            geo.city, geo.country, geo.isp
        ),
        ProbeOutcome::Failed(reason) => {
            println!("Server Location: Unable to determine location: {reason}")
        }
    }
    println!("Status Code: {} (OK if 200)", report.status);
    println!("Response Time: {:.3} seconds", report.elapsed_seconds);
    println!("Word Count: {} words", report.page.word_count);
    println!("Images: {} images", report.page.image_count);
    println!("Favicon: {}", report.page.favicon);
    println!("Robots.txt: {}", report.page.robots);
    println!("Sitemap: {}", report.page.sitemap);
}

fn print_links(report: &AnalysisReport) {
    println!();
    println!("=== Links ===");
    print_link_list("Internal", &report.page.links.internal);
    println!();
    print_link_list("External", &report.page.links.external);
}

/// Prints one link list, truncated for display. The underlying report
/// keeps the full list regardless of what is shown here.
fn print_link_list(label: &str, links: &[String]) {
    println!("{} Links ({}):", label, links.len());
    for link in links.iter().take(LINKS_SHOWN) {
        println!(" - {link}");
    }
    if links.len() > LINKS_SHOWN {
        println!("... and {} more", links.len() - LINKS_SHOWN);
    }
}

fn print_whois_tls(report: &AnalysisReport) {
    println!();
    println!("=== WHOIS & TLS ===");
    match &report.whois {
        ProbeOutcome::Success(whois) => {
            println!("Domain Information:");
            println!("Domain Name: {}", whois.domain_name);
            println!("Registrar: {}", whois.registrar);
            println!("Organization: {}", whois.organization);
            println!("Created On: {}", whois.created);
            println!("Expires On: {}", whois.expires);
        }
        ProbeOutcome::Failed(reason) => {
            println!("Domain Information: Unable to get domain info: {reason}")
        }
    }
    println!();
    println!("Security Certificate (TLS):");
    match &report.tls {
        ProbeOutcome::Success(tls) => {
            println!("Issuer: {}", tls.issuer);
            println!("Valid Until: {}", tls.valid_until);
        }
        ProbeOutcome::Failed(reason) => {
            println!("Unable to check security certificate: {reason}")
        }
    }
}
