// src/main.rs
// =============================================================================
// This is the entry point of the CLI.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Dispatch to the subcommand handler
// 3. Print the records (table or JSON) and a summary of the run
// 4. Exit with proper code (0 = success, even with no offers; 2 = error)
//
// The crawler itself lives in the library (src/lib.rs); this file only
// turns flags into a CrawlerConfig and prints what comes back.
// =============================================================================

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, CrawlArgs, Commands};
use edupost_crawler::{
    catalog, telemetry, CrawlReport, CrawlSummary, Crawler, CrawlerConfig, DetailedRecord,
    LoginFailurePolicy, TelemetryConfig,
};
use std::time::Duration;
use tracing::{error, warn};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Crawl(args) => handle_crawl(args).await,
        Commands::Codes => {
            print_codes();
            Ok(0)
        }
    }
}

// Handles the 'crawl' subcommand
async fn handle_crawl(args: CrawlArgs) -> Result<i32> {
    telemetry::init(&TelemetryConfig::load()).context("setting up logging")?;

    let login_failure = if args.continue_unauthenticated {
        LoginFailurePolicy::ContinueUnauthenticated
    } else {
        LoginFailurePolicy::Abort
    };

    let config = CrawlerConfig::load()
        .context("reading configuration")?
        .with_level(args.level)
        .with_county(args.county)
        .with_district(args.district)
        .with_vacancy_type(args.vacancy_type)
        .with_workers(args.workers)
        .with_max_pages(args.max_pages)
        .with_safe_mode(args.safe_mode)
        .with_timeout(Duration::from_secs(args.timeout_secs))
        .with_login_failure(login_failure)
        .with_max_offers(args.limit);

    println!(
        "🔍 Crawling {} vacancies in {} ({})",
        config.level,
        catalog::county_name(&config.county_id),
        catalog::vacancy_type_name(&config.vacancy_type)
    );

    let mut crawler = Crawler::new(config)?;

    // Ctrl-C drops the requests in flight and prints what we have
    let cancel = crawler.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Ctrl-C received, stopping the crawl");
            cancel.cancel();
        }
    });

    let report = match crawler.fetch_all_with_summary(args.max_pages, !args.no_login).await {
        Ok(report) => report,
        Err(e) => {
            error!("Crawl failed: {}", e);
            eprintln!("❌ {}", e);
            return Ok(2);
        }
    };

    print_results(&report, args.json)?;
    Ok(0)
}

// Prints the records either as a table or JSON
fn print_results(report: &CrawlReport, json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(&report.records)?;
        println!("{}", json_output);
        return Ok(());
    }

    if report.records.is_empty() {
        println!("No offers found");
    } else {
        print_table(&report.records);
    }
    print_summary(&report.summary);
    Ok(())
}

fn print_table(records: &[DetailedRecord]) {
    println!(
        "{:<36} {:<30} {:<32} {:<9} {:<12}",
        "SCHOOL", "VACANCY", "EMAIL", "ROLL", "DEADLINE"
    );
    println!("{}", "=".repeat(123));

    for record in records {
        println!(
            "{:<36} {:<30} {:<32} {:<9} {:<12}",
            clip(record.basic.school.as_deref().unwrap_or("-"), 35),
            clip(record.basic.vacancy.as_deref().unwrap_or("-"), 29),
            clip(record.contact_email.as_deref().unwrap_or("-"), 31),
            record.roll_number.as_deref().unwrap_or("-"),
            record.basic.deadline.as_deref().unwrap_or("-"),
        );
    }

    println!();
}

fn print_summary(summary: &CrawlSummary) {
    println!("📊 Summary:");
    println!("   📋 Offers: {}", summary.records);
    println!("   ✉️  With email: {}", summary.records_with_email);
    println!("   📄 Listing pages: {} ({} empty)", summary.pages_planned, summary.pages_empty);
    println!("   ⛔ Filtered out: {}", summary.rows_excluded + summary.details_rejected);
    if summary.rows_malformed > 0 || summary.details_failed > 0 {
        println!(
            "   ⚠️  Unreadable: {} row(s), {} detail page(s)",
            summary.rows_malformed, summary.details_failed
        );
    }
    if summary.stopped_early {
        println!("   ⏹️  Stopped early");
    }
}

// Shortens text for a table column, counting characters not bytes
fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}

// Handles the 'codes' subcommand
fn print_codes() {
    println!("Levels:");
    for level in catalog::LEVELS {
        println!("   {}", level);
    }

    println!("\nCounties (--county):");
    for (id, name) in catalog::COUNTIES.iter() {
        println!("   {:<4} {}", id, name);
    }

    println!("\nDublin districts (--district, with --county 27):");
    for (id, name) in catalog::DUBLIN_DISTRICTS.iter() {
        println!("   {:<4} {}", id, name);
    }

    println!("\nVacancy types (--vacancy-type):");
    for (code, name) in catalog::VACANCY_TYPES.iter() {
        println!("   {:<4} {}", code, name);
    }
}
