// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands:
// - crawl: run a crawl and print the vacancies found
// - codes: print the county, district and vacancy type codes that the
//          crawl filters accept
//
// Credentials are not flags (they would end up in shell history). They
// come from EDUCATIONPOSTS_USERNAME / EDUCATIONPOSTS_PASSWORD or a .env file.
//
// Rust concepts:
// - Derive macros: clap generates the parser from these types
// - Option<T> fields: flags that may be left out entirely
// =============================================================================

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "edupost-crawler",
    version,
    about = "Collects teaching vacancies and contact emails from educationposts.ie",
    long_about = "edupost-crawler reads the educationposts.ie listings for a level and region, \
                  follows every vacancy to its detail page and prints the school, post, \
                  contact email and roll number it finds. Login credentials are read from \
                  EDUCATIONPOSTS_USERNAME and EDUCATIONPOSTS_PASSWORD (or a .env file)."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl the listings and print the vacancies found
    ///
    /// Example: edupost-crawler crawl --county 27 --district 7 --max-pages 2
    Crawl(CrawlArgs),

    /// List the county, district and vacancy type codes
    Codes,
}

#[derive(Args, Debug, Clone)]
pub struct CrawlArgs {
    /// Education level (primary, second_level, pre_school)
    #[arg(long, default_value = "primary")]
    pub level: String,

    /// County id (see `codes`); all counties when left out
    #[arg(long, default_value = "")]
    pub county: String,

    /// Dublin district id (see `codes`); only used with --county 27
    #[arg(long, default_value = "")]
    pub district: String,

    /// Vacancy type code (see `codes`)
    #[arg(long, default_value = "")]
    pub vacancy_type: String,

    /// How many requests may be in flight at once
    #[arg(long, default_value_t = 3)]
    pub workers: usize,

    /// Read at most this many listing pages (0 reads nothing)
    #[arg(long, allow_negative_numbers = true)]
    pub max_pages: Option<i32>,

    /// Stop after this many offers
    #[arg(long)]
    pub limit: Option<usize>,

    /// Slower, less regular requests, one at a time
    #[arg(long)]
    pub safe_mode: bool,

    /// Don't log in even if credentials are configured
    #[arg(long)]
    pub no_login: bool,

    /// Keep crawling anonymously if login fails
    #[arg(long)]
    pub continue_unauthenticated: bool,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Output results in JSON format instead of a table
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crawl_defaults() {
        let cli = Cli::try_parse_from(["edupost-crawler", "crawl"]).unwrap();
        let Commands::Crawl(args) = cli.command else {
            panic!("expected crawl");
        };
        assert_eq!(args.level, "primary");
        assert_eq!(args.workers, 3);
        assert_eq!(args.timeout_secs, 30);
        assert_eq!(args.max_pages, None);
        assert!(!args.json);
    }

    #[test]
    fn test_crawl_flags() {
        let cli = Cli::try_parse_from([
            "edupost-crawler",
            "crawl",
            "--county",
            "27",
            "--district",
            "7",
            "--max-pages",
            "2",
            "--limit",
            "10",
            "--safe-mode",
            "--continue-unauthenticated",
            "--json",
        ])
        .unwrap();
        let Commands::Crawl(args) = cli.command else {
            panic!("expected crawl");
        };
        assert_eq!(args.county, "27");
        assert_eq!(args.district, "7");
        assert_eq!(args.max_pages, Some(2));
        assert_eq!(args.limit, Some(10));
        assert!(args.safe_mode && args.continue_unauthenticated && args.json);
    }

    #[test]
    fn test_negative_pages_accepted() {
        let cli = Cli::try_parse_from(["edupost-crawler", "crawl", "--max-pages", "-1"]).unwrap();
        let Commands::Crawl(args) = cli.command else {
            panic!("expected crawl");
        };
        assert_eq!(args.max_pages, Some(-1));
    }

    #[test]
    fn test_codes() {
        let cli = Cli::try_parse_from(["edupost-crawler", "codes"]).unwrap();
        assert!(matches!(cli.command, Commands::Codes));
    }
}
