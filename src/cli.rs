use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "quran-scrape",
    version,
    about = "Mushaf verse, chapter, page and section extraction into cross-referenced JSON"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Scrape(ScrapeArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ScrapeArgs {
    #[arg(long)]
    pub records: PathBuf,

    #[arg(long, default_value = "data")]
    pub output_dir: PathBuf,

    #[arg(long, default_value = "quran_")]
    pub file_prefix: String,

    #[arg(long, default_value = ":", value_parser = parse_delimiter)]
    pub delimiter: String,

    #[arg(long, default_value_t = 2)]
    pub indent: usize,

    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub page_start: u32,

    #[arg(long, default_value_t = 604, value_parser = clap::value_parser!(u32).range(1..))]
    pub page_end: u32,

    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub start_chapter: u32,

    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub start_verse: u32,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = "data")]
    pub output_dir: PathBuf,

    #[arg(long, default_value = "quran_")]
    pub file_prefix: String,

    #[arg(long, default_value = ":", value_parser = parse_delimiter)]
    pub delimiter: String,

    #[arg(long, default_value_t = 1)]
    pub page_start: u32,
}

fn parse_delimiter(value: &str) -> Result<String, String> {
    if value.is_empty() {
        return Err("delimiter must not be empty".to_string());
    }
    if value.chars().any(|ch| ch.is_ascii_digit()) {
        return Err(format!("delimiter must not contain digits: {value:?}"));
    }
    Ok(value.to_string())
}
