pub mod scrape;
pub mod status;
