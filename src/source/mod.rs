use anyhow::Result;

mod fields;
mod record_file;

pub use fields::{FieldNormalizer, RawVerseFields};
pub use record_file::RecordFileSource;

pub trait PageSource {
    fn page_fields(&mut self, page: u32) -> Result<Vec<RawVerseFields>>;
}
