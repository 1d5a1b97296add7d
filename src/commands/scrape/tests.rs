use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::*;
use crate::source::RawVerseFields;

#[derive(Default)]
struct FixedSource {
    pages: BTreeMap<u32, Vec<RawVerseFields>>,
}

impl PageSource for FixedSource {
    fn page_fields(&mut self, page: u32) -> Result<Vec<RawVerseFields>> {
        Ok(self.pages.get(&page).cloned().unwrap_or_default())
    }
}

struct PanickingSource {
    inner: FixedSource,
    panic_on: u32,
}

impl PageSource for PanickingSource {
    fn page_fields(&mut self, page: u32) -> Result<Vec<RawVerseFields>> {
        if page == self.panic_on {
            panic!("page {page} failed to render");
        }
        self.inner.page_fields(page)
    }
}

struct StoppingSource<'a> {
    inner: FixedSource,
    stop: &'a AtomicBool,
    stop_on: u32,
}

impl PageSource for StoppingSource<'_> {
    fn page_fields(&mut self, page: u32) -> Result<Vec<RawVerseFields>> {
        if page == self.stop_on {
            self.stop.store(true, Ordering::SeqCst);
        }
        self.inner.page_fields(page)
    }
}

fn raw(page: u32, chapter: u32, verse: u32, section: u32) -> RawVerseFields {
    RawVerseFields {
        page_badge: page.to_string(),
        verse_element_id: format!("sura_{chapter}_aya_{verse}"),
        chapter_badge: chapter.to_string(),
        chapter_name: format!("Chapter {chapter}"),
        chapter_title: format!("سورة {chapter}"),
        section_title: format!("الجزء {section}"),
        explanation_name: "التفسير الميسر".to_string(),
        explanation_text: format!("{chapter}:{verse}"),
        glyphs: vec![format!("g{verse}")],
    }
}

fn source(records: &[RawVerseFields]) -> FixedSource {
    let mut source = FixedSource::default();
    for fields in records {
        let page = fields.page_badge.parse::<u32>().unwrap();
        source.pages.entry(page).or_default().push(fields.clone());
    }
    source
}

fn write_capture(path: &Path, records: &[RawVerseFields]) {
    let body = records
        .iter()
        .map(|fields| serde_json::to_string(fields).unwrap())
        .collect::<Vec<String>>()
        .join("\n");
    fs::write(path, body).unwrap();
}

fn args(dir: &Path, records: &Path, page_start: u32, page_end: u32) -> ScrapeArgs {
    ScrapeArgs {
        records: records.to_path_buf(),
        output_dir: dir.join("data"),
        file_prefix: "quran_".to_string(),
        delimiter: ":".to_string(),
        indent: 2,
        page_start,
        page_end,
        start_chapter: 1,
        start_verse: 1,
    }
}

fn read_ids(path: &Path) -> Vec<String> {
    let raw = fs::read_to_string(path).unwrap();
    let document: serde_json::Value = serde_json::from_str(&raw).unwrap();
    document
        .as_object()
        .unwrap()
        .keys()
        .cloned()
        .collect()
}

#[test]
fn scrape_pages_visits_range_in_order() {
    let mut source = source(&[
        raw(1, 1, 1, 1),
        raw(1, 1, 2, 1),
        raw(2, 2, 1, 1),
        raw(3, 2, 2, 1),
    ]);
    let engine = MergeEngine::new(":");
    let mut store = Collections::default();
    let mut cursor = Cursor::default();
    let plan = ScrapePlan {
        pages: 1..=2,
        resume_from: None,
    };
    let mut progress = ScrapeProgress::default();

    let status = scrape_pages(
        &mut source,
        &engine,
        &mut store,
        &mut cursor,
        &plan,
        &AtomicBool::new(false),
        &mut progress,
    )
    .unwrap();

    assert_eq!(status, RunStatus::Completed);
    assert_eq!(progress.pages_visited, 2);
    assert_eq!(progress.verses_merged, 3);
    assert!(!store.verses.contains_key("2:2"));
    assert_eq!(cursor.chapter, "2");
    assert!(store.chapters["2"].pages.contains("2"));
}

#[test]
fn scrape_pages_stops_when_interrupted() {
    let mut source = source(&[raw(1, 1, 1, 1)]);
    let engine = MergeEngine::new(":");
    let mut store = Collections::default();
    let mut cursor = Cursor::default();
    let plan = ScrapePlan {
        pages: 1..=604,
        resume_from: None,
    };
    let mut progress = ScrapeProgress::default();

    let status = scrape_pages(
        &mut source,
        &engine,
        &mut store,
        &mut cursor,
        &plan,
        &AtomicBool::new(true),
        &mut progress,
    )
    .unwrap();

    assert_eq!(status, RunStatus::Interrupted);
    assert_eq!(progress, ScrapeProgress::default());
    assert!(store.pages.is_empty());
}

#[test]
fn scrape_pages_skips_verses_before_start_position_on_first_page() {
    let mut source = source(&[
        raw(2, 2, 1, 1),
        raw(2, 2, 2, 1),
        raw(2, 2, 3, 1),
        raw(3, 2, 1, 1),
    ]);
    let engine = MergeEngine::new(":");
    let mut store = Collections::default();
    let mut cursor = Cursor::default();
    let plan = ScrapePlan {
        pages: 2..=2,
        resume_from: Some(StartPosition {
            chapter: 2,
            verse: 3,
        }),
    };
    let mut progress = ScrapeProgress::default();

    scrape_pages(
        &mut source,
        &engine,
        &mut store,
        &mut cursor,
        &plan,
        &AtomicBool::new(false),
        &mut progress,
    )
    .unwrap();

    assert_eq!(progress.verses_skipped, 2);
    assert_eq!(progress.verses_merged, 1);
    assert_eq!(store.verses.keys().collect::<Vec<_>>(), vec!["2:3"]);
}

#[test]
fn execute_persists_completed_run_and_resumes_next_time() {
    let dir = tempfile::tempdir().unwrap();
    let capture = dir.path().join("capture.jsonl");
    write_capture(
        &capture,
        &[
            raw(1, 1, 1, 1),
            raw(1, 1, 2, 1),
            raw(2, 2, 1, 1),
            raw(3, 2, 2, 1),
        ],
    );

    execute(&args(dir.path(), &capture, 1, 2), &AtomicBool::new(false)).unwrap();

    let data = dir.path().join("data");
    assert_eq!(
        read_ids(&data.join("quran_verses.json")),
        vec!["1:1", "1:2", "2:1"]
    );
    assert_eq!(read_ids(&data.join("quran_languages.json")), vec!["AR", "EN"]);

    execute(&args(dir.path(), &capture, 3, 3), &AtomicBool::new(false)).unwrap();

    assert_eq!(read_ids(&data.join("quran_pages.json")), vec!["1", "2", "3"]);
    let raw = fs::read_to_string(data.join("quran_chapters.json")).unwrap();
    let chapters: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(chapters["2"]["verses"], serde_json::json!(["2:1", "2:2"]));
    assert_eq!(chapters["2"]["pages"], serde_json::json!(["2", "3"]));
}

#[test]
fn execute_flushes_progress_before_returning_input_error() {
    let dir = tempfile::tempdir().unwrap();
    let capture = dir.path().join("capture.jsonl");
    let mut broken = raw(2, 2, 1, 1);
    broken.verse_element_id = "sura_2_aya_".to_string();
    write_capture(&capture, &[raw(1, 1, 1, 1), broken]);

    let err = execute(&args(dir.path(), &capture, 1, 3), &AtomicBool::new(false)).unwrap_err();
    assert!(format!("{err:#}").contains("partial progress persisted"));

    let data = dir.path().join("data");
    assert_eq!(read_ids(&data.join("quran_verses.json")), vec!["1:1"]);
    assert_eq!(read_ids(&data.join("quran_pages.json")), vec!["1", "2"]);
}

#[test]
fn execute_flushes_when_capture_file_is_missing() {
    let dir = tempfile::tempdir().unwrap();
    let capture = dir.path().join("missing.jsonl");

    assert!(execute(&args(dir.path(), &capture, 1, 1), &AtomicBool::new(false)).is_err());
    assert!(dir.path().join("data").join("quran_languages.json").exists());
}

#[test]
fn execute_interrupted_run_still_writes_all_files() {
    let dir = tempfile::tempdir().unwrap();
    let capture = dir.path().join("capture.jsonl");
    write_capture(&capture, &[raw(1, 1, 1, 1)]);

    let status = execute(&args(dir.path(), &capture, 1, 1), &AtomicBool::new(true)).unwrap();
    assert_eq!(status, RunStatus::Interrupted);

    let data = dir.path().join("data");
    for collection in crate::aggregate::COLLECTION_NAMES {
        assert!(data.join(format!("quran_{collection}.json")).exists());
    }
    assert!(read_ids(&data.join("quran_verses.json")).is_empty());
}

#[test]
fn execute_rejects_inverted_page_range() {
    let dir = tempfile::tempdir().unwrap();
    let capture = dir.path().join("capture.jsonl");

    assert!(execute(&args(dir.path(), &capture, 5, 4), &AtomicBool::new(false)).is_err());
}

#[test]
fn execute_with_flushes_then_propagates_source_panic() {
    let dir = tempfile::tempdir().unwrap();
    let records = [raw(1, 1, 1, 1), raw(1, 1, 2, 1), raw(2, 2, 1, 1)];
    let failing = PanickingSource {
        inner: source(&records),
        panic_on: 2,
    };
    let run_args = args(dir.path(), &dir.path().join("unused.jsonl"), 1, 3);
    let stop = AtomicBool::new(false);

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        execute_with(&run_args, move || Ok(failing), &stop)
    }));
    assert!(result.is_err());

    let data = dir.path().join("data");
    assert_eq!(read_ids(&data.join("quran_verses.json")), vec!["1:1", "1:2"]);
    assert_eq!(read_ids(&data.join("quran_pages.json")), vec!["1", "2"]);
    let raw = fs::read_to_string(data.join("quran_chapters.json")).unwrap();
    let chapters: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(chapters["1"]["pages"], serde_json::json!(["1"]));
}

#[test]
fn execute_with_interrupt_mid_run_keeps_earlier_pages() {
    let dir = tempfile::tempdir().unwrap();
    let records = [raw(1, 1, 1, 1), raw(1, 1, 2, 1), raw(2, 2, 1, 1), raw(3, 2, 2, 1)];
    let stop = AtomicBool::new(false);
    let stopping = StoppingSource {
        inner: source(&records),
        stop: &stop,
        stop_on: 2,
    };
    let run_args = args(dir.path(), &dir.path().join("unused.jsonl"), 1, 3);

    let status = execute_with(&run_args, move || Ok(stopping), &stop).unwrap();

    assert_eq!(status, RunStatus::Interrupted);
    let data = dir.path().join("data");
    assert_eq!(read_ids(&data.join("quran_verses.json")), vec!["1:1", "1:2"]);
    assert_eq!(read_ids(&data.join("quran_explanations.json")), vec!["1:1", "1:2"]);
    assert_eq!(read_ids(&data.join("quran_chapters.json")), vec!["1"]);
}
