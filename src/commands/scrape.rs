use std::ops::RangeInclusive;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result, bail};
use signal_hook::consts::{SIGINT, SIGTERM};
use tracing::{debug, error, info, warn};

use crate::aggregate::{
    Collections, Cursor, MergeEngine, OutputLayout, ResumedState, load_prior_state, persist,
};
use crate::cli::ScrapeArgs;
use crate::model::VerseRecord;
use crate::source::{FieldNormalizer, PageSource, RecordFileSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    Interrupted,
}

impl RunStatus {
    fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartPosition {
    pub chapter: u32,
    pub verse: u32,
}

#[derive(Debug, Clone)]
pub struct ScrapePlan {
    pub pages: RangeInclusive<u32>,
    pub resume_from: Option<StartPosition>,
}

impl ScrapePlan {
    fn skips(&self, page: u32, record: &VerseRecord) -> bool {
        match self.resume_from {
            Some(start) if page == *self.pages.start() => {
                (record.chapter_number, record.verse_number) < (start.chapter, start.verse)
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrapeProgress {
    pub pages_visited: usize,
    pub verses_merged: usize,
    pub verses_skipped: usize,
}

pub fn run(args: ScrapeArgs) -> Result<()> {
    let stop = Arc::new(AtomicBool::new(false));
    for signal in [SIGINT, SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(&stop))
            .with_context(|| format!("failed to register handler for signal {signal}"))?;
    }

    execute(&args, &stop).map(|_| ())
}

pub fn execute(args: &ScrapeArgs, stop: &AtomicBool) -> Result<RunStatus> {
    execute_with(args, || RecordFileSource::open(&args.records), stop)
}

pub fn execute_with<S, F>(args: &ScrapeArgs, open_source: F, stop: &AtomicBool) -> Result<RunStatus>
where
    S: PageSource,
    F: FnOnce() -> Result<S>,
{
    if args.page_start > args.page_end {
        bail!(
            "page range is empty: start {} is after end {}",
            args.page_start,
            args.page_end
        );
    }

    let layout = OutputLayout::new(&args.output_dir, &args.file_prefix);
    let prior = load_prior_state(&layout, args.page_start, &args.delimiter);
    let resume_from = (!prior.is_loaded()).then_some(StartPosition {
        chapter: args.start_chapter,
        verse: args.start_verse,
    });
    let ResumedState {
        mut store,
        mut cursor,
    } = prior.into_state();

    let engine = MergeEngine::new(&args.delimiter);
    let plan = ScrapePlan {
        pages: args.page_start..=args.page_end,
        resume_from,
    };
    let mut progress = ScrapeProgress::default();

    info!(
        records = %args.records.display(),
        page_start = args.page_start,
        page_end = args.page_end,
        chapter = %cursor.chapter,
        section = %cursor.section,
        "starting scrape"
    );

    let scraped = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut source = open_source()?;
        scrape_pages(
            &mut source,
            &engine,
            &mut store,
            &mut cursor,
            &plan,
            stop,
            &mut progress,
        )
    }));

    let persisted = persist(&layout, &store, &args.delimiter, args.indent);

    let scraped = match scraped {
        Ok(scraped) => scraped,
        Err(payload) => {
            if let Err(err) = &persisted {
                error!(error = %format!("{err:#}"), "failed to persist after panic");
            }
            panic::resume_unwind(payload);
        }
    };

    let status = match (scraped, persisted) {
        (Ok(status), Ok(_)) => status,
        (Err(err), Ok(_)) => {
            return Err(err.context(format!(
                "scrape aborted after {} pages; partial progress persisted",
                progress.pages_visited
            )));
        }
        (Ok(_), Err(err)) => return Err(err),
        (Err(scrape_err), Err(persist_err)) => {
            error!(error = %format!("{scrape_err:#}"), "scrape failed before persisting");
            return Err(persist_err);
        }
    };

    let counts = store.counts();
    match status {
        RunStatus::Completed => info!(
            status = status.as_str(),
            pages_visited = progress.pages_visited,
            verses_merged = progress.verses_merged,
            verses_skipped = progress.verses_skipped,
            pages = counts.pages,
            verses = counts.verses,
            chapters = counts.chapters,
            sections = counts.sections,
            "scrape finished"
        ),
        RunStatus::Interrupted => warn!(
            status = status.as_str(),
            pages_visited = progress.pages_visited,
            verses_merged = progress.verses_merged,
            chapter = %cursor.chapter,
            section = %cursor.section,
            "scrape interrupted; partial progress persisted"
        ),
    }

    Ok(status)
}

pub fn scrape_pages<S: PageSource>(
    source: &mut S,
    engine: &MergeEngine,
    store: &mut Collections,
    cursor: &mut Cursor,
    plan: &ScrapePlan,
    stop: &AtomicBool,
    progress: &mut ScrapeProgress,
) -> Result<RunStatus> {
    let normalizer = FieldNormalizer::new()?;

    for page in plan.pages.clone() {
        if stop.load(Ordering::SeqCst) {
            return Ok(RunStatus::Interrupted);
        }

        engine.begin_page(store, page);
        info!(page, "page");

        let fields = source.page_fields(page)?;
        for (index, raw) in fields.iter().enumerate() {
            if stop.load(Ordering::SeqCst) {
                return Ok(RunStatus::Interrupted);
            }

            let record = normalizer
                .normalize(raw)
                .with_context(|| format!("invalid verse {} on page {page}", index + 1))?;
            if plan.skips(page, &record) {
                progress.verses_skipped += 1;
                continue;
            }

            let outcome = engine.merge_verse_record(store, cursor, &record);
            if outcome.chapter_changed {
                info!(chapter = %cursor.chapter, name = %record.chapter_name, "chapter");
            }
            if outcome.section_changed {
                info!(section = %cursor.section, "section");
            }
            debug!(verse = %outcome.verse_id, "verse");
            progress.verses_merged += 1;
        }

        engine.finish_page(store, cursor, page);
        progress.pages_visited += 1;
    }

    Ok(RunStatus::Completed)
}

#[cfg(test)]
mod tests;
