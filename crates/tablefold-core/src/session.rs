//! Conversion session: converts and restores the tables of one page.
//!
//! A session owns every piece of state that lives across view-mode
//! transitions: the cache of original table markup, the sequence counter used
//! for DOM ids and the registered converters. One session serves one page and
//! is reset between navigations.
//!
//! A narrow pass runs in two phases:
//!   Phase 1: locate tables and convert each one (in parallel, pure per table)
//!   Phase 2: splice the results back into the document in order
//!
//! A wide pass swaps every converted block for its cached original.

use std::collections::BTreeMap;
use std::ops::Range;

use log::{debug, info, warn};
use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;

use crate::error::{Result, TableError};
use crate::marker::MarkerKind;
use crate::options::{ConversionOptions, IdStrategy, ViewMode};
use crate::plugin::{ConversionContext, LocatedTable, ProgressReporter, TableConverter, TableSource};

static BLOCK_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<!--tablefold:start:(\d+)-->").unwrap());

/// Attribute stamped on the wrapper of every converted table.
pub const CONVERTED_ATTRIBUTE: &str = "data-tablefold-converted";

fn block_start(id: usize) -> String {
    format!("<!--tablefold:start:{}-->", id)
}

fn block_end(id: usize) -> String {
    format!("<!--tablefold:end:{}-->", id)
}

/// Converts and restores the tables of one page.
pub struct ConversionSession {
    source: Box<dyn TableSource>,
    converters: Vec<Box<dyn TableConverter>>,
    options: ConversionOptions,
    originals: BTreeMap<usize, String>,
    next_sequence: usize,
    mode: ViewMode,
    progress_reporter: Option<ProgressReporter>,
}

struct Job<'a> {
    sequence: usize,
    located: &'a LocatedTable,
    converter: &'a dyn TableConverter,
    kind: MarkerKind,
}

impl ConversionSession {
    pub fn new(source: Box<dyn TableSource>, options: ConversionOptions) -> Self {
        Self {
            source,
            converters: Vec::new(),
            options,
            originals: BTreeMap::new(),
            next_sequence: 0,
            mode: ViewMode::Wide,
            progress_reporter: None,
        }
    }

    /// Register a converter. Earlier converters win when several handle a kind.
    pub fn add_converter(&mut self, converter: Box<dyn TableConverter>) {
        self.converters.push(converter);
    }

    pub fn set_progress_reporter(&mut self, reporter: ProgressReporter) {
        self.progress_reporter = Some(reporter);
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Number of tables currently converted (and restorable).
    pub fn converted_count(&self) -> usize {
        self.originals.len()
    }

    /// Cached original markup of a converted table.
    pub fn original(&self, sequence: usize) -> Option<&str> {
        self.originals.get(&sequence).map(|s| s.as_str())
    }

    /// Forget every cached table. Call between page navigations.
    pub fn reset(&mut self) {
        self.originals.clear();
        self.next_sequence = 0;
        self.mode = ViewMode::Wide;
    }

    /// Bring `document` into the given view mode.
    pub fn apply(&mut self, document: &str, mode: ViewMode) -> Result<String> {
        match mode {
            ViewMode::Narrow => self.convert_document(document),
            ViewMode::Wide => self.restore_document(document),
        }
    }

    /// Convert every table of `document` that is not converted yet.
    pub fn convert_document(&mut self, document: &str) -> Result<String> {
        self.report_progress(0.0, "Locating tables...");
        let protected = converted_regions(document);
        let located: Vec<LocatedTable> = self
            .source
            .locate(document, &self.options)?
            .into_iter()
            .filter(|t| !protected.iter().any(|r| overlaps(r, &t.span)))
            .collect();
        info!(
            "{} located {} unconverted table(s)",
            self.source.name(),
            located.len()
        );

        // Phase 1: pick a converter per table and convert
        let mut jobs = Vec::new();
        let mut sequence = self.next_sequence;
        for table in &located {
            let kind = table.marker.kind(self.options.default_marker);
            if kind == MarkerKind::NoConversion {
                debug!("Table {} marked {}, leaving as is", table.index, kind);
                continue;
            }
            match self.converters.iter().find(|c| c.handles(kind)) {
                Some(converter) => {
                    jobs.push(Job {
                        sequence,
                        located: table,
                        converter: converter.as_ref(),
                        kind,
                    });
                    sequence += 1;
                }
                None => warn!("No converter registered for {}", kind),
            }
        }
        self.next_sequence = sequence;

        let options = &self.options;
        let run = |job: &Job<'_>| {
            let context = self.context_for(job.sequence, job.kind);
            job.converter.convert(&job.located.table, &context, options)
        };
        let results: Vec<Result<Option<String>>> = if options.parallel {
            jobs.par_iter().map(run).collect()
        } else {
            jobs.iter().map(run).collect()
        };

        // Phase 2: splice back in document order
        let total = jobs.len().max(1);
        let mut out = String::with_capacity(document.len());
        let mut cursor = 0;
        let mut converted = 0;
        for (i, (job, result)) in jobs.iter().zip(results).enumerate() {
            let span = &job.located.span;
            let markup = match result {
                Ok(Some(markup)) => markup,
                Ok(None) => {
                    debug!("{} left table {} unchanged", job.converter.name(), job.located.index);
                    continue;
                }
                Err(e) => {
                    warn!(
                        "{} failed on table {}: {}",
                        job.converter.name(),
                        job.located.index,
                        e
                    );
                    continue;
                }
            };

            out.push_str(&document[cursor..span.start]);
            out.push_str(&block_start(job.sequence));
            out.push_str(&format!(
                "<div class=\"tablefold tablefold--{}\" {}=\"{}\">",
                job.kind, CONVERTED_ATTRIBUTE, job.sequence
            ));
            out.push_str(&markup);
            out.push_str("</div>");
            out.push_str(&block_end(job.sequence));
            cursor = span.end;

            self.originals
                .insert(job.sequence, document[span.clone()].to_string());
            converted += 1;
            self.report_progress(
                (i + 1) as f64 / total as f64,
                &format!("Converted table {} ({})", job.located.index, job.kind),
            );
        }
        out.push_str(&document[cursor..]);

        self.mode = ViewMode::Narrow;
        self.report_progress(1.0, "Conversion complete");
        info!("Converted {} table(s)", converted);
        Ok(out)
    }

    /// Replace every converted block in `document` with its cached original.
    pub fn restore_document(&mut self, document: &str) -> Result<String> {
        let mut out = String::with_capacity(document.len());
        let mut cursor = 0;
        let mut restored = 0;

        while let Some(caps) = BLOCK_START.captures(&document[cursor..]) {
            let Some(whole) = caps.get(0) else {
                break;
            };
            let start = cursor + whole.start();
            let after_start = cursor + whole.end();
            let sequence: usize = caps[1]
                .parse()
                .map_err(|e| TableError::Session(format!("bad block id: {}", e)))?;

            let end_marker = block_end(sequence);
            let Some(end_rel) = document[after_start..].find(&end_marker) else {
                warn!("Converted block {} has no end marker", sequence);
                out.push_str(&document[cursor..after_start]);
                cursor = after_start;
                continue;
            };
            let end = after_start + end_rel + end_marker.len();

            out.push_str(&document[cursor..start]);
            match self.originals.remove(&sequence) {
                Some(original) => {
                    out.push_str(&original);
                    restored += 1;
                }
                None => {
                    warn!("No cached original for converted block {}", sequence);
                    out.push_str(&document[start..end]);
                }
            }
            cursor = end;
        }
        out.push_str(&document[cursor..]);

        self.mode = ViewMode::Wide;
        info!("Restored {} table(s)", restored);
        Ok(out)
    }

    fn context_for(&self, sequence: usize, kind: MarkerKind) -> ConversionContext {
        let id_prefix = match self.options.id_strategy {
            IdStrategy::Sequential => format!("{}-{}", self.options.id_prefix, sequence),
            IdStrategy::Uuid => format!(
                "{}-{}",
                self.options.id_prefix,
                uuid::Uuid::new_v4().simple()
            ),
        };
        ConversionContext {
            sequence,
            kind,
            id_prefix,
        }
    }

    fn report_progress(&self, fraction: f64, message: &str) {
        if let Some(ref reporter) = self.progress_reporter {
            reporter(fraction, message);
        }
    }
}

/// Byte ranges of the converted blocks already present in a document.
fn converted_regions(document: &str) -> Vec<Range<usize>> {
    let mut regions = Vec::new();
    for caps in BLOCK_START.captures_iter(document) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let Ok(sequence) = caps[1].parse::<usize>() else {
            continue;
        };
        let end_marker = block_end(sequence);
        if let Some(rel) = document[whole.end()..].find(&end_marker) {
            regions.push(whole.start()..whole.end() + rel + end_marker.len());
        }
    }
    regions
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

/// Builder for a session with its converters.
pub struct SessionBuilder {
    source: Option<Box<dyn TableSource>>,
    converters: Vec<Box<dyn TableConverter>>,
    options: ConversionOptions,
    progress_reporter: Option<ProgressReporter>,
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self {
            source: None,
            converters: Vec::new(),
            options: ConversionOptions::default(),
            progress_reporter: None,
        }
    }

    pub fn source(mut self, source: Box<dyn TableSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn converter(mut self, converter: Box<dyn TableConverter>) -> Self {
        self.converters.push(converter);
        self
    }

    pub fn options(mut self, options: ConversionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn progress_reporter(mut self, reporter: ProgressReporter) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    pub fn build(self) -> Result<ConversionSession> {
        let source = self
            .source
            .ok_or_else(|| TableError::Session("No table source specified".to_string()))?;
        if self.converters.is_empty() {
            return Err(TableError::Session("No converters registered".to_string()));
        }

        let mut session = ConversionSession::new(source, self.options);
        for c in self.converters {
            session.add_converter(c);
        }
        if let Some(reporter) = self.progress_reporter {
            session.set_progress_reporter(reporter);
        }
        Ok(session)
    }
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
