//! # Chunked, resumable parse runs
//!
//! A [`ParseRun`] drives the grammar over the whole input in passes of at most
//! [`ParserConfig::max_matches_per_pass`] entries. After every pass which stops early, the run
//! returns control to its caller with [`Step::Yielded`], so that a host with a single-threaded
//! event loop can interleave other work between passes. [`ChunkScheduler`] runs a parse to
//! completion, calling a [`YieldPoint`] between passes.
//!
//! A run is all-or-nothing: a syntax error anywhere in the input discards every entry parsed so
//! far.
use std::fs;
use std::path::Path;
use std::time::Instant;

use tracing::{debug, error, info, trace};

use crate::config::ParserConfig;
use crate::entry::EntryDict;
use crate::error::{Error, Result, SyntaxFailure};
use crate::normalize::normalize;
use crate::parse::{ParseState, PassOutcome, parse_pass};
use crate::report::Diagnostic;

/// How far a run has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Absolute byte offset at which the next pass starts.
    pub offset: usize,
    /// Length of the whole input in bytes.
    pub total: usize,
    /// Number of entries parsed so far.
    pub entries: usize,
    /// Number of passes performed so far.
    pub passes: usize,
}

/// The point at which a run hands control back to its host between two passes.
pub trait YieldPoint {
    fn yield_now(&mut self, progress: &Progress);
}

/// Never yield. Use this when the run has a thread to itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoYield;

impl YieldPoint for NoYield {
    #[inline]
    fn yield_now(&mut self, _progress: &Progress) {}
}

/// Yield the current OS thread to the scheduler between passes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadYield;

impl YieldPoint for ThreadYield {
    fn yield_now(&mut self, _progress: &Progress) {
        std::thread::yield_now();
    }
}

impl<F> YieldPoint for F
where
    F: FnMut(&Progress),
{
    fn yield_now(&mut self, progress: &Progress) {
        self(progress)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Idle,
    Running,
    Completed,
    Failed,
}

/// The result of a single [`ParseRun::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The pass hit the match cap; call `step` again to continue.
    Yielded(Progress),
    /// The input was fully parsed.
    Completed,
    /// The input has a syntax error.
    Failed,
}

/// A single parse run over one input, with a private accumulator.
#[derive(Debug)]
pub struct ParseRun<'t> {
    text: &'t str,
    config: ParserConfig,
    status: RunStatus,
    offset: usize,
    passes: usize,
    state: ParseState,
    failure: Option<(SyntaxFailure, Diagnostic)>,
    started: Option<Instant>,
}

impl<'t> ParseRun<'t> {
    pub fn new(text: &'t str, config: ParserConfig) -> Self {
        Self {
            text,
            config,
            status: RunStatus::Idle,
            offset: 0,
            passes: 0,
            state: ParseState::new(),
            failure: None,
            started: None,
        }
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn progress(&self) -> Progress {
        Progress {
            offset: self.offset,
            total: self.text.len(),
            entries: self.state.entries().len(),
            passes: self.passes,
        }
    }

    /// The syntax failure which ended the run, if any.
    pub fn failure(&self) -> Option<&SyntaxFailure> {
        self.failure.as_ref().map(|(failure, _)| failure)
    }

    /// Perform one pass over the unparsed remainder of the input.
    ///
    /// Once the run has completed or failed, this does nothing and returns the final step again.
    pub fn step(&mut self) -> Step {
        match self.status {
            RunStatus::Completed => return Step::Completed,
            RunStatus::Failed => return Step::Failed,
            RunStatus::Idle => {
                self.status = RunStatus::Running;
                self.started = Some(Instant::now());
            }
            RunStatus::Running => {}
        }

        let base = self.offset;
        self.passes += 1;

        match parse_pass(
            &self.text[base..],
            &mut self.state,
            self.config.max_matches_per_pass,
        ) {
            PassOutcome::Done => {
                self.offset = self.text.len();
                self.status = RunStatus::Completed;
                if self.config.debug_timing {
                    let elapsed = self.started.map(|t| t.elapsed()).unwrap_or_default();
                    info!(
                        entries = self.state.entries().len(),
                        passes = self.passes,
                        "BibTeX file parsed in {elapsed:?}"
                    );
                }
                Step::Completed
            }
            PassOutcome::Overrun { at } => {
                self.offset = base + at.end.offset;
                trace!(
                    offset = self.offset,
                    entries = self.state.entries().len(),
                    "pass {} reached its match cap",
                    self.passes
                );
                Step::Yielded(self.progress())
            }
            PassOutcome::Syntax(failure) => {
                let failure = SyntaxFailure {
                    at: failure.at.rebase(self.text, base),
                    ..failure
                };
                let diagnostic = Diagnostic::new(self.text, &failure);
                error!("{}", diagnostic.headline);
                error!("{}", diagnostic.window);

                self.status = RunStatus::Failed;
                self.failure = Some((failure, diagnostic));
                Step::Failed
            }
        }
    }

    /// Drive the run to the end without yielding, normalize the entries, and hand them over.
    ///
    /// On a syntax error, the entries parsed so far are discarded.
    pub fn finish(mut self) -> Result<EntryDict> {
        while let Step::Yielded(_) = self.step() {}

        if let Some((failure, diagnostic)) = self.failure.take() {
            return Err(Error::Syntax {
                failure,
                diagnostic,
            });
        }

        let mut entries = self.state.into_entries();
        let started = Instant::now();
        normalize(&mut entries);
        if self.config.debug_timing {
            debug!("BibTeX titles processed in {:?}", started.elapsed());
            info!("Imported {} entries", entries.len());
        }
        Ok(entries)
    }
}

/// Runs parses to completion, yielding between passes.
#[derive(Debug, Default, Clone)]
pub struct ChunkScheduler {
    config: ParserConfig,
}

impl ChunkScheduler {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse `text`, calling `yield_point` between passes.
    #[tracing::instrument(skip_all, fields(len = text.len()))]
    pub fn run<Y: YieldPoint>(&self, text: &str, mut yield_point: Y) -> Result<EntryDict> {
        let mut run = ParseRun::new(text, self.config.clone());
        while let Step::Yielded(progress) = run.step() {
            yield_point.yield_now(&progress);
        }
        run.finish()
    }

    /// Read the bibliography at `path` and parse it, calling `yield_point` between passes.
    pub fn run_file<Y: YieldPoint>(
        &self,
        path: impl AsRef<Path>,
        yield_point: Y,
    ) -> Result<EntryDict> {
        let text = fs::read_to_string(path)?;
        self.run(&text, yield_point)
    }
}

/// Import a bibliography.
///
/// Returns `None` if there is no input, or if the input cannot be parsed; in the latter case the
/// diagnostic is logged. There is no partial result.
///
/// ```
/// use bibtex_import::{import, ParserConfig};
///
/// let entries = import(Some("@article{k1, title={T}, year=1999}"), &ParserConfig::default()).unwrap();
/// assert_eq!(entries["k1"].field("year"), Some("1999"));
///
/// assert!(import(Some("@article{k1, title={T}"), &ParserConfig::default()).is_none());
/// assert!(import(None, &ParserConfig::default()).is_none());
/// ```
pub fn import(text: Option<&str>, config: &ParserConfig) -> Option<EntryDict> {
    let Some(text) = text else {
        debug!("no bibliography input available");
        return None;
    };

    ChunkScheduler::new(config.clone()).run(text, NoYield).ok()
}
