//! Batch conversion of files and directory trees.
//!
//! Conversion runs in two steps: [`plan`] turns an input and output path
//! into a flat list of [`Job`]s, and a [`Converter`] runs each job. Jobs are
//! independent, so callers may run them in any order or in parallel.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use ibx_format::{BuildOptions, Decoded, Document, Element, RenderOptions};
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::{Error, Result};

/// Which way a conversion goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// IBX1 to XML.
    Decode,
    /// XML to IBX1.
    Encode,
}

impl Direction {
    /// Extension given to output files.
    pub const fn extension(&self) -> &'static str {
        match self {
            Direction::Decode => "xml",
            Direction::Encode => "dat",
        }
    }
}

/// A single file conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub input: PathBuf,
    pub output: PathBuf,
}

/// What happened to a converted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The input was converted.
    Converted,
    /// The input is not in the source format and was copied unchanged.
    Unchanged,
}

/// Plan the jobs for converting `input` into `output`.
///
/// A file input gives one job. If `output` is an existing directory the
/// file is written inside it, named after the input with the target
/// extension in place of its last one. A directory input is walked
/// recursively; its layout is mirrored under `output` and every file gets
/// the target extension.
pub fn plan(input: &Path, output: &Path, direction: Direction) -> Result<Vec<Job>> {
    let extension = direction.extension();
    let metadata = fs::metadata(input)?;

    if !metadata.is_dir() {
        let output = if output.is_dir() {
            let name = input.file_name().unwrap_or(input.as_os_str());
            output.join(name).with_extension(extension)
        } else {
            output.to_path_buf()
        };
        return Ok(vec![Job {
            input: input.to_path_buf(),
            output,
        }]);
    }

    let mut jobs = Vec::new();
    for entry in WalkDir::new(input).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(input) else {
            continue;
        };
        jobs.push(Job {
            input: entry.path().to_path_buf(),
            output: output.join(relative).with_extension(extension),
        });
    }

    log::debug!("planned {} jobs under {}", jobs.len(), input.display());
    Ok(jobs)
}

/// Converts inputs in one direction with fixed options.
#[derive(Debug, Clone)]
pub struct Converter {
    direction: Direction,
    render: RenderOptions,
    build: BuildOptions,
}

impl Converter {
    /// A converter from IBX1 to XML.
    pub fn decoder(render: RenderOptions) -> Self {
        Self {
            direction: Direction::Decode,
            render,
            build: BuildOptions::default(),
        }
    }

    /// A converter from XML to IBX1.
    pub fn encoder(build: BuildOptions) -> Self {
        Self {
            direction: Direction::Encode,
            render: RenderOptions::default(),
            build,
        }
    }

    /// The conversion direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Convert `data`, writing the result to `out`.
    ///
    /// Input that is not in the source format is written to `out` as is:
    /// anything without the IBX1 signature when decoding, and XML that
    /// IBX1 cannot represent (element attributes, no root element) when
    /// encoding.
    pub fn convert_bytes<W: Write>(&self, data: &[u8], out: &mut W) -> Result<Outcome> {
        match self.direction {
            Direction::Decode => match Document::decode(data)? {
                Decoded::Document(document) => {
                    document.write_xml(out, &self.render)?;
                    Ok(Outcome::Converted)
                }
                Decoded::Passthrough(bytes) => {
                    out.write_all(bytes)?;
                    Ok(Outcome::Unchanged)
                }
            },
            Direction::Encode => {
                let element = match Element::from_xml_bytes(data) {
                    Ok(element) => element,
                    Err(e @ ibx_format::Error::UnsupportedAttributes { .. })
                    | Err(e @ ibx_format::Error::NoRootElement) => {
                        log::warn!("{}, copying input unchanged", e);
                        out.write_all(data)?;
                        return Ok(Outcome::Unchanged);
                    }
                    Err(e) => return Err(e.into()),
                };
                let document = Document::from_element(&element, &self.build)?;
                out.write_all(&document.encode()?)?;
                Ok(Outcome::Converted)
            }
        }
    }

    /// Run one job: read the input, convert it and write the output.
    ///
    /// Parent directories of the output are created as needed. Nothing is
    /// written when the conversion fails.
    pub fn run_job(&self, job: &Job) -> Result<Outcome> {
        let data = fs::read(&job.input)?;

        let mut converted = Vec::with_capacity(data.len());
        let outcome = self.convert_bytes(&data, &mut converted)?;

        if let Some(parent) = job.output.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&job.output, converted)?;

        log::info!(
            "{} -> {} ({:?})",
            job.input.display(),
            job.output.display(),
            outcome
        );
        Ok(outcome)
    }

    /// Run every job and tally the results.
    ///
    /// A failing job is recorded and the run moves on to the next one.
    /// `on_done` sees each job with its result as soon as it finishes; with
    /// `parallel` set jobs run on the rayon pool and finish in any order,
    /// but the report is always filled in job order.
    pub fn run_all<F>(&self, jobs: &[Job], parallel: bool, on_done: F) -> BatchReport
    where
        F: Fn(&Job, &Result<Outcome>) + Sync,
    {
        let run = |job: &Job| {
            let result = self.run_job(job);
            on_done(job, &result);
            result
        };

        let results: Vec<_> = if parallel {
            jobs.par_iter().map(run).collect()
        } else {
            jobs.iter().map(run).collect()
        };

        let mut report = BatchReport::default();
        for (job, result) in jobs.iter().zip(results) {
            report.record(job, result);
        }
        report
    }
}

/// Tally of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub converted: usize,
    pub unchanged: usize,
    /// Failed inputs with their error messages.
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchReport {
    /// Record the result of one job.
    pub fn record(&mut self, job: &Job, result: Result<Outcome>) {
        match result {
            Ok(Outcome::Converted) => self.converted += 1,
            Ok(Outcome::Unchanged) => self.unchanged += 1,
            Err(e) => {
                log::error!("{}: {}", job.input.display(), e);
                self.failed.push((job.input.clone(), error_chain(&e)));
            }
        }
    }

    /// Number of jobs recorded.
    pub fn total(&self) -> usize {
        self.converted + self.unchanged + self.failed.len()
    }

    /// Whether every recorded job succeeded.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

fn error_chain(error: &Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
