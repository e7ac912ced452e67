use std::path;
use std::thread;

use anyhow::Context as _;
use relative_path::RelativePathBuf;
use sassline_core::{Source, SourcePath};

use crate::config::Config;
use crate::error::Result;
use crate::files;
use crate::sass::Compiled;
use crate::source_map;

/// Compiles every style sheet of a project into its destination.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: Config,
    source: Source,
}

/// One style sheet and where its artifacts go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub source: SourcePath,
    pub css_path: path::PathBuf,
    pub map_path: Option<path::PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFailure {
    pub source: RelativePathBuf,
    pub message: String,
}

/// What a single pass over the source set did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Style sheets whose output changed on disk.
    pub written: Vec<RelativePathBuf>,
    /// Style sheets whose output was already up to date.
    pub unchanged: Vec<RelativePathBuf>,
    /// Style sheets the compiler rejected; nothing was written for them.
    pub failed: Vec<JobFailure>,
}

impl BuildReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.written.len() + self.unchanged.len() + self.failed.len()
    }
}

enum Outcome {
    Written(RelativePathBuf),
    Unchanged(RelativePathBuf),
    Failed(JobFailure),
}

impl Pipeline {
    pub fn new(config: Config) -> Result<Self> {
        let source = Source::new(
            &config.source,
            &config.pattern,
            config.ignore.iter().map(|s| s.as_str()),
        )
        .with_context(|| format!("Invalid source set for `{}`", config.source.display()))?;
        Ok(Self { config, source })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    /// Whether a change to `path` can affect the output.
    ///
    /// Partials count: they are compiled into whatever imports them.
    pub fn is_watched(&self, path: &path::Path) -> bool {
        !path.starts_with(&self.config.destination) && self.source.includes_file(path)
    }

    /// The compilation jobs for the source set as it is right now.
    pub fn jobs(&self) -> Result<Vec<Job>> {
        let mut jobs = Vec::new();
        for source in self.source.iter() {
            let source = source.with_context(|| {
                format!("Failed to list `{}`", self.config.source.display())
            })?;
            if source.is_partial() {
                continue;
            }
            let css_rel = source.rel_path.with_extension("css");
            let css_path = css_rel.to_path(&self.config.destination);
            let map_path = self.config.source_maps.as_ref().map(|maps| {
                RelativePathBuf::from(format!("{css_rel}.map")).to_path(&maps.directory)
            });
            jobs.push(Job {
                source,
                css_path,
                map_path,
            });
        }
        Ok(jobs)
    }

    /// Run every job and wait for all of them to finish.
    ///
    /// Style sheets the compiler rejects are logged and reported; the rest of the batch still
    /// runs. Filesystem failures fail the whole run once every job has finished.
    pub fn compile(&self) -> Result<BuildReport> {
        let jobs = self.jobs()?;
        log::debug!(
            "Compiling {} style sheets from {}",
            jobs.len(),
            self.config.source.display()
        );

        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            .min(jobs.len())
            .max(1);
        let chunk_size = jobs.len().div_ceil(workers).max(1);
        let config = &self.config;
        let outcomes: Vec<Result<Outcome>> = thread::scope(|s| {
            let handles: Vec<_> = jobs
                .chunks(chunk_size)
                .map(|chunk| {
                    s.spawn(move || {
                        chunk
                            .iter()
                            .map(|job| run_job(config, job))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap_or_else(|p| std::panic::resume_unwind(p)))
                .collect()
        });

        let mut report = BuildReport::default();
        let mut first_err = None;
        for outcome in outcomes {
            match outcome {
                Ok(Outcome::Written(p)) => report.written.push(p),
                Ok(Outcome::Unchanged(p)) => report.unchanged.push(p),
                Ok(Outcome::Failed(f)) => report.failed.push(f),
                Err(e) => {
                    log::error!("{e:#}");
                    first_err.get_or_insert(e);
                }
            }
        }
        if let Some(err) = first_err {
            return Err(err);
        }

        log::info!(
            "Compiled {} style sheets ({} updated, {} failed)",
            report.total(),
            report.written.len(),
            report.failed.len()
        );
        Ok(report)
    }
}

fn run_job(config: &Config, job: &Job) -> Result<Outcome> {
    let rel_path = job.source.rel_path.clone();
    let (css, loaded) = match config.sass.compile_file(&job.source.abs_path)? {
        Compiled::Css { css, loaded } => (css, loaded),
        Compiled::Rejected(err) => {
            log::error!("{rel_path}: {err}");
            let failure = JobFailure {
                source: rel_path,
                message: err.to_string(),
            };
            return Ok(Outcome::Failed(failure));
        }
    };

    // A map is only written once its style sheet is
    let mut changed = false;
    match (&job.map_path, &config.source_maps) {
        (Some(map_path), Some(maps)) => {
            let layout = source_map::MapLayout {
                root: &config.root,
                source_dir: &config.source,
                css_path: &job.css_path,
                map_path,
            };
            let map = layout.build(&loaded, maps.include_content).to_json()?;
            let css = source_map::link(css, &layout.mapping_url_comment());
            changed |= files::write_document_file(css, &job.css_path)? == files::Written::Changed;
            changed |= files::write_document_file(map, map_path)? == files::Written::Changed;
        }
        _ => {
            changed |= files::write_document_file(css, &job.css_path)? == files::Written::Changed;
        }
    }

    if changed {
        log::debug!("Wrote {}", job.css_path.display());
        Ok(Outcome::Written(rel_path))
    } else {
        log::trace!("{} is up to date", job.css_path.display());
        Ok(Outcome::Unchanged(rel_path))
    }
}
