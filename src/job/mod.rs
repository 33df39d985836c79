pub mod failure_log;
pub mod runner;
pub mod script;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::JobError;
use crate::selection::{parse_selections, MAX_OUTPUT_PAGES};
pub use script::JobScript;

/// How a compiled job is carried out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Executor {
    /// Write a bash script and run it in one shell session
    #[default]
    Script,
    /// Run every tool as its own process, checking each exit code
    Direct,
}

#[derive(Debug, Clone)]
pub struct JobConfig {
    pub pdf_tool: String,
    pub archive_tool: String,
    pub shell: String,
    pub executor: Executor,
    pub max_output_pages: usize,
}

impl Default for JobConfig {
    fn default() -> Self {
        JobConfig {
            pdf_tool: "pdftk".to_string(),
            archive_tool: "7z".to_string(),
            shell: "bash".to_string(),
            executor: Executor::Script,
            max_output_pages: MAX_OUTPUT_PAGES,
        }
    }
}

/// A finished extraction.
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub selections: usize,
    pub generated: usize,
    pub archive: PathBuf,
}

/// The result of a job as reported to a client.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct JobOutcome {
    pub success: bool,
    /// Kept for operators; never serialised to clients.
    #[serde(skip)]
    pub log_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<&Result<JobReport, JobError>> for JobOutcome {
    fn from(result: &Result<JobReport, JobError>) -> Self {
        match result {
            Ok(_) => JobOutcome {
                success: true,
                log_path: None,
                message: None,
            },
            Err(e) => JobOutcome {
                success: false,
                log_path: match e {
                    JobError::PipelineFailure { log_path } => Some(log_path.clone()),
                    _ => None,
                },
                message: Some(e.user_message()),
            },
        }
    }
}

/// Validate the selections and compile them without touching the filesystem.
pub fn plan(
    source: &Path,
    workdir: &Path,
    total_pages: u32,
    spec: &str,
    config: &JobConfig,
) -> Result<JobScript, JobError> {
    let selections = parse_selections(spec, total_pages, config.max_output_pages)?;
    Ok(JobScript::compile(source, workdir, &selections, config))
}

/// Extract every selection in `spec` from `source` and archive the results in `workdir`.
///
/// Nothing is written and no process is started unless the selections are
/// valid. Success means the pipeline produced exactly one file per selection;
/// otherwise its output is saved to a timestamped log in `workdir`.
pub fn run(
    source: &Path,
    workdir: &Path,
    total_pages: u32,
    spec: &str,
    config: &JobConfig,
) -> Result<JobReport, JobError> {
    let selections = parse_selections(spec, total_pages, config.max_output_pages)?;

    fs::create_dir_all(workdir)?;
    let workdir = fs::canonicalize(workdir)?;
    let source = fs::canonicalize(source)?;
    let script = JobScript::compile(&source, &workdir, &selections, config);
    let expected = script.expected_files();

    tracing::info!(
        workdir = %workdir.display(),
        selections = expected,
        executor = ?config.executor,
        "running extraction job"
    );

    let output = match config.executor {
        Executor::Script => runner::run_script(&script, config)?,
        Executor::Direct => runner::run_direct(&script)?,
    };

    if output.succeeded(expected) {
        tracing::info!(generated = output.generated, "extraction job finished");
        return Ok(JobReport {
            selections: expected,
            generated: expected,
            archive: script.archive_path(),
        });
    }

    tracing::warn!(
        expected,
        generated = output.generated,
        failed_steps = output.failed_steps,
        "extraction job produced the wrong number of files"
    );
    tracing::debug!(transcript = %output.transcript, "job output");
    let log_path = failure_log::save(&workdir, &output.transcript)?;
    Err(JobError::PipelineFailure { log_path })
}

/// Delete a job's working directory and, if given, the uploaded source it was run against.
pub fn clean(workdir: &Path, source: Option<&Path>) -> std::io::Result<()> {
    if let Some(source) = source.filter(|s| s.is_file()) {
        fs::remove_file(source)?;
        tracing::info!(source = %source.display(), "removed source");
    }
    if workdir.is_dir() {
        fs::remove_dir_all(workdir)?;
        tracing::info!(workdir = %workdir.display(), "removed working directory");
    }
    Ok(())
}
