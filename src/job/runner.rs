use std::fs;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use walkdir::WalkDir;

use super::script::{JobScript, Step, EXTRACTED_DIR, MARKER_PREFIX, RESULT_FILENAME};
use super::JobConfig;
use crate::error::JobError;

/// What a job run left behind for verification.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Combined stdout and stderr of everything the job ran.
    pub transcript: String,
    /// Files reported by the marker line, or -1 if none could be read.
    pub generated: i64,
    /// Steps known to have exited unsuccessfully.
    pub failed_steps: usize,
}

impl RunOutput {
    fn from_transcript(transcript: String, failed_steps: usize) -> Self {
        RunOutput {
            generated: generated_files(&transcript),
            transcript,
            failed_steps,
        }
    }

    /// The marker count is the source of truth; a clean exit is not enough.
    pub fn succeeded(&self, expected: usize) -> bool {
        self.failed_steps == 0 && self.generated == expected as i64
    }
}

/// Read the count from the last `GeneratedFiles=<n>;` line, or -1.
pub fn generated_files(transcript: &str) -> i64 {
    let Some(start) = transcript.rfind(MARKER_PREFIX) else {
        return -1;
    };
    let rest = &transcript[start + MARKER_PREFIX.len()..];
    let Some(end) = rest.find(';') else {
        return -1;
    };
    // Some `wc` implementations pad their output
    rest[..end].trim().parse().unwrap_or(-1)
}

/// Write the rendered script into the working directory and run it through the shell.
pub fn run_script(script: &JobScript, config: &JobConfig) -> Result<RunOutput, JobError> {
    let path = script.script_path();
    fs::write(&path, script.render())?;
    tracing::debug!(script = %path.display(), "wrote job script");

    // The script path travels as $1 and is never spliced into the command string
    let output = Command::new(&config.shell)
        .arg("-c")
        .arg("exec \"$0\" \"$1\" 2>&1")
        .arg(&config.shell)
        .arg(&path)
        .stdin(Stdio::null())
        .output()?;

    let mut transcript = String::from_utf8_lossy(&output.stdout).into_owned();
    transcript.push_str(&String::from_utf8_lossy(&output.stderr));
    tracing::debug!(status = %output.status, "job script finished");

    Ok(RunOutput::from_transcript(transcript, 0))
}

/// Run each step as its own process with an explicit argument vector.
///
/// Exit codes are checked per step and the output count comes from the
/// filesystem. The transcript still ends with a marker line so it reads the
/// same as a scripted run in a failure log.
pub fn run_direct(script: &JobScript) -> Result<RunOutput, JobError> {
    let workdir = script.workdir.as_path();
    let extracted = workdir.join(EXTRACTED_DIR);
    let mut transcript = String::new();
    let mut failed_steps = 0;
    let mut generated = -1;

    for step in &script.steps {
        match step {
            Step::EnterWorkdir => {
                if !workdir.is_dir() {
                    return Err(JobError::Io(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        format!("working directory missing: {}", workdir.display()),
                    )));
                }
            }
            Step::ResetExtracted => {
                if extracted.exists() {
                    fs::remove_dir_all(&extracted)?;
                }
                fs::create_dir(&extracted)?;
            }
            Step::ExtractPages { pages, output } => {
                let mut cmd = Command::new(&script.pdf_tool);
                cmd.arg(&script.source)
                    .arg("cat")
                    .args(pages.iter().map(|p| p.to_string()))
                    .arg("output")
                    .arg(Path::new(EXTRACTED_DIR).join(output));
                if !run_step(&mut cmd, workdir, &mut transcript) {
                    failed_steps += 1;
                }
            }
            Step::RemoveArchive => {
                let archive = script.archive_path();
                if archive.exists() {
                    fs::remove_file(&archive)?;
                }
            }
            Step::Archive => {
                let mut cmd = Command::new(&script.archive_tool);
                cmd.arg("a").arg(RESULT_FILENAME).arg(EXTRACTED_DIR);
                if !run_step(&mut cmd, workdir, &mut transcript) {
                    failed_steps += 1;
                }
            }
            Step::ReportGeneratedFiles => {
                let count = count_entries(&extracted);
                transcript.push_str(&format!("{}{};\n", MARKER_PREFIX, count));
                generated = count as i64;
            }
            Step::RemoveExtracted => {
                // Left behind for diagnosis when anything went wrong
                if failed_steps == 0 && generated == script.expected_files() as i64 {
                    fs::remove_dir_all(&extracted)?;
                }
            }
        }
    }

    Ok(RunOutput {
        transcript,
        generated,
        failed_steps,
    })
}

/// Returns false if the command could not be started or exited unsuccessfully.
fn run_step(cmd: &mut Command, workdir: &Path, transcript: &mut String) -> bool {
    let program = cmd.get_program().to_string_lossy().into_owned();
    match cmd.current_dir(workdir).stdin(Stdio::null()).output() {
        Ok(Output {
            status,
            stdout,
            stderr,
        }) => {
            transcript.push_str(&String::from_utf8_lossy(&stdout));
            transcript.push_str(&String::from_utf8_lossy(&stderr));
            if !status.success() {
                tracing::warn!(program = %program, %status, "step failed");
                transcript.push_str(&format!("{}: exited with {}\n", program, status));
            }
            status.success()
        }
        Err(e) => {
            tracing::warn!(program = %program, error = %e, "step could not be started");
            transcript.push_str(&format!("{}: {}\n", program, e));
            false
        }
    }
}

/// Entries directly inside `dir`, like `ls -A | wc -l`.
fn count_entries(dir: &Path) -> usize {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .count()
}
