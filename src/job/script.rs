use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use super::JobConfig;
use crate::filename::NameSet;
use crate::selection::Selection;

pub const EXTRACTED_DIR: &str = "Extracted";
pub const RESULT_FILENAME: &str = "result.zip";
pub const SCRIPT_FILENAME: &str = "extract.bash";
pub const MARKER_PREFIX: &str = "GeneratedFiles=";

/// One action of a compiled job, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    EnterWorkdir,
    ResetExtracted,
    /// `output` is the sanitised filename inside the extraction directory.
    ExtractPages { pages: Vec<u32>, output: String },
    RemoveArchive,
    Archive,
    ReportGeneratedFiles,
    RemoveExtracted,
}

/// A job compiled from validated selections.
#[derive(Debug, Clone)]
pub struct JobScript {
    pub source: PathBuf,
    pub workdir: PathBuf,
    pub pdf_tool: String,
    pub archive_tool: String,
    pub steps: Vec<Step>,
}

impl JobScript {
    /// `source` and `workdir` are expected to be absolute.
    pub fn compile(
        source: &Path,
        workdir: &Path,
        selections: &[Selection],
        config: &JobConfig,
    ) -> Self {
        let mut names = NameSet::new();
        let mut steps = vec![Step::EnterWorkdir, Step::ResetExtracted];

        for sel in selections {
            steps.push(Step::ExtractPages {
                pages: sel.pages.clone(),
                output: names.assign(&sel.name),
            });
        }

        steps.extend([
            Step::RemoveArchive,
            Step::Archive,
            Step::ReportGeneratedFiles,
            Step::RemoveExtracted,
        ]);

        JobScript {
            source: source.to_path_buf(),
            workdir: workdir.to_path_buf(),
            pdf_tool: config.pdf_tool.clone(),
            archive_tool: config.archive_tool.clone(),
            steps,
        }
    }

    /// Number of files the extraction steps are expected to produce.
    pub fn expected_files(&self) -> usize {
        self.output_names().count()
    }

    pub fn output_names(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().filter_map(|step| match step {
            Step::ExtractPages { output, .. } => Some(output.as_str()),
            _ => None,
        })
    }

    pub fn script_path(&self) -> PathBuf {
        self.workdir.join(SCRIPT_FILENAME)
    }

    pub fn archive_path(&self) -> PathBuf {
        self.workdir.join(RESULT_FILENAME)
    }

    /// Render the job as a self-contained bash script.
    pub fn render(&self) -> String {
        let mut s = String::from("#!/bin/bash\n");
        for step in &self.steps {
            self.render_step(&mut s, step);
        }
        s
    }

    fn render_step(&self, s: &mut String, step: &Step) {
        let extracted = shell_quote(EXTRACTED_DIR);
        let archive = shell_quote(RESULT_FILENAME);
        // Writing into a String cannot fail
        let _ = match step {
            Step::EnterWorkdir => {
                writeln!(s, "cd {}", shell_quote(&self.workdir.to_string_lossy()))
            }
            Step::ResetExtracted => writeln!(s, "rm -rf {extracted}\nmkdir {extracted}"),
            Step::ExtractPages { pages, output } => {
                // E.g.: pdftk '/w/orig.pdf' cat 4 5 6 10 output 'Extracted/test.pdf'
                let pages: String = pages.iter().map(|p| format!("{} ", p)).collect();
                writeln!(
                    s,
                    "{} {} cat {}output {}",
                    shell_quote(&self.pdf_tool),
                    shell_quote(&self.source.to_string_lossy()),
                    pages,
                    shell_quote(&format!("{}/{}", EXTRACTED_DIR, output))
                )
            }
            Step::RemoveArchive => writeln!(s, "rm -rf {archive}"),
            Step::Archive => writeln!(
                s,
                "{} a {archive} {extracted}",
                shell_quote(&self.archive_tool)
            ),
            Step::ReportGeneratedFiles => writeln!(
                s,
                "echo {MARKER_PREFIX}`ls -A {extracted} | wc -l`\\;"
            ),
            Step::RemoveExtracted => writeln!(s, "rm -rf {extracted}"),
        };
    }
}

/// Wrap `arg` in single quotes so the shell passes it through verbatim.
pub fn shell_quote(arg: &str) -> String {
    format!("'{}'", arg.replace('\'', "'\\''"))
}
