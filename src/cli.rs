use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::job::{Executor, JobConfig};
use crate::selection::MAX_OUTPUT_PAGES;

#[derive(Parser)]
#[command(name = "pagepick")]
#[command(about = "Extract named page selections from a PDF into a single archive")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub tools: ToolArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct ToolArgs {
    /// Page extraction tool, run as `<tool> <pdf> cat <pages...> output <file>`
    #[arg(long, env = "PAGEPICK_PDF_TOOL", default_value = "pdftk", global = true)]
    pub pdf_tool: String,

    /// Archiving tool, run as `<tool> a <archive> <dir>`
    #[arg(long, env = "PAGEPICK_ARCHIVE_TOOL", default_value = "7z", global = true)]
    pub archive_tool: String,

    /// Shell used to run generated job scripts
    #[arg(long, env = "PAGEPICK_SHELL", default_value = "bash", global = true)]
    pub shell: String,

    /// How jobs are executed
    #[arg(
        long,
        env = "PAGEPICK_EXECUTOR",
        value_enum,
        default_value_t = Executor::Script,
        global = true
    )]
    pub executor: Executor,
}

impl ToolArgs {
    pub fn job_config(&self) -> JobConfig {
        JobConfig {
            pdf_tool: self.pdf_tool.clone(),
            archive_tool: self.archive_tool.clone(),
            shell: self.shell.clone(),
            executor: self.executor,
            max_output_pages: MAX_OUTPUT_PAGES,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run as MCP server
    Mcp,

    /// Print the page count of a PDF
    Pages {
        /// PDF file to inspect
        path: PathBuf,
    },

    /// Extract selections into <workdir>/result.zip
    Extract {
        /// Source PDF
        path: PathBuf,

        /// Selections file: a name line then a pages line ("1,2,5") per selection; `-` for stdin
        selections: PathBuf,

        /// Working directory for the job
        #[arg(short, long)]
        workdir: PathBuf,

        /// Page count to validate against instead of reading it from the PDF
        #[arg(long)]
        total_pages: Option<u32>,
    },

    /// Print the script an extraction would run
    Plan {
        /// Source PDF
        path: PathBuf,

        /// Selections file, or `-` for stdin
        selections: PathBuf,

        /// Working directory for the job
        #[arg(short, long, default_value = ".")]
        workdir: PathBuf,

        /// Page count to validate against instead of reading it from the PDF
        #[arg(long)]
        total_pages: Option<u32>,
    },

    /// Delete a job's working directory and uploaded source
    #[command(alias = "remove")]
    Clean {
        /// Working directory to delete
        #[arg(short, long)]
        workdir: PathBuf,

        /// Uploaded source PDF to delete as well
        #[arg(long)]
        source: Option<PathBuf>,
    },
}
