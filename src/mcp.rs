use anyhow::Result;
use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    schemars, tool, tool_router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{self, Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::job::{self, JobConfig, JobOutcome};
use crate::pdf::count_pages;

// Request structs for tools

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PathRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SelectionsRequest {
    #[schemars(description = "Path to the source PDF file")]
    pub path: String,
    #[schemars(
        description = "Selections: for each output file, a name line followed by a comma-separated pages line (e.g. 'Intro\\n1,2\\nAppendix\\n9,10')"
    )]
    pub selections: String,
    #[schemars(description = "Working directory; the archive is written to <workdir>/result.zip")]
    pub workdir: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CleanRequest {
    #[schemars(description = "Working directory to delete")]
    pub workdir: String,
    #[schemars(description = "Uploaded source PDF to delete as well")]
    #[serde(default)]
    pub path: Option<String>,
}

/// One lock per working directory so two jobs never share `Extracted/`.
#[derive(Debug, Default)]
struct WorkdirLocks {
    locks: Mutex<HashMap<PathBuf, Arc<tokio::sync::Mutex<()>>>>,
}

impl WorkdirLocks {
    fn get(&self, workdir: &Path) -> Arc<tokio::sync::Mutex<()>> {
        let key = lock_key(workdir);
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        // Entries nobody else holds belong to finished jobs
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        locks.entry(key).or_default().clone()
    }
}

/// Resolve `..` and symlinks so different spellings of one directory share a lock.
fn lock_key(workdir: &Path) -> PathBuf {
    std::fs::canonicalize(workdir)
        .or_else(|_| path::absolute(workdir))
        .unwrap_or_else(|_| workdir.to_path_buf())
}

#[derive(Debug, Clone)]
pub struct PdfServer {
    #[allow(dead_code)]
    tool_router: ToolRouter<Self>,
    config: JobConfig,
    locks: Arc<WorkdirLocks>,
}

impl PdfServer {
    pub fn new(config: JobConfig) -> Self {
        Self {
            tool_router: Self::tool_router(),
            config,
            locks: Arc::default(),
        }
    }
}

impl Default for PdfServer {
    fn default() -> Self {
        Self::new(JobConfig::default())
    }
}

#[tool_router]
impl PdfServer {
    #[tool(description = "Get the number of pages in a PDF")]
    fn pdf_page_count(&self, Parameters(PathRequest { path }): Parameters<PathRequest>) -> String {
        match count_pages(&path) {
            Ok(pages) => serde_json::to_string_pretty(&PageCountResult { pages })
                .unwrap_or_else(|e| format!("Error: {}", e)),
            Err(e) => format!("Error: {}", e),
        }
    }

    #[tool(description = "Validate selections against a PDF and show the extraction script without running it")]
    fn pdf_plan_selections(&self, Parameters(req): Parameters<SelectionsRequest>) -> String {
        let total = match count_pages(&req.path) {
            Ok(n) => n,
            Err(e) => return format!("Error: {}", e),
        };
        let (source, workdir) = match (path::absolute(&req.path), path::absolute(&req.workdir)) {
            (Ok(s), Ok(w)) => (s, w),
            (Err(e), _) | (_, Err(e)) => return format!("Error: {}", e),
        };

        match job::plan(&source, &workdir, total, &req.selections, &self.config) {
            Ok(script) => script.render(),
            Err(e) => format!("Error: {}", e.user_message()),
        }
    }

    #[tool(description = "Extract named page selections from a PDF into <workdir>/result.zip, one PDF per selection")]
    async fn pdf_extract_selections(&self, Parameters(req): Parameters<SelectionsRequest>) -> String {
        let workdir = path::absolute(&req.workdir).unwrap_or_else(|_| PathBuf::from(&req.workdir));
        let lock = self.locks.get(&workdir);
        let _guard = lock.lock().await;

        let config = self.config.clone();
        let handle = tokio::task::spawn_blocking(move || {
            let total = count_pages(&req.path)?;
            let result = job::run(
                Path::new(&req.path),
                &workdir,
                total,
                &req.selections,
                &config,
            );
            if let Err(e) = &result {
                tracing::warn!(error = %e, "pdf_extract_selections failed");
            }
            let outcome = JobOutcome::from(&result);
            Ok::<_, anyhow::Error>(ExtractResult {
                success: outcome.success,
                message: outcome.message,
                archive: result.ok().map(|r| r.archive.display().to_string()),
            })
        });

        match handle.await {
            Ok(Ok(result)) => {
                serde_json::to_string_pretty(&result).unwrap_or_else(|e| format!("Error: {}", e))
            }
            Ok(Err(e)) => format!("Error: {}", e),
            Err(e) => format!("Error: {}", e),
        }
    }

    #[tool(description = "Delete a job's working directory and, optionally, the uploaded source PDF")]
    async fn pdf_clean_workdir(&self, Parameters(req): Parameters<CleanRequest>) -> String {
        let workdir = path::absolute(&req.workdir).unwrap_or_else(|_| PathBuf::from(&req.workdir));
        let lock = self.locks.get(&workdir);
        let _guard = lock.lock().await;

        let removed = job::clean(&workdir, req.path.as_deref().map(Path::new));

        match removed {
            Ok(()) => serde_json::to_string_pretty(&CleanResult { success: true })
                .unwrap_or_else(|e| format!("Error: {}", e)),
            Err(e) => format!("Error: {}", e),
        }
    }
}

// Result types for MCP tools

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PageCountResult {
    pub pages: u32,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ExtractResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CleanResult {
    pub success: bool,
}

impl ServerHandler for PdfServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Split a PDF into named page selections and bundle them in one archive. Use \
                 pdf_page_count to learn the page bounds, pdf_plan_selections to validate a \
                 selection list, pdf_extract_selections to produce <workdir>/result.zip, and \
                 pdf_clean_workdir to remove a finished job."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_server(config: JobConfig) -> Result<()> {
    let server = PdfServer::new(config);

    tracing::info!("MCP server ready on stdio");

    // Serve using stdin/stdout as a tuple
    let service = server.serve((tokio::io::stdin(), tokio::io::stdout())).await?;

    service.waiting().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_workdir_shares_lock() {
        let locks = WorkdirLocks::default();
        let a = locks.get(Path::new("/w/one"));
        let b = locks.get(Path::new("/w/one"));
        let c = locks.get(Path::new("/w/two"));
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }

    #[test]
    fn test_equivalent_workdirs_share_lock() {
        let dir = tempfile::tempdir().unwrap();
        let one = dir.path().join("one");
        std::fs::create_dir_all(dir.path().join("a")).unwrap();
        std::fs::create_dir(&one).unwrap();

        let locks = WorkdirLocks::default();
        let a = locks.get(&one);
        let b = locks.get(&dir.path().join("a").join("..").join("one"));
        assert!(Arc::ptr_eq(&a, &b));

        #[cfg(unix)]
        {
            let link = dir.path().join("link");
            std::os::unix::fs::symlink(&one, &link).unwrap();
            assert!(Arc::ptr_eq(&a, &locks.get(&link)));
        }
    }

    #[test]
    fn test_released_locks_are_dropped() {
        let locks = WorkdirLocks::default();
        let held = locks.get(Path::new("/w/held"));
        drop(locks.get(Path::new("/w/done")));

        // Next lookup sweeps the released entry
        let again = locks.get(Path::new("/w/held"));
        assert!(Arc::ptr_eq(&held, &again));
        let map = locks.locks.lock().unwrap();
        assert_eq!(map.len(), 1);
        assert!(map.contains_key(Path::new("/w/held")));
    }

    #[test]
    fn test_extract_result_json() {
        let failed = ExtractResult {
            success: false,
            message: Some("duplicate page 2 in 2,2".to_string()),
            archive: None,
        };
        assert_eq!(
            serde_json::to_string(&failed).unwrap(),
            r#"{"success":false,"message":"duplicate page 2 in 2,2"}"#
        );
    }

    #[test]
    fn test_plan_reports_unreadable_pdf() {
        let server = PdfServer::default();
        let out = server.pdf_plan_selections(Parameters(SelectionsRequest {
            path: "/nonexistent.pdf".to_string(),
            selections: "a\n1".to_string(),
            workdir: "/tmp".to_string(),
        }));
        assert!(out.starts_with("Error: Failed to open PDF"));
    }
}
