use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Persist a failed job's captured output as `<workdir>/<unix-seconds>.log`.
///
/// A second failure within the same second gets `<unix-seconds>-2.log` and so
/// on; an existing log is never overwritten.
pub fn save(workdir: &Path, transcript: &str) -> io::Result<PathBuf> {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    for attempt in 1u32.. {
        let name = match attempt {
            1 => format!("{}.log", secs),
            n => format!("{}-{}.log", secs, n),
        };
        let path = workdir.join(name);
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        };
        file.write_all(transcript.as_bytes())?;
        tracing::warn!(log_path = %path.display(), bytes = transcript.len(), "saved failure log");
        return Ok(path);
    }
    unreachable!("log name candidates exhausted")
}
