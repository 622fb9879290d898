use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Find the artifact produced for a job in the downloads directory.
///
/// The tool names its output `<id>.<ext>` with the extension chosen at
/// download time, so the directory is scanned for a filename starting with
/// the job id. If more than one file matches (e.g. a leftover partial
/// fragment next to the final file) the lexicographically first name wins.
pub fn find_artifact(dir: &Path, id: &str) -> io::Result<Option<PathBuf>> {
    let mut matches: Vec<String> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.starts_with(id))
        .collect();

    matches.sort();

    Ok(matches.into_iter().next().map(|name| dir.join(name)))
}

pub fn check_ytdlp_available(bin: &str) -> bool {
    Command::new(bin)
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}
