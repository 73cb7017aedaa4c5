//! Writes frozen findings to `PREFIX_*.txt` files, one entry per line,
//! sorted ascending by URL (spec §6).

use std::fs::File;
use std::io::{BufWriter, Write as _};
use std::path::Path;

use anyhow::Context as _;

use crate::state::FindingsSnapshot;

fn write_lines(path: &Path, lines: impl Iterator<Item = String>) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for line in lines {
        writer
            .write_all(line.as_bytes())
            .and_then(|_| writer.write_all(b"\n"))
            .with_context(|| format!("write {}", path.display()))?;
    }
    writer.flush().with_context(|| format!("flush {}", path.display()))?;
    Ok(())
}

pub fn write_all(prefix: &str, findings: &FindingsSnapshot) -> anyhow::Result<()> {
    let mut alive = findings.alive.clone();
    alive.sort_by(|a, b| a.0.cmp(&b.0));

    write_lines(
        Path::new(&format!("{prefix}_alive_urls.txt")),
        alive.iter().map(|(url, status)| format!("{status}\t{url}")),
    )?;

    write_lines(
        Path::new(&format!("{prefix}_params.txt")),
        findings.params.iter().cloned(),
    )?;

    write_lines(
        Path::new(&format!("{prefix}_endpoints.txt")),
        findings.endpoints.iter().cloned(),
    )?;

    write_lines(
        Path::new(&format!("{prefix}_api_endpoints.txt")),
        findings.api_endpoints.iter().cloned(),
    )?;

    write_lines(
        Path::new(&format!("{prefix}_js_files.txt")),
        findings.js_files.iter().cloned(),
    )?;

    write_lines(
        Path::new(&format!("{prefix}_osint_strings.txt")),
        findings.osint_strings.iter().cloned(),
    )?;

    Ok(())
}
