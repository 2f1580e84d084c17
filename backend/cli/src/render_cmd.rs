//! `simpledo render`: sanitize and render a markdown file.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use simpledo_understanding::{render_report, ReportFormat};

/// `-` reads from stdin.
pub fn run(file: &Path, format: ReportFormat) -> Result<()> {
    let source = read_source(file)?;
    print!("{}", render_report(&source, &[], format));
    Ok(())
}

fn read_source(file: &Path) -> Result<String> {
    if file == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).context("Failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answer.md");
        std::fs::write(&path, "## Heading").unwrap();
        assert_eq!(read_source(&path).unwrap(), "## Heading");
    }

    #[test]
    fn missing_file_is_an_error_naming_it() {
        let err = read_source(Path::new("/nonexistent/answer.md")).unwrap_err();
        assert!(err.to_string().contains("answer.md"));
    }
}
