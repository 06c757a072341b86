use crate::error::{ProcessingError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Write a file through a sibling temp file and rename it into place.
///
/// A crash mid-write leaves only the temp file behind, never a truncated
/// file at `path`.
pub fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&mut File>) -> Result<()>,
{
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut temp = NamedTempFile::new_in(parent)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        write(&mut writer)?;
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| ProcessingError::Io(e.error))?;

    Ok(())
}

/// Writer for line-delimited JSON tables (one object per line)
pub struct JsonLinesWriter;

impl JsonLinesWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn write_records<T: Serialize>(&self, records: &[T], path: &Path) -> Result<()> {
        write_atomic(path, |writer| {
            for record in records {
                serde_json::to_writer(&mut *writer, record)?;
                writer.write_all(b"\n")?;
            }
            Ok(())
        })
    }

    pub fn read_records<T: DeserializeOwned>(&self, path: &Path) -> Result<Vec<T>> {
        let reader = BufReader::new(File::open(path)?);
        let mut records = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let record = serde_json::from_str(&line).map_err(|e| {
                ProcessingError::InvalidFormat(format!(
                    "{} line {}: {}",
                    path.display(),
                    index + 1,
                    e
                ))
            })?;
            records.push(record);
        }

        Ok(records)
    }
}

impl Default for JsonLinesWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// First `lines` lines of a file, for diagnostics
pub fn preview(path: &Path, lines: usize) -> String {
    match File::open(path) {
        Ok(file) => BufReader::new(file)
            .lines()
            .take(lines)
            .map(|l| l.unwrap_or_else(|e| format!("<unreadable: {}>", e)))
            .collect::<Vec<_>>()
            .join("\n"),
        Err(e) => format!("<unreadable: {}>", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Row {
        id: String,
        year: i32,
    }

    #[test]
    fn test_write_then_read_lines() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("rows.json");
        let rows = vec![
            Row { id: "00001".into(), year: 1990 },
            Row { id: "00003".into(), year: 1991 },
        ];

        let writer = JsonLinesWriter::new();
        writer.write_records(&rows, &path)?;

        let content = fs::read_to_string(&path)?;
        assert_eq!(
            content,
            "{\"id\":\"00001\",\"year\":1990}\n{\"id\":\"00003\",\"year\":1991}\n"
        );
        assert_eq!(writer.read_records::<Row>(&path)?, rows);

        Ok(())
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_files() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("nested").join("rows.json");

        JsonLinesWriter::new().write_records(&[Row { id: "1".into(), year: 2000 }], &path)?;

        let entries: Vec<_> = fs::read_dir(path.parent().unwrap())?.collect();
        assert_eq!(entries.len(), 1);

        Ok(())
    }

    #[test]
    fn test_failed_write_keeps_previous_file() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("rows.json");
        fs::write(&path, "previous\n")?;

        let result = write_atomic(&path, |_| Err(ProcessingError::MissingData("boom".into())));
        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&path)?, "previous\n");

        Ok(())
    }

    #[test]
    fn test_malformed_line_reports_position() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("rows.json");
        fs::write(&path, "{\"id\":\"1\",\"year\":1990}\n{\"id\":\"2\"}\n")?;

        let err = JsonLinesWriter::new()
            .read_records::<Row>(&path)
            .unwrap_err();
        assert!(err.to_string().contains("line 2"));

        Ok(())
    }

    #[test]
    fn test_preview_takes_leading_lines() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("rows.json");
        fs::write(&path, "a\nb\nc\n")?;

        assert_eq!(preview(&path, 2), "a\nb");
        assert!(preview(&dir.path().join("missing"), 2).starts_with("<unreadable"));

        Ok(())
    }
}
