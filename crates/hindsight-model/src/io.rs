//! JSONL import/export of task records

use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// Append a JSON record to a JSONL file
pub fn append_jsonl<T: Serialize>(path: &Path, record: &T) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;

    let json = serde_json::to_string(record)?;
    writeln!(file, "{}", json)?;
    Ok(())
}

/// Read all records from a JSONL file, skipping malformed lines
pub fn read_jsonl<T: for<'de> Deserialize<'de>>(path: &Path) -> std::io::Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(&line) {
            Ok(record) => records.push(record),
            Err(_) => continue,
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Flag, Task};
    use std::collections::HashMap;

    fn task(id: &str) -> Task {
        Task {
            id: id.to_string(),
            project_id: "proj_1".to_string(),
            session_id: None,
            created_at: 1_700_000_000,
            input: "hello".to_string(),
            output: None,
            flag: Flag::Unset,
            metadata: HashMap::new(),
            events: Vec::new(),
        }
    }

    #[test]
    fn test_task_export_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.jsonl");

        append_jsonl(&path, &task("t1")).unwrap();
        append_jsonl(&path, &task("t2")).unwrap();

        let read: Vec<Task> = read_jsonl(&path).unwrap();
        assert_eq!(read.len(), 2);
        assert_eq!(read[0].id, "t1");
        assert_eq!(read[1].id, "t2");
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.jsonl");

        append_jsonl(&path, &task("t1")).unwrap();
        std::fs::write(
            &path,
            format!("{}\nnot json\n\n", std::fs::read_to_string(&path).unwrap()),
        )
        .unwrap();
        append_jsonl(&path, &task("t2")).unwrap();

        let read: Vec<Task> = read_jsonl(&path).unwrap();
        assert_eq!(read.len(), 2);
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let read: Vec<Task> = read_jsonl(&dir.path().join("absent.jsonl")).unwrap();
        assert!(read.is_empty());
    }
}
