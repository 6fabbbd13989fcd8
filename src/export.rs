//! Writing and reading lineup backup documents.

use std::path::Path;

use common::{Error, LineupDocument};

pub fn write_document(path: &Path, doc: &LineupDocument) -> Result<(), Error> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, doc.to_json_pretty()?)?;
    Ok(())
}

pub fn read_document(path: &Path) -> Result<LineupDocument, Error> {
    let raw = std::fs::read_to_string(path)?;
    LineupDocument::from_json(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::EngineConfig;

    #[test]
    fn test_write_then_read_keeps_settings() {
        let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let dir = std::env::temp_dir().join(format!("lineup-export-{}-{nanos}", std::process::id()));
        let path = dir.join("backup.json");

        let mut settings = EngineConfig::default();
        settings.strategy.target_legs = 5;
        let doc = LineupDocument::new(settings, vec![]);
        write_document(&path, &doc).unwrap();

        let restored = read_document(&path).unwrap();
        assert_eq!(restored.settings.strategy.target_legs, 5);
        assert!(restored.lineups.is_empty());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_garbage_file_rejected() {
        let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let path = std::env::temp_dir().join(format!("lineup-bad-{}-{nanos}.json", std::process::id()));
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(read_document(&path), Err(Error::Json(_))));
        let _ = std::fs::remove_file(path);
    }
}
