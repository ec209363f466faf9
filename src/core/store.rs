//! Persistence: primary autosave file, named backups and generated output

use std::fs;
use std::path::{Path, PathBuf};

use rand::Rng;
use serde::Serialize;
use walkdir::WalkDir;

use super::config::StorePaths;
use super::document::{Header, NewsletterData};
use super::error::StoreError;
use super::render::HtmlRenderer;

pub const UNTITLED: &str = "untitled";
pub const NO_ISSUE: &str = "no-issue";
pub const NO_DATE: &str = "no-date";

/// Characters that are not allowed in backup file names.
const RESERVED_CHARS: &[char] = &['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Indentation of stored JSON files.
const JSON_INDENT: &[u8] = b"    ";

/// Replace reserved characters with `_` and trim. An empty result becomes
/// `placeholder`.
pub fn sanitize_filename(name: &str, placeholder: &str) -> String {
    let sanitized = name.replace(RESERVED_CHARS, "_");
    let sanitized = sanitized.trim();
    if sanitized.is_empty() {
        placeholder.to_string()
    } else {
        sanitized.to_string()
    }
}

/// `{title}_{issue}_{date}` with every part sanitized.
pub fn backup_base_name(header: &Header) -> String {
    format!(
        "{}_{}_{}",
        sanitize_filename(&header.main_title, UNTITLED),
        sanitize_filename(&header.issue_no, NO_ISSUE),
        sanitize_filename(&header.issue_date, NO_DATE)
    )
}

/// Files written by one backup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupPaths {
    pub json: PathBuf,
    pub html: PathBuf,
}

/// Reads and writes newsletter files under the configured paths.
///
/// Writes are plain overwrites, not write-then-rename. A crash mid-write can
/// leave a truncated file behind.
#[derive(Debug, Clone)]
pub struct Store {
    paths: StorePaths,
}

impl Store {
    pub fn new(paths: StorePaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    fn write_json(path: &Path, data: &NewsletterData) -> Result<(), StoreError> {
        let mut json = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(JSON_INDENT);
        let mut serializer = serde_json::Serializer::with_formatter(&mut json, formatter);
        data.serialize(&mut serializer)?;
        fs::write(path, json).map_err(|e| StoreError::io(path, e))
    }

    fn read_json(path: &Path) -> Result<NewsletterData, StoreError> {
        let content = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
        serde_json::from_str(&content).map_err(|e| StoreError::parse(path, e))
    }

    /// Overwrite the primary store with `data`.
    pub fn autosave(&self, data: &NewsletterData) -> Result<(), StoreError> {
        let path = &self.paths.data_file;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        Self::write_json(path, data)?;
        tracing::info!("Saved newsletter to: {}", path.display());
        Ok(())
    }

    /// Load the primary store. A missing file is an empty newsletter, not an error.
    pub fn autoload(&self) -> Result<NewsletterData, StoreError> {
        let path = &self.paths.data_file;
        if !path.exists() {
            tracing::debug!("No data file at {}, starting empty", path.display());
            return Ok(NewsletterData::default());
        }
        let data = Self::read_json(path)?;
        tracing::info!("Loaded newsletter from: {}", path.display());
        Ok(data)
    }

    /// Move an unreadable primary store aside as `<file>.bak_<6 hex>` so it is
    /// not overwritten by the next autosave. Returns the new location.
    pub fn quarantine_corrupt(&self) -> Result<PathBuf, StoreError> {
        let path = &self.paths.data_file;
        let suffix = rand::thread_rng().gen_range(0..0x100_0000u32);
        let mut target = path.clone().into_os_string();
        target.push(format!(".bak_{suffix:06x}"));
        let target = PathBuf::from(target);

        fs::rename(path, &target).map_err(|e| StoreError::io(path, e))?;
        tracing::warn!(
            "Moved unreadable data file {} to {}",
            path.display(),
            target.display()
        );
        Ok(target)
    }

    /// Write `<base>.json` and `<base>.html` into the backup directory.
    ///
    /// Steps run in order: ensure directory, JSON, HTML. A failure stops the
    /// sequence without undoing earlier steps. An existing backup with the
    /// same base name is overwritten.
    pub fn save_backup(
        &self,
        data: &NewsletterData,
        renderer: &HtmlRenderer,
    ) -> Result<BackupPaths, StoreError> {
        let dir = &self.paths.backup_dir;
        fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;

        let base = backup_base_name(&data.header);
        let paths = BackupPaths {
            json: dir.join(format!("{base}.json")),
            html: dir.join(format!("{base}.html")),
        };

        Self::write_json(&paths.json, data)?;
        let html = renderer.render(data);
        fs::write(&paths.html, html).map_err(|e| StoreError::io(&paths.html, e))?;

        tracing::info!("Saved backup: {}", paths.json.display());
        Ok(paths)
    }

    /// Read a backup snapshot. The caller decides what to replace with it.
    pub fn load_backup(&self, path: &Path) -> Result<NewsletterData, StoreError> {
        let data = Self::read_json(path)?;
        tracing::info!("Loaded backup: {}", path.display());
        Ok(data)
    }

    /// JSON backups in the backup directory, sorted by file name.
    pub fn list_backups(&self) -> Vec<PathBuf> {
        if !self.paths.backup_dir.is_dir() {
            return Vec::new();
        }
        WalkDir::new(&self.paths.backup_dir)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().map(|ext| ext == "json").unwrap_or(false))
            .map(|e| e.path().to_path_buf())
            .collect()
    }

    /// Write the generated page to the output file.
    pub fn write_output(&self, html: &str) -> Result<PathBuf, StoreError> {
        let path = &self.paths.output_file;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        fs::write(path, html).map_err(|e| StoreError::io(path, e))?;
        tracing::info!("Wrote newsletter page: {}", path.display());
        Ok(path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document::{ContentData, SectionData};
    use crate::core::error::FailureKind;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> Store {
        Store::new(StorePaths {
            data_file: dir.path().join("newsletter_data.json"),
            backup_dir: dir.path().join("backups"),
            output_file: dir.path().join("newsletter.html"),
        })
    }

    fn sample() -> NewsletterData {
        NewsletterData {
            header: Header {
                main_title: "사내 소식".to_string(),
                issue_no: "3".to_string(),
                issue_date: "2024-02-02".to_string(),
            },
            sections: vec![SectionData {
                sidebar_title: "NEWS".to_string(),
                title: "Top".to_string(),
                color: "#74438d".to_string(),
                contents: vec![ContentData {
                    title: "첫 소식".to_string(),
                    body: "a\nb".to_string(),
                    ..ContentData::default()
                }],
            }],
        }
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("a/b*c", UNTITLED), "a_b_c");
        assert_eq!(sanitize_filename("  x  ", UNTITLED), "x");
        assert_eq!(sanitize_filename("", UNTITLED), UNTITLED);
        assert_eq!(sanitize_filename("   ", NO_DATE), NO_DATE);
        assert_eq!(sanitize_filename(r#"\/*?:"<>|"#, UNTITLED), "_________");
    }

    #[test]
    fn test_backup_base_name_placeholders() {
        let header = Header {
            main_title: String::new(),
            issue_no: "3".to_string(),
            issue_date: "2024/02/02".to_string(),
        };
        assert_eq!(backup_base_name(&header), "untitled_3_2024_02_02");
        assert_eq!(backup_base_name(&Header::default()), "untitled_no-issue_no-date");
    }

    #[test]
    fn test_autoload_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.autoload().unwrap(), NewsletterData::default());
    }

    #[test]
    fn test_autosave_then_autoload() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let data = sample();

        store.autosave(&data).unwrap();
        let raw = fs::read_to_string(&store.paths().data_file).unwrap();
        // Pretty printed, non-ASCII kept as is.
        assert!(raw.contains("\n    \"header\": {"));
        assert!(raw.contains("사내 소식"));

        assert_eq!(store.autoload().unwrap(), data);
    }

    #[test]
    fn test_corrupt_file_is_classified_and_quarantined() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(&store.paths().data_file, "{ not json").unwrap();

        let err = store.autoload().unwrap_err();
        assert_eq!(err.kind(), FailureKind::Parse);
        // Untouched until the caller asks.
        assert!(store.paths().data_file.exists());

        let moved = store.quarantine_corrupt().unwrap();
        assert!(!store.paths().data_file.exists());
        assert_eq!(fs::read_to_string(&moved).unwrap(), "{ not json");

        let name = moved.file_name().unwrap().to_string_lossy().to_string();
        let suffix = name.strip_prefix("newsletter_data.json.bak_").unwrap();
        assert_eq!(suffix.len(), 6);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));

        assert_eq!(store.autoload().unwrap(), NewsletterData::default());
    }

    #[test]
    fn test_wrong_field_type_is_parse_failure() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(&store.paths().data_file, r#"{"header": {"main_title": 5}}"#).unwrap();
        assert_eq!(store.autoload().unwrap_err().kind(), FailureKind::Parse);
    }

    #[test]
    fn test_save_backup_writes_json_and_html() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let mut data = sample();
        data.header.main_title = String::new();

        let paths = store.save_backup(&data, &HtmlRenderer::new()).unwrap();
        assert_eq!(paths.json, dir.path().join("backups/untitled_3_2024-02-02.json"));
        assert_eq!(paths.html, dir.path().join("backups/untitled_3_2024-02-02.html"));

        let html = fs::read_to_string(&paths.html).unwrap();
        assert!(html.contains("<title>_3_2024-02-02</title>"));
        assert_eq!(store.load_backup(&paths.json).unwrap(), data);
    }

    #[test]
    fn test_backup_collision_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let renderer = HtmlRenderer::new();
        let mut data = sample();

        let first = store.save_backup(&data, &renderer).unwrap();
        data.sections.clear();
        let second = store.save_backup(&data, &renderer).unwrap();

        assert_eq!(first, second);
        assert!(store.load_backup(&second.json).unwrap().sections.is_empty());
        assert_eq!(store.list_backups().len(), 1);
    }

    #[test]
    fn test_load_backup_failures() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let missing = dir.path().join("missing.json");
        assert_eq!(store.load_backup(&missing).unwrap_err().kind(), FailureKind::Io);

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "[").unwrap();
        assert_eq!(store.load_backup(&broken).unwrap_err().kind(), FailureKind::Parse);
    }

    #[test]
    fn test_list_backups_only_json() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.list_backups().is_empty());

        let renderer = HtmlRenderer::new();
        let mut data = sample();
        store.save_backup(&data, &renderer).unwrap();
        data.header.issue_no = "1".to_string();
        store.save_backup(&data, &renderer).unwrap();

        let backups = store.list_backups();
        let names: Vec<_> = backups
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["사내 소식_1_2024-02-02.json", "사내 소식_3_2024-02-02.json"]
        );
    }

    #[test]
    fn test_autosave_failure_is_io_error() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::create_dir_all(&store.paths().data_file).unwrap();

        let err = store.autosave(&sample()).unwrap_err();
        assert_eq!(err.kind(), FailureKind::Io);
    }

    #[test]
    fn test_backup_html_failure_keeps_json() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let data = NewsletterData::default();
        let json = dir.path().join("backups/untitled_no-issue_no-date.json");
        fs::create_dir_all(dir.path().join("backups/untitled_no-issue_no-date.html")).unwrap();

        let err = store.save_backup(&data, &HtmlRenderer::new()).unwrap_err();
        assert_eq!(err.kind(), FailureKind::Io);

        // The JSON written before the failure stays on disk
        assert_eq!(store.load_backup(&json).unwrap(), data);
    }

    #[test]
    fn test_write_output() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let path = store.write_output("<html></html>").unwrap();
        assert_eq!(path, dir.path().join("newsletter.html"));
        assert_eq!(fs::read_to_string(path).unwrap(), "<html></html>");
    }
}
