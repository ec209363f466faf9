//! Main application state and user actions
//!
//! Failures of save, backup and restore are reported as warnings and leave
//! the in-memory newsletter as it was.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::{
    config::AppConfig,
    document::Newsletter,
    render::HtmlRenderer,
    store::{BackupPaths, Store},
};

/// What to do when the data file exists but cannot be loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorruptPolicy {
    /// Move the file aside and start with an empty newsletter
    Quarantine,
    /// Leave the file alone and stop
    #[default]
    Abort,
}

/// Main application state
pub struct NewsletterApp {
    /// Application configuration
    pub config: AppConfig,
    store: Store,
    renderer: HtmlRenderer,
    newsletter: Newsletter,
}

impl NewsletterApp {
    /// Resolve paths and load the working newsletter from the data file.
    pub fn start(config: AppConfig, base_dir: &Path, policy: CorruptPolicy) -> Result<Self> {
        let store = Store::new(config.resolve(base_dir));
        let renderer = HtmlRenderer::new().with_escaping(config.escape_html);

        let newsletter = match store.autoload() {
            Ok(data) => Newsletter::from_data(data),
            Err(e) => {
                let kind = e.kind();
                match policy {
                    CorruptPolicy::Quarantine => {
                        tracing::warn!("Failed to load newsletter ({}): {}", kind, e);
                        let moved = store
                            .quarantine_corrupt()
                            .context("Failed to move unreadable data file aside")?;
                        tracing::info!("Starting empty, old data kept at {}", moved.display());
                        Newsletter::new()
                    }
                    CorruptPolicy::Abort => {
                        return Err(anyhow::Error::new(e)
                            .context(format!("Data file could not be loaded ({kind})")));
                    }
                }
            }
        };

        Ok(Self {
            config,
            store,
            renderer,
            newsletter,
        })
    }

    pub fn newsletter(&self) -> &Newsletter {
        &self.newsletter
    }

    pub fn newsletter_mut(&mut self) -> &mut Newsletter {
        &mut self.newsletter
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Autosave the working newsletter. Returns whether it was written.
    pub fn save(&self) -> bool {
        match self.store.autosave(&self.newsletter.to_plain_data()) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Autosave failed: {}", e);
                false
            }
        }
    }

    /// Write a named JSON + HTML backup of the working newsletter.
    pub fn backup(&self) -> Option<BackupPaths> {
        match self
            .store
            .save_backup(&self.newsletter.to_plain_data(), &self.renderer)
        {
            Ok(paths) => Some(paths),
            Err(e) => {
                tracing::warn!("Backup failed: {}", e);
                None
            }
        }
    }

    /// Replace the working newsletter with a backup and autosave it.
    /// The current newsletter is untouched if the backup cannot be read.
    pub fn restore(&mut self, path: &Path) -> bool {
        match self.store.load_backup(path) {
            Ok(data) => {
                self.newsletter.from_plain_data(data);
                self.save()
            }
            Err(e) => {
                tracing::warn!("Restore failed ({}): {}", e.kind(), e);
                false
            }
        }
    }

    /// Backup files available for restore
    pub fn backups(&self) -> Vec<PathBuf> {
        self.store.list_backups()
    }

    /// Render the working newsletter. Never fails, see [`HtmlRenderer::render`].
    pub fn render(&self) -> String {
        self.renderer.render(&self.newsletter.to_plain_data())
    }

    /// Save, render and write the output page, then optionally open it.
    pub fn generate(&self, open_in_browser: bool) -> Result<PathBuf> {
        self.save();

        let html = self.render();
        let path = self
            .store
            .write_output(&html)
            .context("Failed to write newsletter page")?;

        if open_in_browser {
            if let Err(e) = open::that(&path) {
                tracing::warn!("Failed to open {} in browser: {}", path.display(), e);
            }
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document::{NewsletterData, SectionData};
    use std::fs;
    use tempfile::TempDir;

    fn start(dir: &TempDir, policy: CorruptPolicy) -> Result<NewsletterApp> {
        NewsletterApp::start(AppConfig::default(), dir.path(), policy)
    }

    #[test]
    fn test_start_without_data_file() {
        let dir = TempDir::new().unwrap();
        let app = start(&dir, CorruptPolicy::Abort).unwrap();
        assert!(app.newsletter().sections().is_empty());
    }

    #[test]
    fn test_start_with_corrupt_file_abort() {
        let dir = TempDir::new().unwrap();
        let data_file = dir.path().join("newsletter_data.json");
        fs::write(&data_file, "garbage").unwrap();

        let err = start(&dir, CorruptPolicy::Abort).err().unwrap();
        assert!(err.to_string().contains("parse failure"));
        assert_eq!(fs::read_to_string(&data_file).unwrap(), "garbage");
    }

    #[test]
    fn test_start_with_corrupt_file_quarantine() {
        let dir = TempDir::new().unwrap();
        let data_file = dir.path().join("newsletter_data.json");
        fs::write(&data_file, "garbage").unwrap();

        let app = start(&dir, CorruptPolicy::Quarantine).unwrap();
        assert!(app.newsletter().sections().is_empty());
        assert!(!data_file.exists());

        let kept = fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().starts_with("newsletter_data.json.bak_"))
            .count();
        assert_eq!(kept, 1);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let mut app = start(&dir, CorruptPolicy::Abort).unwrap();
        app.newsletter_mut().header.main_title = "Weekly".to_string();
        app.newsletter_mut().new_section(None);
        assert!(app.save());

        let reloaded = start(&dir, CorruptPolicy::Abort).unwrap();
        assert_eq!(
            reloaded.newsletter().to_plain_data(),
            app.newsletter().to_plain_data()
        );
    }

    #[test]
    fn test_save_failure_keeps_document() {
        let dir = TempDir::new().unwrap();
        let mut app = start(&dir, CorruptPolicy::Abort).unwrap();
        fs::create_dir_all(dir.path().join("newsletter_data.json")).unwrap();

        app.newsletter_mut().header.main_title = "Unsaved".to_string();
        app.newsletter_mut().new_section(None);
        let before = app.newsletter().to_plain_data();

        assert!(!app.save());
        assert_eq!(app.newsletter().to_plain_data(), before);
        assert_eq!(app.newsletter().header.main_title, "Unsaved");
    }

    #[test]
    fn test_backup_failure_returns_none() {
        let dir = TempDir::new().unwrap();
        let app = start(&dir, CorruptPolicy::Abort).unwrap();
        fs::create_dir_all(dir.path().join("backups/untitled_no-issue_no-date.html")).unwrap();

        assert!(app.backup().is_none());
        assert!(dir.path().join("backups/untitled_no-issue_no-date.json").is_file());
    }

    #[test]
    fn test_restore_failure_keeps_state() {
        let dir = TempDir::new().unwrap();
        let mut app = start(&dir, CorruptPolicy::Abort).unwrap();
        app.newsletter_mut().new_section(None);
        let before = app.newsletter().to_plain_data();

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{").unwrap();
        assert!(!app.restore(&broken));
        assert!(!app.restore(&dir.path().join("missing.json")));
        assert_eq!(app.newsletter().to_plain_data(), before);
    }

    #[test]
    fn test_backup_then_restore_replaces() {
        let dir = TempDir::new().unwrap();
        let mut app = start(&dir, CorruptPolicy::Abort).unwrap();
        app.newsletter_mut().header.issue_no = "3".to_string();
        app.newsletter_mut().new_section(Some(SectionData {
            title: "Kept".to_string(),
            ..SectionData::default()
        }));
        let snapshot = app.newsletter().to_plain_data();
        let paths = app.backup().unwrap();
        assert!(paths.html.exists());
        assert_eq!(app.backups(), vec![paths.json.clone()]);

        app.newsletter_mut().from_plain_data(NewsletterData::default());
        assert!(app.restore(&paths.json));
        assert_eq!(app.newsletter().to_plain_data(), snapshot);

        // Restored content is autosaved as the working copy.
        let stored = app.store().autoload().unwrap();
        assert_eq!(stored, snapshot);
    }

    #[test]
    fn test_generate_writes_output() {
        let dir = TempDir::new().unwrap();
        let mut app = start(&dir, CorruptPolicy::Abort).unwrap();
        app.newsletter_mut().header.main_title = "Weekly".to_string();

        let path = app.generate(false).unwrap();
        assert_eq!(path, dir.path().join("newsletter.html"));
        let html = fs::read_to_string(&path).unwrap();
        assert_eq!(html, app.render());
        assert!(dir.path().join("newsletter_data.json").exists());
    }

    #[test]
    fn test_escaping_follows_config() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig {
            escape_html: true,
            ..AppConfig::default()
        };
        let mut app = NewsletterApp::start(config, dir.path(), CorruptPolicy::Abort).unwrap();
        app.newsletter_mut().header.main_title = "<i>x</i>".to_string();
        assert!(app.render().contains("&lt;i&gt;x&lt;/i&gt;"));
    }
}
