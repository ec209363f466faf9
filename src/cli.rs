//! Command line editing surface
//!
//! Sections and content items are addressed by their 1-based position as
//! shown by `show`.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::app::NewsletterApp;
use crate::core::config::AppConfig;
use crate::core::document::{ContentData, ContentId, SectionData, SectionId};

#[derive(Parser)]
#[command(name = "newsletter", about = "Build and render multi-section newsletters", version)]
pub struct Cli {
    /// Directory the data, backup and output paths are relative to
    #[arg(long, global = true)]
    pub workdir: Option<PathBuf>,

    /// Config file to use instead of the platform default
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Move an unreadable data file aside and start empty
    #[arg(long, global = true)]
    pub recover: bool,

    /// Log debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the working newsletter
    Show,
    /// Set masthead fields
    Header {
        #[arg(long)]
        main_title: Option<String>,
        #[arg(long)]
        issue_no: Option<String>,
        #[arg(long)]
        issue_date: Option<String>,
    },
    /// Append a section. Without fields it starts with two blank items.
    AddSection(SectionFields),
    /// Change a section's fields
    EditSection {
        section: usize,
        #[command(flatten)]
        fields: SectionFields,
    },
    /// Remove a section and all of its items
    RemoveSection { section: usize },
    /// Append a content item to a section
    AddContent {
        section: usize,
        #[command(flatten)]
        fields: ContentFields,
    },
    /// Change a content item's fields
    EditContent {
        section: usize,
        content: usize,
        #[command(flatten)]
        fields: ContentFields,
    },
    /// Remove a content item
    RemoveContent { section: usize, content: usize },
    /// Render the page, write it and open it
    Generate {
        /// Do not open the page in the browser
        #[arg(long)]
        no_open: bool,
    },
    /// Save a named JSON + HTML backup
    Backup,
    /// List saved backups
    Backups,
    /// Replace the working newsletter with a backup
    Restore { path: PathBuf },
    /// Show the configuration in use
    Config {
        /// Write the configuration to the config file
        #[arg(long)]
        write: bool,
    },
}

#[derive(Args, Default)]
pub struct SectionFields {
    #[arg(long)]
    pub sidebar_title: Option<String>,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub color: Option<String>,
}

impl SectionFields {
    fn is_empty(&self) -> bool {
        self.sidebar_title.is_none() && self.title.is_none() && self.color.is_none()
    }
}

#[derive(Args, Default)]
pub struct ContentFields {
    #[arg(long)]
    pub title: Option<String>,
    /// Use `\n` in the shell string for line breaks
    #[arg(long)]
    pub body: Option<String>,
    #[arg(long)]
    pub link: Option<String>,
    /// Bold title
    #[arg(long, conflicts_with = "no_bold")]
    pub bold: bool,
    /// Regular title weight
    #[arg(long)]
    pub no_bold: bool,
    /// Empty inherits the section color
    #[arg(long)]
    pub color: Option<String>,
}

impl ContentFields {
    /// `None` when neither `--bold` nor `--no-bold` was given
    fn weight(&self) -> Option<bool> {
        match (self.bold, self.no_bold) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

fn set(target: &mut String, value: Option<String>) {
    if let Some(value) = value {
        *target = value;
    }
}

fn section_id(app: &NewsletterApp, position: usize) -> Result<SectionId> {
    position
        .checked_sub(1)
        .and_then(|index| app.newsletter().section_id_at(index))
        .with_context(|| format!("No section at position {position}"))
}

fn content_id(app: &NewsletterApp, section: SectionId, position: usize) -> Result<ContentId> {
    position
        .checked_sub(1)
        .and_then(|index| app.newsletter().section(section)?.content_id_at(index))
        .with_context(|| format!("No content item at position {position}"))
}

fn show(app: &NewsletterApp) {
    let newsletter = app.newsletter();
    let header = &newsletter.header;
    println!(
        "{} / No. {} / {}",
        header.main_title, header.issue_no, header.issue_date
    );
    for (i, section) in newsletter.sections().iter().enumerate() {
        println!(
            "\n[{}] {} | {} ({}, swatch {})",
            i + 1,
            section.sidebar_title,
            section.title,
            section.color,
            section.preview_color()
        );
        for (j, content) in section.contents().iter().enumerate() {
            let weight = if content.is_bold { " bold" } else { "" };
            println!(
                "  {}.{} {} ({}{})",
                i + 1,
                j + 1,
                content.title,
                content.effective_color(section),
                weight
            );
            for line in content.body.lines() {
                println!("      {line}");
            }
            if !content.link.is_empty() {
                println!("      -> {}", content.link);
            }
        }
    }
}

fn autosave(app: &NewsletterApp) -> Result<()> {
    if !app.save() {
        bail!("Changes could not be saved to {}", app.store().paths().data_file.display());
    }
    Ok(())
}

/// Run one command against the loaded app.
pub fn run(app: &mut NewsletterApp, command: Command, config_path: Option<PathBuf>) -> Result<()> {
    match command {
        Command::Show => show(app),
        Command::Header {
            main_title,
            issue_no,
            issue_date,
        } => {
            let header = &mut app.newsletter_mut().header;
            set(&mut header.main_title, main_title);
            set(&mut header.issue_no, issue_no);
            set(&mut header.issue_date, issue_date);
            autosave(app)?;
        }
        Command::AddSection(fields) => {
            let initial = (!fields.is_empty()).then(|| SectionData {
                sidebar_title: fields.sidebar_title.unwrap_or_default(),
                title: fields.title.unwrap_or_default(),
                color: fields.color.unwrap_or_default(),
                contents: Vec::new(),
            });
            app.newsletter_mut().new_section(initial);
            autosave(app)?;
            println!("Added section {}", app.newsletter().sections().len());
        }
        Command::EditSection { section, fields } => {
            let id = section_id(app, section)?;
            if let Some(section) = app.newsletter_mut().section_mut(id) {
                set(&mut section.sidebar_title, fields.sidebar_title);
                set(&mut section.title, fields.title);
                set(&mut section.color, fields.color);
            }
            autosave(app)?;
        }
        Command::RemoveSection { section } => {
            let id = section_id(app, section)?;
            app.newsletter_mut().remove_section(id);
            autosave(app)?;
        }
        Command::AddContent { section, fields } => {
            let id = section_id(app, section)?;
            let is_bold = fields.weight().unwrap_or(false);
            let initial = ContentData {
                title: fields.title.unwrap_or_default(),
                body: fields.body.unwrap_or_default().replace("\\n", "\n"),
                link: fields.link.unwrap_or_default(),
                is_bold,
                color: fields.color.unwrap_or_default(),
            };
            app.newsletter_mut().add_content(id, Some(initial));
            autosave(app)?;
        }
        Command::EditContent {
            section,
            content,
            fields,
        } => {
            let section_id = section_id(app, section)?;
            let content_id = content_id(app, section_id, content)?;
            if let Some(item) = app
                .newsletter_mut()
                .section_mut(section_id)
                .and_then(|s| s.content_mut(content_id))
            {
                if let Some(bold) = fields.weight() {
                    item.is_bold = bold;
                }
                set(&mut item.title, fields.title);
                set(&mut item.body, fields.body.map(|b| b.replace("\\n", "\n")));
                set(&mut item.link, fields.link);
                set(&mut item.color, fields.color);
            }
            autosave(app)?;
        }
        Command::RemoveContent { section, content } => {
            let section_id = section_id(app, section)?;
            let content_id = content_id(app, section_id, content)?;
            app.newsletter_mut().remove_content(section_id, content_id);
            autosave(app)?;
        }
        Command::Generate { no_open } => {
            let open = app.config.open_in_browser && !no_open;
            let path = app.generate(open)?;
            println!("Generated {}", path.display());
        }
        Command::Backup => match app.backup() {
            Some(paths) => println!("Saved backup {} and {}", paths.json.display(), paths.html.display()),
            None => bail!("Backup failed"),
        },
        Command::Backups => {
            for path in app.backups() {
                println!("{}", path.display());
            }
        }
        Command::Restore { path } => {
            if !app.restore(&path) {
                bail!("Could not restore from {}", path.display());
            }
            println!("Restored {}", path.display());
        }
        Command::Config { write } => {
            let paths = app.store().paths();
            println!("data file:   {}", paths.data_file.display());
            println!("backup dir:  {}", paths.backup_dir.display());
            println!("output file: {}", paths.output_file.display());
            println!("open in browser: {}", app.config.open_in_browser);
            println!("escape html: {}", app.config.escape_html);
            if write {
                let path = config_path
                    .or_else(AppConfig::config_path)
                    .context("Could not determine config directory")?;
                app.config.save_to(&path)?;
                println!("Wrote {}", path.display());
            }
        }
    }
    Ok(())
}
