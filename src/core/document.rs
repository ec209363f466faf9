//! Newsletter document model: header, ordered sections and their content items

use serde::{Deserialize, Serialize};

use super::color;

/// Number of blank content items a fresh section starts with.
const DEFAULT_CONTENT_SLOTS: usize = 2;

/// Masthead fields. All free-form text, `issue_no` included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Header {
    pub main_title: String,
    pub issue_no: String,
    pub issue_date: String,
}

/// Session-local handle for a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectionId(pub u64);

/// Session-local handle for a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentId(pub u64);

/// Serializable snapshot of a whole newsletter, the unit of persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsletterData {
    pub header: Header,
    pub sections: Vec<SectionData>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionData {
    pub sidebar_title: String,
    pub title: String,
    pub color: String,
    pub contents: Vec<ContentData>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentData {
    pub title: String,
    pub body: String,
    pub link: String,
    pub is_bold: bool,
    /// Empty means "use the section color".
    pub color: String,
}

/// One titled entry inside a section
#[derive(Debug, Clone)]
pub struct ContentItem {
    id: ContentId,
    pub title: String,
    /// May contain newlines
    pub body: String,
    pub link: String,
    pub is_bold: bool,
    pub color: String,
}

impl ContentItem {
    fn new(id: ContentId) -> Self {
        Self::from_data(id, ContentData::default())
    }

    fn from_data(id: ContentId, data: ContentData) -> Self {
        Self {
            id,
            title: data.title,
            body: data.body,
            link: data.link,
            is_bold: data.is_bold,
            color: data.color,
        }
    }

    pub fn id(&self) -> ContentId {
        self.id
    }

    /// Color this item renders with inside `section`.
    pub fn effective_color<'a>(&'a self, section: &'a Section) -> &'a str {
        color::effective_color(&self.color, &section.color)
    }

    /// Swatch color for this item, falling back to the section's typed color
    /// and then to a neutral swatch when the value is malformed.
    pub fn preview_color<'a>(&'a self, section: &'a Section) -> &'a str {
        if self.color.is_empty() {
            color::preview_color(&section.color)
        } else {
            color::preview_color(&self.color)
        }
    }

    pub fn to_plain_data(&self) -> ContentData {
        ContentData {
            title: self.title.clone(),
            body: self.body.trim().to_string(),
            link: self.link.clone(),
            is_bold: self.is_bold,
            color: self.color.clone(),
        }
    }
}

/// A styled card grouping content items under a sidebar label, title and color
#[derive(Debug, Clone)]
pub struct Section {
    id: SectionId,
    pub sidebar_title: String,
    pub title: String,
    /// User typed, not validated
    pub color: String,
    contents: Vec<ContentItem>,
}

impl Section {
    pub fn id(&self) -> SectionId {
        self.id
    }

    /// Content items in display order
    pub fn contents(&self) -> &[ContentItem] {
        &self.contents
    }

    pub fn content(&self, id: ContentId) -> Option<&ContentItem> {
        self.contents.iter().find(|c| c.id == id)
    }

    pub fn content_mut(&mut self, id: ContentId) -> Option<&mut ContentItem> {
        self.contents.iter_mut().find(|c| c.id == id)
    }

    /// Id of the content item at display position `index` (0-based).
    pub fn content_id_at(&self, index: usize) -> Option<ContentId> {
        self.contents.get(index).map(ContentItem::id)
    }

    pub fn preview_color(&self) -> &str {
        color::preview_color(&self.color)
    }

    pub fn to_plain_data(&self) -> SectionData {
        SectionData {
            sidebar_title: self.sidebar_title.clone(),
            title: self.title.clone(),
            color: self.color.clone(),
            contents: self.contents.iter().map(ContentItem::to_plain_data).collect(),
        }
    }
}

/// The working newsletter. Owns its sections, which own their content items.
#[derive(Debug, Clone, Default)]
pub struct Newsletter {
    pub header: Header,
    sections: Vec<Section>,
    /// Last issued id. Never rewinds, so ids are not reused within a session.
    last_id: u64,
}

impl Newsletter {
    /// Create an empty newsletter
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a newsletter from a stored snapshot
    pub fn from_data(data: NewsletterData) -> Self {
        let mut newsletter = Self::new();
        newsletter.from_plain_data(data);
        newsletter
    }

    fn next_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }

    fn build_content(&mut self, data: ContentData) -> ContentItem {
        let id = ContentId(self.next_id());
        ContentItem::from_data(id, data)
    }

    fn build_section(&mut self, data: SectionData) -> Section {
        let id = SectionId(self.next_id());
        let contents = data
            .contents
            .into_iter()
            .map(|content| self.build_content(content))
            .collect();
        Section {
            id,
            sidebar_title: data.sidebar_title,
            title: data.title,
            color: data.color,
            contents,
        }
    }

    /// Sections in display order
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn section_mut(&mut self, id: SectionId) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.id == id)
    }

    /// Id of the section at display position `index` (0-based).
    pub fn section_id_at(&self, index: usize) -> Option<SectionId> {
        self.sections.get(index).map(Section::id)
    }

    /// Append a section.
    ///
    /// Without initial data the section gets the next palette color and two
    /// blank content items. With initial data the fields are copied as given,
    /// except that an empty color is replaced by the next palette color.
    pub fn new_section(&mut self, initial: Option<SectionData>) -> &mut Section {
        let palette = color::palette_color(self.sections.len());

        let section = match initial {
            Some(data) => {
                let mut section = self.build_section(data);
                if section.color.is_empty() {
                    section.color = palette.to_string();
                }
                section
            }
            None => {
                let mut section = self.build_section(SectionData {
                    color: palette.to_string(),
                    ..SectionData::default()
                });
                for _ in 0..DEFAULT_CONTENT_SLOTS {
                    let id = ContentId(self.next_id());
                    section.contents.push(ContentItem::new(id));
                }
                section
            }
        };

        let index = self.sections.len();
        self.sections.push(section);
        &mut self.sections[index]
    }

    /// Append a content item to `section`. Returns `None` if the section is gone.
    pub fn add_content(
        &mut self,
        section: SectionId,
        initial: Option<ContentData>,
    ) -> Option<&mut ContentItem> {
        let position = self.sections.iter().position(|s| s.id == section)?;
        let item = self.build_content(initial.unwrap_or_default());
        let contents = &mut self.sections[position].contents;
        contents.push(item);
        contents.last_mut()
    }

    /// Remove a section together with all of its content items.
    pub fn remove_section(&mut self, id: SectionId) -> Option<Section> {
        let position = self.sections.iter().position(|s| s.id == id)?;
        Some(self.sections.remove(position))
    }

    pub fn remove_content(&mut self, section: SectionId, content: ContentId) -> Option<ContentItem> {
        let section = self.section_mut(section)?;
        let position = section.contents.iter().position(|c| c.id == content)?;
        Some(section.contents.remove(position))
    }

    /// Snapshot for persistence and rendering. Content bodies are trimmed.
    pub fn to_plain_data(&self) -> NewsletterData {
        NewsletterData {
            header: self.header.clone(),
            sections: self.sections.iter().map(Section::to_plain_data).collect(),
        }
    }

    /// Replace the whole document with `data`. Fresh ids are issued and
    /// colors are kept exactly as stored.
    pub fn from_plain_data(&mut self, data: NewsletterData) {
        self.header = data.header;
        self.sections.clear();
        for section in data.sections {
            let section = self.build_section(section);
            self.sections.push(section);
        }
    }
}
