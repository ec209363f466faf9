//! HTML rendering of a newsletter snapshot
//!
//! Output is a single self-contained page: header band with the issue badge,
//! then one card per section. Rendering is deterministic, the same snapshot
//! always yields the same bytes.
//!
//! User text is inserted verbatim unless escaping is switched on with
//! [`HtmlRenderer::with_escaping`]. Markup typed into a title or body ends up
//! in the page as markup.

use std::borrow::Cow;
use std::fmt::Write;

use super::color;
use super::document::{ContentData, Header, NewsletterData, SectionData};
use super::error::RenderError;

/// Keeps empty title cells from collapsing.
const EMPTY_PLACEHOLDER: &str = "&nbsp;";

/// Returned by [`HtmlRenderer::render`] when rendering fails.
pub const FALLBACK_HTML: &str = "<html><body><h1>HTML generation error</h1></body></html>";

const STYLESHEET: &str = "body{font-family:'Noto Sans KR',sans-serif;margin:0;background-color:#f0f2f5;color:#333}\
.header{display:flex;justify-content:space-between;align-items:center;background-image:url('your_header_img_here.jpg');\
background-size:cover;background-position:center;padding:20px 40px;color:white;min-height:150px;position:relative;z-index:1}\
.header::before{content:'';position:absolute;top:0;left:0;right:0;bottom:0;background-color:rgba(0,0,0,0.4);z-index:2}\
.header .logo,.header .issue-info{z-index:3;position:relative}\
.header .logo-text{font-size:2.5em;font-weight:bold;text-shadow:2px 2px 4px rgba(0,0,0,0.7)}\
.header .issue-info{font-size:1.2em;background-color:#f1b34a;padding:8px 15px;border-radius:5px;position:absolute;right:40px;bottom:20px}\
.container{padding:20px}\
.info-card{display:flex;width:100%;max-width:800px;margin:25px auto;border-radius:10px;overflow:hidden;\
box-shadow:0 4px 12px rgba(0,0,0,0.1);background-color:#fff}\
.card-sidebar{display:flex;justify-content:center;align-items:center;flex-shrink:0;width:70px;padding:20px 0;\
writing-mode:vertical-rl;text-orientation:mixed;color:white;font-size:1.5em;font-weight:700;letter-spacing:2px;\
text-align:center;transition:all 0.3s ease}\
.card-main{flex-grow:1;display:flex;flex-direction:column}\
.main-header{padding:12px 20px;color:white;font-size:1.2em;font-weight:700}\
.main-content{padding:20px;line-height:1.8}\
.content-item{margin-bottom:20px;border-bottom:1px solid #eee;padding-bottom:15px}\
.content-item:last-child{border-bottom:none;margin-bottom:0;padding-bottom:0}\
.content-item-title{font-size:1.1em;font-weight:500;margin-bottom:8px}\
.content-item-body{color:#555}\
a{text-decoration:none;color:inherit}\
a:hover{text-decoration:underline}\
@media (max-width:768px){.header{padding:20px 15px}.header .logo-text{font-size:2em}\
.header .issue-info{font-size:1em;padding:6px 10px;right:15px;bottom:15px}.container{padding:15px 10px}\
.info-card{flex-direction:column;margin:15px auto;border-left:none}\
.card-sidebar{writing-mode:horizontal-tb;text-orientation:initial;width:auto;padding:10px 15px;justify-content:flex-start;font-size:1.3em}\
.main-content{padding:15px}}";

/// Page title: `{main_title}_{issue_no}_{issue_date}`, empty parts allowed.
pub fn html_title(header: &Header) -> String {
    format!(
        "{}_{}_{}",
        header.main_title, header.issue_no, header.issue_date
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Renders newsletter snapshots to HTML
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer {
    escape: bool,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Escape user text before inserting it. Off by default.
    pub fn with_escaping(mut self, escape: bool) -> Self {
        self.escape = escape;
        self
    }

    fn text<'a>(&self, value: &'a str) -> Cow<'a, str> {
        if self.escape {
            Cow::Owned(escape_html(value))
        } else {
            Cow::Borrowed(value)
        }
    }

    fn text_or_placeholder<'a>(&self, value: &'a str) -> Cow<'a, str> {
        if value.is_empty() {
            Cow::Borrowed(EMPTY_PLACEHOLDER)
        } else {
            self.text(value)
        }
    }

    /// Render `data`, falling back to [`FALLBACK_HTML`] on failure.
    pub fn render(&self, data: &NewsletterData) -> String {
        or_fallback(self.try_render(data))
    }

    pub fn try_render(&self, data: &NewsletterData) -> Result<String, RenderError> {
        let mut sections_html = String::new();
        for section in &data.sections {
            self.write_section(&mut sections_html, section)?;
        }

        let header = &data.header;
        let title = html_title(header);
        let html_title = self.text(&title);
        let main_title = self.text(&header.main_title);
        let issue_no = self.text(&header.issue_no);
        let issue_date = self.text(&header.issue_date);

        let mut page = String::with_capacity(STYLESHEET.len() + sections_html.len() + 1024);
        write!(
            page,
            "\n<!DOCTYPE html><html lang=\"ko\"><head><meta charset=\"UTF-8\">\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\"><title>{html_title}</title>\
<link href=\"https://fonts.googleapis.com/css2?family=Noto+Sans+KR:wght@400;500;700&display=swap\" rel=\"stylesheet\">\
<style>{STYLESHEET}</style></head><body><header class=\"header\"><div class=\"logo\">\
<span class=\"logo-text\">{main_title}</span></div><div class=\"issue-info\">No. {issue_no} / {issue_date}</div>\
</header><main class=\"container\">{sections_html}</main></body></html>\n"
        )?;

        tracing::debug!(
            "Rendered {} sections into {} bytes",
            data.sections.len(),
            page.len()
        );
        Ok(page)
    }

    fn write_section(&self, out: &mut String, section: &SectionData) -> Result<(), RenderError> {
        let sidebar_title = self.text(&section.sidebar_title);
        let section_title = self.text_or_placeholder(&section.title);
        let raw_color = self.text(&section.color);
        let color = color::section_color(&raw_color);

        let mut contents_html = String::new();
        for content in &section.contents {
            self.write_content(&mut contents_html, content, color)?;
        }

        write!(
            out,
            "\n<div class=\"info-card\" style=\"border-left:5px solid {color};\">\
<div class=\"card-sidebar\" style=\"background-color:{color};\">{sidebar_title}</div>\
<div class=\"card-main\"><div class=\"main-header\" style=\"background-color:{color};\">{section_title}</div>\
<div class=\"main-content\">{contents_html}</div></div></div>\n"
        )?;
        Ok(())
    }

    fn write_content(
        &self,
        out: &mut String,
        content: &ContentData,
        section_color: &str,
    ) -> Result<(), RenderError> {
        let font_weight = if content.is_bold { "bold" } else { "normal" };
        let own_color = self.text(&content.color);
        let color = color::effective_color(&own_color, section_color);
        let content_title = self.text_or_placeholder(&content.title);

        let mut content_body = self.text(&content.body).replace('\n', "<br>");
        if !content.link.is_empty() {
            let link = self.text(&content.link);
            write!(
                content_body,
                "<p style=\"margin-top:15px;text-align:right;font-size:0.9em;\">\
<a href=\"{link}\" target=\"_blank\" style=\"color:{color};font-weight:500;text-decoration:none;\
border-bottom:1px solid {color};padding-bottom:2px;\">Go to link &rarr;</a></p>"
            )?;
        }

        write!(
            out,
            "\n<div class=\"content-item\"><div class=\"content-item-title\" \
style=\"color:{color};font-weight:{font_weight};\">{content_title}</div>\
<div class=\"content-item-body\">{content_body}</div></div>\n"
        )?;
        Ok(())
    }
}

/// Writing into a `String` never fails today, so this only triggers if
/// a fragment writer starts returning its own errors.
fn or_fallback(result: Result<String, RenderError>) -> String {
    match result {
        Ok(html) => html,
        Err(e) => {
            tracing::error!("HTML generation failed: {}", e);
            FALLBACK_HTML.to_string()
        }
    }
}
