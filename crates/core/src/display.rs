//! Presentation helpers for content fields.

use std::collections::HashMap;

use folio_db::search::escape_html;
use once_cell::sync::Lazy;
use serde_json::Value;

use crate::content::{Content, Field, validate};

/// Where a field value ends up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayContext {
    /// Rendered as page content.
    #[default]
    View,
    /// Placed in an edit form.
    Edit,
}

static LANGUAGES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("ar", "Arabic"),
        ("de", "German"),
        ("el", "Greek"),
        ("en", "English"),
        ("es", "Spanish"),
        ("fa", "Persian"),
        ("fr", "French"),
        ("hi", "Hindi"),
        ("id", "Indonesian"),
        ("it", "Italian"),
        ("ja", "Japanese"),
        ("ko", "Korean"),
        ("ms", "Malay"),
        ("nl", "Dutch"),
        ("pl", "Polish"),
        ("pt", "Portuguese"),
        ("ru", "Russian"),
        ("sv", "Swedish"),
        ("th", "Thai"),
        ("tr", "Turkish"),
        ("uk", "Ukrainian"),
        ("vi", "Vietnamese"),
        ("zh", "Chinese"),
    ])
});

fn raw_text(content: &Content, field: Field) -> String {
    match content.value_of(field) {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Array(items) => items
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}

impl Content {
    /// Field value made safe for output.
    ///
    /// Plain fields are escaped once. HTML fields were sanitized on input
    /// and pass through unchanged in views; in edit forms they are escaped
    /// once more, since the form template escapes again.
    #[must_use]
    pub fn escape_for_xss(&self, field: Field, context: DisplayContext) -> String {
        let raw = raw_text(self, field);
        if field.is_html() && context == DisplayContext::View {
            raw
        } else {
            escape_html(&raw)
        }
    }

    /// Field value formatted for readers, escaped like a view.
    #[must_use]
    pub fn human_readable(&self, field: Field) -> String {
        match field {
            Field::Date => self
                .byline()
                .and_then(|b| b.date())
                .map(|d| d.format("%-d %B %Y").to_string())
                .unwrap_or_default(),
            Field::Rights => self
                .byline()
                .and_then(|b| validate::license_name(b.rights()))
                .unwrap_or_default()
                .to_string(),
            Field::FileSize => self
                .media_file()
                .map(|f| format_bytes(f.file_size()))
                .unwrap_or_default(),
            Field::Language => self
                .byline()
                .and_then(|b| b.language())
                .map(|code| {
                    LANGUAGES
                        .get(code)
                        .map_or_else(|| escape_html(code), |name| (*name).to_string())
                })
                .unwrap_or_default(),
            Field::Online => (if self.online() { "Online" } else { "Offline" }).to_string(),
            _ => self.escape_for_xss(field, DisplayContext::View),
        }
    }
}

/// Byte count in binary units with two decimals above a kilobyte.
#[must_use]
pub fn format_bytes(bytes: i64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{bytes} bytes");
    }
    let mut size = bytes as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{size:.2} {}", UNITS[unit])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::content::ContentType;
    use chrono::NaiveDate;

    #[test]
    fn test_plain_fields_escaped_once() {
        let mut content = Content::new(ContentType::Article);
        content.set_title("Fish & <Chips>").unwrap();

        let view = content.escape_for_xss(Field::Title, DisplayContext::View);
        let edit = content.escape_for_xss(Field::Title, DisplayContext::Edit);

        assert_eq!(view, "Fish &amp; &lt;Chips&gt;");
        assert_eq!(edit, view);
    }

    #[test]
    fn test_html_fields_escaped_only_for_forms() {
        let mut content = Content::new(ContentType::Article);
        content.set_description("<p>Hello</p>");

        assert_eq!(
            content.escape_for_xss(Field::Description, DisplayContext::View),
            "<p>Hello</p>"
        );
        assert_eq!(
            content.escape_for_xss(Field::Description, DisplayContext::Edit),
            "&lt;p&gt;Hello&lt;/p&gt;"
        );
    }

    #[test]
    fn test_absent_field_is_empty() {
        let content = Content::new(ContentType::Block);
        assert_eq!(content.escape_for_xss(Field::Teaser, DisplayContext::View), "");
        assert_eq!(content.human_readable(Field::Rights), "");
    }

    #[test]
    fn test_human_readable_values() {
        let mut content = Content::new(ContentType::Download);
        {
            let byline = content.byline_mut().unwrap();
            byline.set_date_value(NaiveDate::from_ymd_opt(2024, 3, 7).unwrap());
            byline.set_language("fr").unwrap();
            byline.set_rights(10).unwrap();
        }
        content.media_file_mut().unwrap().set_file_size(1536).unwrap();
        content.set_online(false);

        assert_eq!(content.human_readable(Field::Date), "7 March 2024");
        assert_eq!(content.human_readable(Field::Language), "French");
        assert_eq!(content.human_readable(Field::Rights), "Public domain");
        assert_eq!(content.human_readable(Field::FileSize), "1.50 KB");
        assert_eq!(content.human_readable(Field::Online), "Offline");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 bytes");
        assert_eq!(format_bytes(1024 * 1024 * 3), "3.00 MB");
    }
}
