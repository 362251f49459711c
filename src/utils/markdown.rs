use ammonia::Builder;
use comrak::{markdown_to_html, Options};
use std::collections::HashSet;

/// Render a note body from Markdown to sanitized HTML.
///
/// Notes are private, but content may be pasted from anywhere, so the HTML
/// comrak emits is always passed through ammonia before it is returned.
pub fn render_markdown(raw: &str) -> String {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.footnotes = true;
    options.render.hardbreaks = true;
    options.render.unsafe_ = true; // ammonia does the filtering

    sanitize_html(&markdown_to_html(raw, &options))
}

fn sanitize_html(html: &str) -> String {
    let extra_tags: HashSet<&str> = [
        "h1", "h2", "h3", "h4", "h5", "h6", "pre", "code", "blockquote", "hr", "table", "thead",
        "tbody", "tr", "th", "td", "input", "del", "sup", "section",
    ]
    .into_iter()
    .collect();

    let url_schemes: HashSet<&str> = ["http", "https", "mailto"].into_iter().collect();

    let mut builder = Builder::default();
    builder
        .add_tags(&extra_tags)
        .rm_tags(&["img"])
        .add_tag_attributes("a", &["href", "title"])
        .add_tag_attributes("code", &["class"])
        .add_tag_attributes("input", &["type", "checked", "disabled"])
        .add_tag_attributes("td", &["align"])
        .add_tag_attributes("th", &["align"])
        .url_schemes(url_schemes)
        .link_rel(Some("noopener noreferrer"));

    builder.clean(html).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_and_emphasis() {
        let html = render_markdown("# Groceries\n\nbuy **milk**");
        assert!(html.contains("<h1>Groceries</h1>"));
        assert!(html.contains("<strong>milk</strong>"));
    }

    #[test]
    fn line_breaks_are_kept() {
        let html = render_markdown("line one\nline two");
        assert!(html.contains("<br"));
    }

    #[test]
    fn checklist_renders_checkboxes() {
        let html = render_markdown("- [x] call mum\n- [ ] book dentist");
        assert!(html.contains("<input"));
        assert!(html.contains("checked"));
    }

    #[test]
    fn script_is_stripped() {
        let html = render_markdown("hi <script>alert('x')</script>");
        assert!(!html.contains("<script>"));
        assert!(!html.contains("alert"));
    }

    #[test]
    fn javascript_links_are_stripped() {
        let html = render_markdown("[x](javascript:alert(1))");
        assert!(!html.contains("javascript:"));
    }

    #[test]
    fn images_are_not_allowed() {
        let html = render_markdown("![pic](https://example.com/a.png)");
        assert!(!html.contains("<img"));
    }

    #[test]
    fn empty_note() {
        assert!(render_markdown("").trim().is_empty());
    }
}
