//! Markdown → HTML for generated pitches.

use pulldown_cmark::{Event, Options, Parser, html};

/// Render model output to HTML.
///
/// Raw inline/block HTML in the model output is dropped before rendering;
/// the caller injects the result straight into a page.
#[must_use]
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options).filter_map(|event| match event {
        Event::Html(_) | Event::InlineHtml(_) => None,
        other => Some(other),
    });

    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}
