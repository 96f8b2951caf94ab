use scraper::{ElementRef, Html};

/// Elements whose text never belongs to the readable content
const SKIPPED_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "template", "head", "nav", "header", "footer", "aside",
];

/// Readable text of a serialized HTML document, one text run per line
pub fn extract_text(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    let document = Html::parse_document(html);
    let mut runs = Vec::new();
    collect_text(document.root_element(), &mut runs);
    runs.join("\n")
}

fn collect_text(element: ElementRef<'_>, runs: &mut Vec<String>) {
    if SKIPPED_ELEMENTS.contains(&element.value().name()) {
        return;
    }

    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
            if !text.is_empty() {
                runs.push(text);
            }
        } else if let Some(child) = ElementRef::wrap(child) {
            collect_text(child, runs);
        }
    }
}
