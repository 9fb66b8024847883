//! Plain text outline renderer.

use crate::model::{Element, Presentation, Slide};

/// Options for [`to_text`].
#[derive(Debug, Clone, Default)]
pub struct TextOptions {
    /// Emit a `--- Slide N: name ---` header before each slide
    pub slide_headers: bool,
    /// Include hidden slides
    pub include_hidden: bool,
}

impl TextOptions {
    pub fn with_slide_headers(mut self, headers: bool) -> Self {
        self.slide_headers = headers;
        self
    }

    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }
}

/// Render the text of every slide, in slide order.
pub fn to_text(presentation: &Presentation, options: &TextOptions) -> String {
    let mut output = String::new();

    for slide in &presentation.slides {
        if slide.hidden && !options.include_hidden {
            continue;
        }
        if !output.is_empty() {
            output.push('\n');
        }
        if options.slide_headers {
            output.push_str(&format!("--- Slide {}: {} ---\n", slide.number, slide.name));
        }
        render_slide(slide, &mut output);
    }

    output.trim_end().to_string()
}

fn render_slide(slide: &Slide, output: &mut String) {
    for element in &slide.elements {
        render_element(element, output);
    }
}

fn render_element(element: &Element, output: &mut String) {
    if let Some(body) = element.text_body() {
        for para in &body.paragraphs {
            let text = para.plain_text();
            if text.trim().is_empty() {
                continue;
            }
            // Indent outline levels so nested bullets stay readable
            for _ in 0..para.level {
                output.push_str("  ");
            }
            if para.is_list_item() {
                output.push_str("- ");
            }
            output.push_str(text.trim_end());
            output.push('\n');
        }
    }
    for child in element.children() {
        render_element(child, output);
    }
}
