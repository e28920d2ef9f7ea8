// Extractor page: view states and HTML rendering
// Author: kelexine (https://github.com/kelexine)

use crate::error::ExtractorError;
use crate::extractor::{self, InvoiceModel, SYSTEM_PROMPT};
use crate::vision::{package, ImageFormat, Upload};
use pulldown_cmark::{html, Event, Options, Parser};
use tracing::{info, warn};

pub const PAGE_TITLE: &str = "Multi-Language Invoice Extractor";
pub const HEADER: &str = "Multi-Language Invoice Extractor 🤖";
pub const SUBHEADER: &str = "Powered by Google Gemini";
pub const NO_IMAGE_WARNING: &str = "Please upload an invoice image first.";
pub const RESPONSE_HEADING: &str = "The Response is";
pub const BUSY_TEXT: &str = "Analyzing Invoice...";
pub const PREVIEW_CAPTION: &str = "Uploaded Invoice.";

/// What the page shows after a user action.
///
/// The upload preview and the busy indicator live in the browser: the picker
/// previews the chosen file with FileReader, and the submit script shows the
/// spinner while the fetch is in flight. Every state renders both hidden.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    /// Nothing submitted yet.
    Idle,
    /// Submit without an image. Not an error.
    Warning { message: String },
    /// Model answer, Markdown source.
    Success { response: String },
    Failed { message: String },
}

impl ViewState {
    /// Metrics label.
    pub fn outcome(&self) -> &'static str {
        match self {
            ViewState::Idle => "idle",
            ViewState::Warning { .. } => "warning",
            ViewState::Success { .. } => "success",
            ViewState::Failed { .. } => "failed",
        }
    }

    /// Render the whole page. `prompt` is echoed back into the text input.
    pub fn render(&self, prompt: &str) -> String {
        let result = match self {
            ViewState::Warning { message } => {
                format!(r#"<div class="warning">{}</div>"#, escape_html(message))
            }
            ViewState::Success { response } => format!(
                r#"<h3>{}</h3><div class="response">{}</div>"#,
                RESPONSE_HEADING,
                render_markdown(response)
            ),
            ViewState::Failed { message } => format!(
                r#"<div class="error">An error occurred: {}</div>"#,
                escape_html(message)
            ),
            ViewState::Idle => String::new(),
        };

        format!(
            include_str!("page.html"),
            title = PAGE_TITLE,
            header = HEADER,
            subheader = SUBHEADER,
            prompt = escape_html(prompt),
            accept = ImageFormat::ACCEPT,
            preview_caption = PREVIEW_CAPTION,
            busy_text = BUSY_TEXT,
            result = result,
        )
    }
}

/// Handle one submit: guard, package, infer, and fold every failure into a view.
///
/// Without an image the model is never called.
pub async fn submit(model: &dyn InvoiceModel, upload: Upload, prompt: &str) -> ViewState {
    let image = match package(upload) {
        Ok(image) => image,
        Err(ExtractorError::MissingInput(_)) => {
            info!("Submit without an invoice image");
            return ViewState::Warning {
                message: NO_IMAGE_WARNING.to_string(),
            };
        }
        Err(e) => {
            return ViewState::Failed {
                message: e.to_string(),
            }
        }
    };

    info!(
        "Analyzing invoice: {} bytes, mime={}, model={}",
        image.bytes().len(),
        image.mime_type(),
        model.model_name()
    );

    match extractor::infer(model, SYSTEM_PROMPT, image, prompt).await {
        Ok(response) => ViewState::Success { response },
        Err(e) => {
            warn!("Invoice analysis failed: {}", e);
            ViewState::Failed {
                message: e.to_string(),
            }
        }
    }
}

/// Markdown answer to HTML. Raw HTML in the source is emitted as text, so the
/// model cannot inject markup into the page.
pub fn render_markdown(input: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let events = Parser::new_ext(input, options).map(|event| match event {
        Event::Html(raw) => Event::Text(raw),
        other => other,
    });

    let mut out = String::with_capacity(input.len() * 3 / 2);
    html::push_html(&mut out, events);
    out
}

/// Minimal HTML escaping for text and attribute values.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_page_has_form_controls() {
        let html = ViewState::Idle.render("");
        assert!(html.contains("<title>Multi-Language Invoice Extractor</title>"));
        assert!(html.contains(SUBHEADER));
        assert!(html.contains(r#"accept=".jpg,.jpeg,.png,image/jpeg,image/png""#));
        assert!(html.contains("Tell me about the invoice"));
        assert!(!html.contains(RESPONSE_HEADING));
    }

    #[test]
    fn test_every_state_carries_hidden_busy_indicator() {
        let states = [
            ViewState::Idle,
            ViewState::Warning {
                message: NO_IMAGE_WARNING.to_string(),
            },
            ViewState::Success {
                response: "ok".to_string(),
            },
            ViewState::Failed {
                message: "boom".to_string(),
            },
        ];
        for state in states {
            let html = state.render("");
            assert!(html.contains(r#"<div id="busy" class="busy" hidden>"#));
            assert!(html.contains(BUSY_TEXT));
            assert!(html.contains(r#"<figure id="preview" hidden>"#));
            assert!(!html.contains("<button type=\"submit\" id=\"submit\" disabled"));
        }
    }

    #[test]
    fn test_submit_script_keeps_the_chosen_file() {
        let html = ViewState::Idle.render("");
        assert!(html.contains("event.preventDefault()"));
        assert!(html.contains("new FormData(form)"));
        assert!(html.contains(r#"getElementById("result")"#));
    }

    #[test]
    fn test_failed_page_escapes_message() {
        let html = ViewState::Failed {
            message: "<script>alert(1)</script>".to_string(),
        }
        .render("q");
        assert!(html.contains("An error occurred: &lt;script&gt;"));
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(!html.contains(RESPONSE_HEADING));
    }

    #[test]
    fn test_prompt_is_echoed_escaped() {
        let html = ViewState::Idle.render("\"total\" & tax");
        assert!(html.contains("value=\"&quot;total&quot; &amp; tax\""));
    }

    #[test]
    fn test_success_page_renders_markdown_response() {
        let html = ViewState::Success {
            response: "**Total**: 120.00\n\n- VAT: 20.00\n- Net: 100.00".to_string(),
        }
        .render("");
        assert!(html.contains("<h3>The Response is</h3>"));
        assert!(html.contains("<strong>Total</strong>: 120.00"));
        assert!(html.contains("<li>VAT: 20.00</li>"));
        assert!(!html.contains("src=\"data:"));
    }

    #[test]
    fn test_markdown_escapes_raw_html() {
        let block = render_markdown("<script>alert(1)</script>");
        assert!(block.contains("&lt;script&gt;"));
        assert!(!block.contains("<script>"));

        let inline = render_markdown("**Total** <img src=x onerror=alert(1)> 5");
        assert!(inline.contains("<strong>Total</strong>"));
        assert!(inline.contains("&lt;img"));
        assert!(!inline.contains("<img"));
    }

    #[test]
    fn test_markdown_tables() {
        let html = render_markdown("| Item | Amount |\n|---|---|\n| Paper | 12.00 |");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>Paper</td>"));
    }
}
