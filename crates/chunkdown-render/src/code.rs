//! Code-block rendering for code segments.
//!
//! Two behaviors are gated on the segment's completion state, matching the
//! chat UX this renderer serves:
//!
//! - line numbers appear only once the closing fence has been seen, so the
//!   gutter does not jitter while the block is still growing;
//! - syntax highlighting runs only on completed blocks; a streaming block is
//!   drawn plain and re-drawn highlighted exactly once, on completion.

use chunkdown_core::CodeSegment;
use chunkdown_core::fence::normalize_language;
use ratatui::text::Line;
use ratatui::text::Span;

use crate::highlight::CodeHighlighter;
use crate::theme::Theme;

/// Language passed to the highlighter when a fence has no usable tag.
pub const FALLBACK_LANGUAGE: &str = "text";

#[derive(Clone, Debug)]
pub struct CodeRenderOptions {
    /// Show 1-based line numbers on completed blocks.
    pub show_line_numbers: bool,
    /// Separator between the gutter and the code (e.g. `" │ "`).
    pub line_number_separator: &'static str,
    /// Prepend a muted label line with the fence's language tag.
    pub show_language_label: bool,
}

impl Default for CodeRenderOptions {
    fn default() -> Self {
        Self {
            show_line_numbers: true,
            line_number_separator: " │ ",
            show_language_label: false,
        }
    }
}

/// Renders one code segment into styled lines.
pub fn render_code_segment(
    segment: &CodeSegment,
    highlighter: Option<&dyn CodeHighlighter>,
    theme: &Theme,
    options: &CodeRenderOptions,
) -> Vec<Line<'static>> {
    let lines = code_lines(&segment.code);
    let language = display_language(segment);

    let highlighted = match highlighter {
        Some(hi) if segment.is_completed => {
            Some(hi.highlight_text(Some(language.as_str()), &segment.code))
        }
        _ => None,
    };

    let gutter = options.show_line_numbers && segment.is_completed;
    let gutter_w = if gutter { digits(lines.len()).max(1) } else { 0 };

    let mut out: Vec<Line<'static>> = Vec::with_capacity(lines.len() + 1);

    if options.show_language_label {
        let label = if segment.is_completed {
            language.clone()
        } else {
            format!("{language} …")
        };
        out.push(Line::from(Span::styled(label, theme.text_muted)));
    }

    for (idx, raw) in lines.iter().enumerate() {
        let mut spans: Vec<Span<'static>> = Vec::new();

        if gutter {
            spans.push(Span::styled(
                format!(
                    "{:>width$}{}",
                    idx + 1,
                    options.line_number_separator,
                    width = gutter_w
                ),
                theme.code_gutter,
            ));
        }

        match highlighted.as_ref().and_then(|h| h.get(idx)) {
            Some(hl) => {
                for s in hl {
                    let mut s = s.clone();
                    s.style = theme.code.patch(s.style);
                    spans.push(s);
                }
            }
            None => spans.push(Span::styled(raw.clone(), theme.code)),
        }

        out.push(Line::from(spans));
    }

    out
}

/// The normalized language shown to highlighters and labels, with the
/// `"text"` fallback for tag-less fences.
pub fn display_language(segment: &CodeSegment) -> String {
    segment
        .lang
        .as_deref()
        .and_then(normalize_language)
        .unwrap_or_else(|| FALLBACK_LANGUAGE.to_string())
}

/// Code split into display lines. A trailing newline yields no phantom
/// empty line; completely empty code still renders one blank line.
fn code_lines(code: &str) -> Vec<String> {
    let trimmed = code.strip_suffix('\n').unwrap_or(code);
    let mut lines: Vec<String> = trimmed.split('\n').map(str::to_string).collect();
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn digits(mut n: usize) -> usize {
    if n == 0 {
        return 1;
    }
    let mut d = 0;
    while n > 0 {
        n /= 10;
        d += 1;
    }
    d
}
