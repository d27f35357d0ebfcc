use ratatui::style::Color;
use ratatui::style::Style;
use ratatui::text::Span;

/// Syntax highlighting seam for code segments.
///
/// The view only calls a highlighter for **completed** code blocks; while a
/// block is still streaming its lines are drawn plain, so implementations
/// never see half-finished trailing lines and are free to keep per-call
/// parser state.
pub trait CodeHighlighter {
    fn highlight_lines(&self, language: Option<&str>, lines: &[&str]) -> Vec<Vec<Span<'static>>>;

    fn highlight_text(&self, language: Option<&str>, text: &str) -> Vec<Vec<Span<'static>>> {
        let mut lines: Vec<&str> = text.split('\n').collect();
        if lines.is_empty() {
            lines.push("");
        }
        self.highlight_lines(language, &lines)
    }

    fn background_color(&self) -> Option<Color> {
        None
    }
}

/// Pass-through backend: every line becomes a single unstyled span.
pub struct NoHighlight;

impl CodeHighlighter for NoHighlight {
    fn highlight_lines(&self, _language: Option<&str>, lines: &[&str]) -> Vec<Vec<Span<'static>>> {
        lines
            .iter()
            .map(|l| vec![Span::styled((*l).to_string(), Style::default())])
            .collect()
    }
}
