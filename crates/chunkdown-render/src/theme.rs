use ratatui::style::Style;

/// Styles used by the segment renderers. Chat-oriented: prose, inline code,
/// code blocks with a gutter, and muted chrome (scrollbar, gutter, labels).
#[derive(Clone, Debug)]
pub struct Theme {
    pub text_primary: Style,
    pub text_muted: Style,
    pub accent: Style,
    pub inline_code: Style,
    pub code: Style,
    pub code_gutter: Style,
}

impl Default for Theme {
    fn default() -> Self {
        use ratatui::style::Stylize;

        Self {
            text_primary: Style::default(),
            text_muted: Style::default().dark_gray(),
            accent: Style::default().cyan(),
            inline_code: Style::default().cyan(),
            code: Style::default(),
            code_gutter: Style::default().dark_gray(),
        }
    }
}
