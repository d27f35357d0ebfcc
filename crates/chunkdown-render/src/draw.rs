use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;
use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

use crate::viewport::ViewportState;

/// Draws spans at `(x, y)` clipped to `max_cols`, expanding tabs to four
/// cells and never emitting a half-visible wide character.
pub fn render_spans_clipped(
    x: u16,
    y: u16,
    max_cols: u16,
    buf: &mut Buffer,
    spans: &[Span<'static>],
    fallback_style: Style,
) {
    if max_cols == 0 {
        return;
    }

    let max_cols = max_cols as usize;
    let mut out_cols = 0usize;
    let mut dx = 0u16;
    let mut tmp = [0u8; 4];

    for span in spans {
        let style = if span.style == Style::default() {
            fallback_style
        } else {
            span.style
        };
        for ch in span.content.chars() {
            if ch == '\t' {
                for _ in 0..4 {
                    if out_cols + 1 > max_cols {
                        return;
                    }
                    if let Some(cell) = buf.cell_mut((x + dx, y)) {
                        cell.set_style(style);
                        cell.set_symbol(" ");
                    }
                    dx += 1;
                    out_cols += 1;
                }
                continue;
            }

            let w = UnicodeWidthChar::width(ch).unwrap_or(0);
            if w == 0 {
                continue;
            }
            if out_cols + w > max_cols {
                return;
            }

            let s = ch.encode_utf8(&mut tmp);
            if let Some(cell) = buf.cell_mut((x + dx, y)) {
                cell.set_style(style);
                cell.set_symbol(s);
            }
            dx += 1;
            out_cols += w;

            // wide char: blank the shadowed trailing cell
            if w == 2 {
                if let Some(cell) = buf.cell_mut((x + dx, y)) {
                    cell.set_style(style);
                    cell.set_symbol("");
                }
                dx += 1;
            }
        }
    }
}

pub fn render_scrollbar(area: Rect, buf: &mut Buffer, state: &ViewportState, style: Style) {
    buf.set_style(area, style);
    if area.height == 0 {
        return;
    }
    if state.content_h <= state.viewport_h as u32 || state.content_h == 0 {
        for dy in 0..area.height {
            buf.set_stringn(area.x, area.y + dy, " ", 1, style);
        }
        return;
    }

    let track_h = area.height as f64;
    let thumb_h = ((state.viewport_h as f64 / state.content_h as f64) * track_h)
        .round()
        .clamp(1.0, track_h) as u16;

    let max_y = state.max_y().max(1) as f64;
    let thumb_top = ((state.y as f64 / max_y) * (track_h - thumb_h as f64))
        .round()
        .clamp(0.0, (track_h - thumb_h as f64).max(0.0)) as u16;

    for dy in 0..area.height {
        let ch = if dy >= thumb_top && dy < thumb_top + thumb_h {
            "█"
        } else {
            " "
        };
        buf.set_stringn(area.x, area.y + dy, ch, 1, style);
    }
}

pub fn line_width(line: &Line<'_>) -> usize {
    line.spans
        .iter()
        .map(|s| UnicodeWidthStr::width(s.content.as_ref()))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_symbols(buf: &Buffer, w: u16) -> String {
        (0..w)
            .map(|x| buf.cell((x, 0)).unwrap().symbol().to_string())
            .collect()
    }

    #[test]
    fn clips_at_max_cols() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 8, 1));
        render_spans_clipped(
            0,
            0,
            3,
            &mut buf,
            &[Span::raw("abcdef")],
            Style::default(),
        );
        assert!(row_symbols(&buf, 8).starts_with("abc "));
    }

    #[test]
    fn expands_tabs_to_four_cells() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 8, 1));
        render_spans_clipped(0, 0, 8, &mut buf, &[Span::raw("\tx")], Style::default());
        assert!(row_symbols(&buf, 8).starts_with("    x"));
    }

    #[test]
    fn never_splits_a_wide_character() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 4, 1));
        render_spans_clipped(0, 0, 3, &mut buf, &[Span::raw("你好")], Style::default());
        // second wide char does not fit in the remaining single column
        assert_eq!(buf.cell((0, 0)).unwrap().symbol(), "你");
        assert_eq!(buf.cell((2, 0)).unwrap().symbol(), " ");
    }

    #[test]
    fn scrollbar_renders_without_panic() {
        let mut state = ViewportState::default();
        state.set_viewport(5);
        state.set_content(50);
        let mut buf = Buffer::empty(Rect::new(0, 0, 1, 5));
        render_scrollbar(Rect::new(0, 0, 1, 5), &mut buf, &state, Style::default());
    }
}
