//! Prose rendering for text segments.
//!
//! Text segments carry ordinary Markdown (the segmenter only extracts fenced
//! code blocks). This module renders the common chat subset — paragraphs,
//! headings, emphasis, inline code, lists, block quotes, rules — into wrapped
//! [`Line`]s. Anything fancier degrades to plain styled text rather than
//! failing.

use pulldown_cmark::Event;
use pulldown_cmark::HeadingLevel;
use pulldown_cmark::Options;
use pulldown_cmark::Parser;
use pulldown_cmark::Tag;
use pulldown_cmark::TagEnd;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;
use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

use crate::theme::Theme;

/// Renders markdown prose into lines wrapped to `width` columns.
pub fn render_prose(markdown: &str, width: u16, theme: &Theme) -> Vec<Line<'static>> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    let parser = Parser::new_ext(markdown, options);

    let mut b = ProseBuilder::new(width, theme);
    for event in parser {
        match event {
            Event::Start(tag) => b.start_tag(tag),
            Event::End(tag) => b.end_tag(tag),
            Event::Text(text) => b.text(&text),
            Event::Code(code) => b.inline_code(&code),
            Event::SoftBreak => b.text(" "),
            Event::HardBreak => b.flush_line(),
            Event::Rule => b.rule(),
            Event::TaskListMarker(checked) => {
                b.text(if checked { "[x] " } else { "[ ] " });
            }
            Event::Html(html) | Event::InlineHtml(html) => b.text(&html),
            _ => {}
        }
    }
    b.finish()
}

#[derive(Clone, Copy, Debug, Default)]
struct InlineFlags {
    emphasis: bool,
    strong: bool,
    strike: bool,
    link: bool,
}

struct ListLevel {
    /// Next ordinal for ordered lists; `None` for bullet lists.
    next_index: Option<u64>,
}

struct ProseBuilder<'t> {
    theme: &'t Theme,
    width: u16,
    flags: InlineFlags,
    heading: bool,
    quote_depth: usize,
    lists: Vec<ListLevel>,
    /// Marker (`- `, `3. `) prepended to the next flushed line.
    marker: Option<String>,
    in_code_block: bool,
    current: Vec<Span<'static>>,
    out: Vec<Line<'static>>,
}

impl<'t> ProseBuilder<'t> {
    fn new(width: u16, theme: &'t Theme) -> Self {
        Self {
            theme,
            width,
            flags: InlineFlags::default(),
            heading: false,
            quote_depth: 0,
            lists: Vec::new(),
            marker: None,
            in_code_block: false,
            current: Vec::new(),
            out: Vec::new(),
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.blank_separator(),
            Tag::Heading { level, .. } => {
                self.blank_separator();
                self.heading = true;
                let hashes = match level {
                    HeadingLevel::H1 => "# ",
                    HeadingLevel::H2 => "## ",
                    HeadingLevel::H3 => "### ",
                    HeadingLevel::H4 => "#### ",
                    HeadingLevel::H5 => "##### ",
                    HeadingLevel::H6 => "###### ",
                };
                self.current.push(Span::styled(hashes, self.style()));
            }
            Tag::BlockQuote(_) => {
                self.blank_separator();
                self.quote_depth += 1;
            }
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.blank_separator();
                }
                self.lists.push(ListLevel { next_index: start });
            }
            Tag::Item => {
                let marker = match self.lists.last_mut().and_then(|l| l.next_index.as_mut()) {
                    Some(n) => {
                        let m = format!("{n}. ");
                        *n += 1;
                        m
                    }
                    None => "- ".to_string(),
                };
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                self.marker = Some(format!("{indent}{marker}"));
            }
            Tag::Emphasis => self.flags.emphasis = true,
            Tag::Strong => self.flags.strong = true,
            Tag::Strikethrough => self.flags.strike = true,
            Tag::Link { .. } => self.flags.link = true,
            Tag::CodeBlock(_) => {
                self.blank_separator();
                self.in_code_block = true;
            }
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.flush_line(),
            TagEnd::Heading(_) => {
                self.flush_line();
                self.heading = false;
            }
            TagEnd::BlockQuote(_) => {
                self.flush_line();
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            TagEnd::List(_) => {
                self.lists.pop();
            }
            TagEnd::Item => self.flush_line(),
            TagEnd::Emphasis => self.flags.emphasis = false,
            TagEnd::Strong => self.flags.strong = false,
            TagEnd::Strikethrough => self.flags.strike = false,
            TagEnd::Link => self.flags.link = false,
            TagEnd::CodeBlock => {
                self.flush_line();
                self.in_code_block = false;
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.in_code_block {
            // verbatim lines, no wrapping; empty spans keep blank code lines
            for (i, line) in text.split('\n').enumerate() {
                if i > 0 {
                    self.flush_line();
                }
                self.current
                    .push(Span::styled(line.to_string(), self.theme.inline_code));
            }
            return;
        }
        if text.is_empty() {
            return;
        }
        self.current.push(Span::styled(text.to_string(), self.style()));
    }

    fn inline_code(&mut self, code: &str) {
        self.current
            .push(Span::styled(code.to_string(), self.theme.inline_code));
    }

    fn rule(&mut self) {
        self.blank_separator();
        let cols = self.width.max(1) as usize;
        self.out.push(Line::from(Span::styled(
            "─".repeat(cols),
            self.theme.text_muted,
        )));
    }

    fn style(&self) -> Style {
        let mut style = if self.heading {
            self.theme.accent.add_modifier(Modifier::BOLD)
        } else if self.flags.link {
            self.theme.accent.add_modifier(Modifier::UNDERLINED)
        } else {
            self.theme.text_primary
        };
        if self.flags.emphasis {
            style = style.add_modifier(Modifier::ITALIC);
        }
        if self.flags.strong {
            style = style.add_modifier(Modifier::BOLD);
        }
        if self.flags.strike {
            style = style.add_modifier(Modifier::CROSSED_OUT);
        }
        style
    }

    /// Blank line between blocks, but never at the very top and never doubled.
    /// A pending list marker is left in place for the item's first real line.
    fn blank_separator(&mut self) {
        if !self.current.is_empty() {
            self.flush_line();
        }
        if matches!(self.out.last(), Some(l) if !l.spans.is_empty()) {
            self.out.push(Line::default());
        }
    }

    fn flush_line(&mut self) {
        if self.current.is_empty() && self.marker.is_none() {
            return;
        }
        let spans = std::mem::take(&mut self.current);

        let quote_prefix = "> ".repeat(self.quote_depth);
        let first_prefix = format!("{quote_prefix}{}", self.marker.take().unwrap_or_default());
        let rest_prefix = format!(
            "{quote_prefix}{}",
            " ".repeat(UnicodeWidthStr::width(first_prefix.as_str()) - UnicodeWidthStr::width(quote_prefix.as_str()))
        );

        let usable = (self.width as usize).saturating_sub(UnicodeWidthStr::width(first_prefix.as_str()));
        for (i, wrapped) in wrap_spans(&spans, usable.max(1)).into_iter().enumerate() {
            let prefix = if i == 0 { &first_prefix } else { &rest_prefix };
            let mut line_spans = Vec::with_capacity(wrapped.len() + 1);
            if !prefix.is_empty() {
                line_spans.push(Span::styled(prefix.clone(), self.theme.text_muted));
            }
            line_spans.extend(wrapped);
            self.out.push(Line::from(line_spans));
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush_line();
        while matches!(self.out.last(), Some(l) if l.spans.is_empty()) {
            self.out.pop();
        }
        self.out
    }
}

/// Greedy word wrap over styled spans. Leading whitespace on continuation
/// lines is dropped; a word longer than the line is split hard.
fn wrap_spans(spans: &[Span<'static>], max_cols: usize) -> Vec<Vec<Span<'static>>> {
    let mut lines: Vec<Vec<Span<'static>>> = Vec::new();
    let mut line: Vec<Span<'static>> = Vec::new();
    let mut cols = 0usize;

    let mut flush = |line: &mut Vec<Span<'static>>, cols: &mut usize| {
        trim_end(line);
        lines.push(std::mem::take(line));
        *cols = 0;
    };

    for (style, word, is_space) in tokenize(spans) {
        let w = UnicodeWidthStr::width(word.as_str());
        if is_space {
            if cols == 0 || cols + w > max_cols {
                continue;
            }
            push_span(&mut line, Span::styled(word, style));
            cols += w;
            continue;
        }

        if cols > 0 && cols + w > max_cols {
            flush(&mut line, &mut cols);
        }

        if w > max_cols {
            // hard split an overlong word
            let mut piece = String::new();
            let mut piece_w = 0usize;
            for ch in word.chars() {
                let cw = UnicodeWidthChar::width(ch).unwrap_or(0);
                if piece_w + cw > max_cols.saturating_sub(cols) && !piece.is_empty() {
                    push_span(&mut line, Span::styled(std::mem::take(&mut piece), style));
                    flush(&mut line, &mut cols);
                    piece_w = 0;
                }
                piece.push(ch);
                piece_w += cw;
            }
            if !piece.is_empty() {
                push_span(&mut line, Span::styled(piece, style));
                cols += piece_w;
            }
            continue;
        }

        push_span(&mut line, Span::styled(word, style));
        cols += w;
    }

    if !line.is_empty() {
        trim_end(&mut line);
        lines.push(line);
    }
    if lines.is_empty() {
        lines.push(Vec::new());
    }
    lines
}

fn trim_end(line: &mut Vec<Span<'static>>) {
    while let Some(last) = line.last_mut() {
        let trimmed = last.content.trim_end_matches(' ');
        if trimmed.is_empty() {
            line.pop();
            continue;
        }
        if trimmed.len() != last.content.len() {
            let owned = trimmed.to_string();
            last.content = owned.into();
        }
        break;
    }
}

fn push_span(line: &mut Vec<Span<'static>>, span: Span<'static>) {
    if let Some(last) = line.last_mut()
        && last.style == span.style
    {
        last.content.to_mut().push_str(span.content.as_ref());
        return;
    }
    line.push(span);
}

/// Splits spans into `(style, run, is_space)` tokens on whitespace
/// boundaries, normalizing tabs to spaces.
fn tokenize(spans: &[Span<'static>]) -> Vec<(Style, String, bool)> {
    let mut out = Vec::new();
    for span in spans {
        let content = span.content.replace('\t', "    ");
        let mut rest = content.as_str();
        while !rest.is_empty() {
            let is_space = rest.starts_with(' ');
            let split = rest
                .find(|c: char| (c == ' ') != is_space)
                .unwrap_or(rest.len());
            let (run, tail) = rest.split_at(split);
            out.push((span.style, run.to_string(), is_space));
            rest = tail;
        }
    }
    out
}
