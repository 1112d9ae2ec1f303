#![warn(missing_docs)]
//! # paper-analyzer-render
//!
//! ## Purpose
//! Turns the model's markdown answer into something a person can read.
//!
//! ## Responsibilities
//! - Parse markdown with the GFM extensions the model uses (tables,
//!   strikethrough, task lists) into a [`Document`] tree.
//! - Lay the tree out as plain terminal text ([`Document::to_terminal`]).
//! - Produce escaped HTML and a standalone HTML report.
//!
//! ## Error model
//! None. Every input renders. Constructs without a dedicated node (raw HTML,
//! images, footnotes, math) degrade to plain text.
//!
//! ## Example
//! ```rust
//! use paper_analyzer_render::{Block, render};
//!
//! let document = render("# Result\n\nBody");
//! assert!(matches!(document.blocks[0], Block::Heading { level: 1, .. }));
//! ```

use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};

/// Column alignment in a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    /// No alignment given.
    None,
    /// Left aligned.
    Left,
    /// Centered.
    Center,
    /// Right aligned.
    Right,
}

impl From<pulldown_cmark::Alignment> for Alignment {
    fn from(value: pulldown_cmark::Alignment) -> Self {
        match value {
            pulldown_cmark::Alignment::None => Self::None,
            pulldown_cmark::Alignment::Left => Self::Left,
            pulldown_cmark::Alignment::Center => Self::Center,
            pulldown_cmark::Alignment::Right => Self::Right,
        }
    }
}

/// Inline content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    /// Plain text.
    Text(String),
    /// Inline code span.
    Code(String),
    /// Emphasized content.
    Emphasis(Vec<Inline>),
    /// Strong content.
    Strong(Vec<Inline>),
    /// Struck-through content.
    Strikethrough(Vec<Inline>),
    /// Hyperlink.
    Link {
        /// Link target.
        href: String,
        /// Link text.
        content: Vec<Inline>,
    },
    /// Soft line break.
    SoftBreak,
    /// Hard line break.
    HardBreak,
}

/// One list item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    /// Task state for task-list items.
    pub checked: Option<bool>,
    /// Item body.
    pub blocks: Vec<Block>,
}

/// Block content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Section heading.
    Heading {
        /// Level 1 to 6.
        level: u8,
        /// Heading text.
        content: Vec<Inline>,
    },
    /// Paragraph.
    Paragraph(Vec<Inline>),
    /// Ordered (`start` set) or bullet list.
    List {
        /// First number of an ordered list.
        start: Option<u64>,
        /// Items in order.
        items: Vec<ListItem>,
    },
    /// Table with a header row.
    Table {
        /// Per-column alignment.
        alignments: Vec<Alignment>,
        /// Header cells.
        header: Vec<Vec<Inline>>,
        /// Body rows.
        rows: Vec<Vec<Vec<Inline>>>,
    },
    /// Block quote.
    Quote(Vec<Block>),
    /// Code block.
    Code {
        /// Fence info string, if any.
        language: Option<String>,
        /// Code text.
        text: String,
    },
    /// Thematic break.
    Rule,
}

/// Rendered markdown tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Top-level blocks in order.
    pub blocks: Vec<Block>,
}

fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Parses markdown into a [`Document`]. Never fails.
pub fn render(markup: &str) -> Document {
    let mut builder = TreeBuilder::default();
    for event in Parser::new_ext(markup, options()) {
        builder.event(event);
    }
    builder.finish()
}

/// Renders markdown to an HTML fragment.
///
/// Raw HTML in the input is escaped and shown as text. Link and image
/// targets with a scheme other than http, https or mailto become `#`.
pub fn to_html(markup: &str) -> String {
    let events = Parser::new_ext(markup, options()).map(|event| match event {
        Event::Html(html) | Event::InlineHtml(html) => Event::Text(html),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        other => other,
    });
    let mut out = String::with_capacity(markup.len() * 3 / 2);
    pulldown_cmark::html::push_html(&mut out, events);
    out
}

const SAFE_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

/// Keeps relative URLs and allowed schemes; anything else becomes `#`.
fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    // Browsers ignore whitespace and control characters inside a scheme.
    let compact: String = url
        .chars()
        .filter(|ch| !ch.is_ascii_whitespace() && !ch.is_control())
        .collect();
    let scheme_end = compact.find(|ch: char| matches!(ch, ':' | '/' | '?' | '#'));

    match scheme_end {
        Some(end) if compact[end..].starts_with(':') => {
            let scheme = compact[..end].to_ascii_lowercase();
            if SAFE_SCHEMES.contains(&scheme.as_str()) {
                url
            } else {
                CowStr::Borrowed("#")
            }
        }
        _ => url,
    }
}

/// Wraps [`to_html`] output in a standalone page.
pub fn html_report(title: &str, markup: &str) -> String {
    let escaped_title = escape_html(title);

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{escaped_title}</title>\n<style>{REPORT_STYLE}</style>\n</head>\n<body>\n\
         <main>\n<h1 class=\"report-title\">{escaped_title}</h1>\n{}</main>\n</body>\n</html>\n",
        to_html(markup)
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

const REPORT_STYLE: &str = "body{background:#111827;color:#e5e7eb;font-family:system-ui,sans-serif;line-height:1.6}\
main{max-width:960px;margin:2rem auto;padding:0 1rem}\
h1,h2,h3,h4{color:#38bdf8}\
a{color:#60a5fa}\
table{border-collapse:collapse;width:100%}\
th,td{border:1px solid #4b5563;padding:.75rem;vertical-align:top}\
th{background:rgba(55,65,81,.5)}\
blockquote{border-left:4px solid #2563eb;margin-left:0;padding-left:1rem}\
code{background:#1f2937;padding:.1rem .3rem;border-radius:4px}";

enum BlockFrame {
    Root(Vec<Block>),
    Quote(Vec<Block>),
    List {
        start: Option<u64>,
        items: Vec<ListItem>,
    },
    Item(ListItem),
    Table {
        alignments: Vec<Alignment>,
        header: Vec<Vec<Inline>>,
        rows: Vec<Vec<Vec<Inline>>>,
        row: Vec<Vec<Inline>>,
    },
}

enum InlineFrame {
    Paragraph { implicit: bool, content: Vec<Inline> },
    Heading { level: u8, content: Vec<Inline> },
    Cell(Vec<Inline>),
    Emphasis(Vec<Inline>),
    Strong(Vec<Inline>),
    Strikethrough(Vec<Inline>),
    Link { href: String, content: Vec<Inline> },
    Code { language: Option<String>, text: String },
}

impl InlineFrame {
    fn content_mut(&mut self) -> Option<&mut Vec<Inline>> {
        match self {
            Self::Paragraph { content, .. }
            | Self::Heading { content, .. }
            | Self::Cell(content)
            | Self::Emphasis(content)
            | Self::Strong(content)
            | Self::Strikethrough(content)
            | Self::Link { content, .. } => Some(content),
            Self::Code { .. } => None,
        }
    }
}

struct TreeBuilder {
    blocks: Vec<BlockFrame>,
    inlines: Vec<InlineFrame>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self {
            blocks: vec![BlockFrame::Root(Vec::new())],
            inlines: Vec::new(),
        }
    }
}

impl TreeBuilder {
    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.text(text),
            Event::Code(code) => self.push_inline(Inline::Code(code.into_string())),
            Event::Html(html) | Event::InlineHtml(html) => self.text(html),
            Event::FootnoteReference(label) => self.push_inline(Inline::Text(format!("[^{label}]"))),
            Event::SoftBreak => self.push_inline(Inline::SoftBreak),
            Event::HardBreak => self.push_inline(Inline::HardBreak),
            Event::Rule => {
                self.close_implicit();
                self.push_block(Block::Rule);
            }
            Event::TaskListMarker(checked) => {
                if let Some(BlockFrame::Item(item)) = self.blocks.last_mut() {
                    item.checked = Some(checked);
                }
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                self.close_implicit();
                self.inlines.push(InlineFrame::Paragraph {
                    implicit: false,
                    content: Vec::new(),
                });
            }
            Tag::Heading { level, .. } => {
                self.close_implicit();
                self.inlines.push(InlineFrame::Heading {
                    level: level as u8,
                    content: Vec::new(),
                });
            }
            Tag::BlockQuote { .. } => {
                self.close_implicit();
                self.blocks.push(BlockFrame::Quote(Vec::new()));
            }
            Tag::CodeBlock(kind) => {
                self.close_implicit();
                let language = match kind {
                    CodeBlockKind::Fenced(info) if !info.trim().is_empty() => {
                        Some(info.trim().to_string())
                    }
                    _ => None,
                };
                self.inlines.push(InlineFrame::Code {
                    language,
                    text: String::new(),
                });
            }
            Tag::List(start) => {
                self.close_implicit();
                self.blocks.push(BlockFrame::List {
                    start,
                    items: Vec::new(),
                });
            }
            Tag::Item => {
                self.close_implicit();
                self.blocks.push(BlockFrame::Item(ListItem {
                    checked: None,
                    blocks: Vec::new(),
                }));
            }
            Tag::Table(alignments) => {
                self.close_implicit();
                self.blocks.push(BlockFrame::Table {
                    alignments: alignments.into_iter().map(Alignment::from).collect(),
                    header: Vec::new(),
                    rows: Vec::new(),
                    row: Vec::new(),
                });
            }
            Tag::TableHead | Tag::TableRow => {
                if let Some(BlockFrame::Table { row, .. }) = self.blocks.last_mut() {
                    row.clear();
                }
            }
            Tag::TableCell => self.inlines.push(InlineFrame::Cell(Vec::new())),
            Tag::Emphasis => self.inlines.push(InlineFrame::Emphasis(Vec::new())),
            Tag::Strong => self.inlines.push(InlineFrame::Strong(Vec::new())),
            Tag::Strikethrough => self.inlines.push(InlineFrame::Strikethrough(Vec::new())),
            Tag::Link { dest_url, .. } => self.inlines.push(InlineFrame::Link {
                href: dest_url.into_string(),
                content: Vec::new(),
            }),
            // Images, footnote definitions, HTML blocks and the rest are
            // transparent: their text flows into the surrounding content.
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.close_inline_block(),
            TagEnd::Heading { .. } => self.close_inline_block(),
            TagEnd::CodeBlock { .. } => self.close_inline_block(),
            TagEnd::BlockQuote { .. } => {
                self.close_implicit();
                if let Some(BlockFrame::Quote(blocks)) = self.pop_block_frame() {
                    self.push_block(Block::Quote(blocks));
                }
            }
            TagEnd::List { .. } => {
                self.close_implicit();
                if let Some(BlockFrame::List { start, items }) = self.pop_block_frame() {
                    self.push_block(Block::List { start, items });
                }
            }
            TagEnd::Item => {
                self.close_implicit();
                if let Some(BlockFrame::Item(item)) = self.pop_block_frame() {
                    match self.blocks.last_mut() {
                        Some(BlockFrame::List { items, .. }) => items.push(item),
                        _ => {
                            for block in item.blocks {
                                self.push_block(block);
                            }
                        }
                    }
                }
            }
            TagEnd::TableCell => {
                if let Some(InlineFrame::Cell(cell)) = self.pop_inline_frame() {
                    if let Some(BlockFrame::Table { row, .. }) = self.blocks.last_mut() {
                        row.push(cell);
                    }
                }
            }
            TagEnd::TableHead => {
                if let Some(BlockFrame::Table { header, row, .. }) = self.blocks.last_mut() {
                    *header = std::mem::take(row);
                }
            }
            TagEnd::TableRow => {
                if let Some(BlockFrame::Table { rows, row, .. }) = self.blocks.last_mut() {
                    rows.push(std::mem::take(row));
                }
            }
            TagEnd::Table => {
                if let Some(BlockFrame::Table {
                    alignments,
                    header,
                    rows,
                    ..
                }) = self.pop_block_frame()
                {
                    self.push_block(Block::Table {
                        alignments,
                        header,
                        rows,
                    });
                }
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link => {
                if let Some(frame) = self.pop_inline_frame() {
                    let inline = match frame {
                        InlineFrame::Emphasis(content) => Inline::Emphasis(content),
                        InlineFrame::Strong(content) => Inline::Strong(content),
                        InlineFrame::Strikethrough(content) => Inline::Strikethrough(content),
                        InlineFrame::Link { href, content } => Inline::Link { href, content },
                        other => {
                            // Unbalanced input; put the frame back untouched.
                            self.inlines.push(other);
                            return;
                        }
                    };
                    self.push_inline(inline);
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: CowStr<'_>) {
        if let Some(InlineFrame::Code { text: code, .. }) = self.inlines.last_mut() {
            code.push_str(&text);
            return;
        }
        self.push_inline(Inline::Text(text.into_string()));
    }

    fn push_inline(&mut self, inline: Inline) {
        let needs_paragraph = match self.inlines.last_mut() {
            Some(frame) => frame.content_mut().is_none(),
            None => true,
        };
        if needs_paragraph {
            if let Some(InlineFrame::Code { text, .. }) = self.inlines.last_mut() {
                text.push_str(&inline_text(std::slice::from_ref(&inline)));
                return;
            }
            self.inlines.push(InlineFrame::Paragraph {
                implicit: true,
                content: Vec::new(),
            });
        }

        if let Some(content) = self.inlines.last_mut().and_then(InlineFrame::content_mut) {
            content.push(inline);
        }
    }

    fn push_block(&mut self, block: Block) {
        match self.blocks.last_mut() {
            Some(BlockFrame::Root(blocks))
            | Some(BlockFrame::Quote(blocks))
            | Some(BlockFrame::Item(ListItem { blocks, .. })) => blocks.push(block),
            Some(BlockFrame::List { items, .. }) => items.push(ListItem {
                checked: None,
                blocks: vec![block],
            }),
            Some(BlockFrame::Table { rows, .. }) => {
                rows.push(vec![vec![Inline::Text(block_text(&block))]]);
            }
            None => self.blocks.push(BlockFrame::Root(vec![block])),
        }
    }

    fn pop_block_frame(&mut self) -> Option<BlockFrame> {
        // The root frame is never popped.
        if self.blocks.len() > 1 {
            self.blocks.pop()
        } else {
            None
        }
    }

    fn pop_inline_frame(&mut self) -> Option<InlineFrame> {
        self.inlines.pop()
    }

    /// Closes every open inline frame down to and including the nearest
    /// block-level one, flattening unclosed spans into their parent.
    fn close_inline_block(&mut self) {
        while let Some(frame) = self.inlines.pop() {
            let block = match frame {
                InlineFrame::Paragraph { content, .. } => Block::Paragraph(content),
                InlineFrame::Heading { level, content } => Block::Heading { level, content },
                InlineFrame::Code { language, text } => Block::Code { language, text },
                InlineFrame::Cell(content)
                | InlineFrame::Emphasis(content)
                | InlineFrame::Strong(content)
                | InlineFrame::Strikethrough(content)
                | InlineFrame::Link { content, .. } => {
                    for inline in content {
                        self.push_inline(inline);
                    }
                    continue;
                }
            };
            self.push_block(block);
            return;
        }
    }

    fn close_implicit(&mut self) {
        let has_implicit = self
            .inlines
            .iter()
            .any(|frame| matches!(frame, InlineFrame::Paragraph { implicit: true, .. }));
        if has_implicit {
            self.close_inline_block();
        }
    }

    fn finish(mut self) -> Document {
        while !self.inlines.is_empty() {
            self.close_inline_block();
        }
        while self.blocks.len() > 1 {
            let block = match self.blocks.pop() {
                Some(BlockFrame::Quote(blocks)) => Block::Quote(blocks),
                Some(BlockFrame::List { start, items }) => Block::List { start, items },
                Some(BlockFrame::Item(item)) => Block::List {
                    start: None,
                    items: vec![item],
                },
                Some(BlockFrame::Table {
                    alignments,
                    header,
                    rows,
                    ..
                }) => Block::Table {
                    alignments,
                    header,
                    rows,
                },
                Some(BlockFrame::Root(blocks)) => Block::Quote(blocks),
                None => break,
            };
            self.push_block(block);
        }

        match self.blocks.pop() {
            Some(BlockFrame::Root(blocks)) => Document { blocks },
            _ => Document::default(),
        }
    }
}

/// Flattens inlines into plain text with light markers.
pub fn inline_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    for inline in inlines {
        match inline {
            Inline::Text(text) => out.push_str(text),
            Inline::Code(code) => {
                out.push('`');
                out.push_str(code);
                out.push('`');
            }
            Inline::Emphasis(content) => {
                out.push('_');
                out.push_str(&inline_text(content));
                out.push('_');
            }
            Inline::Strong(content) => out.push_str(&inline_text(content)),
            Inline::Strikethrough(content) => {
                out.push('~');
                out.push_str(&inline_text(content));
                out.push('~');
            }
            Inline::Link { href, content } => {
                let text = inline_text(content);
                if text == *href || text.is_empty() {
                    out.push_str(href);
                } else {
                    out.push_str(&format!("{text} <{href}>"));
                }
            }
            Inline::SoftBreak => out.push(' '),
            Inline::HardBreak => out.push('\n'),
        }
    }
    out
}

fn block_text(block: &Block) -> String {
    match block {
        Block::Heading { content, .. } | Block::Paragraph(content) => inline_text(content),
        Block::Code { text, .. } => text.clone(),
        Block::Rule => String::new(),
        Block::List { items, .. } => items
            .iter()
            .flat_map(|item| item.blocks.iter().map(block_text))
            .collect::<Vec<_>>()
            .join(" "),
        Block::Quote(blocks) => blocks.iter().map(block_text).collect::<Vec<_>>().join(" "),
        Block::Table { header, rows, .. } => std::iter::once(header)
            .chain(rows.iter())
            .map(|row| {
                row.iter()
                    .map(|cell| inline_text(cell))
                    .collect::<Vec<_>>()
                    .join(" | ")
            })
            .collect::<Vec<_>>()
            .join(" "),
    }
}

impl Document {
    /// Lays the document out as plain text wrapped at `width` columns.
    ///
    /// Tables are never wrapped.
    pub fn to_terminal(&self, width: usize) -> String {
        let width = width.max(20);
        let mut lines = Vec::new();
        layout_blocks(&self.blocks, width, &mut lines);
        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

fn layout_blocks(blocks: &[Block], width: usize, lines: &mut Vec<String>) {
    for (position, block) in blocks.iter().enumerate() {
        if position > 0 {
            lines.push(String::new());
        }
        layout_block(block, width, lines);
    }
}

fn layout_block(block: &Block, width: usize, lines: &mut Vec<String>) {
    match block {
        Block::Heading { level, content } => {
            let text = inline_text(content);
            match level {
                1 => {
                    lines.push(text.clone());
                    lines.push("=".repeat(text.chars().count().min(width)));
                }
                2 => {
                    lines.push(text.clone());
                    lines.push("-".repeat(text.chars().count().min(width)));
                }
                _ => lines.push(format!("{} {text}", "#".repeat(usize::from(*level)))),
            }
        }
        Block::Paragraph(content) => {
            for line in inline_text(content).split('\n') {
                lines.extend(wrap(line, width));
            }
        }
        Block::List { start, items } => {
            for (offset, item) in items.iter().enumerate() {
                let mut marker = match start {
                    Some(first) => format!("{}. ", first + offset as u64),
                    None => "- ".to_string(),
                };
                match item.checked {
                    Some(true) => marker.push_str("[x] "),
                    Some(false) => marker.push_str("[ ] "),
                    None => {}
                }

                let indent = " ".repeat(marker.chars().count());
                let mut body = Vec::new();
                layout_blocks(
                    &item.blocks,
                    width.saturating_sub(indent.len()).max(10),
                    &mut body,
                );
                if body.is_empty() {
                    body.push(String::new());
                }
                for (index, line) in body.into_iter().enumerate() {
                    let prefix = if index == 0 { &marker } else { &indent };
                    if line.is_empty() {
                        lines.push(prefix.trim_end().to_string());
                    } else {
                        lines.push(format!("{prefix}{line}"));
                    }
                }
            }
        }
        Block::Table {
            alignments,
            header,
            rows,
        } => layout_table(alignments, header, rows, lines),
        Block::Quote(blocks) => {
            let mut body = Vec::new();
            layout_blocks(blocks, width.saturating_sub(2).max(10), &mut body);
            lines.extend(body.into_iter().map(|line| {
                if line.is_empty() {
                    ">".to_string()
                } else {
                    format!("> {line}")
                }
            }));
        }
        Block::Code { text, .. } => {
            lines.extend(text.trim_end_matches('\n').lines().map(|line| format!("    {line}")));
        }
        Block::Rule => lines.push("-".repeat(width)),
    }
}

fn layout_table(
    alignments: &[Alignment],
    header: &[Vec<Inline>],
    rows: &[Vec<Vec<Inline>>],
    lines: &mut Vec<String>,
) {
    let render_row = |row: &[Vec<Inline>]| -> Vec<String> {
        row.iter()
            .map(|cell| inline_text(cell).replace('\n', " "))
            .collect()
    };
    let header = render_row(header);
    let rows: Vec<Vec<String>> = rows.iter().map(|row| render_row(row)).collect();

    let columns = std::iter::once(header.len())
        .chain(rows.iter().map(Vec::len))
        .max()
        .unwrap_or(0);
    if columns == 0 {
        return;
    }

    let mut widths = vec![3_usize; columns];
    for row in std::iter::once(&header).chain(rows.iter()) {
        for (column, cell) in row.iter().enumerate() {
            widths[column] = widths[column].max(cell.chars().count());
        }
    }

    let format_row = |row: &[String]| -> String {
        let cells: Vec<String> = (0..columns)
            .map(|column| {
                let cell = row.get(column).map(String::as_str).unwrap_or("");
                let alignment = alignments.get(column).copied().unwrap_or(Alignment::None);
                pad(cell, widths[column], alignment)
            })
            .collect();
        format!("| {} |", cells.join(" | "))
    };

    lines.push(format_row(&header));
    let separator: Vec<String> = (0..columns)
        .map(|column| {
            let dashes = "-".repeat(widths[column]);
            match alignments.get(column).copied().unwrap_or(Alignment::None) {
                Alignment::Left => format!(":{}", &dashes[1..]),
                Alignment::Right => format!("{}:", &dashes[1..]),
                Alignment::Center => format!(":{}:", &dashes[2..]),
                Alignment::None => dashes,
            }
        })
        .collect();
    lines.push(format!("| {} |", separator.join(" | ")));
    for row in &rows {
        lines.push(format_row(row));
    }
}

fn pad(cell: &str, width: usize, alignment: Alignment) -> String {
    let fill = width.saturating_sub(cell.chars().count());
    match alignment {
        Alignment::Right => format!("{}{cell}", " ".repeat(fill)),
        Alignment::Center => {
            let left = fill / 2;
            format!("{}{cell}{}", " ".repeat(left), " ".repeat(fill - left))
        }
        Alignment::Left | Alignment::None => format!("{cell}{}", " ".repeat(fill)),
    }
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current_len > 0 && current_len + 1 + word_len > width {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    //! Unit tests for layout helpers.

    use super::*;

    #[test]
    fn wrap_breaks_on_word_boundaries() {
        assert_eq!(
            wrap("alpha beta gamma delta", 11),
            vec!["alpha beta", "gamma delta"]
        );
        assert_eq!(wrap("", 10), vec![String::new()]);
    }

    #[test]
    fn pad_respects_alignment() {
        assert_eq!(pad("ab", 4, Alignment::Right), "  ab");
        assert_eq!(pad("ab", 5, Alignment::Center), " ab  ");
        assert_eq!(pad("ab", 4, Alignment::None), "ab  ");
    }
}
