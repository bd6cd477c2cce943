#![forbid(unsafe_code)]

//! Scrollable content documents.
//!
//! Content panels are laid out as a vertical [`Document`] of placed blocks.
//! The same document is used to draw the panel, to register click targets,
//! and to report the tops of reveal-marked blocks to the observer, so all
//! three agree on geometry for a given width and scroll offset.

use folio_core::geometry::Rect;
use folio_render::buffer::Buffer;
use folio_render::cell::{Cell, PackedRgba, StyleFlags};
use folio_render::drawing::{BorderChars, Draw};
use folio_render::text::{display_width, truncate_to_width, wrap};

use crate::contact::{ContactForm, Field, FormFocus};
use crate::layout::{HitMap, Target};
use crate::reveal::RevealObserver;
use crate::theme::Palette;

/// Opacity of a marked block that has not been revealed yet.
const PLACEHOLDER_OPACITY: f32 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tone {
    Title,
    Heading,
    Body,
    Muted,
    Accent(PackedRgba),
}

/// A bordered card: title row, optional meta row, body, optional tag row.
#[derive(Debug, Clone, PartialEq)]
pub struct CardSpec {
    pub title: String,
    /// Right-aligned on the title row (a year, a number).
    pub badge: Option<String>,
    pub meta: Option<String>,
    pub body: String,
    /// Maximum body rows; the last kept row is ellipsised.
    pub max_body_rows: usize,
    pub tags: Vec<String>,
    pub accent: PackedRgba,
    pub focused: bool,
}

impl CardSpec {
    pub fn new(title: impl Into<String>, body: impl Into<String>, accent: PackedRgba) -> Self {
        Self {
            title: title.into(),
            badge: None,
            meta: None,
            body: body.into(),
            max_body_rows: usize::MAX,
            tags: Vec::new(),
            accent,
            focused: false,
        }
    }

    #[must_use]
    pub fn badge(mut self, badge: impl Into<String>) -> Self {
        self.badge = Some(badge.into());
        self
    }

    #[must_use]
    pub fn meta(mut self, meta: impl Into<String>) -> Self {
        self.meta = Some(meta.into());
        self
    }

    #[must_use]
    pub fn tags(mut self, tags: &[String]) -> Self {
        self.tags = tags.to_vec();
        self
    }

    #[must_use]
    pub fn max_body_rows(mut self, rows: usize) -> Self {
        self.max_body_rows = rows.max(1);
        self
    }

    #[must_use]
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    fn body_lines(&self, inner_width: u16) -> Vec<String> {
        let mut lines = wrap(&self.body, usize::from(inner_width));
        if lines.len() > self.max_body_rows {
            lines.truncate(self.max_body_rows);
            if let Some(last) = lines.last_mut() {
                let cut = usize::from(inner_width).saturating_sub(1);
                *last = format!("{}…", truncate_to_width(last, cut).trim_end_matches('…'));
            }
        }
        lines
    }

    /// Rows needed at `width` columns, borders included.
    pub fn height(&self, width: u16) -> u16 {
        let inner = width.saturating_sub(4);
        let rows = 1 + usize::from(self.meta.is_some()) + self.body_lines(inner).len() + usize::from(!self.tags.is_empty());
        rows as u16 + 2
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    Text {
        lines: Vec<String>,
        tone: Tone,
        align: Align,
    },
    Card(CardSpec),
    /// Animated skill bar; `fill` is the fraction drawn this frame.
    Meter {
        label: String,
        level: u8,
        fill: f32,
        color: PackedRgba,
    },
    Input(Field),
    Button {
        label: &'static str,
        /// Fill colour; `None` uses the palette's button colours.
        accent: Option<PackedRgba>,
        focused: bool,
    },
}

/// A block placed in document space (column 0, row 0 is the document's top-left).
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub rect: Rect,
    pub kind: BlockKind,
    /// Index of the reveal node this block is, if marked.
    pub reveal: Option<usize>,
    pub target: Option<Target>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub blocks: Vec<Block>,
    pub height: u16,
    pub reveal_count: usize,
}

impl Document {
    /// Furthest scroll offset that still fills a `viewport` rows tall view.
    pub fn max_scroll(&self, viewport: u16) -> u16 {
        self.height.saturating_sub(viewport)
    }

    /// Top row of every reveal node relative to the viewport, indexed by node.
    pub fn reveal_tops(&self, scroll: u16) -> Vec<i32> {
        let mut tops = vec![i32::MAX; self.reveal_count];
        for block in &self.blocks {
            if let Some(index) = block.reveal
                && let Some(top) = tops.get_mut(index)
            {
                *top = i32::from(block.rect.y) - i32::from(scroll);
            }
        }
        tops
    }

    /// The first block carrying `target`.
    pub fn block_for(&self, target: Target) -> Option<&Block> {
        self.blocks.iter().find(|b| b.target == Some(target))
    }

    /// Where `rect` (document space) lands on screen, clipped to the view.
    pub fn to_screen(rect: Rect, view: Rect, scroll: u16) -> Rect {
        let top = rect.y.max(scroll);
        let bottom = rect.bottom().min(scroll.saturating_add(view.height));
        if top >= bottom {
            return Rect::default();
        }
        Rect::new(view.x + rect.x, view.y + (top - scroll), rect.width, bottom - top)
            .intersection(&view)
    }

    /// Register the visible part of every targeted block.
    pub fn register_hits(&self, view: Rect, scroll: u16, hits: &mut HitMap) {
        for block in &self.blocks {
            if let Some(target) = block.target {
                hits.push(Self::to_screen(block.rect, view, scroll), target);
            }
        }
    }

    /// Screen position of the text cursor inside `field`'s input, if visible.
    pub fn cursor_for(&self, form: &ContactForm, view: Rect, scroll: u16) -> Option<(u16, u16)> {
        let field = form.focus().field()?;
        let block = self.blocks.iter().find(|b| b.kind == BlockKind::Input(field))?;
        let inner = input_inner(block.rect);
        let lines = input_lines(form.value(field), inner.width);
        let row = lines.len().saturating_sub(1).min(usize::from(inner.height.saturating_sub(1)));
        let last = lines.last().map(String::as_str).unwrap_or("");
        let col = (display_width(last) as u16).min(inner.width.saturating_sub(1));
        let y = inner.y + row as u16;
        if y < scroll || y >= scroll.saturating_add(view.height) {
            return None;
        }
        Some((view.x + inner.x + col, view.y + (y - scroll)))
    }

    /// Draw the rows `scroll..scroll + view.height` into `view`.
    pub fn render(&self, style: &DocStyle<'_>, buf: &mut Buffer, view: Rect, scroll: u16) {
        if view.is_empty() || self.height == 0 {
            return;
        }
        let mut page = Buffer::new(view.width, self.height);
        let visible_end = scroll.saturating_add(view.height);
        for block in &self.blocks {
            if block.rect.bottom() <= scroll || block.rect.y >= visible_end {
                continue;
            }
            match block.reveal {
                Some(index) if !style.reveal.is_revealed(index) => {
                    page.push_opacity(PLACEHOLDER_OPACITY);
                    draw_placeholder(&mut page, block.rect, style.palette);
                    page.pop_opacity();
                }
                Some(index) => {
                    page.push_opacity(style.reveal.opacity(index).max(PLACEHOLDER_OPACITY));
                    draw_block(&mut page, block, style);
                    page.pop_opacity();
                }
                None => draw_block(&mut page, block, style),
            }
        }
        for row in 0..view.height {
            let src_y = scroll + row;
            if src_y >= self.height {
                break;
            }
            for col in 0..view.width {
                let Some(cell) = page.get(col, src_y) else {
                    continue;
                };
                if cell.is_continuation() || *cell == Cell::default() {
                    continue;
                }
                buf.set(view.x + col, view.y + row, *cell);
            }
        }
    }
}

/// What a document needs beyond its geometry to draw itself.
pub struct DocStyle<'a> {
    pub palette: Palette,
    pub reveal: &'a RevealObserver,
    pub form: &'a ContactForm,
}

/// Appends blocks top to bottom inside a centred column.
#[derive(Debug)]
pub struct DocBuilder {
    column_x: u16,
    column_width: u16,
    cursor: u16,
    blocks: Vec<Block>,
    reveal_count: usize,
}

impl DocBuilder {
    /// A column at most `max_width` wide, centred in `width`, one blank row from the top.
    pub fn new(width: u16, max_width: u16) -> Self {
        let column_width = width.saturating_sub(4).min(max_width).max(1);
        Self {
            column_x: width.saturating_sub(column_width) / 2,
            column_width,
            cursor: 1,
            blocks: Vec::new(),
            reveal_count: 0,
        }
    }

    pub fn width(&self) -> u16 {
        self.column_width
    }

    pub fn gap(&mut self, rows: u16) {
        self.cursor = self.cursor.saturating_add(rows);
    }

    fn place(&mut self, x: u16, width: u16, height: u16, kind: BlockKind, reveal: bool, target: Option<Target>) {
        let reveal = reveal.then(|| {
            self.reveal_count += 1;
            self.reveal_count - 1
        });
        self.blocks.push(Block {
            rect: Rect::new(x, self.cursor, width, height),
            kind,
            reveal,
            target,
        });
    }

    /// Wrapped text across the column.
    pub fn text(&mut self, text: &str, tone: Tone, align: Align) {
        let lines = wrap(text, usize::from(self.column_width));
        if lines.is_empty() {
            return;
        }
        let height = lines.len() as u16;
        self.place(self.column_x, self.column_width, height, BlockKind::Text { lines, tone, align }, false, None);
        self.cursor += height;
    }

    pub fn card(&mut self, card: CardSpec, reveal: bool, target: Option<Target>) {
        let height = card.height(self.column_width);
        self.place(self.column_x, self.column_width, height, BlockKind::Card(card), reveal, target);
        self.cursor += height + 1;
    }

    /// Cards in rows of `columns`; cards sharing a row share its height.
    pub fn card_grid(&mut self, cards: Vec<(CardSpec, Option<Target>)>, columns: u16, reveal: bool) {
        let columns = columns.clamp(1, 4);
        let gutter = 2;
        let card_width = (self.column_width.saturating_sub(gutter * (columns - 1))) / columns;
        if card_width < 8 {
            for (card, target) in cards {
                self.card(card, reveal, target);
            }
            return;
        }
        let mut cards = cards.into_iter().peekable();
        while cards.peek().is_some() {
            let row: Vec<_> = cards.by_ref().take(usize::from(columns)).collect();
            let height = row.iter().map(|(card, _)| card.height(card_width)).max().unwrap_or(0);
            for (i, (card, target)) in row.into_iter().enumerate() {
                let x = self.column_x + (card_width + gutter) * i as u16;
                self.place(x, card_width, height, BlockKind::Card(card), reveal, target);
            }
            self.cursor += height + 1;
        }
    }

    pub fn meter(&mut self, label: &str, level: u8, fill: f32, color: PackedRgba) {
        let kind = BlockKind::Meter {
            label: label.to_owned(),
            level,
            fill,
            color,
        };
        self.place(self.column_x, self.column_width, 2, kind, false, None);
        self.cursor += 3;
    }

    /// Bordered input with a row underneath for its error.
    pub fn input(&mut self, field: Field) {
        let height = field.rows() + 3;
        let target = Some(Target::FormInput(FormFocus::from(field)));
        self.place(self.column_x, self.column_width, height, BlockKind::Input(field), false, target);
        self.cursor += height;
    }

    /// A one-row button centred in the column.
    pub fn button(&mut self, label: &'static str, accent: Option<PackedRgba>, focused: bool, target: Target) {
        let width = (display_width(label) as u16 + 4).min(self.column_width);
        let x = self.column_x + (self.column_width - width) / 2;
        self.place(x, width, 1, BlockKind::Button { label, accent, focused }, false, Some(target));
        self.cursor += 2;
    }

    pub fn finish(self) -> Document {
        Document {
            height: self.cursor.saturating_add(1),
            blocks: self.blocks,
            reveal_count: self.reveal_count,
        }
    }
}

fn tone_cell(tone: Tone, palette: Palette) -> Cell {
    let (fg, flags) = match tone {
        Tone::Title => (palette.fg, StyleFlags::BOLD),
        Tone::Heading => (palette.fg, StyleFlags::BOLD),
        Tone::Body => (palette.fg, StyleFlags::empty()),
        Tone::Muted => (palette.muted, StyleFlags::empty()),
        Tone::Accent(color) => (color, StyleFlags::BOLD),
    };
    Cell::default().with_fg(fg).with_flags(flags)
}

fn draw_block(buf: &mut Buffer, block: &Block, style: &DocStyle<'_>) {
    let palette = style.palette;
    let rect = block.rect;
    match &block.kind {
        BlockKind::Text { lines, tone, align } => {
            let cell = tone_cell(*tone, palette);
            for (i, line) in lines.iter().enumerate() {
                let x = match align {
                    Align::Left => rect.x,
                    Align::Center => rect.x + rect.width.saturating_sub(display_width(line) as u16) / 2,
                };
                buf.print_text_clipped(x, rect.y + i as u16, line, cell, rect.right());
            }
        }
        BlockKind::Card(card) => draw_card(buf, rect, card, palette),
        BlockKind::Meter { label, level, fill, color } => {
            let text = Cell::default().with_fg(palette.fg);
            buf.print_text_clipped(rect.x, rect.y, label, text, rect.right());
            let percent = format!("{level}%");
            let px = rect.right().saturating_sub(display_width(&percent) as u16);
            buf.print_text(px, rect.y, &percent, text.with_fg(palette.muted));
            let filled = Cell::from_char(' ').with_bg(*color);
            let track = Cell::from_char(' ').with_bg(palette.border);
            buf.draw_meter(rect.x, rect.y + 1, rect.width, *fill, filled, track);
        }
        BlockKind::Input(field) => draw_input(buf, rect, *field, style.form, palette),
        BlockKind::Button { label, accent, focused } => {
            let (fg, bg) = match accent {
                Some(color) => (PackedRgba::WHITE, *color),
                None => (palette.button_fg, palette.button_bg),
            };
            let mut cell = Cell::from_char(' ').with_fg(fg).with_bg(bg);
            if *focused {
                cell = cell.with_flags(StyleFlags::BOLD | StyleFlags::UNDERLINE);
            }
            buf.fill(rect, cell);
            let x = rect.x + rect.width.saturating_sub(display_width(label) as u16) / 2;
            buf.print_text_clipped(x, rect.y, label, cell, rect.right());
        }
    }
}

fn draw_card(buf: &mut Buffer, rect: Rect, card: &CardSpec, palette: Palette) {
    let border = if card.focused { card.accent } else { palette.border };
    buf.draw_box(
        rect,
        BorderChars::ROUNDED,
        Cell::default().with_fg(border),
        Cell::from_char(' ').with_bg(palette.surface),
    );
    // Accent strip on the left edge.
    for y in rect.y + 1..rect.bottom().saturating_sub(1) {
        buf.set(rect.x, y, Cell::from_char('▎').with_fg(card.accent));
    }

    let inner_x = rect.x + 2;
    let right = rect.right().saturating_sub(2);
    let mut y = rect.y + 1;
    let mut title_right = right;
    if let Some(badge) = &card.badge {
        let bx = right.saturating_sub(display_width(badge) as u16);
        buf.print_text_clipped(bx, y, badge, Cell::default().with_fg(card.accent).with_flags(StyleFlags::BOLD), right);
        title_right = bx.saturating_sub(1);
    }
    let title = Cell::default().with_fg(palette.fg).with_flags(StyleFlags::BOLD);
    let max = usize::from(title_right.saturating_sub(inner_x));
    buf.print_text_clipped(inner_x, y, &truncate_to_width(&card.title, max), title, title_right);
    y += 1;

    if let Some(meta) = &card.meta {
        buf.print_text_clipped(inner_x, y, meta, Cell::default().with_fg(card.accent), right);
        y += 1;
    }
    let body = Cell::default().with_fg(palette.muted);
    for line in card.body_lines(rect.width.saturating_sub(4)) {
        buf.print_text_clipped(inner_x, y, &line, body, right);
        y += 1;
    }
    if !card.tags.is_empty() {
        let tag = Cell::default().with_fg(card.accent);
        let mut x = inner_x;
        for name in &card.tags {
            x = buf.print_text_clipped(x, y, &format!("[{name}]"), tag, right) + 1;
        }
    }
}

fn input_inner(rect: Rect) -> Rect {
    Rect::new(rect.x + 2, rect.y + 1, rect.width.saturating_sub(4), rect.height.saturating_sub(3))
}

fn input_lines(value: &str, width: u16) -> Vec<String> {
    let width = usize::from(width.max(1));
    let mut lines = Vec::new();
    for paragraph in value.split('\n') {
        let wrapped = wrap(paragraph, width);
        if wrapped.is_empty() {
            lines.push(String::new());
        } else {
            lines.extend(wrapped);
        }
    }
    lines
}

fn draw_input(buf: &mut Buffer, rect: Rect, field: Field, form: &ContactForm, palette: Palette) {
    let error = form.error(field);
    let focused = form.focus() == FormFocus::from(field);
    let border = match (error.is_some(), focused) {
        (true, _) => palette.error,
        (false, true) => palette.accent,
        (false, false) => palette.border,
    };
    let frame = Rect::new(rect.x, rect.y, rect.width, rect.height.saturating_sub(1));
    buf.draw_box(
        frame,
        BorderChars::ROUNDED,
        Cell::default().with_fg(border),
        Cell::from_char(' ').with_bg(palette.surface),
    );

    let inner = input_inner(rect);
    let value = form.value(field);
    if value.is_empty() {
        buf.print_text_clipped(inner.x, inner.y, field.placeholder(), Cell::default().with_fg(palette.muted), inner.right());
    } else {
        let lines = input_lines(value, inner.width);
        // Keep the end of the value in view.
        let skip = lines.len().saturating_sub(usize::from(inner.height));
        for (i, line) in lines.iter().skip(skip).enumerate() {
            buf.print_text_clipped(inner.x, inner.y + i as u16, line, Cell::default().with_fg(palette.fg), inner.right());
        }
    }
    if let Some(error) = error {
        let y = rect.bottom().saturating_sub(1);
        buf.print_text_clipped(rect.x + 1, y, &error.to_string(), Cell::default().with_fg(palette.error), rect.right());
    }
}

fn draw_placeholder(buf: &mut Buffer, rect: Rect, palette: Palette) {
    buf.draw_border(rect, BorderChars::ROUNDED, Cell::default().with_fg(palette.muted));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Theme;

    fn sample() -> Document {
        let mut doc = DocBuilder::new(40, 36);
        doc.text("Heading", Tone::Title, Align::Center);
        doc.gap(1);
        let accent = PackedRgba::rgb(1, 2, 3);
        doc.card(CardSpec::new("One", "first body", accent), true, None);
        doc.card(CardSpec::new("Two", "second body", accent), true, Some(Target::ProjectCard(1)));
        doc.button("Back to Map", None, false, Target::BackToMap);
        doc.finish()
    }

    #[test]
    fn column_is_centred() {
        let doc = DocBuilder::new(100, 60);
        assert_eq!(doc.width(), 60);
        assert_eq!(doc.column_x, 20);
        assert_eq!(DocBuilder::new(20, 60).width(), 16);
    }

    #[test]
    fn card_height_counts_rows() {
        let card = CardSpec::new("T", "one two three", PackedRgba::WHITE);
        assert_eq!(card.height(40), 4);
        let tagged = card.clone().meta("m").tags(&["a".to_owned()]);
        assert_eq!(tagged.height(40), 6);
        let long = CardSpec::new("T", "word ".repeat(40), PackedRgba::WHITE).max_body_rows(2);
        assert_eq!(long.height(20), 5);
    }

    #[test]
    fn reveal_nodes_are_numbered_in_order() {
        let doc = sample();
        assert_eq!(doc.reveal_count, 2);
        let tops = doc.reveal_tops(0);
        assert_eq!(tops.len(), 2);
        assert!(tops[0] < tops[1]);
        let scrolled = doc.reveal_tops(3);
        assert_eq!(scrolled[0], tops[0] - 3);
    }

    #[test]
    fn hits_follow_scroll_and_clip() {
        let doc = sample();
        let back = doc.block_for(Target::BackToMap).map(|b| b.rect);
        let Some(back) = back else {
            panic!("back button missing");
        };
        let view = Rect::new(0, 2, 40, 100);
        let mut hits = HitMap::new();
        doc.register_hits(view, 0, &mut hits);
        assert_eq!(hits.rect_of(Target::BackToMap).map(|r| r.y), Some(back.y + 2));

        let short = Rect::new(0, 0, 40, 3);
        let mut hits = HitMap::new();
        doc.register_hits(short, 0, &mut hits);
        assert_eq!(hits.rect_of(Target::BackToMap), None);
        let mut hits = HitMap::new();
        doc.register_hits(short, back.y, &mut hits);
        assert_eq!(hits.rect_of(Target::BackToMap).map(|r| r.y), Some(0));
    }

    #[test]
    fn max_scroll_never_underflows() {
        let doc = sample();
        assert_eq!(doc.max_scroll(1000), 0);
        assert_eq!(doc.max_scroll(doc.height - 4), 4);
    }

    #[test]
    fn hidden_nodes_draw_outline_only() {
        let doc = sample();
        let reveal = RevealObserver::new();
        let form = ContactForm::new();
        let style = DocStyle {
            palette: Theme::Light.palette(),
            reveal: &reveal,
            form: &form,
        };
        let mut buf = Buffer::new(40, doc.height);
        let area = buf.area();
        doc.render(&style, &mut buf, area, 0);
        let text = buf.to_text();
        assert!(text.contains("Heading"));
        assert!(text.contains("Back to Map"));
        assert!(!text.contains("first body"));
    }

    #[test]
    fn revealed_nodes_draw_content() {
        let doc = sample();
        let mut reveal = RevealObserver::new();
        reveal.arm(1, doc.reveal_count);
        reveal.scan(&doc.reveal_tops(0), 100);
        let form = ContactForm::new();
        let style = DocStyle {
            palette: Theme::Dark.palette(),
            reveal: &reveal,
            form: &form,
        };
        let mut buf = Buffer::new(40, 10);
        let area = buf.area();
        doc.render(&style, &mut buf, area, 0);
        assert!(buf.to_text().contains("first body"));
    }

    #[test]
    fn cursor_tracks_value_end() {
        let mut doc = DocBuilder::new(40, 36);
        doc.input(Field::Name);
        let doc = doc.finish();
        let mut form = ContactForm::new();
        form.set_value(Field::Name, "Ada");
        let view = Rect::new(0, 5, 40, 20);
        let rect = doc.blocks[0].rect;
        assert_eq!(doc.cursor_for(&form, view, 0), Some((rect.x + 2 + 3, 5 + rect.y + 1)));
        form.set_focus(FormFocus::Send);
        assert_eq!(doc.cursor_for(&form, view, 0), None);
    }
}
