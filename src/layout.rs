//! Page layout: positioned elements and the flow cursor that produces them.
//!
//! All coordinates are millimetres measured from the top-left corner of the
//! page. Text `y` is the baseline; image `y` is the top edge.

use crate::metrics::{text_width, PT_TO_MM};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// Which optional image an element refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Logo,
    FooterIcon,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Text {
        x: f32,
        y: f32,
        size: f32,
        style: FontStyle,
        text: String,
    },
    Rule {
        x1: f32,
        x2: f32,
        y: f32,
        weight: f32,
        color: Rgb,
    },
    Image {
        asset: AssetKind,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub elements: Vec<Element>,
}

impl Page {
    /// Text of every text element, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|e| match e {
            Element::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// A laid-out document, ready to serialize.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub title: String,
    pub setup: PageSetup,
    pub pages: Vec<Page>,
}

impl Document {
    /// All text in reading order across pages.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().flat_map(Page::texts)
    }
}

/// Paper size and margins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSetup {
    pub width: f32,
    pub height: f32,
    pub margin_left: f32,
    pub margin_top: f32,
    pub margin_right: f32,
    /// Content may not extend below `height - break_margin`
    pub break_margin: f32,
    /// Inner padding on each side of a cell
    pub cell_margin: f32,
}

impl PageSetup {
    pub const A4: PageSetup = PageSetup {
        width: 210.0,
        height: 297.0,
        margin_left: 10.0,
        margin_top: 10.0,
        margin_right: 10.0,
        break_margin: 15.0,
        cell_margin: 1.0,
    };

    pub fn content_width(&self) -> f32 {
        self.width - self.margin_left - self.margin_right
    }

    pub fn break_trigger(&self) -> f32 {
        self.height - self.break_margin
    }
}

/// Flowing cursor over a sequence of pages with automatic page breaks.
#[derive(Debug)]
pub struct Flow {
    setup: PageSetup,
    pages: Vec<Page>,
    x: f32,
    y: f32,
    style: FontStyle,
    size: f32,
}

impl Flow {
    pub fn new(setup: PageSetup) -> Self {
        Self {
            setup,
            pages: vec![Page::default()],
            x: setup.margin_left,
            y: setup.margin_top,
            style: FontStyle::Regular,
            size: 12.0,
        }
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn set_xy(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    pub fn set_font(&mut self, style: FontStyle, size: f32) {
        self.style = style;
        self.size = size;
    }

    /// Line break: back to the left margin and down by `h`.
    pub fn ln(&mut self, h: f32) {
        self.x = self.setup.margin_left;
        self.y += h;
    }

    pub fn add_page(&mut self) {
        self.pages.push(Page::default());
        self.x = self.setup.margin_left;
        self.y = self.setup.margin_top;
    }

    /// Start a new page unless `h` more millimetres fit on this one.
    ///
    /// The cursor keeps its column across the break.
    pub fn ensure_space(&mut self, h: f32) {
        if self.y + h > self.setup.break_trigger() {
            let x = self.x;
            self.add_page();
            self.x = x;
        }
    }

    fn push(&mut self, element: Element) {
        if let Some(page) = self.pages.last_mut() {
            page.elements.push(element);
        }
    }

    /// One line of text in a box `w` wide (0 = to the right margin), `h` tall.
    ///
    /// With `newline` the cursor moves to the start of the next line,
    /// otherwise it moves right past the box.
    pub fn cell(&mut self, w: f32, h: f32, text: &str, align: Align, newline: bool) {
        self.ensure_space(h);
        let w = self.resolve_width(w);

        if !text.is_empty() {
            let dx = match align {
                Align::Left => self.setup.cell_margin,
                Align::Center => (w - text_width(text, self.style, self.size)) / 2.0,
            };
            let baseline = self.y + 0.5 * h + 0.3 * self.size * PT_TO_MM;
            self.push(Element::Text {
                x: self.x + dx,
                y: baseline,
                size: self.size,
                style: self.style,
                text: text.to_string(),
            });
        }

        if newline {
            self.ln(h);
        } else {
            self.x += w;
        }
    }

    /// Wrapped text in a column `w` wide (0 = to the right margin).
    ///
    /// Explicit line breaks are kept; each produced line is `h` tall and the
    /// cursor returns to the column's left edge after every line.
    pub fn multi_cell(&mut self, w: f32, h: f32, text: &str) {
        let w = self.resolve_width(w);
        let left = self.x;
        for line in self.wrap(text, w) {
            self.cell(w, h, &line, Align::Left, false);
            self.x = left;
            self.y += h;
        }
        self.x = left;
    }

    /// Horizontal rule across the content width at `y`, not moving the cursor.
    pub fn rule_at(&mut self, y: f32, weight: f32, color: Rgb) {
        self.push(Element::Rule {
            x1: self.setup.margin_left,
            x2: self.setup.width - self.setup.margin_right,
            y,
            weight,
            color,
        });
    }

    /// Horizontal rule at the cursor.
    pub fn rule(&mut self, weight: f32, color: Rgb) {
        self.rule_at(self.y, weight, color);
    }

    /// Place an image at an absolute position on the current page.
    pub fn image(&mut self, asset: AssetKind, x: f32, y: f32, width: f32, height: f32) {
        self.push(Element::Image {
            asset,
            x,
            y,
            width,
            height,
        });
    }

    /// Lines `text` breaks into inside a column `w` wide with the current font.
    pub fn wrap(&self, text: &str, w: f32) -> Vec<String> {
        let max = w - 2.0 * self.setup.cell_margin;
        let measure = |s: &str| text_width(s, self.style, self.size);
        let mut lines = Vec::new();

        for paragraph in text.split('\n') {
            let paragraph = paragraph.strip_suffix('\r').unwrap_or(paragraph);
            let mut current = String::new();

            for word in paragraph.split(' ') {
                let candidate = if current.is_empty() {
                    word.to_string()
                } else {
                    format!("{current} {word}")
                };
                if measure(&candidate) <= max {
                    current = candidate;
                    continue;
                }
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                // A word wider than the column is broken between characters.
                for c in word.chars() {
                    current.push(c);
                    if measure(&current) > max && current.chars().count() > 1 {
                        current.pop();
                        lines.push(std::mem::replace(&mut current, c.to_string()));
                    }
                }
            }
            lines.push(current);
        }
        lines
    }

    fn resolve_width(&self, w: f32) -> f32 {
        if w > 0.0 {
            w
        } else {
            self.setup.width - self.setup.margin_right - self.x
        }
    }

    pub fn finish(self, title: impl Into<String>) -> Document {
        Document {
            title: title.into(),
            setup: self.setup,
            pages: self.pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flow() -> Flow {
        let mut flow = Flow::new(PageSetup::A4);
        flow.set_font(FontStyle::Regular, 11.0);
        flow
    }

    #[test]
    fn test_cell_advances_cursor() {
        let mut f = flow();
        f.cell(0.0, 8.0, "Name: Jane Doe", Align::Left, true);
        assert_eq!(f.y(), 18.0);
        assert_eq!(f.x(), 10.0);

        f.cell(50.0, 8.0, "left", Align::Left, false);
        assert_eq!(f.x(), 60.0);
        assert_eq!(f.y(), 18.0);
    }

    #[test]
    fn test_centered_text_is_centered() {
        let mut f = flow();
        f.set_font(FontStyle::Bold, 14.0);
        f.cell(0.0, 10.0, "DISCHARGE SUMMARY", Align::Center, true);
        let doc = f.finish("t");
        let Element::Text { x, size, style, text, .. } = &doc.pages[0].elements[0] else {
            panic!("expected text");
        };
        let width = text_width(text, *style, *size);
        assert!((x + width / 2.0 - 105.0).abs() < 1e-3);
    }

    #[test]
    fn test_wrap_keeps_explicit_breaks() {
        let f = flow();
        let lines = f.wrap("Patient recovered well.\nDischarged in stable condition.", 190.0);
        assert_eq!(lines, vec!["Patient recovered well.", "Discharged in stable condition."]);
    }

    #[test]
    fn test_wrap_keeps_blank_lines() {
        let f = flow();
        assert_eq!(f.wrap("DIAGNOSIS:\n\nFOLLOW-UP:", 190.0), vec!["DIAGNOSIS:", "", "FOLLOW-UP:"]);
        assert_eq!(f.wrap("a\r\nb", 190.0), vec!["a", "b"]);
    }

    #[test]
    fn test_wrap_respects_width() {
        let f = flow();
        let text = "The patient responded well to treatment and no complications were observed \
                    throughout the stay, vital signs were stable on the day of discharge.";
        let lines = f.wrap(text, 60.0);
        assert!(lines.len() > 2);
        for line in &lines {
            assert!(text_width(line, FontStyle::Regular, 11.0) <= 58.0 + 1e-3, "{line}");
        }
        assert_eq!(lines.join(" "), text.split_whitespace().collect::<Vec<_>>().join(" "));
    }

    #[test]
    fn test_overlong_word_is_split() {
        let f = flow();
        let word = "X".repeat(80);
        let lines = f.wrap(&word, 40.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn test_page_breaks_at_bottom_margin() {
        let mut f = flow();
        for i in 0..40 {
            f.cell(0.0, 8.0, &format!("line {i}"), Align::Left, true);
        }
        assert!(f.page_count() > 1);
        let doc = f.finish("t");
        for page in &doc.pages {
            for element in &page.elements {
                if let Element::Text { y, .. } = element {
                    assert!(*y <= PageSetup::A4.break_trigger());
                }
            }
        }
        assert_eq!(doc.texts().count(), 40);
    }

    #[test]
    fn test_column_survives_page_break() {
        let mut f = flow();
        f.set_xy(110.0, 270.0);
        f.multi_cell(90.0, 8.0, "Admission Date: 2024-01-01\nDischarge Date: 2024-01-05");
        assert_eq!(f.page_count(), 2);
        assert_eq!(f.x(), 110.0);

        let doc = f.finish("t");
        let Element::Text { x, y, text, .. } = &doc.pages[1].elements[0] else {
            panic!("expected text");
        };
        assert_eq!(text, "Discharge Date: 2024-01-05");
        assert_eq!(*x, 111.0);
        assert!(*y < 20.0);
    }

    #[test]
    fn test_multi_cell_returns_to_column() {
        let mut f = flow();
        f.set_xy(110.0, 50.0);
        f.multi_cell(90.0, 8.0, "Patient UID: P1\nStatus: Discharged");
        assert_eq!(f.x(), 110.0);
        assert_eq!(f.y(), 66.0);
    }
}
