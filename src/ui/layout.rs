use ratatui::layout::{Constraint, Direction, Layout, Rect};
use std::borrow::Cow;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub struct AppLayout {
    pub header: Rect,
    pub body: Rect,
    pub status_bar: Rect,
}

pub fn compute_layout(area: Rect) -> AppLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(3),    // Screen
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    AppLayout {
        header: chunks[0],
        body: chunks[1],
        status_bar: chunks[2],
    }
}

/// Cell padding around an area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pad {
    pub top: u16,
    pub right: u16,
    pub bottom: u16,
    pub left: u16,
}

impl Pad {
    pub const fn all(n: u16) -> Self {
        Self {
            top: n,
            right: n,
            bottom: n,
            left: n,
        }
    }

    pub const fn xy(x: u16, y: u16) -> Self {
        Self {
            top: y,
            right: x,
            bottom: y,
            left: x,
        }
    }
}

/// Shrink `area` by `pad`. Never produces a negative size.
pub fn pad(area: Rect, pad: Pad) -> Rect {
    let left = pad.left.min(area.width);
    let top = pad.top.min(area.height);
    Rect {
        x: area.x + left,
        y: area.y + top,
        width: area.width.saturating_sub(pad.left + pad.right),
        height: area.height.saturating_sub(pad.top + pad.bottom),
    }
}

/// A column of `width` cells centred horizontally in `area`.
pub fn hcenter(area: Rect, width: u16) -> Rect {
    let width = width.min(area.width);
    Rect {
        x: area.x + (area.width - width) / 2,
        width,
        ..area
    }
}

/// A `width` x `height` box centred in `area`.
pub fn center(area: Rect, width: u16, height: u16) -> Rect {
    let column = hcenter(area, width);
    let height = height.min(area.height);
    Rect {
        y: area.y + (area.height - height) / 2,
        height,
        ..column
    }
}

/// Truncate `text` to `width` display columns, ending with `…` when cut.
pub fn ellipsis(text: &str, width: usize) -> Cow<'_, str> {
    if text.width() <= width {
        return Cow::Borrowed(text);
    }
    if width == 0 {
        return Cow::Borrowed("");
    }
    let mut used = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    Cow::Owned(out)
}

/// Terminal width classes, narrowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Breakpoint {
    Xs,
    Sm,
    Md,
    Lg,
}

impl Breakpoint {
    pub fn min_width(self) -> u16 {
        match self {
            Breakpoint::Xs => 0,
            Breakpoint::Sm => 60,
            Breakpoint::Md => 90,
            Breakpoint::Lg => 120,
        }
    }
}

/// Whether `width` is narrower than `bp`.
pub fn break_under(bp: Breakpoint, width: u16) -> bool {
    width < bp.min_width()
}

/// Vertical spacer of `height` rows.
pub fn skip(height: u16) -> Constraint {
    Constraint::Length(height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_saturates() {
        let area = Rect::new(2, 3, 10, 4);
        assert_eq!(pad(area, Pad::xy(2, 1)), Rect::new(4, 4, 6, 2));
        assert_eq!(pad(area, Pad::all(6)).area(), 0);
    }

    #[test]
    fn test_centering() {
        let area = Rect::new(0, 0, 80, 24);
        assert_eq!(hcenter(area, 40), Rect::new(20, 0, 40, 24));
        assert_eq!(center(area, 40, 10), Rect::new(20, 7, 40, 10));
        assert_eq!(center(area, 100, 30), area);
    }

    #[test]
    fn test_ellipsis_counts_display_width() {
        assert_eq!(ellipsis("short", 10), "short");
        assert_eq!(ellipsis("longer name", 6), "longe…");
        // Wide characters take two columns each.
        assert_eq!(ellipsis("日本語テキスト", 7), "日本語…");
        assert_eq!(ellipsis("abc", 0), "");
    }

    #[test]
    fn test_breakpoints() {
        assert!(break_under(Breakpoint::Sm, 59));
        assert!(!break_under(Breakpoint::Sm, 60));
        assert!(!break_under(Breakpoint::Xs, 0));
        assert!(Breakpoint::Md > Breakpoint::Sm);
    }
}
