use crate::app::state::*;
use crate::ui::layout::ellipsis;
use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

fn key_hints(state: &AppState) -> &'static str {
    match &state.screen {
        Screen::Form(_) => "^G go to · ^C quit",
        Screen::Buckets(_) => "↑↓ select · Enter open · : go to · ^O sign out · q quit",
        Screen::Browser(view) if view.is_dir() => {
            "↑↓ select · Enter open · ⌫ up · 1-9 jump · : go to · r reload · q quit"
        }
        Screen::Browser(_) => "d download · ⌫ up · 1-9 jump · : go to · q quit",
    }
}

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    if let Some(ref input) = state.prompt {
        let line = Line::from(vec![
            Span::styled(" Go to ❯ ", Theme::key_hint()),
            Span::styled(input.text.as_str(), Theme::text()),
        ]);
        frame.render_widget(Paragraph::new(line).style(Theme::status_bar()), area);

        // Cursor offset: " Go to ❯ " (9 columns)
        let offset = u16::try_from(input.cursor_chars()).unwrap_or(u16::MAX);
        let cursor_x = area.x.saturating_add(9).saturating_add(offset);
        frame.set_cursor_position((cursor_x.min(area.right().saturating_sub(1)), area.y));
        return;
    }

    let hints = key_hints(state);
    let hints_width = unicode_width::UnicodeWidthStr::width(hints) + 2;
    let status_width = (area.width as usize).saturating_sub(hints_width + 1);
    let status = state.status_line();
    let status = ellipsis(&status, status_width.saturating_sub(1));
    let used = unicode_width::UnicodeWidthStr::width(status.as_ref()) + 1;

    // Pad to fill remaining space
    let remaining = (area.width as usize).saturating_sub(used + hints_width);
    let line = Line::from(vec![
        Span::styled(format!(" {}", status), Theme::status_bar()),
        Span::styled(" ".repeat(remaining), Theme::status_bar()),
        Span::styled(format!(" {} ", hints), Theme::status_bar().fg(Theme::ACCENT_TEAL)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
