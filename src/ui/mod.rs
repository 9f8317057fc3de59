mod bucket;
mod forms;
mod layout;
mod status_bar;
mod theme;

use crate::app::state::{AppState, Screen};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use theme::Theme;

const SPINNER: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Busy indicator frame for `tick`.
pub fn spinner(tick: u64) -> char {
    SPINNER[(tick % SPINNER.len() as u64) as usize]
}

pub fn render(frame: &mut Frame, state: &AppState) {
    let app_layout = layout::compute_layout(frame.area());

    render_header(frame, app_layout.header, state);
    match &state.screen {
        Screen::Form(form) => forms::render(frame, app_layout.body, state, form),
        Screen::Buckets(view) => bucket::render_buckets(frame, app_layout.body, state, view),
        Screen::Browser(view) => bucket::render_browser(frame, app_layout.body, state, view),
    }
    status_bar::render(frame, app_layout.status_bar, state);
}

fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let route = state.route.to_string();
    let title_width = " crabcat ".len() as u16;
    let route = layout::ellipsis(&route, area.width.saturating_sub(title_width + 1) as usize);
    let line = Line::from(vec![
        Span::styled(" crabcat ", Theme::header().add_modifier(Modifier::BOLD)),
        Span::styled(format!(" {}", route), Theme::dim()),
    ]);
    frame.render_widget(Paragraph::new(line).style(Theme::header()), area);
}
