use crate::app::state::{AppState, BrowserView, BucketsView, Loadable};
use crate::s3::paths;
use crate::s3::store::{Listing, Preview};
use crate::ui::layout::{break_under, ellipsis, Breakpoint};
use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};

/// Human-readable byte count.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// Breadcrumb labels: the bucket, then each path segment.
pub fn crumbs(bucket: &str, path: &str) -> Vec<String> {
    std::iter::once(bucket.to_string())
        .chain(
            paths::get_breadcrumbs(path)
                .iter()
                .map(|crumb| paths::basename(crumb).to_string()),
        )
        .collect()
}

fn panel(title: String, focused: bool) -> Block<'static> {
    Block::default()
        .title(title)
        .title_style(Theme::title())
        .borders(Borders::ALL)
        .border_type(Theme::border_type())
        .border_style(if focused {
            Theme::border_focused()
        } else {
            Theme::border()
        })
}

/// Placeholder text for anything not yet ready.
fn pending<T>(value: &Loadable<T>, tick: u64) -> Option<Line<'static>> {
    match value {
        Loadable::Loading => Some(Line::styled(
            format!(" {} Loading…", crate::ui::spinner(tick)),
            Theme::dim(),
        )),
        Loadable::Failed(e) => Some(Line::styled(format!(" {}", e), Theme::error())),
        Loadable::Ready(_) => None,
    }
}

pub fn render_buckets(frame: &mut Frame, area: Rect, state: &AppState, view: &BucketsView) {
    let block = panel(" Buckets ".to_string(), true);
    if let Some(line) = pending(&view.names, state.tick_count) {
        frame.render_widget(Paragraph::new(line).block(block), area);
        return;
    }
    let names = view.names.ready().map(Vec::as_slice).unwrap_or_default();
    if names.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::styled(" No buckets", Theme::dim())).block(block),
            area,
        );
        return;
    }
    let items: Vec<ListItem> = names
        .iter()
        .map(|name| ListItem::new(Line::styled(format!(" ◆ {}", name), Theme::directory())))
        .collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Theme::selected());
    let mut list_state = ListState::default().with_selected(Some(view.selected));
    frame.render_stateful_widget(list, area, &mut list_state);
}

pub fn render_browser(frame: &mut Frame, area: Rect, state: &AppState, view: &BrowserView) {
    let [crumb_area, body] =
        Layout::vertical([Constraint::Length(1), Constraint::Min(3)]).areas(area);
    render_crumbs(frame, crumb_area, view);

    if view.is_dir() {
        render_directory(frame, body, state, view);
    } else {
        render_object(frame, body, state, view);
    }
}

fn render_crumbs(frame: &mut Frame, area: Rect, view: &BrowserView) {
    let labels = crumbs(&view.bucket, &view.path);
    let last = labels.len() - 1;
    let mut spans = vec![Span::raw(" ")];
    for (i, label) in labels.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" › ", Theme::dim()));
        }
        if i == last {
            spans.push(Span::styled(label.clone(), Theme::title()));
            continue;
        }
        if i < 9 {
            spans.push(Span::styled(format!("{} ", i + 1), Theme::key_hint()));
        }
        spans.push(Span::styled(label.clone(), Theme::directory()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_directory(frame: &mut Frame, area: Rect, state: &AppState, view: &BrowserView) {
    let (list_area, summary_area) = if break_under(Breakpoint::Md, area.width) {
        let [top, bottom] =
            Layout::vertical([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(area);
        (top, bottom)
    } else {
        let [left, right] =
            Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)])
                .spacing(1)
                .areas(area);
        (left, right)
    };

    let block = panel(" Contents ".to_string(), true);
    match &view.listing {
        Loadable::Ready(listing) if !listing.is_empty() => {
            let width = list_area.width.saturating_sub(2) as usize;
            let items = listing_items(listing, width);
            let list = List::new(items)
                .block(block)
                .highlight_style(Theme::selected());
            let mut list_state = ListState::default().with_selected(Some(view.selected));
            frame.render_stateful_widget(list, list_area, &mut list_state);
        }
        Loadable::Ready(_) => {
            frame.render_widget(
                Paragraph::new(Line::styled(" Empty", Theme::dim())).block(block),
                list_area,
            );
        }
        other => {
            let line = pending(other, state.tick_count).unwrap_or_default();
            frame.render_widget(Paragraph::new(line).block(block), list_area);
        }
    }

    render_summary(frame, summary_area, state, view);
}

fn listing_items(listing: &Listing, width: usize) -> Vec<ListItem<'static>> {
    let mut items = Vec::with_capacity(listing.len());
    for dir in &listing.dirs {
        let name = format!("{}/", paths::basename(dir));
        items.push(ListItem::new(Line::styled(
            format!(" ▸ {}", ellipsis(&name, width.saturating_sub(3))),
            Theme::directory(),
        )));
    }
    for file in &listing.files {
        let size = format_size(file.size);
        let modified = file
            .modified
            .map(|m| m.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        let meta = format!("{:>10}  {:16}", size, modified);
        let name_width = width.saturating_sub(meta.chars().count() + 4);
        let name = ellipsis(paths::basename(&file.key), name_width);
        let pad = name_width.saturating_sub(unicode_width::UnicodeWidthStr::width(name.as_ref()));
        items.push(ListItem::new(Line::from(vec![
            Span::styled(format!("   {}{} ", name, " ".repeat(pad)), Theme::text()),
            Span::styled(meta, Theme::dim()),
        ])));
    }
    items
}

fn render_summary(frame: &mut Frame, area: Rect, state: &AppState, view: &BrowserView) {
    let mut lines = Vec::new();
    if let Some(listing) = view.listing.ready() {
        lines.push(Line::from(vec![
            Span::styled(format!(" {} files", listing.files.len()), Theme::text()),
            Span::styled(" · ", Theme::dim()),
            Span::styled(format!("{} folders", listing.dirs.len()), Theme::text()),
            Span::styled(" · ", Theme::dim()),
            Span::styled(format_size(listing.total_size()), Theme::text()),
        ]));
        lines.push(Line::raw(""));
    }
    match &view.readme {
        Some(Loadable::Ready(Preview::Text { text, .. })) => {
            lines.extend(text.lines().map(|l| Line::styled(l.to_string(), Theme::text())));
        }
        Some(Loadable::Ready(Preview::Binary { .. })) => {
            lines.push(Line::styled(" README is not text", Theme::dim()));
        }
        Some(other) => lines.extend(pending(other, state.tick_count)),
        None => lines.push(Line::styled(" No README", Theme::dim())),
    }
    let paragraph = Paragraph::new(lines)
        .block(panel(" Summary ".to_string(), false))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_object(frame: &mut Frame, area: Rect, state: &AppState, view: &BrowserView) {
    let title = format!(" {} ", paths::basename(&view.path));
    let block = panel(title, true);

    let lines: Vec<Line> = match &view.preview {
        Loadable::Ready(Preview::Text {
            text,
            size,
            truncated,
        }) => {
            let mut lines: Vec<Line> = text
                .lines()
                .map(|l| Line::styled(l.to_string(), Theme::text()))
                .collect();
            if *truncated {
                lines.push(Line::styled(
                    format!("… showing the start of {}; press d to download", format_size(*size)),
                    Theme::dim(),
                ));
            }
            lines
        }
        Loadable::Ready(Preview::Binary { size }) => vec![Line::styled(
            format!(" Binary object, {}. Press d for a download link.", format_size(*size)),
            Theme::dim(),
        )],
        other => pending(other, state.tick_count).into_iter().collect(),
    };
    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}
