use crate::app::form::{Field, Form};
use crate::app::state::AppState;
use crate::auth::submit::FormKind;
use crate::ui::layout::{center, ellipsis, pad, skip, Pad};
use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::block::Padding;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

const FORM_WIDTH: u16 = 52;

fn title(kind: FormKind) -> &'static str {
    match kind {
        FormKind::SignIn => " Sign in ",
        FormKind::PassReset => " Reset password ",
        FormKind::PassChange => " Change password ",
    }
}

fn submit_label(kind: FormKind) -> &'static str {
    match kind {
        FormKind::SignIn => "Sign in",
        FormKind::PassReset => "Send reset link",
        FormKind::PassChange => "Change password",
    }
}

fn hints(kind: FormKind) -> &'static str {
    match kind {
        FormKind::SignIn => "Tab next field · Enter submit · F2 forgot password",
        FormKind::PassReset => "Enter submit · F3 sign in · Esc back",
        FormKind::PassChange => "Tab next field · Enter submit · F2 new link · F3 sign in",
    }
}

/// Message shown under a field for a validation or submit error code.
pub fn field_message(kind: FormKind, field: &str, code: &str) -> &'static str {
    match (kind, field, code) {
        (_, "username", "required") => "Enter your username",
        (_, "email", "required") => "Enter your email",
        (FormKind::SignIn, "password", "required") => "Enter your password",
        (_, "password", "required") => "Enter a password",
        (_, "passwordCheck", "required") => "Enter the password again",
        (_, "passwordCheck", "check") => "Passwords don't match",
        (_, "password", "invalid") => "Password is too weak",
        _ => "Invalid value",
    }
}

/// Message shown above the submit button for a form-wide error code.
pub fn form_message(kind: FormKind, code: &str) -> &'static str {
    match (kind, code) {
        (FormKind::SignIn, "invalidCredentials") => "Invalid username or password",
        (FormKind::PassChange, "invalid") => {
            "This reset link is invalid or has expired. Press F2 to request a new one."
        }
        _ => "Something went wrong. Try again later.",
    }
}

fn done_message(kind: FormKind) -> &'static str {
    match kind {
        FormKind::SignIn => "Signed in.",
        FormKind::PassReset => {
            "If that address is registered, a reset link is on its way. Press Enter to sign in."
        }
        FormKind::PassChange => "Password changed. Press Enter to sign in.",
    }
}

pub fn render(frame: &mut Frame, area: Rect, state: &AppState, form: &Form) {
    let height = form.fields.len() as u16 * 4 + 7;
    let popup = center(area, FORM_WIDTH, height);

    let block = Block::default()
        .title(title(form.kind))
        .title_style(Theme::title())
        .borders(Borders::ALL)
        .border_type(Theme::border_type())
        .border_style(Theme::border_focused())
        .padding(Padding::horizontal(2));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    if form.done {
        let paragraph = Paragraph::new(done_message(form.kind))
            .style(Theme::success())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, pad(inner, Pad::xy(0, 1)));
        return;
    }

    let mut constraints = vec![skip(1)];
    for _ in &form.fields {
        constraints.push(Constraint::Length(3));
        constraints.push(Constraint::Length(1));
    }
    constraints.push(Constraint::Length(1)); // Form error
    constraints.push(Constraint::Length(1)); // Submit
    constraints.push(Constraint::Min(0));
    constraints.push(Constraint::Length(1)); // Hints
    let rows = Layout::vertical(constraints).split(inner);

    for (i, field) in form.fields.iter().enumerate() {
        let focused = i == form.focus && state.prompt.is_none();
        render_field(frame, rows[1 + i * 2], field, focused);
        if let Some(code) = form.visible_error(field) {
            let message = field_message(form.kind, field.name, code);
            frame.render_widget(
                Paragraph::new(Span::styled(message, Theme::error())),
                rows[2 + i * 2],
            );
        }
    }

    let base = 1 + form.fields.len() * 2;
    if let Some(code) = form.error {
        let message = ellipsis(form_message(form.kind, code), inner.width as usize);
        frame.render_widget(
            Paragraph::new(Span::styled(message, Theme::error())),
            rows[base],
        );
    }

    let label = if form.submitting {
        format!("{} {}", crate::ui::spinner(state.tick_count), submit_label(form.kind))
    } else {
        format!("[ {} ]", submit_label(form.kind))
    };
    let style = if form.can_submit() {
        Theme::key_hint()
    } else {
        Theme::dim()
    };
    frame.render_widget(
        Paragraph::new(Span::styled(label, style)).alignment(Alignment::Center),
        rows[base + 1],
    );

    frame.render_widget(
        Paragraph::new(Span::styled(
            ellipsis(hints(form.kind), inner.width as usize),
            Theme::dim(),
        )),
        rows[base + 3],
    );
}

fn render_field(frame: &mut Frame, area: Rect, field: &Field, focused: bool) {
    let block = Block::default()
        .title(format!(" {} ", field.label))
        .title_style(if focused { Theme::title() } else { Theme::dim() })
        .borders(Borders::ALL)
        .border_type(Theme::border_type())
        .border_style(if focused {
            Theme::border_focused()
        } else {
            Theme::border()
        });
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let shown = if field.secret {
        "•".repeat(field.value().chars().count())
    } else {
        field.value().to_string()
    };
    frame.render_widget(Paragraph::new(shown).style(Theme::text()), inner);

    if focused && inner.width > 0 {
        let offset = u16::try_from(field.input.cursor_chars()).unwrap_or(u16::MAX);
        let cursor_x = inner.x.saturating_add(offset);
        frame.set_cursor_position((cursor_x.min(inner.right() - 1), inner.y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_never_echo_codes() {
        assert_eq!(
            form_message(FormKind::SignIn, "invalidCredentials"),
            "Invalid username or password"
        );
        assert_eq!(
            form_message(FormKind::SignIn, "unexpected"),
            form_message(FormKind::PassReset, "anything")
        );
        assert!(form_message(FormKind::PassChange, "invalid").contains("F2"));
        assert_eq!(
            field_message(FormKind::PassChange, "passwordCheck", "check"),
            "Passwords don't match"
        );
        assert_eq!(
            field_message(FormKind::SignIn, "password", "required"),
            "Enter your password"
        );
    }
}
