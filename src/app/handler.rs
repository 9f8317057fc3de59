use crate::app::action::Action;
use crate::app::event::AppEvent;
use crate::app::route::Route;
use crate::app::state::*;
use crate::auth::submit::{FormKind, Outcome};
use crate::auth::Credentials;
use crate::s3::paths;
use crate::s3::S3Handle;
use crossterm::event::{Event as CEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// README names shown under a directory listing, in order of preference.
const README_NAMES: &[&str] = &["README.md", "README.txt", "README"];

pub fn handle_event(state: &mut AppState, event: AppEvent) -> Vec<Action> {
    match event {
        AppEvent::Terminal(cevent) => {
            state.dirty = true;
            handle_terminal(state, cevent)
        }
        AppEvent::SessionChanged(session) => {
            state.session = session;
            state.dirty = true;
            if state.route.requires_auth() && !state.authenticated() {
                let route = state.route.clone();
                return replace(state, route);
            }
            vec![]
        }
        AppEvent::FormSettled { form, outcome } => settle_form(state, form, outcome),
        AppEvent::BucketsLoaded(result) => {
            let allowed = state.config.storage.buckets.clone();
            if let Screen::Buckets(view) = &mut state.screen {
                let result = result.map(|mut names| {
                    if !allowed.is_empty() {
                        names.retain(|n| allowed.contains(n));
                    }
                    names
                });
                view.names = result.into();
                view.selected = 0;
                state.dirty = true;
            }
            vec![]
        }
        AppEvent::ListingLoaded {
            bucket,
            prefix,
            result,
        } => {
            let Some(view) = state.browser_mut() else {
                return vec![];
            };
            if view.bucket != bucket || view.path != prefix {
                tracing::debug!(%bucket, %prefix, "dropping stale listing");
                return vec![];
            }
            view.listing = result.into();
            let len = view.listing.ready().map(|l| l.len()).unwrap_or(0);
            view.selected = view.selected.min(len.saturating_sub(1));
            let readme = view.listing.ready().and_then(|listing| {
                README_NAMES
                    .iter()
                    .find_map(|name| listing.find_file(name))
                    .map(|file| S3Handle::new(bucket.clone(), file.key.clone()))
            });
            view.readme = readme.as_ref().map(|_| Loadable::Loading);
            state.dirty = true;
            readme
                .map(|handle| vec![Action::LoadReadme { handle }])
                .unwrap_or_default()
        }
        AppEvent::PreviewLoaded { handle, result } => {
            if let Some(view) = state.browser_mut() {
                if !view.is_dir() && view.handle() == handle {
                    view.preview = result.into();
                    state.dirty = true;
                }
            }
            vec![]
        }
        AppEvent::ReadmeLoaded { handle, result } => {
            if let Some(view) = state.browser_mut() {
                if view.bucket == handle.bucket
                    && paths::get_prefix(&handle.key) == view.path
                    && view.readme.is_some()
                {
                    view.readme = Some(result.into());
                    state.dirty = true;
                }
            }
            vec![]
        }
        AppEvent::Tick => {
            state.tick_count = state.tick_count.wrapping_add(1);
            if state.busy() {
                state.dirty = true;
            }
            vec![]
        }
    }
}

/// Navigate to `route`, remembering the current route for [`go_back`].
pub fn navigate(state: &mut AppState, route: Route) -> Vec<Action> {
    let previous = state.route.clone();
    replace(state, route);
    if state.route != previous {
        state.history.push(previous);
    }
    load_actions(state)
}

/// Show `route` without touching history.
pub fn replace(state: &mut AppState, route: Route) -> Vec<Action> {
    state.enter(route);
    load_actions(state)
}

fn go_back(state: &mut AppState) -> Vec<Action> {
    match state.history.pop() {
        Some(route) => replace(state, route),
        None => vec![],
    }
}

fn load_actions(state: &AppState) -> Vec<Action> {
    match &state.screen {
        Screen::Form(_) => vec![],
        Screen::Buckets(_) => vec![Action::LoadBuckets],
        Screen::Browser(view) if view.is_dir() => vec![Action::LoadListing {
            bucket: view.bucket.clone(),
            prefix: view.path.clone(),
        }],
        Screen::Browser(view) => vec![Action::LoadPreview {
            handle: view.handle(),
        }],
    }
}

fn settle_form(state: &mut AppState, kind: FormKind, outcome: Outcome) -> Vec<Action> {
    let Some(form) = state.form_for(kind) else {
        tracing::debug!(?kind, "form left before its submit settled");
        return vec![];
    };
    form.finish_submit(&outcome);
    state.dirty = true;
    if kind == FormKind::SignIn && outcome == Outcome::Success {
        // Re-entering sign-in with a session redirects to `next`.
        let route = state.route.clone();
        return replace(state, route);
    }
    vec![]
}

fn handle_terminal(state: &mut AppState, event: CEvent) -> Vec<Action> {
    match event {
        CEvent::Key(key) if key.kind != KeyEventKind::Release => handle_key(state, key),
        CEvent::Resize(_, _) => {
            state.dirty = true;
            vec![]
        }
        _ => vec![],
    }
}

fn handle_key(state: &mut AppState, key: KeyEvent) -> Vec<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Global keybindings
    if ctrl && key.code == KeyCode::Char('c') {
        return vec![Action::Quit];
    }

    if state.prompt.is_some() {
        return handle_prompt_key(state, key);
    }

    if ctrl && key.code == KeyCode::Char('g') {
        open_prompt(state);
        return vec![];
    }

    if ctrl && key.code == KeyCode::Char('o') && state.authenticated() {
        return vec![Action::SignOut];
    }

    match state.screen {
        Screen::Form(_) => handle_form_key(state, key),
        Screen::Buckets(_) => handle_buckets_key(state, key),
        Screen::Browser(_) => handle_browser_key(state, key),
    }
}

fn open_prompt(state: &mut AppState) {
    let mut input = InputState::new();
    for c in state.route.to_string().chars() {
        input.insert_char(c);
    }
    state.prompt = Some(input);
}

fn handle_prompt_key(state: &mut AppState, key: KeyEvent) -> Vec<Action> {
    let Some(input) = state.prompt.as_mut() else {
        return vec![];
    };
    match key.code {
        KeyCode::Esc => {
            state.prompt = None;
        }
        KeyCode::Enter => {
            let text = input.take_text();
            state.prompt = None;
            return match Route::parse(&text) {
                Some(route) => navigate(state, route),
                None => {
                    state.status_message = Some(format!("Unknown location: {}", text.trim()));
                    vec![]
                }
            };
        }
        code => {
            edit_input(input, code, key.modifiers);
        }
    }
    vec![]
}

/// Shared line-editing keys. Returns false when `code` is not an edit.
fn edit_input(input: &mut InputState, code: KeyCode, modifiers: KeyModifiers) -> bool {
    match code {
        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => input.insert_char(c),
        KeyCode::Backspace => input.delete_back(),
        KeyCode::Delete => input.delete_forward(),
        KeyCode::Left => input.move_left(),
        KeyCode::Right => input.move_right(),
        KeyCode::Home => input.move_home(),
        KeyCode::End => input.move_end(),
        _ => return false,
    }
    true
}

fn handle_form_key(state: &mut AppState, key: KeyEvent) -> Vec<Action> {
    let Some(form) = state.form_mut() else {
        return vec![];
    };
    let kind = form.kind;

    match key.code {
        KeyCode::Esc => return go_back(state),
        KeyCode::F(2) if kind != FormKind::PassReset => {
            return navigate(state, Route::PassReset);
        }
        KeyCode::F(3) if kind != FormKind::SignIn => {
            return navigate(state, Route::SignIn { next: None });
        }
        _ => {}
    }

    if form.done {
        if key.code == KeyCode::Enter {
            return navigate(state, Route::SignIn { next: None });
        }
        return vec![];
    }

    match key.code {
        KeyCode::Tab | KeyCode::Down => form.focus_next(),
        KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
        KeyCode::Enter => return submit_form(state),
        code => form.edit(|input| {
            edit_input(input, code, key.modifiers);
        }),
    }
    vec![]
}

fn submit_form(state: &mut AppState) -> Vec<Action> {
    let link = match &state.route {
        Route::PassChange { link } => link.clone(),
        _ => String::new(),
    };
    let Some(form) = state.form_mut() else {
        return vec![];
    };
    if !form.can_submit() || !form.begin_submit() {
        return vec![];
    }
    let action = match form.kind {
        FormKind::SignIn => Action::SubmitSignIn {
            credentials: Credentials {
                username: form.value("username").trim().to_string(),
                password: form.value("password").to_string(),
            },
        },
        FormKind::PassReset => Action::SubmitPassReset {
            email: form.value("email").trim().to_string(),
        },
        FormKind::PassChange => Action::SubmitPassChange {
            link,
            password: form.value("password").to_string(),
        },
    };
    vec![action]
}

/// Path of the `index`th breadcrumb, counting the bucket root as 0. The
/// current path is not a target.
fn crumb_target(path: &str, index: usize) -> Option<String> {
    std::iter::once(String::new())
        .chain(paths::get_breadcrumbs(path))
        .nth(index)
        .filter(|target| target != path)
}

fn move_selection(selected: &mut usize, len: usize, code: KeyCode) -> bool {
    match code {
        KeyCode::Up | KeyCode::Char('k') => *selected = selected.saturating_sub(1),
        KeyCode::Down | KeyCode::Char('j') => {
            if *selected + 1 < len {
                *selected += 1;
            }
        }
        KeyCode::Home => *selected = 0,
        KeyCode::End => *selected = len.saturating_sub(1),
        _ => return false,
    }
    true
}

fn handle_buckets_key(state: &mut AppState, key: KeyEvent) -> Vec<Action> {
    let Screen::Buckets(view) = &mut state.screen else {
        return vec![];
    };
    let len = view.names.ready().map(Vec::len).unwrap_or(0);
    if move_selection(&mut view.selected, len, key.code) {
        return vec![];
    }
    match key.code {
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
            let name = view.names.ready().and_then(|n| n.get(view.selected)).cloned();
            match name {
                Some(name) => navigate(state, Route::bucket(name, "")),
                None => vec![],
            }
        }
        KeyCode::Char('r') => {
            let route = state.route.clone();
            replace(state, route)
        }
        KeyCode::Char(':') | KeyCode::Char('g') => {
            open_prompt(state);
            vec![]
        }
        KeyCode::Esc => go_back(state),
        KeyCode::Char('q') => vec![Action::Quit],
        _ => vec![],
    }
}

fn handle_browser_key(state: &mut AppState, key: KeyEvent) -> Vec<Action> {
    let Some(view) = state.browser_mut() else {
        return vec![];
    };
    let len = view.listing.ready().map(|l| l.len()).unwrap_or(0);
    if view.is_dir() && move_selection(&mut view.selected, len, key.code) {
        return vec![];
    }
    let bucket = view.bucket.clone();
    let path = view.path.clone();

    match key.code {
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
            let key = if view.is_dir() {
                view.selected_key().map(str::to_string)
            } else {
                None
            };
            match key {
                Some(key) => navigate(state, Route::bucket(bucket, key)),
                None => vec![],
            }
        }
        KeyCode::Backspace | KeyCode::Left | KeyCode::Char('h') => {
            if path.is_empty() {
                navigate(state, Route::Buckets)
            } else {
                navigate(state, Route::bucket(bucket, paths::up(&path)))
            }
        }
        KeyCode::Char(c @ '1'..='9') => {
            let index = usize::from(c as u8 - b'1');
            match crumb_target(&path, index) {
                Some(target) => navigate(state, Route::bucket(bucket, target)),
                None => vec![],
            }
        }
        KeyCode::Char('d') if !view.is_dir() => vec![Action::ResolveDownload {
            handle: view.handle(),
        }],
        KeyCode::Char('r') => {
            let route = state.route.clone();
            replace(state, route)
        }
        KeyCode::Char(':') | KeyCode::Char('g') => {
            open_prompt(state);
            vec![]
        }
        KeyCode::Esc => go_back(state),
        KeyCode::Char('q') => vec![Action::Quit],
        _ => vec![],
    }
}
