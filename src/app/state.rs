use crate::app::form::Form;
use crate::app::route::{self, Route};
use crate::auth::submit::FormKind;
use crate::auth::Session;
use crate::config::AppConfig;
use crate::s3::store::{Listing, Preview};
use crate::s3::{paths, S3Handle};

/// A value fetched in the background.
#[derive(Debug, Clone, PartialEq)]
pub enum Loadable<T> {
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Loadable<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Loadable::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Loadable::Loading)
    }
}

impl<T> From<Result<T, String>> for Loadable<T> {
    fn from(result: Result<T, String>) -> Self {
        match result {
            Ok(value) => Loadable::Ready(value),
            Err(e) => Loadable::Failed(e),
        }
    }
}

#[derive(Debug)]
pub struct InputState {
    pub text: String,
    pub cursor: usize,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            cursor: 0,
        }
    }

    pub fn insert_char(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn delete_back(&mut self) {
        if self.cursor > 0 {
            let prev = self.text[..self.cursor]
                .char_indices()
                .next_back()
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.text.drain(prev..self.cursor);
            self.cursor = prev;
        }
    }

    pub fn delete_forward(&mut self) {
        if self.cursor < self.text.len() {
            let next = self.text[self.cursor..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor + i)
                .unwrap_or(self.text.len());
            self.text.drain(self.cursor..next);
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor = self.text[..self.cursor]
                .char_indices()
                .next_back()
                .map(|(i, _)| i)
                .unwrap_or(0);
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.text.len() {
            self.cursor = self.text[self.cursor..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor + i)
                .unwrap_or(self.text.len());
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.len();
    }

    /// Characters before the cursor, for cursor placement.
    pub fn cursor_chars(&self) -> usize {
        self.text[..self.cursor].chars().count()
    }

    pub fn take_text(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

/// The bucket list screen.
#[derive(Debug)]
pub struct BucketsView {
    pub names: Loadable<Vec<String>>,
    pub selected: usize,
}

/// A bucket directory or object.
#[derive(Debug)]
pub struct BrowserView {
    pub bucket: String,
    pub path: String,
    pub listing: Loadable<Listing>,
    pub selected: usize,
    /// README shown under a directory listing.
    pub readme: Option<Loadable<Preview>>,
    /// Content of the object when `path` is a file.
    pub preview: Loadable<Preview>,
}

impl BrowserView {
    pub fn new(bucket: String, path: String) -> Self {
        Self {
            bucket,
            path,
            listing: Loadable::Loading,
            selected: 0,
            readme: None,
            preview: Loadable::Loading,
        }
    }

    pub fn is_dir(&self) -> bool {
        paths::is_dir(&self.path)
    }

    pub fn handle(&self) -> S3Handle {
        S3Handle::new(self.bucket.clone(), self.path.clone())
    }

    pub fn selected_key(&self) -> Option<&str> {
        self.listing.ready().and_then(|l| l.key_at(self.selected))
    }
}

/// State for the current screen. Rebuilt on every navigation.
#[derive(Debug)]
pub enum Screen {
    Form(Form),
    Buckets(BucketsView),
    Browser(BrowserView),
}

pub struct AppState {
    pub config: AppConfig,
    pub session: Option<Session>,
    pub route: Route,
    pub history: Vec<Route>,
    pub screen: Screen,
    /// Go-to prompt, when open.
    pub prompt: Option<InputState>,
    pub should_quit: bool,
    pub dirty: bool,
    pub status_message: Option<String>,
    pub tick_count: u64,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            session: None,
            route: Route::SignIn { next: None },
            history: Vec::new(),
            screen: Screen::Form(Form::sign_in()),
            prompt: None,
            should_quit: false,
            dirty: true,
            status_message: None,
            tick_count: 0,
        }
    }

    pub fn authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn form(&self) -> Option<&Form> {
        match &self.screen {
            Screen::Form(form) => Some(form),
            _ => None,
        }
    }

    pub fn form_mut(&mut self) -> Option<&mut Form> {
        match &mut self.screen {
            Screen::Form(form) => Some(form),
            _ => None,
        }
    }

    pub fn form_for(&mut self, kind: FormKind) -> Option<&mut Form> {
        self.form_mut().filter(|f| f.kind == kind)
    }

    pub fn browser(&self) -> Option<&BrowserView> {
        match &self.screen {
            Screen::Browser(view) => Some(view),
            _ => None,
        }
    }

    pub fn browser_mut(&mut self) -> Option<&mut BrowserView> {
        match &mut self.screen {
            Screen::Browser(view) => Some(view),
            _ => None,
        }
    }

    /// Whether anything is waiting on a background task.
    pub fn busy(&self) -> bool {
        match &self.screen {
            Screen::Form(form) => form.submitting,
            Screen::Buckets(view) => view.names.is_loading(),
            Screen::Browser(view) => {
                if view.is_dir() {
                    view.listing.is_loading()
                } else {
                    view.preview.is_loading()
                }
            }
        }
    }

    /// Switch to `route` after applying navigation guards. Returns the
    /// route actually shown.
    pub fn enter(&mut self, route: Route) -> &Route {
        let route = route::guard(
            route,
            self.authenticated(),
            &self.config.browse.sign_in_redirect,
        );
        self.screen = match &route {
            Route::SignIn { .. } => Screen::Form(Form::sign_in()),
            Route::PassReset => Screen::Form(Form::pass_reset()),
            Route::PassChange { .. } => Screen::Form(Form::pass_change()),
            Route::Buckets => Screen::Buckets(BucketsView {
                names: Loadable::Loading,
                selected: 0,
            }),
            Route::Bucket { bucket, path } => {
                Screen::Browser(BrowserView::new(bucket.clone(), path.clone()))
            }
        };
        self.route = route;
        self.status_message = None;
        self.dirty = true;
        &self.route
    }

    pub fn status_line(&self) -> String {
        if let Some(ref msg) = self.status_message {
            return msg.clone();
        }
        match &self.session {
            Some(session) => format!("Signed in as {}", session.username),
            None => "Not signed in".to_string(),
        }
    }
}
