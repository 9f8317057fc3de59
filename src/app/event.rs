use crate::auth::submit::{FormKind, Outcome};
use crate::auth::Session;
use crate::s3::store::{Listing, Preview};
use crate::s3::S3Handle;
use crossterm::event::Event as CrosstermEvent;

#[derive(Debug)]
pub enum AppEvent {
    /// Terminal input event
    Terminal(CrosstermEvent),

    /// The auth processor signed in or out
    SessionChanged(Option<Session>),

    /// A submit task finished awaiting its result
    FormSettled {
        form: FormKind,
        outcome: Outcome,
    },

    /// Background store reads
    BucketsLoaded(Result<Vec<String>, String>),
    ListingLoaded {
        bucket: String,
        prefix: String,
        result: Result<Listing, String>,
    },
    PreviewLoaded {
        handle: S3Handle,
        result: Result<Preview, String>,
    },
    ReadmeLoaded {
        handle: S3Handle,
        result: Result<Preview, String>,
    },

    /// Tick for UI refresh
    Tick,
}
