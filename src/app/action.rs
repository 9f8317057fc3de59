use crate::auth::Credentials;
use crate::s3::S3Handle;

#[derive(Debug)]
pub enum Action {
    SubmitSignIn { credentials: Credentials },
    SubmitPassReset { email: String },
    SubmitPassChange { link: String, password: String },
    SignOut,
    LoadBuckets,
    LoadListing { bucket: String, prefix: String },
    LoadPreview { handle: S3Handle },
    LoadReadme { handle: S3Handle },
    ResolveDownload { handle: S3Handle },
    Quit,
}
