pub mod health;
pub mod serve;
pub mod token;

use std::time::Duration;

use squad::{
    auth::AllowList,
    config::{ConfigError, SessionConfig},
};

use crate::cli::SessionArgs;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Validate the session flags shared by `serve` and `token`.
fn session_settings(args: &SessionArgs) -> Result<(SessionConfig, AllowList), ConfigError> {
    let max_age = Duration::from_secs(args.session_max_age_days.saturating_mul(SECONDS_PER_DAY));
    let session = SessionConfig::new(args.session_secret.as_str(), max_age)?
        .with_secure_cookies(args.secure_cookies);
    Ok((session, AllowList::parse(&args.allowed_domains)))
}
