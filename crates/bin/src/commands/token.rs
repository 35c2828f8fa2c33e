//! Token command - issues a session token for an account.
//!
//! Useful for exercising a deployment without the sign-in provider: the
//! printed cookie can be pasted into a browser or passed to curl.

use std::sync::Arc;

use squad::{SystemClock, auth::SessionIssuer, constants::SESSION_COOKIE, server::session_cookie};

use super::session_settings;
use crate::cli::TokenArgs;

/// Run the token command
pub fn run(args: &TokenArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (session, allow_list) = session_settings(&args.session)?;
    let issuer = SessionIssuer::new(
        &session.secret,
        session.max_age,
        allow_list,
        Arc::new(SystemClock),
    );

    let subject = args.subject.as_deref().unwrap_or(&args.email);
    let token = issuer.issue(subject, &args.email, args.name.as_deref())?;

    println!("{token}");
    eprintln!();
    eprintln!("Cookie: {SESSION_COOKIE}={token}");
    eprintln!("Set-Cookie: {}", session_cookie(&session, token.clone()));
    eprintln!("Authorization: Bearer {token}");
    Ok(())
}
