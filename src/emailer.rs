//! Email delivery over implicit-TLS SMTP.

use crate::error::{DigestError, Result};
use lettre::message::{Mailbox, Message, header::ContentType};
use lettre::transport::smtp::{AsyncSmtpTransport, authentication::Credentials};
use lettre::{AsyncTransport, Tokio1Executor};
use tracing::{info, instrument};

/// Environment variable holding the SMTP app password.
pub const PASSWORD_ENV: &str = "GMAIL_APP_PASSWORD";

const AUTH_FAILED_HINT: &str = "SMTP authentication failed (535). Set GMAIL_APP_PASSWORD to an App \
     Password for the Gmail account that matches from_email, not the normal account password.";

/// Validate the app password, typically read from [`PASSWORD_ENV`].
pub fn resolve_password(value: Option<String>) -> Result<String> {
    match value {
        Some(p) if !p.trim().is_empty() => Ok(p.trim().to_string()),
        _ => Err(DigestError::Email(format!(
            "Missing {PASSWORD_ENV}. Set it in your environment before sending email."
        ))),
    }
}

fn mailbox(address: &str, role: &str) -> Result<Mailbox> {
    address
        .trim()
        .parse()
        .map_err(|e| DigestError::Email(format!("invalid {role} address {address:?}: {e}")))
}

/// Build the HTML digest message.
pub fn build_message(
    html: &str,
    subject: &str,
    from_email: &str,
    to_email: &str,
) -> Result<Message> {
    Message::builder()
        .from(mailbox(from_email, "from")?)
        .to(mailbox(to_email, "to")?)
        .subject(subject)
        .header(ContentType::TEXT_HTML)
        .body(html.to_string())
        .map_err(|e| DigestError::Email(format!("build email: {e}")))
}

/// Send the digest, authenticating as `from_email` with the app password.
///
/// The password is read from [`PASSWORD_ENV`] at call time, so dry runs never
/// need it.
///
/// # Errors
///
/// Returns [`DigestError::Email`] when the password is missing, an address
/// does not parse, or the SMTP exchange fails. A 535 reply gets a hint about
/// App Passwords.
#[instrument(level = "info", skip(html), fields(bytes = html.len()))]
pub async fn send_email(
    html: &str,
    subject: &str,
    from_email: &str,
    to_email: &str,
    smtp_host: &str,
    smtp_port: u16,
) -> Result<()> {
    let password = resolve_password(std::env::var(PASSWORD_ENV).ok())?;
    let message = build_message(html, subject, from_email, to_email)?;

    let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(smtp_host)
        .map_err(|e| DigestError::Email(format!("invalid SMTP host {smtp_host}: {e}")))?
        .port(smtp_port)
        .credentials(Credentials::new(from_email.trim().to_string(), password))
        .build();

    mailer.send(message).await.map_err(|e| {
        if e.status().is_some_and(|code| code.to_string() == "535") {
            DigestError::Email(AUTH_FAILED_HINT.to_string())
        } else {
            DigestError::Email(format!("send email: {e}"))
        }
    })?;

    info!(to = %to_email, "Email sent");
    Ok(())
}
