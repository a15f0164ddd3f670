use anyhow::Context as _;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::config::SmtpSettings;
use crate::domain::repository::MailSender;
use crate::domain::types::TWO_FACTOR_CODE_TTL_MINUTES;
use crate::error::ApiError;

const SUBJECT: &str = "Your 2FA Code";

fn two_factor_body(code: &str) -> String {
    format!(
        "Your HBnB verification code is: {code}\n\nIt expires in {TWO_FACTOR_CODE_TTL_MINUTES} minutes."
    )
}

fn delivery_error<E>(context: &'static str) -> impl FnOnce(E) -> ApiError
where
    E: std::error::Error + Send + Sync + 'static,
{
    move |e| ApiError::MailDelivery(anyhow::Error::new(e).context(context))
}

// ── SMTP ─────────────────────────────────────────────────────────────────────

/// Sends codes through an SMTP relay (STARTTLS).
#[derive(Clone)]
pub struct SmtpMailer {
    transport: SmtpTransport,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(settings: &SmtpSettings) -> anyhow::Result<Self> {
        let transport = SmtpTransport::starttls_relay(&settings.host)
            .with_context(|| format!("invalid SMTP relay {}", settings.host))?
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .build();
        let from = settings
            .from
            .parse()
            .with_context(|| format!("invalid MAIL_FROM {:?}", settings.from))?;
        Ok(Self { transport, from })
    }
}

impl MailSender for SmtpMailer {
    async fn send_two_factor_code(&self, to: &str, code: &str) -> Result<(), ApiError> {
        let to: Mailbox = to.parse().map_err(delivery_error("invalid recipient"))?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(SUBJECT)
            .header(ContentType::TEXT_PLAIN)
            .body(two_factor_body(code))
            .map_err(delivery_error("build message"))?;

        let transport = self.transport.clone();
        tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .map_err(|e| ApiError::Internal(anyhow::Error::new(e).context("mail task failed")))?
            .map_err(delivery_error("smtp send"))?;
        Ok(())
    }
}

// ── Log only ─────────────────────────────────────────────────────────────────

/// Development mailer: writes the code to the log instead of sending it.
#[derive(Clone, Default)]
pub struct LogMailer;

impl MailSender for LogMailer {
    async fn send_two_factor_code(&self, to: &str, code: &str) -> Result<(), ApiError> {
        tracing::warn!(to, code, "SMTP not configured, two-factor code not mailed");
        Ok(())
    }
}

// ── Backend selection ────────────────────────────────────────────────────────

/// The mailer picked at startup: SMTP when `SMTP_HOST` is set.
#[derive(Clone)]
pub enum MailBackend {
    Smtp(SmtpMailer),
    Log(LogMailer),
}

impl MailSender for MailBackend {
    async fn send_two_factor_code(&self, to: &str, code: &str) -> Result<(), ApiError> {
        match self {
            Self::Smtp(mailer) => mailer.send_two_factor_code(to, code).await,
            Self::Log(mailer) => mailer.send_two_factor_code(to, code).await,
        }
    }
}
