use anyhow::Result;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::config::SmtpConfig;

/// Outbound mail delivery. Cheap to clone; the underlying transport pools
/// its connections.
#[derive(Clone)]
pub struct Mailer {
    transport: SmtpTransport,
    from_address: String,
    skip_send: bool,
}

impl Mailer {
    pub fn from_config(config: &SmtpConfig) -> Result<Self> {
        let transport = if config.username.is_empty() {
            SmtpTransport::builder_dangerous(&config.host)
                .port(config.port)
                .build()
        } else {
            let creds = Credentials::new(config.username.clone(), config.password.clone());
            SmtpTransport::relay(&config.host)?
                .port(config.port)
                .credentials(creds)
                .build()
        };

        Ok(Self {
            transport,
            from_address: config.from_address.clone(),
            skip_send: config.skip_send,
        })
    }

    /// Sends the password reset link to the account's email address.
    pub fn send_reset_email(
        &self,
        to_email: &str,
        name: &str,
        reset_url: &str,
        valid_minutes: i64,
    ) -> Result<()> {
        if self.skip_send {
            tracing::info!(to_email, "Skipping reset email delivery");
            tracing::debug!(reset_url, "Reset link");
            return Ok(());
        }

        let body = format!(
            r#"<h2>Hello {name}</h2>
<p>Please use the link below to reset your password.</p>
<p>The link is valid for {valid_minutes} minutes.</p>
<p><a href="{reset_url}">{reset_url}</a></p>
<p>If you did not request a password reset, you can ignore this email.</p>
<p>Regards,</p>
<p>The Gatehouse Team</p>
"#
        );

        let email = Message::builder()
            .from(self.from_address.parse()?)
            .to(to_email.parse()?)
            .subject("Password Reset Request")
            .header(ContentType::TEXT_HTML)
            .body(body)?;

        self.transport.send(&email)?;
        Ok(())
    }
}
