use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::collections::HashMap;
use std::env;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: Option<String>,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub from_name: String,
}

impl SmtpConfig {
    pub fn from_env() -> Self {
        SmtpConfig {
            host: env::var("SMTP_HOST").ok(),
            port: env::var("SMTP_PORT")
                .unwrap_or_else(|_| "587".to_string())
                .parse()
                .unwrap_or(587),
            username: env::var("SMTP_USERNAME").unwrap_or_default(),
            password: env::var("SMTP_PASSWORD").unwrap_or_default(),
            from_email: env::var("SMTP_FROM_EMAIL")
                .unwrap_or_else(|_| "noreply@pitchside.club".to_string()),
            from_name: env::var("SMTP_FROM_NAME").unwrap_or_else(|_| "Pitchside".to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmailKind {
    BookingConfirmed,
    BookingCancelled,
    BookingReminder,
    Invitation,
}

#[derive(Debug, Clone)]
pub struct EmailTemplate {
    pub subject_template: String,
    pub text_template: String,
    pub html_template: String,
}

/// Values substituted into the templates. Fields that do not apply to a
/// given template kind are left empty and simply never referenced.
#[derive(Debug, Clone, Default)]
pub struct EmailContext {
    pub recipient_name: String,
    pub player_name: String,
    pub coach_name: String,
    pub session_time: String,
    pub location: String,
    pub reason: String,
    pub invite_url: String,
    pub club_name: String,
}

#[derive(Debug, Clone)]
pub struct RenderedEmail {
    pub subject: String,
    pub text: String,
    pub html: String,
}

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("No template for this email kind")]
    TemplateNotFound,
    #[error("Invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("Failed to build message: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

pub struct EmailService {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    config: SmtpConfig,
    templates: HashMap<EmailKind, EmailTemplate>,
}

impl EmailService {
    pub fn new(config: SmtpConfig) -> Result<Self, EmailError> {
        let transport = match &config.host {
            Some(host) => {
                let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
                    .port(config.port);
                if !config.username.is_empty() {
                    builder = builder.credentials(Credentials::new(
                        config.username.clone(),
                        config.password.clone(),
                    ));
                }
                Some(builder.build())
            }
            None => {
                warn!("SMTP_HOST not set, outbound email disabled");
                None
            }
        };

        let mut templates = HashMap::new();
        templates.insert(
            EmailKind::BookingConfirmed,
            EmailTemplate {
                subject_template: "Session confirmed: {{player_name}} on {{session_time}}"
                    .to_string(),
                text_template: include_str!("../templates/email/booking_confirmed.txt")
                    .to_string(),
                html_template: include_str!("../templates/email/booking_confirmed.html")
                    .to_string(),
            },
        );
        templates.insert(
            EmailKind::BookingCancelled,
            EmailTemplate {
                subject_template: "Session cancelled: {{player_name}} on {{session_time}}"
                    .to_string(),
                text_template: include_str!("../templates/email/booking_cancelled.txt")
                    .to_string(),
                html_template: include_str!("../templates/email/booking_cancelled.html")
                    .to_string(),
            },
        );
        templates.insert(
            EmailKind::BookingReminder,
            EmailTemplate {
                subject_template: "Reminder: session for {{player_name}} on {{session_time}}"
                    .to_string(),
                text_template: include_str!("../templates/email/booking_reminder.txt").to_string(),
                html_template: include_str!("../templates/email/booking_reminder.html")
                    .to_string(),
            },
        );
        templates.insert(
            EmailKind::Invitation,
            EmailTemplate {
                subject_template: "You have been invited to {{club_name}}".to_string(),
                text_template: include_str!("../templates/email/invitation.txt").to_string(),
                html_template: include_str!("../templates/email/invitation.html").to_string(),
            },
        );

        Ok(Self {
            transport,
            config,
            templates,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    pub fn render(&self, kind: EmailKind, context: &EmailContext) -> Result<RenderedEmail, EmailError> {
        let template = self.templates.get(&kind).ok_or(EmailError::TemplateNotFound)?;
        Ok(RenderedEmail {
            subject: render_template(&template.subject_template, context),
            text: render_template(&template.text_template, context),
            html: render_template(&template.html_template, context),
        })
    }

    /// Render and send one email. When no SMTP host is configured the
    /// send is skipped with a log line, not an error, so booking flows
    /// keep working in development.
    pub async fn send(
        &self,
        kind: EmailKind,
        to_email: &str,
        context: &EmailContext,
    ) -> Result<(), EmailError> {
        let rendered = self.render(kind, context)?;

        let Some(transport) = &self.transport else {
            info!("email disabled, skipping {:?} to {}", kind, to_email);
            return Ok(());
        };

        let from: Mailbox =
            format!("{} <{}>", self.config.from_name, self.config.from_email).parse()?;
        let message = Message::builder()
            .from(from)
            .to(to_email.parse()?)
            .subject(rendered.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                rendered.text,
                rendered.html,
            ))?;

        transport.send(message).await?;
        info!("sent {:?} email to {}", kind, to_email);
        Ok(())
    }
}

fn render_template(template: &str, context: &EmailContext) -> String {
    template
        .replace("{{recipient_name}}", &context.recipient_name)
        .replace("{{player_name}}", &context.player_name)
        .replace("{{coach_name}}", &context.coach_name)
        .replace("{{session_time}}", &context.session_time)
        .replace("{{location}}", &context.location)
        .replace("{{reason}}", &context.reason)
        .replace("{{invite_url}}", &context.invite_url)
        .replace("{{club_name}}", &context.club_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disabled_service() -> EmailService {
        EmailService::new(SmtpConfig {
            host: None,
            port: 587,
            username: String::new(),
            password: String::new(),
            from_email: "noreply@pitchside.club".to_string(),
            from_name: "Pitchside".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn renders_placeholders() {
        let service = disabled_service();
        let context = EmailContext {
            recipient_name: "Sam".to_string(),
            player_name: "Alex Doe".to_string(),
            coach_name: "Coach Kim".to_string(),
            session_time: "2025-06-01 10:00 UTC".to_string(),
            location: "Field 2".to_string(),
            club_name: "Pitchside FC".to_string(),
            ..Default::default()
        };

        let rendered = service.render(EmailKind::BookingConfirmed, &context).unwrap();
        assert!(rendered.subject.contains("Alex Doe"));
        assert!(rendered.text.contains("Field 2"));
        assert!(rendered.text.contains("Coach Kim"));
        assert!(!rendered.text.contains("{{"));
    }

    #[tokio::test]
    async fn disabled_transport_skips_send() {
        let service = disabled_service();
        let context = EmailContext::default();
        service
            .send(EmailKind::BookingReminder, "someone@example.com", &context)
            .await
            .unwrap();
    }
}
