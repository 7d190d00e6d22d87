use async_trait::async_trait;
use chrono::Utc;
use config_engine::SmtpSettings;
use handlebars::Handlebars;
use mail_builder::MessageBuilder;
use mail_send::{Credentials, SmtpClientBuilder};
use serde_json::json;

use notification_queue::{Channel, NotificationPayload, QueueError, QueueItem};

use crate::error::{EmailError, EmailResult};

const SUBJECT_TEMPLATE: &str = "[VitalConnect] {{hospital_name}} - possible corneal donation";

const BODY_TEMPLATE: &str = "A potential corneal donation has been detected at \
{{hospital_name}}{{#if sector}} ({{sector}}){{/if}}.

Death recorded at: {{death_at}}
Time remaining in the donation window: {{minutes_remaining}} minutes
Priority score: {{priority_score}}/100

Review and respond: {{dashboard_url}}

Occurrence: {{occurrence_id}}
";

/// Delivers notifications over SMTP via the Stalwart Labs `mail-send` /
/// `mail-builder` pair. When `SmtpSettings::is_configured()` is false the
/// channel logs the would-be message and returns success, so local
/// development and CI never need a real mail server (§4.4: "Not configured
/// -> silently noop (log only)").
pub struct EmailChannel {
    settings: SmtpSettings,
    renderer: Handlebars<'static>,
}

impl EmailChannel {
    pub fn new(settings: SmtpSettings) -> Self {
        let mut renderer = Handlebars::new();
        renderer
            .register_template_string("subject", SUBJECT_TEMPLATE)
            .expect("subject template is a fixed, valid handlebars string");
        renderer
            .register_template_string("body", BODY_TEMPLATE)
            .expect("body template is a fixed, valid handlebars string");
        Self { settings, renderer }
    }

    fn render(&self, payload: &NotificationPayload) -> EmailResult<(String, String)> {
        let data = json!({
            "hospital_name": payload.hospital_name,
            "sector": payload.sector,
            "death_at": payload.death_at.to_rfc3339(),
            "minutes_remaining": payload.minutes_remaining(Utc::now()),
            "priority_score": payload.priority_score,
            "dashboard_url": payload.dashboard_url,
            "occurrence_id": payload.occurrence_id.to_string(),
        });
        let subject = self
            .renderer
            .render("subject", &data)
            .map_err(|e| EmailError::Template(e.to_string()))?;
        let body = self
            .renderer
            .render("body", &data)
            .map_err(|e| EmailError::Template(e.to_string()))?;
        Ok((subject, body))
    }

    async fn deliver(&self, to: &str, subject: &str, body: &str) -> EmailResult<()> {
        let Some(host) = self.settings.host.as_deref() else {
            tracing::info!(recipient = %to, subject = %subject, "SMTP unconfigured, logging notification instead of sending");
            return Ok(());
        };
        let port = self.settings.port.unwrap_or(587);
        let from = self
            .settings
            .from_address
            .as_deref()
            .unwrap_or("noreply@vitalconnect.dev");

        let message = MessageBuilder::new()
            .from(("VitalConnect", from))
            .to(vec![to])
            .subject(subject)
            .text_body(body.to_string());

        let mut builder = SmtpClientBuilder::new(host, port).implicit_tls(port == 465);
        if let (Some(username), Some(password)) = (self.settings.username.as_deref(), self.settings.password.as_deref()) {
            builder = builder.credentials(Credentials::new(username, password));
        }

        let mut client = builder.connect().await.map_err(|e| EmailError::Smtp(e.to_string()))?;
        client.send(message).await.map_err(|e| EmailError::Smtp(e.to_string()))?;
        Ok(())
    }

    /// Sends a plain subject/body email outside the notification queue's
    /// templated payload, for callers that don't have an occurrence to
    /// render (health-monitor's admin alert, §4.5).
    pub async fn send_raw(&self, to: &str, subject: &str, body: &str) -> EmailResult<()> {
        self.deliver(to, subject, body).await
    }
}

#[async_trait]
impl Channel for EmailChannel {
    async fn send(&self, item: &QueueItem) -> notification_queue::Result<()> {
        let payload: NotificationPayload =
            serde_json::from_str(&item.payload).map_err(|e| QueueError::ChannelSend(EmailError::from(e).to_string()))?;
        let (subject, body) = self
            .render(&payload)
            .map_err(|e| QueueError::ChannelSend(e.to_string()))?;
        self.deliver(&item.recipient, &subject, &body)
            .await
            .map_err(|e| QueueError::ChannelSend(e.to_string()))
    }
}
