use async_trait::async_trait;
use chrono::Utc;
use config_engine::SmsGatewaySettings;
use lazy_static::lazy_static;
use logger_redacted::mask_phone;
use regex::Regex;

use notification_queue::{Channel, NotificationPayload, QueueError, QueueItem};

use crate::error::{SmsError, SmsResult};

const MAX_SMS_LEN: usize = 160;

lazy_static! {
    /// E.164: a plus, a non-zero leading digit, then 10-14 more digits
    /// (total 11-15 digits including the leading one), per §4.4.
    static ref E164: Regex = Regex::new(r"^\+[1-9]\d{10,14}$").expect("static E.164 pattern is valid");
}

pub fn validate_e164(phone: &str) -> SmsResult<()> {
    if E164.is_match(phone) {
        Ok(())
    } else {
        Err(SmsError::InvalidRecipient(mask_phone(phone)))
    }
}

/// Builds the SMS body from the §4.4 template, shortening the hospital name
/// one character at a time until the message fits in 160 characters
/// (§4.4: "hard 160-char truncation by shortening the hospital name").
/// Falls back to truncating the whole message if the hospital name alone
/// can't make it fit (a very long dashboard URL, say).
fn render_body(payload: &NotificationPayload) -> String {
    let hours_left = payload.hours_remaining(Utc::now());
    let mut hospital = payload.hospital_name.clone();

    loop {
        let body = format!(
            "[SIDOT] ALERTA CRITICO: Obito PCR detectado. Hosp: {hospital} Idade: {age} Janela: {hours_left}h restantes. Acao: {short_link}",
            age = payload.age_years,
            short_link = payload.dashboard_url,
        );
        if body.chars().count() <= MAX_SMS_LEN || hospital.is_empty() {
            if body.chars().count() <= MAX_SMS_LEN {
                return body;
            }
            return body.chars().take(MAX_SMS_LEN - 1).collect::<String>() + "\u{2026}";
        }
        hospital.pop();
    }
}

/// Delivers notifications over an HTTP SMS gateway (§4.4). When
/// `SmsGatewaySettings::is_configured()` is false the channel logs the
/// would-be message and returns success, matching the email channel's
/// no-op-when-unconfigured behavior.
pub struct SmsChannel {
    settings: SmsGatewaySettings,
    http: reqwest::Client,
}

impl SmsChannel {
    pub fn new(settings: SmsGatewaySettings) -> Self {
        Self { settings, http: reqwest::Client::new() }
    }

    async fn deliver(&self, to: &str, body: &str) -> SmsResult<()> {
        let (Some(base_url), Some(api_key)) = (self.settings.api_base_url.as_deref(), self.settings.api_key.as_deref()) else {
            tracing::info!(recipient = %mask_phone(to), "SMS gateway unconfigured, logging notification instead of sending");
            return Ok(());
        };

        let response = self
            .http
            .post(base_url)
            .bearer_auth(api_key)
            .json(&serde_json::json!({
                "to": to,
                "from": self.settings.sender_id,
                "body": body,
            }))
            .send()
            .await
            .map_err(|e| SmsError::Gateway(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SmsError::Gateway(format!("gateway returned {}", response.status())));
        }
        Ok(())
    }
}

#[async_trait]
impl Channel for SmsChannel {
    async fn send(&self, item: &QueueItem) -> notification_queue::Result<()> {
        validate_e164(&item.recipient).map_err(|e| QueueError::ChannelSend(e.to_string()))?;
        let payload: NotificationPayload =
            serde_json::from_str(&item.payload).map_err(|e| QueueError::ChannelSend(SmsError::from(e).to_string()))?;
        let body = render_body(&payload);
        self.deliver(&item.recipient, &body).await.map_err(|e| QueueError::ChannelSend(e.to_string()))
    }
}
