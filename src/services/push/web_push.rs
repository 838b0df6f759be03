use crate::config::{DeliveryConfig, VapidConfig};
use crate::domain::subscription::SubscriptionKeys;
use crate::services::push::transport::{PushTransport, TransportError};
use anyhow::Context;
use async_trait::async_trait;
use web_push::{ContentEncoding, SubscriptionInfo, VapidSignatureBuilder, WebPushMessage, WebPushMessageBuilder};

/// Production transport: builds a VAPID-signed, RFC 8291 encrypted message
/// with the `web-push` crate and sends it over a shared reqwest client.
#[derive(Debug)]
pub struct WebPushTransport {
    client: reqwest::Client,
    private_key: String,
    subject: String,
    ttl_secs: u32,
}

impl WebPushTransport {
    #[must_use]
    pub fn new(vapid: &VapidConfig, delivery: &DeliveryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            private_key: vapid.private_key.clone(),
            subject: vapid.subject.clone(),
            ttl_secs: delivery.ttl_secs,
        }
    }

    fn build_message(
        &self,
        endpoint: &str,
        keys: &SubscriptionKeys,
        payload: &[u8],
    ) -> anyhow::Result<WebPushMessage> {
        let sub_info = SubscriptionInfo::new(endpoint, &keys.p256dh, &keys.auth);

        let mut sig_builder = VapidSignatureBuilder::from_base64(&self.private_key, &sub_info)
            .context("Failed to build VAPID signature")?;
        sig_builder.add_claim("sub", self.subject.as_str());
        let signature = sig_builder.build().context("Failed to sign VAPID JWT")?;

        let mut builder = WebPushMessageBuilder::new(&sub_info);
        builder.set_payload(ContentEncoding::Aes128Gcm, payload);
        builder.set_vapid_signature(signature);
        builder.set_ttl(self.ttl_secs);
        builder.build().context("Failed to build web push message")
    }
}

#[async_trait]
impl PushTransport for WebPushTransport {
    async fn send(&self, endpoint: &str, keys: &SubscriptionKeys, payload: &[u8]) -> Result<(), TransportError> {
        let message = self.build_message(endpoint, keys, payload)?;

        let mut request =
            self.client.post(message.endpoint.to_string()).header("TTL", message.ttl.to_string());

        if let Some(urgency) = message.urgency {
            request = request.header("Urgency", urgency.to_string());
        }
        if let Some(topic) = message.topic {
            request = request.header("Topic", topic);
        }
        if let Some(push_payload) = message.payload {
            request = request
                .header("Content-Encoding", push_payload.content_encoding.to_str())
                .header("Content-Type", "application/octet-stream");

            for (key, value) in &push_payload.crypto_headers {
                request = request.header(*key, value.as_str());
            }

            request = request.body(push_payload.content);
        }

        let response = request
            .send()
            .await
            .map_err(|e| anyhow::Error::new(e).context("Web push HTTP request failed"))?;

        let status = response.status().as_u16();
        match status {
            200..=299 => Ok(()),
            // Both codes mark the endpoint permanently invalid across the
            // major push services; everything else may recover.
            404 | 410 => Err(TransportError::Gone),
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(TransportError::Other(anyhow::anyhow!("Push service returned HTTP {status}: {body}")))
            }
        }
    }
}
