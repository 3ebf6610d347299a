//! Outgoing text messages.

use std::future::Future;

use folio_core::PhoneNumber;

use super::mail::DeliveryError;

/// Something that can deliver a text message.
pub trait SmsSender: Sync {
    /// Send `body` to `to`.
    fn send(
        &self,
        to: &PhoneNumber,
        body: &str,
    ) -> impl Future<Output = Result<(), DeliveryError>> + Send;
}

/// SMS sender used when no provider is configured. Every send fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledSms;

impl SmsSender for DisabledSms {
    async fn send(&self, to: &PhoneNumber, _body: &str) -> Result<(), DeliveryError> {
        tracing::warn!(to = %to, "SMS requested but no provider is configured");
        Err(DeliveryError::Unavailable)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_sms_always_fails() {
        let phone = PhoneNumber::parse("+44 20 7946 0018").unwrap();
        let result = DisabledSms.send(&phone, "123456").await;
        assert!(matches!(result, Err(DeliveryError::Unavailable)));
    }
}
