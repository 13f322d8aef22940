use crate::kv::RedisClient;
use async_trait::async_trait;
use derive_new::new;
use kernel::notification::{Notifier, NotifyEvent, Recipient};
use serde_json::json;
use shared::error::AppResult;
use std::sync::Arc;

/// Pushes notifications over Redis pub/sub, one channel per recipient.
/// Clients subscribe to their own channel; there is no delivery receipt
/// and no retry, matching the best-effort contract of the kernel.
#[derive(new)]
pub struct RedisNotifier {
    kv: Arc<RedisClient>,
}

impl RedisNotifier {
    fn channel_of(recipient: Recipient) -> String {
        match recipient {
            Recipient::Customer(id) => format!("notifications:customer:{id}"),
            Recipient::Technician(id) => format!("notifications:technician:{id}"),
        }
    }
}

#[async_trait]
impl Notifier for RedisNotifier {
    async fn notify(
        &self,
        recipient: Recipient,
        event: NotifyEvent,
        payload: serde_json::Value,
    ) -> AppResult<()> {
        let channel = Self::channel_of(recipient);
        let message = json!({
            "event": event.to_string(),
            "payload": payload,
        });
        self.kv.publish(&channel, &message.to_string()).await
    }
}
