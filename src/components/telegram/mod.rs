mod actor;
mod handle;

pub use actor::SEND_TIMEOUT;
pub use handle::TelegramHandle;

use async_trait::async_trait;

/// Delivers a text message to the configured recipient.
///
/// Fire-and-forget: delivery failures are logged by the implementation and
/// never reported back to the caller.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: String);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::collections::HashMap;
    use std::time::{Duration, Instant};
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(telegram_base: &str, pairs: &[(&str, &str)]) -> Config {
        let mut map: HashMap<String, String> = HashMap::new();
        map.insert("CLIENT_ID".to_string(), "id".to_string());
        map.insert("CLIENT_SECRET".to_string(), "secret".to_string());
        for (k, v) in pairs {
            map.insert(k.to_string(), v.to_string());
        }
        let mut config = Config::from_lookup(|key| map.get(key).cloned()).unwrap();
        config.endpoints.telegram_base = telegram_base.to_string();
        config
    }

    #[tokio::test]
    async fn test_send_posts_message() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/bottest-token/sendMessage"))
            .and(body_json(serde_json::json!({
                "chat_id": "42",
                "text": "06/10 - Mom's Birthday"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let config = test_config(
            &mock_server.uri(),
            &[("TELEGRAM_BOT_TOKEN", "test-token"), ("TELEGRAM_ADMIN_ID", "42")],
        );
        let notifier = TelegramHandle::new(&config).unwrap();

        notifier.send("06/10 - Mom's Birthday".to_string()).await;
        notifier.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_messages_delivered_in_order() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/bottest-token/sendMessage"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let config = test_config(
            &mock_server.uri(),
            &[("TELEGRAM_BOT_TOKEN", "test-token"), ("TELEGRAM_ADMIN_ID", "42")],
        );
        let notifier = TelegramHandle::new(&config).unwrap();

        for text in ["first", "second", "third"] {
            notifier.send(text.to_string()).await;
        }
        notifier.shutdown().await.unwrap();

        let texts: Vec<String> = mock_server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .map(|r| {
                let body: serde_json::Value = serde_json::from_slice(&r.body).unwrap();
                body["text"].as_str().unwrap().to_string()
            })
            .collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_missing_settings_fail_before_network() {
        let mock_server = MockServer::start().await;

        let no_token = test_config(&mock_server.uri(), &[("TELEGRAM_ADMIN_ID", "42")]);
        assert!(TelegramHandle::new(&no_token).is_err());

        let no_recipient = test_config(&mock_server.uri(), &[("TELEGRAM_BOT_TOKEN", "t")]);
        assert!(TelegramHandle::new(&no_recipient).is_err());

        assert!(mock_server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_delivery_is_swallowed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(2)
            .mount(&mock_server)
            .await;

        let config = test_config(
            &mock_server.uri(),
            &[("TELEGRAM_BOT_TOKEN", "test-token"), ("TELEGRAM_ADMIN_ID", "42")],
        );
        let notifier = TelegramHandle::new(&config).unwrap();

        // The second message is still attempted after the first one fails
        notifier.send("one".to_string()).await;
        notifier.send("two".to_string()).await;
        assert!(notifier.shutdown().await.is_ok());
    }

    #[tokio::test]
    async fn test_slow_api_hits_request_timeout() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&mock_server)
            .await;

        let config = test_config(
            &mock_server.uri(),
            &[("TELEGRAM_BOT_TOKEN", "test-token"), ("TELEGRAM_ADMIN_ID", "42")],
        );
        let notifier = TelegramHandle::new(&config).unwrap();

        let started = Instant::now();
        notifier.send("slow".to_string()).await;
        notifier.shutdown().await.unwrap();
        assert!(started.elapsed() < SEND_TIMEOUT + Duration::from_secs(2));
    }
}
