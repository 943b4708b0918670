//! `wakeshift webhook`: manage the Oura webhook subscription.

use wakeshift_providers::oura::{OuraProvider, WebhookSubscription};

use crate::config::WakeshiftConfig;
use crate::error::{ClientError, ClientResult};

fn provider(config: &WakeshiftConfig) -> ClientResult<OuraProvider> {
    let oura = config.oura.as_ref().ok_or_else(|| {
        ClientError::config("no [oura] section in config.toml; run `wakeshift auth oura` first")
    })?;
    Ok(OuraProvider::new(oura.to_provider_config()?)?)
}

/// Lists subscriptions.
pub async fn list(config: &WakeshiftConfig) -> ClientResult<()> {
    let subs = provider(config)?.client().list_subscriptions().await?;
    print!("{}", render_subscriptions(&subs));
    Ok(())
}

/// Subscribes `url` to new sleep data.
pub async fn subscribe(
    url: &str,
    verification_token: Option<String>,
    config: &WakeshiftConfig,
) -> ClientResult<()> {
    let token = match verification_token {
        Some(token) => token,
        None => config.webhook.resolve_token()?.ok_or_else(|| {
            ClientError::config(
                "a verification token is required; pass --verification-token \
                 or set webhook.verification_token",
            )
        })?,
    };

    println!("Creating webhook subscription...");
    println!("  Callback URL: {url}");
    println!("  Data type: sleep");
    println!("  Event type: create");

    let sub = provider(config)?
        .client()
        .create_subscription(url, &token)
        .await?;

    println!();
    println!("Subscription created:");
    println!("  ID: {}", sub.id);
    println!("  Expiration: {}", or_dash(&sub.expiration_time));
    Ok(())
}

/// Deletes a subscription.
pub async fn delete(id: &str, config: &WakeshiftConfig) -> ClientResult<()> {
    provider(config)?.client().delete_subscription(id).await?;
    println!("Subscription {id} deleted.");
    Ok(())
}

fn or_dash(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}

fn render_subscriptions(subs: &[WebhookSubscription]) -> String {
    let mut out = String::from("Current webhook subscriptions:\n");
    if subs.is_empty() {
        out.push_str("  (none)\n");
    }
    for sub in subs {
        out.push_str(&format!(
            "  ID: {}\n    URL: {}\n    Data type: {}\n    Event type: {}\n    Expiration: {}\n\n",
            sub.id,
            or_dash(&sub.callback_url),
            or_dash(&sub.data_type),
            or_dash(&sub.event_type),
            or_dash(&sub.expiration_time),
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_empty() {
        assert_eq!(
            render_subscriptions(&[]),
            "Current webhook subscriptions:\n  (none)\n"
        );
    }

    #[test]
    fn render_entries() {
        let subs = vec![WebhookSubscription {
            id: "sub-1".into(),
            callback_url: Some("https://tunnel.example/webhook/oura".into()),
            event_type: Some("create".into()),
            data_type: Some("sleep".into()),
            expiration_time: None,
        }];
        assert_eq!(
            render_subscriptions(&subs),
            "Current webhook subscriptions:\n  ID: sub-1\n    URL: https://tunnel.example/webhook/oura\n    Data type: sleep\n    Event type: create\n    Expiration: -\n\n"
        );
    }

    #[tokio::test]
    async fn commands_need_oura_section() {
        let config = WakeshiftConfig::default();
        let err = list(&config).await.unwrap_err();
        assert!(err.to_string().contains("wakeshift auth oura"));
    }
}
