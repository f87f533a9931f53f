//! WebSocket connection loop.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching subscription commands to the [`ChangeMediator`] and
//! forwarding the deliveries addressed to this connection.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage, WsMessageType};
use super::subscription::SubscriptionManager;
use crate::domain::{DeliveryTarget, OutboundEvent};
use crate::service::ChangeMediator;

/// Runs the read/write loop for a single WebSocket connection owned by
/// `user_id`.
///
/// - Reads commands from the client and applies them to both the local
///   filter and the mediator's registry.
/// - Forwards events from the [`broadcast::Receiver`] that target this
///   user or one of this connection's tables.
/// - On close, releases this connection's tables from the registry.
pub async fn run_connection(
    socket: WebSocket,
    user_id: String,
    mut event_rx: broadcast::Receiver<Arc<OutboundEvent>>,
    mediator: Arc<ChangeMediator>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();
    tracing::debug!(user_id = %user_id, "ws connection opened");

    loop {
        tokio::select! {
            // Incoming message from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let response = handle_text_message(&text, &user_id, &mut subs, &mediator);
                        if let Some(resp_json) = response
                            && ws_tx.send(Message::text(resp_json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        tracing::debug!(user_id = %user_id, error = %err, "ws read failed");
                        break;
                    }
                    _ => {}
                }
            }
            // Delivery from the EventBus
            event = event_rx.recv() => {
                match event {
                    Ok(outbound) => {
                        if !is_addressed_to(&outbound.target, &user_id, &subs) {
                            continue;
                        }
                        let msg = WsMessage::event(outbound.client_payload());
                        let Ok(json) = serde_json::to_string(&msg) else {
                            continue;
                        };
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(user_id = %user_id, lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    let tables = subs.tables();
    mediator.unsubscribe_user(&user_id, &tables);
    tracing::debug!(user_id = %user_id, released = tables.len(), "ws connection closed");
}

/// Returns `true` if a delivery with `target` belongs on this connection.
fn is_addressed_to(target: &DeliveryTarget, user_id: &str, subs: &SubscriptionManager) -> bool {
    match target {
        DeliveryTarget::User(owner) => owner == user_id,
        DeliveryTarget::Table(table) => subs.matches(table),
    }
}

/// Handles a text message from the client, returning an optional JSON response.
fn handle_text_message(
    text: &str,
    user_id: &str,
    subs: &mut SubscriptionManager,
    mediator: &ChangeMediator,
) -> Option<String> {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return serde_json::to_string(&WsMessage::error(String::new(), 400, "malformed JSON")).ok();
    };

    if msg.msg_type != WsMessageType::Command {
        return serde_json::to_string(&WsMessage::error(msg.id, 400, "expected a command")).ok();
    }

    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
        return serde_json::to_string(&WsMessage::error(msg.id, 404, "unknown command")).ok();
    };

    let response = match command {
        WsCommand::Subscribe { tables } => {
            subs.subscribe(&tables);
            mediator.subscribe_user(user_id, &tables);
            tracing::debug!(user_id, tables = ?tables, "ws subscribe");
            WsMessage::response(
                msg.id,
                serde_json::json!({
                    "subscribed": tables,
                    "subscriptions": mediator.list_subscriptions(user_id),
                }),
            )
        }
        WsCommand::Unsubscribe { tables } => {
            subs.unsubscribe(&tables);
            mediator.unsubscribe_user(user_id, &tables);
            tracing::debug!(user_id, tables = ?tables, "ws unsubscribe");
            WsMessage::response(
                msg.id,
                serde_json::json!({
                    "unsubscribed": tables,
                    "subscriptions": mediator.list_subscriptions(user_id),
                }),
            )
        }
        WsCommand::ListSubscriptions => WsMessage::response(
            msg.id,
            serde_json::json!({
                "subscriptions": mediator.list_subscriptions(user_id),
                "connection_tables": subs.tables(),
            }),
        ),
    };
    serde_json::to_string(&response).ok()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    const SUBSCRIBE_GOALS_PLANS: &str = r#"{"id":"c1","type":"command","payload":{"command":"subscribe","tables":["goals","plans"]}}"#;
    const UNSUBSCRIBE_GOALS: &str =
        r#"{"id":"c2","type":"command","payload":{"command":"unsubscribe","tables":["goals"]}}"#;

    fn reply(text: &str, subs: &mut SubscriptionManager, mediator: &ChangeMediator) -> WsMessage {
        let Some(json) = handle_text_message(text, "u1", subs, mediator) else {
            panic!("expected a reply");
        };
        let Ok(msg) = serde_json::from_str::<WsMessage>(&json) else {
            panic!("reply should be a valid envelope");
        };
        msg
    }

    #[test]
    fn subscribe_updates_filter_and_registry() {
        let mediator = ChangeMediator::new();
        let mut subs = SubscriptionManager::new();
        let msg = reply(SUBSCRIBE_GOALS_PLANS, &mut subs, &mediator);
        assert_eq!(msg.msg_type, WsMessageType::Response);
        assert_eq!(msg.id, "c1");
        assert!(subs.matches("goals"));
        assert_eq!(
            mediator.list_subscriptions("u1"),
            vec!["goals".to_string(), "plans".to_string()]
        );
    }

    #[test]
    fn unsubscribe_updates_filter_and_registry() {
        let mediator = ChangeMediator::new();
        let mut subs = SubscriptionManager::new();
        let _ = reply(SUBSCRIBE_GOALS_PLANS, &mut subs, &mediator);
        let msg = reply(UNSUBSCRIBE_GOALS, &mut subs, &mediator);
        assert_eq!(msg.payload["subscriptions"], serde_json::json!(["plans"]));
        assert!(!subs.matches("goals"));
    }

    #[test]
    fn list_reports_registry_and_socket_tables_separately() {
        let mediator = ChangeMediator::new();
        let mut first_tab = SubscriptionManager::new();
        let mut second_tab = SubscriptionManager::new();
        let _ = reply(SUBSCRIBE_GOALS_PLANS, &mut first_tab, &mediator);
        let _ = reply(SUBSCRIBE_GOALS_PLANS, &mut second_tab, &mediator);

        // first tab closes and releases its tables
        mediator.unsubscribe_user("u1", first_tab.tables());

        let list = r#"{"id":"c3","type":"command","payload":{"command":"list_subscriptions"}}"#;
        let msg = reply(list, &mut second_tab, &mediator);
        assert_eq!(msg.payload["subscriptions"], serde_json::json!([]));
        assert_eq!(
            msg.payload["connection_tables"],
            serde_json::json!(["goals", "plans"])
        );
    }

    #[test]
    fn malformed_json_yields_error() {
        let mediator = ChangeMediator::new();
        let mut subs = SubscriptionManager::new();
        let msg = reply("not json", &mut subs, &mediator);
        assert_eq!(msg.msg_type, WsMessageType::Error);
        assert_eq!(msg.payload["code"], 400);
    }

    #[test]
    fn unknown_command_yields_error() {
        let mediator = ChangeMediator::new();
        let mut subs = SubscriptionManager::new();
        let msg = reply(
            r#"{"id":"c9","type":"command","payload":{"command":"swap"}}"#,
            &mut subs,
            &mediator,
        );
        assert_eq!(msg.msg_type, WsMessageType::Error);
        assert_eq!(msg.id, "c9");
        assert_eq!(msg.payload["code"], 404);
    }

    #[test]
    fn addressing_rules() {
        let mut subs = SubscriptionManager::new();
        subs.subscribe(&["goals".to_string()]);
        assert!(is_addressed_to(&DeliveryTarget::User("u1".to_string()), "u1", &subs));
        assert!(!is_addressed_to(&DeliveryTarget::User("u2".to_string()), "u1", &subs));
        assert!(is_addressed_to(&DeliveryTarget::Table("goals".to_string()), "u1", &subs));
        assert!(!is_addressed_to(&DeliveryTarget::Table("plans".to_string()), "u1", &subs));
    }
}
