use crate::notification::model::ServerMessage;
use crate::post::post_model::Post;
use actix::prelude::*;
use std::collections::HashMap;

/// Message sent to the hub to register a subscriber
#[derive(Message)]
#[rtype(result = "()")]
pub struct Connect {
    pub session_id: String,
    pub addr: Recipient<WsMessage>,
}

/// Message sent to the hub when a subscriber goes away
#[derive(Message)]
#[rtype(result = "()")]
pub struct Disconnect {
    pub session_id: String,
}

/// Fan a freshly created post out to every subscriber
#[derive(Message)]
#[rtype(result = "()")]
pub struct BroadcastNewPost {
    pub post: Post,
}

/// Number of currently registered subscribers
#[cfg(test)]
#[derive(Message)]
#[rtype(result = "usize")]
pub struct SubscriberCount;

/// Serialized frame pushed to a session
#[derive(Message)]
#[rtype(result = "()")]
pub struct WsMessage(pub String);

/// Registry of live WebSocket subscribers.
///
/// Being an actor, registration, removal and broadcast are processed one at a
/// time from its mailbox.
pub struct NotificationHub {
    sessions: HashMap<String, Recipient<WsMessage>>,
}

impl NotificationHub {
    pub fn new() -> Self {
        NotificationHub {
            sessions: HashMap::new(),
        }
    }

    fn send_to_all(&self, message: &ServerMessage) {
        let msg_json = match serde_json::to_string(message) {
            Ok(json) => json,
            Err(e) => {
                log::error!("Failed to serialize notification: {}", e);
                return;
            }
        };
        for addr in self.sessions.values() {
            addr.do_send(WsMessage(msg_json.clone()));
        }
    }

    fn send_to_session(&self, session_id: &str, message: &ServerMessage) {
        if let Some(addr) = self.sessions.get(session_id) {
            if let Ok(json) = serde_json::to_string(message) {
                addr.do_send(WsMessage(json));
            }
        }
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}

impl Actor for NotificationHub {
    type Context = Context<Self>;
}

impl Handler<Connect> for NotificationHub {
    type Result = ();

    fn handle(&mut self, msg: Connect, _: &mut Context<Self>) {
        log::info!("Subscriber {} connected", msg.session_id);

        self.sessions.insert(msg.session_id.clone(), msg.addr);
        self.send_to_session(
            &msg.session_id,
            &ServerMessage::Connected {
                session_id: msg.session_id.clone(),
            },
        );
    }
}

impl Handler<Disconnect> for NotificationHub {
    type Result = ();

    fn handle(&mut self, msg: Disconnect, _: &mut Context<Self>) {
        if self.sessions.remove(&msg.session_id).is_some() {
            log::info!("Subscriber {} disconnected", msg.session_id);
        }
    }
}

impl Handler<BroadcastNewPost> for NotificationHub {
    type Result = ();

    fn handle(&mut self, msg: BroadcastNewPost, _: &mut Context<Self>) {
        log::debug!(
            "Broadcasting post {} to {} subscriber(s)",
            msg.post.id,
            self.sessions.len()
        );
        self.send_to_all(&ServerMessage::NewPost { post: msg.post });
    }
}

#[cfg(test)]
impl Handler<SubscriberCount> for NotificationHub {
    type Result = usize;

    fn handle(&mut self, _: SubscriberCount, _: &mut Context<Self>) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::post::post_model::CreatePostRequest;
    use std::sync::{Arc, Mutex};

    /// Stand-in for a WebSocket session that records what it receives.
    struct Listener {
        received: Arc<Mutex<Vec<serde_json::Value>>>,
    }

    impl Actor for Listener {
        type Context = Context<Self>;
    }

    impl Handler<WsMessage> for Listener {
        type Result = ();

        fn handle(&mut self, msg: WsMessage, _: &mut Context<Self>) {
            let value = serde_json::from_str(&msg.0).unwrap();
            self.received.lock().unwrap().push(value);
        }
    }

    fn listener() -> (Addr<Listener>, Arc<Mutex<Vec<serde_json::Value>>>) {
        let received = Arc::new(Mutex::new(Vec::new()));
        let addr = Listener {
            received: received.clone(),
        }
        .start();
        (addr, received)
    }

    #[actix::test]
    async fn broadcast_reaches_connected_subscribers_only() {
        let hub = NotificationHub::new().start();
        let (a, a_seen) = listener();
        let (b, b_seen) = listener();

        hub.send(Connect {
            session_id: "a".into(),
            addr: a.recipient(),
        })
        .await
        .unwrap();
        hub.send(Connect {
            session_id: "b".into(),
            addr: b.recipient(),
        })
        .await
        .unwrap();
        hub.send(Disconnect {
            session_id: "b".into(),
        })
        .await
        .unwrap();
        assert_eq!(hub.send(SubscriberCount).await.unwrap(), 1);

        let post = CreatePostRequest::default().into_post(5);
        hub.send(BroadcastNewPost { post }).await.unwrap();

        // Let the listeners drain their mailboxes.
        actix::clock::sleep(std::time::Duration::from_millis(50)).await;

        let a_seen = a_seen.lock().unwrap();
        assert_eq!(a_seen.len(), 2);
        assert_eq!(a_seen[0]["type"], "connected");
        assert_eq!(a_seen[1]["type"], "new_post");
        assert_eq!(a_seen[1]["post"]["id"], 5);

        let b_seen = b_seen.lock().unwrap();
        assert_eq!(b_seen.len(), 1);
        assert_eq!(b_seen[0]["type"], "connected");
    }
}
