use actix::{Actor, ActorContext, Addr, AsyncContext, Handler, Running, StreamHandler};
use actix_web_actors::ws;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::notification::hub::{Connect, Disconnect, NotificationHub, WsMessage};

/// How often heartbeat pings are sent
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
/// How long before lack of client response causes a timeout
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);

/// One subscriber connection. Receive-only: clients just listen for events.
pub struct NotificationSession {
    pub session_id: String,
    pub hub_addr: Addr<NotificationHub>,
    pub last_heartbeat: Instant,
}

impl NotificationSession {
    pub fn new(hub_addr: Addr<NotificationHub>) -> Self {
        NotificationSession {
            session_id: Uuid::new_v4().to_string(),
            hub_addr,
            last_heartbeat: Instant::now(),
        }
    }

    fn start_heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx| {
            if Instant::now().duration_since(act.last_heartbeat) > CLIENT_TIMEOUT {
                log::warn!(
                    "Subscriber {} heartbeat timeout, disconnecting",
                    act.session_id
                );
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }
}

impl Actor for NotificationSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.start_heartbeat(ctx);

        let addr = ctx.address();
        self.hub_addr.do_send(Connect {
            session_id: self.session_id.clone(),
            addr: addr.recipient(),
        });
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        self.hub_addr.do_send(Disconnect {
            session_id: self.session_id.clone(),
        });
        Running::Stop
    }
}

/// Forward hub frames to the socket
impl Handler<WsMessage> for NotificationSession {
    type Result = ();

    fn handle(&mut self, msg: WsMessage, ctx: &mut Self::Context) {
        ctx.text(msg.0);
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for NotificationSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(_)) | Ok(ws::Message::Binary(_)) => {
                // Nothing to do with client payloads, but they prove liveness.
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Close(reason)) => {
                log::info!("Subscriber {} closed: {:?}", self.session_id, reason);
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => {}
            Err(e) => {
                log::warn!("WebSocket protocol error on {}: {}", self.session_id, e);
                ctx.stop();
            }
        }
    }
}
