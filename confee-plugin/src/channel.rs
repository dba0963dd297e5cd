//! Dev route channel.
//!
//! A small WebSocket server the running front end connects to. Messages are
//! JSON objects; a `{ "route": … }` payload whose route differs from the
//! recorded one updates the shared state (current route plus the modules
//! that must hot-reload for it) and fires the embedder's callback, which
//! typically restarts the dev server.

use crate::options::DevServerOptions;
use crate::state::{self, SharedState};
use crate::PluginError;
use futures_util::StreamExt;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Fired after a route change has been recorded.
pub type RouteHandler = Box<dyn Fn(&str) + Send + Sync>;

/// Handle to a running channel. Dropping it leaves the server running;
/// call [`RouteChannel::shutdown`] to stop it.
#[derive(Debug)]
pub struct RouteChannel {
    local_addr: SocketAddr,
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl RouteChannel {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub async fn shutdown(self) {
        let _ = self.stop.send(true);
        let _ = self.task.await;
    }
}

/// Bind the channel and start accepting connections.
///
/// At most one channel runs per adapter; a second call is
/// [`PluginError::ChannelAlreadyStarted`].
pub async fn start(
    state: SharedState,
    options: &DevServerOptions,
    on_route_change: RouteHandler,
) -> Result<RouteChannel, PluginError> {
    {
        let mut locked = state::write(&state);
        if locked.channel_started {
            return Err(PluginError::ChannelAlreadyStarted);
        }
        locked.channel_started = true;
    }

    let listener = TcpListener::bind((options.host.as_str(), options.port)).await?;
    let local_addr = listener.local_addr()?;
    info!("WebSocket server listening on ws://{}", local_addr);

    let (stop, mut stopped) = watch::channel(false);
    let handler: Arc<RouteHandler> = Arc::new(on_route_change);

    let task = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = stopped.changed() => break,
                accepted = listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(pair) => pair,
                        Err(err) => {
                            warn!("route channel accept failed: {}", err);
                            continue;
                        }
                    };
                    debug!(%peer, "route channel connection");
                    tokio::spawn(serve_connection(stream, state.clone(), handler.clone()));
                }
            }
        }
    });

    Ok(RouteChannel {
        local_addr,
        stop,
        task,
    })
}

async fn serve_connection(stream: TcpStream, state: SharedState, handler: Arc<RouteHandler>) {
    let mut ws = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(err) => {
            warn!("websocket handshake failed: {}", err);
            return;
        }
    };

    while let Some(Ok(message)) = ws.next().await {
        let text = match message.to_text() {
            Ok(text) => text,
            Err(_) => continue,
        };
        let payload: Value = match serde_json::from_str(text) {
            Ok(payload) => payload,
            Err(_) => continue,
        };
        if let Some(route) = payload.get("route").and_then(Value::as_str) {
            apply_route_change(&state, route, handler.as_ref());
        }
    }
}

/// Record a route change and fire the callback. Empty or unchanged routes
/// are ignored.
pub(crate) fn apply_route_change(state: &SharedState, route: &str, handler: &RouteHandler) {
    {
        let mut locked = state::write(state);
        if route.is_empty() || route == locked.current_route {
            return;
        }
        debug!(route, "reload event");
        locked.current_route = route.to_string();
        locked.hot_modules = locked
            .schema
            .computed
            .hot_module_by_route
            .get(route)
            .cloned()
            .unwrap_or_default();
    }
    handler(route);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PluginState;
    use futures_util::SinkExt;
    use std::sync::mpsc;
    use std::time::Duration;
    use tokio_tungstenite::tungstenite::Message;

    fn seeded_state() -> SharedState {
        let mut plugin_state = PluginState::default();
        plugin_state
            .schema
            .computed
            .hot_module_by_route
            .insert("suppliers/index".to_string(), vec!["sup-pliers-index.tsx".to_string()]);
        state::shared(plugin_state)
    }

    fn ephemeral() -> DevServerOptions {
        DevServerOptions {
            open: true,
            host: "127.0.0.1".to_string(),
            port: 0,
        }
    }

    #[test]
    fn test_route_change_updates_state_and_fires_handler() {
        let state = seeded_state();
        let (tx, rx) = mpsc::channel();
        let handler: RouteHandler = Box::new(move |route| {
            let _ = tx.send(route.to_string());
        });

        apply_route_change(&state, "suppliers/index", &handler);

        assert_eq!(rx.try_recv().expect("handler fired"), "suppliers/index");
        let locked = state::read(&state);
        assert_eq!(locked.current_route, "suppliers/index");
        assert_eq!(locked.hot_modules, vec!["sup-pliers-index.tsx"]);
    }

    #[test]
    fn test_unchanged_route_is_ignored() {
        let state = seeded_state();
        state::write(&state).current_route = "suppliers/index".to_string();
        let handler: RouteHandler = Box::new(|_| panic!("must not fire"));

        apply_route_change(&state, "suppliers/index", &handler);
        apply_route_change(&state, "", &handler);
    }

    #[tokio::test]
    async fn test_channel_round_trip_over_websocket() {
        let state = seeded_state();
        let (tx, rx) = mpsc::channel();
        let handler: RouteHandler = Box::new(move |route| {
            let _ = tx.send(route.to_string());
        });

        let channel = start(state.clone(), &ephemeral(), handler)
            .await
            .expect("channel starts");
        let url = format!("ws://{}", channel.local_addr());

        let (mut ws, _) = tokio_tungstenite::connect_async(&url)
            .await
            .expect("client connects");
        ws.send(Message::Text(r#"{"route":"suppliers/index"}"#.into()))
            .await
            .expect("send payload");

        let route = tokio::task::spawn_blocking(move || rx.recv_timeout(Duration::from_secs(5)))
            .await
            .expect("join")
            .expect("handler fired");
        assert_eq!(route, "suppliers/index");
        assert_eq!(
            state::read(&state).hot_modules,
            vec!["sup-pliers-index.tsx"]
        );

        channel.shutdown().await;
    }

    #[tokio::test]
    async fn test_channel_starts_at_most_once() {
        let state = seeded_state();
        let channel = start(state.clone(), &ephemeral(), Box::new(|_| {}))
            .await
            .expect("first start");

        let err = start(state, &ephemeral(), Box::new(|_| {}))
            .await
            .unwrap_err();
        assert!(matches!(err, PluginError::ChannelAlreadyStarted));

        channel.shutdown().await;
    }
}
