// src/server.rs

//! Dev server: static HTTP serving of the output tree plus a WebSocket
//! reload channel.
//!
//! Pages include a small client script (served at `/__buildwatch.js`) that
//! connects to the WebSocket listener; calling [`ServerHandle::reload`]
//! broadcasts `"reload"` to every connected tab. The engine only reloads
//! after successful rebuilds, so viewers always see the last good output
//! tree.

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use anyhow::Context;
use axum::routing::get;
use axum::Router;
use tower_http::services::ServeDir;
use tracing::{debug, info, warn};
use tungstenite::WebSocket;

/// Dev server options, from the `[server]` config section.
#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub port: u16,
}

/// Handle to a running dev server.
pub struct ServerHandle {
    reload_tx: Sender<()>,
    /// HTTP port the output tree is served on.
    pub port: u16,
    /// Port of the WebSocket reload listener.
    pub ws_port: u16,
}

impl ServerHandle {
    /// Tell connected clients to refresh. Fire-and-forget.
    pub fn reload(&self) {
        if self.reload_tx.send(()).is_err() {
            warn!("reload channel closed; no browser reload sent");
        }
    }
}

/// Start serving `served_dir` over HTTP and open the reload WebSocket
/// listener. Must be called from within a tokio runtime.
pub fn start(served_dir: PathBuf, options: &ServerOptions) -> anyhow::Result<ServerHandle> {
    let (ws_listener, ws_port) = reserve_ws_port()?;
    let clients = Arc::new(Mutex::new(Vec::new()));

    let _thread_incoming = spawn_ws_incoming(ws_listener, clients.clone());
    let (reload_tx, _thread_reload) = spawn_ws_reload(clients);

    let port = options.port;
    tokio::spawn(async move {
        if let Err(err) = serve_http(served_dir, port, ws_port).await {
            warn!("dev server stopped: {err:#}");
        }
    });

    info!("serving on http://localhost:{port}/ (reload socket on {ws_port})");

    Ok(ServerHandle {
        reload_tx,
        port,
        ws_port,
    })
}

async fn serve_http(served_dir: PathBuf, port: u16, ws_port: u16) -> anyhow::Result<()> {
    let address = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .with_context(|| format!("binding dev server to {address}"))?;

    let router = Router::new()
        .route(
            "/__buildwatch.js",
            get(move || async move { client_script(ws_port) }),
        )
        .fallback_service(ServeDir::new(served_dir));

    axum::serve(listener, router).await?;
    Ok(())
}

/// Reload client served to the browser; pages opt in with
/// `<script src="/__buildwatch.js"></script>`.
fn client_script(ws_port: u16) -> String {
    format!(
        "(function () {{\n  var ws = new WebSocket('ws://localhost:{ws_port}/');\n  ws.onmessage = function (msg) {{\n    if (msg.data === 'reload') window.location.reload();\n  }};\n}})();\n"
    )
}

fn reserve_ws_port() -> std::io::Result<(TcpListener, u16)> {
    // Prefer the conventional livereload port, fall back to an ephemeral one.
    let listener = match TcpListener::bind("127.0.0.1:35729") {
        Ok(sock) => sock,
        Err(_) => TcpListener::bind("127.0.0.1:0")?,
    };

    let port = listener.local_addr()?.port();
    Ok((listener, port))
}

fn spawn_ws_incoming(
    server: TcpListener,
    clients: Arc<Mutex<Vec<WebSocket<TcpStream>>>>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        for stream in server.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(err) => {
                    debug!("reload socket accept failed: {err}");
                    continue;
                }
            };
            match tungstenite::accept(stream) {
                Ok(socket) => {
                    if let Ok(mut clients) = clients.lock() {
                        clients.push(socket);
                    }
                }
                Err(err) => debug!("websocket handshake failed: {err}"),
            }
        }
    })
}

fn spawn_ws_reload(
    clients: Arc<Mutex<Vec<WebSocket<TcpStream>>>>,
) -> (Sender<()>, JoinHandle<()>) {
    let (tx, rx) = std::sync::mpsc::channel();

    let thread = std::thread::spawn(move || {
        while rx.recv().is_ok() {
            let Ok(mut clients) = clients.lock() else {
                continue;
            };
            let mut broken = Vec::new();

            for (i, socket) in clients.iter_mut().enumerate() {
                match socket.send("reload".into()) {
                    Ok(()) => {}
                    Err(tungstenite::error::Error::Io(err))
                        if err.kind() == std::io::ErrorKind::BrokenPipe =>
                    {
                        broken.push(i);
                    }
                    Err(err) => {
                        debug!("reload send failed: {err}");
                        broken.push(i);
                    }
                }
            }

            for i in broken.into_iter().rev() {
                clients.remove(i);
            }
        }
    });

    (tx, thread)
}
