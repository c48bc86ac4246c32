//! Shared helper utilities for backend integration tests.
//!
//! Integration tests compile as separate crates under `backend/tests/`, so the
//! geocoder stub, settings fixture and socket helpers live here.

#![allow(dead_code)]

use std::ffi::OsString;
use std::net::{Ipv4Addr, TcpListener};
use std::time::Duration;

use actix_web::dev::ServerHandle;
use actix_web::http::header;
use actix_web::{App, HttpResponse, HttpServer, web};
use awc::{BoxedSocket, ws::Codec, ws::Frame, ws::Message};
use chatmap::settings::AppSettings;
use futures_util::{SinkExt, StreamExt};
use ortho_config::OrthoConfig;
use serde_json::{Value, json};

/// Framed client socket returned by `awc`.
pub type Socket = actix_codec::Framed<BoxedSocket, Codec>;

/// Origin accepted by every chat server without configuration.
pub const LOCAL_ORIGIN: &str = "http://localhost:3000";

const FRAME_WAIT: Duration = Duration::from_secs(5);

/// Reserve a loopback port for a server under test.
pub fn free_port() -> u16 {
    TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
        .and_then(|listener| listener.local_addr())
        .map(|addr| addr.port())
        .expect("reserve port")
}

/// Settings for a loopback server using the given geocoder endpoint.
///
/// Session cookies are not marked `Secure` so plain HTTP clients keep them.
pub fn loopback_settings(port: u16, geocoder_endpoint: &str) -> AppSettings {
    let _guard = env_lock::lock_env([
        ("CHATMAP_DATABASE_URL", None::<String>),
        ("CHATMAP_NOTIFIER_WEBHOOK_URL", None::<String>),
        ("CHATMAP_ALLOWED_ORIGINS", None::<String>),
        ("CHATMAP_GEOCODER_COUNTRY", None::<String>),
    ]);
    let mut settings =
        AppSettings::load_from_iter([OsString::from("chatmap")]).expect("settings load");
    settings.host = Some(Ipv4Addr::LOCALHOST.into());
    settings.port = port;
    settings.geocoder_endpoint = Some(geocoder_endpoint.to_owned());
    settings.session_cookie_secure = false;
    settings
}

/// Start a Nominatim stand-in that places every postal code at Tokyo
/// Station. Returns the base URL and a handle to stop it.
pub fn spawn_geocoder() -> (String, ServerHandle) {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).expect("bind geocoder");
    let addr = listener.local_addr().expect("geocoder addr");
    let server = HttpServer::new(|| {
        App::new().route(
            "/search",
            web::get().to(|| async {
                HttpResponse::Ok().json(json!([{
                    "lat": "35.681236",
                    "lon": "139.767125",
                    "display_name": "Tokyo Station"
                }]))
            }),
        )
    })
    .workers(1)
    .listen(listener)
    .expect("listen geocoder")
    .disable_signals()
    .run();
    let handle = server.handle();
    actix_web::rt::spawn(server);
    (format!("http://{addr}"), handle)
}

/// The `name=value` pair of the session cookie in a response.
pub fn session_cookie<S>(response: &awc::ClientResponse<S>) -> String {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("session="))
        .and_then(|value| value.split(';').next())
        .expect("session cookie")
        .to_owned()
}

/// Open the chat socket as the holder of `cookie`.
pub async fn connect_chat(base_url: &str, cookie: &str) -> Socket {
    let (_response, socket) = awc::Client::default()
        .ws(format!("{base_url}/ws"))
        .set_header(header::ORIGIN, LOCAL_ORIGIN)
        .set_header(header::COOKIE, cookie)
        .connect()
        .await
        .expect("websocket connect");
    socket
}

/// Send one client event.
pub async fn send_event(socket: &mut Socket, event: Value) {
    socket
        .send(Message::Text(event.to_string().into()))
        .await
        .expect("send frame");
}

/// Wait for the next server event of `kind`, skipping any other events.
pub async fn next_event(socket: &mut Socket, kind: &str) -> Value {
    tokio::time::timeout(FRAME_WAIT, async {
        loop {
            let frame = socket.next().await.expect("open socket").expect("frame");
            let Frame::Text(bytes) = frame else {
                continue;
            };
            let event: Value = serde_json::from_slice(&bytes).expect("json frame");
            if event.get("type") == Some(&json!(kind)) {
                return event;
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("no {kind} event within {FRAME_WAIT:?}"))
}
