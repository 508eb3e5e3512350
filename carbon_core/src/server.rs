//! HTTP surface: a single route serving the page and, on upgrade, the
//! session's WebSocket event channel.

use std::{io, sync::Arc};

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use carbon_proto::{decode_client_message, encode_frame_json, DashboardFrame};
use futures::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use tokio::{
    net::TcpListener,
    time::{self, MissedTickBehavior},
};
use tracing::{error, info, warn};

use crate::{
    config::{DashboardConfig, TickSource},
    selection::InteractionEvent,
    DashboardContext,
};

const PAGE_TEMPLATE: &str = include_str!("data/index.html");

pub fn router(context: Arc<DashboardContext>) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .with_state(context)
}

pub async fn serve(listener: TcpListener, context: Arc<DashboardContext>) -> io::Result<()> {
    let addr = listener.local_addr()?;
    info!(
        target: "carbon_dashboard::server",
        %addr,
        countries = context.dataset().len(),
        tick_source = ?context.config().tick_source(),
        "server.listening"
    );
    axum::serve(listener, router(context)).await
}

async fn dashboard(
    ws: Option<WebSocketUpgrade>,
    State(context): State<Arc<DashboardContext>>,
) -> Response {
    match ws {
        Some(upgrade) => upgrade.on_upgrade(move |socket| run_session(socket, context)),
        None => Html(render_page(context.config())).into_response(),
    }
}

pub fn render_page(config: &DashboardConfig) -> String {
    let client_tick_ms = match config.tick_source() {
        TickSource::Server => 0,
        TickSource::Client => config.tick_interval().as_millis(),
    };
    let palette = config.palette();

    PAGE_TEMPLATE
        .replace("{{title}}", &html_escape::encode_text(config.title()))
        .replace("{{subtitle}}", &html_escape::encode_text(config.subtitle()))
        .replace(
            "{{background}}",
            &html_escape::encode_double_quoted_attribute(&palette.background),
        )
        .replace(
            "{{text_color}}",
            &html_escape::encode_double_quoted_attribute(&palette.text),
        )
        .replace(
            "{{font_family}}",
            &html_escape::encode_double_quoted_attribute(&palette.font_family),
        )
        .replace("{{client_tick_ms}}", &client_tick_ms.to_string())
}

async fn run_session(socket: WebSocket, context: Arc<DashboardContext>) {
    let mut session = context.open_session();
    let session_id = session.id();
    let (mut sender, mut receiver) = socket.split();

    let initial = match session.initial_frame() {
        Ok(frame) => frame,
        Err(err) => {
            error!(
                target: "carbon_dashboard::server",
                session = session_id,
                error = %err,
                "projection.failed"
            );
            session.close();
            return;
        }
    };
    if let Err(err) = send_frame(&mut sender, &initial).await {
        warn!(
            target: "carbon_dashboard::server",
            session = session_id,
            error = %err,
            "frame.send_failed"
        );
        session.close();
        return;
    }

    let server_ticks = context.config().tick_source() == TickSource::Server;
    let mut ticker = time::interval(context.config().tick_interval());
    // Late ticks are not replayed; the fill advances per tick, not per elapsed time.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let outcome = tokio::select! {
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Text(text))) => match decode_client_message(&text) {
                    Ok(message) => session.handle_message(message),
                    Err(err) => {
                        warn!(
                            target: "carbon_dashboard::server",
                            session = session_id,
                            error = %err,
                            "message.rejected"
                        );
                        continue;
                    }
                },
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => continue,
                Some(Err(err)) => {
                    warn!(
                        target: "carbon_dashboard::server",
                        session = session_id,
                        error = %err,
                        "socket.read_failed"
                    );
                    break;
                }
            },
            _ = ticker.tick(), if server_ticks => session.handle(InteractionEvent::TimerTick),
        };

        match outcome {
            Ok(Some(frame)) => {
                if let Err(err) = send_frame(&mut sender, &frame).await {
                    warn!(
                        target: "carbon_dashboard::server",
                        session = session_id,
                        error = %err,
                        "frame.send_failed"
                    );
                    break;
                }
            }
            Ok(None) => {}
            Err(err) => {
                error!(
                    target: "carbon_dashboard::server",
                    session = session_id,
                    error = %err,
                    "projection.failed"
                );
                break;
            }
        }
    }

    session.close();
}

async fn send_frame(
    sender: &mut SplitSink<WebSocket, Message>,
    frame: &DashboardFrame,
) -> Result<(), axum::Error> {
    let payload = encode_frame_json(frame).map_err(axum::Error::new)?;
    sender.send(Message::Text(payload)).await
}
