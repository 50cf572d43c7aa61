//! Serving with graceful, bounded shutdown.
//!
//! On SIGINT or SIGTERM the listener stops accepting connections and
//! in-flight requests get a fixed grace period to finish. Requests still
//! running after that are dropped and answered with 503, and their
//! connections are closed. If the server has still not stopped shortly
//! after, its task is aborted.

use std::future::{Future, IntoFuture};
use std::time::Duration;

use axum::{
    Router,
    extract::{Request, State},
    http::HeaderValue,
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use tokio::{net::TcpListener, signal, sync::watch};
use tracing::{error, info, warn};

use crate::{
    error::AppError,
    middleware::request_id::{REQUEST_ID_HEADER, RequestId},
};

/// How long cut-off connections get to flush their 503 and close.
const CUT_OFF_DRAIN: Duration = Duration::from_secs(1);

/// Resolve once SIGINT (Ctrl+C) or, on Unix, SIGTERM is received.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}

/// Race a request against the end of the grace period.
///
/// The handler future is dropped when the period runs out, which also
/// drops any query it is awaiting.
async fn cut_off_after_grace(
    State(mut expired): State<watch::Receiver<bool>>,
    request: Request,
    next: Next,
) -> Response {
    tokio::select! {
        response = next.run(request) => response,
        Ok(_) = expired.wait_for(|expired| *expired) => {
            // The inner request span and its id were dropped with the handler.
            let request_id = RequestId::new();
            let mut response = AppError::ShuttingDown.into_response();
            if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
                response.headers_mut().insert(REQUEST_ID_HEADER, value);
            }
            response
        }
    }
}

/// Serve `app` until `shutdown` resolves, then drain for at most `grace`.
///
/// Returns early with the server's error if it fails before shutdown.
pub async fn serve<F>(
    listener: TcpListener,
    app: Router,
    shutdown: F,
    grace: Duration,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send,
{
    let (stop_tx, mut stop_rx) = watch::channel(false);
    let (expired_tx, expired_rx) = watch::channel(false);

    let app = app.layer(middleware::from_fn_with_state(expired_rx, cut_off_after_grace));

    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        let _ = stop_rx.wait_for(|stop| *stop).await;
    });
    let mut handle = tokio::spawn(server.into_future());

    tokio::select! {
        result = &mut handle => {
            result??;
            return Ok(());
        }
        () = shutdown => {}
    }

    info!(grace_secs = grace.as_secs(), "Subscription API shutting down");
    let _ = stop_tx.send(true);

    if let Ok(result) = tokio::time::timeout(grace, &mut handle).await {
        result??;
        info!("Server stopped gracefully");
        return Ok(());
    }

    warn!("grace period elapsed, cutting off in-flight requests");
    let _ = expired_tx.send(true);

    match tokio::time::timeout(CUT_OFF_DRAIN, &mut handle).await {
        Ok(result) => {
            result??;
            info!("Server stopped after cutting off requests");
        }
        Err(_) => {
            handle.abort();
            warn!("server did not stop, task aborted");
        }
    }

    Ok(())
}
