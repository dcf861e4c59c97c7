//! Local stand-in for the create-transaction endpoint used by the Paybox widget.
//!
//! `POST /api/payoplux/create` with `{ "plan": "<key>" }` answers with a fresh
//! transaction id and the plan's price as the VAT-taxed base.

use std::{
    env,
    io::{Cursor, Read},
};

use anyhow::anyhow;
use serde::Deserialize;
use serde_json::{json, Value};
use tiny_http::{Header, Method, Response, Server};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;
use yew_paybox::{PlanKey, TransactionPayload, DEFAULT_CREATE_ENDPOINT};

/// Request body as sent by the browser; the plan is validated separately so
/// an unknown key gets a readable error.
#[derive(Deserialize)]
struct RawCreateRequest {
    plan: String,
}

/// Status and optional JSON body of a reply.
#[derive(Debug, PartialEq)]
struct Reply {
    status: u16,
    body: Option<Value>,
}

impl Reply {
    fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    fn error(status: u16, message: impl Into<String>) -> Self {
        Self::json(status, json!({ "error": message.into() }))
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = env::var("MOCK_PAYBOX_SERVER_PORT").unwrap_or_else(|_| "2718".to_string());
    let addr = format!("127.0.0.1:{}", port);
    let server = Server::http(&addr).map_err(|e| anyhow!(e))?;
    info!("Running on http://{}", addr);

    for mut request in server.incoming_requests() {
        let mut body = String::new();
        if let Err(err) = request.as_reader().read_to_string(&mut body) {
            warn!(%err, "could not read request body");
        }

        let reply = route(request.method(), request.url(), &body, Uuid::new_v4);
        info!(method = %request.method(), url = request.url(), status = reply.status, "handled request");

        let resp = match to_response(&reply) {
            Ok(resp) => resp,
            Err(err) => {
                warn!(%err, "could not build response");
                continue;
            }
        };
        // A client that hung up must not stop the server.
        if let Err(err) = request.respond(resp) {
            warn!(%err, "failed to write response");
        }
    }

    Ok(())
}

fn to_response(reply: &Reply) -> anyhow::Result<Response<Cursor<Vec<u8>>>> {
    let mut resp = match &reply.body {
        Some(json) => Response::from_string(json.to_string())
            .with_header(header("Content-Type", "application/json")?),
        None => Response::from_string(String::new()),
    }
    .with_status_code(reply.status);
    for h in cors_headers()? {
        resp.add_header(h);
    }
    Ok(resp)
}

/// Dispatch one request; `new_id` mints transaction ids.
fn route(method: &Method, url: &str, body: &str, new_id: impl FnOnce() -> Uuid) -> Reply {
    let path = url.split('?').next().unwrap_or(url);
    match (method, path) {
        // CORS preflight
        (Method::Options, _) => Reply {
            status: 204,
            body: None,
        },
        (Method::Post, p) if p == DEFAULT_CREATE_ENDPOINT => create_transaction(body, new_id),
        _ => Reply::error(404, "Not Found"),
    }
}

fn create_transaction(body: &str, new_id: impl FnOnce() -> Uuid) -> Reply {
    let request: RawCreateRequest = match serde_json::from_str(body) {
        Ok(request) => request,
        Err(err) => return Reply::error(400, format!("invalid request body: {}", err)),
    };
    let plan: PlanKey = match request.plan.parse() {
        Ok(plan) => plan,
        Err(err) => return Reply::error(400, err.to_string()),
    };

    let payload = quote(plan, new_id().to_string());
    match serde_json::to_value(&payload) {
        Ok(json) => Reply::json(200, json),
        Err(err) => Reply::error(500, err.to_string()),
    }
}

/// The whole price is billed as the VAT-taxed base.
fn quote(plan: PlanKey, transaction_id: String) -> TransactionPayload {
    let entry = plan.plan();
    TransactionPayload {
        transaction_id,
        base0: 0.0,
        base12: entry.price(),
        description: entry.name.to_string(),
    }
}

fn header(name: &str, value: &str) -> anyhow::Result<Header> {
    Header::from_bytes(name, value).map_err(|_| anyhow!("invalid header {}: {}", name, value))
}

fn cors_headers() -> anyhow::Result<Vec<Header>> {
    Ok(vec![
        header("Access-Control-Allow-Origin", "*")?,
        header("Access-Control-Allow-Methods", "POST, OPTIONS")?,
        header("Access-Control-Allow-Headers", "Content-Type")?,
    ])
}
