//! HTTP server for interactive mode
//!
//! `tunemood serve survey.csv` → starts server, opens browser, shows the
//! linked views. The server owns the one [`Dashboard`] and answers requests
//! one at a time, so every interaction is applied to completion before the
//! next is read.
//!
//! | Route | Effect |
//! |-------|--------|
//! | `GET /` | the dashboard page, wired to the API |
//! | `/api/state` | full snapshot |
//!
//! `/` and `/api/state` also take [`ViewConfig`] fields as query parameters
//! (`?bin_count=10&faded_opacity=0.4`). A non-empty query replaces the
//! session's config, missing fields taking their defaults, and rebuilds the
//! views without touching the selection.
//! | `/api/brush?lo=&hi=` | brush end; no bounds means cleared |
//! | `/api/click?genre=` | pin or un-pin a genre |
//! | `/api/reset` | clear brush and pin |

use crate::config::ViewConfig;
use crate::dashboard::{Dashboard, Interaction};
use crate::error::Result;
use crate::record::Genre;
use crate::report::html;
use crate::selection::BrushRange;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tiny_http::{Header, Method, Request, Response, Server};

#[derive(Serialize)]
struct ApiResponse<T> {
    ok: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self { ok: true, data: Some(data), error: None }
    }
}

impl ApiResponse<()> {
    fn failure(message: impl Into<String>) -> Self {
        Self { ok: false, data: None, error: Some(message.into()) }
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct BrushParams {
    pub lo: Option<f64>,
    pub hi: Option<f64>,
}

impl BrushParams {
    /// Both bounds, or neither for a cleared brush
    fn to_range(&self) -> std::result::Result<Option<BrushRange>, String> {
        match (self.lo, self.hi) {
            (None, None) => Ok(None),
            (Some(lo), Some(hi)) => BrushRange::new(lo, hi).map(Some).map_err(|e| e.to_string()),
            _ => Err("brush needs both lo and hi, or neither".to_string()),
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct ClickParams {
    pub genre: String,
}

/// A routed response, independent of the HTTP library
#[derive(Debug)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    fn html(body: String) -> Self {
        Self { status: 200, content_type: "text/html", body }
    }

    fn json<T: Serialize>(value: &T) -> Result<Self> {
        Ok(Self { status: 200, content_type: "application/json", body: serde_json::to_string(value)? })
    }

    fn bad_request(message: impl Into<String>) -> Result<Self> {
        let mut reply = Self::json(&ApiResponse::failure(message))?;
        reply.status = 400;
        Ok(reply)
    }

    fn not_found() -> Self {
        Self { status: 404, content_type: "text/plain", body: "Not found".to_string() }
    }
}

/// Start server, open browser, serve UI
pub fn start(port: u16, mut dashboard: Dashboard) -> std::io::Result<()> {
    let addr = format!("127.0.0.1:{}", port);
    let server = Server::http(&addr).map_err(|e| {
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;

    let url = format!("http://localhost:{}", port);
    info!("Serving {} records on {}", dashboard.store().len(), url);

    eprintln!("\n\x1b[1;32m♫ tunemood\x1b[0m");
    eprintln!("   {}", url);
    eprintln!(
        "   {} responses, {} genres\n",
        dashboard.store().len(),
        dashboard.store().genres().len()
    );

    // Open browser
    let _ = open::that(&url);

    // Handle requests
    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, &mut dashboard) {
            eprintln!("Error: {}", e);
        }
    }

    Ok(())
}

fn handle_request(request: Request, dashboard: &mut Dashboard) -> std::io::Result<()> {
    let url = request.url().to_string();
    let method = request.method().clone();
    debug!("{} {}", method, url);

    let reply = match route(dashboard, &method, &url) {
        Ok(reply) => reply,
        Err(e) => {
            warn!("Request failed: {}", e);
            Reply { status: 500, content_type: "text/plain", body: e.to_string() }
        }
    };

    let header = Header::from_bytes(&b"Content-Type"[..], reply.content_type.as_bytes())
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::Other, "invalid header"))?;
    let response = Response::from_string(reply.body)
        .with_status_code(reply.status)
        .with_header(header);
    request.respond(response)
}

/// Map a request to a reply, applying any interaction it carries
pub fn route(dashboard: &mut Dashboard, method: &Method, url: &str) -> Result<Reply> {
    let mut parts = url.splitn(2, '?');
    let path = parts.next().unwrap_or("/");
    let query = parts.next().unwrap_or("");
    let readable = matches!(method, Method::Get | Method::Post);

    if !readable {
        return Ok(Reply::not_found());
    }

    match path {
        "/" | "/api/state" if !query.is_empty() => {
            match ViewConfig::from_query(query) {
                Ok(config) => dashboard.reconfigure(config),
                Err(e) => return Reply::bad_request(e.to_string()),
            }
            route(dashboard, method, path)
        }

        "/" => Ok(Reply::html(html::render(dashboard, html::Mode::Served)?)),

        "/api/state" => Reply::json(&ApiResponse::success(dashboard.snapshot())),

        "/api/brush" => {
            let params: BrushParams = match serde_urlencoded::from_str(query) {
                Ok(p) => p,
                Err(e) => return Reply::bad_request(e.to_string()),
            };
            match params.to_range() {
                Ok(range) => Reply::json(&ApiResponse::success(dashboard.dispatch(Interaction::Brush(range)))),
                Err(message) => Reply::bad_request(message),
            }
        }

        "/api/click" => {
            let params: ClickParams = match serde_urlencoded::from_str(query) {
                Ok(p) => p,
                Err(e) => return Reply::bad_request(e.to_string()),
            };
            let redraw = dashboard.dispatch(Interaction::SliceClicked(Genre::new(params.genre)));
            Reply::json(&ApiResponse::success(redraw))
        }

        "/api/reset" => Reply::json(&ApiResponse::success(dashboard.dispatch(Interaction::Reset))),

        _ => Ok(Reply::not_found()),
    }
}
