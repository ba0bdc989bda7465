use rocket::fairing::{Fairing, Info, Kind};
use rocket::{Data, Request, Response};
use std::time::Instant;
use uuid::Uuid;

/// Per-request context established when the request arrives.
struct RequestContext {
    id: String,
    started_at: Instant,
}

impl RequestContext {
    fn new() -> Self {
        Self {
            // Short id; enough to correlate lines within one log stream.
            id: Uuid::new_v4().simple().to_string()[..8].to_string(),
            started_at: Instant::now(),
        }
    }
}

/// Fairing that assigns each request a short id and logs one line per
/// request with status and timing.
pub struct RequestLogger;

#[rocket::async_trait]
impl Fairing for RequestLogger {
    fn info(&self) -> Info {
        Info {
            name: "Request Logger",
            kind: Kind::Request | Kind::Response,
        }
    }

    async fn on_request(&self, request: &mut Request<'_>, _: &mut Data<'_>) {
        request.local_cache(RequestContext::new);
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        let context = request.local_cache(RequestContext::new);
        let duration = context.started_at.elapsed();

        log::info!(
            "[{}] {} {} -> {} ({:.2}ms)",
            context.id,
            request.method(),
            request.uri(),
            response.status().code,
            duration.as_secs_f64() * 1000.0
        );
    }
}
