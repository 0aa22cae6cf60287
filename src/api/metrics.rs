use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

static SIGNINS: AtomicU64 = AtomicU64::new(0);
static AUTH_FAILURES: AtomicU64 = AtomicU64::new(0);
static REFRESHES: AtomicU64 = AtomicU64::new(0);
static REGISTRATIONS: AtomicU64 = AtomicU64::new(0);

pub fn increment_signins() {
    SIGNINS.fetch_add(1, Ordering::Relaxed);
}

pub fn increment_auth_failures() {
    AUTH_FAILURES.fetch_add(1, Ordering::Relaxed);
}

pub fn increment_refreshes() {
    REFRESHES.fetch_add(1, Ordering::Relaxed);
}

pub fn increment_registrations() {
    REGISTRATIONS.fetch_add(1, Ordering::Relaxed);
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct MetricsResponse {
    pub auth_signins_total: u64,
    pub auth_failures_total: u64,
    pub auth_refreshes_total: u64,
    pub users_registered_total: u64,
}

impl MetricsResponse {
    pub fn snapshot() -> Self {
        Self {
            auth_signins_total: SIGNINS.load(Ordering::Relaxed),
            auth_failures_total: AUTH_FAILURES.load(Ordering::Relaxed),
            auth_refreshes_total: REFRESHES.load(Ordering::Relaxed),
            users_registered_total: REGISTRATIONS.load(Ordering::Relaxed),
        }
    }

    /// Prometheus text exposition format
    pub fn render(&self) -> String {
        let counters = [
            ("auth_signins_total", "Successful password sign-ins", self.auth_signins_total),
            ("auth_failures_total", "Rejected sign-in and refresh attempts", self.auth_failures_total),
            ("auth_refreshes_total", "Access tokens minted from refresh tokens", self.auth_refreshes_total),
            ("users_registered_total", "Registered users", self.users_registered_total),
        ];

        counters
            .iter()
            .map(|(name, help, value)| {
                format!(
                    "# HELP {name} {help}\n# TYPE {name} counter\n{name} {value}\n",
                    name = name,
                    help = help,
                    value = value
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Health",
    responses(
        (status = 200, description = "Auth counters in Prometheus text format")
    )
)]
pub async fn get_metrics() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(MetricsResponse::snapshot().render())
}
