use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::scanner::ScanOutcome;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub components: ComponentHealth,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub hypixel_api: bool,
    pub settings: bool,
    pub audit_logs: bool,
}

/// End-of-cycle summary surfaced on the /status endpoint. The coverage
/// ratio (pages fetched / pages known) lets consumers discount confidence
/// in a partially scanned snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleSummary {
    pub cycle: u64,
    pub candidates: usize,
    pub pages_fetched: u64,
    pub total_pages: u64,
    pub coverage: f64,
    pub reference_timestamp: i64,
    pub duration_ms: u64,
}

#[derive(Clone)]
pub struct HealthChecker {
    start_time: std::time::Instant,
    status: Arc<RwLock<ComponentHealth>>,
    last_cycle: Arc<RwLock<Option<CycleSummary>>>,
}

impl HealthChecker {
    pub fn new() -> Self {
        Self {
            start_time: std::time::Instant::now(),
            status: Arc::new(RwLock::new(ComponentHealth {
                hypixel_api: false,
                settings: false,
                audit_logs: false,
            })),
            last_cycle: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn get_status(&self) -> HealthStatus {
        let components = self.status.read().await.clone();

        HealthStatus {
            status: if components.hypixel_api {
                "healthy".to_string()
            } else {
                "degraded".to_string()
            },
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            components,
        }
    }

    pub async fn update_component(&self, component: &str, healthy: bool) {
        let mut status = self.status.write().await;
        match component {
            "hypixel_api" => status.hypixel_api = healthy,
            "settings" => status.settings = healthy,
            "audit_logs" => status.audit_logs = healthy,
            other => tracing::warn!("Unknown health component: {}", other),
        }
    }

    pub async fn record_cycle(&self, cycle: u64, outcome: &ScanOutcome) {
        let summary = CycleSummary {
            cycle,
            candidates: outcome.candidates.len(),
            pages_fetched: outcome.pages_fetched,
            total_pages: outcome.total_pages,
            coverage: outcome.coverage(),
            reference_timestamp: outcome.reference_timestamp,
            duration_ms: outcome.duration_ms,
        };
        *self.last_cycle.write().await = Some(summary);
        self.update_component("hypixel_api", outcome.pages_fetched > 0 || outcome.total_pages == 0)
            .await;
    }

    pub async fn last_cycle(&self) -> Option<CycleSummary> {
        self.last_cycle.read().await.clone()
    }
}

impl Default for HealthChecker {
    fn default() -> Self {
        Self::new()
    }
}
