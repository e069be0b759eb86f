//! Endpoint vocabularies and typed event payloads.
//!
//! Field names follow what the invoice server emits. Every field is optional
//! unless the server always sends it, so a partial event still decodes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Endpoint path segments.
pub mod endpoints {
    pub const INVOICES: &str = "invoices";
    pub const NOTIFICATIONS: &str = "notifications";
    pub const AI_INSIGHTS: &str = "ai-insights";
}

/// Message kinds (the envelope `type`).
pub mod kinds {
    // invoices
    pub const INVOICE_UPDATED: &str = "invoice_updated";
    pub const INVOICE_STATUS_CHANGED: &str = "invoice_status_changed";
    pub const AI_PROCESSING_COMPLETE: &str = "ai_processing_complete";
    pub const SUBSCRIPTION_CONFIRMED: &str = "subscription_confirmed";
    pub const SUBSCRIBE_INVOICE: &str = "subscribe_invoice";
    pub const UNSUBSCRIBE_INVOICE: &str = "unsubscribe_invoice";

    // notifications
    pub const NEW_NOTIFICATION: &str = "new_notification";
    pub const NOTIFICATION_READ: &str = "notification_read";

    // ai insights
    pub const NEW_INSIGHT: &str = "new_insight";
    pub const ANOMALY_DETECTED: &str = "anomaly_detected";
    pub const PREDICTION_UPDATED: &str = "prediction_updated";

    // any endpoint
    pub const ERROR: &str = "error";

    pub const INVOICE_EVENTS: &[&str] = &[
        INVOICE_UPDATED,
        INVOICE_STATUS_CHANGED,
        AI_PROCESSING_COMPLETE,
        SUBSCRIPTION_CONFIRMED,
        ERROR,
    ];
    pub const NOTIFICATION_EVENTS: &[&str] = &[NEW_NOTIFICATION, NOTIFICATION_READ, ERROR];
    pub const INSIGHT_EVENTS: &[&str] =
        &[NEW_INSIGHT, ANOMALY_DETECTED, PREDICTION_UPDATED, ERROR];
}

/// `invoice_updated`, `invoice_status_changed`, `ai_processing_complete`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceEvent {
    #[serde(default)]
    pub invoice_id: Option<String>,
    #[serde(default)]
    pub invoice: Option<Value>,
    #[serde(default)]
    pub changes: Option<Map<String, Value>>,
    #[serde(default)]
    pub old_status: Option<String>,
    #[serde(default)]
    pub new_status: Option<String>,
    #[serde(default)]
    pub changed_by: Option<String>,
    #[serde(default)]
    pub results: Option<Value>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Server acknowledgement of `subscribe_invoice`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionConfirmed {
    pub invoice_id: String,
}

/// `new_notification`, `notification_read`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    #[serde(default)]
    pub notification: Option<Value>,
    #[serde(default)]
    pub notification_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// `new_insight`, `anomaly_detected`, `prediction_updated`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightEvent {
    #[serde(default)]
    pub insight: Option<Value>,
    #[serde(default)]
    pub invoice_id: Option<String>,
    #[serde(default)]
    pub anomalies: Vec<Value>,
    #[serde(default)]
    pub risk_score: Option<f64>,
    #[serde(default)]
    pub prediction_type: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Server-side error report (e.g. the server could not parse a command).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerError {
    #[serde(default)]
    pub message: String,
}
