//! invoicerelay: tail the invoice server's realtime endpoints.
//!
//! - Config: $INVOICERELAY_CONFIG (default `invoicerelay.yaml`, defaults if absent)
//! - Credential: $INVOICERELAY_TOKEN, re-read on every connection attempt
//! - Invoice subscriptions: $INVOICERELAY_INVOICES (comma separated ids),
//!   re-sent every time the invoices channel opens
//! - Logs every event; ctrl-c disconnects all channels

use std::path::Path;

use tracing_subscriber::{fmt, EnvFilter};

use invoicerelay_client::channel::Status;
use invoicerelay_client::config::{self, RelayConfig};
use invoicerelay_client::{InsightChannel, InvoiceChannel, NotificationChannel};

fn token() -> Option<String> {
    std::env::var("INVOICERELAY_TOKEN").ok()
}

fn invoice_ids() -> Vec<String> {
    std::env::var("INVOICERELAY_INVOICES")
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::var("INVOICERELAY_CONFIG").unwrap_or_else(|_| "invoicerelay.yaml".into());
    let cfg = if Path::new(&path).exists() {
        config::load_from_file(&path).expect("config load failed")
    } else {
        tracing::info!(%path, "no config file, using defaults");
        RelayConfig::default()
    };

    if !cfg.flags.realtime {
        tracing::info!("realtime disabled by flags");
        return;
    }

    let invoices = InvoiceChannel::new(&cfg.channel, token);
    invoices.on_invoice_updated(|ev| {
        tracing::info!(invoice_id = ?ev.invoice_id, changes = ?ev.changes, "invoice updated");
        Ok(())
    });
    invoices.on_invoice_status_changed(|ev| {
        tracing::info!(
            invoice_id = ?ev.invoice_id,
            from = ?ev.old_status,
            to = ?ev.new_status,
            by = ?ev.changed_by,
            "invoice status changed"
        );
        Ok(())
    });
    invoices.on_ai_processing_complete(|ev| {
        tracing::info!(invoice_id = ?ev.invoice_id, "ai processing complete");
        Ok(())
    });
    invoices.on_subscription_confirmed(|ev| {
        tracing::info!(invoice_id = %ev.invoice_id, "subscription confirmed");
        Ok(())
    });
    invoices.on_server_error(|ev| {
        tracing::warn!(detail = %ev.message, "server reported an error");
        Ok(())
    });

    let notifications = cfg
        .flags
        .notifications
        .then(|| NotificationChannel::new(&cfg.channel, token));
    if let Some(n) = &notifications {
        n.on_new_notification(|ev| {
            tracing::info!(id = ?ev.notification_id, user = ?ev.user_id, "new notification");
            Ok(())
        });
        n.on_notification_read(|ev| {
            tracing::info!(id = ?ev.notification_id, "notification read");
            Ok(())
        });
    }

    let insights = cfg
        .flags
        .ai_insights
        .then(|| InsightChannel::new(&cfg.channel, token));
    if let Some(i) = &insights {
        i.on_new_insight(|ev| {
            tracing::info!(invoice_id = ?ev.invoice_id, "new insight");
            Ok(())
        });
        i.on_anomaly_detected(|ev| {
            tracing::warn!(
                invoice_id = ?ev.invoice_id,
                anomalies = ev.anomalies.len(),
                risk_score = ?ev.risk_score,
                "anomaly detected"
            );
            Ok(())
        });
        i.on_prediction_updated(|ev| {
            tracing::info!(prediction = ?ev.prediction_type, "prediction updated");
            Ok(())
        });
    }

    // Failed first attempts are already retried by the clients themselves.
    if let Err(e) = invoices.connect_to_invoices().await {
        tracing::warn!(error = %e, "invoices channel not open yet");
    }
    if let Some(n) = &notifications {
        if let Err(e) = n.connect_to_notifications().await {
            tracing::warn!(error = %e, "notifications channel not open yet");
        }
    }
    if let Some(i) = &insights {
        if let Err(e) = i.connect_to_insights().await {
            tracing::warn!(error = %e, "ai-insights channel not open yet");
        }
    }

    let ids = invoice_ids();
    let mut status = invoices.client().watch_status();
    let resubscribe = async {
        loop {
            if *status.borrow_and_update() == Status::Open {
                for id in &ids {
                    invoices.subscribe_to_invoice(id);
                }
            }
            if status.changed().await.is_err() {
                break;
            }
        }
    };

    tokio::select! {
        _ = resubscribe => {}
        res = tokio::signal::ctrl_c() => {
            if let Err(e) = res {
                tracing::error!(error = %e, "ctrl-c handler failed");
            }
        }
    }

    tracing::info!("shutting down");
    invoices.disconnect();
    if let Some(n) = &notifications {
        n.disconnect();
    }
    if let Some(i) = &insights {
        i.disconnect();
    }
}
