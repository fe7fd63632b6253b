//! EmailJS delivery adapter.
//!
//! Submits one templated email per lot to the EmailJS transactional API.
//! Delivery is submit-and-log, best effort: the HTTP response is never
//! interpreted, a non-success status is not detected, and nothing is retried.
//! Only a transport-level failure surfaces, as a send error the queue
//! consumer logs and drops. One pipe-delimited audit line is written per
//! submission, before the call.

use serde::Serialize;

use lis_common::config::EmailJsConfig;
use lis_common::error::PipelineError;
use lis_common::types::LotNotification;

/// EmailJS transactional send endpoint.
const EMAILJS_SEND_URL: &str = "https://api.emailjs.com/api/v1.0/email/send";

/// Request body for the EmailJS send API.
#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    #[serde(rename = "accessToken")]
    access_token: &'a str,
    user_id: &'a str,
    template_params: &'a LotNotification,
}

/// Outbound email client for one worker process.
pub struct EmailSender {
    http: reqwest::Client,
    config: EmailJsConfig,
}

impl EmailSender {
    pub fn new(config: EmailJsConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Submit one lot notification as template parameters.
    pub async fn send(&self, lot: &LotNotification) -> Result<(), PipelineError> {
        tracing::info!(target: "audit", "{}", audit_line(lot));

        let request = SendRequest {
            service_id: &self.config.service_id,
            template_id: &self.config.template_id,
            access_token: &self.config.access_token,
            user_id: &self.config.user_id,
            template_params: lot,
        };

        // Fire and forget: the response is intentionally dropped unread.
        self.http.post(EMAILJS_SEND_URL).json(&request).send().await?;

        Ok(())
    }
}

/// Audit line for one send, all fields pipe-delimited.
fn audit_line(lot: &LotNotification) -> String {
    format!(
        "{}|{}|{}|{}|{}|{}|{}|{}|{}|{}",
        lot.lot,
        lot.part,
        lot.status,
        lot.note,
        lot.po,
        lot.date,
        lot.mfg_qty,
        lot.qty,
        lot.sales_rep,
        lot.sales_rep_email
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lot() -> LotNotification {
        LotNotification {
            lot: "240101".to_string(),
            part: "549".to_string(),
            mfg_qty: "1000".to_string(),
            qty: "950".to_string(),
            status: "Released".to_string(),
            note: "A-12".to_string(),
            po: "E12345".to_string(),
            date: "January 02, 2024".to_string(),
            sales_rep: "Northeast".to_string(),
            sales_rep_email: "ne@busseinc.com".to_string(),
        }
    }

    #[test]
    fn test_audit_line_field_order() {
        assert_eq!(
            audit_line(&lot()),
            "240101|549|Released|A-12|E12345|January 02, 2024|1000|950|Northeast|ne@busseinc.com"
        );
    }

    #[test]
    fn test_send_request_shape() {
        let lot = lot();
        let request = SendRequest {
            service_id: "svc",
            template_id: "tpl",
            access_token: "tok",
            user_id: "usr",
            template_params: &lot,
        };
        let value = serde_json::to_value(&request).unwrap();

        // EmailJS expects camelCase for the access token only.
        assert_eq!(value["accessToken"], "tok");
        assert_eq!(value["service_id"], "svc");
        assert_eq!(value["template_params"]["sales_rep"], "Northeast");
        assert_eq!(value["template_params"]["sales_rep_email"], "ne@busseinc.com");
    }
}
