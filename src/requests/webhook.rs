use serde::Deserialize;

/// Raw payment-provider webhook body: `{ "event": ..., "data": ... }`.
/// Everything inside `data` is optional so that only syntactically broken
/// JSON is rejected; semantic gaps are handled per event.
#[derive(Debug, Deserialize)]
pub struct WhopEnvelope {
    pub event: String,
    #[serde(default)]
    pub data: WhopEventData,
}

#[derive(Debug, Default, Deserialize)]
pub struct WhopEventData {
    pub id: Option<String>,
    #[serde(default)]
    pub metadata: WhopMetadata,
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WhopMetadata {
    #[serde(rename = "donationId")]
    pub donation_id: Option<String>,
}

/// The provider events this service acts on, with an explicit fallback so
/// new event types never fail the request.
#[derive(Debug)]
pub enum WhopEvent {
    PaymentSucceeded(WhopEventData),
    PaymentFailed(WhopEventData),
    PaymentRefunded(WhopEventData),
    Unrecognized(String),
}

impl WhopEvent {
    pub fn from_envelope(envelope: WhopEnvelope) -> Self {
        match envelope.event.as_str() {
            "payment.succeeded" => WhopEvent::PaymentSucceeded(envelope.data),
            "payment.failed" => WhopEvent::PaymentFailed(envelope.data),
            "payment.refunded" => WhopEvent::PaymentRefunded(envelope.data),
            _ => WhopEvent::Unrecognized(envelope.event),
        }
    }
}

/// Messaging-provider session callback body.
#[derive(Debug, Deserialize)]
pub struct WhatsappEnvelope {
    pub event: String,
    #[serde(default)]
    pub data: WhatsappEventData,
}

#[derive(Debug, Default, Deserialize)]
pub struct WhatsappEventData {
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognized_events_classify() {
        let body = r#"{"event":"payment.succeeded","data":{"id":"p1","metadata":{"donationId":"d1"}}}"#;
        let envelope: WhopEnvelope = serde_json::from_str(body).unwrap();

        match WhopEvent::from_envelope(envelope) {
            WhopEvent::PaymentSucceeded(data) => {
                assert_eq!(data.id.as_deref(), Some("p1"));
                assert_eq!(data.metadata.donation_id.as_deref(), Some("d1"));
            }
            other => panic!("expected PaymentSucceeded, got {:?}", other),
        }
    }

    #[test]
    fn failed_and_refunded_classify() {
        for event in ["payment.failed", "payment.refunded"] {
            let body = format!(r#"{{"event":"{}","data":{{"id":"p2"}}}}"#, event);
            let envelope: WhopEnvelope = serde_json::from_str(&body).unwrap();
            match WhopEvent::from_envelope(envelope) {
                WhopEvent::PaymentFailed(_) | WhopEvent::PaymentRefunded(_) => {}
                other => panic!("expected failure-type event, got {:?}", other),
            }
        }
    }

    #[test]
    fn unknown_event_falls_back() {
        let body = r#"{"event":"membership.went_valid","data":{}}"#;
        let envelope: WhopEnvelope = serde_json::from_str(body).unwrap();

        match WhopEvent::from_envelope(envelope) {
            WhopEvent::Unrecognized(tag) => assert_eq!(tag, "membership.went_valid"),
            other => panic!("expected Unrecognized, got {:?}", other),
        }
    }

    #[test]
    fn missing_data_and_metadata_default() {
        let envelope: WhopEnvelope = serde_json::from_str(r#"{"event":"payment.succeeded"}"#).unwrap();
        match WhopEvent::from_envelope(envelope) {
            WhopEvent::PaymentSucceeded(data) => {
                assert!(data.id.is_none());
                assert!(data.metadata.donation_id.is_none());
            }
            other => panic!("expected PaymentSucceeded, got {:?}", other),
        }
    }

    #[test]
    fn extra_provider_fields_are_tolerated() {
        let body = r#"{"event":"payment.succeeded","data":{"id":"p1","final_amount":5000,"currency":"usd","metadata":{"donationId":"d1","campaign":"summer"}}}"#;
        let envelope: WhopEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.data.metadata.donation_id.as_deref(), Some("d1"));
    }

    #[test]
    fn whatsapp_envelope_parses() {
        let body = r#"{"event":"session.status","data":{"status":"connected"}}"#;
        let envelope: WhatsappEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.event, "session.status");
        assert_eq!(envelope.data.status.as_deref(), Some("connected"));
    }
}
