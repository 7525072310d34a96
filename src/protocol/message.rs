//! Inbound frame classification.
//!
//! Every decoded frame is exactly one of two shapes: a response to a
//! pending command, or an unsolicited event. Classification is by shape
//! alone: any frame carrying an `id` field is a response, whether or not a
//! command with that id is still pending. Responses with unknown ids are
//! dropped by the dispatcher instead of being routed to the event path.

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;

use super::event::Event;
use super::response::CommandResponse;

// ============================================================================
// InboundMessage
// ============================================================================

/// One decoded inbound frame.
///
/// Variant order matters: a frame with an `id` field deserializes as
/// [`InboundMessage::Response`] before the event shape is tried.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum InboundMessage {
    /// Response to a command, keyed by `id`.
    Response(CommandResponse),

    /// Unsolicited notification, keyed by `method`.
    Event(Event),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::identifiers::CommandId;

    #[test]
    fn test_classifies_response() {
        let frame = r#"{"id": 3, "result": {"ok": true}}"#;
        let message: InboundMessage = serde_json::from_str(frame).expect("parse");

        match message {
            InboundMessage::Response(response) => {
                assert_eq!(response.id, CommandId::new(3));
                assert!(!response.is_error());
            }
            InboundMessage::Event(_) => panic!("expected response"),
        }
    }

    #[test]
    fn test_classifies_error_response() {
        let frame = r#"{"id": 4, "error": {"code": -32601, "message": "not found"}}"#;
        let message: InboundMessage = serde_json::from_str(frame).expect("parse");

        assert!(matches!(message, InboundMessage::Response(ref r) if r.is_error()));
    }

    #[test]
    fn test_classifies_event() {
        let frame = r#"{"method": "Page.loadEventFired", "params": {"timestamp": 1.0}}"#;
        let message: InboundMessage = serde_json::from_str(frame).expect("parse");

        match message {
            InboundMessage::Event(event) => {
                assert_eq!(event.method, "Page.loadEventFired");
            }
            InboundMessage::Response(_) => panic!("expected event"),
        }
    }

    #[test]
    fn test_id_wins_over_method() {
        // No real CDP frame carries both fields; if one did, the id makes
        // it a response.
        let frame = r#"{"id": 7, "method": "Page.loadEventFired", "result": {}}"#;
        let message: InboundMessage = serde_json::from_str(frame).expect("parse");

        assert!(matches!(message, InboundMessage::Response(_)));
    }

    #[test]
    fn test_rejects_unclassifiable_frame() {
        let frame = r#"{"neither": "shape"}"#;
        assert!(serde_json::from_str::<InboundMessage>(frame).is_err());
    }
}
