//! Event message types.
//!
//! Events are notifications pushed by the browser when something happens
//! that no command asked about: page lifecycle, network activity, target
//! churn, console output.
//!
//! Typed parsing via [`Event::parse`] is best-effort enrichment: every
//! event is delivered to subscribers with its raw params regardless of
//! whether a [`ParsedEvent`] variant exists for it.

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;
use serde_json::Value;

// ============================================================================
// Event
// ============================================================================

/// An unsolicited notification from the browser.
///
/// # Format
///
/// ```json
/// {
///   "method": "Domain.eventName",
///   "params": { ... }
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    /// Event name in `Domain.eventName` format.
    pub method: String,

    /// Event-specific data.
    #[serde(default)]
    pub params: Value,
}

impl Event {
    /// Returns the domain name from the method.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let event = Event { method: "Page.loadEventFired".into(), .. };
    /// assert_eq!(event.domain(), "Page");
    /// ```
    #[inline]
    #[must_use]
    pub fn domain(&self) -> &str {
        self.method.split('.').next().unwrap_or_default()
    }

    /// Returns the event name from the method.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let event = Event { method: "Page.loadEventFired".into(), .. };
    /// assert_eq!(event.event_name(), "loadEventFired");
    /// ```
    #[inline]
    #[must_use]
    pub fn event_name(&self) -> &str {
        self.method.split('.').nth(1).unwrap_or_default()
    }

    /// Parses the event into a typed variant.
    #[must_use]
    pub fn parse(&self) -> ParsedEvent {
        self.parse_internal()
    }
}

// ============================================================================
// ParsedEvent
// ============================================================================

/// Parsed event types for type-safe handling.
///
/// Covers the events most clients react to; everything else falls through
/// to [`ParsedEvent::Unknown`] with the raw params intact.
#[derive(Debug, Clone)]
pub enum ParsedEvent {
    /// Page `load` event fired.
    PageLoadEventFired {
        /// Monotonic timestamp in seconds.
        timestamp: f64,
    },

    /// Page `DOMContentLoaded` event fired.
    PageDomContentEventFired {
        /// Monotonic timestamp in seconds.
        timestamp: f64,
    },

    /// A frame committed a navigation.
    PageFrameNavigated {
        /// Frame ID.
        frame_id: String,
        /// Document URL.
        url: String,
    },

    /// A network request is about to go out.
    NetworkRequestWillBeSent {
        /// Request ID.
        request_id: String,
        /// Request URL.
        url: String,
        /// HTTP method.
        method: String,
        /// Resource type.
        resource_type: String,
    },

    /// Response headers received.
    NetworkResponseReceived {
        /// Request ID.
        request_id: String,
        /// Response URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// HTTP status text.
        status_text: String,
    },

    /// Request body fully read.
    NetworkLoadingFinished {
        /// Request ID.
        request_id: String,
        /// Total encoded bytes received.
        encoded_data_length: f64,
    },

    /// Request failed.
    NetworkLoadingFailed {
        /// Request ID.
        request_id: String,
        /// Failure description.
        error_text: String,
        /// Whether the request was canceled locally.
        canceled: bool,
    },

    /// A new target was created.
    TargetCreated {
        /// Target ID.
        target_id: String,
        /// Target type (`page`, `iframe`, `service_worker`, ...).
        target_type: String,
        /// Target URL.
        url: String,
    },

    /// A target was destroyed.
    TargetDestroyed {
        /// Target ID.
        target_id: String,
    },

    /// Console API was called in the page.
    RuntimeConsoleApiCalled {
        /// Call type (`log`, `warning`, `error`, ...).
        call_type: String,
        /// Raw argument list.
        args: Value,
    },

    /// The browser detached the debugging session.
    InspectorDetached {
        /// Detach reason.
        reason: String,
    },

    /// Unknown event type.
    Unknown {
        /// Event method.
        method: String,
        /// Event params.
        params: Value,
    },
}

// ============================================================================
// Event Parsing Implementation
// ============================================================================

impl Event {
    /// Internal parsing implementation.
    fn parse_internal(&self) -> ParsedEvent {
        match self.method.as_str() {
            "Page.loadEventFired" => ParsedEvent::PageLoadEventFired {
                timestamp: self.get_f64("/timestamp"),
            },

            "Page.domContentEventFired" => ParsedEvent::PageDomContentEventFired {
                timestamp: self.get_f64("/timestamp"),
            },

            "Page.frameNavigated" => ParsedEvent::PageFrameNavigated {
                frame_id: self.get_string("/frame/id"),
                url: self.get_string("/frame/url"),
            },

            "Network.requestWillBeSent" => ParsedEvent::NetworkRequestWillBeSent {
                request_id: self.get_string("/requestId"),
                url: self.get_string("/request/url"),
                method: self.get_string_or("/request/method", "GET"),
                resource_type: self.get_string_or("/type", "Other"),
            },

            "Network.responseReceived" => ParsedEvent::NetworkResponseReceived {
                request_id: self.get_string("/requestId"),
                url: self.get_string("/response/url"),
                status: self.get_u16("/response/status"),
                status_text: self.get_string("/response/statusText"),
            },

            "Network.loadingFinished" => ParsedEvent::NetworkLoadingFinished {
                request_id: self.get_string("/requestId"),
                encoded_data_length: self.get_f64("/encodedDataLength"),
            },

            "Network.loadingFailed" => ParsedEvent::NetworkLoadingFailed {
                request_id: self.get_string("/requestId"),
                error_text: self.get_string("/errorText"),
                canceled: self.get_bool("/canceled"),
            },

            "Target.targetCreated" => ParsedEvent::TargetCreated {
                target_id: self.get_string("/targetInfo/targetId"),
                target_type: self.get_string("/targetInfo/type"),
                url: self.get_string("/targetInfo/url"),
            },

            "Target.targetDestroyed" => ParsedEvent::TargetDestroyed {
                target_id: self.get_string("/targetId"),
            },

            "Runtime.consoleAPICalled" => ParsedEvent::RuntimeConsoleApiCalled {
                call_type: self.get_string("/type"),
                args: self.params.pointer("/args").cloned().unwrap_or(Value::Null),
            },

            "Inspector.detached" => ParsedEvent::InspectorDetached {
                reason: self.get_string("/reason"),
            },

            _ => ParsedEvent::Unknown {
                method: self.method.clone(),
                params: self.params.clone(),
            },
        }
    }

    /// Gets a string from params by JSON pointer.
    #[inline]
    fn get_string(&self, pointer: &str) -> String {
        self.params
            .pointer(pointer)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    }

    /// Gets a string from params with default.
    #[inline]
    fn get_string_or(&self, pointer: &str, default: &str) -> String {
        self.params
            .pointer(pointer)
            .and_then(|v| v.as_str())
            .unwrap_or(default)
            .to_string()
    }

    /// Gets an f64 from params.
    #[inline]
    fn get_f64(&self, pointer: &str) -> f64 {
        self.params
            .pointer(pointer)
            .and_then(|v| v.as_f64())
            .unwrap_or_default()
    }

    /// Gets a bool from params.
    #[inline]
    fn get_bool(&self, pointer: &str) -> bool {
        self.params
            .pointer(pointer)
            .and_then(|v| v.as_bool())
            .unwrap_or_default()
    }

    /// Gets a u16 from params.
    #[inline]
    fn get_u16(&self, pointer: &str) -> u16 {
        self.params
            .pointer(pointer)
            .and_then(|v| v.as_u64())
            .unwrap_or_default() as u16
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_accessors() {
        let json_str = r#"{
            "method": "Page.loadEventFired",
            "params": {"timestamp": 8221.55}
        }"#;

        let event: Event = serde_json::from_str(json_str).expect("parse event");
        assert_eq!(event.domain(), "Page");
        assert_eq!(event.event_name(), "loadEventFired");
    }

    #[test]
    fn test_load_event_parsing() {
        let json_str = r#"{
            "method": "Page.loadEventFired",
            "params": {"timestamp": 8221.55}
        }"#;

        let event: Event = serde_json::from_str(json_str).expect("parse event");
        match event.parse() {
            ParsedEvent::PageLoadEventFired { timestamp } => {
                assert!((timestamp - 8221.55).abs() < f64::EPSILON);
            }
            other => panic!("unexpected parsed event: {other:?}"),
        }
    }

    #[test]
    fn test_frame_navigated_parsing() {
        let json_str = r#"{
            "method": "Page.frameNavigated",
            "params": {
                "frame": {"id": "F39A", "url": "https://example.com/"}
            }
        }"#;

        let event: Event = serde_json::from_str(json_str).expect("parse event");
        match event.parse() {
            ParsedEvent::PageFrameNavigated { frame_id, url } => {
                assert_eq!(frame_id, "F39A");
                assert_eq!(url, "https://example.com/");
            }
            other => panic!("unexpected parsed event: {other:?}"),
        }
    }

    #[test]
    fn test_response_received_parsing() {
        let json_str = r#"{
            "method": "Network.responseReceived",
            "params": {
                "requestId": "1000.2",
                "response": {
                    "url": "https://example.com/app.js",
                    "status": 404,
                    "statusText": "Not Found"
                }
            }
        }"#;

        let event: Event = serde_json::from_str(json_str).expect("parse event");
        match event.parse() {
            ParsedEvent::NetworkResponseReceived {
                request_id,
                status,
                status_text,
                ..
            } => {
                assert_eq!(request_id, "1000.2");
                assert_eq!(status, 404);
                assert_eq!(status_text, "Not Found");
            }
            other => panic!("unexpected parsed event: {other:?}"),
        }
    }

    #[test]
    fn test_target_created_parsing() {
        let json_str = r#"{
            "method": "Target.targetCreated",
            "params": {
                "targetInfo": {
                    "targetId": "T1",
                    "type": "page",
                    "url": "about:blank"
                }
            }
        }"#;

        let event: Event = serde_json::from_str(json_str).expect("parse event");
        match event.parse() {
            ParsedEvent::TargetCreated {
                target_id,
                target_type,
                url,
            } => {
                assert_eq!(target_id, "T1");
                assert_eq!(target_type, "page");
                assert_eq!(url, "about:blank");
            }
            other => panic!("unexpected parsed event: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_event() {
        let json_str = r#"{
            "method": "Animation.animationStarted",
            "params": {"foo": "bar"}
        }"#;

        let event: Event = serde_json::from_str(json_str).expect("parse event");
        match event.parse() {
            ParsedEvent::Unknown { method, params } => {
                assert_eq!(method, "Animation.animationStarted");
                assert_eq!(params["foo"], "bar");
            }
            other => panic!("expected Unknown variant, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_params_defaults() {
        let json_str = r#"{"method": "Page.loadEventFired"}"#;

        let event: Event = serde_json::from_str(json_str).expect("parse event");
        match event.parse() {
            ParsedEvent::PageLoadEventFired { timestamp } => {
                assert_eq!(timestamp, 0.0);
            }
            other => panic!("unexpected parsed event: {other:?}"),
        }
    }
}
