//! Outgoing events (Mini App → host).
//!
//! Every event the Mini App can emit is a variant of [`OutgoingEvent`].
//! Variants either carry no payload, carry an explicit `null` payload, or
//! carry a fixed-shape JSON object.
//!
//! # Event Types
//!
//! | Group | Events |
//! |-------|--------|
//! | Lifecycle | `web_app_ready`, `web_app_expand`, `web_app_close`, `iframe_ready`, `iframe_will_reload` |
//! | Buttons | `web_app_setup_main_button`, `web_app_setup_back_button`, `web_app_setup_settings_button` |
//! | Popups | `web_app_open_popup`, `web_app_open_scan_qr_popup`, `web_app_close_scan_qr_popup` |
//! | Appearance | `web_app_set_background_color`, `web_app_set_header_color`, `web_app_request_theme`, `web_app_request_viewport` |
//! | Navigation | `web_app_open_link`, `web_app_open_tg_link`, `web_app_open_invoice`, `web_app_switch_inline_query` |
//! | Permissions | `web_app_request_write_access`, `web_app_request_phone` |
//! | Misc | `web_app_invoke_custom_method`, `web_app_read_text_from_clipboard`, `web_app_data_send`, `web_app_trigger_haptic_feedback`, `web_app_setup_closing_behavior`, `payment_form_submit` |

// ============================================================================
// Imports
// ============================================================================

use serde::Serialize;
use serde_json::{Map, Value, json, to_value};

use crate::error::Result;
use crate::identifiers::RequestId;

// ============================================================================
// Constants
// ============================================================================

/// Event type used to invoke a custom method.
pub const INVOKE_CUSTOM_METHOD: &str = "web_app_invoke_custom_method";

// ============================================================================
// OutgoingEvent
// ============================================================================

/// An event emitted from the Mini App to the host.
#[derive(Debug, Clone, PartialEq)]
pub enum OutgoingEvent {
    /// Close the Mini App.
    Close,

    /// Show a native popup.
    OpenPopup(PopupParams),

    /// Ask the user for permission to receive bot messages.
    RequestWriteAccess,

    /// Ask the user to share their phone number.
    RequestPhone,

    /// Invoke a custom method. Usually sent by
    /// [`Bridge::invoke_custom_method`](crate::Bridge::invoke_custom_method).
    InvokeCustomMethod(InvokeCustomMethodParams),

    /// Read text from the clipboard.
    ReadTextFromClipboard {
        /// Id echoed back in `clipboard_text_received`.
        req_id: String,
    },

    /// Open the QR scanner.
    OpenScanQrPopup {
        /// Hint text shown under the scanner.
        text: Option<String>,
    },

    /// Close the QR scanner.
    CloseScanQrPopup,

    /// Toggle the close confirmation dialog.
    SetupClosingBehavior {
        /// Ask for confirmation before closing.
        need_confirmation: bool,
    },

    /// Set the background color.
    SetBackgroundColor {
        /// Color in `#RRGGBB` format.
        color: String,
    },

    /// Set the header color.
    SetHeaderColor(HeaderColor),

    /// Send data to the bot and close.
    DataSend {
        /// Raw data, at most 4096 bytes.
        data: String,
    },

    /// Switch to inline mode in a chosen chat.
    SwitchInlineQuery {
        /// Inline query text.
        query: String,
        /// Chat types the user may pick from.
        chat_types: Vec<ChatType>,
    },

    /// Trigger haptic feedback.
    TriggerHapticFeedback(HapticFeedback),

    /// Open a link in an external browser.
    OpenLink {
        /// Target URL.
        url: String,
        /// Prefer Instant View when available.
        try_instant_view: Option<bool>,
    },

    /// Open a `t.me` link inside the client.
    OpenTgLink {
        /// Path and query after `https://t.me`.
        path_full: String,
    },

    /// Open an invoice.
    OpenInvoice {
        /// Invoice slug.
        slug: String,
    },

    /// Expand to full height.
    Expand,

    /// Request a `viewport_changed` event.
    RequestViewport,

    /// Request a `theme_changed` event.
    RequestTheme,

    /// Signal that the Mini App is ready to be shown.
    Ready,

    /// Configure the main button.
    SetupMainButton(MainButtonParams),

    /// Configure the back button.
    SetupBackButton {
        /// Show the button.
        is_visible: bool,
    },

    /// Configure the settings button.
    SetupSettingsButton {
        /// Show the button.
        is_visible: bool,
    },

    /// Submit a payment form.
    PaymentFormSubmit {
        /// Payment method title.
        title: String,
        /// Provider credentials.
        credentials: Value,
    },

    /// Announce that the iframe is about to reload.
    IframeWillReload,

    /// Announce that the iframe is ready.
    IframeReady {
        /// Whether `reload_iframe` is handled.
        reload_supported: bool,
    },
}

impl OutgoingEvent {
    /// Returns the wire event type.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Close => "web_app_close",
            Self::OpenPopup(_) => "web_app_open_popup",
            Self::RequestWriteAccess => "web_app_request_write_access",
            Self::RequestPhone => "web_app_request_phone",
            Self::InvokeCustomMethod(_) => INVOKE_CUSTOM_METHOD,
            Self::ReadTextFromClipboard { .. } => "web_app_read_text_from_clipboard",
            Self::OpenScanQrPopup { .. } => "web_app_open_scan_qr_popup",
            Self::CloseScanQrPopup => "web_app_close_scan_qr_popup",
            Self::SetupClosingBehavior { .. } => "web_app_setup_closing_behavior",
            Self::SetBackgroundColor { .. } => "web_app_set_background_color",
            Self::SetHeaderColor(_) => "web_app_set_header_color",
            Self::DataSend { .. } => "web_app_data_send",
            Self::SwitchInlineQuery { .. } => "web_app_switch_inline_query",
            Self::TriggerHapticFeedback(_) => "web_app_trigger_haptic_feedback",
            Self::OpenLink { .. } => "web_app_open_link",
            Self::OpenTgLink { .. } => "web_app_open_tg_link",
            Self::OpenInvoice { .. } => "web_app_open_invoice",
            Self::Expand => "web_app_expand",
            Self::RequestViewport => "web_app_request_viewport",
            Self::RequestTheme => "web_app_request_theme",
            Self::Ready => "web_app_ready",
            Self::SetupMainButton(_) => "web_app_setup_main_button",
            Self::SetupBackButton { .. } => "web_app_setup_back_button",
            Self::SetupSettingsButton { .. } => "web_app_setup_settings_button",
            Self::PaymentFormSubmit { .. } => "payment_form_submit",
            Self::IframeWillReload => "iframe_will_reload",
            Self::IframeReady { .. } => "iframe_ready",
        }
    }

    /// Returns the event payload, or `None` for variants without one.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Json`] if a payload fails to serialize.
    pub fn event_data(&self) -> Result<Option<Value>> {
        let data = match self {
            Self::Close
            | Self::Expand
            | Self::RequestViewport
            | Self::RequestTheme
            | Self::Ready
            | Self::IframeWillReload => return Ok(None),

            Self::RequestWriteAccess | Self::RequestPhone | Self::CloseScanQrPopup => Value::Null,

            Self::OpenPopup(params) => to_value(params)?,
            Self::InvokeCustomMethod(params) => to_value(params)?,
            Self::SetHeaderColor(color) => to_value(color)?,
            Self::TriggerHapticFeedback(feedback) => to_value(feedback)?,
            Self::SetupMainButton(params) => to_value(params)?,

            Self::ReadTextFromClipboard { req_id } => json!({ "req_id": req_id }),
            Self::OpenScanQrPopup { text } => {
                let mut object = Map::new();
                if let Some(text) = text {
                    object.insert("text".into(), json!(text));
                }
                Value::Object(object)
            }
            Self::SetupClosingBehavior { need_confirmation } => {
                json!({ "need_confirmation": need_confirmation })
            }
            Self::SetBackgroundColor { color } => json!({ "color": color }),
            Self::DataSend { data } => json!({ "data": data }),
            Self::SwitchInlineQuery { query, chat_types } => {
                json!({ "query": query, "chat_types": chat_types })
            }
            Self::OpenLink {
                url,
                try_instant_view,
            } => {
                let mut object = Map::new();
                object.insert("url".into(), json!(url));
                if let Some(try_instant_view) = try_instant_view {
                    object.insert("try_instant_view".into(), json!(try_instant_view));
                }
                Value::Object(object)
            }
            Self::OpenTgLink { path_full } => json!({ "path_full": path_full }),
            Self::OpenInvoice { slug } => json!({ "slug": slug }),
            Self::SetupBackButton { is_visible } | Self::SetupSettingsButton { is_visible } => {
                json!({ "is_visible": is_visible })
            }
            Self::PaymentFormSubmit { title, credentials } => {
                json!({ "title": title, "credentials": credentials })
            }
            Self::IframeReady { reload_supported } => {
                json!({ "reload_supported": reload_supported })
            }
        };

        Ok(Some(data))
    }
}

// ============================================================================
// Payload Types
// ============================================================================

/// Payload of `web_app_invoke_custom_method`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvokeCustomMethodParams {
    /// Correlation id echoed back in `custom_method_invoked`.
    pub req_id: RequestId,
    /// Custom method name.
    pub method: String,
    /// Method parameters.
    pub params: Value,
}

/// Payload of `web_app_open_popup`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopupParams {
    /// Popup title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Popup body text.
    pub message: String,
    /// One to three buttons.
    pub buttons: Vec<PopupButton>,
}

/// A popup button.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopupButton {
    /// Id reported back in `popup_closed`.
    pub id: String,
    /// Button style and label.
    #[serde(flatten)]
    pub kind: PopupButtonKind,
}

/// Popup button style.
///
/// Built-in kinds have a localized default label; custom kinds require one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PopupButtonKind {
    /// Localized "OK".
    Ok {
        /// Label override.
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    /// Localized "Close".
    Close {
        /// Label override.
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    /// Localized "Cancel".
    Cancel {
        /// Label override.
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    /// Regular button.
    Default {
        /// Label.
        text: String,
    },
    /// Red destructive button.
    Destructive {
        /// Label.
        text: String,
    },
}

/// Payload of `web_app_set_header_color`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum HeaderColor {
    /// Use a theme color.
    Key {
        /// Theme key.
        color_key: HeaderColorKey,
    },
    /// Use an explicit color.
    Color {
        /// Color in `#RRGGBB` format.
        color: String,
    },
}

/// Theme keys accepted by `web_app_set_header_color`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderColorKey {
    /// `bg_color`.
    BgColor,
    /// `secondary_bg_color`.
    SecondaryBgColor,
}

/// Chat types for `web_app_switch_inline_query`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatType {
    /// Private chats with users.
    Users,
    /// Private chats with bots.
    Bots,
    /// Groups.
    Groups,
    /// Channels.
    Channels,
}

/// Payload of `web_app_trigger_haptic_feedback`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HapticFeedback {
    /// Selection changed.
    SelectionChange,
    /// Collision between UI elements.
    Impact {
        /// Impact strength.
        impact_style: ImpactStyle,
    },
    /// Task outcome.
    Notification {
        /// Outcome kind.
        notification_type: NotificationType,
    },
}

/// Haptic impact style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactStyle {
    /// Light.
    Light,
    /// Medium.
    Medium,
    /// Heavy.
    Heavy,
    /// Rigid.
    Rigid,
    /// Soft.
    Soft,
}

/// Haptic notification type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    /// Error.
    Error,
    /// Success.
    Success,
    /// Warning.
    Warning,
}

/// Payload of `web_app_setup_main_button`.
///
/// Unset fields are omitted so the host keeps its current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MainButtonParams {
    /// Show the button.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_visible: Option<bool>,
    /// Enable the button.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    /// Label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Background color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Label color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    /// Show the loading indicator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_progress_visible: Option<bool>,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payloadless_events_have_no_data() {
        for event in [
            OutgoingEvent::Close,
            OutgoingEvent::Expand,
            OutgoingEvent::Ready,
            OutgoingEvent::RequestTheme,
            OutgoingEvent::RequestViewport,
            OutgoingEvent::IframeWillReload,
        ] {
            assert_eq!(event.event_data().expect("data"), None, "{}", event.event_type());
        }
    }

    #[test]
    fn test_null_payload_events() {
        for event in [
            OutgoingEvent::RequestWriteAccess,
            OutgoingEvent::RequestPhone,
            OutgoingEvent::CloseScanQrPopup,
        ] {
            assert_eq!(event.event_data().expect("data"), Some(Value::Null));
        }
    }

    #[test]
    fn test_invoke_custom_method_payload() {
        let event = OutgoingEvent::InvokeCustomMethod(InvokeCustomMethodParams {
            req_id: RequestId::from("abc"),
            method: "getStorageKeys".into(),
            params: json!({}),
        });

        assert_eq!(event.event_type(), INVOKE_CUSTOM_METHOD);
        assert_eq!(
            event.event_data().expect("data"),
            Some(json!({ "req_id": "abc", "method": "getStorageKeys", "params": {} }))
        );
    }

    #[test]
    fn test_popup_buttons() {
        let event = OutgoingEvent::OpenPopup(PopupParams {
            title: None,
            message: "Delete?".into(),
            buttons: vec![
                PopupButton {
                    id: "ok".into(),
                    kind: PopupButtonKind::Ok { text: None },
                },
                PopupButton {
                    id: "del".into(),
                    kind: PopupButtonKind::Destructive {
                        text: "Delete".into(),
                    },
                },
            ],
        });

        assert_eq!(
            event.event_data().expect("data"),
            Some(json!({
                "message": "Delete?",
                "buttons": [
                    { "id": "ok", "type": "ok" },
                    { "id": "del", "type": "destructive", "text": "Delete" }
                ]
            }))
        );
    }

    #[test]
    fn test_header_color_variants() {
        let by_key = OutgoingEvent::SetHeaderColor(HeaderColor::Key {
            color_key: HeaderColorKey::SecondaryBgColor,
        });
        assert_eq!(
            by_key.event_data().expect("data"),
            Some(json!({ "color_key": "secondary_bg_color" }))
        );

        let by_color = OutgoingEvent::SetHeaderColor(HeaderColor::Color {
            color: "#112233".into(),
        });
        assert_eq!(
            by_color.event_data().expect("data"),
            Some(json!({ "color": "#112233" }))
        );
    }

    #[test]
    fn test_haptic_feedback() {
        let event = OutgoingEvent::TriggerHapticFeedback(HapticFeedback::Impact {
            impact_style: ImpactStyle::Rigid,
        });
        assert_eq!(
            event.event_data().expect("data"),
            Some(json!({ "type": "impact", "impact_style": "rigid" }))
        );

        let event = OutgoingEvent::TriggerHapticFeedback(HapticFeedback::SelectionChange);
        assert_eq!(
            event.event_data().expect("data"),
            Some(json!({ "type": "selection_change" }))
        );
    }

    #[test]
    fn test_optional_fields_are_omitted() {
        let event = OutgoingEvent::OpenScanQrPopup { text: None };
        assert_eq!(event.event_data().expect("data"), Some(json!({})));

        let event = OutgoingEvent::OpenLink {
            url: "https://example.com".into(),
            try_instant_view: None,
        };
        assert_eq!(
            event.event_data().expect("data"),
            Some(json!({ "url": "https://example.com" }))
        );

        let event = OutgoingEvent::SetupMainButton(MainButtonParams {
            is_visible: Some(true),
            text: Some("Pay".into()),
            ..Default::default()
        });
        assert_eq!(
            event.event_data().expect("data"),
            Some(json!({ "is_visible": true, "text": "Pay" }))
        );
    }

    #[test]
    fn test_switch_inline_query() {
        let event = OutgoingEvent::SwitchInlineQuery {
            query: "cats".into(),
            chat_types: vec![ChatType::Users, ChatType::Groups],
        };
        assert_eq!(event.event_type(), "web_app_switch_inline_query");
        assert_eq!(
            event.event_data().expect("data"),
            Some(json!({ "query": "cats", "chat_types": ["users", "groups"] }))
        );
    }
}
