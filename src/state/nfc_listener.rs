use crate::api::ApiClient;
use crate::util::identifier_from_link;
use leptos::logging::{log, warn};
use leptos::prelude::*;
use leptos::task::spawn_local;
use serde::Deserialize;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{MessageEvent, WebSocket};

pub(crate) const NFC_MESSAGE_TYPE: &str = "nfcData";

/// Outer frame pushed by the relay: `{ "type": "nfcData", "data": { "type", "data" } }`.
#[derive(Deserialize, Debug)]
struct NfcFrame {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    data: Option<NfcRecord>,
}

#[derive(Deserialize, Debug)]
struct NfcRecord {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    data: String,
}

/// What a tap asks the page to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum NfcAction {
    /// A profile link was tapped; carries the identifier.
    Identifier(String),
    /// A mini-program link was tapped; it must be resolved through the shorts table.
    LookupWxLink(String),
}

/// Decodes one socket message. Anything that is not a usable `nfcData` frame yields `None`.
pub(crate) fn decode_nfc_message(raw: &str) -> Option<NfcAction> {
    let frame: NfcFrame = serde_json::from_str(raw).ok()?;
    if frame.kind != NFC_MESSAGE_TYPE {
        return None;
    }
    let record = frame.data?;
    let value = record.data.trim();
    if value.is_empty() {
        return None;
    }
    match record.kind.as_str() {
        "profile_link" => {
            let id = identifier_from_link(value);
            (!id.is_empty()).then_some(NfcAction::Identifier(id))
        }
        "wx_link" => Some(NfcAction::LookupWxLink(value.to_string())),
        _ => None,
    }
}

pub(crate) fn socket_url(base: &str, token: &str) -> String {
    format!(
        "{}?token={}",
        base.trim_end_matches('/'),
        urlencoding::encode(token)
    )
}

fn dispatch(action: NfcAction, api: &ApiClient, on_identifier: Callback<String>) {
    match action {
        NfcAction::Identifier(id) => on_identifier.run(id),
        NfcAction::LookupWxLink(wx_link) => {
            let api = api.clone();
            spawn_local(async move {
                match api.lookup_wx_link(&wx_link).await {
                    Ok(Some(link)) => {
                        let id = identifier_from_link(&link);
                        if !id.is_empty() {
                            on_identifier.run(id);
                        }
                    }
                    Ok(None) => log!("no profile registered for {wx_link}"),
                    Err(e) => warn!("shorts lookup for {wx_link} failed: {e}"),
                }
            });
        }
    }
}

/// Listens to the NFC relay and hands every tapped identifier to `on_identifier`.
///
/// The socket lives as long as the calling owner; teardown detaches the handler and closes it.
pub(crate) fn use_nfc_listener(api: ApiClient, on_identifier: Callback<String>) {
    let cfg = api.nfc().clone();
    if !cfg.enabled {
        return;
    }

    let url = socket_url(&cfg.socket_url, &cfg.token);
    let socket = match WebSocket::new(&url) {
        Ok(s) => s,
        Err(e) => {
            warn!("nfc socket {url} could not be opened: {e:?}");
            return;
        }
    };

    let onopen = Closure::wrap(Box::new(move |_: web_sys::Event| {
        log!("nfc socket connected");
    }) as Box<dyn FnMut(web_sys::Event)>);
    socket.set_onopen(Some(onopen.as_ref().unchecked_ref()));

    let onmessage = Closure::wrap(Box::new(move |event: MessageEvent| {
        let Some(raw) = event.data().as_string() else {
            return;
        };
        match decode_nfc_message(&raw) {
            Some(action) => dispatch(action, &api, on_identifier),
            None => log!("ignoring nfc message: {raw}"),
        }
    }) as Box<dyn FnMut(MessageEvent)>);
    socket.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));

    let held = StoredValue::new_local(Some((socket, onopen, onmessage)));
    on_cleanup(move || {
        if let Some(Some((socket, _onopen, _onmessage))) = held.try_update_value(|h| h.take()) {
            socket.set_onopen(None);
            socket.set_onmessage(None);
            if let Err(e) = socket.close() {
                warn!("nfc socket close failed: {e:?}");
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_link_tap_yields_identifier() {
        let raw = r#"{"type":"nfcData","data":{"type":"profile_link","data":"https://bonjour.bio/alice"}}"#;
        assert_eq!(
            decode_nfc_message(raw),
            Some(NfcAction::Identifier("alice".to_string()))
        );

        let bare = r#"{"type":"nfcData","data":{"type":"profile_link","data":"bob"},"target":"x"}"#;
        assert_eq!(
            decode_nfc_message(bare),
            Some(NfcAction::Identifier("bob".to_string()))
        );
    }

    #[test]
    fn test_wx_link_tap_requires_lookup() {
        let raw = r#"{"type":"nfcData","data":{"type":"wx_link","data":" https://wx.example/s/1 "}}"#;
        assert_eq!(
            decode_nfc_message(raw),
            Some(NfcAction::LookupWxLink("https://wx.example/s/1".to_string()))
        );
    }

    #[test]
    fn test_other_messages_are_ignored() {
        for raw in [
            "not json",
            r#"{"type":"ping"}"#,
            r#"{"type":"nfcData"}"#,
            r#"{"type":"other","data":{"type":"profile_link","data":"alice"}}"#,
            r#"{"type":"nfcData","data":{"type":"unknown","data":"alice"}}"#,
            r#"{"type":"nfcData","data":{"type":"profile_link","data":"  "}}"#,
            r#"{"type":"nfcData","data":{"type":"profile_link","data":"https://bonjour.bio/"}}"#,
        ] {
            assert_eq!(decode_nfc_message(raw), None, "{raw}");
        }
    }

    #[test]
    fn test_profile_tap_dispatches_to_identifier_writer() {
        use std::sync::{Arc, Mutex};

        let owner = Owner::new();
        owner.set();

        let written = Arc::new(Mutex::new(Vec::<String>::new()));
        let sink = {
            let written = written.clone();
            Callback::new(move |id: String| {
                if let Ok(mut w) = written.lock() {
                    w.push(id);
                }
            })
        };
        let api = ApiClient::new("https://p.example".into(), "https://l.example".into());

        let raw = r#"{"type":"nfcData","data":{"type":"profile_link","data":"https://bonjour.bio/carol/"}}"#;
        let action = decode_nfc_message(raw).expect("profile tap");
        dispatch(action, &api, sink);

        assert_eq!(*written.lock().expect("lock"), vec!["carol".to_string()]);
    }

    #[test]
    fn test_socket_url_carries_token() {
        assert_eq!(
            socket_url("wss://nfcws.bonjour.bio/", "nfcService"),
            "wss://nfcws.bonjour.bio?token=nfcService"
        );
        assert_eq!(socket_url("wss://h", "a b"), "wss://h?token=a%20b");
    }
}
