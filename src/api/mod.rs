use crate::models::ProfileRecord;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    /// 404. Terminal: the identifier does not name a profile.
    NotFound,
    /// 5xx.
    ServerError,
    /// 429.
    RateLimited,
    /// Any other non-2xx status.
    Http,
    /// The request could not be sent or completed.
    Network,
    /// Body did not decode, or the envelope reported failure.
    Data,
}

impl ApiErrorKind {
    pub fn is_retryable(self) -> bool {
        !matches!(self, ApiErrorKind::NotFound)
    }
}

/// Maps an HTTP status to an error kind. `None` for 2xx.
pub(crate) fn classify_status(status: u16) -> Option<ApiErrorKind> {
    match status {
        200..=299 => None,
        404 => Some(ApiErrorKind::NotFound),
        429 => Some(ApiErrorKind::RateLimited),
        s if s >= 500 => Some(ApiErrorKind::ServerError),
        _ => Some(ApiErrorKind::Http),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub status: Option<u16>,
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            status: None,
            message: format!("Connection failed: {e}"),
        }
    }

    pub(crate) fn data(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Data,
            status: None,
            message: format!("Data error: {e}"),
        }
    }

    /// Builds the error for a non-2xx status.
    pub(crate) fn from_status(status: u16, ctx: &str) -> Self {
        let kind = classify_status(status).unwrap_or(ApiErrorKind::Http);
        let message = match kind {
            ApiErrorKind::NotFound => format!("{ctx}: not found"),
            ApiErrorKind::ServerError => format!("{ctx}: server error ({status})"),
            ApiErrorKind::RateLimited => format!("{ctx}: rate limited"),
            _ => format!("{ctx}: HTTP error ({status})"),
        };
        Self {
            kind,
            status: Some(status),
            message,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ApiErrorKind::NotFound
    }

    /// Short copy for the control panel status line.
    pub fn short_label(&self) -> &'static str {
        if self.is_not_found() {
            "User not found"
        } else {
            "Network error"
        }
    }

    /// Copy for the error card.
    pub fn card_message(&self) -> &'static str {
        if self.is_not_found() {
            "User not found"
        } else {
            "Failed to load the profile"
        }
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

pub(crate) const DEFAULT_PROFILE_API_URL: &str =
    "https://fc-mp-b1a9bc8c-0aab-44ca-9af2-2bd604163a78.next.bspapp.com";
pub(crate) const DEFAULT_LINK_API_URL: &str = "/api/link";
pub(crate) const DEFAULT_NFC_SOCKET_URL: &str = "wss://nfcws.bonjour.bio";
pub(crate) const DEFAULT_NFC_TOKEN: &str = "nfcService";

/// NFC tap relay: the websocket that pushes tapped links, and the shorts table that maps a
/// mini-program link to a profile link.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct NfcConfig {
    pub enabled: bool,
    pub socket_url: String,
    pub token: String,
    pub shorts_url: String,
    /// Sent as the `token` header; no header when empty.
    pub shorts_token: String,
}

impl Default for NfcConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            socket_url: DEFAULT_NFC_SOCKET_URL.to_string(),
            token: DEFAULT_NFC_TOKEN.to_string(),
            shorts_url: format!("{DEFAULT_PROFILE_API_URL}/admin/database"),
            shorts_token: String::new(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct EnvConfig {
    pub profile_api_url: String,
    pub link_api_url: String,
    pub nfc: NfcConfig,
}

impl EnvConfig {
    pub fn new() -> Self {
        let mut cfg = Self {
            profile_api_url: DEFAULT_PROFILE_API_URL.to_string(),
            link_api_url: DEFAULT_LINK_API_URL.to_string(),
            nfc: NfcConfig::default(),
        };

        // `window.ENV.PROFILE_API_URL` wins over the lowercase spelling.
        if let Some(url) = read_env_key(&["PROFILE_API_URL", "profile_api_url"]) {
            cfg.profile_api_url = url;
        }
        if let Some(url) = read_env_key(&["LINK_API_URL", "link_api_url"]) {
            cfg.link_api_url = url;
        }
        if let Some(flag) = read_env_key(&["NFC_ENABLED", "nfc_enabled"]) {
            cfg.nfc.enabled = flag_enabled(&flag);
        }
        if let Some(url) = read_env_key(&["NFC_SOCKET_URL", "nfc_socket_url"]) {
            cfg.nfc.socket_url = url;
        }
        if let Some(token) = read_env_key(&["NFC_TOKEN", "nfc_token"]) {
            cfg.nfc.token = token;
        }
        if let Some(url) = read_env_key(&["SHORTS_API_URL", "shorts_api_url"]) {
            cfg.nfc.shorts_url = url;
        }
        if let Some(token) = read_env_key(&["SHORTS_API_TOKEN", "shorts_api_token"]) {
            cfg.nfc.shorts_token = token;
        }

        // reqwest needs absolute URLs; resolve same-origin paths against the page.
        let origin = web_sys::window().and_then(|w| w.location().origin().ok());
        cfg.link_api_url = absolutize(&cfg.link_api_url, origin.as_deref());
        cfg.profile_api_url = absolutize(&cfg.profile_api_url, origin.as_deref());
        cfg.nfc.shorts_url = absolutize(&cfg.nfc.shorts_url, origin.as_deref());
        cfg
    }
}

/// Only falsy spellings (`false`, `0`, `off`, `no`) turn a feature off.
pub(crate) fn flag_enabled(raw: &str) -> bool {
    !matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "false" | "0" | "off" | "no"
    )
}

pub(crate) fn absolutize(url: &str, origin: Option<&str>) -> String {
    match origin {
        Some(origin) if url.starts_with('/') => {
            format!("{}{}", origin.trim_end_matches('/'), url)
        }
        _ => url.to_string(),
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn read_env_key(keys: &[&str]) -> Option<String> {
    let window = web_sys::window()?;
    let env = window.get("ENV")?;
    if env.is_undefined() || !env.is_object() {
        return None;
    }
    keys.iter().find_map(|k| {
        js_sys::Reflect::get(&env, &(*k).into())
            .ok()
            .and_then(|v| v.as_string())
            .filter(|s| !s.trim().is_empty())
    })
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct ProfileEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<ProfileRecord>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub(crate) struct LinkResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub link: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct PublishLinkRequest {
    pub link: String,
}

/// One row of the shorts table.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub(crate) struct ShortRecord {
    #[serde(default)]
    pub profile_link: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub(crate) struct ShortsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Vec<ShortRecord>,
}

impl ShortsResponse {
    /// The profile link of the first matching row, if any.
    pub fn first_profile_link(&self) -> Option<String> {
        if !self.success {
            return None;
        }
        self.data
            .first()
            .and_then(|r| r.profile_link.as_deref())
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
    }
}

#[derive(Clone, Debug)]
pub(crate) struct ApiClient {
    pub(crate) profile_base_url: String,
    pub(crate) link_url: String,
    pub(crate) nfc: NfcConfig,
}

impl ApiClient {
    pub fn new(profile_base_url: String, link_url: String) -> Self {
        Self {
            profile_base_url,
            link_url,
            nfc: NfcConfig::default(),
        }
    }

    pub fn with_nfc(mut self, nfc: NfcConfig) -> Self {
        self.nfc = nfc;
        self
    }

    pub fn from_env() -> Self {
        let cfg = EnvConfig::new();
        Self::new(cfg.profile_api_url, cfg.link_api_url).with_nfc(cfg.nfc)
    }

    pub fn nfc(&self) -> &NfcConfig {
        &self.nfc
    }

    pub(crate) fn shorts_url(&self, wx_link: &str) -> String {
        format!(
            "{}/shorts?wx_link={}",
            self.nfc.shorts_url.trim_end_matches('/'),
            urlencoding::encode(wx_link.trim())
        )
    }

    pub(crate) fn profile_url(&self, identifier: &str) -> String {
        format!(
            "{}/profile/{}",
            self.profile_base_url.trim_end_matches('/'),
            urlencoding::encode(identifier.trim())
        )
    }

    pub(crate) fn unwrap_profile_envelope(envelope: ProfileEnvelope) -> ApiResult<ProfileRecord> {
        match envelope {
            ProfileEnvelope {
                success: true,
                data: Some(profile),
            } => Ok(profile),
            ProfileEnvelope { success: false, .. } => {
                Err(ApiError::data("profile service reported failure"))
            }
            ProfileEnvelope { data: None, .. } => Err(ApiError::data("profile payload missing")),
        }
    }

    pub async fn get_profile(&self, identifier: &str) -> ApiResult<ProfileRecord> {
        let client = reqwest::Client::new();
        let res = client
            .get(self.profile_url(identifier))
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(ApiError::network)?;

        let status = res.status().as_u16();
        if classify_status(status).is_some() {
            return Err(ApiError::from_status(status, "Profile request failed"));
        }

        let envelope: ProfileEnvelope = res.json().await.map_err(ApiError::data)?;
        Self::unwrap_profile_envelope(envelope)
    }

    /// Reads the shared link slot.
    ///
    /// The link proxy answers failures with `{ success: false }` and a 5xx status, so the
    /// body is decoded regardless of status; only transport and decode errors are `Err`.
    pub async fn get_link(&self) -> ApiResult<LinkResponse> {
        let client = reqwest::Client::new();
        let res = client
            .get(&self.link_url)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(ApiError::network)?;

        res.json().await.map_err(ApiError::data)
    }

    /// Resolves a mini-program link to the profile link stored for it; `Ok(None)` when the
    /// shorts table has no usable row.
    pub async fn lookup_wx_link(&self, wx_link: &str) -> ApiResult<Option<String>> {
        let client = reqwest::Client::new();
        let mut req = client.get(self.shorts_url(wx_link));
        if !self.nfc.shorts_token.is_empty() {
            req = req.header("token", &self.nfc.shorts_token);
        }
        let res = req.send().await.map_err(ApiError::network)?;

        let status = res.status().as_u16();
        if classify_status(status).is_some() {
            return Err(ApiError::from_status(status, "Shorts lookup failed"));
        }

        let body: ShortsResponse = res.json().await.map_err(ApiError::data)?;
        Ok(body.first_profile_link())
    }

    pub async fn publish_link(&self, link: &str) -> ApiResult<LinkResponse> {
        let client = reqwest::Client::new();
        let res = client
            .post(&self.link_url)
            .json(&PublishLinkRequest {
                link: link.to_string(),
            })
            .send()
            .await
            .map_err(ApiError::network)?;

        let status = res.status().as_u16();
        if classify_status(status).is_some() {
            return Err(ApiError::from_status(status, "Publishing link failed"));
        }
        res.json().await.map_err(ApiError::data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_status_taxonomy() {
        assert_eq!(classify_status(200), None);
        assert_eq!(classify_status(204), None);
        assert_eq!(classify_status(404), Some(ApiErrorKind::NotFound));
        assert_eq!(classify_status(429), Some(ApiErrorKind::RateLimited));
        assert_eq!(classify_status(500), Some(ApiErrorKind::ServerError));
        assert_eq!(classify_status(503), Some(ApiErrorKind::ServerError));
        assert_eq!(classify_status(400), Some(ApiErrorKind::Http));
        assert_eq!(classify_status(301), Some(ApiErrorKind::Http));
    }

    #[test]
    fn test_only_not_found_is_terminal() {
        assert!(!ApiErrorKind::NotFound.is_retryable());
        for kind in [
            ApiErrorKind::ServerError,
            ApiErrorKind::RateLimited,
            ApiErrorKind::Http,
            ApiErrorKind::Network,
            ApiErrorKind::Data,
        ] {
            assert!(kind.is_retryable(), "{kind:?} should be retryable");
        }
    }

    #[test]
    fn test_not_found_copy_is_distinct() {
        let nf = ApiError::from_status(404, "Profile request failed");
        let se = ApiError::from_status(503, "Profile request failed");
        assert!(nf.is_not_found());
        assert_eq!(nf.status, Some(404));
        assert_ne!(nf.short_label(), se.short_label());
        assert_ne!(nf.card_message(), se.card_message());
        assert_eq!(se.kind, ApiErrorKind::ServerError);
    }

    #[test]
    fn test_profile_url_encodes_identifier() {
        let client = ApiClient::new(
            "https://profiles.example.com/".to_string(),
            DEFAULT_LINK_API_URL.to_string(),
        );
        assert_eq!(
            client.profile_url(" a b "),
            "https://profiles.example.com/profile/a%20b"
        );
    }

    #[test]
    fn test_absolutize_only_rewrites_paths() {
        assert_eq!(
            absolutize("/api/link", Some("http://localhost:3000/")),
            "http://localhost:3000/api/link"
        );
        assert_eq!(
            absolutize("https://a.example.com/link", Some("http://localhost:3000")),
            "https://a.example.com/link"
        );
        assert_eq!(absolutize("/api/link", None), "/api/link");
    }

    #[test]
    fn test_unwrap_profile_envelope() {
        let ok: ProfileEnvelope =
            serde_json::from_str(r#"{"success": true, "data": {"name": "alice"}}"#)
                .expect("envelope should parse");
        let profile = ApiClient::unwrap_profile_envelope(ok).expect("should unwrap");
        assert_eq!(profile.display_name(), "alice");

        let failed: ProfileEnvelope =
            serde_json::from_str(r#"{"success": false}"#).expect("envelope should parse");
        let err = ApiClient::unwrap_profile_envelope(failed).expect_err("should fail");
        assert_eq!(err.kind, ApiErrorKind::Data);

        let empty: ProfileEnvelope =
            serde_json::from_str(r#"{"success": true}"#).expect("envelope should parse");
        let err = ApiClient::unwrap_profile_envelope(empty).expect_err("should fail");
        assert_eq!(err.kind, ApiErrorKind::Data);
    }

    #[test]
    fn test_link_response_contract_deserialize() {
        let parsed: LinkResponse =
            serde_json::from_str(r#"{"success": false, "error": "boom", "link": ""}"#)
                .expect("link response should parse");
        assert!(!parsed.success);
        assert!(parsed.link.is_empty());

        let parsed: LinkResponse = serde_json::from_str(r#"{"success": true, "link": "x"}"#)
            .expect("link response should parse");
        assert_eq!(parsed.link, "x");
    }

    #[test]
    fn test_publish_link_request_serialization() {
        let v = serde_json::to_value(PublishLinkRequest {
            link: "https://bonjour.bio/alice".to_string(),
        })
        .expect("should serialize");
        assert_eq!(v["link"], "https://bonjour.bio/alice");
    }

    #[test]
    fn test_shorts_url_encodes_wx_link() {
        let api = ApiClient::new("https://p.example".into(), "https://l.example".into()).with_nfc(
            NfcConfig {
                shorts_url: "https://db.example/admin/database/".into(),
                ..NfcConfig::default()
            },
        );
        assert_eq!(
            api.shorts_url(" https://wx.example/s?id=1 "),
            "https://db.example/admin/database/shorts?wx_link=https%3A%2F%2Fwx.example%2Fs%3Fid%3D1"
        );
    }

    #[test]
    fn test_shorts_response_contract_deserialize() {
        let body: ShortsResponse = serde_json::from_str(
            r#"{"success":true,"data":[{"profile_link":"https://bonjour.bio/alice","wx_link":"w"},{"profile_link":"https://bonjour.bio/bob"}]}"#,
        )
        .expect("decodes");
        assert_eq!(
            body.first_profile_link().as_deref(),
            Some("https://bonjour.bio/alice")
        );

        let empty: ShortsResponse =
            serde_json::from_str(r#"{"success":true,"data":[]}"#).expect("decodes");
        assert_eq!(empty.first_profile_link(), None);

        let refused: ShortsResponse = serde_json::from_str(
            r#"{"success":false,"data":[{"profile_link":"https://bonjour.bio/alice"}]}"#,
        )
        .expect("decodes");
        assert_eq!(refused.first_profile_link(), None);

        let blank: ShortsResponse =
            serde_json::from_str(r#"{"success":true,"data":[{"profile_link":"  "}]}"#)
                .expect("decodes");
        assert_eq!(blank.first_profile_link(), None);
    }

    #[test]
    fn test_flag_enabled() {
        assert!(flag_enabled("true"));
        assert!(flag_enabled("1"));
        assert!(!flag_enabled("false"));
        assert!(!flag_enabled(" OFF "));
        assert!(!flag_enabled("0"));
    }
}
