use serde::{Deserialize, Serialize};

pub(crate) const DEFAULT_AVATAR_URL: &str =
    "https://cdn.bonjour.bio/static/image/defaultAvatar.svg";

pub(crate) const PLACEHOLDER_DESCRIPTION: &str =
    "This is a placeholder description. Please update your profile with a meaningful description.";

/// Profile record returned by the profile service.
///
/// Every field is optional upstream; unknown fields are ignored so the card keeps
/// rendering when the service adds new ones.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub(crate) struct ProfileRecord {
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default, rename = "basicInfo")]
    pub basic_info: Option<BasicInfo>,
    #[serde(default, rename = "canDo")]
    pub can_do: Vec<CanDo>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub creations: Vec<Creation>,
    #[serde(default)]
    pub profile_link: Option<String>,
    #[serde(default)]
    pub user_link: Option<String>,
    #[serde(default)]
    pub create_time: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub(crate) struct BasicInfo {
    #[serde(default)]
    pub current_doing: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub region: Option<Region>,
    #[serde(default)]
    pub gender: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub(crate) struct Region {
    #[serde(default, rename = "countryName")]
    pub country_name: Option<String>,
    #[serde(default, rename = "provinceName")]
    pub province_name: Option<String>,
    #[serde(default, rename = "cityName")]
    pub city_name: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct CanDo {
    #[serde(default, rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub emoji: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Creation {
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl ProfileRecord {
    pub fn avatar_url(&self) -> String {
        non_empty(&self.avatar)
            .unwrap_or(DEFAULT_AVATAR_URL)
            .to_string()
    }

    pub fn display_name(&self) -> String {
        non_empty(&self.name).unwrap_or_default().to_string()
    }

    /// `current_doing@role`, only when both are present.
    pub fn headline(&self) -> Option<String> {
        let info = self.basic_info.as_ref()?;
        let doing = non_empty(&info.current_doing)?;
        let role = non_empty(&info.role)?;
        Some(format!("{doing}@{role}"))
    }

    /// Region parts joined with a full-width comma.
    ///
    /// Hidden as soon as one of the present parts is blank.
    pub fn region_line(&self) -> Option<String> {
        let region = self.basic_info.as_ref()?.region.as_ref()?;
        let present: Vec<&str> = [
            &region.country_name,
            &region.province_name,
            &region.city_name,
        ]
        .into_iter()
        .filter_map(|v| v.as_deref())
        .collect();

        if present.is_empty() || present.iter().any(|v| v.trim().is_empty()) {
            return None;
        }
        Some(present.join("，"))
    }

    pub fn gender(&self) -> Option<String> {
        let info = self.basic_info.as_ref()?;
        non_empty(&info.gender).map(str::to_string)
    }

    pub fn description_or_placeholder(&self) -> String {
        non_empty(&self.description)
            .unwrap_or(PLACEHOLDER_DESCRIPTION)
            .to_string()
    }

    /// Up to `max` short tags for the card's folder column.
    pub fn tags(&self, max: usize) -> Vec<String> {
        self.can_do
            .iter()
            .map(|c| c.name.trim())
            .filter(|n| !n.is_empty())
            .take(max)
            .map(str::to_string)
            .collect()
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Note {
    pub id: String,
    pub text: String,
    pub position: Position,
}

/// Card artwork set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display)]
pub(crate) enum Theme {
    #[default]
    #[strum(to_string = "AGI Playground")]
    AgiPlayground,
    #[strum(to_string = "Modal Scope")]
    ModalScope,
    #[strum(to_string = "Advx 2025")]
    Advx2025,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::AgiPlayground, Theme::ModalScope, Theme::Advx2025];

    /// Stable key used in storage and `<select>` values.
    pub fn key(self) -> &'static str {
        match self {
            // Historical spelling; stored values depend on it.
            Theme::AgiPlayground => "AGIPlaygroud",
            Theme::ModalScope => "ModalScope",
            Theme::Advx2025 => "Advx2025",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.key() == key)
    }

    pub fn banner(self) -> &'static str {
        match self {
            Theme::AgiPlayground => "AGI Playground",
            Theme::ModalScope => "ModelScope",
            Theme::Advx2025 => "/ About Me",
        }
    }

    pub fn accent_class(self) -> &'static str {
        match self {
            Theme::AgiPlayground => "border-black text-black",
            Theme::ModalScope => "border-[#624AFF] text-[#624AFF]",
            Theme::Advx2025 => "border-[#E74F09] text-[#E74F09]",
        }
    }
}
