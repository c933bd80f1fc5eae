pub(crate) type ItemId = u64;

/// An item as returned by the item API. Fields we never look at are ignored.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub(crate) struct Item {
    pub(crate) id: ItemId,

    #[serde(rename = "type", default)]
    pub(crate) item_type: String,

    #[serde(default)]
    pub(crate) url: String,

    #[serde(default)]
    pub(crate) title: String,

    #[serde(rename = "by", default)]
    pub(crate) author: String,

    pub(crate) score: Option<i64>,
    pub(crate) time: Option<i64>,
    pub(crate) descendants: Option<i64>,
}

impl Item {
    pub(crate) fn is_story_link(&self) -> bool {
        self.item_type == "story" && !self.url.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub(crate) struct Story {
    #[serde(flatten)]
    pub(crate) item: Item,

    // Not part of the API response. Derived from the url.
    pub(crate) host: String,
}

impl Story {
    /// Returns `None` unless the item is a story with a link.
    pub(crate) fn from_item(item: Item) -> Option<Self> {
        if !item.is_story_link() {
            return None;
        }
        let host = host_of(&item.url);
        Some(Self { item, host })
    }
}

/// Hostname of `url` with a leading "www" label removed. Unparseable urls give
/// an empty host.
pub(crate) fn host_of(url: &str) -> String {
    let Ok(parsed) = reqwest::Url::parse(url) else {
        return String::new();
    };
    let Some(host) = parsed.host_str() else {
        return String::new();
    };

    // IPv6 literals come back bracketed.
    let host = host.trim_start_matches('[').trim_end_matches(']');
    let host = host.strip_prefix("www").unwrap_or(host);
    host.strip_prefix('.').unwrap_or(host).to_string()
}
