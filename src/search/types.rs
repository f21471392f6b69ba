//! Search response models.
//!
//! Wire shapes for the catalog search endpoint:
//! `{ pageInfo: { totalResults }, items: [...] }`.

use serde::Deserialize;

/// Paging information for a search response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Total number of results the catalog reports for the query.
    #[serde(default)]
    pub total_results: u64,
    /// Number of results carried in this page.
    #[serde(default)]
    pub results_per_page: u64,
}

/// Identifier block of a search item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemId {
    /// Item kind (e.g. "youtube#video").
    #[serde(default)]
    pub kind: String,
    /// Video identifier, absent for non-video items.
    #[serde(default)]
    pub video_id: Option<String>,
}

/// One thumbnail variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Thumbnail {
    /// Image URL.
    #[serde(default)]
    pub url: String,
}

/// Thumbnail variants of a search item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Thumbnails {
    /// Default-size thumbnail.
    #[serde(default)]
    pub default: Thumbnail,
}

/// Descriptive block of a search item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    /// Item title.
    #[serde(default)]
    pub title: String,
    /// Publishing channel name.
    #[serde(default)]
    pub channel_title: String,
    /// Thumbnail images.
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

/// One item of a search result page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchItem {
    /// Identifier block.
    #[serde(default)]
    pub id: ItemId,
    /// Descriptive block.
    #[serde(default)]
    pub snippet: Snippet,
}

impl SearchItem {
    /// Returns the display title for the results list.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.snippet.title
    }

    /// Returns the channel name for the results list.
    #[must_use]
    pub fn channel(&self) -> &str {
        &self.snippet.channel_title
    }

    /// Returns the default thumbnail URL, empty when the item carries none.
    #[must_use]
    pub fn thumbnail_url(&self) -> &str {
        &self.snippet.thumbnails.default.url
    }
}

/// A full search response page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// Paging information.
    #[serde(default)]
    pub page_info: PageInfo,
    /// Result items, in catalog order.
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

impl SearchResponse {
    /// Returns true if the catalog reported zero results.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.page_info.total_results == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "pageInfo": { "totalResults": 2, "resultsPerPage": 2 },
        "items": [
            {
                "id": { "kind": "youtube#video", "videoId": "abc123" },
                "snippet": {
                    "title": "Track A",
                    "channelTitle": "Channel A",
                    "thumbnails": { "default": { "url": "https://img.example/a.jpg" } }
                }
            },
            {
                "id": { "kind": "youtube#video", "videoId": "def456" },
                "snippet": { "title": "Track B", "channelTitle": "Channel B" }
            }
        ]
    }"#;

    #[test]
    fn test_parse_response() {
        let response: SearchResponse = serde_json::from_str(SAMPLE).expect("parse");

        assert_eq!(response.page_info.total_results, 2);
        assert_eq!(response.items.len(), 2);
        assert_eq!(response.items[0].title(), "Track A");
        assert_eq!(response.items[1].channel(), "Channel B");
        assert_eq!(response.items[0].id.video_id.as_deref(), Some("abc123"));
        assert_eq!(response.items[0].thumbnail_url(), "https://img.example/a.jpg");
        assert_eq!(response.items[1].thumbnail_url(), "");
        assert!(!response.is_empty());
    }

    #[test]
    fn test_items_keep_wire_order() {
        let response: SearchResponse = serde_json::from_str(SAMPLE).expect("parse");
        let titles: Vec<&str> = response.items.iter().map(SearchItem::title).collect();
        assert_eq!(titles, ["Track A", "Track B"]);
    }

    #[test]
    fn test_parse_empty_response() {
        let response: SearchResponse =
            serde_json::from_str(r#"{ "pageInfo": { "totalResults": 0 }, "items": [] }"#)
                .expect("parse");

        assert!(response.is_empty());
        assert!(response.items.is_empty());
    }

    #[test]
    fn test_missing_fields_default() {
        let response: SearchResponse = serde_json::from_str("{}").expect("parse");
        assert!(response.is_empty());

        let item: SearchItem =
            serde_json::from_str(r#"{ "snippet": { "title": "T" } }"#).expect("parse");
        assert_eq!(item.title(), "T");
        assert!(item.id.video_id.is_none());
    }
}
