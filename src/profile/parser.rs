//! Profile page extraction
//!
//! Reads the fixed CSS classes of a rendered profile page into a
//! [`UserProfile`]. Every field is best-effort: a missing element yields
//! `None`, an empty list, or `"0"` for counters.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static FOLLOWER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"กำลังติดตาม(\d+)").expect("valid regex"));

static FOLLOWING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ติดตาม(\d+)").expect("valid regex"));

static TOPIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/topic/(\d+)").expect("valid regex"));

/// Marker in a post's status `title` that identifies the comment counter
const COMMENT_MARKER: &str = "ความคิดเห็น";

/// Flat record of one user's profile page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub user_name: Option<String>,
    pub user_avatar: Option<String>,
    pub user_desc: Option<String>,
    pub user_bio: Vec<String>,
    pub follower: String,
    pub following: String,
    /// Posts in the profile feed keyed by topic id
    pub profile_feed: BTreeMap<String, FeedPost>,
}

/// One post of a profile feed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeedPost {
    pub title: Option<String>,
    pub url: Option<String>,
    pub owner: Option<String>,
    pub timestamp: Option<String>,
    pub comment_count: String,
    pub tag: Option<String>,
    pub tag_url: Option<String>,
}

/// Parses a profile page
///
/// # Example
///
/// ```
/// use pantip_harvest::profile::parse_profile;
///
/// let html = r#"<div class="b-block-title"><h3>somchai</h3></div>"#;
/// let profile = parse_profile(html);
/// assert_eq!(profile.user_name.as_deref(), Some("somchai"));
/// assert_eq!(profile.follower, "0");
/// ```
pub fn parse_profile(html: &str) -> UserProfile {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let user_name = select_first(root, "div.b-block-title")
        .and_then(|block| select_first(block, "h3"))
        .map(stripped_text);

    let user_avatar = select_first(root, "div.b-block-content")
        .and_then(|_| select_first(root, "div.big_avatar"))
        .and_then(|avatar| select_first(avatar, "img"))
        .and_then(|img| img.value().attr("src"))
        .map(str::to_string);

    let user_desc = select_first(root, "div.profile-desc").map(stripped_text);

    let user_bio: Vec<String> = select_first(root, "div.profile-bio.small-txt-fixed")
        .map(|bio| select_all(bio, "span").map(stripped_text).collect())
        .unwrap_or_default();

    let stats = select_first(root, "div.profile-stat")
        .map(stripped_text)
        .unwrap_or_default();

    UserProfile {
        user_name,
        user_avatar,
        user_desc,
        user_bio,
        follower: first_capture(&FOLLOWER_RE, &stats).unwrap_or_else(|| "0".to_string()),
        following: first_capture(&FOLLOWING_RE, &stats).unwrap_or_else(|| "0".to_string()),
        profile_feed: extract_feed(root),
    }
}

fn extract_feed(root: ElementRef<'_>) -> BTreeMap<String, FeedPost> {
    let mut feed = BTreeMap::new();

    let Some(wrapper) = select_first(root, "div.post-list-wrapper") else {
        return feed;
    };

    for post in select_all(wrapper, "div.post-item") {
        let Some(title_div) = select_first(post, "div.post-item-title") else {
            continue;
        };

        let link = select_first(title_div, "a");
        let url = link
            .and_then(|a| a.value().attr("href"))
            .map(str::to_string);
        let Some(topic_id) = url.as_deref().and_then(|u| first_capture(&TOPIC_RE, u)) else {
            continue;
        };

        let owner_tag = select_first(post, "div.post-item-by");
        let owner = owner_tag
            .and_then(|by| select_first(by, "span.by-name"))
            .map(stripped_text);
        let timestamp = owner_tag
            .filter(|by| select_first(*by, "span.timestamp").is_some())
            .and_then(|by| select_first(by, "abbr.timeago"))
            .and_then(|abbr| abbr.value().attr("data-utime"))
            .map(str::to_string);

        let comment_count = select_first(post, "div.post-item-status-i")
            .filter(|status| {
                status
                    .value()
                    .attr("title")
                    .is_some_and(|t| t.contains(COMMENT_MARKER))
            })
            .map(stripped_text)
            .unwrap_or_else(|| "0".to_string());

        let tag_link = select_first(post, "div.post-item-footer")
            .and_then(|footer| select_first(footer, "div.post-item-taglist"))
            .and_then(|list| select_first(list, "a.tag-title"));

        feed.insert(
            topic_id,
            FeedPost {
                title: link.map(stripped_text),
                url,
                owner,
                timestamp,
                comment_count,
                tag: tag_link
                    .and_then(|a| a.value().attr("data-tag"))
                    .map(str::to_string),
                tag_url: tag_link
                    .and_then(|a| a.value().attr("href"))
                    .map(str::to_string),
            },
        );
    }

    feed
}

fn select_first<'a>(scope: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    let found = scope.select(&selector).next();
    found
}

fn select_all<'a>(scope: ElementRef<'a>, css: &str) -> std::vec::IntoIter<ElementRef<'a>> {
    let Ok(selector) = Selector::parse(css) else {
        return Vec::new().into_iter();
    };
    let found: Vec<ElementRef<'a>> = scope.select(&selector).collect();
    found.into_iter()
}

/// Text of an element with each fragment trimmed and joined without separator
fn stripped_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
