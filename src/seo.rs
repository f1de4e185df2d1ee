use std::borrow::Cow;

use quick_xml::escape::{resolve_html5_entity, unescape_with};
use serde::Serialize;
use serde_json::{json, Value};
use url::Url;

use crate::policy::Policy;

pub(crate) const DESCRIPTION_LENGTH: usize = 155;

/// Search and social metadata for a rendered page.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Seo {
    pub title: Option<String>,
    pub title_template: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub json_ld: Vec<Value>,
}

/// A single `<meta>` or `<link>` element in the document head.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MetaTag {
    pub kind: &'static str,
    pub key: &'static str,
    pub name: String,
    pub content: String,
}

impl MetaTag {
    fn name(name: &str, content: &str) -> Self {
        Self {
            kind: "meta",
            key: "name",
            name: name.to_string(),
            content: content.to_string(),
        }
    }

    fn property(property: &str, content: &str) -> Self {
        Self {
            kind: "meta",
            key: "property",
            name: property.to_string(),
            content: content.to_string(),
        }
    }

    fn link(rel: &str, href: &str) -> Self {
        Self {
            kind: "link",
            key: "rel",
            name: rel.to_string(),
            content: href.to_string(),
        }
    }
}

/// Everything a template needs to render the document head.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SeoTags {
    pub title: Option<String>,
    pub tags: Vec<MetaTag>,
    pub json_ld: Vec<Value>,
}

impl Seo {
    pub fn site(name: &str, description: &str) -> Self {
        Self {
            title: Some(name.to_string()),
            description: Some(description.to_string()),
            ..Default::default()
        }
    }

    pub fn homepage(url: &str) -> Self {
        Self {
            title: Some("Index".to_string()),
            url: Some(url.to_string()),
            ..Default::default()
        }
    }

    pub fn policy(policy: &Policy, url: &str) -> Self {
        let description = truncate(&strip_tags(&policy.body), DESCRIPTION_LENGTH);
        Self {
            title: Some(policy.title.clone()),
            description: Some(description.clone()).filter(|value| !value.is_empty()),
            url: Some(url.to_string()),
            json_ld: vec![json!({
                "@context": "https://schema.org",
                "@type": "WebPage",
                "name": policy.title,
                "description": description,
                "url": url,
            })],
            ..Default::default()
        }
    }

    pub fn policies(policies: &[Policy], url: &str) -> Self {
        let origin = Url::parse(url)
            .map(|url| url.origin().ascii_serialization())
            .unwrap_or_default();

        let items = policies
            .iter()
            .enumerate()
            .map(|(index, policy)| {
                json!({
                    "@type": "ListItem",
                    "position": index + 1,
                    "item": {
                        "@type": "WebPage",
                        "name": policy.title,
                        "url": format!("{}/policies/{}", origin, urlencoding::encode(&policy.handle)),
                    },
                })
            })
            .collect::<Vec<Value>>();

        let description = "Store policies";

        Self {
            title: Some("Policies".to_string()),
            title_template: Some("%s | Policies".to_string()),
            description: Some(description.to_string()),
            url: Some(url.to_string()),
            json_ld: vec![
                json!({
                    "@context": "https://schema.org",
                    "@type": "BreadcrumbList",
                    "itemListElement": items,
                }),
                json!({
                    "@context": "https://schema.org",
                    "@type": "WebPage",
                    "name": "Policies",
                    "description": description,
                    "url": url,
                }),
            ],
        }
    }

    /// Layers `other` on top of `self`. Fields set in `other` win, JSON-LD
    /// entries accumulate.
    pub fn merge(mut self, other: Seo) -> Self {
        if other.title.is_some() {
            self.title = other.title;
        }
        if other.title_template.is_some() {
            self.title_template = other.title_template;
        }
        if other.description.is_some() {
            self.description = other.description;
        }
        if other.url.is_some() {
            self.url = other.url;
        }
        self.json_ld.extend(other.json_ld);
        self
    }

    pub fn tags(&self) -> SeoTags {
        let title = self.title.as_ref().map(|title| match &self.title_template {
            Some(template) if template.contains("%s") && !template.contains(title.as_str()) => {
                template.replace("%s", title)
            }
            _ => title.clone(),
        });

        let mut tags = Vec::new();

        if let Some(description) = &self.description {
            tags.push(MetaTag::name("description", description));
        }
        if let Some(title) = &title {
            tags.push(MetaTag::property("og:title", title));
            tags.push(MetaTag::name("twitter:title", title));
        }
        if let Some(description) = &self.description {
            tags.push(MetaTag::property("og:description", description));
            tags.push(MetaTag::name("twitter:description", description));
        }
        tags.push(MetaTag::property("og:type", "website"));
        if let Some(url) = &self.url {
            tags.push(MetaTag::property("og:url", url));
            tags.push(MetaTag::link("canonical", url));
        }

        SeoTags {
            title,
            tags,
            json_ld: self.json_ld.clone(),
        }
    }
}

/// Drops markup from an HTML fragment, decodes entities and collapses
/// whitespace.
pub(crate) fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;

    for c in html.chars() {
        match c {
            '<' => {
                in_tag = true;
                text.push(' ');
            }
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }

    // Bodies are HTML, so the remaining text still carries entities.
    let decoded = unescape_with(&text, resolve_html5_entity)
        .map(Cow::into_owned)
        .ok();
    let text = decoded.unwrap_or(text);

    text.split_whitespace().collect::<Vec<&str>>().join(" ")
}

pub(crate) fn truncate(value: &str, length: usize) -> String {
    if value.chars().count() <= length {
        return value.to_string();
    }
    let mut truncated = value
        .chars()
        .take(length.saturating_sub(3))
        .collect::<String>();
    truncated.push_str("...");
    truncated
}
