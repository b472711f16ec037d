//! Listing endpoint payloads and their validated in-memory form.

use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

use crate::{
    error::ProtocolError,
    filter::{FilterField, FilterState, PageNumber},
};

/// Relative link urls are resolved against this base only to read their query.
const LINK_BASE: &str = "http://listing.invalid/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationLink {
    pub label: String,
    /// `None` marks a disabled control.
    pub target_page: Option<PageNumber>,
    pub is_active: bool,
}

impl PaginationLink {
    pub fn page(label: impl Into<String>, target: PageNumber, is_active: bool) -> Self {
        Self {
            label: label.into(),
            target_page: Some(target),
            is_active,
        }
    }

    pub fn disabled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target_page: None,
            is_active: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.target_page.is_some()
    }

    pub fn display_label(&self) -> &str {
        display_label(&self.label)
    }
}

/// Maps previous/next style markers to "Previous"/"Next"; everything else passes through.
///
/// Markers are whole words (`prev`, `previous`, `next`) or the guillemet arrows, so
/// a label like "Preview" is left as it is.
pub fn display_label(raw: &str) -> &str {
    let lower = raw.to_ascii_lowercase();
    let has_word = |words: &[&str]| {
        lower
            .split(|c: char| !c.is_ascii_alphanumeric())
            .any(|token| words.contains(&token))
    };

    if has_word(&["prev", "previous", "laquo"]) || raw.contains('«') || raw.contains('‹') {
        "Previous"
    } else if has_word(&["next", "raquo"]) || raw.contains('»') || raw.contains('›') {
        "Next"
    } else {
        raw
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub current_page: u32,
    pub last_page: u32,
    pub per_page: u32,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingPage<T> {
    pub items: Vec<T>,
    pub pagination_links: Vec<PaginationLink>,
    pub meta: Option<PageMeta>,
}

impl<T> ListingPage<T> {
    pub fn new(items: Vec<T>, pagination_links: Vec<PaginationLink>) -> Self {
        Self {
            items,
            pagination_links,
            meta: None,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    pub fn link_labelled(&self, display: &str) -> Option<&PaginationLink> {
        self.pagination_links
            .iter()
            .find(|link| link.display_label() == display)
    }

    /// The numbered control for `page`, skipping previous/next controls.
    pub fn link_to(&self, page: PageNumber) -> Option<&PaginationLink> {
        self.pagination_links.iter().find(|link| {
            link.target_page == Some(page) && link.label.trim().parse::<u32>() == Ok(page.get())
        })
    }
}

/// Validated listing response: the page plus the filters the server applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingResponse<T> {
    pub page: ListingPage<T>,
    pub filters: Option<FilterState>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireLink {
    #[serde(default)]
    pub url: Option<String>,
    pub label: String,
    #[serde(default)]
    pub active: bool,
}

impl WireLink {
    pub fn into_link(self) -> Result<PaginationLink, ProtocolError> {
        let target_page = match self.url.as_deref() {
            None => None,
            Some(raw) => Some(target_page_from_url(raw)?),
        };
        Ok(PaginationLink {
            label: self.label,
            target_page,
            is_active: self.active,
        })
    }
}

fn target_page_from_url(raw: &str) -> Result<PageNumber, ProtocolError> {
    let base = Url::parse(LINK_BASE).map_err(|err| ProtocolError::InvalidLinkUrl {
        url: raw.to_string(),
        reason: err.to_string(),
    })?;
    let url = base
        .join(raw)
        .map_err(|err| ProtocolError::InvalidLinkUrl {
            url: raw.to_string(),
            reason: err.to_string(),
        })?;

    let page_key = FilterField::Page.query_key();
    let Some((_, page)) = url.query_pairs().filter(|(key, _)| key == page_key).last() else {
        return Ok(PageNumber::FIRST);
    };

    page.trim()
        .parse::<PageNumber>()
        .map_err(|_| ProtocolError::InvalidLinkPage {
            url: raw.to_string(),
            page: page.into_owned(),
        })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireFilters {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub company_id: Option<String>,
}

fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(text) => text,
        Raw::Int(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
    }))
}

/// Paginated listing body as served by the endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingPayload<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub links: Vec<WireLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<WireFilters>,
}

impl<T> ListingPayload<T> {
    pub fn into_response(self) -> Result<ListingResponse<T>, ProtocolError> {
        let pagination_links = self
            .links
            .into_iter()
            .map(WireLink::into_link)
            .collect::<Result<Vec<_>, _>>()?;

        let current_page = self
            .meta
            .and_then(|meta| PageNumber::new(meta.current_page))
            .or_else(|| {
                pagination_links
                    .iter()
                    .find(|link| link.is_active)
                    .and_then(|link| link.target_page)
            })
            .unwrap_or(PageNumber::FIRST);

        let filters = self.filters.map(|filters| FilterState {
            search: filters.search.unwrap_or_default(),
            role: filters.role.unwrap_or_default(),
            company_id: filters.company_id.unwrap_or_default(),
            page: current_page,
        });

        Ok(ListingResponse {
            page: ListingPage {
                items: self.data,
                pagination_links,
                meta: self.meta,
            },
            filters,
        })
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
