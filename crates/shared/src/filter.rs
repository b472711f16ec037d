//! Canonical listing filter state and its query-string form.

use std::{fmt, num::NonZeroU32, str::FromStr};

use serde::{Deserialize, Serialize};
use url::{form_urlencoded, Url};

/// 1-based page number. Anything that is not a positive integer normalizes to page 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageNumber(NonZeroU32);

impl PageNumber {
    pub const FIRST: PageNumber = PageNumber(NonZeroU32::MIN);

    pub fn new(page: u32) -> Option<Self> {
        NonZeroU32::new(page).map(Self)
    }

    /// Lenient parse used for navigation-supplied tokens.
    pub fn normalize(token: Option<&str>) -> Self {
        token
            .and_then(|raw| raw.trim().parse::<PageNumber>().ok())
            .unwrap_or(Self::FIRST)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PageNumber {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<NonZeroU32>().map(Self)
    }
}

impl Serialize for PageNumber {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PageNumber {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => u32::try_from(n)
                .ok()
                .and_then(PageNumber::new)
                .unwrap_or(PageNumber::FIRST),
            Raw::Text(text) => PageNumber::normalize(Some(&text)),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    Search,
    Role,
    Company,
    Page,
}

impl FilterField {
    pub const ALL: [FilterField; 4] = [
        FilterField::Search,
        FilterField::Role,
        FilterField::Company,
        FilterField::Page,
    ];

    pub fn query_key(self) -> &'static str {
        match self {
            FilterField::Search => "search",
            FilterField::Role => "role",
            FilterField::Company => "company_id",
            FilterField::Page => "page",
        }
    }

    pub fn from_query_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.query_key() == key)
    }
}

/// Query parameters of a listing view. Also used for the controller's local draft copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub company_id: String,
    #[serde(default)]
    pub page: PageNumber,
}

impl FilterState {
    pub fn get(&self, field: FilterField) -> String {
        match field {
            FilterField::Search => self.search.clone(),
            FilterField::Role => self.role.clone(),
            FilterField::Company => self.company_id.clone(),
            FilterField::Page => self.page.to_string(),
        }
    }

    pub fn with_page(&self, page: PageNumber) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    pub fn first_page(&self) -> Self {
        self.with_page(PageNumber::FIRST)
    }

    /// Same filters, ignoring the page position.
    pub fn same_filters(&self, other: &FilterState) -> bool {
        self.search == other.search
            && self.role == other.role
            && self.company_id == other.company_id
    }

    pub fn to_query(&self) -> FilterQuery {
        let mut pairs = Vec::with_capacity(4);
        for (field, value) in [
            (FilterField::Search, &self.search),
            (FilterField::Role, &self.role),
            (FilterField::Company, &self.company_id),
        ] {
            if !value.is_empty() {
                pairs.push((field.query_key(), value.clone()));
            }
        }
        pairs.push((FilterField::Page.query_key(), self.page.to_string()));
        FilterQuery { pairs }
    }

    pub fn from_query<K, V, I>(pairs: I) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut state = FilterState::default();
        for (key, value) in pairs {
            let value = value.as_ref();
            match FilterField::from_query_key(key.as_ref()) {
                Some(FilterField::Search) => state.search = value.to_string(),
                Some(FilterField::Role) => state.role = value.to_string(),
                Some(FilterField::Company) => state.company_id = value.to_string(),
                Some(FilterField::Page) => state.page = PageNumber::normalize(Some(value)),
                None => {}
            }
        }
        state
    }

    pub fn from_url(location: &Url) -> Self {
        Self::from_query(location.query_pairs())
    }
}

/// Ordered, empty-free query representation of a [`FilterState`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct FilterQuery {
    pairs: Vec<(&'static str, String)>,
}

impl FilterQuery {
    pub fn pairs(&self) -> &[(&'static str, String)] {
        &self.pairs
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.pairs.iter().map(|(k, _)| *k)
    }

    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter().map(|(k, v)| (*k, v.as_str())))
            .finish()
    }

    /// Replaces the query of `base` with this query.
    pub fn apply_to(&self, base: &Url) -> Url {
        let mut url = base.clone();
        url.set_query(Some(&self.to_query_string()));
        url
    }
}

impl fmt::Display for FilterQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

#[cfg(test)]
#[path = "tests/filter_tests.rs"]
mod tests;
