//! Foreign-content filter.
//!
//! A pure predicate that drops out-of-region entries before any fetch or
//! oracle call happens. An entry is excluded when a configured keyword
//! shows up as a path segment of its link, or as a substring of its title
//! or of any feed tag. Matching is case-insensitive and order-independent.

/// Keywords that mark an entry as out-of-region.
const DEFAULT_KEYWORDS: &[&str] = &[
    "world",
    "global",
    "international",
    "overseas",
    "foreign",
    "국제",
    "해외",
    "english",
];

#[derive(Debug, Clone)]
pub struct ForeignFilter {
    keywords: Vec<String>,
}

impl Default for ForeignFilter {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect())
    }
}

impl ForeignFilter {
    pub fn new(keywords: Vec<String>) -> Self {
        Self {
            keywords: keywords.into_iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    /// Returns `true` when the entry should be excluded from harvesting.
    ///
    /// Link matching looks for the keyword as a path segment (`/kw/` or
    /// `/kw.`); title and tag matching is plain substring containment.
    pub fn is_foreign(&self, link: &str, title: &str, tags: &[String]) -> bool {
        let link = link.to_lowercase();
        let title = title.to_lowercase();

        for keyword in &self.keywords {
            if link.contains(&format!("/{keyword}/")) || link.contains(&format!("/{keyword}.")) {
                return true;
            }
            if title.contains(keyword.as_str()) {
                return true;
            }
        }

        tags.iter().any(|tag| {
            let tag = tag.to_lowercase();
            self.keywords.iter().any(|keyword| tag.contains(keyword.as_str()))
        })
    }
}
