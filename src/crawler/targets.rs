//! Target page generation
//!
//! Turns a location and a set of search engines into the list of search
//! result URLs the crawler visits. Every engine gets the same set of query
//! templates; LinkedIn mode adds job-search URLs on top.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use url::form_urlencoded;

/// Errors raised while building the target list
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetError {
    #[error("location cannot be empty")]
    EmptyLocation,

    #[error("no valid search engines specified")]
    NoEngines,
}

/// Search engines the crawler knows how to query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchEngine {
    Google,
    Bing,
    DuckDuckGo,
}

impl SearchEngine {
    /// All supported engines, in the order `all` expands to
    pub fn all() -> [Self; 3] {
        [Self::Google, Self::Bing, Self::DuckDuckGo]
    }

    /// Builds the search URL for an already-encoded query
    fn search_url(&self, encoded_query: &str) -> String {
        match self {
            Self::Google => format!("https://www.google.com/search?q={}&num=100", encoded_query),
            Self::Bing => format!("https://www.bing.com/search?q={}&count=100", encoded_query),
            Self::DuckDuckGo => format!("https://duckduckgo.com/?q={}", encoded_query),
        }
    }
}

impl FromStr for SearchEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "bing" => Ok(Self::Bing),
            "duckduckgo" => Ok(Self::DuckDuckGo),
            other => Err(format!("unknown search engine '{}'", other)),
        }
    }
}

impl fmt::Display for SearchEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Google => "google",
            Self::Bing => "bing",
            Self::DuckDuckGo => "duckduckgo",
        };
        f.write_str(name)
    }
}

/// Parses a comma-separated engine list, or `all`
///
/// Unknown names are skipped with a warning.
pub fn parse_engines(engines: &str) -> Vec<SearchEngine> {
    if engines.trim().eq_ignore_ascii_case("all") {
        return SearchEngine::all().to_vec();
    }

    let mut parsed = Vec::new();
    for name in engines.split(',').filter(|n| !n.trim().is_empty()) {
        match name.parse::<SearchEngine>() {
            Ok(engine) if !parsed.contains(&engine) => parsed.push(engine),
            Ok(_) => {}
            Err(e) => tracing::warn!("Skipping {}", e),
        }
    }
    parsed
}

/// Search queries sent to every engine for a location
fn search_queries(location: &str) -> [String; 6] {
    [
        format!("email careers {}", location),
        format!("contact us jobs {}", location),
        format!("careers@company {}", location),
        format!("hr@company {}", location),
        format!("recruitment {} email", location),
        format!("apply jobs {} contact", location),
    ]
}

/// Job-search keywords used in LinkedIn mode
fn linkedin_queries(location: &str) -> [String; 3] {
    [
        format!("jobs {}", location),
        format!("careers {}", location),
        format!("hiring {}", location),
    ]
}

fn encode(query: &str) -> String {
    form_urlencoded::byte_serialize(query.as_bytes()).collect()
}

/// Builds the list of pages to crawl
///
/// # Arguments
///
/// * `engines` - Comma-separated engine names (`google,bing,duckduckgo`) or `all`
/// * `linkedin` - Also include LinkedIn job-search pages
/// * `location` - City or country to search for
///
/// # Example
///
/// ```
/// use careerfind::crawler::identify_target_pages;
///
/// let pages = identify_target_pages("bing", false, "Berlin").unwrap();
/// assert_eq!(pages.len(), 6);
/// assert!(pages[0].starts_with("https://www.bing.com/search?q=email+careers+Berlin"));
/// ```
pub fn identify_target_pages(
    engines: &str,
    linkedin: bool,
    location: &str,
) -> Result<Vec<String>, TargetError> {
    let location = location.trim();
    if location.is_empty() {
        return Err(TargetError::EmptyLocation);
    }

    let mut pages = Vec::new();
    for engine in parse_engines(engines) {
        for query in search_queries(location) {
            pages.push(engine.search_url(&encode(&query)));
        }
    }

    if linkedin {
        for query in linkedin_queries(location) {
            pages.push(format!(
                "https://www.linkedin.com/jobs/search?keywords={}",
                encode(&query)
            ));
        }
    }

    if pages.is_empty() {
        return Err(TargetError::NoEngines);
    }

    tracing::debug!("Generated {} search URLs", pages.len());
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_location_rejected() {
        assert_eq!(
            identify_target_pages("all", false, "   "),
            Err(TargetError::EmptyLocation)
        );
    }

    #[test]
    fn test_all_engines() {
        let pages = identify_target_pages("all", false, "Lisbon").unwrap();
        assert_eq!(pages.len(), 18);
        assert!(pages.iter().any(|p| p.starts_with("https://www.google.com/search?q=")));
        assert!(pages.iter().any(|p| p.starts_with("https://www.bing.com/search?q=")));
        assert!(pages.iter().any(|p| p.starts_with("https://duckduckgo.com/?q=")));
    }

    #[test]
    fn test_queries_are_encoded() {
        let pages = identify_target_pages("google", false, "New York").unwrap();
        assert_eq!(
            pages[0],
            "https://www.google.com/search?q=email+careers+New+York&num=100"
        );
        assert_eq!(
            pages[2],
            "https://www.google.com/search?q=careers%40company+New+York&num=100"
        );
    }

    #[test]
    fn test_unknown_engines_skipped() {
        let pages = identify_target_pages("yahoo, Bing", false, "Oslo").unwrap();
        assert_eq!(pages.len(), 6);
        assert!(pages.iter().all(|p| p.contains("bing.com")));
    }

    #[test]
    fn test_no_valid_engines() {
        assert_eq!(
            identify_target_pages("yahoo,altavista", false, "Oslo"),
            Err(TargetError::NoEngines)
        );
    }

    #[test]
    fn test_linkedin_mode_alone() {
        let pages = identify_target_pages("none", true, "Paris").unwrap();
        assert_eq!(
            pages,
            vec![
                "https://www.linkedin.com/jobs/search?keywords=jobs+Paris".to_string(),
                "https://www.linkedin.com/jobs/search?keywords=careers+Paris".to_string(),
                "https://www.linkedin.com/jobs/search?keywords=hiring+Paris".to_string(),
            ]
        );
    }

    #[test]
    fn test_parse_engines_dedups() {
        assert_eq!(
            parse_engines("google,GOOGLE,bing"),
            vec![SearchEngine::Google, SearchEngine::Bing]
        );
        assert_eq!(parse_engines("ALL").len(), 3);
    }
}
