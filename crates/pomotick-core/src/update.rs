//! Release feed check.
//!
//! Asks a GitHub-style "latest release" endpoint for its tag and compares
//! it against the running version. Downloading and installing are left to
//! the platform's package manager.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use crate::error::UpdateError;
use crate::events::Event;

const USER_AGENT: &str = "pomotick";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Delay between startup and the first update check.
pub const STARTUP_CHECK_DELAY: Duration = Duration::from_secs(2);

/// `major.minor.patch`. Pre-release and build suffixes are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl FromStr for Version {
    type Err = UpdateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || UpdateError::BadVersion(s.to_string());
        let core = s
            .trim()
            .trim_start_matches(['v', 'V'])
            .split(['-', '+'])
            .next()
            .unwrap_or_default();
        if core.is_empty() {
            return Err(bad());
        }

        let mut parts = [0u64; 3];
        for (i, piece) in core.split('.').enumerate() {
            let slot = parts.get_mut(i).ok_or_else(bad)?;
            *slot = piece.parse().map_err(|_| bad())?;
        }
        Ok(Self {
            major: parts[0],
            minor: parts[1],
            patch: parts[2],
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[derive(Debug, Deserialize)]
struct LatestRelease {
    tag_name: String,
    #[serde(default)]
    html_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UpdateStatus {
    UpToDate {
        current: Version,
    },
    Available {
        current: Version,
        latest: Version,
        url: String,
    },
}

impl UpdateStatus {
    /// `Some(Event::UpdateAvailable)` when there is something to show.
    pub fn to_event(&self) -> Option<Event> {
        match self {
            UpdateStatus::UpToDate { .. } => None,
            UpdateStatus::Available {
                current,
                latest,
                url,
            } => Some(Event::UpdateAvailable {
                current: current.to_string(),
                latest: latest.to_string(),
                url: url.clone(),
                at: Utc::now(),
            }),
        }
    }
}

pub struct UpdateChecker {
    client: reqwest::Client,
    feed: Url,
    current: Version,
}

impl UpdateChecker {
    /// # Errors
    ///
    /// Fails on a malformed feed URL or version string, or if the HTTP
    /// client cannot be built.
    pub fn new(feed_url: &str, current: &str) -> Result<Self, UpdateError> {
        let feed = Url::parse(feed_url).map_err(|source| UpdateError::InvalidFeedUrl {
            url: feed_url.to_string(),
            source,
        })?;
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            feed,
            current: current.parse()?,
        })
    }

    /// Fetch the feed and compare.
    ///
    /// # Errors
    ///
    /// Transport failures, non-2xx responses, and tags that are not
    /// versions.
    pub async fn check(&self) -> Result<UpdateStatus, UpdateError> {
        let resp = self
            .client
            .get(self.feed.clone())
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(UpdateError::Status(resp.status().as_u16()));
        }

        let release: LatestRelease = resp.json().await?;
        let latest: Version = release.tag_name.parse()?;
        tracing::info!(current = %self.current, %latest, "release feed checked");

        if latest > self.current {
            Ok(UpdateStatus::Available {
                current: self.current,
                latest,
                url: release.html_url,
            })
        } else {
            Ok(UpdateStatus::UpToDate {
                current: self.current,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test]
    fn parses_tags() {
        assert_eq!(
            v("v1.0.8"),
            Version {
                major: 1,
                minor: 0,
                patch: 8
            }
        );
        assert_eq!(v("2.1"), v("2.1.0"));
        assert_eq!(v("V3"), v("3.0.0"));
        assert_eq!(v("1.2.3-beta.1"), v("1.2.3"));
        assert_eq!(v("1.2.3+build7"), v("1.2.3"));
    }

    #[test]
    fn rejects_non_versions() {
        for bad in ["", "v", "latest", "1.2.3.4", "1..2", "1.x"] {
            assert!(bad.parse::<Version>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn orders_numerically() {
        assert!(v("1.10.0") > v("1.9.9"));
        assert!(v("2.0.0") > v("1.99.99"));
        assert_eq!(v("1.0.0").to_string(), "1.0.0");
    }

    #[test]
    fn checker_rejects_bad_feed_url() {
        assert!(matches!(
            UpdateChecker::new("not a url", "1.0.0"),
            Err(UpdateError::InvalidFeedUrl { .. })
        ));
    }

    #[test]
    fn up_to_date_has_no_event() {
        let status = UpdateStatus::UpToDate { current: v("1.0.0") };
        assert!(status.to_event().is_none());
    }
}
