//! The closed set of court websites the retrieval adapter knows how to query.

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::types::{LookupError, LookupResult};

/// District used when `district` is named without one.
pub const DEFAULT_DISTRICT: &str = "faridabad";

const HIGH_COURT_BASE: &str = "https://delhihighcourt.nic.in/";
const DISTRICT_COURT_ROOT: &str = "https://districts.ecourts.gov.in/";
const SEARCH_PATH: &str = "case_status";

/// A court source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum CourtSource {
    /// Delhi High Court.
    #[default]
    HighCourt,
    /// An eCourts district court site.
    DistrictCourt { district: String },
}

/// Source family, used to pick an extraction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    HighCourt,
    DistrictCourt,
}

impl CourtSource {
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::HighCourt => SourceKind::HighCourt,
            Self::DistrictCourt { .. } => SourceKind::DistrictCourt,
        }
    }

    /// A district court source, normalizing the district slug.
    pub fn district(name: &str) -> LookupResult<Self> {
        let slug = name.trim().to_ascii_lowercase();
        if slug.is_empty()
            || !slug
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(LookupError::UnsupportedSource(format!("district:{name}")));
        }
        Ok(Self::DistrictCourt { district: slug })
    }
}

impl FromStr for CourtSource {
    type Err = LookupError;

    /// Accepts `delhi_high`, `high_court`, `district`, and `district:<name>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        match name.as_str() {
            "delhi_high" | "high_court" => Ok(Self::HighCourt),
            "district" => Self::district(DEFAULT_DISTRICT),
            other => match other.strip_prefix("district:") {
                Some(district) => Self::district(district),
                None => Err(LookupError::UnsupportedSource(s.to_string())),
            },
        }
    }
}

impl fmt::Display for CourtSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HighCourt => write!(f, "delhi_high"),
            Self::DistrictCourt { district } => write!(f, "district:{district}"),
        }
    }
}

/// Base addresses for each source kind.
///
/// Production values come from `Default`; tests point these at a local mock server.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub high_court: Url,
    /// District sites live under `<district_root>/<district>/`.
    pub district_root: Url,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            high_court: Url::parse(HIGH_COURT_BASE).expect("static high court URL"),
            district_root: Url::parse(DISTRICT_COURT_ROOT).expect("static district root URL"),
        }
    }
}

impl Endpoints {
    /// Point both source kinds at one origin, e.g. a mock server.
    pub fn single_origin(origin: &str) -> LookupResult<Self> {
        let base = with_trailing_slash(origin)?;
        Ok(Self {
            high_court: base.clone(),
            district_root: base,
        })
    }

    /// Base address used to resolve relative links found on the source's pages.
    pub fn base_url(&self, source: &CourtSource) -> LookupResult<Url> {
        match source {
            CourtSource::HighCourt => Ok(self.high_court.clone()),
            CourtSource::DistrictCourt { district } => self
                .district_root
                .join(&format!("{district}/"))
                .map_err(|e| LookupError::UnsupportedSource(format!("{source}: {e}"))),
        }
    }

    /// The search form endpoint for a source.
    pub fn search_url(&self, source: &CourtSource) -> LookupResult<Url> {
        self.base_url(source)?
            .join(SEARCH_PATH)
            .map_err(|e| LookupError::UnsupportedSource(format!("{source}: {e}")))
    }
}

fn with_trailing_slash(raw: &str) -> LookupResult<Url> {
    let mut s = raw.trim().to_string();
    if !s.ends_with('/') {
        s.push('/');
    }
    Url::parse(&s).map_err(|e| LookupError::InvalidInput(format!("bad base URL '{raw}': {e}")))
}
