//! Strava segment store with an on-disk JSON cache.
//!
//! Segments are fetched once from the Strava API and the raw response is
//! kept as `<cache_dir>/<id>.json`. Later loads read the cached file and
//! never go back to the network; nothing here invalidates the cache.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::polyline::Polyline;
use crate::segment::{Segment, SegmentError};
use crate::traits::SegmentSource;

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub cache_dir: PathBuf,
    pub api_base_url: String,
    pub access_token: String,
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("segment_information"),
            api_base_url: "https://www.strava.com/api/v3".to_string(),
            access_token: String::new(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SegmentStore {
    config: StoreConfig,
    client: reqwest::blocking::Client,
}

impl SegmentStore {
    pub fn new(config: StoreConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn cache_path(&self, id: u64) -> PathBuf {
        self.config.cache_dir.join(format!("{}.json", id))
    }

    fn fetch(&self, id: u64, dest: &Path) -> Result<(), SegmentError> {
        let http = |source| SegmentError::Http { id, source };
        let io = |source| SegmentError::Io { id, source };

        let body = self
            .client
            .get(format!("{}/segments/{}", self.config.api_base_url, id))
            .bearer_auth(&self.config.access_token)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.text())
            .map_err(http)?;

        fs::create_dir_all(&self.config.cache_dir).map_err(io)?;
        let tmp_path = dest.with_extension("tmp");
        fs::write(&tmp_path, body).map_err(io)?;
        fs::rename(tmp_path, dest).map_err(io)?;
        info!(segment = id, path = %dest.display(), "cached segment");
        Ok(())
    }
}

impl SegmentSource for SegmentStore {
    fn load(&self, id: u64) -> Result<Segment, SegmentError> {
        let path = self.cache_path(id);
        if path.exists() {
            debug!(segment = id, "segment cache hit");
        } else {
            self.fetch(id, &path)?;
        }

        let body = fs::read_to_string(&path).map_err(|source| SegmentError::Io { id, source })?;
        parse_segment(id, &body)
    }
}

#[derive(Debug, Deserialize)]
struct StravaSegment {
    distance: f64,
    map: StravaMap,
}

#[derive(Debug, Deserialize)]
struct StravaMap {
    polyline: String,
}

/// Builds a segment from a Strava `GET /segments/{id}` response body.
pub fn parse_segment(id: u64, body: &str) -> Result<Segment, SegmentError> {
    let raw: StravaSegment =
        serde_json::from_str(body).map_err(|source| SegmentError::Json { id, source })?;
    let points = Polyline::decode(&raw.map.polyline)
        .map_err(|source| SegmentError::Polyline { id, source })?
        .into_points();
    Segment::new(id, points, raw.distance)
}
