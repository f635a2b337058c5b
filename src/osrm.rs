//! OSRM HTTP adapter for travel distances and transit geometry.

use serde::Deserialize;
use tracing::debug;

use crate::polyline::Polyline;
use crate::segment::Coordinate;
use crate::traits::{DistanceOracle, LegDistance, OracleError, TravelMode};

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Coordinates per `table` request, origin included. Matches the
    /// server's `--max-table-size`.
    pub max_table_size: usize,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 10,
            max_table_size: 100,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn table(
        &self,
        origin: Coordinate,
        destinations: &[Coordinate],
        mode: TravelMode,
    ) -> Result<Vec<LegDistance>, OracleError> {
        let coords = std::iter::once(&origin)
            .chain(destinations)
            .map(format_coordinate)
            .collect::<Vec<_>>()
            .join(";");
        let destination_indices = (1..=destinations.len())
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(";");

        let url = format!(
            "{}/table/v1/{}/{}?sources=0&destinations={}&annotations=distance",
            self.config.base_url,
            mode.osrm_profile(),
            coords,
            destination_indices
        );

        let body = self.client.get(url).send()?.json::<OsrmTableResponse>()?;
        table_legs(body, destinations.len())
    }
}

impl DistanceOracle for OsrmClient {
    fn batch_distance(
        &self,
        origin: Coordinate,
        destinations: &[Coordinate],
        mode: TravelMode,
    ) -> Result<Vec<LegDistance>, OracleError> {
        let chunk_size = self.config.max_table_size.saturating_sub(1).max(1);
        let mut legs = Vec::with_capacity(destinations.len());
        for chunk in destinations.chunks(chunk_size) {
            debug!(destinations = chunk.len(), "requesting OSRM table");
            legs.extend(self.table(origin, chunk, mode)?);
        }
        Ok(legs)
    }

    fn path(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TravelMode,
    ) -> Result<Vec<Coordinate>, OracleError> {
        let url = format!(
            "{}/route/v1/{}/{};{}?overview=full&geometries=polyline",
            self.config.base_url,
            mode.osrm_profile(),
            format_coordinate(&origin),
            format_coordinate(&destination)
        );

        let body = self.client.get(url).send()?.json::<OsrmRouteResponse>()?;
        route_points(body)
    }
}

/// OSRM takes `lng,lat`.
fn format_coordinate(coordinate: &Coordinate) -> String {
    format!("{:.6},{:.6}", coordinate.lng, coordinate.lat)
}

#[derive(Debug, Deserialize)]
struct OsrmTableResponse {
    code: String,
    message: Option<String>,
    distances: Option<Vec<Vec<Option<f64>>>>,
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: String,
}

fn provider_error(code: String, message: Option<String>) -> OracleError {
    OracleError::Provider {
        status: code,
        message: message.unwrap_or_default(),
    }
}

fn table_legs(body: OsrmTableResponse, expected: usize) -> Result<Vec<LegDistance>, OracleError> {
    if body.code != "Ok" {
        return Err(provider_error(body.code, body.message));
    }

    let row = body
        .distances
        .and_then(|rows| rows.into_iter().next())
        .unwrap_or_default();
    if row.len() != expected {
        return Err(OracleError::Misaligned {
            expected,
            actual: row.len(),
        });
    }

    Ok(row
        .into_iter()
        .map(|distance| match distance {
            Some(meters) => LegDistance::Meters(meters),
            None => LegDistance::Failed {
                status: "no route".to_string(),
            },
        })
        .collect())
}

fn route_points(body: OsrmRouteResponse) -> Result<Vec<Coordinate>, OracleError> {
    if body.code != "Ok" {
        return Err(provider_error(body.code, body.message));
    }

    let route = body.routes.into_iter().next().ok_or(OracleError::NoPath)?;
    let points = Polyline::decode(&route.geometry)?.into_points();
    if points.is_empty() {
        return Err(OracleError::NoPath);
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(json: &str) -> OsrmTableResponse {
        serde_json::from_str(json).unwrap()
    }

    fn route(json: &str) -> OsrmRouteResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_table_with_unreachable_destination() {
        let body = table(r#"{"code":"Ok","distances":[[1520.4,null,88.0]]}"#);
        let legs = table_legs(body, 3).unwrap();
        assert_eq!(legs[0], LegDistance::Meters(1520.4));
        assert!(matches!(legs[1], LegDistance::Failed { .. }));
        assert_eq!(legs[2], LegDistance::Meters(88.0));
    }

    #[test]
    fn test_table_short_row() {
        let body = table(r#"{"code":"Ok","distances":[[1520.4]]}"#);
        assert!(matches!(
            table_legs(body, 2),
            Err(OracleError::Misaligned { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_table_error_code() {
        let body = table(r#"{"code":"InvalidQuery","message":"Query string malformed"}"#);
        match table_legs(body, 1) {
            Err(OracleError::Provider { status, message }) => {
                assert_eq!(status, "InvalidQuery");
                assert_eq!(message, "Query string malformed");
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_route_geometry_decoded() {
        let body = route(r#"{"code":"Ok","routes":[{"geometry":"_p~iF~ps|U_ulLnnqC"}]}"#);
        let points = route_points(body).unwrap();
        assert_eq!(points.len(), 2);
        assert!((points[1].lat - 40.7).abs() < 1e-9);
        assert!((points[1].lng + 120.95).abs() < 1e-9);
    }

    #[test]
    fn test_route_missing() {
        let body = route(r#"{"code":"Ok","routes":[]}"#);
        assert!(matches!(route_points(body), Err(OracleError::NoPath)));
        let body = route(r#"{"code":"NoRoute","message":"Impossible route"}"#);
        assert!(matches!(route_points(body), Err(OracleError::Provider { .. })));
    }

    #[test]
    fn test_coordinates_are_lng_lat() {
        assert_eq!(
            format_coordinate(&Coordinate::new(36.1147, -115.1728)),
            "-115.172800,36.114700"
        );
    }
}
