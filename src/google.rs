//! Google Maps adapter: Distance Matrix for travel distances, Directions for
//! transit geometry.

use serde::Deserialize;
use tracing::debug;

use crate::polyline::Polyline;
use crate::segment::Coordinate;
use crate::traits::{DistanceOracle, LegDistance, OracleError, TravelMode};

#[derive(Debug, Clone)]
pub struct GoogleMapsConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
    /// Destinations per Distance Matrix request; the API allows 25.
    pub max_destinations: usize,
}

impl Default for GoogleMapsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://maps.googleapis.com/maps/api".to_string(),
            timeout_secs: 10,
            max_destinations: 25,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GoogleMapsClient {
    config: GoogleMapsConfig,
    client: reqwest::blocking::Client,
}

impl GoogleMapsClient {
    pub fn new(config: GoogleMapsConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn distance_matrix(
        &self,
        origin: Coordinate,
        destinations: &[Coordinate],
        mode: TravelMode,
    ) -> Result<Vec<LegDistance>, OracleError> {
        let destinations_param = destinations
            .iter()
            .map(format_coordinate)
            .collect::<Vec<_>>()
            .join("|");

        let body = self
            .client
            .get(format!("{}/distancematrix/json", self.config.base_url))
            .query(&[
                ("origins", format_coordinate(&origin).as_str()),
                ("destinations", destinations_param.as_str()),
                ("mode", mode.google_mode()),
                ("units", "metric"),
                ("key", self.config.api_key.as_str()),
            ])
            .send()?
            .error_for_status()?
            .json::<MatrixResponse>()?;

        matrix_legs(body, destinations.len())
    }
}

impl DistanceOracle for GoogleMapsClient {
    fn batch_distance(
        &self,
        origin: Coordinate,
        destinations: &[Coordinate],
        mode: TravelMode,
    ) -> Result<Vec<LegDistance>, OracleError> {
        let mut legs = Vec::with_capacity(destinations.len());
        for chunk in destinations.chunks(self.config.max_destinations.max(1)) {
            debug!(destinations = chunk.len(), "requesting distance matrix");
            legs.extend(self.distance_matrix(origin, chunk, mode)?);
        }
        Ok(legs)
    }

    fn path(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TravelMode,
    ) -> Result<Vec<Coordinate>, OracleError> {
        let body = self
            .client
            .get(format!("{}/directions/json", self.config.base_url))
            .query(&[
                ("origin", format_coordinate(&origin).as_str()),
                ("destination", format_coordinate(&destination).as_str()),
                ("mode", mode.google_mode()),
                ("key", self.config.api_key.as_str()),
            ])
            .send()?
            .error_for_status()?
            .json::<DirectionsResponse>()?;

        directions_points(body)
    }
}

fn format_coordinate(coordinate: &Coordinate) -> String {
    format!("{:.6},{:.6}", coordinate.lat, coordinate.lng)
}

#[derive(Debug, Deserialize)]
struct MatrixResponse {
    status: String,
    error_message: Option<String>,
    #[serde(default)]
    rows: Vec<MatrixRow>,
}

#[derive(Debug, Deserialize)]
struct MatrixRow {
    elements: Vec<MatrixElement>,
}

#[derive(Debug, Deserialize)]
struct MatrixElement {
    status: String,
    distance: Option<TextValue>,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    value: f64,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    overview_polyline: EncodedPolyline,
}

#[derive(Debug, Deserialize)]
struct EncodedPolyline {
    points: String,
}

fn matrix_legs(body: MatrixResponse, expected: usize) -> Result<Vec<LegDistance>, OracleError> {
    if body.status != "OK" {
        return Err(OracleError::Provider {
            status: body.status,
            message: body.error_message.unwrap_or_default(),
        });
    }

    let elements = body
        .rows
        .into_iter()
        .next()
        .map(|row| row.elements)
        .unwrap_or_default();
    if elements.len() != expected {
        return Err(OracleError::Misaligned {
            expected,
            actual: elements.len(),
        });
    }

    Ok(elements
        .into_iter()
        .map(|element| match (element.status.as_str(), element.distance) {
            ("OK", Some(distance)) => LegDistance::Meters(distance.value),
            _ => LegDistance::Failed {
                status: element.status,
            },
        })
        .collect())
}

fn directions_points(body: DirectionsResponse) -> Result<Vec<Coordinate>, OracleError> {
    if body.status != "OK" {
        return Err(OracleError::Provider {
            status: body.status,
            message: body.error_message.unwrap_or_default(),
        });
    }

    let route = body.routes.into_iter().next().ok_or(OracleError::NoPath)?;
    let points = Polyline::decode(&route.overview_polyline.points)?.into_points();
    if points.is_empty() {
        return Err(OracleError::NoPath);
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_elements() {
        let body: MatrixResponse = serde_json::from_str(
            r#"{
                "status": "OK",
                "rows": [{"elements": [
                    {"status": "OK", "distance": {"text": "1.2 km", "value": 1204}},
                    {"status": "ZERO_RESULTS"}
                ]}]
            }"#,
        )
        .unwrap();
        let legs = matrix_legs(body, 2).unwrap();
        assert_eq!(legs[0], LegDistance::Meters(1204.0));
        assert_eq!(
            legs[1],
            LegDistance::Failed {
                status: "ZERO_RESULTS".to_string()
            }
        );
    }

    #[test]
    fn test_matrix_request_denied() {
        let body: MatrixResponse = serde_json::from_str(
            r#"{"status": "REQUEST_DENIED", "error_message": "The provided API key is invalid.", "rows": []}"#,
        )
        .unwrap();
        assert!(matches!(
            matrix_legs(body, 1),
            Err(OracleError::Provider { status, .. }) if status == "REQUEST_DENIED"
        ));
    }

    #[test]
    fn test_matrix_short_row() {
        let body: MatrixResponse = serde_json::from_str(
            r#"{"status": "OK", "rows": [{"elements": [{"status": "OK", "distance": {"value": 5}}]}]}"#,
        )
        .unwrap();
        assert!(matches!(
            matrix_legs(body, 3),
            Err(OracleError::Misaligned { expected: 3, actual: 1 })
        ));
    }

    #[test]
    fn test_directions_polyline() {
        let body: DirectionsResponse = serde_json::from_str(
            r#"{"status": "OK", "routes": [{"overview_polyline": {"points": "_p~iF~ps|U_ulLnnqC_mqNvxq`@"}}]}"#,
        )
        .unwrap();
        let points = directions_points(body).unwrap();
        assert_eq!(points.len(), 3);
        assert!((points[0].lat - 38.5).abs() < 1e-9);
    }

    #[test]
    fn test_directions_zero_results() {
        let body: DirectionsResponse =
            serde_json::from_str(r#"{"status": "ZERO_RESULTS", "routes": []}"#).unwrap();
        assert!(matches!(directions_points(body), Err(OracleError::Provider { .. })));
    }
}
