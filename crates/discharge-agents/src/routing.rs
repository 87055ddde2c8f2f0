//! Geocoding/routing collaborator: resolves two addresses to coordinates
//! and asks for a driving-directions polyline, falling back to a
//! synthetic two-point route on any failure (§6 "Routing provider").

use serde::Deserialize;
use tracing::warn;

const SF_FALLBACK: [f64; 2] = [-122.4194, 37.7749];

#[derive(Debug, Clone)]
pub struct Route {
    pub polyline: String,
    pub eta_minutes: i32,
}

pub struct RoutingClient {
    client: reqwest::Client,
    token: Option<String>,
}

#[derive(Deserialize)]
struct GeocodeResponse {
    features: Vec<GeocodeFeature>,
}

#[derive(Deserialize)]
struct GeocodeFeature {
    center: [f64; 2],
}

#[derive(Deserialize)]
struct DirectionsResponse {
    routes: Vec<DirectionsRoute>,
}

#[derive(Deserialize)]
struct DirectionsRoute {
    geometry: DirectionsGeometry,
    duration: f64,
}

#[derive(Deserialize)]
struct DirectionsGeometry {
    coordinates: Vec<[f64; 2]>,
}

impl RoutingClient {
    pub fn new(token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
        }
    }

    async fn geocode(&self, token: &str, address: &str) -> Option<[f64; 2]> {
        let mut url = reqwest::Url::parse("https://api.mapbox.com/geocoding/v5/mapbox.places/").ok()?;
        url.path_segments_mut().ok()?.push(&format!("{address}.json"));
        let response = self.client.get(url).query(&[("access_token", token)]).send().await.ok()?;
        let body: GeocodeResponse = response.json().await.ok()?;
        body.features.first().map(|f| f.center)
    }

    /// Obtain a driving route from `pickup` to `dropoff`; on any failure
    /// (missing token, geocode miss, directions error) substitutes a
    /// straight two-point polyline between the SF fallback coordinate and
    /// itself, per the source's geocode-failure behavior.
    pub async fn route(&self, pickup: &str, dropoff: &str) -> Route {
        let Some(token) = &self.token else {
            return self.fallback_route();
        };

        let (Some(from), Some(to)) =
            (self.geocode(token, pickup).await, self.geocode(token, dropoff).await)
        else {
            warn!("routing geocode failed, using fallback route");
            return self.fallback_route();
        };

        let url = format!(
            "https://api.mapbox.com/directions/v5/mapbox/driving/{},{};{},{}",
            from[0], from[1], to[0], to[1]
        );
        let directions: Option<DirectionsResponse> = match self
            .client
            .get(url)
            .query(&[("access_token", token.as_str()), ("geometries", "geojson")])
            .send()
            .await
        {
            Ok(response) => response.json().await.ok(),
            Err(_) => None,
        };

        match directions.and_then(|d| d.routes.into_iter().next()) {
            Some(route) => Route {
                polyline: encode_coordinates(&route.geometry.coordinates),
                eta_minutes: (route.duration / 60.0).round() as i32,
            },
            None => {
                warn!("routing directions request failed, using fallback route");
                self.fallback_route()
            }
        }
    }

    fn fallback_route(&self) -> Route {
        Route {
            polyline: encode_coordinates(&[SF_FALLBACK, SF_FALLBACK]),
            eta_minutes: 20,
        }
    }
}

fn encode_coordinates(points: &[[f64; 2]]) -> String {
    points
        .iter()
        .map(|p| format!("{:.5},{:.5}", p[0], p[1]))
        .collect::<Vec<_>>()
        .join(";")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fallback_route_is_used_when_no_token_is_configured() {
        let client = RoutingClient::new(None);
        let route = client.route("100 Main St", "200 Other St").await;
        assert_eq!(route.eta_minutes, 20);
        assert!(!route.polyline.is_empty());
    }

    #[test]
    fn encode_coordinates_joins_points_with_semicolons() {
        let encoded = encode_coordinates(&[[-122.4194, 37.7749], [-122.4, 37.78]]);
        assert_eq!(encoded, "-122.41940,37.77490;-122.40000,37.78000");
    }
}
