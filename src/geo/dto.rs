use serde::{Deserialize, Serialize};

use super::client::ReverseGeocode;

/// Raw query; parsing happens in the handler so bad input gets our messages.
#[derive(Debug, Deserialize)]
pub struct ConvertQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ConvertResponse {
    pub latitude: String,
    pub longitude: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub road: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub house_number: Option<String>,
}

impl ConvertResponse {
    pub fn new(latitude: String, longitude: String, geo: ReverseGeocode) -> Self {
        let addr = geo.address.unwrap_or_default();

        let address = geo.display_name.or_else(|| {
            let parts: Vec<&str> = [
                addr.house_number.as_deref(),
                addr.road.as_deref(),
                addr.locality(),
                addr.state.as_deref(),
                addr.country.as_deref(),
            ]
            .into_iter()
            .flatten()
            .collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        });

        Self {
            latitude,
            longitude,
            address,
            city: addr.locality().map(str::to_owned),
            country: addr.country,
            state: addr.state,
            postcode: addr.postcode,
            road: addr.road,
            house_number: addr.house_number,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::client::AddressParts;

    fn coords() -> (String, String) {
        ("40.7128".into(), "-74.0060".into())
    }

    #[test]
    fn display_name_wins() {
        let (lat, lng) = coords();
        let res = ConvertResponse::new(
            lat,
            lng,
            ReverseGeocode {
                display_name: Some("City Hall, New York".into()),
                address: Some(AddressParts {
                    road: Some("Broadway".into()),
                    city: Some("New York".into()),
                    ..Default::default()
                }),
            },
        );
        assert_eq!(res.address.as_deref(), Some("City Hall, New York"));
        assert_eq!(res.city.as_deref(), Some("New York"));
        assert_eq!(res.road.as_deref(), Some("Broadway"));
    }

    #[test]
    fn address_is_assembled_from_parts() {
        let (lat, lng) = coords();
        let res = ConvertResponse::new(
            lat,
            lng,
            ReverseGeocode {
                display_name: None,
                address: Some(AddressParts {
                    house_number: Some("12".into()),
                    road: Some("Elm St".into()),
                    village: Some("Hamlet".into()),
                    country: Some("UK".into()),
                    ..Default::default()
                }),
            },
        );
        assert_eq!(res.address.as_deref(), Some("12, Elm St, Hamlet, UK"));
        assert_eq!(res.city.as_deref(), Some("Hamlet"));
    }

    #[test]
    fn empty_upstream_only_echoes_coordinates() {
        let (lat, lng) = coords();
        let res = ConvertResponse::new(lat, lng, ReverseGeocode::default());
        let json = serde_json::to_value(&res).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"latitude": "40.7128", "longitude": "-74.0060"})
        );
    }
}
