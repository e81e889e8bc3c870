use std::sync::Arc;

use crate::auth::{jwt::JwtKeys, password::PasswordCodec, repo::UserDirectory, services::AuthService};
use crate::config::AppConfig;
use crate::geo::{NominatimClient, ReverseGeocoder};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth: Arc<AuthService>,
    pub geocoder: Arc<dyn ReverseGeocoder>,
}

impl AppState {
    pub fn init(config: AppConfig) -> anyhow::Result<Self> {
        let auth = AuthService::new(
            UserDirectory::new(),
            JwtKeys::new(&config.jwt),
            PasswordCodec::new(&config.password)?,
        );
        let geocoder = Arc::new(NominatimClient::new(&config.geocoder)?) as Arc<dyn ReverseGeocoder>;
        Ok(Self::from_parts(Arc::new(config), Arc::new(auth), geocoder))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        auth: Arc<AuthService>,
        geocoder: Arc<dyn ReverseGeocoder>,
    ) -> Self {
        Self {
            config,
            auth,
            geocoder,
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        Self::fake_with_geocoder(Arc::new(FakeGeocoder::default()))
    }

    #[cfg(test)]
    pub fn fake_with_geocoder(geocoder: Arc<dyn ReverseGeocoder>) -> Self {
        use crate::config::{GeocoderConfig, JwtConfig, PasswordConfig, ServerConfig};

        let config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".into(),
                port: 0,
            },
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
            },
            password: PasswordConfig {
                memory_kib: 64,
                iterations: 1,
                parallelism: 1,
            },
            geocoder: GeocoderConfig {
                url: "http://fake.local/reverse".into(),
                user_agent: "test".into(),
                timeout_secs: 1,
            },
        };
        let auth = AuthService::new(
            UserDirectory::new(),
            JwtKeys::new(&config.jwt),
            PasswordCodec::new(&config.password).expect("test argon2 params"),
        );
        Self::from_parts(Arc::new(config), Arc::new(auth), geocoder)
    }
}

#[cfg(test)]
pub use fake::FakeGeocoder;
