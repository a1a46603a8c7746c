//! Room access tokens: HS256 JWTs carrying a room grant, issued by
//! `/api/token` and checked when a caller opens the audio websocket.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

pub const TOKEN_TTL_HOURS: i64 = 4;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("voice service credentials not configured")]
    NotConfigured,
    #[error("invalid token: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("token does not allow joining a room")]
    NoRoomJoin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomGrant {
    pub room: String,
    pub room_join: bool,
    pub can_publish: bool,
    pub can_subscribe: bool,
    pub can_publish_data: bool,
}

impl RoomGrant {
    pub fn full(room: &str) -> Self {
        Self {
            room: room.to_string(),
            room_join: true,
            can_publish: true,
            can_subscribe: true,
            can_publish_data: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// API key of the issuer.
    pub iss: String,
    /// Participant identity.
    pub sub: String,
    pub nbf: i64,
    pub exp: i64,
    /// Participant metadata as a JSON string.
    pub metadata: String,
    pub video: RoomGrant,
}

/// Signs tokens with the voice service key pair.
pub struct TokenIssuer {
    api_key: String,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenIssuer {
    pub fn new(api_key: &str, api_secret: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            encoding: EncodingKey::from_secret(api_secret.as_bytes()),
            decoding: DecodingKey::from_secret(api_secret.as_bytes()),
        }
    }

    pub fn issue(
        &self,
        identity: &str,
        room: &str,
        metadata: &serde_json::Value,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            iss: self.api_key.clone(),
            sub: identity.to_string(),
            nbf: now.timestamp(),
            exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
            metadata: metadata.to_string(),
            video: RoomGrant::full(room),
        };
        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding,
        )?)
    }

    /// Checks signature, issuer, expiry and the room-join grant.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.api_key]);
        validation.validate_nbf = true;
        let claims = jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)?.claims;
        if !claims.video.room_join {
            return Err(TokenError::NoRoomJoin);
        }
        Ok(claims)
    }
}
