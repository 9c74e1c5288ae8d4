//! Client access tokens
//!
//! A token is `T1==` followed by base64 of
//! `partner_id=<key>&sig=<hmac>:<data>`, where `data` is a form-encoded list of
//! session id, timestamps, role and nonce, and `sig` is the hex HMAC-SHA1 of
//! `data` keyed with the project secret. Tokens are minted locally; the
//! platform verifies them when a client connects.

use super::{PlatformError, Role};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use url::form_urlencoded;

type HmacSha1 = Hmac<Sha1>;

pub const TOKEN_SENTINEL: &str = "T1==";

/// Platform default lifetime: one day
pub const DEFAULT_TTL_SECS: i64 = 86_400;

/// Everything needed to mint one token
#[derive(Debug, Clone)]
pub struct TokenRequest<'a> {
    pub session_id: &'a str,
    pub role: Role,
    pub create_time: i64,
    pub expire_time: i64,
    pub nonce: u32,
}

impl<'a> TokenRequest<'a> {
    /// Token issued now with the default lifetime and a random nonce
    pub fn new(session_id: &'a str, role: Role) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            session_id,
            role,
            create_time: now,
            expire_time: now + DEFAULT_TTL_SECS,
            nonce: rand::random(),
        }
    }

    fn data_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .append_pair("session_id", self.session_id)
            .append_pair("create_time", &self.create_time.to_string())
            .append_pair("expire_time", &self.expire_time.to_string())
            .append_pair("role", self.role.as_str())
            .append_pair("nonce", &self.nonce.to_string())
            .finish()
    }
}

/// Decoded contents of a token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub partner_id: String,
    pub signature: String,
    pub session_id: String,
    pub create_time: i64,
    pub expire_time: i64,
    pub role: String,
    pub nonce: String,
    /// Signed portion, kept for verification
    pub data: String,
}

pub fn mint(api_key: &str, api_secret: &str, request: &TokenRequest<'_>) -> Result<String, PlatformError> {
    let data = request.data_string();
    let signature = sign(api_secret, &data)?;

    let header = form_urlencoded::Serializer::new(String::new())
        .append_pair("partner_id", api_key)
        .append_pair("sig", &signature)
        .finish();

    Ok(format!(
        "{}{}",
        TOKEN_SENTINEL,
        STANDARD.encode(format!("{}:{}", header, data))
    ))
}

pub fn decode(token: &str) -> Result<TokenClaims, PlatformError> {
    let encoded = token
        .strip_prefix(TOKEN_SENTINEL)
        .ok_or_else(|| PlatformError::Token("missing T1== prefix".to_string()))?;
    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| PlatformError::Token(format!("bad base64: {}", e)))?;
    let text = String::from_utf8(bytes)
        .map_err(|e| PlatformError::Token(format!("not utf-8: {}", e)))?;
    let (header, data) = text
        .split_once(':')
        .ok_or_else(|| PlatformError::Token("missing signature separator".to_string()))?;

    let mut partner_id = None;
    let mut signature = None;
    for (key, value) in form_urlencoded::parse(header.as_bytes()) {
        match key.as_ref() {
            "partner_id" => partner_id = Some(value.into_owned()),
            "sig" => signature = Some(value.into_owned()),
            _ => {}
        }
    }

    let mut session_id = None;
    let mut create_time = None;
    let mut expire_time = None;
    let mut role = None;
    let mut nonce = None;
    for (key, value) in form_urlencoded::parse(data.as_bytes()) {
        match key.as_ref() {
            "session_id" => session_id = Some(value.into_owned()),
            "create_time" => create_time = Some(parse_time(&value)?),
            "expire_time" => expire_time = Some(parse_time(&value)?),
            "role" => role = Some(value.into_owned()),
            "nonce" => nonce = Some(value.into_owned()),
            _ => {}
        }
    }

    Ok(TokenClaims {
        partner_id: required(partner_id, "partner_id")?,
        signature: required(signature, "sig")?,
        session_id: required(session_id, "session_id")?,
        create_time: required(create_time, "create_time")?,
        expire_time: required(expire_time, "expire_time")?,
        role: required(role, "role")?,
        nonce: required(nonce, "nonce")?,
        data: data.to_string(),
    })
}

/// Check the token signature against the project secret
pub fn verify(claims: &TokenClaims, api_secret: &str) -> bool {
    let Ok(expected) = hex::decode(&claims.signature) else {
        return false;
    };
    let Ok(mut mac) = HmacSha1::new_from_slice(api_secret.as_bytes()) else {
        return false;
    };
    mac.update(claims.data.as_bytes());
    mac.verify_slice(&expected).is_ok()
}

fn sign(api_secret: &str, data: &str) -> Result<String, PlatformError> {
    let mut mac = HmacSha1::new_from_slice(api_secret.as_bytes())
        .map_err(|e| PlatformError::Token(e.to_string()))?;
    mac.update(data.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

fn parse_time(value: &str) -> Result<i64, PlatformError> {
    value
        .parse()
        .map_err(|_| PlatformError::Token(format!("bad timestamp {:?}", value)))
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, PlatformError> {
    value.ok_or_else(|| PlatformError::Token(format!("missing {}", field)))
}
