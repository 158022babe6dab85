//! Approval cookie: the signed list of clients a browser has consented to.
//!
//! Value format: `<hex hmac>.<base64 json array of client ids>`, where the
//! signature covers the JSON text. Any failure to parse or verify reads as
//! "nothing approved".

use super::signing::CookieSigner;
use axum::http::{header, HeaderMap};
use axum_extra::extract::cookie::{Cookie, SameSite};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use time::Duration;

pub const APPROVAL_COOKIE: &str = "mcp-approved-clients";

const ONE_YEAR_SECS: i64 = 31_536_000;

/// All `Cookie` request headers joined into one `a=b; c=d` string.
pub fn cookie_header(headers: &HeaderMap) -> Option<String> {
    let values: Vec<&str> = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values.join("; "))
    }
}

/// Client ids carried by a valid approval cookie; empty on any failure.
pub fn approved_clients(cookie_header: Option<&str>, signer: &CookieSigner) -> Vec<String> {
    let Some(value) = cookie_header.and_then(find_cookie) else {
        return Vec::new();
    };

    match decode(&value, signer) {
        Ok(clients) => clients,
        Err(reason) => {
            tracing::warn!(reason, "Ignoring invalid approval cookie");
            Vec::new()
        }
    }
}

pub fn is_client_approved(
    cookie_header: Option<&str>,
    client_id: &str,
    signer: &CookieSigner,
) -> bool {
    approved_clients(cookie_header, signer)
        .iter()
        .any(|id| id == client_id)
}

/// `Set-Cookie` value carrying the existing approvals plus `client_id`.
pub fn record_approval(
    cookie_header: Option<&str>,
    client_id: &str,
    signer: &CookieSigner,
) -> String {
    let mut clients = approved_clients(cookie_header, signer);
    if !clients.iter().any(|id| id == client_id) {
        clients.push(client_id.to_string());
    }

    Cookie::build((APPROVAL_COOKIE, encode(&clients, signer)))
        .http_only(true)
        .secure(true)
        .path("/")
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(ONE_YEAR_SECS))
        .build()
        .to_string()
}

fn encode(clients: &[String], signer: &CookieSigner) -> String {
    // Serializing a list of strings cannot fail.
    let json = serde_json::to_string(clients).unwrap_or_else(|_| "[]".to_string());
    format!("{}.{}", signer.sign(&json), STANDARD.encode(json.as_bytes()))
}

fn decode(value: &str, signer: &CookieSigner) -> Result<Vec<String>, &'static str> {
    let mut parts = value.split('.');
    let (Some(signature), Some(payload), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err("expected exactly one '.' separator");
    };

    let bytes = STANDARD.decode(payload).map_err(|_| "payload is not base64")?;
    let json = String::from_utf8(bytes).map_err(|_| "payload is not utf-8")?;
    if !signer.verify(signature, &json) {
        return Err("signature mismatch");
    }
    serde_json::from_str::<Vec<String>>(&json).map_err(|_| "payload is not an array of strings")
}

fn find_cookie(header: &str) -> Option<String> {
    Cookie::split_parse(header)
        .filter_map(Result::ok)
        .find(|c| c.name() == APPROVAL_COOKIE)
        .map(|c| c.value().to_string())
}
