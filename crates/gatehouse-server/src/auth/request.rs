//! Parsing and carrying the relying party's authorization request.
//!
//! The request travels as base64-encoded JSON: in the approval form's hidden
//! `state` field and in the `state` parameter sent upstream. It is not signed;
//! every hop re-checks the client and redirect URI against the registry.

use super::clients::ClientRegistry;
use crate::error::AppError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use gatehouse_core::{AuthorizationRequest, RegisteredClient};
use serde::Deserialize;

/// Query parameters of `GET /authorize`.
#[derive(Debug, Default, Deserialize)]
pub struct AuthorizeQuery {
    pub response_type: Option<String>,
    pub client_id: Option<String>,
    pub redirect_uri: Option<String>,
    pub scope: Option<String>,
    pub state: Option<String>,
    pub code_challenge: Option<String>,
    pub code_challenge_method: Option<String>,
}

/// Validate an incoming authorization request against the registry.
pub fn parse_authorization_request<'a>(
    query: AuthorizeQuery,
    registry: &'a ClientRegistry,
) -> Result<(AuthorizationRequest, &'a RegisteredClient), AppError> {
    let client_id = query
        .client_id
        .filter(|id| !id.trim().is_empty())
        .ok_or(AppError::InvalidRequest)?;
    let client = registry.get(&client_id).ok_or_else(|| {
        tracing::info!(client_id = %client_id, "Unknown client");
        AppError::InvalidRequest
    })?;

    let response_type = query.response_type.unwrap_or_else(|| "code".to_string());
    if response_type != "code" {
        return Err(AppError::InvalidRequest);
    }

    let redirect_uri = match query.redirect_uri {
        Some(uri) => uri,
        None => match client.redirect_uris.as_slice() {
            [only] => only.clone(),
            _ => return Err(AppError::InvalidRequest),
        },
    };
    if !client.allows_redirect(&redirect_uri) {
        tracing::warn!(client_id = %client_id, "Unregistered redirect_uri");
        return Err(AppError::InvalidRequest);
    }

    let request = AuthorizationRequest {
        client_id,
        redirect_uri,
        scope: query
            .scope
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default(),
        state: query.state,
        code_challenge: query.code_challenge,
        code_challenge_method: query.code_challenge_method,
        response_type,
    };
    Ok((request, client))
}

pub fn encode_state(request: &AuthorizationRequest) -> String {
    let json = serde_json::to_string(request).unwrap_or_else(|_| "{}".to_string());
    STANDARD.encode(json.as_bytes())
}

/// Decode a carried request. `None` when undecodable or without a client id.
pub fn decode_state(encoded: &str) -> Option<AuthorizationRequest> {
    let bytes = STANDARD.decode(encoded.trim()).ok()?;
    let request: AuthorizationRequest = serde_json::from_slice(&bytes).ok()?;
    if request.client_id.trim().is_empty() {
        return None;
    }
    Some(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn registry() -> ClientRegistry {
        ClientRegistry::new([
            RegisteredClient {
                client_id: "abc".to_string(),
                redirect_uris: vec!["https://example.com/cb".to_string()],
                ..Default::default()
            },
            RegisteredClient {
                client_id: "multi".to_string(),
                redirect_uris: vec!["https://a.example/cb".to_string(), "https://b.example/cb".to_string()],
                ..Default::default()
            },
        ])
    }

    fn query(client_id: &str) -> AuthorizeQuery {
        AuthorizeQuery {
            client_id: Some(client_id.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_full_request() {
        let registry = registry();
        let (request, client) = parse_authorization_request(
            AuthorizeQuery {
                response_type: Some("code".to_string()),
                client_id: Some("abc".to_string()),
                redirect_uri: Some("https://example.com/cb".to_string()),
                scope: Some("read  write".to_string()),
                state: Some("xyz".to_string()),
                ..Default::default()
            },
            &registry,
        )
        .unwrap();

        assert_eq!(client.client_id, "abc");
        assert_eq!(request.scope, vec!["read", "write"]);
        assert_eq!(request.state.as_deref(), Some("xyz"));
    }

    #[test]
    fn test_single_redirect_is_implied() {
        let registry = registry();
        let (request, _) = parse_authorization_request(query("abc"), &registry).unwrap();
        assert_eq!(request.redirect_uri, "https://example.com/cb");

        assert!(parse_authorization_request(query("multi"), &registry).is_err());
    }

    #[test]
    fn test_rejections() {
        let registry = registry();

        assert!(parse_authorization_request(AuthorizeQuery::default(), &registry).is_err());
        assert!(parse_authorization_request(query(""), &registry).is_err());
        assert!(parse_authorization_request(query("unknown"), &registry).is_err());

        let mut bad_redirect = query("abc");
        bad_redirect.redirect_uri = Some("https://evil.example/cb".to_string());
        assert!(parse_authorization_request(bad_redirect, &registry).is_err());

        let mut token_flow = query("abc");
        token_flow.response_type = Some("token".to_string());
        assert!(parse_authorization_request(token_flow, &registry).is_err());
    }

    #[test]
    fn test_state_encoding_reproduces_request() {
        let request = AuthorizationRequest {
            client_id: "abc".to_string(),
            redirect_uri: "https://example.com/cb".to_string(),
            scope: vec!["read".to_string()],
            state: Some("rp-state".to_string()),
            ..Default::default()
        };

        assert_eq!(decode_state(&encode_state(&request)), Some(request));
    }

    #[test]
    fn test_decode_state_rejects_garbage() {
        assert_eq!(decode_state("not base64!"), None);
        assert_eq!(decode_state(&STANDARD.encode("[1,2]")), None);
        assert_eq!(decode_state(&STANDARD.encode(r#"{"clientId":"","redirectUri":""}"#)), None);
    }
}
