//! HTML approval dialog.

use gatehouse_core::config::ServerConfig;
use gatehouse_core::RegisteredClient;
use url::Url;

/// Escape text for interpolation into HTML content or attribute values.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}

/// Consent page for `client`, posting `encoded_state` back to `/authorize`.
pub fn render_approval_dialog(
    server: &ServerConfig,
    client: &RegisteredClient,
    encoded_state: &str,
) -> String {
    let server_name = escape_html(&server.server_name);
    let client_name = escape_html(client.display_name());
    let description = server
        .server_description
        .as_deref()
        .map(|d| format!(r#"<p class="description">{}</p>"#, escape_html(d)))
        .unwrap_or_default();

    let mut details = String::new();
    push_link_row(&mut details, "Website", client.client_uri.as_deref());
    push_link_row(&mut details, "Privacy Policy", client.policy_uri.as_deref());
    push_link_row(&mut details, "Terms of Service", client.tos_uri.as_deref());
    push_list_row(&mut details, "Redirect URIs", &client.redirect_uris);
    push_list_row(&mut details, "Contact", &client.contacts);

    let state = escape_html(encoded_state);

    format!(
        r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>{client_name} | Authorization Request</title>
    <style>
      body {{ font-family: system-ui, -apple-system, Segoe UI, Roboto, sans-serif; padding: 2rem; max-width: 560px; margin: 0 auto; color: #222; }}
      .card {{ border: 1px solid #ddd; border-radius: 12px; padding: 1.25rem; }}
      .description {{ color: #555; }}
      .row {{ display: flex; margin-top: 0.5rem; }}
      .label {{ font-weight: 600; min-width: 9rem; }}
      .value {{ word-break: break-all; }}
      .actions {{ display: flex; gap: 0.75rem; margin-top: 1.25rem; }}
      button {{ flex: 1; padding: 0.7rem; border-radius: 10px; font-weight: 700; cursor: pointer; }}
      .approve {{ border: 0; background: #111; color: #fff; }}
      .cancel {{ border: 1px solid #ccc; background: #fff; color: #111; }}
    </style>
  </head>
  <body>
    <h1>{server_name}</h1>
    {description}
    <div class="card">
      <h2>{client_name} is requesting access</h2>
      {details}
      <p>This MCP client is requesting to be authorized on {server_name}. If you approve, you will be redirected to complete authentication.</p>
      <form method="post" action="/authorize">
        <input type="hidden" name="state" value="{state}" />
        <div class="actions">
          <button type="button" class="cancel" onclick="window.history.back()">Cancel</button>
          <button type="submit" class="approve">Approve</button>
        </div>
      </form>
    </div>
  </body>
</html>"#
    )
}

fn push_link_row(out: &mut String, label: &str, uri: Option<&str>) {
    let Some(raw) = uri.filter(|u| !u.is_empty()) else {
        return;
    };
    let text = escape_html(raw);
    // Only web URLs become links; anything else (javascript:, data:) is shown as text.
    let value = if is_web_url(raw) {
        format!(r#"<a href="{text}" target="_blank" rel="noopener noreferrer">{text}</a>"#)
    } else {
        text
    };
    out.push_str(&format!(
        r#"<div class="row"><span class="label">{label}:</span><span class="value">{value}</span></div>"#
    ));
}

fn is_web_url(raw: &str) -> bool {
    Url::parse(raw).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}

fn push_list_row(out: &mut String, label: &str, values: &[String]) {
    if values.is_empty() {
        return;
    }
    let joined = values
        .iter()
        .map(|v| escape_html(v))
        .collect::<Vec<_>>()
        .join("<br />");
    out.push_str(&format!(
        r#"<div class="row"><span class="label">{label}:</span><span class="value">{joined}</span></div>"#
    ));
}
