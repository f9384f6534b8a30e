use url::Url;

fn origin_label(app_origin: &str) -> String {
    Url::parse(app_origin)
        .ok()
        .and_then(|url| url.host_str().map(|host| host.to_string()))
        .unwrap_or_else(|| app_origin.to_string())
}

pub fn primary_button(url: &str, label: &str) -> String {
    format!(
        r#"<a href="{url}" style="display:inline-block;padding:12px 18px;background-color:#111827;color:#ffffff;text-decoration:none;border-radius:8px;font-weight:600;">{label}</a>"#
    )
}

/// Subject and HTML body of the email sent after a first-time signup.
pub fn welcome_email(product_name: &str, app_origin: &str) -> (String, String) {
    let subject = format!("You're on the {} waitlist", product_name);
    let headline = "Thanks for joining the waitlist";
    let lead = format!(
        "You're now on the waitlist for <strong>{}</strong>. We'll let you know as soon as your spot opens up.",
        product_name
    );
    let button = primary_button(app_origin, &format!("Visit {}", product_name));
    let body = format!(
        r#"{button}<p style="margin:12px 0 0;color:#374151;">There's nothing else you need to do for now. Stay tuned!</p>"#
    );
    let reason = format!("you joined the {} waitlist", product_name);

    let html = wrap_email(product_name, app_origin, headline, &lead, &body, &reason);
    (subject, html)
}

pub fn wrap_email(
    product_name: &str,
    app_origin: &str,
    headline: &str,
    lead: &str,
    body_html: &str,
    reason: &str,
) -> String {
    let origin = origin_label(app_origin);
    let reason_label = "Why you got this email";
    let ignore_line = "If you didn't sign up, you can safely ignore it.";

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <body style="background:#f8fafc;margin:0;padding:24px;font-family:Arial,Helvetica,sans-serif;">
    <div style="max-width:560px;margin:0 auto;background:#ffffff;border:1px solid #e5e7eb;border-radius:12px;padding:24px;box-shadow:0 8px 30px rgba(0,0,0,0.04);">
      <div style="font-size:12px;letter-spacing:0.08em;text-transform:uppercase;color:#6b7280;">{brand} - {origin}</div>
      <h1 style="margin:12px 0 8px;font-size:22px;color:#111827;">{headline}</h1>
      <p style="margin:0 0 12px;font-size:15px;color:#111827;line-height:1.6;">{lead}</p>
      {body_html}
      <div style="margin-top:20px;padding-top:16px;border-top:1px solid #e5e7eb;">
        <p style="margin:0 0 6px;font-size:13px;color:#4b5563;">{reason_label}: {reason}.</p>
        <p style="margin:0;font-size:13px;color:#4b5563;">{ignore_line}</p>
      </div>
    </div>
  </body>
</html>
"#,
        brand = product_name,
        origin = origin,
        headline = headline,
        lead = lead,
        body_html = body_html,
        reason = reason,
        reason_label = reason_label,
        ignore_line = ignore_line,
    )
}
