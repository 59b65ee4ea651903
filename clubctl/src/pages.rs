//! Static HTML pages for the browser-facing confirmation endpoint.
//!
//! The confirmation links land in a chat app, so these pages have to stand
//! on their own: no assets, inline styles, one message per page.

fn page(title: &str, heading: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; background: #f5f5f5; }}
        .container {{ max-width: 480px; margin: 60px auto; padding: 32px; background: #fff; border-radius: 8px; }}
        h2 {{ margin-top: 0; }}
        .footer {{ margin-top: 30px; font-size: 12px; color: #666; }}
    </style>
</head>
<body>
    <div class="container">
        <h2>{heading}</h2>

        {body}

        <div class="footer">
            <p>This is an automated page; you can close it now.</p>
        </div>
    </div>
</body>
</html>"#
    )
}

pub fn confirmed(class_name: &str, club_name: &str) -> String {
    page(
        "Spot confirmed",
        "You're in! 🎾",
        &format!(
            "<p>Your spot in <strong>{class_name}</strong> at {club_name} is confirmed.</p>\
             <p>See you in class!</p>"
        ),
    )
}

pub fn declined(class_name: &str) -> String {
    page(
        "Spot declined",
        "No problem",
        &format!(
            "<p>You passed on the spot in <strong>{class_name}</strong>.</p>\
             <p>The next person on the waitlist has been notified. You stay eligible for future openings.</p>"
        ),
    )
}

pub fn expired() -> String {
    page(
        "Offer expired",
        "This offer has expired",
        "<p>The window to claim this spot has closed, or the offer was already used.</p>\
         <p>Keep an eye on the group chat for the next opening.</p>",
    )
}

pub fn class_full(class_name: &str) -> String {
    page(
        "Class full",
        "Someone beat you to it",
        &format!(
            "<p><strong>{class_name}</strong> filled up before you confirmed.</p>\
             <p>You stay on the waitlist and will be notified when another spot opens.</p>"
        ),
    )
}

pub fn not_found() -> String {
    page(
        "Not found",
        "We couldn't find that offer",
        "<p>The link may be incomplete or the offer may have been removed.</p>",
    )
}

pub fn bad_request() -> String {
    page(
        "Invalid link",
        "Invalid link",
        "<p>This link is missing information. Please use the link from your message exactly as sent.</p>",
    )
}

pub fn internal_error() -> String {
    page(
        "Something went wrong",
        "Something went wrong",
        "<p>We couldn't process your request. Please try again in a moment.</p>",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_embed_class_details() {
        let html = confirmed("Monday Padel 18:00", "Club Norte");
        assert!(html.contains("Monday Padel 18:00"));
        assert!(html.contains("Club Norte"));
        assert!(html.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn test_decline_mentions_cascade() {
        let html = declined("Monday Padel 18:00");
        assert!(html.contains("next person on the waitlist"));
    }
}
