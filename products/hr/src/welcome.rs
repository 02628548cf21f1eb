use platform_mail::Email;

pub const WELCOME_SUBJECT: &str = "Welcome to the company";

/// Renders the welcome message for a newly created employee.
pub fn welcome_email(to: &str, first_name: &str, last_name: &str, position: &str) -> Email {
    let name = format!("{first_name} {last_name}");
    let html = format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <body>\n\
         <h1>Welcome, {name}!</h1>\n\
         <p>We are glad to have you on board as <strong>{position}</strong>.</p>\n\
         <p>You can now sign in with this email address to manage your profile.</p>\n\
         </body>\n\
         </html>\n",
        name = escape_html(&name),
        position = escape_html(position),
    );
    let text = format!(
        "Welcome, {name}!\n\n\
         We are glad to have you on board as {position}.\n\
         You can now sign in with this email address to manage your profile.\n"
    );
    Email {
        to: to.to_string(),
        subject: WELCOME_SUBJECT.to_string(),
        html,
        text,
    }
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
