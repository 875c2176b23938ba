//! Utility functions.

/// Escape text for Telegram HTML captions.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Mention link for a user, e.g. in greetings.
pub fn mention_html(user_id: i64, first_name: &str) -> String {
    format!("<a href=\"tg://user?id={}\">{}</a>", user_id, html_escape(first_name))
}

/// Split command arguments on whitespace, dropping empties.
pub fn split_args(args: &str) -> Vec<&str> {
    args.split_whitespace().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("<b>Tom & Jerry</b>"), "&lt;b&gt;Tom &amp; Jerry&lt;/b&gt;");
        assert_eq!(
            mention_html(7, "A<B"),
            "<a href=\"tg://user?id=7\">A&lt;B</a>"
        );
    }

    #[test]
    fn test_split_args() {
        assert_eq!(split_args("  41   naru "), vec!["41", "naru"]);
        assert!(split_args("").is_empty());
    }
}
