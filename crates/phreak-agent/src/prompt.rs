//! Browse prompt rendering
//!
//! Pure template substitution: nothing here talks to the browser or the planner.

use phreak_core::PlannerSettings;

const BROWSE_TEMPLATE: &str = include_str!("browse_prompt.txt");

/// The fixed parts of every browse prompt for one session
#[derive(Debug, Clone)]
pub struct BrowsePrompt {
    scoped_domain: String,
    credentials: Option<String>,
    url_limit: usize,
    content_limit: usize,
}

impl BrowsePrompt {
    pub fn new(scoped_domain: impl Into<String>, settings: &PlannerSettings) -> Self {
        Self {
            scoped_domain: scoped_domain.into(),
            credentials: settings.credentials.clone(),
            url_limit: settings.url_limit,
            content_limit: settings.content_limit,
        }
    }

    /// Fill the template for one capture
    ///
    /// `current_url` and `serialized_elements` are truncated to the configured limits.
    pub fn render(
        &self,
        previous_command: &str,
        current_url: &str,
        serialized_elements: &str,
    ) -> String {
        let credentials = self
            .credentials
            .as_deref()
            .map(|c| format!("CREDENTIALS: {}\n", c))
            .unwrap_or_default();

        fill(
            BROWSE_TEMPLATE,
            &[
                (
                    "browser_content",
                    truncate_chars(serialized_elements, self.content_limit),
                ),
                ("scoped_domain", &self.scoped_domain),
                ("url", truncate_chars(current_url, self.url_limit)),
                ("credentials", &credentials),
                ("previous_command", previous_command),
            ],
        )
    }
}

/// The first `limit` characters of `s`
pub fn truncate_chars(s: &str, limit: usize) -> &str {
    match s.char_indices().nth(limit) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

/// Replace `{name}` placeholders in one pass, so substituted values are never rescanned
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let replaced = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });

        match replaced {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
