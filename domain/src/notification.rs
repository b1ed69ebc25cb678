use std::fmt::Display;

pub const USER_PLACEHOLDER: &str = "{user}";

pub fn render_message(template: &str, author_login: &str) -> String {
    template.replace(USER_PLACEHOLDER, author_login)
}

pub fn normalize_message(message: &str) -> String {
    message
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NotificationKey {
    pub pr_number: u64,
    pub message: String,
}

impl NotificationKey {
    pub fn new(pr_number: u64, message: &str) -> Self {
        Self {
            pr_number,
            message: normalize_message(message),
        }
    }
}

impl Display for NotificationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}: {}", self.pr_number, self.message)
    }
}
