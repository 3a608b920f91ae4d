use std::env;

/// Helper function to get environment variable with a default value
pub fn get_env_or_default(key: &str, default_value: &str) -> String {
    non_blank(env::var(key).ok()).unwrap_or_else(|| default_value.to_string())
}

/// Reads an optional environment variable, treating blank values as unset
pub fn get_env_opt(key: &str) -> Option<String> {
    non_blank(env::var(key).ok())
}

/// Pipeline inputs arrive as empty strings when the user leaves them out.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
