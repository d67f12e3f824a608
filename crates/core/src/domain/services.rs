// Service list normalization

/// Trim every item and drop the empty ones
pub fn normalize_services<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Split a comma-separated service description ("Cut, Shave") into items
pub fn split_service_list(raw: &str) -> Vec<String> {
    normalize_services(raw.split(','))
}
