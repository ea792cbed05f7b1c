use crate::errors::DomainError;

const MAX_DOMAIN_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// Validate and normalize a target domain.
///
/// Returns the lower-cased name without trailing dot. Requires at least two
/// labels; labels are letters, digits, hyphens and underscores and never
/// start or end with a hyphen.
pub fn validate_domain(input: &str) -> Result<String, DomainError> {
    let domain = input.trim().trim_end_matches('.').to_lowercase();

    if domain.is_empty() {
        return Err(DomainError::InvalidDomainName("empty domain".into()));
    }
    if domain.len() > MAX_DOMAIN_LEN {
        return Err(DomainError::InvalidDomainName(format!(
            "'{}' exceeds {} characters",
            input, MAX_DOMAIN_LEN
        )));
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return Err(DomainError::InvalidDomainName(format!(
            "'{}' is not a fully qualified domain",
            input
        )));
    }

    for label in &labels {
        if label.is_empty() || label.len() > MAX_LABEL_LEN {
            return Err(DomainError::InvalidDomainName(format!(
                "'{}' has an empty or oversized label",
                input
            )));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(DomainError::InvalidDomainName(format!(
                "label '{}' starts or ends with a hyphen",
                label
            )));
        }
        if !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(DomainError::InvalidDomainName(format!(
                "label '{}' contains invalid characters",
                label
            )));
        }
    }

    Ok(domain)
}

/// Pull the host out of a URL-ish string and validate it as a domain.
///
/// Accepts bare domains as well as `scheme://user@host:port/path?query`.
pub fn extract_domain(input: &str) -> Result<String, DomainError> {
    let mut rest = input.trim();
    if let Some(idx) = rest.find("://") {
        rest = &rest[idx + 3..];
    }
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    rest = &rest[..end];
    if let Some(idx) = rest.rfind('@') {
        rest = &rest[idx + 1..];
    }
    if let Some(idx) = rest.rfind(':') {
        if rest[idx + 1..].chars().all(|c| c.is_ascii_digit()) {
            rest = &rest[..idx];
        }
    }
    validate_domain(rest)
}

/// Make a string safe to use as a file name.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_matches('.');
    if trimmed.is_empty() {
        "report".to_string()
    } else {
        trimmed.chars().take(200).collect()
    }
}
