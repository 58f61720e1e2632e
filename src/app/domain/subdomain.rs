use validator::ValidationError;

/// Reserved labels that can never be claimed as tenant subdomains.
const RESERVED: &[&str] = &["www", "app", "api", "admin", "mail", "static", "assets"];

/// Subdomain domain type. Once constructed, guaranteed to be a valid,
/// lowercase DNS label that is not a reserved platform name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subdomain(String);

impl Subdomain {
    /// Create a new Subdomain from a string. Trims, lowercases, and validates
    /// the DNS label rules (1-63 chars, alphanumeric and hyphens, no leading
    /// or trailing hyphen).
    pub fn new(subdomain: String) -> Result<Self, ValidationError> {
        let normalized = subdomain.trim().to_lowercase();

        if normalized.is_empty() || normalized.len() > 63 {
            let mut error = ValidationError::new("invalid_subdomain_length");
            error.message = Some("Subdomain must be between 1 and 63 characters".into());
            return Err(error);
        }

        let valid_chars = normalized
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !valid_chars || normalized.starts_with('-') || normalized.ends_with('-') {
            let mut error = ValidationError::new("invalid_subdomain");
            error.message =
                Some("Subdomain may only contain letters, digits, and inner hyphens".into());
            return Err(error);
        }

        if RESERVED.contains(&normalized.as_str()) {
            let mut error = ValidationError::new("reserved_subdomain");
            error.message = Some("That subdomain is reserved".into());
            return Err(error);
        }

        Ok(Self(normalized))
    }

    /// Get the subdomain as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Subdomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
