//! Domain name helpers

use crate::error::{Error, Result};

/// Derive the zone name for a record name
///
/// The zone is taken to be the last two dot-separated labels, so
/// `home.example.com` maps to `example.com`. This does not consult the
/// public suffix list: `home.example.co.uk` maps to `co.uk`, which will not
/// match any zone. A trailing root dot is ignored.
pub fn root_domain(domain: &str) -> Result<String> {
    let domain = domain.trim().trim_end_matches('.');
    let labels: Vec<&str> = domain.split('.').collect();

    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(Error::invalid_input(format!(
            "Invalid domain name: {domain}"
        )));
    }

    Ok(labels[labels.len() - 2..].join("."))
}
