use crate::UrlError;
use url::Url;

/// Canonicalizes a raw reference against the page it was found on
///
/// Every link the extractors mine goes through this function before it can reach
/// the frontier, so two spellings of the same resource always collapse to one
/// canonical form.
///
/// # Canonicalization Steps
///
/// 1. Trim surrounding whitespace (markup attributes frequently carry it)
/// 2. Resolve against `base` per RFC 3986: relative paths, `.`/`..` segments,
///    scheme-relative `//host/...` forms
/// 3. Lowercase scheme and host, drop default ports (done by the resolver)
/// 4. Reject anything that is not `http` or `https` — this is where
///    `javascript:`, `mailto:`, `tel:` and `data:` references fall out
/// 5. Strip the fragment
///
/// The function is pure and idempotent: feeding a canonical URL back in returns
/// it unchanged.
///
/// # Arguments
///
/// * `raw` - The reference as it appeared in the resource
/// * `base` - The URL of the resource it was found on
///
/// # Returns
///
/// * `Ok(Url)` - Canonical absolute URL
/// * `Err(UrlError)` - The reference is malformed or out of protocol; callers
///   drop the link and keep going
///
/// # Examples
///
/// ```
/// use harrow::url::canonicalize;
/// use url::Url;
///
/// let base = Url::parse("http://example.com/a/").unwrap();
/// let url = canonicalize("../b", &base).unwrap();
/// assert_eq!(url.as_str(), "http://example.com/b");
/// ```
pub fn canonicalize(raw: &str, base: &Url) -> Result<Url, UrlError> {
    let raw = raw.trim();

    // Steps 2 & 3: RFC 3986 resolution against the base
    let mut url = base
        .join(raw)
        .map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?;

    // Step 4: protocol gate
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::UnsupportedScheme(url.scheme().to_string()));
    }

    // Step 5: fragments never reach the frontier
    url.set_fragment(None);

    Ok(url)
}

/// Canonicalizes an absolute URL with no base, as used for seeds
///
/// Same scheme and fragment rules as [`canonicalize`], but relative references
/// are an error: a seed has nothing to be resolved against.
pub fn canonicalize_absolute(raw: &str) -> Result<Url, UrlError> {
    let raw = raw.trim();

    let mut url = Url::parse(raw).map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::UnsupportedScheme(url.scheme().to_string()));
    }

    url.set_fragment(None);

    Ok(url)
}
