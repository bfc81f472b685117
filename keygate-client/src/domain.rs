/// Whether `hostname` is `localhost` or a [valid domain].
///
/// A valid domain is made of dot separated labels of ASCII letters and digits, where hyphens may
/// only appear between two such characters, and ends with a label of at least two letters.
/// Comparison is case insensitive. IP addresses are not valid domains.
///
/// [valid domain]: https://url.spec.whatwg.org/#valid-domain
pub fn is_valid_domain(hostname: &str) -> bool {
    if hostname == "localhost" {
        return true;
    }

    let Some((labels, tld)) = hostname.rsplit_once('.') else {
        return false;
    };

    tld.len() >= 2
        && tld.bytes().all(|b| b.is_ascii_alphabetic())
        && labels.split('.').all(is_valid_label)
}

fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label.split('-').all(|part| {
            !part.is_empty() && part.bytes().all(|b| b.is_ascii_alphanumeric())
        })
}
