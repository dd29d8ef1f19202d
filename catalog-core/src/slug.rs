//! Slug generation

/// Slug used when a name has no ASCII letters or digits
pub const FALLBACK_SLUG: &str = "category";

/// URL-safe slug: ASCII lower-case, runs of anything else collapse to `-`
pub fn slugify(name: &str) -> String {
    let slug = name
        .to_ascii_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// Slug for `name` that collides with none of `existing` (`-2`, `-3`, ... appended)
pub fn unique_slug<S: AsRef<str>>(name: &str, existing: &[S]) -> String {
    let base = slugify(name);
    let taken = |candidate: &str| existing.iter().any(|s| s.as_ref() == candidate);

    if !taken(&base) {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{base}-{n}");
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Phones & Tablets"), "phones-tablets");
        assert_eq!(slugify("  USB-C  Cables "), "usb-c-cables");
        assert_eq!(slugify("4K TVs"), "4k-tvs");
        assert_eq!(slugify("Café"), "caf");
    }

    #[test]
    fn test_slugify_empty_falls_back() {
        assert_eq!(slugify(""), "category");
        assert_eq!(slugify("手机"), "category");
    }

    #[test]
    fn test_unique_slug_appends_counter() {
        assert_eq!(unique_slug::<&str>("Phones", &[]), "phones");
        assert_eq!(unique_slug("Phones", &["phones"]), "phones-2");
        assert_eq!(unique_slug("Phones", &["phones", "phones-2", "phones-3"]), "phones-4");
    }
}
