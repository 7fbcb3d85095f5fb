// src/utils/slug.rs

use rand::Rng;

const SUFFIX_LEN: usize = 6;
/// 36^6, the number of distinct suffixes.
const SUFFIX_SPACE: u64 = 2_176_782_336;
const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Transliterates the title to ASCII, lowercases it and joins the words
/// with single hyphens.
pub fn slugify(title: &str) -> String {
    let slug = ::slug::slugify(title);

    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}

/// Builds an article slug: `slugify(title)` plus a random base-36 suffix.
pub fn article_slug(title: &str) -> String {
    let n = rand::rng().random_range(0..SUFFIX_SPACE);
    format!("{}-{}", slugify(title), base36(n))
}

/// Fixed-width (zero padded) base-36 rendering of `n`.
fn base36(mut n: u64) -> String {
    let mut out = [b'0'; SUFFIX_LEN];
    for slot in out.iter_mut().rev() {
        *slot = ALPHABET[(n % 36) as usize];
        n /= 36;
    }
    out.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_lowercases_and_hyphenates() {
        assert_eq!(slugify("How to Train Your Dragon"), "how-to-train-your-dragon");
        assert_eq!(slugify("  Hello,   World!!  "), "hello-world");
        assert_eq!(slugify("Rust 2024: what's new?"), "rust-2024-what-s-new");
    }

    #[test]
    fn slugify_transliterates_non_ascii() {
        assert_eq!(slugify("Café au lait"), "cafe-au-lait");
        assert_eq!(slugify("Привет мир"), "privet-mir");
        assert_eq!(slugify("Über Straße"), "uber-strasse");
    }

    #[test]
    fn slugify_falls_back_when_nothing_is_left() {
        assert_eq!(slugify("!!!"), "untitled");
        assert_eq!(slugify("   "), "untitled");
        assert_eq!(slugify(""), "untitled");
    }

    #[test]
    fn base36_is_zero_padded() {
        assert_eq!(base36(0), "000000");
        assert_eq!(base36(35), "00000z");
        assert_eq!(base36(36), "000010");
        assert_eq!(base36(SUFFIX_SPACE - 1), "zzzzzz");
    }

    #[test]
    fn article_slug_has_random_suffix() {
        let slug = article_slug("Coffee & Dragons");
        let (base, suffix) = slug.rsplit_once('-').unwrap();

        assert_eq!(base, "coffee-dragons");
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(suffix.bytes().all(|b| ALPHABET.contains(&b)));
        assert_eq!(slug, slug.to_lowercase());
    }

    #[test]
    fn article_slugs_rarely_collide() {
        let slugs: std::collections::HashSet<_> =
            (0..200).map(|_| article_slug("same title")).collect();
        assert!(slugs.len() > 190);
    }
}
