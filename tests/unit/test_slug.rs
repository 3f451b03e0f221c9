use slidecourse::utils::slug::{generate_slug, is_valid_slug};

/// A generated slug must always satisfy the slug shape: lowercase
/// alphanumeric runs joined by single hyphens
fn assert_slug_shape(slug: &str) {
    assert!(!slug.is_empty(), "slug must be non-empty");
    assert!(slug.len() <= 64, "slug too long: {slug}");
    assert!(
        slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
        "unexpected character in slug: {slug}"
    );
    assert!(!slug.starts_with('-') && !slug.ends_with('-'), "bad boundary: {slug}");
    assert!(!slug.contains("--"), "separator run survived: {slug}");
}

#[test]
fn test_generate_slug_is_total() {
    let inputs = [
        "",
        " ",
        "Hello World",
        "О компании",
        "日本",
        "!!!***",
        "a.b_c d-e",
        "C# & F# @ work",
        "--- --- ---",
        "ĄĘŻÓŁĆ gżegżółka",
        "emoji 🎉 title",
        "x",
    ];
    for input in inputs {
        assert_slug_shape(&generate_slug(input));
    }
}

#[test]
fn test_generate_slug_known_values() {
    assert_eq!(generate_slug("О компании"), "o-kompanii");
    assert_eq!(generate_slug("Hello World"), "hello-world");
    assert_eq!(generate_slug("web.development_course"), "web-development-course");
}

#[test]
fn test_generate_slug_is_deterministic_for_mappable_input() {
    assert_eq!(generate_slug("Some Title"), generate_slug("Some Title"));
}

#[test]
fn test_generate_slug_fallback_is_timestamped() {
    assert!(generate_slug("").starts_with("lecture-"));
    assert!(generate_slug("日本").starts_with("lecture-"));
}

#[test]
fn test_generate_slug_truncates_without_trailing_separator() {
    let slug = generate_slug(&"word ".repeat(40));
    assert!(slug.len() <= 64);
    assert!(!slug.ends_with('-'));
}

#[test]
fn test_is_valid_slug_boundaries() {
    assert!(is_valid_slug("a"));
    assert!(is_valid_slug("Z"));
    assert!(is_valid_slug("lecture-1"));
    assert!(is_valid_slug("a1-b2-c3"));
    assert!(is_valid_slug("a--b")); // interior runs are allowed, only boundaries matter

    assert!(!is_valid_slug(""));
    assert!(!is_valid_slug("-a"));
    assert!(!is_valid_slug("a-"));
    assert!(!is_valid_slug("has space"));
    assert!(!is_valid_slug("под-капотом"));
}
