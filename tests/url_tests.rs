//! Black-box URL parsing tests against the public API.

use lb::Url;

#[test]
fn s5_parses_every_field_of_a_fully_specified_url() {
    let u = Url::parse("https://www.example.co.uk:443/blog/article/search?docid=720&hl=en#dayone")
        .unwrap();
    assert_eq!(u.protocol(), "https");
    assert_eq!(u.hostname(), "www.example.co.uk");
    assert_eq!(u.port(), "443");
    assert_eq!(u.path(), "/blog/article/search");
    assert_eq!(u.query(), "docid=720&hl=en");
    assert_eq!(u.fragment(), "dayone");
}

#[test]
fn property_round_trip_for_canonical_urls() {
    let samples = [
        "http://example.com:80/",
        "https://api.internal:443/v1/things?x=1",
        "ftp://files.example.com:21/pub",
    ];
    for s in samples {
        let u = Url::parse(s).unwrap();
        assert_eq!(u.to_canonical_string(), s);
    }
}
