use exporter_core::{padded_token, NamingError, NamingPolicy, PageKey, MAX_PAGE_NUMBER};
use pretty_assertions::assert_eq;

#[test]
fn tokens_are_two_digits() {
    assert_eq!(padded_token(1).as_deref(), Ok("01"));
    assert_eq!(padded_token(9).as_deref(), Ok("09"));
    assert_eq!(padded_token(10).as_deref(), Ok("10"));
    assert_eq!(padded_token(99).as_deref(), Ok("99"));
    assert_eq!(
        padded_token(100),
        Err(NamingError::MarkerOutOfRange { number: 100 })
    );
}

#[test]
fn string_order_is_numeric_order() {
    let naming = NamingPolicy::new("one-piece");
    let mut names: Vec<String> = (1..=MAX_PAGE_NUMBER as usize)
        .rev()
        .map(|index| {
            naming
                .file_name("1070", PageKey::DomIndex(index - 1))
                .unwrap()
        })
        .collect();
    names.sort();

    for (position, name) in names.iter().enumerate() {
        assert_eq!(name, &format!("one-piece-1070-{:02}.jpg", position + 1));
    }
}

#[test]
fn url_key_uses_trailing_number() {
    let naming = NamingPolicy::new("one-piece");
    assert_eq!(
        naming.file_name(
            "1070",
            PageKey::SourceUrl("https://cdn.example/one-piece-1070-7.jpg")
        ),
        Ok("one-piece-1070-07.jpg".to_string())
    );
    assert_eq!(
        naming.file_name("1070", PageKey::SourceUrl("https://cdn.example/cover.jpg")),
        Err(NamingError::MissingMarker {
            identifier: "https://cdn.example/cover.jpg".to_string()
        })
    );
}
