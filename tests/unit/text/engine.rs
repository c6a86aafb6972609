use super::*;

#[test]
fn fixed_advance_counts_chars_not_bytes() {
    let mut m = FixedAdvance { advance_em: 0.5 };
    assert_eq!(m.measure("HELLO", None, 48.0), 120.0);
    assert_eq!(m.measure("été", None, 10.0), 15.0);
    assert_eq!(m.measure("", None, 48.0), 0.0);
}

#[test]
fn font_book_resolution_order() {
    let mut book = FontBook::new();
    assert!(book.resolve(Some("Any")).is_none());

    book.insert("TuskerGrotesk", vec![1]);
    book.insert("HelveticaBoldExtended", vec![2]);
    assert_eq!(book.resolve(None).unwrap().0, "TuskerGrotesk");

    book.set_default("HelveticaBoldExtended");
    assert_eq!(book.resolve(None).unwrap().0, "HelveticaBoldExtended");
    assert_eq!(book.resolve(Some("tuskergrotesk")).unwrap().0, "TuskerGrotesk");
    assert_eq!(book.resolve(Some("Missing")).unwrap().0, "HelveticaBoldExtended");
}

#[test]
fn font_book_scans_only_font_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("A.ttf"), b"a").unwrap();
    std::fs::write(dir.path().join("B.OTF"), b"b").unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"c").unwrap();
    let book = FontBook::from_dir(dir.path()).unwrap();
    assert_eq!(book.resolve(Some("A")).unwrap().1.as_slice(), b"a");
    assert_eq!(book.resolve(Some("B")).unwrap().1.as_slice(), b"b");
    assert!(book.resolve(Some("notes")).unwrap().0 != "notes");
}

#[test]
fn engine_without_fonts_measures_zero() {
    let mut engine = TextEngine::new(FontBook::new());
    assert_eq!(engine.measure("HELLO", None, 48.0), 0.0);
    assert!(engine.shape("HELLO", None, 48.0).is_err());
}

#[test]
fn engine_rejects_bad_sizes() {
    let mut book = FontBook::new();
    book.insert("X", vec![0; 4]);
    let mut engine = TextEngine::new(book);
    assert!(engine.shape("a", None, 0.0).is_err());
    assert!(engine.shape("a", None, f32::NAN).is_err());
}
