use press_article::{decode, encode, ArticleDocument, FrontMatter};
use press_types::ArticleSlug;
use proptest::prelude::*;

fn front_matter() -> impl Strategy<Value = FrontMatter> {
    (
        "\\PC{0,30}",
        "[A-Za-zñáé \"\\\\:'#-]{0,20}",
        "[0-9]{2}-[0-9]{2}-[0-9]{4}",
    )
        .prop_map(|(title, category, date)| FrontMatter {
            title,
            category,
            date,
        })
}

proptest! {
    /// Fields written by `encode` come back unchanged, whatever they contain.
    #[test]
    fn fields_survive_encoding(front in front_matter(), body in "\\PC{0,80}") {
        let decoded = decode(&encode(&front, &body));
        prop_assert_eq!(decoded.front_matter, front);
    }

    /// Re-encoding a decoded file is a fixed point.
    #[test]
    fn encoding_is_stable(front in front_matter(), body in "(\\PC|\n){0,120}") {
        let once = encode(&front, &body);
        let decoded = decode(&once);
        let twice = encode(&decoded.front_matter, &decoded.body);
        prop_assert_eq!(&twice, &once);
        prop_assert!(once.ends_with('\n'));
        prop_assert!(!once.ends_with("\n\n") || body.trim().is_empty());
    }
}

#[test]
fn document_round_trip() {
    let slug = ArticleSlug::parse("ciclo-menstrual-101").unwrap();
    let doc = ArticleDocument::new(
        slug.clone(),
        FrontMatter {
            title: "Ciclo Menstrual 101".into(),
            category: "Ciclo".into(),
            date: "05-03-2025".into(),
        },
        "Hola ![x](/images/ciclo-menstrual-101/abc.png)\n",
    );
    let text = doc.to_text();
    let back = ArticleDocument::from_text(slug, &text);
    assert_eq!(back, doc);
}

#[test]
fn documents_serialize_for_the_admin_api() {
    let slug = ArticleSlug::parse("hola").unwrap();
    let doc = ArticleDocument::from_text(slug, "---\ntitle: \"Hola\"\n---\n\nx\n");
    let json = serde_json::to_value(&doc).unwrap();
    assert_eq!(json["slug"], "hola");
    assert_eq!(json["title"], "Hola");
    assert_eq!(json["category"], "");
    assert_eq!(json["body"], "x\n");
}
