use std::sync::Arc;

use bytes::Bytes;
use press_images::{extract_referenced_filenames, ImageManifest, ImagePlaceholder, PendingEdit};
use press_publish::{ArticleInput, ConflictKind, PublishError, Publisher};
use press_store::{ContentStore, InMemoryContentStore, RemoteStep};
use press_types::ArticleSlug;
use tokio::sync::Barrier;

const HOLA: &str = "---\ntitle: \"Hola\"\ncategory: \"Ciclo\"\ndate: \"01-02-2024\"\n---\n\n\
                    Intro ![a](/images/hola/a.png) ![b](/images/hola/b.jpg)\n";

fn seeded() -> Arc<InMemoryContentStore> {
    Arc::new(InMemoryContentStore::new("main").with_files([
        ("articles/hola.md", HOLA.as_bytes()),
        ("public/images/hola/a.png", b"A".as_slice()),
        ("public/images/hola/b.jpg", b"B".as_slice()),
        ("public/images/hola/c.gif", b"C".as_slice()),
        ("README.md", b"blog".as_slice()),
    ]))
}

fn publisher(store: &Arc<InMemoryContentStore>) -> Publisher {
    let store: Arc<dyn ContentStore> = store.clone();
    Publisher::new(store)
}

fn image(id: &str, ext: &str) -> ImagePlaceholder {
    ImagePlaceholder::new(id, ext).unwrap()
}

fn text_at(store: &InMemoryContentStore, path: &str) -> Option<String> {
    store
        .file_at_head(path)
        .unwrap()
        .map(|bytes| String::from_utf8(bytes.to_vec()).unwrap())
}

// ---- create ----

#[tokio::test]
async fn create_resolves_placeholders_and_stores_images() {
    let store = Arc::new(InMemoryContentStore::new("main"));
    let edit = PendingEdit::empty().with_image(image("abc", "png"), vec![0x89u8, b'P', b'N', b'G']);

    let receipt = publisher(&store)
        .create(
            ArticleInput::new("Ciclo Menstrual 101", "Ciclo", "Hola ![x](__image:abc__)"),
            &edit,
        )
        .await
        .unwrap();

    assert_eq!(receipt.slug.as_str(), "ciclo-menstrual-101");
    assert_eq!(receipt.path, "articles/ciclo-menstrual-101.md");
    assert_eq!(store.head().unwrap(), receipt.commit);
    assert_eq!(
        store.commit_message(&receipt.commit).unwrap().as_deref(),
        Some("Add article: ciclo-menstrual-101")
    );

    let markdown = text_at(&store, "articles/ciclo-menstrual-101.md").unwrap();
    assert!(markdown.contains("/images/ciclo-menstrual-101/abc.png"));
    assert!(!markdown.contains("__image:"));
    assert!(markdown.starts_with("---\ntitle: \"Ciclo Menstrual 101\"\ncategory: \"Ciclo\"\n"));
    assert_eq!(
        store
            .file_at_head("public/images/ciclo-menstrual-101/abc.png")
            .unwrap(),
        Some(Bytes::from_static(&[0x89, b'P', b'N', b'G']))
    );
}

#[tokio::test]
async fn create_drops_uploads_the_body_no_longer_references() {
    let store = Arc::new(InMemoryContentStore::new("main"));
    let edit = PendingEdit::empty()
        .with_image(image("kept", "png"), vec![1u8])
        .with_image(image("pasted", "gif"), vec![2u8]);

    let receipt = publisher(&store)
        .create(ArticleInput::new("Dos", "Notas", "![k](__image:kept__)"), &edit)
        .await
        .unwrap();

    assert_eq!(receipt.files_written, 2);
    assert!(store.file_at_head("public/images/dos/kept.png").unwrap().is_some());
    assert!(store.file_at_head("public/images/dos/pasted.gif").unwrap().is_none());
}

#[tokio::test]
async fn create_rejects_an_existing_slug_without_committing() {
    let store = seeded();
    let before = store.head().unwrap();

    let err = publisher(&store)
        .create(ArticleInput::new("Hola", "Otra", "cuerpo"), &PendingEdit::empty())
        .await
        .unwrap_err();

    assert_eq!(err.conflict_kind(), Some(ConflictKind::AlreadyExists));
    assert_eq!(store.head().unwrap(), before);
    assert!(!store.calls().contains(&RemoteStep::CreateBlob));
}

#[tokio::test]
async fn create_rejects_malformed_input_before_any_remote_call() {
    let store = Arc::new(InMemoryContentStore::new("main"));
    let publisher = publisher(&store);

    let cases = [
        ArticleInput::new("", "c", "b"),
        ArticleInput::new("t", "  ", "b"),
        ArticleInput::new("t", "c", "   "),
        ArticleInput::new("!!!", "c", "b"),
    ];
    for input in cases {
        let err = publisher.create(input, &PendingEdit::empty()).await.unwrap_err();
        assert!(matches!(err, PublishError::MalformedInput(_)), "{err}");
    }
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn create_requires_bytes_for_referenced_images() {
    let store = Arc::new(InMemoryContentStore::new("main"));
    let manifest: ImageManifest = [image("abc", "png")].into_iter().collect();

    let err = publisher(&store)
        .create(
            ArticleInput::new("Sin bytes", "c", "![x](__image:abc__)"),
            &PendingEdit::new(manifest),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, PublishError::MalformedInput(_)));
    assert!(err.to_string().contains("abc"));
    assert_eq!(store.commit_count().unwrap(), 1);
}

#[tokio::test]
async fn unknown_placeholders_stay_literal() {
    let store = Arc::new(InMemoryContentStore::new("main"));
    publisher(&store)
        .create(
            ArticleInput::new("Roto", "c", "![x](__image:nobody__)"),
            &PendingEdit::empty(),
        )
        .await
        .unwrap();

    let markdown = text_at(&store, "articles/roto.md").unwrap();
    assert!(markdown.contains("__image:nobody__"));
}

// ---- no partial publish ----

#[tokio::test]
async fn published_article_and_its_images_land_together() {
    let store = Arc::new(InMemoryContentStore::new("main"));
    let edit = PendingEdit::empty()
        .with_image(image("uno", "png"), vec![1u8])
        .with_image(image("dos", "jpg"), vec![2u8]);
    let input = ArticleInput::new("Par", "c", "![1](__image:uno__)\n\n![2](__image:dos__)");

    let publisher = publisher(&store);
    publisher.create(input, &edit).await.unwrap();

    let doc = publisher.read("par").await.unwrap().unwrap();
    let slug = ArticleSlug::parse("par").unwrap();
    let referenced = extract_referenced_filenames(&doc.body, &slug).unwrap();
    assert_eq!(
        referenced.into_iter().collect::<Vec<_>>(),
        vec!["dos.jpg", "uno.png"]
    );
    assert!(store.file_at_head("public/images/par/uno.png").unwrap().is_some());
    assert!(store.file_at_head("public/images/par/dos.jpg").unwrap().is_some());
}

#[tokio::test]
async fn nothing_is_visible_until_the_branch_moves() {
    for step in [
        RemoteStep::CreateBlob,
        RemoteStep::CreateTree,
        RemoteStep::CreateCommit,
        RemoteStep::UpdateBranch,
    ] {
        let store = Arc::new(InMemoryContentStore::new("main"));
        let before = store.head().unwrap();
        store.fail_on(step);
        let edit = PendingEdit::empty().with_image(image("uno", "png"), vec![1u8]);

        let err = publisher(&store)
            .create(ArticleInput::new("Par", "c", "![1](__image:uno__)"), &edit)
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::RemoteUnavailable(_)), "{step}: {err}");
        assert_eq!(store.head().unwrap(), before, "{step}");
        assert!(store.paths_at_head().unwrap().is_empty(), "{step}");
    }
}

// ---- read / list ----

#[tokio::test]
async fn read_returns_document_or_none() {
    let store = seeded();
    let publisher = publisher(&store);

    let doc = publisher.read("hola").await.unwrap().unwrap();
    assert_eq!(doc.title, "Hola");
    assert_eq!(doc.category, "Ciclo");
    assert_eq!(doc.date, "01-02-2024");
    assert!(doc.body.starts_with("Intro"));

    assert!(publisher.read("nadie").await.unwrap().is_none());
    assert!(matches!(
        publisher.read("Not A Slug").await,
        Err(PublishError::MalformedInput(_))
    ));
}

#[tokio::test]
async fn list_sorts_and_fills_blanks() {
    let store = Arc::new(InMemoryContentStore::new("main").with_files([
        ("articles/b.md", "---\ntitle: \"Beta\"\ncategory: \"Zeta\"\ndate: \"01-01-2024\"\n---\n\nx\n"),
        ("articles/a.md", "---\ntitle: \"Alfa\"\ncategory: \"Zeta\"\ndate: \"05-03-2025\"\n---\n\nx\n"),
        ("articles/sin-titulo.md", "sin front matter\n"),
        ("articles/notas.txt", "ignored"),
        ("articles/drafts/c.md", "nested"),
    ]));

    let summaries = publisher(&store).list().await.unwrap();
    let rows: Vec<_> = summaries
        .iter()
        .map(|s| (s.slug.as_str(), s.title.as_str(), s.category.as_str()))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("sin-titulo", "sin-titulo", "uncategorized"),
            ("a", "Alfa", "Zeta"),
            ("b", "Beta", "Zeta"),
        ]
    );
}

#[tokio::test]
async fn list_of_an_empty_repository_is_empty() {
    let store = Arc::new(InMemoryContentStore::new("main"));
    assert!(publisher(&store).list().await.unwrap().is_empty());
}

// ---- update ----

#[tokio::test]
async fn update_keeps_date_and_deletes_orphans() {
    let store = seeded();
    let edit = PendingEdit::empty().with_image(image("nuevo", "webp"), vec![9u8]);

    let receipt = publisher(&store)
        .update(
            "hola",
            ArticleInput::new("Hola otra vez", "Ciclo", "Solo ![a](/images/hola/a.png) ![n](__image:nuevo__)"),
            &edit,
        )
        .await
        .unwrap();

    assert_eq!(receipt.slug.as_str(), "hola");
    assert_eq!(receipt.files_written, 2);
    assert_eq!(receipt.files_deleted, 2);
    assert_eq!(
        store.commit_message(&receipt.commit).unwrap().as_deref(),
        Some("Update article: hola")
    );

    let markdown = text_at(&store, "articles/hola.md").unwrap();
    assert!(markdown.contains("title: \"Hola otra vez\""));
    assert!(markdown.contains("date: \"01-02-2024\""));
    assert!(markdown.contains("/images/hola/nuevo.webp"));

    let images: Vec<_> = store
        .paths_at_head()
        .unwrap()
        .into_iter()
        .filter(|p| p.starts_with("public/images/hola/"))
        .collect();
    assert_eq!(
        images,
        vec!["public/images/hola/a.png", "public/images/hola/nuevo.webp"]
    );
}

#[tokio::test]
async fn update_that_keeps_every_reference_deletes_nothing() {
    let store = seeded();
    let body = "![a](/images/hola/a.png) ![b](/images/hola/b.jpg) ![c](/images/hola/c.gif)";

    let receipt = publisher(&store)
        .update("hola", ArticleInput::new("Hola", "Ciclo", body), &PendingEdit::empty())
        .await
        .unwrap();

    assert_eq!(receipt.files_deleted, 0);
    for name in ["a.png", "b.jpg", "c.gif"] {
        let path = format!("public/images/hola/{name}");
        assert!(store.file_at_head(&path).unwrap().is_some(), "{path}");
    }
}

#[tokio::test]
async fn update_of_missing_article_is_not_found() {
    let store = seeded();
    let err = publisher(&store)
        .update("nadie", ArticleInput::new("t", "c", "b"), &PendingEdit::empty())
        .await
        .unwrap_err();
    assert!(matches!(err, PublishError::NotFound { ref slug } if slug == "nadie"));
}

#[tokio::test]
async fn update_without_a_stored_date_stamps_today() {
    let store = Arc::new(
        InMemoryContentStore::new("main").with_files([("articles/viejo.md", "sin fecha\n")]),
    );
    publisher(&store)
        .update("viejo", ArticleInput::new("Viejo", "c", "b"), &PendingEdit::empty())
        .await
        .unwrap();

    let markdown = text_at(&store, "articles/viejo.md").unwrap();
    assert!(markdown.contains(&format!("date: \"{}\"", press_article::today())));
}

#[tokio::test]
async fn concurrent_updates_produce_exactly_one_conflict() {
    let barrier = Arc::new(Barrier::new(2));
    let store = Arc::new(
        InMemoryContentStore::new("main")
            .with_files([("articles/hola.md", HOLA)])
            .with_ref_update_barrier(barrier),
    );
    let before = store.head().unwrap();
    let publisher = publisher(&store);

    let (edit_one, edit_two) = (PendingEdit::empty(), PendingEdit::empty());
    let (first, second) = tokio::join!(
        publisher.update("hola", ArticleInput::new("Uno", "c", "uno"), &edit_one),
        publisher.update("hola", ArticleInput::new("Dos", "c", "dos"), &edit_two),
    );

    let results = [first, second];
    let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    let losers: Vec<_> = results.iter().filter_map(|r| r.as_ref().err()).collect();
    assert_eq!(winners.len(), 1);
    assert_eq!(losers.len(), 1);
    assert_eq!(losers[0].conflict_kind(), Some(ConflictKind::RefRace));
    assert_eq!(store.head().unwrap(), winners[0].commit);
    assert_eq!(store.commit_parent(&winners[0].commit).unwrap(), Some(before));
}

// ---- delete ----

#[tokio::test]
async fn delete_removes_markdown_and_every_image_in_one_commit() {
    let store = seeded();
    let commits_before = store.commit_count().unwrap();

    let receipt = publisher(&store).delete("hola").await.unwrap();

    assert_eq!(receipt.files_written, 0);
    assert_eq!(receipt.files_deleted, 4);
    assert_eq!(store.commit_count().unwrap(), commits_before + 1);
    assert_eq!(
        store.commit_message(&receipt.commit).unwrap().as_deref(),
        Some("Delete article: hola")
    );
    assert_eq!(store.paths_at_head().unwrap(), vec!["README.md"]);
    assert!(!store.calls().contains(&RemoteStep::CreateBlob));
}

#[tokio::test]
async fn delete_without_images_removes_only_the_markdown() {
    let store = Arc::new(
        InMemoryContentStore::new("main").with_files([("articles/solo.md", "x\n"), ("README.md", "r")]),
    );
    let receipt = publisher(&store).delete("solo").await.unwrap();
    assert_eq!(receipt.files_deleted, 1);
    assert_eq!(store.paths_at_head().unwrap(), vec!["README.md"]);
}

#[tokio::test]
async fn delete_of_missing_article_is_not_found() {
    let store = seeded();
    let before = store.head().unwrap();
    let err = publisher(&store).delete("nadie").await.unwrap_err();
    assert!(matches!(err, PublishError::NotFound { .. }));
    assert_eq!(store.head().unwrap(), before);
}

// ---- remote failures ----

#[tokio::test]
async fn read_failures_surface_as_remote_errors() {
    let store = seeded();
    store.fail_on(RemoteStep::ReadContents);
    let err = publisher(&store).list().await.unwrap_err();
    assert!(matches!(err, PublishError::RemoteUnavailable(_)));
    assert!(err.to_string().contains("injected failure"));
}
