//! Catalog Module Tests
//!
//! ## Test Scopes
//! - **Wire format**: Book records decode from the upstream GraphQL shape.
//! - **Sources**: Static and file-backed sources, and the GraphQL client against a local server.
//! - **Catalog**: Mount/reload state transitions and the failure message.

#[cfg(test)]
mod tests {
    use crate::catalog::source::{parse_books_json, BookSource, GraphQlSource, StaticSource};
    use crate::catalog::store::Catalog;
    use crate::catalog::types::{Book, FetchState};
    use async_trait::async_trait;
    use axum::routing::post;
    use axum::{Json, Router};
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct FailingSource;

    #[async_trait]
    impl BookSource for FailingSource {
        async fn fetch_books(&self) -> anyhow::Result<Vec<Book>> {
            Err(anyhow::anyhow!("connection refused"))
        }

        fn describe(&self) -> String {
            "failing".to_string()
        }
    }

    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl BookSource for CountingSource {
        async fn fetch_books(&self) -> anyhow::Result<Vec<Book>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![Book::new(&n.to_string(), "Matilda", "Roald Dahl", "C")])
        }

        fn describe(&self) -> String {
            "counting".to_string()
        }
    }

    /// Succeeds on the first fetch, fails on every later one.
    struct FlakySource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl BookSource for FlakySource {
        async fn fetch_books(&self) -> anyhow::Result<Vec<Book>> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(vec![Book::new("1", "Holes", "Louis Sachar", "H")])
            } else {
                Err(anyhow::anyhow!("upstream timed out"))
            }
        }

        fn describe(&self) -> String {
            "flaky".to_string()
        }
    }

    /// The first fetch is slow; each fetch returns its call number as the book id.
    struct SlowFirstSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl BookSource for SlowFirstSource {
        async fn fetch_books(&self) -> anyhow::Result<Vec<Book>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n == 0 {
                tokio::time::sleep(Duration::from_millis(150)).await;
            }
            Ok(vec![Book::new(&n.to_string(), "Holes", "Louis Sachar", "H")])
        }

        fn describe(&self) -> String {
            "slow first".to_string()
        }
    }

    // ============================================================
    // WIRE FORMAT TESTS
    // ============================================================

    #[test]
    fn test_book_decodes_camel_case_fields() {
        let raw = r#"{
            "id": "7",
            "title": "Charlotte's Web",
            "author": "E. B. White",
            "readingLevel": "3rd Grade",
            "coverPhotoURL": "assets/web.webp"
        }"#;

        let book: Book = serde_json::from_str(raw).expect("Book should decode");
        assert_eq!(book.reading_level, "3rd Grade");
        assert_eq!(book.cover_photo_url, "assets/web.webp");
    }

    #[test]
    fn test_book_missing_optional_fields_default_to_empty() {
        let book: Book = serde_json::from_str(r#"{"id": "1", "title": "Holes"}"#).unwrap();

        assert_eq!(book.author, "");
        assert_eq!(book.reading_level, "");
        assert_eq!(book.cover_photo_url, "");
    }

    #[test]
    fn test_book_serializes_upstream_names() {
        let json = serde_json::to_value(Book::new("1", "Holes", "Louis Sachar", "H")).unwrap();

        assert!(json.get("readingLevel").is_some());
        assert!(json.get("coverPhotoURL").is_some());
        assert!(json.get("reading_level").is_none());
    }

    #[test]
    fn test_parse_graphql_books() {
        let raw = r#"{"data": {"books": [{"id": "1", "title": "Holes", "author": "Louis Sachar", "readingLevel": "H"}]}}"#;

        let books = parse_books_json(raw).unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "Holes");
    }

    #[test]
    fn test_parse_graphql_errors_are_failures() {
        let raw = r#"{"data": null, "errors": [{"message": "books resolver crashed"}]}"#;

        let err = parse_books_json(raw).unwrap_err();
        assert!(err.to_string().contains("books resolver crashed"));
    }

    #[test]
    fn test_parse_graphql_missing_books_is_failure() {
        assert!(parse_books_json(r#"{"data": {}}"#).is_err());
    }

    // ============================================================
    // SOURCE TESTS
    // ============================================================

    #[tokio::test]
    async fn test_static_source_returns_books() {
        let source = StaticSource::new(vec![Book::new("1", "Holes", "Louis Sachar", "H")]);

        let books = source.fetch_books().await.unwrap();
        assert_eq!(books.len(), 1);
    }

    #[tokio::test]
    async fn test_static_source_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": "1", "title": "Holes", "author": "Louis Sachar", "readingLevel": "H"}}]"#
        )
        .unwrap();

        let source = StaticSource::from_json_file(file.path()).unwrap();
        let books = source.fetch_books().await.unwrap();
        assert_eq!(books[0].id, "1");
    }

    #[test]
    fn test_static_source_from_invalid_file_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        assert!(StaticSource::from_json_file(file.path()).is_err());
    }

    #[tokio::test]
    async fn test_graphql_source_fetches_from_server() {
        let app = Router::new().route(
            "/graphql",
            post(|| async {
                Json(serde_json::json!({
                    "data": {"books": [
                        {"id": "1", "title": "Cat in the Hat", "author": "Dr. Seuss", "readingLevel": "A"},
                        {"id": "2", "title": "Green Eggs", "author": "Dr. Seuss", "readingLevel": "1"}
                    ]}
                }))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let source = GraphQlSource::new(
            &format!("http://{}/graphql", addr),
            Duration::from_secs(5),
            3,
        );
        let books = source.fetch_books().await.unwrap();

        assert_eq!(books.len(), 2);
        assert_eq!(books[1].reading_level, "1");
    }

    #[tokio::test]
    async fn test_graphql_source_unreachable_fails_after_retries() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source = GraphQlSource::new(
            &format!("http://{}/graphql", addr),
            Duration::from_millis(500),
            2,
        );

        assert!(source.fetch_books().await.is_err());
    }

    // ============================================================
    // CATALOG TESTS
    // ============================================================

    #[tokio::test]
    async fn test_new_catalog_is_pending() {
        let catalog = Catalog::new(Arc::new(StaticSource::new(vec![])));

        assert!(catalog.state().await.is_pending());
        assert!(catalog.books().await.is_none());
    }

    #[tokio::test]
    async fn test_mount_success_is_ready() {
        let source = StaticSource::new(vec![Book::new("1", "Holes", "Louis Sachar", "H")]);
        let catalog = Catalog::mount(Arc::new(source)).await;

        let books = catalog.books().await.expect("catalog should be ready");
        assert_eq!(books.len(), 1);
    }

    #[tokio::test]
    async fn test_mount_failure_surfaces_message() {
        let catalog = Catalog::mount(Arc::new(FailingSource)).await;

        let state = catalog.state().await;
        assert!(matches!(state, FetchState::Failed(_)));
        assert_eq!(
            state.error_message().unwrap(),
            "Internal Server Error: connection refused books data ensure backend server is up"
        );
    }

    #[tokio::test]
    async fn test_reload_swaps_record_set() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
        });
        let catalog = Catalog::mount(source.clone()).await;
        let first = catalog.books().await.unwrap();

        catalog.reload().await.unwrap();
        let second = catalog.books().await.unwrap();

        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert!(!Arc::ptr_eq(&first, &second), "Reload should produce a new set");
        assert_eq!(first[0].id, "0", "Old snapshot stays intact");
        assert_eq!(second[0].id, "1");
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous_books() {
        let catalog = Catalog::mount(Arc::new(FlakySource {
            calls: AtomicUsize::new(0),
        }))
        .await;
        let before = catalog.books().await.expect("first fetch succeeds");

        let result = catalog.reload().await;

        assert!(result.is_err(), "Reload failure goes back to the caller");
        let after = catalog.books().await.expect("Previous books must survive");
        assert!(Arc::ptr_eq(&before, &after));
        assert!(catalog.state().await.error_message().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_reloads_apply_in_start_order() {
        let catalog = Catalog::new(Arc::new(SlowFirstSource {
            calls: AtomicUsize::new(0),
        }));

        let (first, second) = tokio::join!(catalog.reload(), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            catalog.reload().await
        });

        assert_eq!(first.unwrap()[0].id, "0");
        assert_eq!(second.unwrap()[0].id, "1");
        // The slow, earlier fetch must not overwrite the later one
        assert_eq!(catalog.books().await.unwrap()[0].id, "1");
    }

    #[test]
    fn test_ready_state_has_no_error_message() {
        let state = FetchState::Ready(Arc::from(Vec::<Book>::new()));
        assert!(state.error_message().is_none());
    }
}
