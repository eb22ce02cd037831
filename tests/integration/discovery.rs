//! Integration tests for context discovery and the active session

use crate::integration::test_utils::{write_cdsrc, FakeFactory, FakeServer};
use cds_explorer::client::CONFIG_USER_QUERY;
use cds_explorer::context::{discover_contexts, Session};
use cds_explorer::error::{ClientError, ConfigError, ExplorerError};
use cds_explorer::tree::ExplorerTree;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const TWO_FILES_FIRST: &str = r#"
current = "prod"

[staging]
host = "https://staging.example.com"

[prod]
host = "https://cds.example.com"
"#;

const TWO_FILES_SECOND: &str = r#"
current = "lab"

[lab]
host = "https://lab.example.com"
"#;

#[tokio::test]
async fn test_discovers_contexts_in_file_then_section_order() {
    let dir = TempDir::new().unwrap();
    let first = write_cdsrc(&dir, "first", TWO_FILES_FIRST);
    let second = write_cdsrc(&dir, "second", TWO_FILES_SECOND);
    let server = FakeServer::new();
    let factory = FakeFactory::new(Arc::clone(&server));
    let session = Session::new();

    let contexts = discover_contexts(&[first.clone(), second.clone()], factory.as_ref(), &session)
        .await
        .unwrap();

    let names: Vec<&str> = contexts.iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["staging", "prod", "lab"]);
    assert_eq!(contexts[0].config_file(), first.as_path());
    assert_eq!(contexts[2].config_file(), second.as_path());

    // The first file's current context wins; the second file's marker is ignored
    let active = session.active_context().unwrap();
    assert_eq!(active.name(), "prod");
    assert_eq!(server.inits(), vec!["prod"]);
    assert!(session.is_active(&contexts[1]));
    assert!(!session.is_active(&contexts[2]));
}

#[tokio::test]
async fn test_active_client_initialized_once_across_refreshes() {
    let dir = TempDir::new().unwrap();
    let path = write_cdsrc(&dir, "cdsrc", TWO_FILES_FIRST);
    let server = FakeServer::new();
    let tree = ExplorerTree::new(vec![path], FakeFactory::new(Arc::clone(&server)));

    tree.contexts().await.unwrap();
    tree.refresh().await.unwrap();
    tree.refresh().await.unwrap();

    assert_eq!(server.inits(), vec!["prod"]);
    assert_eq!(tree.active_context().unwrap().name(), "prod");
}

#[tokio::test]
async fn test_overlapping_discoveries_share_one_active_client() {
    let dir = TempDir::new().unwrap();
    let path = write_cdsrc(&dir, "cdsrc", TWO_FILES_FIRST);
    let server = FakeServer::new();
    server.set_init_delay(Duration::from_millis(50));
    let factory = FakeFactory::new(Arc::clone(&server));
    let session = Session::new();
    let paths = vec![path];

    let (a, b) = tokio::join!(
        discover_contexts(&paths, factory.as_ref(), &session),
        discover_contexts(&paths, factory.as_ref(), &session),
    );

    assert_eq!(a.unwrap().len(), 2);
    assert_eq!(b.unwrap().len(), 2);
    assert_eq!(server.inits(), vec!["prod"]);
}

#[tokio::test]
async fn test_missing_cdsrc_is_skipped() {
    let dir = TempDir::new().unwrap();
    let present = write_cdsrc(&dir, "present", TWO_FILES_SECOND);
    let missing = dir.path().join("missing");
    let server = FakeServer::new();
    let factory = FakeFactory::new(Arc::clone(&server));

    let contexts = discover_contexts(&[missing, present], factory.as_ref(), &Session::new())
        .await
        .unwrap();
    let names: Vec<&str> = contexts.iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["lab"]);
}

#[tokio::test]
async fn test_no_cdsrc_means_no_contexts() {
    let server = FakeServer::new();
    let tree = ExplorerTree::new(Vec::new(), FakeFactory::new(Arc::clone(&server)));

    assert!(tree.get_children(None).await.unwrap().is_empty());
    assert!(tree.active_context().is_none());
    assert!(server.inits().is_empty());
}

#[tokio::test]
async fn test_malformed_cdsrc_fails_discovery() {
    let dir = TempDir::new().unwrap();
    let broken = write_cdsrc(&dir, "broken", "[prod\nhost = ");
    let server = FakeServer::new();
    let factory = FakeFactory::new(Arc::clone(&server));

    let err = discover_contexts(&[broken], factory.as_ref(), &Session::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ExplorerError::Config(ConfigError::Parse { .. })
    ));
}

#[tokio::test]
async fn test_failed_init_releases_active_slot() {
    let dir = TempDir::new().unwrap();
    let path = write_cdsrc(&dir, "cdsrc", TWO_FILES_FIRST);
    let server = FakeServer::new();
    server.set_fail_init(true);
    let factory = FakeFactory::new(Arc::clone(&server));
    let session = Session::new();
    let paths = vec![path];

    let err = discover_contexts(&paths, factory.as_ref(), &session)
        .await
        .unwrap_err();
    match err {
        ExplorerError::Client(ClientError::CommandFailed { command, stderr, .. }) => {
            assert_eq!(command, CONFIG_USER_QUERY);
            assert_eq!(stderr, "login required");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(session.active_context().is_none());

    server.set_fail_init(false);
    discover_contexts(&paths, factory.as_ref(), &session)
        .await
        .unwrap();
    assert_eq!(session.active_context().unwrap().name(), "prod");
    assert_eq!(server.inits(), vec!["prod", "prod"]);
}

#[tokio::test]
async fn test_root_nodes_mark_active_context() {
    let dir = TempDir::new().unwrap();
    let path = write_cdsrc(&dir, "cdsrc", TWO_FILES_FIRST);
    let server = FakeServer::new();
    let tree = ExplorerTree::new(vec![path], FakeFactory::new(Arc::clone(&server)));

    let roots = tree.get_children(None).await.unwrap();
    let items: Vec<(String, bool)> = roots
        .iter()
        .map(|node| {
            let item = tree.get_tree_item(node);
            (item.label, item.active)
        })
        .collect();
    assert_eq!(
        items,
        vec![("staging".to_string(), false), ("prod".to_string(), true)]
    );
}

#[tokio::test]
async fn test_refresh_follows_rewritten_cdsrc() {
    let dir = TempDir::new().unwrap();
    let path = write_cdsrc(
        &dir,
        "cdsrc",
        "current = \"prod\"\n\n[prod]\nhost = \"p\"\n\n[dev]\nhost = \"d\"\n",
    );
    let server = FakeServer::new();
    let tree = ExplorerTree::new(vec![path], FakeFactory::new(Arc::clone(&server)));
    tree.contexts().await.unwrap();
    assert_eq!(tree.active_context().unwrap().name(), "prod");

    write_cdsrc(&dir, "cdsrc", "current = \"dev\"\n\n[dev]\nhost = \"d\"\n");
    tree.refresh().await.unwrap();

    let roots = tree.get_children(None).await.unwrap();
    let items: Vec<(String, bool)> = roots
        .iter()
        .map(|node| {
            let item = tree.get_tree_item(node);
            (item.label, item.active)
        })
        .collect();
    assert_eq!(items, vec![("dev".to_string(), true)]);
    assert_eq!(tree.active_context().unwrap().name(), "dev");
    assert_eq!(server.inits(), vec!["prod", "dev"]);

    // Unchanged on the next refresh: no second init
    tree.refresh().await.unwrap();
    assert_eq!(server.inits(), vec!["prod", "dev"]);
}

#[tokio::test]
async fn test_removed_active_section_is_dropped() {
    let dir = TempDir::new().unwrap();
    let path = write_cdsrc(
        &dir,
        "cdsrc",
        "current = \"prod\"\n\n[prod]\nhost = \"p\"\n\n[dev]\nhost = \"d\"\n",
    );
    let server = FakeServer::new();
    let factory = FakeFactory::new(Arc::clone(&server));
    let session = Session::new();
    let paths = vec![path];
    discover_contexts(&paths, factory.as_ref(), &session)
        .await
        .unwrap();

    write_cdsrc(&dir, "cdsrc", "[dev]\nhost = \"d\"\n");
    let contexts = discover_contexts(&paths, factory.as_ref(), &session)
        .await
        .unwrap();
    assert_eq!(contexts.len(), 1);
    assert!(session.active_context().is_none());
}

#[tokio::test]
async fn test_active_context_kept_when_marker_removed() {
    let dir = TempDir::new().unwrap();
    let path = write_cdsrc(
        &dir,
        "cdsrc",
        "current = \"prod\"\n\n[prod]\nhost = \"p\"\n",
    );
    let server = FakeServer::new();
    let factory = FakeFactory::new(Arc::clone(&server));
    let session = Session::new();
    let paths = vec![path];
    discover_contexts(&paths, factory.as_ref(), &session)
        .await
        .unwrap();

    write_cdsrc(&dir, "cdsrc", "[prod]\nhost = \"p\"\n");
    let contexts = discover_contexts(&paths, factory.as_ref(), &session)
        .await
        .unwrap();
    assert!(session.is_active(&contexts[0]));
    assert_eq!(server.inits(), vec!["prod"]);
}
