use catalogo_console::{
    FileTokenStore, MemoryTokenStore, TokenStore, error::StoreError, storage::TOKEN_KEY,
};
use serde_json::Value;

#[cfg(test)]
mod file_tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("session.json"));

        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_token_survives_a_new_store_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        FileTokenStore::new(&path).save("abc123").await.unwrap();

        // A second instance stands in for a restarted process.
        let reopened = FileTokenStore::new(&path);
        assert_eq!(reopened.load().await.unwrap().as_deref(), Some("abc123"));

        let raw: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw[TOKEN_KEY], "abc123");
    }

    #[tokio::test]
    async fn test_save_replaces_previous_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("session.json"));

        store.save("first").await.unwrap();
        store.save("second").await.unwrap();

        assert_eq!(store.load().await.unwrap().as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_clear_removes_token_and_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, r#"{"token":"abc","theme":"dark"}"#).unwrap();

        let store = FileTokenStore::new(&path);
        store.clear().await.unwrap();

        assert_eq!(store.load().await.unwrap(), None);
        let raw: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["theme"], "dark");
        assert!(raw.get(TOKEN_KEY).is_none());
    }

    #[tokio::test]
    async fn test_clear_on_empty_slot_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("session.json"));

        assert!(store.clear().await.is_ok());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let result = FileTokenStore::new(&path).load().await;
        assert!(matches!(result, Err(StoreError::Corrupt(_))));
    }

    #[tokio::test]
    async fn test_clear_resets_a_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();
        let store = FileTokenStore::new(&path);

        store.clear().await.unwrap();

        assert_eq!(store.load().await.unwrap(), None);
        let raw: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw, serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_save_over_a_corrupt_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        // Valid JSON, but not an object.
        std::fs::write(&path, "[1, 2, 3]").unwrap();
        let store = FileTokenStore::new(&path);

        store.save("fresh").await.unwrap();

        assert_eq!(store.load().await.unwrap().as_deref(), Some("fresh"));
    }
}

#[cfg(test)]
mod mock_tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.load().await.unwrap(), None);

        store.save("tok").await.unwrap();
        assert_eq!(store.load().await.unwrap().as_deref(), Some("tok"));

        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_store_failure() {
        let store = MemoryTokenStore::new_failing();
        assert!(matches!(store.load().await, Err(StoreError::Unavailable(_))));
        assert!(store.save("tok").await.is_err());
        assert!(store.clear().await.is_err());
    }
}
