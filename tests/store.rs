use bank_ledger_store::{Error, ErrorKind, Store, WriteMode};
use std::collections::BTreeMap;

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "bank_ledger_test_{}_{}.db",
        name,
        uuid::Uuid::new_v4()
    ))
}

// ---- open -------------------------------------------------------------------

#[test]
fn open_missing_file_creates_empty() {
    let path = temp_path("missing");
    let db = Store::<String, i32>::open(&path).unwrap();
    assert!(db.is_empty());
    assert!(path.exists());
    assert_eq!(std::fs::read(&path).unwrap(), Vec::<u8>::new());
    let _ = std::fs::remove_file(&path);
}

#[test]
fn open_whitespace_file_is_empty() {
    let path = temp_path("whitespace");
    std::fs::write(&path, "  \n\t\n").unwrap();
    let db = Store::<String, i32>::open(&path).unwrap();
    assert!(db.is_empty());
    let _ = std::fs::remove_file(&path);
}

#[test]
fn open_malformed_file_refuses_to_start() {
    let path = temp_path("malformed");
    std::fs::write(&path, r#"{"a": 1, "b": "#).unwrap();
    let err = Store::<String, i32>::open(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Persistence);

    std::fs::write(&path, r#"["not", "an", "object"]"#).unwrap();
    assert!(matches!(
        Store::<String, i32>::open(&path),
        Err(Error::Deserialize(_))
    ));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn path_accessor() {
    let path = temp_path("path_acc");
    let db = Store::<String, i32>::open(&path).unwrap();
    assert_eq!(db.path(), path.as_path());
    let _ = std::fs::remove_file(&path);
}

// ---- mutate -----------------------------------------------------------------

#[test]
fn mutate_writes_through_before_returning() {
    let path = temp_path("write_through");
    let db = Store::<String, i32>::open(&path).unwrap();
    db.mutate(|t| {
        t.insert("a".into(), 1);
        Ok(())
    })
    .unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    assert_eq!(raw, r#"{"a":1}"#);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn failed_closure_leaves_table_untouched() {
    let path = temp_path("closure_err");
    let db = Store::<String, i32>::open(&path).unwrap();
    db.mutate(|t| {
        t.insert("a".into(), 1);
        Ok(())
    })
    .unwrap();

    let res: Result<(), Error> = db.mutate(|t| {
        t.insert("b".into(), 2);
        Err(Error::Conflict("b".into()))
    });
    assert_eq!(res, Err(Error::Conflict("b".into())));
    assert_eq!(db.len(), 1);
    assert!(db.read(|t| !t.contains_key("b")));
    let _ = std::fs::remove_file(&path);
}

#[cfg(unix)]
#[test]
fn failed_save_keeps_memory_and_disk_in_step() {
    let dir = std::env::temp_dir().join(format!("bank_ledger_ro_{}", uuid::Uuid::new_v4()));
    let path = dir.join("table.db");
    let db = Store::<String, i32>::builder(&path)
        .write_mode(WriteMode::Atomic)
        .build()
        .unwrap();
    db.mutate(|t| {
        t.insert("a".into(), 1);
        Ok(())
    })
    .unwrap();

    // Removing the directory makes the temp-file write fail.
    std::fs::remove_dir_all(&dir).unwrap();
    let res = db.mutate(|t| {
        t.insert("b".into(), 2);
        Ok(())
    });
    assert!(matches!(res, Err(Error::Io(_))));
    assert_eq!(db.len(), 1);
    assert!(db.read(|t| !t.contains_key("b")));
}

#[test]
fn flush_rewrites_current_table() {
    let path = temp_path("flush");
    let db = Store::<String, i32>::open(&path).unwrap();
    db.mutate(|t| {
        t.insert("x".into(), 10);
        Ok(())
    })
    .unwrap();
    std::fs::write(&path, "").unwrap();

    db.flush().unwrap();
    let db2 = Store::<String, i32>::open(&path).unwrap();
    assert_eq!(db2.snapshot(), db.snapshot());
    let _ = std::fs::remove_file(&path);
}

// ---- builder ----------------------------------------------------------------

#[test]
fn builder_pretty_json() {
    let path = temp_path("builder_pretty");
    let db = Store::<String, i32>::builder(&path)
        .pretty(true)
        .build()
        .unwrap();
    db.mutate(|t| {
        t.insert("hello".into(), 1);
        Ok(())
    })
    .unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    // pretty JSON has newlines and indentation
    assert!(raw.contains('\n'));
    assert!(raw.contains("  "));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn builder_atomic_round_trip() {
    let path = temp_path("builder_atomic");
    {
        let db = Store::<String, Vec<u8>>::builder(&path)
            .write_mode(WriteMode::Atomic)
            .build()
            .unwrap();
        db.mutate(|t| {
            t.insert("k".into(), vec![1, 2, 3]);
            Ok(())
        })
        .unwrap();
    }
    let db = Store::<String, Vec<u8>>::open(&path).unwrap();
    let mut expected = BTreeMap::new();
    expected.insert("k".to_string(), vec![1, 2, 3]);
    assert_eq!(db.snapshot(), expected);
    let _ = std::fs::remove_file(&path);
}

// ---- debug ------------------------------------------------------------------

#[test]
fn debug_impls_dont_panic() {
    let path = temp_path("debug");
    let db = Store::<String, i32>::open(&path).unwrap();
    let dbg_store = format!("{:?}", db);
    assert!(dbg_store.contains("Store"));
    assert!(dbg_store.contains("path"));

    let builder = Store::<String, i32>::builder(&path);
    let dbg_builder = format!("{:?}", builder);
    assert!(dbg_builder.contains("StoreBuilder"));
    let _ = std::fs::remove_file(&path);
}
