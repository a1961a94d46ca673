//! Integration tests for the reversal service
//!
//! These tests verify:
//! - Add/get round trips and idempotent re-adds
//! - Lazy loading, unloading, and reload from externally edited sources
//! - Case-insensitive hashing with casing-preserving storage
//! - Collision replacement (a real 32-bit FNV-1a collision pair)
//! - Load failures, source corruption, and torn-tail recovery
//! - Persistence failures and the re-add retry path

use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use hashdex::{
    Config, HashAlgorithm, InsertOutcome, ReversalService, StoreError, TableSpec,
};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup() -> (TempDir, ReversalService) {
    let temp = TempDir::new().unwrap();
    let service = ReversalService::open_path(temp.path()).unwrap();
    (temp, service)
}

fn source_path(service: &ReversalService, table: &str) -> PathBuf {
    service
        .registry()
        .get(table)
        .unwrap()
        .source_path()
        .to_path_buf()
}

// =============================================================================
// Round Trip Tests
// =============================================================================

#[test]
fn test_add_then_get_round_trip() {
    let (_temp, service) = setup();

    let receipt = service
        .add_hash("game", "data/characters/aatrox/skin0.bin")
        .unwrap();
    assert_eq!(receipt.outcome, InsertOutcome::Inserted);
    assert_eq!(
        receipt.hash,
        HashAlgorithm::Xxh64.hash_str("data/characters/aatrox/skin0.bin")
    );

    let value = service.get_string("game", receipt.hash).unwrap();
    assert_eq!(value, "data/characters/aatrox/skin0.bin");
}

#[test]
fn test_readd_is_idempotent_and_not_duplicated() {
    let (_temp, service) = setup();

    let first = service.add_hash("game", "data/maps/map11.bin").unwrap();
    let second = service.add_hash("game", "data/maps/map11.bin").unwrap();

    assert_eq!(first.outcome, InsertOutcome::Inserted);
    assert_eq!(second.outcome, InsertOutcome::AlreadyPresent);
    assert_eq!(first.hash, second.hash);

    // Exactly one record reached the file
    let text = fs::read_to_string(source_path(&service, "game")).unwrap();
    assert_eq!(text.lines().count(), 1);
}

#[test]
fn test_add_survives_unload_and_reload() {
    let (_temp, service) = setup();

    let receipt = service.add_hash("game", "ux/loadingscreen.dds").unwrap();
    service.unload_hashes();
    assert!(!service.registry().get("game").unwrap().is_loaded());

    // Reload from the source file the add wrote
    let value = service.get_string("game", receipt.hash).unwrap();
    assert_eq!(value, "ux/loadingscreen.dds");
}

#[test]
fn test_empty_value_round_trips() {
    let (_temp, service) = setup();

    let receipt = service.add_hash("game", "").unwrap();
    assert_eq!(receipt.hash, HashAlgorithm::Xxh64.hash_str(""));
    assert_eq!(service.get_string("game", receipt.hash).unwrap(), "");

    // A hash-only record survives the reload
    service.unload_hashes();
    assert_eq!(service.get_string("game", receipt.hash).unwrap(), "");
}

// =============================================================================
// Hashing Semantics Tests
// =============================================================================

#[test]
fn test_hashing_is_case_insensitive_but_storage_preserves_casing() {
    let (_temp, service) = setup();

    let receipt = service
        .add_hash("game", "DATA/Characters/Ahri/Skin11.bin")
        .unwrap();
    let lower_hash = HashAlgorithm::Xxh64.hash_str("data/characters/ahri/skin11.bin");
    assert_eq!(receipt.hash, lower_hash);

    assert_eq!(
        service.get_string("game", lower_hash).unwrap(),
        "DATA/Characters/Ahri/Skin11.bin"
    );
}

#[test]
fn test_fnv_collision_replaces_and_reload_keeps_newest() {
    let (_temp, service) = setup();

    // "costarring" and "liquid" collide under 32-bit FNV-1a
    assert_eq!(
        HashAlgorithm::Fnv1a32.hash_str("costarring"),
        HashAlgorithm::Fnv1a32.hash_str("liquid")
    );

    let first = service.add_hash("bin", "costarring").unwrap();
    assert_eq!(first.outcome, InsertOutcome::Inserted);

    let second = service.add_hash("bin", "liquid").unwrap();
    assert_eq!(second.hash, first.hash);
    assert_eq!(second.outcome, InsertOutcome::Replaced);

    // Newest value wins in memory
    assert_eq!(service.get_string("bin", first.hash).unwrap(), "liquid");

    // Both records were appended; the later one wins the reload too
    let text = fs::read_to_string(source_path(&service, "bin")).unwrap();
    assert_eq!(text.lines().count(), 2);

    service.unload_hashes();
    assert_eq!(service.get_string("bin", first.hash).unwrap(), "liquid");
}

#[test]
fn test_append_padding_matches_algorithm_width() {
    let (_temp, service) = setup();

    let game = service.add_hash("game", "assets/shared/particles/glow.troy").unwrap();
    let bin = service.add_hash("bin", "items/2003/spell.bin").unwrap();

    let game_text = fs::read_to_string(source_path(&service, "game")).unwrap();
    let bin_text = fs::read_to_string(source_path(&service, "bin")).unwrap();

    assert_eq!(
        game_text,
        format!("{:016x} assets/shared/particles/glow.troy\n", game.hash)
    );
    assert_eq!(bin_text, format!("{:08x} items/2003/spell.bin\n", bin.hash));
}

// =============================================================================
// Error Taxonomy Tests
// =============================================================================

#[test]
fn test_unknown_table_is_a_client_error() {
    let (_temp, service) = setup();

    match service.get_string("lcu", 1).unwrap_err() {
        StoreError::UnknownTable(name) => assert_eq!(name, "lcu"),
        other => panic!("Expected UnknownTable, got {:?}", other),
    }

    match service.add_hash("lcu", "plugins/rcp-fe-lol-loot").unwrap_err() {
        StoreError::UnknownTable(name) => assert_eq!(name, "lcu"),
        other => panic!("Expected UnknownTable, got {:?}", other),
    }
}

#[test]
fn test_miss_in_loaded_table_is_definitive() {
    let (_temp, service) = setup();

    match service.get_string("game", 0xdead_beef).unwrap_err() {
        StoreError::NotFound { table, hash } => {
            assert_eq!(table, "game");
            assert_eq!(hash, 0xdead_beef);
        }
        other => panic!("Expected NotFound, got {:?}", other),
    }

    // The miss actually loaded the (empty) table
    assert!(service.registry().get("game").unwrap().is_loaded());
}

#[test]
fn test_value_with_line_break_is_rejected() {
    let (_temp, service) = setup();

    assert!(matches!(
        service.add_hash("game", "two\nlines").unwrap_err(),
        StoreError::InvalidValue(_)
    ));
    assert!(matches!(
        service.add_hash("game", "carriage\rreturn").unwrap_err(),
        StoreError::InvalidValue(_)
    ));

    // Nothing was inserted or persisted
    let text = fs::read_to_string(source_path(&service, "game")).unwrap();
    assert!(text.is_empty());
}

// =============================================================================
// Load Failure Tests
// =============================================================================

#[test]
fn test_missing_source_fails_load_until_file_appears() {
    let temp = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp.path())
        .tables(vec![TableSpec::new(
            "game",
            HashAlgorithm::Xxh64,
            "game.txt",
        )])
        .create_missing_sources(false)
        .build();
    let service = ReversalService::open(config).unwrap();

    // Both request kinds surface the load failure
    assert!(matches!(
        service.get_string("game", 1).unwrap_err(),
        StoreError::LoadFailed { .. }
    ));
    assert!(matches!(
        service.add_hash("game", "data/menu.bin").unwrap_err(),
        StoreError::LoadFailed { .. }
    ));
    assert!(!service.registry().get("game").unwrap().is_loaded());

    // The failure does not stick: create the file and retry
    fs::write(temp.path().join("game.txt"), "0000000000000001 a.txt\n").unwrap();
    assert_eq!(service.get_string("game", 1).unwrap(), "a.txt");
}

#[test]
fn test_corrupt_interior_record_fails_load() {
    let (_temp, service) = setup();
    let path = source_path(&service, "game");

    fs::write(&path, "garbage line\n0000000000000001 ok.txt\n").unwrap();

    match service.get_string("game", 1).unwrap_err() {
        StoreError::LoadFailed { table, detail } => {
            assert_eq!(table, "game");
            assert!(detail.contains("invalid hash"), "detail: {}", detail);
        }
        other => panic!("Expected LoadFailed, got {:?}", other),
    }
    assert!(!service.registry().get("game").unwrap().is_loaded());

    // Repairing the file repairs the table
    fs::write(&path, "0000000000000001 ok.txt\n").unwrap();
    assert_eq!(service.get_string("game", 1).unwrap(), "ok.txt");
}

#[test]
fn test_torn_trailing_record_is_dropped() {
    let (_temp, service) = setup();
    let path = source_path(&service, "game");

    // Final line is unterminated and does not parse: a torn append
    fs::write(&path, "0000000000000001 kept.txt\n12345x").unwrap();

    assert_eq!(service.get_string("game", 1).unwrap(), "kept.txt");
    assert_eq!(service.registry().get("game").unwrap().entry_count(), 1);
}

#[test]
fn test_unterminated_but_parseable_tail_is_kept() {
    let (_temp, service) = setup();
    let path = source_path(&service, "game");

    fs::write(&path, "0000000000000001 a.txt\n0000000000000002 b.txt").unwrap();

    assert_eq!(service.get_string("game", 2).unwrap(), "b.txt");
    assert_eq!(service.registry().get("game").unwrap().entry_count(), 2);
}

#[test]
fn test_blank_lines_and_crlf_are_tolerated() {
    let (_temp, service) = setup();
    let path = source_path(&service, "game");

    fs::write(
        &path,
        "\n0000000000000001 a.txt\r\n\n0000000000000002 b.txt\n\n",
    )
    .unwrap();

    assert_eq!(service.get_string("game", 1).unwrap(), "a.txt");
    assert_eq!(service.get_string("game", 2).unwrap(), "b.txt");
    assert_eq!(service.registry().get("game").unwrap().entry_count(), 2);
}

// =============================================================================
// Unload / External Edit Tests
// =============================================================================

#[test]
fn test_unload_picks_up_external_appends() {
    let (_temp, service) = setup();

    let receipt = service.add_hash("game", "data/items.bin").unwrap();
    service.unload_hashes();

    // Another process appends a record while the table is unloaded
    let mut file = OpenOptions::new()
        .append(true)
        .open(source_path(&service, "game"))
        .unwrap();
    write!(file, "{:016x} tools/externally-added.txt\n", 0xfeed_u64).unwrap();
    drop(file);

    assert_eq!(
        service.get_string("game", 0xfeed).unwrap(),
        "tools/externally-added.txt"
    );
    assert_eq!(
        service.get_string("game", receipt.hash).unwrap(),
        "data/items.bin"
    );
}

#[test]
fn test_duplicate_hash_in_source_resolves_to_latest_record() {
    let (_temp, service) = setup();
    let path = source_path(&service, "game");

    fs::write(
        &path,
        "0000000000000001 old/path.txt\n0000000000000001 new/path.txt\n",
    )
    .unwrap();

    assert_eq!(service.get_string("game", 1).unwrap(), "new/path.txt");
    assert_eq!(service.registry().get("game").unwrap().entry_count(), 1);
}

// =============================================================================
// Eager Load Tests
// =============================================================================

#[test]
fn test_load_hashes_reports_per_table_counts() {
    let (_temp, service) = setup();

    fs::write(
        source_path(&service, "game"),
        "0000000000000001 a.txt\n0000000000000002 b.txt\n",
    )
    .unwrap();
    fs::write(source_path(&service, "bin"), "00000001 c.bin\n").unwrap();

    let summary = service.load_hashes().unwrap();
    assert_eq!(summary.tables.len(), 2);
    assert!(service.registry().get("game").unwrap().is_loaded());
    assert!(service.registry().get("bin").unwrap().is_loaded());

    let text = summary.to_string();
    assert!(text.contains("game: 2 entries"), "summary: {}", text);
    assert!(text.contains("bin: 1 entries"), "summary: {}", text);
}

// =============================================================================
// Persistence Failure Tests
// =============================================================================

#[test]
fn test_persist_failure_keeps_mapping_and_readd_retries() {
    let temp = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp.path())
        .tables(vec![TableSpec::new(
            "game",
            HashAlgorithm::Xxh64,
            "sub/game.txt",
        )])
        .build();
    let service = ReversalService::open(config).unwrap();

    // Load the table and then close the append handle via unload/reload
    let first = service.add_hash("game", "first/value.txt").unwrap();
    service.unload_hashes();
    assert_eq!(
        service.get_string("game", first.hash).unwrap(),
        "first/value.txt"
    );

    // Take the source directory away; the next append cannot open the file
    fs::remove_dir_all(temp.path().join("sub")).unwrap();

    let err = service.add_hash("game", "second/value.txt").unwrap_err();
    let second_hash = match err {
        StoreError::PersistFailed {
            table,
            hash,
            outcome,
            ..
        } => {
            assert_eq!(table, "game");
            assert_eq!(outcome, InsertOutcome::Inserted);
            hash
        }
        other => panic!("Expected PersistFailed, got {:?}", other),
    };
    assert_eq!(second_hash, HashAlgorithm::Xxh64.hash_str("second/value.txt"));

    // The in-memory insert stands
    assert_eq!(
        service.get_string("game", second_hash).unwrap(),
        "second/value.txt"
    );

    // Restore the directory; re-adding the same value retries the append
    // even though the table already has the mapping
    fs::create_dir_all(temp.path().join("sub")).unwrap();
    let retry = service.add_hash("game", "second/value.txt").unwrap();
    assert_eq!(retry.hash, second_hash);
    assert_eq!(retry.outcome, InsertOutcome::AlreadyPresent);

    let text = fs::read_to_string(temp.path().join("sub/game.txt")).unwrap();
    assert_eq!(text, format!("{:016x} second/value.txt\n", second_hash));
}
