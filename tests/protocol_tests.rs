//! Tests for the wire protocol codec
//!
//! These tests verify:
//! - Command and response round trips through the codec
//! - The exact frame layout (header, length prefix, decimal hash text)
//! - Rejection of malformed, truncated, and oversized frames
//! - Add receipt and load failure payload helpers
//! - Stream-based read/write helpers

use std::io::Cursor;

use hashdex::protocol::{
    decode_add_receipt, decode_command, decode_load_failure, decode_response, encode_add_receipt,
    encode_command, encode_response, read_command, read_response, write_command, write_response,
    Command, Response, Status, HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
use hashdex::{InsertOutcome, StoreError};

// =============================================================================
// Command Round Trip Tests
// =============================================================================

#[test]
fn test_command_round_trips() {
    let commands = vec![
        Command::GetString {
            table: "game".to_string(),
            hash: 0x19c5_9f42_a9fe_e0e8,
        },
        Command::AddHash {
            table: "bin".to_string(),
            value: "data/with spaces and ünïcode.bin".to_string(),
        },
        Command::UnloadHashes,
        Command::LoadHashes,
        Command::Ping,
    ];

    for command in commands {
        let bytes = encode_command(&command);
        let decoded = decode_command(&bytes).unwrap();
        match (&command, &decoded) {
            (
                Command::GetString { table: t1, hash: h1 },
                Command::GetString { table: t2, hash: h2 },
            ) => {
                assert_eq!(t1, t2);
                assert_eq!(h1, h2);
            }
            (
                Command::AddHash { table: t1, value: v1 },
                Command::AddHash { table: t2, value: v2 },
            ) => {
                assert_eq!(t1, t2);
                assert_eq!(v1, v2);
            }
            (Command::UnloadHashes, Command::UnloadHashes) => {}
            (Command::LoadHashes, Command::LoadHashes) => {}
            (Command::Ping, Command::Ping) => {}
            (sent, got) => panic!("Sent {:?}, decoded {:?}", sent, got),
        }
    }
}

#[test]
fn test_get_string_frame_layout() {
    let command = Command::GetString {
        table: "game".to_string(),
        hash: 255,
    };
    let bytes = encode_command(&command);

    // cmd byte, payload length, hash length, "255", "game"
    assert_eq!(bytes[0], 0x01);
    let payload_len = u32::from_be_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]);
    assert_eq!(payload_len as usize, 4 + 3 + 4);
    let hash_len = u32::from_be_bytes([bytes[5], bytes[6], bytes[7], bytes[8]]);
    assert_eq!(hash_len, 3);
    assert_eq!(&bytes[9..12], b"255");
    assert_eq!(&bytes[12..], b"game");
}

#[test]
fn test_hash_travels_as_decimal_text() {
    let command = Command::GetString {
        table: "game".to_string(),
        hash: u64::MAX,
    };
    let bytes = encode_command(&command);

    let needle = b"18446744073709551615";
    assert!(
        bytes.windows(needle.len()).any(|w| w == needle),
        "frame does not contain the decimal hash"
    );
}

#[test]
fn test_empty_commands_have_empty_payloads() {
    for (command, expected_type) in [
        (Command::UnloadHashes, 0x03u8),
        (Command::LoadHashes, 0x04),
        (Command::Ping, 0x05),
    ] {
        let bytes = encode_command(&command);
        assert_eq!(bytes.len(), HEADER_SIZE);
        assert_eq!(bytes[0], expected_type);
        assert_eq!(&bytes[1..5], &[0, 0, 0, 0]);
    }
}

// =============================================================================
// Command Rejection Tests
// =============================================================================

#[test]
fn test_decode_rejects_unknown_command_type() {
    let bytes = [0x7f, 0, 0, 0, 0];
    assert!(matches!(
        decode_command(&bytes).unwrap_err(),
        StoreError::Protocol(_)
    ));
}

#[test]
fn test_decode_rejects_truncated_header() {
    assert!(matches!(
        decode_command(&[0x01, 0, 0]).unwrap_err(),
        StoreError::Protocol(_)
    ));
}

#[test]
fn test_decode_rejects_truncated_payload() {
    // Claims 10 payload bytes, provides 2
    let bytes = [0x01, 0, 0, 0, 10, 0xaa, 0xbb];
    assert!(matches!(
        decode_command(&bytes).unwrap_err(),
        StoreError::Protocol(_)
    ));
}

#[test]
fn test_decode_rejects_oversized_payload() {
    let too_big = MAX_PAYLOAD_SIZE + 1;
    let mut bytes = vec![0x01];
    bytes.extend_from_slice(&too_big.to_be_bytes());
    assert!(matches!(
        decode_command(&bytes).unwrap_err(),
        StoreError::Protocol(_)
    ));
}

#[test]
fn test_decode_rejects_non_decimal_hash() {
    // GET_STRING whose hash field is hex text, not decimal
    let mut payload = Vec::new();
    payload.extend_from_slice(&4u32.to_be_bytes());
    payload.extend_from_slice(b"beef");
    payload.extend_from_slice(b"game");

    let mut bytes = vec![0x01];
    bytes.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    bytes.extend_from_slice(&payload);

    assert!(matches!(
        decode_command(&bytes).unwrap_err(),
        StoreError::Protocol(_)
    ));
}

#[test]
fn test_decode_rejects_payload_on_empty_command() {
    let mut bytes = vec![0x05];
    bytes.extend_from_slice(&4u32.to_be_bytes());
    bytes.extend_from_slice(b"junk");
    assert!(matches!(
        decode_command(&bytes).unwrap_err(),
        StoreError::Protocol(_)
    ));
}

// =============================================================================
// Response Tests
// =============================================================================

#[test]
fn test_response_round_trips() {
    let responses = vec![
        Response::ok(Some(b"data/a.txt".to_vec())),
        Response::ok(None),
        Response::not_found(),
        Response::error("something broke"),
        Response::unknown_table("lcu"),
        Response::load_failed("game", "no such file"),
        Response::add_ok(42, InsertOutcome::Inserted),
        Response::persist_failed(42, InsertOutcome::Replaced),
    ];

    for response in responses {
        let bytes = encode_response(&response);
        let decoded = decode_response(&bytes).unwrap();
        assert_eq!(decoded.status, response.status);
        assert_eq!(decoded.payload, response.payload);
    }
}

#[test]
fn test_decode_rejects_unknown_status() {
    let bytes = [0x7f, 0, 0, 0, 0];
    assert!(matches!(
        decode_response(&bytes).unwrap_err(),
        StoreError::Protocol(_)
    ));
}

#[test]
fn test_add_receipt_payload() {
    let payload = encode_add_receipt(0xdead_beef, InsertOutcome::AlreadyPresent);
    assert_eq!(payload[0], 1);
    assert_eq!(&payload[1..], 0xdead_beef_u64.to_string().as_bytes());

    let (hash, outcome) = decode_add_receipt(&payload).unwrap();
    assert_eq!(hash, 0xdead_beef);
    assert_eq!(outcome, InsertOutcome::AlreadyPresent);
}

#[test]
fn test_add_receipt_rejects_bad_outcome_byte() {
    let mut payload = vec![9u8];
    payload.extend_from_slice(b"42");
    assert!(matches!(
        decode_add_receipt(&payload).unwrap_err(),
        StoreError::Protocol(_)
    ));
    assert!(matches!(
        decode_add_receipt(&[]).unwrap_err(),
        StoreError::Protocol(_)
    ));
}

#[test]
fn test_load_failure_payload() {
    let response = Response::load_failed("game", "hashes.game.txt: permission denied");
    let payload = response.payload.as_deref().unwrap();

    let (table, detail) = decode_load_failure(payload).unwrap();
    assert_eq!(table, "game");
    assert_eq!(detail, "hashes.game.txt: permission denied");
}

// =============================================================================
// Stream Helper Tests
// =============================================================================

#[test]
fn test_stream_round_trip() {
    let mut buffer = Vec::new();
    write_command(
        &mut buffer,
        &Command::AddHash {
            table: "game".to_string(),
            value: "data/menu/hud.bin".to_string(),
        },
    )
    .unwrap();
    write_response(&mut buffer, &Response::add_ok(7, InsertOutcome::Inserted)).unwrap();

    let mut cursor = Cursor::new(buffer);
    match read_command(&mut cursor).unwrap() {
        Command::AddHash { table, value } => {
            assert_eq!(table, "game");
            assert_eq!(value, "data/menu/hud.bin");
        }
        other => panic!("Expected AddHash, got {:?}", other),
    }

    let response = read_response(&mut cursor).unwrap();
    assert_eq!(response.status, Status::Ok);
    let (hash, outcome) = decode_add_receipt(response.payload.as_deref().unwrap()).unwrap();
    assert_eq!(hash, 7);
    assert_eq!(outcome, InsertOutcome::Inserted);
}

#[test]
fn test_stream_read_on_closed_source_is_eof() {
    let mut cursor = Cursor::new(Vec::<u8>::new());
    match read_command(&mut cursor).unwrap_err() {
        StoreError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
        other => panic!("Expected Io(UnexpectedEof), got {:?}", other),
    }
}
