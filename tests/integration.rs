// End-to-end scenarios over the public API: concrete edit cases,
// boundary inputs, and compressed-frame detection.

use fosdelta::{
    analyze, apply, apply_batch, apply_with_options, create, create_with_options, output_size,
    ApplyOptions, CreateOptions, DeltaError,
};

const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

fn roundtrip(source: &[u8], target: &[u8]) -> Vec<u8> {
    let delta = create(source, target).expect("create failed");
    let restored = apply(source, &delta).expect("apply failed");
    assert_eq!(
        restored,
        target,
        "roundtrip mismatch (source={}, target={}, delta={})",
        source.len(),
        target.len(),
        delta.len()
    );
    delta
}

// ---------------------------------------------------------------------------
// Concrete scenarios
// ---------------------------------------------------------------------------

#[test]
fn word_inserted_mid_sentence() {
    roundtrip(b"Hello world!", b"Hello Bare world!");
}

#[test]
fn empty_source_full_insert() {
    let delta = roundtrip(b"", b"New content");
    let stats = analyze(&delta).unwrap();
    assert_eq!(stats.inserted, b"New content".len() as u64);
    assert_eq!(stats.copied, 0);
}

#[test]
fn empty_target_parses_cleanly() {
    let delta = roundtrip(b"Some content", b"");
    assert_eq!(output_size(&delta).unwrap(), 0);
    let stats = analyze(&delta).unwrap();
    assert_eq!(stats.copied + stats.inserted, 0);
}

#[test]
fn identical_buffers_produce_copy() {
    let data = b"Identical content".repeat(8);
    let delta = roundtrip(&data, &data);
    let stats = analyze(&delta).unwrap();
    assert!(stats.copied > 0, "expected at least one copy record");
    assert!(delta.len() < data.len());
}

#[test]
fn sparse_point_edits_stay_small() {
    let mut target: Vec<u8> = (0..10_000u32).map(|i| (i % 127) as u8).collect();
    let source = target.clone();
    target[100] = 255;
    target[5000] = 255;
    target[9999] = 255;

    let delta = create(&source, &target).unwrap();
    assert!(
        delta.len() < 1000,
        "three point edits should need < 1000 delta bytes, got {}",
        delta.len()
    );
    assert_eq!(apply(&source, &delta).unwrap(), target);
}

#[test]
fn garbage_delta_rejected() {
    let result = apply(b"hello", b"invalid delta data");
    assert!(matches!(
        result,
        Err(DeltaError::Malformed(_) | DeltaError::SourceMismatch(_))
    ));
}

// ---------------------------------------------------------------------------
// Boundary behaviour
// ---------------------------------------------------------------------------

#[test]
fn source_shorter_than_window() {
    // Below the 16-byte default window no block index exists.
    let delta = roundtrip(b"short", b"a considerably longer replacement text");
    let stats = analyze(&delta).unwrap();
    assert_eq!(stats.copied, 0);
}

#[test]
fn single_byte_buffers() {
    roundtrip(b"a", b"b");
    roundtrip(b"a", b"a");
    roundtrip(b"", b"a");
    roundtrip(b"a", b"");
}

#[test]
fn both_empty() {
    roundtrip(b"", b"");
}

#[test]
fn target_shorter_than_window() {
    let source: Vec<u8> = (0u16..512).map(|i| (i % 256) as u8).collect();
    roundtrip(&source, b"tiny");
}

#[test]
fn binary_data_with_embedded_operators() {
    // Literals containing '@', ':', ',' and ';' must not confuse the
    // stream, since record boundaries are length-framed.
    let source = b"@@@:::,,,;;;".repeat(40);
    let mut target = source.clone();
    target.extend_from_slice(b";@:,");
    roundtrip(&source, &target);
}

#[test]
fn large_shifted_block() {
    let block: Vec<u8> = (0..64 * 1024u32).map(|i| (i * 31 % 255) as u8).collect();
    let mut target = vec![0u8; 100];
    target.extend_from_slice(&block);
    let delta = roundtrip(&block, &target);
    assert!(
        delta.len() < block.len() / 10,
        "shifted block should compress well, delta={}",
        delta.len()
    );
}

#[test]
fn output_size_reports_header() {
    let source = b"base data for size query";
    let target = b"patched data for size query, grown a little";
    let delta = create(source, target).unwrap();
    assert_eq!(output_size(&delta).unwrap(), target.len());
    assert!(output_size(b"").is_err());
}

// ---------------------------------------------------------------------------
// Compression wrapper
// ---------------------------------------------------------------------------

#[test]
fn compressed_delta_carries_zstd_magic() {
    let source = b"some text that appears in both versions of the file";
    let target = b"some text that appears in both revisions of the file";
    let opts = CreateOptions {
        compressed: true,
        ..Default::default()
    };
    let delta = create_with_options(source, target, &opts).unwrap();
    assert_eq!(&delta[..4], &ZSTD_MAGIC);
    assert_eq!(apply(source, &delta).unwrap(), target);
}

#[test]
fn uncompressed_delta_lacks_magic() {
    let delta = create(b"aaaa", b"bbbb").unwrap();
    assert_ne!(&delta[..4.min(delta.len())], &ZSTD_MAGIC);
}

#[test]
fn apply_ignores_advisory_compressed_flag() {
    let source = b"flag should not matter";
    let target = b"flag must not matter";
    let raw = create(source, target).unwrap();
    let wrapped = create_with_options(
        source,
        target,
        &CreateOptions {
            compressed: true,
            ..Default::default()
        },
    )
    .unwrap();

    for delta in [&raw, &wrapped] {
        for compressed in [false, true] {
            let opts = ApplyOptions {
                compressed,
                ..Default::default()
            };
            assert_eq!(apply_with_options(source, delta, &opts).unwrap(), target);
        }
    }
}

#[test]
fn corrupt_zstd_body_is_decompression_failure() {
    let source = b"corruption target";
    let opts = CreateOptions {
        compressed: true,
        ..Default::default()
    };
    let mut delta = create_with_options(source, b"corruption tarjet", &opts).unwrap();
    for b in delta.iter_mut().skip(4) {
        *b ^= 0xA5;
    }
    assert!(matches!(
        apply(source, &delta),
        Err(DeltaError::Decompression(_))
    ));
}

#[test]
fn compressible_text_shrinks_when_wrapped() {
    let source = b"The quick brown fox. ".repeat(50);
    let mut target = source.clone();
    target.extend_from_slice(&b"And the lazy dog, over and over again. ".repeat(80));

    let raw = create(&source, &target).unwrap();
    let wrapped = create_with_options(
        &source,
        &target,
        &CreateOptions {
            compressed: true,
            ..Default::default()
        },
    )
    .unwrap();
    assert!(
        wrapped.len() <= raw.len(),
        "text-like delta should not grow under zstd: {} > {}",
        wrapped.len(),
        raw.len()
    );
    assert_eq!(apply(&source, &wrapped).unwrap(), target);
}

#[test]
fn compressed_roundtrip_binary() {
    let source: Vec<u8> = (0u32..20_000)
        .map(|i| (i.wrapping_mul(2654435761) >> 24) as u8)
        .collect();
    let mut target = source.clone();
    target[7777] ^= 0x10;
    target.truncate(15_000);

    let opts = CreateOptions {
        compressed: true,
        ..Default::default()
    };
    let delta = create_with_options(&source, &target, &opts).unwrap();
    assert_eq!(apply(&source, &delta).unwrap(), target);
}

// ---------------------------------------------------------------------------
// Corruption and batch behaviour
// ---------------------------------------------------------------------------

#[test]
fn first_byte_flip_never_yields_wrong_output() {
    let source: Vec<u8> = (0u16..2048).map(|i| (i % 256) as u8).collect();
    let mut target = source.clone();
    target[1024] ^= 0x55;
    let delta = create(&source, &target).unwrap();

    for bit in 0..8 {
        let mut corrupted = delta.clone();
        corrupted[0] ^= 1 << bit;
        match apply(&source, &corrupted) {
            // A flipped header only changes the declared size, which the
            // trailer's size cross-check or a bound check must catch.
            Err(DeltaError::Malformed(_) | DeltaError::SourceMismatch(_)) => {}
            Err(other) => panic!("unexpected error kind: {other}"),
            Ok(out) => panic!("corrupted delta applied, produced {} bytes", out.len()),
        }
    }
}

#[test]
fn batch_chain_reconstructs_final_version() {
    let mut versions: Vec<Vec<u8>> = Vec::new();
    let mut current: Vec<u8> = (0u16..4096).map(|i| (i % 256) as u8).collect();
    versions.push(current.clone());
    for step in 0u8..5 {
        current[step as usize * 700] = 0xE0 | step;
        current.extend_from_slice(b"grow");
        versions.push(current.clone());
    }

    let deltas: Vec<Vec<u8>> = versions
        .windows(2)
        .map(|pair| create(&pair[0], &pair[1]).unwrap())
        .collect();

    let last = versions.last().unwrap();
    assert_eq!(&apply_batch(&versions[0], &deltas).unwrap(), last);
}

#[test]
fn batch_halts_at_first_bad_step() {
    let v0 = b"batch base".to_vec();
    let v1 = b"batch base, edited".to_vec();
    let deltas = vec![
        create(&v0, &v1).unwrap(),
        b"broken".to_vec(),
        create(&v1, &v0).unwrap(),
    ];
    match apply_batch(&v0, &deltas) {
        Err(DeltaError::Batch { index, .. }) => assert_eq!(index, 1),
        other => panic!("expected a batch error, got {other:?}"),
    }
}
