// Delta engine: command-stream encoder and single-pass applier.
//
// The wire format is a self-describing command stream:
//   header:  varint(L)                 declared target length
//   copy:    varint(cnt) '@' varint(ofst) ','
//   insert:  varint(cnt) ':' <cnt literal bytes>
//   trailer: varint(cksum) ';'
//
// The encoder indexes the source in W-byte blocks, slides a rolling hash
// over the target, verifies index candidates byte-exact, extends matches
// in both directions and emits a copy only when it pays for its own
// framing. The applier replays the stream in one pass.

use crate::checksum::checksum;
use crate::compress;
use crate::error::{DeltaError, Result};
use crate::hash::matching::{backward_match, forward_match};
use crate::hash::rolling::{RollingHash, DEFAULT_WINDOW};
use crate::hash::table::BlockIndex;
use crate::varint;

/// Default bound on collision-chain candidates examined per probe.
pub const DEFAULT_SEARCH_DEPTH: usize = 64;

/// Headroom reserved beyond the target length for command framing.
const DELTA_PADDING: usize = 1024;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Tuning knobs for [`create_with_options`].
#[derive(Debug, Clone)]
pub struct CreateOptions {
    /// Rolling-hash window width. Power of two, at least 2; anything else
    /// is silently replaced by the default of 16.
    pub hash_window_size: usize,
    /// Maximum collision-chain candidates examined per probe. Zero is
    /// replaced by the default of 64.
    pub search_depth: usize,
    /// Wrap the command stream in a Zstandard frame.
    pub compressed: bool,
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self {
            hash_window_size: DEFAULT_WINDOW,
            search_depth: DEFAULT_SEARCH_DEPTH,
            compressed: false,
        }
    }
}

impl CreateOptions {
    fn window(&self) -> usize {
        if self.hash_window_size >= 2 && self.hash_window_size.is_power_of_two() {
            self.hash_window_size
        } else {
            DEFAULT_WINDOW
        }
    }

    fn depth(&self) -> usize {
        if self.search_depth == 0 {
            DEFAULT_SEARCH_DEPTH
        } else {
            self.search_depth
        }
    }
}

/// Tuning knobs for [`apply_with_options`].
#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    /// Advisory only: the applier always detects a compressed delta by
    /// its magic prefix, regardless of this flag.
    pub compressed: bool,
    /// Recompute the output checksum and compare it against the trailer.
    /// Off by default; the trailer is always emitted correctly either way.
    pub verify_checksum: bool,
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// Compute a delta that transforms `source` into `target`.
///
/// Never fails on any input pair: the worst case is a single insert
/// covering the whole target. With `compressed` set, the stream is
/// wrapped in a Zstd frame, which is the only fallible step.
pub fn create_with_options(source: &[u8], target: &[u8], opts: &CreateOptions) -> Result<Vec<u8>> {
    let stream = encode(source, target, opts.window(), opts.depth());
    if opts.compressed {
        compress::wrap(&stream)
    } else {
        Ok(stream)
    }
}

/// Candidate match anchored at the current scan position.
struct Match {
    cnt: usize,
    ofst: usize,
    litsz: usize,
}

fn encode(source: &[u8], target: &[u8], window: usize, depth: usize) -> Vec<u8> {
    debug_assert!(target.len() <= u32::MAX as usize);
    debug_assert!(source.len() <= u32::MAX as usize);

    let mut delta = Vec::with_capacity(target.len() + DELTA_PADDING);
    varint::encode_u32(target.len() as u32, &mut delta);

    // A source shorter than one window has no blocks to index, hence no
    // chance of a copy command.
    if source.len() <= window {
        put_insert(&mut delta, target);
        put_trailer(&mut delta, checksum(target));
        return delta;
    }

    let index = BlockIndex::build(source, window);

    // Everything before target[base] has been emitted.
    let mut base = 0usize;
    'scan: while base + window < target.len() {
        let mut hash = RollingHash::new(&target[base..base + window]);
        let mut i = 0usize;
        loop {
            let y = base + i;
            let mut best: Option<Match> = None;

            let mut remaining = depth;
            let mut cursor = index.probe(hash.value());
            while let Some(block) = cursor {
                if remaining == 0 {
                    break;
                }
                remaining -= 1;
                cursor = index.next(block);

                let isrc = block * window;
                // The index matched only the 32-bit hash; collisions are
                // weeded out here with an exact comparison.
                if source[isrc..isrc + window] != target[y..y + window] {
                    continue;
                }

                let fwd = forward_match(&source[isrc + window..], &target[y + window..]);
                let back = backward_match(&source[..isrc], &target[base..y], i.min(isrc));

                let cnt = back + window + fwd;
                let ofst = isrc - back;
                let litsz = i - back;

                // Framing cost of insert(litsz) + copy(cnt, ofst): three
                // operator bytes plus the three integers.
                let cost = varint::sizeof_u32(litsz as u32)
                    + varint::sizeof_u32(cnt as u32)
                    + varint::sizeof_u32(ofst as u32)
                    + 3;
                if cnt >= cost && best.as_ref().map_or(true, |b| cnt > b.cnt) {
                    best = Some(Match { cnt, ofst, litsz });
                }
            }

            if let Some(m) = best {
                if m.litsz > 0 {
                    put_insert(&mut delta, &target[base..base + m.litsz]);
                    base += m.litsz;
                }
                put_copy(&mut delta, m.cnt as u32, m.ofst as u32);
                base += m.cnt;
                continue 'scan;
            }

            if base + i + window >= target.len() {
                // Nothing matched and the window has reached the end.
                put_insert(&mut delta, &target[base..]);
                base = target.len();
                break 'scan;
            }

            hash.next(target[base + i + window]);
            i += 1;
        }
    }

    if base < target.len() {
        put_insert(&mut delta, &target[base..]);
    }
    put_trailer(&mut delta, checksum(target));
    delta
}

fn put_insert(delta: &mut Vec<u8>, bytes: &[u8]) {
    varint::encode_u32(bytes.len() as u32, delta);
    delta.push(b':');
    delta.extend_from_slice(bytes);
}

fn put_copy(delta: &mut Vec<u8>, cnt: u32, ofst: u32) {
    varint::encode_u32(cnt, delta);
    delta.push(b'@');
    varint::encode_u32(ofst, delta);
    delta.push(b',');
}

fn put_trailer(delta: &mut Vec<u8>, sum: u32) {
    varint::encode_u32(sum, delta);
    delta.push(b';');
}

// ---------------------------------------------------------------------------
// Apply
// ---------------------------------------------------------------------------

/// Reconstruct the target from `source` and `delta`.
///
/// A delta carrying the Zstandard magic is decompressed first; anything
/// else is treated as a raw command stream.
pub fn apply_with_options(source: &[u8], delta: &[u8], opts: &ApplyOptions) -> Result<Vec<u8>> {
    if compress::is_wrapped(delta) {
        let stream = compress::unwrap(delta)?;
        decode(source, &stream, opts.verify_checksum)
    } else {
        decode(source, delta, opts.verify_checksum)
    }
}

fn decode(source: &[u8], delta: &[u8], verify: bool) -> Result<Vec<u8>> {
    let (limit, consumed) = varint::read_u32(delta)
        .map_err(|_| DeltaError::Malformed("failed to decode target size header"))?;
    let limit = limit as usize;
    let mut pos = consumed;
    let mut out = Vec::with_capacity(limit);

    loop {
        if pos >= delta.len() {
            return Err(DeltaError::Malformed("delta ended without a trailer"));
        }
        let (cnt, n) = varint::read_u32(&delta[pos..])
            .map_err(|_| DeltaError::Malformed("failed to decode record count"))?;
        pos += n;
        let cnt = cnt as usize;
        let op = *delta
            .get(pos)
            .ok_or(DeltaError::Malformed("record count without an operator"))?;
        pos += 1;

        match op {
            b'@' => {
                let (ofst, n) = varint::read_u32(&delta[pos..])
                    .map_err(|_| DeltaError::Malformed("failed to decode copy offset"))?;
                pos += n;
                if delta.get(pos) != Some(&b',') {
                    return Err(DeltaError::Malformed("copy not terminated by ','"));
                }
                pos += 1;
                if out.len() as u64 + cnt as u64 > limit as u64 {
                    return Err(DeltaError::SourceMismatch(
                        "copy writes past the declared output size",
                    ));
                }
                let ofst = ofst as usize;
                if ofst as u64 + cnt as u64 > source.len() as u64 {
                    return Err(DeltaError::SourceMismatch(
                        "copy extends past the end of the source",
                    ));
                }
                out.extend_from_slice(&source[ofst..ofst + cnt]);
            }
            b':' => {
                if out.len() as u64 + cnt as u64 > limit as u64 {
                    return Err(DeltaError::SourceMismatch(
                        "insert writes past the declared output size",
                    ));
                }
                if cnt > delta.len() - pos {
                    return Err(DeltaError::Malformed(
                        "insert length exceeds the remaining delta",
                    ));
                }
                out.extend_from_slice(&delta[pos..pos + cnt]);
                pos += cnt;
            }
            b';' => {
                if out.len() != limit {
                    return Err(DeltaError::Malformed(
                        "produced size disagrees with the header",
                    ));
                }
                if verify {
                    let actual = checksum(&out);
                    if actual != cnt as u32 {
                        return Err(DeltaError::ChecksumMismatch {
                            expected: cnt as u32,
                            actual,
                        });
                    }
                }
                return Ok(out);
            }
            _ => return Err(DeltaError::Malformed("unknown delta operator")),
        }
    }
}

// ---------------------------------------------------------------------------
// Size query and analysis
// ---------------------------------------------------------------------------

/// Decode the declared output size of `delta` without applying it.
///
/// Accepts raw and compressed deltas alike.
pub fn output_size(delta: &[u8]) -> Result<usize> {
    if compress::is_wrapped(delta) {
        let stream = compress::unwrap(delta)?;
        return output_size_raw(&stream);
    }
    output_size_raw(delta)
}

fn output_size_raw(delta: &[u8]) -> Result<usize> {
    let (size, _) = varint::read_u32(delta)
        .map_err(|_| DeltaError::Malformed("failed to decode target size header"))?;
    Ok(size as usize)
}

/// Byte totals contributed by each record kind of a delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeltaStats {
    /// Output bytes produced by copy records.
    pub copied: u64,
    /// Output bytes produced by insert records.
    pub inserted: u64,
}

/// Walk a delta without a source buffer and total the bytes its copy and
/// insert records would produce.
pub fn analyze(delta: &[u8]) -> Result<DeltaStats> {
    if compress::is_wrapped(delta) {
        let stream = compress::unwrap(delta)?;
        return analyze_raw(&stream);
    }
    analyze_raw(delta)
}

fn analyze_raw(delta: &[u8]) -> Result<DeltaStats> {
    let (_, consumed) = varint::read_u32(delta)
        .map_err(|_| DeltaError::Malformed("failed to decode target size header"))?;
    let mut pos = consumed;
    let mut stats = DeltaStats {
        copied: 0,
        inserted: 0,
    };

    loop {
        if pos >= delta.len() {
            return Err(DeltaError::Malformed("delta ended without a trailer"));
        }
        let (cnt, n) = varint::read_u32(&delta[pos..])
            .map_err(|_| DeltaError::Malformed("failed to decode record count"))?;
        pos += n;
        let op = *delta
            .get(pos)
            .ok_or(DeltaError::Malformed("record count without an operator"))?;
        pos += 1;

        match op {
            b'@' => {
                let (_, n) = varint::read_u32(&delta[pos..])
                    .map_err(|_| DeltaError::Malformed("failed to decode copy offset"))?;
                pos += n;
                if delta.get(pos) != Some(&b',') {
                    return Err(DeltaError::Malformed("copy not terminated by ','"));
                }
                pos += 1;
                stats.copied += cnt as u64;
            }
            b':' => {
                let cnt = cnt as usize;
                if cnt > delta.len() - pos {
                    return Err(DeltaError::Malformed(
                        "insert length exceeds the remaining delta",
                    ));
                }
                pos += cnt;
                stats.inserted += cnt as u64;
            }
            b';' => return Ok(stats),
            _ => return Err(DeltaError::Malformed("unknown delta operator")),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
