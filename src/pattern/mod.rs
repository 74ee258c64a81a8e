//! Query preparation: folding, AND-token splitting, and a cheap bitmask prefilter

/// Fold a byte for case-insensitive comparison. Identity under case-sensitive mode.
#[inline]
pub fn fold(byte: u8, case_sensitive: bool) -> u8 {
    if case_sensitive {
        byte
    } else {
        byte.to_ascii_lowercase()
    }
}

/// Compute the folded-byte bitmask of a byte slice: bit `b & 63` is set for
/// every distinct folded byte value present.
pub fn byte_mask(bytes: &[u8], case_sensitive: bool) -> u64 {
    let mut mask = 0u64;
    for &b in bytes {
        mask |= 1u64 << (fold(b, case_sensitive) & 63);
    }
    mask
}

/// A parsed, pre-folded query ready to be matched against many candidates.
///
/// Whitespace (ASCII space) splits the query into AND tokens: a candidate
/// must match every token for the pattern to match. A pattern with a single
/// token after splitting is the common case and is matched directly without
/// the multi-token accounting overhead.
#[derive(Debug, Clone)]
pub struct PreparedPattern {
    original: String,
    folded: Vec<u8>,
    /// Byte ranges into `folded`, one per non-empty whitespace-separated token.
    token_ranges: Vec<(usize, usize)>,
    case_sensitive: bool,
    mask: u64,
}

impl PreparedPattern {
    /// Prepare a non-empty query. Callers should special-case the empty
    /// query themselves; it is handled as a distinguished fast path upstream
    /// and never reaches a `PreparedPattern`.
    pub fn prepare(query: &str, case_sensitive: bool) -> Option<Self> {
        if query.is_empty() {
            return None;
        }
        let folded: Vec<u8> = query
            .as_bytes()
            .iter()
            .map(|&b| fold(b, case_sensitive))
            .collect();

        let mut token_ranges = Vec::new();
        let mut start = None;
        for (i, &b) in folded.iter().enumerate() {
            if b == b' ' {
                if let Some(s) = start.take() {
                    token_ranges.push((s, i));
                }
            } else if start.is_none() {
                start = Some(i);
            }
        }
        if let Some(s) = start {
            token_ranges.push((s, folded.len()));
        }
        if token_ranges.is_empty() {
            return None;
        }

        let mask = byte_mask(&folded, case_sensitive);

        Some(Self {
            original: query.to_string(),
            folded,
            token_ranges,
            case_sensitive,
            mask,
        })
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn is_multi_token(&self) -> bool {
        self.token_ranges.len() > 1
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn mask(&self) -> u64 {
        self.mask
    }

    /// The folded bytes of each AND token, in query order.
    pub fn tokens(&self) -> impl Iterator<Item = &[u8]> {
        self.token_ranges.iter().map(|&(s, e)| &self.folded[s..e])
    }

    pub fn token_count(&self) -> usize {
        self.token_ranges.len()
    }
}
