use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

///
/// One genomic coordinate span on a named assembly build.
///
/// Coordinates are inclusive at both ends; spans are only ever compared
/// within the same `build`.
///
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenomicSpan {
    pub build: String,
    pub seqid: String,
    pub start: u32,
    pub end: u32,
}

impl GenomicSpan {
    pub fn new(build: &str, seqid: &str, start: u32, end: u32) -> Self {
        GenomicSpan {
            build: build.to_string(),
            seqid: seqid.to_string(),
            start,
            end,
        }
    }

    pub fn width(&self) -> u32 {
        self.end - self.start
    }

    /// Widen the span by `pad` bases on each side, clamped at zero.
    pub fn padded(&self, pad: u32) -> GenomicSpan {
        GenomicSpan {
            build: self.build.clone(),
            seqid: self.seqid.clone(),
            start: self.start.saturating_sub(pad),
            end: self.end.saturating_add(pad),
        }
    }
}

impl Display for GenomicSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{} [{}]", self.seqid, self.start, self.end, self.build)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn test_padded_clamps_at_zero() {
        let span = GenomicSpan::new("38", "1", 100, 500);
        let padded = span.padded(200);
        assert_eq!(padded.start, 0);
        assert_eq!(padded.end, 700);
        assert_eq!(padded.seqid, "1");
    }

    #[test]
    fn test_display() {
        let span = GenomicSpan::new("38", "6", 25_000_000, 35_000_000);
        assert_eq!(span.to_string(), "6:25000000-35000000 [38]");
    }
}
