use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Free-form link metadata carried on a piece of evidence.
///
/// Values are JSON so numeric link data (an r² or a p-value) survives a
/// round trip without being stringified.
pub type EvidenceNotes = BTreeMap<String, Value>;

///
/// One piece of support for tagging a feature with a disease.
///
/// `fid` and `fname` identify the *source* of the tag (a study id and its
/// first author, a region id and its name), not the tagged feature itself.
/// Two Evidence values are equal iff `fid` and `fname` match; `fnotes` is
/// retained but never participates in dedup.
///
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evidence {
    pub fid: String,
    pub fname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fnotes: Option<EvidenceNotes>,
}

impl Evidence {
    pub fn new(fid: &str, fname: &str) -> Self {
        Evidence {
            fid: fid.to_string(),
            fname: fname.to_string(),
            fnotes: None,
        }
    }

    pub fn with_notes(fid: &str, fname: &str, fnotes: EvidenceNotes) -> Self {
        let fnotes = if fnotes.is_empty() { None } else { Some(fnotes) };
        Evidence {
            fid: fid.to_string(),
            fname: fname.to_string(),
            fnotes,
        }
    }

    /// Evidence carrying the linkid/linkname/linkdata/linkvalue note set
    /// used by the correlation and significance rules.
    pub fn linked(
        fid: &str,
        fname: &str,
        linkid: &str,
        linkname: &str,
        linkdata: &str,
        linkvalue: f64,
    ) -> Self {
        let mut fnotes = EvidenceNotes::new();
        fnotes.insert("linkid".to_string(), Value::from(linkid));
        fnotes.insert("linkname".to_string(), Value::from(linkname));
        fnotes.insert("linkdata".to_string(), Value::from(linkdata));
        fnotes.insert("linkvalue".to_string(), Value::from(linkvalue));
        Evidence::with_notes(fid, fname, fnotes)
    }
}

impl PartialEq for Evidence {
    fn eq(&self, other: &Self) -> bool {
        self.fid == other.fid && self.fname == other.fname
    }
}

impl Eq for Evidence {}
