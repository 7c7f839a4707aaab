use crate::payload::Payload;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("static pattern compiles"));

/// Inclusive `[min, max]` id span of one batch. Only ever used for progress output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdRange {
    pub min: u64,
    pub max: u64,
}

impl IdRange {
    fn include(range: Option<Self>, id: u64) -> Self {
        match range {
            Some(range) => Self {
                min: range.min.min(id),
                max: range.max.max(id),
            },
            None => Self { min: id, max: id },
        }
    }
}

impl fmt::Display for IdRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.min, self.max)
    }
}

/// Result of scanning a batch for ids: the span of every id that parsed and
/// how many payloads had to be skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchIds {
    pub range: Option<IdRange>,
    pub malformed: usize,
}

/// Derives a human readable id range from the `out_name` of each payload.
///
/// The id source is the leading `-`-separated token of `out_name`. The first
/// run of digits inside that token is the id; a token without digits is
/// tried as a whole and usually fails. Malformed names are logged and
/// skipped, they never fail the batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchIdentifier;

impl BatchIdentifier {
    pub fn range(batch: &[Payload]) -> Option<IdRange> {
        Self::identify(batch).range
    }

    pub fn identify(batch: &[Payload]) -> BatchIds {
        let mut ids = BatchIds::default();
        for payload in batch {
            match payload_id(payload) {
                Ok(id) => ids.range = Some(IdRange::include(ids.range, id)),
                Err(reason) => {
                    ids.malformed += 1;
                    tracing::warn!(
                        out_name = payload.out_name().unwrap_or("<missing>"),
                        reason,
                        "could not derive payload id for progress reporting"
                    );
                }
            }
        }
        ids
    }
}

fn payload_id(payload: &Payload) -> Result<u64, &'static str> {
    let out_name = payload.out_name().ok_or("out_name missing or not a string")?;
    let leading = out_name.split('-').next().unwrap_or_default();
    let source = DIGITS
        .find(leading)
        .map(|digits| digits.as_str())
        .unwrap_or(leading);
    source
        .parse::<u64>()
        .map_err(|_| "leading token is not numeric")
}
