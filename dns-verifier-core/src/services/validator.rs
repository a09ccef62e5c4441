//! Per-type comparison of an answer set against an expected record group.
//!
//! Every type compares as an unordered set of a type-specific key: answer
//! order is never significant and duplicate values collapse.

use std::collections::BTreeSet;
use std::fmt;

use crate::error::ValidationError;
use crate::types::{AnswerData, AnswerRecord, ExpectedRecord, RecordGroup, RecordType};

/// Separator between TXT character-strings in a comparison key.
const TXT_SEGMENT_SEPARATOR: &str = "\0";

/// Comparison key of one record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum RecordKey {
    /// Address literal or hostname.
    Value(String),
    Caa { tag: String, value: String },
    Mx { preference: u16, exchange: String },
    /// Segments joined with [`TXT_SEGMENT_SEPARATOR`].
    Txt(String),
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.write_str(value),
            Self::Caa { tag, value } => write!(f, "{tag} {value:?}"),
            Self::Mx {
                preference,
                exchange,
            } => write!(f, "{preference} {exchange}"),
            Self::Txt(joined) => write!(f, "{joined:?}"),
        }
    }
}

/// Comparison rule for one supported record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeRule {
    A,
    Aaaa,
    Cname,
    Caa,
    Mx,
    Txt,
}

impl TypeRule {
    fn for_type(record_type: &RecordType) -> Option<Self> {
        match record_type {
            RecordType::A => Some(Self::A),
            RecordType::Aaaa => Some(Self::Aaaa),
            RecordType::Cname => Some(Self::Cname),
            RecordType::Caa => Some(Self::Caa),
            RecordType::Mx => Some(Self::Mx),
            RecordType::Txt => Some(Self::Txt),
            RecordType::Unsupported(_) => None,
        }
    }

    fn expected_key(self, record: &ExpectedRecord) -> RecordKey {
        match self {
            Self::A | Self::Aaaa | Self::Cname => RecordKey::Value(record.target.clone()),
            Self::Caa => RecordKey::Caa {
                tag: record.caa_tag.clone().unwrap_or_default(),
                value: record.target.clone(),
            },
            Self::Mx => RecordKey::Mx {
                preference: record.mx_preference.unwrap_or_default(),
                exchange: record.target.clone(),
            },
            Self::Txt => RecordKey::Txt(record.txt_segments.join(TXT_SEGMENT_SEPARATOR)),
        }
    }

    /// `None` when the payload is of another type.
    fn answer_key(self, data: &AnswerData) -> Option<RecordKey> {
        match (self, data) {
            (Self::A, AnswerData::A(addr)) => Some(RecordKey::Value(addr.to_string())),
            (Self::Aaaa, AnswerData::Aaaa(addr)) => Some(RecordKey::Value(addr.to_string())),
            (Self::Cname, AnswerData::Cname(target)) => Some(RecordKey::Value(target.clone())),
            (Self::Caa, AnswerData::Caa { tag, value }) => Some(RecordKey::Caa {
                tag: tag.clone(),
                value: value.clone(),
            }),
            (
                Self::Mx,
                AnswerData::Mx {
                    preference,
                    exchange,
                },
            ) => Some(RecordKey::Mx {
                preference: *preference,
                exchange: exchange.clone(),
            }),
            (Self::Txt, AnswerData::Txt(segments)) => {
                Some(RecordKey::Txt(segments.join(TXT_SEGMENT_SEPARATOR)))
            }
            _ => None,
        }
    }
}

/// Run the shared pre-check and the type-specific comparison.
pub fn validate(answers: &[AnswerRecord], expected: &RecordGroup) -> Result<(), ValidationError> {
    precheck(answers, expected)?;
    compare(answers, expected)
}

/// Count and TTL checks shared by every record type.
///
/// Only an upper TTL bound is enforced.
pub fn precheck(answers: &[AnswerRecord], expected: &RecordGroup) -> Result<(), ValidationError> {
    if answers.len() != expected.len() {
        return Err(ValidationError::CountMismatch {
            expected: expected.len(),
            actual: answers.len(),
        });
    }

    let ceiling = expected.ttl_ceiling();
    if let Some(answer) = answers.iter().find(|a| a.ttl > ceiling) {
        return Err(ValidationError::TtlExceeded {
            ceiling,
            actual: answer.ttl,
        });
    }
    Ok(())
}

/// Compare the answer set with the expected group as sets of comparison keys.
pub fn compare(answers: &[AnswerRecord], expected: &RecordGroup) -> Result<(), ValidationError> {
    let record_type = expected.record_type();
    let rule = TypeRule::for_type(record_type)
        .ok_or_else(|| ValidationError::UnsupportedType(record_type.clone()))?;

    let expected_keys: BTreeSet<RecordKey> = expected
        .records()
        .iter()
        .map(|record| rule.expected_key(record))
        .collect();

    let actual_keys = answers
        .iter()
        .map(|answer| {
            rule.answer_key(&answer.data)
                .ok_or_else(|| ValidationError::WrongType {
                    expected: record_type.clone(),
                    actual: answer.data.record_type(),
                })
        })
        .collect::<Result<BTreeSet<RecordKey>, _>>()?;

    if expected_keys == actual_keys {
        Ok(())
    } else {
        Err(ValidationError::ValueMismatch {
            expected: render(&expected_keys),
            actual: render(&actual_keys),
        })
    }
}

fn render(keys: &BTreeSet<RecordKey>) -> Vec<String> {
    keys.iter().map(ToString::to_string).collect()
}
