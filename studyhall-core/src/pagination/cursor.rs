//! Cursor codec.
//!
//! Scalar cursors travel as their raw value: a decimal integer or a
//! hyphenated UUID. Compound cursors travel as URL-safe base64 of a JSON
//! object and are checked against the composite key they paginate.

use std::fmt;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::types::{CommentId, PostId, UserId};

// Decode bound for untrusted cursor input.
const MAX_CURSOR_TOKEN_LEN: usize = 1024;

/// A single sort-key value identifying the last row of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CursorValue {
    Int(i64),
    Uuid(Uuid),
}

impl CursorValue {
    pub fn kind(&self) -> CursorKind {
        match self {
            CursorValue::Int(_) => CursorKind::Int,
            CursorValue::Uuid(_) => CursorKind::Uuid,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CursorValue::Int(value) => Some(*value),
            CursorValue::Uuid(_) => None,
        }
    }

    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            CursorValue::Uuid(value) => Some(*value),
            CursorValue::Int(_) => None,
        }
    }

    fn to_json(self) -> Value {
        match self {
            CursorValue::Int(value) => Value::from(value),
            CursorValue::Uuid(value) => Value::String(value.to_string()),
        }
    }
}

impl fmt::Display for CursorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CursorValue::Int(value) => write!(f, "{value}"),
            CursorValue::Uuid(value) => write!(f, "{value}"),
        }
    }
}

impl From<CommentId> for CursorValue {
    fn from(id: CommentId) -> Self {
        CursorValue::Int(id.as_i64())
    }
}

impl From<PostId> for CursorValue {
    fn from(id: PostId) -> Self {
        CursorValue::Uuid(id.as_uuid())
    }
}

impl From<UserId> for CursorValue {
    fn from(id: UserId) -> Self {
        CursorValue::Uuid(id.as_uuid())
    }
}

/// The value type a cursor field is expected to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorKind {
    Int,
    Uuid,
}

impl CursorKind {
    pub fn describe(self) -> &'static str {
        match self {
            CursorKind::Int => "integer",
            CursorKind::Uuid => "UUID",
        }
    }
}

/// One named field of a composite key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPart {
    pub name: &'static str,
    pub kind: CursorKind,
}

/// Ordered field list of a composite unique key, e.g. `(user_id, post_id)`.
#[derive(Debug, PartialEq, Eq)]
pub struct CompositeKey {
    parts: &'static [KeyPart],
}

impl CompositeKey {
    pub const fn new(parts: &'static [KeyPart]) -> Self {
        Self { parts }
    }

    pub fn parts(&self) -> &'static [KeyPart] {
        self.parts
    }

    fn part(&self, name: &str) -> Option<&'static KeyPart> {
        self.parts.iter().find(|part| part.name == name)
    }
}

/// A cursor made of one value per composite-key field, kept in key order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundCursor {
    values: Vec<(&'static str, CursorValue)>,
}

impl CompoundCursor {
    /// Build a cursor for `key`. Every key field must be supplied exactly
    /// with a value of the right kind; unknown fields are rejected.
    pub fn new<'a>(
        key: &CompositeKey,
        values: impl IntoIterator<Item = (&'a str, CursorValue)>,
    ) -> Result<Self, ValidationError> {
        let supplied: Vec<(&'a str, CursorValue)> = values.into_iter().collect();

        if let Some((name, _)) = supplied.iter().find(|(name, _)| key.part(name).is_none()) {
            return Err(ValidationError::UnknownCursorField {
                field: (*name).to_string(),
            });
        }

        let mut ordered = Vec::with_capacity(key.parts().len());
        for part in key.parts() {
            let value = supplied
                .iter()
                .find(|(name, _)| *name == part.name)
                .map(|(_, value)| *value)
                .ok_or(ValidationError::MissingCursorField { field: part.name })?;

            if value.kind() != part.kind {
                return Err(ValidationError::InvalidCursor {
                    raw: value.to_string(),
                    expected: part.kind.describe(),
                });
            }
            ordered.push((part.name, value));
        }

        Ok(Self { values: ordered })
    }

    /// Cursor from a row's own key, already in key order.
    pub(crate) fn from_row_key(values: Vec<(&'static str, CursorValue)>) -> Self {
        Self { values }
    }

    pub fn get(&self, field: &str) -> Option<CursorValue> {
        self.values
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, value)| *value)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&'static str, CursorValue)> + '_ {
        self.values.iter().copied()
    }

    /// Confirm this cursor covers every field of `key` with the expected kinds.
    pub fn validate_against(&self, key: &CompositeKey) -> Result<(), ValidationError> {
        CompoundCursor::new(key, self.fields()).map(|_| ())
    }
}

/// Encodes and decodes the opaque cursor tokens exchanged with callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct CursorCodec;

impl CursorCodec {
    pub fn encode(value: &CursorValue) -> String {
        value.to_string()
    }

    pub fn decode(kind: CursorKind, token: &str) -> Result<CursorValue, ValidationError> {
        let token = check_token(token)?;
        let invalid = || ValidationError::InvalidCursor {
            raw: token.to_string(),
            expected: kind.describe(),
        };

        match kind {
            CursorKind::Int => token
                .parse::<i64>()
                .map(CursorValue::Int)
                .map_err(|_| invalid()),
            CursorKind::Uuid => Uuid::parse_str(token)
                .map(CursorValue::Uuid)
                .map_err(|_| invalid()),
        }
    }

    /// Decode an optional query-string cursor. An absent cursor is fine; a
    /// present but malformed one is not.
    pub fn decode_optional(
        kind: CursorKind,
        token: Option<&str>,
    ) -> Result<Option<CursorValue>, ValidationError> {
        token.map(|token| Self::decode(kind, token)).transpose()
    }

    pub fn encode_compound(cursor: &CompoundCursor) -> String {
        let mut object = Map::new();
        for (name, value) in cursor.fields() {
            object.insert(name.to_string(), value.to_json());
        }
        URL_SAFE_NO_PAD.encode(Value::Object(object).to_string())
    }

    pub fn decode_compound(
        key: &CompositeKey,
        token: &str,
    ) -> Result<CompoundCursor, ValidationError> {
        let token = check_token(token)?;
        let invalid = || ValidationError::InvalidCursor {
            raw: token.to_string(),
            expected: "compound cursor",
        };

        let bytes = URL_SAFE_NO_PAD.decode(token).map_err(|_| invalid())?;
        let Value::Object(object) =
            serde_json::from_slice::<Value>(&bytes).map_err(|_| invalid())?
        else {
            return Err(invalid());
        };

        let mut values = Vec::with_capacity(object.len());
        for (name, raw) in &object {
            let Some(part) = key.part(name) else {
                return Err(ValidationError::UnknownCursorField {
                    field: name.clone(),
                });
            };
            let value = match (part.kind, raw) {
                (CursorKind::Int, Value::Number(number)) => number.as_i64().map(CursorValue::Int),
                (CursorKind::Uuid, Value::String(text)) => {
                    Uuid::parse_str(text).ok().map(CursorValue::Uuid)
                }
                _ => None,
            }
            .ok_or_else(|| ValidationError::InvalidCursor {
                raw: raw.to_string(),
                expected: part.kind.describe(),
            })?;
            values.push((part.name, value));
        }

        CompoundCursor::new(key, values)
    }
}

fn check_token(token: &str) -> Result<&str, ValidationError> {
    let token = token.trim();

    if token.is_empty() {
        return Err(ValidationError::EmptyCursor);
    }

    if token.len() > MAX_CURSOR_TOKEN_LEN {
        return Err(ValidationError::CursorTooLong {
            len: token.len(),
            max: MAX_CURSOR_TOKEN_LEN,
        });
    }

    Ok(token)
}
