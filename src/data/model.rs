use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Key – the value a record projects to under a dimension
// ---------------------------------------------------------------------------

/// An ordered value produced by projecting a [`Record`].
///
/// Groups are kept in `BTreeMap`s, so `Key` must be `Ord`. The derived order
/// compares the variant first, then the payload; tuples compare
/// lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    /// The single key of a group that is not keyed on a dimension.
    All,
    Int(i64),
    Text(String),
    /// Composite key, e.g. `(yrs_service, salary, sex, rank)` for scatter views.
    Tuple(Vec<Key>),
}

impl Key {
    pub fn text(s: impl Into<String>) -> Self {
        Key::Text(s.into())
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Key::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Component `i` of a tuple key.
    pub fn component(&self, i: usize) -> Option<&Key> {
        match self {
            Key::Tuple(parts) => parts.get(i),
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::All => write!(f, "(all)"),
            Key::Int(i) => write!(f, "{i}"),
            Key::Text(s) => write!(f, "{s}"),
            Key::Tuple(parts) => {
                write!(f, "(")?;
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{part}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl From<i64> for Key {
    fn from(v: i64) -> Self {
        Key::Int(v)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Text(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Field / Projection
// ---------------------------------------------------------------------------

/// The attributes of a [`Record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Discipline,
    Sex,
    Rank,
    Salary,
    YrsService,
    YrsSincePhd,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Discipline,
        Field::Sex,
        Field::Rank,
        Field::Salary,
        Field::YrsService,
        Field::YrsSincePhd,
    ];

    /// Column name in the source file header.
    pub fn column(self) -> &'static str {
        match self {
            Field::Discipline => "discipline",
            Field::Sex => "sex",
            Field::Rank => "rank",
            Field::Salary => "salary",
            Field::YrsService => "yrs.service",
            Field::YrsSincePhd => "yrs.since.phd",
        }
    }
}

/// How a dimension derives its key from a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Projection {
    Field(Field),
    Composite(Vec<Field>),
}

impl Projection {
    pub fn key(&self, record: &Record) -> Key {
        match self {
            Projection::Field(field) => record.key(*field),
            Projection::Composite(fields) => {
                Key::Tuple(fields.iter().map(|f| record.key(*f)).collect())
            }
        }
    }
}

impl From<Field> for Projection {
    fn from(field: Field) -> Self {
        Projection::Field(field)
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the dataset
// ---------------------------------------------------------------------------

/// One faculty member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub discipline: String,
    pub sex: String,
    pub rank: String,
    pub salary: i64,
    pub yrs_service: i64,
    pub yrs_since_phd: i64,
}

impl Record {
    pub fn int(&self, field: Field) -> Option<i64> {
        match field {
            Field::Salary => Some(self.salary),
            Field::YrsService => Some(self.yrs_service),
            Field::YrsSincePhd => Some(self.yrs_since_phd),
            _ => None,
        }
    }

    pub fn text(&self, field: Field) -> Option<&str> {
        match field {
            Field::Discipline => Some(&self.discipline),
            Field::Sex => Some(&self.sex),
            Field::Rank => Some(&self.rank),
            _ => None,
        }
    }

    pub fn key(&self, field: Field) -> Key {
        match self.int(field) {
            Some(v) => Key::Int(v),
            None => Key::text(self.text(field).unwrap_or_default()),
        }
    }

    /// Compare one attribute against a key without allocating.
    pub fn matches(&self, field: Field, key: &Key) -> bool {
        match key {
            Key::Int(v) => self.int(field) == Some(*v),
            Key::Text(s) => self.text(field) == Some(s.as_str()),
            _ => false,
        }
    }
}
