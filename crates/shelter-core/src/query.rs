//! Query building blocks
//!
//! A [`Filter`] is a conjunction of column predicates (the typed equivalent
//! of a selection clause with bound arguments). A [`SortOrder`] lists the
//! columns to order by. Both compile to SQL for the SQLite store and can be
//! evaluated directly against records for the in-memory store.

use std::cmp::Ordering;

use crate::models::{Column, Pet, PetRow, Value};

/// Comparison operator of a predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    /// SQL `LIKE` with `%` and `_` wildcards, ASCII case-insensitive
    Like,
    IsNull,
    IsNotNull,
}

impl Op {
    fn sql(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::NotEq => "<>",
            Op::Lt => "<",
            Op::Le => "<=",
            Op::Gt => ">",
            Op::Ge => ">=",
            Op::Like => "LIKE",
            Op::IsNull => "IS NULL",
            Op::IsNotNull => "IS NOT NULL",
        }
    }
}

/// A single `column op value` condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub column: Column,
    pub op: Op,
    pub value: Value,
}

impl Predicate {
    fn matches(&self, pet: &Pet) -> bool {
        let field = field_value(pet, self.column);
        match self.op {
            Op::IsNull => field.is_null(),
            Op::IsNotNull => !field.is_null(),
            Op::Like => match (field.as_text(), self.value.as_text()) {
                (Some(text), Some(pattern)) => like(&pattern, &text),
                _ => false,
            },
            op => match compare(&field, &self.value) {
                Some(ordering) => match op {
                    Op::Eq => ordering == Ordering::Equal,
                    Op::NotEq => ordering != Ordering::Equal,
                    Op::Lt => ordering == Ordering::Less,
                    Op::Le => ordering != Ordering::Greater,
                    Op::Gt => ordering == Ordering::Greater,
                    Op::Ge => ordering != Ordering::Less,
                    Op::Like | Op::IsNull | Op::IsNotNull => false,
                },
                None => false,
            },
        }
    }
}

/// Conjunction of predicates; an empty filter matches every record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    predicates: Vec<Predicate>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select exactly the record with this id
    pub fn by_id(id: i64) -> Self {
        Self::new().eq(Column::Id, id)
    }

    pub fn with(mut self, column: Column, op: Op, value: impl Into<Value>) -> Self {
        self.predicates.push(Predicate {
            column,
            op,
            value: value.into(),
        });
        self
    }

    pub fn eq(self, column: Column, value: impl Into<Value>) -> Self {
        self.with(column, Op::Eq, value)
    }

    pub fn not_eq(self, column: Column, value: impl Into<Value>) -> Self {
        self.with(column, Op::NotEq, value)
    }

    pub fn lt(self, column: Column, value: impl Into<Value>) -> Self {
        self.with(column, Op::Lt, value)
    }

    pub fn le(self, column: Column, value: impl Into<Value>) -> Self {
        self.with(column, Op::Le, value)
    }

    pub fn gt(self, column: Column, value: impl Into<Value>) -> Self {
        self.with(column, Op::Gt, value)
    }

    pub fn ge(self, column: Column, value: impl Into<Value>) -> Self {
        self.with(column, Op::Ge, value)
    }

    pub fn like(self, column: Column, pattern: impl Into<String>) -> Self {
        self.with(column, Op::Like, pattern.into())
    }

    pub fn is_null(self, column: Column) -> Self {
        self.with(column, Op::IsNull, Value::Null)
    }

    pub fn is_not_null(self, column: Column) -> Self {
        self.with(column, Op::IsNotNull, Value::Null)
    }

    /// Conjunction of both filters
    pub fn and(&self, other: &Filter) -> Filter {
        let mut predicates = self.predicates.clone();
        predicates.extend(other.predicates.iter().cloned());
        Filter { predicates }
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Evaluate against a record with SQL comparison semantics
    pub fn matches(&self, pet: &Pet) -> bool {
        self.predicates.iter().all(|p| p.matches(pet))
    }

    /// Compile to a `WHERE` clause body and its bound arguments
    ///
    /// Returns `None` for an empty filter.
    pub fn to_sql(&self) -> Option<(String, Vec<Value>)> {
        if self.predicates.is_empty() {
            return None;
        }

        let mut clauses = Vec::with_capacity(self.predicates.len());
        let mut args = Vec::new();
        for predicate in &self.predicates {
            match predicate.op {
                Op::IsNull | Op::IsNotNull => {
                    clauses.push(format!("{} {}", predicate.column.name(), predicate.op.sql()));
                }
                op => {
                    clauses.push(format!("{} {} ?", predicate.column.name(), op.sql()));
                    args.push(predicate.value.clone());
                }
            }
        }
        Some((clauses.join(" AND "), args))
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// Ordered list of sort keys
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortOrder {
    keys: Vec<(Column, Direction)>,
}

impl SortOrder {
    pub fn asc(column: Column) -> Self {
        Self {
            keys: vec![(column, Direction::Asc)],
        }
    }

    pub fn desc(column: Column) -> Self {
        Self {
            keys: vec![(column, Direction::Desc)],
        }
    }

    pub fn then(mut self, column: Column, direction: Direction) -> Self {
        self.keys.push((column, direction));
        self
    }

    pub fn keys(&self) -> &[(Column, Direction)] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Compile to an `ORDER BY` clause body
    pub fn to_sql(&self) -> Option<String> {
        if self.keys.is_empty() {
            return None;
        }
        let keys: Vec<String> = self
            .keys
            .iter()
            .map(|(column, direction)| match direction {
                Direction::Asc => format!("{} ASC", column.name()),
                Direction::Desc => format!("{} DESC", column.name()),
            })
            .collect();
        Some(keys.join(", "))
    }

    /// Compare two records; NULL sorts first, as in SQLite
    pub fn compare(&self, a: &Pet, b: &Pet) -> Ordering {
        for (column, direction) in &self.keys {
            let ordering = sort_key(&field_value(a, *column)).cmp(&sort_key(&field_value(b, *column)));
            let ordering = match direction {
                Direction::Asc => ordering,
                Direction::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

/// Result of a query
///
/// Holds the rows read when the query ran. Iterating is repeatable; running
/// the query again re-reads current state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cursor {
    rows: Vec<PetRow>,
}

impl Cursor {
    pub fn new(rows: Vec<PetRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PetRow> {
        self.rows.iter()
    }

    pub fn first(&self) -> Option<&PetRow> {
        self.rows.first()
    }
}

impl IntoIterator for Cursor {
    type Item = PetRow;
    type IntoIter = std::vec::IntoIter<PetRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a Cursor {
    type Item = &'a PetRow;
    type IntoIter = std::slice::Iter<'a, PetRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Column value of a record as it would be stored
fn field_value(pet: &Pet, column: Column) -> Value {
    match column {
        Column::Id => Value::Integer(pet.id),
        Column::Name => Value::Text(pet.name.clone()),
        Column::Breed => pet.breed.clone().into(),
        Column::Gender => Value::Integer(pet.gender.code()),
        Column::Weight => Value::Integer(pet.weight),
    }
}

/// NULL < integers < text, matching SQLite's cross-type ordering
fn sort_key(value: &Value) -> (u8, i64, String) {
    match value {
        Value::Null => (0, 0, String::new()),
        Value::Integer(i) => (1, *i, String::new()),
        Value::Text(s) => (2, 0, s.clone()),
    }
}

/// Compare a stored value with an argument; NULL never compares
fn compare(field: &Value, arg: &Value) -> Option<Ordering> {
    match (field, arg) {
        (Value::Null, _) | (_, Value::Null) => None,
        (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        // integer columns coerce numeric text arguments
        (Value::Integer(a), Value::Text(text)) => match arg.as_integer() {
            Some(b) => Some(a.cmp(&b)),
            None => match text.trim().parse::<f64>() {
                Ok(b) if b.is_finite() => (*a as f64).partial_cmp(&b),
                // non-numeric text sorts after every integer
                _ => Some(Ordering::Less),
            },
        },
        (Value::Text(a), Value::Integer(b)) => Some(a.as_str().cmp(b.to_string().as_str())),
    }
}

/// SQL `LIKE`: `%` matches any run, `_` any single char, ASCII case folded
fn like(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().map(|c| c.to_ascii_lowercase()).collect();
    let text: Vec<char> = text.chars().map(|c| c.to_ascii_lowercase()).collect();
    like_match(&pattern, &text)
}

/// Greedy wildcard match; on a mismatch only the last `%` is retried
fn like_match(pattern: &[char], text: &[char]) -> bool {
    let (mut p, mut t) = (0, 0);
    // position after the last `%` and the text index it currently absorbs up to
    let mut retry: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some('%') => {
                p += 1;
                retry = Some((p, t));
            }
            Some(&c) if c == '_' || c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match retry {
                Some((after_wildcard, absorbed)) => {
                    p = after_wildcard;
                    t = absorbed + 1;
                    retry = Some((after_wildcard, t));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == '%')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gender;

    fn pet(id: i64, name: &str, breed: Option<&str>, weight: i64) -> Pet {
        Pet {
            id,
            name: name.to_string(),
            breed: breed.map(str::to_string),
            gender: Gender::Male,
            weight,
        }
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let filter = Filter::new();
        assert!(filter.is_empty());
        assert!(filter.matches(&pet(1, "Toto", None, 7)));
        assert_eq!(filter.to_sql(), None);
    }

    #[test]
    fn test_filter_to_sql() {
        let filter = Filter::by_id(3)
            .ge(Column::Weight, 5)
            .is_null(Column::Breed)
            .like(Column::Name, "T%");
        let (sql, args) = filter.to_sql().unwrap();
        assert_eq!(
            sql,
            "_id = ? AND weight >= ? AND breed IS NULL AND name LIKE ?"
        );
        assert_eq!(
            args,
            vec![Value::Integer(3), Value::Integer(5), Value::from("T%")]
        );
    }

    #[test]
    fn test_filter_matches() {
        let toto = pet(1, "Toto", Some("Terrier"), 7);

        assert!(Filter::by_id(1).matches(&toto));
        assert!(!Filter::by_id(2).matches(&toto));
        assert!(Filter::new().gt(Column::Weight, 5).matches(&toto));
        assert!(!Filter::new().lt(Column::Weight, 7).matches(&toto));
        assert!(Filter::new().le(Column::Weight, 7).matches(&toto));
        assert!(Filter::new().eq(Column::Gender, Gender::Male).matches(&toto));
        assert!(Filter::new().not_eq(Column::Name, "Rex").matches(&toto));
        assert!(Filter::new().eq(Column::Weight, "7").matches(&toto));
    }

    #[test]
    fn test_filter_null_semantics() {
        let stray = pet(2, "Stray", None, 0);

        assert!(Filter::new().is_null(Column::Breed).matches(&stray));
        assert!(!Filter::new().is_not_null(Column::Breed).matches(&stray));
        // comparisons against NULL are never true
        assert!(!Filter::new().eq(Column::Breed, "Terrier").matches(&stray));
        assert!(!Filter::new().not_eq(Column::Breed, "Terrier").matches(&stray));
    }

    #[test]
    fn test_like() {
        assert!(like("t%", "Toto"));
        assert!(like("%er%", "Terrier"));
        assert!(like("T_to", "toto"));
        assert!(!like("T_to", "Totto"));
        assert!(like("%", ""));
        assert!(!like("_", ""));
        assert!(like("%%t_", "Toto"));
        assert!(like("a%b%c", "aXbYbc"));
        assert!(!like("a%b%c", "aXbYb"));
    }

    #[test]
    fn test_like_many_wildcards_stays_fast() {
        let text = "a".repeat(400);
        let pattern = format!("{}b", "%a".repeat(40));

        let started = std::time::Instant::now();
        assert!(!like(&pattern, &text));
        assert!(like(&"%a".repeat(40), &text));
        assert!(started.elapsed() < std::time::Duration::from_secs(1));
    }

    #[test]
    fn test_integer_against_decimal_text() {
        let toto = pet(1, "Toto", None, 7);

        assert!(Filter::new().eq(Column::Weight, "7.0").matches(&toto));
        assert!(Filter::new().gt(Column::Weight, "6.5").matches(&toto));
        assert!(Filter::new().lt(Column::Weight, "7.5").matches(&toto));
        assert!(!Filter::new().eq(Column::Weight, "7.5").matches(&toto));
        // non-numeric text is greater than any integer
        assert!(Filter::new().lt(Column::Weight, "heavy").matches(&toto));
    }

    #[test]
    fn test_and_combines() {
        let a = Filter::by_id(1);
        let b = Filter::new().eq(Column::Name, "Toto");
        let both = a.and(&b);
        assert_eq!(both.predicates().len(), 2);
        assert!(both.matches(&pet(1, "Toto", None, 0)));
        assert!(!both.matches(&pet(1, "Rex", None, 0)));
    }

    #[test]
    fn test_sort_order() {
        let order = SortOrder::desc(Column::Weight).then(Column::Name, Direction::Asc);
        assert_eq!(order.to_sql().unwrap(), "weight DESC, name ASC");

        let mut pets = vec![
            pet(1, "B", None, 5),
            pet(2, "A", None, 5),
            pet(3, "C", None, 9),
        ];
        pets.sort_by(|a, b| order.compare(a, b));
        let ids: Vec<i64> = pets.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn test_sort_nulls_first() {
        let order = SortOrder::asc(Column::Breed);
        let mut pets = vec![pet(1, "A", Some("Pug"), 0), pet(2, "B", None, 0)];
        pets.sort_by(|a, b| order.compare(a, b));
        assert_eq!(pets[0].id, 2);
    }

    #[test]
    fn test_cursor_is_restartable() {
        let cursor = Cursor::new(vec![PetRow::default(), PetRow::default()]);
        assert_eq!(cursor.iter().count(), 2);
        assert_eq!(cursor.iter().count(), 2);
        assert_eq!(cursor.len(), 2);
        assert_eq!(cursor.into_iter().count(), 2);
    }
}
