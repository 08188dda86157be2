use nonempty::NonEmpty;

/// How positional parameters are written in generated statements.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum Dialect {
    /// Parameters are written as `$1`, `$2`, ... and may be referenced more than once.
    #[default]
    Numbered,

    /// Every parameter is written as `?` and is bound once per occurrence, in order.
    Anonymous,
}

impl Dialect {
    fn placeholder(self, position: usize) -> String {
        match self {
            Self::Numbered => format!("${position}"),
            Self::Anonymous => "?".to_string(),
        }
    }

    /// Whether an update statement references the key parameter a second time, meaning the key
    /// value must be bound again after all the field values.
    #[must_use]
    pub fn rebinds_key_on_update(self) -> bool {
        matches!(self, Self::Anonymous)
    }
}

fn column_list<S: AsRef<str>>(fields: &NonEmpty<S>) -> String {
    fields
        .iter()
        .map(|field| field.as_ref())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Builds a statement that inserts one row, binding every field in order.
///
/// The first field is the primary key.
///
/// # Example
///
/// ```rust
/// use nonempty::nonempty;
/// use record_crud::{Dialect, insert_statement};
///
/// let fields = nonempty!["id", "email"];
///
/// assert_eq!(
///     insert_statement(Dialect::Numbered, "users", &fields),
///     "INSERT INTO users (id, email) VALUES ($1, $2)"
/// );
/// assert_eq!(
///     insert_statement(Dialect::Anonymous, "users", &fields),
///     "INSERT INTO users (id, email) VALUES (?, ?)"
/// );
/// ```
#[must_use]
pub fn insert_statement<S: AsRef<str>>(
    dialect: Dialect,
    table: &str,
    fields: &NonEmpty<S>,
) -> String {
    let placeholders = (1..=fields.len())
        .map(|position| dialect.placeholder(position))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "INSERT INTO {table} ({columns}) VALUES ({placeholders})",
        columns = column_list(fields)
    )
}

/// Builds a statement that overwrites every field of the row selected by the primary key.
///
/// In the [`Dialect::Anonymous`] dialect the key placeholder in the `WHERE` clause is a separate
/// parameter, so the key value must be bound once more after the field values.
///
/// # Example
///
/// ```rust
/// use nonempty::nonempty;
/// use record_crud::{Dialect, update_statement};
///
/// let fields = nonempty!["id", "email"];
///
/// assert_eq!(
///     update_statement(Dialect::Numbered, "users", &fields),
///     "UPDATE users SET id=$1, email=$2 WHERE id=$1"
/// );
/// assert_eq!(
///     update_statement(Dialect::Anonymous, "users", &fields),
///     "UPDATE users SET id=?, email=? WHERE id=?"
/// );
/// ```
#[must_use]
pub fn update_statement<S: AsRef<str>>(
    dialect: Dialect,
    table: &str,
    fields: &NonEmpty<S>,
) -> String {
    let assignments = fields
        .iter()
        .zip(1..)
        .map(|(field, position)| format!("{}={}", field.as_ref(), dialect.placeholder(position)))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "UPDATE {table} SET {assignments} WHERE {key}={placeholder}",
        key = fields.head.as_ref(),
        placeholder = dialect.placeholder(1)
    )
}

/// Builds a statement that reads every field of the row selected by the primary key.
///
/// # Example
///
/// ```rust
/// use nonempty::nonempty;
/// use record_crud::{Dialect, select_statement};
///
/// assert_eq!(
///     select_statement(Dialect::Numbered, "users", &nonempty!["id", "email"]),
///     "SELECT id, email FROM users WHERE id=$1"
/// );
/// ```
#[must_use]
pub fn select_statement<S: AsRef<str>>(
    dialect: Dialect,
    table: &str,
    fields: &NonEmpty<S>,
) -> String {
    format!(
        "SELECT {columns} FROM {table} WHERE {key}={placeholder}",
        columns = column_list(fields),
        key = fields.head.as_ref(),
        placeholder = dialect.placeholder(1)
    )
}

/// Builds a statement that deletes the row selected by the primary key.
///
/// # Example
///
/// ```rust
/// use nonempty::nonempty;
/// use record_crud::{Dialect, delete_statement};
///
/// assert_eq!(
///     delete_statement(Dialect::Anonymous, "users", &nonempty!["id", "email"]),
///     "DELETE FROM users WHERE id=?"
/// );
/// ```
#[must_use]
pub fn delete_statement<S: AsRef<str>>(
    dialect: Dialect,
    table: &str,
    fields: &NonEmpty<S>,
) -> String {
    format!(
        "DELETE FROM {table} WHERE {key}={placeholder}",
        key = fields.head.as_ref(),
        placeholder = dialect.placeholder(1)
    )
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use nonempty::nonempty;

    use super::*;

    #[test]
    fn numbered_statements() {
        let fields = nonempty!["f1", "f2"];

        assert_eq!(
            insert_statement(Dialect::Numbered, "t", &fields),
            "INSERT INTO t (f1, f2) VALUES ($1, $2)"
        );
        assert_eq!(
            update_statement(Dialect::Numbered, "t", &fields),
            "UPDATE t SET f1=$1, f2=$2 WHERE f1=$1"
        );
        assert_eq!(
            select_statement(Dialect::Numbered, "t", &fields),
            "SELECT f1, f2 FROM t WHERE f1=$1"
        );
        assert_eq!(
            delete_statement(Dialect::Numbered, "t", &fields),
            "DELETE FROM t WHERE f1=$1"
        );
    }

    #[test]
    fn anonymous_statements() {
        let fields = nonempty!["f1", "f2"];

        assert_eq!(
            insert_statement(Dialect::Anonymous, "t", &fields),
            "INSERT INTO t (f1, f2) VALUES (?, ?)"
        );
        assert_eq!(
            update_statement(Dialect::Anonymous, "t", &fields),
            "UPDATE t SET f1=?, f2=? WHERE f1=?"
        );
        assert_eq!(
            select_statement(Dialect::Anonymous, "t", &fields),
            "SELECT f1, f2 FROM t WHERE f1=?"
        );
        assert_eq!(
            delete_statement(Dialect::Anonymous, "t", &fields),
            "DELETE FROM t WHERE f1=?"
        );
    }

    #[test]
    fn single_field() {
        let fields = nonempty!["id".to_string()];

        assert_eq!(
            insert_statement(Dialect::Numbered, "tags", &fields),
            "INSERT INTO tags (id) VALUES ($1)"
        );
        assert_eq!(
            update_statement(Dialect::Numbered, "tags", &fields),
            "UPDATE tags SET id=$1 WHERE id=$1"
        );
        assert_eq!(
            select_statement(Dialect::Anonymous, "tags", &fields),
            "SELECT id FROM tags WHERE id=?"
        );
    }

    #[test]
    fn numbered_placeholders_keep_counting() {
        let fields = nonempty!["a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k"];

        let statement = insert_statement(Dialect::Numbered, "wide", &fields);

        assert!(statement.ends_with("VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"));
    }

    #[test]
    fn key_rebinding() {
        assert!(!Dialect::Numbered.rebinds_key_on_update());
        assert!(Dialect::Anonymous.rebinds_key_on_update());
        assert_eq!(Dialect::default(), Dialect::Numbered);
    }
}
