//! Database operations for categories.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    category::{Category, CategoryData, CategoryId, CategoryName},
};

/// Create a category and return it with its generated ID.
///
/// # Errors
///
/// This function will return a:
/// - [Error::DuplicateCategoryName] if a category with the same name exists,
/// - or [Error::SqlError] if some other SQL error occurred.
pub fn create_category(
    name: CategoryName,
    description: Option<String>,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .execute(
            "INSERT INTO category (name, description) VALUES (?1, ?2);",
            (name.as_ref(), &description),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateCategoryName(name.to_string()),
            error => error.into(),
        })?;

    let id = connection.last_insert_rowid();

    Ok(Category {
        id,
        name,
        description,
    })
}

/// Retrieve a single category by ID.
#[cfg(test)]
pub fn get_category(category_id: CategoryId, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, name, description FROM category WHERE id = :id;")?
        .query_row(&[(":id", &category_id)], map_category_row)
        .map_err(|error| error.into())
}

/// Retrieve all categories ordered alphabetically by name.
pub fn get_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, name, description FROM category ORDER BY name ASC;")?
        .query_map([], map_category_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Insert each of `defaults` whose name is not taken yet.
///
/// Existing categories are left untouched, so calling this on every start is
/// safe. Either all missing defaults are inserted or none are.
///
/// Returns the number of categories that were inserted.
///
/// # Errors
///
/// This function will return a:
/// - [Error::EmptyCategoryName] if a default has a blank name,
/// - or [Error::SqlError] if the inserts failed.
pub fn ensure_seeded(defaults: &[CategoryData], connection: &Connection) -> Result<usize, Error> {
    let names = defaults
        .iter()
        .map(|default| CategoryName::new(&default.name))
        .collect::<Result<Vec<_>, _>>()?;

    let transaction = connection.unchecked_transaction()?;
    let mut inserted = 0;

    {
        let mut statement = transaction
            .prepare("INSERT OR IGNORE INTO category (name, description) VALUES (?1, ?2);")?;

        for (name, default) in names.iter().zip(defaults) {
            inserted += statement.execute((name.as_ref(), &default.description))?;
        }
    }

    transaction.commit()?;

    if inserted > 0 {
        tracing::info!("Seeded {inserted} default categories");
    }

    Ok(inserted)
}

/// Initialize the category table.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            description TEXT
        );",
    )?;

    Ok(())
}

fn map_category_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let description = row.get(2)?;

    Ok(Category {
        id,
        name: CategoryName::new_unchecked(&raw_name),
        description,
    })
}
