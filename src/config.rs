//! Settings that are read once at startup and then shared read-only.

use std::{fs, path::Path};

use time::Duration;

use crate::{CategoryData, Error, PasswordHash, pagination::PaginationConfig};

/// The default for how long an issued bearer token is valid.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::minutes(30);

/// The application configuration, built once in `main` and handed to [crate::AppState::new].
#[derive(Clone)]
pub struct AppConfig {
    /// The secret that bearer tokens are signed with.
    pub secret: String,
    /// How long an issued bearer token is valid.
    pub token_ttl: Duration,
    /// The bcrypt cost for hashing new passwords.
    pub password_cost: u32,
    /// The default and maximum page sizes for listing transactions.
    pub pagination: PaginationConfig,
    /// The categories to create on startup if they do not exist.
    pub default_categories: Vec<CategoryData>,
}

impl AppConfig {
    /// Create a configuration with the given `secret` and defaults for everything else.
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.to_owned(),
            token_ttl: DEFAULT_TOKEN_TTL,
            password_cost: PasswordHash::DEFAULT_COST,
            pagination: PaginationConfig::default(),
            default_categories: default_categories(),
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("secret", &"********")
            .field("token_ttl", &self.token_ttl)
            .field("password_cost", &self.password_cost)
            .field("pagination", &self.pagination)
            .field("default_categories", &self.default_categories)
            .finish()
    }
}

/// The categories every new database starts with.
pub fn default_categories() -> Vec<CategoryData> {
    vec![
        CategoryData::new("Groceries", "Food and household items"),
        CategoryData::new("Transportation", "Public transport, fuel, etc."),
        CategoryData::new("Utilities", "Electricity, water, internet, etc."),
        CategoryData::new("Entertainment", "Movies, games, dining out"),
        CategoryData::new("Salary", "Regular income"),
        CategoryData::new("Investment", "Returns from investments"),
        CategoryData::new("Shopping", "Clothing, electronics, etc."),
        CategoryData::new("Healthcare", "Medical expenses, medicines"),
        CategoryData::new("Education", "Books, courses, tuition"),
        CategoryData::new("Other", "Miscellaneous expenses"),
    ]
}

/// Load the default categories from the JSON file at `path`, or use
/// [default_categories] if there is no file.
///
/// The file should hold a list of objects with a `name` and an optional
/// `description`.
///
/// # Errors
///
/// Returns [Error::InvalidConfig] if the file cannot be read or parsed.
pub fn load_default_categories(path: Option<&Path>) -> Result<Vec<CategoryData>, Error> {
    let Some(path) = path else {
        return Ok(default_categories());
    };

    let text = fs::read_to_string(path).map_err(|error| {
        Error::InvalidConfig(format!("could not read {}: {error}", path.display()))
    })?;

    serde_json::from_str(&text).map_err(|error| {
        Error::InvalidConfig(format!(
            "could not parse categories in {}: {error}",
            path.display()
        ))
    })
}
