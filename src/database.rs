//! Question and category storage on SQLite.
//!
//! Every call checks a connection out of an r2d2 pool and returns an explicit
//! [`StoreError`] instead of panicking, so handlers decide which status code a
//! failure turns into. Calls are blocking; from async code go through
//! [`Database::run`], which moves the work onto actix's blocking thread pool.
//!
//! An in-memory database (`:memory:`) lives inside a single connection, so the
//! pool is pinned to exactly one connection that is never recycled.

use std::time::Duration;

use actix_web::{error::BlockingError, web};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;
use log::{debug, info};
use thiserror::Error;

use crate::config::Config;
use crate::models::{Category, NewCategory, NewQuestion, Question};
use crate::quiz::CategoryFilter;
use crate::schema::{categories, questions, CREATE_TABLES};

pub const IN_MEMORY: &str = ":memory:";

/// Categories the game ships with, inserted into an empty category table.
pub const DEFAULT_CATEGORIES: [&str; 6] = [
    "Science",
    "Art",
    "Geography",
    "History",
    "Entertainment",
    "Sports",
];

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

type SqlitePool = Pool<ConnectionManager<SqliteConnection>>;
type SqlitePooled = PooledConnection<ConnectionManager<SqliteConnection>>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Record not found")]
    NotFound,

    #[error("Connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    #[error("Query failed: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("Blocking store call was canceled")]
    Canceled,
}

/// Lets concurrent writers wait for the file lock instead of failing at once.
#[derive(Debug)]
struct BusyTimeout;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for BusyTimeout {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA busy_timeout = {};",
            BUSY_TIMEOUT.as_millis()
        ))
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (or creates) the database and makes sure both tables exist.
    pub fn open(database_url: &str, pool_size: u32) -> Result<Self, StoreError> {
        let in_memory = database_url == IN_MEMORY;
        info!("Opening database at: {database_url}");

        let mut builder = SqlitePool::builder()
            .max_size(if in_memory { 1 } else { pool_size.max(1) })
            .connection_customizer(Box::new(BusyTimeout));
        if in_memory {
            builder = builder.idle_timeout(None).max_lifetime(None);
        }
        let pool = builder.build(ConnectionManager::<SqliteConnection>::new(database_url))?;

        let database = Self { pool };
        database.conn()?.batch_execute(CREATE_TABLES)?;
        Ok(database)
    }

    /// Empty in-memory database, used by tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::open(IN_MEMORY, 1)
    }

    pub fn from_config(config: &Config) -> Result<Self, StoreError> {
        let database = Self::open(&config.database_url, config.pool_size)?;
        if config.seed_categories {
            database.seed_default_categories()?;
        }
        Ok(database)
    }

    fn conn(&self) -> Result<SqlitePooled, StoreError> {
        Ok(self.pool.get()?)
    }

    /// Runs blocking store work off the async executor.
    pub async fn run<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Database) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let database = self.clone();
        web::block(move || f(&database))
            .await
            .map_err(|e| match e {
                BlockingError::Error(e) => e,
                BlockingError::Canceled => StoreError::Canceled,
            })
    }

    // Questions //
    ///////////////

    /// All questions in id order.
    pub fn list_questions(&self) -> Result<Vec<Question>, StoreError> {
        let pooled = self.conn()?;
        let conn: &SqliteConnection = &pooled;
        let results = questions::table
            .order(questions::id.asc())
            .load::<Question>(conn)?;
        debug!("Loaded {} questions", results.len());
        Ok(results)
    }

    /// Questions whose category field equals `category` as a string.
    pub fn questions_in_category(&self, category: &str) -> Result<Vec<Question>, StoreError> {
        let pooled = self.conn()?;
        let conn: &SqliteConnection = &pooled;
        let results = questions::table
            .filter(questions::category.eq(category))
            .order(questions::id.asc())
            .load::<Question>(conn)?;
        debug!("Loaded {} questions in category {category}", results.len());
        Ok(results)
    }

    pub fn quiz_pool(&self, filter: &CategoryFilter) -> Result<Vec<Question>, StoreError> {
        match filter {
            CategoryFilter::All => self.list_questions(),
            CategoryFilter::Only(category) => self.questions_in_category(category),
        }
    }

    /// Inserts a question and returns its new id.
    pub fn insert_question(&self, new_question: &NewQuestion) -> Result<i32, StoreError> {
        let pooled = self.conn()?;
        let conn: &SqliteConnection = &pooled;
        let id = conn.transaction::<_, diesel::result::Error, _>(|| {
            diesel::insert_into(questions::table)
                .values(new_question)
                .execute(conn)?;
            questions::table
                .select(questions::id)
                .order(questions::id.desc())
                .first::<i32>(conn)
        })?;
        debug!("Inserted question {id}");
        Ok(id)
    }

    pub fn delete_question(&self, id: i32) -> Result<i32, StoreError> {
        let pooled = self.conn()?;
        let conn: &SqliteConnection = &pooled;
        let removed = diesel::delete(questions::table.find(id)).execute(conn)?;
        if removed == 0 {
            return Err(StoreError::NotFound);
        }
        debug!("Deleted question {id}");
        Ok(id)
    }

    // Categories //
    ////////////////

    /// All categories in id order.
    pub fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let pooled = self.conn()?;
        let conn: &SqliteConnection = &pooled;
        Ok(categories::table
            .order(categories::id.asc())
            .load::<Category>(conn)?)
    }

    pub fn find_category(&self, id: i32) -> Result<Option<Category>, StoreError> {
        let pooled = self.conn()?;
        let conn: &SqliteConnection = &pooled;
        Ok(categories::table
            .find(id)
            .first::<Category>(conn)
            .optional()?)
    }

    /// Inserts [`DEFAULT_CATEGORIES`] with ids 1..=6, unless any category
    /// exists already. Returns the number of rows inserted.
    pub fn seed_default_categories(&self) -> Result<usize, StoreError> {
        let pooled = self.conn()?;
        let conn: &SqliteConnection = &pooled;
        let inserted = conn.transaction::<_, diesel::result::Error, _>(|| {
            let existing: i64 = categories::table.count().get_result(conn)?;
            if existing > 0 {
                return Ok(0);
            }

            let mut inserted = 0;
            for (index, name) in DEFAULT_CATEGORIES.iter().enumerate() {
                let category = NewCategory {
                    id: index as i32 + 1,
                    type_: *name,
                };
                inserted += diesel::insert_into(categories::table)
                    .values(&category)
                    .execute(conn)?;
            }
            Ok(inserted)
        })?;

        if inserted > 0 {
            info!("Seeded {inserted} default categories");
        }
        Ok(inserted)
    }
}
