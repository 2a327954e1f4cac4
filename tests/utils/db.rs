/// Database test utilities with singleton pattern
///
/// Integration tests need a live PostgreSQL reachable through
/// TEST_DATABASE_URL (loaded from .env when present). When the variable is
/// absent every test returns early, so the suite still passes on machines
/// without a database.
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use std::time::Duration;

use diesel::prelude::*;
use diesel::sql_types::{BigInt, Bool};

use jobspace::modules::jobs::infrastructure::models::JobAuditRow;
use jobspace::{Database, Space};

static DATABASE: OnceLock<Option<Arc<Database>>> = OnceLock::new();

/// Get or create the shared test database handle, migrated and ready.
/// Returns `None` when TEST_DATABASE_URL is not set.
pub fn test_database() -> Option<Arc<Database>> {
    DATABASE
        .get_or_init(|| {
            dotenvy::dotenv().ok();
            let url = std::env::var("TEST_DATABASE_URL").ok()?;

            let database = Database::from_url(&url).expect("Failed to reach test database");
            database
                .run_migrations()
                .expect("Failed to migrate test database");
            Some(Arc::new(database))
        })
        .clone()
}

/// Wipe the audit trail - use at the start of each test
pub fn clean_job_table(database: &Database) {
    let mut conn = database
        .get_connection()
        .expect("Failed to get DB connection");

    diesel::sql_query("TRUNCATE TABLE activity.job RESTART IDENTITY")
        .execute(&mut conn)
        .expect("Failed to clean activity.job");
}

/// Global test mutex for serialization
static TEST_LOCK: Mutex<()> = Mutex::new(());

/// Acquire test lock to ensure tests run serially
/// Returns a guard that releases the lock when dropped
pub fn acquire_test_lock() -> MutexGuard<'static, ()> {
    // Handle poisoned mutex by recovering from panic
    match TEST_LOCK.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// All audit rows recorded for a space, oldest first.
pub fn audit_rows_for(database: &Database, space: Space) -> Vec<JobAuditRow> {
    let mut conn = database
        .get_connection()
        .expect("Failed to get DB connection");

    diesel::sql_query(
        "SELECT id, owner, pid, oid, granted, timestamp, comment \
         FROM activity.job WHERE oid = $1 ORDER BY id",
    )
    .bind::<BigInt, _>(space.oid())
    .load(&mut conn)
    .expect("Failed to load audit rows")
}

#[derive(QueryableByName)]
struct LockRow {
    #[diesel(sql_type = Bool)]
    granted: bool,
}

/// Take `space`'s advisory lock on a raw session of our own, standing in
/// for a holder in some other process. No audit row is written; dropping
/// the returned connection ends the session and releases the lock.
pub fn hold_space_lock(database: &Database, space: Space) -> PgConnection {
    let mut conn = database
        .open_isolated_connection()
        .expect("Failed to open holder connection");

    let row: LockRow = diesel::sql_query("SELECT pg_try_advisory_lock($1) AS granted")
        .bind::<BigInt, _>(space.oid())
        .get_result(&mut conn)
        .expect("Failed to take advisory lock");
    assert!(row.granted, "space {} already held by someone else", space);

    conn
}

#[derive(QueryableByName)]
struct FreeRow {
    #[diesel(sql_type = Bool)]
    free: bool,
}

/// True when no session holds the space's advisory lock.
pub fn space_is_free(database: &Database, space: Space) -> bool {
    let mut conn = database
        .get_connection()
        .expect("Failed to get DB connection");

    let row: FreeRow = diesel::sql_query(
        "SELECT NOT EXISTS ( \
             SELECT 1 FROM pg_locks \
             WHERE locktype = 'advisory' \
               AND objid::bigint = $1 \
               AND objsubid = 1 \
         ) AS free",
    )
    .bind::<BigInt, _>(space.oid())
    .get_result(&mut conn)
    .expect("Failed to inspect pg_locks");

    row.free
}

/// Wait for `space` to come free. The server releases a session's locks
/// while the backend exits, which can lag the client's drop by a moment.
pub async fn wait_until_space_free(database: &Database, space: Space) {
    for _ in 0..100 {
        if space_is_free(database, space) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("space {} stayed locked after its holder went away", space);
}

/// Truncate the audit table and wait for `spaces` to be lock-free, so a
/// previous test's still-exiting sessions cannot bleed into this one.
pub async fn reset(database: &Database, spaces: &[Space]) {
    clean_job_table(database);
    for &space in spaces {
        wait_until_space_free(database, space).await;
    }
}
