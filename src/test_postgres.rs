//! PostgreSQL test infrastructure module.
//!
//! This module provides shared infrastructure for PostgreSQL integration
//! tests: one PostgreSQL server for the whole test run, and a fresh uniquely
//! named database per test so tests stay isolated from each other.
//!
//! The server is a throwaway cluster run from the locally installed
//! PostgreSQL (`initdb`/`pg_ctl` on `PATH`). The first run initializes it
//! under [PG_STATE_DIR] and starts it; the server is left running so later
//! test runs find it via `pg_ctl status` and reuse it instead of starting
//! another one.

use std::process::Command;
use std::sync::OnceLock;

use postgres::{Client, NoTls};
use uuid::Uuid;

/// Host port of the shared PostgreSQL server, started on first use.
static POSTGRES_PORT: OnceLock<u16> = OnceLock::new();

/// Superuser credentials of the test cluster. The cluster trusts local
/// connections, so the password only shapes the URL.
const PG_USER: &str = "postgres";
const PG_PASSWORD: &str = "postgres";
const PG_DB: &str = "postgres";

/// Where the throwaway cluster lives and the port it listens on, both
/// fixed so repeated test runs share one server instead of each starting
/// another.
const PG_STATE_DIR: &str = "/var/tmp/upshift-test-pg";
const PG_PORT: u16 = 54881;

/// Run `script` through a shell as a user the server agrees to run as:
/// PostgreSQL refuses to start as root, so a root test process hands the
/// script to the `postgres` system user.
fn pg_shell(script: &str) -> std::process::Output {
    let uid = Command::new("id")
        .arg("-u")
        .output()
        .expect("failed to run id -u");
    let output = if String::from_utf8_lossy(&uid.stdout).trim() == "0" {
        Command::new("su")
            .args(["-s", "/bin/sh", "postgres", "-c", script])
            .output()
    } else {
        Command::new("/bin/sh").args(["-c", script]).output()
    };
    output.expect("failed to spawn shell for postgres setup")
}

/// Start the shared PostgreSQL server on first call and return its host
/// port. The server is intentionally left running at the end of the test
/// run so the next run can reuse it.
fn postgres_port() -> u16 {
    *POSTGRES_PORT.get_or_init(|| {
        let data_dir = format!("{}/data", PG_STATE_DIR);
        let log_file = format!("{}/server.log", PG_STATE_DIR);

        // A server left over from an earlier run is as good as a new one:
        // every test creates itself a fresh database either way.
        let status = pg_shell(&format!("pg_ctl -D '{}' status", data_dir));
        if status.status.success() {
            return PG_PORT;
        }

        let bootstrap = format!(
            "set -e
             mkdir -p '{state}'
             [ -f '{data}/PG_VERSION' ] || initdb -D '{data}' -U {user} --auth=trust --no-sync
             pg_ctl -D '{data}' -l '{log}' -w -o '-p {port} -F' start",
            state = PG_STATE_DIR,
            data = data_dir,
            log = log_file,
            user = PG_USER,
            port = PG_PORT,
        );
        let output = pg_shell(&bootstrap);
        if !output.status.success() {
            let server_log = pg_shell(&format!("cat '{}'", log_file));
            panic!(
                "failed to start postgres server:\n{}\n{}",
                String::from_utf8_lossy(&output.stderr),
                String::from_utf8_lossy(&server_log.stdout),
            );
        }

        PG_PORT
    })
}

fn url_with_db(db: &str) -> String {
    format!(
        "postgres://{}:{}@127.0.0.1:{}/{}",
        PG_USER,
        PG_PASSWORD,
        postgres_port(),
        db
    )
}

/// Create a fresh PostgreSQL database with a unique name and return a
/// connection URL for it. Each test should call this to get an isolated
/// database instance.
pub fn fresh_database_url() -> String {
    let mut admin =
        Client::connect(&url_with_db(PG_DB), NoTls).expect("failed to connect as admin");

    // PostgreSQL folds unquoted identifiers to lowercase, so a lowercase
    // uuid makes a safe name.
    let db_name = format!("test_{}", Uuid::new_v4().simple());
    admin
        .execute(&format!("CREATE DATABASE \"{}\"", db_name), &[])
        .expect("failed to create test database");

    url_with_db(&db_name)
}

/// Open a plain client on `url` for seeding and asserting database state in
/// tests.
pub fn connect(url: &str) -> Client {
    Client::connect(url, NoTls).expect("failed to connect to test database")
}
