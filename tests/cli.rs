//! CLI integration tests for campusd admin commands.
//!
//! Each test uses an isolated temp directory for the database, ensuring tests
//! can run in parallel safely.

#![allow(deprecated)] // Command::cargo_bin deprecation only affects custom build dirs

use std::path::Path;

use assert_cmd::Command;
use campusd::store::SqliteStore;
use campusd::types::{Classroom, Role};
use predicates::prelude::*;
use tempfile::TempDir;

struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    fn data_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    fn data_dir_str(&self) -> String {
        self.data_dir().to_string_lossy().to_string()
    }

    fn init(&self, extra_args: &[&str]) -> assert_cmd::assert::Assert {
        let mut cmd = Command::cargo_bin("campusd").expect("failed to find binary");
        cmd.args(["admin", "init", "--data-dir", &self.data_dir_str()]);
        cmd.args(extra_args);
        cmd.assert()
    }

    fn open_store(&self) -> SqliteStore {
        SqliteStore::new(self.data_dir().join("campus.db")).expect("open store")
    }
}

#[test]
fn test_init_creates_database_and_admin() {
    let ctx = TestContext::new();

    ctx.init(&[])
        .success()
        .stdout(predicate::str::contains("Admin account created"));

    assert!(ctx.data_dir().join("campus.db").exists());

    let password_file = ctx.data_dir().join(".admin_password");
    assert!(password_file.exists());
    let password = std::fs::read_to_string(&password_file).expect("read password");
    assert!(!password.trim().is_empty());

    let store = ctx.open_store();
    assert!(store.has_admin_user().expect("query admin"));
    let admin = store
        .get_user_by_student_id("admin")
        .expect("query user")
        .expect("admin user");
    assert_eq!(admin.role, Role::Admin);
}

#[test]
fn test_init_twice_fails() {
    let ctx = TestContext::new();

    ctx.init(&[]).success();
    ctx.init(&[])
        .failure()
        .stderr(predicate::str::contains("already initialized"));
}

#[test]
fn test_init_with_explicit_password() {
    let ctx = TestContext::new();

    ctx.init(&["--admin-password", "hunter22hunter22"]).success();

    let password = std::fs::read_to_string(ctx.data_dir().join(".admin_password"))
        .expect("read password");
    assert_eq!(password, "hunter22hunter22");
}

#[test]
fn test_init_seeds_catalogs() {
    let ctx = TestContext::new();
    ctx.init(&[]).success();

    let store = ctx.open_store();
    let count = store.catalog_count::<Classroom>().expect("count");
    assert!(count > 0);
}

#[test]
fn test_init_no_seed() {
    let ctx = TestContext::new();
    ctx.init(&["--no-seed"]).success();

    let store = ctx.open_store();
    let count = store.catalog_count::<Classroom>().expect("count");
    assert_eq!(count, 0);
}

#[test]
fn test_serve_without_init_fails() {
    let ctx = TestContext::new();

    let mut cmd = Command::cargo_bin("campusd").expect("failed to find binary");
    cmd.args(["serve", "--data-dir", &ctx.data_dir_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}
