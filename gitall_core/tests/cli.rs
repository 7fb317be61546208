use std::fs;
use std::path::Path;

use assert_cmd::Command;
use git2::{IndexAddOption, Repository as GitRepository, Signature};
use predicates::prelude::*;
use tempfile::TempDir;

fn gitall() -> Command {
    let mut cmd = Command::cargo_bin("gitall").expect("binary builds");
    cmd.env_remove("GITALL_REMOTE")
        .env_remove("GITALL_AUTH")
        .env_remove("GITALL_SSH_KEY")
        .env_remove("RUST_LOG");
    cmd
}

fn seeded_clone(temp: &TempDir, name: &str) -> String {
    let seed = temp.path().join(format!("{name}-seed"));
    let repo = GitRepository::init(&seed).expect("init seed");
    fs::write(seed.join("README.md"), "# seed\n").expect("write readme");
    commit_all(&repo, "initial");

    let dest = temp.path().join(name);
    GitRepository::clone(seed.to_str().expect("utf8"), &dest).expect("clone");
    dest.to_str().expect("utf8").to_string()
}

fn commit_upstream(temp: &TempDir, name: &str) {
    let seed = temp.path().join(format!("{name}-seed"));
    let repo = GitRepository::open(&seed).expect("open seed");
    fs::write(seed.join("CHANGELOG.md"), "upstream\n").expect("write changelog");
    commit_all(&repo, "upstream change");
}

fn commit_all(repo: &GitRepository, message: &str) {
    let mut index = repo.index().expect("index");
    index
        .add_all(["*"], IndexAddOption::DEFAULT, None)
        .expect("stage");
    index.write().expect("write index");
    let tree = repo
        .find_tree(index.write_tree().expect("write tree"))
        .expect("tree");
    let signature = Signature::now("Test User", "test@example.com").expect("signature");
    let parent = repo.head().ok().and_then(|head| head.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
        .expect("commit");
}

fn path_string(path: &Path) -> String {
    path.to_str().expect("utf8").to_string()
}

#[test]
fn status_reports_each_bucket_line() {
    let temp = TempDir::new().expect("tempdir");
    let clean = seeded_clone(&temp, "clean");
    let missing = path_string(&temp.path().join("missing"));

    gitall()
        .args(["status", "--auth", "none", "--no-color"])
        .arg(&missing)
        .arg(&clean)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(" x  "))
        .stdout(predicate::str::contains(format!(" \u{2714}  {clean:<40} in sync")));
}

#[test]
fn status_json_is_parseable() {
    let temp = TempDir::new().expect("tempdir");
    let clean = seeded_clone(&temp, "clean");

    let output = gitall()
        .args(["status", "--auth", "none", "--json"])
        .arg(&clean)
        .output()
        .expect("run gitall");
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json report");
    assert_eq!(value["in_sync"][0]["path"], clean.as_str());
    assert_eq!(value["errors"].as_array().map(Vec::len), Some(0));
}

#[test]
fn fetch_timeout_turns_into_error_line() {
    let temp = TempDir::new().expect("tempdir");
    let slow = seeded_clone(&temp, "slow");
    commit_upstream(&temp, "slow");

    gitall()
        .args(["status", "--auth", "none", "--no-color", "--fetch-timeout", "0"])
        .arg(&slow)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(format!(" x  {slow:<40} fetching origin timed out")));
}

#[test]
fn unusable_key_file_aborts_the_batch() {
    let temp = TempDir::new().expect("tempdir");
    let clean = seeded_clone(&temp, "clean");
    let key = path_string(&temp.path().join("no-such-key"));

    gitall()
        .args(["status", "--auth", "key-file", "--key"])
        .arg(&key)
        .arg(&clean)
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("could not resolve credentials via 'key-file'"));
}

#[test]
fn unknown_provider_is_rejected() {
    let temp = TempDir::new().expect("tempdir");
    let clean = seeded_clone(&temp, "clean");

    gitall()
        .args(["status", "--auth", "keyring"])
        .arg(&clean)
        .assert()
        .failure()
        .stderr(predicate::str::contains("keyring"));
}

#[test]
fn status_requires_paths() {
    gitall().arg("status").assert().failure();
}

#[test]
fn where_lists_branch_and_remote() {
    let temp = TempDir::new().expect("tempdir");
    let repo_dir = temp.path().join("tools");
    let repo = GitRepository::init(&repo_dir).expect("init");
    repo.set_head("refs/heads/main").expect("point HEAD at main");
    repo.remote("origin", "git@github.com:acme/tools.git")
        .expect("remote");
    let path = path_string(&repo_dir);

    gitall()
        .args(["where", "--no-color"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "main of git@github.com:acme/tools.git",
        ));
}

#[test]
fn providers_lists_builtins() {
    gitall()
        .arg("providers")
        .assert()
        .success()
        .stdout(predicate::str::contains("agent"))
        .stdout(predicate::str::contains("key-file"))
        .stdout(predicate::str::contains("none"));
}
