use assert_cmd::Command;
use predicates::prelude::*;

/// Nothing listens here; commands that reach the network fail fast.
const DEAD_SERVER: &str = "http://127.0.0.1:1";

fn bookshelf() -> Command {
    let mut cmd = Command::cargo_bin("bookshelf").unwrap();
    cmd.env_remove("BOOKSHELF_API_URL").env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_every_command() {
    bookshelf()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("list")
                .and(predicate::str::contains("show"))
                .and(predicate::str::contains("create"))
                .and(predicate::str::contains("edit"))
                .and(predicate::str::contains("delete"))
                .and(predicate::str::contains("upload-image")),
        );
}

#[test]
fn bad_year_is_rejected_before_any_request() {
    bookshelf()
        .args(["--server", DEAD_SERVER, "create"])
        .args(["--title", "Dune", "--author", "Frank Herbert"])
        .args(["--description", "Spice", "--year", "1700"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please enter a valid year"))
        .stderr(predicate::str::contains("request failed").not());
}

#[test]
fn missing_fields_are_all_reported() {
    bookshelf()
        .args(["--server", DEAD_SERVER, "create", "--year", "2001"])
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("Title is required")
                .and(predicate::str::contains("Author is required"))
                .and(predicate::str::contains("Description is required")),
        );
}

#[test]
fn image_url_and_file_are_exclusive() {
    bookshelf()
        .args(["create", "--image-url", "http://x/a.png", "--image-file", "a.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn non_image_upload_is_refused_locally() {
    let dir = tempfile::tempdir().unwrap();
    let notes = dir.path().join("notes.txt");
    std::fs::write(&notes, "hello").unwrap();

    bookshelf()
        .args(["--server", DEAD_SERVER, "upload-image"])
        .arg(&notes)
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not look like an image"));
}

#[test]
fn unreachable_server_is_one_line_error() {
    bookshelf()
        .args(["--server", DEAD_SERVER, "list"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("error: failed to fetch books"));
}

#[test]
fn invalid_server_url_is_rejected() {
    bookshelf()
        .args(["--server", "ftp://example.com", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid server url"));
}
