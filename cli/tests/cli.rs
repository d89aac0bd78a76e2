use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn turtlo() -> Command {
    Command::cargo_bin("turtlo").unwrap()
}

#[test]
fn converts_turtle_string_to_ntriples() {
    turtlo()
        .args([
            "-i",
            "turtle",
            "-o",
            "ntriples",
            "-s",
            "@prefix ex: <http://example.org/> .\nex:s ex:p ex:o .",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "<http://example.org/s> <http://example.org/p> <http://example.org/o> .",
        ));
}

#[test]
fn guesses_ntriples_syntax_from_extension() {
    let mut file = tempfile::Builder::new().suffix(".nt").tempfile().unwrap();
    writeln!(
        file,
        "<http://example.org/s> <http://example.org/p> <http://example.org/o> ."
    )
    .unwrap();

    turtlo()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("<http://example.org/s>"));
}

#[test]
fn resolves_relative_iris_against_file_base() {
    let mut file = tempfile::Builder::new().suffix(".ttl").tempfile().unwrap();
    writeln!(file, "<s> <p> <o> .").unwrap();

    let path = std::fs::canonicalize(file.path()).unwrap();
    let expected_base = format!("file://{}", path.to_string_lossy());
    let expected_subject = format!("<{}>", resolve_sibling(&expected_base, "s"));

    turtlo()
        .args(["-o", "ntriples"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(expected_subject));
}

fn resolve_sibling(base: &str, name: &str) -> String {
    let mut parts: Vec<&str> = base.rsplitn(2, '/').collect();
    parts[0] = name;
    format!("{}/{}", parts[1], parts[0])
}

#[test]
fn rejects_input_with_unguessable_syntax_and_no_flag() {
    let file = tempfile::Builder::new().suffix(".rdf").tempfile().unwrap();

    turtlo()
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot guess"));
}

#[test]
fn reports_syntax_errors_with_position() {
    turtlo()
        .args(["-i", "turtle", "-s", "this is not turtle"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn lowercase_v_flag_prints_version_and_exits() {
    turtlo()
        .arg("-v")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
