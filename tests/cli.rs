use std::fs;
use std::path::Path;

use snapbox::cmd::{Command, cargo_bin};

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn sassline(cwd: &Path) -> Command {
    Command::new(cargo_bin!("sassline"))
        .current_dir(cwd)
        .env("RUST_BACKTRACE", "0")
}

#[test]
fn build_writes_css_and_maps() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "sass/a.scss", "a { color: red; }\n");

    sassline(dir.path()).arg("build").assert().success();

    assert_eq!(
        fs::read_to_string(dir.path().join("static/a.css")).unwrap(),
        "a {\n  color: red;\n}\n/*# sourceMappingURL=sourcemaps/a.css.map */\n"
    );
    assert!(dir.path().join("static/sourcemaps/a.css.map").is_file());
}

#[test]
fn default_command_builds() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "sass/a.scss", "a { color: red; }\n");

    sassline(dir.path()).assert().success();

    assert!(dir.path().join("static/a.css").is_file());
}

#[test]
fn build_flags_override_config() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "sass/a.scss", "a { color: red; }\n");

    sassline(dir.path())
        .args(["build", "--destination", "out", "--no-source-maps"])
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(dir.path().join("out/a.css")).unwrap(),
        "a {\n  color: red;\n}\n"
    );
    assert!(!dir.path().join("out/sourcemaps").exists());
    assert!(!dir.path().join("static").exists());
}

#[test]
fn build_root_flag() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "site/sass/a.scss", "a { color: red; }\n");

    sassline(dir.path())
        .args(["build", "--root", "site"])
        .assert()
        .success();

    assert!(dir.path().join("site/static/a.css").is_file());
}

#[test]
fn compile_errors_are_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "sass/a.scss", "a { color: red; }\n");
    write(dir.path(), "sass/bad.scss", "a { color: red;\n");

    sassline(dir.path()).arg("build").assert().success();

    assert!(dir.path().join("static/a.css").is_file());
    assert!(!dir.path().join("static/bad.css").exists());
}

#[test]
fn strict_build_fails_on_compile_errors() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "sass/a.scss", "a { color: red; }\n");
    write(dir.path(), "sass/bad.scss", "a { color: red;\n");

    sassline(dir.path())
        .args(["build", "--strict"])
        .assert()
        .code(1);

    assert!(dir.path().join("static/a.css").is_file());
}

#[test]
fn invalid_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "_sassline.yml", "colour: red\n");

    sassline(dir.path()).arg("build").assert().code(1);
}

#[test]
fn unknown_argument_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();

    sassline(dir.path())
        .arg("--nonexistent-argument")
        .assert()
        .code(64);
}

#[test]
fn clean_removes_destination() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "sass/a.scss", "a { color: red; }\n");
    sassline(dir.path()).arg("build").assert().success();
    assert!(dir.path().join("static").is_dir());

    sassline(dir.path()).arg("clean").assert().success();
    assert!(!dir.path().join("static").exists());
    assert!(dir.path().join("sass/a.scss").is_file());

    sassline(dir.path()).arg("clean").assert().success();
}

#[test]
fn clean_refuses_current_directory() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "static/keep.css", "");

    sassline(&dir.path().join("static"))
        .args(["clean", "--root", "..", "--destination", "."])
        .assert()
        .code(1);
    assert!(dir.path().join("static/keep.css").is_file());
}

#[test]
fn debug_files_lists_source_set() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "sass/site.scss", "");
    write(dir.path(), "sass/_vars.scss", "");
    write(dir.path(), "sass/pages/home.scss", "");
    write(dir.path(), "sass/notes.txt", "");
    write(dir.path(), "sass/.hidden.scss", "");

    sassline(dir.path())
        .args(["debug", "files"])
        .assert()
        .success()
        .stdout_eq("_vars.scss\npages/home.scss\nsite.scss\n");
}

#[test]
fn debug_config_prints_yaml() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "_sassline.yml", "destination: public\n");

    let output = sassline(dir.path())
        .args(["debug", "config"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("destination: public"), "{stdout}");
    assert!(stdout.contains("source: sass"), "{stdout}");
}
