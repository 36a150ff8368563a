// CLI regression tests: drive the binary end to end in a scratch directory.
// Requires: assert_cmd, predicates, tempfile crates in [dev-dependencies]

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};
use tempfile::TempDir;

const SUITE: &str = "\
[clm_base]
type = \"base\"
test = ERS
grid = f19_g16
compset = I
testmods = default

[grids]
type = \"single parameter perturbation\"
grid = f09_g16 f45_g35

[long]
type = \"one off\"
grp = ERS.f19_g16.I.yellowstone_intel.default SMS.f09_g16.ICLM45.hobart_gnu.clm5
";

fn testlist(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("testlist").unwrap();
    cmd.current_dir(dir);
    cmd
}

fn write_config(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

#[test]
fn cli_writes_one_list_per_section() {
    let dir = TempDir::new().unwrap();
    write_config(dir.path(), "clm_suite.v1.cfg", SUITE);

    testlist(dir.path())
        .args(["--test-suite-config", "clm_suite.v1.cfg"])
        .assert()
        .success()
        .stdout(
            contains("Reading configuration file : clm_suite.v1.cfg")
                .and(contains("Writing test list to:")),
        );

    let grids = fs::read_to_string(dir.path().join("clm_suite.grids.testlist.txt")).unwrap();
    assert_eq!(
        grids,
        "ERS.f19_g16.I.any_any.default\nERS.f09_g16.I.any_any.default\nERS.f45_g35.I.any_any.default\n"
    );
    let long = fs::read_to_string(dir.path().join("clm_suite.long.testlist.txt")).unwrap();
    assert_eq!(
        long,
        "ERS.f19_g16.I.yellowstone_intel.default\nSMS.f09_g16.ICLM45.hobart_gnu.clm5\n"
    );
    assert!(!dir.path().join("clm_suite.clm_base.testlist.txt").exists());
}

#[test]
fn cli_writes_lists_next_to_the_config() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("suites")).unwrap();
    write_config(&dir.path().join("suites"), "nested.cfg", SUITE);

    testlist(dir.path())
        .args(["--test-suite-config", "suites/nested.cfg"])
        .assert()
        .success();

    assert!(dir.path().join("suites/nested.grids.testlist.txt").exists());
    assert!(dir.path().join("suites/nested.long.testlist.txt").exists());
}

#[test]
fn cli_rejects_unknown_section_type_without_output() {
    let dir = TempDir::new().unwrap();
    write_config(
        dir.path(),
        "bad.cfg",
        "[long]\ntype = \"one off\"\nt = A.b.c.d_e.f\n\n[weird]\ntype = \"bogus\"\n",
    );

    testlist(dir.path())
        .args(["--test-suite-config", "bad.cfg"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("Section weird has unknown type bogus"));

    assert!(!dir.path().join("bad.weird.testlist.txt").exists());
    assert!(!dir.path().join("bad.long.testlist.txt").exists());
}

#[test]
fn cli_unknown_type_stops_the_batch() {
    let dir = TempDir::new().unwrap();
    write_config(dir.path(), "bad.cfg", "[weird]\ntype = bogus\n");
    write_config(dir.path(), "good.cfg", SUITE);

    testlist(dir.path())
        .args(["--test-suite-config", "bad.cfg", "good.cfg"])
        .assert()
        .failure()
        .code(1);

    assert!(!dir.path().join("good.grids.testlist.txt").exists());
}

#[test]
fn cli_write_template_ignores_configs() {
    let dir = TempDir::new().unwrap();

    testlist(dir.path())
        .args(["--write-template", "--test-suite-config", "does-not-exist.cfg"])
        .assert()
        .success()
        .code(0)
        .stdout(contains("Reading configuration file").not());

    let template = fs::read_to_string(dir.path().join("template.cfg")).unwrap();
    assert!(template.contains("[clm_base]\ntype = \"base\"\n"));
    assert!(template.contains("[clm_spp]\ntype = \"single parameter perturbation\"\n"));
    assert!(template.contains("[clm_long]\ntype = \"one off\"\ntests = space separated list\n"));
    assert_eq!(template.matches("\n[").count() + usize::from(template.starts_with('[')), 3);
}

#[test]
fn cli_missing_config_fails_but_continues_batch() {
    let dir = TempDir::new().unwrap();
    write_config(dir.path(), "good.cfg", SUITE);

    testlist(dir.path())
        .args(["--test-suite-config", "missing.cfg", "good.cfg"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("Could not find config file: missing.cfg"));

    assert!(dir.path().join("good.grids.testlist.txt").exists());
}

#[test]
fn cli_reports_parse_errors_without_report_by_default() {
    let dir = TempDir::new().unwrap();
    write_config(dir.path(), "dup.cfg", "[s]\ntype = base\n[s]\ntype = base\n");

    testlist(dir.path())
        .args(["--test-suite-config", "dup.cfg"])
        .assert()
        .failure()
        .stderr(
            contains("section 's' already exists").and(contains("testlist::config::parse").not()),
        );
}

#[test]
fn cli_backtrace_renders_full_diagnostic() {
    let dir = TempDir::new().unwrap();
    write_config(dir.path(), "dup.cfg", "[s]\ntype = base\n[s]\ntype = base\n");

    testlist(dir.path())
        .args(["--backtrace", "--test-suite-config", "dup.cfg"])
        .assert()
        .failure()
        .stderr(contains("testlist::config::parse").and(contains("duplicate section")));
}

#[test]
fn cli_malformed_one_off_skips_only_that_section() {
    let dir = TempDir::new().unwrap();
    let source = format!("{SUITE}\n[broken]\ntype = one off\nt = ERS.f19_g16.I\n");
    write_config(dir.path(), "mixed.cfg", &source);

    testlist(dir.path())
        .args(["--test-suite-config", "mixed.cfg"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("malformed test name 'ERS.f19_g16.I'"));

    assert!(dir.path().join("mixed.grids.testlist.txt").exists());
    assert!(!dir.path().join("mixed.broken.testlist.txt").exists());
}

#[test]
fn cli_missing_base_field_fails_only_the_perturbation_list() {
    let dir = TempDir::new().unwrap();
    write_config(
        dir.path(),
        "partial.cfg",
        "\
[clm_base]
type = base
test = ERS
grid = f19_g16
testmods = default

[grids]
type = single parameter perturbation
grid = f09_g16

[long]
type = one off
t = SMS.f09_g16.ICLM45.hobart_gnu.clm5
",
    );

    testlist(dir.path())
        .args(["--test-suite-config", "partial.cfg"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("missing required field 'compset'"));

    let long = fs::read_to_string(dir.path().join("partial.long.testlist.txt")).unwrap();
    assert_eq!(long, "SMS.f09_g16.ICLM45.hobart_gnu.clm5\n");
    let grids = fs::read_to_string(dir.path().join("partial.grids.testlist.txt")).unwrap();
    assert_eq!(grids, "");
}

#[test]
fn cli_multi_word_machine_skips_that_section() {
    let dir = TempDir::new().unwrap();
    let source = format!("{SUITE}\n[platforms]\ntype = single parameter perturbation\nmachine = cheyenne hobart\ngrid = f09_g16\n");
    write_config(dir.path(), "platforms.cfg", &source);

    testlist(dir.path())
        .args(["--test-suite-config", "platforms.cfg"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("sets machine to 'cheyenne hobart'"));

    assert!(dir.path().join("platforms.grids.testlist.txt").exists());
    assert!(!dir.path().join("platforms.platforms.testlist.txt").exists());
}

#[test]
fn cli_requires_a_mode() {
    let dir = TempDir::new().unwrap();
    testlist(dir.path()).assert().failure().code(2);
}
