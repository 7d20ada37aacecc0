use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const HEADER: &str = "Date,Case Number,Title,Event,Court,Status";

fn calparse(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("calparse").unwrap();
    cmd.current_dir(dir).env_remove("RUST_LOG");
    cmd
}

fn write_page(dir: &Path, name: &str, cells: &[&str]) {
    let calendars = dir.join("calendars");
    fs::create_dir_all(&calendars).unwrap();
    let body: String = cells
        .iter()
        .map(|cell| format!("<td class=\"Data\">{}</td>\n", cell))
        .collect();
    fs::write(calendars.join(name), format!("<table><tr>{}</tr></table>", body)).unwrap();
}

#[test]
fn no_arguments_without_calendars_writes_header_only() {
    let temp_dir = TempDir::new().unwrap();

    calparse(temp_dir.path()).assert().success();

    let content = fs::read_to_string(temp_dir.path().join("calendars_parsed.csv")).unwrap();
    assert_eq!(content, format!("{}\n", HEADER));
}

#[test]
fn parses_pages_and_reports_each_file() {
    let temp_dir = TempDir::new().unwrap();
    write_page(
        temp_dir.path(),
        "calendar_day_1_year_2024.html",
        &[
            "01/02/2024", "CR-1", "State v. Doe", "Hearing", "District", "Open",
            "01/02/2024", "CR-2", "State v. Roe", "Trial", "District", "Closed",
        ],
    );
    write_page(
        temp_dir.path(),
        "calendar_day_2_year_2024.html",
        &["01/03/2024", "CV-9", "Smith v. Jones", "Motion", "Superior", "Set", "stray"],
    );

    calparse(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Parsing file calendars/calendar_day_1_year_2024.html ...",
        ))
        .stdout(predicate::str::contains("...done."));

    let content = fs::read_to_string(temp_dir.path().join("calendars_parsed.csv")).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines,
        vec![
            HEADER,
            "01/02/2024,CR-1,State v. Doe,Hearing,District,Open",
            "01/02/2024,CR-2,State v. Roe,Trial,District,Closed",
            "01/03/2024,CV-9,Smith v. Jones,Motion,Superior,Set",
        ]
    );
}

#[test]
fn two_single_record_pages_give_three_lines() {
    let temp_dir = TempDir::new().unwrap();
    write_page(
        temp_dir.path(),
        "calendar_day_1_year_2024.html",
        &["01/02/2024", "CR-1", "State v. Doe", "Hearing", "District", "Open"],
    );
    write_page(
        temp_dir.path(),
        "calendar_day_2_year_2024.html",
        &["01/03/2024", "CR-2", "State v. Roe", "Trial", "Superior", "Closed"],
    );

    calparse(temp_dir.path()).assert().success();

    let content = fs::read_to_string(temp_dir.path().join("calendars_parsed.csv")).unwrap();
    assert_eq!(content.lines().count(), 3);
    assert_eq!(
        content,
        format!(
            "{}\n{}\n{}\n",
            HEADER,
            "01/02/2024,CR-1,State v. Doe,Hearing,District,Open",
            "01/03/2024,CR-2,State v. Roe,Trial,Superior,Closed"
        )
    );
}

#[test]
fn pages_are_ordered_by_year_then_day() {
    let temp_dir = TempDir::new().unwrap();
    write_page(
        temp_dir.path(),
        "calendar_day_10_year_2024.html",
        &["d10", "c", "t", "e", "co", "s"],
    );
    write_page(
        temp_dir.path(),
        "calendar_day_2_year_2024.html",
        &["d2", "c", "t", "e", "co", "s"],
    );
    write_page(
        temp_dir.path(),
        "calendar_day_30_year_2023.html",
        &["d30", "c", "t", "e", "co", "s"],
    );

    calparse(temp_dir.path()).arg("-q").assert().success();

    let content = fs::read_to_string(temp_dir.path().join("calendars_parsed.csv")).unwrap();
    let dates: Vec<&str> = content
        .lines()
        .skip(1)
        .filter_map(|line| line.split(',').next())
        .collect();
    assert_eq!(dates, vec!["d30", "d2", "d10"]);
}

#[test]
fn tab_delimiter_and_custom_output() {
    let temp_dir = TempDir::new().unwrap();
    write_page(
        temp_dir.path(),
        "calendar_day_5_year_2023.html",
        &["a", "b", "c", "d", "e", "f"],
    );

    calparse(temp_dir.path())
        .args(["--quiet", "--delimiter", "tab", "--output", "out/records.tsv"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let content = fs::read_to_string(temp_dir.path().join("out/records.tsv")).unwrap();
    assert_eq!(
        content,
        "Date\tCase Number\tTitle\tEvent\tCourt\tStatus\na\tb\tc\td\te\tf\n"
    );
}

#[test]
fn dry_run_lists_files_without_writing() {
    let temp_dir = TempDir::new().unwrap();
    write_page(temp_dir.path(), "calendar_day_7_year_2022.html", &["x"]);

    calparse(temp_dir.path())
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("calendar_day_7_year_2022.html"));

    assert!(!temp_dir.path().join("calendars_parsed.csv").exists());
}

#[test]
fn generate_config_writes_sample() {
    let temp_dir = TempDir::new().unwrap();

    calparse(temp_dir.path())
        .arg("--generate-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("calparse.toml"));

    let content = fs::read_to_string(temp_dir.path().join("calparse.toml")).unwrap();
    assert!(content.contains("[discovery]"));
    assert!(content.contains("[output]"));
}

#[test]
fn config_file_in_working_directory_is_picked_up() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir(temp_dir.path().join("pages")).unwrap();
    fs::write(
        temp_dir.path().join("pages/calendar_day_1_year_2024.html"),
        "<td class=\"Data\">1</td><td class=\"Data\">2</td><td class=\"Data\">3</td>\
         <td class=\"Data\">4</td><td class=\"Data\">5</td><td class=\"Data\">6</td>",
    )
    .unwrap();
    fs::write(
        temp_dir.path().join("calparse.toml"),
        "[discovery]\ninput_dir = \"pages\"\n\n[output]\npath = \"pages.csv\"\ndelimiter = \";\"\n",
    )
    .unwrap();

    calparse(temp_dir.path()).arg("-q").assert().success();

    let content = fs::read_to_string(temp_dir.path().join("pages.csv")).unwrap();
    assert_eq!(
        content,
        "Date;Case Number;Title;Event;Court;Status\n1;2;3;4;5;6\n"
    );
}

#[test]
fn invalid_utf8_page_fails_with_read_exit_code() {
    let temp_dir = TempDir::new().unwrap();
    let calendars = temp_dir.path().join("calendars");
    fs::create_dir(&calendars).unwrap();
    fs::write(calendars.join("calendar_day_1_year_2024.html"), [0xc3, 0x28, 0xff]).unwrap();

    calparse(temp_dir.path())
        .assert()
        .code(4)
        .stderr(predicate::str::contains("calendar_day_1_year_2024.html"));

    assert!(!temp_dir.path().join("calendars_parsed.csv").exists());
}

#[test]
fn input_path_that_is_a_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("calendars"), "not a directory").unwrap();

    calparse(temp_dir.path()).assert().code(3);
}

#[test]
fn broken_config_file_fails_with_config_exit_code() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("broken.toml"), "[discovery\ninput_dir = ").unwrap();

    calparse(temp_dir.path())
        .args(["--config", "broken.toml"])
        .assert()
        .code(2);
}
