use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::json;
use tempfile::TempDir;

fn gita_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("gita");
    path
}

/// Three verses per chapter, English translation on every verse.
fn write_bundle(path: &Path) {
    let mut chapters = Vec::new();
    let mut sloks = serde_json::Map::new();
    for n in 1..=18u32 {
        chapters.push(json!({
            "chapter_number": n,
            "name": format!("अध्याय {}", n),
            "transliteration": format!("Adhyaya {}", n),
            "meaning": { "en": format!("Meaning {}", n), "hi": "" },
            "summary": { "en": format!("Summary of chapter {}", n) },
            "verses_count": 3
        }));
        for v in 1..=3u32 {
            sloks.insert(
                format!("{}-{}", n, v),
                json!({
                    "chapter": n,
                    "verse": v,
                    "slok": format!("श्लोक {}.{}", n, v),
                    "siva": { "author": "Swami Sivananda", "et": format!("Translation {}.{}", n, v) }
                }),
            );
        }
    }
    let bundle = json!({ "chapters": chapters, "sloks": sloks });
    fs::write(path, serde_json::to_string_pretty(&bundle).unwrap()).unwrap();
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();
    let data_dir = root.join("data");
    fs::create_dir_all(&data_dir).unwrap();
    write_bundle(&data_dir.join("gita.json"));

    let config_content = format!(
        r#"[source]
mode = "bundled"

[bundle]
path = "{root}/data/gita.json"

[storage]
path = "{root}/data/gita.sqlite"

[practice]
default_target = 2
"#,
        root = root.display()
    );

    let config_path = config_dir.join("gita.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_gita(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = gita_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run gita binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn test_init_idempotent() {
    let (tmp, config) = setup_test_env();
    let (_, stderr, ok) = run_gita(&config, &["init"]);
    assert!(ok, "init failed: {}", stderr);
    let (_, stderr, ok) = run_gita(&config, &["init"]);
    assert!(ok, "second init failed: {}", stderr);
    assert!(tmp.path().join("data/gita.sqlite").exists());
}

#[test]
fn test_chapters_lists_all_eighteen() {
    let (_tmp, config) = setup_test_env();
    let (stdout, stderr, ok) = run_gita(&config, &["chapters"]);
    assert!(ok, "chapters failed: {}", stderr);
    assert_eq!(stdout.lines().count(), 18);
    assert!(stdout.contains("Adhyaya 18"));
}

#[test]
fn test_slok_found_and_missing() {
    let (_tmp, config) = setup_test_env();
    let (stdout, _, ok) = run_gita(&config, &["slok", "2", "3"]);
    assert!(ok);
    assert!(stdout.contains("श्लोक 2.3"));
    assert!(stdout.contains("[en] Translation 2.3"));

    let (_, stderr, ok) = run_gita(&config, &["slok", "2", "4"]);
    assert!(!ok);
    assert!(stderr.contains("verse not found"));

    let (_, _, ok) = run_gita(&config, &["chapter", "0"]);
    assert!(!ok);
    let (_, _, ok) = run_gita(&config, &["chapter", "19"]);
    assert!(!ok);
}

#[test]
fn test_read_counts_toward_practice() {
    let (_tmp, config) = setup_test_env();
    run_gita(&config, &["init"]);

    let (stdout, stderr, ok) = run_gita(&config, &["read", "2", "1"]);
    assert!(ok, "read failed: {}", stderr);
    assert!(stdout.contains("today 1 / 2"));

    // Reading the same verse twice on one day counts once
    let (stdout, _, _) = run_gita(&config, &["read", "2", "1"]);
    assert!(stdout.contains("today 1 / 2"));

    let (stdout, _, _) = run_gita(&config, &["read", "2", "2"]);
    assert!(stdout.contains("today 2 / 2"));

    let (stdout, _, ok) = run_gita(&config, &["practice"]);
    assert!(ok);
    assert!(stdout.contains("Today: 2 / 2 verses (100%)"));
    assert!(stdout.contains("Streak: 1 day"));

    let (stdout, _, _) = run_gita(&config, &["chapter", "2"]);
    assert!(stdout.contains("3 verses, 2 read"));
}

#[test]
fn test_read_unknown_verse_fails() {
    let (_tmp, config) = setup_test_env();
    let (_, stderr, ok) = run_gita(&config, &["read", "1", "99"]);
    assert!(!ok);
    assert!(stderr.contains("verse not found"));
}

#[test]
fn test_practice_target_bounds() {
    let (_tmp, config) = setup_test_env();
    let (stdout, _, ok) = run_gita(&config, &["practice", "--target", "5"]);
    assert!(ok);
    assert!(stdout.contains("Today: 0 / 5"));

    let (_, _, ok) = run_gita(&config, &["practice", "--target", "21"]);
    assert!(!ok);
    let (_, _, ok) = run_gita(&config, &["practice", "--target", "0"]);
    assert!(!ok);

    let (stdout, _, _) = run_gita(&config, &["practice"]);
    assert!(stdout.contains("Today: 0 / 5"));
}

#[test]
fn test_favorites_add_list_remove() {
    let (_tmp, config) = setup_test_env();
    run_gita(&config, &["favorite", "3", "2"]);
    run_gita(&config, &["favorite", "1", "1"]);

    let (stdout, _, ok) = run_gita(&config, &["favorites"]);
    assert!(ok);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("1.1"));
    assert!(lines[1].contains("3.2"));
    assert!(lines[1].contains("Translation 3.2"));

    run_gita(&config, &["favorite", "3", "2", "--remove"]);
    let (stdout, _, _) = run_gita(&config, &["favorites"]);
    assert_eq!(stdout.lines().count(), 1);
}

#[test]
fn test_continue_follows_last_read() {
    let (_tmp, config) = setup_test_env();
    let (stdout, _, ok) = run_gita(&config, &["continue"]);
    assert!(ok);
    assert!(stdout.contains("Nothing read yet"));

    run_gita(&config, &["read", "5", "3"]);
    let (stdout, _, _) = run_gita(&config, &["continue"]);
    assert!(stdout.contains("Last read 5.3"));
    assert!(stdout.contains("श्लोक 5.3"));
}

#[test]
fn test_viewing_a_verse_moves_last_read() {
    let (_tmp, config) = setup_test_env();
    run_gita(&config, &["read", "5", "3"]);

    let (_, stderr, ok) = run_gita(&config, &["slok", "7", "2"]);
    assert!(ok, "slok failed: {}", stderr);
    let (stdout, _, _) = run_gita(&config, &["continue"]);
    assert!(stdout.contains("Last read 7.2"));
    assert!(stdout.contains("श्लोक 7.2"));

    // A missing verse leaves the pointer alone
    run_gita(&config, &["slok", "7", "9"]);
    let (stdout, _, _) = run_gita(&config, &["continue"]);
    assert!(stdout.contains("Last read 7.2"));

    let (today, _, _) = run_gita(&config, &["today"]);
    let (stdout, _, _) = run_gita(&config, &["continue"]);
    let shown = today.lines().nth(2).unwrap().split(' ').next().unwrap();
    assert!(stdout.contains(&format!("Last read {}", shown)));
}

#[test]
fn test_clear_requires_confirmation() {
    let (_tmp, config) = setup_test_env();
    run_gita(&config, &["favorite", "1", "1"]);

    let (_, stderr, ok) = run_gita(&config, &["clear"]);
    assert!(!ok);
    assert!(stderr.contains("--yes"));

    let (_, _, ok) = run_gita(&config, &["clear", "--yes"]);
    assert!(ok);
    let (stdout, _, _) = run_gita(&config, &["favorites"]);
    assert!(stdout.contains("No favorites yet"));
}

#[test]
fn test_theme_toggle_persists() {
    let (_tmp, config) = setup_test_env();
    let (stdout, _, _) = run_gita(&config, &["theme"]);
    assert_eq!(stdout.trim(), "Theme: light");
    run_gita(&config, &["theme", "--toggle"]);
    let (stdout, _, _) = run_gita(&config, &["theme"]);
    assert_eq!(stdout.trim(), "Theme: dark");
}

#[test]
fn test_today_is_stable() {
    let (_tmp, config) = setup_test_env();
    let (first, stderr, ok) = run_gita(&config, &["today"]);
    assert!(ok, "today failed: {}", stderr);
    let (second, _, _) = run_gita(&config, &["today"]);
    assert_eq!(first, second);
    assert!(first.starts_with("Verse of the day"));
}

#[test]
fn test_sources() {
    let (_tmp, config) = setup_test_env();
    let (stdout, _, ok) = run_gita(&config, &["sources"]);
    assert!(ok);
    assert!(stdout.contains("bundle"));
    assert!(stdout.contains("OK"));
}

#[test]
fn test_stats() {
    let (_tmp, config) = setup_test_env();
    run_gita(&config, &["read", "1", "1"]);
    let (stdout, stderr, ok) = run_gita(&config, &["stats"]);
    assert!(ok, "stats failed: {}", stderr);
    assert!(stdout.contains("Read:        1 / 54"));
    assert!(stdout.contains("Streak:      0"));
}

#[test]
fn test_invalid_bundle_fails_fast() {
    let (tmp, config) = setup_test_env();
    fs::write(tmp.path().join("data/gita.json"), "{\"chapters\": []}").unwrap();
    let (_, stderr, ok) = run_gita(&config, &["chapters"]);
    assert!(!ok);
    assert!(stderr.contains("Invalid bundle"));
}
