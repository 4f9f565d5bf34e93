//! Durable local storage for the playground: one fixed slot for the current
//! project, per-problem solution files, and the solved-id set. Storage being
//! absent or unreadable degrades to a warning; the app continues in memory.

use crate::buffers::BufferSnapshot;
use crate::project::{PersistedProject, SavedSolution, SCHEMA_VERSION};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("USERPROFILE").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn data_dir() -> PathBuf {
    home_dir().join(".tinkerpad")
}

fn project_path() -> PathBuf {
    data_dir().join("project.json")
}

fn solutions_dir() -> PathBuf {
    data_dir().join("solutions")
}

fn solved_path() -> PathBuf {
    data_dir().join("solved.json")
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs())
        .unwrap_or(0)
}

fn write_json_atomic(path: &Path, bytes: Vec<u8>) -> io::Result<()> {
    let Some(dir) = path.parent() else {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "path has no parent"));
    };
    fs::create_dir_all(dir)?;

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("record");
    let tmp_path = dir.join(format!("{file_name}.tmp"));

    fs::write(&tmp_path, bytes)?;
    match fs::rename(&tmp_path, path) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            if path.exists() {
                fs::remove_file(path)?;
                fs::rename(&tmp_path, path)?;
                Ok(())
            } else {
                Err(rename_err)
            }
        }
    }
}

fn read_project_file(path: &Path) -> Result<PersistedProject, String> {
    let data = fs::read(path).map_err(|err| format!("failed to read {}: {err}", path.display()))?;
    let project: PersistedProject = serde_json::from_slice(&data)
        .map_err(|err| format!("failed to parse {}: {err}", path.display()))?;

    // v1 files had no version field; serde defaults them to 1 and the layout
    // is otherwise identical
    if project.schema_version != 1 && project.schema_version != SCHEMA_VERSION {
        return Err(format!(
            "unknown schema_version in {}: {}",
            path.display(),
            project.schema_version
        ));
    }
    Ok(project)
}

fn save_to(path: &Path, snapshot: &BufferSnapshot) -> io::Result<()> {
    let project = PersistedProject::from_snapshot(snapshot, now_secs());
    let bytes = serde_json::to_vec_pretty(&project)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err.to_string()))?;
    write_json_atomic(path, bytes)
}

fn load_from(path: &Path) -> (Option<PersistedProject>, Option<String>) {
    if !path.exists() {
        return (None, None);
    }
    match read_project_file(path) {
        Ok(project) => (Some(project), None),
        Err(err) => (None, Some(err)),
    }
}

/// Overwrites the single project slot; last write wins.
pub fn save(snapshot: &BufferSnapshot) -> io::Result<()> {
    save_to(&project_path(), snapshot)
}

/// `(None, None)` means no saved project exists; `(None, Some(_))` means the
/// slot exists but could not be used.
pub fn load() -> (Option<PersistedProject>, Option<String>) {
    load_from(&project_path())
}

fn solution_path_for(dir: &Path, problem_id: &str) -> PathBuf {
    dir.join(format!("{}.json", sanitize_filename(problem_id)))
}

fn save_solution_to(dir: &Path, problem_id: &str, code: &str) -> io::Result<()> {
    let solution = SavedSolution {
        problem_id: problem_id.to_string(),
        code: code.to_string(),
        timestamp: now_secs(),
    };
    let bytes = serde_json::to_vec_pretty(&solution)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err.to_string()))?;
    write_json_atomic(&solution_path_for(dir, problem_id), bytes)
}

fn load_solution_from(dir: &Path, problem_id: &str) -> (Option<SavedSolution>, Option<String>) {
    let path = solution_path_for(dir, problem_id);
    if !path.exists() {
        return (None, None);
    }

    let data = match fs::read(&path) {
        Ok(data) => data,
        Err(err) => {
            return (
                None,
                Some(format!("failed to read {}: {err}", path.display())),
            )
        }
    };
    match serde_json::from_slice(&data) {
        Ok(solution) => (Some(solution), None),
        Err(err) => (
            None,
            Some(format!("failed to parse {}: {err}", path.display())),
        ),
    }
}

pub fn save_solution(problem_id: &str, code: &str) -> io::Result<()> {
    save_solution_to(&solutions_dir(), problem_id, code)
}

pub fn load_solution(problem_id: &str) -> (Option<SavedSolution>, Option<String>) {
    load_solution_from(&solutions_dir(), problem_id)
}

fn solved_ids_from(path: &Path) -> (BTreeSet<String>, Option<String>) {
    if !path.exists() {
        return (BTreeSet::new(), None);
    }
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(err) => {
            return (
                BTreeSet::new(),
                Some(format!("failed to read {}: {err}", path.display())),
            )
        }
    };
    match serde_json::from_slice::<Vec<String>>(&data) {
        Ok(ids) => (ids.into_iter().collect(), None),
        Err(err) => (
            BTreeSet::new(),
            Some(format!("failed to parse {}: {err}", path.display())),
        ),
    }
}

fn mark_solved_at(path: &Path, problem_id: &str) -> io::Result<()> {
    let (mut solved, _) = solved_ids_from(path);
    solved.insert(problem_id.to_string());
    let ids: Vec<&String> = solved.iter().collect();
    let bytes = serde_json::to_vec_pretty(&ids)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err.to_string()))?;
    write_json_atomic(path, bytes)
}

pub fn solved_ids() -> (BTreeSet<String>, Option<String>) {
    solved_ids_from(&solved_path())
}

pub fn mark_solved(problem_id: &str) -> io::Result<()> {
    mark_solved_at(&solved_path(), problem_id)
}

fn sanitize_filename(raw: &str) -> String {
    let mut output = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.') {
            output.push(ch);
        } else {
            output.push('_');
        }
    }

    if output.trim_matches('_').is_empty() {
        "problem".to_string()
    } else {
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time should be monotonic")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "tinkerpad_store_{prefix}_{}_{}",
            std::process::id(),
            nanos
        ))
    }

    fn snapshot(markup: &str) -> BufferSnapshot {
        BufferSnapshot {
            markup: markup.to_string(),
            style: "p{}".to_string(),
            behavior: "// js".to_string(),
        }
    }

    #[test]
    fn load_of_a_missing_slot_is_not_found_without_warning() {
        let path = temp_path("missing").join("project.json");
        let (project, warning) = load_from(&path);
        assert!(project.is_none());
        assert!(warning.is_none());
    }

    #[test]
    fn save_then_load_round_trips_the_snapshot() {
        let dir = temp_path("round_trip");
        let path = dir.join("project.json");

        let original = snapshot("<p>saved</p>");
        save_to(&path, &original).expect("save should succeed");

        let (project, warning) = load_from(&path);
        assert!(warning.is_none());
        let project = project.expect("saved project should load");
        assert_eq!(project.schema_version, SCHEMA_VERSION);
        assert_eq!(project.snapshot(), original);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn second_save_overwrites_the_first() {
        let dir = temp_path("overwrite");
        let path = dir.join("project.json");

        save_to(&path, &snapshot("<p>first</p>")).expect("first save");
        save_to(&path, &snapshot("<p>second</p>")).expect("second save");

        let (project, _) = load_from(&path);
        assert_eq!(
            project.expect("slot should load").markup,
            "<p>second</p>"
        );

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn legacy_file_without_schema_version_still_loads() {
        let dir = temp_path("legacy");
        fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("project.json");
        let data = r#"{
  "markup": "<p>old</p>",
  "style": "",
  "behavior": "",
  "timestamp": 1700000000
}"#;
        fs::write(&path, data).expect("legacy fixture should write");

        let (project, warning) = load_from(&path);
        assert!(warning.is_none());
        let project = project.expect("legacy layout should load");
        assert_eq!(project.schema_version, 1);
        assert_eq!(project.markup, "<p>old</p>");

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn unknown_schema_version_is_rejected_with_a_warning() {
        let dir = temp_path("unknown_version");
        fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("project.json");
        let data = r#"{
  "schema_version": 99,
  "markup": "",
  "style": "",
  "behavior": "",
  "timestamp": 0
}"#;
        fs::write(&path, data).expect("fixture should write");

        let (project, warning) = load_from(&path);
        assert!(project.is_none());
        assert!(warning
            .expect("unknown version should warn")
            .contains("unknown schema_version"));

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn corrupt_slot_degrades_to_a_warning() {
        let dir = temp_path("corrupt");
        fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("project.json");
        fs::write(&path, "not json at all").expect("fixture should write");

        let (project, warning) = load_from(&path);
        assert!(project.is_none());
        assert!(warning.is_some());

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn solutions_persist_per_problem_id() {
        let dir = temp_path("solutions");

        save_solution_to(&dir, "arrays.sum", "function solve(i) { return i; }")
            .expect("solution save");
        save_solution_to(&dir, "strings.reverse", "// other").expect("other save");

        let (solution, warning) = load_solution_from(&dir, "arrays.sum");
        assert!(warning.is_none());
        let solution = solution.expect("saved solution should load");
        assert_eq!(solution.problem_id, "arrays.sum");
        assert!(solution.code.contains("function solve"));

        let (missing, warning) = load_solution_from(&dir, "not.saved");
        assert!(missing.is_none());
        assert!(warning.is_none());

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn solved_set_accumulates_and_deduplicates() {
        let dir = temp_path("solved");
        let path = dir.join("solved.json");

        mark_solved_at(&path, "arrays.sum").expect("first mark");
        mark_solved_at(&path, "strings.reverse").expect("second mark");
        mark_solved_at(&path, "arrays.sum").expect("repeat mark");

        let (solved, warning) = solved_ids_from(&path);
        assert!(warning.is_none());
        assert_eq!(solved.len(), 2);
        assert!(solved.contains("arrays.sum"));
        assert!(solved.contains("strings.reverse"));

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn sanitize_filename_replaces_path_hostile_characters() {
        assert_eq!(sanitize_filename("arrays.sum"), "arrays.sum");
        assert_eq!(sanitize_filename("a/b\\c"), "a_b_c");
        assert_eq!(sanitize_filename("///"), "problem");
    }
}
