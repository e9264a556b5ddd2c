//! Shared fixtures for integration tests: canon records written to a temp dir.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use serde_json::{Value, json};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub const BASE_URL: &str = "https://deadends.dev";

/// A valid `partial` canon record as JSON.
pub fn canon_json(id: &str, regex: &str, fix_success_rate: f64) -> Value {
    let domain = id.split('/').next().unwrap();
    json!({
        "schema_version": "1.0.0",
        "id": id,
        "url": format!("{BASE_URL}/{id}"),
        "error": {
            "signature": regex.replace('\\', ""),
            "regex": regex,
            "domain": domain,
            "category": "runtime",
            "first_seen": "2024-01-01",
            "last_confirmed": "2025-06-01"
        },
        "environment": {
            "runtime": {"name": domain, "version_range": ">=1.0"},
            "os": "linux"
        },
        "verdict": {
            "resolvable": "partial",
            "fix_success_rate": fix_success_rate,
            "confidence": 0.5,
            "summary": "Test summary",
            "last_updated": "2025-06-01"
        },
        "dead_ends": [{
            "action": "Reinstall everything",
            "why_fails": "Does not address the root cause",
            "fail_rate": 0.8,
            "sources": ["https://example.com/issue"]
        }],
        "workarounds": [{
            "action": "Apply the targeted fix",
            "success_rate": 0.6,
            "how": "Run the fix command",
            "sources": ["https://example.com/fix"]
        }],
        "transition_graph": {
            "leads_to": [],
            "preceded_by": [],
            "frequently_confused_with": []
        },
        "metadata": {
            "generated_by": "test",
            "generation_date": "2025-06-01",
            "review_status": "auto_generated",
            "evidence_count": 5
        }
    })
}

/// Adds a `leads_to` edge to `target`.
pub fn leads_to(mut canon: Value, target: &str) -> Value {
    canon["transition_graph"]["leads_to"]
        .as_array_mut()
        .unwrap()
        .push(json!({"error_id": target, "probability": 0.3}));
    canon
}

/// Writes `value` to `root/<id>.json`.
pub fn write_json(root: &Path, value: &Value) {
    let id = value["id"].as_str().unwrap();
    write_raw(root, &format!("{id}.json"), &serde_json::to_string_pretty(value).unwrap());
}

/// Writes arbitrary text to `root/relative`, creating directories.
pub fn write_raw(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// A temp data directory holding `canons`.
pub fn corpus_dir(canons: &[Value]) -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    for canon in canons {
        write_json(dir.path(), canon);
    }
    dir
}

/// A small corpus covering matching, search and cross-references.
pub fn sample_canons() -> Vec<Value> {
    let mut oom = canon_json("docker/oom-killed/docker24", "OOMKilled", 0.7);
    oom["verdict"]["summary"] = json!("Container exceeded its memory cgroup");
    oom["dead_ends"][0]["action"] = json!("Raise the ulimit");

    vec![
        leads_to(
            canon_json(
                "python/typeerror-nonetype/py311",
                r"TypeError: 'NoneType' object is not subscriptable",
                0.85,
            ),
            "python/attributeerror/py311",
        ),
        canon_json("python/attributeerror/py311", "AttributeError", 0.6),
        canon_json("python/typeerror-generic/py311", "TypeError", 0.4),
        oom,
        canon_json("git/detached-head/git2", "detached HEAD", 0.9),
    ]
}
