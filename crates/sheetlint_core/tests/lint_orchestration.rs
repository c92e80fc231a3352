//! Integration tests for multi-file linting.

mod common;

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;
use tempfile::TempDir;

use sheetlint_core::{Config, LintOptions, LinterError, lint};

use common::{registry, write};

fn config() -> Config {
    Config::new()
        .with_rule("color-no-red", json!(true))
        .with_rule("block-no-empty", json!(true))
}

fn relative_sources(cwd: &Path, aggregate: &sheetlint_core::AggregateResult) -> Vec<String> {
    aggregate
        .results
        .iter()
        .map(|r| {
            r.source_path()
                .unwrap()
                .strip_prefix(cwd)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect()
}

#[tokio::test]
async fn test_cache_skips_unchanged_files_on_rerun() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "a.css", "a { color: blue; }");
    write(temp.path(), "b.css", "b { color: blue; }");

    let options = || {
        LintOptions::for_files(["*.css"])
            .with_cwd(temp.path())
            .with_config(config())
            .with_cache(true)
    };

    let first = lint(options(), registry()).await.unwrap();
    assert!(first.results.iter().all(|r| !r.from_cache));
    assert!(temp.path().join(".sheetlintcache").exists());

    let second = lint(options(), registry()).await.unwrap();
    assert_eq!(second.results.len(), 2);
    assert!(second.results.iter().all(|r| r.from_cache));
    assert!(!second.errored);

    write(temp.path(), "b.css", "b { color: green; }");
    let third = lint(options(), registry()).await.unwrap();
    let from_cache: Vec<bool> = third.results.iter().map(|r| r.from_cache).collect();
    assert_eq!(from_cache, vec![true, false]);
}

#[tokio::test]
async fn test_files_with_warnings_are_never_cached() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "bad.css", "a { color: red; }");

    let options = || {
        LintOptions::for_files(["bad.css"])
            .with_cwd(temp.path())
            .with_config(config())
            .with_cache(true)
    };

    for _ in 0..2 {
        let aggregate = lint(options(), registry()).await.unwrap();
        let result = &aggregate.results[0];
        assert!(!result.from_cache);
        assert_eq!(result.warnings.len(), 1);
        assert!(aggregate.errored);
    }
}

#[tokio::test]
async fn test_changed_config_invalidates_cache() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "a.css", "a { color: blue; }");

    let run = |config: Config| {
        LintOptions::for_files(["a.css"])
            .with_cwd(temp.path())
            .with_config(config)
            .with_cache(true)
    };

    lint(run(config()), registry()).await.unwrap();
    let rerun = lint(
        run(config().with_rule("noop-fix", json!(true))),
        registry(),
    )
    .await
    .unwrap();
    assert!(!rerun.results[0].from_cache);
}

#[tokio::test]
async fn test_disabled_cache_deletes_cache_file() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "a.css", "a { color: blue; }");

    let options = LintOptions::for_files(["a.css"])
        .with_cwd(temp.path())
        .with_config(config());
    lint(options.clone().with_cache(true), registry()).await.unwrap();
    assert!(temp.path().join(".sheetlintcache").exists());

    lint(options, registry()).await.unwrap();
    assert!(!temp.path().join(".sheetlintcache").exists());
}

#[tokio::test]
async fn test_syntax_error_is_isolated_to_its_file() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "a.css", "a { color: blue; }");
    write(temp.path(), "b.css", "b { color: blue;");
    write(temp.path(), "c.css", "c { color: red; }");

    let options = LintOptions::for_files(["*.css"])
        .with_cwd(temp.path())
        .with_config(config());
    let aggregate = lint(options, registry()).await.unwrap();

    assert_eq!(
        relative_sources(temp.path(), &aggregate),
        vec!["a.css", "b.css", "c.css"]
    );
    assert!(aggregate.errored);

    let [a, b, c] = &aggregate.results[..] else {
        panic!("expected three results");
    };
    assert!(!a.errored && a.warnings.is_empty());
    assert!(b.errored);
    assert_eq!(b.warnings[0].rule, "CssSyntaxError");
    assert_eq!(c.warnings[0].rule, "color-no-red");
}

#[tokio::test]
async fn test_all_files_ignored() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "vendor/a.css", "a {}");
    write(temp.path(), ".sheetlintignore", "vendor/\n");

    let options = LintOptions::for_files(["vendor/*.css"])
        .with_cwd(temp.path())
        .with_config(config());
    let err = lint(options, registry()).await.unwrap_err();
    assert!(matches!(err, LinterError::AllFilesIgnored));
}

#[tokio::test]
async fn test_no_files_found() {
    let temp = TempDir::new().unwrap();

    let options = LintOptions::for_files(["missing/*.css"])
        .with_cwd(temp.path())
        .with_config(config());
    let err = lint(options, registry()).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "No files matching the pattern \"missing/*.css !**/node_modules/**\" were found."
    );
}

#[rstest]
#[case::from_options(LintOptions::default().with_allow_empty_input(true), Some(config()), &[])]
#[case::from_config(
    LintOptions::default(),
    Some(Config { allow_empty_input: Some(true), ..config() }),
    &[]
)]
#[case::from_extends(
    LintOptions::default(),
    None,
    &[
        ("shared.json", r#"{ "allowEmptyInput": true }"#),
        (".sheetlintrc", r#"{ "extends": "./shared.json", "rules": { "color-no-red": true } }"#),
    ]
)]
#[tokio::test]
async fn test_allow_empty_input(
    #[case] options: LintOptions,
    #[case] config: Option<Config>,
    #[case] files: &[(&str, &str)],
) {
    let temp = TempDir::new().unwrap();
    for (name, content) in files {
        write(temp.path(), name, content);
    }

    let options = LintOptions {
        files: Some(vec!["missing/*.css".to_string()]),
        config,
        ..options
    }
    .with_cwd(temp.path());
    let aggregate = lint(options, registry()).await.unwrap();

    assert!(aggregate.results.is_empty());
    assert!(!aggregate.errored);
}

#[tokio::test]
async fn test_fix_writes_only_changed_files() {
    let temp = TempDir::new().unwrap();
    let red = write(temp.path(), "red.css", "a { color: red; }");
    let blue = write(temp.path(), "blue.css", "a { color: blue; }");
    let blue_modified = fs::metadata(&blue).unwrap().modified().unwrap();

    let options = LintOptions::for_files(["*.css"])
        .with_cwd(temp.path())
        .with_config(
            Config::new()
                .with_rule("color-no-red", json!(true))
                .with_rule("noop-fix", json!(true)),
        )
        .with_fix(true);
    let aggregate = lint(options, registry()).await.unwrap();

    assert!(!aggregate.errored);
    assert!(aggregate.code.is_none());
    assert_eq!(fs::read_to_string(&red).unwrap(), "a { color: green; }");
    assert_eq!(fs::read_to_string(&blue).unwrap(), "a { color: blue; }");
    assert_eq!(fs::metadata(&blue).unwrap().modified().unwrap(), blue_modified);
}

#[tokio::test]
async fn test_fix_skips_file_with_disable_comment() {
    let temp = TempDir::new().unwrap();
    let source = "/* sheetlint-disable color-no-red */\na { color: red; }\nb { color: red; }";
    let path = write(temp.path(), "a.css", source);

    let options = LintOptions::for_files(["a.css"])
        .with_cwd(temp.path())
        .with_config(Config::new().with_rule("color-no-red", json!(true)))
        .with_fix(true);
    lint(options, registry()).await.unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), source);
}

#[rstest]
#[case::unbounded(None)]
#[case::bounded(Some(8))]
#[tokio::test]
async fn test_many_files_keep_input_order(#[case] concurrency: Option<usize>) {
    let temp = TempDir::new().unwrap();
    for i in 0..1000 {
        let value = if i % 100 == 0 { "red" } else { "blue" };
        write(
            temp.path(),
            &format!("styles/{i:04}.css"),
            &format!(".c{i} {{ color: {value}; }}"),
        );
    }

    let mut options = LintOptions::for_files(["styles/**/*.css"])
        .with_cwd(temp.path())
        .with_config(config());
    options.concurrency = concurrency;
    let aggregate = lint(options, registry()).await.unwrap();

    let sources = relative_sources(temp.path(), &aggregate);
    let mut sorted = sources.clone();
    sorted.sort();
    assert_eq!(sources.len(), 1000);
    assert_eq!(sources, sorted);
    assert_eq!(aggregate.error_count, 10);
}

#[tokio::test]
async fn test_max_warnings_exceeded() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "a.css", "a { color: red; }\nb { color: red; }");

    let options = LintOptions::for_files(["a.css"])
        .with_cwd(temp.path())
        .with_config(Config::new().with_rule(
            "color-no-red",
            json!([true, { "severity": "warning" }]),
        ))
        .with_max_warnings(1);
    let aggregate = lint(options, registry()).await.unwrap();

    assert!(aggregate.errored);
    let exceeded = aggregate.max_warnings_exceeded.unwrap();
    assert_eq!(exceeded.max_warnings, 1);
    assert_eq!(exceeded.found_warnings, 2);
}

#[rstest]
#[case::default_ignores(false, vec!["a.css"])]
#[case::disabled_default_ignores(true, vec!["a.css", "node_modules/pkg/b.css"])]
#[tokio::test]
async fn test_node_modules_exclusion(#[case] disable: bool, #[case] expected: Vec<&str>) {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "a.css", "a { color: blue; }");
    write(temp.path(), "node_modules/pkg/b.css", "b { color: blue; }");

    let mut options = LintOptions::for_files(["**/*.css"])
        .with_cwd(temp.path())
        .with_config(config());
    options.disable_default_ignores = disable;
    let aggregate = lint(options, registry()).await.unwrap();

    assert_eq!(relative_sources(temp.path(), &aggregate), expected);
}

#[tokio::test]
async fn test_compact_report() {
    let temp = TempDir::new().unwrap();
    let path = write(temp.path(), "a.css", "a { color: red; }");

    let options = LintOptions::for_files(["a.css"])
        .with_cwd(temp.path())
        .with_config(config())
        .with_formatter("compact");
    let aggregate = lint(options, registry()).await.unwrap();

    assert_eq!(
        aggregate.report,
        format!(
            "{}: line 1, col 5, error - Unexpected red (color-no-red)\n",
            path.display()
        )
    );
}

#[tokio::test]
async fn test_json_report_lists_every_file() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "a.css", "a { color: red; }");
    write(temp.path(), "b.css", "b { color: blue; }");

    let options = LintOptions::for_files(["*.css"])
        .with_cwd(temp.path())
        .with_config(config());
    let aggregate = lint(options, registry()).await.unwrap();

    let report: serde_json::Value = serde_json::from_str(&aggregate.report).unwrap();
    let entries = report.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["warnings"].as_array().unwrap().len(), 1);
    assert_eq!(entries[1]["warnings"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_glob_syntax_in_cwd_is_literal() {
    let temp = TempDir::new().unwrap();
    let cwd = temp.path().join("proj[1]");
    write(&cwd, "a.css", "a { color: red; }");
    write(&cwd, "legacy/b.css", "b { color: red; }");
    write(temp.path(), "proj1/c.css", "c { color: red; }");

    let config = config().with_override(sheetlint_core::Override::new(
        ["legacy/**"],
        Config::new().with_rule("color-no-red", json!(null)),
    ));
    let options = LintOptions::for_files(["**/*.css"])
        .with_cwd(&cwd)
        .with_config(config);
    let aggregate = lint(options, registry()).await.unwrap();

    assert_eq!(relative_sources(&cwd, &aggregate), vec!["a.css", "legacy/b.css"]);
    assert_eq!(aggregate.results[0].warnings.len(), 1);
    assert!(aggregate.results[1].warnings.is_empty());
}

#[tokio::test]
async fn test_ignore_patterns_follow_glob_cwd() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "packages/app.css", "a { color: blue; }");
    write(temp.path(), "packages/vendor/a.css", "a { color: red; }");

    let options = LintOptions::for_files(["**/*.css"])
        .with_cwd(temp.path())
        .with_glob_cwd("packages")
        .with_ignore_pattern("/vendor")
        .with_config(config());
    let aggregate = lint(options, registry()).await.unwrap();

    assert_eq!(
        relative_sources(temp.path(), &aggregate),
        vec!["packages/app.css"]
    );
    assert!(!aggregate.errored);
}
