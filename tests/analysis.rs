use codescope::{analyze, AnalysisConfig, Impact, Rating, Severity, SourceFile};
use indoc::indoc;
use pretty_assertions::assert_eq;

fn run(files: &[SourceFile]) -> codescope::AnalysisReport {
    analyze(files, &AnalysisConfig::default())
}

#[test]
fn cyclomatic_is_at_least_one_for_every_function() {
    let files = [SourceFile::new(
        "app.js",
        indoc! {r#"
            function empty() {}
            const identity = (x) => x;
            function branchy(a, b) {
              if (a) { return 1; }
              return a && b ? 2 : 3;
            }
            class Box { get() { return this.v; } }
        "#},
    )];
    let report = run(&files);
    assert_eq!(report.complexity.functions.len(), 4);
    assert!(report.complexity.functions.iter().all(|f| f.cyclomatic >= 1));
}

#[test]
fn eval_reported_as_dangerous_eval_critical() {
    let report = run(&[SourceFile::new("a.js", "eval(userInput);")]);
    let v = &report.security.vulnerabilities;
    assert_eq!(v.len(), 1);
    assert_eq!(v[0].kind, "dangerous-eval");
    assert_eq!(v[0].severity, Severity::Critical);
}

#[test]
fn string_scheduler_reported_as_string_execution_high() {
    let report = run(&[SourceFile::new(
        "a.js",
        "setTimeout('refresh()', 1000);",
    )]);
    let v = &report.security.vulnerabilities;
    assert_eq!(v.len(), 1);
    assert_eq!(v[0].kind, "string-execution");
    assert_eq!(v[0].severity, Severity::High);
}

#[test]
fn raw_html_sink_reported_as_xss() {
    let report = run(&[SourceFile::new(
        "a.js",
        "document.body.innerHTML = comment.text;",
    )]);
    let v = &report.security.vulnerabilities;
    assert_eq!(v.len(), 1);
    assert_eq!(v[0].kind, "xss-innerHTML");
    assert_eq!(v[0].severity, Severity::High);
}

#[test]
fn string_built_query_reported_as_sql_injection() {
    let report = run(&[SourceFile::new(
        "a.js",
        "db.run(`SELECT * FROM users WHERE id = ${req.params.id}`);",
    )]);
    let v = &report.security.vulnerabilities;
    assert_eq!(v.len(), 1);
    assert_eq!(v[0].kind, "sql-injection");
    assert_eq!(v[0].severity, Severity::High);
}

#[test]
fn security_score_formula_is_exact() {
    // One finding of each severity: 100 - 20 - 10 - 5 - 2 = 63.
    let files = [SourceFile::new(
        "mixed.js",
        indoc! {r#"
            eval(cmd);
            db.run(`SELECT name FROM users WHERE id = ${id}`);
            const digest = crypto.createHash('md5').update(payload);
            const resetToken = Math.random().toString(36);
        "#},
    )];
    let report = run(&files);
    let by_severity = |s: Severity| {
        report
            .security
            .vulnerabilities
            .iter()
            .filter(|v| v.severity == s)
            .count()
    };
    assert_eq!(by_severity(Severity::Critical), 1);
    assert_eq!(by_severity(Severity::High), 1);
    assert_eq!(by_severity(Severity::Medium), 1);
    assert_eq!(by_severity(Severity::Low), 1);
    assert_eq!(report.security.score, 63);
}

#[test]
fn three_deep_loops_reported_as_nested_iteration() {
    let files = [SourceFile::new(
        "matrix.js",
        indoc! {r#"
            function multiply(a, b) {
              for (let i = 0; i < a.length; i++) {
                for (let j = 0; j < b.length; j++) {
                  for (let k = 0; k < a.length; k++) {
                    sum += a[i][k] * b[k][j];
                  }
                }
              }
            }
        "#},
    )];
    let report = run(&files);
    assert!(report
        .performance
        .bottlenecks
        .iter()
        .any(|b| b.kind == "nested-iteration" && b.severity == Impact::High));
}

#[test]
fn mutual_import_yields_exactly_one_cycle() {
    let files = [
        SourceFile::new("a.js", "import { b } from './b';\nexport const a = 1;"),
        SourceFile::new("b.js", "import { a } from './a';\nexport const b = 2;"),
    ];
    let report = run(&files);
    assert_eq!(report.dependencies.cycles.len(), 1);
    assert_eq!(report.dependencies.cycles[0], vec!["a.js", "b.js"]);
}

#[test]
fn empty_input_yields_valid_zero_report() {
    let report = run(&[]);
    assert!(report.complexity.functions.is_empty());
    assert!(report.security.vulnerabilities.is_empty());
    assert!(report.performance.bottlenecks.is_empty());
    assert!(report.dependencies.cycles.is_empty());
    assert_eq!(report.summary.total_files, 0);
    assert_eq!(report.summary.total_lines, 0);
    assert_eq!(report.complexity.overall.rating, Rating::Excellent);
    assert_eq!(report.security.score, 100);
}

#[test]
fn malformed_file_does_not_abort_sibling_analysis() {
    let files = [
        SourceFile::new("broken.js", "const x = {"),
        SourceFile::new(
            "fine.js",
            "function risky() { eval(x); for (;;) { for (;;) { f(); } } }",
        ),
    ];
    let report = run(&files);
    // The sibling still contributes to every dimension.
    assert_eq!(report.complexity.functions.len(), 1);
    assert_eq!(report.complexity.functions[0].name, "risky");
    assert!(report
        .security
        .vulnerabilities
        .iter()
        .any(|v| v.kind == "dangerous-eval"));
    assert!(!report.performance.bottlenecks.is_empty());
    // And the broken file still counts in the totals.
    assert_eq!(report.summary.total_files, 2);
}

#[test]
fn syntax_error_in_one_function_keeps_siblings_in_same_file() {
    let files = [SourceFile::new(
        "app.js",
        "function good() { return 1; }\nfunction bad( { if (x) {",
    )];
    let report = run(&files);
    // The recovery boundary is the node, not the file.
    assert!(report.complexity.functions.iter().any(|f| f.name == "good"));
    assert_eq!(report.summary.total_files, 1);
}

#[test]
fn security_findings_survive_partial_syntax_error() {
    let files = [SourceFile::new("app.js", "eval(cmd);\nfunction bad( {")];
    let report = run(&files);
    assert!(report
        .security
        .vulnerabilities
        .iter()
        .any(|v| v.kind == "dangerous-eval" && v.severity == Severity::Critical));
}

#[test]
fn analysis_is_deterministic_and_order_independent() {
    let a = SourceFile::new("a.js", "import { b } from './b'; eval(x);");
    let b = SourceFile::new(
        "b.js",
        "import { a } from './a'; function f(n) { if (n) { return n; } }",
    );

    let first = run(&[a.clone(), b.clone()]);
    let second = run(&[a.clone(), b.clone()]);
    assert_eq!(
        serde_json::to_value(&first).unwrap(),
        serde_json::to_value(&second).unwrap()
    );

    let reversed = run(&[b, a]);
    assert_eq!(first, reversed);
}

#[test]
fn report_serializes_to_plain_json_tree() {
    let report = run(&[SourceFile::new(
        "a.js",
        "function f() { return 1; }",
    )]);
    let value = serde_json::to_value(&report).unwrap();
    assert!(value.get("complexity").is_some());
    assert!(value.get("summary").is_some());

    let round_trip: codescope::AnalysisReport = serde_json::from_value(value).unwrap();
    assert_eq!(round_trip, report);
}

#[test]
fn unreadable_file_treated_as_empty_not_fatal() {
    // The input contract: files with absent content arrive as empty text.
    let files = [
        SourceFile::new("ghost.js", ""),
        SourceFile::new("real.js", "function f() { return 1; }"),
    ];
    let report = run(&files);
    assert_eq!(report.summary.total_files, 2);
    assert_eq!(report.complexity.functions.len(), 1);
}
