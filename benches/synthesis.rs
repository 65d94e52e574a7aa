//! Benchmarks for repo list parsing and fpm command synthesis.
//!
//! These cover the pure parts of a build: merging `repos.json` entries with
//! `DEFAULT` and turning a gathered option set into fpm arguments.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use repo_packager::command::{FpmCommand, FpmSettings};
use repo_packager::config::parse_repo_list;
use repo_packager::options::PackageSpec;
use repo_packager::template::TemplateContext;
use std::path::Path;

/// fpm options as a typical instructions directory provides them.
const FPM_JSON: &str = r#"{
    "name": "{name}",
    "version": "1.2.0",
    "iteration": "1700000000.0123abcd",
    "description": "{name} installed under {prefix}",
    "url": "https://github.com/acme/demo",
    "architecture": "noarch",
    "input-type": "dir",
    "user": "{owner}",
    "group": "{owner}",
    "depends": ["bash", "coreutils", "python3 >= 3.6"],
    "config-files": ["{prefix}/etc/demo.conf"],
    "directories": ["{prefix}/var/lib/demo"],
    "exclude": ["*.pyc", "*/.git*"],
    "no-auto-depends": true,
    "ARGS": ["./={prefix}/demo"]
}"#;

/// Generate a repo list with `num_repos` entries sharing a DEFAULT.
fn generate_repo_list(num_repos: usize, templates_per_repo: usize) -> String {
    let mut list = String::from(
        r#"{"DEFAULT": {"fork": "acme", "templates": {"prefix": "/opt", "owner": "ops"}}"#,
    );

    for i in 0..num_repos {
        list.push_str(&format!(r#", "repo-{}": {{"ref": "v{}.0.0", "ref_is_version": true, "templates": {{"#, i, i));
        let templates: Vec<String> = (0..templates_per_repo)
            .map(|j| format!(r#""key{}": "value{}""#, j, j))
            .collect();
        list.push_str(&templates.join(", "));
        list.push_str("}}");
    }

    list.push('}');
    list
}

fn bench_repo_list_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("repo_list_parsing");
    let source = Path::new("repos.json");

    for num_repos in [1, 10, 50, 200] {
        let list = generate_repo_list(num_repos, 3);
        group.bench_with_input(BenchmarkId::new("repos", num_repos), &list, |b, list| {
            b.iter(|| parse_repo_list(black_box(list), source))
        });
    }

    for templates in [0, 10, 50] {
        let list = generate_repo_list(10, templates);
        group.bench_with_input(
            BenchmarkId::new("templates", templates),
            &list,
            |b, list| b.iter(|| parse_repo_list(black_box(list), source)),
        );
    }

    group.finish();
}

fn bench_command_synthesis(c: &mut Criterion) {
    let mut group = c.benchmark_group("command_synthesis");

    let spec = PackageSpec::parse(FPM_JSON, Path::new("fpm.json")).expect("valid fpm.json");
    let templates: TemplateContext = [("prefix", "/opt"), ("owner", "ops")].into_iter().collect();
    let settings = FpmSettings::new(Path::new("/var/cache/repo-packager"));

    group.bench_function("synthesize", |b| {
        b.iter(|| FpmCommand::synthesize(black_box(&spec), &templates, &settings))
    });

    group.bench_function("synthesize_and_display", |b| {
        b.iter(|| {
            FpmCommand::synthesize(black_box(&spec), &templates, &settings)
                .map(|command| command.to_string())
        })
    });

    group.bench_function("render_template", |b| {
        b.iter(|| templates.render(black_box("{prefix}/etc/{owner}/demo.conf")))
    });

    group.finish();
}

criterion_group!(benches, bench_repo_list_parsing, bench_command_synthesis);
criterion_main!(benches);
