use criterion::{criterion_group, criterion_main, Criterion};
use gravitycar::cli::bootstrap;
use gravitycar::request::params::{RawParams, RequestParameterParser};
use gravitycar::route::RouteManifest;
use gravitycar::runtime_config::RuntimeConfig;
use serde_json::json;
use std::hint::black_box;

fn manifest() -> RouteManifest {
    let yaml = r#"
models:
  - name: Users
    fields:
      - { name: id, type: ID }
      - { name: username, type: Text }
      - { name: email, type: Email }
    routes:
      - { method: GET, path: /Users/me, apiClass: UsersAPIController, apiMethod: me }
      - { method: GET, path: /Users/?/roles/?, apiClass: UsersAPIController, apiMethod: me, parameterNames: [userId, roleId] }
  - name: Movies
    fields:
      - { name: id, type: ID }
      - { name: title, type: Text }
controllers:
  - class: Gravitycar\Models\Users\Api\UsersAPIController
    routes:
      - { method: POST, path: /Users/?/password, apiMethod: me, parameterNames: [userId] }
  - class: Gravitycar\Api\HealthAPIController
    routes:
      - { method: GET, path: /health, apiMethod: check }
      - { method: GET, path: /health/{probe}, apiMethod: check, parameterNames: [probe] }
  - class: Gravitycar\Api\TriviaAPIController
    routes:
      - { method: GET, path: /trivia/games/?/questions/?/answers, apiMethod: answers, parameterNames: [gameId, questionId] }
"#;
    serde_yaml::from_str(yaml).unwrap_or_default()
}

fn bench_route_resolution(c: &mut Criterion) {
    let config = RuntimeConfig {
        route_cache_enabled: false,
        ..RuntimeConfig::default()
    };
    let Ok(router) = bootstrap(&manifest(), &config) else {
        return;
    };
    let requests = [
        ("GET", "/Users"),
        ("GET", "/Users/me"),
        ("GET", "/Users/42"),
        ("GET", "/Users/42/roles/7"),
        ("PUT", "/Movies/9/restore"),
        ("GET", "/health/db"),
        ("GET", "/trivia/games/1/questions/2/answers"),
    ];
    c.bench_function("resolve", |b| {
        b.iter(|| {
            for (method, path) in requests.iter() {
                let res = router.resolve(method, path);
                black_box(&res);
            }
        })
    });
    c.bench_function("prepare_users_list", |b| {
        let data: RawParams = json!({"page": "2", "pageSize": "50", "sortBy": "username", "username": "ada"})
            .as_object()
            .cloned()
            .unwrap_or_default();
        b.iter(|| {
            let res = router.prepare("GET", "/Users", data.clone());
            black_box(&res);
        })
    });
}

fn bench_format_detection(c: &mut Criterion) {
    let parser = RequestParameterParser::default();
    let inputs: Vec<RawParams> = [
        json!({"startRow": 20, "endRow": 40, "sort[0][colId]": "title", "sort[0][sort]": "asc"}),
        json!({"page": 0, "pageSize": 25, "sortModel": "[{\"field\":\"title\",\"sort\":\"desc\"}]"}),
        json!({"per_page": 10, "sort": "created_at:desc,name:asc", "filter[status]": "active"}),
        json!({"status": "active", "page": "2"}),
    ]
    .iter()
    .filter_map(|v| v.as_object().cloned())
    .collect();
    c.bench_function("parse_formats", |b| {
        b.iter(|| {
            for raw in &inputs {
                black_box(parser.parse(raw));
            }
        })
    });
}

criterion_group!(benches, bench_route_resolution, bench_format_detection);
criterion_main!(benches);
