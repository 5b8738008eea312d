//! Integration tests for structural matching, precedence and outcome
//! classification.

use waypoint_core::{Headers, Method, QueryString, Response};
use waypoint_router::{
    MatchOutcome, OptionalQuery, Pattern, QueryCapture, QueryRule, RequireHeader, Route, Router,
};

fn lookup<'r>(router: &'r Router, method: Method, path: &str) -> MatchOutcome<'r> {
    router.lookup(method, path, &QueryString::default(), &Headers::new())
}

fn lookup_query<'r>(
    router: &'r Router,
    method: Method,
    path: &str,
    query: &'static str,
) -> MatchOutcome<'r> {
    router.lookup(method, path, &QueryString::parse(query), &Headers::new())
}

// Test 1: literal segments shadow typed captures at the same node.

#[test]
fn test_literal_shadows_capture() {
    let router = Router::builder()
        .route(
            Route::get(Pattern::parse("/users/{id}").unwrap())
                .bind1(|id: String| async move { Response::ok().body_text(id) })
                .unwrap(),
        )
        .route(
            Route::get(Pattern::parse("/users/me").unwrap())
                .bind0(|| async { Response::ok().body_text("me") })
                .unwrap(),
        )
        .build();

    match lookup(&router, Method::Get, "/users/me") {
        MatchOutcome::Matched(matched) => {
            // The literal leaf carries no captures; the capture leaf would
            // have put "me" on the chain.
            assert!(matched.values().is_empty(), "literal must win over capture");
        }
        other => panic!("expected a match, got {other:?}"),
    }

    match lookup(&router, Method::Get, "/users/42") {
        MatchOutcome::Matched(matched) => {
            assert_eq!(matched.values().get::<String>(0).unwrap(), "42");
        }
        other => panic!("expected a match, got {other:?}"),
    }
}

// Test 2: captures are tried in declaration order, first successful
// decode wins, and a failed decode backtracks instead of aborting.

#[test]
fn test_capture_declaration_order_and_backtracking() {
    let router = Router::builder()
        .route(
            Route::get(Pattern::root().literal("items").capture::<i64>("id"))
                .bind1(|id: i64| async move { Response::ok().body_text(id.to_string()) })
                .unwrap(),
        )
        .route(
            Route::get(Pattern::root().literal("items").capture::<String>("slug"))
                .bind1(|slug: String| async move { Response::ok().body_text(slug) })
                .unwrap(),
        )
        .build();

    // "7" decodes as i64, so the first-declared capture wins.
    match lookup(&router, Method::Get, "/items/7") {
        MatchOutcome::Matched(matched) => {
            assert_eq!(*matched.values().get::<i64>(0).unwrap(), 7);
        }
        other => panic!("expected i64 branch, got {other:?}"),
    }

    // "seven" fails the i64 decode; the walk falls through to String.
    match lookup(&router, Method::Get, "/items/seven") {
        MatchOutcome::Matched(matched) => {
            assert_eq!(matched.values().get::<String>(0).unwrap(), "seven");
        }
        other => panic!("expected String branch, got {other:?}"),
    }
}

// Test 3: a failed decode on a structurally matching branch is a parse
// failure, never "no route".

#[test]
fn test_decode_failure_is_parse_not_no_route() {
    let router = Router::builder()
        .route(
            Route::get(Pattern::root().literal("items").capture::<i64>("id"))
                .bind1(|_id: i64| async { Response::ok() })
                .unwrap(),
        )
        .build();

    match lookup(&router, Method::Get, "/items/abc") {
        MatchOutcome::Parse(report) => {
            assert_eq!(report.name, "id");
            assert!(
                report.message.contains("integer"),
                "message should name the expected type: {}",
                report.message
            );
        }
        other => panic!("expected a parse failure, got {other:?}"),
    }

    // A path outside the tree is still a plain no-route.
    assert!(matches!(
        lookup(&router, Method::Get, "/other"),
        MatchOutcome::NoRoute
    ));
}

// Test 4: wildcard absorbs the remainder as one string and loses to both
// literals and captures.

#[test]
fn test_wildcard_precedence_and_value() {
    let router = Router::builder()
        .route(
            Route::get(Pattern::root().literal("files").literal("index"))
                .bind0(|| async { Response::ok() })
                .unwrap(),
        )
        .route(
            Route::get(Pattern::root().literal("files").wildcard("rest"))
                .bind1(|rest: String| async move { Response::ok().body_text(rest) })
                .unwrap(),
        )
        .build();

    match lookup(&router, Method::Get, "/files/index") {
        MatchOutcome::Matched(matched) => {
            assert!(matched.values().is_empty(), "literal must win over wildcard");
        }
        other => panic!("expected the literal route, got {other:?}"),
    }

    match lookup(&router, Method::Get, "/files/a/b/c") {
        MatchOutcome::Matched(matched) => {
            assert_eq!(matched.values().get::<String>(0).unwrap(), "a/b/c");
        }
        other => panic!("expected the wildcard route, got {other:?}"),
    }

    // The wildcard needs at least one remaining segment.
    assert!(matches!(
        lookup(&router, Method::Get, "/files"),
        MatchOutcome::NoRoute
    ));
}

// Test 5: trailing slashes are structural, not normalized away.

#[test]
fn test_trailing_slash_routes_are_distinct() {
    let router = Router::builder()
        .route(
            Route::get(Pattern::parse("/foo").unwrap())
                .bind0(|| async { Response::ok().body_text("bare") })
                .unwrap(),
        )
        .route(
            Route::get(Pattern::parse("/foo/").unwrap())
                .bind0(|| async { Response::ok().body_text("slashed") })
                .unwrap(),
        )
        .build();

    assert!(lookup(&router, Method::Get, "/foo").is_matched());
    assert!(lookup(&router, Method::Get, "/foo/").is_matched());
    // Apart at the tree level: only one is registered here.
    let bare_only = Router::builder()
        .route(
            Route::get(Pattern::parse("/bar").unwrap())
                .bind0(|| async { Response::ok() })
                .unwrap(),
        )
        .build();
    assert!(lookup(&bare_only, Method::Get, "/bar").is_matched());
    assert!(matches!(
        lookup(&bare_only, Method::Get, "/bar/"),
        MatchOutcome::NoRoute
    ));
}

// Test 6: methods partition the tree.

#[test]
fn test_method_partitions() {
    let router = Router::builder()
        .route(
            Route::get(Pattern::parse("/hello/{name}").unwrap())
                .bind1(|name: String| async move { Response::ok().body_text(name) })
                .unwrap(),
        )
        .route(
            Route::get(Pattern::parse("/hello").unwrap())
                .bind0(|| async { Response::ok() })
                .unwrap(),
        )
        .build();

    match lookup(&router, Method::Get, "/hello/world") {
        MatchOutcome::Matched(matched) => {
            assert_eq!(matched.values().len(), 1);
            assert_eq!(matched.values().get::<String>(0).unwrap(), "world");
        }
        other => panic!("expected a match, got {other:?}"),
    }
    match lookup(&router, Method::Get, "/hello") {
        MatchOutcome::Matched(matched) => assert!(matched.values().is_empty()),
        other => panic!("expected a match, got {other:?}"),
    }
    assert!(matches!(
        lookup(&router, Method::Post, "/hello/world"),
        MatchOutcome::NoRoute
    ));
}

// Test 7: guards classify structurally matched requests, and a guard
// failure on one leaf lets a later leaf still win.

#[test]
fn test_guard_failures_and_leaf_fallback() {
    let router = Router::builder()
        .route(
            Route::get(Pattern::parse("/search").unwrap())
                .guard(QueryCapture::<String>::new("q"))
                .bind1(|q: String| async move { Response::ok().body_text(q) })
                .unwrap(),
        )
        .route(
            Route::get(Pattern::parse("/search").unwrap())
                .bind0(|| async { Response::ok().body_text("browse") })
                .unwrap(),
        )
        .build();

    // First leaf's guard passes: it wins and contributes the value.
    match lookup_query(&router, Method::Get, "/search", "q=cats") {
        MatchOutcome::Matched(matched) => {
            assert_eq!(matched.values().get::<String>(0).unwrap(), "cats");
        }
        other => panic!("expected the guarded leaf, got {other:?}"),
    }

    // Guard fails, but the unguarded leaf still matches; the tentative
    // failure never surfaces.
    match lookup(&router, Method::Get, "/search") {
        MatchOutcome::Matched(matched) => assert!(matched.values().is_empty()),
        other => panic!("expected the fallback leaf, got {other:?}"),
    }
}

#[test]
fn test_guard_failure_without_fallback_surfaces() {
    let router = Router::builder()
        .route(
            Route::get(Pattern::parse("/export").unwrap())
                .guard(QueryCapture::<u32>::new("limit"))
                .guard(QueryRule::<u32>::new(
                    "limit",
                    "must be at most 100",
                    |limit| *limit <= 100,
                ))
                .bind2(|_limit: u32, _checked: u32| async { Response::ok() })
                .unwrap(),
        )
        .build();

    // Missing parameter: parse failure, not absence.
    match lookup(&router, Method::Get, "/export") {
        MatchOutcome::Parse(report) => assert_eq!(report.name, "limit"),
        other => panic!("expected a parse failure, got {other:?}"),
    }

    // Well-formed but rejected: validation failure.
    match lookup_query(&router, Method::Get, "/export", "limit=500") {
        MatchOutcome::Validation(report) => {
            assert_eq!(report.name, "limit");
            assert_eq!(report.message, "must be at most 100");
        }
        other => panic!("expected a validation failure, got {other:?}"),
    }

    // Parse failures outrank validation failures when both are logged.
    match lookup_query(&router, Method::Get, "/export", "limit=many") {
        MatchOutcome::Parse(report) => assert_eq!(report.name, "limit"),
        other => panic!("expected a parse failure, got {other:?}"),
    }
}

#[test]
fn test_header_guards() {
    let router = Router::builder()
        .route(
            Route::get(Pattern::parse("/private").unwrap())
                .guard(RequireHeader::new("authorization"))
                .bind0(|| async { Response::ok() })
                .unwrap(),
        )
        .build();

    let mut headers = Headers::new();
    headers.insert("Authorization", "Bearer token");
    assert!(
        router
            .lookup(Method::Get, "/private", &QueryString::default(), &headers)
            .is_matched()
    );

    match lookup(&router, Method::Get, "/private") {
        MatchOutcome::Parse(report) => assert_eq!(report.name, "authorization"),
        other => panic!("expected a parse failure, got {other:?}"),
    }
}

#[test]
fn test_optional_query_contributes_none() {
    let router = Router::builder()
        .route(
            Route::get(Pattern::parse("/list").unwrap())
                .guard(OptionalQuery::<u32>::new("page"))
                .bind1(|page: Option<u32>| async move {
                    Response::ok().body_text(format!("{page:?}"))
                })
                .unwrap(),
        )
        .build();

    match lookup(&router, Method::Get, "/list") {
        MatchOutcome::Matched(matched) => {
            assert_eq!(matched.values().get::<Option<u32>>(0).unwrap(), &None);
        }
        other => panic!("expected a match, got {other:?}"),
    }
    match lookup_query(&router, Method::Get, "/list", "page=3") {
        MatchOutcome::Matched(matched) => {
            assert_eq!(matched.values().get::<Option<u32>>(0).unwrap(), &Some(3));
        }
        other => panic!("expected a match, got {other:?}"),
    }
}

// Test 8: route-definedness and allowed methods treat guard failures as
// "defined here".

#[test]
fn test_is_route_defined_counts_guarded_routes() {
    let router = Router::builder()
        .route(
            Route::get(Pattern::parse("/private").unwrap())
                .guard(RequireHeader::new("authorization"))
                .bind0(|| async { Response::ok() })
                .unwrap(),
        )
        .build();

    assert!(router.is_route_defined(Method::Get, "/private"));
    assert!(!router.is_route_defined(Method::Post, "/private"));
    assert!(!router.is_route_defined(Method::Get, "/public"));
    assert_eq!(
        router.allowed_methods("/private").header_value(),
        "GET, HEAD"
    );
}

// Test 9: independent routers do not interfere.

#[test]
fn test_routers_are_independent() {
    let first = Router::builder()
        .route(
            Route::get(Pattern::parse("/only-first").unwrap())
                .bind0(|| async { Response::ok() })
                .unwrap(),
        )
        .build();
    let second = Router::builder()
        .route(
            Route::get(Pattern::parse("/only-second").unwrap())
                .bind0(|| async { Response::ok() })
                .unwrap(),
        )
        .build();

    assert!(lookup(&first, Method::Get, "/only-first").is_matched());
    assert!(matches!(
        lookup(&first, Method::Get, "/only-second"),
        MatchOutcome::NoRoute
    ));
    assert!(lookup(&second, Method::Get, "/only-second").is_matched());
    assert!(matches!(
        lookup(&second, Method::Get, "/only-first"),
        MatchOutcome::NoRoute
    ));
}

// Test 10: repeated lookups are deterministic.

#[test]
fn test_lookup_is_deterministic() {
    let router = Router::builder()
        .route(
            Route::get(Pattern::root().literal("v").capture::<u32>("n"))
                .bind1(|n: u32| async move { Response::ok().body_text(n.to_string()) })
                .unwrap(),
        )
        .route(
            Route::get(Pattern::root().literal("v").capture::<String>("s"))
                .bind1(|s: String| async move { Response::ok().body_text(s) })
                .unwrap(),
        )
        .build();

    for _ in 0..10 {
        match lookup(&router, Method::Get, "/v/5") {
            MatchOutcome::Matched(matched) => {
                assert_eq!(*matched.values().get::<u32>(0).unwrap(), 5);
            }
            other => panic!("expected the u32 branch, got {other:?}"),
        }
    }
}

// Test 11: the root path matches the root pattern only.

#[test]
fn test_root_pattern() {
    let router = Router::builder()
        .route(
            Route::get(Pattern::root())
                .bind0(|| async { Response::ok() })
                .unwrap(),
        )
        .build();

    assert!(lookup(&router, Method::Get, "/").is_matched());
    assert!(matches!(
        lookup(&router, Method::Get, "/anything"),
        MatchOutcome::NoRoute
    ));
}
