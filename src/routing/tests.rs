//! Tests for template parsing, compilation, grouping and resolution.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::Arc;

    use crate::http::{HttpRequest, Method};
    use crate::routing::template::{self, Token};
    use crate::routing::{
        cache, CompiledPattern, Error, GroupOptions, Route, RouteCollection, Router, RouterConfig,
        Segment,
    };

    fn router(define: impl FnOnce(&mut crate::routing::Registrar<'_>) -> Result<(), Error>) -> Router {
        Router::bootstrap(&RouterConfig::default(), define).unwrap()
    }

    fn get(path: &str) -> HttpRequest {
        HttpRequest::new(Method::GET, path)
    }

    fn var(name: &str, optional: bool, default: Option<&str>) -> Token {
        Token::Variable {
            name: name.to_string(),
            optional,
            default: default.map(str::to_string),
        }
    }

    #[test]
    fn test_parse_literals_and_variables() {
        let tokens = template::parse("/users/{id}/posts/{slug?=latest}").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Literal("/users/".to_string()),
                var("id", false, None),
                Token::Literal("/posts/".to_string()),
                var("slug", true, Some("latest")),
            ]
        );
        assert_eq!(tokens[1].variable_name(), Some("id"));
        assert_eq!(tokens[0].variable_name(), None);
    }

    #[test]
    fn test_parse_optional_without_default_and_empty_default() {
        assert_eq!(template::parse("{page?}").unwrap(), vec![var("page", true, None)]);
        assert_eq!(template::parse("/{page?=}").unwrap()[1], var("page", true, Some("")));
    }

    #[test]
    fn test_parse_is_deterministic() {
        let template = "/a/{b}/c/{d?=1}";
        assert_eq!(template::parse(template).unwrap(), template::parse(template).unwrap());
    }

    #[test]
    fn test_parse_rejects_malformed_templates() {
        for template in [
            "/users/{id",
            "/users/id}",
            "/users/{{id}}",
            "/users/{}",
            "/users/{1d}",
            "/users/{id-x}",
            "/users/{id?x}",
            "/users/{id?}/edit",
            "/{a?}{b}",
            "/{id}/{id}",
        ] {
            let result = template::parse(template);
            assert!(
                matches!(result, Err(Error::MalformedTemplate { template: ref t, .. }) if t == template),
                "{template} should be rejected"
            );
        }
    }

    #[test]
    fn test_trailing_optional_matches_with_and_without_segment() {
        let pattern = CompiledPattern::compile("/foo/{bar?}", Segment::Path).unwrap();
        assert_eq!(pattern.capture("/foo").unwrap().get("bar"), None);
        assert_eq!(pattern.capture("/foo/").unwrap().get("bar"), None);
        assert_eq!(pattern.capture("/foo/baz").unwrap()["bar"], "baz");
        assert!(pattern.capture("/foo/baz/qux").is_none());
        assert_eq!(pattern.optional(), ["bar".to_string()]);
    }

    #[test]
    fn test_pattern_is_anchored_and_escaped() {
        let pattern = CompiledPattern::compile("/files/{name}.txt", Segment::Path).unwrap();
        assert_eq!(pattern.capture("/files/report.txt").unwrap()["name"], "report");
        assert!(pattern.capture("/files/reportXtxt").is_none());
        assert!(pattern.capture("/prefix/files/report.txt").is_none());
        assert!(pattern.capture("/files/report.txt/more").is_none());
        assert!(pattern.capture("/files/a/b.txt").is_none());
    }

    #[test]
    fn test_variables_are_recorded_in_order() {
        let pattern = CompiledPattern::compile("/{year}/{month}/{slug?}", Segment::Path).unwrap();
        assert_eq!(pattern.variables(), ["year", "month", "slug"]);
    }

    #[test]
    fn test_compiled_route_exposes_segment_patterns() {
        let mut routes = RouteCollection::new();
        routes
            .add(Route::new(Method::GET, "/docs/{page?}", "Docs@show").with_host("{tenant}.example.com"))
            .unwrap();
        let compiled = routes.routes(Method::GET)[0].compiled().unwrap();

        let path = compiled.path.pattern();
        assert_eq!(path.variables(), ["page"]);
        assert_eq!(path.optional(), ["page"]);
        assert!(path.as_str().starts_with('^'));

        let host = compiled.host.as_ref().unwrap().pattern();
        assert_eq!(host.variables(), ["tenant"]);
        assert!(host.as_str().starts_with("(?i)^"));
        assert!(compiled.scheme.is_none());
    }

    #[test]
    fn test_path_is_case_sensitive() {
        let router = router(|r| r.get("/About", "Pages@about"));
        assert!(router.resolve(&get("/About")).is_ok());
        assert!(router.resolve(&get("/about")).is_err());
    }

    #[test]
    fn test_resolve_binds_path_variable() {
        let router = router(|r| r.get("/foo/{bar}", "Foo@show"));
        let matched = router.resolve(&get("/foo/123")).unwrap();
        assert_eq!(matched.route.action(), "Foo@show");
        assert_eq!(matched.variables, HashMap::from([("bar".to_string(), "123".to_string())]));
    }

    #[test]
    fn test_resolve_ignores_other_methods() {
        let router = router(|r| r.delete("/foo/{bar}", "Foo@destroy"));
        let result = router.resolve(&HttpRequest::new(Method::POST, "/foo/123"));
        assert!(matches!(
            result,
            Err(Error::RouteNotFound { method: Method::POST, ref path }) if path == "/foo/123"
        ));
    }

    #[test]
    fn test_resolve_ignores_query_string() {
        let router = router(|r| r.get("/search", "Search@index"));
        assert!(router.resolve(&get("/search?q=rust")).is_ok());
    }

    #[test]
    fn test_any_registers_independent_routes() {
        let router = router(|r| r.any("/x", "X@handle"));
        for method in [Method::GET, Method::POST, Method::PUT, Method::DELETE] {
            let matched = router.resolve(&HttpRequest::new(method, "/x")).unwrap();
            assert_eq!(matched.route.method(), method);
        }

        let get_route = &router.routes().routes(Method::GET)[0];
        let post_route = &router.routes().routes(Method::POST)[0];
        assert!(!std::ptr::eq(get_route, post_route));
        assert_eq!(router.routes().len(), Method::ALL.len());
    }

    #[test]
    fn test_multiple_registers_listed_methods_only() {
        let router = router(|r| r.multiple(&[Method::GET, Method::PATCH], "/x", "X@handle"));
        assert!(router.resolve(&get("/x")).is_ok());
        assert!(router.resolve(&HttpRequest::new(Method::PATCH, "/x")).is_ok());
        assert!(router.resolve(&HttpRequest::new(Method::POST, "/x")).is_err());
    }

    #[test]
    fn test_first_registered_route_wins() {
        let router = router(|r| {
            r.get("/users/{id}", "Users@show")?;
            r.get("/users/me", "Users@me")
        });
        for _ in 0..3 {
            let matched = router.resolve(&get("/users/me")).unwrap();
            assert_eq!(matched.route.action(), "Users@show");
            assert_eq!(matched.variables["id"], "me");
        }
    }

    #[test]
    fn test_optional_default_round_trip() {
        let router = router(|r| r.get("/bar/{foo?=23}", "Bar@show"));
        assert_eq!(router.resolve(&get("/bar/")).unwrap().variables["foo"], "23");
        assert_eq!(router.resolve(&get("/bar")).unwrap().variables["foo"], "23");
        assert_eq!(router.resolve(&get("/bar/42")).unwrap().variables["foo"], "42");
    }

    #[test]
    fn test_optional_without_default_is_absent() {
        let router = router(|r| r.get("/posts/{page?}", "Posts@index"));
        let matched = router.resolve(&get("/posts")).unwrap();
        assert!(matched.variables.is_empty());
    }

    #[test]
    fn test_defaults_only_for_optional_with_default() {
        let mut routes = RouteCollection::new();
        routes
            .add(Route::new(Method::GET, "/a/{x}/{y?=7}", "A@b").with_host("{sub}.example.com"))
            .unwrap();
        let route = &routes.routes(Method::GET)[0];
        assert_eq!(route.defaults().len(), 1);
        assert_eq!(route.defaults()["y"], "7");
    }

    #[test]
    fn test_malformed_template_fails_registration() {
        let mut routes = RouteCollection::new();
        let result = routes.registrar().get("/users/{id", "Users@show");
        assert!(matches!(result, Err(Error::MalformedTemplate { .. })));
        assert!(routes.is_empty());
    }

    #[test]
    fn test_invalid_action_is_not_a_compile_error() {
        let router = router(|r| r.get("/broken", "no-at-sign"));
        let matched = router.resolve(&get("/broken")).unwrap();
        assert_eq!(matched.route.target(), None);
    }

    #[test]
    fn test_route_target_splits_type_and_method() {
        let route = Route::new(Method::GET, "/", "Users@index");
        assert_eq!(route.target(), Some(("Users", "index")));
        assert_eq!(Route::new(Method::GET, "/", "@index").target(), None);
        assert_eq!(Route::new(Method::GET, "/", "Users@").target(), None);
        assert_eq!(Route::new(Method::GET, "/", "A@b@c").target(), None);
    }

    #[test]
    fn test_unknown_method_yields_empty_routes() {
        let mut routes = RouteCollection::new();
        routes.registrar().get("/", "Home@index").unwrap();
        assert!(routes.routes(Method::OPTIONS).is_empty());
        assert_eq!(routes.all().len(), 1);
    }

    #[test]
    fn test_group_prefix_and_filters() {
        let mut routes = RouteCollection::new();
        routes
            .registrar()
            .group(GroupOptions::new().prefix("/admin").pre("auth").post(["log", "gzip"]), |r| {
                r.add(Route::new(Method::GET, "/users", "Users@index").with_pre("csrf").with_post("etag"))
            })
            .unwrap();

        let route = &routes.routes(Method::GET)[0];
        assert_eq!(route.path(), "/admin/users");
        assert_eq!(route.pre_filters(), ["auth", "csrf"]);
        assert_eq!(route.post_filters(), ["log", "gzip", "etag"]);
    }

    #[test]
    fn test_nested_groups_equal_flat_definition() {
        let mut nested = RouteCollection::new();
        nested
            .registrar()
            .group(GroupOptions::new().prefix("/api").pre(["a1", "a2"]).post("ap"), |r| {
                r.group(GroupOptions::new().prefix("/v1").pre("b1").post(["bp", "ap"]), |r| {
                    r.add(Route::new(Method::GET, "/items/{id}", "Items@show").with_pre("r"))
                })
            })
            .unwrap();

        let mut flat = RouteCollection::new();
        flat.add(
            Route::new(Method::GET, "/api/v1/items/{id}", "Items@show")
                .with_pre(["a1", "a2", "b1", "r"])
                .with_post(["ap", "bp", "ap"]),
        )
        .unwrap();

        let nested = &nested.routes(Method::GET)[0];
        let flat = &flat.routes(Method::GET)[0];
        assert_eq!(nested.path(), flat.path());
        assert_eq!(nested.pre_filters(), flat.pre_filters());
        assert_eq!(nested.post_filters(), flat.post_filters());
    }

    #[test]
    fn test_group_prefix_normalizes_separators() {
        let mut routes = RouteCollection::new();
        let mut registrar = routes.registrar();
        registrar
            .group(GroupOptions::new().prefix("admin/"), |r| {
                r.get("//users", "Users@index")?;
                r.get("/", "Admin@index")?;
                r.group(GroupOptions::new().prefix("/reports/"), |r| r.get("", "Reports@index"))
            })
            .unwrap();
        drop(registrar);

        let paths: Vec<&str> = routes.routes(Method::GET).iter().map(Route::path).collect();
        assert_eq!(paths, ["/admin/users", "/admin", "/admin/reports"]);
    }

    #[test]
    fn test_group_frame_popped_after_error() {
        let mut routes = RouteCollection::new();
        let mut registrar = routes.registrar();
        let result = registrar.group(GroupOptions::new().prefix("/admin").pre("auth"), |r| {
            r.get("/ok", "A@ok")?;
            r.get("/bad/{", "A@bad")
        });
        assert!(result.is_err());
        assert_eq!(registrar.depth(), 0);

        registrar.get("/after", "A@after").unwrap();
        drop(registrar);

        let after = &routes.routes(Method::GET)[1];
        assert_eq!(after.path(), "/after");
        assert!(after.pre_filters().is_empty());
    }

    #[test]
    fn test_group_frame_popped_after_panic() {
        let mut routes = RouteCollection::new();
        let mut registrar = routes.registrar();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            registrar.group(GroupOptions::new().prefix("/admin"), |_| panic!("definition failed"))
        }));
        assert!(outcome.is_err());
        assert_eq!(registrar.depth(), 0);
    }

    #[test]
    fn test_host_constraint_binds_and_ignores_case_and_port() {
        let router = router(|r| r.add(Route::new(Method::GET, "/", "Tenant@home").with_host("{tenant}.example.com")));

        let matched = router.resolve(&get("/").with_host("Acme.Example.COM:8443")).unwrap();
        assert_eq!(matched.variables["tenant"], "Acme");

        assert!(router.resolve(&get("/").with_host("example.com")).is_err());
        assert!(router.resolve(&get("/").with_host("a.b.example.com")).is_err());
        assert!(router.resolve(&get("/")).is_err());
    }

    #[test]
    fn test_path_binding_wins_over_host_binding() {
        let router = router(|r| {
            r.add(Route::new(Method::GET, "/items/{id}", "Items@show").with_host("{id}.example.com"))
        });
        let matched = router.resolve(&get("/items/7").with_host("shop.example.com")).unwrap();
        assert_eq!(matched.variables["id"], "7");
    }

    #[test]
    fn test_scheme_constraint() {
        let router = router(|r| r.add(Route::new(Method::GET, "/login", "Auth@form").with_scheme("https")));
        assert!(router.resolve(&get("/login").with_scheme("HTTPS")).is_ok());
        assert!(router.resolve(&get("/login")).is_err());
    }

    #[test]
    fn test_routes_compile_lazily() {
        let router = router(|r| {
            r.get("/a", "A@a")?;
            r.get("/b", "B@b")
        });
        assert!(!router.routes().routes(Method::GET)[0].is_compiled());

        router.resolve(&get("/a")).unwrap();
        assert!(router.routes().routes(Method::GET)[0].is_compiled());
        assert!(!router.routes().routes(Method::GET)[1].is_compiled());
    }

    #[test]
    fn test_compile_eagerly() {
        let config = RouterConfig {
            compile_eagerly: true,
            ..RouterConfig::default()
        };
        let router = Router::bootstrap(&config, |r| r.get("/a", "A@a")).unwrap();
        assert!(router.routes().routes(Method::GET)[0].is_compiled());
    }

    #[test]
    fn test_concurrent_resolution() {
        let router = Arc::new(router(|r| {
            r.get("/users/{id}", "Users@show")?;
            r.get("/posts/{slug?=index}", "Posts@show")
        }));

        let workers: Vec<_> = (0..8)
            .map(|i| {
                let router = Arc::clone(&router);
                std::thread::spawn(move || {
                    let matched = router.resolve(&get(&format!("/users/{i}"))).unwrap();
                    assert_eq!(matched.variables["id"], i.to_string());
                    let matched = router.resolve(&get("/posts")).unwrap();
                    assert_eq!(matched.variables["slug"], "index");
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
    }

    #[test]
    fn test_allowed_methods() {
        let router = router(|r| {
            r.get("/items/{id}", "Items@show")?;
            r.delete("/items/{id}", "Items@destroy")?;
            r.post("/items", "Items@store")
        });
        let request = HttpRequest::new(Method::PUT, "/items/3");
        assert_eq!(router.allowed_methods(&request).unwrap(), vec![Method::GET, Method::DELETE]);
    }

    #[test]
    fn test_url_generation() {
        let router = router(|r| {
            r.add(Route::new(Method::GET, "/users/{id}", "Users@show").with_name("users.show"))?;
            r.add(Route::new(Method::GET, "/posts/{page?}", "Posts@index").with_name("posts"))?;
            r.add(Route::new(Method::GET, "/bar/{foo?=23}", "Bar@show").with_name("bar"))
        });

        let params = HashMap::from([("id".to_string(), "5".to_string())]);
        assert_eq!(router.url("users.show", &params).unwrap(), "/users/5");
        assert_eq!(router.url("posts", &HashMap::new()).unwrap(), "/posts");
        assert_eq!(router.url("bar", &HashMap::new()).unwrap(), "/bar/23");

        assert!(matches!(
            router.url("users.show", &HashMap::new()),
            Err(Error::MissingParameter { ref name, .. }) if name == "id"
        ));
        assert!(matches!(router.url("nope", &params), Err(Error::UnknownRouteName(_))));
    }

    #[test]
    fn test_generated_url_resolves_to_named_route() {
        let router = router(|r| {
            r.get("/users/{id}", "Users@show")?;
            r.add(Route::new(Method::GET, "/users/{id}/posts/{page?=1}", "Posts@index").with_name("posts"))
        });

        let params = HashMap::from([
            ("id".to_string(), "ada".to_string()),
            ("page".to_string(), "3".to_string()),
        ]);
        let url = router.url("posts", &params).unwrap();
        assert_eq!(url, "/users/ada/posts/3");

        let matched = router.resolve(&get(&url)).unwrap();
        assert_eq!(matched.route.name(), Some("posts"));
        assert_eq!(matched.variables, params);
    }

    #[test]
    fn test_url_rejects_values_that_cannot_route_back() {
        let router = router(|r| r.add(Route::new(Method::GET, "/users/{id}", "Users@show").with_name("u")));

        for value in ["a/b", ""] {
            let params = HashMap::from([("id".to_string(), value.to_string())]);
            let result = router.url("u", &params);
            assert!(
                matches!(result, Err(Error::InvalidParameter { ref name, value: ref v, .. }) if name == "id" && v == value),
                "{value:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_duplicate_route_name_later_wins() {
        let router = router(|r| {
            r.add(Route::new(Method::GET, "/old", "A@old").with_name("home"))?;
            r.add(Route::new(Method::POST, "/new", "A@new").with_name("home"))
        });
        assert_eq!(router.url("home", &HashMap::new()).unwrap(), "/new");
    }

    #[test]
    fn test_cache_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes.json");

        let original = router(|r| {
            r.group(GroupOptions::new().prefix("/api").pre("auth"), |r| {
                r.get("/users/{id}", "Users@show")?;
                r.get("/users/me", "Users@me")
            })?;
            r.add(Route::new(Method::GET, "/bar/{foo?=23}", "Bar@show").with_name("bar"))?;
            r.add(Route::new(Method::POST, "/", "Home@store").with_host("{sub}.example.com"))
        });
        original.save_cache(&path).unwrap();

        let routes = cache::load(&path).unwrap();
        assert_eq!(routes.len(), 4);
        assert!(routes.iter().all(Route::is_compiled));

        let actions: Vec<&str> = routes.routes(Method::GET).iter().map(Route::action).collect();
        assert_eq!(actions, ["Users@show", "Users@me", "Bar@show"]);
        assert_eq!(routes.routes(Method::GET)[0].pre_filters(), ["auth"]);

        let loaded = Router::new(routes);
        let matched = loaded.resolve(&get("/api/users/9")).unwrap();
        assert_eq!(matched.variables["id"], "9");
        assert_eq!(loaded.resolve(&get("/bar")).unwrap().variables["foo"], "23");
        let matched = loaded
            .resolve(&HttpRequest::new(Method::POST, "/").with_host("EU.Example.com"))
            .unwrap();
        assert_eq!(matched.variables["sub"], "EU");
        assert_eq!(loaded.url("bar", &HashMap::new()).unwrap(), "/bar/23");
    }

    #[test]
    fn test_bootstrap_prefers_valid_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes.json");
        router(|r| r.get("/cached", "Cached@index")).save_cache(&path).unwrap();

        let config = RouterConfig {
            cache_path: Some(path),
            ..RouterConfig::default()
        };
        let router = Router::bootstrap(&config, |_| panic!("routes should come from the cache")).unwrap();
        assert!(router.resolve(&get("/cached")).is_ok());
    }

    #[test]
    fn test_missing_or_invalid_cache_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        assert!(cache::load(&dir.path().join("missing.json")).is_none());

        let garbage = dir.path().join("garbage.json");
        std::fs::write(&garbage, b"not json").unwrap();
        assert!(cache::load(&garbage).is_none());

        let stale = dir.path().join("stale.json");
        std::fs::write(&stale, br#"{"format": 0, "routes": []}"#).unwrap();
        assert!(cache::load(&stale).is_none());

        let config = RouterConfig {
            cache_path: Some(garbage),
            ..RouterConfig::default()
        };
        let router = Router::bootstrap(&config, |r| r.get("/fresh", "Fresh@index")).unwrap();
        assert!(router.resolve(&get("/fresh")).is_ok());
    }
}
