//! End-to-end resolution over the in-memory gallery tree.

use std::sync::{Arc, Mutex};

use mptt_urls_core::settings::{LevelSettings, MpttUrlsSettings};
use mptt_urls_http::HttpResponse;
use mptt_urls_test::{
    assert_num_queries, gallery, gallery_settings, CountingStore, Gallery, QueryKind, RequestFactory, CATEGORY,
    PHOTO,
};
use mptt_urls_tree::{TreeNode, TreeObject};
use mptt_urls_views::{MpttResolver, Resolution, ResolutionConfig, TreePath, ViewRegistry};

fn engine() -> mptt_urls_views::Engine {
    let mut engine = mptt_urls_views::Engine::new();
    engine
        .add_string_template(
            "gallery/category.html",
            "{% if is_superroot %}all categories{% else %}category {{ object.slug }}{% endif %}",
        )
        .unwrap();
    engine
        .add_string_template(
            "gallery/photo.html",
            "{{ object.slug }}|{{ path | safe }}|{{ is_leaf }}|{% for a in ancestors %}{{ a.slug }};{% endfor %}",
        )
        .unwrap();
    engine
}

fn resolver_for(g: &Gallery, settings: &MpttUrlsSettings, views: &ViewRegistry) -> MpttResolver {
    let config = ResolutionConfig::from_settings(settings, g.models(), views).unwrap();
    MpttResolver::new(config, g.store(), engine())
}

fn get(resolver: &MpttResolver, path: &str) -> HttpResponse {
    let request = RequestFactory::new().get(path);
    resolver.process_url(&request, path, None).unwrap()
}

#[test]
fn test_leaf_renders_template() {
    let g = gallery();
    let resolver = resolver_for(&g, &gallery_settings(), &ViewRegistry::new());
    let response = get(&resolver, "level1/level2/photo1");
    assert_eq!(response.status(), http::StatusCode::OK);
    assert_eq!(response.content_type(), "text/html");
    assert_eq!(
        response.text(),
        Some("photo1|level1/level2/photo1|true|level1;level2;")
    );
}

#[test]
fn test_missing_leaf_is_not_found() {
    let g = gallery();
    let resolver = resolver_for(&g, &gallery_settings(), &ViewRegistry::new());

    let response = get(&resolver, "level1/level2/photo9");
    assert!(response.is_not_found());
    assert!(response.text().unwrap().contains("photo9"));

    assert!(get(&resolver, "nowhere/level2/photo1").is_not_found());
    assert!(get(&resolver, "level1/level2/photo1/extra").is_not_found());
}

#[test]
fn test_repeat_resolution_is_stable() {
    let g = gallery();
    let resolver = resolver_for(&g, &gallery_settings(), &ViewRegistry::new());
    for path in ["level1/level2/photo1", "level1/", "", "level1/nope"] {
        let first = get(&resolver, path);
        let second = get(&resolver, path);
        assert_eq!(first.status(), second.status(), "{path}");
        assert_eq!(first.text(), second.text(), "{path}");
    }
}

#[test]
fn test_deep_tree_reuses_node_spec() {
    let g = gallery();
    let chain = g
        .fixture
        .make_chain(&g.category, &["a", "b", "c", "d"], Some(&g.level2));
    g.fixture.make_leaf(&g.photo, "deep", &chain[3]);

    let resolver = resolver_for(&g, &gallery_settings(), &ViewRegistry::new());
    assert_eq!(
        get(&resolver, "level1/level2/a/b/c/d/").text(),
        Some("category d")
    );
    assert_eq!(
        get(&resolver, "level1/level2/a/b/c/d/deep").text(),
        Some("deep|level1/level2/a/b/c/d/deep|true|level1;level2;a;b;c;d;")
    );
    assert!(get(&resolver, "level1/level2/a/c/").is_not_found());
}

#[test]
fn test_one_query_per_segment() {
    let g = gallery();
    let store = Arc::new(CountingStore::new(g.store()));
    let config = ResolutionConfig::from_settings(&gallery_settings(), g.models(), &ViewRegistry::new()).unwrap();
    let resolver = MpttResolver::new(config, store.clone(), engine());
    let request = RequestFactory::new().get("");

    assert_num_queries(&store, 3, || {
        resolver.process_url(&request, "level1/level2/photo1", None).unwrap();
    });
    let queries = store.queries();
    assert_eq!(queries[0].kind, QueryKind::Roots);
    assert_eq!(queries[1].kind, QueryKind::Children);
    assert_eq!(queries[2].table, "gallery_photo");

    // The walk stops at the first unmatched segment.
    assert_num_queries(&store, 1, || {
        resolver.process_url(&request, "missing/level2/photo1", None).unwrap();
    });

    assert_num_queries(&store, 0, || {
        resolver.process_url(&request, "", None).unwrap();
    });
}

#[test]
fn test_superroot_renders_node_spec() {
    let g = gallery();
    let resolver = resolver_for(&g, &gallery_settings(), &ViewRegistry::new());
    assert_eq!(get(&resolver, "").text(), Some("all categories"));
}

#[test]
fn test_empty_path_under_pass_through_node() {
    let g = gallery();
    let store = Arc::new(CountingStore::new(g.store()));
    let settings = MpttUrlsSettings::new()
        .with_node(LevelSettings::model(CATEGORY))
        .with_leaf(LevelSettings::model(PHOTO).with_template("gallery/photo.html"));
    let config = ResolutionConfig::from_settings(&settings, g.models(), &ViewRegistry::new()).unwrap();
    let resolver = MpttResolver::new(config, store.clone(), engine());

    assert_num_queries(&store, 0, || {
        for path in ["", "/"] {
            assert!(get(&resolver, path).is_not_found(), "{path:?}");
        }
    });
    assert!(get(&resolver, "level1/level2/photo1").text().unwrap().starts_with("photo1|"));
}

#[test]
fn test_root_scope() {
    let g = gallery();
    let resolver = resolver_for(&g, &gallery_settings(), &ViewRegistry::new());
    let request = RequestFactory::new().get("");

    let response = resolver
        .process_url(&request, "level2/photo1", Some(&g.level1))
        .unwrap();
    assert_eq!(response.text(), Some("photo1|level2/photo1|true|level2;"));

    let response = resolver.process_url(&request, "", Some(&g.level2)).unwrap();
    assert_eq!(response.text(), Some("category level2"));

    let response = resolver
        .process_url(&request, "level1/level2/photo1", Some(&g.level1))
        .unwrap();
    assert!(response.is_not_found());
}

#[test]
fn test_view_dispatch() {
    let g = gallery();
    let seen: Arc<Mutex<Vec<(String, Option<String>)>>> = Arc::default();

    let mut views = ViewRegistry::new();
    let log = seen.clone();
    views.register("gallery.views.photo", move |request, object| {
        let slug = object.entity().map(|node| node.slug.clone());
        log.lock().unwrap().push((request.path().to_string(), slug.clone()));
        let mut response = HttpResponse::ok(format!("view {}", slug.unwrap_or_default()));
        response.set_content_type("text/plain");
        response
    });
    views.register("gallery.views.category", |_, object| {
        if object.is_superroot() {
            HttpResponse::ok("root view")
        } else {
            HttpResponse::not_found("hidden")
        }
    });

    let settings = MpttUrlsSettings::new()
        .with_node(LevelSettings::model(CATEGORY).with_view("gallery.views.category"))
        .with_leaf(LevelSettings::model(PHOTO).with_view("gallery.views.photo"));
    let resolver = resolver_for(&g, &settings, &views);

    let response = get(&resolver, "level1/level2/photo1");
    assert_eq!(response.text(), Some("view photo1"));
    assert_eq!(response.content_type(), "text/plain");
    assert_eq!(
        seen.lock().unwrap().as_slice(),
        [("/level1/level2/photo1".to_string(), Some("photo1".to_string()))]
    );

    // A view's response is returned untouched, whatever its status.
    assert!(get(&resolver, "level1/").is_not_found());
    assert_eq!(get(&resolver, "").text(), Some("root view"));
}

#[test]
fn test_view_not_called_on_not_found() {
    let g = gallery();
    let calls = Arc::new(Mutex::new(0));
    let mut views = ViewRegistry::new();
    let counter = calls.clone();
    views.register("photo", move |_, _| {
        *counter.lock().unwrap() += 1;
        HttpResponse::ok("")
    });
    let settings = MpttUrlsSettings::new()
        .with_node(LevelSettings::model(CATEGORY))
        .with_leaf(LevelSettings::model(PHOTO).with_view("photo"));
    let resolver = resolver_for(&g, &settings, &views);

    assert!(get(&resolver, "level1/level2/missing").is_not_found());
    assert_eq!(*calls.lock().unwrap(), 0);
    get(&resolver, "level1/level2/photo1");
    assert_eq!(*calls.lock().unwrap(), 1);
}

#[test]
fn test_first_match_wins() {
    let g = gallery();
    let duplicate = g.fixture.make_leaf(&g.photo, "photo1", &g.level2);
    let resolver = resolver_for(&g, &gallery_settings(), &ViewRegistry::new());

    let resolution = mptt_urls_views::resolve(
        &TreePath::parse("level1/level2/photo1"),
        resolver.config(),
        g.store().as_ref(),
        None,
    )
    .unwrap();
    let Resolution::Found(resolved) = resolution else {
        panic!("expected a match");
    };
    assert_eq!(resolved.object, TreeObject::Entity(g.photo1.clone()));
    assert_ne!(resolved.object, TreeObject::Entity(duplicate));
}

#[test]
fn test_encoded_slugs() {
    let g = gallery();
    let spaced = g.fixture.make_leaf(&g.photo, "sunset beach", &g.level2);
    let resolver = resolver_for(&g, &gallery_settings(), &ViewRegistry::new());

    let url = resolver.url_for(&spaced).unwrap();
    assert_eq!(url, "/level1/level2/sunset%20beach");
    let response = get(&resolver, "level1/level2/sunset%20beach");
    assert!(response.text().unwrap().starts_with("sunset beach|level1/level2/sunset%20beach|"));
}

#[test]
fn test_object_fields_in_context() {
    let g = gallery();
    g.fixture.make_leaf_with(
        &g.photo,
        "titled",
        &g.level2,
        serde_json::json!({"title": "Evening"}),
    );
    let resolver = resolver_for(&g, &gallery_settings(), &ViewRegistry::new());
    let mut engine = engine();
    engine
        .add_string_template("titled.html", "{{ object.title }} ({{ object.model }})")
        .unwrap();
    let settings = MpttUrlsSettings::new()
        .with_node(LevelSettings::model(CATEGORY))
        .with_leaf(LevelSettings::model(PHOTO).with_template("titled.html"));
    let config = ResolutionConfig::from_settings(&settings, g.models(), &ViewRegistry::new()).unwrap();
    let titled = MpttResolver::new(config, g.store(), engine);

    assert_eq!(
        get(&titled, "level1/level2/titled").text(),
        Some("Evening (test_app.gallery.models.Photo)")
    );
    // The default templates are unaffected.
    assert!(get(&resolver, "level1/level2/titled").text().unwrap().starts_with("titled|"));
}

#[test]
fn test_url_for_inverts_resolution() {
    let g = gallery();
    let resolver = resolver_for(&g, &gallery_settings(), &ViewRegistry::new()).with_prefix("/photos/");
    let nodes: [&TreeNode; 3] = [&g.level1, &g.level2, &g.photo1];
    for node in nodes {
        let url = resolver.url_for(node).unwrap();
        let request = RequestFactory::new().get(&url);
        let response = resolver.handle(&request).unwrap();
        assert_eq!(response.status(), http::StatusCode::OK, "{url}");
        assert!(response.text().unwrap().contains(&node.slug), "{url}");
    }
}
