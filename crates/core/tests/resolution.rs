mod common;

use common::Universe;
use std::sync::Arc;
use texscope_core::FileState;
use texscope_core::model::{Component, OverrideEntry, Overrides};

fn names(set: &indexmap::IndexSet<String>) -> Vec<&str> {
    set.iter().map(String::as_str).collect()
}

#[tokio::test]
async fn test_standalone_package_owns_its_command() {
    let universe = Universe::with(&[("foo.sty", "\\ProvidesPackage{foo}\n\\newcommand{\\foo}{x}\n")]);
    let engine = Arc::new(universe.engine());
    let indexer = universe.indexer(engine, true);

    let component = indexer.resolve(universe.file("foo.sty")).await.unwrap();

    assert_eq!(component.file_names, vec!["foo.sty"]);
    assert!(component.references.is_empty());
    assert_eq!(names(&component.commands), vec!["foo"]);
    assert!(component.environments.is_empty());
}

#[tokio::test]
async fn test_inherited_command_is_not_reattributed() {
    let universe = Universe::with(&[
        ("foo.sty", "\\newcommand{\\foo}{x}\n"),
        ("bar.sty", "\\RequirePackage{foo}\n\\foo\n"),
    ]);
    let engine = Arc::new(universe.engine());
    let indexer = universe.indexer(engine, true);

    let bar = indexer.resolve(universe.file("bar.sty")).await.unwrap();

    assert_eq!(bar.file_names, vec!["bar.sty"]);
    assert_eq!(bar.references, vec!["foo.sty"]);
    assert!(bar.commands.is_empty());
    assert!(bar.environments.is_empty());

    let foo = indexer.registry().get("foo.sty").unwrap();
    assert_eq!(names(&foo.commands), vec!["foo"]);
}

#[tokio::test]
async fn test_mutual_inclusion_forms_one_component_from_either_entry() {
    let files = [
        ("a.sty", "\\RequirePackage{b}\n\\newcommand{\\alpha}{a}\n"),
        ("b.sty", "\\RequirePackage{a}\n\\newcommand{\\beta}{b}\n"),
    ];

    for entry in ["a.sty", "b.sty"] {
        let universe = Universe::with(&files);
        let engine = Arc::new(universe.engine());
        let indexer = universe.indexer(engine, true);

        let component = indexer.resolve(universe.file(entry)).await.unwrap();

        assert_eq!(component.file_names, vec!["a.sty", "b.sty"], "entry {entry}");
        assert!(component.references.is_empty(), "entry {entry}");
        assert_eq!(names(&component.commands), vec!["alpha", "beta"], "entry {entry}");
        assert!(component.environments.is_empty());
    }
}

#[tokio::test]
async fn test_environment_is_not_reported_as_command() {
    let universe = Universe::with(&[(
        "array.sty",
        "\\newenvironment{tabular}{}{}\n\\newcommand{\\hline}{}\n",
    )]);
    let engine = Arc::new(universe.engine());
    let indexer = universe.indexer(engine, true);

    let component = indexer.resolve(universe.file("array.sty")).await.unwrap();

    assert_eq!(names(&component.environments), vec!["tabular"]);
    assert_eq!(names(&component.commands), vec!["hline"]);
}

#[tokio::test]
async fn test_three_cycle_resolves_from_any_entry() {
    let files = [
        ("x.sty", "\\RequirePackage{y}\n\\newcommand{\\xcmd}{}\n"),
        ("y.sty", "\\RequirePackage{z}\n\\newcommand{\\ycmd}{}\n"),
        ("z.sty", "\\RequirePackage{leaf}\n\\RequirePackage{x}\n\\newcommand{\\zcmd}{}\n"),
        ("leaf.sty", "\\newcommand{\\leafcmd}{}\n"),
    ];

    for entry in ["x.sty", "y.sty", "z.sty"] {
        let universe = Universe::with(&files);
        let engine = Arc::new(universe.engine());
        let indexer = universe.indexer(engine, true);

        let cycle = indexer.resolve(universe.file(entry)).await.unwrap();

        assert_eq!(cycle.file_names, vec!["x.sty", "y.sty", "z.sty"], "entry {entry}");
        assert_eq!(cycle.references, vec!["leaf.sty"], "entry {entry}");
        assert_eq!(names(&cycle.commands), vec!["xcmd", "ycmd", "zcmd"], "entry {entry}");

        let leaf = indexer.registry().get("leaf.sty").unwrap();
        assert_eq!(names(&leaf.commands), vec!["leafcmd"]);
    }
}

#[tokio::test]
async fn test_cycle_members_share_one_registry_entry() {
    let universe = Universe::with(&[
        ("x.sty", "\\RequirePackage{y}\n"),
        ("y.sty", "\\RequirePackage{z}\n"),
        ("z.sty", "\\RequirePackage{x}\n"),
    ]);
    let engine = Arc::new(universe.engine());
    let indexer = universe.indexer(engine, false);

    indexer.index_all().await;

    let registry = indexer.registry();
    let x = registry.get("x.sty").unwrap();
    for name in ["y.sty", "z.sty"] {
        assert!(Arc::ptr_eq(&x, &registry.get(name).unwrap()));
        assert_eq!(registry.state(name), FileState::Registered);
    }
}

#[tokio::test]
async fn test_symbols_are_never_attributed_twice() {
    let universe = Universe::with(&[
        ("base.sty", "\\newcommand{\\shared}{}\n\\def\\relax{}\n"),
        ("mid.sty", "\\RequirePackage{base}\n\\newcommand{\\midcmd}{}\n\\shared\n"),
        (
            "top.sty",
            "\\RequirePackage{mid}\n\\def\\shared{}\n\\def\\midcmd{}\n\\newcommand{\\topcmd}{}\n",
        ),
    ]);
    let engine = Arc::new(universe.engine());
    let indexer = universe.indexer(engine, false);

    indexer.index_all().await;
    let registry = indexer.registry();

    let base = registry.get("base.sty").unwrap();
    let mid = registry.get("mid.sty").unwrap();
    let top = registry.get("top.sty").unwrap();
    assert_eq!(names(&base.commands), vec!["shared"]);
    assert_eq!(names(&mid.commands), vec!["midcmd"]);
    assert_eq!(names(&top.commands), vec!["topcmd"]);

    let mut owners = std::collections::HashMap::new();
    for component in registry.components() {
        for symbol in component.commands.iter().chain(&component.environments) {
            assert!(
                !indexer.kernel().contains(symbol),
                "{symbol} belongs to the kernel"
            );
            let previous = owners.insert(symbol.clone(), component.file_names.clone());
            assert!(previous.is_none(), "{symbol} attributed twice");
        }
    }
}

#[tokio::test]
async fn test_host_class_symbols_belong_only_to_the_host_class() {
    let universe = Universe::with(&[
        ("foo.sty", "\\newcommand{\\foo}{\\maketitle}\n"),
        (
            "report.cls",
            "\\LoadClass{article}\n\\newcommand{\\chapter}{}\n\\section\n\\maketitle\n",
        ),
    ]);
    let engine = Arc::new(universe.engine());
    let indexer = universe.indexer(engine, false);

    let foo = indexer.resolve(universe.file("foo.sty")).await.unwrap();
    assert!(foo.references.is_empty());
    assert_eq!(names(&foo.commands), vec!["foo"]);

    indexer.index_all().await;
    let registry = indexer.registry();

    let article = registry.get("article.cls").unwrap();
    assert_eq!(names(&article.commands), vec!["maketitle", "section"]);

    let report = registry.get("report.cls").unwrap();
    assert!(report.references.is_empty());
    assert_eq!(names(&report.commands), vec!["chapter"]);

    for component in registry.components() {
        if component.file_names != vec!["article.cls"] {
            assert!(!component.defines("maketitle"), "{:?}", component.file_names);
            assert!(!component.defines("section"), "{:?}", component.file_names);
        }
    }
}

#[tokio::test]
async fn test_probe_timeout_degrades_to_standalone() {
    let universe = Universe::with(&[
        ("foo.sty", "\\newcommand{\\fooonly}{}\n"),
        ("slow.sty", "\\RequirePackage{foo}\n\\newcommand{\\slowcmd}{}\n"),
    ]);
    let engine = Arc::new(universe.engine().stall_listing("slow.sty"));
    let indexer = universe.indexer(engine, true);

    let slow = indexer.resolve(universe.file("slow.sty")).await.unwrap();
    assert!(slow.references.is_empty());
    assert_eq!(names(&slow.commands), vec!["slowcmd"]);

    let dependency = indexer.dependency(universe.file("slow.sty")).await;
    assert!(dependency.is_degraded());
    assert_eq!(indexer.registry().state("slow.sty"), FileState::Registered);

    let foo = indexer.resolve(universe.file("foo.sty")).await.unwrap();
    assert_eq!(names(&foo.commands), vec!["fooonly"]);
}

#[tokio::test]
async fn test_classification_timeout_only_skips_that_component() {
    let universe = Universe::with(&[
        ("fine.sty", "\\newcommand{\\finecmd}{}\n"),
        ("stall.sty", "\\newcommand{\\stallcmd}{}\n"),
        ("user.sty", "\\RequirePackage{stall}\n\\newcommand{\\usercmd}{}\n"),
    ]);
    let engine = Arc::new(universe.engine().stall_classification("stall.sty"));
    let indexer = universe.indexer(Arc::clone(&engine), true);

    let report = indexer
        .index(vec![
            universe.file("fine.sty"),
            universe.file("stall.sty"),
            universe.file("user.sty"),
        ])
        .await;

    let registry = indexer.registry();
    assert_eq!(report.skipped, vec!["stall.sty".to_string()]);
    assert_eq!(registry.state("stall.sty"), FileState::Skipped);
    assert!(registry.get("stall.sty").is_none());
    assert_eq!(names(&registry.get("fine.sty").unwrap().commands), vec!["finecmd"]);

    let user = registry.get("user.sty").unwrap();
    assert_eq!(user.references, vec!["stall.sty"]);
    assert!(user.commands.contains("usercmd"));

    assert_eq!(engine.listings_of("stall.sty"), 1);
    assert_eq!(engine.classifications_of("stall.sty"), 1);
    assert!(indexer.resolve(universe.file("stall.sty")).await.is_none());
    assert_eq!(engine.classifications_of("stall.sty"), 1);
}

#[tokio::test]
async fn test_each_file_is_probed_once() {
    let universe = Universe::with(&[
        ("base.sty", "\\newcommand{\\basecmd}{}\n"),
        ("left.sty", "\\RequirePackage{base}\n\\newcommand{\\leftcmd}{}\n"),
        ("right.sty", "\\RequirePackage{base}\n\\newcommand{\\rightcmd}{}\n"),
        ("top.cls", "\\RequirePackage{left}\n\\RequirePackage{right}\n"),
    ]);
    let engine = Arc::new(universe.engine());
    let indexer = universe.indexer(Arc::clone(&engine), false);

    let first = indexer.index_all().await;
    let second = indexer.index_all().await;

    assert_eq!(first.files, 5);
    assert_eq!(first.components, 5);
    assert_eq!(first, second);
    for (name, count) in engine.listing_counts() {
        assert_eq!(count, 1, "{name} probed {count} times");
    }
    assert_eq!(engine.listing_counts().len(), 5);
}

#[tokio::test]
async fn test_sequential_and_parallel_runs_agree() {
    let files = [
        ("base.sty", "\\newcommand{\\basecmd}{}\n\\newenvironment{boxed}{}{}\n"),
        ("left.sty", "\\RequirePackage{base}\n\\newcommand{\\leftcmd}{}\n\\basecmd\n"),
        ("right.sty", "\\RequirePackage{base}\n\\RequirePackage{loop}\n\\newcommand{\\rightcmd}{}\n"),
        ("loop.sty", "\\RequirePackage{right}\n\\newcommand{\\loopcmd}{}\n"),
        ("report.cls", "\\RequirePackage{left}\n\\RequirePackage{right}\n\\def\\chapter{}\n"),
    ];

    let mut exports: Vec<Vec<Component>> = Vec::new();
    for sequential in [true, false] {
        let universe = Universe::with(&files);
        let engine = Arc::new(universe.engine());
        let indexer = universe.indexer(engine, sequential);
        indexer.index_all().await;
        exports.push(indexer.export());
    }

    assert_eq!(exports[0], exports[1]);
    let kernel = exports[0].last().unwrap();
    assert!(kernel.file_names.is_empty());
    assert!(kernel.commands.contains("newcommand"));
}

#[tokio::test]
async fn test_unindexed_include_is_probed_standalone() {
    let mut universe = Universe::new();
    universe.add_unindexed("hidden.sty", "\\newcommand{\\hiddencmd}{}\n");
    universe.add("pkg.sty", "\\RequirePackage{hidden}\n\\newcommand{\\pkgcmd}{}\n");
    let engine = Arc::new(universe.engine());
    let indexer = universe.indexer(Arc::clone(&engine), true);

    let pkg = indexer.resolve(universe.file("pkg.sty")).await.unwrap();
    assert_eq!(pkg.references, vec!["hidden.sty"]);
    assert_eq!(names(&pkg.commands), vec!["pkgcmd"]);

    let hidden = indexer.registry().get("hidden.sty").unwrap();
    assert!(hidden.commands.is_empty());
    assert_eq!(engine.listings_of("hidden.sty"), 1);
    assert_eq!(engine.classifications_of("hidden.sty"), 0);
}

#[tokio::test]
async fn test_overrides_extend_every_member() {
    let universe = Universe::with(&[
        ("a.sty", "\\RequirePackage{b}\n\\newcommand{\\alpha}{}\n"),
        ("b.sty", "\\RequirePackage{a}\n"),
    ]);
    let engine = Arc::new(universe.engine());
    let indexer = universe.indexer(engine, true);
    indexer.index_all().await;

    let overrides = Overrides {
        components: vec![
            OverrideEntry {
                name: "b".to_string(),
                commands: vec!["alpha".to_string(), "manual".to_string()],
                environments: vec!["curated".to_string()],
            },
            OverrideEntry {
                name: "missing.sty".to_string(),
                commands: vec!["x".to_string()],
                environments: vec![],
            },
        ],
    };
    let errors = indexer.apply_overrides(&overrides);
    assert_eq!(errors.len(), 1);

    let registry = indexer.registry();
    let a = registry.get("a.sty").unwrap();
    assert!(Arc::ptr_eq(&a, &registry.get("b.sty").unwrap()));
    assert_eq!(names(&a.commands), vec!["alpha", "manual"]);
    assert_eq!(names(&a.environments), vec!["curated"]);
}
