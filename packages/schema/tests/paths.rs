//! Client and server derive the same paths from the same tree.

use entangle_schema::{
    compile, Branch, CallKind, CallableSpec, ErrorRegistry, ErrorSpec, Manifest, Node,
    DEFAULT_ENTRY,
};
use proptest::prelude::*;

/// A server-side tree with opaque leaf payloads.
type ServerNode = Node<u32, String>;

fn arb_name() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z][a-zA-Z0-9_]{0,6}",
        Just(DEFAULT_ENTRY.to_string()),
    ]
}

fn arb_tree() -> impl Strategy<Value = ServerNode> {
    let leaf = prop_oneof![
        any::<u32>().prop_map(Node::Callable),
        "[A-Z][a-zA-Z]{0,8}".prop_map(Node::ErrorType),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop::collection::vec((arb_name(), inner), 0..6).prop_map(|entries| {
            let mut branch = Branch::new();
            for (name, child) in entries {
                branch.insert(name, child);
            }
            Node::Branch(branch)
        })
    })
}

fn describe(tree: &ServerNode) -> Manifest {
    tree.map(
        &|_: &u32| CallableSpec::asynchronous(["arg"]),
        &|name: &String| ErrorSpec::new(name.clone()),
    )
}

proptest! {
    /// Paths are unique whenever compilation succeeds, and a client
    /// compiling the transmitted manifest derives exactly the same ones.
    #[test]
    fn client_paths_match_server_paths(tree in arb_tree()) {
        let Ok(server) = compile(&tree) else {
            // Colliding names are a configuration error, not a mismatch
            return Ok(());
        };

        let mut seen = std::collections::HashSet::new();
        for route in server.routes() {
            prop_assert!(seen.insert(route.path.clone()), "duplicate {}", route.path);
        }

        let text = serde_json::to_string(&describe(&tree)).unwrap();
        let manifest: Manifest = serde_json::from_str(&text).unwrap();
        let client = compile(&manifest).unwrap();

        let server_paths: Vec<_> = server.routes().iter().map(|r| r.path.to_string()).collect();
        let client_paths: Vec<_> = client.routes().iter().map(|r| r.path.to_string()).collect();
        prop_assert_eq!(server_paths, client_paths);
    }
}

#[test]
fn greeting_service_manifest() {
    let manifest: Manifest = serde_json::from_str(
        r#"{
            "hello": [1, []],
            "greetings": {
                "default": [1, ["name"]],
                "Goodbye": [1, ["name"]],
                "now": [0]
            },
            "errors": { "SpecialError": [2] }
        }"#,
    )
    .unwrap();

    let schema = compile(&manifest).unwrap();
    let paths: Vec<_> = schema.routes().iter().map(|r| r.path.to_string()).collect();
    assert_eq!(
        paths,
        vec![
            "/hello",
            "/greetings",
            "/greetings/goodbye",
            "/greetings/now",
            "/errors/specialerror",
        ]
    );

    let now = schema.get("greetings/now").unwrap();
    assert!(matches!(
        &now.target,
        entangle_schema::Target::Callable(CallableSpec { kind: CallKind::Sync, .. })
    ));

    let registry = ErrorRegistry::from_schema(&schema).unwrap();
    assert_eq!(
        registry.lookup("/errors/SpecialError").map(|c| c.name()),
        Some("SpecialError")
    );
}
