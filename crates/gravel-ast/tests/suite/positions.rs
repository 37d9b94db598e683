use gravel_ast::ast::walk::{node_at, walk, NodeRef};
use gravel_ast::ast::Module;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::{build_ok, script_expr};

const CORPUS: &[&str] = &[
    "def total = price * 2 + tax\nprintln total",
    "import java.util.List\nList<String> names = ['a', 'b']\nnames.each { n -> println n }",
    "class Point {\n  int x\n  private int y = 3\n  Point(int x) { this.x = x }\n  int sum() { x + y }\n}",
    "for (i in 0..<10) {\n  if (i % 2 == 0) continue\n  println \"odd ${i}\"\n}",
    "try {\n  risky()\n} catch (IOException | RuntimeException e) {\n  log(e)\n} finally {\n  done()\n}",
    "switch (x) {\n  case 1:\n  case 2: a(); break\n  default: b()\n}",
    "def m = [a: 1, (k): v, 'b': [1, 2]]\nassert m.a == 1 : 'bad'",
    "def r = obj?.items*.name.findAll { it }.size()\nr = cond ? r : -1",
    "enum Color {\n  RED, GREEN\n}",
    "def s = new String[2][]\ndef l = { int a, b -> a + b }\nl(1, 2)",
    "while (n > 0) {\n  n--\n}\ndo {\n  n++\n} while (n < 3)",
    "@Deprecated\ninterface Shape {\n  double area()\n}",
    "try (def src = open(); def dst = create()) {\n  copy(src, dst)\n} catch (IOException e) {\n  log(e)\n}",
    "enum E {\n  A(1) { def f() {} },\n  B\n}",
    "class O {\n  def m() {\n    def r = new Runnable() {\n      void run() { println 'hi' }\n    }\n  }\n}",
    "def grid = new int @Size [2] @Size [3]\nint @Size [] row = grid[0]",
    "class A {\n  @Lazy private int x = 1\n  @Deprecated def x\n}",
];

/// Every positioned node that is a child of another positioned node lies
/// within it, and every known range is well formed.
#[track_caller]
fn assert_nested(text: &str, module: &Module) {
    fn check(parent: NodeRef<'_>, text: &str) {
        let outer = parent.range();
        for child in parent.children() {
            let inner = child.range();
            if !inner.is_unknown() {
                assert!(
                    inner.start <= inner.end && inner.end <= text.len(),
                    "{} has a malformed range {inner:?} in {text:?}",
                    child.label()
                );
                if !outer.is_unknown() {
                    assert!(
                        outer.contains(&inner),
                        "{} {inner:?} escapes {} {outer:?} in {text:?}",
                        child.label(),
                        parent.label()
                    );
                }
            }
            check(child, text);
        }
    }
    check(NodeRef::Module(module), text);
}

#[test]
fn corpus_ranges_nest() {
    for text in CORPUS {
        let module = build_ok(text);
        assert_nested(text, &module);
    }
}

#[test]
fn building_twice_gives_the_same_module() {
    for text in CORPUS {
        assert_eq!(build_ok(text), build_ok(text));
    }
}

#[test]
fn ranges_carry_line_and_column() {
    let text = "def x = 1\nprintln x";
    let module = build_ok(text);
    let call = script_expr(&module, 1);
    assert_eq!((call.range.line, call.range.column), (2, 1));
    assert_eq!((call.range.last_line, call.range.last_column), (2, 10));
    assert_eq!(&text[call.range.start..call.range.end], "println x");
}

#[test]
fn node_at_finds_the_innermost_node() {
    let text = "def total = price * 2";
    let module = build_ok(text);
    let offset = text.find("price").expect("offset");
    let node = node_at(&module, offset).expect("node");
    assert_eq!(node.label(), "Variable price");

    let node = node_at(&module, text.find('*').expect("offset")).expect("node");
    assert_eq!(node.label(), "Binary *");
    assert!(node_at(&module, text.len()).is_none());
}

#[test]
fn walk_visits_in_pre_order() {
    let module = build_ok("a + b");
    let mut labels = Vec::new();
    walk(NodeRef::Module(&module), &mut |node, depth| {
        labels.push(format!("{depth} {}", node.label()));
    });
    assert_eq!(
        labels,
        vec![
            "0 Module Script.groovy",
            "1 ExpressionStatement",
            "2 Binary +",
            "3 Variable a",
            "3 Variable b",
        ]
    );
}

fn arithmetic() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        prop::sample::select(vec!["a", "b", "count"]).prop_map(str::to_string),
        (0u32..1000).prop_map(|n| n.to_string()),
    ];
    leaf.prop_recursive(4, 32, 2, |inner| {
        prop_oneof![
            (inner.clone(), prop::sample::select(vec!["+", "-", "*", "=="]), inner.clone())
                .prop_map(|(l, op, r)| format!("{l} {op} {r}")),
            inner.clone().prop_map(|e| format!("({e})")),
            inner.clone().prop_map(|e| format!("!{e}")),
            (inner.clone(), inner).prop_map(|(l, r)| format!("[{l}, {r}]")),
        ]
    })
}

proptest! {
    #[test]
    fn generated_expressions_nest(expr in arithmetic()) {
        let text = format!("def result = {expr}\nprintln(result)");
        let module = build_ok(&text);
        assert_nested(&text, &module);
    }
}
