//! Tree operations over the persistent sled store

use super::test_utils::{p, seed};
use std::sync::Arc;
use tempfile::TempDir;
use upspin_ui::client::Client;
use upspin_ui::namespace::LocalClient;
use upspin_ui::path::UserName;
use upspin_ui::store::SledStore;
use upspin_ui::treeop::TreeOp;

fn open(dir: &TempDir) -> LocalClient<SledStore> {
    let store = SledStore::new(dir.path().join("store")).unwrap();
    LocalClient::new(Arc::new(store), UserName::new("ann@example.com")).with_block_size(8)
}

#[test]
fn test_copied_tree_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let c = open(&dir);
        c.make_directory(&p("ann@example.com/")).unwrap();
        seed(
            &c,
            &[
                ("ann@example.com/a", None),
                ("ann@example.com/a/notes.txt", Some("more than one block of text")),
                ("ann@example.com/dst", None),
            ],
        );
        TreeOp::new(&c)
            .copy(&p("ann@example.com/dst"), &[p("ann@example.com/a")])
            .unwrap();
        c.store().flush().unwrap();
    }

    let c = open(&dir);
    assert_eq!(
        c.get(&p("ann@example.com/dst/a/notes.txt")).unwrap(),
        b"more than one block of text"
    );
    let entry = c.lookup(&p("ann@example.com/dst/a/notes.txt"), false).unwrap();
    assert!(entry.blocks().len() > 1);
}

#[test]
fn test_delete_tree_in_sled() {
    let dir = TempDir::new().unwrap();
    let c = open(&dir);
    c.make_directory(&p("ann@example.com/")).unwrap();
    seed(
        &c,
        &[
            ("ann@example.com/a", None),
            ("ann@example.com/a/b", None),
            ("ann@example.com/a/b/c", Some("c")),
            ("ann@example.com/keep", Some("k")),
        ],
    );

    TreeOp::new(&c).delete(&[p("ann@example.com/a")]).unwrap();

    let names: Vec<String> = c
        .glob("ann@example.com/*")
        .unwrap()
        .into_iter()
        .map(|e| e.name.to_string())
        .collect();
    assert_eq!(names, vec!["ann@example.com/keep"]);
}
