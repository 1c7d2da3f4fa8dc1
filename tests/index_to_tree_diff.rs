use bit_diff::{DeltaStatus, EntryMode, FileMode, index_to_tree};
use rstest::rstest;

mod common;

const REGULAR: EntryMode = EntryMode::File(FileMode::Regular);
const EXECUTABLE: EntryMode = EntryMode::File(FileMode::Executable);

#[rstest]
fn staged_addition_modification_and_deletion() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, mut repo) = common::empty_repository();
    let tree = common::build_tree(
        &mut repo,
        &[
            ("a.txt", "alpha\n", REGULAR),
            ("gone.txt", "bye\n", REGULAR),
            ("sub/b.txt", "beta\n", REGULAR),
        ],
    );

    common::stage_blob(&mut repo, "a.txt", "alpha\n", REGULAR);
    common::stage_blob(&mut repo, "c.txt", "fresh\n", REGULAR);
    common::stage_blob(&mut repo, "sub/b.txt", "changed beta\n", REGULAR);

    let diff = index_to_tree(&repo, None, &tree)?;

    let summary = diff
        .deltas()
        .iter()
        .map(|delta| (delta.status(), delta.path().to_string()))
        .collect::<Vec<_>>();
    pretty_assertions::assert_eq!(
        summary,
        vec![
            (DeltaStatus::Added, "c.txt".to_string()),
            (DeltaStatus::Deleted, "gone.txt".to_string()),
            (DeltaStatus::Modified, "sub/b.txt".to_string()),
        ]
    );

    Ok(())
}

#[rstest]
fn matching_index_and_tree_produce_an_empty_list() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, mut repo) = common::empty_repository();
    let tree = common::build_tree(
        &mut repo,
        &[
            ("a.txt", "alpha\n", REGULAR),
            ("sub/b.txt", "beta\n", REGULAR),
        ],
    );

    common::stage_blob(&mut repo, "a.txt", "alpha\n", REGULAR);
    common::stage_blob(&mut repo, "sub/b.txt", "beta\n", REGULAR);

    let diff = index_to_tree(&repo, None, &tree)?;

    assert!(diff.is_empty());

    Ok(())
}

#[rstest]
fn staged_mode_flip_alone_is_modified() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, mut repo) = common::empty_repository();
    let tree = common::build_tree(&mut repo, &[("run.sh", "#!/bin/sh\n", REGULAR)]);

    common::stage_blob(&mut repo, "run.sh", "#!/bin/sh\n", EXECUTABLE);

    let diff = index_to_tree(&repo, None, &tree)?;

    pretty_assertions::assert_eq!(diff.len(), 1);
    let delta = &diff.deltas()[0];
    pretty_assertions::assert_eq!(delta.status(), DeltaStatus::Modified);
    pretty_assertions::assert_eq!(delta.old_mode(), REGULAR);
    pretty_assertions::assert_eq!(delta.new_mode(), EXECUTABLE);
    pretty_assertions::assert_eq!(delta.old_oid(), delta.new_oid());

    Ok(())
}

#[rstest]
fn index_entries_after_the_last_tree_path_drain_as_added()
-> Result<(), Box<dyn std::error::Error>> {
    let (_dir, mut repo) = common::empty_repository();
    let tree = common::build_tree(&mut repo, &[("a.txt", "alpha\n", REGULAR)]);

    common::stage_blob(&mut repo, "a.txt", "alpha\n", REGULAR);
    common::stage_blob(&mut repo, "y.txt", "why\n", REGULAR);
    common::stage_blob(&mut repo, "z.txt", "zed\n", REGULAR);

    let diff = index_to_tree(&repo, None, &tree)?;

    let summary = diff
        .deltas()
        .iter()
        .map(|delta| (delta.status(), delta.path().to_string()))
        .collect::<Vec<_>>();
    pretty_assertions::assert_eq!(
        summary,
        vec![
            (DeltaStatus::Added, "y.txt".to_string()),
            (DeltaStatus::Added, "z.txt".to_string()),
        ]
    );

    Ok(())
}

#[rstest]
fn gitlink_tree_entries_are_skipped() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, mut repo) = common::empty_repository();
    // a tree with a submodule-like commit entry alongside a tracked file
    let tree = common::build_tree(
        &mut repo,
        &[
            ("a.txt", "alpha\n", REGULAR),
            ("vendor", "ffffffffffffffffffffffffffffffffffffffff", EntryMode::Gitlink),
        ],
    );

    common::stage_blob(&mut repo, "a.txt", "alpha\n", REGULAR);

    let diff = index_to_tree(&repo, None, &tree)?;

    assert!(diff.is_empty());

    Ok(())
}
