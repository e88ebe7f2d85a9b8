use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use mcoffline_core::identity::offline_uuid_string;
use mcoffline_core::record::IdentityRecord;
use mcoffline_core::remap::{LinkMode, RemapOptions, remap_directory};
use mcoffline_core::{CoreErrorCode, IdentityIndex};

const ALICE_ONLINE: &str = "7125ba8b-1c86-4508-b92b-b5c042ccfe2b";
const BOB_ONLINE: &str = "61699b2e-d327-4a01-9f1e-0ea8c3f06bc6";

fn alice_index() -> IdentityIndex {
    IdentityIndex::build(vec![IdentityRecord::new("Alice", ALICE_ONLINE)])
}

fn player_dir(root: &Path) -> PathBuf {
    let dir = root.join("world").join("playerdata");
    fs::create_dir_all(&dir).expect("create playerdata");
    dir
}

fn put(dir: &Path, name: &str, bytes: &[u8]) {
    fs::write(dir.join(name), bytes).expect("write player file");
}

fn file_names(dir: &Path) -> BTreeSet<String> {
    fs::read_dir(dir)
        .expect("read destination")
        .map(|e| {
            e.expect("dir entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect()
}

#[test]
fn remaps_matched_files_and_reports_the_rest() {
    let root = tempfile::tempdir().expect("tempdir");
    let source = player_dir(root.path());
    put(&source, &format!("{ALICE_ONLINE}.dat"), b"alice data");
    put(&source, &format!("{BOB_ONLINE}.dat"), b"bob data");

    let report = remap_directory(&alice_index(), &source, &RemapOptions::default())
        .expect("remap should succeed");

    let destination = root.path().join("world").join("playerdata.offline");
    let alice_offline = format!("{}.dat", offline_uuid_string("Alice"));
    assert_eq!(report.destination, destination);
    assert_eq!(file_names(&destination), BTreeSet::from([alice_offline.clone()]));
    assert_eq!(
        fs::read(destination.join(&alice_offline)).expect("read offline file"),
        b"alice data"
    );

    assert_eq!(report.created.len(), 1);
    assert_eq!(report.created[0].player, "Alice");
    assert_eq!(
        report.unmatched,
        vec![source.join(format!("{BOB_ONLINE}.dat"))]
    );
}

#[test]
fn keeps_every_extension() {
    let root = tempfile::tempdir().expect("tempdir");
    let source = player_dir(root.path());
    put(&source, &format!("{ALICE_ONLINE}.dat"), b"new");
    put(&source, &format!("{ALICE_ONLINE}.dat_old"), b"old");

    remap_directory(&alice_index(), &source, &RemapOptions::default())
        .expect("remap should succeed");

    let offline = offline_uuid_string("Alice");
    assert_eq!(
        file_names(&root.path().join("world").join("playerdata.offline")),
        BTreeSet::from([format!("{offline}.dat"), format!("{offline}.dat_old")])
    );
}

#[test]
fn second_run_converges() {
    let root = tempfile::tempdir().expect("tempdir");
    let source = player_dir(root.path());
    put(&source, &format!("{ALICE_ONLINE}.json"), b"{}");
    let index = alice_index();

    let first = remap_directory(&index, &source, &RemapOptions::default()).expect("first run");
    let after_first = file_names(&first.destination);

    let second = remap_directory(&index, &source, &RemapOptions::default()).expect("second run");
    assert_eq!(file_names(&second.destination), after_first);
    assert!(second.created.is_empty());
    assert_eq!(second.already_present.len(), 1);
    assert_eq!(second.converted(), first.converted());
}

#[test]
fn never_touches_source_files() {
    let root = tempfile::tempdir().expect("tempdir");
    let source = player_dir(root.path());
    put(&source, &format!("{ALICE_ONLINE}.dat"), b"alice");
    put(&source, &format!("{BOB_ONLINE}.dat"), b"bob");
    let before = file_names(&source);

    remap_directory(&alice_index(), &source, &RemapOptions::default()).expect("remap");

    assert_eq!(file_names(&source), before);
    assert_eq!(
        fs::read(source.join(format!("{ALICE_ONLINE}.dat"))).expect("read source"),
        b"alice"
    );
}

#[test]
fn skips_subdirectories() {
    let root = tempfile::tempdir().expect("tempdir");
    let source = player_dir(root.path());
    put(&source, &format!("{ALICE_ONLINE}.dat"), b"a");
    fs::create_dir(source.join(ALICE_ONLINE)).expect("create nested dir");

    let report = remap_directory(&alice_index(), &source, &RemapOptions::default())
        .expect("remap should succeed");

    assert_eq!(report.skipped_dirs, vec![source.join(ALICE_ONLINE)]);
    assert_eq!(report.created.len(), 1);
    assert!(report.unmatched.is_empty());
}

#[test]
fn copy_mode_writes_independent_files() {
    let root = tempfile::tempdir().expect("tempdir");
    let source = player_dir(root.path());
    put(&source, &format!("{ALICE_ONLINE}.dat"), b"before");
    let options = RemapOptions {
        link_mode: LinkMode::Copy,
        ..RemapOptions::default()
    };

    let report = remap_directory(&alice_index(), &source, &options).expect("remap");
    let copied = report.created[0].destination.clone();
    fs::write(source.join(format!("{ALICE_ONLINE}.dat")), b"after").expect("rewrite source");

    assert_eq!(fs::read(&copied).expect("read copy"), b"before");

    let again = remap_directory(&alice_index(), &source, &options).expect("second run");
    assert_eq!(again.already_present.len(), 1);
}

#[cfg(unix)]
#[test]
fn hard_links_share_the_inode() {
    use std::os::unix::fs::MetadataExt;

    let root = tempfile::tempdir().expect("tempdir");
    let source = player_dir(root.path());
    put(&source, &format!("{ALICE_ONLINE}.dat"), b"shared");

    let report = remap_directory(&alice_index(), &source, &RemapOptions::default())
        .expect("remap should succeed");

    let original = fs::metadata(source.join(format!("{ALICE_ONLINE}.dat"))).expect("stat source");
    let linked = fs::metadata(&report.created[0].destination).expect("stat link");
    assert_eq!(original.ino(), linked.ino());
    assert_eq!(original.nlink(), 2);
}

#[test]
fn missing_source_directory_is_an_io_error() {
    let root = tempfile::tempdir().expect("tempdir");
    let source = root.path().join("world").join("stats");

    let err = remap_directory(&alice_index(), &source, &RemapOptions::default())
        .expect_err("source does not exist");
    assert_eq!(err.code, CoreErrorCode::Io);
    assert!(!root.path().join("world").join("stats.offline").exists());
}

#[test]
fn unusable_destination_is_a_filesystem_error() {
    let root = tempfile::tempdir().expect("tempdir");
    let source = player_dir(root.path());
    put(&source, &format!("{ALICE_ONLINE}.dat"), b"a");
    // A plain file where the offline directory should go.
    fs::write(root.path().join("world").join("playerdata.offline"), b"").expect("block dir");

    let err = remap_directory(&alice_index(), &source, &RemapOptions::default())
        .expect_err("links cannot be created under a file");
    assert_eq!(err.code, CoreErrorCode::Filesystem);
    assert!(err.message.contains(ALICE_ONLINE));
}

#[cfg(unix)]
#[test]
fn failed_copy_leaves_nothing_for_the_next_run_to_accept() {
    use std::os::unix::fs::symlink;

    let root = tempfile::tempdir().expect("tempdir");
    let source = player_dir(root.path());
    let online = source.join(format!("{ALICE_ONLINE}.dat"));
    // Opens fine but fails on the first read.
    fs::create_dir(root.path().join("not-a-file")).expect("create target dir");
    symlink(root.path().join("not-a-file"), &online).expect("create symlink");
    let options = RemapOptions {
        link_mode: LinkMode::Copy,
        ..RemapOptions::default()
    };

    let err = remap_directory(&alice_index(), &source, &options).expect_err("read should fail");
    assert_eq!(err.code, CoreErrorCode::Filesystem);
    let destination = root.path().join("world").join("playerdata.offline");
    assert!(file_names(&destination).is_empty());

    fs::remove_file(&online).expect("remove symlink");
    put(&source, &format!("{ALICE_ONLINE}.dat"), b"alice data");

    let report = remap_directory(&alice_index(), &source, &options).expect("second run");
    assert_eq!(report.created.len(), 1);
    assert!(report.already_present.is_empty());
    assert_eq!(
        fs::read(&report.created[0].destination).expect("read copy"),
        b"alice data"
    );
}

#[cfg(unix)]
#[test]
fn destination_directory_error_names_both_paths() {
    let root = tempfile::tempdir().expect("tempdir");
    // Fits NAME_MAX on its own, but not with the suffix appended.
    let source = root.path().join("p".repeat(250));
    fs::create_dir(&source).expect("create source");

    let err = remap_directory(&alice_index(), &source, &RemapOptions::default())
        .expect_err("offline directory name is too long");
    assert_eq!(err.code, CoreErrorCode::Filesystem);
    assert!(err.message.contains(&format!("{}.offline", source.display())));
    assert!(err.message.contains(&format!("for {}:", source.display())));
}
