use mirror_fs::{Error, io};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_copy_file_creates_destination() {
    let temp = TempDir::new().unwrap();
    let from = temp.path().join("from.txt");
    let to = temp.path().join("to.txt");
    fs::write(&from, "hello world").unwrap();

    let copied = io::copy_file(&from, &to).unwrap();

    assert_eq!(copied, 11);
    assert_eq!(fs::read_to_string(&to).unwrap(), "hello world");
}

#[test]
fn test_copy_file_overwrites_longer_destination() {
    let temp = TempDir::new().unwrap();
    let from = temp.path().join("from.txt");
    let to = temp.path().join("to.txt");
    fs::write(&from, "short").unwrap();
    fs::write(&to, "a much longer original body").unwrap();

    io::copy_file(&from, &to).unwrap();

    assert_eq!(fs::read_to_string(&to).unwrap(), "short");
}

#[test]
fn test_copy_file_missing_source_names_source() {
    let temp = TempDir::new().unwrap();
    let from = temp.path().join("missing.txt");
    let to = temp.path().join("to.txt");

    let err = io::copy_file(&from, &to).unwrap_err();

    assert!(err.is_not_found());
    assert!(matches!(err, Error::Io { ref path, .. } if *path == from));
    assert!(!to.exists());
}

#[test]
fn test_copy_file_missing_destination_dir_names_destination() {
    let temp = TempDir::new().unwrap();
    let from = temp.path().join("from.txt");
    fs::write(&from, "x").unwrap();
    let to = temp.path().join("no-such-dir/to.txt");

    let err = io::copy_file(&from, &to).unwrap_err();

    assert!(matches!(err, Error::Io { ref path, .. } if *path == to));
}

#[cfg(unix)]
#[test]
fn test_copy_file_replaces_symlink_instead_of_writing_through() {
    let temp = TempDir::new().unwrap();
    let outside = temp.path().join("precious.txt");
    fs::write(&outside, "precious data").unwrap();
    let from = temp.path().join("from.txt");
    fs::write(&from, "new bytes").unwrap();
    let to = temp.path().join("link.txt");
    std::os::unix::fs::symlink(&outside, &to).unwrap();

    io::copy_file(&from, &to).unwrap();

    assert_eq!(fs::read_to_string(&outside).unwrap(), "precious data");
    assert!(!fs::symlink_metadata(&to).unwrap().file_type().is_symlink());
    assert_eq!(fs::read_to_string(&to).unwrap(), "new bytes");
}

#[cfg(unix)]
#[test]
fn test_copy_file_keeps_source_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let from = temp.path().join("run.sh");
    fs::write(&from, "#!/bin/sh\n").unwrap();
    fs::set_permissions(&from, fs::Permissions::from_mode(0o750)).unwrap();
    let to = temp.path().join("copy.sh");

    io::copy_file(&from, &to).unwrap();

    let mode = fs::metadata(&to).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o750);
}

#[test]
fn test_remove_file_removes() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("a.txt");
    fs::write(&file, "a").unwrap();

    assert!(io::remove_file(&file).unwrap());
    assert!(!file.exists());
}

#[test]
fn test_remove_dir_all_removes_subtree() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("stale");
    fs::create_dir_all(dir.join("inner")).unwrap();
    fs::write(dir.join("inner/x.txt"), "x").unwrap();

    assert!(io::remove_dir_all(&dir).unwrap());
    assert!(!dir.exists());
    assert!(!io::remove_dir_all(&dir).unwrap());
}

#[test]
fn test_create_dir_all_over_file_fails() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("blocker");
    fs::write(&blocker, "file").unwrap();

    assert!(io::create_dir_all(&blocker).is_err());
}

#[test]
fn test_append_line_creates_missing_file() {
    let temp = TempDir::new().unwrap();
    let log = temp.path().join("mirror.log");
    assert!(!log.exists());

    io::append_line(&log, "Sync operation cycle completed at now").unwrap();

    assert_eq!(
        fs::read_to_string(&log).unwrap(),
        "Sync operation cycle completed at now\n"
    );
}

#[test]
fn test_append_line_into_missing_directory_fails() {
    let temp = TempDir::new().unwrap();
    let log = temp.path().join("no-such-dir/mirror.log");

    assert!(io::append_line(&log, "line").is_err());
}

#[test]
fn test_append_line_keeps_existing_lines() {
    use assert_fs::prelude::*;
    use predicates::prelude::*;

    let temp = assert_fs::TempDir::new().unwrap();
    let log = temp.child("mirror.log");
    log.write_str("first\n").unwrap();

    io::append_line(log.path(), "second").unwrap();
    io::append_line(log.path(), "third").unwrap();

    log.assert(predicate::str::starts_with("first\nsecond\n"));
    log.assert(predicate::str::ends_with("third\n"));
}
