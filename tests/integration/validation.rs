//! Backup and manifest validation.

use std::fs;

use ibl::backup::{Backup, IosVersion};
use ibl::error::LocateError;
use ibl::manifest::ManifestDb;

use crate::common::fixtures::FixtureBackup;
use crate::common::init_test_logging;

#[test]
fn backup_metadata_is_exposed() {
    init_test_logging();
    let fixture = FixtureBackup::new("17.4.1");
    let backup = Backup::open(fixture.path()).unwrap();

    assert_eq!(backup.info().ios_version, IosVersion::new(17, 4, 1));
    assert_eq!(backup.info().device_name.as_deref(), Some("Fixture iPhone"));
    assert!(backup.root().is_absolute());
}

#[test]
fn ios_10_backup_is_unsupported() {
    init_test_logging();
    let fixture = FixtureBackup::new("10.3.3");
    let err = Backup::open(fixture.path()).unwrap_err();
    assert!(matches!(err, LocateError::UnsupportedVersion { .. }));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn ios_11_is_the_minimum() {
    init_test_logging();
    let fixture = FixtureBackup::new("11.0");
    assert!(Backup::open(fixture.path()).is_ok());
}

#[test]
fn nonexistent_directory_is_reported() {
    init_test_logging();
    let dir = tempfile::tempdir().unwrap();
    let err = Backup::open(dir.path().join("nope")).unwrap_err();
    assert!(matches!(err, LocateError::BackupNotFound { .. }));
}

#[test]
fn directory_without_info_plist_is_rejected() {
    init_test_logging();
    let dir = tempfile::tempdir().unwrap();
    let err = Backup::open(dir.path()).unwrap_err();
    assert!(matches!(err, LocateError::MetadataMissing { .. }));
}

#[test]
fn corrupt_info_plist_is_a_parse_error() {
    init_test_logging();
    let fixture = FixtureBackup::new("17.0");
    fs::write(fixture.path().join("Info.plist"), "not a plist").unwrap();
    let err = Backup::open(fixture.path()).unwrap_err();
    assert!(matches!(err, LocateError::MetadataParse { .. }));
}

#[test]
fn encrypted_backup_is_rejected() {
    init_test_logging();
    let fixture = FixtureBackup::new("17.0").with_manifest_plist(true);
    let err = Backup::open(fixture.path()).unwrap_err();
    assert!(matches!(err, LocateError::EncryptedBackup { .. }));
}

#[test]
fn unencrypted_manifest_plist_is_fine() {
    init_test_logging();
    let fixture = FixtureBackup::new("17.0").with_manifest_plist(false);
    assert!(Backup::open(fixture.path()).is_ok());
}

#[test]
fn missing_manifest_database_is_reported() {
    init_test_logging();
    let fixture = FixtureBackup::new("17.0").without_manifest();
    let backup = Backup::open(fixture.path()).unwrap();
    let err = ManifestDb::open(backup.manifest_db_path()).err().unwrap();
    assert!(matches!(err, LocateError::ManifestNotFound { .. }));
    assert_eq!(err.exit_code(), 1);
}
