//! Device path lookups against fixture backups.

use ibl::backup::{Backup, BucketLayout};
use ibl::manifest::{EntryKind, ManifestDb};
use ibl::resolve::{self, LocationStatus, LookupMode, Warning};

use crate::common::fixtures::{FixtureBackup, NOTES_FILE_ID, SMS_FILE_ID};
use crate::common::init_test_logging;

fn open(fixture: &FixtureBackup) -> (Backup, ManifestDb) {
    let backup = Backup::open(fixture.path()).expect("fixture backup should open");
    let manifest =
        ManifestDb::open(backup.manifest_db_path()).expect("fixture manifest should open");
    (backup, manifest)
}

#[test]
fn sms_database_resolves_to_bucketed_file() {
    init_test_logging();
    let fixture =
        FixtureBackup::new("17.4.1").with_file("HomeDomain", "Library/SMS/sms.db", SMS_FILE_ID);
    let (backup, manifest) = open(&fixture);

    let res = resolve::resolve_path(&backup, &manifest, "/var/mobile/Library/SMS/sms.db").unwrap();

    assert_eq!(res.mode, LookupMode::DevicePath);
    assert_eq!(res.locations.len(), 1);
    let loc = &res.locations[0];
    assert_eq!(loc.status, LocationStatus::Present);
    assert_eq!(loc.kind, EntryKind::File);
    assert_eq!(loc.domain, "HomeDomain");
    assert_eq!(
        loc.disk_path.as_deref(),
        Some(fixture.bucket_path(SMS_FILE_ID).as_path())
    );
    assert!(res.warnings.is_empty());
}

#[test]
fn private_prefix_and_redundant_slashes_are_normalized() {
    init_test_logging();
    let fixture =
        FixtureBackup::new("16.0").with_file("HomeDomain", "Library/SMS/sms.db", SMS_FILE_ID);
    let (backup, manifest) = open(&fixture);

    let raw = "/private/var/mobile//Library/./SMS/sms.db";
    let res = resolve::resolve_path(&backup, &manifest, raw).unwrap();
    assert_eq!(res.present_count(), 1);
}

#[test]
fn manifest_key_form_is_accepted() {
    init_test_logging();
    let fixture =
        FixtureBackup::new("17.0").with_file("HomeDomain", "Library/SMS/sms.db", SMS_FILE_ID);
    let (backup, manifest) = open(&fixture);

    let res = resolve::resolve_path(&backup, &manifest, "HomeDomain-Library/SMS/sms.db").unwrap();
    assert_eq!(res.locations.len(), 1);
    assert!(res.candidates.is_empty());
}

#[test]
fn camera_roll_path_tries_every_matching_domain() {
    init_test_logging();
    let id = "12ab34cd56ef7890aabbccddeeff001122334455";
    let fixture = FixtureBackup::new("17.2").with_file(
        "CameraRollDomain",
        "Media/DCIM/100APPLE/IMG_0001.HEIC",
        id,
    );
    let (backup, manifest) = open(&fixture);

    let res =
        resolve::resolve_path(&backup, &manifest, "/var/mobile/Media/DCIM/100APPLE/IMG_0001.HEIC")
            .unwrap();

    let domains: Vec<&str> = res.candidates.iter().map(|c| c.domain.as_str()).collect();
    assert!(domains.contains(&"CameraRollDomain"));
    assert!(domains.contains(&"MediaDomain"));
    assert!(domains.contains(&"HomeDomain"));
    assert_eq!(res.locations.len(), 1);
    assert_eq!(res.locations[0].domain, "CameraRollDomain");
}

#[test]
fn missing_row_is_an_empty_resolution() {
    init_test_logging();
    let fixture =
        FixtureBackup::new("17.0").with_file("HomeDomain", "Library/SMS/sms.db", SMS_FILE_ID);
    let (backup, manifest) = open(&fixture);

    let raw = "/var/mobile/Library/Notes/notes.sqlite";
    let res = resolve::resolve_path(&backup, &manifest, raw).unwrap();
    assert!(res.is_empty());
    assert!(res.warnings.is_empty());
}

#[test]
fn row_without_stored_file_is_reported_missing() {
    init_test_logging();
    let fixture = FixtureBackup::new("17.0")
        .with_file("HomeDomain", "Library/Notes/notes.sqlite", NOTES_FILE_ID)
        .with_row("HomeDomain", "Library/SMS/sms.db", SMS_FILE_ID, 1);
    let (backup, manifest) = open(&fixture);

    let res = resolve::resolve_path(&backup, &manifest, "/var/mobile/Library/SMS/sms.db").unwrap();

    assert_eq!(res.locations.len(), 1);
    assert_eq!(res.locations[0].status, LocationStatus::Missing);
    assert_eq!(res.present_count(), 0);
    match &res.warnings[..] {
        [Warning::MissingOnDisk { file_id, expected, .. }] => {
            assert_eq!(file_id, SMS_FILE_ID);
            assert_eq!(expected, &fixture.bucket_path(SMS_FILE_ID));
        }
        other => panic!("expected one MissingOnDisk warning, got {other:?}"),
    }
}

#[test]
fn flat_layout_backup_resolves() {
    init_test_logging();
    let fixture =
        FixtureBackup::new("12.4").with_flat_file("HomeDomain", "Library/SMS/sms.db", SMS_FILE_ID);
    let (backup, manifest) = open(&fixture);

    assert_eq!(backup.layout(), BucketLayout::Flat);
    let res = resolve::resolve_path(&backup, &manifest, "/var/mobile/Library/SMS/sms.db").unwrap();
    assert_eq!(
        res.locations[0].disk_path.as_deref(),
        Some(fixture.path().join(SMS_FILE_ID).as_path())
    );
}

#[test]
fn duplicate_rows_are_all_returned_with_a_warning() {
    init_test_logging();
    let other = "ff0d7e5fb2ce288813306e4d4636395e047a3d28";
    let fixture = FixtureBackup::new("17.0")
        .with_file("HomeDomain", "Library/SMS/sms.db", SMS_FILE_ID)
        .with_file("HomeDomain", "Library/SMS/sms.db", other);
    let (backup, manifest) = open(&fixture);

    let res = resolve::resolve_path(&backup, &manifest, "/var/mobile/Library/SMS/sms.db").unwrap();

    assert_eq!(res.locations.len(), 2);
    assert_eq!(res.locations[0].file_id, SMS_FILE_ID);
    assert_eq!(res.locations[1].file_id, other);
    assert!(res
        .warnings
        .iter()
        .any(|w| matches!(w, Warning::Ambiguous { matches: 2, .. })));
}

#[test]
fn unmappable_path_is_rejected() {
    init_test_logging();
    let fixture = FixtureBackup::new("17.0");
    let (backup, manifest) = open(&fixture);

    let err = resolve::resolve_path(&backup, &manifest, "/System/Library/foo").unwrap_err();
    assert!(err.is_configuration_error());
    assert_eq!(err.exit_code(), 2);
}
