//! Bundle identifier lookups against fixture backups.

use ibl::backup::Backup;
use ibl::manifest::{EntryKind, ManifestDb};
use ibl::resolve::{self, LocationStatus, LookupMode};

use crate::common::fixtures::{FixtureBackup, SMS_FILE_ID};
use crate::common::init_test_logging;

const SMS_PREFS_ID: &str = "aa11223344556677889900aabbccddeeff001122";
const PLUGIN_ID: &str = "bb11223344556677889900aabbccddeeff001122";
const GROUP_ID: &str = "cc11223344556677889900aabbccddeeff001122";
const LOOKALIKE_ID: &str = "dd11223344556677889900aabbccddeeff001122";
const DIR_ID: &str = "ee11223344556677889900aabbccddeeff001122";

fn messages_backup() -> FixtureBackup {
    FixtureBackup::new("17.4")
        .with_file("HomeDomain", "Library/SMS/sms.db", SMS_FILE_ID)
        .with_file(
            "AppDomain-com.apple.MobileSMS",
            "Library/Preferences/com.apple.MobileSMS.plist",
            SMS_PREFS_ID,
        )
        .with_file(
            "AppDomainPlugin-com.apple.MobileSMS.MessagesExtension",
            "Library/Caches/cache.db",
            PLUGIN_ID,
        )
        .with_file(
            "AppDomainGroup-group.com.apple.MobileSMS",
            "Library/shared.plist",
            GROUP_ID,
        )
        .with_file(
            "AppDomain-com.apple.MobileSMSExtra",
            "Library/Preferences/extra.plist",
            LOOKALIKE_ID,
        )
        .with_directory("AppDomain-com.apple.MobileSMS", "Library/Preferences", DIR_ID)
}

fn open(fixture: &FixtureBackup) -> (Backup, ManifestDb) {
    let backup = Backup::open(fixture.path()).expect("fixture backup should open");
    let manifest =
        ManifestDb::open(backup.manifest_db_path()).expect("fixture manifest should open");
    (backup, manifest)
}

#[test]
fn bundle_collects_app_plugin_and_group_domains() {
    init_test_logging();
    let fixture = messages_backup();
    let (backup, manifest) = open(&fixture);

    let res = resolve::resolve_bundle(&backup, &manifest, "com.apple.MobileSMS").unwrap();
    assert_eq!(res.mode, LookupMode::Bundle);

    let ids: Vec<&str> = res.locations.iter().map(|l| l.file_id.as_str()).collect();
    assert!(ids.contains(&SMS_PREFS_ID));
    assert!(ids.contains(&PLUGIN_ID));
    assert!(ids.contains(&GROUP_ID));
    assert!(ids.contains(&DIR_ID));
    assert!(!ids.contains(&LOOKALIKE_ID), "prefix-sharing bundle must not match");
    assert!(!ids.contains(&SMS_FILE_ID), "HomeDomain rows belong to no bundle");
}

#[test]
fn directories_are_hidden_unless_requested() {
    init_test_logging();
    let fixture = messages_backup();
    let (backup, manifest) = open(&fixture);

    let res = resolve::resolve_bundle(&backup, &manifest, "com.apple.MobileSMS").unwrap();

    let files: Vec<_> = res.visible(false).collect();
    assert_eq!(files.len(), 3);
    assert!(files.iter().all(|l| l.kind == EntryKind::File));
    assert!(files.iter().all(|l| l.status == LocationStatus::Present));

    let all: Vec<_> = res.visible(true).collect();
    assert_eq!(all.len(), 4);
    let dir = all.iter().find(|l| l.file_id == DIR_ID).unwrap();
    assert_eq!(dir.status, LocationStatus::NotStored);
    assert!(dir.disk_path.is_none());
}

#[test]
fn results_are_sorted_by_domain_then_path() {
    init_test_logging();
    let fixture = messages_backup();
    let (backup, manifest) = open(&fixture);

    let res = resolve::resolve_bundle(&backup, &manifest, "com.apple.MobileSMS").unwrap();
    let keys: Vec<(&str, &str)> = res
        .locations
        .iter()
        .map(|l| (l.domain.as_str(), l.relative_path.as_str()))
        .collect();
    let mut sorted = keys.clone();
    sorted.sort_unstable();
    assert_eq!(keys, sorted);
}

#[test]
fn full_domain_name_is_accepted() {
    init_test_logging();
    let fixture = messages_backup();
    let (backup, manifest) = open(&fixture);

    let res =
        resolve::resolve_bundle(&backup, &manifest, "AppDomain-com.apple.MobileSMSExtra").unwrap();
    assert_eq!(res.locations.len(), 1);
    assert_eq!(res.locations[0].file_id, LOOKALIKE_ID);
}

#[test]
fn unknown_bundle_is_empty() {
    init_test_logging();
    let fixture = messages_backup();
    let (backup, manifest) = open(&fixture);

    let res = resolve::resolve_bundle(&backup, &manifest, "com.example.nothing").unwrap();
    assert!(res.is_empty());
}

#[test]
fn surrounding_whitespace_in_bundle_id_is_ignored() {
    init_test_logging();
    let fixture = messages_backup();
    let (backup, manifest) = open(&fixture);

    let res = resolve::resolve_bundle(&backup, &manifest, " com.apple.MobileSMS ").unwrap();
    assert_eq!(res.query, "com.apple.MobileSMS");
    assert_eq!(res.visible(false).count(), 3);
}
