use std::io::{Read, Seek, SeekFrom, Write};

use atomicfile::{AtomicFile, AtomicFileError, ErrorId, Options};

use crate::common::{listdir, with_temp_root};

#[test]
fn existing_content_is_copied() {
    let td = with_temp_root();
    let fname = td.path().join("old_file");
    std::fs::write(&fname, b"contents here").unwrap();

    let mut f = AtomicFile::open(&fname).unwrap();
    let mut s = String::new();
    f.read_to_string(&mut s).unwrap();
    assert_eq!(s, "contents here");
    f.commit().unwrap();
}

#[test]
fn existing_content_not_copied_when_disabled() {
    let td = with_temp_root();
    let fname = td.path().join("old_file");
    std::fs::write(&fname, b"contents here").unwrap();

    let mut f = Options::new().copy_existing(false).open(&fname).unwrap();
    let mut s = String::new();
    f.read_to_string(&mut s).unwrap();
    assert_eq!(s, "");
    f.commit().unwrap();
    assert_eq!(std::fs::read(&fname).unwrap(), b"");
}

#[test]
fn seeded_cursor_starts_at_zero_and_writes_overwrite() {
    let td = with_temp_root();
    let fname = td.path().join("upd");
    std::fs::write(&fname, b"contents here").unwrap();

    let mut f = AtomicFile::open(&fname).unwrap();
    assert_eq!(f.stream_position().unwrap(), 0);
    f.write_all(b"XX").unwrap();
    f.commit().unwrap();
    assert_eq!(std::fs::read(&fname).unwrap(), b"XXntents here");
}

#[test]
fn large_target_is_seeded_byte_for_byte() {
    let td = with_temp_root();
    let fname = td.path().join("big");
    let payload: Vec<u8> = (0..200_003u32).map(|i| (i.wrapping_mul(31) % 256) as u8).collect();
    std::fs::write(&fname, &payload).unwrap();

    let mut f = AtomicFile::open(&fname).unwrap();
    let mut got = Vec::new();
    f.read_to_end(&mut got).unwrap();
    assert_eq!(got, payload);
    f.seek(SeekFrom::Start(0)).unwrap();
    f.abort().unwrap();
}

#[test]
fn missing_target_seeds_empty() {
    let td = with_temp_root();
    let mut f = AtomicFile::open(td.path().join("fresh")).unwrap();
    let mut got = Vec::new();
    f.read_to_end(&mut got).unwrap();
    assert!(got.is_empty());
}

#[test]
fn directory_target_fails_seeding_without_leaking_temp() {
    let td = with_temp_root();
    let dir_target = td.path().join("adir");
    std::fs::create_dir(&dir_target).unwrap();

    let err = AtomicFile::open(&dir_target).unwrap_err();
    assert!(matches!(err, AtomicFileError::Resource { .. }), "{err:?}");
    assert_eq!(err.id(), ErrorId::E_RESOURCE);
    assert_eq!(listdir(td.path()), vec!["adir".to_string()]);
}

#[test]
fn fifo_target_is_rejected_without_blocking() {
    use rustix::fs::{mknodat, FileType, Mode, CWD};

    let td = with_temp_root();
    let fifo = td.path().join("pipe");
    mknodat(CWD, &fifo, FileType::Fifo, Mode::from_bits_truncate(0o644), 0).unwrap();

    let err = AtomicFile::open(&fifo).unwrap_err();
    assert!(matches!(err, AtomicFileError::Resource { .. }), "{err:?}");
    assert_eq!(listdir(td.path()), vec!["pipe".to_string()]);
}

#[test]
fn missing_parent_directory_is_a_resource_error() {
    let td = with_temp_root();
    let err = AtomicFile::open(td.path().join("no/such/dir/file")).unwrap_err();
    match err {
        AtomicFileError::Resource { ref source, .. } => {
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(listdir(td.path()).is_empty());
}

#[test]
fn path_without_file_name_is_rejected() {
    let err = AtomicFile::open("/").unwrap_err();
    assert!(matches!(err, AtomicFileError::Resource { .. }), "{err:?}");
}
