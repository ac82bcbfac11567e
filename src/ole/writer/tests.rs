//! Writer output read back through `OleFile`.

use super::OleWriter;
use crate::ole::consts::MAGIC;
use crate::ole::file::OleFile;
use std::io::Cursor;

fn reopen(writer: &OleWriter) -> OleFile<Cursor<Vec<u8>>> {
    let data = writer.to_bytes().unwrap();
    assert!(data.len() >= 1536);
    assert_eq!(&data[0..8], MAGIC);
    OleFile::open(Cursor::new(data)).unwrap()
}

#[test]
fn test_small_and_large_streams_round_trip() {
    let mut writer = OleWriter::new();
    writer.create_stream(&["PowerPoint Document"], &vec![0xAA; 9000]).unwrap();
    writer.create_stream(&["Current User"], b"user").unwrap();
    writer.create_stream(&["Pictures"], &vec![0xBB; 4096]).unwrap();

    let mut ole = reopen(&writer);
    assert_eq!(ole.open_stream(&["PowerPoint Document"]).unwrap(), vec![0xAA; 9000]);
    assert_eq!(ole.open_stream(&["current user"]).unwrap(), b"user");
    assert_eq!(ole.open_stream(&["Pictures"]).unwrap().len(), 4096);
    assert_eq!(ole.list_streams().len(), 3);
}

#[test]
fn test_nested_storage_streams() {
    let mut writer = OleWriter::new();
    writer.create_stream(&["ObjectPool", "_1", "Contents"], b"embedded").unwrap();
    writer.create_stream(&["Current User"], b"u").unwrap();

    let mut ole = reopen(&writer);
    assert!(ole.exists(&["ObjectPool", "_1"]));
    assert_eq!(ole.open_stream(&["ObjectPool", "_1", "Contents"]).unwrap(), b"embedded");

    let mut streams = ole.list_streams();
    streams.sort();
    assert_eq!(
        streams,
        vec![
            vec!["Current User".to_string()],
            vec!["ObjectPool".to_string(), "_1".to_string(), "Contents".to_string()],
        ]
    );
}

#[test]
fn test_replacing_a_stream_keeps_one_entry() {
    let mut writer = OleWriter::new();
    writer.create_stream(&["Data"], b"old").unwrap();
    writer.create_stream(&["Data"], b"new").unwrap();
    assert_eq!(writer.stream_count(), 1);

    let mut ole = reopen(&writer);
    assert_eq!(ole.open_stream(&["Data"]).unwrap(), b"new");
}

#[test]
fn test_empty_stream_and_root_clsid() {
    let clsid = [7u8; 16];
    let mut writer = OleWriter::new();
    writer.set_root_clsid(clsid);
    writer.create_stream(&["Empty"], b"").unwrap();

    let mut ole = reopen(&writer);
    assert_eq!(ole.root_clsid(), clsid);
    assert!(ole.open_stream(&["Empty"]).unwrap().is_empty());
}

#[test]
fn test_invalid_paths_are_rejected() {
    let mut writer = OleWriter::new();
    assert!(writer.create_stream(&[], b"x").is_err());
    assert!(writer.create_stream(&["a", ""], b"x").is_err());
    assert!(
        writer
            .create_stream(&["a-name-that-is-much-longer-than-31-chars"], b"x")
            .is_err()
    );
}

#[test]
fn test_large_file_uses_difat() {
    // 110 FAT sectors cover more than the header's 109 slots.
    let size = 110 * 128 * 512;
    let mut writer = OleWriter::new();
    writer.create_stream(&["Big"], &vec![0x5A; size]).unwrap();

    let data = writer.to_bytes().unwrap();
    let num_difat = u32::from_le_bytes([data[0x48], data[0x49], data[0x4A], data[0x4B]]);
    assert_eq!(num_difat, 1);

    let mut ole = OleFile::open(Cursor::new(data)).unwrap();
    let big = ole.open_stream(&["Big"]).unwrap();
    assert_eq!(big.len(), size);
    assert!(big.iter().all(|&b| b == 0x5A));
}
