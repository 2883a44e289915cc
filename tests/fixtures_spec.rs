use dbf_reader::dbf::format::header;
use dbf_reader::{
    DbfError, DbfReader, DecodeOptions, FieldType, FieldValue, MemoProvider, MemoTable,
    TimestampFormat,
};
use std::cell::RefCell;
use std::io::{self, Cursor, Read, Write};

/// (name, type tag, length, decimal places)
type FieldSpec = (&'static str, u8, u8, u8);

const ID_NAME_FIELDS: &[FieldSpec] = &[("ID", b'I', 4, 0), ("NAME", b'C', 10, 0)];

fn fixture_header(fields: &[FieldSpec], record_count: i32) -> Vec<u8> {
    let data_start = 32 + 32 * fields.len();
    let record_length = 1 + fields.iter().map(|f| usize::from(f.2)).sum::<usize>();

    let mut bytes = vec![0u8; data_start];
    bytes[0] = 0x30;
    bytes[1..4].copy_from_slice(&[24, 3, 15]);
    bytes[4..8].copy_from_slice(&record_count.to_le_bytes());
    bytes[8..10].copy_from_slice(&(data_start as u16).to_le_bytes());
    bytes[10..12].copy_from_slice(&(record_length as u16).to_le_bytes());
    bytes[29] = 0x03;

    let mut displacement = 1i32;
    for (i, (name, tag, length, decimals)) in fields.iter().enumerate() {
        let d = &mut bytes[32 + 32 * i..64 + 32 * i];
        d[..name.len()].copy_from_slice(name.as_bytes());
        d[11] = *tag;
        d[12..16].copy_from_slice(&displacement.to_le_bytes());
        d[16] = *length;
        d[17] = *decimals;
        displacement += i32::from(*length);
    }
    bytes
}

fn id_name_record(deleted: bool, id: i32, name: &str) -> Vec<u8> {
    let mut record = vec![if deleted { b'*' } else { b' ' }];
    record.extend_from_slice(&id.to_le_bytes());
    let mut padded = name.as_bytes().to_vec();
    padded.resize(10, b' ');
    record.extend_from_slice(&padded);
    record
}

fn fixture_table(fields: &[FieldSpec], records: &[Vec<u8>]) -> Vec<u8> {
    let mut bytes = fixture_header(fields, records.len() as i32);
    for record in records {
        bytes.extend_from_slice(record);
    }
    bytes.push(0x1A);
    bytes
}

fn open_bytes(bytes: Vec<u8>) -> DbfReader<Cursor<Vec<u8>>> {
    DbfReader::from_reader(Cursor::new(bytes), "fixture.dbf", DecodeOptions::default())
        .expect("open fixture")
}

#[test]
fn header_lists_descriptors_in_order() {
    let fields: &[FieldSpec] = &[("CODE", b'C', 8, 0), ("PRICE", b'N', 10, 2), ("STAMP", b'T', 8, 0)];
    let parsed = header::parse(&fixture_header(fields, 7)).expect("parse header");

    assert_eq!(parsed.type_tag, 0x30);
    assert_eq!(parsed.last_updated.to_string(), "2024-03-15");
    assert_eq!(parsed.record_count, 7);
    assert_eq!(parsed.data_start, 32 + 32 * 3);
    assert_eq!(parsed.record_length, 27);
    assert_eq!(parsed.codepage_tag, 0x03);

    assert_eq!(parsed.fields.len(), 3);
    let summary: Vec<_> = parsed
        .fields
        .iter()
        .map(|f| (f.name.as_str(), f.type_tag, f.kind, f.displacement, f.length, f.decimal_places))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("CODE", 'C', FieldType::Character, 1, 8, 0),
            ("PRICE", 'N', FieldType::Numeric, 9, 10, 2),
            ("STAMP", 'T', FieldType::Timestamp, 19, 8, 0),
        ]
    );
}

#[test]
fn unknown_type_tags_decode_as_text() {
    let parsed = header::parse(&fixture_header(&[("FLAG", b'L', 1, 0)], 0)).expect("parse header");
    assert_eq!(parsed.fields[0].kind, FieldType::Character);
    assert_eq!(parsed.fields[0].type_tag, 'L');
}

#[test]
fn misaligned_data_start_is_rejected() {
    let mut bytes = fixture_header(ID_NAME_FIELDS, 0);
    bytes[8..10].copy_from_slice(&97u16.to_le_bytes());
    bytes.push(0x0D);
    assert!(matches!(header::parse(&bytes), Err(DbfError::Geometry(_))));
}

#[test]
fn data_start_inside_header_is_rejected() {
    let mut bytes = fixture_header(&[], 0);
    bytes[8..10].copy_from_slice(&16u16.to_le_bytes());
    assert!(matches!(header::parse(&bytes), Err(DbfError::Geometry(_))));
}

#[test]
fn record_length_must_match_fields() {
    let mut bytes = fixture_header(ID_NAME_FIELDS, 0);
    bytes[10..12].copy_from_slice(&20u16.to_le_bytes());
    assert!(matches!(header::parse(&bytes), Err(DbfError::Geometry(_))));
}

#[test]
fn zero_length_field_is_rejected() {
    let bytes = fixture_header(&[("EMPTY", b'C', 0, 0)], 0);
    assert!(matches!(header::parse(&bytes), Err(DbfError::Geometry(_))));
}

#[test]
fn short_header_buffer_is_a_size_mismatch() {
    let bytes = fixture_header(ID_NAME_FIELDS, 0);
    assert!(matches!(
        header::parse(&bytes[..40]),
        Err(DbfError::SizeMismatch { expected: 96, found: 40, .. })
    ));
    assert!(matches!(header::parse(&bytes[..10]), Err(DbfError::SizeMismatch { .. })));
}

#[test]
fn truncated_header_from_reader_is_an_io_error() {
    let bytes = fixture_header(ID_NAME_FIELDS, 0);
    let result = DbfReader::from_reader(Cursor::new(bytes[..50].to_vec()), "short", DecodeOptions::default());
    match result {
        Err(DbfError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
        other => panic!("expected I/O error, got {:?}", other.map(|r| r.header().clone())),
    }
}

#[test]
fn two_records_in_order() {
    let bytes = fixture_table(
        ID_NAME_FIELDS,
        &[id_name_record(false, 1, "Alice"), id_name_record(true, 2, "Bob")],
    );
    let records = open_bytes(bytes).read_all().expect("read records");

    assert_eq!(records.len(), 2);
    assert_eq!(records.iter().map(|r| r.sequence_number).collect::<Vec<_>>(), [1, 2]);
    assert_eq!(records.iter().map(|r| r.deleted).collect::<Vec<_>>(), [false, true]);
    assert_eq!(records[0].get("ID"), Some(&FieldValue::Number(1.0)));
    assert_eq!(records[0].get("NAME"), Some(&FieldValue::Text("Alice".into())));
    assert_eq!(records[1].get("ID"), Some(&FieldValue::Number(2.0)));
    assert_eq!(records[1].get("NAME"), Some(&FieldValue::Text("Bob".into())));
    assert_eq!(
        records[0].fields.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>(),
        ["ID", "NAME"]
    );
}

#[test]
fn header_is_readable_before_iterating() {
    let bytes = fixture_table(ID_NAME_FIELDS, &[id_name_record(false, 1, "Alice")]);
    let reader = open_bytes(bytes);
    let header = reader.header();
    assert_eq!(header.record_count, 1);
    assert_eq!(header.last_updated.to_string(), "2024-03-15");
    assert_eq!(reader.source(), "fixture.dbf");
    assert_eq!(reader.read_all().expect("records").len(), 1);
}

#[test]
fn header_is_available_while_iterating() {
    let bytes = fixture_table(ID_NAME_FIELDS, &[id_name_record(false, 1, "Alice")]);
    let mut records = open_bytes(bytes).records();
    assert_eq!(records.header().fields.len(), 2);
    assert!(records.next().is_some());
    assert_eq!(records.header().record_count, 1);
    assert!(records.next().is_none());
    assert!(records.next().is_none());
}

#[test]
fn truncated_file_ends_early_without_partial_record() {
    let mut bytes = fixture_header(ID_NAME_FIELDS, 5);
    bytes.extend_from_slice(&id_name_record(false, 1, "Alice"));
    bytes.extend_from_slice(&id_name_record(false, 2, "Bob"));
    bytes.extend_from_slice(&id_name_record(false, 3, "Carol")[..6]);

    let records = open_bytes(bytes).read_all().expect("truncation is not an error");
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].get("NAME"), Some(&FieldValue::Text("Bob".into())));
}

#[test]
fn declared_count_limits_iteration() {
    let mut bytes = fixture_header(ID_NAME_FIELDS, 1);
    bytes.extend_from_slice(&id_name_record(false, 1, "Alice"));
    bytes.extend_from_slice(&id_name_record(false, 2, "Bob"));

    let records = open_bytes(bytes).read_all().expect("read records");
    assert_eq!(records.len(), 1);
}

#[test]
fn negative_record_count_yields_nothing() {
    let mut bytes = fixture_header(ID_NAME_FIELDS, -3);
    bytes.extend_from_slice(&id_name_record(false, 1, "Alice"));
    assert!(open_bytes(bytes).read_all().expect("read records").is_empty());
}

struct FailingAfter {
    data: Cursor<Vec<u8>>,
    limit: u64,
}

impl Read for FailingAfter {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.data.position() >= self.limit {
            return Err(io::Error::other("disk on fire"));
        }
        let room = (self.limit - self.data.position()) as usize;
        let n = buf.len().min(room);
        self.data.read(&mut buf[..n])
    }
}

#[test]
fn source_errors_end_the_stream() {
    let bytes = fixture_table(
        ID_NAME_FIELDS,
        &[id_name_record(false, 1, "Alice"), id_name_record(false, 2, "Bob")],
    );
    let limit = (32 + 64 + 15) as u64;
    let source = FailingAfter { data: Cursor::new(bytes), limit };
    let mut records = DbfReader::from_reader(source, "flaky", DecodeOptions::default())
        .expect("header is readable")
        .records();

    assert!(records.next().expect("first record").is_ok());
    assert!(matches!(records.next(), Some(Err(DbfError::Io(_)))));
    assert!(records.next().is_none());
}

struct RecordingMemo {
    memos: MemoTable,
    seen: RefCell<Vec<(String, u32)>>,
}

impl MemoProvider for RecordingMemo {
    fn resolve(&self, source: &str, block: u32) -> Option<String> {
        self.seen.borrow_mut().push((source.to_string(), block));
        self.memos.resolve(source, block)
    }
}

#[test]
fn memo_fields_resolve_by_encoded_block() {
    let fields: &[FieldSpec] = &[("ID", b'I', 4, 0), ("NOTES", b'M', 4, 0)];
    let record = |id: i32, block: u32| {
        let mut r = vec![b' '];
        r.extend_from_slice(&id.to_le_bytes());
        r.extend_from_slice(&block.to_le_bytes());
        r
    };
    let bytes = fixture_table(fields, &[record(1, 8), record(2, 0), record(3, 11), record(4, 99)]);

    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("notes.dbf");
    std::fs::File::create(&path)
        .and_then(|mut f| f.write_all(&bytes))
        .expect("write fixture");

    let provider = RecordingMemo {
        memos: [(8, "first note".to_string()), (11, "second note".to_string())]
            .into_iter()
            .collect(),
        seen: RefCell::new(Vec::new()),
    };
    let reader = DbfReader::open(&path, DecodeOptions::default()).expect("open file");
    let values: Vec<FieldValue> = reader
        .records_with_memo(&provider)
        .map(|r| r.expect("record").get("NOTES").cloned().expect("NOTES column"))
        .collect();

    assert_eq!(
        values,
        vec![
            FieldValue::Text("first note".into()),
            FieldValue::Null,
            FieldValue::Text("second note".into()),
            FieldValue::Null,
        ]
    );
    let source = path.display().to_string();
    assert_eq!(
        *provider.seen.borrow(),
        vec![(source.clone(), 8), (source.clone(), 11), (source, 99)]
    );
    dir.close().expect("remove temp dir");
}

#[test]
fn timestamps_follow_the_configured_format() {
    let fields: &[FieldSpec] = &[("STAMP", b'T', 8, 0)];
    let record = |jdn: u32, millis: u32| {
        let mut r = vec![b' '];
        r.extend_from_slice(&jdn.to_le_bytes());
        r.extend_from_slice(&millis.to_le_bytes());
        r
    };
    let bytes = fixture_table(fields, &[record(2_460_370, 3_600_000 + 1_500), record(0, 0)]);

    let date_only = open_bytes(bytes.clone()).read_all().expect("read records");
    assert_eq!(date_only[0].get("STAMP"), Some(&FieldValue::Date("2024-02-29".into())));
    assert_eq!(date_only[1].get("STAMP"), Some(&FieldValue::Null));

    let options = DecodeOptions { timestamps: TimestampFormat::DateTime };
    let with_time = DbfReader::from_reader(Cursor::new(bytes), "stamps", options)
        .expect("open")
        .read_all()
        .expect("read records");
    assert_eq!(
        with_time[0].get("STAMP"),
        Some(&FieldValue::Date("2024-02-29T01:00:01.500".into()))
    );
}

#[test]
fn mixed_field_types() {
    let fields: &[FieldSpec] = &[
        ("AMOUNT", b'N', 8, 2),
        ("RATIO", b'B', 8, 0),
        ("PRICE", b'Y', 8, 4),
        ("BORN", b'D', 8, 0),
    ];
    let mut record = vec![b' '];
    record.extend_from_slice(b"  123.45");
    record.extend_from_slice(&0.125f64.to_le_bytes());
    record.extend_from_slice(&123_456_789i64.to_le_bytes());
    record.extend_from_slice(b"19991231");

    let records = open_bytes(fixture_table(fields, &[record])).read_all().expect("read records");
    let r = &records[0];
    assert_eq!(r.get("AMOUNT"), Some(&FieldValue::Number(123.45)));
    assert_eq!(r.get("RATIO"), Some(&FieldValue::Number(0.125)));
    assert_eq!(r.get("PRICE"), Some(&FieldValue::Number(12345.6789)));
    assert_eq!(r.get("BORN"), Some(&FieldValue::Date("1999-12-31".into())));
}

#[test]
fn records_serialize_as_flat_objects() {
    let bytes = fixture_table(ID_NAME_FIELDS, &[id_name_record(true, 7, "Zed")]);
    let records = open_bytes(bytes).read_all().expect("read records");
    let json = serde_json::to_value(&records[0]).expect("serialize");
    assert_eq!(
        json,
        serde_json::json!({ "@sequenceNumber": 1, "@deleted": true, "ID": 7.0, "NAME": "Zed" })
    );
}
