//! Integration tests for header-mode decoding.

use chrono::{NaiveDate, NaiveDateTime};
use rowbind_core::{CsvRowSource, DecodeStatus, Decoder, DecoderConfig, Record};

const CSV_WITH_HEADER: &str = "id,first_name,last_name,username,created_at
1,\"Rob\",\"Pike\",rob,\"2010-01-27 00:00:00\"
2,Ken,Thompson,ken,\"2010-01-27 00:00:00\"
3,\"Gustavo\",\"Lopes\",\"lopes-gustavo\",\"2010-01-27 00:00:00\"
";

#[derive(Debug, Default, Record)]
struct User {
    #[csv(name = "id")]
    id: i64,
    #[csv(name = "first_name")]
    first_name: String,
    #[csv(name = "last_name")]
    last_name: String,
    #[csv(name = "username")]
    username: String,
    #[csv(name = "created_at")]
    created_at: NaiveDateTime,
}

fn config() -> DecoderConfig {
    DecoderConfig::default()
        .with_header_mode(true)
        .with_time_layout("%Y-%m-%d %H:%M:%S")
}

fn decoder(data: &str) -> Decoder<CsvRowSource<&[u8]>> {
    Decoder::new(CsvRowSource::from_reader(data.as_bytes()), config()).unwrap()
}

fn midnight(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap()
}

#[test]
fn test_read_one_line() {
    let mut decoder = decoder(CSV_WITH_HEADER);
    let mut user = User::default();

    let status = decoder.decode_next(&mut user).unwrap();

    assert_eq!(status, DecodeStatus::Decoded);
    assert_eq!(user.id, 1);
    assert_eq!(user.first_name, "Rob");
    assert_eq!(user.last_name, "Pike");
    assert_eq!(user.username, "rob");
    assert_eq!(user.created_at, midnight(2010, 1, 27));
}

#[test]
fn test_header_is_exposed() {
    let decoder = decoder(CSV_WITH_HEADER);
    let header: Vec<&str> = decoder
        .header()
        .unwrap()
        .iter()
        .map(String::as_str)
        .collect();
    assert_eq!(header, ["id", "first_name", "last_name", "username", "created_at"]);
}

#[test]
fn test_read_two_lines_into_fresh_records() {
    let mut decoder = decoder(CSV_WITH_HEADER);

    let mut first = User::default();
    decoder.decode_next(&mut first).unwrap();
    let mut second = User::default();
    decoder.decode_next(&mut second).unwrap();

    assert_eq!(first.id, 1);
    assert_eq!(second.id, 2);
    assert_eq!(second.first_name, "Ken");
    assert_eq!(second.last_name, "Thompson");
    assert_eq!(second.username, "ken");
}

#[test]
fn test_record_can_be_reused() {
    let mut decoder = decoder(CSV_WITH_HEADER);
    let mut user = User::default();

    decoder.decode_next(&mut user).unwrap();
    assert_eq!(user.username, "rob");

    decoder.decode_next(&mut user).unwrap();
    assert_eq!(user.id, 2);
    assert_eq!(user.first_name, "Ken");
    assert_eq!(user.username, "ken");
}

#[test]
fn test_end_of_stream_after_last_row() {
    let mut decoder = decoder(CSV_WITH_HEADER);
    let mut user = User::default();

    for expected in 1..=3 {
        assert_eq!(decoder.decode_next(&mut user).unwrap(), DecodeStatus::Decoded);
        assert_eq!(user.id, expected);
    }
    assert_eq!(decoder.decode_next(&mut user).unwrap(), DecodeStatus::EndOfStream);
    assert!(decoder.is_exhausted());
    assert_eq!(decoder.rows_read(), 3);
}

#[test]
fn test_end_of_stream_is_repeatable() {
    let mut decoder = decoder(CSV_WITH_HEADER);
    let mut user = User::default();
    while decoder.decode_next(&mut user).unwrap() == DecodeStatus::Decoded {}

    for _ in 0..5 {
        assert_eq!(decoder.decode_next(&mut user).unwrap(), DecodeStatus::EndOfStream);
    }
    assert_eq!(user.id, 3);
}

#[test]
fn test_columns_without_fields_are_ignored() {
    #[derive(Debug, Default, Record)]
    struct Partial {
        #[csv(name = "id")]
        id: i64,
        #[csv(name = "first_name")]
        first_name: String,
    }

    let mut decoder = decoder(CSV_WITH_HEADER);
    let mut partial = Partial::default();
    decoder.decode_next(&mut partial).unwrap();

    assert_eq!(partial.id, 1);
    assert_eq!(partial.first_name, "Rob");
}

#[test]
fn test_unannotated_field_is_left_untouched() {
    #[derive(Debug, Default, Record)]
    struct Partial {
        #[csv(name = "id")]
        id: i64,
        #[csv(name = "first_name")]
        first_name: String,
        last_name: String,
    }

    let mut decoder = decoder(CSV_WITH_HEADER);
    let mut partial = Partial {
        last_name: "unchanged".to_string(),
        ..Partial::default()
    };
    decoder.decode_next(&mut partial).unwrap();

    assert_eq!(partial.id, 1);
    assert_eq!(partial.last_name, "unchanged");
}

#[test]
fn test_annotation_without_matching_column_is_ignored() {
    #[derive(Debug, Default, Record)]
    struct Partial {
        #[csv(name = "id")]
        id: i64,
        #[csv(name = "not_found")]
        last_name: String,
    }

    let mut decoder = decoder(CSV_WITH_HEADER);
    let mut partial = Partial::default();
    decoder.decode_next(&mut partial).unwrap();

    assert_eq!(partial.id, 1);
    assert_eq!(partial.last_name, "");
}

#[test]
fn test_ignored_fields() {
    #[derive(Debug, Default, Record)]
    struct Partial {
        #[csv(name = "id")]
        id: i64,
        #[csv(name = "-")]
        username: String,
        #[csv(skip)]
        last_name: String,
    }

    let mut decoder = decoder(CSV_WITH_HEADER);
    let mut partial = Partial::default();
    decoder.decode_next(&mut partial).unwrap();

    assert_eq!(partial.id, 1);
    assert_eq!(partial.username, "");
    assert_eq!(partial.last_name, "");
}

#[test]
fn test_column_order_does_not_matter() {
    let data = "created_at,username,id,last_name,first_name\n\
                2010-01-27 00:00:00,rob,1,Pike,Rob\n";
    let mut decoder = decoder(data);
    let mut user = User::default();
    decoder.decode_next(&mut user).unwrap();

    assert_eq!(user.id, 1);
    assert_eq!(user.first_name, "Rob");
    assert_eq!(user.created_at, midnight(2010, 1, 27));
}

#[test]
fn test_booleans_and_nullable_fields() {
    #[derive(Debug, Default, Record)]
    struct Flags {
        #[csv(name = "name")]
        name: String,
        #[csv(name = "active")]
        active: bool,
        #[csv(name = "score")]
        score: Option<i32>,
        #[csv(name = "seen")]
        seen: Option<NaiveDateTime>,
    }

    let data = "name,active,score,seen\n\
                a,1,10,2010-01-27 00:00:00\n\
                b,yes,NULL,null\n\
                c,true,-3,NULL\n";
    let mut decoder = decoder(data);

    let mut flags = Flags::default();
    decoder.decode_next(&mut flags).unwrap();
    assert!(flags.active);
    assert_eq!(flags.score, Some(10));
    assert_eq!(flags.seen, Some(midnight(2010, 1, 27)));

    decoder.decode_next(&mut flags).unwrap();
    assert_eq!(flags.name, "b");
    assert!(!flags.active);
    assert_eq!(flags.score, None);
    assert_eq!(flags.seen, None);

    decoder.decode_next(&mut flags).unwrap();
    assert!(flags.active);
    assert_eq!(flags.score, Some(-3));
}

#[test]
fn test_custom_boolean_literals() {
    #[derive(Debug, Default, Record)]
    struct Toggle {
        #[csv(name = "on")]
        on: bool,
    }

    let config = config().with_boolean_literals(["yes", "Y"]);
    let source = CsvRowSource::from_reader("on\nyes\n1\nY\n".as_bytes());
    let mut decoder = Decoder::new(source, config).unwrap();

    let mut toggle = Toggle::default();
    let mut seen = Vec::new();
    while decoder.decode_next(&mut toggle).unwrap() == DecodeStatus::Decoded {
        seen.push(toggle.on);
    }
    assert_eq!(seen, vec![true, false, true]);
}
