//! Tests for the `Korm` engine: custom readers and writers, positional lists,
//! comments and the reentrancy guard.

use korm::{Data, Element, Error, Korm, KormOptions, KormType, ReaderContext, Scalar};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::thread;

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
struct Point {
    x: i32,
    y: i32,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Copy)]
#[serde(rename_all = "UPPERCASE")]
enum Day {
    Monday,
    Tuesday,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Appointment {
    name: String,
    date: Day,
}

fn sentinel() -> Point {
    Point { x: -1, y: -1 }
}

#[test]
fn test_custom_reader_takes_precedence() {
    let mut korm = Korm::new();
    korm.reader_for(|_, _: &[KormType]| Some(sentinel()));

    for text in ["x: 1 y: 2", "{ x: 5 }", "[1, 2]", "\"anything\"", "42"] {
        assert_eq!(korm.pull::<Point>(text).unwrap(), sentinel(), "input {}", text);
    }

    let nested: Vec<Point> = korm.pull("[{ x: 1 y: 2 }, 7, [ ]]").unwrap();
    assert_eq!(nested, vec![sentinel(), sentinel(), sentinel()]);
}

#[test]
fn test_custom_writer_takes_precedence() {
    let mut korm = Korm::new();
    korm.writer_for(|_, _: &Point| Ok(Element::Scalar(Scalar::Symbol("ORIGIN".to_string()))));

    assert_eq!(korm.push(&Point { x: 3, y: 4 }).unwrap(), "\"ORIGIN\"");
    assert_eq!(
        korm.push(&vec![Point { x: 1, y: 1 }, Point { x: 2, y: 2 }]).unwrap(),
        "[ORIGIN, ORIGIN]"
    );
}

#[test]
fn test_as_list() {
    let mut korm = Korm::new();
    korm.as_list::<Appointment>(&[]);

    let appointment = Appointment {
        name: "Sxtanna".to_string(),
        date: Day::Monday,
    };
    let text = korm.push(&appointment).unwrap();
    assert_eq!(text, "[\"Sxtanna\", MONDAY]");

    let back: Appointment = korm.pull("[\"Sxtanna\", MONDAY]").unwrap();
    assert_eq!(back, appointment);
    assert_eq!(korm.push(&back).unwrap(), text);

    let named: Appointment = korm.pull("date: TUESDAY name: \"Emiliee\"").unwrap();
    assert_eq!(named.date, Day::Tuesday);
}

#[test]
fn test_as_list_with_order() {
    let mut korm = Korm::new();
    korm.as_list::<Appointment>(&["date", "name"]);

    let appointment = Appointment {
        name: "Sxtanna".to_string(),
        date: Day::Tuesday,
    };
    let text = korm.push(&vec![appointment]).unwrap();
    assert_eq!(text, "[[TUESDAY, \"Sxtanna\"]]");

    let back: Vec<Appointment> = korm.pull(&text).unwrap();
    assert_eq!(back[0].name, "Sxtanna");
    assert_eq!(back[0].date, Day::Tuesday);
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Roster {
    names: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Team {
    title: String,
    roster: Roster,
}

fn roster_korm() -> Korm {
    let mut korm = Korm::new();
    korm.codec_for(
        |_, entries: &[KormType]| {
            let joined = entries.first()?.as_scalar()?.as_str()?;
            Some(Roster {
                names: joined.split(',').map(str::to_string).collect(),
            })
        },
        |_, roster: &Roster| Ok(Element::Scalar(Scalar::Text(roster.names.join(",")))),
    );
    korm
}

#[test]
fn test_codec_round_trip() {
    let korm = roster_korm();
    let team = Team {
        title: "core".to_string(),
        roster: Roster {
            names: vec!["Sxtanna".to_string(), "Emiliee".to_string()],
        },
    };

    let text = korm.push(&team).unwrap();
    assert_eq!(text, "title:\"core\" roster:\"Sxtanna,Emiliee\"");
    assert_eq!(korm.pull::<Team>(&text).unwrap(), team);

    let plain = korm::to_string(&team).unwrap();
    assert_eq!(
        plain,
        "title:\"core\" roster:{ names:[\"Sxtanna\", \"Emiliee\"] }"
    );
    assert!(matches!(korm.pull::<Team>(&plain), Err(Error::Absent)));
    assert!(korm.extract_as::<Team>(&korm::parse(&plain).unwrap()).is_none());
}

#[test]
fn test_reader_can_map_nested_values() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Segment {
        from: Point,
        to: Point,
    }

    let mut korm = Korm::new();
    korm.reader_for(|ctx, entries: &[KormType]| {
        let pair: Vec<i32> = ctx.map(entries.first()?).ok()?;
        Some(Point {
            x: *pair.first()?,
            y: *pair.get(1)?,
        })
    });
    korm.reader_for(|ctx, entries: &[KormType]| {
        let from = ReaderContext::by_name(entries, "start")?;
        let to = ReaderContext::by_name(entries, "end")?;
        Some(Segment {
            from: ctx.map(from).ok()?,
            to: ctx.map(to).ok()?,
        })
    });

    let segment: Segment = korm.pull("start: [1, 2] end: [3, 4]").unwrap();
    assert_eq!(segment.from, Point { x: 1, y: 2 });
    assert_eq!(segment.to, Point { x: 3, y: 4 });
}

#[test]
fn test_reentrant_codecs_map_structurally() {
    let mut korm = Korm::new();
    korm.reader_for(|ctx, entries: &[KormType]| {
        let point: Point = ctx.map_entries(entries).ok()?;
        Some(Point {
            x: point.x * 10,
            y: point.y * 10,
        })
    });
    korm.writer_for(|ctx, point: &Point| {
        let structural = ctx.to_element(point)?;
        Ok(Element::Korm(KormType::List {
            key: Data::none(),
            data: vec![structural],
        }))
    });

    let point: Point = korm.pull("x: 1 y: 2").unwrap();
    assert_eq!(point, Point { x: 10, y: 20 });

    let points: Vec<Point> = korm.pull("[{ x: 1 y: 1 }, { x: 2 y: 2 }]").unwrap();
    assert_eq!(points, vec![Point { x: 10, y: 10 }, Point { x: 20, y: 20 }]);

    assert_eq!(korm.push(&Point { x: 1, y: 2 }).unwrap(), "[{ x:1 y:2 }]");
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Version {
    major: u8,
    minor: u8,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Release {
    name: String,
    version: Version,
}

#[test]
fn test_nested_custom_writers() {
    let mut korm = Korm::new();
    korm.writer_for(|_, version: &Version| {
        Ok(Element::Scalar(Scalar::Text(format!(
            "{}.{}",
            version.major, version.minor
        ))))
    })
    .writer_for(|ctx, release: &Release| {
        Ok(Element::Korm(KormType::List {
            key: Data::none(),
            data: vec![ctx.to_element(&release.name)?, ctx.to_element(&release.version)?],
        }))
    });

    let release = Release {
        name: "spring".to_string(),
        version: Version { major: 1, minor: 4 },
    };
    assert_eq!(korm.push(&release).unwrap(), "[\"spring\", \"1.4\"]");
    assert_eq!(
        korm.push(&vec![release]).unwrap(),
        "[[\"spring\", \"1.4\"]]"
    );
}

#[test]
fn test_custom_writer_sees_nested_writers_when_mapping_itself() {
    let mut korm = Korm::new();
    korm.writer_for(|_, version: &Version| {
        Ok(Element::Scalar(Scalar::Text(format!(
            "{}.{}",
            version.major, version.minor
        ))))
    })
    .writer_for(|ctx, release: &Release| {
        Ok(Element::Korm(KormType::List {
            key: Data::none(),
            data: vec![ctx.to_element(release)?],
        }))
    });

    let release = Release {
        name: "spring".to_string(),
        version: Version { major: 1, minor: 4 },
    };
    assert_eq!(
        korm.push(&release).unwrap(),
        "[{ name:\"spring\" version:\"1.4\" }]"
    );
}

#[test]
fn test_comments() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Config {
        host: String,
        port: u16,
    }

    let mut korm = Korm::with_options(KormOptions::min());
    korm.comment::<Config>(&["Server settings"])
        .comment_field::<Config>("port", &["tcp port", "1024 and up"]);

    let config = Config {
        host: "localhost".to_string(),
        port: 8080,
    };
    let text = korm.push(&config).unwrap();
    assert_eq!(
        text,
        "// Server settings\nhost: \"localhost\"\n// tcp port\n// 1024 and up\nport: 8080"
    );
    assert_eq!(korm.pull::<Config>(&text).unwrap(), config);

    korm.set_options(KormOptions::min().with_include_comments(false));
    assert_eq!(
        korm.push(&config).unwrap(),
        "host: \"localhost\"\nport: 8080"
    );
}

#[test]
fn test_multiline_comments_are_split() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Config {
        host: String,
        port: u16,
    }

    let mut korm = Korm::with_options(KormOptions::min());
    korm.comment_field::<Config>("port", &["first\nsecond", "third\r\nfourth"]);

    let config = Config {
        host: "localhost".to_string(),
        port: 8080,
    };
    let text = korm.push(&config).unwrap();
    assert_eq!(
        text,
        "host: \"localhost\"\n// first\n// second\n// third\n// fourth\nport: 8080"
    );
    assert_eq!(korm.pull::<Config>(&text).unwrap(), config);
}

#[test]
fn test_renamed_shapes_register_by_name() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    #[serde(rename = "Coord")]
    struct Location {
        lat: i32,
        lon: i32,
    }

    let mut korm = Korm::new();
    korm.as_list_named("Coord", &[]);
    let text = korm.push(&Location { lat: 5, lon: 6 }).unwrap();
    assert_eq!(text, "[5, 6]");
    assert_eq!(
        korm.pull::<Location>(&text).unwrap(),
        Location { lat: 5, lon: 6 }
    );
}

#[test]
fn test_shared_engine_across_threads() {
    let mut korm = Korm::new();
    korm.as_list::<Point>(&[]);
    let korm = Arc::new(korm);

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let korm = Arc::clone(&korm);
            thread::spawn(move || {
                let point = Point { x: i, y: i * 2 };
                let text = korm.push(&point).unwrap();
                korm.pull::<Point>(&text).unwrap() == point
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}
