//! Registering custom readers, writers, positional shapes and comments on a
//! `Korm` engine.
//!
//! Run with: cargo run --example custom_codec

use korm::{Element, Korm, KormOptions, KormType, Scalar};
use serde::{Deserialize, Serialize};
use std::error::Error;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Version {
    major: u32,
    minor: u32,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "UPPERCASE")]
enum Day {
    Monday,
    Friday,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Shift {
    worker: String,
    day: Day,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Release {
    name: String,
    version: Version,
    shifts: Vec<Shift>,
}

fn engine() -> Korm {
    let mut korm = Korm::with_options(KormOptions::min());

    korm.codec_for(
        |_, entries: &[KormType]| {
            let text = entries.first()?.as_scalar()?.as_str()?;
            let (major, minor) = text.split_once('.')?;
            Some(Version {
                major: major.parse().ok()?,
                minor: minor.parse().ok()?,
            })
        },
        |_, version: &Version| {
            Ok(Element::Scalar(Scalar::Text(format!(
                "{}.{}",
                version.major, version.minor
            ))))
        },
    );

    korm.as_list::<Shift>(&["day", "worker"])
        .comment::<Release>(&["Release manifest"])
        .comment_field::<Release>("shifts", &["who is on call"]);

    korm
}

fn main() -> Result<(), Box<dyn Error>> {
    let korm = engine();

    let release = Release {
        name: "spring".to_string(),
        version: Version { major: 1, minor: 4 },
        shifts: vec![
            Shift {
                worker: "Sxtanna".to_string(),
                day: Day::Monday,
            },
            Shift {
                worker: "Emiliee".to_string(),
                day: Day::Friday,
            },
        ],
    };

    let text = korm.push(&release)?;
    println!("With codecs:\n{}\n", text);

    let back: Release = korm.pull(&text)?;
    assert_eq!(release, back);

    println!("Without codecs:\n{}\n", korm::to_string_pretty(&release)?);

    // Named entries still read through a positional shape.
    let shift: Shift = korm.pull("worker: \"Ranald\" day: MONDAY")?;
    println!("Named shift: {:?}", shift);

    match korm.pull::<Release>("name: \"bad\" version: \"one\" shifts: [ ]") {
        Ok(release) => println!("Unexpected: {:?}", release),
        Err(e) => println!("Rejected malformed version: {}", e),
    }

    Ok(())
}
