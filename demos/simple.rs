//! Basic Korm serialization and deserialization.
//!
//! Run with: cargo run --example simple

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct User {
    id: u32,
    name: String,
    email: String,
    active: bool,
    grade: char,
}

fn main() -> Result<(), Box<dyn Error>> {
    let user = User {
        id: 123,
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
        active: true,
        grade: 'A',
    };

    let korm = korm::to_string(&user)?;
    println!("Compact:\n{}\n", korm);

    let pretty = korm::to_string_pretty(&user)?;
    println!("Pretty:\n{}\n", pretty);

    let back: User = korm::from_str(&pretty)?;
    assert_eq!(user, back);
    println!("Round trip: {:?}\n", back);

    // Entries may appear in any order, with or without braces and commas.
    let shuffled: User = korm::from_str(
        "{ grade: 'A', active: true, email: \"alice@example.com\", name: \"Alice\", id: 123 }",
    )?;
    assert_eq!(user, shuffled);

    let mut scores = BTreeMap::new();
    scores.insert(1, vec![90, 85]);
    scores.insert(2, vec![70]);
    println!("Integer keyed map: {}\n", korm::to_string(&scores)?);

    let document = korm::parse("// inventory\nitems: [\"bolt\", \"nut\"] count: 2")?;
    for node in document.nodes() {
        println!("entry {}", node);
    }
    let items: Vec<String> = korm::from_element(&document.nodes()[0].clone().into_element())?;
    println!("items: {:?}", items);

    Ok(())
}
