//! Customizing Korm output with KormOptions.
//!
//! Run with: cargo run --example writer_options

use korm::{to_string_with_options, KormOptions};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
struct Cell {
    row: u8,
    col: u8,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Sheet {
    title: String,
    owner: Option<String>,
    widths: Vec<u16>,
    cells: BTreeMap<Cell, String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut cells = BTreeMap::new();
    cells.insert(Cell { row: 0, col: 0 }, "name".to_string());
    cells.insert(Cell { row: 0, col: 1 }, "total".to_string());

    let sheet = Sheet {
        title: "Budget".to_string(),
        owner: None,
        widths: vec![12, 8, 8],
        cells,
    };

    let presets = [
        ("none", KormOptions::none()),
        ("min", KormOptions::min()),
        ("max", KormOptions::max()),
    ];
    for (label, options) in presets {
        let text = to_string_with_options(&sheet, options)?;
        println!("{}:\n{}\n", label, text);

        let back: Sheet = korm::from_str(&text)?;
        assert_eq!(sheet, back);
    }

    // Pick individual branches on top of a preset.
    let custom = KormOptions::none()
        .with_space_after_assign(true)
        .with_hash_entry_on_new_line(true)
        .with_list_entry_on_new_line(true)
        .with_serialize_nulls(true)
        .with_indent(4);
    println!("custom:\n{}", to_string_with_options(&sheet, custom)?);

    Ok(())
}
