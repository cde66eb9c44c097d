use korm::{
    from_element, from_str, parse, to_element, to_string, to_string_pretty,
    to_string_with_options, Element, KormOptions, Scalar,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct User {
    id: u32,
    name: String,
    active: bool,
    tags: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Product {
    sku: String,
    price: f64,
    quantity: u32,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Order {
    order_id: u32,
    customer: User,
    items: Vec<Product>,
    total: f64,
}

fn order() -> Order {
    Order {
        order_id: 12345,
        customer: User {
            id: 123,
            name: "Alice".to_string(),
            active: true,
            tags: vec!["vip".to_string()],
        },
        items: vec![
            Product {
                sku: "WIDGET-001".to_string(),
                price: 29.99,
                quantity: 2,
            },
            Product {
                sku: "GADGET-002".to_string(),
                price: 49.99,
                quantity: 1,
            },
        ],
        total: 109.97,
    }
}

#[test]
fn test_simple_struct() {
    let user = User {
        id: 123,
        name: "Alice".to_string(),
        active: true,
        tags: vec!["admin".to_string(), "developer".to_string()],
    };

    let text = to_string(&user).unwrap();
    println!("User Korm: {}", text);

    let user_back: User = from_str(&text).unwrap();
    assert_eq!(user, user_back);
}

#[test]
fn test_nested_struct() {
    let order = order();
    let text = to_string_pretty(&order).unwrap();
    println!("Order Korm:\n{}", text);

    assert_eq!(
        text,
        "order_id: 12345\n\
         customer: {\n  id: 123\n  name: \"Alice\"\n  active: true\n  tags: [\"vip\"]\n}\n\
         items: [\n  {\n    sku: \"WIDGET-001\"\n    price: 29.99\n    quantity: 2\n  },\n  \
         {\n    sku: \"GADGET-002\"\n    price: 49.99\n    quantity: 1\n  }\n]\n\
         total: 109.97"
    );

    let order_back: Order = from_str(&text).unwrap();
    assert_eq!(order, order_back);
}

#[test]
fn test_array_of_objects() {
    let products = vec![
        Product {
            sku: "A001".to_string(),
            price: 10.99,
            quantity: 5,
        },
        Product {
            sku: "B002".to_string(),
            price: 15.99,
            quantity: 3,
        },
    ];

    let text = to_string(&products).unwrap();
    assert_eq!(
        text,
        "[{ sku:\"A001\" price:10.99 quantity:5 }, { sku:\"B002\" price:15.99 quantity:3 }]"
    );

    let products_back: Vec<Product> = from_str(&text).unwrap();
    assert_eq!(products, products_back);
}

#[test]
fn test_primitives() {
    assert_roundtrip(&42i32);
    assert_roundtrip(&3.5f64);
    assert_roundtrip(&true);
    assert_roundtrip(&false);
    assert_roundtrip(&'x');
    assert_roundtrip(&"hello world".to_string());
    assert_roundtrip(&vec![1, 2, 3, 4, 5]);
    assert_roundtrip(&(1u8, "two".to_string(), 3.0f32));
}

#[test]
fn test_every_preset_reads_back() {
    let order = order();
    for options in [KormOptions::none(), KormOptions::min(), KormOptions::max()] {
        let text = to_string_with_options(&order, options.clone()).unwrap();
        let order_back: Order = from_str(&text).unwrap();
        assert_eq!(order, order_back, "options {:?} wrote {}", options, text);
    }

    let wide = KormOptions::max().with_indent(4);
    let text = to_string_with_options(&order, wide).unwrap();
    assert!(text.contains("\n    id: 123,"));
    assert_eq!(from_str::<Order>(&text).unwrap(), order);
}

#[test]
fn test_to_element() {
    let user = User {
        id: 123,
        name: "Alice".to_string(),
        active: true,
        tags: vec!["admin".to_string()],
    };

    let element = to_element(&user).unwrap();
    let entries = element.as_hash().unwrap();
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[0].key().raw, "id");
    assert_eq!(entries[0].as_scalar(), Some(&Scalar::Int(123)));
    assert_eq!(
        entries[1].as_scalar(),
        Some(&Scalar::Text("Alice".to_string()))
    );
    assert_eq!(entries[2].as_scalar(), Some(&Scalar::Bool(true)));

    let tags = entries[3].as_list().unwrap();
    assert_eq!(tags, [Element::Scalar(Scalar::Text("admin".to_string()))]);

    assert_eq!(from_element::<User>(&element).unwrap(), user);
}

#[test]
fn test_empty_collections() {
    let empty_vec: Vec<i32> = vec![];
    assert_eq!(to_string(&empty_vec).unwrap(), "[ ]");
    assert_roundtrip(&empty_vec);

    let empty_map: BTreeMap<String, i32> = BTreeMap::new();
    assert_eq!(to_string(&empty_map).unwrap(), "{ }");
    assert_roundtrip(&empty_map);

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Empty {}

    assert_eq!(to_string(&Empty {}).unwrap(), "");
    assert_roundtrip(&Empty {});
}

#[test]
fn test_special_strings() {
    let special_strings = vec![
        "".to_string(),
        "hello, world".to_string(),
        "line1\nline2".to_string(),
        "tab\there".to_string(),
        " leading space".to_string(),
        "trailing space ".to_string(),
        "true".to_string(),
        "null".to_string(),
        "123".to_string(),
        "3.5".to_string(),
        "\"quoted\"".to_string(),
        "back\\slash".to_string(),
        "`tick`".to_string(),
        "{ x: 1 }".to_string(),
        "// not a comment".to_string(),
    ];

    for s in special_strings {
        println!("Testing string: {:?}", s);
        assert_roundtrip(&s);
    }
}

#[test]
fn test_numbers() {
    assert_roundtrip(&0i8);
    assert_roundtrip(&127i8);
    assert_roundtrip(&-128i8);
    assert_roundtrip(&32767i16);
    assert_roundtrip(&-32768i16);
    assert_roundtrip(&2147483647i32);
    assert_roundtrip(&-2147483648i32);
    assert_roundtrip(&9223372036854775807i64);
    assert_roundtrip(&-9223372036854775808i64);

    assert_roundtrip(&255u8);
    assert_roundtrip(&65535u16);
    assert_roundtrip(&4294967295u32);
    assert_roundtrip(&u64::MAX);
    assert_roundtrip(&i128::MIN);
    assert_roundtrip(&u128::MAX);

    assert_roundtrip(&0.0f32);
    assert_roundtrip(&-2.5f32);
    assert_roundtrip(&4.25f64);
    assert_roundtrip(&1e-7f64);
    assert_roundtrip(&1e300f64);
}

#[test]
fn test_enums_and_options() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    enum Status {
        Active,
        Suspended { days: u16 },
        Renamed(String),
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Account {
        status: Status,
        history: Vec<Status>,
        note: Option<String>,
    }

    let account = Account {
        status: Status::Suspended { days: 3 },
        history: vec![Status::Active, Status::Renamed("sx".to_string())],
        note: None,
    };
    let text = to_string(&account).unwrap();
    assert_eq!(
        text,
        "status:{ Suspended:{ days:3 } } history:[Active, { Renamed:\"sx\" }]"
    );
    assert_eq!(from_str::<Account>(&text).unwrap(), account);

    assert_roundtrip(&Status::Active);
    assert_roundtrip(&Status::Renamed("x".to_string()));
    assert_roundtrip(&Some(5u8));
    assert_roundtrip(&None::<u8>);
}

#[test]
fn test_maps() {
    let mut scores: HashMap<String, Vec<u32>> = HashMap::new();
    scores.insert("alice".to_string(), vec![10, 20]);
    scores.insert("bob smith".to_string(), vec![]);
    assert_roundtrip(&scores);

    let mut by_id: BTreeMap<i64, bool> = BTreeMap::new();
    by_id.insert(-3, true);
    by_id.insert(7, false);
    assert_eq!(to_string(&by_id).unwrap(), "{ -3:true 7:false }");
    assert_roundtrip(&by_id);
}

#[test]
fn test_document_extracted_repeatedly() {
    let document = parse("id: 1 name: \"Alice\" active: true tags: [\"x\"]").unwrap();
    let first: User = document.extract().unwrap();
    let second: User = document.extract().unwrap();
    assert_eq!(first, second);

    let as_map: BTreeMap<String, korm::Element> = document.extract().unwrap();
    assert_eq!(as_map.len(), 4);
    assert_eq!(document.extract_as::<Vec<u8>>(), None);
}

fn assert_roundtrip<T>(original: &T)
where
    T: Serialize + for<'de> Deserialize<'de> + PartialEq + std::fmt::Debug,
{
    let text = to_string(original).unwrap();
    let deserialized: T = from_str(&text).unwrap();
    assert_eq!(*original, deserialized);
}
