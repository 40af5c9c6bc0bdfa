//! Builds a small map, erases one entry and prints the tree before and after.
//!
//! Set `RUST_LOG=rb_map=trace` to see every rebalancing step.

use rb_map::RBTreeMap;
use tracing_subscriber::EnvFilter;

const PEOPLE: [(i32, &str); 8] = [
    (1, "Aharon"),
    (8, "Baruch"),
    (2, "Sarah"),
    (4, "Ichak"),
    (13, "Esther"),
    (6, "Rachael"),
    (0, "Caleb"),
    (3, "Mendel"),
];

fn print_tree(title: &str, map: &RBTreeMap<i32, &str>) {
    println!("{title}");
    print!("{}", map.debug_output());
    println!("black height: {}", map.black_height());

    let report = map.check_red_black_tree_properties();
    if report.is_empty() {
        println!("red-black properties: ok");
    } else {
        print!("{report}");
    }
    println!();
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut map = RBTreeMap::new();
    for (key, name) in PEOPLE {
        map.insert(key, name);
    }
    tracing::info!(len = map.len(), "map built");
    print_tree("after inserting 8 people:", &map);

    map.erase(&4);
    tracing::info!(len = map.len(), "erased key 4");
    print_tree("after erasing 4:", &map);

    let mut cursor = map.rbegin();
    let mut names = Vec::new();
    while cursor != map.rend() {
        if let Ok((_, name)) = cursor.get() {
            names.push(*name);
        }
        cursor.move_prev();
    }
    println!("in reverse: {}", names.join(", "));
}
