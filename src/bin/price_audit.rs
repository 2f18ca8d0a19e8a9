//! Re-checks the arbitrage invariant over an updated equipment file: for
//! every item, the lowest buy price across cities must not undercut the
//! highest sell price anywhere.

use merchantry::merchant::generate::parse_city_price_map;
use merchantry::tables::equipment::EquipmentFile;
use std::path::Path;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let path = args
        .get(1)
        .map(String::as_str)
        .unwrap_or("data/output/workCopyEquipment_extended.csv");

    let file = match EquipmentFile::load(Path::new(path)) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("price_audit: {}", err);
            std::process::exit(2);
        }
    };

    let mut checked = 0usize;
    let mut violations = 0usize;
    for (idx, row) in file.rows.iter().enumerate() {
        let name = file.name(row).unwrap_or("?");
        let buy_map = parse_city_price_map(file.field(row, "Buy").unwrap_or(""));
        let sell_map = parse_city_price_map(file.field(row, "Sell").unwrap_or(""));
        let Some(min_buy) = buy_map.values().min().copied() else {
            continue;
        };
        let Some(max_sell) = sell_map.values().max().copied() else {
            continue;
        };
        checked += 1;
        if min_buy < max_sell {
            violations += 1;
            let buy_city = buy_map
                .iter()
                .find(|(_, &price)| price == min_buy)
                .map(|(city, _)| city.as_str())
                .unwrap_or("?");
            let sell_city = sell_map
                .iter()
                .find(|(_, &price)| price == max_sell)
                .map(|(city, _)| city.as_str())
                .unwrap_or("?");
            println!(
                "row {}: {} buys for {} in {} but sells for {} in {}",
                idx + 2,
                name,
                min_buy,
                buy_city,
                max_sell,
                sell_city
            );
        }
    }

    println!(
        "price_audit: {} rows with prices checked, {} violations",
        checked, violations
    );
    if violations > 0 {
        std::process::exit(1);
    }
}
