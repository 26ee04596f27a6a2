// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Service module with an explicit model name and custom queries.

use persist_derive::{StoreConfig, persistence_service};

#[persistence_service(model = "Inventory")]
pub mod stock {
    use persist_derive::{Entity, QuerySpec, query};

    #[derive(Clone, Debug, PartialEq, Entity)]
    pub struct ItemEntity {
        #[id]
        pub sku:      String,
        pub quantity: i32,
        pub bin:      Option<BinEntity>
    }

    #[derive(Clone, Debug, PartialEq, Entity)]
    pub struct BinEntity {
        pub label: String
    }

    /// Items running low.
    #[query]
    pub fn low_stock(threshold: i32) -> QuerySpec<ItemEntity> {
        QuerySpec::<ItemEntity>::new()
            .filter(|i| i.quantity().less_than(threshold))
            .sort(|s| [s.quantity().ascending(), s.sku().ascending()])
    }

    /// Items stored in a labelled bin.
    #[query]
    pub fn in_bin(label: String) -> QuerySpec<ItemEntity> {
        QuerySpec::<ItemEntity>::new().filter(|i| i.bin().label().equals(label))
    }
}

use stock::StockService;

fn main() {
    assert_eq!(stock::MODEL_NAME, "Inventory");
    assert_eq!(stock::schema().entities().len(), 2);

    let client = stock::open(StoreConfig::in_memory()).unwrap();
    futures::executor::block_on(client.add_or_update_item(vec![stock::ItemEntity {
        sku:      "a-1".to_string(),
        quantity: 2,
        bin:      Some(stock::BinEntity {
            label: "north".to_string()
        })
    }]));

    assert_eq!(client.low_stock(5).execute().len(), 1);
    assert_eq!(client.in_bin("north".to_string()).execute().len(), 1);
    assert!(client.in_bin("south".to_string()).execute().is_empty());
}
