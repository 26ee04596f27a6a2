// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Custom names, skipped fields, opaque types and relation options.

use std::net::IpAddr;

use persist_derive::{Entity, Identifiable, PredicateBuilder, SortBuilder};

#[derive(Clone, Debug, PartialEq, Entity)]
#[entity(name = "Device")]
pub struct DeviceEntity {
    #[id]
    pub serial:  String,
    pub address: IpAddr,
    pub aliases: Vec<IpAddr>,
    pub port:    u16,
    pub owner:   Option<OwnerEntity>,

    #[relation(delete_rule = "nullify", keep_orphans)]
    pub peers: Option<Vec<PeerEntity>>,

    #[field(skip)]
    pub cached: Vec<u8>
}

#[derive(Clone, Debug, PartialEq, Entity)]
pub struct OwnerEntity {
    pub name: String
}

#[derive(Clone, Debug, PartialEq, Entity)]
pub struct PeerEntity {
    #[id]
    pub id: String
}

fn main() {
    assert_eq!(<DeviceEntity as Entity>::ENTITY_NAME, "Device");
    assert_eq!(<DeviceEntity as Identifiable>::ID_KEY, "serial");
    assert_eq!(<PeerEntity as Entity>::ENTITY_NAME, "Peer");

    let device = DeviceEntity {
        serial:  "d1".to_string(),
        address: "127.0.0.1".parse().unwrap(),
        aliases: Vec::new(),
        port:    8080,
        owner:   None,
        peers:   None,
        cached:  vec![1, 2, 3]
    };
    assert_eq!(device.id(), "d1");
    assert_eq!(device.identity(), Some("d1"));

    let root = DeviceEntityPredicateBuilder::root();
    let filter = root.owner().name().equals("ops")
        | root.peers().id().is_in(["a", "b"])
        | root.port().greater_than(1024u16);
    assert!(filter.to_string().contains("peers.id"));

    let sort = DeviceEntitySortBuilder::root().owner().name().ascending();
    assert_eq!(sort.key(), "owner.name");
}
