// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use cloudkick_api::{Error, Inventory, ALL_NODES};
use http::StatusCode;
use pretty_assertions::assert_eq;

use crate::{client, Recorded, StubHttpSend};

const NODES: &str = r#"{"items": [
    {"id": "n1", "ipaddress": "10.0.0.1", "tags": [{"name": "web"}]},
    {"id": "n2", "ipaddress": "10.0.0.2", "tags": [{"name": "web"}, {"name": "cache"}]},
    {"id": "n3", "ipaddress": "10.0.0.3", "tags": [{"name": "db"}]}
]}"#;

const AGENTS: &str = r#"{"items": [{"id": "n4", "ipaddress": "10.0.0.4", "tags": []}]}"#;

fn respond(req: &Recorded) -> (StatusCode, &'static str) {
    match req.query.iter().find(|(k, _)| k == "query") {
        None => (StatusCode::OK, NODES),
        Some((_, q)) if q == "tag:agent" => (StatusCode::OK, AGENTS),
        Some(_) => (StatusCode::OK, r#"{"items": []}"#),
    }
}

#[tokio::test]
async fn test_hosts_and_roledefs_share_one_fetch() -> anyhow::Result<()> {
    let stub = StubHttpSend::with_responder(respond);
    let inventory = Inventory::new(client(&stub));

    assert_eq!(
        vec!["10.0.0.1", "10.0.0.2", "10.0.0.3"],
        inventory.hosts().await?
    );
    let roles = inventory.roledefs().await?;
    assert_eq!(Some(&["10.0.0.1".to_string(), "10.0.0.2".to_string()][..]), roles.get("web"));
    assert_eq!(Some(&["10.0.0.2".to_string()][..]), roles.get("cache"));

    assert_eq!(1, stub.requests().len());
    assert_eq!(1, inventory.cache().len());
    assert!(inventory.cache().get(ALL_NODES).is_some());
    Ok(())
}

#[tokio::test]
async fn test_evaluate_role_expressions() -> anyhow::Result<()> {
    let stub = StubHttpSend::with_responder(respond);
    let inventory = Inventory::new(client(&stub));

    assert_eq!(vec!["10.0.0.1", "10.0.0.2"], inventory.evaluate("web -db").await?);
    assert_eq!(vec!["10.0.0.1"], inventory.evaluate("web -cache").await?);
    assert_eq!(
        vec!["10.0.0.1", "10.0.0.2", "10.0.0.3"],
        inventory.evaluate("web +db").await?
    );
    Ok(())
}

#[tokio::test]
async fn test_resolve_falls_back_to_query() -> anyhow::Result<()> {
    let stub = StubHttpSend::with_responder(respond);
    let inventory = Inventory::new(client(&stub));

    assert_eq!(vec!["10.0.0.4"], inventory.resolve("tag:agent").await?);
    assert_eq!(vec!["10.0.0.4"], inventory.resolve("tag:agent").await?);
    // One fetch for the tag list, one for the query.
    assert_eq!(2, stub.requests().len());

    let err = inventory.evaluate("web -nothing").await.expect_err("must fail");
    assert!(matches!(err, Error::UnknownRole { role } if role == "nothing"));
    Ok(())
}

#[tokio::test]
async fn test_transport_failure_is_not_cached() {
    let stub = StubHttpSend::new(StatusCode::BAD_GATEWAY, "");
    let inventory = Inventory::new(client(&stub));

    let err = inventory.hosts().await.expect_err("must fail");
    assert!(matches!(err, Error::Transport { .. }));
    assert!(inventory.cache().is_empty());
}
