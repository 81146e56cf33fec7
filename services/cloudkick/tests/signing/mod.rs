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

use std::sync::Arc;

use cloudkick_api::{string_to_sign, Args, ArgumentSpec, CallDescriptor, PathPrefix, Registry};
use cloudkick_core::hash::base64_hmac_sha1;
use http::{Method, StatusCode};
use pretty_assertions::assert_eq;

use crate::{client, Recorded, StubHttpSend, SECRET};

fn oauth(params: &[(String, String)]) -> Vec<(&str, &str)> {
    params
        .iter()
        .filter(|(k, _)| k.starts_with("oauth_"))
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect()
}

/// Recompute the signature of a recorded request from its parameters.
fn verify(req: &Recorded, params: Vec<(String, String)>) -> anyhow::Result<()> {
    let (signature, params): (Vec<_>, Vec<_>) =
        params.into_iter().partition(|(k, _)| k == "oauth_signature");
    let base_url = format!("https://api.cloudkick.com{}", req.path);

    let expected = base64_hmac_sha1(
        format!("{SECRET}&").as_bytes(),
        string_to_sign(&req.method, &base_url, params)?.as_bytes(),
    );
    assert_eq!(vec![("oauth_signature".to_string(), expected)], signature);
    Ok(())
}

#[tokio::test]
async fn test_get_signature() -> anyhow::Result<()> {
    let stub = StubHttpSend::new(StatusCode::OK, "[]");

    client(&stub)
        .nodes(Args::from([("query", "node:web 1")]))
        .await?;

    let req = &stub.requests()[0];
    assert_eq!(Method::GET, req.method);
    assert_eq!(
        "https://api.cloudkick.com/2.0/nodes?query=node%3Aweb%201\
         &oauth_consumer_key=abc123&oauth_nonce=nonce0123\
         &oauth_signature_method=HMAC-SHA1&oauth_timestamp=1660582212\
         &oauth_version=1.0&oauth_signature=6kbHeX7m5anUoHtkgjmXhh5YhMI%3D",
        req.uri
    );
    assert!(req.body.is_empty());
    assert_eq!(None, req.content_type);
    Ok(())
}

#[tokio::test]
async fn test_post_signature() -> anyhow::Result<()> {
    let stub = StubHttpSend::new(StatusCode::OK, "{\"id\": \"n1\"}");

    client(&stub)
        .create_node(Args::from([("name", "web 1"), ("ip_address", "10.0.0.1")]))
        .await?;

    let req = &stub.requests()[0];
    assert_eq!(Method::POST, req.method);
    assert_eq!("https://api.cloudkick.com/2.0/nodes", req.uri);
    assert_eq!(
        Some("application/x-www-form-urlencoded".to_string()),
        req.content_type
    );
    verify(req, req.form())?;
    assert_eq!(
        vec![("name", "web 1"), ("ipaddress", "10.0.0.1")],
        req.form()
            .iter()
            .filter(|(k, _)| !k.starts_with("oauth_"))
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect::<Vec<_>>()
    );
    Ok(())
}

#[tokio::test]
async fn test_query_params_of_post_stay_in_url() -> anyhow::Result<()> {
    const CALLS: &[CallDescriptor] = &[CallDescriptor {
        version: "2.0",
        name: "annotate",
        endpoint: "node/{node_id}/annotate",
        prefix: PathPrefix::Version,
        description: "Annotate a node",
        arguments: &[
            ArgumentSpec::url("node_id", "Node id"),
            ArgumentSpec::query("dry_run", "Only validate"),
            ArgumentSpec::post("note", "Annotation").required(),
        ],
    }];
    let registry = Arc::new(Registry::new(CALLS.iter().copied())?);
    let stub = StubHttpSend::new(StatusCode::OK, "{}");

    client(&stub)
        .with_registry(registry)
        .call(
            "annotate",
            Args::from([("node_id", "n1"), ("dry_run", "1"), ("note", "disk")]),
        )
        .await?;

    let req = &stub.requests()[0];
    assert_eq!(Method::POST, req.method);
    assert_eq!("/2.0/node/n1/annotate", req.path);
    assert_eq!(vec![("dry_run".to_string(), "1".to_string())], req.query);

    let mut params = req.query.clone();
    params.extend(req.form());
    verify(req, params)?;
    Ok(())
}

#[tokio::test]
async fn test_get_and_post_differ_only_in_placement() -> anyhow::Result<()> {
    const CALLS: &[CallDescriptor] = &[
        CallDescriptor {
            version: "2.0",
            name: "find_tag",
            endpoint: "tag",
            prefix: PathPrefix::Version,
            description: "Find a tag",
            arguments: &[
                ArgumentSpec::query("name", "Tag name").required(),
                ArgumentSpec::query("color", "Tag color"),
            ],
        },
        CallDescriptor {
            version: "2.0",
            name: "save_tag",
            endpoint: "tag",
            prefix: PathPrefix::Version,
            description: "Save a tag",
            arguments: &[
                ArgumentSpec::post("name", "Tag name").required(),
                ArgumentSpec::post("color", "Tag color"),
            ],
        },
    ];
    let registry = Arc::new(Registry::new(CALLS.iter().copied())?);
    let stub = StubHttpSend::new(StatusCode::OK, "{}");
    let client = client(&stub).with_registry(registry);
    let args = Args::from([("name", "prod db"), ("color", "red/blue")]);

    client.call("find_tag", args.clone()).await?;
    client.call("save_tag", args).await?;

    let requests = stub.requests();
    let (get, post) = (&requests[0], &requests[1]);
    assert_eq!(Method::GET, get.method);
    assert_eq!(Method::POST, post.method);
    assert_eq!(get.path, post.path);

    assert!(get.body.is_empty());
    assert!(post.query.is_empty());
    let get_params: Vec<_> = get
        .query
        .iter()
        .filter(|(k, _)| k != "oauth_signature")
        .cloned()
        .collect();
    let post_params: Vec<_> = post
        .form()
        .into_iter()
        .filter(|(k, _)| k != "oauth_signature")
        .collect();
    assert_eq!(get_params, post_params);
    assert_eq!(oauth(&get.query).len(), oauth(&post.form()).len());

    verify(get, get.query.clone())?;
    verify(post, post.form())?;
    Ok(())
}
