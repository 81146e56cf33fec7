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

use bytes::Bytes;
use cloudkick_api::{Args, ArgumentSpec, CallDescriptor, Error, Response, BUILTIN_CALLS};
use http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::json;
use test_case::test_case;

use crate::{client, client_with, StubHttpSend};

/// A value every argument accepts.
fn valid_value(arg: &ArgumentSpec) -> &'static str {
    match (arg.valid_values.first(), arg.format) {
        (Some(&v), _) => v,
        (None, Some(_)) => "1660582212",
        (None, None) => "value",
    }
}

fn required_args(call: &CallDescriptor) -> Args {
    call.arguments
        .iter()
        .filter(|a| a.must_supply())
        .map(|a| (a.name, valid_value(a)))
        .collect()
}

fn all_args(call: &CallDescriptor) -> Args {
    call.arguments
        .iter()
        .map(|a| (a.name, valid_value(a)))
        .collect()
}

#[tokio::test]
async fn test_every_call_accepts_its_required_arguments() -> anyhow::Result<()> {
    let stub = StubHttpSend::new(StatusCode::OK, "{}");
    let client = client(&stub);

    for call in BUILTIN_CALLS {
        let resp = client
            .dispatch(call.version, call.name, required_args(call))
            .await?;
        assert_eq!(Response::Json(json!({})), resp, "call {}", call.name);

        client
            .dispatch(call.version, call.name, all_args(call))
            .await?;
    }

    assert_eq!(BUILTIN_CALLS.len() * 2, stub.requests().len());
    Ok(())
}

#[tokio::test]
async fn test_missing_required_argument_is_named() {
    let stub = StubHttpSend::new(StatusCode::OK, "{}");
    let client = client(&stub);

    for call in BUILTIN_CALLS {
        for missing in call.arguments.iter().filter(|a| a.must_supply()) {
            let args: Args = required_args(call)
                .into_iter()
                .filter(|(k, _)| k != missing.name)
                .collect();

            let err = client
                .dispatch(call.version, call.name, args)
                .await
                .expect_err("must fail");
            match err {
                Error::MissingArgument { call: c, argument } => {
                    assert_eq!(call.name, c);
                    assert_eq!(missing.name, argument);
                }
                err => panic!("call {} raised unexpected error: {err}", call.name),
            }
        }
    }

    assert!(stub.requests().is_empty(), "nothing may be sent");
}

#[tokio::test]
async fn test_value_outside_valid_values_is_rejected() {
    let stub = StubHttpSend::new(StatusCode::OK, "{}");
    let client = client(&stub);

    for call in BUILTIN_CALLS {
        for arg in call.arguments.iter().filter(|a| !a.valid_values.is_empty()) {
            let args = required_args(call).with(arg.name, "bogus");

            let err = client
                .dispatch(call.version, call.name, args)
                .await
                .expect_err("must fail");
            assert!(
                matches!(&err, Error::InvalidArgumentValue { argument, value, .. }
                    if argument == arg.name && value == "bogus"),
                "call {} raised unexpected error: {err}",
                call.name
            );
        }
    }

    assert!(stub.requests().is_empty(), "nothing may be sent");
}

#[test]
fn test_every_valid_value_passes() -> anyhow::Result<()> {
    let client = client(&StubHttpSend::new(StatusCode::OK, "{}"));

    for call in BUILTIN_CALLS {
        for arg in call.arguments.iter().filter(|a| !a.valid_values.is_empty()) {
            for value in arg.valid_values {
                let args = required_args(call).with(arg.name, *value);
                client.plan(call.version, call.name, &args)?;
            }
        }
    }
    Ok(())
}

#[test_case("five_mins"; "five minutes")]
#[test_case("one_day"; "one day")]
fn test_check_data_interval(interval: &str) -> anyhow::Result<()> {
    let client = client(&StubHttpSend::new(StatusCode::OK, "{}"));
    let args = Args::from([
        ("check", "chk1"),
        ("name", "load"),
        ("start", "2022-08-15"),
        ("end", "2022-08-15 16:50:12"),
        ("interval", interval),
    ]);

    let plan = client.plan("1.0", "check_data", &args)?;
    assert!(plan.query.contains(&("interval".to_string(), interval.to_string())));
    assert!(plan.query.contains(&("end".to_string(), "1660582212".to_string())));
    Ok(())
}

#[tokio::test]
async fn test_unknown_call() {
    let stub = StubHttpSend::new(StatusCode::OK, "{}");
    let client = client(&stub);

    for (version, name) in [("3.0", "nodes"), ("1.0", "nodes"), ("2.0", "reboot")] {
        let err = client
            .dispatch(version, name, Args::new())
            .await
            .expect_err("must fail");
        assert!(matches!(err, Error::UnknownCall { .. }));
    }
    let err = client.call("reboot", Args::new()).await.expect_err("must fail");
    assert!(err.is_validation_error());
    assert!(stub.requests().is_empty());
}

#[tokio::test]
async fn test_transport_error_on_503() {
    let stub = StubHttpSend::new(StatusCode::SERVICE_UNAVAILABLE, "{not json");
    let client = client(&stub);

    let err = client.tags(Args::new()).await.expect_err("must fail");
    match err {
        Error::Transport { status, url } => {
            assert_eq!(StatusCode::SERVICE_UNAVAILABLE, status);
            assert_eq!("https://api.cloudkick.com/1.0/tags", url);
        }
        err => panic!("unexpected error: {err}"),
    }
    assert_eq!(1, stub.requests().len());
}

#[tokio::test]
async fn test_unauthorized_is_auth_failure() {
    let stub = StubHttpSend::new(StatusCode::UNAUTHORIZED, "Unauthorized");
    let client = client(&stub);

    let err = client.monitors(Args::new()).await.expect_err("must fail");
    assert!(err.is_auth_failure());
}

#[tokio::test]
async fn test_malformed_json_is_returned_as_text() -> anyhow::Result<()> {
    let stub = StubHttpSend::new(StatusCode::OK, "{\"items\": [");
    let client = client(&stub);

    let resp = client.nodes(Args::new()).await?;
    assert_eq!(Response::Text(Bytes::from_static(b"{\"items\": [")), resp);
    Ok(())
}

#[tokio::test]
async fn test_missing_credential_fails_before_sending() {
    let stub = StubHttpSend::new(StatusCode::OK, "{}");
    let client = client_with(&stub, "abc123", "");

    let err = client.tags(Args::new()).await.expect_err("must fail");
    assert!(matches!(err, Error::Auth(_)));
    assert!(err.is_auth_failure());
    assert!(stub.requests().is_empty());
}

#[tokio::test]
async fn test_call_by_name_and_paths() -> anyhow::Result<()> {
    let stub = StubHttpSend::new(StatusCode::OK, "[]");
    let client = client(&stub);

    client.call("tags", Args::new()).await?;
    client
        .call("node", Args::from([("node_id", "n1")]))
        .await?;
    client
        .status_nodes(Args::from([("overall_check_statuses", "Ok")]))
        .await?;
    client
        .check_status(Args::from([("check", "chk1")]))
        .await?;

    let paths: Vec<_> = stub.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(
        vec![
            "/1.0/tags",
            "/2.0/node/n1",
            "/1.0/status/nodes",
            "/1.0/query/check/status"
        ],
        paths
    );
    Ok(())
}

#[tokio::test]
async fn test_default_is_sent_for_required_argument() -> anyhow::Result<()> {
    let stub = StubHttpSend::new(StatusCode::OK, "[]");
    let client = client(&stub);

    client.query_nodes(Args::new()).await?;

    let req = &stub.requests()[0];
    assert_eq!(Method::GET, req.method);
    assert!(req.query.contains(&("query".to_string(), "*".to_string())));
    Ok(())
}
