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

//! Builtin call table of the cloudkick api.

use crate::descriptor::{epoch, ArgumentSpec, CallDescriptor, PathPrefix};

const ADDRESS_TYPES: &[&str] = &["email", "sms", "pagerduty", "webhook"];
const INTERVALS: &[&str] = &["five_mins", "twenty_mins", "one_hour", "one_day"];
const CHECK_STATUSES: &[&str] = &["Ok", "Warning", "Error", "No Data"];

/// Every call known to the client, 1.0 first.
pub static BUILTIN_CALLS: &[CallDescriptor] = &[
    // 1.0
    CallDescriptor {
        version: "1.0",
        name: "addresses",
        endpoint: "addresses",
        prefix: PathPrefix::Version,
        description: "Returns all the notification addresses of the account.",
        arguments: &[],
    },
    CallDescriptor {
        version: "1.0",
        name: "address_types",
        endpoint: "address_types",
        prefix: PathPrefix::Version,
        description: "Returns the available notification address types.",
        arguments: &[],
    },
    CallDescriptor {
        version: "1.0",
        name: "create_address",
        endpoint: "address",
        prefix: PathPrefix::Version,
        description: "Creates a new notification address.",
        arguments: &[
            ArgumentSpec::post("name", "address name").required(),
            ArgumentSpec::post("type", "address type")
                .required()
                .valid_values(ADDRESS_TYPES),
            ArgumentSpec::post("address", "email address, phone number or url").required(),
        ],
    },
    CallDescriptor {
        version: "1.0",
        name: "query_nodes",
        endpoint: "query/nodes",
        prefix: PathPrefix::Version,
        description: "Returns the nodes matching the query.",
        arguments: &[ArgumentSpec::query("query", "node query, e.g. tag:web")
            .required()
            .default("*")],
    },
    CallDescriptor {
        version: "1.0",
        name: "query_checks",
        endpoint: "query/check",
        prefix: PathPrefix::Version,
        description: "Returns the checks of a node.",
        arguments: &[ArgumentSpec::query("node", "node id").required()],
    },
    CallDescriptor {
        version: "1.0",
        name: "check_data",
        endpoint: "query/check/data",
        prefix: PathPrefix::Version,
        description: "Returns the data points of a check metric between two points in time.",
        arguments: &[
            ArgumentSpec::query("check", "check id")
                .required()
                .target("metric.0.id"),
            ArgumentSpec::query("name", "metric name")
                .required()
                .target("metric.0.name"),
            ArgumentSpec::query("start", "start time, unix seconds or YYYY-MM-DD[ HH:MM:SS]")
                .required()
                .format(epoch),
            ArgumentSpec::query("end", "end time, unix seconds or YYYY-MM-DD[ HH:MM:SS]")
                .required()
                .format(epoch),
            ArgumentSpec::query("interval", "aggregation interval")
                .required()
                .default("twenty_mins")
                .valid_values(INTERVALS),
        ],
    },
    CallDescriptor {
        version: "1.0",
        name: "tags",
        endpoint: "tags",
        prefix: PathPrefix::Version,
        description: "Returns all the tags of the account.",
        arguments: &[],
    },
    CallDescriptor {
        version: "1.0",
        name: "add_tag",
        endpoint: "node/{node_id}/add_tag",
        prefix: PathPrefix::Version,
        description: "Adds a tag to a node.",
        arguments: &[
            ArgumentSpec::url("node_id", "node id"),
            ArgumentSpec::post("name", "tag name").required(),
        ],
    },
    CallDescriptor {
        version: "1.0",
        name: "remove_tag",
        endpoint: "node/{node_id}/remove_tag",
        prefix: PathPrefix::Version,
        description: "Removes a tag from a node.",
        arguments: &[
            ArgumentSpec::url("node_id", "node id"),
            ArgumentSpec::post("name", "tag name").required(),
        ],
    },
    // 2.0
    CallDescriptor {
        version: "2.0",
        name: "nodes",
        endpoint: "nodes",
        prefix: PathPrefix::Version,
        description: "Returns the nodes of the account, optionally filtered by a query.",
        arguments: &[
            ArgumentSpec::query("query", "node query, e.g. tag:web"),
            ArgumentSpec::query("offset", "index of the first node to return"),
            ArgumentSpec::query("limit", "maximum number of nodes to return"),
        ],
    },
    CallDescriptor {
        version: "2.0",
        name: "node",
        endpoint: "node/{node_id}",
        prefix: PathPrefix::Version,
        description: "Returns a single node.",
        arguments: &[ArgumentSpec::url("node_id", "node id")],
    },
    CallDescriptor {
        version: "2.0",
        name: "create_node",
        endpoint: "nodes",
        prefix: PathPrefix::Version,
        description: "Creates a new node.",
        arguments: &[
            ArgumentSpec::post("name", "node name").required(),
            ArgumentSpec::post("ip_address", "public ip address of the node")
                .required()
                .target("ipaddress"),
            ArgumentSpec::post("details", "json encoded node details"),
        ],
    },
    CallDescriptor {
        version: "2.0",
        name: "checks",
        endpoint: "checks",
        prefix: PathPrefix::Version,
        description: "Returns the checks of the account, optionally only those of one node.",
        arguments: &[ArgumentSpec::query("node", "node id")],
    },
    CallDescriptor {
        version: "2.0",
        name: "create_check",
        endpoint: "checks",
        prefix: PathPrefix::Version,
        description: "Creates a new check on a node.",
        arguments: &[
            ArgumentSpec::post("node_id", "node id")
                .required()
                .target("node"),
            ArgumentSpec::post("type", "check type, e.g. HTTP or PING").required(),
            ArgumentSpec::post("details", "json encoded check details"),
        ],
    },
    CallDescriptor {
        version: "2.0",
        name: "monitors",
        endpoint: "monitors",
        prefix: PathPrefix::Version,
        description: "Returns all the monitors of the account.",
        arguments: &[],
    },
    CallDescriptor {
        version: "2.0",
        name: "status_nodes",
        endpoint: "/1.0/status/nodes",
        prefix: PathPrefix::Verbatim,
        description: "Returns the nodes together with the status of their checks.",
        arguments: &[
            ArgumentSpec::query("overall_check_statuses", "only nodes in this state")
                .valid_values(CHECK_STATUSES),
        ],
    },
    CallDescriptor {
        version: "2.0",
        name: "check_status",
        endpoint: "/1.0/query/check/status",
        prefix: PathPrefix::Verbatim,
        description: "Returns the current status of a check.",
        arguments: &[ArgumentSpec::query("check", "check id").required()],
    },
];
