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

//! Host inventory derived from the node list.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, warn};
use serde::Deserialize;

use crate::client::Client;
use crate::dispatch::{Args, Response};
use crate::{Error, Result};

/// Query that lists every node.
pub const ALL_NODES: &str = "*";

/// A node reduced to what the inventory needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Public ip address.
    pub ipaddress: String,
    /// Tag names.
    pub tags: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NodesDocument {
    Items { items: Vec<NodeDocument> },
    List(Vec<NodeDocument>),
}

#[derive(Deserialize)]
struct NodeDocument {
    #[serde(default)]
    ipaddress: Option<String>,
    #[serde(default)]
    tags: Option<Vec<TagDocument>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TagDocument {
    Name(String),
    Object { name: String },
}

/// Extract nodes from a node list response.
///
/// Accepts a bare array or an `{"items": [...]}` envelope. Nodes without an
/// ip address are skipped.
pub fn parse_nodes(resp: Response) -> Result<Vec<Node>> {
    let doc: NodesDocument = serde_json::from_value(resp.into_json()?)
        .map_err(|e| Error::UnexpectedResponse(format!("node list has an unknown shape: {e}")))?;
    let docs = match doc {
        NodesDocument::Items { items } => items,
        NodesDocument::List(list) => list,
    };

    let mut nodes = Vec::with_capacity(docs.len());
    for doc in docs {
        let Some(ipaddress) = doc.ipaddress else {
            warn!("skipping node without ipaddress");
            continue;
        };
        let tags = doc
            .tags
            .unwrap_or_default()
            .into_iter()
            .map(|t| match t {
                TagDocument::Name(name) | TagDocument::Object { name } => name,
            })
            .collect();
        nodes.push(Node { ipaddress, tags });
    }
    Ok(nodes)
}

/// Node lists memoized by query for the lifetime of the cache.
///
/// Entries are never invalidated.
#[derive(Debug, Default)]
pub struct NodeCache {
    entries: Mutex<HashMap<String, Arc<Vec<Node>>>>,
}

impl NodeCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cached nodes of a query.
    pub fn get(&self, query: &str) -> Option<Arc<Vec<Node>>> {
        self.lock().get(query).cloned()
    }

    /// Cache the nodes of a query, keeping an existing entry.
    pub fn insert(&self, query: &str, nodes: Vec<Node>) -> Arc<Vec<Node>> {
        self.lock()
            .entry(query.to_string())
            .or_insert_with(|| Arc::new(nodes))
            .clone()
    }

    /// Number of cached queries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing is cached yet.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<Vec<Node>>>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Ip addresses grouped by role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleDefs {
    roles: BTreeMap<String, Vec<String>>,
}

impl RoleDefs {
    /// Group node addresses by tag.
    pub fn from_nodes(nodes: &[Node]) -> Self {
        let mut roles: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for node in nodes {
            for tag in &node.tags {
                roles
                    .entry(tag.clone())
                    .or_default()
                    .push(node.ipaddress.clone());
            }
        }
        Self { roles }
    }

    /// Addresses of a role.
    pub fn get(&self, role: &str) -> Option<&[String]> {
        self.roles.get(role).map(Vec::as_slice)
    }

    /// Whether the role is known.
    pub fn contains(&self, role: &str) -> bool {
        self.roles.contains_key(role)
    }

    /// Iterate over roles in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.roles.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Evaluate a role expression.
    ///
    /// Tokens are separated by whitespace and applied left to right: `+role`
    /// or a bare `role` adds its addresses, `-role` removes them. The result
    /// keeps first-seen order without duplicates.
    pub fn evaluate(&self, expr: &str) -> Result<Vec<String>> {
        evaluate(expr, |role| {
            self.get(role)
                .map(<[String]>::to_vec)
                .ok_or_else(|| Error::UnknownRole {
                    role: role.to_string(),
                })
        })
    }
}

impl FromIterator<(String, Vec<String>)> for RoleDefs {
    fn from_iter<T: IntoIterator<Item = (String, Vec<String>)>>(iter: T) -> Self {
        Self {
            roles: iter.into_iter().collect(),
        }
    }
}

enum Op {
    Add,
    Remove,
}

fn parse_token(token: &str) -> (Op, &str) {
    if let Some(role) = token.strip_prefix('-') {
        (Op::Remove, role)
    } else if let Some(role) = token.strip_prefix('+') {
        (Op::Add, role)
    } else {
        (Op::Add, token)
    }
}

fn apply(hosts: &mut Vec<String>, op: Op, addrs: Vec<String>) {
    match op {
        Op::Add => {
            for addr in addrs {
                if !hosts.contains(&addr) {
                    hosts.push(addr);
                }
            }
        }
        Op::Remove => hosts.retain(|h| !addrs.contains(h)),
    }
}

fn evaluate(expr: &str, mut lookup: impl FnMut(&str) -> Result<Vec<String>>) -> Result<Vec<String>> {
    let mut hosts = Vec::new();
    for token in expr.split_whitespace() {
        let (op, role) = parse_token(token);
        apply(&mut hosts, op, lookup(role)?);
    }
    Ok(hosts)
}

/// Host inventory backed by the node list of the account.
///
/// Node lists are fetched once per query and kept in the owned [`NodeCache`].
#[derive(Debug)]
pub struct Inventory {
    client: Client,
    cache: NodeCache,
}

impl Inventory {
    /// Create an inventory with an empty cache.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            cache: NodeCache::new(),
        }
    }

    /// The cache of fetched node lists.
    pub fn cache(&self) -> &NodeCache {
        &self.cache
    }

    /// Nodes matching `query`, fetched on first use.
    pub async fn nodes(&self, query: &str) -> Result<Arc<Vec<Node>>> {
        if let Some(nodes) = self.cache.get(query) {
            return Ok(nodes);
        }

        let args = if query == ALL_NODES {
            Args::new()
        } else {
            Args::from([("query", query)])
        };
        debug!("fetching nodes for query {query:?}");
        let nodes = parse_nodes(self.client.nodes(args).await?)?;
        Ok(self.cache.insert(query, nodes))
    }

    /// Ip addresses of every node.
    pub async fn hosts(&self) -> Result<Vec<String>> {
        let nodes = self.nodes(ALL_NODES).await?;
        Ok(nodes.iter().map(|n| n.ipaddress.clone()).collect())
    }

    /// Ip addresses grouped by tag.
    pub async fn roledefs(&self) -> Result<RoleDefs> {
        Ok(RoleDefs::from_nodes(&self.nodes(ALL_NODES).await?))
    }

    /// Addresses of a role, or of the nodes matching `query` when no tag has
    /// that name.
    pub async fn resolve(&self, query: &str) -> Result<Vec<String>> {
        if let Some(addrs) = self.roledefs().await?.get(query) {
            return Ok(addrs.to_vec());
        }

        let nodes = self.nodes(query).await?;
        if nodes.is_empty() {
            return Err(Error::UnknownRole {
                role: query.to_string(),
            });
        }
        Ok(nodes.iter().map(|n| n.ipaddress.clone()).collect())
    }

    /// Evaluate a role expression, resolving each role like [`Self::resolve`].
    pub async fn evaluate(&self, expr: &str) -> Result<Vec<String>> {
        let mut hosts = Vec::new();
        for token in expr.split_whitespace() {
            let (op, role) = parse_token(token);
            apply(&mut hosts, op, self.resolve(role).await?);
        }
        Ok(hosts)
    }
}
