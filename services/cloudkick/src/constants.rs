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

// Env values used by the cloudkick client.
pub const CLOUDKICK_OAUTH_KEY: &str = "CLOUDKICK_OAUTH_KEY";
pub const CLOUDKICK_OAUTH_SECRET: &str = "CLOUDKICK_OAUTH_SECRET";
pub const CLOUDKICK_CONFIG_FILE: &str = "CLOUDKICK_CONFIG_FILE";
pub const CLOUDKICK_ENDPOINT: &str = "CLOUDKICK_ENDPOINT";

// Config file.
pub const DEFAULT_CONFIG_PATHS: &[&str] = &["~/.cloudkick.conf", "/etc/cloudkick.conf"];
pub const CONFIG_KEY_OAUTH_KEY: &str = "oauth_key";
pub const CONFIG_KEY_OAUTH_SECRET: &str = "oauth_secret";

pub const DEFAULT_ENDPOINT: &str = "https://api.cloudkick.com";

// OAuth 1.0 parameters.
pub const OAUTH_CONSUMER_KEY: &str = "oauth_consumer_key";
pub const OAUTH_NONCE: &str = "oauth_nonce";
pub const OAUTH_SIGNATURE: &str = "oauth_signature";
pub const OAUTH_SIGNATURE_METHOD: &str = "oauth_signature_method";
pub const OAUTH_TIMESTAMP: &str = "oauth_timestamp";
pub const OAUTH_VERSION: &str = "oauth_version";
pub const HMAC_SHA1: &str = "HMAC-SHA1";
pub const OAUTH_VERSION_1_0: &str = "1.0";
