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

use http::StatusCode;
use thiserror::Error;

/// Errors returned by the cloudkick client.
///
/// Validation errors (`UnknownCall`, `MissingArgument`, `InvalidArgumentValue`,
/// `TemplateSubstitution`) are always raised before anything is sent.
#[derive(Error, Debug)]
pub enum Error {
    /// No configuration source could provide credentials.
    #[error("{0}")]
    Config(#[source] cloudkick_core::Error),

    /// Credentials are missing or were rejected.
    #[error("authentication failed: {0}")]
    Auth(#[source] cloudkick_core::Error),

    /// The api version or the call name is not in the registry.
    #[error("unknown call {name:?} for api version {version:?}")]
    UnknownCall {
        /// Requested api version.
        version: String,
        /// Requested call name.
        name: String,
    },

    /// A required argument was neither supplied nor defaulted.
    #[error("missing required argument {argument:?} for call {call:?}")]
    MissingArgument {
        /// Call being dispatched.
        call: String,
        /// Logical argument name.
        argument: String,
    },

    /// A supplied value is outside the allowed set or could not be formatted.
    #[error("invalid value {value:?} for argument {argument:?}: {reason}")]
    InvalidArgumentValue {
        /// Logical argument name.
        argument: String,
        /// Value as supplied.
        value: String,
        /// Allowed values or the formatting failure.
        reason: String,
    },

    /// The endpoint template references a placeholder no argument filled.
    #[error("endpoint template {template:?} has no value for placeholder {placeholder:?}")]
    TemplateSubstitution {
        /// Endpoint template of the call.
        template: String,
        /// Placeholder left unfilled.
        placeholder: String,
    },

    /// The server answered with a non-success status.
    #[error("request to {url} failed with status {status}")]
    Transport {
        /// Response status.
        status: StatusCode,
        /// Requested url, without query.
        url: String,
    },

    /// A role expression named a role no inventory source knows.
    #[error("unknown role {role:?}")]
    UnknownRole {
        /// Role name.
        role: String,
    },

    /// The response did not have the shape the caller needs.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Signing, transport, or descriptor table failure.
    #[error(transparent)]
    Signing(cloudkick_core::Error),
}

impl Error {
    /// Whether the error means the credentials are not usable.
    ///
    /// Transport failures count when the server answered 401, signing and
    /// transport errors when their message reports an unauthorized request.
    /// Validation errors never count, whatever value they echo.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            Error::Auth(_) => true,
            Error::Transport { status, .. } => *status == StatusCode::UNAUTHORIZED,
            Error::Signing(err) => err.to_string().to_lowercase().contains("unauthorized"),
            _ => false,
        }
    }

    /// Whether the error was raised before any request was sent.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Error::UnknownCall { .. }
                | Error::MissingArgument { .. }
                | Error::InvalidArgumentValue { .. }
                | Error::TemplateSubstitution { .. }
        )
    }
}

impl From<cloudkick_core::Error> for Error {
    fn from(err: cloudkick_core::Error) -> Self {
        match err.kind() {
            cloudkick_core::ErrorKind::ConfigInvalid => Error::Config(err),
            _ if err.is_credential_error() => Error::Auth(err),
            _ => Error::Signing(err),
        }
    }
}

/// Convenience type alias for Results
pub type Result<T> = std::result::Result<T, Error>;
