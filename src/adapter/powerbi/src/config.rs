// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use secrecy::SecretString;
use url::Url;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub const DEFAULT_AUTHORITY_URL: &str = "https://login.microsoftonline.com";
pub const DEFAULT_API_URL: &str = "https://api.powerbi.com";
pub const POWERBI_SCOPE: &str = "https://analysis.windows.net/powerbi/api/.default";

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Identity of the dataset to refresh and the user it is refreshed on behalf
/// of (resource owner password credentials flow)
#[derive(Debug)]
pub struct PowerBiConfig {
    pub tenant_id: String,
    /// Client id of the public Azure AD application
    pub app_id: String,
    pub dataset_id: String,
    pub username: String,
    pub password: SecretString,
    pub authority_url: Url,
    pub api_url: Url,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
